//! Wiki page tree nodes. Only structure and ordering live here; page bodies
//! belong to the wiki content service.

use super::ids::{OrgId, PageId, SpaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub id: PageId,
    pub org_id: OrgId,
    pub space_id: SpaceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<PageId>,
    pub title: String,
    /// 0 for root pages
    pub depth: i64,
    /// Sparse ordering key among siblings
    pub position: i64,
    pub created_at: DateTime<Utc>,
}
