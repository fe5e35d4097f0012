//! ListPages command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{OrgId, SpaceId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// List the page tree of a space, shallowest first
#[derive(Debug, Clone, Deserialize)]
pub struct ListPages {
    pub org: OrgId,
    pub space_id: SpaceId,
}

operation!(
    ListPages,
    verb = "list",
    noun = "pages",
    description = "List the pages of a space"
);

impl ListPages {
    pub fn new(org: impl Into<OrgId>, space_id: impl Into<SpaceId>) -> Self {
        Self {
            org: org.into(),
            space_id: space_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListPages {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let pages = ctx
            .db()
            .read(move |conn| store::list_pages(conn, &cmd.org, &cmd.space_id))
            .await?;
        Ok(json!({ "pages": pages, "count": pages.len() }))
    }
}
