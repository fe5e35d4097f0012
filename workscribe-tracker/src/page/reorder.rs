//! ReorderPages command

use super::space_resource;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::ordering::validate_batch;
use crate::store;
use crate::types::{EntityKind, OrgId, PageId, SpaceId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Requested position for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePosition {
    pub id: PageId,
    pub position: i64,
}

impl PagePosition {
    pub fn new(id: impl Into<PageId>, position: i64) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Set explicit positions for sibling pages, all or nothing
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderPages {
    pub org: OrgId,
    pub space_id: SpaceId,
    pub items: Vec<PagePosition>,
}

operation!(
    ReorderPages,
    verb = "reorder",
    noun = "pages",
    description = "Apply a batch of sibling page positions atomically"
);

impl ReorderPages {
    pub fn new(org: impl Into<OrgId>, space_id: impl Into<SpaceId>, items: Vec<PagePosition>) -> Self {
        Self {
            org: org.into(),
            space_id: space_id.into(),
            items,
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ReorderPages {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let pairs: Vec<(PageId, i64)> = self
            .items
            .iter()
            .map(|item| (item.id.clone(), item.position))
            .collect();
        validate_batch(&pairs)?;

        let cmd = self.clone();
        let changed = ctx
            .db()
            .write(space_resource(&self.org, &self.space_id), move |tx| {
                let mut pages = Vec::with_capacity(pairs.len());
                for (id, _) in &pairs {
                    let page = store::get_page(tx, &cmd.org, id)?;
                    if page.space_id != cmd.space_id {
                        return Err(TrackerError::not_found(EntityKind::Page, id));
                    }
                    pages.push(page);
                }

                let parent = pages[0].parent_id.clone();
                if pages.iter().any(|p| p.parent_id != parent) {
                    return Err(TrackerError::invalid_argument(
                        "items",
                        "all pages must share the same parent",
                    ));
                }

                let mut changed = 0usize;
                for (page, (_, position)) in pages.iter().zip(&pairs) {
                    if page.position == *position {
                        continue;
                    }
                    store::set_page_position(tx, &page.id, parent.as_ref(), page.depth, *position)?;
                    changed += 1;
                }

                let mut seen = HashSet::new();
                for (id, position) in
                    store::page_siblings(tx, &cmd.org, &cmd.space_id, parent.as_ref(), None)?
                {
                    if !seen.insert(position) {
                        return Err(TrackerError::invalid_argument(
                            "items",
                            format!("position {} collides with page {}", position, id),
                        ));
                    }
                }
                Ok(changed)
            })
            .await?;

        Ok(json!({ "reordered": changed, "items": self.items }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{AddPage, ListPages};
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_reorder_roots() {
        let (_temp, ctx) = setup();
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let page = AddPage::new("acme", "eng", title).execute(&ctx).await.unwrap();
            ids.push(page["id"].as_str().unwrap().to_string());
        }

        let result = ReorderPages::new(
            "acme",
            "eng",
            vec![
                PagePosition::new(ids[2].as_str(), 10),
                PagePosition::new(ids[1].as_str(), 20),
                PagePosition::new(ids[0].as_str(), 30),
            ],
        )
        .execute(&ctx)
        .await
        .unwrap();
        assert_eq!(result["reordered"], 3);

        let pages = ListPages::new("acme", "eng").execute(&ctx).await.unwrap();
        let titles: Vec<&str> = pages["pages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_mixed_parents_rejected() {
        let (_temp, ctx) = setup();
        let root = AddPage::new("acme", "eng", "Root").execute(&ctx).await.unwrap();
        let root_id = root["id"].as_str().unwrap();
        let child = AddPage::new("acme", "eng", "Child")
            .under(root_id)
            .execute(&ctx)
            .await
            .unwrap();

        let result = ReorderPages::new(
            "acme",
            "eng",
            vec![
                PagePosition::new(root_id, 1),
                PagePosition::new(child["id"].as_str().unwrap(), 2),
            ],
        )
        .execute(&ctx)
        .await;
        assert!(matches!(result, Err(TrackerError::InvalidArgument { .. })));
    }
}
