//! MovePage command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::ordering::slot_of;
use crate::store;
use crate::types::{OrgId, PageId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Reparent a page and/or move it to a slot among its siblings. The page's
/// subtree moves with it.
#[derive(Debug, Clone, Deserialize)]
pub struct MovePage {
    pub org: OrgId,
    pub id: PageId,
    /// New parent; the page becomes a root page when absent
    pub parent_id: Option<PageId>,
    /// 0-based index among the new siblings
    pub slot: usize,
}

operation!(
    MovePage,
    verb = "move",
    noun = "page",
    description = "Move a page within the page tree"
);

impl MovePage {
    /// Move to `slot` among the root pages of the space
    pub fn new(org: impl Into<OrgId>, id: impl Into<PageId>, slot: usize) -> Self {
        Self {
            org: org.into(),
            id: id.into(),
            parent_id: None,
            slot,
        }
    }

    pub fn under(mut self, parent: impl Into<PageId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for MovePage {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        // Space is unknown until the page is read
        let cmd = self.clone();
        let rules = ctx.ordering();
        let page = ctx
            .db()
            .write(format!("page {}", self.id), move |tx| {
                let mut page = store::get_page(tx, &cmd.org, &cmd.id)?;
                let descendants = store::descendant_ids(tx, &page.id)?;

                let depth = match &cmd.parent_id {
                    Some(parent_id) => {
                        if *parent_id == page.id || descendants.contains(parent_id) {
                            return Err(TrackerError::invalid_argument(
                                "parent_id",
                                "a page cannot be moved under itself or its descendants",
                            ));
                        }
                        let parent = store::get_page(tx, &cmd.org, parent_id)?;
                        if parent.space_id != page.space_id {
                            return Err(TrackerError::invalid_argument(
                                "parent_id",
                                "parent page belongs to another space",
                            ));
                        }
                        parent.depth + 1
                    }
                    None => 0,
                };

                if cmd.parent_id == page.parent_id {
                    let current =
                        store::page_siblings(tx, &cmd.org, &page.space_id, page.parent_id.as_ref(), None)?;
                    if slot_of(&current, &page.id) == Some(cmd.slot) {
                        debug!(page = %page.id, slot = cmd.slot, "page already in slot");
                        return Ok(page);
                    }
                }

                let siblings = store::page_siblings(
                    tx,
                    &cmd.org,
                    &page.space_id,
                    cmd.parent_id.as_ref(),
                    Some(&page.id),
                )?;
                let placement = rules.place(&siblings, cmd.slot)?;
                for (sibling, position) in &placement.rebalanced {
                    store::set_page_position(tx, sibling, cmd.parent_id.as_ref(), depth, *position)?;
                }

                store::set_page_position(tx, &page.id, cmd.parent_id.as_ref(), depth, placement.position)?;
                store::shift_depths(tx, &descendants, depth - page.depth)?;

                page.parent_id = cmd.parent_id.clone();
                page.depth = depth;
                page.position = placement.position;
                Ok(page)
            })
            .await?;
        Ok(serde_json::to_value(&page)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{AddPage, ListPages};
    use crate::test_support::setup;

    async fn page(ctx: &TrackerContext, title: &str, parent: Option<&str>) -> String {
        let mut cmd = AddPage::new("acme", "eng", title);
        if let Some(parent) = parent {
            cmd = cmd.under(parent);
        }
        cmd.execute(ctx).await.unwrap()["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_reparent_updates_subtree_depths() {
        let (_temp, ctx) = setup();
        let a = page(&ctx, "A", None).await;
        let b = page(&ctx, "B", None).await;
        let a1 = page(&ctx, "A1", Some(a.as_str())).await;
        let a11 = page(&ctx, "A11", Some(a1.as_str())).await;

        let moved = MovePage::new("acme", a.as_str(), 0)
            .under(b.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(moved["depth"], 1);
        assert_eq!(moved["parent_id"], b.as_str());

        let pages = ListPages::new("acme", "eng").execute(&ctx).await.unwrap();
        let depth_of = |id: &str| {
            pages["pages"]
                .as_array()
                .unwrap()
                .iter()
                .find(|p| p["id"] == id)
                .unwrap()["depth"]
                .as_i64()
                .unwrap()
        };
        assert_eq!(depth_of(&a1), 2);
        assert_eq!(depth_of(&a11), 3);
    }

    #[tokio::test]
    async fn test_cannot_move_under_descendant() {
        let (_temp, ctx) = setup();
        let a = page(&ctx, "A", None).await;
        let a1 = page(&ctx, "A1", Some(a.as_str())).await;

        let under_child = MovePage::new("acme", a.as_str(), 0)
            .under(a1.as_str())
            .execute(&ctx)
            .await;
        assert!(matches!(under_child, Err(TrackerError::InvalidArgument { .. })));

        let under_self = MovePage::new("acme", a.as_str(), 0)
            .under(a.as_str())
            .execute(&ctx)
            .await;
        assert!(matches!(under_self, Err(TrackerError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_reposition_among_roots() {
        let (_temp, ctx) = setup();
        let _a = page(&ctx, "A", None).await;
        let _b = page(&ctx, "B", None).await;
        let c = page(&ctx, "C", None).await;

        let moved = MovePage::new("acme", c.as_str(), 0).execute(&ctx).await.unwrap();
        assert_eq!(moved["position"], 500);
    }
}
