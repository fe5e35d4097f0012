//! AddPage command

use super::space_resource;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{OrgId, PageId, PageNode, SpaceId};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

/// Add a page at the end of its sibling list
#[derive(Debug, Clone, Deserialize)]
pub struct AddPage {
    pub org: OrgId,
    pub space_id: SpaceId,
    /// Root page when absent
    pub parent_id: Option<PageId>,
    pub title: String,
}

operation!(
    AddPage,
    verb = "add",
    noun = "page",
    description = "Add a page to a space's page tree"
);

impl AddPage {
    pub fn new(org: impl Into<OrgId>, space_id: impl Into<SpaceId>, title: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            space_id: space_id.into(),
            parent_id: None,
            title: title.into(),
        }
    }

    pub fn under(mut self, parent: impl Into<PageId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddPage {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TrackerError::invalid_argument("title", "must not be empty"));
        }

        let cmd = self.clone();
        let rules = ctx.ordering();
        let page = ctx
            .db()
            .write(space_resource(&self.org, &self.space_id), move |tx| {
                let depth = match &cmd.parent_id {
                    Some(parent_id) => {
                        let parent = store::get_page(tx, &cmd.org, parent_id)?;
                        if parent.space_id != cmd.space_id {
                            return Err(TrackerError::invalid_argument(
                                "parent_id",
                                "parent page belongs to another space",
                            ));
                        }
                        parent.depth + 1
                    }
                    None => 0,
                };
                let siblings =
                    store::page_siblings(tx, &cmd.org, &cmd.space_id, cmd.parent_id.as_ref(), None)?;
                let placement = rules.append(&siblings);
                for (sibling, position) in &placement.rebalanced {
                    store::set_page_position(tx, sibling, cmd.parent_id.as_ref(), depth, *position)?;
                }

                let page = PageNode {
                    id: PageId::new(),
                    org_id: cmd.org.clone(),
                    space_id: cmd.space_id.clone(),
                    parent_id: cmd.parent_id.clone(),
                    title,
                    depth,
                    position: placement.position,
                    created_at: Utc::now(),
                };
                store::insert_page(tx, &page)?;
                Ok(page)
            })
            .await?;
        Ok(serde_json::to_value(&page)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_children_get_depth_and_positions() {
        let (_temp, ctx) = setup();
        let root = AddPage::new("acme", "eng", "Engineering").execute(&ctx).await.unwrap();
        let root_id = root["id"].as_str().unwrap();

        let first = AddPage::new("acme", "eng", "Onboarding")
            .under(root_id)
            .execute(&ctx)
            .await
            .unwrap();
        let second = AddPage::new("acme", "eng", "On-call")
            .under(root_id)
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(root["depth"], 0);
        assert_eq!(first["depth"], 1);
        assert_eq!(first["position"], 1000);
        assert_eq!(second["position"], 2000);
    }

    #[tokio::test]
    async fn test_parent_in_other_space_is_invalid() {
        let (_temp, ctx) = setup();
        let root = AddPage::new("acme", "eng", "Engineering").execute(&ctx).await.unwrap();

        let result = AddPage::new("acme", "sales", "Playbook")
            .under(root["id"].as_str().unwrap())
            .execute(&ctx)
            .await;
        assert!(matches!(result, Err(TrackerError::InvalidArgument { .. })));
    }
}
