//! Wiki page tree commands
//!
//! Pages form a forest per space. Siblings are ordered by the same sparse
//! position scheme as board columns; `depth` is kept denormalized so
//! listings need no recursion.

mod add;
mod list;
mod mv;
mod reorder;

pub use add::AddPage;
pub use list::ListPages;
pub use mv::MovePage;
pub use reorder::{PagePosition, ReorderPages};

use crate::types::SpaceId;

/// Lock resource label for a page space
pub(crate) fn space_resource(org: &crate::types::OrgId, space: &SpaceId) -> String {
    format!("space {}/{}", org, space)
}
