use crate::error::{Result, TrackerError};
use crate::types::{EntityKind, OrgId, PageId, PageNode, SpaceId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PAGE_COLUMNS: &str = "id, org_id, space_id, parent_id, title, depth, position, created_at";

fn row_to_page(row: &Row<'_>) -> rusqlite::Result<PageNode> {
    Ok(PageNode {
        id: row.get(0)?,
        org_id: row.get(1)?,
        space_id: row.get(2)?,
        parent_id: row.get(3)?,
        title: row.get(4)?,
        depth: row.get(5)?,
        position: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn insert_page(conn: &Connection, page: &PageNode) -> Result<()> {
    conn.execute(
        "INSERT INTO pages (id, org_id, space_id, parent_id, title, depth, position, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            page.id,
            page.org_id,
            page.space_id,
            page.parent_id,
            page.title,
            page.depth,
            page.position,
            page.created_at
        ],
    )?;
    Ok(())
}

pub(crate) fn get_page(conn: &Connection, org: &OrgId, id: &PageId) -> Result<PageNode> {
    conn.query_row(
        &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ?1 AND org_id = ?2"),
        params![id, org],
        row_to_page,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found(EntityKind::Page, id))
}

/// Pages of a space ordered by depth, then parent, then position
pub(crate) fn list_pages(conn: &Connection, org: &OrgId, space: &SpaceId) -> Result<Vec<PageNode>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAGE_COLUMNS} FROM pages WHERE org_id = ?1 AND space_id = ?2 \
         ORDER BY depth, parent_id, position"
    ))?;
    let pages = stmt
        .query_map(params![org, space], row_to_page)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(pages)
}

/// `(id, position)` of the children of `parent` (roots when `None`),
/// ascending, optionally leaving one page out
pub(crate) fn page_siblings(
    conn: &Connection,
    org: &OrgId,
    space: &SpaceId,
    parent: Option<&PageId>,
    exclude: Option<&PageId>,
) -> Result<Vec<(PageId, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT id, position FROM pages \
         WHERE org_id = ?1 AND space_id = ?2 AND parent_id IS ?3 AND (?4 IS NULL OR id != ?4) \
         ORDER BY position, created_at",
    )?;
    let rows = stmt
        .query_map(params![org, space, parent, exclude], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) fn set_page_position(
    conn: &Connection,
    id: &PageId,
    parent: Option<&PageId>,
    depth: i64,
    position: i64,
) -> Result<()> {
    conn.execute(
        "UPDATE pages SET parent_id = ?2, depth = ?3, position = ?4 WHERE id = ?1",
        params![id, parent, depth, position],
    )?;
    Ok(())
}

/// Every page below `root` in its subtree, excluding `root`
pub(crate) fn descendant_ids(conn: &Connection, root: &PageId) -> Result<Vec<PageId>> {
    let mut stmt = conn.prepare(
        "WITH RECURSIVE subtree(id) AS ( \
             SELECT id FROM pages WHERE parent_id = ?1 \
             UNION ALL \
             SELECT p.id FROM pages p JOIN subtree s ON p.parent_id = s.id \
         ) SELECT id FROM subtree",
    )?;
    let ids = stmt
        .query_map(params![root], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

/// Add `delta` to the depth of the given pages
pub(crate) fn shift_depths(conn: &Connection, ids: &[PageId], delta: i64) -> Result<()> {
    if delta == 0 {
        return Ok(());
    }
    let mut stmt = conn.prepare("UPDATE pages SET depth = depth + ?2 WHERE id = ?1")?;
    for id in ids {
        stmt.execute(params![id, delta])?;
    }
    Ok(())
}
