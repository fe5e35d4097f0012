//! Database schema
//!
//! Applied idempotently on open. Timestamps are RFC 3339 text, JSON values
//! are stored as text.

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id          TEXT PRIMARY KEY,
    org_id      TEXT NOT NULL,
    key         TEXT NOT NULL,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (org_id, key)
);

CREATE TABLE IF NOT EXISTS project_counters (
    project_id   TEXT PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
    last_number  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS task_statuses (
    id          TEXT PRIMARY KEY,
    project_id  TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    category    TEXT NOT NULL,
    sort_order  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sprints (
    id          TEXT PRIMARY KEY,
    org_id      TEXT NOT NULL,
    project_id  TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    goal        TEXT,
    status      TEXT NOT NULL,
    start_date  TEXT,
    end_date    TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_sprints_one_active
    ON sprints(project_id) WHERE status = 'active';

CREATE TABLE IF NOT EXISTS tasks (
    id              TEXT PRIMARY KEY,
    org_id          TEXT NOT NULL,
    project_id      TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    number          INTEGER NOT NULL,
    key             TEXT NOT NULL,
    title           TEXT NOT NULL,
    status_id       TEXT NOT NULL REFERENCES task_statuses(id),
    position        INTEGER NOT NULL,
    sprint_id       TEXT REFERENCES sprints(id) ON DELETE SET NULL,
    parent_task_id  TEXT REFERENCES tasks(id) ON DELETE SET NULL,
    assignee_id     TEXT,
    reporter_id     TEXT NOT NULL,
    priority        TEXT NOT NULL,
    task_type       TEXT NOT NULL,
    due_date        TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (project_id, number)
);

CREATE INDEX IF NOT EXISTS idx_tasks_column ON tasks(status_id, position);
CREATE INDEX IF NOT EXISTS idx_tasks_sprint ON tasks(sprint_id);

CREATE TABLE IF NOT EXISTS comments (
    id          TEXT PRIMARY KEY,
    task_id     TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    author_id   TEXT NOT NULL,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pages (
    id          TEXT PRIMARY KEY,
    org_id      TEXT NOT NULL,
    space_id    TEXT NOT NULL,
    parent_id   TEXT REFERENCES pages(id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    depth       INTEGER NOT NULL,
    position    INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_siblings ON pages(space_id, parent_id, position);

CREATE TABLE IF NOT EXISTS task_page_links (
    task_id     TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    page_id     TEXT NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
    created_by  TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (task_id, page_id)
);

-- Append-only. task_id is not a foreign key: entries outlive their task.
CREATE TABLE IF NOT EXISTS activity_log (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    id           TEXT NOT NULL UNIQUE,
    org_id       TEXT NOT NULL,
    task_id      TEXT,
    actor_id     TEXT NOT NULL,
    action       TEXT NOT NULL,
    entity_type  TEXT NOT NULL,
    entity_id    TEXT NOT NULL,
    old_value    TEXT,
    new_value    TEXT,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_task ON activity_log(task_id, seq);
CREATE INDEX IF NOT EXISTS idx_activity_entity ON activity_log(entity_type, entity_id, seq);

CREATE TABLE IF NOT EXISTS notifications (
    id            TEXT PRIMARY KEY,
    org_id        TEXT NOT NULL,
    recipient_id  TEXT NOT NULL,
    type          TEXT NOT NULL,
    title         TEXT NOT NULL,
    body          TEXT,
    entity_type   TEXT NOT NULL,
    entity_id     TEXT NOT NULL,
    is_read       INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notifications_recipient
    ON notifications(org_id, recipient_id, created_at);
"#;
