//! Core types for the tracker engine

mod activity;
mod ids;
mod notification;
mod page;
mod project;
mod sprint;
pub(crate) mod sql;
mod task;

// Re-export all types
pub use activity::{ActivityAction, ActivityEntry, NewActivity};
pub use ids::{
    ActivityId, ActorId, CommentId, NotificationId, OrgId, PageId, ProjectId, SpaceId, SprintId,
    StatusId, TaskId,
};
pub use notification::{NewNotification, Notification, NotificationPage, NotificationType};
pub use page::PageNode;
pub use project::{EntityKind, Project, StatusCategory, TaskStatus, DEFAULT_STATUSES};
pub use sprint::{Disposition, Sprint, SprintStatus, SprintSummary};
pub use task::{Comment, Task, TaskPageLink, TaskPriority, TaskType};
