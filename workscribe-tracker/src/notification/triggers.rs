//! Who gets notified about what. Nobody is notified about their own actions.

use crate::types::{
    ActorId, Comment, EntityKind, NewNotification, NotificationType, Task,
};

/// `TASK_ASSIGNED` for the task's assignee, unless they assigned themselves
pub(crate) fn assignment_notice(task: &Task, actor: &ActorId) -> Option<NewNotification> {
    let assignee = task.assignee_id.as_ref()?;
    if assignee == actor {
        return None;
    }
    Some(
        NewNotification::new(
            &task.org_id,
            assignee,
            NotificationType::TaskAssigned,
            format!("{} was assigned to you", task.key),
        )
        .with_body(task.title.clone())
        .about(EntityKind::Task, &task.id),
    )
}

/// `MENTION` for each distinct actor mentioned in a comment, except its author
pub(crate) fn mention_notices(task: &Task, comment: &Comment) -> Vec<NewNotification> {
    comment
        .mentions()
        .into_iter()
        .filter(|mentioned| mentioned != &comment.author_id)
        .map(|mentioned| {
            NewNotification::new(
                &task.org_id,
                &mentioned,
                NotificationType::Mention,
                format!("{} mentioned you on {}", comment.author_id, task.key),
            )
            .with_body(comment.body.clone())
            .about(EntityKind::Task, &task.id)
        })
        .collect()
}

/// `TASK_DONE` for the reporter when someone else finishes their task
pub(crate) fn done_notice(task: &Task, actor: &ActorId) -> Option<NewNotification> {
    if &task.reporter_id == actor {
        return None;
    }
    Some(
        NewNotification::new(
            &task.org_id,
            &task.reporter_id,
            NotificationType::TaskDone,
            format!("{} was completed", task.key),
        )
        .with_body(task.title.clone())
        .about(EntityKind::Task, &task.id),
    )
}
