//! Maps parsed subcommands onto tracker operations

use crate::cli::{
    ActivityCommand, AddTaskArgs, Noun, NotificationCommand, PageCommand, ProjectCommand,
    SprintCommand, TaskCommand, UpdateTaskArgs,
};
use serde_json::Value;
use workscribe_tracker::{
    activity::ListActivity,
    comment::AddComment,
    counter::AllocateTaskNumber,
    notification::{ListNotifications, MarkAllNotificationsRead, MarkNotificationRead},
    page::{AddPage, ListPages, MovePage, PagePosition, ReorderPages},
    project::{AddProject, GetProject, ListProjects},
    sprint::{AddSprint, CompleteSprint, DeleteSprint, ListSprints, StartSprint, UpdateSprint},
    task::{
        AddTask, DeleteTask, GetTask, LinkPage, ListTasks, MoveTask, ReorderItem, ReorderTasks,
        UnlinkPage, UpdateTask,
    },
    Disposition, Execute, Operation, Result, TrackerContext, TrackerError,
    TrackerOperationProcessor,
};

/// Who is acting, and where
pub struct Caller {
    pub org: String,
    pub actor: String,
}

pub struct Runner<'a> {
    ctx: &'a TrackerContext,
    processor: TrackerOperationProcessor,
    caller: Caller,
}

impl<'a> Runner<'a> {
    pub fn new(ctx: &'a TrackerContext, caller: Caller) -> Self {
        Self {
            ctx,
            processor: TrackerOperationProcessor::from_config(&ctx.config().store),
            caller,
        }
    }

    async fn exec<O>(&self, op: O) -> Result<Value>
    where
        O: Execute<TrackerContext, TrackerError> + Operation,
    {
        self.processor.process(&op, self.ctx).await
    }

    pub async fn run(&self, noun: Noun) -> Result<Value> {
        match noun {
            Noun::Project(cmd) => self.project(cmd).await,
            Noun::Task(cmd) => self.task(cmd).await,
            Noun::Sprint(cmd) => self.sprint(cmd).await,
            Noun::Activity(cmd) => self.activity(cmd).await,
            Noun::Notification(cmd) => self.notification(cmd).await,
            Noun::Page(cmd) => self.page(cmd).await,
        }
    }

    async fn project(&self, cmd: ProjectCommand) -> Result<Value> {
        let org = self.caller.org.as_str();
        match cmd {
            ProjectCommand::Add { key, name } => self.exec(AddProject::new(org, key, name)).await,
            ProjectCommand::Get { id } => self.exec(GetProject::new(org, id)).await,
            ProjectCommand::List => self.exec(ListProjects::new(org)).await,
            ProjectCommand::Allocate { id } => self.exec(AllocateTaskNumber::new(org, id)).await,
        }
    }

    async fn task(&self, cmd: TaskCommand) -> Result<Value> {
        let Caller { org, actor } = &self.caller;
        let (org, actor) = (org.as_str(), actor.as_str());
        match cmd {
            TaskCommand::Add(args) => self.exec(add_task(org, actor, args)).await,
            TaskCommand::Get { id } => self.exec(GetTask::new(org, id)).await,
            TaskCommand::List {
                project,
                status,
                sprint,
                backlog,
            } => {
                let mut op = ListTasks::new(org, project);
                if let Some(status) = status {
                    op = op.with_status(status);
                }
                if let Some(sprint) = sprint {
                    op = op.with_sprint(sprint);
                }
                if backlog {
                    op = op.backlog();
                }
                self.exec(op).await
            }
            TaskCommand::Update(args) => self.exec(update_task(org, actor, args)).await,
            TaskCommand::Move { id, slot, status } => {
                let mut op = MoveTask::new(org, actor, id, slot);
                if let Some(status) = status {
                    op = op.to_status(status);
                }
                self.exec(op).await
            }
            TaskCommand::Reorder { project, items } => {
                let items = items
                    .into_iter()
                    .map(|(id, position)| ReorderItem::new(id, position))
                    .collect();
                self.exec(ReorderTasks::new(org, actor, project, items)).await
            }
            TaskCommand::Delete { id, admin } => {
                let mut op = DeleteTask::new(org, actor, id);
                if admin {
                    op = op.as_admin();
                }
                self.exec(op).await
            }
            TaskCommand::Comment { id, body } => {
                self.exec(AddComment::new(org, actor, id, body)).await
            }
            TaskCommand::Link { id, page } => self.exec(LinkPage::new(org, actor, id, page)).await,
            TaskCommand::Unlink { id, page } => {
                self.exec(UnlinkPage::new(org, actor, id, page)).await
            }
        }
    }

    async fn sprint(&self, cmd: SprintCommand) -> Result<Value> {
        let Caller { org, actor } = &self.caller;
        let (org, actor) = (org.as_str(), actor.as_str());
        match cmd {
            SprintCommand::Add {
                project,
                name,
                goal,
                start,
                end,
            } => {
                let mut op = AddSprint::new(org, actor, project, name);
                if let Some(goal) = goal {
                    op = op.with_goal(goal);
                }
                if let (Some(start), Some(end)) = (start, end) {
                    op = op.with_dates(start, end);
                }
                self.exec(op).await
            }
            SprintCommand::List { project } => self.exec(ListSprints::new(org, project)).await,
            SprintCommand::Update {
                id,
                name,
                goal,
                start,
                end,
            } => {
                let mut op = UpdateSprint::new(org, actor, id);
                op.name = name;
                op.goal = goal;
                op.start_date = start;
                op.end_date = end;
                self.exec(op).await
            }
            SprintCommand::Start { id } => self.exec(StartSprint::new(org, actor, id)).await,
            SprintCommand::Complete { id, to_sprint } => {
                let disposition = match to_sprint {
                    Some(target) => Disposition::to_sprint(target),
                    None => Disposition::Backlog,
                };
                self.exec(CompleteSprint::new(org, actor, id, disposition)).await
            }
            SprintCommand::Delete { id } => self.exec(DeleteSprint::new(org, actor, id)).await,
        }
    }

    async fn activity(&self, cmd: ActivityCommand) -> Result<Value> {
        let org = self.caller.org.as_str();
        let (op, limit) = match cmd {
            ActivityCommand::Task { id, limit } => (ListActivity::for_task(org, id), limit),
            ActivityCommand::Sprint { id, limit } => (ListActivity::for_sprint(org, id), limit),
        };
        match limit {
            Some(limit) => self.exec(op.with_limit(limit)).await,
            None => self.exec(op).await,
        }
    }

    async fn notification(&self, cmd: NotificationCommand) -> Result<Value> {
        let Caller { org, actor } = &self.caller;
        let (org, actor) = (org.as_str(), actor.as_str());
        match cmd {
            NotificationCommand::List {
                unread,
                skip,
                limit,
            } => {
                let mut op = ListNotifications::new(org, actor);
                if unread {
                    op = op.unread_only();
                }
                op.skip = skip;
                op.limit = limit;
                self.exec(op).await
            }
            NotificationCommand::Read { id } => {
                self.exec(MarkNotificationRead::new(org, actor, id)).await
            }
            NotificationCommand::ReadAll => {
                self.exec(MarkAllNotificationsRead::new(org, actor)).await
            }
        }
    }

    async fn page(&self, cmd: PageCommand) -> Result<Value> {
        let org = self.caller.org.as_str();
        match cmd {
            PageCommand::Add {
                space,
                title,
                parent,
            } => {
                let mut op = AddPage::new(org, space, title);
                if let Some(parent) = parent {
                    op = op.under(parent);
                }
                self.exec(op).await
            }
            PageCommand::List { space } => self.exec(ListPages::new(org, space)).await,
            PageCommand::Move { id, slot, parent } => {
                let mut op = MovePage::new(org, id, slot);
                if let Some(parent) = parent {
                    op = op.under(parent);
                }
                self.exec(op).await
            }
            PageCommand::Reorder { space, items } => {
                let items = items
                    .into_iter()
                    .map(|(id, position)| PagePosition::new(id, position))
                    .collect();
                self.exec(ReorderPages::new(org, space, items)).await
            }
        }
    }
}

fn add_task(org: &str, actor: &str, args: AddTaskArgs) -> AddTask {
    let mut op = AddTask::new(org, actor, args.project, args.title);
    op.status_id = args.status.map(Into::into);
    op.assignee = args.assignee.map(Into::into);
    op.sprint_id = args.sprint.map(Into::into);
    op.parent_task_id = args.parent.map(Into::into);
    op.due_date = args.due;
    if let Some(priority) = args.priority {
        op = op.with_priority(priority);
    }
    if let Some(task_type) = args.task_type {
        op = op.with_type(task_type);
    }
    op
}

fn update_task(org: &str, actor: &str, args: UpdateTaskArgs) -> UpdateTask {
    let mut op = UpdateTask::new(org, actor, args.id);
    op.title = args.title;
    op.priority = args.priority;
    op.task_type = args.task_type;
    op.status_id = args.status.map(Into::into);
    if let Some(assignee) = args.assign {
        op = op.assign(assignee);
    } else if args.unassign {
        op = op.unassign();
    }
    if let Some(sprint) = args.sprint {
        op = op.with_sprint(sprint);
    } else if args.backlog {
        op = op.to_backlog();
    }
    if let Some(due) = args.due {
        op = op.with_due_date(due);
    } else if args.clear_due {
        op = op.clear_due_date();
    }
    op
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use tempfile::TempDir;

    fn runner_parts() -> (TempDir, TrackerContext) {
        let temp = TempDir::new().unwrap();
        let ctx = TrackerContext::open_at(temp.path().join("cli.db")).unwrap();
        (temp, ctx)
    }

    async fn run(ctx: &TrackerContext, args: &[&str]) -> Result<Value> {
        let cli = Cli::parse_from(std::iter::once("workscribe").chain(args.iter().copied()));
        let runner = Runner::new(
            ctx,
            Caller {
                org: cli.org.clone(),
                actor: cli.actor.clone(),
            },
        );
        runner.run(cli.command).await
    }

    #[tokio::test]
    async fn test_project_and_task_round_through_cli() {
        let (_temp, ctx) = runner_parts();
        let project = run(&ctx, &["--org", "acme", "project", "add", "WS", "Workscribe"])
            .await
            .unwrap();
        let project_id = project["id"].as_str().unwrap();

        let task = run(
            &ctx,
            &["--org", "acme", "--actor", "alice", "task", "add", project_id, "First", "--priority", "high"],
        )
        .await
        .unwrap();
        assert_eq!(task["key"], "WS-1");
        assert_eq!(task["priority"], "high");

        let updated = run(
            &ctx,
            &["--org", "acme", "task", "update", task["id"].as_str().unwrap(), "--assign", "bob"],
        )
        .await
        .unwrap();
        assert_eq!(updated["assignee_id"], "bob");
    }

    #[tokio::test]
    async fn test_errors_keep_their_kind() {
        let (_temp, ctx) = runner_parts();
        let result = run(&ctx, &["--org", "acme", "sprint", "start", "missing"]).await;
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
    }
}
