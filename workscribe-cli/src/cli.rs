//! CLI definition for the `workscribe` command

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use workscribe_tracker::{TaskPriority, TaskType};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Workscribe tracker engine
///
/// Every command prints its result as JSON (or YAML) on stdout. Exit code 0
/// means success, 1 an error, 2 a lock timeout that is safe to retry.
#[derive(Parser, Debug)]
#[command(name = "workscribe")]
#[command(version)]
#[command(about = "Task numbering, board ordering, sprints, activity and notifications")]
pub struct Cli {
    /// Database file, overriding the configured store path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Configuration file layered on top of discovered ones
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Organization the command acts in
    #[arg(long, global = true, default_value = "default")]
    pub org: String,

    /// Actor recorded for mutations
    #[arg(long, global = true, default_value = "cli")]
    pub actor: String,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Log more (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Noun,
}

#[derive(Subcommand, Debug)]
pub enum Noun {
    /// Projects and task numbering
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Tasks on the board
    #[command(subcommand)]
    Task(TaskCommand),
    /// Sprint lifecycle
    #[command(subcommand)]
    Sprint(SprintCommand),
    /// Activity history
    #[command(subcommand)]
    Activity(ActivityCommand),
    /// Notifications of the acting user
    #[command(subcommand)]
    Notification(NotificationCommand),
    /// Wiki page tree
    #[command(subcommand)]
    Page(PageCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project with the default columns
    Add {
        /// Short uppercase key used in task keys, e.g. WS
        key: String,
        name: String,
    },
    Get {
        id: String,
    },
    List,
    /// Allocate the next task number without creating a task
    Allocate {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    Add(AddTaskArgs),
    Get {
        id: String,
    },
    List {
        project: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, conflicts_with = "backlog")]
        sprint: Option<String>,
        /// Only tasks without a sprint
        #[arg(long)]
        backlog: bool,
    },
    Update(UpdateTaskArgs),
    /// Move to a slot of the current or another column
    Move {
        id: String,
        /// 0-based index among the column's other tasks
        slot: usize,
        #[arg(long)]
        status: Option<String>,
    },
    /// Set explicit positions for tasks of one column
    Reorder {
        project: String,
        /// ID=POSITION pairs
        #[arg(required = true, value_parser = parse_position)]
        items: Vec<(String, i64)>,
    },
    Delete {
        id: String,
        /// Delete even if the actor is not the reporter
        #[arg(long)]
        admin: bool,
    },
    Comment {
        id: String,
        body: String,
    },
    Link {
        id: String,
        page: String,
    },
    Unlink {
        id: String,
        page: String,
    },
}

#[derive(Args, Debug)]
pub struct AddTaskArgs {
    pub project: String,
    pub title: String,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub sprint: Option<String>,
    #[arg(long)]
    pub parent: Option<String>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long = "type")]
    pub task_type: Option<TaskType>,
    /// Due date as YYYY-MM-DD
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct UpdateTaskArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long = "type")]
    pub task_type: Option<TaskType>,
    #[arg(long, conflicts_with = "unassign")]
    pub assign: Option<String>,
    #[arg(long)]
    pub unassign: bool,
    #[arg(long, conflicts_with = "backlog")]
    pub sprint: Option<String>,
    /// Remove the task from its sprint
    #[arg(long)]
    pub backlog: bool,
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,
    #[arg(long)]
    pub clear_due: bool,
    /// Move to the end of another column
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SprintCommand {
    Add {
        project: String,
        name: String,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },
    List {
        project: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    Start {
        id: String,
    },
    /// Complete the sprint; unfinished tasks go to the backlog unless
    /// --to-sprint is given
    Complete {
        id: String,
        #[arg(long)]
        to_sprint: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// History of a task, newest first
    Task {
        id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Lifecycle history of a sprint, newest first
    Sprint {
        id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    List {
        #[arg(long)]
        unread: bool,
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    Read {
        id: String,
    },
    ReadAll,
}

#[derive(Subcommand, Debug)]
pub enum PageCommand {
    Add {
        space: String,
        title: String,
        #[arg(long)]
        parent: Option<String>,
    },
    List {
        space: String,
    },
    /// Move under a new parent (or to the root) at a slot
    Move {
        id: String,
        slot: usize,
        #[arg(long)]
        parent: Option<String>,
    },
    Reorder {
        space: String,
        /// ID=POSITION pairs
        #[arg(required = true, value_parser = parse_position)]
        items: Vec<(String, i64)>,
    },
}

/// Parse an `ID=POSITION` pair
fn parse_position(s: &str) -> Result<(String, i64), String> {
    let (id, position) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=POSITION, got '{s}'"))?;
    let position = position
        .parse()
        .map_err(|e| format!("invalid position in '{s}': {e}"))?;
    Ok((id.to_string(), position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("T1=1500"), Ok(("T1".to_string(), 1500)));
        assert!(parse_position("T1").is_err());
        assert!(parse_position("T1=abc").is_err());
    }

    #[test]
    fn test_parse_update_flags() {
        let cli = Cli::parse_from([
            "workscribe", "--org", "acme", "task", "update", "T1", "--unassign", "--priority", "high",
        ]);
        assert_eq!(cli.org, "acme");
        match cli.command {
            Noun::Task(TaskCommand::Update(args)) => {
                assert!(args.unassign);
                assert_eq!(args.priority, Some(TaskPriority::High));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
