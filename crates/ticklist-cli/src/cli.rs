use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use ticklist_core::{
    query::{SortKey, TaskFilter},
    tasks::{Priority, TaskStatus},
    time::{parse_timestamp, TimestampError},
};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "ticklist",
    about = "Local to-do list with drafts, filters and statistics",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Directory holding todos.json and drafts.json (overrides config).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Optional subcommand; defaults to the overview when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show statistics with the tasks due today and overdue.
    Overview,
    /// Create, edit, list and delete tasks.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Create, edit, assign and delete drafts.
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Print task statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Print version and exit.
    Version,
    /// Check that both collection files can be read and written.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// List tasks.
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        #[arg(long, value_enum, default_value_t = SortArg::Due)]
        sort: SortArg,
        /// Case-insensitive text matched against title, description and tags.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Add a task.
    Add {
        title: String,
        #[arg(long, short, default_value = "")]
        description: String,
        /// Due date, e.g. 2024-06-15 or 2024-06-15T17:00.
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDateTime>,
        #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        #[arg(long, value_enum, default_value_t = StatusArg::Todo)]
        status: StatusArg,
        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
    },
    /// Show one task.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Change fields of a task; omitted flags are left alone.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
        due: Option<NaiveDateTime>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Comma-separated tags replacing the current ones.
        #[arg(long)]
        tags: Option<String>,
    },
    /// Mark a task completed.
    Done { id: String },
    /// Delete a task.
    Rm {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DraftCommand {
    /// List drafts.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a draft.
    Add {
        title: String,
        #[arg(long, short, default_value = "")]
        description: String,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Show one draft.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Change fields of a draft.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a draft.
    Rm {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Turn a draft into a scheduled task. Title, description and tags
    /// default to the draft's own.
    Assign {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDateTime>,
        #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        #[arg(long, value_enum, default_value_t = StatusArg::Todo)]
        status: StatusArg,
        #[arg(long)]
        tags: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    All,
    Todo,
    InProgress,
    Completed,
    Overdue,
    DueToday,
    HighPriority,
}

impl From<FilterArg> for TaskFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => TaskFilter::All,
            FilterArg::Todo => TaskFilter::Status(TaskStatus::Todo),
            FilterArg::InProgress => TaskFilter::Status(TaskStatus::InProgress),
            FilterArg::Completed => TaskFilter::Status(TaskStatus::Completed),
            FilterArg::Overdue => TaskFilter::Overdue,
            FilterArg::DueToday => TaskFilter::DueToday,
            FilterArg::HighPriority => TaskFilter::HighPriority,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Due,
    Priority,
    Created,
    Title,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Due => SortKey::DueDate,
            SortArg::Priority => SortKey::Priority,
            SortArg::Created => SortKey::CreatedDate,
            SortArg::Title => SortKey::Title,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Todo,
    InProgress,
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Todo => TaskStatus::Todo,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

fn parse_due(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    parse_timestamp(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn defaults_to_overview_when_missing_subcommand() {
        let cli = Cli::try_parse_from(["ticklist"]).expect("parse should succeed");
        assert_eq!(cli.command, None);
        assert_eq!(cli.data_dir, None);
    }

    #[test]
    fn parses_task_add_with_options() {
        let cli = Cli::try_parse_from([
            "ticklist",
            "task",
            "add",
            "Buy milk",
            "--due",
            "2024-06-15",
            "--priority",
            "high",
            "--tags",
            "home, errands",
        ])
        .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Some(Command::Task(TaskCommand::Add {
                title: "Buy milk".into(),
                description: String::new(),
                due: NaiveDate::from_ymd_opt(2024, 6, 15).and_then(|d| d.and_hms_opt(0, 0, 0)),
                priority: PriorityArg::High,
                status: StatusArg::Todo,
                tags: Some("home, errands".into()),
            }))
        );
    }

    #[test]
    fn rejects_unparseable_due_date() {
        let err = Cli::try_parse_from(["ticklist", "task", "add", "x", "--due", "soon"])
            .expect_err("bad date should fail");
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn parses_list_filters_and_global_data_dir() {
        let cli = Cli::try_parse_from([
            "ticklist",
            "task",
            "list",
            "--filter",
            "due-today",
            "--sort",
            "title",
            "--data-dir",
            "/tmp/ticklist",
        ])
        .expect("parse should succeed");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/ticklist")));
        assert_eq!(
            cli.command,
            Some(Command::Task(TaskCommand::List {
                filter: FilterArg::DueToday,
                sort: SortArg::Title,
                search: None,
                json: false,
            }))
        );
    }

    #[test]
    fn due_and_clear_due_conflict() {
        assert!(Cli::try_parse_from([
            "ticklist",
            "task",
            "edit",
            "abc",
            "--due",
            "2024-06-15",
            "--clear-due",
        ])
        .is_err());
    }

    #[test]
    fn parses_draft_assign_and_config_init() {
        let cli = Cli::try_parse_from(["ticklist", "draft", "assign", "d1", "--status", "in-progress"])
            .expect("parse should succeed");
        assert!(matches!(
            cli.command,
            Some(Command::Draft(DraftCommand::Assign {
                status: StatusArg::InProgress,
                ..
            }))
        ));

        let cli = Cli::try_parse_from(["ticklist", "config", "init"]).expect("parse should succeed");
        assert_eq!(cli.command, Some(Command::Config(ConfigCommand::Init)));
    }

    #[test]
    fn filter_args_map_to_query_filters() {
        assert_eq!(
            TaskFilter::from(FilterArg::InProgress),
            TaskFilter::Status(TaskStatus::InProgress)
        );
        assert_eq!(SortKey::from(SortArg::Created), SortKey::CreatedDate);
    }
}
