use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use taskdesk_core::api::models::{TaskPriority, TaskStatus, TaskType, UserRole};

#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(about = "Command line client for the TaskDesk task manager")]
#[command(version)]
#[command(after_help = "Examples:
  taskdesk auth login --email ada@example.com   # Sign in and store the token
  taskdesk task list --status Todo               # List open tasks
  taskdesk task browse                           # Interactive table browser
  taskdesk task create --title \"Fix login\"       # Create a task
  taskdesk user list --role admin                # List administrators
  taskdesk config set --url http://localhost:5000

Environment Variables:
  TASKDESK_URL     TaskDesk server URL
  TASKDESK_TOKEN   Bearer token (overrides the keyring)")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// TaskDesk server URL (overrides the configuration file)
    #[arg(long, global = true, env = "TASKDESK_URL")]
    pub server: Option<String>,

    /// Bearer token for authentication
    #[arg(long, global = true, env = "TASKDESK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign out and inspect the session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configuration management (show, set)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage users (admin only)
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// View and edit your own profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

impl Commands {
    /// The browser owns the terminal, so its logs go to a file.
    pub fn is_fullscreen(&self) -> bool {
        matches!(
            self,
            Commands::Task {
                command: TaskCommands::Browse(_)
            }
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with email and password; the token is saved to the keyring
    Login {
        #[arg(long, env = "TASKDESK_EMAIL")]
        email: Option<String>,
    },
    /// Remove the saved token
    Logout,
    /// Show where the token comes from, optionally checking it with the server
    Status {
        #[arg(long)]
        verify: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set configuration values
    #[command(after_help = "Examples:
  taskdesk config set --url http://localhost:5000
  taskdesk config set --page-size 25 --cache-expiry 120")]
    Set {
        /// TaskDesk server URL
        #[arg(long)]
        url: Option<String>,
        /// Rows per page
        #[arg(long)]
        page_size: Option<usize>,
        /// Seconds before the browser refetches
        #[arg(long)]
        cache_expiry: Option<u64>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// Display only these columns (comma-separated keys)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long = "type")]
    pub task_type: Option<TaskType>,
    /// Assignee user id
    #[arg(long)]
    pub assigned_to: Option<String>,
    /// Server-side sort field (e.g. dueDate, createdAt, priority)
    #[arg(long)]
    pub sort_by: Option<String>,
    #[arg(long, value_enum)]
    pub sort_order: Option<SortOrder>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long = "type")]
    pub task_type: Option<TaskType>,
    /// Assignee user id
    #[arg(long)]
    pub assigned_to: Option<String>,
    /// Due date as YYYY-MM-DD
    #[arg(long, value_parser = parse_due_date)]
    pub due: Option<DateTime<Utc>>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BrowseArgs {
    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Initial search text
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks
    #[command(after_help = "Examples:
  taskdesk task list --status \"In Progress\" --priority High
  taskdesk task list --search login --format json
  taskdesk task list --columns taskId,title,status")]
    List(TaskListArgs),
    /// Show one task with its comments
    Show {
        id: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Create a task
    Create(TaskFields),
    /// Update fields of a task
    Update {
        id: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Add a comment to a task
    Comment { id: String, text: String },
    /// Interactive table browser with search, filters, sorting and row actions
    Browse(BrowseArgs),
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Show one user
    Show {
        id: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Create a user; the password is prompted
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Update a user
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<UserRole>,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },
    /// Delete a user
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show your profile
    Show,
    /// Change your name or email
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change your password (prompted)
    Password,
    /// Upload a profile picture (JPEG, PNG, GIF or WebP)
    UploadPicture { path: std::path::PathBuf },
    /// Remove your profile picture
    DeletePicture,
}

/// Parse `YYYY-MM-DD` (or a full RFC 3339 timestamp) into a UTC instant.
pub fn parse_due_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD", value))
}
