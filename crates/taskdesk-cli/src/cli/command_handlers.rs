use crate::cli::input::{confirm, prompt_line, prompt_new_password, prompt_password};
use crate::cli::main_types::{
    AuthCommands, ConfigCommands, ListArgs, OutputFormat, ProfileCommands, TaskCommands,
    TaskFields, TaskListArgs, UserCommands,
};
use serde::Serialize;
use std::path::PathBuf;
use taskdesk_core::api::client::TaskDeskClient;
use taskdesk_core::api::models::{ProfileUpdate, TaskInput, UserInput};
use taskdesk_core::core::records::{task_columns, user_columns};
use taskdesk_core::core::services::auth_service::AuthService;
use taskdesk_core::core::services::config_service::ConfigService;
use taskdesk_core::core::services::profile_service::ProfileService;
use taskdesk_core::core::services::task_service::TaskService;
use taskdesk_core::core::services::traits::{
    CreateService, DeleteService, GetService, UpdateService,
};
use taskdesk_core::core::services::types::ListParams;
use taskdesk_core::core::services::user_service::UserService;
use taskdesk_core::display::{OperationStatus, ProgressSpinner, TableDisplay, display_status};
use taskdesk_core::error::{AppError, CliError};
use taskdesk_core::storage::config::Config;
use taskdesk_core::storage::credentials::load_token;
use taskdesk_core::table::{ColumnDescriptor, Record};

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::Cli(CliError::InvalidArguments(format!(
            "Failed to serialize output to JSON: {}",
            e
        )))
    })?;
    println!("{}", output);
    Ok(())
}

/// Columns named by `keys` in that order, or all columns when `keys` is empty.
pub fn select_columns<'c, R>(
    columns: &'c [ColumnDescriptor<R>],
    keys: &[String],
) -> Result<Vec<&'c ColumnDescriptor<R>>, AppError> {
    if keys.is_empty() {
        return Ok(columns.iter().collect());
    }
    keys.iter()
        .map(|key| {
            columns.iter().find(|c| &c.key == key).ok_or_else(|| {
                let available: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
                AppError::Cli(CliError::InvalidArguments(format!(
                    "Unknown column '{}'. Available: {}",
                    key,
                    available.join(", ")
                )))
            })
        })
        .collect()
}

fn list_params(list: &ListArgs, default_limit: usize) -> ListParams {
    let limit = list.limit.unwrap_or(default_limit as u32).max(1);
    let mut params = ListParams::default().with_page(list.page.max(1), limit);
    if let Some(search) = list.search.clone() {
        params = params.with_search(search);
    }
    params
}

fn render_rows<R: Record>(
    columns: &[ColumnDescriptor<R>],
    keys: &[String],
    rows: &[R],
) -> Result<String, AppError> {
    let selected = select_columns(columns, keys)?;
    let refs: Vec<&R> = rows.iter().collect();
    Ok(TableDisplay::new().render_records(&selected, &refs))
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        config_path: Option<PathBuf>,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                println!("Current Configuration:");
                println!("=====================");
                match config_path.map(Ok).unwrap_or_else(Config::config_file_path) {
                    Ok(path) => println!("File: {}", path.display()),
                    Err(e) => println!("File: ⚠️ Unavailable ({})", e),
                }
                match config_service.get_url() {
                    Some(url) => println!("URL: {}", url),
                    None => println!("URL: ❌ Not set"),
                }
                println!("Page size: {}", config_service.page_size());
                println!("Cache expiry: {}s", config_service.cache_expiry().as_secs());

                match load_token() {
                    Ok(Some((_, source))) => println!("Token: ✅ Set ({})", source.label()),
                    Ok(None) => println!("Token: ❌ Not set"),
                    Err(e) => println!("Token: ⚠️ Unavailable ({})", e),
                }
                Ok(())
            }
            ConfigCommands::Set {
                url,
                page_size,
                cache_expiry,
            } => {
                log::debug!(
                    "config set url={:?} page_size={:?} cache_expiry={:?}",
                    url,
                    page_size,
                    cache_expiry
                );
                let mut updated_fields = Vec::new();

                if let Some(url) = url {
                    config_service.set_url(url)?;
                    updated_fields.push(format!(
                        "URL to: {}",
                        config_service.get_url().unwrap_or_default()
                    ));
                }
                if let Some(page_size) = page_size {
                    config_service.set_page_size(page_size)?;
                    updated_fields.push(format!("page size to: {}", page_size));
                }
                if let Some(secs) = cache_expiry {
                    config_service.set_cache_expiry_secs(secs);
                    updated_fields.push(format!("cache expiry to: {}s", secs));
                }

                if updated_fields.is_empty() {
                    return Err(AppError::Cli(CliError::InvalidArguments(
                        "No configuration values provided. Use --url, --page-size or --cache-expiry"
                            .to_string(),
                    )));
                }

                config_service.save_config(config_path)?;
                println!("✅ Set {}", updated_fields.join(", "));
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct AuthHandler;

impl AuthHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: AuthCommands, client: TaskDeskClient) -> Result<(), AppError> {
        let mut service = AuthService::new(client);
        match command {
            AuthCommands::Login { email } => {
                let email = match email {
                    Some(email) => {
                        println!("Using email: {}", email);
                        email
                    }
                    None => prompt_line("Email: ")?,
                };
                let password = prompt_password("Password: ")?;

                let mut spinner = ProgressSpinner::new("Signing in...");
                spinner.start();
                let user = service.login(&email, &password).await?;
                spinner.stop(Some("✅ Login successful"));

                println!("Logged in as {} ({})", user.name, user.email);
                if user.is_admin() {
                    println!("Role: admin");
                }
                Ok(())
            }
            AuthCommands::Logout => {
                service.logout()?;
                display_status("Logged out", OperationStatus::Success);
                Ok(())
            }
            AuthCommands::Status { verify } => {
                let status = service.status()?;
                println!("Authentication Status:");
                println!("=====================");
                if let Some(url) = &status.server_url {
                    println!("Server: {}", url);
                }
                match status.token_source {
                    Some(source) => println!("Token: ✅ {}", source.label()),
                    None => println!("Token: ❌ Not logged in"),
                }

                if verify && status.is_authenticated {
                    let mut spinner = ProgressSpinner::new("Verifying session...");
                    spinner.start();
                    match service.verify().await {
                        Ok(user) => {
                            spinner.stop(Some("✅ Session is valid"));
                            println!("User: {} <{}> ({})", user.name, user.email, user.role);
                        }
                        Err(e) => {
                            spinner.stop(Some("❌ Session check failed"));
                            return Err(e);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

pub struct TaskHandler {
    page_size: usize,
}

impl TaskHandler {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    fn list_params(&self, args: &TaskListArgs) -> ListParams {
        let mut params = list_params(&args.list, self.page_size);
        let filters = [
            ("status", args.status.map(|s| s.as_str().to_string())),
            ("priority", args.priority.map(|p| p.as_str().to_string())),
            ("type", args.task_type.map(|t| t.as_str().to_string())),
            ("assignedTo", args.assigned_to.clone()),
        ];
        for (key, value) in filters {
            if let Some(value) = value {
                params = params.with_filter(key, value);
            }
        }
        if let Some(sort_by) = args.sort_by.clone() {
            let order = args.sort_order.map(|o| o.as_str()).unwrap_or("asc");
            params = params.with_sort(sort_by, order);
        }
        params
    }

    pub fn task_input(fields: TaskFields) -> TaskInput {
        TaskInput {
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            task_type: fields.task_type,
            assigned_to: fields.assigned_to,
            due_date: fields.due,
        }
    }

    pub async fn handle(&self, command: TaskCommands, client: TaskDeskClient) -> Result<(), AppError> {
        let service = TaskService::new(client);
        let display = TableDisplay::new();

        match command {
            TaskCommands::List(args) => {
                let params = self.list_params(&args);
                log::debug!("listing tasks with {:?}", params);

                let mut spinner = ProgressSpinner::new("Fetching tasks...");
                spinner.start();
                let page = service.list_page(params).await?;
                spinner.stop(None);

                match args.list.format {
                    OutputFormat::Json => print_json(&page.tasks),
                    OutputFormat::Table => {
                        println!("{}", render_rows(&task_columns(), &args.list.columns, &page.tasks)?);
                        println!("{}", display.render_page_footer(&page.pagination));
                        Ok(())
                    }
                }
            }
            TaskCommands::Show { id, format } => {
                let task = service.get(&id).await?;
                match format {
                    OutputFormat::Json => print_json(&task),
                    OutputFormat::Table => {
                        println!("{}", display.render_task_detail(&task));
                        Ok(())
                    }
                }
            }
            TaskCommands::Create(fields) => {
                let mut spinner = ProgressSpinner::new("Creating task...");
                spinner.start();
                let task = service.create(Self::task_input(fields)).await?;
                spinner.stop(Some(format!("✅ Created {}", task.display_id()).as_str()));
                println!("{}", display.render_task_detail(&task));
                Ok(())
            }
            TaskCommands::Update { id, fields } => {
                let task = service.update(&id, Self::task_input(fields)).await?;
                display_status(
                    &format!("Updated {}", task.display_id()),
                    OperationStatus::Success,
                );
                println!("{}", display.render_task_detail(&task));
                Ok(())
            }
            TaskCommands::Delete { id, yes } => {
                if !confirm(&format!("Delete task {}?", id), yes)? {
                    display_status("Delete cancelled", OperationStatus::Warning);
                    return Ok(());
                }
                service.delete(&id).await?;
                display_status(&format!("Deleted task {}", id), OperationStatus::Success);
                Ok(())
            }
            TaskCommands::Comment { id, text } => {
                let task = service.add_comment(&id, &text).await?;
                display_status(
                    &format!("Comment added to {}", task.display_id()),
                    OperationStatus::Success,
                );
                Ok(())
            }
            TaskCommands::Browse(_) => Err(AppError::Cli(CliError::InvalidArguments(
                "The browser is started by the dispatcher".to_string(),
            ))),
        }
    }
}

pub struct UserHandler {
    page_size: usize,
}

impl UserHandler {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub async fn handle(&self, command: UserCommands, client: TaskDeskClient) -> Result<(), AppError> {
        let service = UserService::new(client);
        let display = TableDisplay::new();

        match command {
            UserCommands::List { list, role } => {
                let mut params = list_params(&list, self.page_size);
                if let Some(role) = role {
                    params = params.with_filter("role", role.as_str());
                }

                let mut spinner = ProgressSpinner::new("Fetching users...");
                spinner.start();
                let page = service.list_page(params).await?;
                spinner.stop(None);

                match list.format {
                    OutputFormat::Json => print_json(&page.users),
                    OutputFormat::Table => {
                        println!("{}", render_rows(&user_columns(), &list.columns, &page.users)?);
                        if let Some(pagination) = &page.pagination {
                            println!("{}", display.render_page_footer(pagination));
                        }
                        Ok(())
                    }
                }
            }
            UserCommands::Show { id, format } => {
                let user = service.get(&id).await?;
                match format {
                    OutputFormat::Json => print_json(&user),
                    OutputFormat::Table => {
                        println!("{}", display.render_user_detail(&user));
                        Ok(())
                    }
                }
            }
            UserCommands::Create { name, email, role } => {
                let password = prompt_new_password()?;
                let input = UserInput {
                    name: Some(name),
                    email: Some(email),
                    password: Some(password),
                    role,
                };
                let user = service.create(input).await?;
                display_status(
                    &format!("Created user {}", user.display_id()),
                    OperationStatus::Success,
                );
                println!("{}", display.render_user_detail(&user));
                Ok(())
            }
            UserCommands::Update {
                id,
                name,
                email,
                role,
                password,
            } => {
                let password = if password {
                    Some(prompt_new_password()?)
                } else {
                    None
                };
                let input = UserInput {
                    name,
                    email,
                    password,
                    role,
                };
                let user = service.update(&id, input).await?;
                display_status(
                    &format!("Updated user {}", user.display_id()),
                    OperationStatus::Success,
                );
                Ok(())
            }
            UserCommands::Delete { id, yes } => {
                if !confirm(&format!("Delete user {}?", id), yes)? {
                    display_status("Delete cancelled", OperationStatus::Warning);
                    return Ok(());
                }
                service.delete(&id).await?;
                display_status(&format!("Deleted user {}", id), OperationStatus::Success);
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct ProfileHandler;

impl ProfileHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        command: ProfileCommands,
        client: TaskDeskClient,
    ) -> Result<(), AppError> {
        let service = ProfileService::new(client);
        let display = TableDisplay::new();

        match command {
            ProfileCommands::Show => {
                let user = service.get().await?;
                println!("{}", display.render_user_detail(&user));
                Ok(())
            }
            ProfileCommands::Edit { name, email } => {
                let user = service.update(ProfileUpdate { name, email }).await?;
                display_status("Profile updated", OperationStatus::Success);
                println!("{}", display.render_user_detail(&user));
                Ok(())
            }
            ProfileCommands::Password => {
                let current = prompt_password("Current password: ")?;
                let new = prompt_new_password()?;
                let message = service.change_password(&current, &new).await?;
                let message = if message.is_empty() {
                    "Password changed".to_string()
                } else {
                    message
                };
                display_status(&message, OperationStatus::Success);
                Ok(())
            }
            ProfileCommands::UploadPicture { path } => {
                let mut spinner = ProgressSpinner::new("Uploading picture...");
                spinner.start();
                let user = service.upload_picture(&path).await?;
                spinner.stop(Some("✅ Picture uploaded"));
                if let Some(avatar) = user.avatar {
                    println!("Avatar: {}", avatar);
                }
                Ok(())
            }
            ProfileCommands::DeletePicture => {
                if !confirm("Remove your profile picture?", false)? {
                    return Ok(());
                }
                let message = service.delete_picture().await?;
                let message = if message.is_empty() {
                    "Picture removed".to_string()
                } else {
                    message
                };
                display_status(&message, OperationStatus::Success);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdesk_core::api::models::{TaskPriority, TaskStatus};

    #[test]
    fn test_select_columns_by_key() {
        let columns = task_columns();
        let keys = vec!["title".to_string(), "taskId".to_string()];
        let selected = select_columns(&columns, &keys).expect("known keys");
        let titles: Vec<&str> = selected.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Title", "Task"]);

        let all = select_columns(&columns, &[]).expect("all");
        assert_eq!(all.len(), columns.len());
    }

    #[test]
    fn test_select_unknown_column() {
        let columns = user_columns();
        let error = select_columns(&columns, &["nope".to_string()]).expect_err("unknown");
        assert!(error.to_string().contains("nope"));
    }

    #[test]
    fn test_task_list_params() {
        let args = TaskListArgs {
            list: ListArgs {
                search: Some("login".to_string()),
                page: 2,
                ..ListArgs::default()
            },
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            sort_by: Some("dueDate".to_string()),
            ..TaskListArgs::default()
        };
        let params = TaskHandler::new(25).list_params(&args);
        assert_eq!(params.page, Some(2));
        assert_eq!(params.limit, Some(25));
        assert_eq!(params.filter("status"), Some("In Progress".to_string()));
        assert_eq!(params.filter("priority"), Some("High".to_string()));
        assert_eq!(params.sort_order.as_deref(), Some("asc"));
    }

    #[test]
    fn test_task_input_from_fields() {
        let fields = TaskFields {
            title: Some("Fix login".to_string()),
            status: Some(TaskStatus::Todo),
            ..TaskFields::default()
        };
        let input = TaskHandler::task_input(fields);
        assert_eq!(input.title.as_deref(), Some("Fix login"));
        assert_eq!(input.status, Some(TaskStatus::Todo));
        assert!(input.priority.is_none());
    }
}
