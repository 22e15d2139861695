use crate::cli::command_handlers::{
    AuthHandler, ConfigHandler, ProfileHandler, TaskHandler, UserHandler,
};
use crate::cli::main_types::{Commands, TaskCommands};
use std::path::PathBuf;
use taskdesk_core::api::client::TaskDeskClient;
use taskdesk_core::core::services::config_service::ConfigService;
use taskdesk_core::error::{AppError, CliError};
use taskdesk_core::storage::config::Config;
use taskdesk_core::storage::credentials::load_token;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    server: Option<String>,
    token: Option<String>,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        server: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            config,
            config_path,
            server,
            token,
        }
    }

    // CLI argument > TASKDESK_URL > config file
    fn get_url(&self) -> Result<String, AppError> {
        self.server
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| self.config.get_url())
            .ok_or_else(|| {
                AppError::Cli(CliError::InvalidArguments(
                    "TaskDesk URL is not configured. Use 'taskdesk config set --url <url>' or set TASKDESK_URL".to_string(),
                ))
            })
    }

    // CLI argument (or TASKDESK_TOKEN) > keyring
    fn get_token(&self) -> Result<Option<String>, AppError> {
        if let Some(token) = self.token.clone().filter(|t| !t.is_empty()) {
            return Ok(Some(token));
        }
        Ok(load_token()?.map(|(token, _)| token))
    }

    fn create_client(&self) -> Result<TaskDeskClient, AppError> {
        let url = self.get_url()?;
        match self.get_token()? {
            Some(token) => {
                log::debug!("creating authenticated client for {}", url);
                Ok(TaskDeskClient::with_token(url, token)?)
            }
            None => {
                log::debug!("creating anonymous client for {}", url);
                Ok(TaskDeskClient::new(url)?)
            }
        }
    }

    fn create_authenticated_client(&self) -> Result<TaskDeskClient, AppError> {
        let client = self.create_client()?;
        if !client.is_authenticated() {
            return Err(AppError::Cli(CliError::AuthRequired {
                message: "You are not logged in".to_string(),
                hint: "Run 'taskdesk auth login' or set TASKDESK_TOKEN".to_string(),
            }));
        }
        Ok(client)
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Config { command } => {
                let mut config_service = ConfigService::new(self.config.clone());
                ConfigHandler::new()
                    .handle(command, &mut config_service, self.config_path.clone())
                    .await
            }
            Commands::Auth { command } => {
                let client = self.create_client()?;
                AuthHandler::new().handle(command, client).await
            }
            Commands::Task {
                command: TaskCommands::Browse(args),
            } => {
                let client = self.create_authenticated_client()?;
                crate::cli::browser::run(client, &self.config, args).await
            }
            Commands::Task { command } => {
                let client = self.create_authenticated_client()?;
                TaskHandler::new(self.config.page_size())
                    .handle(command, client)
                    .await
            }
            Commands::User { command } => {
                let client = self.create_authenticated_client()?;
                UserHandler::new(self.config.page_size())
                    .handle(command, client)
                    .await
            }
            Commands::Profile { command } => {
                let client = self.create_authenticated_client()?;
                ProfileHandler::new().handle(command, client).await
            }
        }
    }
}
