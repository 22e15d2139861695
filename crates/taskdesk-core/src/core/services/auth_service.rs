use super::types::AuthStatus;
use crate::AppError;
use crate::api::client::TaskDeskClient;
use crate::api::models::User;
use crate::error::{ApiError, AuthError, CliError};
use crate::storage::credentials;
use crate::utils::validation::validate_email;

/// Login, logout and session inspection.
pub struct AuthService {
    client: TaskDeskClient,
}

impl AuthService {
    pub fn new(client: TaskDeskClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and save it to the keyring.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, AppError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(CliError::InvalidArguments("Password cannot be empty".to_string()).into());
        }

        let response = self
            .client
            .login(email, password)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized { .. } | ApiError::Validation { .. } => {
                    AppError::Auth(AuthError::InvalidCredentials)
                }
                other => other.into(),
            })?;

        credentials::store_token(&response.token)?;
        self.client.set_token(Some(response.token));
        log::info!("logged in as {}", response.user.email);
        Ok(response.user)
    }

    /// Forget the saved token.
    pub fn logout(&mut self) -> Result<(), AppError> {
        credentials::clear_token()?;
        self.client.set_token(None);
        if credentials::env_token().is_some() {
            log::warn!(
                "{} is still set and will keep authenticating requests",
                credentials::TOKEN_ENV
            );
        }
        Ok(())
    }

    pub fn status(&self) -> Result<AuthStatus, AppError> {
        let token = credentials::load_token()?;
        Ok(AuthStatus {
            is_authenticated: token.is_some(),
            token_source: token.map(|(_, source)| source),
            server_url: Some(self.client.base_url.clone()),
        })
    }

    /// Confirm the current token with the server.
    pub async fn verify(&self) -> Result<User, AppError> {
        if !self.client.is_authenticated() {
            return Err(AuthError::NotLoggedIn.into());
        }
        self.client.get_profile().await.map_err(|e| match e {
            ApiError::Unauthorized { .. } => AppError::Auth(AuthError::SessionInvalid),
            other => other.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(TaskDeskClient::new("http://localhost:5000".to_string()).unwrap())
    }

    #[tokio::test]
    async fn test_login_validates_input() {
        let mut service = service();
        assert!(matches!(
            service.login("nope", "secret").await,
            Err(AppError::Cli(CliError::InvalidArguments(_)))
        ));
        assert!(matches!(
            service.login("ada@example.test", "").await,
            Err(AppError::Cli(CliError::InvalidArguments(_)))
        ));
    }

    #[tokio::test]
    async fn test_verify_without_token() {
        let result = service().verify().await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::NotLoggedIn))));
    }

    #[test]
    fn test_status_reports_server() {
        let status = service().status().expect("status");
        assert_eq!(status.server_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(status.is_authenticated, status.token_source.is_some());
    }
}
