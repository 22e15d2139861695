use super::field_error;
use super::traits::{CreateService, DeleteService, GetService, ListService, UpdateService};
use super::types::ListParams;
use crate::api::client::TaskDeskClient;
use crate::api::models::{User, UserInput, UserPage, UserQuery};
use crate::error::ServiceError;
use crate::utils::validation::{validate_email, validate_password};
use async_trait::async_trait;

/// Admin user management against `/api/admin/users`.
pub struct UserService {
    client: TaskDeskClient,
}

impl UserService {
    pub fn new(client: TaskDeskClient) -> Self {
        Self { client }
    }

    pub fn query_for(params: &ListParams) -> UserQuery {
        UserQuery {
            page: params.page,
            limit: params.limit,
            search: params.non_empty_search(),
            role: params.filter("role"),
        }
    }

    pub async fn list_page(&self, params: ListParams) -> Result<UserPage, ServiceError> {
        Ok(self.client.list_users(&Self::query_for(&params)).await?)
    }

    fn validate(input: &UserInput) -> Result<(), ServiceError> {
        if input.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ServiceError::Validation {
                field: "name".to_string(),
                message: "Name cannot be empty".to_string(),
            });
        }
        if let Some(email) = input.email.as_deref() {
            validate_email(email).map_err(|e| field_error("email", e))?;
        }
        if let Some(password) = input.password.as_deref() {
            validate_password(password).map_err(|e| field_error("password", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ListService<User> for UserService {
    async fn list(&self, params: ListParams) -> Result<Vec<User>, ServiceError> {
        Ok(self.list_page(params).await?.users)
    }
}

#[async_trait]
impl GetService<User> for UserService {
    async fn get(&self, id: &str) -> Result<User, ServiceError> {
        Ok(self.client.get_user(id).await?)
    }
}

#[async_trait]
impl CreateService<User, UserInput> for UserService {
    async fn create(&self, input: UserInput) -> Result<User, ServiceError> {
        for (field, present) in [
            ("name", input.name.is_some()),
            ("email", input.email.is_some()),
            ("password", input.password.is_some()),
        ] {
            if !present {
                return Err(ServiceError::Validation {
                    field: field.to_string(),
                    message: "is required".to_string(),
                });
            }
        }
        Self::validate(&input)?;

        let user = self.client.create_user(&input).await?;
        log::info!("created user {}", user.display_id());
        Ok(user)
    }
}

#[async_trait]
impl UpdateService<User, UserInput> for UserService {
    async fn update(&self, id: &str, input: UserInput) -> Result<User, ServiceError> {
        if input == UserInput::default() {
            return Err(ServiceError::Validation {
                field: "user".to_string(),
                message: "Nothing to update".to_string(),
            });
        }
        Self::validate(&input)?;
        Ok(self.client.update_user(id, &input).await?)
    }
}

#[async_trait]
impl DeleteService for UserService {
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.client.delete_user(id).await?;
        log::info!("deleted user {}", id);
        Ok(())
    }
}
