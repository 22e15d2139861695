use crate::api::models::{
    CommentInput, LoginRequest, LoginResponse, Pagination, PasswordChange, ProfileUpdate, Task,
    TaskInput, TaskPage, TaskQuery, User, UserInput, UserPage, UserQuery,
};
use crate::error::ApiError;
use crate::utils::error_helpers::*;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("taskdesk/", env!("CARGO_PKG_VERSION"));

/// Every response body: `{ success, message?, ...payload }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

fn default_success() -> bool {
    true
}

/// Error body: `{ success: false, message, code?, retry? }`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    retry: bool,
}

/// Classify a non-success response.
pub fn classify_error(status: u16, body: &str, endpoint: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string()
        });
    let endpoint = endpoint.to_string();

    if parsed.retry {
        return ApiError::Retryable {
            code: parsed.code.unwrap_or_else(|| "RETRY".to_string()),
            endpoint,
            message,
        };
    }

    match status {
        400 => ApiError::Validation { endpoint, message },
        401 => ApiError::Unauthorized {
            status,
            endpoint,
            server_message: message,
        },
        403 => ApiError::Forbidden { endpoint, message },
        404 => ApiError::NotFound { endpoint, message },
        408 | 504 => ApiError::Timeout {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoint,
        },
        _ => ApiError::Http {
            status,
            endpoint,
            message,
        },
    }
}

/// Pull the first present key out of an envelope payload, or the whole payload if `keys` is empty.
fn take_payload<T: DeserializeOwned>(
    mut payload: Map<String, Value>,
    keys: &[&str],
    endpoint: &str,
) -> Result<T, ApiError> {
    let value = if keys.is_empty() {
        Value::Object(payload)
    } else {
        keys.iter()
            .find_map(|key| payload.remove(*key))
            .ok_or_else(|| ApiError::Http {
                status: 0,
                endpoint: endpoint.to_string(),
                message: format!("Response is missing '{}'", keys.join("' or '")),
            })?
    };
    serde_json::from_value(value).map_err(|e| convert_serde_error(e, endpoint))
}

#[derive(Debug, Clone)]
pub struct TaskDeskClient {
    client: Client,
    pub base_url: String,
    pub token: Option<String>,
}

impl TaskDeskClient {
    // Create base client with default settings
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init"))?;

        Ok(TaskDeskClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(base_url: String, token: String) -> Result<Self, ApiError> {
        let mut client = TaskDeskClient::new(base_url)?;
        client.token = Some(token);
        Ok(client)
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response, ApiError> {
        log::debug!("request {}", endpoint);
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                convert_timeout_error(endpoint, DEFAULT_TIMEOUT_SECS)
            } else {
                convert_request_error(e, endpoint)
            }
        })
    }

    /// Decode the envelope of any response, mapping failures to [`ApiError`].
    async fn handle_response(response: Response, endpoint: &str) -> Result<Envelope, ApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| convert_request_error(e, endpoint))?;

        if !status.is_success() {
            log::debug!("{} failed with {}", endpoint, status);
            return Err(classify_error(status.as_u16(), &body, endpoint));
        }

        let envelope: Envelope = if body.trim().is_empty() {
            Envelope {
                success: true,
                message: None,
                payload: Map::new(),
            }
        } else {
            serde_json::from_str(&body).map_err(|e| convert_serde_error(e, endpoint))?
        };

        if !envelope.success {
            return Err(classify_error(400, &body, endpoint));
        }
        Ok(envelope)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        keys: &[&str],
    ) -> Result<T, ApiError> {
        let response = self.send(request, endpoint).await?;
        let envelope = Self::handle_response(response, endpoint).await?;
        take_payload(envelope.payload, keys, endpoint)
    }

    /// Send a request whose payload is irrelevant; returns the server message.
    async fn call_message(&self, request: RequestBuilder, endpoint: &str) -> Result<String, ApiError> {
        let response = self.send(request, endpoint).await?;
        let envelope = Self::handle_response(response, endpoint).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    // === Authentication ===

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let endpoint = "/api/auth/login";
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call(self.build_request(Method::POST, endpoint).json(&body), endpoint, &[])
            .await
    }

    // === Tasks ===

    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage, ApiError> {
        let endpoint = "/api/tasks";
        let request = self
            .build_request(Method::GET, endpoint)
            .query(&query.to_query());
        let response = self.send(request, endpoint).await?;
        let mut envelope = Self::handle_response(response, endpoint).await?;

        let pagination = match envelope.payload.remove("pagination") {
            Some(value) => serde_json::from_value(value).map_err(|e| convert_serde_error(e, endpoint))?,
            None => Pagination::default(),
        };
        let tasks: Vec<Task> = take_payload(envelope.payload, &["tasks"], endpoint)?;
        Ok(TaskPage { tasks, pagination })
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        let endpoint = format!("/api/tasks/{}", id);
        self.call(self.build_request(Method::GET, &endpoint), &endpoint, &["task", "data"])
            .await
    }

    pub async fn create_task(&self, input: &TaskInput) -> Result<Task, ApiError> {
        let endpoint = "/api/tasks";
        self.call(
            self.build_request(Method::POST, endpoint).json(input),
            endpoint,
            &["task", "data"],
        )
        .await
    }

    pub async fn update_task(&self, id: &str, input: &TaskInput) -> Result<Task, ApiError> {
        let endpoint = format!("/api/tasks/{}", id);
        self.call(
            self.build_request(Method::PUT, &endpoint).json(input),
            &endpoint,
            &["task", "data"],
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let endpoint = format!("/api/tasks/{}", id);
        self.call_message(self.build_request(Method::DELETE, &endpoint), &endpoint)
            .await
            .map(|_| ())
    }

    pub async fn add_comment(&self, id: &str, text: &str) -> Result<Task, ApiError> {
        let endpoint = format!("/api/tasks/{}/comments", id);
        let body = CommentInput {
            text: text.to_string(),
        };
        self.call(
            self.build_request(Method::POST, &endpoint).json(&body),
            &endpoint,
            &["task", "data"],
        )
        .await
    }

    // === Users (admin) ===

    pub async fn list_users(&self, query: &UserQuery) -> Result<UserPage, ApiError> {
        let endpoint = "/api/admin/users";
        let request = self
            .build_request(Method::GET, endpoint)
            .query(&query.to_query());
        let response = self.send(request, endpoint).await?;
        let mut envelope = Self::handle_response(response, endpoint).await?;

        let pagination = envelope
            .payload
            .remove("pagination")
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| convert_serde_error(e, endpoint))?;
        let users: Vec<User> = take_payload(envelope.payload, &["users", "data"], endpoint)?;
        Ok(UserPage { users, pagination })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let endpoint = format!("/api/admin/users/{}", id);
        self.call(self.build_request(Method::GET, &endpoint), &endpoint, &["user", "data"])
            .await
    }

    pub async fn create_user(&self, input: &UserInput) -> Result<User, ApiError> {
        let endpoint = "/api/admin/users";
        self.call(
            self.build_request(Method::POST, endpoint).json(input),
            endpoint,
            &["user", "data"],
        )
        .await
    }

    pub async fn update_user(&self, id: &str, input: &UserInput) -> Result<User, ApiError> {
        let endpoint = format!("/api/admin/users/{}", id);
        self.call(
            self.build_request(Method::PUT, &endpoint).json(input),
            &endpoint,
            &["user", "data"],
        )
        .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let endpoint = format!("/api/admin/users/{}", id);
        self.call_message(self.build_request(Method::DELETE, &endpoint), &endpoint)
            .await
            .map(|_| ())
    }

    // === Profile ===

    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let endpoint = "/api/profile";
        self.call(self.build_request(Method::GET, endpoint), endpoint, &["user", "data"])
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let endpoint = "/api/profile/edit";
        self.call(
            self.build_request(Method::PUT, endpoint).json(update),
            endpoint,
            &["user", "data"],
        )
        .await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<String, ApiError> {
        let endpoint = "/api/profile/change-password";
        self.call_message(self.build_request(Method::POST, endpoint).json(change), endpoint)
            .await
    }

    /// Upload a profile picture as multipart field `avatar`.
    pub async fn upload_picture(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<User, ApiError> {
        let endpoint = "/api/profile/upload-picture";
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| convert_request_error(e, endpoint))?;
        let form = Form::new().part("avatar", part);
        self.call(
            self.build_request(Method::POST, endpoint).multipart(form),
            endpoint,
            &["user", "data"],
        )
        .await
    }

    pub async fn delete_picture(&self) -> Result<String, ApiError> {
        let endpoint = "/api/profile/delete-picture";
        self.call_message(self.build_request(Method::DELETE, endpoint), endpoint)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TaskDeskClient::new("http://example.test".to_string());
        assert!(client.is_ok());
    }

    #[test]
    fn test_not_authenticated_without_token() {
        let client =
            TaskDeskClient::new("http://example.test".to_string()).expect("client creation failed");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_build_request_with_token() {
        let client = TaskDeskClient::with_token(
            "http://example.test".to_string(),
            "jwt-123".to_string(),
        )
        .expect("client creation failed");

        let built = client
            .build_request(Method::GET, "/api/tasks")
            .build()
            .expect("Failed to build request");

        assert_eq!(built.url().as_str(), "http://example.test/api/tasks");
        assert_eq!(
            built.headers().get("authorization").unwrap().to_str().unwrap(),
            "Bearer jwt-123"
        );
    }

    #[test]
    fn test_build_request_without_auth() {
        let client =
            TaskDeskClient::new("http://example.test".to_string()).expect("client creation failed");
        let built = client
            .build_request(Method::GET, "/api/profile")
            .build()
            .expect("Failed to build request");
        assert!(built.headers().get("authorization").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let client = TaskDeskClient::new("http://example.test/".to_string())
            .expect("client creation failed");
        assert_eq!(client.base_url, "http://example.test");
    }

    #[test]
    fn test_classify_error_by_status() {
        let body = r#"{"success":false,"message":"Title is required"}"#;
        assert!(matches!(
            classify_error(400, body, "/api/tasks"),
            ApiError::Validation { ref message, .. } if message == "Title is required"
        ));
        assert!(matches!(classify_error(401, "", "/x"), ApiError::Unauthorized { .. }));
        assert!(matches!(classify_error(403, body, "/x"), ApiError::Forbidden { .. }));
        assert!(matches!(classify_error(404, body, "/x"), ApiError::NotFound { .. }));
        assert!(matches!(classify_error(504, "", "/x"), ApiError::Timeout { .. }));
        assert!(matches!(
            classify_error(500, "oops", "/x"),
            ApiError::Http { status: 500, ref message, .. } if message == "oops"
        ));
    }

    #[test]
    fn test_classify_retryable_duplicate_id() {
        let body = r#"{"success":false,"message":"Duplicate task ID","code":"DUPLICATE_TASK_ID","retry":true}"#;
        match classify_error(409, body, "/api/tasks") {
            ApiError::Retryable { code, .. } => assert_eq!(code, "DUPLICATE_TASK_ID"),
            other => panic!("expected Retryable, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_empty_body_uses_reason_phrase() {
        match classify_error(404, "", "/x") {
            ApiError::NotFound { message, .. } => assert_eq!(message, "Not Found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
