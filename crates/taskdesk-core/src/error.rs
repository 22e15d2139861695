use thiserror::Error;

/// Message shown to users in place of server-side failure details.
pub const GENERIC_SERVER_MESSAGE: &str = "Something went wrong on the server. Please try again.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("AuthError: {0}")]
    Auth(#[from] AuthError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
    #[error("ServiceError: {0}")]
    Service(#[from] ServiceError),
    #[error("UtilsError: {0}")]
    Utils(#[from] UtilsError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Authentication required")]
    AuthRequired { message: String, hint: String },
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Failures talking to the TaskDesk REST API, classified by HTTP semantics.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Authentication failed")]
    Unauthorized {
        status: u16,
        endpoint: String,
        server_message: String,
    },
    #[error("Validation failed: {message}")]
    Validation { endpoint: String, message: String },
    #[error("Forbidden: {message}")]
    Forbidden { endpoint: String, message: String },
    #[error("Not found: {message}")]
    NotFound { endpoint: String, message: String },
    /// The server asked the client to try the same request again.
    #[error("Retryable conflict ({code}): {message}")]
    Retryable {
        code: String,
        endpoint: String,
        message: String,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Timeout { .. } => None,
            ApiError::Http { status, .. } | ApiError::Unauthorized { status, .. } => Some(*status),
            ApiError::Validation { .. } => Some(400),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Retryable { .. } => Some(409),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Retryable { .. } | ApiError::Timeout { .. } => true,
            ApiError::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }

    /// Message safe to show in a notification. Server failures never leak details.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout { .. } => "The server did not respond in time.".to_string(),
            ApiError::Http { status, .. } if *status >= 500 || *status == 0 => {
                GENERIC_SERVER_MESSAGE.to_string()
            }
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Unauthorized { .. } => "Your session has expired. Please log in again.".to_string(),
            ApiError::Validation { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Retryable { message, .. } => message.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login failed: Invalid credentials")]
    InvalidCredentials,
    #[error("Session expired or invalid")]
    SessionInvalid,
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Login failed: {0}")]
    LoginFailed(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Keyring error: {0}")]
    KeyringError(String),
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Table formatting failed: {0}")]
    TableFormat(String),
    #[error("Terminal output error: {0}")]
    TerminalOutput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration field '{field}' is missing")]
    MissingField { field: String, hint: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },
    #[error("Not found: {resource_type} with ID {id}")]
    NotFound { resource_type: String, id: String },
}

impl ServiceError {
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Api(api) => api.user_message(),
            ServiceError::Validation { field, message } => format!("{}: {}", field, message),
            ServiceError::NotFound { resource_type, id } => {
                format!("{} {} was not found", resource_type, id)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("Validation error: {message}")]
    Validation { message: String },
    #[error("Input processing error: {message}")]
    InputProcessing { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => ErrorSeverity::High,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Auth(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
            AppError::Service(ServiceError::Api(api_error)) => {
                AppError::severity_of_api(api_error)
            }
            AppError::Service(_) => ErrorSeverity::Medium,
            AppError::Utils(_) => ErrorSeverity::Low,
        }
    }

    fn severity_of_api(error: &ApiError) -> ErrorSeverity {
        match error {
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => ErrorSeverity::High,
            ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Api(api) | AppError::Service(ServiceError::Api(api)) => api.is_retryable(),
            _ => false,
        }
    }

    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_string(),
            AppError::Auth(AuthError::SessionInvalid) => "Session expired or invalid".to_string(),
            AppError::Api(api) | AppError::Service(ServiceError::Api(api)) => api.user_message(),
            AppError::Service(service) => service.user_message(),
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Auth(_)
            | AppError::Api(ApiError::Unauthorized { .. })
            | AppError::Service(ServiceError::Api(ApiError::Unauthorized { .. })) => {
                Some("Run 'taskdesk auth login' and try again".to_string())
            }
            AppError::Api(ApiError::Forbidden { .. })
            | AppError::Service(ServiceError::Api(ApiError::Forbidden { .. })) => {
                Some("This action requires a different role or ownership".to_string())
            }
            AppError::Config(ConfigError::MissingField { hint, .. }) => Some(hint.clone()),
            AppError::Api(ApiError::Timeout { .. }) => {
                Some("Check your network connection and try again".to_string())
            }
            AppError::Api(ApiError::Retryable { .. })
            | AppError::Service(ServiceError::Api(ApiError::Retryable { .. })) => {
                Some("The request can be safely re-run".to_string())
            }
            _ => None,
        }
    }
}
