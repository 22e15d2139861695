use super::field_error;
use crate::AppError;
use crate::api::client::TaskDeskClient;
use crate::api::models::{PasswordChange, ProfileUpdate, User};
use crate::error::ServiceError;
use crate::utils::error_helpers::convert_file_error;
use crate::utils::validation::{validate_email, validate_password};
use std::fs;
use std::path::Path;

/// Largest avatar accepted by the server.
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

/// Image type for an avatar file, from its extension.
pub fn picture_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// The signed-in user's own profile.
pub struct ProfileService {
    client: TaskDeskClient,
}

impl ProfileService {
    pub fn new(client: TaskDeskClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<User, AppError> {
        Ok(self.client.get_profile().await?)
    }

    pub async fn update(&self, update: ProfileUpdate) -> Result<User, AppError> {
        if update == ProfileUpdate::default() {
            return Err(ServiceError::Validation {
                field: "profile".to_string(),
                message: "Nothing to update".to_string(),
            }
            .into());
        }
        if let Some(email) = update.email.as_deref() {
            validate_email(email).map_err(|e| field_error("email", e))?;
        }
        Ok(self.client.update_profile(&update).await?)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<String, AppError> {
        validate_password(new).map_err(|e| field_error("newPassword", e))?;
        if current == new {
            return Err(ServiceError::Validation {
                field: "newPassword".to_string(),
                message: "New password must differ from the current one".to_string(),
            }
            .into());
        }
        let change = PasswordChange {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        Ok(self.client.change_password(&change).await?)
    }

    /// Read an image from disk and upload it as the profile picture.
    pub async fn upload_picture(&self, path: &Path) -> Result<User, AppError> {
        let mime = picture_mime(path).ok_or_else(|| ServiceError::Validation {
            field: "avatar".to_string(),
            message: "Only JPEG, PNG, GIF and WebP images are supported".to_string(),
        })?;
        let bytes = fs::read(path).map_err(|e| convert_file_error(e, path))?;
        if bytes.len() > MAX_PICTURE_BYTES {
            return Err(ServiceError::Validation {
                field: "avatar".to_string(),
                message: "Image must be 5 MB or smaller".to_string(),
            }
            .into());
        }
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("avatar");

        log::debug!("uploading {} ({} bytes, {})", file_name, bytes.len(), mime);
        Ok(self.client.upload_picture(file_name, bytes, mime).await?)
    }

    pub async fn delete_picture(&self) -> Result<String, AppError> {
        Ok(self.client.delete_picture().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use std::path::PathBuf;

    fn service() -> ProfileService {
        ProfileService::new(TaskDeskClient::new("http://localhost:5000".to_string()).unwrap())
    }

    #[test]
    fn test_picture_mime() {
        assert_eq!(picture_mime(Path::new("me.JPG")), Some("image/jpeg"));
        assert_eq!(picture_mime(Path::new("me.png")), Some("image/png"));
        assert_eq!(picture_mime(Path::new("me.txt")), None);
        assert_eq!(picture_mime(Path::new("me")), None);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_type() {
        let result = service().upload_picture(Path::new("notes.txt")).await;
        assert!(matches!(
            result,
            Err(AppError::Service(ServiceError::Validation { .. }))
        ));
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let path = PathBuf::from("/nonexistent/taskdesk/avatar.png");
        let result = service().upload_picture(&path).await;
        assert!(matches!(
            result,
            Err(AppError::Storage(StorageError::FileIo { .. }))
        ));
    }

    #[tokio::test]
    async fn test_change_password_validation() {
        let short = service().change_password("oldpass", "123").await;
        assert!(short.is_err());

        let same = service().change_password("samepass", "samepass").await;
        assert!(matches!(
            same,
            Err(AppError::Service(ServiceError::Validation { .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let result = service().update(ProfileUpdate::default()).await;
        assert!(result.is_err());
    }
}
