use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Custom deserializer: a user reference is either a bare id or a populated user object
fn deserialize_user_ref<'de, D>(deserializer: D) -> Result<Option<UserRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(user_ref_from_value(value))
}

fn user_ref_from_value(value: Value) -> Option<UserRef> {
    match value {
        Value::String(id) if !id.is_empty() => Some(UserRef {
            id,
            name: None,
            email: None,
        }),
        Value::Object(fields) => {
            let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
            Some(UserRef {
                id: text("_id").or_else(|| text("id"))?,
                name: text("name"),
                email: text("email"),
            })
        }
        _ => None,
    }
}

/// Error raised when parsing an enum value from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}', expected one of: {}",
            self.kind,
            self.value,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for ParseEnumError {}

/// Wire-string enums: serde names, `as_str`, case-insensitive `FromStr`.
macro_rules! wire_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
                $name::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str().to_lowercase() == wanted)
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $name::VALUES,
                    })
            }
        }
    };
}

wire_enum!(TaskStatus, "status", {
    Todo => "Todo",
    InProgress => "In Progress",
    Done => "Done",
});

wire_enum!(TaskPriority, "priority", {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

wire_enum!(TaskType, "type", {
    Bug => "Bug",
    Feature => "Feature",
    Documentation => "Documentation",
    Improvement => "Improvement",
});

wire_enum!(UserRole, "role", {
    User => "user",
    Admin => "admin",
});

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Feature
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

/// A user as embedded in another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserRef {
    /// Name, then email, then the short display id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| user_display_id(&self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default, deserialize_with = "deserialize_user_ref")]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    /// Server-generated `TSK-XXXX` identifier.
    #[serde(default)]
    pub task_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default, deserialize_with = "deserialize_user_ref")]
    pub assigned_to: Option<UserRef>,
    #[serde(default, deserialize_with = "deserialize_user_ref")]
    pub created_by: Option<UserRef>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// `TSK-XXXX` when the server assigned one, otherwise the raw id.
    pub fn display_id(&self) -> &str {
        self.task_id.as_deref().unwrap_or(&self.id)
    }

    pub fn assignee_name(&self) -> Option<String> {
        self.assigned_to.as_ref().map(UserRef::display_name)
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Done && self.due_date.is_some_and(|due| due < now)
    }
}

/// `USR-` followed by the last six characters of `id`, uppercased.
pub fn user_display_id(id: &str) -> String {
    let start = id
        .char_indices()
        .rev()
        .nth(5)
        .map(|(index, _)| index)
        .unwrap_or(0);
    format!("USR-{}", id[start..].to_uppercase())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_id(&self) -> String {
        user_display_id(&self.id)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub pagination: Option<Pagination>,
}

// Authentication models
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

/// Query for `GET /api/tasks`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub task_type: Option<String>,
    pub search: Option<String>,
    pub assigned_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl TaskQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        [
            ("page", self.page.map(|p| p.to_string())),
            ("limit", self.limit.map(|l| l.to_string())),
            ("status", self.status.clone()),
            ("priority", self.priority.clone()),
            ("type", self.task_type.clone()),
            ("search", self.search.clone()),
            ("assignedTo", self.assigned_to.clone()),
            ("sortBy", self.sort_by.clone()),
            ("sortOrder", self.sort_order.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
    }
}

/// Query for `GET /api/admin/users`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub role: Option<String>,
}

impl UserQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        [
            ("page", self.page.map(|p| p.to_string())),
            ("limit", self.limit.map(|l| l.to_string())),
            ("search", self.search.clone()),
            ("role", self.role.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
    }
}

/// Body for task create and update. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskInput {
    pub fn is_empty(&self) -> bool {
        *self == TaskInput::default()
    }

    /// Input that recreates `task` as a new record.
    pub fn duplicate_of(task: &Task) -> Self {
        Self {
            title: Some(format!("{} (copy)", task.title)),
            description: task.description.clone(),
            status: Some(TaskStatus::Todo),
            priority: Some(task.priority),
            task_type: Some(task.task_type),
            assigned_to: task.assigned_to.as_ref().map(|user| user.id.clone()),
            due_date: task.due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentInput {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_deserializes_populated_and_bare_user_refs() {
        let task: Task = serde_json::from_value(json!({
            "_id": "665f1c2e9b1d8a0012ab34cd",
            "taskId": "TSK-0042",
            "title": "Fix login",
            "status": "In Progress",
            "priority": "High",
            "type": "Bug",
            "assignedTo": {"_id": "u1", "name": "Ada", "email": "ada@example.com"},
            "createdBy": "u2",
            "dueDate": "2024-06-01T00:00:00.000Z",
            "comments": [{"text": "on it", "user": "u1"}]
        }))
        .expect("task should deserialize");

        assert_eq!(task.display_id(), "TSK-0042");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assignee_name().as_deref(), Some("Ada"));
        assert_eq!(task.created_by.as_ref().map(|u| u.id.as_str()), Some("u2"));
        assert_eq!(task.comments[0].user.as_ref().map(|u| u.id.as_str()), Some("u1"));
    }

    #[test]
    fn test_task_tolerates_missing_optional_fields() {
        let task: Task = serde_json::from_value(json!({
            "_id": "abc",
            "title": "Minimal",
            "status": "Todo",
            "priority": "Low",
            "assignedTo": null
        }))
        .expect("minimal task");
        assert_eq!(task.display_id(), "abc");
        assert_eq!(task.task_type, TaskType::Feature);
        assert!(task.assigned_to.is_none());
        assert!(task.comments.is_empty());
    }

    #[test]
    fn test_user_display_id() {
        assert_eq!(user_display_id("665f1c2e9b1d8a0012ab34cd"), "USR-AB34CD");
        assert_eq!(user_display_id("abc"), "USR-ABC");
    }

    #[test]
    fn test_enum_parsing_is_forgiving() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("HIGH".parse::<TaskPriority>(), Ok(TaskPriority::High));
        assert_eq!("Admin".parse::<UserRole>(), Ok(UserRole::Admin));

        let error = "urgent".parse::<TaskPriority>().unwrap_err();
        assert!(error.to_string().contains("Low, Medium, High"));
    }

    #[test]
    fn test_task_input_skips_unset_fields() {
        let input = TaskInput {
            title: Some("New".to_string()),
            task_type: Some(TaskType::Bug),
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"title": "New", "type": "Bug", "status": "In Progress"})
        );
        assert!(TaskInput::default().is_empty());
    }

    #[test]
    fn test_task_query_pairs() {
        let query = TaskQuery {
            page: Some(1),
            status: Some("Todo".to_string()),
            search: Some(String::new()),
            sort_by: Some("dueDate".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.to_query(),
            vec![
                ("page", "1".to_string()),
                ("status", "Todo".to_string()),
                ("sortBy", "dueDate".to_string()),
            ]
        );
    }

    #[test]
    fn test_password_change_is_camel_case() {
        let body = PasswordChange {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"currentPassword": "old", "newPassword": "new"})
        );
    }
}
