//! Table bindings for the TaskDesk resources.
//!
//! Field keys match the server's JSON names so the same key drives
//! client-side filtering, sorting and the server query parameters.

use crate::api::models::{Task, User};
use crate::table::value::{CellValue, ColumnDescriptor, Record};
use crate::utils::text::format_date;
use chrono::{DateTime, Utc};

/// Keys a task exposes; every one of them participates in search.
const TASK_FIELDS: [&str; 13] = [
    "_id",
    "taskId",
    "title",
    "description",
    "status",
    "priority",
    "type",
    "assignedTo",
    "createdBy",
    "dueDate",
    "comments",
    "createdAt",
    "updatedAt",
];

const USER_FIELDS: [&str; 7] = [
    "_id",
    "displayId",
    "name",
    "email",
    "role",
    "avatar",
    "createdAt",
];

fn timestamp(value: Option<DateTime<Utc>>) -> CellValue {
    value.map(|dt| dt.to_rfc3339()).into()
}

fn all_fields<R: Record>(record: &R, keys: &[&str]) -> Vec<CellValue> {
    keys.iter().filter_map(|key| record.field(key)).collect()
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<CellValue> {
        let value = match key {
            "_id" | "id" => self.id.as_str().into(),
            "taskId" => self.display_id().into(),
            "title" => self.title.as_str().into(),
            "description" => self.description.clone().into(),
            "status" => self.status.as_str().into(),
            "priority" => self.priority.as_str().into(),
            "type" => self.task_type.as_str().into(),
            "assignedTo" => self.assignee_name().into(),
            "createdBy" => self.created_by.as_ref().map(|u| u.display_name()).into(),
            "dueDate" => timestamp(self.due_date),
            "comments" => CellValue::List(
                self.comments
                    .iter()
                    .map(|comment| comment.text.as_str().into())
                    .collect(),
            ),
            "createdAt" => timestamp(self.created_at),
            "updatedAt" => timestamp(self.updated_at),
            _ => return None,
        };
        Some(value)
    }

    fn values(&self) -> Vec<CellValue> {
        all_fields(self, &TASK_FIELDS)
    }
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<CellValue> {
        let value = match key {
            "_id" | "id" => self.id.as_str().into(),
            "displayId" => self.display_id().into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "role" => self.role.as_str().into(),
            "avatar" => self.avatar.clone().into(),
            "createdAt" => timestamp(self.created_at),
            _ => return None,
        };
        Some(value)
    }

    fn values(&self) -> Vec<CellValue> {
        all_fields(self, &USER_FIELDS)
    }
}

pub fn task_columns() -> Vec<ColumnDescriptor<Task>> {
    vec![
        ColumnDescriptor::new("taskId", "Task"),
        ColumnDescriptor::new("title", "Title"),
        ColumnDescriptor::new("status", "Status"),
        ColumnDescriptor::new("priority", "Priority"),
        ColumnDescriptor::new("type", "Type"),
        ColumnDescriptor::new("assignedTo", "Assignee")
            .with_render(|task| task.assignee_name().unwrap_or_else(|| "-".to_string())),
        ColumnDescriptor::new("dueDate", "Due")
            .with_render(|task| format_date(task.due_date)),
        ColumnDescriptor::new("comments", "Comments")
            .with_render(|task: &Task| task.comments.len().to_string())
            .unsortable(),
    ]
}

pub fn user_columns() -> Vec<ColumnDescriptor<User>> {
    vec![
        ColumnDescriptor::new("displayId", "ID"),
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("email", "Email"),
        ColumnDescriptor::new("role", "Role"),
        ColumnDescriptor::new("createdAt", "Joined")
            .with_render(|user| format_date(user.created_at)),
    ]
}
