use super::field_error;
use super::traits::{CreateService, DeleteService, GetService, ListService, UpdateService};
use super::types::ListParams;
use crate::api::client::TaskDeskClient;
use crate::api::models::{Task, TaskInput, TaskPage, TaskQuery};
use crate::error::ServiceError;
use crate::utils::retry::{RetryConfig, RetryExecutor};
use crate::utils::validation::validate_title;
use async_trait::async_trait;

/// Task operations against `/api/tasks`.
///
/// Creation is retried when the server reports a `TSK-XXXX` id collision
/// (`DUPLICATE_TASK_ID` with `retry: true`).
pub struct TaskService {
    client: TaskDeskClient,
    retry: RetryExecutor,
}

impl TaskService {
    pub fn new(client: TaskDeskClient) -> Self {
        Self {
            client,
            retry: RetryExecutor::new(RetryConfig::quick()),
        }
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry = RetryExecutor::new(config);
        self
    }

    /// Map generic list parameters onto the task endpoint's query.
    pub fn query_for(params: &ListParams) -> TaskQuery {
        TaskQuery {
            page: params.page,
            limit: params.limit,
            status: params.filter("status"),
            priority: params.filter("priority"),
            task_type: params.filter("type"),
            search: params.non_empty_search(),
            assigned_to: params.filter("assignedTo"),
            sort_by: params.sort_by.clone(),
            sort_order: params.sort_order.clone(),
        }
    }

    /// One page of tasks with the server's pagination summary.
    pub async fn list_page(&self, params: ListParams) -> Result<TaskPage, ServiceError> {
        let page = self.client.list_tasks(&Self::query_for(&params)).await?;
        log::debug!(
            "fetched {} tasks (page {}/{})",
            page.tasks.len(),
            page.pagination.page,
            page.pagination.pages
        );
        Ok(page)
    }

    pub async fn add_comment(&self, id: &str, text: &str) -> Result<Task, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::Validation {
                field: "text".to_string(),
                message: "Comment cannot be empty".to_string(),
            });
        }
        Ok(self.client.add_comment(id, text.trim()).await?)
    }

    /// Create a copy of `task` as a new `Todo` task.
    pub async fn duplicate(&self, task: &Task) -> Result<Task, ServiceError> {
        self.create(TaskInput::duplicate_of(task)).await
    }
}

#[async_trait]
impl ListService<Task> for TaskService {
    async fn list(&self, params: ListParams) -> Result<Vec<Task>, ServiceError> {
        Ok(self.list_page(params).await?.tasks)
    }
}

#[async_trait]
impl GetService<Task> for TaskService {
    async fn get(&self, id: &str) -> Result<Task, ServiceError> {
        Ok(self.client.get_task(id).await?)
    }
}

#[async_trait]
impl CreateService<Task, TaskInput> for TaskService {
    async fn create(&self, input: TaskInput) -> Result<Task, ServiceError> {
        let title = input.title.as_deref().unwrap_or_default();
        validate_title(title).map_err(|e| field_error("title", e))?;

        let task = self
            .retry
            .execute(|| self.client.create_task(&input))
            .await?;
        log::info!("created task {}", task.display_id());
        Ok(task)
    }
}

#[async_trait]
impl UpdateService<Task, TaskInput> for TaskService {
    async fn update(&self, id: &str, input: TaskInput) -> Result<Task, ServiceError> {
        if input.is_empty() {
            return Err(ServiceError::Validation {
                field: "task".to_string(),
                message: "Nothing to update".to_string(),
            });
        }
        if let Some(title) = input.title.as_deref() {
            validate_title(title).map_err(|e| field_error("title", e))?;
        }
        Ok(self.client.update_task(id, &input).await?)
    }
}

#[async_trait]
impl DeleteService for TaskService {
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.client.delete_task(id).await?;
        log::info!("deleted task {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TaskService {
        let client = TaskDeskClient::new("http://localhost:5000".to_string()).unwrap();
        TaskService::new(client)
    }

    #[test]
    fn test_query_for_maps_filters() {
        let params = ListParams::default()
            .with_page(3, 25)
            .with_search("login")
            .with_filter("status", "In Progress")
            .with_filter("type", "Bug")
            .with_filter("priority", "")
            .with_sort("dueDate", "desc");

        let query = TaskService::query_for(&params);
        assert_eq!(query.page, Some(3));
        assert_eq!(query.limit, Some(25));
        assert_eq!(query.search.as_deref(), Some("login"));
        assert_eq!(query.status.as_deref(), Some("In Progress"));
        assert_eq!(query.task_type.as_deref(), Some("Bug"));
        assert_eq!(query.priority, None);
        assert_eq!(query.sort_order.as_deref(), Some("desc"));
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let result = service().create(TaskInput::default()).await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation { ref field, .. }) if field == "title"
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_input() {
        let result = service().update("abc", TaskInput::default()).await;
        assert!(matches!(result, Err(ServiceError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_blank_comment_rejected() {
        let result = service().add_comment("abc", "   ").await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation { ref field, .. }) if field == "text"
        ));
    }
}
