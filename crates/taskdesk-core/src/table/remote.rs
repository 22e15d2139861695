//! Asynchronous fetch/create/update/delete against a service, applied to a table.
//!
//! Every operation dispatches `OperationStarted`, awaits the service, then
//! dispatches exactly one of fulfilled, failed or discarded. When two requests
//! conflict, the one issued last wins: an older fetch, or an older
//! update/delete of the same record, is discarded when it completes late.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use super::state::{OperationKind, TableAction};
use super::store::{DataTable, TableStore};
use super::value::Record;
use crate::core::services::traits::{CreateService, DeleteService, ListService, UpdateService};
use crate::core::services::types::ListParams;
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing message (a toast in a graphical client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Routes notices to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => log::info!("{}", notice.message),
            NoticeLevel::Error => log::warn!("{}", notice.message),
        }
    }
}

/// How a remote operation ended, from the table's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    Applied(T),
    /// A later request of the same kind (or on the same record) was issued first.
    Superseded,
    Failed(String),
}

impl<T> Completion<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Completion::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Completion::Applied(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Sequencer {
    next: u64,
    fetch: u64,
    records: HashMap<String, u64>,
}

impl Sequencer {
    fn issue(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

pub struct RemoteTable<R, S, Svc> {
    table: DataTable<R, S>,
    service: Arc<Svc>,
    notifier: Arc<dyn Notifier>,
    sequencer: Arc<Mutex<Sequencer>>,
}

impl<R, S: Clone, Svc> Clone for RemoteTable<R, S, Svc> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            service: Arc::clone(&self.service),
            notifier: Arc::clone(&self.notifier),
            sequencer: Arc::clone(&self.sequencer),
        }
    }
}

impl<R: Record, S: TableStore<R>, Svc> RemoteTable<R, S, Svc> {
    pub fn new(table: DataTable<R, S>, service: Arc<Svc>) -> Self {
        Self {
            table,
            service,
            notifier: Arc::new(LogNotifier),
            sequencer: Arc::new(Mutex::new(Sequencer::default())),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn table(&self) -> &DataTable<R, S> {
        &self.table
    }

    pub fn service(&self) -> &Svc {
        &self.service
    }

    fn sequencer(&self) -> std::sync::MutexGuard<'_, Sequencer> {
        self.sequencer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_fetch(&self) -> u64 {
        let mut sequencer = self.sequencer();
        let ticket = sequencer.issue();
        sequencer.fetch = ticket;
        ticket
    }

    fn issue_for_record(&self, id: &str) -> u64 {
        let mut sequencer = self.sequencer();
        let ticket = sequencer.issue();
        sequencer.records.insert(id.to_string(), ticket);
        ticket
    }

    fn is_current_fetch(&self, ticket: u64) -> bool {
        self.sequencer().fetch == ticket
    }

    /// True if `ticket` is still the latest request on `id`; releases the slot when it is.
    fn settle_record(&self, id: &str, ticket: u64) -> bool {
        let mut sequencer = self.sequencer();
        if sequencer.records.get(id) == Some(&ticket) {
            sequencer.records.remove(id);
            true
        } else {
            false
        }
    }

    fn fail<T>(&self, kind: OperationKind, error: ServiceError) -> Completion<T> {
        let message = error.user_message();
        log::debug!("{} failed: {}", kind.label(), error);
        self.table.dispatch(TableAction::OperationFailed {
            kind,
            message: message.clone(),
        });
        self.notifier.notify(Notice::error(message.clone()));
        Completion::Failed(message)
    }

    fn discard<T>(&self, kind: OperationKind) -> Completion<T> {
        log::debug!("discarding superseded {} result", kind.label());
        self.table.dispatch(TableAction::OperationDiscarded(kind));
        Completion::Superseded
    }
}

impl<R: Record, S: TableStore<R>, Svc: ListService<R>> RemoteTable<R, S, Svc> {
    /// Replace the table's data with a fresh listing. Resolves to the record count.
    pub async fn fetch(&self, params: ListParams) -> Completion<usize> {
        let ticket = self.issue_fetch();
        self.table
            .dispatch(TableAction::OperationStarted(OperationKind::Fetch));

        let result = self.service.list(params).await;
        if !self.is_current_fetch(ticket) {
            return self.discard(OperationKind::Fetch);
        }
        match result {
            Ok(records) => {
                let count = records.len();
                self.table.dispatch(TableAction::FetchFulfilled {
                    records,
                    fetched_at: Utc::now(),
                });
                Completion::Applied(count)
            }
            Err(error) => self.fail(OperationKind::Fetch, error),
        }
    }

    /// Fetch only when the cached listing has expired. `None` means the cache was used.
    pub async fn fetch_if_stale(&self, params: ListParams) -> Option<Completion<usize>> {
        if self.table.is_cache_valid() {
            log::debug!("table cache still valid, skipping fetch");
            return None;
        }
        Some(self.fetch(params).await)
    }
}

impl<R: Record, S: TableStore<R>, Svc> RemoteTable<R, S, Svc> {
    /// Create a record on the server and insert it at the head of the table.
    pub async fn create<C>(&self, input: C) -> Completion<R>
    where
        Svc: CreateService<R, C>,
        C: Send + 'static,
    {
        self.table
            .dispatch(TableAction::OperationStarted(OperationKind::Create));
        match self.service.create(input).await {
            Ok(record) => {
                self.table
                    .dispatch(TableAction::CreateFulfilled(record.clone()));
                self.notifier.notify(Notice::success("Created successfully"));
                Completion::Applied(record)
            }
            Err(error) => self.fail(OperationKind::Create, error),
        }
    }

    pub async fn update<U>(&self, id: &str, input: U) -> Completion<R>
    where
        Svc: UpdateService<R, U>,
        U: Send + 'static,
    {
        let ticket = self.issue_for_record(id);
        self.table
            .dispatch(TableAction::OperationStarted(OperationKind::Update));

        let result = self.service.update(id, input).await;
        if !self.settle_record(id, ticket) {
            return self.discard(OperationKind::Update);
        }
        match result {
            Ok(record) => {
                self.table
                    .dispatch(TableAction::UpdateFulfilled(record.clone()));
                self.notifier.notify(Notice::success("Updated successfully"));
                Completion::Applied(record)
            }
            Err(error) => self.fail(OperationKind::Update, error),
        }
    }

    pub async fn delete(&self, id: &str) -> Completion<()>
    where
        Svc: DeleteService,
    {
        let ticket = self.issue_for_record(id);
        self.table
            .dispatch(TableAction::OperationStarted(OperationKind::Delete));

        let result = self.service.delete(id).await;
        if !self.settle_record(id, ticket) {
            return self.discard(OperationKind::Delete);
        }
        match result {
            Ok(()) => {
                self.table
                    .dispatch(TableAction::DeleteFulfilled(id.to_string()));
                self.notifier.notify(Notice::success("Deleted successfully"));
                Completion::Applied(())
            }
            Err(error) => self.fail(OperationKind::Delete, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::table::state::TableState;
    use crate::table::store::SharedStore;
    use crate::table::value::{ColumnDescriptor, JsonRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    fn record(id: &str, title: &str) -> JsonRecord {
        JsonRecord::from_value(json!({"id": id, "title": title})).expect("record")
    }

    /// Service whose latency is driven by the request so tests can force
    /// out-of-order completion.
    struct MockService;

    fn latency(tag: &str) -> Duration {
        if tag.contains("slow") {
            Duration::from_millis(200)
        } else {
            Duration::from_millis(10)
        }
    }

    #[async_trait]
    impl ListService<JsonRecord> for MockService {
        async fn list(&self, params: ListParams) -> Result<Vec<JsonRecord>, ServiceError> {
            let search = params.search.unwrap_or_default();
            tokio::time::sleep(latency(&search)).await;
            if search == "broken" {
                return Err(ApiError::Http {
                    status: 500,
                    endpoint: "/api/tasks".to_string(),
                    message: "boom".to_string(),
                }
                .into());
            }
            Ok(vec![record("1", &search), record("2", &search)])
        }
    }

    #[async_trait]
    impl CreateService<JsonRecord, String> for MockService {
        async fn create(&self, title: String) -> Result<JsonRecord, ServiceError> {
            Ok(record("new", &title))
        }
    }

    #[async_trait]
    impl UpdateService<JsonRecord, String> for MockService {
        async fn update(&self, id: &str, title: String) -> Result<JsonRecord, ServiceError> {
            tokio::time::sleep(latency(&title)).await;
            Ok(record(id, &title))
        }
    }

    #[async_trait]
    impl DeleteService for MockService {
        async fn delete(&self, id: &str) -> Result<(), ServiceError> {
            if id == "locked" {
                return Err(ApiError::Forbidden {
                    endpoint: format!("/api/tasks/{}", id),
                    message: "Not authorized to delete this task".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    fn remote(
        notifier: Arc<RecordingNotifier>,
    ) -> RemoteTable<JsonRecord, SharedStore<JsonRecord>, MockService> {
        let table = DataTable::shared(
            vec![ColumnDescriptor::new("id", "ID"), ColumnDescriptor::new("title", "Title")],
            TableState::new(),
        );
        RemoteTable::new(table, Arc::new(MockService)).with_notifier(notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_issued_fetch_wins() {
        let remote = remote(Arc::default());
        let (first, second) = tokio::join!(
            remote.fetch(ListParams::default().with_search("slow")),
            remote.fetch(ListParams::default().with_search("fast")),
        );
        assert_eq!(first, Completion::Superseded);
        assert_eq!(second, Completion::Applied(2));

        let titles: Vec<String> = remote
            .table()
            .data()
            .iter()
            .map(|r| r.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string())
            .collect();
        assert_eq!(titles, vec!["fast", "fast"]);
        assert!(!remote.table().is_loading());
        assert!(remote.table().is_cache_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_keeps_data_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let remote = remote(notifier.clone());
        remote.table().set_data(vec![record("9", "kept")]);

        let completion = remote
            .fetch(ListParams::default().with_search("broken"))
            .await;
        assert!(matches!(completion, Completion::Failed(_)));
        assert_eq!(remote.table().len(), 1);
        assert!(remote.table().error().is_some());
        assert!(!remote.table().is_loading());

        let notices = notifier.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_if_stale_uses_cache() {
        let remote = remote(Arc::default());
        assert!(remote.fetch_if_stale(ListParams::default()).await.is_some());
        assert!(remote.fetch_if_stale(ListParams::default()).await.is_none());
        remote.table().invalidate_cache();
        assert!(remote.fetch_if_stale(ListParams::default()).await.is_some());
    }

    #[tokio::test]
    async fn test_create_inserts_at_head() {
        let remote = remote(Arc::default());
        remote.table().set_data(vec![record("1", "old")]);
        let created = remote.create("fresh".to_string()).await;
        assert!(created.is_applied());
        assert_eq!(remote.table().data()[0].id(), "new");
        assert!(!remote.table().pending().any());
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_update_on_same_record_wins() {
        let remote = remote(Arc::default());
        remote.table().set_data(vec![record("1", "original")]);

        let (first, second) = tokio::join!(
            remote.update("1", "slow edit".to_string()),
            remote.update("1", "quick edit".to_string()),
        );
        assert_eq!(first, Completion::Superseded);
        assert!(second.is_applied());

        let current = remote.table().get("1").expect("record 1");
        assert_eq!(current.get("title"), Some(&json!("quick edit")));
        assert!(!remote.table().pending().any());
    }

    #[tokio::test]
    async fn test_delete_prunes_selection_and_reports_failure() {
        let notifier = Arc::new(RecordingNotifier::default());
        let remote = remote(notifier.clone());
        remote
            .table()
            .set_data(vec![record("1", "a"), record("locked", "b")]);
        remote.table().select_row("1");
        remote.table().select_row("locked");

        assert!(remote.delete("1").await.is_applied());
        assert!(!remote.table().is_selected("1"));

        let failed = remote.delete("locked").await;
        assert_eq!(
            failed,
            Completion::Failed("Not authorized to delete this task".to_string())
        );
        assert!(remote.table().get("locked").is_some());
        assert!(remote.table().is_selected("locked"));
        assert!(!remote.table().pending().any());
        assert_eq!(notifier.notices.lock().unwrap().len(), 2);
    }
}
