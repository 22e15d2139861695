//! Fullscreen task browser.
//!
//! Tasks are fetched once, up to [`FETCH_LIMIT`], into a shared table. Search,
//! filters, sort, selection and pagination then run client-side through the
//! table controllers, while create/update/delete go back to the server on
//! spawned tasks and land in the same table.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use tokio::task::JoinHandle;

use crate::cli::main_types::BrowseArgs;
use taskdesk_core::api::client::TaskDeskClient;
use taskdesk_core::api::models::{Task, TaskInput, TaskPriority, TaskStatus, TaskType};
use taskdesk_core::core::records::task_columns;
use taskdesk_core::core::services::task_service::TaskService;
use taskdesk_core::core::services::traits::ListService;
use taskdesk_core::core::services::types::ListParams;
use taskdesk_core::display::TableDisplay;
use taskdesk_core::error::AppError;
use taskdesk_core::storage::config::Config;
use taskdesk_core::table::controllers::{
    CustomAction, FilterDefinition, FilterDropdownController, FilterDropdownOptions, FilterOption,
    HeaderController, HeaderOptions, PageButton, PaginationController, PaginationOptions,
    RowActionsController, RowActionsOptions, ToolbarController, ToolbarOptions,
};
use taskdesk_core::table::{
    DataTable, Debouncer, Notice, NoticeLevel, Notifier, OperationKind, RemoteTable, SharedStore,
    TableState,
};
use taskdesk_core::utils::error_helpers::convert_io_to_display_error;

/// Most tasks loaded into the browser at once.
pub const FETCH_LIMIT: u32 = 100;

const TICK: Duration = Duration::from_millis(50);

type TaskTable = DataTable<Task, SharedStore<Task>>;
type Frame = Vec<(Option<Color>, String)>;

/// Server round trips requested by the key handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    View(Task),
    Create(TaskInput),
    Update(String, TaskInput),
    Delete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Search,
    /// Index into the header's filter definitions.
    Filter(usize),
    Columns,
    Actions,
    ConfirmDelete,
    ConfirmBulkDelete,
    NewTask,
    Detail,
}

pub fn next_status(status: TaskStatus) -> TaskStatus {
    match status {
        TaskStatus::Todo => TaskStatus::InProgress,
        TaskStatus::InProgress => TaskStatus::Done,
        TaskStatus::Done => TaskStatus::Todo,
    }
}

fn options_of(values: &[&str]) -> Vec<FilterOption> {
    values.iter().map(|value| FilterOption::plain(*value)).collect()
}

pub fn task_filters() -> Vec<FilterDefinition> {
    vec![
        FilterDefinition::new("status", "Status", options_of(TaskStatus::VALUES)),
        FilterDefinition::new("priority", "Priority", options_of(TaskPriority::VALUES)),
        FilterDefinition::new("type", "Type", options_of(TaskType::VALUES)),
    ]
}

pub fn format_page_buttons(buttons: &[PageButton]) -> String {
    buttons
        .iter()
        .map(|button| match button {
            PageButton::Page {
                number,
                current: true,
            } => format!("[{}]", number),
            PageButton::Page { number, .. } => number.to_string(),
            PageButton::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn row_mark(is_cursor: bool, is_selected: bool) -> String {
    format!(
        "{}{}",
        if is_cursor { "▶" } else { " " },
        if is_selected { "✓" } else { " " }
    )
}

fn fetch_params() -> ListParams {
    ListParams::default().with_page(1, FETCH_LIMIT)
}

fn terminal_error(operation: &'static str) -> impl Fn(io::Error) -> AppError {
    move |error| AppError::Display(convert_io_to_display_error(error, operation))
}

/// Keeps the most recent notice for the status line.
#[derive(Debug, Default)]
struct BrowserNotifier {
    latest: Mutex<Option<Notice>>,
}

impl BrowserNotifier {
    fn latest(&self) -> Option<Notice> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for BrowserNotifier {
    fn notify(&self, notice: Notice) {
        log::info!("{}", notice.message);
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice);
    }
}

/// Key handling and frame rendering over the table controllers.
pub struct Browser<'a> {
    table: &'a TaskTable,
    header: HeaderController<'a>,
    toolbar: ToolbarController<'a>,
    pagination: PaginationController<'a>,
    row_actions: RowActionsController<'a, Task>,
    dropdowns: Vec<FilterDropdownController<'a>>,
    intents: &'a RefCell<Vec<Intent>>,
    add_requested: &'a Cell<bool>,
    display: TableDisplay,
    mode: Mode,
    row: usize,
    menu: usize,
    input: String,
    sort_column: usize,
    detail: Option<Task>,
}

impl<'a> Browser<'a> {
    pub fn new(
        table: &'a TaskTable,
        intents: &'a RefCell<Vec<Intent>>,
        add_requested: &'a Cell<bool>,
    ) -> Self {
        let header = HeaderController::for_table_debounced(
            table,
            Debouncer::default(),
            HeaderOptions {
                search_placeholder: Some("Search tasks...".to_string()),
                filters: task_filters(),
                ..HeaderOptions::default()
            },
        );
        let dropdowns = header
            .config()
            .filters
            .iter()
            .map(|definition| {
                FilterDropdownController::for_table(
                    table,
                    &definition.key,
                    FilterDropdownOptions {
                        title: definition.title.clone(),
                        options: definition.options.clone(),
                        multi_select: Some(definition.multi_select),
                        ..FilterDropdownOptions::default()
                    },
                )
            })
            .collect();

        let toolbar = ToolbarController::for_table(
            table,
            ToolbarOptions {
                add_label: Some("New task".to_string()),
                ..ToolbarOptions::default()
            },
        )
        .with_on_add(move || add_requested.set(true));

        let row_actions = RowActionsController::for_table(
            table,
            RowActionsOptions::default()
                .on_view(move |task: &Task| intents.borrow_mut().push(Intent::View(task.clone())))
                .on_duplicate(move |task: &Task| {
                    intents
                        .borrow_mut()
                        .push(Intent::Create(TaskInput::duplicate_of(task)))
                })
                .on_delete(move |task: &Task| {
                    intents.borrow_mut().push(Intent::Delete(task.id.clone()))
                })
                .custom(CustomAction::new(
                    "advance",
                    "Advance status",
                    move |task: &Task| {
                        let input = TaskInput {
                            status: Some(next_status(task.status)),
                            ..TaskInput::default()
                        };
                        intents
                            .borrow_mut()
                            .push(Intent::Update(task.id.clone(), input));
                    },
                )),
        );

        Self {
            table,
            header,
            toolbar,
            pagination: PaginationController::for_table(table, PaginationOptions::default()),
            row_actions,
            dropdowns,
            intents,
            add_requested,
            display: TableDisplay::new(),
            mode: Mode::Normal,
            row: 0,
            menu: 0,
            input: String::new(),
            sort_column: 0,
            detail: None,
        }
    }

    fn page_rows(&self) -> Vec<Task> {
        self.table.page_rows()
    }

    fn current_task(&self) -> Option<Task> {
        let rows = self.page_rows();
        let index = self.row.min(rows.len().saturating_sub(1));
        rows.get(index).cloned()
    }

    fn move_row(&mut self, down: bool) {
        let count = self.page_rows().len();
        self.row = if down {
            (self.row + 1).min(count.saturating_sub(1))
        } else {
            self.row.saturating_sub(1)
        };
    }

    fn move_menu(&mut self, down: bool, len: usize) {
        self.menu = if down {
            (self.menu + 1).min(len.saturating_sub(1))
        } else {
            self.menu.saturating_sub(1)
        };
    }

    fn sortable_keys(&self) -> Vec<String> {
        self.table
            .visible_columns()
            .iter()
            .filter(|column| column.sortable)
            .map(|column| column.key.clone())
            .collect()
    }

    fn sort_key(&self) -> Option<String> {
        let keys = self.sortable_keys();
        if keys.is_empty() {
            return None;
        }
        keys.get(self.sort_column % keys.len()).cloned()
    }

    /// Drain pending intents; views are handled here, the rest are returned.
    pub fn take_remote_intents(&mut self) -> Vec<Intent> {
        let drained: Vec<Intent> = self.intents.borrow_mut().drain(..).collect();
        let mut remote = Vec::with_capacity(drained.len());
        for intent in drained {
            match intent {
                Intent::View(task) => {
                    self.detail = Some(task);
                    self.mode = Mode::Detail;
                }
                other => remote.push(other),
            }
        }
        remote
    }

    /// Apply one key press. Returns true when the browser should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.mode {
            Mode::Normal => return self.normal_key(key.code),
            Mode::Search => self.search_key(key.code),
            Mode::Filter(index) => self.filter_key(index, key.code),
            Mode::Columns => self.columns_key(key.code),
            Mode::Actions => self.actions_key(key.code),
            Mode::ConfirmDelete => self.confirm_delete_key(key.code),
            Mode::ConfirmBulkDelete => self.confirm_bulk_delete_key(key.code),
            Mode::NewTask => self.new_task_key(key.code),
            Mode::Detail => {
                self.detail = None;
                self.mode = Mode::Normal;
            }
        }
        false
    }

    fn normal_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_row(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_row(false),
            KeyCode::Right | KeyCode::Char('n') => {
                self.pagination.handlers().on_next();
                self.row = 0;
            }
            KeyCode::Left | KeyCode::Char('p') => {
                self.pagination.handlers().on_previous();
                self.row = 0;
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.pagination.handlers().on_first();
                self.row = 0;
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.pagination.handlers().on_last();
                self.row = 0;
            }
            KeyCode::Char('z') => {
                self.pagination.handlers().on_cycle_page_size();
                self.row = 0;
            }
            KeyCode::Char('/') => {
                self.input = self.header.getters().search_query;
                self.mode = Mode::Search;
            }
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let index = c.to_digit(10).map_or(0, |digit| digit as usize - 1);
                if let Some(dropdown) = self.dropdowns.get_mut(index) {
                    dropdown.handlers().on_toggle_open();
                    self.menu = 0;
                    self.mode = Mode::Filter(index);
                }
            }
            KeyCode::Char('o') => {
                let count = self.sortable_keys().len().max(1);
                self.sort_column = (self.sort_column + 1) % count;
            }
            KeyCode::Char('s') => {
                if let Some(key) = self.sort_key() {
                    self.table.toggle_sort(&key);
                }
            }
            KeyCode::Char('c') => {
                self.menu = 0;
                self.mode = Mode::Columns;
            }
            KeyCode::Enter => {
                if self.current_task().is_some() {
                    self.row_actions.handlers().on_toggle_menu();
                    self.menu = 0;
                    self.mode = Mode::Actions;
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(task) = self.current_task() {
                    self.table.select_row(task.id);
                }
            }
            KeyCode::Char('A') => self.table.select_all_rows(),
            KeyCode::Char('D') => {
                if !self.table.selected_ids().is_empty() {
                    self.mode = Mode::ConfirmBulkDelete;
                }
            }
            KeyCode::Char('R') => {
                self.header.handlers().on_reset();
                self.row = 0;
            }
            KeyCode::Char('r') => {
                self.table.clear_error();
                self.table.invalidate_cache();
            }
            KeyCode::Char('a') => {
                self.toolbar.handlers().on_add();
                if self.add_requested.replace(false) {
                    self.input.clear();
                    self.mode = Mode::NewTask;
                }
            }
            _ => {}
        }
        false
    }

    fn search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Esc => {
                self.input.clear();
                self.header.handlers().on_search_change("");
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.header.handlers().on_search_change(&self.input);
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.header.handlers().on_search_change(&self.input);
            }
            _ => return,
        }
        self.row = 0;
    }

    fn filter_key(&mut self, index: usize, code: KeyCode) {
        let Some(options) = self
            .dropdowns
            .get(index)
            .map(|dropdown| dropdown.getters().visible_options)
        else {
            self.mode = Mode::Normal;
            return;
        };
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_menu(true, options.len()),
            KeyCode::Up | KeyCode::Char('k') => self.move_menu(false, options.len()),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(option) = options.get(self.menu) {
                    self.dropdowns[index].handlers().on_select(&option.value);
                    self.row = 0;
                }
            }
            KeyCode::Char('c') => {
                self.dropdowns[index].handlers().on_clear();
                self.row = 0;
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.dropdowns[index].handlers().on_close();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn columns_key(&mut self, code: KeyCode) {
        let columns = self.toolbar.getters().columns;
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_menu(true, columns.len()),
            KeyCode::Up | KeyCode::Char('k') => self.move_menu(false, columns.len()),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(column) = columns.get(self.menu).filter(|column| !column.disabled) {
                    self.toolbar.handlers().on_toggle_column(&column.key);
                }
            }
            KeyCode::Char('a') => self.toolbar.handlers().on_show_all(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('c') => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn actions_key(&mut self, code: KeyCode) {
        let actions = self.row_actions.getters().actions;
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_menu(true, actions.len()),
            KeyCode::Up | KeyCode::Char('k') => self.move_menu(false, actions.len()),
            KeyCode::Enter => {
                if let (Some(item), Some(task)) = (actions.get(self.menu), self.current_task()) {
                    self.row_actions.handlers().on_action(&item.kind, &task);
                }
                self.mode = if self.row_actions.getters().confirming_delete {
                    Mode::ConfirmDelete
                } else {
                    Mode::Normal
                };
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.row_actions.handlers().on_close();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn confirm_delete_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.row_actions.handlers().on_confirm_delete();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.row_actions.handlers().on_cancel_delete();
            }
            _ => return,
        }
        self.mode = Mode::Normal;
    }

    fn confirm_bulk_delete_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let mut intents = self.intents.borrow_mut();
                intents.extend(self.table.selected_ids().into_iter().map(Intent::Delete));
                self.table.clear_selection();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => return,
        }
        self.mode = Mode::Normal;
    }

    fn new_task_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let title = self.input.trim().to_string();
                if !title.is_empty() {
                    self.intents.borrow_mut().push(Intent::Create(TaskInput {
                        title: Some(title),
                        ..TaskInput::default()
                    }));
                }
                self.input.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => {
                self.input.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn status_line(&self, notice: Option<&Notice>) -> (Option<Color>, String) {
        if let Some(error) = self.table.error() {
            return (Some(Color::Red), format!("Error: {} (r to retry)", error));
        }
        let pending = self.table.pending();
        let busy: Vec<&str> = [
            OperationKind::Fetch,
            OperationKind::Create,
            OperationKind::Update,
            OperationKind::Delete,
        ]
        .iter()
        .filter(|kind| pending.is_pending(**kind))
        .map(|kind| kind.label())
        .collect();
        if !busy.is_empty() {
            return (Some(Color::Yellow), format!("Working: {}...", busy.join(", ")));
        }
        match notice {
            Some(notice) if notice.level == NoticeLevel::Error => {
                (Some(Color::Red), notice.message.clone())
            }
            Some(notice) => (Some(Color::Green), notice.message.clone()),
            None => (None, String::new()),
        }
    }

    fn help_line(&self) -> &'static str {
        match self.mode {
            Mode::Normal => {
                "j/k=row | n/p/g/G=page | z=page size | /=search | 1-3=filter | o/s=sort | c=columns | Enter=actions | space=select | A=all | D=delete selected | a=new | R=reset | r=refresh | q=quit"
            }
            Mode::Search => "Type to search | Enter=keep | Esc=clear",
            Mode::Filter(_) => "j/k=move | space=toggle | c=clear | Esc=close",
            Mode::Columns => "j/k=move | space=toggle | a=show all | Esc=close",
            Mode::Actions => "j/k=move | Enter=run | Esc=close",
            Mode::ConfirmDelete | Mode::ConfirmBulkDelete => "y=delete | n=cancel",
            Mode::NewTask => "Type a title | Enter=create | Esc=cancel",
            Mode::Detail => "Any key to return",
        }
    }

    fn menu_lines(&self, frame: &mut Frame) {
        let cursor = |index: usize| if index == self.menu { "▶" } else { " " };
        match self.mode {
            Mode::Filter(index) => {
                if let Some(dropdown) = self.dropdowns.get(index) {
                    frame.push((Some(Color::Cyan), dropdown.config().title.clone()));
                    for (i, option) in dropdown.getters().visible_options.iter().enumerate() {
                        let check = if option.selected { "[x]" } else { "[ ]" };
                        frame.push((None, format!("{} {} {}", cursor(i), check, option.label)));
                    }
                }
            }
            Mode::Columns => {
                let getters = self.toolbar.getters();
                frame.push((
                    Some(Color::Cyan),
                    format!("Columns ({} hidden)", getters.hidden_count),
                ));
                for (i, column) in getters.columns.iter().enumerate() {
                    let check = if column.visible { "[x]" } else { "[ ]" };
                    let lock = if column.disabled { " (fixed)" } else { "" };
                    frame.push((None, format!("{} {} {}{}", cursor(i), check, column.title, lock)));
                }
            }
            Mode::Actions => {
                frame.push((Some(Color::Cyan), "Actions".to_string()));
                for (i, action) in self.row_actions.getters().actions.iter().enumerate() {
                    let color = action.destructive.then_some(Color::Red);
                    frame.push((color, format!("{} {}", cursor(i), action.label)));
                }
            }
            Mode::ConfirmDelete => {
                let prompt = self
                    .row_actions
                    .getters()
                    .confirmation
                    .unwrap_or_default();
                frame.push((Some(Color::Red), format!("{} (y/n)", prompt)));
            }
            Mode::ConfirmBulkDelete => frame.push((
                Some(Color::Red),
                format!(
                    "Delete {} selected tasks? (y/n)",
                    self.table.selected_ids().len()
                ),
            )),
            Mode::NewTask => frame.push((
                Some(Color::Cyan),
                format!("{}: {}_", self.toolbar.config().add_label, self.input),
            )),
            Mode::Normal | Mode::Search | Mode::Detail => {}
        }
    }

    /// The full screen as colored lines.
    pub fn frame(&self, notice: Option<&Notice>) -> Frame {
        let mut frame: Frame = Vec::new();
        let push_block = |frame: &mut Frame, block: &str| {
            frame.extend(block.lines().map(|line| (None, line.to_string())));
        };

        frame.push((
            Some(Color::Cyan),
            format!("TaskDesk tasks ({} loaded)", self.table.len()),
        ));

        let header = self.header.getters();
        let search = if self.mode == Mode::Search {
            format!("Search: {}_", self.input)
        } else if header.search_query.is_empty() {
            format!("Search: {}", self.header.config().search_placeholder)
        } else {
            format!("Search: {}", header.search_query)
        };
        let filters: Vec<String> = self
            .dropdowns
            .iter()
            .enumerate()
            .map(|(i, dropdown)| format!("{}:{}", i + 1, dropdown.getters().display_text))
            .collect();
        let sort = match self.table.sort() {
            Some(sort) => format!("{} {}", sort.key, sort.direction.as_str()),
            None => "none".to_string(),
        };
        frame.push((
            Some(Color::Yellow),
            format!(
                "{} | {} | Sort: {} (focus: {}){}",
                search,
                filters.join(" "),
                sort,
                self.sort_key().unwrap_or_default(),
                if header.can_reset { " | R=reset" } else { "" }
            ),
        ));
        frame.push(self.status_line(notice));

        if self.mode == Mode::Detail {
            if let Some(task) = &self.detail {
                push_block(&mut frame, &self.display.render_task_detail(task));
            }
        } else {
            let rows = self.page_rows();
            let row = self.row.min(rows.len().saturating_sub(1));
            let refs: Vec<&Task> = rows.iter().collect();
            let marks: Vec<String> = rows
                .iter()
                .enumerate()
                .map(|(i, task)| row_mark(i == row, self.table.is_selected(&task.id)))
                .collect();
            let columns = self.table.visible_columns();
            push_block(
                &mut frame,
                &self.display.render_records_marked(&columns, &refs, &marks),
            );

            let pagination = self.pagination.getters();
            let selected = self.table.selected_ids().len();
            frame.push((
                Some(Color::Yellow),
                format!(
                    "{} | {} | Page size: {}{}",
                    pagination.summary,
                    format_page_buttons(&pagination.page_buttons),
                    pagination.page_size,
                    if selected > 0 {
                        format!(" | {} selected", selected)
                    } else {
                        String::new()
                    }
                ),
            ));
        }

        self.menu_lines(&mut frame);
        frame.push((Some(Color::Green), self.help_line().to_string()));
        frame
    }
}

fn draw(frame: &Frame) -> io::Result<()> {
    let (_, height) = terminal::size().unwrap_or((80, 24));
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    for (color, text) in frame.iter().take(height.saturating_sub(1) as usize) {
        match color {
            Some(color) => execute!(
                stdout,
                SetForegroundColor(*color),
                Print(text),
                ResetColor,
                Print("\r\n")
            )?,
            None => execute!(stdout, Print(text), Print("\r\n"))?,
        }
    }
    stdout.flush()
}

fn spawn_intent(
    remote: &RemoteTable<Task, SharedStore<Task>, TaskService>,
    intent: Intent,
) {
    let remote = remote.clone();
    match intent {
        Intent::Create(input) => {
            tokio::spawn(async move {
                remote.create(input).await;
            });
        }
        Intent::Update(id, input) => {
            tokio::spawn(async move {
                remote.update(&id, input).await;
            });
        }
        Intent::Delete(id) => {
            tokio::spawn(async move {
                remote.delete(&id).await;
            });
        }
        Intent::View(_) => {}
    }
}

/// Print one page without taking over the terminal.
async fn print_once(
    remote: &RemoteTable<Task, SharedStore<Task>, TaskService>,
) -> Result<(), AppError> {
    let table = remote.table();
    table.set_data(remote.service().list(fetch_params()).await?);
    let rows = table.page_rows();
    let refs: Vec<&Task> = rows.iter().collect();
    let display = TableDisplay::new();
    println!("{}", display.render_records(&table.visible_columns(), &refs));
    let pagination = PaginationController::for_table(table, PaginationOptions::default());
    println!("{}", pagination.getters().summary);
    Ok(())
}

pub async fn run(client: TaskDeskClient, config: &Config, args: BrowseArgs) -> Result<(), AppError> {
    let page_size = args.page_size.unwrap_or_else(|| config.page_size());
    let table = DataTable::shared(
        task_columns(),
        TableState::new()
            .with_page_size(page_size)
            .with_cache_expiry(config.cache_expiry()),
    );
    if let Some(search) = args.search {
        table.set_search_query(search);
    }

    let notifier = Arc::new(BrowserNotifier::default());
    let remote = RemoteTable::new(table.clone(), Arc::new(TaskService::new(client)))
        .with_notifier(notifier.clone());

    // RAII cleanup structures
    struct RawModeCleanup;
    impl Drop for RawModeCleanup {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
        }
    }

    struct ScreenCleanup;
    impl Drop for ScreenCleanup {
        fn drop(&mut self) {
            let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        }
    }

    if let Err(e) = enable_raw_mode() {
        log::warn!("raw mode unavailable ({}), printing a single page", e);
        return print_once(&remote).await;
    }
    let _raw_cleanup = RawModeCleanup;
    execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)
        .map_err(terminal_error("enter alternate screen"))?;
    let _screen_cleanup = ScreenCleanup;

    let intents = RefCell::new(Vec::new());
    let add_requested = Cell::new(false);
    let mut browser = Browser::new(&table, &intents, &add_requested);
    let mut fetch_task: Option<JoinHandle<()>> = None;
    let mut last_frame: Frame = Vec::new();

    loop {
        let fetch_idle = fetch_task.as_ref().is_none_or(|task| task.is_finished());
        if fetch_idle && table.error().is_none() && !table.is_cache_valid() {
            let remote = remote.clone();
            fetch_task = Some(tokio::spawn(async move {
                remote.fetch_if_stale(fetch_params()).await;
            }));
        }

        let frame = browser.frame(notifier.latest().as_ref());
        if frame != last_frame {
            draw(&frame).map_err(terminal_error("draw"))?;
            last_frame = frame;
        }

        if !event::poll(Duration::ZERO).map_err(terminal_error("poll"))? {
            tokio::time::sleep(TICK).await;
            continue;
        }
        match event::read().map_err(terminal_error("read key"))? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if browser.handle_key(key) {
                    break;
                }
            }
            Event::Resize(..) => last_frame.clear(),
            _ => {}
        }

        for intent in browser.take_remote_intents() {
            log::debug!("browser intent: {:?}", intent);
            spawn_intent(&remote, intent);
        }
    }

    if let Some(task) = fetch_task {
        task.abort();
    }
    Ok(())
}
