use crate::api::models::{Pagination, Task, TaskPriority, TaskStatus, User};
use crate::table::value::{ColumnDescriptor, Record};
use crate::utils::text::{format_date, format_datetime, single_line, truncate_text};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

const MIN_COLUMN_WIDTH: usize = 6;

/// Terminal table renderer for record lists and detail views.
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn bold_header(&self, text: &str) -> Cell {
        let cell = Cell::new(text).add_attribute(Attribute::Bold);
        if self.use_colors {
            cell.fg(Color::Cyan)
        } else {
            cell
        }
    }

    fn colored_cell(&self, text: &str, color: Option<Color>) -> Cell {
        match color {
            Some(color) if self.use_colors => Cell::new(text).fg(color),
            _ => Cell::new(text),
        }
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width as u16);
        }
        table
    }

    fn column_width(&self, columns: usize) -> usize {
        let available = self.max_width.unwrap_or(120);
        // Three characters of border and padding per column
        (available.saturating_sub(columns * 3 + 1) / columns.max(1)).max(MIN_COLUMN_WIDTH)
    }

    /// Color for well-known status and priority values.
    fn value_color(key: &str, text: &str) -> Option<Color> {
        match key {
            "status" => match text.parse::<TaskStatus>().ok()? {
                TaskStatus::Todo => Some(Color::Yellow),
                TaskStatus::InProgress => Some(Color::Blue),
                TaskStatus::Done => Some(Color::Green),
            },
            "priority" => match text.parse::<TaskPriority>().ok()? {
                TaskPriority::High => Some(Color::Red),
                TaskPriority::Medium => Some(Color::Yellow),
                TaskPriority::Low => Some(Color::DarkGrey),
            },
            "role" if text == "admin" => Some(Color::Magenta),
            _ => None,
        }
    }

    /// Render `rows` under the given columns.
    pub fn render_records<R: Record>(&self, columns: &[&ColumnDescriptor<R>], rows: &[&R]) -> String {
        self.render(columns, rows, None)
    }

    /// Like [`TableDisplay::render_records`] with a leading marker column,
    /// one entry of `marks` per row.
    pub fn render_records_marked<R: Record>(
        &self,
        columns: &[&ColumnDescriptor<R>],
        rows: &[&R],
        marks: &[String],
    ) -> String {
        self.render(columns, rows, Some(marks))
    }

    fn render<R: Record>(
        &self,
        columns: &[&ColumnDescriptor<R>],
        rows: &[&R],
        marks: Option<&[String]>,
    ) -> String {
        if rows.is_empty() {
            return "No records found.".to_string();
        }

        let mut table = self.new_table();
        let mut header: Vec<Cell> = Vec::with_capacity(columns.len() + 1);
        if marks.is_some() {
            header.push(Cell::new(""));
        }
        header.extend(columns.iter().map(|c| self.bold_header(&c.title)));
        table.set_header(header);

        let width = self.column_width(columns.len() + usize::from(marks.is_some()));
        for (index, row) in rows.iter().enumerate() {
            let mut cells: Vec<Cell> = Vec::with_capacity(columns.len() + 1);
            if let Some(marks) = marks {
                let mark = marks.get(index).map(String::as_str).unwrap_or("");
                cells.push(self.colored_cell(mark, Some(Color::Green)));
            }
            cells.extend(columns.iter().map(|column| {
                let text = single_line(&column.cell_text(row));
                let color = Self::value_color(&column.key, &text);
                self.colored_cell(&truncate_text(&text, width), color)
            }));
            table.add_row(cells);
        }

        table.to_string()
    }

    /// `Page X of Y (Z total)` under a listing.
    pub fn render_page_footer(&self, pagination: &Pagination) -> String {
        format!(
            "Page {} of {} ({} total)",
            pagination.page,
            pagination.pages.max(1),
            pagination.total
        )
    }

    fn detail_table(&self, rows: Vec<(&str, String)>) -> String {
        let mut table = self.new_table();
        for (label, value) in rows {
            table.add_row(vec![self.bold_header(label), Cell::new(value)]);
        }
        table.to_string()
    }

    pub fn render_task_detail(&self, task: &Task) -> String {
        let mut output = self.detail_table(vec![
            ("ID", task.display_id().to_string()),
            ("Title", task.title.clone()),
            ("Status", task.status.to_string()),
            ("Priority", task.priority.to_string()),
            ("Type", task.task_type.to_string()),
            ("Assignee", task.assignee_name().unwrap_or_else(|| "-".to_string())),
            ("Due", format_date(task.due_date)),
            ("Created", format_datetime(task.created_at)),
            ("Updated", format_datetime(task.updated_at)),
            (
                "Description",
                task.description.clone().unwrap_or_else(|| "-".to_string()),
            ),
        ]);

        if !task.comments.is_empty() {
            output.push_str(&format!("\n\nComments ({}):\n", task.comments.len()));
            for comment in &task.comments {
                let author = comment
                    .user
                    .as_ref()
                    .map(|user| user.display_name())
                    .unwrap_or_else(|| "unknown".to_string());
                output.push_str(&format!(
                    "  [{}] {}: {}\n",
                    format_datetime(comment.created_at),
                    author,
                    comment.text
                ));
            }
        }
        output
    }

    pub fn render_user_detail(&self, user: &User) -> String {
        self.detail_table(vec![
            ("ID", user.display_id()),
            ("Name", user.name.clone()),
            ("Email", user.email.clone()),
            ("Role", user.role.to_string()),
            ("Avatar", user.avatar.clone().unwrap_or_else(|| "-".to_string())),
            ("Joined", format_date(user.created_at)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::task_columns;
    use crate::table::value::JsonRecord;
    use serde_json::json;

    fn display() -> TableDisplay {
        TableDisplay::new().with_max_width(100).with_colors(false)
    }

    fn task() -> Task {
        serde_json::from_value(json!({
            "_id": "abc",
            "taskId": "TSK-0042",
            "title": "Fix login",
            "status": "Todo",
            "priority": "High",
            "comments": [{"text": "On it", "user": {"_id": "u1", "name": "Ada"}}]
        }))
        .expect("valid task")
    }

    #[test]
    fn test_render_records() {
        let task = task();
        let columns = task_columns();
        let refs: Vec<&ColumnDescriptor<Task>> = columns.iter().collect();
        let output = display().render_records(&refs, &[&task]);
        assert!(output.contains("TSK-0042"));
        assert!(output.contains("Fix login"));
        assert!(output.contains("Priority"));
    }

    #[test]
    fn test_render_marked_rows() {
        let task = task();
        let columns = task_columns();
        let refs: Vec<&ColumnDescriptor<Task>> = columns.iter().take(2).collect();
        let output = display().render_records_marked(&refs, &[&task], &["▶✓".to_string()]);
        assert!(output.contains("▶✓"));
        assert!(output.contains("TSK-0042"));
    }

    #[test]
    fn test_render_empty() {
        let columns = vec![ColumnDescriptor::<JsonRecord>::new("id", "ID")];
        let refs: Vec<&ColumnDescriptor<JsonRecord>> = columns.iter().collect();
        assert_eq!(display().render_records(&refs, &[]), "No records found.");
    }

    #[test]
    fn test_task_detail_lists_comments() {
        let output = display().render_task_detail(&task());
        assert!(output.contains("Comments (1)"));
        assert!(output.contains("Ada: On it"));
    }

    #[test]
    fn test_page_footer() {
        let pagination = Pagination {
            page: 2,
            limit: 10,
            total: 42,
            pages: 5,
        };
        assert_eq!(display().render_page_footer(&pagination), "Page 2 of 5 (42 total)");
    }

    #[test]
    fn test_value_colors() {
        assert_eq!(TableDisplay::value_color("status", "Done"), Some(Color::Green));
        assert_eq!(TableDisplay::value_color("priority", "High"), Some(Color::Red));
        assert_eq!(TableDisplay::value_color("title", "Done"), None);
    }
}
