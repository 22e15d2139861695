//! Progress display utilities for remote calls

use crate::table::remote::{Notice, NoticeLevel, Notifier};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const SPINNER_UPDATE_INTERVAL_MS: u64 = 100;
const CLEAR_LINE_WIDTH: usize = 100;
const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Spinner drawn on stderr so piped stdout stays clean.
pub struct ProgressSpinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressSpinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.running.store(true, Ordering::Relaxed);
        let running = Arc::clone(&self.running);
        let message = self.message.clone();

        let handle = thread::spawn(move || {
            let mut index = 0;
            let mut stderr = io::stderr();

            while running.load(Ordering::Relaxed) {
                let _ = write!(stderr, "\r{} {}", SPINNER_CHARS[index], message);
                let _ = stderr.flush();

                index = (index + 1) % SPINNER_CHARS.len();
                thread::sleep(Duration::from_millis(SPINNER_UPDATE_INTERVAL_MS));
            }

            let _ = write!(stderr, "\r{:<width$}\r", "", width = CLEAR_LINE_WIDTH);
            let _ = stderr.flush();
        });

        self.handle = Some(handle);
    }

    /// Stop spinner and print an optional completion line
    pub fn stop(&mut self, completion_message: Option<&str>) {
        self.running.store(false, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        if let Some(msg) = completion_message {
            eprintln!(" {}", msg);
        }
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        self.stop(None);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Success,
    Warning,
    Error,
}

impl OperationStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            OperationStatus::InProgress => "⏳",
            OperationStatus::Success => "✅",
            OperationStatus::Warning => "⚠️",
            OperationStatus::Error => "❌",
        }
    }
}

pub fn format_status(message: &str, status: OperationStatus) -> String {
    // Leading space keeps wide emoji from being clipped by some terminals
    format!(" {} {}", status.symbol(), message)
}

pub fn display_status(message: &str, status: OperationStatus) {
    println!("{}", format_status(message, status));
}

/// Prints remote-operation notices as status lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusNotifier;

impl Notifier for StatusNotifier {
    fn notify(&self, notice: Notice) {
        let status = match notice.level {
            NoticeLevel::Success => OperationStatus::Success,
            NoticeLevel::Error => OperationStatus::Error,
        };
        eprintln!("{}", format_status(&notice.message, status));
    }
}
