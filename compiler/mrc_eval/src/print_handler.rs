//! The output sink.
//!
//! Only print statements reach the sink, one line per value, written after
//! the statement's value is fully computed. Enum dispatch keeps the common
//! stdout path free of vtables.

use std::io::Write;
use std::sync::Arc;

use mrc_runtime::Value;
use parking_lot::Mutex;

#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    fn print_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout (e.g. piped into `head`) is not an evaluation error.
        let _ = writeln!(out, "{line}");
    }
}

/// Captures output lines for tests and embedders.
#[derive(Default)]
pub struct BufferPrintHandler {
    lines: Mutex<Vec<String>>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_line(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }

    /// Captured output, newline terminated.
    pub fn output(&self) -> String {
        let lines = self.lines.lock();
        let mut out = String::new();
        for line in lines.iter() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

pub enum PrintHandler {
    Stdout(StdoutPrintHandler),
    Buffer(BufferPrintHandler),
    /// Discards everything. Used by `check` runs and benchmarks.
    Silent,
}

impl PrintHandler {
    pub fn print_value(&self, value: &Value) {
        self.print_line(&value.to_string());
    }

    pub fn print_line(&self, line: &str) {
        match self {
            Self::Stdout(h) => h.print_line(line),
            Self::Buffer(h) => h.print_line(line),
            Self::Silent => {}
        }
    }

    /// Captured output. Empty for handlers that do not capture.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(h) => h.output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout(StdoutPrintHandler))
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
