//! Destination for `print` output.
//!
//! Scripts print diagnostics, not data, so the default handler writes to
//! stderr and leaves stdout to the generated records.

use std::sync::Arc;

use parking_lot::Mutex;

/// Print handler that captures output to a buffer.
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        BufferPrintHandler {
            buffer: Mutex::new(String::new()),
        }
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferPrintHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Print handler implementation using enum dispatch.
pub enum PrintHandlerImpl {
    /// Writes each line to stderr.
    Stderr,
    /// Captures lines (tests and embedders).
    Buffer(BufferPrintHandler),
    /// Discards all output.
    Silent,
}

impl PrintHandlerImpl {
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stderr => eprintln!("{msg}"),
            Self::Buffer(h) => h.println(msg),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stderr | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared print handler, cloned into every module execution of one load.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stderr_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stderr)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_captures_lines() {
        let handler = buffer_handler();
        handler.println("[a.sky:1:1] one");
        handler.println("[a.sky:2:1] two");
        assert_eq!(handler.get_output(), "[a.sky:1:1] one\n[a.sky:2:1] two\n");
        handler.clear();
        assert_eq!(handler.get_output(), "");
    }

    #[test]
    fn silent_and_stderr_capture_nothing() {
        let handler = silent_handler();
        handler.println("dropped");
        assert_eq!(handler.get_output(), "");
        assert_eq!(stderr_handler().get_output(), "");
    }
}
