//! Destination for `p` and `str_p` output.
//!
//! Programs print through a [`SharedPrintHandler`] so the CLI can write to
//! stdout while tests capture output in a buffer. Enum dispatch keeps the
//! per-instruction cost to a match.

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Where printed bytes go.
pub enum PrintHandler {
    /// Writes to stdout (default).
    Stdout,
    /// Captures to a buffer for inspection.
    Buffer(Mutex<Vec<u8>>),
    /// Discards everything.
    Silent,
}

impl PrintHandler {
    /// Print a line (with newline).
    pub fn println(&self, msg: &str) {
        self.write_bytes(msg.as_bytes());
        self.write_bytes(b"\n");
    }

    /// Print raw bytes without a newline. Strings in Knot are byte strings,
    /// so `str_p` goes through here unchanged.
    pub fn write_bytes(&self, bytes: &[u8]) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                // A closed stdout is not a program fault.
                let _ = out.write_all(bytes);
                let _ = out.flush();
            }
            Self::Buffer(buf) => buf.lock().extend_from_slice(bytes),
            Self::Silent => {}
        }
    }

    /// Captured output, lossily decoded. Empty for stdout and silent.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(buf) => String::from_utf8_lossy(&buf.lock()).into_owned(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    /// Clear captured output.
    pub fn clear(&self) {
        if let Self::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Shared print handler that can be passed around.
pub type SharedPrintHandler = Arc<PrintHandler>;

/// Create a stdout print handler.
pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

/// Create a buffer print handler for capturing output.
pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(Vec::new())))
}

/// Create a handler that discards all output.
pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
