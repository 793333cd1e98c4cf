//! Printing, assertions and frame dumps.

use super::{as_bool, as_str};
use crate::errors::{assertion_failed, no_frame, raised, RunResult};
use crate::machine::{FramePart, Machine};

impl Machine {
    pub(super) fn exec_p(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let value = frame.pop()?;
        let text = pool.display(value).to_string();
        self.print.println(&text);
        Ok(())
    }

    /// Write a string's raw bytes, without a newline.
    pub(super) fn exec_str_p(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let value = frame.pop()?;
        let id = as_str(pool, value)?;
        self.print.write_bytes(self.pool.str_bytes(id));
        Ok(())
    }

    pub(super) fn exec_assert(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let value = frame.pop()?;
        if as_bool(pool, value)? {
            Ok(())
        } else {
            Err(assertion_failed())
        }
    }

    pub(super) fn exec_error(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let value = frame.pop()?;
        Err(raised(pool.display(value).to_string()))
    }

    pub(super) fn exec_dump(&mut self, part: FramePart) -> RunResult {
        let frame = self.frames.last().ok_or_else(no_frame)?;
        let text = self.frame_dump(frame, part).to_string();
        self.print.write_bytes(text.as_bytes());
        Ok(())
    }
}
