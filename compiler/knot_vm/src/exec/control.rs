//! Conditionals and loops.

use super::{as_bool, as_int, as_list};
use crate::errors::RunResult;
use crate::frame::BlockKind;
use crate::machine::Machine;

impl Machine {
    /// `bool --`
    pub(super) fn exec_if(&mut self) -> RunResult {
        let body = self.operand_list()?;
        if self.pop_bool()? {
            self.frame_mut()?.push_block(BlockKind::Basic, body);
        }
        Ok(())
    }

    /// `bool --`
    pub(super) fn exec_ifelse(&mut self) -> RunResult {
        let then = self.operand_list()?;
        let otherwise = self.operand_list()?;
        let body = if self.pop_bool()? { then } else { otherwise };
        self.frame_mut()?.push_block(BlockKind::Basic, body);
        Ok(())
    }

    /// `and` runs its operand when TOS is true, `or` when it is false.
    /// Otherwise TOS already holds the result and stays.
    pub(super) fn exec_short_circuit(&mut self, run_on: bool) -> RunResult {
        let rhs = self.operand_list()?;
        let (frame, pool) = self.frame_and_pool()?;
        if as_bool(pool, frame.peek(0)?)? == run_on {
            frame.pop()?;
            frame.push_block(BlockKind::Basic, rhs);
        }
        Ok(())
    }

    pub(super) fn exec_do(&mut self) -> RunResult {
        let body = self.operand_list()?;
        self.frame_mut()?.push_block(BlockKind::Do, body);
        Ok(())
    }

    /// `for (latch) (body)`: loop until `break` or `while` exits.
    pub(super) fn exec_for(&mut self) -> RunResult {
        let latch = self.operand_list()?;
        let body = self.operand_list()?;
        self.frame_mut()?.push_block(BlockKind::For { latch }, body);
        Ok(())
    }

    /// `n --`
    pub(super) fn exec_int_for(&mut self) -> RunResult {
        let body = self.operand_list()?;
        let (frame, pool) = self.frame_and_pool()?;
        let n = frame.pop()?;
        let n = as_int(pool, n)?;
        frame.push_block(BlockKind::IntFor { i: 0, n }, body);
        Ok(())
    }

    /// `list --`
    pub(super) fn exec_list_for(&mut self) -> RunResult {
        let body = self.operand_list()?;
        let (frame, pool) = self.frame_and_pool()?;
        let list = frame.pop()?;
        let cursor = as_list(pool, list)?;
        frame.push_block(BlockKind::ListFor { cursor }, body);
        Ok(())
    }

    /// Restart the innermost loop. Counted and list loops advance first.
    pub(super) fn exec_next(&mut self) -> RunResult {
        let block = self.frame_mut()?.unwind_to_loop()?;
        if block.kind == BlockKind::Do {
            block.restart();
        } else {
            block.code = knot_ir::Value::Nil;
        }
        Ok(())
    }

    pub(super) fn exec_break(&mut self) -> RunResult {
        let frame = self.frame_mut()?;
        frame.unwind_to_loop()?;
        frame.blocks.pop();
        Ok(())
    }

    /// `bool --`: break out of the innermost loop on false.
    pub(super) fn exec_while(&mut self) -> RunResult {
        if self.pop_bool()? {
            Ok(())
        } else {
            self.exec_break()
        }
    }
}
