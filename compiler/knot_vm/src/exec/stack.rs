//! Literals, stack shuffles and frame variables.

use super::{as_bool, as_sym};
use crate::errors::{undefined_variable, RunResult};
use crate::machine::Machine;
use knot_ir::{Sym, Value};

impl Machine {
    pub(super) fn exec_sym_lit(&mut self) -> RunResult {
        let sym = self.operand_sym()?;
        self.push_value(Value::Sym(sym))
    }

    pub(super) fn exec_list_lit(&mut self) -> RunResult {
        let list = self.operand_list()?;
        self.push_value(list)
    }

    pub(super) fn exec_dup(&mut self) -> RunResult {
        let frame = self.frame_mut()?;
        let tos = frame.peek(0)?;
        frame.push(tos);
        Ok(())
    }

    pub(super) fn exec_drop(&mut self) -> RunResult {
        self.frame_mut()?.pop().map(drop)
    }

    pub(super) fn exec_swap(&mut self) -> RunResult {
        let frame = self.frame_mut()?;
        frame.require(2)?;
        let len = frame.stack.len();
        frame.stack.swap(len - 1, len - 2);
        Ok(())
    }

    /// `a b -- b`
    pub(super) fn exec_nip(&mut self) -> RunResult {
        let frame = self.frame_mut()?;
        let (_, b) = frame.pop2()?;
        frame.push(b);
        Ok(())
    }

    /// `a b -- b a b`
    pub(super) fn exec_tuck(&mut self) -> RunResult {
        let frame = self.frame_mut()?;
        let (a, b) = frame.pop2()?;
        frame.push(b);
        frame.push(a);
        frame.push(b);
        Ok(())
    }

    /// `a b -- a b a`
    pub(super) fn exec_over(&mut self) -> RunResult {
        let frame = self.frame_mut()?;
        let a = frame.peek(1)?;
        frame.push(a);
        Ok(())
    }

    pub(super) fn exec_var_get(&mut self) -> RunResult {
        let name = self.operand_sym()?;
        let (frame, pool) = self.frame_and_pool()?;
        let value = frame
            .get_var(name)
            .ok_or_else(|| undefined_variable(pool.sym_name(name)))?;
        frame.push(value);
        Ok(())
    }

    pub(super) fn exec_var_set(&mut self) -> RunResult {
        let name = self.operand_sym()?;
        let frame = self.frame_mut()?;
        let value = frame.pop()?;
        frame.set_var(name, value);
        Ok(())
    }

    /// Bind the top N values to N names; the first name gets the deepest.
    pub(super) fn exec_vars(&mut self) -> RunResult {
        let list = self.operand_list()?;
        let (frame, pool) = self.frame_and_pool()?;
        let names = pool
            .iter_list(list)
            .map(|v| as_sym(pool, v))
            .collect::<RunResult<Vec<Sym>>>()?;
        frame.require(names.len())?;
        let values = frame.stack.split_off(frame.stack.len() - names.len());
        for (name, value) in names.into_iter().zip(values) {
            frame.set_var(name, value);
        }
        Ok(())
    }

    /// Pop a value that must be a bool.
    pub(super) fn pop_bool(&mut self) -> RunResult<bool> {
        let (frame, pool) = self.frame_and_pool()?;
        let value = frame.pop()?;
        as_bool(pool, value)
    }
}
