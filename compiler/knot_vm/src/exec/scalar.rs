//! Type queries, booleans and integer arithmetic.

use super::{as_bool, as_int, as_sym};
use crate::errors::{division_by_zero, integer_overflow, modulo_by_zero, RunResult};
use crate::machine::Machine;
use knot_ir::Value;

/// Truncating division.
pub(super) fn div(a: i64, b: i64) -> RunResult<Value> {
    if b == 0 {
        return Err(division_by_zero());
    }
    a.checked_div(b)
        .map(Value::Int)
        .ok_or_else(|| integer_overflow("div"))
}

/// Remainder with the sign of the dividend.
pub(super) fn rem(a: i64, b: i64) -> RunResult<Value> {
    if b == 0 {
        return Err(modulo_by_zero());
    }
    a.checked_rem(b)
        .map(Value::Int)
        .ok_or_else(|| integer_overflow("mod"))
}

impl Machine {
    /// Replace TOS with the result of `test`.
    pub(super) fn type_query(&mut self, test: impl FnOnce(Value) -> bool) -> RunResult {
        let tos = self.frame_mut()?.tos_mut()?;
        *tos = Value::Bool(test(*tos));
        Ok(())
    }

    pub(super) fn exec_typeof(&mut self) -> RunResult {
        let names = self.type_names;
        let tos = self.frame_mut()?.tos_mut()?;
        *tos = Value::Sym(names.of(*tos));
        Ok(())
    }

    pub(super) fn exec_not(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let tos = frame.tos_mut()?;
        *tos = Value::Bool(!as_bool(pool, *tos)?);
        Ok(())
    }

    pub(super) fn exec_bool_eq(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let (a, b) = frame.pop2()?;
        let eq = as_bool(pool, a)? == as_bool(pool, b)?;
        frame.push(Value::Bool(eq));
        Ok(())
    }

    /// `a b -- f(a, b)` over two ints.
    pub(super) fn int_binop(&mut self, f: impl FnOnce(i64, i64) -> RunResult<Value>) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let (a, b) = frame.pop2()?;
        let result = f(as_int(pool, a)?, as_int(pool, b)?)?;
        frame.push(result);
        Ok(())
    }

    pub(super) fn exec_sym_eq(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let (a, b) = frame.pop2()?;
        let eq = as_sym(pool, a)? == as_sym(pool, b)?;
        frame.push(Value::Bool(eq));
        Ok(())
    }
}
