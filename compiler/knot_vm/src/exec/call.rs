//! Calls, closures and `ret`.
//!
//! `call` and `ref` resolve a name through the current def's import scope,
//! falling back to its own module; `longcall`, `longref` and `fun_call`
//! address the target module and def directly. Every invocation goes
//! through [`Machine::push_frame`].

use super::as_closure;
use crate::errors::{no_frame, RunResult};
use crate::machine::Machine;
use knot_ir::{Closure, Sym, Value};

impl Machine {
    /// Resolve `name` from inside the current def.
    fn resolve(&self, name: Sym) -> RunResult<(Sym, Sym)> {
        let frame = self.frames.last().ok_or_else(no_frame)?;
        Ok(self.registry.resolve(frame.def, name))
    }

    pub(super) fn exec_call(&mut self) -> RunResult {
        let name = self.operand_sym()?;
        let (module, def) = self.resolve(name)?;
        self.push_frame(module, def)
    }

    pub(super) fn exec_ref(&mut self) -> RunResult {
        let name = self.operand_sym()?;
        let (module, def) = self.resolve(name)?;
        let fun = self.pool.alloc_closure(module, def, Value::Nil);
        self.push_value(fun)
    }

    pub(super) fn exec_longcall(&mut self) -> RunResult {
        let module = self.operand_sym()?;
        let def = self.operand_sym()?;
        self.push_frame(module, def)
    }

    pub(super) fn exec_longref(&mut self) -> RunResult {
        let module = self.operand_sym()?;
        let def = self.operand_sym()?;
        let fun = self.pool.alloc_closure(module, def, Value::Nil);
        self.push_value(fun)
    }

    /// `... f -- ...`: push the pending arguments, head first, then invoke.
    pub(super) fn exec_fun_call(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let fun = frame.pop()?;
        let closure = pool.closure(as_closure(pool, fun)?);
        frame.stack.extend(pool.iter_list(closure.args));
        self.push_frame(closure.module, closure.name)
    }

    /// `f x -- f`: prepend `x` to the closure's pending arguments in place.
    pub(super) fn exec_apply(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let (fun, x) = frame.pop2()?;
        let id = as_closure(pool, fun)?;
        let args = pool.cons(x, pool.closure(id).args);
        pool.closure_mut(id).args = args;
        frame.push(fun);
        Ok(())
    }

    /// Replace a closure on TOS with one of its fields.
    pub(super) fn exec_fun_field(&mut self, field: impl FnOnce(Closure) -> Value) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let tos = frame.tos_mut()?;
        *tos = field(pool.closure(as_closure(pool, *tos)?));
        Ok(())
    }

    /// Drop every block; the frame returns on the next step.
    pub(super) fn exec_ret(&mut self) -> RunResult {
        self.frame_mut()?.blocks.clear();
        Ok(())
    }
}
