//! The Knot virtual machine.
//!
//! A [`Machine`] owns the pool, the module registry and the call stack.
//! Execution is a flat loop over [`Machine::step`]: each step settles the
//! innermost block (popping finished frames and blocks, restarting loops)
//! and then runs one code element. Calls push frames and loops push blocks;
//! nothing recurses on the host stack.

mod builder;
mod dump;

pub use builder::{MachineBuilder, MachineConfig};
pub(crate) use dump::FramePart;

use crate::errors::{
    arity_mismatch, missing_operand, no_caller, no_frame, return_mismatch, step_limit_exceeded,
    undefined_def, undefined_module, unknown_instruction, LoadError, RunResult,
};
use crate::exec::{as_list, as_sym};
use crate::frame::{BlockKind, Frame};
use crate::load::{load_forms, LoadNames};
use crate::opcode::{OpTable, TypeNames};
use crate::print_handler::SharedPrintHandler;
use crate::registry::{DefId, Registry};
use knot_ir::{Pair, Pool, Sym, Value};

/// Outcome of a successful [`Machine::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// More work remains.
    Running,
    /// The call stack is empty.
    Done,
}

/// Stack-based virtual machine.
pub struct Machine {
    pub(crate) pool: Pool,
    pub(crate) registry: Registry,
    ops: OpTable,
    load_names: LoadNames,
    pub(crate) type_names: TypeNames,
    pub(crate) frames: Vec<Frame>,
    /// Popped frames kept for reuse, allocations intact.
    free_frames: Vec<Frame>,
    pub(crate) print: SharedPrintHandler,
    config: MachineConfig,
    steps: u64,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Machine printing to stdout with no step limit.
    pub fn new() -> Self {
        MachineBuilder::new().build()
    }

    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    pub(crate) fn from_parts(config: MachineConfig, print: SharedPrintHandler) -> Self {
        let mut pool = Pool::new();
        let ops = OpTable::new(&mut pool);
        let load_names = LoadNames::new(&mut pool);
        let type_names = TypeNames::new(&mut pool);
        Machine {
            pool,
            registry: Registry::new(),
            ops,
            load_names,
            type_names,
            frames: Vec::new(),
            free_frames: Vec::new(),
            print,
            config,
            steps: 0,
        }
    }

    #[inline]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Live frames, outermost first.
    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Steps charged by the current or last run.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Read `source` and register its forms. `name` labels errors.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn load_source(&mut self, name: &str, source: &str) -> Result<(), LoadError> {
        let root = knot_parse::parse(&mut self.pool, source)
            .map_err(|e| LoadError::from(e).with_context(name))?;
        self.load(root).map_err(|e| e.with_context(name))
    }

    /// Register the forms of an already-read root list.
    pub fn load(&mut self, root: Value) -> Result<(), LoadError> {
        load_forms(&mut self.registry, &self.pool, self.load_names, root)
    }

    /// Push a value onto the current frame.
    pub fn push_value(&mut self, value: Value) -> RunResult {
        let frame = self.frames.last_mut().ok_or_else(no_frame)?;
        frame.push(value);
        Ok(())
    }

    /// `module.name`, or just `name` in the default module.
    pub(crate) fn def_label(&self, id: DefId) -> String {
        let def = self.registry.def(id);
        let name = self.pool.sym_name(def.name);
        if def.module == Sym::EMPTY {
            name.to_owned()
        } else {
            format!("{}.{name}", self.pool.sym_name(def.module))
        }
    }

    /// Look up `module`/`name` and push a frame for it.
    pub fn push_frame(&mut self, module: Sym, name: Sym) -> RunResult {
        let found = self
            .registry
            .module(module)
            .ok_or_else(|| undefined_module(self.pool.sym_name(module)))?;
        let id = found
            .get_def(name)
            .ok_or_else(|| undefined_def(self.pool.sym_name(module), self.pool.sym_name(name)))?;
        self.enter(id)
    }

    /// Push a frame for `id`, moving its arguments off the caller's stack.
    pub(crate) fn enter(&mut self, id: DefId) -> RunResult {
        let def = self.registry.def(id);
        let (n_args, code) = (def.n_args(), def.code);
        match self.frames.last() {
            Some(caller) if caller.stack.len() < n_args => {
                return Err(arity_mismatch(
                    &self.def_label(id),
                    n_args,
                    caller.stack.len(),
                ));
            }
            None if n_args > 0 => return Err(no_caller(&self.def_label(id), n_args)),
            _ => {}
        }

        let mut frame = match self.free_frames.pop() {
            Some(mut frame) => {
                frame.reset(id);
                frame
            }
            None => Frame::new(id, self.config.stack_capacity),
        };
        if let Some(caller) = self.frames.last_mut() {
            let at = caller.stack.len() - n_args;
            frame.stack.extend(caller.stack.drain(at..));
        }
        frame.push_block(BlockKind::Basic, code);
        self.frames.push(frame);
        tracing::debug!(def = %self.def_label(id), depth = self.frames.len(), "push frame");
        Ok(())
    }

    /// Pop the current frame, moving its return values to the caller.
    pub fn pop_frame(&mut self) -> RunResult {
        let frame = self.frames.last().ok_or_else(no_frame)?;
        let id = frame.def;
        let n_rets = self.registry.def(id).n_rets();
        if frame.stack.len() != n_rets {
            return Err(return_mismatch(
                &self.def_label(id),
                n_rets,
                frame.stack.len(),
            ));
        }
        if n_rets > 0 && self.frames.len() < 2 {
            return Err(no_caller(&self.def_label(id), n_rets));
        }
        tracing::debug!(def = %self.def_label(id), depth = self.frames.len(), "pop frame");

        let Some(mut frame) = self.frames.pop() else {
            return Err(no_frame());
        };
        if let Some(caller) = self.frames.last_mut() {
            caller.stack.append(&mut frame.stack);
        }
        self.free_frames.push(frame);
        Ok(())
    }

    /// Drop every live frame into the free list.
    pub fn reset(&mut self) {
        self.free_frames.append(&mut self.frames);
    }

    /// Count one unit of work against the step budget.
    fn charge(&mut self) -> RunResult {
        if let Some(limit) = self.config.max_steps {
            if self.steps >= limit {
                return Err(step_limit_exceeded(limit));
            }
        }
        self.steps += 1;
        Ok(())
    }

    /// Settle the innermost block and run one code element. Every frame
    /// return, block exit and loop pass while settling is charged to the
    /// step budget like a fetched element.
    pub fn step(&mut self) -> RunResult<Step> {
        let element = loop {
            self.charge()?;
            let Some(frame) = self.frames.last_mut() else {
                return Ok(Step::Done);
            };
            let Some(block) = frame.blocks.last_mut() else {
                self.pop_frame()?;
                continue;
            };

            if block.fresh {
                block.fresh = false;
                match block.kind {
                    BlockKind::IntFor { i, n } => {
                        if i >= n {
                            frame.blocks.pop();
                            continue;
                        }
                        frame.stack.push(Value::Int(i));
                    }
                    BlockKind::ListFor { cursor } => {
                        let Value::Pair(id) = cursor else {
                            frame.blocks.pop();
                            continue;
                        };
                        frame.stack.push(self.pool.pair(id).head);
                    }
                    BlockKind::Basic | BlockKind::Do | BlockKind::For { .. } => {}
                }
            }

            let Some(block) = frame.blocks.last_mut() else {
                continue;
            };
            if let Value::Pair(id) = block.code {
                let Pair { head, tail } = self.pool.pair(id);
                block.code = tail;
                break head;
            }
            frame.end_of_pass(&self.pool);
        };

        match element {
            Value::Sym(sym) => {
                let name = self.pool.sym_name(sym);
                let Some(op) = self.ops.get(sym) else {
                    return Err(unknown_instruction(name));
                };
                tracing::trace!(op = op.name(), "exec");
                self.exec(op).map_err(|e| e.with_instruction(op.name()))?;
            }
            Value::Pair(_) | Value::Nil => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.push_block(BlockKind::Basic, element);
                }
            }
            literal => self.push_value(literal)?,
        }
        Ok(Step::Running)
    }

    /// Step until the call stack is empty. The step budget starts afresh
    /// for each run. On failure the error carries a dump of every live
    /// frame; the frames are left in place until [`Machine::reset`] or the
    /// next [`Machine::call`].
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) -> RunResult {
        self.steps = 0;
        loop {
            match self.step() {
                Ok(Step::Running) => {}
                Ok(Step::Done) => return Ok(()),
                Err(err) => return Err(err.with_frames(self.dump_frames())),
            }
        }
    }

    /// Invoke `module`/`name` by text and run to completion. Frames left
    /// behind by a failed run are discarded first.
    pub fn call(&mut self, module: &str, name: &str) -> RunResult {
        self.reset();
        let module = self.pool.intern(module);
        let name = self.pool.intern(name);
        self.push_frame(module, name)?;
        self.run()
    }

    // Operand and type helpers shared by the instruction handlers.

    /// Current frame together with the pool.
    pub(crate) fn frame_and_pool(&mut self) -> RunResult<(&mut Frame, &mut Pool)> {
        let frame = self.frames.last_mut().ok_or_else(no_frame)?;
        Ok((frame, &mut self.pool))
    }

    pub(crate) fn frame_mut(&mut self) -> RunResult<&mut Frame> {
        self.frames.last_mut().ok_or_else(no_frame)
    }

    /// Read the next element of the current block as an inline operand.
    pub(crate) fn operand(&mut self) -> RunResult<Value> {
        let frame = self.frames.last_mut().ok_or_else(no_frame)?;
        let block = frame.blocks.last_mut().ok_or_else(missing_operand)?;
        match block.code {
            Value::Pair(id) => {
                let Pair { head, tail } = self.pool.pair(id);
                block.code = tail;
                Ok(head)
            }
            _ => Err(missing_operand()),
        }
    }

    pub(crate) fn operand_sym(&mut self) -> RunResult<Sym> {
        let value = self.operand()?;
        as_sym(&self.pool, value)
    }

    pub(crate) fn operand_list(&mut self) -> RunResult<Value> {
        let value = self.operand()?;
        as_list(&self.pool, value)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
