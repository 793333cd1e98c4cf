//! Call frames and control blocks.
//!
//! A [`Frame`] is one def activation: a value stack, a variable table and a
//! stack of [`Block`]s. Blocks drive control flow without host recursion;
//! loops are blocks whose code restarts instead of popping when it runs
//! out.

use crate::errors::{stack_underflow, RunResult};
use crate::registry::DefId;
use knot_ir::{Pool, Sym, Value};
use smallvec::SmallVec;

/// What a block does when its code is exhausted (and, for counted and
/// list loops, when a pass starts).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// Runs once, then pops.
    Basic,
    /// Runs once; `next` restarts it.
    Do,
    /// Unbounded loop. Runs `latch` as a nested block between passes.
    For { latch: Value },
    /// Pushes `i` for each `i` in `0..n`.
    IntFor { i: i64, n: i64 },
    /// Pushes the head of `cursor` for each cell.
    ListFor { cursor: Value },
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Basic => "basic",
            BlockKind::Do => "do",
            BlockKind::For { .. } => "for",
            BlockKind::IntFor { .. } => "int_for",
            BlockKind::ListFor { .. } => "list_for",
        }
    }
}

/// One control unit within a frame.
#[derive(Copy, Clone, Debug)]
pub struct Block {
    pub kind: BlockKind,
    /// Remaining code; the next element to run is its head.
    pub code: Value,
    /// Code to restart from.
    pub start: Value,
    /// Set on (re)start; cleared once start-of-pass logic has run.
    pub(crate) fresh: bool,
}

impl Block {
    pub fn new(kind: BlockKind, code: Value) -> Self {
        Block {
            kind,
            code,
            start: code,
            fresh: true,
        }
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.kind != BlockKind::Basic
    }

    pub(crate) fn restart(&mut self) {
        self.code = self.start;
        self.fresh = true;
    }
}

/// One def activation.
#[derive(Debug)]
pub struct Frame {
    pub def: DefId,
    pub(crate) stack: Vec<Value>,
    pub(crate) vars: SmallVec<[(Sym, Value); 8]>,
    pub(crate) blocks: Vec<Block>,
}

impl Frame {
    pub(crate) fn new(def: DefId, stack_capacity: usize) -> Self {
        Frame {
            def,
            stack: Vec::with_capacity(stack_capacity),
            vars: SmallVec::new(),
            blocks: Vec::new(),
        }
    }

    /// Reinitialise a recycled frame, keeping its allocations.
    pub(crate) fn reset(&mut self, def: DefId) {
        self.def = def;
        self.stack.clear();
        self.vars.clear();
        self.blocks.clear();
    }

    #[inline]
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Variables in binding order.
    #[inline]
    pub fn vars(&self) -> &[(Sym, Value)] {
        &self.vars
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Fail unless at least `n` values are on the stack.
    #[inline]
    pub fn require(&self, n: usize) -> RunResult {
        if self.stack.len() < n {
            return Err(stack_underflow(n, self.stack.len()));
        }
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> RunResult<Value> {
        self.stack.pop().ok_or_else(|| stack_underflow(1, 0))
    }

    /// Pop two values, returning `(nos, tos)`.
    #[inline]
    pub fn pop2(&mut self) -> RunResult<(Value, Value)> {
        self.require(2)?;
        let tos = self.pop()?;
        let nos = self.pop()?;
        Ok((nos, tos))
    }

    /// Value `depth` slots below the top (0 is TOS).
    #[inline]
    pub fn peek(&self, depth: usize) -> RunResult<Value> {
        self.require(depth + 1)?;
        Ok(self.stack[self.stack.len() - 1 - depth])
    }

    /// Mutable top of stack.
    #[inline]
    pub fn tos_mut(&mut self) -> RunResult<&mut Value> {
        let depth = self.stack.len();
        self.stack.last_mut().ok_or_else(|| stack_underflow(1, depth))
    }

    pub fn get_var(&self, name: Sym) -> Option<Value> {
        self.vars.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    /// Overwrite `name` if bound, else add it.
    pub fn set_var(&mut self, name: Sym, value: Value) {
        match self.vars.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name, value)),
        }
    }

    #[inline]
    pub(crate) fn push_block(&mut self, kind: BlockKind, code: Value) {
        self.blocks.push(Block::new(kind, code));
    }

    /// Run end-of-pass logic on the innermost block.
    pub(crate) fn end_of_pass(&mut self, pool: &Pool) {
        let Some(block) = self.blocks.last_mut() else {
            return;
        };
        match &mut block.kind {
            BlockKind::For { latch } => {
                let latch = *latch;
                block.restart();
                self.push_block(BlockKind::Basic, latch);
            }
            BlockKind::IntFor { i, .. } => {
                *i += 1;
                block.restart();
            }
            BlockKind::ListFor { cursor } => {
                if let Value::Pair(id) = *cursor {
                    *cursor = pool.pair(id).tail;
                }
                block.restart();
            }
            BlockKind::Basic | BlockKind::Do => {
                self.blocks.pop();
            }
        }
    }

    /// Pop blocks until the innermost loop block is on top. Fails if the
    /// frame has none.
    pub(crate) fn unwind_to_loop(&mut self) -> RunResult<&mut Block> {
        while self.blocks.last().is_some_and(|b| !b.is_loop()) {
            self.blocks.pop();
        }
        self.blocks.last_mut().ok_or_else(crate::errors::outside_loop)
    }
}
