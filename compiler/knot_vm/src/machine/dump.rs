//! Text dumps of frames and loaded modules.
//!
//! ```text
//! FRAME demo.main:
//!   STACK (2): 1 "two"
//!   VARS (1): x=3
//!   BLOCKS (2):
//!     basic (2 3 add p)
//!     int_for 1/4 (dup p)
//! ```

use std::fmt;

use super::Machine;
use crate::frame::{Block, BlockKind, Frame};
use knot_ir::Sym;

/// Which sections of a frame to render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FramePart {
    Stack,
    Vars,
    Blocks,
    All,
}

/// `Display` adapter for one frame.
pub(crate) struct FrameDump<'a> {
    machine: &'a Machine,
    frame: &'a Frame,
    part: FramePart,
}

impl fmt::Display for FrameDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pool = &self.machine.pool;
        let frame = self.frame;
        let all = self.part == FramePart::All;
        if all {
            writeln!(f, "FRAME {}:", self.machine.def_label(frame.def))?;
        }
        let indent = if all { "  " } else { "" };

        if all || self.part == FramePart::Stack {
            write!(f, "{indent}STACK ({}):", frame.stack.len())?;
            for value in &frame.stack {
                write!(f, " {}", pool.display(*value))?;
            }
            writeln!(f)?;
        }
        if all || self.part == FramePart::Vars {
            write!(f, "{indent}VARS ({}):", frame.vars.len())?;
            for (name, value) in &frame.vars {
                write!(f, " {}={}", pool.sym_name(*name), pool.display(*value))?;
            }
            writeln!(f)?;
        }
        if all || self.part == FramePart::Blocks {
            writeln!(f, "{indent}BLOCKS ({}):", frame.blocks.len())?;
            for block in &frame.blocks {
                writeln!(f, "{indent}  {}", BlockDump { machine: self.machine, block })?;
            }
        }
        Ok(())
    }
}

struct BlockDump<'a> {
    machine: &'a Machine,
    block: &'a Block,
}

impl fmt::Display for BlockDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pool = &self.machine.pool;
        write!(f, "{}", self.block.kind.name())?;
        match self.block.kind {
            BlockKind::Basic | BlockKind::Do => {}
            BlockKind::For { latch } => write!(f, " latch={}", pool.display(latch))?,
            BlockKind::IntFor { i, n } => write!(f, " {i}/{n}")?,
            BlockKind::ListFor { cursor } => write!(f, " cursor={}", pool.display(cursor))?,
        }
        write!(f, " {}", pool.display(self.block.code))
    }
}

impl Machine {
    pub(crate) fn frame_dump<'a>(&'a self, frame: &'a Frame, part: FramePart) -> FrameDump<'a> {
        FrameDump {
            machine: self,
            frame,
            part,
        }
    }

    /// Every live frame, innermost first.
    pub fn dump_frames(&self) -> String {
        self.frames
            .iter()
            .rev()
            .map(|frame| self.frame_dump(frame, FramePart::All).to_string())
            .collect()
    }

    /// Every loaded module with its defs and their import scopes.
    pub fn dump_modules(&self) -> String {
        let pool = &self.pool;
        let names = |syms: &[Sym]| -> String {
            syms.iter()
                .map(|s| pool.sym_name(*s))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut out = String::new();
        for module in self.registry.modules() {
            let mut defs = module.defs().peekable();
            if defs.peek().is_none() {
                continue;
            }
            out.push_str("MODULE ");
            out.push_str(pool.sym_name(module.name));
            out.push_str(":\n");
            for id in defs {
                let def = self.registry.def(id);
                out.push_str(&format!(
                    "  DEF {} ({}) -> ({}): {}\n",
                    pool.sym_name(def.name),
                    names(&def.args),
                    names(&def.rets),
                    pool.display(def.code)
                ));
                let mut scope: Vec<_> = def.scope.iter().collect();
                scope.sort_by_key(|(local, _)| pool.sym_name(**local));
                for (local, target) in scope {
                    out.push_str(&format!(
                        "    {} = {}.{}\n",
                        pool.sym_name(*local),
                        pool.sym_name(target.module),
                        pool.sym_name(target.def)
                    ));
                }
            }
        }
        out
    }
}
