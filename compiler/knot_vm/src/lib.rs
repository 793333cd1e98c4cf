//! Knot VM - stack-based virtual machine for Knot programs.
//!
//! # Architecture
//!
//! - [`Machine`]: owns the pool, the module registry and the call stack;
//!   [`Machine::step`] runs one code element, [`Machine::run`] steps until
//!   the call stack is empty
//! - [`Frame`] / [`Block`]: one def activation and its control blocks;
//!   loops and calls never recurse on the host stack
//! - [`Registry`]: modules, defs and their import scopes, filled by
//!   [`Machine::load_source`]
//! - [`OpTable`]: instruction dispatch by symbol handle
//! - [`PrintHandler`]: where `p` and friends write (stdout, a buffer for
//!   tests, or nowhere)
//!
//! # Example
//!
//! ```
//! use knot_vm::{buffer_handler, Machine};
//!
//! let output = buffer_handler();
//! let mut vm = Machine::builder().print_handler(output.clone()).build();
//! vm.load_source("demo", "def main () () (2 3 add p)").unwrap();
//! vm.call("", "main").unwrap();
//! assert_eq!(output.get_output(), "5\n");
//! ```

pub mod errors;
mod exec;
mod frame;
mod load;
mod machine;
mod opcode;
mod print_handler;
mod registry;

pub use errors::{LoadError, LoadErrorKind, RunResult, RuntimeError, RuntimeErrorKind};
pub use frame::{Block, BlockKind, Frame};
pub use machine::{Machine, MachineBuilder, MachineConfig, Step};
pub use opcode::{Op, OpTable};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use registry::{Def, DefId, Module, Ref, Registry, Scope};

pub use knot_ir::{Pool, Sym, Value};
