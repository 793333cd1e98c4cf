//! Core data model for the Knot runtime.
//!
//! - [`Value`]: `Copy` tagged value; composites are arena handles
//! - [`SymbolTable`] / [`Sym`]: interned names
//! - [`Pool`]: arena owning every composite value and the symbol table
//! - [`Dict`]: open-addressed symbol-keyed map backing `dict` values
//!
//! Nothing in the pool is freed individually; a runtime owns one pool for
//! its whole lifetime.

mod dict;
mod pool;
mod print;
pub mod stack;
mod symbol;
pub mod value;

pub use dict::Dict;
pub use pool::{Closure, ListIter, Pair, Pool, Queue, Struct};
pub use print::{ValueDisplay, MAX_DEPTH};
pub use symbol::{InternError, Sym, SymbolTable};
pub use value::Value;
