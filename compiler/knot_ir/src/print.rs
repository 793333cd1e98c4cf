//! One-line rendering of values.
//!
//! Lists print as `(a b c)`, arrays as `[a b c]`, dicts and structs as
//! `dict{k: v}` / `obj{k: v}`, queues as `queue(a b)` and closures as
//! `<fun module.name (args)>`. Booleans print as `T`/`F`, matching their
//! literal instructions.
//!
//! Arrays, dicts and structs are mutable and can contain themselves, so
//! nesting is cut off at [`MAX_DEPTH`].

use crate::stack::ensure_sufficient_stack;
use crate::{Pool, Value};
use std::fmt::{self, Write};

/// Nesting depth past which values print as `...`.
pub const MAX_DEPTH: usize = 32;

/// `Display` adapter returned by [`Pool::display`].
pub struct ValueDisplay<'a> {
    pool: &'a Pool,
    value: Value,
}

impl Pool {
    /// Render `value` on one line.
    pub fn display(&self, value: Value) -> ValueDisplay<'_> {
        ValueDisplay { pool: self, value }
    }
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self.pool, self.value, 0, f)
    }
}

fn write_value(pool: &Pool, value: Value, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if depth > MAX_DEPTH {
        return f.write_str("...");
    }
    ensure_sufficient_stack(|| match value {
        Value::Null => f.write_str("null"),
        Value::Bool(true) => f.write_str("T"),
        Value::Bool(false) => f.write_str("F"),
        Value::Int(i) => write!(f, "{i}"),
        Value::Sym(sym) => f.write_str(pool.sym_name(sym)),
        Value::Str(id) => write_str_literal(pool.str_bytes(id), f),
        Value::Nil => f.write_str("()"),
        Value::Pair(_) => {
            f.write_char('(')?;
            let mut cur = value;
            let mut first = true;
            while let Value::Pair(id) = cur {
                if !first {
                    f.write_char(' ')?;
                }
                first = false;
                let pair = pool.pair(id);
                write_value(pool, pair.head, depth + 1, f)?;
                cur = pair.tail;
            }
            if cur != Value::Nil {
                f.write_str(" . ")?;
                write_value(pool, cur, depth + 1, f)?;
            }
            f.write_char(')')
        }
        Value::Array(id) => {
            f.write_char('[')?;
            for (i, item) in pool.array(id).iter().enumerate() {
                if i > 0 {
                    f.write_char(' ')?;
                }
                write_value(pool, *item, depth + 1, f)?;
            }
            f.write_char(']')
        }
        Value::Dict(id) => {
            f.write_str("dict{")?;
            for (i, (k, v)) in pool.dict(id).iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", pool.sym_name(k))?;
                write_value(pool, v, depth + 1, f)?;
            }
            f.write_char('}')
        }
        Value::Struct(id) => {
            f.write_str("obj{")?;
            for (i, (k, v)) in pool.struct_(id).fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", pool.sym_name(*k))?;
                write_value(pool, *v, depth + 1, f)?;
            }
            f.write_char('}')
        }
        Value::Queue(id) => {
            f.write_str("queue")?;
            match pool.queue(id).first {
                Value::Nil => f.write_str("()"),
                first => write_value(pool, first, depth + 1, f),
            }
        }
        Value::Closure(id) => {
            let closure = pool.closure(id);
            write!(
                f,
                "<fun {}.{} ",
                pool.sym_name(closure.module),
                pool.sym_name(closure.name)
            )?;
            write_value(pool, closure.args, depth + 1, f)?;
            f.write_char('>')
        }
    })
}

fn write_str_literal(bytes: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for &b in bytes {
        match b {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\t' => f.write_str("\\t")?,
            0 => f.write_str("\\0")?,
            0x20..=0x7e => f.write_char(char::from(b))?,
            _ => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_char('"')
}
