//! Tagged runtime values.
//!
//! A [`Value`] is a small `Copy` enum. Scalars (null, bools, ints, symbols,
//! nil) are stored inline; everything else is a handle into the
//! [`Pool`](crate::Pool). Copying a `Value` copies the handle, so two copies
//! of a composite value always refer to the same arena object.

use crate::Sym;

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
            #[repr(transparent)]
            pub struct $name(u32);

            impl $name {
                #[inline]
                pub(crate) fn new(index: usize) -> Self {
                    #[expect(
                        clippy::cast_possible_truncation,
                        reason = "arena indices are bounded by available memory"
                    )]
                    let raw = index as u32;
                    $name(raw)
                }

                #[inline]
                pub const fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

define_id! {
    /// Handle to a byte string.
    StrId;
    /// Handle to a list cell.
    PairId;
    /// Handle to an array.
    ArrayId;
    /// Handle to a dict.
    DictId;
    /// Handle to a fixed-shape struct.
    StructId;
    /// Handle to a queue.
    QueueId;
    /// Handle to a closure.
    ClosureId;
}

/// A runtime value.
///
/// Equality is identity: handles compare by arena index, scalars by value.
/// Use the pool for structural comparisons (e.g. string contents).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Sym(Sym),
    Str(StrId),
    /// The empty list.
    Nil,
    /// A non-empty list cell.
    Pair(PairId),
    Array(ArrayId),
    Dict(DictId),
    Struct(StructId),
    Queue(QueueId),
    Closure(ClosureId),
}

impl Value {
    /// True for nil and list cells.
    #[inline]
    pub fn is_list(self) -> bool {
        matches!(self, Value::Nil | Value::Pair(_))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Sym> for Value {
    fn from(sym: Sym) -> Self {
        Value::Sym(sym)
    }
}
