//! Interned symbols.
//!
//! Every name in a Knot program (modules, defs, variables, struct and dict
//! keys, instruction opcodes) is a [`Sym`]. Interning the same text twice
//! yields the same handle, so name equality is a `u32` compare.

use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// Interned symbol handle.
///
/// A dense index into the owning [`SymbolTable`]. Handles from different
/// tables must not be mixed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Sym(u32);

impl Sym {
    /// Pre-interned empty symbol. Names the default module.
    pub const EMPTY: Sym = Sym(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sym({})", self.0)
    }
}

/// Error when interning a symbol fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Table exceeded `u32` capacity.
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "symbol table exceeded capacity: {count} symbols, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// Symbol table mapping text to [`Sym`] handles and back.
pub struct SymbolTable {
    map: FxHashMap<Rc<str>, Sym>,
    names: Vec<Rc<str>>,
}

impl SymbolTable {
    /// Create a table with the empty symbol pre-interned as [`Sym::EMPTY`].
    pub fn new() -> Self {
        let empty: Rc<str> = Rc::from("");
        let mut map = FxHashMap::default();
        map.insert(Rc::clone(&empty), Sym::EMPTY);
        SymbolTable {
            map,
            names: vec![empty],
        }
    }

    /// Try to intern `text`, returning an error on overflow.
    pub fn try_intern(&mut self, text: &str) -> Result<Sym, InternError> {
        if let Some(&sym) = self.map.get(text) {
            return Ok(sym);
        }
        let raw = u32::try_from(self.names.len()).map_err(|_| InternError::Overflow {
            count: self.names.len(),
        })?;
        let sym = Sym(raw);
        let owned: Rc<str> = Rc::from(text);
        self.names.push(Rc::clone(&owned));
        self.map.insert(owned, sym);
        Ok(sym)
    }

    /// Intern `text`.
    ///
    /// # Panics
    /// Panics if the table exceeds `u32::MAX` symbols.
    #[inline]
    pub fn intern(&mut self, text: &str) -> Sym {
        self.try_intern(text).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up an existing symbol without interning.
    pub fn lookup(&self, text: &str) -> Option<Sym> {
        self.map.get(text).copied()
    }

    /// Text of an interned symbol.
    #[inline]
    pub fn name(&self, sym: Sym) -> &str {
        &self.names[sym.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
