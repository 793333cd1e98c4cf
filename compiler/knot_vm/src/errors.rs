//! Error types for loading and running programs.
//!
//! Every runtime fault is fatal: there is no recovery, and side effects of
//! a partially executed instruction are not rolled back. `RuntimeErrorKind`
//! gives each fault a typed category; the factory functions below are the
//! construction API used by instruction handlers.

use knot_parse::ParseError;
use std::fmt;

/// Result of a single instruction or engine operation.
pub type RunResult<T = ()> = Result<T, RuntimeError>;

/// Typed category of a runtime fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    // Stack
    NoFrame,
    StackUnderflow {
        needed: usize,
        depth: usize,
    },
    MissingOperand,

    // Type
    TypeMismatch {
        expected: &'static str,
        got: String,
    },

    // Access
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    EmptySlot {
        index: i64,
    },
    KeyNotFound {
        key: String,
    },
    ByteOutOfRange {
        value: i64,
    },
    NegativeLength {
        len: i64,
    },
    AllocationFailed {
        len: i64,
    },

    // Arithmetic
    DivisionByZero,
    ModuloByZero,
    IntegerOverflow {
        operation: &'static str,
    },

    // Linkage
    UndefinedModule {
        name: String,
    },
    UndefinedDef {
        module: String,
        name: String,
    },
    UndefinedVariable {
        name: String,
    },
    ArityMismatch {
        def: String,
        expected: usize,
        got: usize,
    },
    ReturnMismatch {
        def: String,
        expected: usize,
        got: usize,
    },
    NoCaller {
        def: String,
        count: usize,
    },
    OutsideLoop,

    // Program-raised
    AssertionFailed,
    Raised {
        value: String,
    },

    // Dispatch
    UnknownInstruction {
        name: String,
    },
    StepLimitExceeded {
        limit: u64,
    },
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFrame => write!(f, "no active frame"),
            Self::StackUnderflow { needed, depth } => {
                write!(f, "stack underflow: needed {needed}, have {depth}")
            }
            Self::MissingOperand => write!(f, "missing inline operand"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::EmptySlot { index } => write!(f, "slot {index} is empty"),
            Self::KeyNotFound { key } => write!(f, "key not found: {key}"),
            Self::ByteOutOfRange { value } => write!(f, "byte value out of range: {value}"),
            Self::NegativeLength { len } => write!(f, "negative length: {len}"),
            Self::AllocationFailed { len } => write!(f, "couldn't allocate {len} elements"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulo by zero"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }
            Self::UndefinedModule { name } => write!(f, "undefined module: {name}"),
            Self::UndefinedDef { module, name } => write!(f, "undefined def: {module} {name}"),
            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::ArityMismatch { def, expected, got } => {
                write!(f, "{def} expects {expected} arguments, caller has {got}")
            }
            Self::ReturnMismatch { def, expected, got } => {
                write!(f, "{def} returns {expected} values, stack has {got}")
            }
            Self::NoCaller { def, count } => {
                write!(f, "{def} transfers {count} values but has no caller")
            }
            Self::OutsideLoop => write!(f, "not allowed outside a loop"),
            Self::AssertionFailed => write!(f, "assertion failed"),
            Self::Raised { value } => write!(f, "error: {value}"),
            Self::UnknownInstruction { name } => write!(f, "unrecognized instruction: {name}"),
            Self::StepLimitExceeded { limit } => write!(f, "step limit of {limit} exceeded"),
        }
    }
}

/// Fatal runtime error.
#[derive(Clone, Debug)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    /// Instruction that failed, when the fault came from a handler.
    pub instruction: Option<String>,
    /// Dump of every live frame, attached by `Machine::run`.
    pub frames: Option<String>,
}

impl RuntimeError {
    fn from_kind(kind: RuntimeErrorKind) -> Self {
        RuntimeError {
            kind,
            instruction: None,
            frames: None,
        }
    }

    /// Record the failing instruction unless one is already set.
    #[must_use]
    pub fn with_instruction(mut self, name: &str) -> Self {
        if self.instruction.is_none() {
            self.instruction = Some(name.to_owned());
        }
        self
    }

    #[must_use]
    pub fn with_frames(mut self, dump: String) -> Self {
        self.frames = Some(dump);
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(inst) = &self.instruction {
            write!(f, "{inst}: ")?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(frames) = &self.frames {
            write!(f, "\n{frames}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {}

#[cold]
pub fn no_frame() -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::NoFrame)
}

#[cold]
pub fn stack_underflow(needed: usize, depth: usize) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::StackUnderflow { needed, depth })
}

#[cold]
pub fn missing_operand() -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::MissingOperand)
}

/// `got` is the rendered offending value.
#[cold]
pub fn type_mismatch(expected: &'static str, got: String) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::TypeMismatch { expected, got })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn empty_slot(index: i64) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::EmptySlot { index })
}

#[cold]
pub fn key_not_found(key: &str) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::KeyNotFound {
        key: key.to_owned(),
    })
}

#[cold]
pub fn byte_out_of_range(value: i64) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::ByteOutOfRange { value })
}

#[cold]
pub fn negative_length(len: i64) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::NegativeLength { len })
}

#[cold]
pub fn allocation_failed(len: i64) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::AllocationFailed { len })
}

#[cold]
pub fn division_by_zero() -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::ModuloByZero)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn undefined_module(name: &str) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::UndefinedModule {
        name: name.to_owned(),
    })
}

#[cold]
pub fn undefined_def(module: &str, name: &str) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::UndefinedDef {
        module: module.to_owned(),
        name: name.to_owned(),
    })
}

#[cold]
pub fn undefined_variable(name: &str) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::UndefinedVariable {
        name: name.to_owned(),
    })
}

#[cold]
pub fn arity_mismatch(def: &str, expected: usize, got: usize) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::ArityMismatch {
        def: def.to_owned(),
        expected,
        got,
    })
}

#[cold]
pub fn return_mismatch(def: &str, expected: usize, got: usize) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::ReturnMismatch {
        def: def.to_owned(),
        expected,
        got,
    })
}

#[cold]
pub fn no_caller(def: &str, count: usize) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::NoCaller {
        def: def.to_owned(),
        count,
    })
}

#[cold]
pub fn outside_loop() -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::OutsideLoop)
}

#[cold]
pub fn assertion_failed() -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::AssertionFailed)
}

#[cold]
pub fn raised(value: String) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::Raised { value })
}

#[cold]
pub fn unknown_instruction(name: &str) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::UnknownInstruction {
        name: name.to_owned(),
    })
}

#[cold]
pub fn step_limit_exceeded(limit: u64) -> RuntimeError {
    RuntimeError::from_kind(RuntimeErrorKind::StepLimitExceeded { limit })
}

/// Typed category of a load-time error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadErrorKind {
    Parse(ParseError),
    /// A form ended before an expected element.
    Truncated {
        form: &'static str,
    },
    ExpectedSym {
        what: &'static str,
    },
    ExpectedList {
        what: &'static str,
    },
    /// A `from` entry that is neither `name` nor `(name -> alias)`.
    BadImport,
    ScopeConflict {
        name: String,
    },
    DuplicateDef {
        module: String,
        name: String,
    },
    UnknownForm,
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Truncated { form } => write!(f, "incomplete `{form}` form"),
            Self::ExpectedSym { what } => write!(f, "expected symbol for {what}"),
            Self::ExpectedList { what } => write!(f, "expected list for {what}"),
            Self::BadImport => write!(f, "expected `name` or `(name -> alias)`"),
            Self::ScopeConflict { name } => write!(f, "conflict: {name} already in scope"),
            Self::DuplicateDef { module, name } => {
                write!(f, "conflict: def {name} already in module {module}")
            }
            Self::UnknownForm => write!(f, "expected one of: module, from, def, docs"),
        }
    }
}

/// Error raised while reading or loading source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub kind: LoadErrorKind,
    /// Where the error was found: the source name, then the offending
    /// element if there is one.
    pub context: Vec<String>,
}

impl LoadError {
    pub(crate) fn new(kind: LoadErrorKind) -> Self {
        LoadError {
            kind,
            context: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::new(LoadErrorKind::Parse(err))
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for context in self.context.iter().rev() {
            write!(f, "{context}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LoadError {}
