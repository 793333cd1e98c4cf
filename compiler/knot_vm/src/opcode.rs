//! Instruction vocabulary, the symbol-to-opcode table and the symbols
//! `typeof` answers with.
//!
//! Every opcode name is interned once when a machine is built. Dispatch is
//! then an index into a dense table keyed by symbol, so looking up an
//! instruction never hashes or compares text.

use knot_ir::{Pool, Sym, Value};

macro_rules! opcodes {
    ($($variant:ident => $name:literal,)*) => {
        /// A built-in instruction.
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum Op {
            $($variant,)*
        }

        impl Op {
            pub const ALL: &'static [Op] = &[$(Op::$variant,)*];

            /// Source name of the instruction.
            pub fn name(self) -> &'static str {
                match self {
                    $(Op::$variant => $name,)*
                }
            }
        }
    };
}

opcodes! {
    // Literals
    Ignore => "ignore",
    Null => "null",
    True => "T",
    False => "F",
    SymLit => "'",
    Nil => "nil",
    List => "list",

    // Stack
    Dup => "dup",
    Drop => "drop",
    Swap => "swap",
    Nip => "nip",
    Tuck => "tuck",
    Over => "over",

    // Variables
    VarGet => "var_get",
    VarSet => "var_set",
    Vars => "vars",

    // Type queries
    IsNull => "is_null",
    IsBool => "is_bool",
    IsInt => "is_int",
    IsSym => "is_sym",
    IsStr => "is_str",
    IsNil => "is_nil",
    IsCell => "is_cell",
    IsList => "is_list",
    IsQueue => "is_queue",
    IsArr => "is_arr",
    IsDict => "is_dict",
    IsObj => "is_obj",
    IsFun => "is_fun",
    TypeOf => "typeof",

    // Booleans and arithmetic
    Not => "not",
    BoolEq => "bool_eq",
    Add => "add",
    Sub => "sub",
    Mul => "mul",
    Div => "div",
    Mod => "mod",
    Eq => "eq",
    Ne => "ne",
    Lt => "lt",
    Le => "le",
    Gt => "gt",
    Ge => "ge",
    SymEq => "sym_eq",

    // Lists
    Push => "push",
    Pop => "pop",
    Head => "head",
    Tail => "tail",
    ListLen => "list_len",
    Rev => "rev",
    Flat => "flat",
    RevFlat => "rev_flat",

    // Queues
    Queue => "queue",
    QueuePush => "queue_push",
    QueueToList => "queue_tolist",
    ListToQueue => "list_toqueue",

    // Structs
    Obj => "obj",
    ObjGet => "obj_get",
    ObjSet => "obj_set",
    ObjLen => "obj_len",
    ObjIgetKey => "obj_iget_key",
    ObjIgetVal => "obj_iget_val",

    // Dicts
    Dict => "dict",
    Has => "has",
    Get => "get",
    Set => "set",
    Del => "del",
    DictLen => "dict_len",
    DictNKeys => "dict_n_keys",
    DictIhas => "dict_ihas",
    DictIgetKey => "dict_iget_key",
    DictIgetVal => "dict_iget_val",

    // Arrays
    Arr => "arr",
    ArrLen => "arr_len",
    ArrIget => "arr_iget",
    ArrIset => "arr_iset",

    // Strings
    StrLen => "str_len",
    StrGetbyte => "str_getbyte",
    StrSetbyte => "str_setbyte",
    StrEq => "str_eq",
    StrJoin => "str_join",
    StrClone => "str_clone",
    SymToStr => "sym_tostr",
    StrToSym => "str_tosym",
    IntToStr => "int_tostr",

    // Calls and closures
    Call => "call",
    Ref => "ref",
    Longcall => "longcall",
    FunCall => "fun_call",
    Longref => "longref",
    Apply => "apply",
    FunModule => "fun_module",
    FunName => "fun_name",
    FunArgs => "fun_args",
    Ret => "ret",

    // Control
    If => "if",
    Ifelse => "ifelse",
    And => "and",
    Or => "or",
    Do => "do",
    For => "for",
    IntFor => "int_for",
    ListFor => "list_for",
    Next => "next",
    Break => "break",
    While => "while",

    // Diagnostics
    P => "p",
    StrP => "str_p",
    Assert => "assert",
    Error => "error",
    PStack => "p_stack",
    PVars => "p_vars",
    PBlocks => "p_blocks",
    PFrame => "p_frame",
}

/// Dense map from symbol index to opcode.
pub struct OpTable {
    by_sym: Vec<Option<Op>>,
}

impl OpTable {
    /// Intern every opcode name in `pool` and build the table.
    pub fn new(pool: &mut Pool) -> Self {
        let mut by_sym = Vec::new();
        for &op in Op::ALL {
            let sym = pool.intern(op.name());
            if by_sym.len() <= sym.index() {
                by_sym.resize(sym.index() + 1, None);
            }
            by_sym[sym.index()] = Some(op);
        }
        OpTable { by_sym }
    }

    #[inline]
    pub fn get(&self, sym: Sym) -> Option<Op> {
        self.by_sym.get(sym.index()).copied().flatten()
    }
}

/// Result symbols of `typeof`, interned at build.
#[derive(Copy, Clone)]
pub(crate) struct TypeNames {
    null: Sym,
    bool: Sym,
    int: Sym,
    sym: Sym,
    str: Sym,
    list: Sym,
    queue: Sym,
    arr: Sym,
    dict: Sym,
    obj: Sym,
    fun: Sym,
}

impl TypeNames {
    pub(crate) fn new(pool: &mut Pool) -> Self {
        TypeNames {
            null: pool.intern("null"),
            bool: pool.intern("bool"),
            int: pool.intern("int"),
            sym: pool.intern("sym"),
            str: pool.intern("str"),
            list: pool.intern("list"),
            queue: pool.intern("queue"),
            arr: pool.intern("arr"),
            dict: pool.intern("dict"),
            obj: pool.intern("obj"),
            fun: pool.intern("fun"),
        }
    }

    /// Nil and cells are both `list`.
    pub(crate) fn of(&self, value: Value) -> Sym {
        match value {
            Value::Null => self.null,
            Value::Bool(_) => self.bool,
            Value::Int(_) => self.int,
            Value::Sym(_) => self.sym,
            Value::Str(_) => self.str,
            Value::Nil | Value::Pair(_) => self.list,
            Value::Queue(_) => self.queue,
            Value::Array(_) => self.arr,
            Value::Dict(_) => self.dict,
            Value::Struct(_) => self.obj,
            Value::Closure(_) => self.fun,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_round_trips() {
        let mut pool = Pool::new();
        let table = OpTable::new(&mut pool);
        for &op in Op::ALL {
            let sym = pool.intern(op.name());
            assert_eq!(table.get(sym), Some(op), "{}", op.name());
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = Op::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn unknown_and_later_symbols_miss() {
        let mut pool = Pool::new();
        let table = OpTable::new(&mut pool);
        let late = pool.intern("not_an_instruction");
        assert_eq!(table.get(late), None);
        assert_eq!(table.get(knot_ir::Sym::EMPTY), None);
    }

    #[test]
    fn type_names_are_interned_up_front() {
        let mut pool = Pool::new();
        let names = TypeNames::new(&mut pool);
        let before = pool.symbols.len();
        let cases = [
            (Value::Null, "null"),
            (Value::Bool(true), "bool"),
            (Value::Int(3), "int"),
            (Value::Nil, "list"),
            (pool.cons(Value::Int(1), Value::Nil), "list"),
            (pool.alloc_queue(), "queue"),
            (pool.alloc_dict(), "dict"),
        ];
        for (value, expected) in cases {
            assert_eq!(pool.sym_name(names.of(value)), expected);
        }
        assert_eq!(pool.symbols.len(), before);
    }
}
