//! Instruction handlers.
//!
//! [`Machine::exec`] maps each [`Op`] to a handler; the handlers are split
//! by family:
//! - `stack`: literals, shuffles and variables
//! - `scalar`: type queries, booleans, integer arithmetic
//! - `data`: lists, queues, structs, dicts, arrays and strings
//! - `call`: calls, closures and `ret`
//! - `control`: conditionals and loops
//! - `diag`: printing, assertions and dumps

mod call;
mod control;
mod data;
mod diag;
mod scalar;
mod stack;

use crate::errors::{index_out_of_bounds, type_mismatch, RunResult, RuntimeError};
use crate::machine::{FramePart, Machine};
use crate::opcode::Op;
use knot_ir::value::{ArrayId, ClosureId, DictId, PairId, QueueId, StrId, StructId};
use knot_ir::{Pool, Sym, Value};

impl Machine {
    /// Run one instruction. Inline operands are read from the current block.
    pub(crate) fn exec(&mut self, op: Op) -> RunResult {
        match op {
            // Literals
            Op::Ignore => self.operand().map(drop),
            Op::Null => self.push_value(Value::Null),
            Op::True => self.push_value(Value::Bool(true)),
            Op::False => self.push_value(Value::Bool(false)),
            Op::SymLit => self.exec_sym_lit(),
            Op::Nil => self.push_value(Value::Nil),
            Op::List => self.exec_list_lit(),

            // Stack
            Op::Dup => self.exec_dup(),
            Op::Drop => self.exec_drop(),
            Op::Swap => self.exec_swap(),
            Op::Nip => self.exec_nip(),
            Op::Tuck => self.exec_tuck(),
            Op::Over => self.exec_over(),

            // Variables
            Op::VarGet => self.exec_var_get(),
            Op::VarSet => self.exec_var_set(),
            Op::Vars => self.exec_vars(),

            // Type queries
            Op::IsNull => self.type_query(|v| matches!(v, Value::Null)),
            Op::IsBool => self.type_query(|v| matches!(v, Value::Bool(_))),
            Op::IsInt => self.type_query(|v| matches!(v, Value::Int(_))),
            Op::IsSym => self.type_query(|v| matches!(v, Value::Sym(_))),
            Op::IsStr => self.type_query(|v| matches!(v, Value::Str(_))),
            Op::IsNil => self.type_query(|v| matches!(v, Value::Nil)),
            Op::IsCell => self.type_query(|v| matches!(v, Value::Pair(_))),
            Op::IsList => self.type_query(Value::is_list),
            Op::IsQueue => self.type_query(|v| matches!(v, Value::Queue(_))),
            Op::IsArr => self.type_query(|v| matches!(v, Value::Array(_))),
            Op::IsDict => self.type_query(|v| matches!(v, Value::Dict(_))),
            Op::IsObj => self.type_query(|v| matches!(v, Value::Struct(_))),
            Op::IsFun => self.type_query(|v| matches!(v, Value::Closure(_))),
            Op::TypeOf => self.exec_typeof(),

            // Booleans and integers
            Op::Not => self.exec_not(),
            Op::BoolEq => self.exec_bool_eq(),
            Op::Add => self.int_binop(|a, b| checked(a.checked_add(b), "add")),
            Op::Sub => self.int_binop(|a, b| checked(a.checked_sub(b), "sub")),
            Op::Mul => self.int_binop(|a, b| checked(a.checked_mul(b), "mul")),
            Op::Div => self.int_binop(scalar::div),
            Op::Mod => self.int_binop(scalar::rem),
            Op::Eq => self.int_binop(|a, b| Ok(Value::Bool(a == b))),
            Op::Ne => self.int_binop(|a, b| Ok(Value::Bool(a != b))),
            Op::Lt => self.int_binop(|a, b| Ok(Value::Bool(a < b))),
            Op::Le => self.int_binop(|a, b| Ok(Value::Bool(a <= b))),
            Op::Gt => self.int_binop(|a, b| Ok(Value::Bool(a > b))),
            Op::Ge => self.int_binop(|a, b| Ok(Value::Bool(a >= b))),
            Op::SymEq => self.exec_sym_eq(),

            // Lists
            Op::Push => self.exec_push(),
            Op::Pop => self.exec_pop(),
            Op::Head => self.exec_head(),
            Op::Tail => self.exec_tail(),
            Op::ListLen => self.exec_list_len(),
            Op::Rev => self.exec_rev(),
            Op::Flat => self.exec_flat(false),
            Op::RevFlat => self.exec_flat(true),

            // Queues
            Op::Queue => {
                let queue = self.pool.alloc_queue();
                self.push_value(queue)
            }
            Op::QueuePush => self.exec_queue_push(),
            Op::QueueToList => self.exec_queue_to_list(),
            Op::ListToQueue => self.exec_list_to_queue(),

            // Structs
            Op::Obj => self.exec_obj(),
            Op::ObjGet => self.exec_obj_get(),
            Op::ObjSet => self.exec_obj_set(),
            Op::ObjLen => self.exec_obj_len(),
            Op::ObjIgetKey => self.exec_obj_iget(true),
            Op::ObjIgetVal => self.exec_obj_iget(false),

            // Dicts
            Op::Dict => {
                let dict = self.pool.alloc_dict();
                self.push_value(dict)
            }
            Op::Has => self.exec_has(),
            Op::Get => self.exec_get(),
            Op::Set => self.exec_set(),
            Op::Del => self.exec_del(),
            Op::DictLen => self.exec_dict_len(),
            Op::DictNKeys => self.exec_dict_n_keys(),
            Op::DictIhas => self.exec_dict_ihas(),
            Op::DictIgetKey => self.exec_dict_iget(true),
            Op::DictIgetVal => self.exec_dict_iget(false),

            // Arrays
            Op::Arr => self.exec_arr(),
            Op::ArrLen => self.exec_arr_len(),
            Op::ArrIget => self.exec_arr_iget(),
            Op::ArrIset => self.exec_arr_iset(),

            // Strings
            Op::StrLen => self.exec_str_len(),
            Op::StrGetbyte => self.exec_str_getbyte(),
            Op::StrSetbyte => self.exec_str_setbyte(),
            Op::StrEq => self.exec_str_eq(),
            Op::StrJoin => self.exec_str_join(),
            Op::StrClone => self.exec_str_clone(),
            Op::SymToStr => self.exec_sym_tostr(),
            Op::StrToSym => self.exec_str_tosym(),
            Op::IntToStr => self.exec_int_tostr(),

            // Calls and closures
            Op::Call => self.exec_call(),
            Op::Ref => self.exec_ref(),
            Op::Longcall => self.exec_longcall(),
            Op::FunCall => self.exec_fun_call(),
            Op::Longref => self.exec_longref(),
            Op::Apply => self.exec_apply(),
            Op::FunModule => self.exec_fun_field(|c| Value::Sym(c.module)),
            Op::FunName => self.exec_fun_field(|c| Value::Sym(c.name)),
            Op::FunArgs => self.exec_fun_field(|c| c.args),
            Op::Ret => self.exec_ret(),

            // Control
            Op::If => self.exec_if(),
            Op::Ifelse => self.exec_ifelse(),
            Op::And => self.exec_short_circuit(true),
            Op::Or => self.exec_short_circuit(false),
            Op::Do => self.exec_do(),
            Op::For => self.exec_for(),
            Op::IntFor => self.exec_int_for(),
            Op::ListFor => self.exec_list_for(),
            Op::Next => self.exec_next(),
            Op::Break => self.exec_break(),
            Op::While => self.exec_while(),

            // Diagnostics
            Op::P => self.exec_p(),
            Op::StrP => self.exec_str_p(),
            Op::Assert => self.exec_assert(),
            Op::Error => self.exec_error(),
            Op::PStack => self.exec_dump(FramePart::Stack),
            Op::PVars => self.exec_dump(FramePart::Vars),
            Op::PBlocks => self.exec_dump(FramePart::Blocks),
            Op::PFrame => self.exec_dump(FramePart::All),
        }
    }
}

// Operand coercions. Each fails with the operand's dump.

pub(crate) fn mismatch(pool: &Pool, expected: &'static str, value: Value) -> RuntimeError {
    type_mismatch(expected, pool.display(value).to_string())
}

pub(crate) fn as_int(pool: &Pool, value: Value) -> RunResult<i64> {
    match value {
        Value::Int(i) => Ok(i),
        other => Err(mismatch(pool, "int", other)),
    }
}

pub(crate) fn as_bool(pool: &Pool, value: Value) -> RunResult<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(mismatch(pool, "bool", other)),
    }
}

pub(crate) fn as_sym(pool: &Pool, value: Value) -> RunResult<Sym> {
    match value {
        Value::Sym(sym) => Ok(sym),
        other => Err(mismatch(pool, "sym", other)),
    }
}

pub(crate) fn as_str(pool: &Pool, value: Value) -> RunResult<StrId> {
    match value {
        Value::Str(id) => Ok(id),
        other => Err(mismatch(pool, "str", other)),
    }
}

/// A non-empty list.
pub(crate) fn as_pair(pool: &Pool, value: Value) -> RunResult<PairId> {
    match value {
        Value::Pair(id) => Ok(id),
        other => Err(mismatch(pool, "cell", other)),
    }
}

/// Nil or a cell, returned unchanged.
pub(crate) fn as_list(pool: &Pool, value: Value) -> RunResult<Value> {
    if value.is_list() {
        Ok(value)
    } else {
        Err(mismatch(pool, "list", value))
    }
}

pub(crate) fn as_array(pool: &Pool, value: Value) -> RunResult<ArrayId> {
    match value {
        Value::Array(id) => Ok(id),
        other => Err(mismatch(pool, "arr", other)),
    }
}

pub(crate) fn as_dict(pool: &Pool, value: Value) -> RunResult<DictId> {
    match value {
        Value::Dict(id) => Ok(id),
        other => Err(mismatch(pool, "dict", other)),
    }
}

pub(crate) fn as_struct(pool: &Pool, value: Value) -> RunResult<StructId> {
    match value {
        Value::Struct(id) => Ok(id),
        other => Err(mismatch(pool, "obj", other)),
    }
}

pub(crate) fn as_queue(pool: &Pool, value: Value) -> RunResult<QueueId> {
    match value {
        Value::Queue(id) => Ok(id),
        other => Err(mismatch(pool, "queue", other)),
    }
}

pub(crate) fn as_closure(pool: &Pool, value: Value) -> RunResult<ClosureId> {
    match value {
        Value::Closure(id) => Ok(id),
        other => Err(mismatch(pool, "fun", other)),
    }
}

/// Bounds-check `index` against `len`.
pub(crate) fn index(index: i64, len: usize) -> RunResult<usize> {
    match usize::try_from(index) {
        Ok(i) if i < len => Ok(i),
        _ => Err(index_out_of_bounds(index, len)),
    }
}

/// A length as an int value.
pub(crate) fn len_value(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

fn checked(result: Option<i64>, operation: &'static str) -> RunResult<Value> {
    result
        .map(Value::Int)
        .ok_or_else(|| crate::errors::integer_overflow(operation))
}
