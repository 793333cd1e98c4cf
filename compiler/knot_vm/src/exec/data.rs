//! Lists, queues, structs, dicts, arrays and strings.
//!
//! Composite handles are taken off the stack, checked and worked on in
//! the pool. Handlers that return the container (`d v k -- d`) push the
//! same handle back; mutation is visible through every copy.

use super::{
    as_array, as_dict, as_int, as_list, as_pair, as_queue, as_str, as_struct, as_sym, index,
    len_value,
};
use crate::errors::{
    allocation_failed, byte_out_of_range, empty_slot, key_not_found, negative_length, RunResult,
};
use crate::machine::Machine;
use knot_ir::{Pair, Pool, Value};

impl Machine {
    /// Replace TOS with `f(pool, tos)`.
    fn map_tos(&mut self, f: impl FnOnce(&mut Pool, Value) -> RunResult<Value>) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let tos = frame.tos_mut()?;
        *tos = f(pool, *tos)?;
        Ok(())
    }

    /// `a b -- f(pool, a, b)`
    fn binary(&mut self, f: impl FnOnce(&mut Pool, Value, Value) -> RunResult<Value>) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let (a, b) = frame.pop2()?;
        let result = f(pool, a, b)?;
        frame.push(result);
        Ok(())
    }

    /// `a b c -- f(pool, a, b, c)`
    fn ternary(
        &mut self,
        f: impl FnOnce(&mut Pool, Value, Value, Value) -> RunResult<Value>,
    ) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        frame.require(3)?;
        let c = frame.pop()?;
        let b = frame.pop()?;
        let a = frame.pop()?;
        let result = f(pool, a, b, c)?;
        frame.push(result);
        Ok(())
    }

    // Lists

    /// `list x -- list'`
    pub(super) fn exec_push(&mut self) -> RunResult {
        self.binary(|pool, list, x| {
            let list = as_list(pool, list)?;
            Ok(pool.cons(x, list))
        })
    }

    /// `list -- tail head`
    pub(super) fn exec_pop(&mut self) -> RunResult {
        let (frame, pool) = self.frame_and_pool()?;
        let list = frame.pop()?;
        let Pair { head, tail } = pool.pair(as_pair(pool, list)?);
        frame.push(tail);
        frame.push(head);
        Ok(())
    }

    pub(super) fn exec_head(&mut self) -> RunResult {
        self.map_tos(|pool, list| Ok(pool.pair(as_pair(pool, list)?).head))
    }

    pub(super) fn exec_tail(&mut self) -> RunResult {
        self.map_tos(|pool, list| Ok(pool.pair(as_pair(pool, list)?).tail))
    }

    pub(super) fn exec_list_len(&mut self) -> RunResult {
        self.map_tos(|pool, list| Ok(len_value(pool.list_len(as_list(pool, list)?))))
    }

    pub(super) fn exec_rev(&mut self) -> RunResult {
        self.map_tos(|pool, list| {
            let list = as_list(pool, list)?;
            Ok(pool.rev_list(list))
        })
    }

    /// Copy a list into a fresh array, optionally reversed.
    pub(super) fn exec_flat(&mut self, reversed: bool) -> RunResult {
        self.map_tos(|pool, list| {
            let mut items = pool.list_to_vec(as_list(pool, list)?);
            if reversed {
                items.reverse();
            }
            Ok(pool.alloc_array(items))
        })
    }

    // Queues

    /// `q x -- q`
    pub(super) fn exec_queue_push(&mut self) -> RunResult {
        self.binary(|pool, queue, x| {
            pool.queue_push(as_queue(pool, queue)?, x);
            Ok(queue)
        })
    }

    pub(super) fn exec_queue_to_list(&mut self) -> RunResult {
        self.map_tos(|pool, queue| Ok(pool.queue(as_queue(pool, queue)?).first))
    }

    pub(super) fn exec_list_to_queue(&mut self) -> RunResult {
        self.map_tos(|pool, list| {
            let list = as_list(pool, list)?;
            Ok(pool.queue_from_list(list))
        })
    }

    // Structs

    pub(super) fn exec_obj(&mut self) -> RunResult {
        let keys = self.operand_list()?;
        let pool = &mut self.pool;
        let keys = pool
            .iter_list(keys)
            .map(|k| as_sym(pool, k))
            .collect::<RunResult<Vec<_>>>()?;
        let obj = pool.alloc_struct(keys);
        self.push_value(obj)
    }

    /// `s -- v`
    pub(super) fn exec_obj_get(&mut self) -> RunResult {
        let key = self.operand_sym()?;
        self.map_tos(|pool, obj| {
            pool.struct_(as_struct(pool, obj)?)
                .get(key)
                .ok_or_else(|| key_not_found(pool.sym_name(key)))
        })
    }

    /// `s v -- s`
    pub(super) fn exec_obj_set(&mut self) -> RunResult {
        let key = self.operand_sym()?;
        self.binary(|pool, obj, value| {
            if !pool.struct_mut(as_struct(pool, obj)?).set(key, value) {
                return Err(key_not_found(pool.sym_name(key)));
            }
            Ok(obj)
        })
    }

    pub(super) fn exec_obj_len(&mut self) -> RunResult {
        self.map_tos(|pool, obj| Ok(len_value(pool.struct_(as_struct(pool, obj)?).fields.len())))
    }

    /// `s i -- key` or `s i -- value`
    pub(super) fn exec_obj_iget(&mut self, key: bool) -> RunResult {
        self.binary(|pool, obj, i| {
            let fields = &pool.struct_(as_struct(pool, obj)?).fields;
            let (k, v) = fields[index(as_int(pool, i)?, fields.len())?];
            Ok(if key { Value::Sym(k) } else { v })
        })
    }

    // Dicts

    /// `d k -- bool`
    pub(super) fn exec_has(&mut self) -> RunResult {
        self.binary(|pool, dict, key| {
            let has = pool
                .dict(as_dict(pool, dict)?)
                .contains_key(as_sym(pool, key)?);
            Ok(Value::Bool(has))
        })
    }

    /// `d k -- v`
    pub(super) fn exec_get(&mut self) -> RunResult {
        self.binary(|pool, dict, key| {
            let key = as_sym(pool, key)?;
            pool.dict(as_dict(pool, dict)?)
                .get(key)
                .ok_or_else(|| key_not_found(pool.sym_name(key)))
        })
    }

    /// `d v k -- d`
    pub(super) fn exec_set(&mut self) -> RunResult {
        self.ternary(|pool, dict, value, key| {
            let key = as_sym(pool, key)?;
            pool.dict_mut(as_dict(pool, dict)?).insert(key, value);
            Ok(dict)
        })
    }

    /// `d k -- d`
    pub(super) fn exec_del(&mut self) -> RunResult {
        self.binary(|pool, dict, key| {
            let key = as_sym(pool, key)?;
            let removed = pool.dict_mut(as_dict(pool, dict)?).remove(key);
            if removed.is_none() {
                return Err(key_not_found(pool.sym_name(key)));
            }
            Ok(dict)
        })
    }

    /// Slot capacity, the bound for `dict_i*`.
    pub(super) fn exec_dict_len(&mut self) -> RunResult {
        self.map_tos(|pool, dict| Ok(len_value(pool.dict(as_dict(pool, dict)?).capacity())))
    }

    pub(super) fn exec_dict_n_keys(&mut self) -> RunResult {
        self.map_tos(|pool, dict| Ok(len_value(pool.dict(as_dict(pool, dict)?).len())))
    }

    /// `d i -- bool`
    pub(super) fn exec_dict_ihas(&mut self) -> RunResult {
        self.binary(|pool, dict, i| {
            let dict = pool.dict(as_dict(pool, dict)?);
            let slot = index(as_int(pool, i)?, dict.capacity())?;
            Ok(Value::Bool(dict.slot(slot).is_some()))
        })
    }

    /// `d i -- key` or `d i -- value`
    pub(super) fn exec_dict_iget(&mut self, key: bool) -> RunResult {
        self.binary(|pool, dict, i| {
            let dict = pool.dict(as_dict(pool, dict)?);
            let i = as_int(pool, i)?;
            let (k, v) = dict
                .slot(index(i, dict.capacity())?)
                .ok_or_else(|| empty_slot(i))?;
            Ok(if key { Value::Sym(k) } else { v })
        })
    }

    // Arrays

    /// `fill len -- a`
    pub(super) fn exec_arr(&mut self) -> RunResult {
        self.binary(|pool, fill, len| {
            let requested = as_int(pool, len)?;
            let len = usize::try_from(requested).map_err(|_| negative_length(requested))?;
            let mut items = Vec::new();
            items
                .try_reserve_exact(len)
                .map_err(|_| allocation_failed(requested))?;
            items.resize(len, fill);
            Ok(pool.alloc_array(items))
        })
    }

    pub(super) fn exec_arr_len(&mut self) -> RunResult {
        self.map_tos(|pool, arr| Ok(len_value(pool.array(as_array(pool, arr)?).len())))
    }

    /// `a i -- v`
    pub(super) fn exec_arr_iget(&mut self) -> RunResult {
        self.binary(|pool, arr, i| {
            let items = pool.array(as_array(pool, arr)?);
            Ok(items[index(as_int(pool, i)?, items.len())?])
        })
    }

    /// `a v i -- a`
    pub(super) fn exec_arr_iset(&mut self) -> RunResult {
        self.ternary(|pool, arr, value, i| {
            let (id, i) = (as_array(pool, arr)?, as_int(pool, i)?);
            let items = pool.array_mut(id);
            let slot = index(i, items.len())?;
            items[slot] = value;
            Ok(arr)
        })
    }

    // Strings

    pub(super) fn exec_str_len(&mut self) -> RunResult {
        self.map_tos(|pool, s| Ok(len_value(pool.str_bytes(as_str(pool, s)?).len())))
    }

    /// `s i -- byte`
    pub(super) fn exec_str_getbyte(&mut self) -> RunResult {
        self.binary(|pool, s, i| {
            let bytes = pool.str_bytes(as_str(pool, s)?);
            let byte = bytes[index(as_int(pool, i)?, bytes.len())?];
            Ok(Value::Int(i64::from(byte)))
        })
    }

    /// `s byte i -- s`
    pub(super) fn exec_str_setbyte(&mut self) -> RunResult {
        self.ternary(|pool, s, byte, i| {
            let (id, byte, i) = (as_str(pool, s)?, as_int(pool, byte)?, as_int(pool, i)?);
            let byte = u8::try_from(byte).map_err(|_| byte_out_of_range(byte))?;
            let bytes = pool.str_bytes_mut(id);
            let slot = index(i, bytes.len())?;
            bytes[slot] = byte;
            Ok(s)
        })
    }

    /// `a b -- bool`, by content.
    pub(super) fn exec_str_eq(&mut self) -> RunResult {
        self.binary(|pool, a, b| {
            let eq = pool.str_eq(as_str(pool, a)?, as_str(pool, b)?);
            Ok(Value::Bool(eq))
        })
    }

    /// `a b -- ab`, freshly allocated.
    pub(super) fn exec_str_join(&mut self) -> RunResult {
        self.binary(|pool, a, b| {
            let (a, b) = (as_str(pool, a)?, as_str(pool, b)?);
            let joined = [pool.str_bytes(a), pool.str_bytes(b)].concat();
            Ok(pool.alloc_str(joined))
        })
    }

    pub(super) fn exec_str_clone(&mut self) -> RunResult {
        self.map_tos(|pool, s| {
            let copy = pool.str_bytes(as_str(pool, s)?).to_vec();
            Ok(pool.alloc_str(copy))
        })
    }

    pub(super) fn exec_sym_tostr(&mut self) -> RunResult {
        self.map_tos(|pool, sym| {
            let text = pool.sym_name(as_sym(pool, sym)?).as_bytes().to_vec();
            Ok(pool.alloc_str(text))
        })
    }

    pub(super) fn exec_str_tosym(&mut self) -> RunResult {
        self.map_tos(|pool, s| {
            let text = String::from_utf8_lossy(pool.str_bytes(as_str(pool, s)?)).into_owned();
            Ok(Value::Sym(pool.intern(&text)))
        })
    }

    pub(super) fn exec_int_tostr(&mut self) -> RunResult {
        self.map_tos(|pool, i| {
            let text = as_int(pool, i)?.to_string();
            Ok(pool.alloc_str(text))
        })
    }
}
