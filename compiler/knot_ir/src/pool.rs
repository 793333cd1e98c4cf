//! Arena for every addressable runtime object.
//!
//! Nothing is freed individually: objects live until the pool is dropped,
//! and handles stay valid for that whole time. The pool also owns the
//! symbol table.

use crate::value::{ArrayId, ClosureId, DictId, PairId, QueueId, StrId, StructId};
use crate::{Dict, Sym, SymbolTable, Value};

/// A list cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub head: Value,
    pub tail: Value,
}

/// Fixed-shape record. Keys are set at construction and never change.
#[derive(Clone, Debug)]
pub struct Struct {
    pub fields: Vec<(Sym, Value)>,
}

impl Struct {
    pub fn get(&self, key: Sym) -> Option<Value> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Overwrite an existing field. Returns false if `key` is not a field.
    pub fn set(&mut self, key: Sym, value: Value) -> bool {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(field) => {
                field.1 = value;
                true
            }
            None => false,
        }
    }
}

/// List with an end pointer for O(1) append.
#[derive(Copy, Clone, Debug)]
pub struct Queue {
    /// First cell, or nil when empty.
    pub first: Value,
    pub last: Option<PairId>,
}

/// A def reference plus pending arguments.
#[derive(Copy, Clone, Debug)]
pub struct Closure {
    pub module: Sym,
    pub name: Sym,
    /// Pending arguments as a list; the most recently applied is the head.
    pub args: Value,
}

/// Arena owning all composite values and the symbol table.
#[derive(Default)]
pub struct Pool {
    pub symbols: SymbolTable,
    pairs: Vec<Pair>,
    strings: Vec<Vec<u8>>,
    arrays: Vec<Vec<Value>>,
    dicts: Vec<Dict<Value>>,
    structs: Vec<Struct>,
    queues: Vec<Queue>,
    closures: Vec<Closure>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` in the pool's symbol table.
    #[inline]
    pub fn intern(&mut self, text: &str) -> Sym {
        self.symbols.intern(text)
    }

    /// Existing symbol for `text`, without interning it.
    #[inline]
    pub fn lookup(&self, text: &str) -> Option<Sym> {
        self.symbols.lookup(text)
    }

    #[inline]
    pub fn sym_name(&self, sym: Sym) -> &str {
        self.symbols.name(sym)
    }

    // Lists

    pub fn cons(&mut self, head: Value, tail: Value) -> Value {
        Value::Pair(self.alloc_pair(head, tail))
    }

    fn alloc_pair(&mut self, head: Value, tail: Value) -> PairId {
        let id = PairId::new(self.pairs.len());
        self.pairs.push(Pair { head, tail });
        id
    }

    #[inline]
    pub fn pair(&self, id: PairId) -> Pair {
        self.pairs[id.index()]
    }

    #[inline]
    pub fn pair_mut(&mut self, id: PairId) -> &mut Pair {
        &mut self.pairs[id.index()]
    }

    /// Build a fresh list holding `items` in order.
    pub fn list_from<I>(&mut self, items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Value::Nil, |tail, head| self.cons(head, tail))
    }

    /// Iterate the heads of a list. Stops at the first non-cell tail.
    pub fn iter_list(&self, list: Value) -> ListIter<'_> {
        ListIter { pool: self, cur: list }
    }

    pub fn list_len(&self, list: Value) -> usize {
        self.iter_list(list).count()
    }

    pub fn list_to_vec(&self, list: Value) -> Vec<Value> {
        self.iter_list(list).collect()
    }

    /// Fresh reversed copy. The input list is untouched.
    pub fn rev_list(&mut self, list: Value) -> Value {
        let mut out = Value::Nil;
        let mut cur = list;
        while let Value::Pair(id) = cur {
            let Pair { head, tail } = self.pair(id);
            out = self.cons(head, out);
            cur = tail;
        }
        out
    }

    // Strings

    pub fn alloc_str(&mut self, bytes: impl Into<Vec<u8>>) -> Value {
        let id = StrId::new(self.strings.len());
        self.strings.push(bytes.into());
        Value::Str(id)
    }

    #[inline]
    pub fn str_bytes(&self, id: StrId) -> &[u8] {
        &self.strings[id.index()]
    }

    #[inline]
    pub fn str_bytes_mut(&mut self, id: StrId) -> &mut Vec<u8> {
        &mut self.strings[id.index()]
    }

    // Arrays

    pub fn alloc_array(&mut self, items: Vec<Value>) -> Value {
        let id = ArrayId::new(self.arrays.len());
        self.arrays.push(items);
        Value::Array(id)
    }

    #[inline]
    pub fn array(&self, id: ArrayId) -> &[Value] {
        &self.arrays[id.index()]
    }

    #[inline]
    pub fn array_mut(&mut self, id: ArrayId) -> &mut [Value] {
        &mut self.arrays[id.index()]
    }

    // Dicts

    pub fn alloc_dict(&mut self) -> Value {
        let id = DictId::new(self.dicts.len());
        self.dicts.push(Dict::new());
        Value::Dict(id)
    }

    #[inline]
    pub fn dict(&self, id: DictId) -> &Dict<Value> {
        &self.dicts[id.index()]
    }

    #[inline]
    pub fn dict_mut(&mut self, id: DictId) -> &mut Dict<Value> {
        &mut self.dicts[id.index()]
    }

    // Structs

    /// Allocate a struct with the given keys, every field null.
    pub fn alloc_struct(&mut self, keys: impl IntoIterator<Item = Sym>) -> Value {
        let id = StructId::new(self.structs.len());
        let fields = keys.into_iter().map(|k| (k, Value::Null)).collect();
        self.structs.push(Struct { fields });
        Value::Struct(id)
    }

    #[inline]
    pub fn struct_(&self, id: StructId) -> &Struct {
        &self.structs[id.index()]
    }

    #[inline]
    pub fn struct_mut(&mut self, id: StructId) -> &mut Struct {
        &mut self.structs[id.index()]
    }

    // Queues

    pub fn alloc_queue(&mut self) -> Value {
        Value::Queue(self.alloc_queue_id())
    }

    fn alloc_queue_id(&mut self) -> QueueId {
        let id = QueueId::new(self.queues.len());
        self.queues.push(Queue {
            first: Value::Nil,
            last: None,
        });
        id
    }

    #[inline]
    pub fn queue(&self, id: QueueId) -> Queue {
        self.queues[id.index()]
    }

    /// Append in O(1) by linking a new cell after the end pointer.
    pub fn queue_push(&mut self, id: QueueId, value: Value) {
        let cell_id = self.alloc_pair(value, Value::Nil);
        match self.queues[id.index()].last {
            Some(last) => self.pair_mut(last).tail = Value::Pair(cell_id),
            None => self.queues[id.index()].first = Value::Pair(cell_id),
        }
        self.queues[id.index()].last = Some(cell_id);
    }

    /// Build a queue over a fresh copy of `list`'s cells.
    pub fn queue_from_list(&mut self, list: Value) -> Value {
        let id = self.alloc_queue_id();
        let mut cur = list;
        while let Value::Pair(pid) = cur {
            let Pair { head, tail } = self.pair(pid);
            self.queue_push(id, head);
            cur = tail;
        }
        Value::Queue(id)
    }

    // Closures

    pub fn alloc_closure(&mut self, module: Sym, name: Sym, args: Value) -> Value {
        let id = ClosureId::new(self.closures.len());
        self.closures.push(Closure { module, name, args });
        Value::Closure(id)
    }

    #[inline]
    pub fn closure(&self, id: ClosureId) -> Closure {
        self.closures[id.index()]
    }

    #[inline]
    pub fn closure_mut(&mut self, id: ClosureId) -> &mut Closure {
        &mut self.closures[id.index()]
    }

    /// Byte-wise string equality.
    pub fn str_eq(&self, a: StrId, b: StrId) -> bool {
        self.str_bytes(a) == self.str_bytes(b)
    }
}

/// Iterator over list heads. See [`Pool::iter_list`].
pub struct ListIter<'a> {
    pool: &'a Pool,
    cur: Value,
}

impl Iterator for ListIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self.cur {
            Value::Pair(id) => {
                let Pair { head, tail } = self.pool.pair(id);
                self.cur = tail;
                Some(head)
            }
            _ => None,
        }
    }
}
