//! Open-addressed map keyed by symbol identity.
//!
//! Linear probing over a power-of-two slot array with tombstones for
//! deletion. Slots are exposed raw (see [`Dict::slot`]) so the `dict_i*`
//! instructions can walk them by index; slot order is not insertion order.

use crate::Sym;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

const INITIAL_CAPACITY: usize = 8;

#[derive(Copy, Clone, Debug)]
enum Slot<V> {
    Empty,
    Tombstone,
    Full(Sym, V),
}

/// Symbol-keyed open-addressed map.
#[derive(Clone, Debug)]
pub struct Dict<V> {
    slots: Vec<Slot<V>>,
    len: usize,
    tombstones: usize,
}

impl<V: Copy> Dict<V> {
    pub fn new() -> Self {
        Dict {
            slots: vec![Slot::Empty; INITIAL_CAPACITY],
            len: 0,
            tombstones: 0,
        }
    }

    #[inline]
    fn hash(key: Sym) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "only the low bits are used for slot selection"
        )]
        let h = hasher.finish() as usize;
        h
    }

    /// Index of the slot holding `key`, if present.
    fn find(&self, key: Sym) -> Option<usize> {
        let mask = self.slots.len() - 1;
        let mut i = Self::hash(key) & mask;
        for _ in 0..self.slots.len() {
            match self.slots[i] {
                Slot::Empty => return None,
                Slot::Full(k, _) if k == key => return Some(i),
                Slot::Full(..) | Slot::Tombstone => {}
            }
            i = (i + 1) & mask;
        }
        None
    }

    pub fn get(&self, key: Sym) -> Option<V> {
        self.find(key).and_then(|i| match self.slots[i] {
            Slot::Full(_, v) => Some(v),
            Slot::Empty | Slot::Tombstone => None,
        })
    }

    pub fn contains_key(&self, key: Sym) -> bool {
        self.find(key).is_some()
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, key: Sym, value: V) -> Option<V> {
        if let Some(i) = self.find(key) {
            let old = self.get(key);
            self.slots[i] = Slot::Full(key, value);
            return old;
        }
        if (self.len + self.tombstones + 1) * 4 > self.slots.len() * 3 {
            self.grow();
        }
        let mask = self.slots.len() - 1;
        let mut i = Self::hash(key) & mask;
        loop {
            match self.slots[i] {
                Slot::Empty => break,
                Slot::Tombstone => {
                    self.tombstones -= 1;
                    break;
                }
                Slot::Full(..) => i = (i + 1) & mask,
            }
        }
        self.slots[i] = Slot::Full(key, value);
        self.len += 1;
        None
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: Sym) -> Option<V> {
        let i = self.find(key)?;
        let old = match self.slots[i] {
            Slot::Full(_, v) => v,
            Slot::Empty | Slot::Tombstone => return None,
        };
        self.slots[i] = Slot::Tombstone;
        self.len -= 1;
        self.tombstones += 1;
        Some(old)
    }

    /// Rehash into a table sized for the live entries. Doubles unless
    /// tombstones alone pushed the load over the limit.
    fn grow(&mut self) {
        let new_cap = if self.len * 2 >= self.slots.len() {
            self.slots.len() * 2
        } else {
            self.slots.len()
        };
        let old = std::mem::replace(&mut self.slots, vec![Slot::Empty; new_cap]);
        self.len = 0;
        self.tombstones = 0;
        for slot in old {
            if let Slot::Full(k, v) = slot {
                self.insert(k, v);
            }
        }
    }

    /// Number of live keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of raw slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Raw slot access. `None` for empty or deleted slots and for
    /// out-of-range indices.
    pub fn slot(&self, index: usize) -> Option<(Sym, V)> {
        match self.slots.get(index) {
            Some(&Slot::Full(k, v)) => Some((k, v)),
            _ => None,
        }
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Sym, V)> + '_ {
        self.slots.iter().filter_map(|slot| match *slot {
            Slot::Full(k, v) => Some((k, v)),
            Slot::Empty | Slot::Tombstone => None,
        })
    }
}

impl<V: Copy> Default for Dict<V> {
    fn default() -> Self {
        Self::new()
    }
}
