//! Modules, defs and import scopes.
//!
//! Modules are created on demand and keyed by name. Each def records the
//! module it was declared in and a private copy of the import scope that was
//! in effect at its declaration. Name resolution for `call`/`ref` checks
//! that scope first and the def's own module second.

use knot_ir::{Sym, Value};
use rustc_hash::FxHashMap;

/// Index of a def in the registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct DefId(u32);

impl DefId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        DefId(raw)
    }
}

/// A foreign def brought into scope by `from`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Ref {
    pub module: Sym,
    pub def: Sym,
}

/// Import scope: local name to the def it refers to.
pub type Scope = FxHashMap<Sym, Ref>;

/// A loaded definition.
#[derive(Clone, Debug)]
pub struct Def {
    pub module: Sym,
    pub name: Sym,
    pub scope: Scope,
    /// Argument names. Only their count matters at runtime.
    pub args: Vec<Sym>,
    pub rets: Vec<Sym>,
    pub code: Value,
}

impl Def {
    #[inline]
    pub fn n_args(&self) -> usize {
        self.args.len()
    }

    #[inline]
    pub fn n_rets(&self) -> usize {
        self.rets.len()
    }
}

/// A named collection of defs.
#[derive(Clone, Debug)]
pub struct Module {
    pub name: Sym,
    defs: FxHashMap<Sym, DefId>,
    /// Def names in declaration order, for dumps.
    order: Vec<Sym>,
}

impl Module {
    fn new(name: Sym) -> Self {
        Module {
            name,
            defs: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn get_def(&self, name: Sym) -> Option<DefId> {
        self.defs.get(&name).copied()
    }

    /// Defs in declaration order.
    pub fn defs(&self) -> impl Iterator<Item = DefId> + '_ {
        self.order.iter().filter_map(|name| self.defs.get(name).copied())
    }
}

/// Every module and def known to a machine.
#[derive(Default)]
pub struct Registry {
    modules: FxHashMap<Sym, Module>,
    order: Vec<Sym>,
    defs: Vec<Def>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_add_module(&mut self, name: Sym) -> &mut Module {
        let order = &mut self.order;
        self.modules.entry(name).or_insert_with(|| {
            order.push(name);
            Module::new(name)
        })
    }

    pub fn module(&self, name: Sym) -> Option<&Module> {
        self.modules.get(&name)
    }

    /// Modules in creation order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.order.iter().filter_map(|name| self.modules.get(name))
    }

    /// Add `def` to its module. Returns `None`, leaving the registry
    /// unchanged, if the module already has a def with that name.
    pub fn add_def(&mut self, def: Def) -> Option<DefId> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "def count is bounded by source size"
        )]
        let id = DefId(self.defs.len() as u32);
        let (module_name, name) = (def.module, def.name);
        let module = self.get_or_add_module(module_name);
        if module.defs.contains_key(&name) {
            return None;
        }
        module.defs.insert(name, id);
        module.order.push(name);
        self.defs.push(def);
        Some(id)
    }

    #[inline]
    pub fn def(&self, id: DefId) -> &Def {
        &self.defs[id.index()]
    }

    /// Find `name` in `module`.
    pub fn get_def(&self, module: Sym, name: Sym) -> Option<DefId> {
        self.modules.get(&module)?.get_def(name)
    }

    /// Resolve `name` as seen from inside `from`: its import scope first,
    /// then its own module. Returns the target module and def name without
    /// checking that the target exists.
    pub fn resolve(&self, from: DefId, name: Sym) -> (Sym, Sym) {
        let def = self.def(from);
        match def.scope.get(&name) {
            Some(r) => (r.module, r.def),
            None => (def.module, name),
        }
    }
}

#[cfg(test)]
mod tests;
