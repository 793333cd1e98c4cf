use super::*;
use knot_ir::SymbolTable;

fn def(module: Sym, name: Sym, scope: Scope) -> Def {
    Def {
        module,
        name,
        scope,
        args: Vec::new(),
        rets: Vec::new(),
        code: Value::Nil,
    }
}

#[test]
fn modules_created_on_demand_in_order() {
    let mut syms = SymbolTable::new();
    let (a, b) = (syms.intern("a"), syms.intern("b"));
    let mut registry = Registry::new();
    registry.get_or_add_module(b);
    registry.get_or_add_module(a);
    registry.get_or_add_module(b);
    let names: Vec<Sym> = registry.modules().map(|m| m.name).collect();
    assert_eq!(names, vec![b, a]);
}

#[test]
fn duplicate_def_rejected() {
    let mut syms = SymbolTable::new();
    let (m, f) = (syms.intern("m"), syms.intern("f"));
    let mut registry = Registry::new();
    let first = registry.add_def(def(m, f, Scope::default()));
    assert!(first.is_some());
    assert!(registry.add_def(def(m, f, Scope::default())).is_none());
    assert_eq!(registry.get_def(m, f), first);
}

#[test]
fn same_name_in_different_modules() {
    let mut syms = SymbolTable::new();
    let (m, n, f) = (syms.intern("m"), syms.intern("n"), syms.intern("f"));
    let mut registry = Registry::new();
    let in_m = registry.add_def(def(m, f, Scope::default()));
    let in_n = registry.add_def(def(n, f, Scope::default()));
    assert_ne!(in_m, in_n);
    assert_eq!(registry.get_def(n, f), in_n);
}

#[test]
fn resolve_prefers_scope_over_module() {
    let mut syms = SymbolTable::new();
    let (main_mod, other) = (syms.intern("main"), syms.intern("other"));
    let (helper, h, local) = (syms.intern("helper"), syms.intern("h"), syms.intern("local"));

    let mut scope = Scope::default();
    scope.insert(
        h,
        Ref {
            module: other,
            def: helper,
        },
    );
    let mut registry = Registry::new();
    let caller = registry.add_def(def(main_mod, local, scope)).unwrap_or_else(|| panic!("added"));

    assert_eq!(registry.resolve(caller, h), (other, helper));
    assert_eq!(registry.resolve(caller, local), (main_mod, local));
}

#[test]
fn module_defs_in_declaration_order() {
    let mut syms = SymbolTable::new();
    let m = syms.intern("m");
    let names: Vec<Sym> = ["z", "a", "q"].iter().map(|n| syms.intern(n)).collect();
    let mut registry = Registry::new();
    for &name in &names {
        registry.add_def(def(m, name, Scope::default()));
    }
    let module = registry.module(m).unwrap_or_else(|| panic!("module exists"));
    let order: Vec<Sym> = module.defs().map(|id| registry.def(id).name).collect();
    assert_eq!(order, names);
}
