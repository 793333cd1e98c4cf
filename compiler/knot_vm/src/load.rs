//! Load-time forms: `module`, `from`, `def` and `docs`.
//!
//! Loading walks the root list once, registering defs as it goes. It
//! starts in the module named by the empty symbol with an empty import
//! scope; each `module` form switches module and resets the scope, and each
//! `def` captures a copy of the scope built so far.

use crate::errors::{LoadError, LoadErrorKind};
use crate::registry::{Def, Ref, Registry, Scope};
use knot_ir::{ListIter, Pool, Sym, Value};

/// Pre-interned form keywords.
#[derive(Copy, Clone)]
pub(crate) struct LoadNames {
    module: Sym,
    from: Sym,
    def: Sym,
    docs: Sym,
    arrow: Sym,
}

impl LoadNames {
    pub(crate) fn new(pool: &mut Pool) -> Self {
        LoadNames {
            module: pool.intern("module"),
            from: pool.intern("from"),
            def: pool.intern("def"),
            docs: pool.intern("docs"),
            arrow: pool.intern("->"),
        }
    }
}

/// Walks one root list.
struct Loader<'a> {
    registry: &'a mut Registry,
    pool: &'a Pool,
    names: LoadNames,
    module: Sym,
    scope: Scope,
}

/// Register every form in `root`.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn load_forms(
    registry: &mut Registry,
    pool: &Pool,
    names: LoadNames,
    root: Value,
) -> Result<(), LoadError> {
    registry.get_or_add_module(Sym::EMPTY);
    let mut loader = Loader {
        registry,
        pool,
        names,
        module: Sym::EMPTY,
        scope: Scope::default(),
    };
    let mut forms = pool.iter_list(root);
    while let Some(head) = forms.next() {
        loader.form(head, &mut forms)?;
    }
    Ok(())
}

fn expect_sym(
    pool: &Pool,
    value: Option<Value>,
    form: &'static str,
    what: &'static str,
) -> Result<Sym, LoadError> {
    match value {
        Some(Value::Sym(sym)) => Ok(sym),
        Some(other) => Err(LoadError::new(LoadErrorKind::ExpectedSym { what })
            .with_context(pool.display(other).to_string())),
        None => Err(LoadError::new(LoadErrorKind::Truncated { form })),
    }
}

fn expect_list(
    pool: &Pool,
    value: Option<Value>,
    form: &'static str,
    what: &'static str,
) -> Result<Value, LoadError> {
    match value {
        Some(list) if list.is_list() => Ok(list),
        Some(other) => Err(LoadError::new(LoadErrorKind::ExpectedList { what })
            .with_context(pool.display(other).to_string())),
        None => Err(LoadError::new(LoadErrorKind::Truncated { form })),
    }
}

impl Loader<'_> {
    fn form(&mut self, head: Value, rest: &mut ListIter<'_>) -> Result<(), LoadError> {
        let pool = self.pool;
        let keyword = match head {
            Value::Sym(sym) => sym,
            other => {
                return Err(LoadError::new(LoadErrorKind::UnknownForm)
                    .with_context(pool.display(other).to_string()))
            }
        };

        if keyword == self.names.module {
            let name = expect_sym(pool, rest.next(), "module", "module name")?;
            tracing::debug!(module = pool.sym_name(name), "module");
            self.registry.get_or_add_module(name);
            self.module = name;
            self.scope = Scope::default();
        } else if keyword == self.names.from {
            let source = expect_sym(pool, rest.next(), "from", "module name")?;
            let entries = expect_list(pool, rest.next(), "from", "import list")?;
            self.imports(source, entries)
                .map_err(|e| e.with_context(format!("from {}", pool.sym_name(source))))?;
        } else if keyword == self.names.def {
            let name = expect_sym(pool, rest.next(), "def", "def name")?;
            self.def(name, rest)
                .map_err(|e| e.with_context(format!("def {}", pool.sym_name(name))))?;
        } else if keyword == self.names.docs {
            if rest.next().is_none() {
                return Err(LoadError::new(LoadErrorKind::Truncated { form: "docs" }));
            }
        } else {
            return Err(LoadError::new(LoadErrorKind::UnknownForm)
                .with_context(pool.sym_name(keyword).to_owned()));
        }
        Ok(())
    }

    fn imports(&mut self, source: Sym, entries: Value) -> Result<(), LoadError> {
        let pool = self.pool;
        for entry in pool.iter_list(entries) {
            let (def, local) = match entry {
                Value::Sym(sym) => (sym, sym),
                Value::Pair(_) => match pool.list_to_vec(entry).as_slice() {
                    [Value::Sym(name), Value::Sym(arrow), Value::Sym(alias)]
                        if *arrow == self.names.arrow =>
                    {
                        (*name, *alias)
                    }
                    _ => {
                        return Err(LoadError::new(LoadErrorKind::BadImport)
                            .with_context(pool.display(entry).to_string()))
                    }
                },
                other => {
                    return Err(LoadError::new(LoadErrorKind::BadImport)
                        .with_context(pool.display(other).to_string()))
                }
            };
            if self.scope.contains_key(&local) {
                return Err(LoadError::new(LoadErrorKind::ScopeConflict {
                    name: pool.sym_name(local).to_owned(),
                }));
            }
            tracing::debug!(
                local = pool.sym_name(local),
                module = pool.sym_name(source),
                def = pool.sym_name(def),
                "import"
            );
            self.scope.insert(
                local,
                Ref {
                    module: source,
                    def,
                },
            );
        }
        Ok(())
    }

    fn def(&mut self, name: Sym, rest: &mut ListIter<'_>) -> Result<(), LoadError> {
        let pool = self.pool;
        let args = expect_list(pool, rest.next(), "def", "argument list")?;
        let rets = expect_list(pool, rest.next(), "def", "return list")?;
        let code = expect_list(pool, rest.next(), "def", "body")?;

        let names = |list: Value, what: &'static str| -> Result<Vec<Sym>, LoadError> {
            pool.iter_list(list)
                .map(|v| expect_sym(pool, Some(v), "def", what))
                .collect()
        };
        let def = Def {
            module: self.module,
            name,
            scope: self.scope.clone(),
            args: names(args, "argument name")?,
            rets: names(rets, "return name")?,
            code,
        };
        tracing::debug!(
            module = pool.sym_name(self.module),
            def = pool.sym_name(name),
            n_args = def.n_args(),
            n_rets = def.n_rets(),
            "def"
        );
        if self.registry.add_def(def).is_none() {
            return Err(LoadError::new(LoadErrorKind::DuplicateDef {
                module: pool.sym_name(self.module).to_owned(),
                name: pool.sym_name(name).to_owned(),
            }));
        }
        Ok(())
    }
}
