//! Runs parsed actions against a machine.

use std::fmt;

use crate::args::Action;
use knot_vm::{LoadError, Machine, RuntimeError};

/// Failure of one action.
#[derive(Debug)]
pub enum DriverError {
    Read {
        path: String,
        error: std::io::Error,
    },
    Load(LoadError),
    /// `-d` named a def that is not loaded.
    NoSuchDef {
        module: String,
        def: String,
    },
    /// `-e` before any `-d`.
    NothingSelected,
    Run(RuntimeError),
    Write(std::io::Error),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, error } => write!(f, "couldn't read {path}: {error}"),
            Self::Load(err) => write!(f, "{err}"),
            Self::NoSuchDef { module, def } => write!(f, "couldn't find def: {module} {def}"),
            Self::NothingSelected => write!(f, "-e needs a def selected with -d"),
            Self::Run(err) => write!(f, "{err}"),
            Self::Write(err) => write!(f, "couldn't write output: {err}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<LoadError> for DriverError {
    fn from(err: LoadError) -> Self {
        DriverError::Load(err)
    }
}

impl From<RuntimeError> for DriverError {
    fn from(err: RuntimeError) -> Self {
        DriverError::Run(err)
    }
}

/// Run `actions` in order, stopping at the first failure. Module dumps go
/// to `out`.
pub fn execute(
    vm: &mut Machine,
    actions: &[Action],
    out: &mut dyn std::io::Write,
) -> Result<(), DriverError> {
    let mut selected: Option<(String, String)> = None;
    for action in actions {
        match action {
            Action::LoadFile(path) => {
                let source = std::fs::read_to_string(path).map_err(|error| DriverError::Read {
                    path: path.clone(),
                    error,
                })?;
                vm.load_source(path, &source)?;
                tracing::info!(path = %path, "loaded file");
            }
            Action::LoadText(text) => vm.load_source("<inline>", text)?,
            Action::Select { module, def } => {
                let pool = vm.pool();
                let found = pool
                    .lookup(module)
                    .zip(pool.lookup(def))
                    .and_then(|(module, def)| vm.registry().get_def(module, def));
                if found.is_none() {
                    return Err(DriverError::NoSuchDef {
                        module: module.clone(),
                        def: def.clone(),
                    });
                }
                selected = Some((module.clone(), def.clone()));
            }
            Action::Execute => {
                let (module, def) = selected.as_ref().ok_or(DriverError::NothingSelected)?;
                vm.call(module, def)?;
                tracing::info!(steps = vm.steps(), "run finished");
            }
            Action::DumpModules => {
                out.write_all(vm.dump_modules().as_bytes())
                    .map_err(DriverError::Write)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use knot_vm::{buffer_handler, RuntimeErrorKind};
    use pretty_assertions::assert_eq;

    fn machine() -> (Machine, knot_vm::SharedPrintHandler) {
        let out = buffer_handler();
        let vm = Machine::builder().print_handler(out.clone()).build();
        (vm, out)
    }

    fn select(module: &str, def: &str) -> Action {
        Action::Select {
            module: module.into(),
            def: def.into(),
        }
    }

    #[test]
    fn inline_text_runs() {
        let (mut vm, out) = machine();
        let actions = [
            Action::LoadText("def main () () (2 3 add p)".into()),
            select("", "main"),
            Action::Execute,
            Action::Execute,
        ];
        execute(&mut vm, &actions, &mut Vec::new()).unwrap();
        assert_eq!(out.get_output(), "5\n5\n");
    }

    #[test]
    fn dump_goes_to_writer() {
        let (mut vm, _) = machine();
        let mut dump = Vec::new();
        let actions = [
            Action::LoadText("module m\ndef f () () ()".into()),
            Action::DumpModules,
        ];
        execute(&mut vm, &actions, &mut dump).unwrap();
        assert_eq!(String::from_utf8(dump).unwrap(), "MODULE m:\n  DEF f () -> (): ()\n");
    }

    #[test]
    fn select_checks_def_exists() {
        let (mut vm, _) = machine();
        let err = execute(&mut vm, &[select("m", "f")], &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DriverError::NoSuchDef { .. }));
        assert_eq!(err.to_string(), "couldn't find def: m f");
        assert_eq!(vm.pool().lookup("m"), None);
    }

    #[test]
    fn step_limit_applies_per_execution() {
        let out = buffer_handler();
        let mut vm = Machine::builder()
            .print_handler(out.clone())
            .max_steps(12)
            .build();
        let mut actions = vec![
            Action::LoadText("def main () () (1 drop 2 p)".into()),
            select("", "main"),
        ];
        actions.extend([Action::Execute, Action::Execute, Action::Execute]);
        execute(&mut vm, &actions, &mut Vec::new()).unwrap();
        assert_eq!(out.get_output(), "2\n2\n2\n");
    }

    #[test]
    fn execute_needs_selection() {
        let (mut vm, _) = machine();
        let err = execute(&mut vm, &[Action::Execute], &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DriverError::NothingSelected));
    }

    #[test]
    fn failures_stop_processing() {
        let (mut vm, out) = machine();
        let actions = [
            Action::LoadText("def main () () (1 0 div) def after () () (1 p)".into()),
            select("", "main"),
            Action::Execute,
            select("", "after"),
            Action::Execute,
        ];
        let err = execute(&mut vm, &actions, &mut Vec::new()).unwrap_err();
        match err {
            DriverError::Run(err) => assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(out.get_output(), "");
    }

    #[test]
    fn missing_file() {
        let (mut vm, _) = machine();
        let actions = [Action::LoadFile("/nonexistent/knot/file.knot".into())];
        let err = execute(&mut vm, &actions, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DriverError::Read { .. }));
    }
}
