//! Command-line argument parsing.

use std::fmt;

/// One step of a command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// `-f FILE`
    LoadFile(String),
    /// `-c TEXT`
    LoadText(String),
    /// `-d MODULE DEF`
    Select { module: String, def: String },
    /// `-e`
    Execute,
    /// `--dump`
    DumpModules,
}

/// Parsed command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub actions: Vec<Action>,
    pub max_steps: Option<u64>,
    pub help: bool,
}

/// Malformed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgError {
    /// A flag was given fewer values than it takes.
    MissingValue { flag: String },
    InvalidNumber { flag: String, value: String },
    UnknownFlag { flag: String },
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { flag } => write!(f, "missing argument after {flag}"),
            Self::InvalidNumber { flag, value } => {
                write!(f, "invalid number for {flag}: {value}")
            }
            Self::UnknownFlag { flag } => write!(f, "unrecognized option: {flag}"),
        }
    }
}

impl std::error::Error for ArgError {}

/// Parse everything after the program name.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Options, ArgError> {
    let mut options = Options::default();
    let mut rest = args.iter().map(AsRef::as_ref);

    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .map(str::to_owned)
                .ok_or_else(|| ArgError::MissingValue {
                    flag: flag.to_owned(),
                })
        };
        match flag {
            "-f" => options.actions.push(Action::LoadFile(value()?)),
            "-c" => options.actions.push(Action::LoadText(value()?)),
            "-d" | "-D" => {
                let module = value()?;
                let def = value()?;
                options.actions.push(Action::Select { module, def });
                if flag == "-D" {
                    options.actions.push(Action::Execute);
                }
            }
            "-e" => options.actions.push(Action::Execute),
            "--dump" => options.actions.push(Action::DumpModules),
            "--max-steps" => {
                let text = value()?;
                let limit = text.parse().map_err(|_| ArgError::InvalidNumber {
                    flag: flag.to_owned(),
                    value: text.clone(),
                })?;
                options.max_steps = Some(limit);
            }
            "-h" | "--help" => options.help = true,
            other => {
                return Err(ArgError::UnknownFlag {
                    flag: other.to_owned(),
                })
            }
        }
    }
    Ok(options)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn actions_keep_order() {
        let options = parse_args(&["-f", "a.knot", "-c", "def f () () ()", "-D", "", "main"]).unwrap();
        assert_eq!(
            options.actions,
            vec![
                Action::LoadFile("a.knot".into()),
                Action::LoadText("def f () () ()".into()),
                Action::Select {
                    module: String::new(),
                    def: "main".into()
                },
                Action::Execute,
            ]
        );
        assert_eq!(options.max_steps, None);
        assert!(!options.help);
    }

    #[test]
    fn select_then_execute_separately() {
        let options = parse_args(&["-d", "m", "f", "--dump", "-e"]).unwrap();
        assert_eq!(
            options.actions,
            vec![
                Action::Select {
                    module: "m".into(),
                    def: "f".into()
                },
                Action::DumpModules,
                Action::Execute,
            ]
        );
    }

    #[test]
    fn options() {
        let options = parse_args(&["--max-steps", "500", "-h"]).unwrap();
        assert_eq!(options.max_steps, Some(500));
        assert!(options.help);
        assert!(options.actions.is_empty());
    }

    #[test]
    fn errors() {
        assert_eq!(
            parse_args(&["-f"]),
            Err(ArgError::MissingValue { flag: "-f".into() })
        );
        assert_eq!(
            parse_args(&["-d", "m"]),
            Err(ArgError::MissingValue { flag: "-d".into() })
        );
        assert_eq!(
            parse_args(&["--max-steps", "lots"]),
            Err(ArgError::InvalidNumber {
                flag: "--max-steps".into(),
                value: "lots".into()
            })
        );
        assert_eq!(
            parse_args(&["--frob"]),
            Err(ArgError::UnknownFlag {
                flag: "--frob".into()
            })
        );
    }
}
