//! Knot CLI driver.
//!
//! Arguments are actions processed left to right: load a file, read inline
//! text, select a def, execute it. Parsing the argument list is separate
//! from running it so both can be tested without a process.

mod args;
mod driver;

pub use args::{parse_args, Action, ArgError, Options};
pub use driver::{execute, DriverError};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=knot_vm=debug` or `RUST_LOG=knot_vm=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

pub fn print_usage() {
    eprintln!("Knot virtual machine");
    eprintln!();
    eprintln!("Usage: knot [actions...]");
    eprintln!();
    eprintln!("Actions run left to right:");
    eprintln!("  -f FILE          Load and parse a file");
    eprintln!("  -c TEXT          Parse inline text");
    eprintln!("  -d MODULE DEF    Select a def");
    eprintln!("  -e               Execute the selected def");
    eprintln!("  -D MODULE DEF    Same as -d MODULE DEF -e");
    eprintln!("  --dump           Print loaded modules");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --max-steps N    Abort a run after N steps");
    eprintln!("  -h, --help       Show this help message");
    eprintln!();
    eprintln!("Use \"\" as MODULE for defs outside any `module` form.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  knot -f main.knot -D \"\" main");
    eprintln!("  knot -c 'def main () () (2 3 add p)' -D \"\" main");
}
