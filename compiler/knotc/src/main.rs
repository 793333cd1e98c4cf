//! Knot CLI.

use knot_vm::Machine;

fn main() {
    knotc::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        knotc::print_usage();
        std::process::exit(1);
    }

    let options = match knotc::parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            knotc::print_usage();
            std::process::exit(1);
        }
    };
    if options.help {
        knotc::print_usage();
        return;
    }

    let mut builder = Machine::builder();
    if let Some(limit) = options.max_steps {
        builder = builder.max_steps(limit);
    }
    let mut vm = builder.build();

    let mut stdout = std::io::stdout();
    if let Err(err) = knotc::execute(&mut vm, &options.actions, &mut stdout) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
