mod cmd;
mod opt;
mod repl;

use std::process;
use clap::Parser as ClapParser;
use tracing::Level;

use opt::{Mode, Options};

fn main() {
    let options = Options::parse();

    let level = if options.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mode = Mode::from_flag(options.ast);
    let mut all_ok = true;
    for path in &options.files {
        match opt::load_file(path, mode) {
            Ok(ok) => all_ok &= ok,
            Err(err) => {
                eprintln!("{:#}", err);
                process::exit(1);
            },
        }
    }
    // with -n and nothing else, the program comes from stdin.
    if options.no_interactive && options.files.is_empty() {
        match opt::load_stdin(mode) {
            Ok(ok) => all_ok &= ok,
            Err(err) => {
                eprintln!("{:#}", err);
                process::exit(1);
            },
        }
    }

    if options.no_interactive {
        if !all_ok {
            process::exit(1);
        }
        return;
    }
    repl::read_eval_print_loop(&options.histfile(), mode);
}
