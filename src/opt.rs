use std::{
    env,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};
use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use exprlang::{evaluator, parser};

#[derive(ClapParser, Debug)]
#[command(
    name = "exprlang",
    version,
    about = "An interpreter for a small expression language.",
    after_help = "Inside the REPL, type :help for the list of commands."
)]
pub struct Options {
    /// Files to run before the prompt starts. Each one is parsed and
    /// evaluated as a single program.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Don't start the interactive prompt.
    #[arg(short = 'n', long)]
    pub no_interactive: bool,

    /// Print the parsed tree instead of evaluating it.
    #[arg(short, long)]
    pub ast: bool,

    /// Where the REPL keeps its history.
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Log debug information to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Options {
    pub fn histfile(&self) -> PathBuf {
        match &self.history {
            Some(path) => path.clone(),
            None => default_histfile_path(),
        }
    }
}

fn default_histfile_path() -> PathBuf {
    let home_key = "HOME";
    let fallback = "/tmp";
    let filename = "exprlang_history";
    match env::var(home_key) {
        Ok(home) => [home.as_str(), ".cache", filename].iter().collect(),
        Err(e) => {
            tracing::warn!("failed to read env variable {} ({}), using fallback {}",
                           home_key, e, fallback);
            [fallback, filename].iter().collect()
        },
    }
}

/// How a line or file is handled once it is parsed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Eval,
    Ast,
}

impl Mode {
    pub fn from_flag(ast: bool) -> Mode {
        if ast {
            Mode::Ast
        } else {
            Mode::Eval
        }
    }

    pub fn toggled(self) -> Mode {
        match self {
            Mode::Eval => Mode::Ast,
            Mode::Ast => Mode::Eval,
        }
    }
}

/// Parses `source` and, depending on the mode, prints either its rendered
/// tree or the value it evaluates to. Returns false if there were parse or
/// evaluation errors.
pub fn run_source(source: &str, mode: Mode) -> bool {
    let (program, errors) = parser::parse(source);
    if !errors.is_empty() {
        print_parser_errors(&errors);
        return false;
    }
    match mode {
        Mode::Ast => {
            if !program.statements.is_empty() {
                println!("{}", program);
            }
            true
        },
        Mode::Eval => match evaluator::eval(&program) {
            Ok(value) => {
                println!("{}", value);
                true
            },
            Err(err) => {
                println!("ERROR: {}", err);
                false
            },
        },
    }
}

pub fn print_parser_errors(errors: &[parser::ParseError]) {
    println!(" parser errors:");
    for err in errors {
        println!("\t{}", err);
    }
}

pub fn load_file(path: &Path, mode: Mode) -> Result<bool> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to load file '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "running file");
    Ok(run_source(&source, mode))
}

pub fn load_stdin(mode: Mode) -> Result<bool> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("failed to read stdin")?;
    Ok(run_source(&source, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let opts = Options::try_parse_from(&["exprlang", "-n", "--ast", "a.txt", "b.txt"]).unwrap();
        assert!(opts.no_interactive);
        assert!(opts.ast);
        assert!(!opts.verbose);
        assert_eq!(opts.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn history_override() {
        let opts = Options::try_parse_from(&["exprlang", "--history", "/tmp/h"]).unwrap();
        assert_eq!(opts.histfile(), PathBuf::from("/tmp/h"));
    }

    #[test]
    fn mode_toggle() {
        assert_eq!(Mode::from_flag(false), Mode::Eval);
        assert_eq!(Mode::Eval.toggled(), Mode::Ast);
        assert_eq!(Mode::Ast.toggled(), Mode::Eval);
    }

    #[test]
    fn missing_file() {
        let err = load_file(Path::new("/nonexistent/exprlang/file"), Mode::Eval).unwrap_err();
        assert!(err.to_string().starts_with("failed to load file"));
    }
}
