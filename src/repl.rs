use std::{
    borrow::Cow,
    path::Path,
};
use rustyline::{
    At,
    Cmd,
    Context,
    Editor,
    KeyPress,
    Movement,
    Word,
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::{Highlighter, MatchingBracketHighlighter},
    hint::Hinter,
    line_buffer::LineBuffer,
};
use rustyline_derive::Helper;

use exprlang::lexer::{self, KEYWORDS};
use crate::{
    cmd::{self, Command},
    opt::{self, Mode},
};

const PROMPT: &str = ">> ";
const AST_PROMPT: &str = "ast>> ";
const CONT_PROMPT: &str = ".. ";

#[derive(Helper)]
struct RustylineHelper {
    filename_completer: FilenameCompleter, // for :load
    highlighter: MatchingBracketHighlighter,
}

impl Hinter for RustylineHelper {
    fn hint(&self, _line: &str, _pos:usize, _context: &Context) -> Option<String> {
        None
    }
}

impl Completer for RustylineHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, cursor_pos: usize, context: &Context)
        -> Result<(usize, Vec<Self::Candidate>), ReadlineError>
    {
        let null_completion = (0, Vec::with_capacity(0));
        if cursor_pos == 0 {
            return Ok(null_completion);
        }
        match line.chars().next() {
            None => Ok(null_completion),
            Some(':') => {
                let compl_str = &line[1..cursor_pos];
                match compl_str.find(' ') {
                    None => {
                        // no space: complete the command's name.
                        match cmd::get_command_starts_with(compl_str) {
                            None => Ok(null_completion),
                            Some(class) => {
                                let compl_pair = Pair {
                                    display: class.long_name.to_string(),
                                    replacement: class.long_name.to_string(),
                                };
                                Ok((1, vec![compl_pair]))
                            },
                        }
                    },
                    Some(pos) => {
                        // with space: complete the argument's name.
                        match cmd::get_command(&compl_str[..pos]) {
                            Some(class) if class.cmd == Command::Load => {
                                self.filename_completer.complete(line, cursor_pos, context)
                            },
                            _ => Ok(null_completion),
                        }
                    },
                }
            },
            Some(_) => {
                let word_begin = get_start_word_under_cursor(line, cursor_pos);
                let prefix = &line[word_begin..cursor_pos];
                if prefix.is_empty() {
                    return Ok(null_completion);
                }
                let completion: Vec<Pair> = KEYWORDS
                    .iter()
                    .map(|(keyword, _)| *keyword)
                    .filter(|keyword| keyword.starts_with(prefix))
                    .map(|s| Pair { display: s.to_string(), replacement: s.to_string(), })
                    .collect();
                Ok((word_begin, completion))
            },
        }
    }

    fn update(&self, line: &mut LineBuffer, start: usize, elected: &str) {
        self.filename_completer.update(line, start, elected)
    }
}

// Only bracket matching; prompts, hints and candidates keep the defaults.
impl Highlighter for RustylineHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize) -> bool {
        self.highlighter.highlight_char(line, pos)
    }
}

fn make_rustyline_editor(histfile: &Path) -> Editor<RustylineHelper> {
    let mut rl = Editor::<RustylineHelper>::new();

    let rustyline_helper = RustylineHelper {
        filename_completer: FilenameCompleter::new(),
        highlighter: MatchingBracketHighlighter::new(),
    };
    rl.set_helper(Some(rustyline_helper));

    if let Err(err) = rl.load_history(histfile) {
        // a missing history file is the normal case on first run.
        tracing::debug!(%err, path = %histfile.display(), "no history loaded");
    }

    rl.bind_sequence(KeyPress::ControlRight,
                     Cmd::Move(Movement::ForwardWord(1, At::Start, Word::Vi)));
    rl.bind_sequence(KeyPress::ControlLeft,
                     Cmd::Move(Movement::BackwardWord(1, Word::Vi)));
    rl
}

// Reads one logical line, following '\' line continuations.
// Returns None when the user wants to quit.
fn read_logical_line(rl: &mut Editor<RustylineHelper>, prompt: &str) -> Option<String> {
    let mut line = match rl.readline(prompt) {
        Ok(line) => line,
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return None,
        Err(err) => {
            eprintln!("error: {:?}", err);
            return None;
        },
    };
    while lexer::strip_whitespace_and_line_cont(&mut line) {
        match rl.readline(CONT_PROMPT) {
            Ok(new_line) => {
                line.push('\n');
                line.push_str(&new_line);
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {:?}", err);
                break;
            },
        };
    }
    Some(line)
}

fn run_command(command: Command, arg: Option<&str>, mode: &mut Mode) {
    tracing::debug!(?command, ?arg, "repl command");
    match command {
        Command::Help => cmd::print_usage(),
        Command::Load => match arg {
            None => eprintln!(":load expects a file name"),
            Some(name) => {
                if let Err(err) = opt::load_file(Path::new(name), *mode) {
                    eprintln!("{:#}", err);
                }
            },
        },
        Command::Ast => {
            *mode = mode.toggled();
            match *mode {
                Mode::Ast => println!("AST mode on: lines are parsed and printed back."),
                Mode::Eval => println!("AST mode off: lines are evaluated."),
            }
        },
    }
}

pub fn read_eval_print_loop(histfile: &Path, initial_mode: Mode) {
    let mut mode = initial_mode;
    let mut rl = make_rustyline_editor(histfile);

    loop {
        let prompt = match mode {
            Mode::Eval => PROMPT,
            Mode::Ast => AST_PROMPT,
        };
        let line = match read_logical_line(&mut rl, prompt) {
            Some(line) => line,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str());

        match cmd::parse_command(&line) {
            Some(Ok((command, arg))) => run_command(command, arg, &mut mode),
            Some(Err(name)) => eprintln!("unknown command ':{}', try :help", name),
            None => {
                opt::run_source(&line, mode);
            },
        }
    }

    if let Err(err) = rl.save_history(histfile) {
        tracing::warn!(%err, path = %histfile.display(), "failed to save history file");
    }
}

// find the beginning of the word in line which is currently under the cursor,
// whose position is cursor_pos.
//
fn get_start_word_under_cursor(line: &str, cursor_pos: usize) -> usize {
    let mut chars = line[..cursor_pos].chars();
    let mut res = cursor_pos;
    while let Some(c) = chars.next_back() {
        if !c.is_alphanumeric() && c != '_' {
            break
        }
        res -= c.len_utf8();
    };
    // if iter == None, res == 0.
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::History;

    fn helper() -> RustylineHelper {
        RustylineHelper {
            filename_completer: FilenameCompleter::new(),
            highlighter: MatchingBracketHighlighter::new(),
        }
    }

    fn complete(line: &str) -> (usize, Vec<String>) {
        let history = History::new();
        let context = Context::new(&history);
        let (start, pairs) = helper().complete(line, line.len(), &context).unwrap();
        (start, pairs.into_iter().map(|p| p.replacement).collect())
    }

    #[test]
    fn complete_command_name() {
        assert_eq!(complete(":lo"), (1, vec!["load".to_string()]));
        assert_eq!(complete(":zz"), (0, vec![]));
    }

    #[test]
    fn complete_keyword() {
        assert_eq!(complete("1 + tr"), (4, vec!["true".to_string()]));
    }

    #[test]
    fn complete_after_non_ascii_command() {
        assert_eq!(complete(":é x"), (0, vec![]));
        assert_eq!(complete(":ééé"), (0, vec![]));
    }

    #[test]
    fn word_under_cursor() {
        assert_eq!(get_start_word_under_cursor("1 + ret", 7), 4);
        assert_eq!(get_start_word_under_cursor("(tr", 3), 1);
        assert_eq!(get_start_word_under_cursor("if", 2), 0);
        assert_eq!(get_start_word_under_cursor("x ", 2), 2);
    }
}
