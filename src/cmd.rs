/// Commands understood by the REPL. They start with ':' and are handled
/// before the line ever reaches the lexer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Load,
    Ast,
}

pub struct CommandClassifier<'a> {
    pub short_name: &'a str,
    pub long_name: &'a str,
    pub cmd: Command,
    pub arg_expected: bool,
    description: &'a str,
}

pub const COMMAND_CLASSIFIER : &[CommandClassifier] = &[
    CommandClassifier {
        short_name: "h",
        long_name: "help",
        cmd: Command::Help,
        arg_expected: false,
        description: "print this message.",
    },
    CommandClassifier {
        short_name: "l",
        long_name: "load",
        cmd: Command::Load,
        arg_expected: true,
        description: "parse and evaluate a whole file.",
    },
    CommandClassifier {
        short_name: "a",
        long_name: "ast",
        cmd: Command::Ast,
        arg_expected: false,
        description: "toggle AST mode, in which lines are parsed and echoed back instead of evaluated.",
    },
];

/// Splits a line such as ":load foo.txt" into its command and argument.
/// Returns None if the line is not a command at all, and Some(Err(name)) if
/// it looks like one but the name is unknown.
pub fn parse_command(line: &str) -> Option<Result<(Command, Option<&str>), &str>> {
    let rest = line.trim_start().strip_prefix(':')?;
    let (name, arg) = match rest.find(char::is_whitespace) {
        Some(i) => (&rest[..i], rest[i..].trim()),
        None => (rest, ""),
    };
    let class = match get_command(name) {
        Some(class) => class,
        None => return Some(Err(name)),
    };
    let arg = if class.arg_expected && !arg.is_empty() {
        Some(arg)
    } else {
        None
    };
    Some(Ok((class.cmd, arg)))
}

pub fn get_command(name: &str) -> Option<&'static CommandClassifier<'static>> {
    COMMAND_CLASSIFIER
        .iter()
        .find(|class| name == class.short_name || name == class.long_name)
}

// get the command entry in COMMAND_CLASSIFIER whose long name starts with prefix.
pub fn get_command_starts_with(prefix: &str) -> Option<&'static CommandClassifier<'static>> {
    COMMAND_CLASSIFIER
        .iter()
        .find(|class| class.long_name.starts_with(prefix))
}

pub fn print_usage() {
    println!(
"An interpreter for a small expression language.

Available commands:"
    );
    for command in COMMAND_CLASSIFIER {
        println!(":{}, :{}\t{}",
                 command.short_name,
                 command.long_name,
                 command.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_command() {
        assert_eq!(parse_command("1 + 2"), None);
    }

    #[test]
    fn short_and_long_names() {
        assert_eq!(parse_command(":h"), Some(Ok((Command::Help, None))));
        assert_eq!(parse_command(":help"), Some(Ok((Command::Help, None))));
        assert_eq!(parse_command("  :a"), Some(Ok((Command::Ast, None))));
    }

    #[test]
    fn command_arg() {
        assert_eq!(
            parse_command(":load  some file.txt "),
            Some(Ok((Command::Load, Some("some file.txt")))),
        );
        assert_eq!(parse_command(":l"), Some(Ok((Command::Load, None))));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(parse_command(":quit"), Some(Err("quit")));
    }

    #[test]
    fn completion_prefix() {
        assert_eq!(get_command_starts_with("lo").map(|c| c.cmd), Some(Command::Load));
        assert!(get_command_starts_with("x").is_none());
    }
}
