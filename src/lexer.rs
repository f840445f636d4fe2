use std::fmt;

/// The kind of a token. This is what the parser dispatches on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    Ident,
    Int,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    NotEq,

    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,

    Let,
    Return,
    True,
    False,
    If,
    Else,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Lte => "<=",
            TokenKind::Gte => ">=",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Semicolon => ";",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Let => "LET",
            TokenKind::Return => "RETURN",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
        };
        f.write_str(name)
    }
}

/// Tokens understood by the parser: a kind plus the text it was read from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub literal: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, literal: &'a str) -> Token<'a> {
        Token { kind, literal }
    }

    /// The end-of-input token. The parser produces it itself once the
    /// token source is exhausted.
    pub fn eof() -> Token<'a> {
        Token::new(TokenKind::Eof, "")
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("let", TokenKind::Let),
    ("return", TokenKind::Return),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
];

/// Removes whitespace and line continuation token (if any) from the end
/// of a line, returning whether there was a line continuation token.
///
pub fn strip_whitespace_and_line_cont(line: &mut String) -> bool {
    while let Some(c) = line.chars().next_back() {
        if !c.is_whitespace() {
            break;
        }
        line.pop();
    }
    match line.chars().next_back() {
        Some('\\') => {
            line.pop();
            true
        },
        _ => false,
    }
}

/// An iterator over the tokens of a string. Used by Parser.
///
/// Two-character operators win over their one-character prefixes:
///
/// ```
/// # use exprlang::lexer::{TokenIter, TokenKind};
/// let kinds: Vec<TokenKind> = TokenIter::new("a <= !b").map(|t| t.kind).collect();
///
/// assert_eq!(kinds, vec![TokenKind::Ident, TokenKind::Lte, TokenKind::Bang, TokenKind::Ident]);
/// ```
///
/// Comments start with '#' and extend until the end of line:
/// ```
/// # use exprlang::lexer::TokenIter;
/// let mut iter = TokenIter::new("# This is a comment");
///
/// assert_eq!(iter.next(), None);
/// ```
///
#[derive(Clone)]
pub struct TokenIter<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            self.consume_whitespace();
            if self.rest_of_string().starts_with('#') {
                self.skip_comment();
            } else {
                break;
            }
        }

        let rest_of_string = self.rest_of_string();
        let first_char = rest_of_string.chars().next()?;

        // The order matters in this list: if one token is prefix of another,
        // the largest one must come first.
        //
        let classifier = &[
            ("==", TokenKind::Eq),
            ("!=", TokenKind::NotEq),
            ("<=", TokenKind::Lte),
            (">=", TokenKind::Gte),
            ("=",  TokenKind::Assign),
            ("!",  TokenKind::Bang),
            ("<",  TokenKind::Lt),
            (">",  TokenKind::Gt),
            ("+",  TokenKind::Plus),
            ("-",  TokenKind::Minus),
            ("*",  TokenKind::Asterisk),
            ("/",  TokenKind::Slash),
            (";",  TokenKind::Semicolon),
            ("(",  TokenKind::LParen),
            (")",  TokenKind::RParen),
            ("{",  TokenKind::LBrace),
            ("}",  TokenKind::RBrace),
        ];
        for (name, kind) in classifier {
            if rest_of_string.starts_with(name) {
                return Some(self.take(name.len(), *kind));
            }
        }

        // if we're here, it's a word, a number or an invalid token.

        if first_char.is_ascii_digit() {
            // Letters are swallowed too, so that "0x1f" or "12ab" reach the
            // parser as one literal and get reported there.
            let len = self.word_len(|c| c.is_ascii_alphanumeric() || c == '_');
            return Some(self.take(len, TokenKind::Int));
        }
        if is_ident_start(first_char) {
            let len = self.word_len(|c| is_ident_start(c) || c.is_ascii_digit());
            let word = &rest_of_string[..len];
            let kind = KEYWORDS
                .iter()
                .find(|(keyword, _)| *keyword == word)
                .map_or(TokenKind::Ident, |(_, kind)| *kind);
            return Some(self.take(len, kind));
        }

        // we must increment position here too, otherwise we'll yield
        // the same invalid token forever.
        Some(self.take(first_char.len_utf8(), TokenKind::Illegal))
    }
}

impl<'a> TokenIter<'a> {
    pub fn new(s: &'a str) -> TokenIter<'a> {
        TokenIter {
            s,
            pos: 0,
        }
    }

    fn rest_of_string(&self) -> &'a str {
        &self.s[self.pos..]
    }

    fn consume_whitespace(&mut self) {
        let rest_of_string = self.rest_of_string();
        for c in rest_of_string.chars() {
            if !c.is_whitespace() {
                break
            }
            self.pos += c.len_utf8();
        }
    }

    fn skip_comment(&mut self) {
        let rest_of_string = self.rest_of_string();
        match rest_of_string.find('\n') {
            Some(i) => self.pos += i,
            None => self.pos = self.s.len(),
        }
    }

    fn word_len<F>(&self, accept: F) -> usize
        where F: Fn(char) -> bool
    {
        self.rest_of_string()
            .chars()
            .take_while(|c| accept(*c))
            .map(char::len_utf8)
            .sum()
    }

    fn take(&mut self, len: usize, kind: TokenKind) -> Token<'a> {
        let literal = &self.s[self.pos..self.pos + len];
        self.pos += len;
        Token::new(kind, literal)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
