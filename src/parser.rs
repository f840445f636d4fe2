use crate::lexer::{Token, TokenIter, TokenKind};
use crate::ast::{
    Alternative,
    BlockStatement,
    Expression,
    Identifier,
    IfExpression,
    InfixOperator,
    PrefixOperator,
    Program,
    Statement,
};
use thiserror::Error;

/// A parse diagnostic. Its `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {found} instead")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },

    #[error("no prefix parse function found for {kind}")]
    NoPrefixParseFn { kind: TokenKind },

    #[error("could not parse {literal:?} as integer")]
    InvalidInteger { literal: String },
}

/// Binding strength of an operator, weakest first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < > <= >=
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // reserved for f(x)
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt | TokenKind::Lte | TokenKind::Gte => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        _ => Precedence::Lowest,
    }
}

fn prefix_operator(kind: TokenKind) -> Option<PrefixOperator> {
    match kind {
        TokenKind::Bang => Some(PrefixOperator::Bang),
        TokenKind::Minus => Some(PrefixOperator::Minus),
        _ => None,
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    let operator = match kind {
        TokenKind::Eq => InfixOperator::Eq,
        TokenKind::NotEq => InfixOperator::NotEq,
        TokenKind::Lt => InfixOperator::Lt,
        TokenKind::Gt => InfixOperator::Gt,
        TokenKind::Lte => InfixOperator::Lte,
        TokenKind::Gte => InfixOperator::Gte,
        TokenKind::Plus => InfixOperator::Plus,
        TokenKind::Minus => InfixOperator::Minus,
        TokenKind::Asterisk => InfixOperator::Asterisk,
        TokenKind::Slash => InfixOperator::Slash,
        _ => return None,
    };
    Some(operator)
}

/// Parses an integer literal the way Go's `strconv.ParseInt(s, 0, 64)` does:
/// `0x`, `0o` and `0b` select the base, and a bare leading `0` means octal.
/// A `_` may separate two digits, or a base prefix from the first digit.
fn int_from_literal(literal: &str) -> Option<i64> {
    let (digits, radix, prefixed) = match literal.get(..2) {
        Some("0x") | Some("0X") => (&literal[2..], 16, true),
        Some("0o") | Some("0O") => (&literal[2..], 8, true),
        Some("0b") | Some("0B") => (&literal[2..], 2, true),
        _ if literal.len() > 1 && literal.starts_with('0') => (&literal[1..], 8, true),
        _ => (literal, 10, false),
    };
    if digits.starts_with('+') || digits.starts_with('-') {
        return None;
    }
    let underscores_ok = digits
        .split('_')
        .enumerate()
        .all(|(i, part)| !part.is_empty() || (i == 0 && prefixed));
    if !underscores_ok {
        return None;
    }
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    i64::from_str_radix(&digits, radix).ok()
}

type PrefixParseFn<'a, I> = fn(&mut Parser<'a, I>) -> Option<Expression>;
type InfixParseFn<'a, I> = fn(&mut Parser<'a, I>, Expression) -> Option<Expression>;

/// Our hand-written Pratt parser.
///
/// It only ever looks at two tokens: the current one and the next one
/// ("peek"). Errors don't stop it; they are collected and parsing resumes at
/// the next statement, so a single run reports as much as it can.
///
pub struct Parser<'a, I>
    where I: Iterator<Item = Token<'a>>
{
    token_iter: I,
    cur: Token<'a>,
    peek: Token<'a>,
    errors: Vec<ParseError>,
}

impl<'a, I> Parser<'a, I>
    where I: Iterator<Item = Token<'a>>
{
    pub fn new(token_iter: I) -> Parser<'a, I> {
        let mut parser = Parser {
            token_iter,
            cur: Token::eof(),
            peek: Token::eof(),
            errors: Vec::new(),
        };
        // fill both cur and peek.
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Diagnostics recorded so far, in the order they were found.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parses statements until the end of input. Statements that failed to
    /// parse are left out; see errors() for what went wrong.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur.is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }
        program
    }

    fn next_token(&mut self) {
        self.cur = self.peek;
        self.peek = self.token_iter.next().unwrap_or_else(Token::eof);
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    // Advances only if the next token is of the expected kind.
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.error(ParseError::UnexpectedToken {
                expected: kind,
                found: self.peek.kind,
            });
            None
        }
    }

    fn error(&mut self, err: ParseError) {
        tracing::debug!(%err, "parse error");
        self.errors.push(err);
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    // The bound expression is not parsed, only skipped: there is nothing to
    // bind it to yet.
    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.cur.literal);
        self.expect_peek(TokenKind::Assign)?;

        // stop at ';', or before the '}' closing an enclosing block.
        let mut depth = 0usize;
        while !(depth == 0 && self.cur.is(TokenKind::Semicolon)) && !self.peek_is(TokenKind::Eof) {
            if depth == 0 && self.peek_is(TokenKind::RBrace) {
                break;
            }
            self.next_token();
            match self.cur.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {},
            }
        }
        Some(Statement::Let { name })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        match self.peek.kind {
            TokenKind::Semicolon => {
                self.next_token();
                return Some(Statement::Return { value: None });
            },
            TokenKind::Eof | TokenKind::RBrace => {
                return Some(Statement::Return { value: None });
            },
            _ => {},
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Return { value: Some(value) })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest);
        // the semicolon is optional.
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        expr.map(Statement::Expression)
    }

    fn prefix_parse_fn(kind: TokenKind) -> Option<PrefixParseFn<'a, I>> {
        let parse_fn: PrefixParseFn<'a, I> = match kind {
            TokenKind::Ident => Self::parse_identifier,
            TokenKind::Int => Self::parse_int_literal,
            TokenKind::True | TokenKind::False => Self::parse_boolean,
            TokenKind::Bang | TokenKind::Minus => Self::parse_prefix_expression,
            TokenKind::LParen => Self::parse_grouped_expression,
            TokenKind::If => Self::parse_if_expression,
            _ => return None,
        };
        Some(parse_fn)
    }

    fn infix_parse_fn(kind: TokenKind) -> Option<InfixParseFn<'a, I>> {
        infix_operator(kind).map(|_| Self::parse_infix_expression as InfixParseFn<'a, I>)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match Self::prefix_parse_fn(self.cur.kind) {
            Some(parse_fn) => parse_fn,
            None => {
                self.error(ParseError::NoPrefixParseFn { kind: self.cur.kind });
                return None;
            },
        };
        let mut left = prefix(self);

        // a failed operand has already been reported. The rest of the chain
        // is still consumed so that the next statement starts after it.
        while !self.peek_is(TokenKind::Semicolon) && precedence < precedence_of(self.peek.kind) {
            let infix = match Self::infix_parse_fn(self.peek.kind) {
                Some(parse_fn) => parse_fn,
                None => return left,
            };
            self.next_token();
            left = match left {
                Some(left) => infix(self, left),
                None => {
                    self.skip_infix_operand();
                    None
                },
            };
        }
        left
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::ident(self.cur.literal))
    }

    fn parse_int_literal(&mut self) -> Option<Expression> {
        match int_from_literal(self.cur.literal) {
            Some(value) => Some(Expression::IntLiteral(value)),
            None => {
                self.error(ParseError::InvalidInteger {
                    literal: self.cur.literal.to_string(),
                });
                None
            },
        }
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.cur.is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = prefix_operator(self.cur.kind)?;
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::prefix(operator, right))
    }

    // Parentheses only steer the parse; they leave no node behind.
    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest);
        self.expect_peek(TokenKind::RParen)?;
        expr
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = infix_operator(self.cur.kind)?;
        // parsing the right side at our own precedence (rather than one above
        // the caller's) is what makes `a - b - c` group as `(a - b) - c`.
        let precedence = precedence_of(self.cur.kind);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::infix(left, operator, right))
    }

    // Like parse_infix_expression(), but with no left side to attach to.
    fn skip_infix_operand(&mut self) {
        let precedence = precedence_of(self.cur.kind);
        self.next_token();
        self.parse_expression(precedence);
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.parse_if().map(Expression::If)
    }

    // if (<condition>) { ... } [else { ... } | else if ...]
    fn parse_if(&mut self) -> Option<IfExpression> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;

        let mut alternative = None;
        if self.peek_is(TokenKind::Else) {
            self.next_token();
            let alt = if self.peek_is(TokenKind::If) {
                self.next_token();
                Alternative::If(self.parse_if()?)
            } else {
                self.expect_peek(TokenKind::LBrace)?;
                Alternative::Block(self.parse_block_statement()?)
            };
            alternative = Some(Box::new(alt));
        }

        Some(IfExpression {
            condition: Box::new(condition),
            body,
            alternative,
        })
    }

    // Expects the current token to be '{'; leaves the parser on the matching '}'.
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let mut block = BlockStatement::default();
        self.next_token();
        while !self.cur.is(TokenKind::RBrace) {
            if self.cur.is(TokenKind::Eof) {
                self.error(ParseError::UnexpectedToken {
                    expected: TokenKind::RBrace,
                    found: TokenKind::Eof,
                });
                return None;
            }
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }
        Some(block)
    }
}

/// Parses every statement the token source yields.
///
/// The program is returned even when there are diagnostics, holding whatever
/// statements could be built; callers should check the diagnostics first.
pub fn parse_program<'a, I>(token_iter: I) -> (Program, Vec<ParseError>)
    where I: Iterator<Item = Token<'a>>
{
    let mut parser = Parser::new(token_iter);
    let program = parser.parse_program();
    (program, parser.into_errors())
}

/// Tokenizes and parses `source`.
///
/// Binary operators associate to the left, and every operator shows up
/// parenthesized when the tree is rendered back:
///
/// ```
/// # use exprlang::parser::parse;
/// let (program, errors) = parse("1 - 2 - 3 * -4");
/// assert!(errors.is_empty());
/// assert_eq!(program.to_string(), "((1 - 2) - (3 * (-4)))");
/// ```
///
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    parse_program(TokenIter::new(source))
}
