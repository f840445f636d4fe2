use std::fmt;
use std::fmt::{Display, Formatter};

/// The parse root: the top-level statements of one input, in order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    /// `let <name> = ...;`. The bound expression is skipped by the parser,
    /// only the name is kept.
    Let { name: Identifier },
    /// `return <value>;`, or a bare `return;`.
    Return { value: Option<Expression> },
    Expression(Expression),
}

/// A `{ ... }` body, as used by if/else.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntLiteral(i64),
    Boolean(bool),
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    If(IfExpression),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub body: BlockStatement,
    pub alternative: Option<Box<Alternative>>,
}

/// What may follow `else`: a plain block, or another `if` for else-if chains.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Alternative {
    Block(BlockStatement),
    If(IfExpression),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InfixOperator {
    Eq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,
    Plus,
    Minus,
    Asterisk,
    Slash,
}

impl Identifier {
    pub fn new(name: &str) -> Identifier {
        Identifier { name: name.to_string() }
    }
}

// Shorthand constructors, mostly so that trees can be written by hand in tests.
impl Expression {
    pub fn ident(name: &str) -> Expression {
        Expression::Identifier(Identifier::new(name))
    }

    pub fn prefix(operator: PrefixOperator, right: Expression) -> Expression {
        Expression::Prefix {
            operator,
            right: Box::new(right),
        }
    }

    pub fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Expression {
        Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PrefixOperator::Bang => f.write_str("!"),
            PrefixOperator::Minus => f.write_str("-"),
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let symbol = match self {
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::Lte => "<=",
            InfixOperator::Gte => ">=",
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Asterisk => "*",
            InfixOperator::Slash => "/",
        };
        f.write_str(symbol)
    }
}

// Rendering. Every prefix and infix expression is wrapped in parentheses, so
// the grouping the parser settled on is visible even though the source
// parentheses themselves are gone.

impl Display for Program {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Statement::Let { name } => write!(f, "let {};", name),
            Statement::Return { value: Some(value) } => write!(f, "return {};", value),
            Statement::Return { value: None } => write!(f, "return;"),
            Statement::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for stmt in &self.statements {
            write!(f, " {}", stmt)?;
        }
        write!(f, " }}")
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntLiteral(value) => write!(f, "{}", value),
            Expression::Boolean(value) => write!(f, "{}", value),
            Expression::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expression::Infix { left, operator, right } => {
                write!(f, "({} {} {})", left, operator, right)
            },
            Expression::If(if_expr) => write!(f, "{}", if_expr),
        }
    }
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "if {} {}", self.condition, self.body)?;
        match self.alternative.as_deref() {
            Some(Alternative::Block(block)) => write!(f, " else {}", block),
            Some(Alternative::If(if_expr)) => write!(f, " else {}", if_expr),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // wrappers to reduce boilerplate.
    fn int(value: i64) -> Expression {
        Expression::IntLiteral(value)
    }
    fn block(statements: Vec<Statement>) -> BlockStatement {
        BlockStatement { statements }
    }
    fn expr_stmt(expr: Expression) -> Statement {
        Statement::Expression(expr)
    }

    #[test]
    fn prefix_is_parenthesized() {
        let expr = Expression::prefix(PrefixOperator::Minus, int(5));
        assert_eq!(expr.to_string(), "(-5)");
    }

    #[test]
    fn nested_infix() {
        let expr = Expression::infix(
            int(1),
            InfixOperator::Plus,
            Expression::infix(int(2), InfixOperator::Asterisk, Expression::ident("x")),
        );
        assert_eq!(expr.to_string(), "(1 + (2 * x))");
    }

    #[test]
    fn let_and_return() {
        let program = Program {
            statements: vec![
                Statement::Let { name: Identifier::new("x") },
                Statement::Return { value: Some(Expression::Boolean(true)) },
                Statement::Return { value: None },
            ],
        };
        assert_eq!(program.to_string(), "let x;\nreturn true;\nreturn;");
    }

    #[test]
    fn if_else_if_chain() {
        let expr = Expression::If(IfExpression {
            condition: Box::new(Expression::ident("a")),
            body: block(vec![expr_stmt(int(1))]),
            alternative: Some(Box::new(Alternative::If(IfExpression {
                condition: Box::new(Expression::ident("b")),
                body: block(vec![expr_stmt(int(2))]),
                alternative: Some(Box::new(Alternative::Block(block(vec![])))),
            }))),
        });
        assert_eq!(expr.to_string(), "if a { 1 } else if b { 2 } else { }");
    }

    #[test]
    fn empty_program() {
        assert_eq!(Program::default().to_string(), "");
    }
}
