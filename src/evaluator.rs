use crate::ast::{
    Alternative,
    BlockStatement,
    Expression,
    IfExpression,
    InfixOperator,
    PrefixOperator,
    Program,
    Statement,
};
use crate::value::{Value, FALSE, NULL, TRUE};
use thiserror::Error;

/// A runtime error. Evaluation stops at the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unsupported operator: {left} {operator} {right}")]
    UnsupportedInfix {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },

    #[error("unsupported operator: {operator}{right}")]
    UnsupportedPrefix {
        operator: PrefixOperator,
        right: &'static str,
    },

    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,
}

/// Why a statement sequence stopped before its end.
///
/// These never appear as ordinary values: they travel on the error side of
/// [`Reduction`] until the outermost node consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A `return` was executed. Blocks pass it on still wrapped; only the
    /// program (or the outermost call to eval()) unwraps it.
    Return(Value),
    Error(EvalError),
}

impl From<EvalError> for Signal {
    fn from(err: EvalError) -> Signal {
        Signal::Error(err)
    }
}

pub type Reduction = Result<Value, Signal>;

/// Anything the evaluator can reduce to a value.
pub trait Evaluate {
    fn reduce(&self) -> Reduction;
}

/// Evaluates a node (usually a whole `Program`).
///
/// A `return` that reaches this level yields its payload:
///
/// ```
/// # use exprlang::{evaluator::eval, parser::parse, value::Value};
/// let (program, _) = parse("if (true) { if (true) { return 10; } return 1; }");
/// assert_eq!(eval(&program), Ok(Value::Integer(10)));
/// ```
///
pub fn eval<N>(node: &N) -> Result<Value, EvalError>
    where N: Evaluate + ?Sized
{
    match node.reduce() {
        Ok(value) | Err(Signal::Return(value)) => Ok(value),
        Err(Signal::Error(err)) => {
            tracing::debug!(%err, "evaluation error");
            Err(err)
        },
    }
}

impl Evaluate for Program {
    fn reduce(&self) -> Reduction {
        let mut result = NULL;
        for stmt in &self.statements {
            match stmt.reduce() {
                Ok(value) => result = value,
                Err(Signal::Return(value)) => return Ok(value),
                Err(err) => return Err(err),
            }
        }
        Ok(result)
    }
}

impl Evaluate for BlockStatement {
    // Unlike Program, a return is handed up as is, so that it also stops
    // every enclosing block.
    fn reduce(&self) -> Reduction {
        let mut result = NULL;
        for stmt in &self.statements {
            result = stmt.reduce()?;
        }
        Ok(result)
    }
}

impl Evaluate for Statement {
    fn reduce(&self) -> Reduction {
        match self {
            // nothing to bind to: there is no environment.
            Statement::Let { .. } => Ok(NULL),
            Statement::Return { value } => {
                let value = match value {
                    Some(expr) => expr.reduce()?,
                    None => NULL,
                };
                Err(Signal::Return(value))
            },
            Statement::Expression(expr) => expr.reduce(),
        }
    }
}

impl Evaluate for Expression {
    fn reduce(&self) -> Reduction {
        match self {
            Expression::Identifier(_) => Ok(NULL),
            Expression::IntLiteral(n) => Ok(Value::Integer(*n)),
            Expression::Boolean(b) => Ok(Value::from(*b)),
            Expression::Prefix { operator, right } => {
                let right = right.reduce()?;
                Ok(eval_prefix_expression(*operator, right)?)
            },
            Expression::Infix { left, operator, right } => {
                // left to right; an error on the left means the right
                // side is never looked at.
                let left = left.reduce()?;
                let right = right.reduce()?;
                Ok(eval_infix_expression(*operator, left, right)?)
            },
            Expression::If(if_expr) => if_expr.reduce(),
        }
    }
}

impl Evaluate for IfExpression {
    fn reduce(&self) -> Reduction {
        let condition = self.condition.reduce()?;
        if condition.is_truthy() {
            return self.body.reduce();
        }
        match self.alternative.as_deref() {
            Some(Alternative::Block(block)) => block.reduce(),
            Some(Alternative::If(if_expr)) => if_expr.reduce(),
            None => Ok(NULL),
        }
    }
}

fn eval_prefix_expression(operator: PrefixOperator, right: Value) -> Result<Value, EvalError> {
    match operator {
        PrefixOperator::Bang => Ok(eval_bang_operator(right)),
        PrefixOperator::Minus => match right {
            Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
            _ => Err(EvalError::UnsupportedPrefix {
                operator,
                right: right.type_name(),
            }),
        },
    }
}

// Zero counts as false here even though it is truthy in conditions.
fn eval_bang_operator(right: Value) -> Value {
    match right {
        Value::Boolean(b) => Value::from(!b),
        Value::Integer(0) => TRUE,
        Value::Integer(_) => FALSE,
        Value::Null => FALSE,
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Value, right: Value) -> Result<Value, EvalError> {
    if let (Value::Integer(l), Value::Integer(r)) = (left, right) {
        return eval_integer_infix_expression(operator, l, r);
    }
    if !left.same_type(&right) {
        return Err(EvalError::TypeMismatch {
            left: left.type_name(),
            operator,
            right: right.type_name(),
        });
    }
    // booleans and null are interned, so this is an identity check.
    match operator {
        InfixOperator::Eq => Ok(Value::from(left == right)),
        InfixOperator::NotEq => Ok(Value::from(left != right)),
        _ => Err(EvalError::UnsupportedInfix {
            left: left.type_name(),
            operator,
            right: right.type_name(),
        }),
    }
}

fn eval_integer_infix_expression(operator: InfixOperator, l: i64, r: i64) -> Result<Value, EvalError> {
    let value = match operator {
        InfixOperator::Plus => Value::Integer(l.wrapping_add(r)),
        InfixOperator::Minus => Value::Integer(l.wrapping_sub(r)),
        InfixOperator::Asterisk => Value::Integer(l.wrapping_mul(r)),
        InfixOperator::Slash => {
            if r == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Value::Integer(l.wrapping_div(r))
        },
        InfixOperator::Lt => Value::from(l < r),
        InfixOperator::Lte => Value::from(l <= r),
        InfixOperator::Gt => Value::from(l > r),
        InfixOperator::Gte => Value::from(l >= r),
        InfixOperator::Eq => Value::from(l == r),
        InfixOperator::NotEq => Value::from(l != r),
    };
    Ok(value)
}
