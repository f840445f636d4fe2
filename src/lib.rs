pub mod lexer;
pub mod parser;
pub mod ast;
pub mod value;
pub mod evaluator;

pub use parser::{parse, parse_program, ParseError, Parser};
pub use ast::Program;
pub use value::Value;
pub use evaluator::{eval, EvalError};
