use exprlang::{
    eval,
    parse,
    EvalError,
    ParseError,
    Value,
};
use exprlang::lexer::{Token, TokenKind};
use exprlang::value::{FALSE, NULL, TRUE};

fn run(src: &str) -> Result<Value, EvalError> {
    let (program, errors) = parse(src);
    if !errors.is_empty() {
        panic!("Script failed to parse:\n{}\nErrors: {:?}", src, errors);
    }
    eval(&program)
}

fn assert_value(src: &str, expected: Value) {
    assert_eq!(run(src), Ok(expected), "source: {}", src);
}

fn assert_failure(src: &str, message: &str) {
    match run(src) {
        Err(e) => assert_eq!(e.to_string(), message, "source: {}", src),
        Ok(v) => panic!("Script evaluated to {} but was expected to fail:\n{}", v, src),
    }
}

fn render(src: &str) -> String {
    let (program, errors) = parse(src);
    assert!(errors.is_empty(), "errors: {:?}", errors);
    program.to_string()
}

#[test]
fn arithmetic_matches_i64() {
    let pairs = [(7, 2), (-7, 2), (7, -2), (123_456, 789), (-1, 1), (0, 5)];
    for (a, b) in pairs.iter() {
        let (a, b): (i64, i64) = (*a, *b);
        assert_value(&format!("{} + {}", a, b), Value::Integer(a + b));
        assert_value(&format!("{} - {}", a, b), Value::Integer(a - b));
        assert_value(&format!("{} * {}", a, b), Value::Integer(a * b));
        assert_value(&format!("{} / {}", a, b), Value::Integer(a / b));
    }
}

#[test]
fn associativity_and_precedence() {
    assert_value("1 - 2 - 3", Value::Integer(-4));
    assert_value("2 * 3 * 4", Value::Integer(24));
    assert_value("1 + 2 * 3", Value::Integer(7));
    assert_value("(1 + 2) * 3", Value::Integer(9));
}

#[test]
fn rendering() {
    insta::assert_snapshot!(render("-5"), @"(-5)");
    insta::assert_snapshot!(render("1 + 2 * 3"), @"(1 + (2 * 3))");
    insta::assert_snapshot!(render("(1 + 2) * 3"), @"((1 + 2) * 3)");
    insta::assert_snapshot!(render("!-a == b"), @"((!(-a)) == b)");
    insta::assert_snapshot!(
        render("if (a >= 1) { return a; } else if (b) { b } else { c }"),
        @"if (a >= 1) { return a; } else if b { b } else { c }"
    );
}

#[test]
fn boolean_identity_equality() {
    assert_value("true == true", TRUE);
    assert_value("true != true", FALSE);
    assert_value("(1 < 2) == (2 < 3)", TRUE);
    assert_failure("true == 1", "type mismatch: BOOLEAN == INTEGER");
}

#[test]
fn integers_are_always_truthy() {
    assert_value("if (0) { 1 } else { 2 }", Value::Integer(1));
    assert_value("if (false) { 1 } else { 2 }", Value::Integer(2));
    assert_value("if (false) { 1 }", NULL);
}

#[test]
fn return_propagates_through_nested_blocks() {
    assert_value("if (true) { if (true) { return 10; } return 1; }", Value::Integer(10));
    assert_value(
        "if (true) { if (false) { 1 } else { if (true) { return 2; } } 3 } 4",
        Value::Integer(2),
    );
}

#[test]
fn errors_stop_the_program() {
    assert_failure("5 + true; 10", "type mismatch: INTEGER + BOOLEAN");
    assert_failure("1; -false; 3", "unsupported operator: -BOOLEAN");
    assert_failure("10 / (5 - 5)", "division by zero");
}

#[test]
fn let_missing_assign_keeps_parsing() {
    let (program, errors) = parse("let x 5; let y = 1; 2 * 3");
    assert_eq!(errors, vec![ParseError::UnexpectedToken {
        expected: TokenKind::Assign,
        found: TokenKind::Int,
    }]);
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["expected next token to be =, got INT instead"]);
    assert_eq!(program.to_string(), "5\nlet y;\n(2 * 3)");
    assert_eq!(eval(&program), Ok(Value::Integer(6)));
}

#[test]
fn several_diagnostics_in_order() {
    let (_, errors) = parse("let 1; (2 + 3; 99999999999999999999");
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec![
        "expected next token to be IDENT, got INT instead",
        "expected next token to be ), got ; instead",
        "could not parse \"99999999999999999999\" as integer",
    ]);
}

#[test]
fn custom_token_source() {
    // any iterator of tokens will do, not only the lexer.
    let tokens = vec![
        Token::new(TokenKind::Bang, "!"),
        Token::new(TokenKind::LParen, "("),
        Token::new(TokenKind::Int, "3"),
        Token::new(TokenKind::Gt, ">"),
        Token::new(TokenKind::Int, "4"),
        Token::new(TokenKind::RParen, ")"),
    ];
    let (program, errors) = exprlang::parse_program(tokens.into_iter());
    assert!(errors.is_empty());
    assert_eq!(program.to_string(), "(!(3 > 4))");
    assert_eq!(eval(&program), Ok(TRUE));
}
