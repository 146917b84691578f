use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::ast::{Expr, MAX_DEPTH};
use crate::error::{Eval, Reason};
use crate::eval::EvalContext;
use crate::eval_str;
use crate::lexing::{Token, TokenType};
use crate::number::Number;
use crate::parsing::parse;
use crate::prelude::{Arity, Prelude};


fn eval(code: &str) -> Result<Option<Number>, crate::error::Error> {
    eval_str(code, &Prelude::new())
}


fn frac(n: i64, d: i64) -> Number {
    Number::from(BigRational::new(BigInt::from(n), BigInt::from(d)))
}


macro_rules! value {
    ($code:expr, $x:expr $(,)?) => {
        assert_eq!(eval($code), Ok(Some(Number::from($x))))
    };
}


macro_rules! fails {
    ($code:expr, $reason:expr, $offset:expr $(,)?) => {
        {
            let err = eval($code).unwrap_err();
            assert_eq!(err.reason(), Some(&Reason::from($reason)));
            assert_eq!(err.offset(), Some($offset));
        }
    };
}


#[test]
fn basics() {
    value!("(+ 1 2)", 3);
    value!("(* 2 (+ 1 1))", 4);
    value!("(min 3 1 4 1 5)", 1);
    value!("(max 3 1 4 1 5)", 5);
    value!("(sqrt 4)", 2);
}


#[test]
fn constants() {
    value!("5", 5);
    value!("-5", -5);
    value!("+5", 5);
    value!("  (+ 0 0)  ", 0);
}


#[test]
fn nil_has_no_value() {
    assert_eq!(eval("()"), Ok(None));
    assert_eq!(eval("( )"), Ok(None));
}


#[test]
fn signs() {
    value!("(- -1 -2)", 1);
    value!("(- 1 2)", -1);
    value!("(+ +1 -1)", 0);
    fails!("(-1)", Eval::UndefinedFunction("-1".to_owned()), 1);
}


#[test]
fn all_functions() {
    value!("(- 10 1 2)", 7);
    value!("(- 5)", 5);
    value!("(/ 12 2 3)", 2);
    value!("(neg 3)", -3);
    value!("(abs -3)", 3);
    value!("(abs (neg 3))", 3);
    value!("(count 1 2 3)", 3);
    value!("(count (+ 1 2) (sqrt 9))", 2);
    value!("(max (min 2 8) (sqrt 16) (abs -3))", 4);
}


#[test]
fn exactness() {
    value!("(/ 1 4)", frac(1, 4));
    value!("(* (/ 1 2) 4)", 2);
    value!("(+ (/ 1 3) (/ 2 3))", 1);
    value!("(/ 10 5)", 2);
    value!("(sqrt (/ 9 4))", frac(3, 2));

    let root = eval("(sqrt 2)").unwrap().unwrap();
    assert_eq!(format!("{:.10}", root), "1.4142135624");

    assert_eq!(
        eval("(* 99999999999999999999 99999999999999999999)"),
        Ok(Some(Number::from_str("9999999999999999999800000000000000000001").unwrap())),
    );
    assert_eq!(
        eval("(- 100000000000000000000000000001 100000000000000000000000000000)"),
        Ok(Some(Number::from(1))),
    );
}


#[test]
fn huge_quotients_stay_exact() {
    let b = format!("1{}", "0".repeat(400));
    let big = BigInt::from_str(&b).unwrap();

    assert_eq!(
        eval(&format!("(/ {} 3)", b)),
        Ok(Some(Number::from(BigRational::new(big.clone(), BigInt::from(3))))),
    );
    value!(&format!("(- (/ {b} 3) (/ {b} 3))", b = b), 0);
    value!(&format!("(* (/ {b} 3) 3)", b = b), big.clone());
    value!(&format!("(/ (/ {b} 3) (/ {b} 6))", b = b), 2);
    fails!(&format!("(/ 1 (- (/ {b} 3) (/ {b} 3)))", b = b), Eval::DivisionByZero, 1);

    let third = eval(&format!("(/ {} 3)", b)).unwrap().unwrap();
    let text = format!("{:.2}", third);
    assert_eq!(text.len(), 400 + 3);
    assert!(text.starts_with("3333"));
    assert!(text.ends_with(".33"));
}


#[test]
fn huge_roots_stay_finite() {
    let b = format!("1{}", "0".repeat(400));
    let root_of_b = Number::from(BigInt::from_str(&format!("1{}", "0".repeat(200))).unwrap());

    value!(&format!("(sqrt {})", b), root_of_b.clone());

    let root = eval(&format!("(sqrt (+ {} 1))", b)).unwrap().unwrap();
    assert!(root >= root_of_b);
    assert!(root < root_of_b.add(&Number::from(1)));

    let root = eval(&format!("(sqrt (* 2 {}))", b)).unwrap().unwrap();
    assert!(matches!(root, Number::Rational(_)));
    let text = format!("{:.0}", root);
    assert_eq!(text.len(), 201);
    assert!(text.starts_with("14142135623730950488"));

    let root = eval(&format!("(sqrt (/ {} 3))", b)).unwrap().unwrap();
    assert!(matches!(root, Number::Rational(_)));
    assert_eq!(format!("{:.0}", root).len(), 200);
}


#[test]
fn comparisons_beyond_double_precision() {
    value!("(min 9007199254740993 (/ 18014398509481985 2))", frac(18014398509481985, 2));
    value!("(max (/ 18014398509481985 2) 9007199254740993)", 9007199254740993i64);
    value!("(max 9007199254740993 9007199254740992)", 9007199254740993i64);
    value!(
        "(min (/ 100000000000000000000000000001 3) (/ 100000000000000000000000000000 3))",
        Number::from(BigRational::new(
            BigInt::from_str("100000000000000000000000000000").unwrap(),
            BigInt::from(3),
        )),
    );
}


#[test]
fn undefined_functions() {
    fails!("(foo 1)", Eval::UndefinedFunction("foo".to_owned()), 1);
    fails!("(MAX 1)", Eval::UndefinedFunction("MAX".to_owned()), 1);
    fails!("(1 2)", Eval::UndefinedFunction("1".to_owned()), 1);
    fails!("((+ 1 2) 3)", Eval::UndefinedFunction("(+ 1 2)".to_owned()), 2);

    let err = eval("(foo 1)").unwrap_err();
    assert!(err.is_eval());
    assert_eq!(err.to_string(), "undefined function `foo` at offset 1");
}


#[test]
fn atoms_that_cannot_be_evaluated() {
    fails!("max", Eval::CannotEvaluate(TokenType::Ident), 0);
    fails!("+", Eval::CannotEvaluate(TokenType::Op), 0);
    fails!("(+ 1 max)", Eval::CannotEvaluate(TokenType::Ident), 5);
}


#[test]
fn invalid_operands() {
    fails!("(+ 1 +)", Eval::InvalidOperand("+".to_owned()), 5);
    fails!("(max * 2)", Eval::InvalidOperand("*".to_owned()), 5);
    fails!("(+ 1 ())", Eval::InvalidOperand("()".to_owned()), 1);
}


#[test]
fn argument_counts() {
    fails!("(+)", Eval::ArgCount { name: "+".to_owned(), arity: Arity::AtLeast(1), received: 0 }, 1);
    fails!("(sqrt 1 2)", Eval::ArgCount { name: "sqrt".to_owned(), arity: Arity::Exactly(1), received: 2 }, 1);
    fails!("(neg)", Eval::ArgCount { name: "neg".to_owned(), arity: Arity::Exactly(1), received: 0 }, 1);
}


#[test]
fn domain_errors() {
    fails!("(/ 1 0)", Eval::DivisionByZero, 1);
    fails!("(/ 10 (- 5 5))", Eval::DivisionByZero, 1);
    fails!("(+ 1 (/ 1 0))", Eval::DivisionByZero, 6);
    fails!("(sqrt -4)", Eval::OutOfRange, 1);
    fails!("(sqrt (neg 1))", Eval::OutOfRange, 1);
}


#[test]
fn errors_abort_evaluation() {
    fails!("(+ 1 (foo))", Eval::UndefinedFunction("foo".to_owned()), 6);
    fails!("(max (sqrt -1) (foo))", Eval::OutOfRange, 6);
}


#[test]
fn parse_errors_pass_through() {
    assert!(eval("(+ 1 2").unwrap_err().is_syntax());
    assert!(eval("#").unwrap_err().is_lex());
    assert_eq!(eval("#").unwrap_err().offset(), Some(0));
}


#[test]
fn rendering() {
    let err = eval("(foo 1)").unwrap_err().render(Some("(foo 1)"));
    assert_eq!(
        err.rendered(),
        Some("Error: undefined function `foo`\n(foo 1)\n ^^^\nwhile evaluating at column 2"),
    );

    let err = eval("(+)").unwrap_err().render(Some("(+)"));
    assert_eq!(
        err.rendered(),
        Some("Error: wrong number of arguments for `+`: expected at least 1 argument, got 0\n(+)\n ^\nwhile calling function at column 2"),
    );

    // Columns and markers count characters, not bytes
    let code = "(\u{a0}foo 1)";
    let err = eval(code).unwrap_err();
    assert_eq!(err.offset(), Some(3));
    assert_eq!(
        err.render(Some(code)).rendered(),
        Some("Error: undefined function `foo`\n(\u{a0}foo 1)\n  ^^^\nwhile evaluating at column 3"),
    );

    let code = "(+\u{a0}é)";
    let err = eval(code).unwrap_err();
    assert_eq!(err.offset(), Some(4));
    assert_eq!(
        err.render(Some(code)).rendered(),
        Some("Error: unexpected character 'é'\n(+\u{a0}é)\n   ^\nwhile parsing at column 4"),
    );

    let err = eval("(+ 1 2").unwrap_err().render(None);
    assert_eq!(err.rendered(), Some("Error: unterminated list\nwhile parsing at column 1"));
    assert_eq!(err.unrender().rendered(), None);
}


#[test]
fn context_is_reusable() {
    let prelude = Prelude::new();
    let context = EvalContext::new(&prelude);

    let first = parse("(+ 1 2)").unwrap();
    let second = parse("(foo)").unwrap();
    let third = parse("(* 3 3)").unwrap();

    assert_eq!(context.evaluate(&first), Ok(Some(Number::from(3))));
    assert!(context.evaluate(&second).is_err());
    assert_eq!(context.evaluate(&third), Ok(Some(Number::from(9))));
    assert_eq!(context.evaluate(&first), Ok(Some(Number::from(3))));
}


#[test]
fn depth_limit() {
    let plus = Token { kind: TokenType::Op, offset: 0, text: "+" };
    let one = Token { kind: TokenType::Const, offset: 2, text: "1" };

    let nested = |n: usize| {
        let mut expr = Expr::atom(one);
        for _ in 0..n {
            expr = Expr::list(vec![Expr::atom(plus), expr]);
        }
        expr
    };

    let prelude = Prelude::new();
    let context = EvalContext::new(&prelude);

    assert_eq!(context.evaluate(&nested(MAX_DEPTH)), Ok(Some(Number::from(1))));

    let err = context.evaluate(&nested(MAX_DEPTH + 1)).unwrap_err();
    assert_eq!(err.reason(), Some(&Reason::TooDeep(MAX_DEPTH)));
}
