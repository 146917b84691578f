//! A precision calculator for a small lisp-like dialect.
//!
//! One line of input holds one s-expression such as `(* 2 (+ 1 1))`. The line
//! is lexed and parsed into an [`Expr`] tree, which is then evaluated against
//! a [`Prelude`] of built-in functions.

#[macro_use]
extern crate lazy_static;

mod ast;
mod error;
mod eval;
mod lexing;
mod number;
mod parsing;
mod prelude;
mod traits;

#[cfg(test)]
mod tests;

pub use ast::{Dumper, Expr, MAX_DEPTH};
pub use error::{Action, Error, Eval, Lex, Reason, Span, Syntax, Tagged};
pub use eval::{evaluate, EvalContext};
pub use lexing::{Lexer, Token, TokenType};
pub use number::Number;
pub use parsing::{parse, parse_tagged, Parser};
pub use prelude::{Arity, Builtin, Prelude, PreludeFn};
pub use traits::Taggable;


/// Parse and evaluate one line of input.
pub fn eval_str(input: &str, prelude: &Prelude) -> Result<Option<Number>, Error> {
    parse(input).and_then(|expr| evaluate(&expr, prelude))
}
