use crate::ast::{deeper, Expr};
use crate::error::{Action, Error, Eval};
use crate::lexing::{Token, TokenType};
use crate::number::Number;
use crate::prelude::Prelude;


/// Evaluates trees against a prelude.
///
/// The context holds nothing but a reference to the prelude, so one context
/// can evaluate any number of trees, and evaluations never affect each other.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'p> {
    prelude: &'p Prelude,
}

impl<'p> EvalContext<'p> {
    pub fn new(prelude: &'p Prelude) -> EvalContext<'p> {
        EvalContext { prelude }
    }

    pub fn prelude(&self) -> &'p Prelude {
        self.prelude
    }

    /// Evaluate a tree.
    ///
    /// Nil evaluates to no value at all, which is not the same as zero. Any
    /// error aborts the whole evaluation.
    pub fn evaluate(&self, expr: &Expr) -> Result<Option<Number>, Error> {
        self.eval_at(expr, 0)
    }

    fn eval_at(&self, expr: &Expr, depth: u8) -> Result<Option<Number>, Error> {
        match expr {
            Expr::Atom(tok) => self.atom(tok).map(Some),
            Expr::Nil => Ok(None),
            Expr::List(elements) => self.call(elements, depth).map(Some).map_err(
                |err| match expr.span() {
                    Some(span) => err.tag_if_bare(span, Action::Evaluate),
                    None => err,
                }
            ),
        }
    }

    fn atom(&self, tok: &Token) -> Result<Number, Error> {
        match tok.kind {
            TokenType::Const => tok.text.parse::<Number>().map_err(
                |err| err.tag(tok.span(), Action::Evaluate)
            ),
            kind => Err(Error::new(Eval::CannotEvaluate(kind)).tag(tok.span(), Action::Evaluate)),
        }
    }

    /// Evaluate a list as a call: the head names a prelude function and the
    /// remaining elements, evaluated in order, are its operands.
    fn call(&self, elements: &[Expr], depth: u8) -> Result<Number, Error> {
        let (head, tail) = match elements.split_first() {
            Some(parts) => parts,
            None => return Err(Error::new(Eval::UndefinedFunction(String::new()))),
        };

        let (name, builtin) = match head {
            Expr::Atom(tok) if matches!(tok.kind, TokenType::Ident | TokenType::Op) => {
                let builtin = self.prelude.get(tok.text).ok_or_else(
                    || Error::new(Eval::UndefinedFunction(tok.text.to_owned())).tag(tok.span(), Action::Evaluate)
                )?;
                (tok, builtin)
            }
            other => {
                let err = Error::new(Eval::UndefinedFunction(other.to_string()));
                return Err(match other.span() {
                    Some(span) => err.tag(span, Action::Evaluate),
                    None => err,
                });
            }
        };

        let inner = deeper(depth)?;
        let mut args = Vec::with_capacity(tail.len());

        for operand in tail {
            match operand {
                Expr::Atom(tok) if tok.kind == TokenType::Op => {
                    return Err(Error::new(Eval::InvalidOperand(tok.text.to_owned())).tag(tok.span(), Action::Evaluate));
                }
                Expr::Nil => {
                    return Err(Error::new(Eval::InvalidOperand(operand.to_string())));
                }
                _ => {}
            }

            if let Some(value) = self.eval_at(operand, inner)? {
                args.push(value);
            }
        }

        builtin.call(&args).map_err(|err| err.tag_if_bare(name.span(), Action::Call))
    }
}


/// Evaluate a tree against a prelude.
pub fn evaluate(expr: &Expr, prelude: &Prelude) -> Result<Option<Number>, Error> {
    EvalContext::new(prelude).evaluate(expr)
}
