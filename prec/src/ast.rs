use std::fmt::Display;

use crate::error::{Action, Error, Reason, Span};
use crate::lexing::Token;


/// Deepest nesting level a tree may have. Depth is counted in a `u8`, and
/// anything that would push it further fails instead of wrapping around.
pub const MAX_DEPTH: usize = u8::MAX as usize;


/// Increment a depth counter, failing if it would exceed [`MAX_DEPTH`].
pub(crate) fn deeper(depth: u8) -> Result<u8, Error> {
    depth.checked_add(1).ok_or_else(|| Error::new(Reason::TooDeep(MAX_DEPTH)))
}


/// An s-expression.
///
/// A list is never empty: the empty list is [`Expr::Nil`]. Use [`Expr::list`]
/// to construct lists so this holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A constant, operator symbol or identifier.
    Atom(Token<'a>),

    /// A parenthesized, non-empty sequence of expressions.
    List(Vec<Expr<'a>>),

    /// The empty list `()`.
    Nil,
}

impl<'a> Expr<'a> {
    pub fn atom(token: Token<'a>) -> Expr<'a> {
        Expr::Atom(token)
    }

    /// Construct a list, collapsing to [`Expr::Nil`] if there are no elements.
    pub fn list(elements: Vec<Expr<'a>>) -> Expr<'a> {
        if elements.is_empty() {
            Expr::Nil
        } else {
            Expr::List(elements)
        }
    }

    /// The token of an atom.
    pub fn token(&self) -> Option<&Token<'a>> {
        match self {
            Expr::Atom(tok) => Some(tok),
            _ => None,
        }
    }

    /// The elements of a list. Atoms and nil have none.
    pub fn elements(&self) -> &[Expr<'a>] {
        match self {
            Expr::List(elements) => elements,
            _ => &[],
        }
    }

    /// The text covered by the atoms of this expression, from the first to
    /// the last. Enclosing parentheses are not included, and expressions with
    /// no atoms at all have no span.
    pub fn span(&self) -> Option<Span> {
        let mut first = None;
        let mut last = None;

        fn walk<'a>(expr: &Expr<'a>, first: &mut Option<Span>, last: &mut Option<Span>) {
            match expr {
                Expr::Atom(tok) => {
                    if first.is_none() {
                        *first = Some(tok.span());
                    }
                    *last = Some(tok.span());
                }
                Expr::List(elements) => {
                    for element in elements {
                        walk(element, first, last);
                    }
                }
                Expr::Nil => {}
            }
        }

        walk(self, &mut first, &mut last);
        Some(Span::from(first?..last?))
    }

    /// Visit every node in pre-order, depth first.
    ///
    /// The callback receives each node together with its depth: the root is
    /// at depth zero and the elements of a list at depth d are at depth d + 1.
    /// Fails if the tree is nested deeper than [`MAX_DEPTH`].
    pub fn visit<F>(&self, f: &mut F) -> Result<(), Error>
    where
        F: FnMut(&Expr<'a>, u8),
    {
        self.visit_at(f, 0)
    }

    fn visit_at<F>(&self, f: &mut F, depth: u8) -> Result<(), Error>
    where
        F: FnMut(&Expr<'a>, u8),
    {
        f(self, depth);

        if let Expr::List(elements) = self {
            let inner = deeper(depth).map_err(|err| match self.span() {
                Some(span) => err.tag(span, Action::Visit),
                None => err,
            })?;
            for element in elements {
                element.visit_at(f, inner)?;
            }
        }

        Ok(())
    }

    /// The depth of the deepest node.
    pub fn depth(&self) -> Result<u8, Error> {
        let mut max: u8 = 0;
        self.visit(&mut |_, depth| max = max.max(depth))?;
        Ok(max)
    }

    /// A one-line description of this node alone, used for dumping.
    pub fn describe(&self) -> String {
        match self {
            Expr::Atom(tok) => format!("atom {} {}", tok.kind, tok.text),
            Expr::List(_) => "list".to_owned(),
            Expr::Nil => "nil".to_owned(),
        }
    }
}

impl<'a> Display for Expr<'a> {
    /// Canonical s-expression text. Parsing it again gives back the same tree.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Atom(tok) => f.write_str(tok.text),
            Expr::Nil => f.write_str("()"),
            Expr::List(elements) => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    Display::fmt(element, f)?;
                }
                f.write_str(")")
            }
        }
    }
}


/// Renders a tree as an indented outline, one node per line.
#[derive(Debug, Clone, Copy)]
pub struct Dumper {
    /// Spaces per level of depth.
    pub indent: usize,
}

impl Default for Dumper {
    fn default() -> Self {
        Dumper { indent: 2 }
    }
}

impl Dumper {
    pub fn new(indent: usize) -> Dumper {
        Dumper { indent }
    }

    pub fn dump(&self, expr: &Expr) -> Result<String, Error> {
        let mut out = String::new();
        expr.visit(&mut |node, depth| {
            out.push_str(&" ".repeat(self.indent * depth as usize));
            out.push_str(&node.describe());
            out.push('\n');
        })?;
        Ok(out)
    }
}
