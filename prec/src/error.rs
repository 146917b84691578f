use std::cmp::min;
use std::fmt::{Debug, Display, Write};
use std::ops::Range;

use thiserror::Error as ThisError;

use crate::lexing::TokenType;
use crate::prelude::Arity;


/// Mark an interval of text in the input line, starting at a byte offset with
/// a length.
///
/// Input to prec is always a single line, so unlike a general purpose span
/// there's no line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    offset: usize,
    length: usize,
}

impl Span {
    /// Construct a new span from offset and length.
    pub fn new(offset: usize, length: usize) -> Span {
        Span { offset, length }
    }

    /// The zero-indexed offset of the start of the span.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The offset one past the end of the span.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Span {
            offset: value.start,
            length: value.end - value.start,
        }
    }
}

impl From<Range<Span>> for Span {
    fn from(Range { start, end }: Range<Span>) -> Self {
        Span {
            offset: start.offset,
            length: end.end() - start.offset,
        }
    }
}


/// A wrapper for marking any object with a text span pointing to its origin in
/// the input line.
#[derive(Clone, Copy, PartialEq)]
pub struct Tagged<T> {
    span: Span,
    contents: T,
}

impl<T> Tagged<T> {
    /// Construct a new Tagged wrapper.
    pub fn new(location: Span, contents: T) -> Tagged<T> {
        Tagged::<T> {
            span: location,
            contents,
        }
    }

    /// Return the text span.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Destroy the wrapper and return its contents.
    pub fn unwrap(self) -> T {
        self.contents
    }
}

impl<T: Debug> Debug for Tagged<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.contents.fmt(f)?;
        f.write_fmt(format_args!(
            ".tag({}..{})",
            self.span.offset(),
            self.span.end(),
        ))
    }
}


/// Reasons the lexer can reject input.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Lex {
    /// A character that starts no token, or the first character of an
    /// identifier or integer that was glued to something it can't touch.
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}


/// Reasons the parser can reject a token stream.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Syntax {
    /// A list was opened but input ended before it was closed.
    #[error("unterminated list")]
    UnterminatedList,

    /// An expression can't start with this token.
    #[error("invalid entry point: {0}")]
    InvalidEntryPoint(TokenType),

    /// Something other than whitespace follows a complete expression.
    #[error("unexpected trailing input")]
    TrailingInput,
}


/// Reasons evaluation can fail.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Eval {
    /// Only integer constants evaluate to a value on their own.
    #[error("cannot evaluate atom of kind {0}")]
    CannotEvaluate(TokenType),

    /// The head of a list doesn't name a prelude entry.
    #[error("undefined function `{0}`")]
    UndefinedFunction(String),

    /// A prelude entry was called with an unsuitable number of operands.
    #[error("wrong number of arguments for `{name}`: expected {arity}, got {received}")]
    ArgCount {
        name: String,
        arity: Arity,
        received: usize,
    },

    /// An operator symbol or `()` was found in operand position.
    #[error("invalid operand type `{0}`")]
    InvalidOperand(String),

    /// An integer literal could not be converted to a number.
    #[error("invalid integer literal `{0}`")]
    InvalidLiteral(String),

    #[error("division by zero")]
    DivisionByZero,

    /// The operand is outside the domain of the function.
    #[error("value out of range")]
    OutOfRange,
}


/// Grand enumeration of all possible error reasons.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Reason {
    #[error("{0}")]
    Lex(#[from] Lex),

    #[error("{0}")]
    Syntax(#[from] Syntax),

    #[error("{0}")]
    Eval(#[from] Eval),

    /// Nesting exceeded what the depth counter can represent.
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
}


/// Enumerates the things prec might be doing when an error happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Lexing or parsing the input line.
    Parse,

    /// Evaluating an expression.
    Evaluate,

    /// Calling a prelude function.
    Call,

    /// Traversing a parsed tree.
    Visit,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => f.write_str("parsing"),
            Self::Evaluate => f.write_str("evaluating"),
            Self::Call => f.write_str("calling function"),
            Self::Visit => f.write_str("traversing"),
        }
    }
}


/// The general error type of prec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Error {
    /// Locations where the error happened, innermost first.
    locations: Option<Vec<(Span, Action)>>,

    /// Reason for the error.
    reason: Option<Reason>,

    /// Human friendly string representation.
    rendered: Option<String>,
}

impl Error {
    /// Construct a new error with an empty location stack.
    pub fn new<T>(reason: T) -> Self
    where
        Reason: From<T>,
    {
        Self {
            locations: None,
            reason: Some(Reason::from(reason)),
            rendered: None,
        }
    }

    /// Append a location to the stack. Takes ownership and returns the same
    /// object, for ease of use with `Result::map_err`.
    pub fn tag<T>(mut self, loc: T, action: Action) -> Self
    where
        Span: From<T>,
    {
        match &mut self.locations {
            None => {
                self.locations = Some(vec![(Span::from(loc), action)]);
            }
            Some(vec) => {
                vec.push((Span::from(loc), action));
            }
        }
        self
    }

    /// Tag the error only if it doesn't have a location yet.
    pub(crate) fn tag_if_bare<T>(self, loc: T, action: Action) -> Self
    where
        Span: From<T>,
    {
        if self.locations.is_some() {
            self
        } else {
            self.tag(loc, action)
        }
    }

    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    /// The innermost location of the error, if known.
    pub fn span(&self) -> Option<Span> {
        self.locations
            .as_ref()
            .and_then(|locs| locs.first())
            .map(|(span, _)| *span)
    }

    /// The offset of the innermost location of the error, if known.
    pub fn offset(&self) -> Option<usize> {
        self.span().map(|span| span.offset())
    }

    /// True if the error was raised by the lexer.
    pub fn is_lex(&self) -> bool {
        matches!(self.reason, Some(Reason::Lex(_)))
    }

    /// True if the error was raised by the parser.
    pub fn is_syntax(&self) -> bool {
        matches!(self.reason, Some(Reason::Syntax(_)))
    }

    /// True if the error was raised by the evaluator or a prelude function.
    pub fn is_eval(&self) -> bool {
        matches!(self.reason, Some(Reason::Eval(_)))
    }

    /// Get the human-friendly text.
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    /// Remove the human-friendly string representation.
    pub fn unrender(mut self) -> Self {
        self.rendered = None;
        self
    }

    /// Add a human-friendly string representation.
    ///
    /// When the input line is supplied, each location is rendered with the
    /// line and a caret marker underneath the offending span.
    pub fn render(mut self, code: Option<&str>) -> Self {
        if self.rendered.is_none() {
            self.rendered = Some(format!("{}", ErrorRenderer(&self, code)));
        }
        self
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Some(reason) => Display::fmt(reason, f)?,
            None => f.write_str("unknown error")?,
        }
        if let Some(offset) = self.offset() {
            f.write_fmt(format_args!(" at offset {}", offset))?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}


/// Number of characters between two byte offsets, or the byte count if they
/// don't fall on character boundaries.
fn chars_in(code: &str, start: usize, end: usize) -> usize {
    code.get(start..end).map(|s| s.chars().count()).unwrap_or(end - start)
}


struct ErrorRenderer<'a>(&'a Error, Option<&'a str>);

impl<'a> Display for ErrorRenderer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ErrorRenderer(err, code) = self;

        match err.reason.as_ref() {
            Some(reason) => f.write_fmt(format_args!("Error: {}", reason))?,
            None => f.write_str("Error: unknown reason")?,
        }

        if let Some(locs) = err.locations.as_ref() {
            for (loc, act) in locs.iter() {
                let mut column = loc.offset();

                if let Some(code) = code {
                    // Markers past the end of the line point at the end
                    let start = min(loc.offset(), code.len());
                    let end = min(loc.end(), code.len());
                    column = chars_in(code, 0, start);

                    f.write_char('\n')?;
                    f.write_str(code)?;
                    f.write_char('\n')?;
                    for _ in 0..column {
                        f.write_char(' ')?;
                    }
                    for _ in 0..chars_in(code, start, end).max(1) {
                        f.write_char('^')?;
                    }
                }
                f.write_fmt(format_args!("\nwhile {} at column {}", act, column + 1))?;
            }
        }

        Ok(())
    }
}
