use std::fmt::Display;

use regex::Regex;

use crate::error::Span;


/// Enumerates all token types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Integer literal, optionally signed
    Const,

    /// One of the arithmetic operator symbols
    Op,

    /// Function name
    Ident,

    OpenParen,
    CloseParen,

    /// A run of whitespace
    Whitespace,

    /// A single character which starts no valid token
    Invalid,

    /// Zero-length marker at the end of the input
    EndOfInput,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Const => f.write_str("constant"),
            Self::Op => f.write_str("operator"),
            Self::Ident => f.write_str("identifier"),
            Self::OpenParen => f.write_str("'('"),
            Self::CloseParen => f.write_str("')'"),
            Self::Whitespace => f.write_str("whitespace"),
            Self::Invalid => f.write_str("invalid character"),
            Self::EndOfInput => f.write_str("end of input"),
        }
    }
}


/// A classified piece of the input line.
///
/// The text is borrowed from the input, so tokens (and the trees holding
/// them) can't outlive the line they were lexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub offset: usize,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn span(&self) -> Span {
        Span::new(self.offset, self.text.len())
    }

    /// True if this token may appear as an atom in an expression.
    pub fn is_atomic(&self) -> bool {
        matches!(self.kind, TokenType::Const | TokenType::Op | TokenType::Ident)
    }
}


lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"^\s+").unwrap();
    static ref IDENT: Regex = Regex::new(r"^[[:alpha:]][[:alnum:]\-']*").unwrap();
    static ref CONST: Regex = Regex::new(r"^[+\-]?[[:digit:]]+").unwrap();
}


/// A cursor over one line of input.
///
/// `peek` lexes from the current offset without committing; `next` lexes from
/// the same offset and then moves the cursor past the token. Every token
/// covers exactly the bytes it consumes, so committing is just moving the
/// offset to the end of the token's span.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    code: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Lexer<'a> {
        Lexer { code, offset: 0 }
    }

    /// The current offset of the cursor.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The input which hasn't been consumed yet.
    fn rest(&self) -> &'a str {
        &self.code[self.offset..]
    }

    fn satisfies_at(&self, i: usize, f: impl FnOnce(char) -> bool) -> bool {
        self.rest().chars().nth(i).is_some_and(f)
    }

    /// A character may only follow an identifier or an integer if it's a
    /// delimiter.
    fn is_delimiter(c: Option<char>) -> bool {
        match c {
            None => true,
            Some(c) => c.is_whitespace() || c == '(' || c == ')',
        }
    }

    fn token(&self, kind: TokenType, length: usize) -> Token<'a> {
        Token {
            kind,
            offset: self.offset,
            text: &self.rest()[..length],
        }
    }

    /// Emit an invalid token for the first character of the remaining input.
    fn invalid(&self) -> Token<'a> {
        let length = self.rest().chars().next().map(char::len_utf8).unwrap_or(0);
        self.token(TokenType::Invalid, length)
    }

    /// Match a run, then check that it's delimited. If not, the attempt is
    /// abandoned and the first character is reclassified as invalid.
    fn delimited_run(&self, regex: &Regex, kind: TokenType) -> Token<'a> {
        match regex.find(self.rest()) {
            Some(m) if Self::is_delimiter(self.rest()[m.end()..].chars().next()) => {
                self.token(kind, m.end())
            }
            _ => self.invalid(),
        }
    }

    fn whitespace(&self) -> Token<'a> {
        let length = WHITESPACE.find(self.rest()).map(|m| m.end()).unwrap_or(0);
        self.token(TokenType::Whitespace, length)
    }

    /// Lex one token from the current offset without moving the cursor.
    fn lex(&self) -> Token<'a> {
        let c = match self.rest().chars().next() {
            None => return self.token(TokenType::EndOfInput, 0),
            Some(c) => c,
        };

        match c {
            '(' => self.token(TokenType::OpenParen, 1),
            ')' => self.token(TokenType::CloseParen, 1),

            c if c.is_ascii_alphabetic() => self.delimited_run(&IDENT, TokenType::Ident),

            c if c.is_ascii_digit() => self.delimited_run(&CONST, TokenType::Const),
            '+' | '-' if self.satisfies_at(1, |x| x.is_ascii_digit()) => {
                self.delimited_run(&CONST, TokenType::Const)
            }

            c if c.is_whitespace() => self.whitespace(),

            '+' | '-' | '*' | '/' => self.token(TokenType::Op, 1),

            _ => self.invalid(),
        }
    }

    /// Return the next token without advancing the cursor.
    pub fn peek(&self) -> Token<'a> {
        self.lex()
    }

    /// Return the next token and advance the cursor past it.
    ///
    /// At the end of input this keeps returning a zero-length
    /// [`TokenType::EndOfInput`] token.
    pub fn next_token(&mut self) -> Token<'a> {
        let tok = self.lex();
        self.offset = tok.span().end();
        tok
    }

    /// Consume tokens while they are whitespace.
    pub fn skip_whitespace(&mut self) {
        while self.peek().kind == TokenType::Whitespace {
            self.next_token();
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields every token, whitespace included, and stops at the end of
    /// input.
    fn next(&mut self) -> Option<Token<'a>> {
        let tok = self.next_token();
        match tok.kind {
            TokenType::EndOfInput => None,
            _ => Some(tok),
        }
    }
}
