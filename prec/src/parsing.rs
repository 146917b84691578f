use crate::ast::{deeper, Expr};
use crate::error::{Action, Error, Lex, Span, Syntax, Tagged};
use crate::lexing::{Lexer, Token, TokenType};
use crate::traits::Taggable;


/// Report an invalid token as a lexical error at its position.
fn unexpected(tok: &Token) -> Error {
    let c = tok.text.chars().next().unwrap_or('\0');
    Error::new(Lex::UnexpectedChar(c)).tag(tok.span(), Action::Parse)
}


/// Recursive descent parser with one token of lookahead.
///
/// Whitespace is skipped before every token is fetched, so the grammar never
/// sees it.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(code: &'a str) -> Parser<'a> {
        Parser { lexer: Lexer::new(code) }
    }

    fn peek(&mut self) -> Token<'a> {
        self.lexer.skip_whitespace();
        self.lexer.peek()
    }

    fn next(&mut self) -> Token<'a> {
        self.lexer.skip_whitespace();
        self.lexer.next_token()
    }

    /// Parse one expression and return it with the span of text it covers,
    /// parentheses included.
    pub fn expression(&mut self) -> Result<Tagged<Expr<'a>>, Error> {
        self.expression_at(0)
    }

    fn expression_at(&mut self, depth: u8) -> Result<Tagged<Expr<'a>>, Error> {
        let tok = self.next();

        match tok.kind {
            _ if tok.is_atomic() => Ok(Expr::atom(tok).tag(tok.span())),
            TokenType::OpenParen => self.list(tok, depth),
            TokenType::Invalid => Err(unexpected(&tok)),
            kind => Err(Error::new(Syntax::InvalidEntryPoint(kind)).tag(tok.span(), Action::Parse)),
        }
    }

    /// Parse the rest of a list whose opening parenthesis has been consumed.
    /// A list closed right away is nil.
    fn list(&mut self, open: Token<'a>, depth: u8) -> Result<Tagged<Expr<'a>>, Error> {
        let mut elements = Vec::new();

        loop {
            let tok = self.peek();

            match tok.kind {
                TokenType::CloseParen => {
                    self.next();
                    let span = Span::from(open.offset..tok.span().end());
                    return Ok(Expr::list(elements).tag(span));
                }

                TokenType::EndOfInput => {
                    let span = Span::from(open.offset..tok.offset);
                    return Err(Error::new(Syntax::UnterminatedList).tag(span, Action::Parse));
                }

                TokenType::Invalid => {
                    return Err(unexpected(&tok));
                }

                _ => {
                    let inner = deeper(depth).map_err(|err| err.tag(open.span(), Action::Parse))?;
                    elements.push(self.expression_at(inner)?.unwrap());
                }
            }
        }
    }

    /// Check that nothing but whitespace remains.
    pub fn finish(&mut self) -> Result<(), Error> {
        let tok = self.peek();

        match tok.kind {
            TokenType::EndOfInput => Ok(()),
            TokenType::Invalid => Err(unexpected(&tok)),
            _ => Err(Error::new(Syntax::TrailingInput).tag(tok.span(), Action::Parse)),
        }
    }
}


/// Parse a complete line into a tree, together with the span of the
/// expression within the line.
pub fn parse_tagged(code: &str) -> Result<Tagged<Expr<'_>>, Error> {
    let mut parser = Parser::new(code);
    let expr = parser.expression()?;
    parser.finish()?;
    Ok(expr)
}


/// Parse a complete line into a tree.
pub fn parse(code: &str) -> Result<Expr<'_>, Error> {
    parse_tagged(code).map(Tagged::unwrap)
}
