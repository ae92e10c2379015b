//! Parser for the constraint clause of a column definition.
//!
//! Accepted forms, joined with `AND`:
//! - `col <op> literal`
//! - `FN(col)`
//! - `FN(col) <op> literal`

use logos::Logos;

use super::column_constraint::RawConstraint;
use super::composed::RawColumnConstraints;
use super::function_comparison::RawFunctionConstraint;
use super::scalar::RawScalarConstraint;
use super::unary::RawUnaryFunctionConstraint;
use super::Operator;
use crate::error::DefinitionError;
use crate::schema::ColumnIdentifier;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[token("=")]
    Eq,
    #[token("!=")]
    #[token("<>")]
    Neq,
    #[token("<=")]
    Lte,
    #[token(">=")]
    Gte,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Kept with its quotes, resolved by `ColumnIdentifier::from_cql`.
    #[regex(r#""([^"]|"")*""#, |lex| lex.slice().to_string())]
    QuotedIdent(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"0[xX][0-9a-fA-F]*", |lex| lex.slice().to_string())]
    Hex(String),

    #[regex(r"'([^']|'')*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].replace("''", "'")
    })]
    Str(String),
}

impl Token {
    fn operator(&self) -> Option<Operator> {
        match self {
            Token::Eq => Some(Operator::Eq),
            Token::Neq => Some(Operator::Neq),
            Token::Lte => Some(Operator::Lte),
            Token::Gte => Some(Operator::Gte),
            Token::Lt => Some(Operator::Lt),
            Token::Gt => Some(Operator::Gt),
            _ => None,
        }
    }

    fn is_and(&self) -> bool {
        matches!(self, Token::Ident(word) if word.eq_ignore_ascii_case("AND"))
    }
}

/// Parse the constraint clause declared on `column`.
///
/// Scalar comparisons must name the declaring column. Function arguments are
/// kept as written and checked later by validation.
pub fn parse_constraints(
    column: &ColumnIdentifier,
    text: &str,
) -> Result<RawColumnConstraints, DefinitionError> {
    let tokens = tokenize(text)?;
    let mut parser = ClauseParser {
        tokens,
        pos: 0,
        column,
    };

    let mut constraints = vec![parser.parse_constraint()?];
    while let Some(token) = parser.peek() {
        if !token.is_and() {
            return Err(parser.unexpected());
        }
        parser.pos += 1;
        constraints.push(parser.parse_constraint()?);
    }

    Ok(RawColumnConstraints::new(column.clone(), constraints))
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, DefinitionError> {
    let mut lexer = Token::lexer(text);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span().start)),
            Err(()) => {
                return Err(DefinitionError::Syntax(format!(
                    "unexpected '{}' at offset {}",
                    lexer.slice(),
                    lexer.span().start
                )))
            }
        }
    }
    Ok(tokens)
}

struct ClauseParser<'a> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    column: &'a ColumnIdentifier,
}

impl ClauseParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Result<Token, DefinitionError> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|(token, _)| token.clone())
            .ok_or_else(|| DefinitionError::Syntax("unexpected end of constraint".into()))?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(&self) -> DefinitionError {
        match self.tokens.get(self.pos) {
            Some((token, offset)) => {
                DefinitionError::Syntax(format!("unexpected {token:?} at offset {offset}"))
            }
            None => DefinitionError::Syntax("unexpected end of constraint".into()),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), DefinitionError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn parse_constraint(&mut self) -> Result<RawConstraint, DefinitionError> {
        match self.advance()? {
            Token::Ident(name) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                let argument = self.parse_column()?;
                self.expect(Token::RParen)?;

                if self.peek().and_then(Token::operator).is_some() {
                    let operator = self.parse_operator()?;
                    let term = self.parse_term()?;
                    let raw = RawFunctionConstraint::new(&name, argument, operator, term)?;
                    return Ok(RawConstraint::Function(raw));
                }
                let raw = RawUnaryFunctionConstraint::new(&name, argument)?;
                Ok(RawConstraint::UnaryFunction(raw))
            }
            Token::Ident(name) => self.parse_scalar(ColumnIdentifier::from_cql(&name)),
            Token::QuotedIdent(quoted) => self.parse_scalar(ColumnIdentifier::from_cql(&quoted)),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }

    fn parse_scalar(&mut self, target: ColumnIdentifier) -> Result<RawConstraint, DefinitionError> {
        if target != *self.column {
            return Err(DefinitionError::Syntax(format!(
                "constraint on column '{}' can not reference column '{}'",
                self.column, target
            )));
        }
        let operator = self.parse_operator()?;
        let term = self.parse_term()?;
        Ok(RawConstraint::Scalar(RawScalarConstraint::new(
            target, operator, term,
        )))
    }

    fn parse_column(&mut self) -> Result<ColumnIdentifier, DefinitionError> {
        match self.advance()? {
            Token::Ident(name) => Ok(ColumnIdentifier::from_cql(&name)),
            Token::QuotedIdent(quoted) => Ok(ColumnIdentifier::from_cql(&quoted)),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }

    fn parse_operator(&mut self) -> Result<Operator, DefinitionError> {
        match self.peek().and_then(Token::operator) {
            Some(operator) => {
                self.pos += 1;
                Ok(operator)
            }
            None => Err(self.unexpected()),
        }
    }

    fn parse_term(&mut self) -> Result<String, DefinitionError> {
        match self.advance()? {
            Token::Number(text) | Token::Hex(text) | Token::Str(text) => Ok(text),
            Token::Ident(word) if !word.eq_ignore_ascii_case("AND") => Ok(word),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }
}
