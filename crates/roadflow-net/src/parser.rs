use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::records::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found:?} at line {}", .span.line)]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid number {text:?} at line {}", .span.line)]
    InvalidNumber { text: String, span: Span },
}

/// Record parser for the population, edge, abbreviation and endpoint files.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse `<name> <population>` pairs until the end of input.
    pub fn parse_populations(source: &str) -> Result<Vec<PopulationRecord>, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let mut records = Vec::new();
        while !parser.at_eof() {
            let name = parser.expect_name("vertex name")?;
            let population = parser.expect_number("population")?;
            records.push(PopulationRecord {
                span: name.span,
                name: name.text,
                population,
            });
        }
        Ok(records)
    }

    /// Parse `<vertex_a> <vertex_b> <distance>` triples until the end of input.
    pub fn parse_edges(source: &str) -> Result<Vec<EdgeRecord>, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let mut records = Vec::new();
        while !parser.at_eof() {
            let a = parser.expect_name("vertex name")?;
            let b = parser.expect_name("vertex name")?;
            let distance = parser.expect_number("distance")?;
            records.push(EdgeRecord {
                span: a.span,
                a: a.text,
                b: b.text,
                distance,
            });
        }
        Ok(records)
    }

    /// Parse `<full_name> <code>` pairs until the end of input.
    ///
    /// Codes are taken verbatim; their shape is checked when the registry is built.
    pub fn parse_abbreviations(source: &str) -> Result<Vec<AbbreviationRecord>, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        let mut records = Vec::new();
        while !parser.at_eof() {
            let name = parser.expect_name("vertex name")?;
            let code = parser.expect_any("abbreviation")?;
            records.push(AbbreviationRecord {
                span: name.span,
                name: name.text,
                code: code.text,
            });
        }
        Ok(records)
    }

    /// Parse the `<source> <destination>` pair. An empty file yields `None`.
    pub fn parse_endpoints(source: &str) -> Result<Option<EndpointRecord>, ParseError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        if parser.at_eof() {
            return Ok(None);
        }
        let src = parser.expect_name("source vertex")?;
        let dst = parser.expect_name("destination vertex")?;
        parser.expect(TokenKind::Eof)?;
        Ok(Some(EndpointRecord {
            span: src.span,
            source: src.text,
            destination: dst.text,
        }))
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn at_eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            Some(t) if t.kind == TokenKind::Eof => Err(ParseError::UnexpectedEof(format!("{:?}", kind))),
            Some(t) => Err(ParseError::UnexpectedToken {
                expected: format!("{:?}", kind),
                found: t.text,
                span: t.span,
            }),
            None => Err(ParseError::UnexpectedEof(format!("{:?}", kind))),
        }
    }

    /// Vertex names are words; a bare number in name position means the file is out of step.
    fn expect_name(&mut self, what: &str) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == TokenKind::Word => {
                self.advance();
                Ok(t)
            }
            Some(t) if t.kind == TokenKind::Number => Err(ParseError::UnexpectedToken {
                expected: what.to_string(),
                found: t.text,
                span: t.span,
            }),
            _ => Err(ParseError::UnexpectedEof(what.to_string())),
        }
    }

    fn expect_any(&mut self, what: &str) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind != TokenKind::Eof => {
                self.advance();
                Ok(t)
            }
            _ => Err(ParseError::UnexpectedEof(what.to_string())),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<u64, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == TokenKind::Number => {
                self.advance();
                t.text.parse::<u64>().map_err(|_| ParseError::InvalidNumber {
                    text: t.text.clone(),
                    span: t.span,
                })
            }
            Some(t) if t.kind == TokenKind::Word => Err(ParseError::UnexpectedToken {
                expected: what.to_string(),
                found: t.text,
                span: t.span,
            }),
            _ => Err(ParseError::UnexpectedEof(what.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_populations() {
        let records = Parser::parse_populations("Владивосток 600000 Находка 150000\nАртём 100000\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Владивосток");
        assert_eq!(records[0].population, 600000);
        assert_eq!(records[2].name, "Артём");
        assert_eq!(records[2].span.line, 2);
    }

    #[test]
    fn test_parse_edges() {
        let records = Parser::parse_edges("X Y 10\nY Z 5\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].a, "Y");
        assert_eq!(records[1].b, "Z");
        assert_eq!(records[1].distance, 5);
    }

    #[test]
    fn test_missing_distance() {
        let err = Parser::parse_edges("X Y 10\nY Z\n").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEof("distance".to_string()));
    }

    #[test]
    fn test_word_where_number_expected() {
        let err = Parser::parse_edges("X Y ten\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "ten"));
    }

    #[test]
    fn test_negative_population_rejected() {
        let err = Parser::parse_populations("X -5\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { ref text, .. } if text == "-5"));
    }

    #[test]
    fn test_parse_abbreviations() {
        let records = Parser::parse_abbreviations("Владивосток VLAD\nНаходка NAHO\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Находка");
        assert_eq!(records[1].code, "NAHO");
    }

    #[test]
    fn test_parse_endpoints() {
        let record = Parser::parse_endpoints("Владивосток Находка\n").unwrap().unwrap();
        assert_eq!(record.source, "Владивосток");
        assert_eq!(record.destination, "Находка");

        assert_eq!(Parser::parse_endpoints("\n").unwrap(), None);
        assert!(Parser::parse_endpoints("OnlyOne").is_err());
        assert!(Parser::parse_endpoints("A B C").is_err());
    }
}
