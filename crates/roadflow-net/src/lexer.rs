use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Any run of non-whitespace that is not a number
    Word,
    /// Optionally signed run of ASCII digits
    Number,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Splits the whitespace-delimited network files into tokens.
///
/// Records may be spread over lines arbitrarily, so newlines carry no meaning beyond being
/// tracked for error positions.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    line: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            line: 1,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
            }
        }
        c
    }

    fn skip_whitespace(&mut self) {
        // The BOM some editors prepend to UTF-8 files counts as whitespace here.
        while matches!(self.current, Some(c) if c.is_whitespace() || c == '\u{feff}') {
            self.advance();
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;
        let line = self.line;
        if self.current.is_none() {
            return Token::new(TokenKind::Eof, Span::new(start, start, line), "");
        }

        while matches!(self.current, Some(c) if !c.is_whitespace()) {
            self.advance();
        }

        let text = &self.source[start..self.pos];
        let kind = if is_number(text) {
            TokenKind::Number
        } else {
            TokenKind::Word
        };
        Token::new(kind, Span::new(start, self.pos, line), text)
    }
}

fn is_number(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_pairs() {
        let tokens = Lexer::tokenize("Владивосток 600000\nНаходка  150000\n");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word,
                TokenKind::Number,
                TokenKind::Word,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[0].text, "Владивосток");
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[3].text, "150000");
    }

    #[test]
    fn test_signed_and_mixed_tokens() {
        let tokens = Lexer::tokenize("-5 +7 12a a12 -");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_empty_source() {
        let tokens = Lexer::tokenize("  \n\t ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].span.line, 2);
    }
}
