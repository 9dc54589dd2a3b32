use crate::error::DslError;

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    /// Byte offset of the first character.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Identifier, possibly dotted (`Part.show`).
    Ident(String),
    Number(f64),
    Str(String),
    LParen,
    RParen,
    Comma,
    Eq,
    Plus,
    Minus,
    Star,
    Slash,
    /// Statement separator: a newline outside parentheses or `;`.
    Separator,
    Eof,
}

#[derive(Debug)]
pub(crate) struct Lexer<'a> {
    source: &'a str,
    index: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            index: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, DslError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek_char() {
            if ch == '\n' && self.depth == 0 {
                let token = self.token_here(TokenKind::Separator);
                self.advance_char();
                tokens.push(token);
                continue;
            }

            if ch.is_whitespace() {
                self.advance_char();
                continue;
            }

            if ch == '#' {
                self.skip_line_comment();
                continue;
            }

            let single = match ch {
                '(' => Some(TokenKind::LParen),
                ')' => Some(TokenKind::RParen),
                ',' => Some(TokenKind::Comma),
                '=' => Some(TokenKind::Eq),
                '+' => Some(TokenKind::Plus),
                '-' => Some(TokenKind::Minus),
                '*' => Some(TokenKind::Star),
                '/' => Some(TokenKind::Slash),
                ';' => Some(TokenKind::Separator),
                _ => None,
            };

            if let Some(kind) = single {
                match kind {
                    TokenKind::LParen => self.depth += 1,
                    TokenKind::RParen => {
                        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
                            DslError::at("unmatched ')'", self.line, self.column)
                        })?;
                    }
                    _ => {}
                }
                tokens.push(self.token_here(kind));
                self.advance_char();
                continue;
            }

            match ch {
                '"' | '\'' => tokens.push(self.lex_string(ch)?),
                c if is_ident_start(c) => tokens.push(self.lex_identifier()?),
                c if c.is_ascii_digit()
                    || (c == '.'
                        && self
                            .peek_second_char()
                            .map(|next| next.is_ascii_digit())
                            .unwrap_or(false)) =>
                {
                    tokens.push(self.lex_number()?)
                }
                _ => {
                    return Err(DslError::at(
                        format!("unexpected character '{ch}'"),
                        self.line,
                        self.column,
                    ));
                }
            }
        }

        tokens.push(self.token_here(TokenKind::Eof));
        Ok(tokens)
    }

    fn token_here(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            line: self.line,
            column: self.column,
            offset: self.index,
        }
    }

    fn lex_identifier(&mut self) -> Result<Token, DslError> {
        let mut token = self.token_here(TokenKind::Eof);
        let start = self.index;

        self.advance_char();
        loop {
            match self.peek_char() {
                Some(ch) if is_ident_continue(ch) => {
                    self.advance_char();
                }
                Some('.') if self.peek_second_char().map(is_ident_start).unwrap_or(false) => {
                    self.advance_char();
                }
                _ => break,
            }
        }

        let ident = self
            .source
            .get(start..self.index)
            .ok_or_else(|| DslError::new("invalid identifier span"))?
            .to_string();
        token.kind = TokenKind::Ident(ident);
        Ok(token)
    }

    fn lex_number(&mut self) -> Result<Token, DslError> {
        let mut token = self.token_here(TokenKind::Eof);
        let (line, column, start) = (self.line, self.column, self.index);

        let mut seen_digit = self.skip_digits();
        if self.peek_char() == Some('.') {
            self.advance_char();
            seen_digit |= self.skip_digits();
        }

        if let Some(exp) = self.peek_char()
            && (exp == 'e' || exp == 'E')
        {
            self.advance_char();
            if let Some(sign) = self.peek_char()
                && (sign == '+' || sign == '-')
            {
                self.advance_char();
            }
            if !self.skip_digits() {
                return Err(DslError::at("invalid exponent in number", line, column));
            }
        }

        if !seen_digit {
            return Err(DslError::at("invalid number literal", line, column));
        }

        let text = self
            .source
            .get(start..self.index)
            .ok_or_else(|| DslError::new("invalid number span"))?;
        let value = text
            .parse::<f64>()
            .map_err(|err| DslError::at(format!("invalid number literal: {err}"), line, column))?;

        token.kind = TokenKind::Number(value);
        Ok(token)
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, DslError> {
        let mut token = self.token_here(TokenKind::Eof);
        let (line, column) = (self.line, self.column);
        self.advance_char();

        let mut text = String::new();
        loop {
            match self.advance_char() {
                Some(ch) if ch == quote => break,
                Some('\\') => match self.advance_char() {
                    Some(escaped) => text.push(escaped),
                    None => {
                        return Err(DslError::at("unterminated string literal", line, column));
                    }
                },
                Some('\n') | None => {
                    return Err(DslError::at("unterminated string literal", line, column));
                }
                Some(ch) => text.push(ch),
            }
        }

        token.kind = TokenKind::Str(text);
        Ok(token)
    }

    fn skip_digits(&mut self) -> bool {
        let mut any = false;
        while self
            .peek_char()
            .map(|ch| ch.is_ascii_digit())
            .unwrap_or(false)
        {
            any = true;
            self.advance_char();
        }
        any
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.advance_char();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn peek_second_char(&self) -> Option<char> {
        let mut chars = self.source[self.index..].chars();
        chars.next()?;
        chars.next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.index += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::{Lexer, TokenKind};

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("source should tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn dotted_identifiers_are_one_token() {
        assert_eq!(
            kinds("Part.show(shape)"),
            vec![
                TokenKind::Ident("Part.show".to_string()),
                TokenKind::LParen,
                TokenKind::Ident("shape".to_string()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newlines_inside_parentheses_do_not_separate() {
        let tokens = kinds("f(1,\n 2)\ng(3)");
        let separators = tokens
            .iter()
            .filter(|kind| **kind == TokenKind::Separator)
            .count();
        assert_eq!(separators, 1);
    }

    #[test]
    fn numbers_strings_and_comments() {
        assert_eq!(
            kinds("1.5e2 .5 'M8' # trailing"),
            vec![
                TokenKind::Number(150.0),
                TokenKind::Number(0.5),
                TokenKind::Str("M8".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn stray_characters_report_position() {
        let error = Lexer::new("shape = make_box(1, 2, 3)\nimport os; os.system$")
            .tokenize()
            .expect_err("'$' is not part of the grammar");
        assert_eq!(error.position(), Some((2, 21)));
        assert!(Lexer::new("f(1))").tokenize().is_err());
        assert!(Lexer::new("f('open").tokenize().is_err());
    }
}
