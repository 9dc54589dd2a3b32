use crate::ast::{Argument, BinaryOp, Call, Expr, NormalizedProgram, UnaryOp};
use crate::error::DslError;
use crate::lexer::{Lexer, Token, TokenKind};

/// Parses a normalized program: `variable = name(args)` followed by
/// `display(variable)`, and nothing else.
pub fn parse_program(source: &str) -> Result<NormalizedProgram, DslError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(source, tokens);
    parser.parse_program()
}

/// Parses a single `name(args)` call.
pub fn parse_call(source: &str) -> Result<Call, DslError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(source, tokens);
    parser.skip_separators();
    let call = parser.parse_call()?;
    parser.skip_separators();
    parser.expect_end()?;
    Ok(call)
}

#[derive(Debug)]
struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            index: 0,
        }
    }

    fn parse_program(&mut self) -> Result<NormalizedProgram, DslError> {
        self.skip_separators();
        if self.check_kind(&TokenKind::Eof) {
            let token = self.peek();
            return Err(DslError::at("empty program", token.line, token.column));
        }

        let variable = self.consume_plain_ident("expected assignment target")?;
        self.expect_kind(TokenKind::Eq, "expected '=' after assignment target")?;
        let call = self.parse_call()?;
        self.expect_statement_end()?;

        self.skip_separators();
        let display = self.consume_ident("expected display call as second statement")?;
        self.expect_kind(TokenKind::LParen, "expected '(' after display hook")?;
        let target = self.peek().clone();
        let shown = self.consume_plain_ident("display hook takes the assigned variable")?;
        if shown != variable {
            return Err(DslError::at(
                format!("name '{shown}' is not defined; expected '{variable}'"),
                target.line,
                target.column,
            ));
        }
        self.expect_kind(TokenKind::RParen, "display hook takes exactly one argument")?;
        self.expect_statement_end()?;

        self.skip_separators();
        self.expect_end()?;
        Ok(NormalizedProgram {
            variable,
            call,
            display,
        })
    }

    fn parse_call(&mut self) -> Result<Call, DslError> {
        let name = self.consume_ident("expected function name")?;
        let open = self.peek().clone();
        self.expect_kind(TokenKind::LParen, "expected '(' after function name")?;

        let mut args = Vec::new();
        let mut seen_keyword = false;
        while !self.check_kind(&TokenKind::RParen) {
            let token = self.peek().clone();
            let argument = if self.next_is_keyword() {
                let name = self.consume_plain_ident("expected parameter name")?;
                self.expect_kind(TokenKind::Eq, "expected '=' after parameter name")?;
                seen_keyword = true;
                Argument {
                    name: Some(name),
                    value: self.parse_expression()?,
                }
            } else if seen_keyword {
                return Err(DslError::at(
                    "positional argument follows keyword argument",
                    token.line,
                    token.column,
                ));
            } else {
                Argument {
                    name: None,
                    value: self.parse_expression()?,
                }
            };
            args.push(argument);
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        let close = self.peek().clone();
        self.expect_kind(TokenKind::RParen, "expected ')' after call arguments")?;
        let args_text = self
            .source
            .get(open.offset + 1..close.offset)
            .ok_or_else(|| DslError::new("invalid argument span"))?
            .to_string();

        Ok(Call {
            name,
            args,
            args_text,
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, DslError> {
        self.parse_add_sub()
    }

    fn parse_add_sub(&mut self) -> Result<Expr, DslError> {
        let mut expr = self.parse_mul_div()?;

        loop {
            let op = if self.match_kind(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.match_kind(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(expr);
            };
            let rhs = self.parse_mul_div()?;
            expr = Expr::Binary {
                lhs: Box::new(expr),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_mul_div(&mut self) -> Result<Expr, DslError> {
        let mut expr = self.parse_unary()?;

        loop {
            let op = if self.match_kind(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.match_kind(&TokenKind::Slash) {
                BinaryOp::Div
            } else {
                return Ok(expr);
            };
            let rhs = self.parse_unary()?;
            expr = Expr::Binary {
                lhs: Box::new(expr),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, DslError> {
        if self.match_kind(&TokenKind::Minus) {
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            });
        }
        if self.match_kind(&TokenKind::Plus) {
            return self.parse_unary();
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, DslError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Number(*value))
            }
            TokenKind::Str(text) => {
                self.advance();
                Ok(Expr::Str(text.clone()))
            }
            TokenKind::Ident(name) if name == "None" => {
                self.advance();
                Ok(Expr::None)
            }
            TokenKind::Ident(name) => {
                let message = if self.peek_n_is(1, &TokenKind::LParen) {
                    format!("call to '{name}' is not allowed inside arguments")
                } else {
                    format!("name '{name}' is not defined")
                };
                Err(DslError::at(message, token.line, token.column))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_kind(TokenKind::RParen, "expected ')' to close group")?;
                Ok(expr)
            }
            _ => Err(DslError::at(
                "expected expression",
                token.line,
                token.column,
            )),
        }
    }

    fn next_is_keyword(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(_)) && self.peek_n_is(1, &TokenKind::Eq)
    }

    fn consume_ident(&mut self, message: &str) -> Result<String, DslError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(DslError::at(message, token.line, token.column)),
        }
    }

    fn consume_plain_ident(&mut self, message: &str) -> Result<String, DslError> {
        let token = self.peek().clone();
        let name = self.consume_ident(message)?;
        if name.contains('.') {
            return Err(DslError::at(
                format!("'{name}' is not a plain name"),
                token.line,
                token.column,
            ));
        }
        Ok(name)
    }

    fn expect_kind(&mut self, expected: TokenKind, message: &str) -> Result<(), DslError> {
        if self.match_kind(&expected) {
            Ok(())
        } else {
            let token = self.peek();
            Err(DslError::at(message, token.line, token.column))
        }
    }

    fn expect_statement_end(&mut self) -> Result<(), DslError> {
        if self.check_kind(&TokenKind::Separator) || self.check_kind(&TokenKind::Eof) {
            Ok(())
        } else {
            let token = self.peek();
            Err(DslError::at(
                "expected end of statement",
                token.line,
                token.column,
            ))
        }
    }

    fn expect_end(&self) -> Result<(), DslError> {
        if self.check_kind(&TokenKind::Eof) {
            Ok(())
        } else {
            let token = self.peek();
            Err(DslError::at(
                "program must contain exactly two statements",
                token.line,
                token.column,
            ))
        }
    }

    fn skip_separators(&mut self) {
        while self.match_kind(&TokenKind::Separator) {}
    }

    fn match_kind(&mut self, expected: &TokenKind) -> bool {
        if self.check_kind(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check_kind(&self, expected: &TokenKind) -> bool {
        same_variant(self.peek_kind(), expected)
    }

    fn peek_n_is(&self, n: usize, expected: &TokenKind) -> bool {
        self.tokens
            .get(self.index + n)
            .map(|token| same_variant(&token.kind, expected))
            .unwrap_or(false)
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }
}

fn same_variant(a: &TokenKind, b: &TokenKind) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

#[cfg(test)]
mod tests {
    use super::{parse_call, parse_program};
    use crate::ast::{BinaryOp, Expr};

    #[test]
    fn parses_the_two_statement_program() {
        let source = "shape = make_flange(80,40,8,60,8,6)\nPart.show(shape)";
        let program = parse_program(source).expect("program should parse");
        assert_eq!(program.variable, "shape");
        assert_eq!(program.display, "Part.show");
        assert_eq!(program.call.name, "make_flange");
        assert_eq!(program.call.args.len(), 6);
        assert_eq!(program.call.args_text, "80,40,8,60,8,6");
        assert_eq!(program.to_source(), source);
    }

    #[test]
    fn keyword_arguments_and_constant_arithmetic() {
        let call = parse_call("make_cyl_with_hole(10, 2 * 10, hole_radius=4, hole_depth=-(-12))")
            .expect("call should parse");
        assert_eq!(call.positional().count(), 2);
        let keywords: Vec<&str> = call.keywords().map(|(name, _)| name).collect();
        assert_eq!(keywords, vec!["hole_radius", "hole_depth"]);
        assert!(matches!(
            &call.args[1].value,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn semicolons_and_blank_lines_separate_statements() {
        let program = parse_program("\n\nshape = make_box(1, 2, 3);  Part.show(shape)\n\n")
            .expect("program should parse");
        assert_eq!(program.call.name, "make_box");
    }

    #[test]
    fn rejects_anything_outside_the_grammar() {
        for source in [
            "",
            "make_box(1, 2, 3)",
            "shape = make_box(1, 2, 3)",
            "shape = make_box(1, 2, 3)\nPart.show(other)",
            "shape = make_box(1, 2, 3)\nPart.show(shape)\nPart.show(shape)",
            "shape = make_box(1, 2, 3) + 1\nPart.show(shape)",
            "shape = make_box(x, 2, 3)\nPart.show(shape)",
            "shape = make_box(open('f'), 2, 3)\nPart.show(shape)",
            "shape = make_box(H=1, 2, 3)\nPart.show(shape)",
            "a.b = make_box(1, 2, 3)\nPart.show(a.b)",
        ] {
            assert!(parse_program(source).is_err(), "accepted {source:?}");
        }
    }

    #[test]
    fn undefined_names_are_reported_with_position() {
        let error = parse_call("make_box(L, 2, 3)").expect_err("L is not bound");
        assert_eq!(error.to_string(), "name 'L' is not defined at line 1, column 10");
    }
}
