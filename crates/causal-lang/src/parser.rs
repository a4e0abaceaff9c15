// crates/causal-lang/src/parser.rs
// ============================================================================
// Module: Causal Language Parser
// Description: Recursive-descent parser producing the causal AST.
// Purpose: Enforce grammar, nesting limits, and continuation placement.
// Dependencies: crate::ast, crate::lexer, crate::token, crate::error
// ============================================================================

//! ## Overview
//! Grammar (informal):
//!
//! ```text
//! program   := RULES '{' rule (';' rule)* [';'] '}'
//! rule      := [ 'if' '(' bools ')' ':' ] action ':=' action (',' action)*
//! action    := IDENT '(' [ arg (',' arg)* ] ')'
//! arg       := '\'' (IDENT | number) '\'' | STATE '(' args ')' | number
//!            | IDENT | CONTn | PYTHON(#..#)
//! bools     := ( '(' bools ')' | predicate ) [ ('&&' | '||') bools ]
//! predicate := operand [ ('=' | '!=' | '<' | '>' | '<=' | '>=') operand ]
//! operand   := ALL '(' IDENT ')' | TYPE '(' IDENT ')' | '[' args ']' | arg
//! ```
//!
//! Source input is untrusted: size and nesting are bounded by
//! [`ParseLimits`].

use crate::ast::Action;
use crate::ast::Arg;
use crate::ast::CompareOp;
use crate::ast::Condition;
use crate::ast::LogicalOp;
use crate::ast::Number;
use crate::ast::Operand;
use crate::ast::Predicate;
use crate::ast::Program;
use crate::ast::Rule;
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::token::SpannedToken;
use crate::token::Token;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum source size in bytes.
pub const MAX_INPUT_BYTES: usize = 1024 * 1024;
/// Default maximum nesting depth for groups, `STATE(...)`, and lists.
pub const MAX_NESTING: usize = 32;

/// Size and depth bounds applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum source size in bytes.
    pub max_input_bytes: usize,
    /// Maximum nesting depth.
    pub max_nesting: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: MAX_INPUT_BYTES,
            max_nesting: MAX_NESTING,
        }
    }
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Parses a program using the default [`ParseLimits`].
///
/// # Errors
/// Returns [`ParseError`] for lexical, syntactic, or structural failures.
pub fn parse_program(input: &str) -> Result<Program, ParseError> {
    parse_program_with_limits(input, ParseLimits::default())
}

/// Parses a program with explicit limits.
///
/// # Errors
/// Returns [`ParseError`] for oversize input, lexical or syntactic errors,
/// excessive nesting, misplaced continuations, or trailing input.
pub fn parse_program_with_limits(input: &str, limits: ParseLimits) -> Result<Program, ParseError> {
    if input.len() > limits.max_input_bytes {
        return Err(ParseError::InputTooLarge {
            max_bytes: limits.max_input_bytes,
            actual_bytes: input.len(),
        });
    }
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens, limits.max_nesting);
    let program = parser.parse_program()?;
    parser.expect_eof()?;
    Ok(program)
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser over a token stream.
struct Parser<'input> {
    /// Token stream with source positions; always ends in `Eof`.
    tokens: Vec<SpannedToken<'input>>,
    /// Current token index.
    index: usize,
    /// Current nesting depth.
    nesting: usize,
    /// Maximum nesting depth.
    max_nesting: usize,
}

impl<'input> Parser<'input> {
    /// Creates a parser over the token stream.
    const fn new(tokens: Vec<SpannedToken<'input>>, max_nesting: usize) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
            max_nesting,
        }
    }

    /// Parses `RULES { ... }`.
    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.expect(&Token::Rules, "`RULES`")?;
        self.expect(&Token::LBrace, "`{`")?;
        if matches!(self.current().token, Token::RBrace) {
            return Err(self.unexpected("at least one rule"));
        }

        let mut rules = Vec::new();
        loop {
            rules.push(self.parse_rule()?);
            if self.matches(&Token::Semicolon) {
                if matches!(self.current().token, Token::RBrace) {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(&Token::RBrace, "`;` or `}`")?;
        Ok(Program {
            rules,
        })
    }

    /// Parses one rule.
    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        let position = self.current().position;
        let condition = if self.matches(&Token::If) {
            self.expect(&Token::LParen, "`(` after `if`")?;
            let condition = self.parse_bools()?;
            self.expect(&Token::RParen, "`)` after condition")?;
            self.expect(&Token::Colon, "`:` after condition")?;
            Some(condition)
        } else {
            None
        };

        let intention = self.parse_action()?;
        self.expect(&Token::Define, "`:=`")?;
        let mut effects = vec![self.parse_action()?];
        while self.matches(&Token::Comma) {
            effects.push(self.parse_action()?);
        }

        Ok(Rule {
            condition,
            intention,
            effects,
            position,
        })
    }

    /// Parses `name(args)`.
    fn parse_action(&mut self) -> Result<Action, ParseError> {
        let SpannedToken {
            token,
            position,
        } = *self.current();
        let Token::Ident(name) = token else {
            return Err(self.unexpected("action name"));
        };
        self.advance();
        self.expect(&Token::LParen, "`(` after action name")?;
        let args = if self.matches(&Token::RParen) {
            Vec::new()
        } else {
            let (args, positions) = self.parse_args()?;
            self.expect(&Token::RParen, "`,` or `)` after arguments")?;
            check_continuations(&args, &positions)?;
            args
        };
        Ok(Action {
            name: name.to_string(),
            args,
            position,
        })
    }

    /// Parses a non-empty comma-separated argument list with positions.
    fn parse_args(&mut self) -> Result<(Vec<Arg>, Vec<usize>), ParseError> {
        let mut args = Vec::new();
        let mut positions = Vec::new();
        loop {
            positions.push(self.current().position);
            args.push(self.parse_arg()?);
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        Ok((args, positions))
    }

    /// Parses a single argument.
    fn parse_arg(&mut self) -> Result<Arg, ParseError> {
        let position = self.current().position;
        match self.current().token {
            Token::Quote => {
                self.advance();
                let text = match self.current().token {
                    Token::Ident(name) => {
                        self.advance();
                        name.replace('_', " ")
                    }
                    Token::Digits(_) | Token::Dot | Token::Minus => self.parse_number()?.to_string(),
                    _ => return Err(self.unexpected("literal text after `'`")),
                };
                self.expect(&Token::Quote, "closing `'`")?;
                Ok(Arg::Literal(text))
            }
            Token::State => {
                self.advance();
                self.expect(&Token::LParen, "`(` after STATE")?;
                self.with_nesting(position, |parser| {
                    let (args, positions) = parser.parse_args()?;
                    parser.expect(&Token::RParen, "`,` or `)` after STATE arguments")?;
                    check_continuations(&args, &positions)?;
                    Ok(Arg::State(args))
                })
            }
            _ => self.parse_value(),
        }
    }

    /// Parses a number, variable, continuation, or inline python.
    fn parse_value(&mut self) -> Result<Arg, ParseError> {
        let SpannedToken {
            token,
            position,
        } = *self.current();
        match token {
            Token::Digits(_) | Token::Dot | Token::Minus => Ok(Arg::Number(self.parse_number()?)),
            Token::Ident(name) => {
                self.advance();
                Ok(Arg::Variable(name.to_string()))
            }
            Token::Continuation(suffix) => {
                self.advance();
                let offset = if suffix.is_empty() {
                    1
                } else {
                    suffix.parse::<u32>().map_err(|_| ParseError::InvalidContinuation {
                        reason: "offset is out of range",
                        position,
                    })?
                };
                if offset == 0 {
                    return Err(ParseError::InvalidContinuation {
                        reason: "offset must be at least 1",
                        position,
                    });
                }
                Ok(Arg::Continuation {
                    offset,
                })
            }
            Token::Python(code) => {
                self.advance();
                Ok(Arg::Python(code.to_string()))
            }
            _ => Err(self.unexpected("argument")),
        }
    }

    /// Parses `[-] digits [. digits]` or `[-] . digits`.
    fn parse_number(&mut self) -> Result<Number, ParseError> {
        let negative = self.matches(&Token::Minus);
        let integer = match self.current().token {
            Token::Digits(digits) => {
                self.advance();
                digits.to_string()
            }
            Token::Dot => String::new(),
            _ => return Err(self.unexpected("number")),
        };
        let fraction = if self.matches(&Token::Dot) {
            let Token::Digits(digits) = self.current().token else {
                return Err(self.unexpected("digits after `.`"));
            };
            self.advance();
            Some(digits.to_string())
        } else {
            None
        };
        Ok(Number {
            negative,
            integer,
            fraction,
        })
    }

    /// Parses a `&&`/`||` chain, right-nested.
    fn parse_bools(&mut self) -> Result<Condition, ParseError> {
        let mut items = vec![self.parse_bool_item()?];
        let mut ops = Vec::new();
        loop {
            let op = match self.current().token {
                Token::And => LogicalOp::And,
                Token::Or => LogicalOp::Or,
                _ => break,
            };
            self.advance();
            ops.push(op);
            items.push(self.parse_bool_item()?);
        }

        let mut condition = items.pop().ok_or_else(|| self.unexpected("condition"))?;
        while let (Some(left), Some(op)) = (items.pop(), ops.pop()) {
            condition = Condition::Logical {
                left: Box::new(left),
                op,
                right: Box::new(condition),
            };
        }
        Ok(condition)
    }

    /// Parses a parenthesized group or a predicate.
    fn parse_bool_item(&mut self) -> Result<Condition, ParseError> {
        let position = self.current().position;
        if self.matches(&Token::LParen) {
            return self.with_nesting(position, |parser| {
                let inner = parser.parse_bools()?;
                parser.expect(&Token::RParen, "`)` after grouped condition")?;
                Ok(Condition::Group(Box::new(inner)))
            });
        }
        Ok(Condition::Compare(self.parse_predicate()?))
    }

    /// Parses `operand [op operand]`.
    fn parse_predicate(&mut self) -> Result<Predicate, ParseError> {
        let position = self.current().position;
        let left = self.parse_operand()?;
        let op = match self.current().token {
            Token::Eq => CompareOp::Eq,
            Token::NotEq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::Gt => CompareOp::Gt,
            Token::LtEq => CompareOp::LtEq,
            Token::GtEq => CompareOp::GtEq,
            _ => {
                return Ok(Predicate::Bare {
                    operand: left,
                    position,
                });
            }
        };
        self.advance();
        let right = self.parse_operand()?;
        Ok(Predicate::Compare {
            left,
            op,
            right,
            position,
        })
    }

    /// Parses an operand.
    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let position = self.current().position;
        match self.current().token {
            Token::All => {
                self.advance();
                Ok(Operand::All(self.parse_call_ident("type name in ALL(...)")?))
            }
            Token::Type => {
                self.advance();
                Ok(Operand::Type(self.parse_call_ident("variable in TYPE(...)")?))
            }
            Token::LBracket => {
                self.advance();
                self.with_nesting(position, |parser| {
                    if parser.matches(&Token::RBracket) {
                        return Ok(Operand::List(Vec::new()));
                    }
                    let (args, positions) = parser.parse_args()?;
                    parser.expect(&Token::RBracket, "`,` or `]` after list items")?;
                    check_continuations(&args, &positions)?;
                    Ok(Operand::List(args))
                })
            }
            _ => {
                let arg = self.parse_arg()?;
                if arg.continuation().is_some() {
                    return Err(ParseError::InvalidContinuation {
                        reason: "continuations in conditions must appear inside a list",
                        position,
                    });
                }
                Ok(Operand::Value(arg))
            }
        }
    }

    /// Parses `( IDENT )` after `ALL` or `TYPE`.
    fn parse_call_ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        self.expect(&Token::LParen, "`(`")?;
        let Token::Ident(name) = self.current().token else {
            return Err(self.unexpected(expected));
        };
        self.advance();
        self.expect(&Token::RParen, "`)`")?;
        Ok(name.to_string())
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let next_depth = self.nesting + 1;
        if next_depth > self.max_nesting {
            return Err(ParseError::NestingTooDeep {
                max_depth: self.max_nesting,
                actual_depth: next_depth,
                position,
            });
        }
        self.nesting = next_depth;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }

    /// Consumes the expected token or returns an error.
    fn expect(&mut self, token: &Token<'_>, expected: &'static str) -> Result<(), ParseError> {
        if self.matches(token) { Ok(()) } else { Err(self.unexpected(expected)) }
    }

    /// Ensures the parser is at end-of-input.
    fn expect_eof(&self) -> Result<(), ParseError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(ParseError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes the token if it matches the expected kind.
    fn matches(&mut self, kind: &Token<'_>) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Builds an unexpected-token error at the current token.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            expected,
            found: self.current().token.to_string(),
            position: self.current().position,
        }
    }

    /// Returns the current token.
    fn current(&self) -> &SpannedToken<'input> {
        debug_assert!(self.index < self.tokens.len(), "parser index out of bounds");
        &self.tokens[self.index]
    }

    /// Advances to the next token.
    const fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Ensures a continuation is last in its list and reaches back far enough.
fn check_continuations(args: &[Arg], positions: &[usize]) -> Result<(), ParseError> {
    for (index, (arg, position)) in args.iter().zip(positions).enumerate() {
        let Some(offset) = arg.continuation() else {
            continue;
        };
        if index + 1 != args.len() {
            return Err(ParseError::InvalidContinuation {
                reason: "continuation must be the last argument",
                position: *position,
            });
        }
        if !usize::try_from(offset).is_ok_and(|offset| offset <= index) {
            return Err(ParseError::InvalidContinuation {
                reason: "continuation reaches before the first argument",
                position: *position,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn logical_chain_nests_to_the_right() {
        let program = parse_program("RULES { if (a = 1 && b = 2 || c = 3): x() := y() }").unwrap();
        let Some(Condition::Logical {
            op,
            right,
            ..
        }) = &program.rules[0].condition
        else {
            panic!("expected logical condition");
        };
        assert_eq!(*op, LogicalOp::And);
        assert!(matches!(
            right.as_ref(),
            Condition::Logical {
                op: LogicalOp::Or,
                ..
            }
        ));
    }

    #[test]
    fn continuation_offset_cannot_exceed_position() {
        let err = parse_program("RULES { a(x, CONT2) := b(x) }").unwrap_err();
        assert!(matches!(err, ParseError::InvalidContinuation { .. }));
    }

    #[test]
    fn nesting_limit_counts_groups() {
        let limits = ParseLimits {
            max_input_bytes: MAX_INPUT_BYTES,
            max_nesting: 1,
        };
        assert!(parse_program_with_limits("RULES { if ((a = 1)): x() := y() }", limits).is_ok());
        let err = parse_program_with_limits("RULES { if (((a = 1))): x() := y() }", limits)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::NestingTooDeep {
                actual_depth: 2,
                ..
            }
        ));
    }
}
