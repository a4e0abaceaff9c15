// crates/causal-lang/src/lexer.rs
// ============================================================================
// Module: Causal Language Lexer
// Description: Byte-oriented tokenizer for causal-language source.
// Purpose: Produce positioned tokens for the recursive-descent parser.
// Dependencies: crate::token, crate::error
// ============================================================================

//! ## Overview
//! The lexer walks the input byte by byte. Identifiers start with an ASCII
//! letter and may contain letters, digits, `-` and `_`, so action names such
//! as `move-to` lex as one token. `PYTHON(#...#)` is captured whole; the code
//! ends at the first `#`, which must be followed by `)`.

use crate::error::ParseError;
use crate::token::SpannedToken;
use crate::token::Token;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Tokenizes the input, appending a trailing [`Token::Eof`].
///
/// # Errors
/// Returns [`ParseError::EmptyInput`] for blank input and lexical errors for
/// stray characters or unterminated inline python.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken<'_>>, ParseError> {
    Lexer::new(input).lex()
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Prefix of the continuation marker identifier.
const CONTINUATION_PREFIX: &str = "CONT";

/// Keyword that opens an inline python block.
const PYTHON_KEYWORD: &str = "PYTHON";

/// Lexer for the causal language.
struct Lexer<'a> {
    /// Source input being tokenized.
    input: &'a str,
    /// Current byte offset into the input.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Lexes the input into a sequence of tokens.
    fn lex(&mut self) -> Result<Vec<SpannedToken<'a>>, ParseError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while self.offset < bytes.len() {
            let ch = bytes[self.offset];
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                }
                b'(' => tokens.push(self.single(Token::LParen)),
                b')' => tokens.push(self.single(Token::RParen)),
                b',' => tokens.push(self.single(Token::Comma)),
                b'[' => tokens.push(self.single(Token::LBracket)),
                b']' => tokens.push(self.single(Token::RBracket)),
                b'{' => tokens.push(self.single(Token::LBrace)),
                b'}' => tokens.push(self.single(Token::RBrace)),
                b';' => tokens.push(self.single(Token::Semicolon)),
                b'=' => tokens.push(self.single(Token::Eq)),
                b'.' => tokens.push(self.single(Token::Dot)),
                b'\'' => tokens.push(self.single(Token::Quote)),
                b'-' => tokens.push(self.single(Token::Minus)),
                b'<' => tokens.push(self.one_or_two(bytes, b'=', Token::Lt, Token::LtEq)),
                b'>' => tokens.push(self.one_or_two(bytes, b'=', Token::Gt, Token::GtEq)),
                b':' => tokens.push(self.one_or_two(bytes, b'=', Token::Colon, Token::Define)),
                b'!' => tokens.push(self.pair(bytes, b'=', Token::NotEq, "!=")?),
                b'&' => tokens.push(self.pair(bytes, b'&', Token::And, "&&")?),
                b'|' => tokens.push(self.pair(bytes, b'|', Token::Or, "||")?),
                b'0' ..= b'9' => {
                    let start = self.offset;
                    self.consume_while(bytes, |b| b.is_ascii_digit());
                    tokens.push(SpannedToken {
                        token: Token::Digits(&self.input[start .. self.offset]),
                        position: start,
                    });
                }
                b'a' ..= b'z' | b'A' ..= b'Z' => {
                    let start = self.offset;
                    self.consume_while(bytes, |b| {
                        b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
                    });
                    let slice = &self.input[start .. self.offset];
                    let token = if slice == PYTHON_KEYWORD {
                        self.python_block(bytes, start)?
                    } else {
                        Self::keyword_or_ident(slice)
                    };
                    tokens.push(SpannedToken {
                        token,
                        position: start,
                    });
                }
                _ => {
                    let found = self.input[self.offset ..].chars().next().unwrap_or('\u{fffd}');
                    return Err(ParseError::UnexpectedCharacter {
                        found,
                        position: self.offset,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    /// Emits a one-byte token at the current offset and advances past it.
    const fn single(&mut self, token: Token<'a>) -> SpannedToken<'a> {
        let spanned = SpannedToken {
            token,
            position: self.offset,
        };
        self.offset += 1;
        spanned
    }

    /// Emits `long` when the next byte is `next`, otherwise `short`.
    fn one_or_two(
        &mut self,
        bytes: &[u8],
        next: u8,
        short: Token<'a>,
        long: Token<'a>,
    ) -> SpannedToken<'a> {
        let position = self.offset;
        if self.peek_char(bytes) == Some(next) {
            self.offset += 2;
            SpannedToken {
                token: long,
                position,
            }
        } else {
            self.offset += 1;
            SpannedToken {
                token: short,
                position,
            }
        }
    }

    /// Emits a two-byte operator whose first byte is meaningless alone.
    fn pair(
        &mut self,
        bytes: &[u8],
        next: u8,
        token: Token<'a>,
        expected: &'static str,
    ) -> Result<SpannedToken<'a>, ParseError> {
        if self.peek_char(bytes) == Some(next) {
            let position = self.offset;
            self.offset += 2;
            Ok(SpannedToken {
                token,
                position,
            })
        } else {
            Err(ParseError::UnexpectedToken {
                expected,
                found: char::from(bytes[self.offset]).to_string(),
                position: self.offset,
            })
        }
    }

    /// Captures the body of `PYTHON(#...#)`; the offset sits after `PYTHON`.
    fn python_block(&mut self, bytes: &[u8], start: usize) -> Result<Token<'a>, ParseError> {
        if bytes.get(self.offset) != Some(&b'(') || bytes.get(self.offset + 1) != Some(&b'#') {
            return Err(ParseError::UnexpectedToken {
                expected: "`(#` after PYTHON",
                found: self.input[self.offset ..].chars().take(2).collect(),
                position: self.offset,
            });
        }
        let body_start = self.offset + 2;
        let Some(hash) = self.input[body_start ..].find('#') else {
            return Err(ParseError::UnterminatedPython {
                position: start,
            });
        };
        let body_end = body_start + hash;
        if bytes.get(body_end + 1) != Some(&b')') {
            return Err(ParseError::UnterminatedPython {
                position: start,
            });
        }
        self.offset = body_end + 2;
        Ok(Token::Python(&self.input[body_start .. body_end]))
    }

    /// Returns the next byte without advancing.
    fn peek_char(&self, bytes: &[u8]) -> Option<u8> {
        bytes.get(self.offset + 1).copied()
    }

    /// Advances while the condition matches the current byte.
    fn consume_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    /// Maps a slice to a keyword token or identifier token.
    fn keyword_or_ident(slice: &'a str) -> Token<'a> {
        match slice {
            "RULES" => Token::Rules,
            "TYPE" => Token::Type,
            "ALL" => Token::All,
            "STATE" => Token::State,
            "if" => Token::If,
            _ => match slice.strip_prefix(CONTINUATION_PREFIX) {
                Some(suffix) if suffix.bytes().all(|b| b.is_ascii_digit()) => {
                    Token::Continuation(suffix)
                }
                _ => Token::Ident(slice),
            },
        }
    }
}
