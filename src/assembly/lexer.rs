// Copyright (c) 2017-2021 Fabian Schuiki

//! Tokenization of the textual IR format.

use num::BigInt;
use std::fmt;

/// A token of the textual IR format.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A global name, e.g. `@foo`.
    GlobalIdent(String),
    /// A local name, e.g. `%bar` or `%42`.
    LocalIdent(String),
    /// A bare word: keywords, opcodes, and type names.
    Word(String),
    /// A decimal integer literal, possibly negative.
    Int(BigInt),
    /// A decimal floating-point literal.
    Float(f64),
    /// A hexadecimal bit pattern, e.g. `0x3FF0000000000000`.
    HexBits(u64),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Comma,
    Equal,
    Colon,
    /// End of input.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::GlobalIdent(s) => write!(f, "@{}", s),
            Token::LocalIdent(s) => write!(f, "%{}", s),
            Token::Word(s) => write!(f, "{}", s),
            Token::Int(v) => write!(f, "{}", v),
            Token::Float(v) => write!(f, "{}", v),
            Token::HexBits(v) => write!(f, "0x{:016X}", v),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::Comma => write!(f, ","),
            Token::Equal => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    pub line: usize,
    pub col: usize,
}

/// An error produced while reading the textual IR format.
#[derive(Debug)]
pub struct ParseError {
    pub loc: Loc,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}: {}", self.loc.line, self.loc.col, self.message)
    }
}

impl std::error::Error for ParseError {}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Split the input into a vector of located tokens.
///
/// Comments run from `;` to the end of the line.
pub fn tokenize(input: &str) -> Result<Vec<(Token, Loc)>, ParseError> {
    let mut tokens = vec![];
    let mut chars = input.chars().peekable();
    let mut line = 1usize;
    let mut col = 1usize;

    macro_rules! bump {
        () => {{
            let c = chars.next();
            if c == Some('\n') {
                line += 1;
                col = 1;
            } else if c.is_some() {
                col += 1;
            }
            c
        }};
    }

    loop {
        let loc = Loc { line, col };
        let c = match chars.peek() {
            Some(&c) => c,
            None => break,
        };
        match c {
            c if c.is_whitespace() => {
                bump!();
            }
            ';' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    bump!();
                }
            }
            '(' => {
                bump!();
                tokens.push((Token::LParen, loc));
            }
            ')' => {
                bump!();
                tokens.push((Token::RParen, loc));
            }
            '{' => {
                bump!();
                tokens.push((Token::LBrace, loc));
            }
            '}' => {
                bump!();
                tokens.push((Token::RBrace, loc));
            }
            '[' => {
                bump!();
                tokens.push((Token::LBracket, loc));
            }
            ']' => {
                bump!();
                tokens.push((Token::RBracket, loc));
            }
            '<' => {
                bump!();
                tokens.push((Token::LAngle, loc));
            }
            '>' => {
                bump!();
                tokens.push((Token::RAngle, loc));
            }
            ',' => {
                bump!();
                tokens.push((Token::Comma, loc));
            }
            '=' => {
                bump!();
                tokens.push((Token::Equal, loc));
            }
            ':' => {
                bump!();
                tokens.push((Token::Colon, loc));
            }
            '%' | '@' => {
                let global = c == '@';
                bump!();
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if is_ident_char(c) {
                        name.push(c);
                        bump!();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(ParseError {
                        loc,
                        message: format!("expected a name after `{}`", c),
                    });
                }
                tokens.push((
                    if global {
                        Token::GlobalIdent(name)
                    } else {
                        Token::LocalIdent(name)
                    },
                    loc,
                ));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                if c == '-' {
                    text.push(c);
                    bump!();
                    match chars.peek() {
                        Some(d) if d.is_ascii_digit() => (),
                        _ => {
                            return Err(ParseError {
                                loc,
                                message: "expected a digit after `-`".to_string(),
                            })
                        }
                    }
                }
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        bump!();
                    } else {
                        break;
                    }
                }
                // Hexadecimal bit patterns for float constants.
                if text == "0" && chars.peek() == Some(&'x') {
                    bump!();
                    let mut hex = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_ascii_hexdigit() {
                            hex.push(c);
                            bump!();
                        } else {
                            break;
                        }
                    }
                    let bits = u64::from_str_radix(&hex, 16).map_err(|_| ParseError {
                        loc,
                        message: format!("invalid hex literal `0x{}`", hex),
                    })?;
                    tokens.push((Token::HexBits(bits), loc));
                    continue;
                }
                // Floating-point literals contain a decimal point.
                if chars.peek() == Some(&'.') {
                    text.push('.');
                    bump!();
                    while let Some(&c) = chars.peek() {
                        if c.is_ascii_digit() {
                            text.push(c);
                            bump!();
                        } else {
                            break;
                        }
                    }
                    let value = text.parse::<f64>().map_err(|_| ParseError {
                        loc,
                        message: format!("invalid float literal `{}`", text),
                    })?;
                    tokens.push((Token::Float(value), loc));
                    continue;
                }
                let value = text.parse::<BigInt>().map_err(|_| ParseError {
                    loc,
                    message: format!("invalid integer literal `{}`", text),
                })?;
                tokens.push((Token::Int(value), loc));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if is_ident_char(c) {
                        name.push(c);
                        bump!();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Word(name), loc));
            }
            c => {
                return Err(ParseError {
                    loc,
                    message: format!("unexpected character `{}`", c),
                });
            }
        }
    }
    tokens.push((Token::Eof, Loc { line, col }));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokens() {
        let tokens = tokenize("%a = add i32 %x, -1 ; comment\n").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::LocalIdent("a".to_string()),
                Token::Equal,
                Token::Word("add".to_string()),
                Token::Word("i32".to_string()),
                Token::LocalIdent("x".to_string()),
                Token::Comma,
                Token::Int(BigInt::from(-1)),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn float_and_hex_literals() {
        let tokens = tokenize("1.5 0x3FF0000000000000 42").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Float(1.5),
                Token::HexBits(0x3FF0000000000000),
                Token::Int(BigInt::from(42)),
                Token::Eof,
            ]
        );
    }
}
