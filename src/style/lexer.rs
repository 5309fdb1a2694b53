//! logos-based tokenizer for style value strings.
//!
//! Style declarations accept compact textual values ("#ff8800", "255 0 0",
//! "1 2 3 4", "dashed"). This lexer splits such strings into the three token
//! shapes the value parsers care about. Longest match wins in logos, so
//! `#ff00aa` lexes as one [`ValueToken::HexColor`] rather than punctuation
//! plus idents.

use logos::Logos;

/// Token produced when lexing a style value string.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum ValueToken {
    /// Hex color: `#fff`, `#ff00aa`, `#80ff00aa` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Integer, possibly negative.
    #[regex(r"-?[0-9]+")]
    Number,

    /// Identifier: named colors, enum keywords.
    #[regex(r"[a-zA-Z][a-zA-Z0-9_-]*")]
    Ident,
}

/// Lex `input` into `(token, slice)` pairs.
///
/// Returns `None` if any part of the input fails to lex — callers treat that
/// as a format error for the whole value.
pub fn lex(input: &str) -> Option<Vec<(ValueToken, &str)>> {
    let mut lexer = ValueToken::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.slice())),
            Err(_) => return None,
        }
    }
    Some(tokens)
}
