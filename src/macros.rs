//! Utility macros for the compiler.
//!
//! This module defines helper macros used by the lexer:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_PUNCT_HANDLER!` - Creates a lexer handler for fixed punctuation
//!
//! These macros reduce boilerplate in the lexer's pattern table.

/// Creates a Token instance.
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Semicolon, ";".to_string(), TokenPayload::None, loc);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $text:expr, $payload:expr, $loc:expr) => {
        Token {
            kind: $kind,
            text: $text,
            payload: $payload,
            loc: $loc,
        }
    };
}

/// Creates a lexer handler for a fixed punctuation/operator spelling.
///
/// Generates a handler function that pushes a token with the given kind
/// and advances the lexer by the spelling's length.
///
/// # Example
///
/// ```ignore
/// Pattern {
///     regex: Regex::new("^::").unwrap(),
///     handler: MK_PUNCT_HANDLER!(TokenKind::ColonColon, "::"),
/// }
/// ```
#[macro_export]
macro_rules! MK_PUNCT_HANDLER {
    ($kind:expr, $text:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let loc = lexer.loc($text.len() as u32);
            lexer.push(MK_TOKEN!(
                $kind,
                String::from($text),
                TokenPayload::None,
                loc
            ));
            lexer.advance_n($text.len());
        }
    };
}
