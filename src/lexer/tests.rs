use std::rc::Rc;

use crate::diag::{DiagCode, Diagnostics};

use super::lexer::tokenize;
use super::tokens::{Token, TokenKind, TokenPayload};

fn lex(source: &str) -> (Vec<Token>, Diagnostics) {
    let mut diags = Diagnostics::new();
    let tokens = tokenize(source, Rc::new(String::from("test")), &mut diags);
    (tokens, diags)
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_keywords() {
    let (tokens, diags) = lex("function returning let be if then else while until do for");
    assert!(!diags.has_errors());
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Function,
            TokenKind::Returning,
            TokenKind::Let,
            TokenKind::Be,
            TokenKind::If,
            TokenKind::Then,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Until,
            TokenKind::Do,
            TokenKind::For,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_type_keywords_and_articles() {
    let (tokens, _) = lex("a an int uint long ulong float double");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Article,
            TokenKind::Article,
            TokenKind::Int32,
            TokenKind::UInt32,
            TokenKind::Int64,
            TokenKind::UInt64,
            TokenKind::Float,
            TokenKind::Double,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_identifiers_are_case_sensitive() {
    let (tokens, _) = lex("Function _private name2");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_integer_literals() {
    let (tokens, diags) = lex("0 42 0xff 0o17 0b1010");
    assert!(!diags.has_errors());
    assert_eq!(tokens[0].payload, TokenPayload::Int(0));
    assert_eq!(tokens[1].payload, TokenPayload::Int(42));
    assert_eq!(tokens[2].payload, TokenPayload::Int(255));
    assert_eq!(tokens[3].payload, TokenPayload::Int(15));
    assert_eq!(tokens[4].payload, TokenPayload::Int(10));
}

#[test]
fn test_number_suffixes() {
    let (tokens, diags) = lex("1i 2u 3l 4ul 5f 6d");
    assert!(!diags.has_errors());
    assert_eq!(
        kinds(&tokens[..6]),
        vec![
            TokenKind::IntLit,
            TokenKind::UIntLit,
            TokenKind::LongLit,
            TokenKind::ULongLit,
            TokenKind::FloatLit,
            TokenKind::DoubleLit,
        ]
    );
    assert_eq!(tokens[3].payload, TokenPayload::ULong(4));
    assert_eq!(tokens[5].payload, TokenPayload::Double(6.0));
}

#[test]
fn test_number_widening() {
    // Too big for int32, fits in uint32.
    let (tokens, diags) = lex("3000000000");
    assert!(!diags.has_errors());
    assert_eq!(tokens[0].kind, TokenKind::UIntLit);
    assert_eq!(tokens[0].payload, TokenPayload::UInt(3_000_000_000));

    // Too big for every integer type, lands on float32.
    let (tokens, diags) = lex("99999999999999999999999999");
    assert!(!diags.has_errors());
    assert_eq!(tokens[0].kind, TokenKind::FloatLit);

    // Suffixed literals start the chain at the requested type.
    let (tokens, diags) = lex("3000000000l");
    assert!(!diags.has_errors());
    assert_eq!(tokens[0].kind, TokenKind::LongLit);
    assert_eq!(tokens[0].payload, TokenPayload::Long(3_000_000_000));
}

#[test]
fn test_hex_literal_too_large_for_any_type() {
    // Radixed literals never fall through to float, so overflowing
    // uint64 exhausts the chain.
    let (tokens, diags) = lex("0xfffffffffffffffff");
    assert!(diags.contains(DiagCode::ValueTooLargeForAnyNumberType));
    assert_eq!(tokens[0].payload, TokenPayload::Int(0));
}

#[test]
fn test_fractional_literals() {
    let (tokens, diags) = lex("3.25 .5 1.5d");
    assert!(!diags.has_errors());
    assert_eq!(tokens[0].kind, TokenKind::FloatLit);
    assert_eq!(tokens[0].payload, TokenPayload::Float(3.25));
    assert_eq!(tokens[1].payload, TokenPayload::Float(0.5));
    assert_eq!(tokens[2].payload, TokenPayload::Double(1.5));
}

#[test]
fn test_invalid_number_suffix() {
    let (tokens, diags) = lex("12xyz");
    assert!(diags.contains(DiagCode::InvalidNumberLiteralSuffix));
    // The whole run is one token so lexing continues cleanly after it.
    assert_eq!(tokens[0].kind, TokenKind::IntLit);
    assert_eq!(tokens[1].kind, TokenKind::EOF);
}

#[test]
fn test_invalid_digit_for_radix() {
    let (tokens, diags) = lex("0b102");
    assert!(diags.contains(DiagCode::InvalidDigitInLiteral));
    assert_eq!(tokens[0].payload, TokenPayload::Int(0));
}

#[test]
fn test_string_literal_with_escapes() {
    let (tokens, diags) = lex(r#""line\n\ttab \x41 B \101""#);
    assert!(!diags.has_errors());
    assert_eq!(
        tokens[0].payload,
        TokenPayload::Str(String::from("line\n\ttab A B A"))
    );
}

#[test]
fn test_unterminated_string() {
    let (tokens, diags) = lex("\"open\nlet");
    assert!(diags.contains(DiagCode::UnterminatedStringLiteral));
    // Lexing resumes on the next line.
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert_eq!(tokens[1].kind, TokenKind::Let);
}

#[test]
fn test_invalid_escape_sequence() {
    let (tokens, diags) = lex(r#""bad\q""#);
    assert!(diags.contains(DiagCode::InvalidEscapeSequence));
    // The offending character stands in for the escape.
    assert_eq!(tokens[0].payload, TokenPayload::Str(String::from("badq")));
}

#[test]
fn test_char_literals() {
    let (tokens, diags) = lex(r"'a' '\n' '\''");
    assert!(!diags.has_errors());
    assert_eq!(tokens[0].payload, TokenPayload::Char('a'));
    assert_eq!(tokens[1].payload, TokenPayload::Char('\n'));
    assert_eq!(tokens[2].payload, TokenPayload::Char('\''));
}

#[test]
fn test_empty_char_literal() {
    let (tokens, diags) = lex("''");
    assert!(diags.contains(DiagCode::EmptyCharacterLiteral));
    assert_eq!(tokens[0].payload, TokenPayload::Char('\0'));
}

#[test]
fn test_multi_character_char_literal() {
    let (tokens, diags) = lex("'ab' let");
    assert!(diags.contains(DiagCode::InvalidCharacterLiteral));
    // The whole quoted run is consumed as one bad literal.
    assert_eq!(tokens[0].kind, TokenKind::CharLit);
    assert_eq!(tokens[1].kind, TokenKind::Let);
}

#[test]
fn test_operators() {
    let (tokens, _) = lex("<- :: << >> <= >= == != && || += -= *= /= %=");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::ArrowLeft,
            TokenKind::ColonColon,
            TokenKind::ShiftLeft,
            TokenKind::ShiftRight,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::PlusAssign,
            TokenKind::DashAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::PercentAssign,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_comments() {
    let (tokens, diags) = lex("let // trailing\n/* block /* nested */ still comment */ be");
    assert!(!diags.has_errors());
    assert_eq!(kinds(&tokens), vec![TokenKind::Let, TokenKind::Be, TokenKind::EOF]);
}

#[test]
fn test_unterminated_block_comment() {
    let (_, diags) = lex("let /* never closed");
    assert!(diags.contains(DiagCode::UnterminatedBlockComment));
}

#[test]
fn test_unrecognised_character_continues() {
    let (tokens, diags) = lex("let @ be");
    assert!(diags.contains(DiagCode::UnrecognisedCharacter));
    assert_eq!(kinds(&tokens), vec![TokenKind::Let, TokenKind::Be, TokenKind::EOF]);
}

#[test]
fn test_locations() {
    let (tokens, _) = lex("let\n  name");
    assert_eq!(tokens[0].loc.line, 1);
    assert_eq!(tokens[0].loc.column, 1);
    assert_eq!(tokens[1].loc.line, 2);
    assert_eq!(tokens[1].loc.column, 3);
    assert_eq!(tokens[1].loc.length, 4);
}

#[test]
fn test_stream_ends_with_eof() {
    let (tokens, _) = lex("");
    assert_eq!(kinds(&tokens), vec![TokenKind::EOF]);
}
