use std::rc::Rc;

use regex::Regex;

use crate::{
    diag::{DiagCode, Diagnostics},
    SrcLoc, MK_PUNCT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, TokenPayload, RESERVED_LOOKUP};

pub type PatternHandler = fn(&mut Lexer, &Regex);

pub struct Pattern {
    regex: Regex,
    handler: PatternHandler,
}

/// Cursor state over one source buffer. Handlers push tokens and advance
/// the cursor; lexical errors go straight to the diagnostics engine and
/// a placeholder token keeps the stream usable.
pub struct Lexer<'d> {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
    diags: &'d mut Diagnostics,
}

impl<'d> Lexer<'d> {
    fn new(source: &str, file: Rc<String>, diags: &'d mut Diagnostics) -> Lexer<'d> {
        Lexer {
            tokens: vec![],
            source: source.to_string(),
            pos: 0,
            line: 1,
            column: 1,
            file,
            diags,
        }
    }

    /// Advances `n` bytes, keeping the line/column counters in step with
    /// the consumed text.
    pub fn advance_n(&mut self, n: usize) {
        for c in self.source[self.pos..self.pos + n].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Location of the next `length` characters, before consuming them.
    pub fn loc(&self, length: u32) -> SrcLoc {
        SrcLoc::new(Rc::clone(&self.file), self.line, self.column, length)
    }
}

fn char_count(text: &str) -> u32 {
    text.chars().count() as u32
}

fn word_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let loc = lexer.loc(char_count(&matched));

    let kind = RESERVED_LOOKUP
        .get(matched.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);
    lexer.push(MK_TOKEN!(kind, matched.clone(), TokenPayload::None, loc));
    lexer.advance_n(matched.len());
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let end = regex.find(lexer.remainder()).map(|m| m.end()).unwrap_or(1);
    lexer.advance_n(end);
}

fn block_comment_handler(lexer: &mut Lexer, _regex: &Regex) {
    let rest = lexer.remainder();
    let open_loc = lexer.loc(2);
    let mut depth = 1usize;
    let mut i = 2;
    while i < rest.len() {
        if rest[i..].starts_with("/*") {
            depth += 1;
            i += 2;
        } else if rest[i..].starts_with("*/") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                break;
            }
        } else {
            i += rest[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        }
    }
    if depth > 0 {
        lexer
            .diags
            .report(DiagCode::UnterminatedBlockComment, Some(open_loc));
    }
    lexer.advance_n(i);
}

/// Scans one escape sequence starting at the backslash. Returns the
/// decoded character (or the offending escape character on failure) and
/// the number of bytes consumed.
fn scan_escape(rest: &str) -> (Result<char, char>, usize) {
    let mut chars = rest.char_indices();
    chars.next(); // the backslash
    let (start, c) = match chars.next() {
        Some(pair) => pair,
        None => return (Err('\\'), 1),
    };
    let simple = |c: char| (Ok(c), start + 1);
    match c {
        '\\' => simple('\\'),
        '?' => simple('?'),
        '\'' => simple('\''),
        '"' => simple('"'),
        'a' => simple('\x07'),
        'b' => simple('\x08'),
        'f' => simple('\x0C'),
        'n' => simple('\n'),
        'r' => simple('\r'),
        't' => simple('\t'),
        'v' => simple('\x0B'),
        '0'..='7' => {
            // Octal escape, up to three digits.
            let mut value = c as u32 - '0' as u32;
            let mut end = start + 1;
            for _ in 0..2 {
                match chars.next() {
                    Some((i, d)) if ('0'..='7').contains(&d) => {
                        value = value * 8 + (d as u32 - '0' as u32);
                        end = i + 1;
                    }
                    _ => break,
                }
            }
            match char::from_u32(value) {
                Some(decoded) => (Ok(decoded), end),
                None => (Err(c), end),
            }
        }
        'x' => {
            let mut value = 0u32;
            let mut digits = 0;
            let mut end = start + 1;
            for _ in 0..2 {
                match chars.next() {
                    Some((i, d)) if d.is_ascii_hexdigit() => {
                        value = value * 16 + d.to_digit(16).unwrap_or(0);
                        digits += 1;
                        end = i + 1;
                    }
                    _ => break,
                }
            }
            if digits == 0 {
                return (Err('x'), end);
            }
            match char::from_u32(value) {
                Some(decoded) => (Ok(decoded), end),
                None => (Err('x'), end),
            }
        }
        'u' => {
            let mut value = 0u32;
            let mut digits = 0;
            let mut end = start + 1;
            for _ in 0..4 {
                match chars.next() {
                    Some((i, d)) if d.is_ascii_hexdigit() => {
                        value = value * 16 + d.to_digit(16).unwrap_or(0);
                        digits += 1;
                        end = i + 1;
                    }
                    _ => break,
                }
            }
            if digits < 4 {
                return (Err('u'), end);
            }
            match char::from_u32(value) {
                Some(decoded) => (Ok(decoded), end),
                None => (Err('u'), end),
            }
        }
        other => (Err(other), start + other.len_utf8()),
    }
}

fn string_handler(lexer: &mut Lexer, _regex: &Regex) {
    let rest = lexer.remainder().to_string();
    let mut value = String::new();
    let mut i = 1; // past the opening quote
    let mut terminated = false;
    let mut bad_escapes: Vec<char> = vec![];

    while i < rest.len() {
        let c = match rest[i..].chars().next() {
            Some(c) => c,
            None => break,
        };
        match c {
            '"' => {
                i += 1;
                terminated = true;
                break;
            }
            '\n' => break,
            '\\' => {
                let (decoded, consumed) = scan_escape(&rest[i..]);
                match decoded {
                    Ok(decoded) => value.push(decoded),
                    Err(offending) => {
                        bad_escapes.push(offending);
                        value.push(offending);
                    }
                }
                i += consumed;
            }
            _ => {
                value.push(c);
                i += c.len_utf8();
            }
        }
    }

    let loc = lexer.loc(char_count(&rest[..i]));
    for offending in bad_escapes {
        lexer
            .diags
            .report(DiagCode::InvalidEscapeSequence, Some(loc.clone()))
            .arg(offending);
    }
    if !terminated {
        lexer
            .diags
            .report(DiagCode::UnterminatedStringLiteral, Some(loc.clone()));
    }
    lexer.push(MK_TOKEN!(
        TokenKind::StringLit,
        rest[..i].to_string(),
        TokenPayload::Str(value),
        loc
    ));
    lexer.advance_n(i);
}

fn char_handler(lexer: &mut Lexer, _regex: &Regex) {
    let rest = lexer.remainder().to_string();
    let mut value = '\0';
    let mut i = 1;
    let mut error: Option<DiagCode> = None;

    match rest[i..].chars().next() {
        None | Some('\n') => error = Some(DiagCode::UnterminatedCharacterLiteral),
        Some('\'') => {
            i += 1;
            error = Some(DiagCode::EmptyCharacterLiteral);
        }
        Some('\\') => {
            let (decoded, consumed) = scan_escape(&rest[i..]);
            i += consumed;
            match decoded {
                Ok(decoded) => value = decoded,
                // Malformed escapes inside character literals are all
                // reported as one invalid-literal diagnostic.
                Err(_) => error = Some(DiagCode::InvalidCharacterLiteral),
            }
        }
        Some(c) => {
            value = c;
            i += c.len_utf8();
        }
    }

    if error.is_none() || error == Some(DiagCode::InvalidCharacterLiteral) {
        match rest[i..].chars().next() {
            Some('\'') => i += 1,
            None | Some('\n') => error = Some(DiagCode::UnterminatedCharacterLiteral),
            Some(_) => {
                error = error.or(Some(DiagCode::InvalidCharacterLiteral));
                // Consume up to the closing quote or end of line.
                while let Some(c) = rest[i..].chars().next() {
                    if c == '\n' {
                        break;
                    }
                    i += c.len_utf8();
                    if c == '\'' {
                        break;
                    }
                }
            }
        }
    }

    let loc = lexer.loc(char_count(&rest[..i]));
    if let Some(code) = error {
        lexer.diags.report(code, Some(loc.clone()));
        value = '\0';
    }
    lexer.push(MK_TOKEN!(
        TokenKind::CharLit,
        rest[..i].to_string(),
        TokenPayload::Char(value),
        loc
    ));
    lexer.advance_n(i);
}

/// Target order of the widen-until-it-fits fallback chain.
const WIDENING_ORDER: [TokenKind; 6] = [
    TokenKind::IntLit,
    TokenKind::UIntLit,
    TokenKind::LongLit,
    TokenKind::ULongLit,
    TokenKind::FloatLit,
    TokenKind::DoubleLit,
];

fn radix_name(radix: u32) -> &'static str {
    match radix {
        2 => "binary",
        8 => "octal",
        16 => "hexadecimal",
        _ => "decimal",
    }
}

fn try_parse_number(kind: TokenKind, body: &str, radix: u32) -> Option<TokenPayload> {
    match kind {
        TokenKind::IntLit => {
            let v = if radix == 10 {
                body.parse::<i32>().ok()?
            } else {
                i32::from_str_radix(body, radix).ok()?
            };
            Some(TokenPayload::Int(v))
        }
        TokenKind::UIntLit => {
            let v = if radix == 10 {
                body.parse::<u32>().ok()?
            } else {
                u32::from_str_radix(body, radix).ok()?
            };
            Some(TokenPayload::UInt(v))
        }
        TokenKind::LongLit => {
            let v = if radix == 10 {
                body.parse::<i64>().ok()?
            } else {
                i64::from_str_radix(body, radix).ok()?
            };
            Some(TokenPayload::Long(v))
        }
        TokenKind::ULongLit => {
            let v = if radix == 10 {
                body.parse::<u64>().ok()?
            } else {
                u64::from_str_radix(body, radix).ok()?
            };
            Some(TokenPayload::ULong(v))
        }
        TokenKind::FloatLit => {
            if radix != 10 {
                return None;
            }
            let v = body.parse::<f32>().ok()?;
            v.is_finite().then_some(TokenPayload::Float(v))
        }
        TokenKind::DoubleLit => {
            if radix != 10 {
                return None;
            }
            let v = body.parse::<f64>().ok()?;
            v.is_finite().then_some(TokenPayload::Double(v))
        }
        _ => None,
    }
}

fn number_handler(lexer: &mut Lexer, _regex: &Regex) {
    let rest = lexer.remainder().to_string();
    let bytes = rest.as_bytes();
    let mut i = 0;
    let mut radix = 10u32;

    if bytes[0] == b'0' && bytes.len() > 1 {
        match bytes[1] {
            b'x' | b'X' => {
                radix = 16;
                i = 2;
            }
            b'o' | b'O' => {
                radix = 8;
                i = 2;
            }
            b'b' | b'B' => {
                radix = 2;
                i = 2;
            }
            _ => {}
        }
    }
    let body_start = i;

    let mut bad_digit: Option<char> = None;
    if radix == 10 {
        let mut saw_dot = false;
        while i < bytes.len() {
            if bytes[i].is_ascii_digit() {
                i += 1;
            } else if bytes[i] == b'.'
                && !saw_dot
                && i + 1 < bytes.len()
                && bytes[i + 1].is_ascii_digit()
            {
                saw_dot = true;
                i += 1;
            } else {
                break;
            }
        }
    } else {
        // Consume the full hex-digit run so an invalid digit for the
        // radix is diagnosed instead of splitting the literal.
        while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
            if bad_digit.is_none() && (bytes[i] as char).to_digit(radix).is_none() {
                bad_digit = Some(bytes[i] as char);
            }
            i += 1;
        }
    }
    let body = &rest[body_start..i];

    // A trailing identifier run is the type suffix, when it is one.
    let suffix_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    let suffix = &rest[suffix_start..i];
    let text = rest[..i].to_string();
    let loc = lexer.loc(char_count(&text));

    let requested = match suffix {
        "" | "i" => TokenKind::IntLit,
        "u" => TokenKind::UIntLit,
        "l" => TokenKind::LongLit,
        "ul" => TokenKind::ULongLit,
        "f" => TokenKind::FloatLit,
        "d" => TokenKind::DoubleLit,
        other => {
            lexer
                .diags
                .report(DiagCode::InvalidNumberLiteralSuffix, Some(loc.clone()))
                .arg(other);
            TokenKind::IntLit
        }
    };

    if let Some(digit) = bad_digit {
        lexer
            .diags
            .report(DiagCode::InvalidDigitInLiteral, Some(loc.clone()))
            .arg(digit)
            .arg(radix_name(radix));
        lexer.push(MK_TOKEN!(TokenKind::IntLit, text, TokenPayload::Int(0), loc));
        lexer.advance_n(i);
        return;
    }

    // Widen-until-it-fits: starting from the requested type, walk the
    // fixed chain and take the first representation the literal fits.
    let start = WIDENING_ORDER
        .iter()
        .position(|k| *k == requested)
        .unwrap_or(0);
    for kind in &WIDENING_ORDER[start..] {
        if let Some(payload) = try_parse_number(*kind, body, radix) {
            lexer.push(MK_TOKEN!(*kind, text, payload, loc));
            lexer.advance_n(i);
            return;
        }
    }

    lexer
        .diags
        .report(DiagCode::ValueTooLargeForAnyNumberType, Some(loc.clone()))
        .arg(&text);
    lexer.push(MK_TOKEN!(TokenKind::IntLit, text, TokenPayload::Int(0), loc));
    lexer.advance_n(i);
}

fn build_patterns() -> Vec<Pattern> {
    macro_rules! pattern {
        ($re:literal, $handler:expr) => {
            Pattern {
                regex: Regex::new($re).unwrap(),
                handler: $handler,
            }
        };
    }

    vec![
        pattern!(r"^[ \t\r\n]+", skip_handler),
        pattern!(r"^//[^\n]*", skip_handler),
        pattern!(r"^/\*", block_comment_handler),
        pattern!(r"^[A-Za-z_][A-Za-z0-9_]*", word_handler),
        pattern!(r"^[0-9]", number_handler),
        pattern!(r"^\.[0-9]", number_handler),
        pattern!(r#"^""#, string_handler),
        pattern!(r"^'", char_handler),
        // Multi-character punctuation must come before its prefixes.
        pattern!(r"^::", MK_PUNCT_HANDLER!(TokenKind::ColonColon, "::")),
        pattern!(r"^<-", MK_PUNCT_HANDLER!(TokenKind::ArrowLeft, "<-")),
        pattern!(r"^<<", MK_PUNCT_HANDLER!(TokenKind::ShiftLeft, "<<")),
        pattern!(r"^>>", MK_PUNCT_HANDLER!(TokenKind::ShiftRight, ">>")),
        pattern!(r"^<=", MK_PUNCT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern!(r"^>=", MK_PUNCT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern!(r"^==", MK_PUNCT_HANDLER!(TokenKind::Equals, "==")),
        pattern!(r"^!=", MK_PUNCT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern!(r"^&&", MK_PUNCT_HANDLER!(TokenKind::AndAnd, "&&")),
        pattern!(r"^\|\|", MK_PUNCT_HANDLER!(TokenKind::OrOr, "||")),
        pattern!(r"^\+=", MK_PUNCT_HANDLER!(TokenKind::PlusAssign, "+=")),
        pattern!(r"^-=", MK_PUNCT_HANDLER!(TokenKind::DashAssign, "-=")),
        pattern!(r"^\*=", MK_PUNCT_HANDLER!(TokenKind::StarAssign, "*=")),
        pattern!(r"^/=", MK_PUNCT_HANDLER!(TokenKind::SlashAssign, "/=")),
        pattern!(r"^%=", MK_PUNCT_HANDLER!(TokenKind::PercentAssign, "%=")),
        pattern!(r"^\(", MK_PUNCT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern!(r"^\)", MK_PUNCT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern!(r"^\{", MK_PUNCT_HANDLER!(TokenKind::OpenBrace, "{")),
        pattern!(r"^\}", MK_PUNCT_HANDLER!(TokenKind::CloseBrace, "}")),
        pattern!(r"^,", MK_PUNCT_HANDLER!(TokenKind::Comma, ",")),
        pattern!(r"^;", MK_PUNCT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern!(r"^:", MK_PUNCT_HANDLER!(TokenKind::Colon, ":")),
        pattern!(r"^\.", MK_PUNCT_HANDLER!(TokenKind::Dot, ".")),
        pattern!(r"^\+", MK_PUNCT_HANDLER!(TokenKind::Plus, "+")),
        pattern!(r"^-", MK_PUNCT_HANDLER!(TokenKind::Dash, "-")),
        pattern!(r"^\*", MK_PUNCT_HANDLER!(TokenKind::Star, "*")),
        pattern!(r"^/", MK_PUNCT_HANDLER!(TokenKind::Slash, "/")),
        pattern!(r"^%", MK_PUNCT_HANDLER!(TokenKind::Percent, "%")),
        pattern!(r"^<", MK_PUNCT_HANDLER!(TokenKind::Less, "<")),
        pattern!(r"^>", MK_PUNCT_HANDLER!(TokenKind::Greater, ">")),
        pattern!(r"^=", MK_PUNCT_HANDLER!(TokenKind::Assign, "=")),
        pattern!(r"^!", MK_PUNCT_HANDLER!(TokenKind::Not, "!")),
        pattern!(r"^~", MK_PUNCT_HANDLER!(TokenKind::Tilde, "~")),
        pattern!(r"^&", MK_PUNCT_HANDLER!(TokenKind::Amp, "&")),
        pattern!(r"^\|", MK_PUNCT_HANDLER!(TokenKind::Pipe, "|")),
    ]
}

/// Tokenizes one source buffer. Lexical errors are reported into `diags`
/// and tokenization continues with placeholder tokens; the returned
/// stream always ends with a single EOF token.
pub fn tokenize(source: &str, file: Rc<String>, diags: &mut Diagnostics) -> Vec<Token> {
    let patterns = build_patterns();
    let mut lex = Lexer::new(source, file, diags);

    while !lex.at_eof() {
        let mut matched = false;

        for pattern in patterns.iter() {
            if pattern.regex.find(lex.remainder()).is_some() {
                (pattern.handler)(&mut lex, &pattern.regex);
                matched = true;
                break;
            }
        }

        if !matched {
            let c = lex.at();
            let loc = lex.loc(1);
            lex.diags
                .report(DiagCode::UnrecognisedCharacter, Some(loc))
                .arg(c);
            lex.advance_n(c.len_utf8());
        }
    }

    let loc = lex.loc(0);
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        TokenPayload::None,
        loc
    ));
    lex.tokens
}
