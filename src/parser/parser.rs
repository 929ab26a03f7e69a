use crate::{
    ast::{decls::CompilationUnit, NodeId},
    diag::{DiagCode, Diagnostics},
    lexer::tokens::{Token, TokenKind, TokenPayload},
    MK_TOKEN,
};

/// Marker for running out of tokens where one was required. Unwinds via
/// `?` to the top-level parse loop, which reports it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eof;

pub type PResult<T> = Result<T, Eof>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    pub unit: &'a mut CompilationUnit,
    pub diags: &'a mut Diagnostics,
    next_node_id: u32,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: Vec<Token>,
        unit: &'a mut CompilationUnit,
        diags: &'a mut Diagnostics,
    ) -> Parser<'a> {
        Parser {
            tokens,
            pos: 0,
            unit,
            diags,
            next_node_id: 0,
        }
    }

    /// The token under the cursor. Sticks to the trailing EOF token
    /// once the stream is exhausted.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn current_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// The most recently consumed token, for location joins.
    pub fn last_token(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1).min(self.tokens.len() - 1)]
    }

    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Cursor position, for loops that must verify they consumed
    /// something before iterating again.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn at_eof(&self) -> bool {
        self.current_kind() == TokenKind::EOF
    }

    /// Fails with [`Eof`] when a construct needs more tokens than the
    /// stream has.
    pub fn check_eof(&self) -> PResult<()> {
        if self.at_eof() {
            Err(Eof)
        } else {
            Ok(())
        }
    }

    pub fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Consumes the expected token, or diagnoses and synthesizes one at
    /// the current position without consuming anything.
    pub fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        self.check_eof()?;
        if self.current_kind() == kind {
            return Ok(self.advance());
        }
        let found = self.current_token().clone();
        self.diags
            .report(DiagCode::ExpectedToken, Some(found.loc.clone()))
            .arg(format!("{:?}", kind))
            .arg(&found.text);
        Ok(MK_TOKEN!(
            kind,
            String::new(),
            TokenPayload::None,
            found.loc.clone()
        ))
    }

    pub fn expect_identifier(&mut self) -> PResult<Token> {
        self.check_eof()?;
        if self.current_kind() == TokenKind::Identifier {
            return Ok(self.advance());
        }
        let found = self.current_token().clone();
        self.diags
            .report(DiagCode::ExpectedIdentifier, Some(found.loc.clone()))
            .arg(&found.text);
        Ok(MK_TOKEN!(
            TokenKind::Identifier,
            String::new(),
            TokenPayload::None,
            found.loc.clone()
        ))
    }

    /// Tokens at which a missing `;` may be assumed without complaint.
    fn closes_statement(kind: TokenKind) -> bool {
        use TokenKind::*;
        matches!(
            kind,
            CloseBrace | CloseParen | EOF | Else | While | Until | Case | Default
        )
    }

    /// Whether the cursor sits where a statement may end.
    pub fn at_statement_boundary(&self) -> bool {
        self.current_kind() == TokenKind::Semicolon || Self::closes_statement(self.current_kind())
    }

    /// Ends a statement: consumes `;` when present, accepts an implicit
    /// boundary, and otherwise diagnoses the missing delimiter and
    /// carries on as if it had been there.
    pub fn expect_delimiter(&mut self) -> PResult<()> {
        if self.current_kind() == TokenKind::Semicolon {
            self.advance();
            return Ok(());
        }
        if !Self::closes_statement(self.current_kind()) {
            let loc = self.current_token().loc.clone();
            self.diags.report(DiagCode::ExpectedDelimiter, Some(loc));
        }
        Ok(())
    }
}

/// Parses the token stream into `unit`'s global namespace. Never
/// panics on malformed input; syntax errors go to `diags` and parsing
/// resumes at the next plausible construct.
pub fn parse(tokens: Vec<Token>, unit: &mut CompilationUnit, diags: &mut Diagnostics) {
    let mut parser = Parser::new(tokens, unit, diags);
    let global = parser.unit.global_namespace;

    while !parser.at_eof() {
        if let Err(Eof) = super::decl::parse_top_level(&mut parser, global) {
            let loc = parser.current_token().loc.clone();
            parser.diags.report(DiagCode::UnexpectedEof, Some(loc));
            break;
        }
    }
}
