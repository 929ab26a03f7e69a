//! The fixed catalog of diagnostic kinds.
//!
//! Every diagnostic the front end can emit is listed here with a numeric id
//! and a message template. Templates reference their parameters as `%0`..`%9`;
//! a diagnostic is formatted once all referenced parameters were supplied.
//!
//! Id bands: 1xx lexical, 2xx syntax, 3xx semantic, 2xxx notes. The ids are
//! stable for display purposes only; nothing keys off them programmatically.

/// Severity of a diagnostic. Notes are always attached to a preceding error
/// or warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagCode {
    // Lexical (1xx)
    UnrecognisedCharacter,
    InvalidCharacterLiteral,
    EmptyCharacterLiteral,
    UnterminatedCharacterLiteral,
    UnterminatedStringLiteral,
    InvalidEscapeSequence,
    UnterminatedBlockComment,
    InvalidDigitInLiteral,
    InvalidNumberLiteralSuffix,
    ValueTooLargeForAnyNumberType,

    // Syntax (2xx)
    UnexpectedEof,
    ExpectedToken,
    ExpectedIdentifier,
    ExpectedDelimiter,
    ExpectedTypeName,
    ExpectedExpression,
    ExpectedTopLevelConstruct,
    ExpectedCaseLabel,
    ExpectedLoopKeywordAfterDo,
    ExpectedFunctionBody,
    ExpectedParameterName,
    MultipleVariablesWithSingleInitializer,
    VariableNeedsTypeOrInitializer,
    CannotInferTypeFromNullLiteral,

    // Semantic (3xx)
    UnresolvedSymbol,
    UnresolvedTypeName,
    UnresolvedNamespace,
    RedefinitionOfLocalVariable,
    RedefinitionOfLocalVarWithDifType,
    RedefinitionOfGlobalVariable,
    RedefinitionOfType,
    RedefinitionOfField,
    RedefinitionOfParameter,
    IncompatibleTypesInBinary,
    InvalidOperandToUnary,
    ExpressionNotAssignable,
    AssignmentToConstant,
    NoViableConversion,
    NoViableConversionInReturn,
    ReturnForVoidFunctionHasValue,
    ReturnForNonVoidFunctionNeedsValue,
    ControlReachesEndOfNonVoidFunction,
    BreakNotInBreakableStatement,
    ContinueNotInContinuableStatement,
    FunctionOverloadDoesNotExist,
    FunctionCallIsAmbiguous,
    NoObjectMemberInType,
    VariableUsedInOwnInitializer,
    ConditionNotConvertibleToBool,
    InvalidUseOfVoidType,

    // Notes (2xxx)
    PreviousVariableDeclarationWasHere,
    PreviousDefinitionIsHere,
    CandidateFunction,
    DeclaredHere,
}

impl DiagCode {
    pub fn severity(&self) -> Severity {
        use DiagCode::*;
        match self {
            PreviousVariableDeclarationWasHere | PreviousDefinitionIsHere | CandidateFunction
            | DeclaredHere => Severity::Note,
            _ => Severity::Error,
        }
    }

    /// Numeric id shown to the user, banded by category.
    pub fn id(&self) -> u32 {
        use DiagCode::*;
        match self {
            UnrecognisedCharacter => 101,
            InvalidCharacterLiteral => 102,
            EmptyCharacterLiteral => 103,
            UnterminatedCharacterLiteral => 104,
            UnterminatedStringLiteral => 105,
            InvalidEscapeSequence => 106,
            UnterminatedBlockComment => 107,
            InvalidDigitInLiteral => 108,
            InvalidNumberLiteralSuffix => 109,
            ValueTooLargeForAnyNumberType => 110,

            UnexpectedEof => 201,
            ExpectedToken => 202,
            ExpectedIdentifier => 203,
            ExpectedDelimiter => 204,
            ExpectedTypeName => 205,
            ExpectedExpression => 206,
            ExpectedTopLevelConstruct => 207,
            ExpectedCaseLabel => 208,
            ExpectedLoopKeywordAfterDo => 209,
            ExpectedFunctionBody => 210,
            ExpectedParameterName => 211,
            MultipleVariablesWithSingleInitializer => 212,
            VariableNeedsTypeOrInitializer => 213,
            CannotInferTypeFromNullLiteral => 214,

            UnresolvedSymbol => 301,
            UnresolvedTypeName => 302,
            UnresolvedNamespace => 303,
            RedefinitionOfLocalVariable => 304,
            RedefinitionOfLocalVarWithDifType => 305,
            RedefinitionOfGlobalVariable => 306,
            RedefinitionOfType => 307,
            RedefinitionOfField => 308,
            RedefinitionOfParameter => 309,
            IncompatibleTypesInBinary => 310,
            InvalidOperandToUnary => 311,
            ExpressionNotAssignable => 312,
            AssignmentToConstant => 313,
            NoViableConversion => 314,
            NoViableConversionInReturn => 315,
            ReturnForVoidFunctionHasValue => 316,
            ReturnForNonVoidFunctionNeedsValue => 317,
            ControlReachesEndOfNonVoidFunction => 318,
            BreakNotInBreakableStatement => 319,
            ContinueNotInContinuableStatement => 320,
            FunctionOverloadDoesNotExist => 321,
            FunctionCallIsAmbiguous => 322,
            NoObjectMemberInType => 323,
            VariableUsedInOwnInitializer => 324,
            ConditionNotConvertibleToBool => 325,
            InvalidUseOfVoidType => 326,

            PreviousVariableDeclarationWasHere => 2001,
            PreviousDefinitionIsHere => 2002,
            CandidateFunction => 2003,
            DeclaredHere => 2004,
        }
    }

    /// Message template. `%N` is replaced with the N-th supplied parameter.
    pub fn template(&self) -> &'static str {
        use DiagCode::*;
        match self {
            UnrecognisedCharacter => "unrecognised character '%0'",
            InvalidCharacterLiteral => "invalid character literal",
            EmptyCharacterLiteral => "empty character literal",
            UnterminatedCharacterLiteral => "unterminated character literal",
            UnterminatedStringLiteral => "unterminated string literal",
            InvalidEscapeSequence => "invalid escape sequence '\\%0'",
            UnterminatedBlockComment => "unterminated block comment",
            InvalidDigitInLiteral => "invalid digit '%0' in %1 literal",
            InvalidNumberLiteralSuffix => "invalid numeric literal suffix '%0'",
            ValueTooLargeForAnyNumberType => "value '%0' is too large for any number type",

            UnexpectedEof => "unexpected end of file",
            ExpectedToken => "expected '%0' but found '%1'",
            ExpectedIdentifier => "expected identifier, found '%0'",
            ExpectedDelimiter => "expected ';' after statement",
            ExpectedTypeName => "expected type name, found '%0'",
            ExpectedExpression => "expected expression, found '%0'",
            ExpectedTopLevelConstruct => "expected declaration, found '%0'",
            ExpectedCaseLabel => "expected 'case' or 'default' inside switch body",
            ExpectedLoopKeywordAfterDo => "expected 'while' or 'until' after 'do' statement body",
            ExpectedFunctionBody => "expected function body or ';'",
            ExpectedParameterName => "expected parameter name, found '%0'",
            MultipleVariablesWithSingleInitializer => {
                "cannot initialise multiple variables with a single initialiser"
            }
            VariableNeedsTypeOrInitializer => {
                "variable '%0' needs an explicit type or an initialiser"
            }
            CannotInferTypeFromNullLiteral => {
                "cannot infer a type for variable '%0' from the null literal"
            }

            UnresolvedSymbol => "use of undeclared identifier '%0'",
            UnresolvedTypeName => "unknown type name '%0'",
            UnresolvedNamespace => "unknown namespace '%0'",
            RedefinitionOfLocalVariable => "redefinition of variable '%0'",
            RedefinitionOfLocalVarWithDifType => {
                "redefinition of variable '%0' with a different type ('%1' was '%2')"
            }
            RedefinitionOfGlobalVariable => "redefinition of global variable '%0'",
            RedefinitionOfType => "redefinition of type '%0'",
            RedefinitionOfField => "duplicate member '%0' in class '%1'",
            RedefinitionOfParameter => "redefinition of parameter '%0'",
            IncompatibleTypesInBinary => {
                "invalid operands to binary expression ('%0' and '%1')"
            }
            InvalidOperandToUnary => "invalid operand to unary expression ('%0')",
            ExpressionNotAssignable => "expression is not assignable",
            AssignmentToConstant => "cannot assign to const-qualified expression of type '%0'",
            NoViableConversion => "no viable conversion from '%0' to '%1'",
            NoViableConversionInReturn => {
                "no viable conversion from returned value of type '%0' to function return type '%1'"
            }
            ReturnForVoidFunctionHasValue => "void function '%0' should not return a value",
            ReturnForNonVoidFunctionNeedsValue => "non-void function '%0' should return a value",
            ControlReachesEndOfNonVoidFunction => {
                "control reaches end of non-void function '%0'"
            }
            BreakNotInBreakableStatement => {
                "'break' statement not in a loop or switch statement"
            }
            ContinueNotInContinuableStatement => "'continue' statement not in a loop statement",
            FunctionOverloadDoesNotExist => "no matching function for call to '%0'",
            FunctionCallIsAmbiguous => "call to '%0' is ambiguous",
            NoObjectMemberInType => "no member named '%0' in type '%1'",
            VariableUsedInOwnInitializer => "variable '%0' used inside its own initialiser",
            ConditionNotConvertibleToBool => "value of type '%0' is not convertible to 'bool'",
            InvalidUseOfVoidType => "variable '%0' may not have 'void' type",

            PreviousVariableDeclarationWasHere => "previous declaration is here",
            PreviousDefinitionIsHere => "previous definition is here",
            CandidateFunction => "candidate function",
            DeclaredHere => "declared here",
        }
    }

    /// Number of parameters the template references, computed from the
    /// highest-numbered `%N` placeholder present.
    pub fn param_count(&self) -> usize {
        let template = self.template();
        let bytes = template.as_bytes();
        let mut highest: Option<usize> = None;
        let mut i = 0;
        while i + 1 < bytes.len() {
            if bytes[i] == b'%' && bytes[i + 1].is_ascii_digit() {
                let n = (bytes[i + 1] - b'0') as usize;
                highest = Some(highest.map_or(n, |h: usize| h.max(n)));
                i += 2;
            } else {
                i += 1;
            }
        }
        highest.map_or(0, |h| h + 1)
    }
}
