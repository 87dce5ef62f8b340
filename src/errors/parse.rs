// src/errors/parse.rs
//! Lexing and parsing errors for the Go subset frontend (E0xxx/E1xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(E0001))]
    UnexpectedChar {
        ch: char,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(code(E0002))]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("unterminated rune literal")]
    #[diagnostic(code(E0003))]
    UnterminatedRune {
        #[label("rune starts here")]
        span: SourceSpan,
    },

    #[error("unterminated block comment")]
    #[diagnostic(code(E0004))]
    UnterminatedComment {
        #[label("comment starts here")]
        span: SourceSpan,
    },

    #[error("expected {expected}, found '{found}'")]
    #[diagnostic(code(E1001))]
    Expected {
        expected: String,
        found: String,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("anonymous {kind} types are not supported")]
    #[diagnostic(code(E1002), help("name the type and refer to it by that name"))]
    UnsupportedShape {
        kind: &'static str,
        #[label("unsupported type")]
        span: SourceSpan,
    },

    #[error("invalid array length '{len}'")]
    #[diagnostic(code(E1003), help("only integer literal array lengths are supported"))]
    InvalidArrayLen {
        len: String,
        #[label("array length")]
        span: SourceSpan,
    },

    #[error("mixed named and unnamed parameters")]
    #[diagnostic(code(E1004))]
    MixedParams {
        #[label("in this parameter list")]
        span: SourceSpan,
    },

    #[error("variadic parameter is not the last parameter")]
    #[diagnostic(code(E1005))]
    VariadicNotLast {
        #[label("variadic here")]
        span: SourceSpan,
    },

    #[error("variadic type in result list")]
    #[diagnostic(code(E1006))]
    VariadicResult {
        #[label("here")]
        span: SourceSpan,
    },

    #[error("trailing input after type expression: '{found}'")]
    #[diagnostic(code(E1007))]
    TrailingInput {
        found: String,
        #[label("starts here")]
        span: SourceSpan,
    },
}
