// src/frontend/mod.rs
//! Frontend for the Go subset the generator understands: lexing, type
//! expressions, and lenient whole-file scanning.

pub mod lexer;
pub mod source;
pub mod token;
pub mod types;

pub use lexer::Lexer;
pub use source::{scan_file, RawDeclKind, RawFile, RawImport, RawTypeDecl};
pub use token::{Span, Token, TokenType};
pub use types::{
    named_leaves, parse_type_expr, ChanDir, FuncType, InterfaceDecl, MethodSig, Param, TypeExpr,
};
