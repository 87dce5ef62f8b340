// src/frontend/types.rs
//! Go type expressions: the closed sum of shapes the generator supports,
//! plus a recursive-descent parser over the token stream.
//!
//! Anonymous `struct` and `interface` types are rejected here on purpose;
//! admitting them would drag in a type-system surface the emitter cannot
//! round-trip.

use crate::errors::ParseError;
use crate::frontend::lexer::Lexer;
use crate::frontend::{Token, TokenType};

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Recv,
    Send,
}

/// A supported Go type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `name` or `pkg.name`
    Named { pkg: Option<String>, name: String },
    Pointer(Box<TypeExpr>),
    Array { len: u64, elem: Box<TypeExpr> },
    Slice(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(FuncType),
}

/// One parameter of a function type or method signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

/// A function signature: parameters, variadic marker, results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncType {
    pub params: Vec<Param>,
    pub variadic: bool,
    pub results: Vec<TypeExpr>,
}

/// A method declared directly on an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub sig: FuncType,
}

/// The body of a named interface declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceDecl {
    /// Directly embedded interface references, as written in source.
    pub embedded: Vec<TypeExpr>,
    /// Explicitly declared methods, in declaration order.
    pub methods: Vec<MethodSig>,
}

impl TypeExpr {
    pub fn named(name: &str) -> TypeExpr {
        TypeExpr::Named {
            pkg: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(pkg: &str, name: &str) -> TypeExpr {
        TypeExpr::Named {
            pkg: Some(pkg.to_string()),
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for TypeExpr {
    /// Renders the expression as written, with no import bookkeeping.
    /// Used for diagnostics; generated code goes through the type printer.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpr::Named { pkg: Some(p), name } => write!(f, "{p}.{name}"),
            TypeExpr::Named { pkg: None, name } => write!(f, "{name}"),
            TypeExpr::Pointer(elem) => write!(f, "*{elem}"),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExpr::Slice(elem) => write!(f, "[]{elem}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
            },
            TypeExpr::Func(sig) => {
                write!(f, "func(")?;
                for (idx, param) in sig.params.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    if sig.variadic && idx == sig.params.len() - 1 {
                        write!(f, "...")?;
                    }
                    write!(f, "{}", param.ty)?;
                }
                write!(f, ")")?;
                match sig.results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", sig.results[0]),
                    _ => {
                        write!(f, " (")?;
                        for (idx, res) in sig.results.iter().enumerate() {
                            if idx > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{res}")?;
                        }
                        write!(f, ")")
                    }
                }
            }
        }
    }
}

/// Collect every named leaf type mentioned by an expression, in source
/// order. Arrays, slices, pointers, channels, maps and function types are
/// recursed into; a named type is a leaf.
pub fn named_leaves(expr: &TypeExpr) -> Vec<(Option<&str>, &str)> {
    let mut out = Vec::new();
    collect_leaves(expr, &mut out);
    out
}

fn collect_leaves<'e>(expr: &'e TypeExpr, out: &mut Vec<(Option<&'e str>, &'e str)>) {
    match expr {
        TypeExpr::Named { pkg, name } => out.push((pkg.as_deref(), name)),
        TypeExpr::Pointer(elem)
        | TypeExpr::Array { elem, .. }
        | TypeExpr::Slice(elem)
        | TypeExpr::Chan { elem, .. } => collect_leaves(elem, out),
        TypeExpr::Map { key, value } => {
            collect_leaves(key, out);
            collect_leaves(value, out);
        }
        TypeExpr::Func(sig) => {
            for param in &sig.params {
                collect_leaves(&param.ty, out);
            }
            for res in &sig.results {
                collect_leaves(res, out);
            }
        }
    }
}

/// Parse a standalone type expression, e.g. an `--extrafields` type.
pub fn parse_type_expr(src: &str) -> Result<TypeExpr, ParseError> {
    let tokens = Lexer::tokenize(src)?;
    let mut parser = TypeParser::new(&tokens);
    let ty = parser.parse_type()?;
    while parser.eat(TokenType::Semi) {}
    if !parser.check(TokenType::Eof) {
        let tok = parser.peek();
        return Err(ParseError::TrailingInput {
            found: tok.lexeme.clone(),
            span: tok.span.into(),
        });
    }
    Ok(ty)
}

/// Recursive-descent parser for type expressions over a token slice.
///
/// Shared by the standalone type-expression entry point and the source
/// file scanner, which drives it from inside declarations.
pub(crate) struct TypeParser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

enum ParamElem {
    /// A lone identifier: a name or an unnamed type, decided later.
    Bare(String),
    /// `name Type` or `name ...Type`
    Named {
        name: String,
        ty: TypeExpr,
        variadic: bool,
    },
    /// A definite type, optionally `...`-prefixed.
    Ty { ty: TypeExpr, variadic: bool },
}

impl<'t> TypeParser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len() - 1);
    }

    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek2(&self) -> TokenType {
        self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].ty
    }

    pub fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub fn check(&self, ty: TokenType) -> bool {
        self.peek().ty == ty
    }

    pub fn eat(&mut self, ty: TokenType) -> bool {
        if self.check(ty) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, ty: TokenType) -> Result<&Token, ParseError> {
        if self.check(ty) {
            Ok(self.advance())
        } else {
            Err(self.err_expected(ty.as_str()))
        }
    }

    pub fn err_expected(&self, expected: &str) -> ParseError {
        let tok = self.peek();
        ParseError::Expected {
            expected: expected.to_string(),
            found: tok.lexeme.clone(),
            span: tok.span.into(),
        }
    }

    fn starts_type(ty: TokenType) -> bool {
        matches!(
            ty,
            TokenType::Ident
                | TokenType::Star
                | TokenType::LBracket
                | TokenType::KwMap
                | TokenType::KwChan
                | TokenType::KwFunc
                | TokenType::Arrow
                | TokenType::LParen
                | TokenType::KwInterface
                | TokenType::KwStruct
        )
    }

    pub fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        match self.peek().ty {
            TokenType::Star => {
                self.advance();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenType::Arrow => {
                self.advance();
                self.expect(TokenType::KwChan)?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenType::KwChan => {
                self.advance();
                let dir = if self.eat(TokenType::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenType::LBracket => {
                self.advance();
                if self.eat(TokenType::RBracket) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let (lexeme, span) = {
                    let tok = self.peek();
                    (tok.lexeme.clone(), tok.span)
                };
                if !self.eat(TokenType::Int) {
                    return Err(ParseError::InvalidArrayLen {
                        len: lexeme,
                        span: span.into(),
                    });
                }
                let len = parse_array_len(&lexeme).ok_or(ParseError::InvalidArrayLen {
                    len: lexeme.clone(),
                    span: span.into(),
                })?;
                self.expect(TokenType::RBracket)?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenType::KwMap => {
                self.advance();
                self.expect(TokenType::LBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenType::RBracket)?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            TokenType::KwFunc => {
                self.advance();
                Ok(TypeExpr::Func(self.parse_signature()?))
            }
            TokenType::LParen => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(TokenType::RParen)?;
                Ok(ty)
            }
            TokenType::KwInterface => Err(ParseError::UnsupportedShape {
                kind: "interface",
                span: self.peek().span.into(),
            }),
            TokenType::KwStruct => Err(ParseError::UnsupportedShape {
                kind: "struct",
                span: self.peek().span.into(),
            }),
            TokenType::Ident => {
                let name = self.advance().lexeme.clone();
                if self.eat(TokenType::Dot) {
                    let sel = self.expect(TokenType::Ident)?.lexeme.clone();
                    Ok(TypeExpr::Named {
                        pkg: Some(name),
                        name: sel,
                    })
                } else {
                    Ok(TypeExpr::Named { pkg: None, name })
                }
            }
            _ => Err(self.err_expected("type")),
        }
    }

    /// Parse `(params) results` after the `func` keyword or a method name.
    pub fn parse_signature(&mut self) -> Result<FuncType, ParseError> {
        let open_span = self.peek().span;
        self.expect(TokenType::LParen)?;
        let elems = self.parse_param_elems()?;
        let (params, variadic) = assemble_params(elems, open_span)?;
        let results = self.parse_results()?;
        Ok(FuncType {
            params,
            variadic,
            results,
        })
    }

    fn parse_param_elems(&mut self) -> Result<Vec<ParamElem>, ParseError> {
        let mut elems = Vec::new();
        loop {
            if self.eat(TokenType::RParen) {
                return Ok(elems);
            }
            let elem = if self.eat(TokenType::Ellipsis) {
                ParamElem::Ty {
                    ty: self.parse_type()?,
                    variadic: true,
                }
            } else if self.check(TokenType::Ident) {
                match self.peek2() {
                    TokenType::Comma | TokenType::RParen => {
                        ParamElem::Bare(self.advance().lexeme.clone())
                    }
                    TokenType::Dot => ParamElem::Ty {
                        ty: self.parse_type()?,
                        variadic: false,
                    },
                    TokenType::Ellipsis => {
                        let name = self.advance().lexeme.clone();
                        self.advance();
                        ParamElem::Named {
                            name,
                            ty: self.parse_type()?,
                            variadic: true,
                        }
                    }
                    other if Self::starts_type(other) => {
                        let name = self.advance().lexeme.clone();
                        ParamElem::Named {
                            name,
                            ty: self.parse_type()?,
                            variadic: false,
                        }
                    }
                    _ => return Err(self.err_expected("',', ')' or a type")),
                }
            } else {
                ParamElem::Ty {
                    ty: self.parse_type()?,
                    variadic: false,
                }
            };
            elems.push(elem);
            if !self.eat(TokenType::Comma) {
                self.expect(TokenType::RParen)?;
                return Ok(elems);
            }
        }
    }

    fn parse_results(&mut self) -> Result<Vec<TypeExpr>, ParseError> {
        if !Self::starts_type(self.peek().ty) {
            return Ok(Vec::new());
        }
        if !self.check(TokenType::LParen) {
            return Ok(vec![self.parse_type()?]);
        }
        let open_span = self.peek().span;
        self.advance();
        let elems = self.parse_param_elems()?;
        if elems.iter().any(|e| match e {
            ParamElem::Named { variadic, .. } | ParamElem::Ty { variadic, .. } => *variadic,
            ParamElem::Bare(_) => false,
        }) {
            return Err(ParseError::VariadicResult {
                span: open_span.into(),
            });
        }
        let (params, _) = assemble_params(elems, open_span)?;
        Ok(params.into_iter().map(|p| p.ty).collect())
    }

    /// Parse an interface body after the `interface` keyword.
    pub fn parse_interface_body(&mut self) -> Result<InterfaceDecl, ParseError> {
        self.expect(TokenType::LBrace)?;
        let mut decl = InterfaceDecl::default();
        loop {
            while self.eat(TokenType::Semi) {}
            if self.eat(TokenType::RBrace) {
                return Ok(decl);
            }
            if !self.check(TokenType::Ident) {
                return Err(self.err_expected("method or embedded interface name"));
            }
            if self.peek2() == TokenType::LParen {
                let name = self.advance().lexeme.clone();
                let sig = self.parse_signature()?;
                decl.methods.push(MethodSig { name, sig });
            } else {
                let ty = self.parse_type()?;
                decl.embedded.push(ty);
            }
            if !self.check(TokenType::RBrace) {
                self.expect(TokenType::Semi)?;
            }
        }
    }
}

/// Resolve the named/unnamed parameter-list ambiguity.
///
/// Lone identifiers are held pending: a later `name Type` group claims
/// them as names sharing that group's type; otherwise they are unnamed
/// types. Go requires a list to be all named or all unnamed, so a clash
/// between the two styles is an error.
fn assemble_params(
    elems: Vec<ParamElem>,
    open_span: crate::frontend::Span,
) -> Result<(Vec<Param>, bool), ParseError> {
    let mixed = || ParseError::MixedParams {
        span: open_span.into(),
    };
    let not_last = || ParseError::VariadicNotLast {
        span: open_span.into(),
    };

    let mut params = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut named_mode: Option<bool> = None;
    let mut variadic = false;
    let last = elems.len().wrapping_sub(1);
    for (idx, elem) in elems.into_iter().enumerate() {
        if variadic {
            return Err(not_last());
        }
        match elem {
            ParamElem::Bare(name) => pending.push(name),
            ParamElem::Named {
                name,
                ty,
                variadic: var,
            } => {
                if named_mode == Some(false) {
                    return Err(mixed());
                }
                named_mode = Some(true);
                if var && (!pending.is_empty() || idx != last) {
                    return Err(not_last());
                }
                for pname in pending.drain(..) {
                    params.push(Param {
                        name: Some(pname),
                        ty: ty.clone(),
                    });
                }
                params.push(Param {
                    name: Some(name),
                    ty,
                });
                variadic = var;
            }
            ParamElem::Ty { ty, variadic: var } => {
                if named_mode == Some(true) {
                    return Err(mixed());
                }
                named_mode = Some(false);
                if var && idx != last {
                    return Err(not_last());
                }
                for pname in pending.drain(..) {
                    params.push(Param {
                        name: None,
                        ty: TypeExpr::named(&pname),
                    });
                }
                params.push(Param { name: None, ty });
                variadic = var;
            }
        }
    }
    if !pending.is_empty() {
        if named_mode == Some(true) {
            return Err(mixed());
        }
        for pname in pending.drain(..) {
            params.push(Param {
                name: None,
                ty: TypeExpr::named(&pname),
            });
        }
    }
    Ok((params, variadic))
}

fn parse_array_len(lexeme: &str) -> Option<u64> {
    let clean: String = lexeme.chars().filter(|c| *c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else if clean.len() > 1 && clean.starts_with('0') {
        u64::from_str_radix(&clean[1..], 8).ok()
    } else {
        clean.parse().ok()
    }
}
