// src/frontend/source.rs
//! Lenient scanner for whole Go source files.
//!
//! Extracts exactly what the generator needs: the package clause, the
//! import declarations, and the top-level `type` declarations. Interface
//! declarations are parsed in full; every other declaration is skipped by
//! delimiter matching. A `type` declaration the subset parser cannot
//! handle (generics, type-set elements) degrades to an unsupported entry
//! that only errors if something later asks for that type.

use crate::errors::ParseError;
use crate::frontend::lexer::{unquote, Lexer};
use crate::frontend::types::{InterfaceDecl, TypeParser};
use crate::frontend::TokenType;

/// One import declaration as written in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImport {
    /// Explicit alias; `.` and `_` imports carry those literal aliases.
    pub alias: Option<String>,
    pub path: String,
}

/// What a top-level `type` declaration turned out to be.
#[derive(Debug, Clone)]
pub enum RawDeclKind {
    Interface(InterfaceDecl),
    /// A named non-interface type (struct, alias, basic wrapper, ...).
    Opaque,
    /// A declaration the subset parser cannot represent; the string says why.
    Unsupported(String),
}

#[derive(Debug, Clone)]
pub struct RawTypeDecl {
    pub name: String,
    pub kind: RawDeclKind,
}

/// The scanned shape of one Go source file.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub package_name: String,
    pub imports: Vec<RawImport>,
    pub types: Vec<RawTypeDecl>,
}

/// Scan a Go source file.
pub fn scan_file(source: &str) -> Result<RawFile, ParseError> {
    let tokens = Lexer::tokenize(source)?;
    let mut parser = TypeParser::new(&tokens);

    skip_semis(&mut parser);
    parser.expect(TokenType::KwPackage)?;
    let package_name = parser.expect(TokenType::Ident)?.lexeme.clone();
    if !parser.check(TokenType::Eof) {
        parser.expect(TokenType::Semi)?;
    }

    let mut file = RawFile {
        package_name,
        imports: Vec::new(),
        types: Vec::new(),
    };

    loop {
        skip_semis(&mut parser);
        if !parser.eat(TokenType::KwImport) {
            break;
        }
        scan_import_decl(&mut parser, &mut file.imports)?;
    }

    loop {
        skip_semis(&mut parser);
        match parser.peek().ty {
            TokenType::Eof => break,
            TokenType::KwType => {
                parser.advance();
                scan_type_decl(&mut parser, &mut file.types)?;
            }
            _ => {
                parser.advance();
                skip_to_decl_end(&mut parser);
            }
        }
    }

    Ok(file)
}

fn skip_semis(parser: &mut TypeParser<'_>) {
    while parser.eat(TokenType::Semi) {}
}

fn scan_import_decl(
    parser: &mut TypeParser<'_>,
    imports: &mut Vec<RawImport>,
) -> Result<(), ParseError> {
    if parser.eat(TokenType::LParen) {
        loop {
            skip_semis(parser);
            if parser.eat(TokenType::RParen) {
                return Ok(());
            }
            scan_import_spec(parser, imports)?;
        }
    }
    scan_import_spec(parser, imports)
}

fn scan_import_spec(
    parser: &mut TypeParser<'_>,
    imports: &mut Vec<RawImport>,
) -> Result<(), ParseError> {
    let alias = if parser.check(TokenType::Ident) {
        Some(parser.advance().lexeme.clone())
    } else if parser.check(TokenType::Dot) {
        parser.advance();
        Some(".".to_string())
    } else {
        None
    };
    let path = unquote(&parser.expect(TokenType::Str)?.lexeme.clone());
    imports.push(RawImport { alias, path });
    Ok(())
}

fn scan_type_decl(
    parser: &mut TypeParser<'_>,
    types: &mut Vec<RawTypeDecl>,
) -> Result<(), ParseError> {
    if parser.eat(TokenType::LParen) {
        loop {
            skip_semis(parser);
            if parser.eat(TokenType::RParen) {
                return Ok(());
            }
            scan_single_type(parser, types)?;
        }
    }
    scan_single_type(parser, types)
}

fn scan_single_type(
    parser: &mut TypeParser<'_>,
    types: &mut Vec<RawTypeDecl>,
) -> Result<(), ParseError> {
    let name = parser.expect(TokenType::Ident)?.lexeme.clone();

    if parser.check(TokenType::LBracket) {
        types.push(RawTypeDecl {
            name,
            kind: RawDeclKind::Unsupported("generic type declaration".to_string()),
        });
        skip_to_decl_end(parser);
        return Ok(());
    }

    if parser.eat(TokenType::Assign) {
        // Alias declaration; the aliased type is opaque to the generator.
        types.push(RawTypeDecl {
            name,
            kind: RawDeclKind::Opaque,
        });
        skip_to_decl_end(parser);
        return Ok(());
    }

    if parser.eat(TokenType::KwInterface) {
        let saved = parser.pos();
        let kind = match parser.parse_interface_body() {
            Ok(decl) => RawDeclKind::Interface(decl),
            Err(err) => {
                parser.set_pos(saved);
                skip_to_decl_end(parser);
                RawDeclKind::Unsupported(err.to_string())
            }
        };
        types.push(RawTypeDecl { name, kind });
        return Ok(());
    }

    types.push(RawTypeDecl {
        name,
        kind: RawDeclKind::Opaque,
    });
    skip_to_decl_end(parser);
    Ok(())
}

/// Skip tokens until the end of the current declaration: a semicolon at
/// delimiter depth zero, an unbalanced closer (the end of an enclosing
/// group), or end of input.
fn skip_to_decl_end(parser: &mut TypeParser<'_>) {
    let mut depth = 0i64;
    loop {
        match parser.peek().ty {
            TokenType::Eof => return,
            TokenType::LParen | TokenType::LBrace | TokenType::LBracket => depth += 1,
            TokenType::RParen | TokenType::RBrace | TokenType::RBracket => {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
            TokenType::Semi if depth == 0 => {
                parser.advance();
                return;
            }
            _ => {}
        }
        parser.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r#"// Package db wraps drivers.
package db

import (
	"context"
	d "database/sql/driver"
	_ "unsafe"
)

import "io"

const answer = 42

type Conn interface {
	Prepare(query string) (d.Stmt, error)
	Close() error
}

type (
	nopCloser struct{ inner io.Closer }

	Pinger interface {
		Ping(ctx context.Context) error
	}
)

func helper(x int) int {
	if x > 0 {
		return x
	}
	return -x
}

type Weird interface {
	~int | ~string
}
"#;

    #[test]
    fn scans_package_and_imports() {
        let file = scan_file(FILE).unwrap();
        assert_eq!(file.package_name, "db");
        assert_eq!(
            file.imports,
            vec![
                RawImport {
                    alias: None,
                    path: "context".to_string()
                },
                RawImport {
                    alias: Some("d".to_string()),
                    path: "database/sql/driver".to_string()
                },
                RawImport {
                    alias: Some("_".to_string()),
                    path: "unsafe".to_string()
                },
                RawImport {
                    alias: None,
                    path: "io".to_string()
                },
            ]
        );
    }

    #[test]
    fn scans_interfaces_fully() {
        let file = scan_file(FILE).unwrap();
        let conn = file.types.iter().find(|t| t.name == "Conn").unwrap();
        let RawDeclKind::Interface(decl) = &conn.kind else {
            panic!("Conn should be an interface");
        };
        assert_eq!(decl.methods.len(), 2);
        assert_eq!(decl.methods[0].name, "Prepare");
        assert_eq!(decl.methods[1].name, "Close");

        let pinger = file.types.iter().find(|t| t.name == "Pinger").unwrap();
        assert!(matches!(pinger.kind, RawDeclKind::Interface(_)));
    }

    #[test]
    fn non_interface_types_are_opaque() {
        let file = scan_file(FILE).unwrap();
        let nop = file.types.iter().find(|t| t.name == "nopCloser").unwrap();
        assert!(matches!(nop.kind, RawDeclKind::Opaque));
    }

    #[test]
    fn type_set_interface_degrades_to_unsupported() {
        let file = scan_file(FILE).unwrap();
        let weird = file.types.iter().find(|t| t.name == "Weird").unwrap();
        assert!(matches!(weird.kind, RawDeclKind::Unsupported(_)));
    }

    #[test]
    fn func_bodies_are_skipped() {
        let file = scan_file(FILE).unwrap();
        // helper() contributed nothing
        assert_eq!(file.types.len(), 4);
    }

    #[test]
    fn generic_type_decl_degrades() {
        let file = scan_file("package p\n\ntype Box[T any] struct{ v T }\n").unwrap();
        assert!(matches!(file.types[0].kind, RawDeclKind::Unsupported(_)));
    }

    #[test]
    fn missing_package_clause_errors() {
        assert!(scan_file("type A int\n").is_err());
    }
}
