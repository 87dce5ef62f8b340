// src/input/mod.rs
//! Parsed and validated generator input.
//!
//! Turns the raw flag strings into symbolic types, import specs and extra
//! fields, validates identifiers, and computes the output path.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::errors::{Error, FsError, InputError};
use crate::frontend::{parse_type_expr, TypeExpr};

/// A symbolic type reference as written by the user: `Name` or `pkg.Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicType {
    pub pkg: Option<String>,
    pub name: String,
}

impl SymbolicType {
    pub fn parse(s: &str) -> Result<Self, InputError> {
        if s.is_empty() {
            return Err(InputError::EmptyType);
        }
        let mut parts = s.split('.');
        let first = parts.next().unwrap_or_default();
        match (parts.next(), parts.next()) {
            (None, _) => Ok(Self {
                pkg: None,
                name: first.to_string(),
            }),
            (Some(second), None) => {
                if first.is_empty() {
                    return Err(InputError::EmptyPackageName {
                        input: s.to_string(),
                    });
                }
                if second.is_empty() {
                    return Err(InputError::EmptyTypeName {
                        input: s.to_string(),
                    });
                }
                Ok(Self {
                    pkg: Some(first.to_string()),
                    name: second.to_string(),
                })
            }
            (Some(_), Some(_)) => Err(InputError::MalformedType {
                input: s.to_string(),
            }),
        }
    }

    /// The spelling with the dot dropped: `driver.Conn` → `driverConn`.
    /// Generated type names are derived from this.
    pub fn no_dot(&self) -> String {
        match &self.pkg {
            Some(pkg) => format!("{pkg}{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for SymbolicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.pkg {
            Some(pkg) => write!(f, "{pkg}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// An `--imports` entry: `path` or `alias,path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    pub fn parse(s: &str) -> Result<Self, InputError> {
        if s.is_empty() {
            return Err(InputError::EmptyImport);
        }
        let parts: Vec<&str> = s.split(',').collect();
        match parts.as_slice() {
            [path] => Ok(Self {
                alias: None,
                path: path.to_string(),
            }),
            [alias, path] => {
                if alias.is_empty() {
                    return Err(InputError::EmptyImportName {
                        input: s.to_string(),
                    });
                }
                if path.is_empty() {
                    return Err(InputError::EmptyImportPath {
                        input: s.to_string(),
                    });
                }
                Ok(Self {
                    alias: Some(alias.to_string()),
                    path: path.to_string(),
                })
            }
            _ => Err(InputError::MalformedImport {
                input: s.to_string(),
            }),
        }
    }
}

/// An `--extrafields` entry: a struct field threaded into every forwarder
/// call. The type source is kept verbatim for emission; the parsed
/// expression feeds import resolution.
#[derive(Debug, Clone)]
pub struct ExtraField {
    pub name: String,
    pub type_str: String,
    pub expr: TypeExpr,
}

impl ExtraField {
    pub fn parse(s: &str) -> Result<Self, InputError> {
        if s.is_empty() {
            return Err(InputError::EmptyExtraField);
        }
        let Some((name, type_str)) = s.split_once(',') else {
            return Err(InputError::MalformedExtraField {
                input: s.to_string(),
            });
        };
        if name.is_empty() || type_str.is_empty() {
            return Err(InputError::MalformedExtraField {
                input: s.to_string(),
            });
        }
        let expr = parse_type_expr(type_str).map_err(|e| InputError::BadExtraFieldType {
            input: s.to_string(),
            source: e,
        })?;
        Ok(Self {
            name: name.to_string(),
            type_str: type_str.to_string(),
            expr,
        })
    }
}

/// Legal Go-ish identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Fully parsed and validated input of one generator run.
#[derive(Debug)]
pub struct ParsedInput {
    pub in_file: PathBuf,
    pub out_file: PathBuf,
    pub base_type: SymbolicType,
    pub ext_types: Vec<SymbolicType>,
    pub extra_fields: Vec<ExtraField>,
    pub imports: Vec<ImportSpec>,
    pub prefix: String,
    pub new_func_name: String,
}

impl ParsedInput {
    pub fn from_cli(cli: &Cli) -> Result<Self, Error> {
        if cli.base_type.is_empty() {
            return Err(InputError::MissingBaseType.into());
        }
        if cli.prefix.is_empty() {
            return Err(InputError::MissingPrefix.into());
        }
        if cli.new_func_name.is_empty() {
            return Err(InputError::MissingNewFuncName.into());
        }
        if cli.in_file.is_empty() {
            return Err(InputError::MissingInFile.into());
        }

        let in_file = PathBuf::from(&cli.in_file);
        let meta = std::fs::metadata(&in_file).map_err(|e| FsError::Stat {
            path: in_file.clone(),
            source: e,
        })?;
        if !meta.is_file() {
            return Err(FsError::NotRegular { path: in_file }.into());
        }

        let base_type = SymbolicType::parse(&cli.base_type)?;

        let mut ext_types = Vec::new();
        if !cli.ext_types.is_empty() {
            for part in cli.ext_types.split(';') {
                ext_types.push(SymbolicType::parse(part)?);
            }
        }

        let mut extra_fields = Vec::new();
        if !cli.extra_fields.is_empty() {
            for part in cli.extra_fields.split(';') {
                extra_fields.push(ExtraField::parse(part)?);
            }
        }

        let mut imports = Vec::new();
        if !cli.imports.is_empty() {
            for part in cli.imports.split(';') {
                imports.push(ImportSpec::parse(part)?);
            }
        }

        let in_file = if in_file.is_absolute() {
            in_file
        } else {
            std::path::absolute(&in_file).map_err(|e| FsError::Absolutize {
                path: in_file.clone(),
                source: e,
            })?
        };

        let out_file = if cli.out_file.is_empty() {
            default_out_file(&in_file, &base_type)
        } else {
            PathBuf::from(&cli.out_file)
        };

        if !is_valid_identifier(&cli.prefix) {
            return Err(InputError::InvalidIdentifier {
                what: "prefix",
                name: cli.prefix.clone(),
            }
            .into());
        }
        if !is_valid_identifier(&cli.new_func_name) {
            return Err(InputError::InvalidIdentifier {
                what: "function name",
                name: cli.new_func_name.clone(),
            }
            .into());
        }

        Ok(Self {
            in_file,
            out_file,
            base_type,
            ext_types,
            extra_fields,
            imports,
            prefix: cli.prefix.clone(),
            new_func_name: cli.new_func_name.clone(),
        })
    }
}

/// `<basetype-no-dot>_wrappers.go`, lowercased, next to the input file.
fn default_out_file(in_file: &std::path::Path, base_type: &SymbolicType) -> PathBuf {
    let base_name = format!("{}_wrappers.go", base_type.no_dot()).to_lowercase();
    match in_file.parent() {
        Some(dir) => dir.join(base_name),
        None => PathBuf::from(base_name),
    }
}
