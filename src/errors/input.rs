// src/errors/input.rs
//! Errors for malformed generator input (flag strings and identifiers).

use thiserror::Error;

use super::ParseError;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("no base type (or it is empty), use --basetype to specify it")]
    MissingBaseType,

    #[error("no prefix (or it is empty), use --prefix to specify it")]
    MissingPrefix,

    #[error("no new func name (or it is empty), use --newfuncname to specify it")]
    MissingNewFuncName,

    #[error("no in file, use --infile to specify it or export the GOFILE environment variable")]
    MissingInFile,

    #[error("empty type string")]
    EmptyType,

    #[error("empty package name in {input}")]
    EmptyPackageName { input: String },

    #[error("empty type name in {input}")]
    EmptyTypeName { input: String },

    #[error("malformed type {input}, expected a string like int or driver.Driver")]
    MalformedType { input: String },

    #[error("empty import string")]
    EmptyImport,

    #[error("empty import name in {input}")]
    EmptyImportName { input: String },

    #[error("empty import path in {input}")]
    EmptyImportPath { input: String },

    #[error(
        "malformed import string {input}, expected either an import path or a comma-separated pair of an import name and import path"
    )]
    MalformedImport { input: String },

    #[error("empty extra field string")]
    EmptyExtraField,

    #[error("expected a comma-separated name-type pair for an extra field, got something else ({input})")]
    MalformedExtraField { input: String },

    #[error("invalid type in extra field {input}")]
    BadExtraFieldType {
        input: String,
        #[source]
        source: ParseError,
    },

    #[error(
        "{what} {name} is invalid, it should start with an ASCII letter or an underscore, followed by ASCII letters, digits or underscores"
    )]
    InvalidIdentifier { what: &'static str, name: String },
}
