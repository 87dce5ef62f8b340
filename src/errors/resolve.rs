// src/errors/resolve.rs
//! Errors from the type-graph adapter and the symbolic type resolver.

use std::path::PathBuf;

use thiserror::Error;

use super::ParseError;

/// Failures surfaced by a package loader.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("package {path} not found")]
    PackageNotFound { path: String },

    #[error("no Go files for package {path} in {dir}")]
    NoGoFiles { path: String, dir: PathBuf },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}")]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("loader cannot load packages (none were preloaded for {path})")]
    NotLoadable { path: String },
}

/// Failures mapping a symbolic type reference to a type-graph entity.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(
        "package path for {alias} not found (the package is neither imported in {context} nor mentioned in --imports)"
    )]
    NoSuchAlias { alias: String, context: String },

    #[error("no type {name} in {scope}")]
    NoSuchType { name: String, scope: String },

    #[error("type {sym} is not a named type")]
    NotNamed { sym: String },

    #[error("type {sym} is not an interface")]
    NotInterface { sym: String },

    #[error("cannot use type {sym}: {reason}")]
    UnsupportedDecl { sym: String, reason: String },

    #[error("failed to load package")]
    Load(#[from] LoadError),
}
