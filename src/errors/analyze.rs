// src/errors/analyze.rs
//! Errors from the interface analyzer and the import table.

use thiserror::Error;

use super::ResolveError;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("embedded type {ty} in {iface} is not a named interface")]
    NotNamedInterface { iface: String, ty: String },

    #[error("cannot analyze {iface}: {reason}")]
    UnsupportedInterface { iface: String, reason: String },

    #[error("could not handle a type in method {method} of {iface}")]
    Signature {
        iface: String,
        method: String,
        #[source]
        source: ResolveError,
    },

    #[error("duplicate entry in input imports for path {path}")]
    DuplicateImport { path: String },
}

/// The same package is referred to under two inconsistent names.
#[derive(Error, Debug)]
#[error(
    "inconsistent imported package name, package {path} is referred to as {first} and as {second}, either fix the name in --imports or in --basetype or --exttypes"
)]
pub struct ImportConflict {
    pub path: String,
    pub first: String,
    pub second: String,
}
