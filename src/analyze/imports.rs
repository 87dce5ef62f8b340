// src/analyze/imports.rs
//! The import table of the generated file.
//!
//! Maps package path to the alias to emit; `None` means the package's
//! declared name is used unqualified in the import line. The first
//! visitor of a path sets the alias; later visitors must agree (an alias
//! equal to the declared name counts as agreeing with `None`), otherwise
//! the run fails with an import conflict. The local package never enters
//! the table.

use rustc_hash::FxHashMap;

use crate::errors::{AnalyzeError, ImportConflict};
use crate::input::ImportSpec;

#[derive(Debug)]
pub struct ImportTable {
    local_path: String,
    /// `--imports` entries by path; `None` alias means path-only form.
    user: FxHashMap<String, Option<String>>,
    /// Path → alias to emit.
    entries: FxHashMap<String, Option<String>>,
}

impl ImportTable {
    pub fn new(local_path: &str, user_imports: &[ImportSpec]) -> Result<Self, AnalyzeError> {
        let mut user = FxHashMap::default();
        for spec in user_imports {
            if user
                .insert(spec.path.clone(), spec.alias.clone())
                .is_some()
            {
                return Err(AnalyzeError::DuplicateImport {
                    path: spec.path.clone(),
                });
            }
        }
        Ok(Self {
            local_path: local_path.to_string(),
            user,
            entries: FxHashMap::default(),
        })
    }

    /// Record the package of a type the user referred to directly
    /// (base, extension, or extra-field type). `written` is the alias
    /// the user wrote, `declared` the package's declared name.
    pub fn seed(
        &mut self,
        written: &str,
        declared: &str,
        path: &str,
    ) -> Result<(), ImportConflict> {
        if path.is_empty() || path == self.local_path {
            return Ok(());
        }
        if let Some(existing) = self.entries.get(path) {
            return match existing {
                None if written != declared => Err(self.conflict(path, declared, written)),
                Some(alias) if alias != written => Err(self.conflict(path, alias, written)),
                _ => Ok(()),
            };
        }
        if written != declared {
            // A path-only --imports entry implies the declared name, so a
            // differently-written reference contradicts it.
            match self.user.get(path) {
                Some(Some(user_alias)) if user_alias != written => {
                    return Err(self.conflict(path, user_alias, written));
                }
                Some(None) => {
                    return Err(self.conflict(path, declared, written));
                }
                _ => {}
            }
            self.entries.insert(path.to_string(), Some(written.to_string()));
        } else {
            if let Some(Some(user_alias)) = self.user.get(path) {
                if user_alias != declared {
                    return Err(self.conflict(path, user_alias, declared));
                }
            }
            self.entries.insert(path.to_string(), None);
        }
        Ok(())
    }

    /// Probe for the name to qualify a rendered type with, creating an
    /// entry on first use. Returns the recorded alias, or the declared
    /// name when none is recorded.
    pub fn probe(&mut self, path: &str, declared: &str) -> String {
        match self.entries.entry(path.to_string()).or_insert(None) {
            Some(alias) => alias.clone(),
            None => declared.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted ascending by path, for emission.
    pub fn sorted(&self) -> Vec<(&str, Option<&str>)> {
        let mut entries: Vec<(&str, Option<&str>)> = self
            .entries
            .iter()
            .map(|(path, alias)| (path.as_str(), alias.as_deref()))
            .collect();
        entries.sort_by_key(|(path, _)| *path);
        entries
    }

    fn conflict(&self, path: &str, first: &str, second: &str) -> ImportConflict {
        ImportConflict {
            path: path.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}
