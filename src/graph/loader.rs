// src/graph/loader.rs
//! Package loaders: the pluggable binding between the type graph and the
//! outside world.
//!
//! `SourceLoader` is the production binding. It locates package
//! directories the way the Go toolchain lays them out — the enclosing
//! module (go.mod), a vendor directory, `$GOROOT/src` — and populates the
//! graph by scanning Go source. Tests bind the graph by hand through
//! `graph::builder` and use `StaticLoader`/`NullLoader`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::debug::DebugSink;
use crate::errors::LoadError;
use crate::frontend::{scan_file, RawDeclKind, RawFile};
use crate::graph::{EntityKind, PackageId, TypeGraph};

/// What to load: the package owning a file, or a package by import path.
#[derive(Debug, Clone, Copy)]
pub enum Pattern<'a> {
    File(&'a Path),
    Import(&'a str),
}

/// The load operation of the type-graph adapter contract.
pub trait PackageLoader {
    fn load(&mut self, graph: &mut TypeGraph, pattern: Pattern<'_>) -> Result<PackageId, LoadError>;
}

/// A loader that cannot load anything; for tests that preload the graph.
pub struct NullLoader;

impl PackageLoader for NullLoader {
    fn load(&mut self, _graph: &mut TypeGraph, pattern: Pattern<'_>) -> Result<PackageId, LoadError> {
        let path = match pattern {
            Pattern::File(p) => p.display().to_string(),
            Pattern::Import(p) => p.to_string(),
        };
        Err(LoadError::NotLoadable { path })
    }
}

/// A loader over a pre-built graph: file loads resolve to a fixed local
/// package, import loads only find packages already in the graph.
pub struct StaticLoader {
    local: PackageId,
}

impl StaticLoader {
    pub fn new(local: PackageId) -> Self {
        Self { local }
    }
}

impl PackageLoader for StaticLoader {
    fn load(&mut self, graph: &mut TypeGraph, pattern: Pattern<'_>) -> Result<PackageId, LoadError> {
        match pattern {
            Pattern::File(_) => Ok(self.local),
            Pattern::Import(path) => {
                graph
                    .package_by_path(path)
                    .ok_or_else(|| LoadError::PackageNotFound {
                        path: path.to_string(),
                    })
            }
        }
    }
}

/// Loads packages from Go source on disk.
pub struct SourceLoader {
    module_root: Option<PathBuf>,
    module_path: Option<String>,
    goroot: Option<Option<PathBuf>>,
    debug: DebugSink,
}

impl SourceLoader {
    /// Build a loader anchored at the input file: the enclosing go.mod
    /// (if any) defines the module import-path mapping.
    pub fn for_file(in_file: &Path, debug: DebugSink) -> Self {
        let module = in_file.parent().and_then(find_module);
        if let Some((root, path)) = &module {
            debug.log(|| format!("module {} at {}", path, root.display()));
        }
        let (module_root, module_path) = match module {
            Some((root, path)) => (Some(root), Some(path)),
            None => (None, None),
        };
        Self {
            module_root,
            module_path,
            goroot: None,
            debug,
        }
    }

    fn goroot(&mut self) -> Option<PathBuf> {
        if let Some(cached) = &self.goroot {
            return cached.clone();
        }
        let found = std::env::var_os("GOROOT")
            .map(PathBuf::from)
            .or_else(|| {
                let out = Command::new("go").args(["env", "GOROOT"]).output().ok()?;
                if !out.status.success() {
                    return None;
                }
                let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(text))
                }
            });
        self.debug.log(|| match &found {
            Some(p) => format!("GOROOT is {}", p.display()),
            None => "GOROOT not found".to_string(),
        });
        self.goroot = Some(found.clone());
        found
    }

    /// Directories that may hold the package, in lookup order.
    fn candidate_dirs(&mut self, import_path: &str) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let (Some(root), Some(mpath)) = (&self.module_root, &self.module_path) {
            if import_path == mpath {
                dirs.push(root.clone());
            } else if let Some(rest) = import_path.strip_prefix(&format!("{mpath}/")) {
                dirs.push(root.join(rest));
            }
            dirs.push(root.join("vendor").join(import_path));
        }
        if let Some(goroot) = self.goroot() {
            dirs.push(goroot.join("src").join(import_path));
        }
        dirs
    }

    /// Import path for the directory holding the input file.
    fn file_import_path(&self, dir: &Path) -> String {
        if let (Some(root), Some(mpath)) = (&self.module_root, &self.module_path) {
            if let Ok(rel) = dir.strip_prefix(root) {
                if rel.as_os_str().is_empty() {
                    return mpath.clone();
                }
                let mut path = mpath.clone();
                for comp in rel.components() {
                    path.push('/');
                    path.push_str(&comp.as_os_str().to_string_lossy());
                }
                return path;
            }
        }
        // No module context: the directory itself is the identity.
        dir.to_string_lossy().into_owned()
    }

    fn load_dir(
        &self,
        graph: &mut TypeGraph,
        dir: &Path,
        import_path: &str,
        strict_file: Option<&Path>,
    ) -> Result<PackageId, LoadError> {
        if let Some(id) = graph.package_by_path(import_path) {
            return Ok(id);
        }

        let mut scanned: Vec<(PathBuf, RawFile)> = Vec::new();
        if let Some(file) = strict_file {
            let source = std::fs::read_to_string(file).map_err(|e| LoadError::Io {
                path: file.to_path_buf(),
                source: e,
            })?;
            let raw = scan_file(&source).map_err(|e| LoadError::Parse {
                file: file.to_path_buf(),
                source: e,
            })?;
            scanned.push((file.to_path_buf(), raw));
        }

        for path in go_files(dir, import_path)? {
            if strict_file.is_some_and(|f| f == path) {
                continue;
            }
            let source = match std::fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) => {
                    self.debug
                        .log(|| format!("skipping {}: {}", path.display(), e));
                    continue;
                }
            };
            match scan_file(&source) {
                Ok(raw) => scanned.push((path, raw)),
                Err(e) => {
                    self.debug
                        .log(|| format!("skipping {}: {}", path.display(), e));
                }
            }
        }

        if scanned.is_empty() {
            return Err(LoadError::NoGoFiles {
                path: import_path.to_string(),
                dir: dir.to_path_buf(),
            });
        }

        let pkg_name = pick_package_name(&scanned, import_path, strict_file.is_some());
        let pkg = graph.add_package(&pkg_name, import_path);
        for (path, raw) in scanned {
            if raw.package_name != pkg_name {
                self.debug.log(|| {
                    format!(
                        "skipping {}: package {} does not match {}",
                        path.display(),
                        raw.package_name,
                        pkg_name
                    )
                });
                continue;
            }
            for import in &raw.imports {
                graph.add_import(pkg, import.alias.as_deref(), &import.path);
            }
            for decl in raw.types {
                let kind = match decl.kind {
                    RawDeclKind::Interface(body) => EntityKind::Interface(body),
                    RawDeclKind::Opaque => EntityKind::Opaque,
                    RawDeclKind::Unsupported(reason) => EntityKind::Unsupported(reason),
                };
                graph.add_entity(pkg, &decl.name, kind);
            }
        }
        self.debug
            .log(|| format!("loaded package {} from {}", import_path, dir.display()));
        Ok(pkg)
    }
}

impl PackageLoader for SourceLoader {
    fn load(&mut self, graph: &mut TypeGraph, pattern: Pattern<'_>) -> Result<PackageId, LoadError> {
        match pattern {
            Pattern::File(file) => {
                let dir = file.parent().unwrap_or(Path::new(".")).to_path_buf();
                let import_path = self.file_import_path(&dir);
                self.load_dir(graph, &dir, &import_path, Some(file))
            }
            Pattern::Import(import_path) => {
                for dir in self.candidate_dirs(import_path) {
                    if !dir.is_dir() {
                        continue;
                    }
                    match self.load_dir(graph, &dir, import_path, None) {
                        Ok(pkg) => return Ok(pkg),
                        Err(LoadError::NoGoFiles { .. }) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Err(LoadError::PackageNotFound {
                    path: import_path.to_string(),
                })
            }
        }
    }
}

/// Walk up from a directory looking for go.mod; returns the module root
/// and the module path declared in it.
fn find_module(start: &Path) -> Option<(PathBuf, String)> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        let gomod = d.join("go.mod");
        if gomod.is_file() {
            let text = std::fs::read_to_string(&gomod).ok()?;
            let path = parse_module_path(&text)?;
            return Some((d.to_path_buf(), path));
        }
        dir = d.parent();
    }
    None
}

/// Extract the module path from go.mod contents.
fn parse_module_path(gomod: &str) -> Option<String> {
    for line in gomod.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("module") {
            let rest = rest.trim();
            if rest.is_empty() {
                continue;
            }
            return Some(rest.trim_matches('"').to_string());
        }
    }
    None
}

/// Buildable Go files of a directory, sorted for determinism.
fn go_files(dir: &Path, import_path: &str) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let Some(name) = p.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            name.ends_with(".go")
                && !name.ends_with("_test.go")
                && !name.starts_with('_')
                && !name.starts_with('.')
        })
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(LoadError::NoGoFiles {
            path: import_path.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    Ok(files)
}

/// Pick the declared package name for a scanned directory. When the load
/// was anchored at an input file, that file's clause wins; otherwise
/// prefer the name matching the last path segment (filters out
/// `package main` build tools living in the same directory).
fn pick_package_name(
    scanned: &[(PathBuf, RawFile)],
    import_path: &str,
    has_strict: bool,
) -> String {
    if has_strict {
        return scanned[0].1.package_name.clone();
    }
    let last_segment = import_path.rsplit('/').next().unwrap_or(import_path);
    scanned
        .iter()
        .find(|(_, raw)| raw.package_name == last_segment)
        .map(|(_, raw)| raw.package_name.clone())
        .unwrap_or_else(|| scanned[0].1.package_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_module_package_by_file() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "go.mod", "module example.com/m\n\ngo 1.22\n");
        let main = write(
            tmp.path(),
            "db.go",
            "package db\n\ntype Conn interface {\n\tClose() error\n}\n",
        );

        let mut graph = TypeGraph::new();
        let mut loader = SourceLoader::for_file(&main, DebugSink::disabled());
        let pkg = loader.load(&mut graph, Pattern::File(&main)).unwrap();
        assert_eq!(graph.package(pkg).name, "db");
        assert_eq!(graph.package(pkg).path, "example.com/m");
        assert!(graph.lookup(pkg, "Conn").is_some());
    }

    #[test]
    fn loads_subpackage_by_import_path() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "go.mod", "module example.com/m\n");
        let main = write(tmp.path(), "main.go", "package m\n");
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        write(
            &tmp.path().join("sub"),
            "sub.go",
            "package sub\n\ntype Thing interface {\n\tDo()\n}\n",
        );

        let mut graph = TypeGraph::new();
        let mut loader = SourceLoader::for_file(&main, DebugSink::disabled());
        let pkg = loader
            .load(&mut graph, Pattern::Import("example.com/m/sub"))
            .unwrap();
        assert_eq!(graph.package(pkg).name, "sub");
        assert!(graph.lookup(pkg, "Thing").is_some());

        // Idempotent: the second load hits the graph cache.
        let again = loader
            .load(&mut graph, Pattern::Import("example.com/m/sub"))
            .unwrap();
        assert_eq!(pkg, again);
    }

    #[test]
    fn missing_package_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "go.mod", "module example.com/m\n");
        let main = write(tmp.path(), "main.go", "package m\n");

        let mut graph = TypeGraph::new();
        let mut loader = SourceLoader::for_file(&main, DebugSink::disabled());
        // Keep the lookup inside the temp module so a host GOROOT cannot
        // satisfy it by accident.
        let err = loader
            .load(&mut graph, Pattern::Import("example.com/m/nope"))
            .unwrap_err();
        assert!(matches!(err, LoadError::PackageNotFound { .. }));
    }

    #[test]
    fn parse_module_path_variants() {
        assert_eq!(
            parse_module_path("module example.com/m\n"),
            Some("example.com/m".to_string())
        );
        assert_eq!(
            parse_module_path("// comment\n\nmodule \"quoted/path\"\n"),
            Some("quoted/path".to_string())
        );
        assert_eq!(parse_module_path("go 1.22\n"), None);
    }

    #[test]
    fn test_files_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "go.mod", "module example.com/m\n");
        let main = write(tmp.path(), "a.go", "package a\n\ntype A interface{ M() }\n");
        write(tmp.path(), "a_test.go", "package a\n\ntype FromTest interface{ T() }\n");

        let mut graph = TypeGraph::new();
        let mut loader = SourceLoader::for_file(&main, DebugSink::disabled());
        let pkg = loader.load(&mut graph, Pattern::File(&main)).unwrap();
        assert!(graph.lookup(pkg, "A").is_some());
        assert!(graph.lookup(pkg, "FromTest").is_none());
    }
}
