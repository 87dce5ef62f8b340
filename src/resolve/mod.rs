// src/resolve/mod.rs
//! Maps symbolic type references onto type-graph entities.
//!
//! Resolution order for an input reference follows the alias portion:
//! an empty alias looks in the local package scope and then the universe;
//! a non-empty alias is matched against the user-supplied imports first
//! and the input file's own imports second, lazy-loading the target
//! package through the adapter.

use crate::debug::DebugSink;
use crate::errors::{Error, ResolveError};
use crate::frontend::named_leaves;
use crate::graph::loader::{PackageLoader, Pattern};
use crate::graph::{EntityId, EntityKind, PackageId, TypeGraph};
use crate::input::{ImportSpec, ParsedInput, SymbolicType};

/// A symbolic reference bound to a graph entity, together with the
/// canonical package name and import path the graph reports (both empty
/// for universe types).
#[derive(Debug, Clone)]
pub struct ResolvedType {
    pub sym: SymbolicType,
    pub entity: EntityId,
    pub orig_pkg_name: String,
    pub pkg_path: String,
}

/// Everything the analyzer and emitter need to know about the input.
#[derive(Debug)]
pub struct ResolvedInput {
    pub local_pkg: PackageId,
    pub local_name: String,
    pub local_path: String,
    pub base: ResolvedType,
    pub exts: Vec<ResolvedType>,
    /// Named types mentioned by extra-field type expressions; builtins
    /// are already discarded (nothing to import for them).
    pub extra_field_types: Vec<ResolvedType>,
}

/// Stateful resolver over the graph and its loader.
pub struct Resolver<'a> {
    graph: &'a mut TypeGraph,
    loader: &'a mut dyn PackageLoader,
    debug: &'a DebugSink,
}

impl<'a> Resolver<'a> {
    pub fn new(
        graph: &'a mut TypeGraph,
        loader: &'a mut dyn PackageLoader,
        debug: &'a DebugSink,
    ) -> Self {
        Self {
            graph,
            loader,
            debug,
        }
    }

    pub fn graph(&self) -> &TypeGraph {
        self.graph
    }

    /// Resolve the whole input: local package, base, extensions, and the
    /// named leaves of every extra-field type.
    pub fn resolve_input(&mut self, input: &ParsedInput) -> Result<ResolvedInput, Error> {
        let local_pkg = self
            .loader
            .load(self.graph, Pattern::File(input.in_file.as_path()))
            .map_err(ResolveError::from)?;
        let local_name = self.graph.package(local_pkg).name.clone();
        let local_path = self.graph.package(local_pkg).path.clone();
        self.debug
            .log(|| format!("local package {local_name} ({local_path})"));

        let base = self
            .resolve_interface(local_pkg, &input.imports, &input.base_type)
            .map_err(|e| Error::ResolveContext {
                what: "base type",
                sym: input.base_type.to_string(),
                source: e,
            })?;

        let mut exts = Vec::with_capacity(input.ext_types.len());
        for ext in &input.ext_types {
            let resolved = self
                .resolve_interface(local_pkg, &input.imports, ext)
                .map_err(|e| Error::ResolveContext {
                    what: "ext type",
                    sym: ext.to_string(),
                    source: e,
                })?;
            exts.push(resolved);
        }

        let mut extra_field_types = Vec::new();
        for field in &input.extra_fields {
            for (pkg, name) in named_leaves(&field.expr) {
                let sym = SymbolicType {
                    pkg: pkg.map(str::to_string),
                    name: name.to_string(),
                };
                let entity = self
                    .resolve_sym(local_pkg, &input.imports, &sym)
                    .map_err(|e| Error::ResolveContext {
                        what: "extra field type",
                        sym: format!("{sym} (in {})", field.type_str),
                        source: e,
                    })?;
                if matches!(self.graph.entity(entity).kind, EntityKind::Builtin) {
                    // Nothing to import for a builtin leaf.
                    continue;
                }
                extra_field_types.push(self.bind(sym, entity));
            }
        }

        Ok(ResolvedInput {
            local_pkg,
            local_name,
            local_path,
            base,
            exts,
            extra_field_types,
        })
    }

    /// Resolve an input reference that must be a named interface.
    pub fn resolve_interface(
        &mut self,
        local: PackageId,
        user_imports: &[ImportSpec],
        sym: &SymbolicType,
    ) -> Result<ResolvedType, ResolveError> {
        let entity = self.resolve_sym(local, user_imports, sym)?;
        match &self.graph.entity(entity).kind {
            EntityKind::Interface(_) => Ok(self.bind(sym.clone(), entity)),
            EntityKind::Builtin => Err(ResolveError::NotNamed {
                sym: sym.to_string(),
            }),
            EntityKind::Opaque => Err(ResolveError::NotInterface {
                sym: sym.to_string(),
            }),
            EntityKind::Unsupported(reason) => Err(ResolveError::UnsupportedDecl {
                sym: sym.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    /// Resolve an input reference to any named or universe entity.
    fn resolve_sym(
        &mut self,
        local: PackageId,
        user_imports: &[ImportSpec],
        sym: &SymbolicType,
    ) -> Result<EntityId, ResolveError> {
        match &sym.pkg {
            None => {
                if let Some(entity) = self.graph.lookup(local, &sym.name) {
                    return Ok(entity);
                }
                self.graph
                    .lookup_universe(&sym.name)
                    .ok_or_else(|| ResolveError::NoSuchType {
                        name: sym.name.clone(),
                        scope: format!(
                            "this package ({}) or the universe scope",
                            self.graph.package(local).path
                        ),
                    })
            }
            Some(alias) => {
                let path = self.input_alias_to_path(local, user_imports, alias)?;
                let pkg = self.ensure_loaded(&path)?;
                self.graph
                    .lookup(pkg, &sym.name)
                    .ok_or_else(|| ResolveError::NoSuchType {
                        name: sym.name.clone(),
                        scope: format!("package {path}"),
                    })
            }
        }
    }

    /// Resolve a reference appearing inside a loaded package: an embedded
    /// interface or a named leaf of a method signature. `scope` is the
    /// declaring package; `None` for universe interfaces.
    pub fn resolve_ref(
        &mut self,
        scope: Option<PackageId>,
        pkg_alias: Option<&str>,
        name: &str,
    ) -> Result<EntityId, ResolveError> {
        match (pkg_alias, scope) {
            (None, Some(pkg)) => {
                if let Some(entity) = self.graph.lookup(pkg, name) {
                    return Ok(entity);
                }
                self.graph
                    .lookup_universe(name)
                    .ok_or_else(|| ResolveError::NoSuchType {
                        name: name.to_string(),
                        scope: format!(
                            "package {} or the universe scope",
                            self.graph.package(pkg).path
                        ),
                    })
            }
            (None, None) => {
                self.graph
                    .lookup_universe(name)
                    .ok_or_else(|| ResolveError::NoSuchType {
                        name: name.to_string(),
                        scope: "the universe scope".to_string(),
                    })
            }
            (Some(alias), Some(pkg)) => {
                let path = self.package_alias_to_path(pkg, alias).ok_or_else(|| {
                    ResolveError::NoSuchAlias {
                        alias: alias.to_string(),
                        context: format!("package {}", self.graph.package(pkg).path),
                    }
                })?;
                let target = self.ensure_loaded(&path)?;
                self.graph
                    .lookup(target, name)
                    .ok_or_else(|| ResolveError::NoSuchType {
                        name: name.to_string(),
                        scope: format!("package {path}"),
                    })
            }
            (Some(alias), None) => Err(ResolveError::NoSuchAlias {
                alias: alias.to_string(),
                context: "the universe scope".to_string(),
            }),
        }
    }

    fn bind(&self, sym: SymbolicType, entity: EntityId) -> ResolvedType {
        ResolvedType {
            orig_pkg_name: self.graph.entity_pkg_name(entity).to_string(),
            pkg_path: self.graph.entity_pkg_path(entity).to_string(),
            sym,
            entity,
        }
    }

    fn ensure_loaded(&mut self, path: &str) -> Result<PackageId, ResolveError> {
        if let Some(pkg) = self.graph.package_by_path(path) {
            return Ok(pkg);
        }
        Ok(self.loader.load(self.graph, Pattern::Import(path))?)
    }

    /// Alias lookup for input references: user-supplied imports first,
    /// then the imports of the input file's package.
    fn input_alias_to_path(
        &mut self,
        local: PackageId,
        user_imports: &[ImportSpec],
        alias: &str,
    ) -> Result<String, ResolveError> {
        for spec in user_imports {
            match &spec.alias {
                Some(a) if a == alias => return Ok(spec.path.clone()),
                Some(_) => {}
                None => {
                    // Path-only entry: match on the declared package name.
                    match self.ensure_loaded(&spec.path) {
                        Ok(pkg) if self.graph.package(pkg).name == alias => {
                            return Ok(spec.path.clone());
                        }
                        Ok(_) => {}
                        Err(e) => {
                            self.debug
                                .log(|| format!("cannot match import {}: {e}", spec.path));
                        }
                    }
                }
            }
        }
        self.package_alias_to_path(local, alias)
            .ok_or_else(|| ResolveError::NoSuchAlias {
                alias: alias.to_string(),
                context: format!("this package ({})", self.graph.package(local).path),
            })
    }

    /// Find the import of `pkg` whose effective name is `alias`.
    fn package_alias_to_path(&mut self, pkg: PackageId, alias: &str) -> Option<String> {
        let imports = self.graph.package(pkg).imports.clone();
        for import in imports {
            match import.alias.as_deref() {
                Some(".") | Some("_") => continue,
                Some(a) if a == alias => return Some(import.path),
                Some(_) => continue,
                None => match self.ensure_loaded(&import.path) {
                    Ok(target) if self.graph.package(target).name == alias => {
                        return Some(import.path);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.debug
                            .log(|| format!("cannot match import {}: {e}", import.path));
                    }
                },
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::{iface_decl, method, GraphBuilder};
    use crate::graph::loader::StaticLoader;
    use crate::frontend::TypeExpr;
    use crate::input::ExtraField;
    use std::path::PathBuf;

    fn test_graph() -> (TypeGraph, PackageId) {
        let mut b = GraphBuilder::new();
        let driver = b.package("driver", "database/sql/driver");
        b.iface(
            driver,
            "Conn",
            iface_decl(vec![], vec![method("Close", vec![], vec![TypeExpr::named("error")])]),
        );
        b.opaque(driver, "Value");
        let local = b.package("db", "example.com/db");
        b.import(local, None, "database/sql/driver");
        b.iface(local, "Local", iface_decl(vec![], vec![]));
        (b.finish(), local)
    }

    fn input_with_base(base: &str, imports: Vec<ImportSpec>) -> ParsedInput {
        ParsedInput {
            in_file: PathBuf::from("db.go"),
            out_file: PathBuf::from("out.go"),
            base_type: SymbolicType::parse(base).unwrap(),
            ext_types: vec![],
            extra_fields: vec![],
            imports,
            prefix: "real".to_string(),
            new_func_name: "newConn".to_string(),
        }
    }

    #[test]
    fn resolves_via_file_imports() {
        let (mut graph, local) = test_graph();
        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(&mut graph, &mut loader, &debug);
        let input = input_with_base("driver.Conn", vec![]);
        let resolved = resolver.resolve_input(&input).unwrap();
        assert_eq!(resolved.local_name, "db");
        assert_eq!(resolved.base.pkg_path, "database/sql/driver");
        assert_eq!(resolved.base.orig_pkg_name, "driver");
    }

    #[test]
    fn user_imports_take_precedence() {
        let mut b = GraphBuilder::new();
        let real = b.package("driver", "database/sql/driver");
        b.iface(real, "Conn", iface_decl(vec![], vec![]));
        let fake = b.package("driver", "example.com/fakedriver");
        b.iface(fake, "Conn", iface_decl(vec![], vec![]));
        let local = b.package("db", "example.com/db");
        b.import(local, None, "database/sql/driver");
        let mut graph = b.finish();

        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(&mut graph, &mut loader, &debug);
        let input = input_with_base(
            "driver.Conn",
            vec![ImportSpec {
                alias: Some("driver".to_string()),
                path: "example.com/fakedriver".to_string(),
            }],
        );
        let resolved = resolver.resolve_input(&input).unwrap();
        assert_eq!(resolved.base.pkg_path, "example.com/fakedriver");
    }

    #[test]
    fn path_only_user_import_matches_declared_name() {
        let mut b = GraphBuilder::new();
        let driver = b.package("driver", "database/sql/driver");
        b.iface(driver, "Conn", iface_decl(vec![], vec![]));
        let local = b.package("db", "example.com/db");
        let mut graph = b.finish();

        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(&mut graph, &mut loader, &debug);
        // The file itself does not import the driver package.
        let input = input_with_base(
            "driver.Conn",
            vec![ImportSpec {
                alias: None,
                path: "database/sql/driver".to_string(),
            }],
        );
        let resolved = resolver.resolve_input(&input).unwrap();
        assert_eq!(resolved.base.pkg_path, "database/sql/driver");
    }

    #[test]
    fn local_and_universe_resolution() {
        let (mut graph, local) = test_graph();
        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(&mut graph, &mut loader, &debug);

        let input = input_with_base("Local", vec![]);
        let resolved = resolver.resolve_input(&input).unwrap();
        assert_eq!(resolved.base.pkg_path, "example.com/db");

        // `error` lives in the universe and is a named interface.
        let input = input_with_base("error", vec![]);
        let resolved = resolver.resolve_input(&input).unwrap();
        assert_eq!(resolved.base.pkg_path, "");
        assert_eq!(resolved.base.orig_pkg_name, "");
    }

    #[test]
    fn failure_kinds() {
        let (mut graph, local) = test_graph();
        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(&mut graph, &mut loader, &debug);

        let err = resolver
            .resolve_input(&input_with_base("nosuch.Conn", vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResolveContext {
                source: ResolveError::NoSuchAlias { .. },
                ..
            }
        ));

        let err = resolver
            .resolve_input(&input_with_base("driver.Missing", vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResolveContext {
                source: ResolveError::NoSuchType { .. },
                ..
            }
        ));

        let err = resolver
            .resolve_input(&input_with_base("int", vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResolveContext {
                source: ResolveError::NotNamed { .. },
                ..
            }
        ));

        let err = resolver
            .resolve_input(&input_with_base("driver.Value", vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResolveContext {
                source: ResolveError::NotInterface { .. },
                ..
            }
        ));
    }

    #[test]
    fn extra_field_leaves_discard_builtins() {
        let (mut graph, local) = test_graph();
        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(&mut graph, &mut loader, &debug);

        let mut input = input_with_base("driver.Conn", vec![]);
        input.extra_fields = vec![
            ExtraField::parse("extra,any").unwrap(),
            ExtraField::parse("values,[]driver.Value").unwrap(),
            ExtraField::parse("count,int").unwrap(),
        ];
        let resolved = resolver.resolve_input(&input).unwrap();
        // `any` and `int` are builtins; only driver.Value needs importing.
        assert_eq!(resolved.extra_field_types.len(), 1);
        assert_eq!(resolved.extra_field_types[0].sym.name, "Value");
        assert_eq!(
            resolved.extra_field_types[0].pkg_path,
            "database/sql/driver"
        );
    }

    #[test]
    fn unresolvable_extra_field_leaf_errors() {
        let (mut graph, local) = test_graph();
        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(&mut graph, &mut loader, &debug);

        let mut input = input_with_base("driver.Conn", vec![]);
        input.extra_fields = vec![ExtraField::parse("x,driver.NoSuch").unwrap()];
        assert!(resolver.resolve_input(&input).is_err());
    }
}
