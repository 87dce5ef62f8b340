// src/graph/mod.rs
//! The loaded type graph: packages, their scopes, and named entities.
//!
//! Packages and entities live in flat arenas keyed by id; scopes map
//! simple names to entity ids. The graph lives for a whole generator
//! run; loaders append to it and never remove anything.

pub mod builder;
pub mod loader;

use rustc_hash::FxHashMap;

use crate::frontend::{FuncType, InterfaceDecl, MethodSig, TypeExpr};

/// Identifies a loaded package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(u32);

impl PackageId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a named entity (type declaration or universe type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

impl EntityId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One import declaration of a loaded package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub alias: Option<String>,
    pub path: String,
}

/// A loaded package: declared name, import path, imports, top-level scope.
#[derive(Debug)]
pub struct PackageData {
    pub name: String,
    pub path: String,
    pub imports: Vec<ImportDecl>,
    scope: FxHashMap<String, EntityId>,
}

impl PackageData {
    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.scope.get(name).copied()
    }
}

/// What a named entity is underneath.
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// A universe basic type (`int`, `string`, `any`, ...).
    Builtin,
    /// A named type whose underlying form is an interface.
    Interface(InterfaceDecl),
    /// A named type whose underlying form is not an interface.
    Opaque,
    /// A declaration the frontend could not represent; the reason is kept
    /// so it can be reported if something asks for this type.
    Unsupported(String),
}

#[derive(Debug)]
pub struct EntityData {
    pub name: String,
    /// `None` for universe entities.
    pub package: Option<PackageId>,
    pub kind: EntityKind,
}

/// The whole type graph for one generator run.
#[derive(Debug)]
pub struct TypeGraph {
    packages: Vec<PackageData>,
    entities: Vec<EntityData>,
    by_path: FxHashMap<String, PackageId>,
    universe: FxHashMap<String, EntityId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        let mut graph = Self {
            packages: Vec::new(),
            entities: Vec::new(),
            by_path: FxHashMap::default(),
            universe: FxHashMap::default(),
        };
        graph.populate_universe();
        graph
    }

    fn populate_universe(&mut self) {
        const BASICS: &[&str] = &[
            "any",
            "bool",
            "byte",
            "comparable",
            "complex64",
            "complex128",
            "float32",
            "float64",
            "int",
            "int8",
            "int16",
            "int32",
            "int64",
            "rune",
            "string",
            "uint",
            "uint8",
            "uint16",
            "uint32",
            "uint64",
            "uintptr",
        ];
        for name in BASICS {
            let id = self.push_entity(EntityData {
                name: name.to_string(),
                package: None,
                kind: EntityKind::Builtin,
            });
            self.universe.insert(name.to_string(), id);
        }
        // `error` is a named interface in the universe scope.
        let error_decl = InterfaceDecl {
            embedded: Vec::new(),
            methods: vec![MethodSig {
                name: "Error".to_string(),
                sig: FuncType {
                    params: Vec::new(),
                    variadic: false,
                    results: vec![TypeExpr::named("string")],
                },
            }],
        };
        let id = self.push_entity(EntityData {
            name: "error".to_string(),
            package: None,
            kind: EntityKind::Interface(error_decl),
        });
        self.universe.insert("error".to_string(), id);
    }

    fn push_entity(&mut self, data: EntityData) -> EntityId {
        let id = EntityId::new(self.entities.len() as u32);
        self.entities.push(data);
        id
    }

    /// Register a package. Loading the same path twice returns the
    /// already-registered package untouched.
    pub fn add_package(&mut self, name: &str, path: &str) -> PackageId {
        if let Some(id) = self.by_path.get(path) {
            return *id;
        }
        let id = PackageId::new(self.packages.len() as u32);
        self.packages.push(PackageData {
            name: name.to_string(),
            path: path.to_string(),
            imports: Vec::new(),
            scope: FxHashMap::default(),
        });
        self.by_path.insert(path.to_string(), id);
        id
    }

    /// Record an import declaration on a package (deduplicated).
    pub fn add_import(&mut self, pkg: PackageId, alias: Option<&str>, path: &str) {
        let imports = &mut self.packages[pkg.index()].imports;
        if imports
            .iter()
            .any(|im| im.alias.as_deref() == alias && im.path == path)
        {
            return;
        }
        imports.push(ImportDecl {
            alias: alias.map(str::to_string),
            path: path.to_string(),
        });
    }

    /// Add a named entity to a package scope. The first declaration of a
    /// name wins; later duplicates (build-variant files) are dropped.
    pub fn add_entity(&mut self, pkg: PackageId, name: &str, kind: EntityKind) -> EntityId {
        if let Some(existing) = self.packages[pkg.index()].lookup(name) {
            return existing;
        }
        let id = self.push_entity(EntityData {
            name: name.to_string(),
            package: Some(pkg),
            kind,
        });
        self.packages[pkg.index()]
            .scope
            .insert(name.to_string(), id);
        id
    }

    pub fn package(&self, id: PackageId) -> &PackageData {
        &self.packages[id.index()]
    }

    pub fn entity(&self, id: EntityId) -> &EntityData {
        &self.entities[id.index()]
    }

    pub fn package_by_path(&self, path: &str) -> Option<PackageId> {
        self.by_path.get(path).copied()
    }

    pub fn lookup(&self, pkg: PackageId, name: &str) -> Option<EntityId> {
        self.packages[pkg.index()].lookup(name)
    }

    pub fn lookup_universe(&self, name: &str) -> Option<EntityId> {
        self.universe.get(name).copied()
    }

    /// Import path of the package declaring an entity; empty for universe
    /// entities.
    pub fn entity_pkg_path(&self, id: EntityId) -> &str {
        match self.entity(id).package {
            Some(pkg) => &self.package(pkg).path,
            None => "",
        }
    }

    /// Declared name of the package declaring an entity; empty for
    /// universe entities.
    pub fn entity_pkg_name(&self, id: EntityId) -> &str {
        match self.entity(id).package {
            Some(pkg) => &self.package(pkg).name,
            None => "",
        }
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_has_basics_and_error() {
        let graph = TypeGraph::new();
        let int = graph.lookup_universe("int").unwrap();
        assert!(matches!(graph.entity(int).kind, EntityKind::Builtin));
        assert_eq!(graph.entity_pkg_path(int), "");

        let error = graph.lookup_universe("error").unwrap();
        let EntityKind::Interface(decl) = &graph.entity(error).kind else {
            panic!("error should be an interface");
        };
        assert_eq!(decl.methods[0].name, "Error");
        assert!(graph.lookup_universe("Conn").is_none());
    }

    #[test]
    fn add_package_is_idempotent_by_path() {
        let mut graph = TypeGraph::new();
        let a = graph.add_package("driver", "database/sql/driver");
        let b = graph.add_package("driver", "database/sql/driver");
        assert_eq!(a, b);
    }

    #[test]
    fn first_entity_declaration_wins() {
        let mut graph = TypeGraph::new();
        let pkg = graph.add_package("p", "example.com/p");
        let first = graph.add_entity(pkg, "T", EntityKind::Opaque);
        let second = graph.add_entity(pkg, "T", EntityKind::Builtin);
        assert_eq!(first, second);
        assert!(matches!(graph.entity(first).kind, EntityKind::Opaque));
    }

    #[test]
    fn scope_lookup() {
        let mut graph = TypeGraph::new();
        let pkg = graph.add_package("p", "example.com/p");
        let id = graph.add_entity(pkg, "Conn", EntityKind::Opaque);
        assert_eq!(graph.lookup(pkg, "Conn"), Some(id));
        assert_eq!(graph.lookup(pkg, "Other"), None);
        assert_eq!(graph.entity_pkg_name(id), "p");
        assert_eq!(graph.entity_pkg_path(id), "example.com/p");
    }
}
