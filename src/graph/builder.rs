// src/graph/builder.rs
//! Hand-built type graphs.
//!
//! The adapter contract keeps the loader pluggable: production binds it to
//! Go source on disk, tests bind it to graphs assembled here.

use crate::frontend::{FuncType, InterfaceDecl, MethodSig, Param, TypeExpr};
use crate::graph::{EntityId, EntityKind, PackageId, TypeGraph};

/// Assembles a [`TypeGraph`] directly, without any loader.
pub struct GraphBuilder {
    graph: TypeGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: TypeGraph::new(),
        }
    }

    pub fn package(&mut self, name: &str, path: &str) -> PackageId {
        self.graph.add_package(name, path)
    }

    pub fn import(&mut self, pkg: PackageId, alias: Option<&str>, path: &str) {
        self.graph.add_import(pkg, alias, path);
    }

    pub fn iface(&mut self, pkg: PackageId, name: &str, decl: InterfaceDecl) -> EntityId {
        self.graph.add_entity(pkg, name, EntityKind::Interface(decl))
    }

    pub fn opaque(&mut self, pkg: PackageId, name: &str) -> EntityId {
        self.graph.add_entity(pkg, name, EntityKind::Opaque)
    }

    pub fn finish(self) -> TypeGraph {
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An interface body from embedded references and methods.
pub fn iface_decl(embedded: Vec<TypeExpr>, methods: Vec<MethodSig>) -> InterfaceDecl {
    InterfaceDecl { embedded, methods }
}

/// A non-variadic method signature.
pub fn method(name: &str, params: Vec<Param>, results: Vec<TypeExpr>) -> MethodSig {
    MethodSig {
        name: name.to_string(),
        sig: FuncType {
            params,
            variadic: false,
            results,
        },
    }
}

/// A method signature whose last parameter is variadic.
pub fn variadic_method(name: &str, params: Vec<Param>, results: Vec<TypeExpr>) -> MethodSig {
    MethodSig {
        name: name.to_string(),
        sig: FuncType {
            params,
            variadic: true,
            results,
        },
    }
}

pub fn param(name: Option<&str>, ty: TypeExpr) -> Param {
    Param {
        name: name.map(str::to_string),
        ty,
    }
}
