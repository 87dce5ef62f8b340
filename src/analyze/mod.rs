// src/analyze/mod.rs
//! Interface analysis: a breadth-first walk over the closure of the base
//! and extension interfaces.
//!
//! Every interface reachable through embedding lands in a flat table
//! keyed by qualified name, holding its directly embedded references and
//! its explicitly declared methods with signatures already rendered to
//! source strings. Rendering populates the import table as it goes.

pub mod imports;
pub mod printer;

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{bug, AnalyzeError, Error};
use crate::frontend::{MethodSig, TypeExpr};
use crate::graph::{EntityId, EntityKind, PackageId};
use crate::input::ImportSpec;
use crate::resolve::{ResolvedInput, ResolvedType, Resolver};

pub use imports::ImportTable;
pub use printer::TypePrinter;

/// `(package path, simple name)`: the identity of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub pkg_path: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(pkg_path: &str, name: &str) -> Self {
        Self {
            pkg_path: pkg_path.to_string(),
            name: name.to_string(),
        }
    }

    pub fn of(resolved: &ResolvedType) -> Self {
        Self::new(&resolved.pkg_path, &resolved.sym.name)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.pkg_path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "\"{}\".{}", self.pkg_path, self.name)
        }
    }
}

/// One method parameter, named and rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: String,
}

/// One explicitly declared method with its signature rendered to source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub variadic: bool,
    pub results: Vec<String>,
}

/// What the analyzer knows about one named interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceInfo {
    /// Directly embedded interfaces, by qualified name.
    pub embedded: Vec<QualifiedName>,
    /// Explicitly declared methods, in declaration order.
    pub methods: Vec<MethodInfo>,
}

/// The analysis result consumed by the emitter.
#[derive(Debug)]
pub struct Analysis {
    table: FxHashMap<QualifiedName, InterfaceInfo>,
    pub imports: ImportTable,
}

impl Analysis {
    pub fn get(&self, name: &QualifiedName) -> Option<&InterfaceInfo> {
        self.table.get(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Analyze the closure of the resolved base and extension interfaces.
pub fn analyze(
    resolver: &mut Resolver<'_>,
    resolved: &ResolvedInput,
    user_imports: &[ImportSpec],
) -> Result<Analysis, Error> {
    let mut imports = ImportTable::new(&resolved.local_path, user_imports)?;

    // The packages of directly referenced types enter the table first so
    // user-written aliases win over printer probes.
    seed_imports(&mut imports, &resolved.base)?;
    for ext in &resolved.exts {
        seed_imports(&mut imports, ext)?;
    }
    for extra in &resolved.extra_field_types {
        seed_imports(&mut imports, extra)?;
    }

    let mut table: FxHashMap<QualifiedName, InterfaceInfo> = FxHashMap::default();
    let mut queue: VecDeque<(QualifiedName, EntityId)> = VecDeque::new();
    queue.push_back((QualifiedName::of(&resolved.base), resolved.base.entity));
    for ext in &resolved.exts {
        queue.push_back((QualifiedName::of(ext), ext.entity));
    }

    while let Some((qname, entity)) = queue.pop_front() {
        if table.contains_key(&qname) {
            continue;
        }
        let (decl, scope) = {
            let data = resolver.graph().entity(entity);
            let EntityKind::Interface(decl) = &data.kind else {
                return Err(bug(format!("queued entity {qname} is not an interface")));
            };
            (decl.clone(), data.package)
        };

        let mut info = InterfaceInfo::default();
        for emb in &decl.embedded {
            let (emb_q, target) = analyze_embedded(resolver, &qname, scope, emb)?;
            if !table.contains_key(&emb_q) {
                queue.push_back((emb_q.clone(), target));
            }
            info.embedded.push(emb_q);
        }
        for method in &decl.methods {
            info.methods.push(render_method(
                resolver,
                &mut imports,
                scope,
                &resolved.local_path,
                &qname,
                method,
            )?);
        }
        table.insert(qname, info);
    }

    Ok(Analysis { table, imports })
}

/// Check one embedded reference; returns its qualified name and entity.
fn analyze_embedded(
    resolver: &mut Resolver<'_>,
    iface: &QualifiedName,
    scope: Option<PackageId>,
    emb: &TypeExpr,
) -> Result<(QualifiedName, EntityId), Error> {
    let TypeExpr::Named { pkg, name } = emb else {
        return Err(AnalyzeError::NotNamedInterface {
            iface: iface.to_string(),
            ty: emb.to_string(),
        }
        .into());
    };
    let target = resolver
        .resolve_ref(scope, pkg.as_deref(), name)
        .map_err(|e| Error::ResolveContext {
            what: "embedded type",
            sym: emb.to_string(),
            source: e,
        })?;
    match &resolver.graph().entity(target).kind {
        EntityKind::Interface(_) => {}
        EntityKind::Unsupported(reason) => {
            return Err(AnalyzeError::UnsupportedInterface {
                iface: emb.to_string(),
                reason: reason.clone(),
            }
            .into());
        }
        EntityKind::Builtin | EntityKind::Opaque => {
            return Err(AnalyzeError::NotNamedInterface {
                iface: iface.to_string(),
                ty: emb.to_string(),
            }
            .into());
        }
    }
    Ok((
        QualifiedName::new(resolver.graph().entity_pkg_path(target), name),
        target,
    ))
}

fn render_method(
    resolver: &mut Resolver<'_>,
    imports: &mut ImportTable,
    scope: Option<PackageId>,
    local_path: &str,
    iface: &QualifiedName,
    method: &MethodSig,
) -> Result<MethodInfo, Error> {
    let signature_err = |e| {
        Error::Analyze(AnalyzeError::Signature {
            iface: iface.to_string(),
            method: method.name.clone(),
            source: e,
        })
    };

    let mut names: FxHashSet<String> = FxHashSet::default();
    let mut params = Vec::with_capacity(method.sig.params.len());
    for (idx, param) in method.sig.params.iter().enumerate() {
        let ty = TypePrinter::new(resolver, imports, local_path, scope)
            .render(&param.ty)
            .map_err(signature_err)?;
        let name = generate_name(&mut names, param.name.as_deref(), idx);
        params.push(ParamInfo { name, ty });
    }

    let mut results = Vec::with_capacity(method.sig.results.len());
    for res in &method.sig.results {
        let ty = TypePrinter::new(resolver, imports, local_path, scope)
            .render(res)
            .map_err(signature_err)?;
        results.push(ty);
    }

    Ok(MethodInfo {
        name: method.name.clone(),
        params,
        variadic: method.sig.variadic,
        results,
    })
}

/// Pick a parameter name: keep a given name, synthesize `param<idx>` for
/// anonymous or blank slots, and multiply the index by ten until the name
/// is unique within the method.
fn generate_name(names: &mut FxHashSet<String>, given: Option<&str>, idx: usize) -> String {
    let mut idx = idx;
    let mut name = match given {
        Some(n) if !n.is_empty() && n != "_" => n.to_string(),
        _ => format!("param{idx}"),
    };
    while names.contains(&name) {
        idx = if idx == 0 { 10 } else { idx * 10 };
        name = format!("param{idx}");
    }
    names.insert(name.clone());
    name
}

fn seed_imports(imports: &mut ImportTable, resolved: &ResolvedType) -> Result<(), Error> {
    let written = resolved.sym.pkg.as_deref().unwrap_or("");
    imports
        .seed(written, &resolved.orig_pkg_name, &resolved.pkg_path)
        .map_err(Error::ImportConflict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugSink;
    use crate::graph::builder::{iface_decl, method, param, GraphBuilder};
    use crate::graph::loader::StaticLoader;
    use crate::graph::TypeGraph;
    use crate::input::{ParsedInput, SymbolicType};
    use std::path::PathBuf;

    fn analyze_base(
        graph: &mut TypeGraph,
        local: PackageId,
        base: &str,
        exts: &[&str],
    ) -> Result<(Analysis, ResolvedInput), Error> {
        let mut loader = StaticLoader::new(local);
        let debug = DebugSink::disabled();
        let mut resolver = Resolver::new(graph, &mut loader, &debug);
        let input = ParsedInput {
            in_file: PathBuf::from("db.go"),
            out_file: PathBuf::from("out.go"),
            base_type: SymbolicType::parse(base).unwrap(),
            ext_types: exts.iter().map(|e| SymbolicType::parse(e).unwrap()).collect(),
            extra_fields: vec![],
            imports: vec![],
            prefix: "real".to_string(),
            new_func_name: "newX".to_string(),
        };
        let resolved = resolver.resolve_input(&input)?;
        let analysis = analyze(&mut resolver, &resolved, &input.imports)?;
        Ok((analysis, resolved))
    }

    fn driver_graph() -> (TypeGraph, PackageId) {
        let mut b = GraphBuilder::new();
        let driver = b.package("driver", "database/sql/driver");
        b.opaque(driver, "Stmt");
        b.iface(
            driver,
            "Conn",
            iface_decl(
                vec![],
                vec![
                    method(
                        "Prepare",
                        vec![param(Some("query"), TypeExpr::named("string"))],
                        vec![TypeExpr::named("Stmt"), TypeExpr::named("error")],
                    ),
                    method("Close", vec![], vec![TypeExpr::named("error")]),
                ],
            ),
        );
        b.iface(
            driver,
            "Pinger",
            iface_decl(
                vec![],
                vec![method("Ping", vec![], vec![TypeExpr::named("error")])],
            ),
        );
        let local = b.package("db", "example.com/db");
        b.import(local, None, "database/sql/driver");
        (b.finish(), local)
    }

    #[test]
    fn collects_methods_with_rendered_signatures() {
        let (mut graph, local) = driver_graph();
        let (analysis, resolved) =
            analyze_base(&mut graph, local, "driver.Conn", &["driver.Pinger"]).unwrap();

        assert_eq!(analysis.len(), 2);
        let conn = analysis.get(&QualifiedName::of(&resolved.base)).unwrap();
        assert_eq!(conn.methods.len(), 2);
        let prepare = &conn.methods[0];
        assert_eq!(prepare.name, "Prepare");
        assert_eq!(prepare.params[0].name, "query");
        assert_eq!(prepare.params[0].ty, "string");
        // Stmt is local to the driver package but foreign to the output.
        assert_eq!(prepare.results, vec!["driver.Stmt", "error"]);

        assert_eq!(
            analysis.imports.sorted(),
            vec![("database/sql/driver", None)]
        );
    }

    #[test]
    fn walks_embedded_closure_once() {
        let mut b = GraphBuilder::new();
        let p = b.package("p", "example.com/p");
        b.iface(
            p,
            "A",
            iface_decl(vec![], vec![method("MA", vec![], vec![])]),
        );
        b.iface(
            p,
            "B",
            iface_decl(
                vec![TypeExpr::named("A")],
                vec![method("MB", vec![], vec![])],
            ),
        );
        // C embeds A twice over: directly and through B.
        b.iface(
            p,
            "C",
            iface_decl(
                vec![TypeExpr::named("A"), TypeExpr::named("B")],
                vec![method("MC", vec![], vec![])],
            ),
        );
        let local = b.package("db", "example.com/db");
        b.import(local, None, "example.com/p");
        let mut graph = b.finish();

        let (analysis, resolved) = analyze_base(&mut graph, local, "p.C", &[]).unwrap();
        assert_eq!(analysis.len(), 3);
        let c = analysis.get(&QualifiedName::of(&resolved.base)).unwrap();
        assert_eq!(
            c.embedded,
            vec![
                QualifiedName::new("example.com/p", "A"),
                QualifiedName::new("example.com/p", "B"),
            ]
        );
        let b_info = analysis.get(&QualifiedName::new("example.com/p", "B")).unwrap();
        assert_eq!(b_info.embedded, vec![QualifiedName::new("example.com/p", "A")]);
    }

    #[test]
    fn mutually_embedding_interfaces_terminate() {
        let mut b = GraphBuilder::new();
        let p = b.package("p", "example.com/p");
        b.iface(
            p,
            "X",
            iface_decl(vec![TypeExpr::named("Y")], vec![method("MX", vec![], vec![])]),
        );
        b.iface(
            p,
            "Y",
            iface_decl(vec![TypeExpr::named("X")], vec![method("MY", vec![], vec![])]),
        );
        let local = b.package("db", "example.com/db");
        b.import(local, None, "example.com/p");
        let mut graph = b.finish();

        let (analysis, _) = analyze_base(&mut graph, local, "p.X", &[]).unwrap();
        assert_eq!(analysis.len(), 2);
    }

    #[test]
    fn embedded_universe_error_is_analyzed() {
        let mut b = GraphBuilder::new();
        let p = b.package("p", "example.com/p");
        b.iface(
            p,
            "Failer",
            iface_decl(vec![TypeExpr::named("error")], vec![]),
        );
        let local = b.package("db", "example.com/db");
        b.import(local, None, "example.com/p");
        let mut graph = b.finish();

        let (analysis, resolved) = analyze_base(&mut graph, local, "p.Failer", &[]).unwrap();
        let failer = analysis.get(&QualifiedName::of(&resolved.base)).unwrap();
        assert_eq!(failer.embedded, vec![QualifiedName::new("", "error")]);
        let error_info = analysis.get(&QualifiedName::new("", "error")).unwrap();
        assert_eq!(error_info.methods[0].name, "Error");
        assert_eq!(error_info.methods[0].results, vec!["string"]);
    }

    #[test]
    fn embedded_non_interface_fails() {
        let mut b = GraphBuilder::new();
        let p = b.package("p", "example.com/p");
        b.opaque(p, "NotIface");
        b.iface(
            p,
            "Bad",
            iface_decl(vec![TypeExpr::named("NotIface")], vec![]),
        );
        let local = b.package("db", "example.com/db");
        b.import(local, None, "example.com/p");
        let mut graph = b.finish();

        let err = analyze_base(&mut graph, local, "p.Bad", &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Analyze(AnalyzeError::NotNamedInterface { .. })
        ));
    }

    #[test]
    fn generated_parameter_names() {
        let mut names = FxHashSet::default();
        assert_eq!(generate_name(&mut names, Some("query"), 0), "query");
        assert_eq!(generate_name(&mut names, None, 1), "param1");
        // Blank parameters are anonymous: `_` cannot be forwarded.
        assert_eq!(generate_name(&mut names, Some("_"), 2), "param2");

        let mut names = FxHashSet::default();
        assert_eq!(generate_name(&mut names, Some("param1"), 0), "param1");
        // The synthesized name collides and climbs by a factor of ten.
        assert_eq!(generate_name(&mut names, None, 1), "param10");
    }

    #[test]
    fn variadic_method_is_recorded() {
        let mut b = GraphBuilder::new();
        let p = b.package("p", "example.com/p");
        b.iface(
            p,
            "Execer",
            iface_decl(
                vec![],
                vec![crate::graph::builder::variadic_method(
                    "Exec",
                    vec![
                        param(Some("query"), TypeExpr::named("string")),
                        param(Some("args"), TypeExpr::named("string")),
                    ],
                    vec![TypeExpr::named("error")],
                )],
            ),
        );
        let local = b.package("db", "example.com/db");
        b.import(local, None, "example.com/p");
        let mut graph = b.finish();

        let (analysis, resolved) = analyze_base(&mut graph, local, "p.Execer", &[]).unwrap();
        let execer = analysis.get(&QualifiedName::of(&resolved.base)).unwrap();
        assert!(execer.methods[0].variadic);
    }
}
