// src/analyze/printer.rs
//! Renders type expressions as Go source with package qualification,
//! recording every foreign package in the import table as a side effect.

use crate::analyze::imports::ImportTable;
use crate::errors::ResolveError;
use crate::frontend::{ChanDir, TypeExpr};
use crate::graph::PackageId;
use crate::resolve::Resolver;

/// Prints types as seen from the generated file.
///
/// `scope` is the package the expression was declared in; named leaves
/// resolve against it before falling back to the universe.
pub struct TypePrinter<'p, 'g> {
    resolver: &'p mut Resolver<'g>,
    imports: &'p mut ImportTable,
    local_path: &'p str,
    scope: Option<PackageId>,
}

impl<'p, 'g> TypePrinter<'p, 'g> {
    pub fn new(
        resolver: &'p mut Resolver<'g>,
        imports: &'p mut ImportTable,
        local_path: &'p str,
        scope: Option<PackageId>,
    ) -> Self {
        Self {
            resolver,
            imports,
            local_path,
            scope,
        }
    }

    pub fn render(&mut self, expr: &TypeExpr) -> Result<String, ResolveError> {
        match expr {
            TypeExpr::Named { pkg, name } => self.render_named(pkg.as_deref(), name),
            TypeExpr::Pointer(elem) => Ok(format!("*{}", self.render(elem)?)),
            TypeExpr::Array { len, elem } => Ok(format!("[{len}]{}", self.render(elem)?)),
            TypeExpr::Slice(elem) => Ok(format!("[]{}", self.render(elem)?)),
            TypeExpr::Map { key, value } => Ok(format!(
                "map[{}]{}",
                self.render(key)?,
                self.render(value)?
            )),
            TypeExpr::Chan { dir, elem } => {
                let elem_str = self.render(elem)?;
                Ok(match dir {
                    ChanDir::Both => {
                        // A receive-only element must be parenthesised or
                        // the arrow would bind to the outer channel.
                        if matches!(
                            elem.as_ref(),
                            TypeExpr::Chan {
                                dir: ChanDir::Recv,
                                ..
                            }
                        ) {
                            format!("chan ({elem_str})")
                        } else {
                            format!("chan {elem_str}")
                        }
                    }
                    ChanDir::Recv => format!("<-chan {elem_str}"),
                    ChanDir::Send => format!("chan<- {elem_str}"),
                })
            }
            TypeExpr::Func(sig) => {
                let mut params = Vec::with_capacity(sig.params.len());
                for (idx, param) in sig.params.iter().enumerate() {
                    let mut ty = self.render(&param.ty)?;
                    if sig.variadic && idx == sig.params.len() - 1 {
                        ty = format!("...{ty}");
                    }
                    params.push(ty);
                }
                let mut out = format!("func({})", params.join(", "));
                match sig.results.len() {
                    0 => {}
                    1 => {
                        out.push(' ');
                        out.push_str(&self.render(&sig.results[0])?);
                    }
                    _ => {
                        let mut results = Vec::with_capacity(sig.results.len());
                        for res in &sig.results {
                            results.push(self.render(res)?);
                        }
                        out.push_str(&format!(" ({})", results.join(", ")));
                    }
                }
                Ok(out)
            }
        }
    }

    fn render_named(&mut self, pkg: Option<&str>, name: &str) -> Result<String, ResolveError> {
        let entity = self.resolver.resolve_ref(self.scope, pkg, name)?;
        let location = {
            let graph = self.resolver.graph();
            graph.entity(entity).package.map(|p| {
                let data = graph.package(p);
                (data.path.clone(), data.name.clone())
            })
        };
        match location {
            // Universe types print bare.
            None => Ok(name.to_string()),
            Some((path, _)) if path == self.local_path => Ok(name.to_string()),
            Some((path, declared)) => {
                let qualifier = self.imports.probe(&path, &declared);
                Ok(format!("{qualifier}.{name}"))
            }
        }
    }
}
