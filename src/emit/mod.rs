// src/emit/mod.rs
//! Emits the generated Go source: one wrapper interface/struct pair per
//! extension subset, satisfaction assertions, forwarding method
//! implementations, and the dispatch constructor.
//!
//! The body sections are buffered first; the header, package clause and
//! import block are composed in front of them at the end, once rendering
//! has finished populating the import table.

pub mod combgen;

use rustc_hash::FxHashSet;

use crate::analyze::{Analysis, MethodInfo, QualifiedName};
use crate::errors::{bug, Error};
use crate::input::ParsedInput;
use crate::resolve::ResolvedInput;

pub use combgen::{n_subsets, SubsetGen};

pub struct Emitter<'a> {
    resolved: &'a ResolvedInput,
    analysis: &'a Analysis,
    input: &'a ParsedInput,
}

impl<'a> Emitter<'a> {
    pub fn new(resolved: &'a ResolvedInput, analysis: &'a Analysis, input: &'a ParsedInput) -> Self {
        Self {
            resolved,
            analysis,
            input,
        }
    }

    /// Render the complete output file. `header_args` is the argument
    /// line reproduced in the DO-NOT-EDIT header.
    pub fn render(&self, header_args: &str) -> Result<String, Error> {
        let mut sections = Vec::with_capacity(4);

        let mut types = String::new();
        self.write_types(&mut types);
        sections.push(types);

        let mut vars = String::new();
        self.write_vars(&mut vars);
        sections.push(vars);

        let mut impls = String::new();
        self.write_impls(&mut impls)?;
        if !impls.is_empty() {
            sections.push(impls);
        }

        let mut ctor = String::new();
        self.write_new_func(&mut ctor);
        sections.push(ctor);

        let mut out = String::new();
        out.push_str(&format!(
            "// Code generated by \"wrapgen {header_args}\"; DO NOT EDIT.\n"
        ));
        out.push('\n');
        out.push_str(&format!("package {}\n", self.resolved.local_name));
        out.push('\n');
        if !self.analysis.imports.is_empty() {
            self.write_imports(&mut out);
            out.push('\n');
        }
        out.push_str(&sections.join("\n"));
        Ok(out)
    }

    fn base_name_no_dot(&self) -> String {
        self.resolved.base.sym.no_dot()
    }

    /// The `iB<k>`/`tB<k>` pairs, one per subset.
    fn write_types(&self, buf: &mut String) {
        let en = self.base_name_no_dot();
        buf.push_str("type (\n");
        let mut gen = SubsetGen::new(self.resolved.exts.len());
        let mut counter = 0u64;
        while gen.advance() {
            let tbn = format!("{en}{counter}");
            if counter > 0 {
                buf.push('\n');
            }
            buf.push_str(&format!(
                "\ti{tbn} interface {{\n\t\t{}\n",
                self.resolved.base.sym
            ));
            for idx in gen.indices() {
                buf.push_str(&format!("\t\t{}\n", self.resolved.exts[*idx].sym));
            }
            buf.push_str(&format!("\t}}\n\n\tt{tbn} struct {{\n\t\tr i{tbn}\n"));
            for field in &self.input.extra_fields {
                buf.push_str(&format!("\t\t{} {}\n", field.name, field.type_str));
            }
            buf.push_str("\t}\n");
            counter += 1;
        }
        buf.push_str(")\n");
    }

    /// Static assertions that each wrapper satisfies its subset.
    fn write_vars(&self, buf: &mut String) {
        let en = self.base_name_no_dot();
        buf.push_str("var (\n");
        let mut gen = SubsetGen::new(self.resolved.exts.len());
        let mut counter = 0u64;
        while gen.advance() {
            let tbn = format!("{en}{counter}");
            buf.push_str(&format!(
                "\t_ {} = &t{tbn}{{}}\n",
                self.resolved.base.sym
            ));
            for idx in gen.indices() {
                buf.push_str(&format!(
                    "\t_ {} = &t{tbn}{{}}\n",
                    self.resolved.exts[*idx].sym
                ));
            }
            counter += 1;
        }
        buf.push_str(")\n");
    }

    /// Forwarding implementations, one group per subset: a depth-first
    /// walk of the embedding closure rooted at the base, then at each
    /// chosen extension, with one shared dedup accumulator per subset.
    fn write_impls(&self, buf: &mut String) -> Result<(), Error> {
        let en = self.base_name_no_dot();
        let base_q = QualifiedName::of(&self.resolved.base);
        let ext_qs: Vec<QualifiedName> =
            self.resolved.exts.iter().map(QualifiedName::of).collect();

        let mut gen = SubsetGen::new(self.resolved.exts.len());
        let mut counter = 0u64;
        let mut first = true;
        while gen.advance() {
            if first {
                first = false;
            } else {
                buf.push('\n');
            }
            let tbn = format!("{en}{counter}");
            let mut excludes: FxHashSet<QualifiedName> = FxHashSet::default();
            let mut emitted: FxHashSet<String> = FxHashSet::default();
            self.write_iface_impls(buf, &base_q, &tbn, &mut excludes, &mut emitted)?;
            for idx in gen.indices() {
                self.write_iface_impls(buf, &ext_qs[*idx], &tbn, &mut excludes, &mut emitted)?;
            }
            counter += 1;
        }
        Ok(())
    }

    fn write_iface_impls(
        &self,
        buf: &mut String,
        name: &QualifiedName,
        tbn: &str,
        excludes: &mut FxHashSet<QualifiedName>,
        emitted: &mut FxHashSet<String>,
    ) -> Result<(), Error> {
        if !excludes.insert(name.clone()) {
            return Ok(());
        }
        let info = self
            .analysis
            .get(name)
            .ok_or_else(|| bug(format!("no interface info for {name}")))?;
        for emb in &info.embedded {
            self.write_iface_impls(buf, emb, tbn, excludes, emitted)?;
        }
        for method in &info.methods {
            // An identical method may arrive through several embedding
            // paths; it must be implemented once per wrapper.
            if !emitted.insert(method.name.clone()) {
                continue;
            }
            self.write_method(buf, tbn, method);
        }
        Ok(())
    }

    fn write_method(&self, buf: &mut String, tbn: &str, method: &MethodInfo) {
        let recv = format!("o{tbn}");
        buf.push_str(&format!(
            "func ({recv} *t{tbn}) {}({})",
            method.name,
            declare_params(method)
        ));
        match method.results.len() {
            0 => {}
            1 => buf.push_str(&format!(" {}", method.results[0])),
            _ => buf.push_str(&format!(" ({})", method.results.join(", "))),
        }
        buf.push_str(" {\n\t");
        if !method.results.is_empty() {
            buf.push_str("return ");
        }
        buf.push_str(&format!("{}{}({recv}.r", self.input.prefix, method.name));
        for field in &self.input.extra_fields {
            buf.push_str(&format!(", {recv}.{}", field.name));
        }
        for (idx, param) in method.params.iter().enumerate() {
            buf.push_str(&format!(", {}", param.name));
            if method.variadic && idx == method.params.len() - 1 {
                buf.push_str("...");
            }
        }
        buf.push_str(")\n}\n");
    }

    /// The dispatch constructor: a type switch from the largest subset
    /// down to 1 so maximal extension sets win, then the plain wrapper.
    fn write_new_func(&self, buf: &mut String) {
        let base = &self.resolved.base.sym;
        let en = self.base_name_no_dot();
        let var_name = format!("{}{}", self.input.prefix, base.name);
        buf.push_str(&format!(
            "func {}({var_name} {base}",
            self.input.new_func_name
        ));
        for field in &self.input.extra_fields {
            buf.push_str(&format!(", {} {}", field.name, field.type_str));
        }
        buf.push_str(&format!(") {base} {{\n"));
        let ncomb = n_subsets(self.resolved.exts.len());
        if ncomb > 1 {
            buf.push_str(&format!("\tswitch r := {var_name}.(type) {{\n"));
            for counter in (1..ncomb).rev() {
                let tbn = format!("{en}{counter}");
                buf.push_str(&format!(
                    "\tcase i{tbn}:\n\t\treturn &t{tbn}{{\n\t\t\tr: r,\n"
                ));
                for field in &self.input.extra_fields {
                    buf.push_str(&format!("\t\t\t{}: {},\n", field.name, field.name));
                }
                buf.push_str("\t\t}\n");
            }
            buf.push_str("\t}\n");
        }
        buf.push_str(&format!("\treturn &t{en}0{{\n\t\tr: {var_name},\n"));
        for field in &self.input.extra_fields {
            buf.push_str(&format!("\t\t{}: {},\n", field.name, field.name));
        }
        buf.push_str("\t}\n}\n");
    }

    /// The import block, ascending by path.
    fn write_imports(&self, buf: &mut String) {
        buf.push_str("import (\n");
        for (path, alias) in self.analysis.imports.sorted() {
            match alias {
                Some(alias) => buf.push_str(&format!("\t{alias} \"{path}\"\n")),
                None => buf.push_str(&format!("\t\"{path}\"\n")),
            }
        }
        buf.push_str(")\n");
    }
}

/// `name type` pairs for a method declaration, `...` on a variadic tail.
fn declare_params(method: &MethodInfo) -> String {
    let mut parts = Vec::with_capacity(method.params.len());
    for (idx, param) in method.params.iter().enumerate() {
        let variadic = method.variadic && idx == method.params.len() - 1;
        let marker = if variadic { "..." } else { "" };
        parts.push(format!("{} {marker}{}", param.name, param.ty));
    }
    parts.join(", ")
}
