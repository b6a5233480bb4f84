//! Collision-free identifier allocation.
//!
//! A [`Scope`] is the symbol table of one generation unit (a file). It owns
//! the module imports of the file and the identifiers declared at file level.
//! A [`ChildScope`] covers a narrower namespace, such as one endpoint's
//! parameters: it sees the parent's import aliases but not its locals, and
//! delegates new imports to the parent so `use` statements stay file-level.
//!
//! Allocation is deterministic. A candidate is returned unchanged unless it
//! is a Rust keyword (it gets a trailing `_`) or already taken (a numeric
//! suffix starting at 2 is appended until the name is free).

use std::collections::{BTreeMap, HashSet};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sdkgen_ir::RUST_KEYWORDS;
use tracing::trace;

use crate::errors::GeneratorError;

/// Operations shared by file scopes and child scopes.
pub trait Namespace {
    /// Binds a module path and returns its alias. Repeated calls with the
    /// same path return the same alias.
    fn add_import(&mut self, path: &str) -> String;

    /// Binds a local identifier derived from `candidate` and returns it.
    fn add_local(&mut self, candidate: &str) -> String;

    /// Binds `name` exactly.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::NamingConflict` if `name` is already bound.
    fn reserve(&mut self, name: &str) -> Result<(), GeneratorError>;
}

/// The scope of one generated file.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    name: String,
    imports: BTreeMap<String, String>,
    aliases: HashSet<String>,
    locals: HashSet<String>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a child scope for one narrower namespace.
    pub fn child(&mut self, name: impl Into<String>) -> ChildScope<'_> {
        ChildScope {
            name: name.into(),
            parent: self,
            locals: HashSet::new(),
        }
    }

    /// The bound `(path, alias)` pairs, sorted by path.
    pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }

    /// Renders one `use` statement per bound import, sorted by path.
    ///
    /// The alias is omitted when it equals the path's last segment.
    pub fn use_statements(&self) -> TokenStream {
        let statements = self.imports().map(|(path, alias)| {
            let segments: Vec<_> = path.split("::").map(|s| format_ident!("{}", s)).collect();
            if path.rsplit("::").next() == Some(alias) {
                quote! { use #(#segments)::*; }
            } else {
                let alias = format_ident!("{}", alias);
                quote! { use #(#segments)::* as #alias; }
            }
        });
        quote! { #(#statements)* }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.aliases.contains(name) || self.locals.contains(name)
    }

    fn bind_import(&mut self, path: &str, extra_taken: &HashSet<String>) -> String {
        if let Some(alias) = self.imports.get(path) {
            return alias.clone();
        }
        let candidate = path.rsplit("::").next().unwrap_or(path);
        let alias = allocate(candidate, |n| self.is_bound(n) || extra_taken.contains(n));
        trace!(scope = %self.name, path, alias = %alias, "bound import");
        self.aliases.insert(alias.clone());
        self.imports.insert(path.to_string(), alias.clone());
        alias
    }
}

impl Namespace for Scope {
    fn add_import(&mut self, path: &str) -> String {
        self.bind_import(path, &HashSet::new())
    }

    fn add_local(&mut self, candidate: &str) -> String {
        let name = allocate(candidate, |n| self.is_bound(n));
        self.locals.insert(name.clone());
        name
    }

    fn reserve(&mut self, name: &str) -> Result<(), GeneratorError> {
        if self.is_bound(name) {
            return Err(GeneratorError::NamingConflict {
                scope: self.name.clone(),
                name: name.to_string(),
            });
        }
        self.locals.insert(name.to_string());
        Ok(())
    }
}

/// A nested scope borrowing its file scope.
#[derive(Debug)]
pub struct ChildScope<'a> {
    name: String,
    parent: &'a mut Scope,
    locals: HashSet<String>,
}

impl ChildScope<'_> {
    /// Binds a local value name even if a module alias of the file uses it.
    /// Values and modules live in separate namespaces, so the two coexist.
    pub fn shadow(&mut self, name: &str) {
        self.locals.insert(name.to_string());
    }

    fn is_bound(&self, name: &str) -> bool {
        self.locals.contains(name) || self.parent.aliases.contains(name)
    }
}

impl Namespace for ChildScope<'_> {
    fn add_import(&mut self, path: &str) -> String {
        self.parent.bind_import(path, &self.locals)
    }

    fn add_local(&mut self, candidate: &str) -> String {
        let name = allocate(candidate, |n| self.is_bound(n));
        self.locals.insert(name.clone());
        name
    }

    fn reserve(&mut self, name: &str) -> Result<(), GeneratorError> {
        if self.is_bound(name) {
            return Err(GeneratorError::NamingConflict {
                scope: self.name.clone(),
                name: name.to_string(),
            });
        }
        self.locals.insert(name.to_string());
        Ok(())
    }
}

/// Picks the first free name derived from `candidate`.
fn allocate(candidate: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let base = if RUST_KEYWORDS.contains(&candidate) {
        format!("{candidate}_")
    } else {
        candidate.to_string()
    };
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let name = format!("{base}{n}");
        if !is_taken(&name) {
            return name;
        }
        n += 1;
    }
}
