//! Diagnostics: user-facing reports built on resolution results.
//!
//! Resolvers answer `None` for names they cannot find and reserve errors for
//! ambiguity. This module is the layer that decides which of those outcomes
//! the user hears about, and it checks an environment for references that
//! can never resolve.

use std::sync::Arc;

use crate::base::{FileId, Location, TypeName};
use crate::env::{AliasDecl, Environment};

use super::{ConstantMap, ConstantTable, ResolveError};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message, optionally anchored to a source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub location: Option<Location>,
    pub related: Vec<RelatedInfo>,
}

/// A secondary location attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub location: Option<Location>,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, message)
    }

    fn new(severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            location: None,
            related: Vec::new(),
        }
    }

    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn file(&self) -> Option<FileId> {
        self.location.map(|location| location.file)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

pub mod codes {
    /// A constant name found no declaration.
    pub const UNRESOLVED_CONSTANT: &str = "E0001";
    /// Two distinct declarations tie for one constant name.
    pub const AMBIGUOUS_CONSTANT: &str = "E0002";
    /// A relative type name found no declaration.
    pub const UNRESOLVED_TYPE_NAME: &str = "E0003";
    /// A superclass or mixin that is not a declared class or module.
    pub const UNKNOWN_ANCESTOR: &str = "E0004";
    /// An alias whose chain never reaches a class or module.
    pub const DANGLING_ALIAS: &str = "E0005";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Accumulates diagnostics while a caller walks its references.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn unresolved_constant(&mut self, name: &str, location: Option<Location>) {
        self.add(
            Diagnostic::error(format!("uninitialized constant `{name}`"))
                .at(location)
                .with_code(codes::UNRESOLVED_CONSTANT),
        );
    }

    /// Report an ambiguity, with one related entry per candidate.
    pub fn ambiguous_constant(&mut self, error: &ResolveError, location: Option<Location>) {
        let ResolveError::AmbiguousConstant { candidates, .. } = error;

        let mut diag = Diagnostic::error(error.to_string())
            .at(location)
            .with_code(codes::AMBIGUOUS_CONSTANT);
        for candidate in candidates {
            diag = diag.with_related(RelatedInfo {
                location: candidate.location,
                message: Arc::from(format!("candidate: {}: {}", candidate.name, candidate.ty)),
            });
        }
        self.add(diag);
    }

    pub fn unresolved_type_name(&mut self, name: &TypeName, location: Option<Location>) {
        self.add(
            Diagnostic::error(format!("cannot resolve type name `{name}`"))
                .at(location)
                .with_code(codes::UNRESOLVED_TYPE_NAME),
        );
    }

    pub fn unknown_ancestor(
        &mut self,
        owner: &TypeName,
        ancestor: &TypeName,
        location: Option<Location>,
    ) {
        self.add(
            Diagnostic::error(format!("`{owner}` inherits or mixes in unknown module `{ancestor}`"))
                .at(location)
                .with_code(codes::UNKNOWN_ANCESTOR),
        );
    }

    pub fn dangling_alias(&mut self, alias: &AliasDecl) {
        self.add(
            Diagnostic::error(format!(
                "{} alias `{}` does not lead to a declaration (target `{}`)",
                alias.kind.as_str(),
                alias.name,
                alias.target
            ))
            .at(alias.location)
            .with_code(codes::DANGLING_ALIAS),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file() == Some(file)).collect()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

// ============================================================================
// ENVIRONMENT CHECKER
// ============================================================================

/// Reports references inside an environment that no query can resolve:
/// unknown superclasses and mixins, dangling aliases, and constant tables
/// holding ambiguous names.
pub struct EnvironmentChecker<'env> {
    env: &'env Environment,
    table: ConstantTable<'env>,
    collector: DiagnosticCollector,
}

impl<'env> EnvironmentChecker<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self {
            env,
            table: ConstantTable::new(env),
            collector: DiagnosticCollector::new(),
        }
    }

    pub fn check_all(&mut self) {
        self.check_ancestors();
        self.check_aliases();
        self.check_tables();
    }

    fn check_ancestors(&mut self) {
        let env = self.env;
        for name in env.module_names() {
            let Some(entry) = env.module_entry(name) else {
                continue;
            };
            let location = entry.locations.first().copied();
            let referenced = entry
                .super_class
                .iter()
                .chain(entry.mixins.iter().map(|mixin| mixin.module_name()));
            for ancestor in referenced {
                if env.normalize_module_name(ancestor).is_none() {
                    self.collector.unknown_ancestor(name, ancestor, location);
                }
            }
        }
    }

    fn check_aliases(&mut self) {
        let env = self.env;
        for name in env.alias_names() {
            if env.normalize_module_name(name).is_some() {
                continue;
            }
            if let Some(alias) = env.alias_decl(name) {
                self.collector.dangling_alias(alias);
            }
        }
    }

    fn check_tables(&mut self) {
        let toplevel = self.table.toplevel();
        self.check_table(&toplevel);
        let env = self.env;
        for name in env.module_names() {
            if let Some(children) = self.table.children(name) {
                self.check_table(&children);
            }
        }
    }

    fn check_table(&mut self, table: &ConstantMap) {
        for (name, candidates) in table.ambiguous() {
            let error = ResolveError::AmbiguousConstant {
                name: name.clone(),
                candidates: candidates.to_vec(),
            };
            self.collector
                .ambiguous_constant(&error, candidates.first().and_then(|c| c.location));
        }
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.collector.diagnostics
    }
}

/// Check an environment and return its diagnostics.
pub fn check_environment(env: &Environment) -> Vec<Diagnostic> {
    let mut checker = EnvironmentChecker::new(env);
    checker.check_all();
    checker.finish()
}
