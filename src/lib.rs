//! # rubysig-base
//!
//! Core library for Ruby signature environments: qualified names, constant
//! tables and name resolution.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! resolve → Constant and type name resolution, diagnostics
//!   ↓
//! env     → Declarations, environment, ancestor linearization
//!   ↓
//! base    → Primitives (TypeName, Namespace, FileId, name interning)
//! ```
//!
//! Parsing signature files and building the [`Environment`] from them is
//! left to callers; this crate starts from declarations.

// ============================================================================
// MODULES
// ============================================================================

/// Foundation types: names, locations, interning
pub mod base;

/// The declaration environment and ancestor computation
pub mod env;

/// Resolvers over a built environment
pub mod resolve;

// Re-export commonly needed items
pub use base::{FileId, Location, Namespace, TypeName};
pub use env::{Declaration, Environment, EnvironmentError};
pub use resolve::{Constant, ConstantResolver, Context, ResolveError, TypeNameResolver};
