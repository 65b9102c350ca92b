//! Foundation types for the rubysig toolchain.
//!
//! This module provides fundamental types used throughout the resolver:
//! - [`TypeName`], [`Namespace`] - Absolute and relative qualified names
//! - [`ConstantPool`], [`ConstantId`] - Interning of simple name components
//! - [`FileId`], [`Location`] - Where a declaration came from
//!
//! This module has NO dependencies on other rubysig modules.

mod file_id;
mod intern;
mod name;
mod span;

pub use file_id::FileId;
pub use intern::{ConstantId, ConstantPool};
pub use name::{NameError, NameKind, Namespace, TypeName};
pub use span::{Location, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
