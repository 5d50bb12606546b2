// prelude.rs - Convenient re-exports for the common API.
//
//! # Prelude
//!
//! ```
//! use yara_helpers::prelude::*;
//!
//! let rules = [1u8, 2, 3];
//! struct Slice<'s>(&'s [u8]);
//! impl Ruleset for Slice<'_> {
//!     type Rule = u8;
//!     type Iter<'r> = std::iter::Copied<std::slice::Iter<'r, u8>> where Self: 'r;
//!     fn rules(&self) -> Self::Iter<'_> {
//!         self.0.iter().copied()
//!     }
//! }
//! assert_eq!(count(&Slice(&rules)), 3);
//! ```

pub use crate::error::{CompileErrors, Error, YaraError};
pub use crate::flags::ScanFlags;
pub use crate::ruleset::{count, enumerate, Ruleset};

#[cfg(feature = "ffi")]
pub use crate::compiler::Compiler;
#[cfg(feature = "ffi")]
pub use crate::rules::{Metadata, MetadataValue, Rule, Rules, RulesRef};
