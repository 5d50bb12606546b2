//! # yara-helpers
//!
//! Rule enumeration helpers over compiled [YARA](https://github.com/VirusTotal/yara)
//! rulesets, with a version-guarded C shim for binding layers.
//!
//! The core is engine independent: [`ruleset::enumerate`] copies at most
//! `capacity` rule handles into a caller-supplied buffer, truncating
//! silently, and [`ruleset::count`] reports the total so callers can size
//! the buffer first.
//!
//! ```rust
//! use yara_helpers::ruleset::{self, Ruleset};
//!
//! struct Names(&'static [&'static str]);
//!
//! impl Ruleset for Names {
//!     type Rule = &'static str;
//!     type Iter<'r> = std::iter::Copied<std::slice::Iter<'static, &'static str>>;
//!
//!     fn rules(&self) -> Self::Iter<'_> {
//!         self.0.iter().copied()
//!     }
//! }
//!
//! let names = Names(&["a", "b", "c"]);
//! let mut buf = vec![""; ruleset::count(&names)];
//! let cap = buf.len();
//! assert_eq!(ruleset::enumerate(&names, &mut buf, cap), 3);
//! assert_eq!(buf, ["a", "b", "c"]);
//! ```
//!
//! ## libyara
//!
//! With the `ffi` feature the crate links libyara 4.x and also wraps rule
//! compilation, memory and file scans, and ruleset persistence. The build
//! script reads `yara/libyara.h` and refuses to build against a major
//! version below 4; a newer major builds with a warning. Point
//! `YARA_INCLUDE_DIR` and `YARA_LIBRARY_PATH` at a non-standard
//! installation.
//!
//! ```rust,ignore
//! use yara_helpers::prelude::*;
//!
//! let mut compiler = Compiler::new()?;
//! compiler.add_rules_str("rule one { condition: true } rule two { condition: false }")?;
//! let rules = compiler.compile_rules()?;
//!
//! let mut out: [Option<Rule>; 1] = [None];
//! assert_eq!(rules.enumerate(&mut out, 1), 1);
//! assert_eq!(rules.count(), 2);
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`ruleset`] | `Ruleset` trait, `enumerate` and `count` |
//! | [`version`] | Header version parsing and the version guard |
//! | [`error`] | libyara status codes and crate errors |
//! | [`flags`] | Rule and scan flag bits |
//! | `ffi` | Raw libyara and cursor shim declarations (`ffi`) |
//! | `rules` | Owned and borrowed rulesets, scanning, rule introspection (`ffi`) |
//! | `compiler` | Rule compiler (`ffi`) |
//! | `config` | Process-wide libyara settings (`ffi`) |
//! | `capi` | `yrh_get_rules` / `yrh_get_num_rules` C exports (`ffi`) |

pub mod error;
pub mod flags;
pub mod prelude;
pub mod ruleset;
pub mod version;

#[cfg(feature = "ffi")]
pub mod capi;
#[cfg(feature = "ffi")]
pub mod compiler;
#[cfg(feature = "ffi")]
pub mod config;
#[cfg(feature = "ffi")]
pub mod ffi;
#[cfg(feature = "ffi")]
pub mod initialize;
#[cfg(feature = "ffi")]
pub mod rules;
#[cfg(feature = "ffi")]
mod scan;
#[cfg(feature = "ffi")]
mod stream;

pub use error::{CompileError, CompileErrorLevel, CompileErrors, Error, YaraError};
pub use flags::{RuleFlags, ScanFlags};
pub use ruleset::Ruleset;
pub use version::Version;

#[cfg(feature = "ffi")]
pub use compiler::{Compiler, CompilerVariableValue};
#[cfg(feature = "ffi")]
pub use initialize::InitializationToken;
#[cfg(feature = "ffi")]
pub use rules::{Metadata, MetadataValue, Rule, RuleIter, Rules, RulesRef};

/// Version of the libyara headers this crate was built against.
#[cfg(feature = "ffi")]
pub const HEADER_VERSION: Version = include!(concat!(env!("OUT_DIR"), "/yara_version.rs"));
