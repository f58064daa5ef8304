//! jsoncomp Registries
//!
//! Named generators and matcher factories used by the `!gen` and `!match`
//! markers of a composed document.
//!
//! # Core Types
//!
//! - [`Arguments`]: positional and keyword call arguments with typed binding
//! - [`GeneratorRegistry`]: name → [`Generator`], run inside a
//!   [`GenerationSession`] that caches tagged identities
//! - [`MatcherRegistry`]: name → [`MatcherFactory`] building immutable
//!   [`Matcher`](jsoncomp_document::Matcher) objects
//!
//! # Example
//!
//! ```rust
//! use jsoncomp_registry::{Arguments, GenerationSession, GeneratorRegistry, MatcherRegistry};
//! use jsoncomp_document::{Matcher, Value};
//!
//! let generators = GeneratorRegistry::with_defaults();
//! let mut session = GenerationSession::seeded(7);
//! let args = Arguments::new("Integer").with_arg("min", 1).with_arg("max", 6);
//! let a = generators.generate("Integer", &args, Some("roll"), &mut session).unwrap();
//! let b = generators.generate("Integer", &args, Some("roll"), &mut session).unwrap();
//! assert_eq!(a, b);
//!
//! let matchers = MatcherRegistry::with_defaults();
//! let any_text = matchers.build("AnyText", &Arguments::new("AnyText")).unwrap();
//! assert!(any_text.matches(&Value::from("hello")));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod arguments;
pub mod error;
pub mod generator;
pub mod generators;
pub mod matcher;
pub mod matchers;

pub use arguments::Arguments;
pub use error::RegistryError;
pub use generator::{GenerationSession, Generator, GeneratorRegistry, GeneratorRng};
pub use matcher::{MatcherFactory, MatcherRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for registry users
    pub use crate::arguments::Arguments;
    pub use crate::error::RegistryError;
    pub use crate::generator::{GenerationSession, Generator, GeneratorRegistry, GeneratorRng};
    pub use crate::matcher::{MatcherFactory, MatcherRegistry};
}
