//! # Wirebox - Scoped Dependency Resolution for Rust
//!
//! A runtime dependency-resolution container: given a target type (and an
//! optional qualifier name), it produces a fully constructed instance by
//! recursively satisfying the type's declared dependencies, honoring
//! singleton caching, explicit and default abstraction bindings, and
//! externally provided instances.
//!
//! ## How it fits together
//!
//! - A [`DescriptorRegistry`] holds one [`TypeDescriptor`] per participating
//!   type: its shape, injectable/singleton markers, ordered constructor
//!   parameters (each with an optional qualifier), declared abstractions,
//!   and an optional default implementation. All metadata is declared
//!   explicitly at startup; nothing is derived from the types themselves.
//! - A [`ScopeRegistry`] hands out one [`Container`] per [`ScopeKey`],
//!   created lazily and kept for the registry's lifetime.
//! - A [`Container`] owns a singleton cache and a binding table, and
//!   resolves requests by depth-first recursion over constructor
//!   parameters.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{DescriptorRegistry, ScopeKey, ScopeRegistry, TypeDescriptor};
//!
//! struct Greeter {
//!     message: String,
//! }
//!
//! let metadata = Arc::new(DescriptorRegistry::new());
//! metadata.register(
//!     TypeDescriptor::concrete::<Greeter>()
//!         .injectable()
//!         .named_param::<String>("greeting")
//!         .constructor(|args| {
//!             Ok(Greeter {
//!                 message: args.take_owned()?,
//!             })
//!         }),
//! );
//!
//! struct AppScope;
//!
//! let scopes = ScopeRegistry::new(metadata);
//! let container = scopes.get(ScopeKey::of::<AppScope>());
//!
//! container.provide_named("hello".to_string(), "greeting").unwrap();
//!
//! let greeter = container.resolve::<Greeter>().unwrap();
//! assert_eq!(greeter.message, "hello");
//! ```
//!
//! ## Abstractions
//!
//! Abstractions are ordinary types, typically `Arc<dyn Trait>`. A concrete
//! type declares the abstractions it implements; an abstraction resolves
//! through an explicit [`Container::bind`] or its declared default
//! implementation.
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{Container, DescriptorRegistry, TypeDescriptor};
//!
//! trait Notifier: Send + Sync {
//!     fn channel(&self) -> &'static str;
//! }
//!
//! struct EmailNotifier;
//!
//! impl Notifier for EmailNotifier {
//!     fn channel(&self) -> &'static str {
//!         "email"
//!     }
//! }
//!
//! let metadata = Arc::new(DescriptorRegistry::new());
//! metadata.register(
//!     TypeDescriptor::abstraction::<Arc<dyn Notifier>>()
//!         .default_implementation::<EmailNotifier>(),
//! );
//! metadata.register(
//!     TypeDescriptor::concrete::<EmailNotifier>()
//!         .injectable()
//!         .constructor(|_| Ok(EmailNotifier))
//!         .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
//! );
//!
//! let container = Container::new(metadata);
//! let notifier = container.resolve::<Arc<dyn Notifier>>().unwrap();
//! assert_eq!(notifier.channel(), "email");
//! ```
//!
//! ## Limits
//!
//! Resolution is synchronous, depth-first recursion with no cycle guard:
//! an unbroken circular dependency exhausts the call stack rather than
//! producing a diagnosed cycle error. All container state is concurrency
//! safe; duplicate detection uses atomic compare-and-insert, and when two
//! threads race to compute the same singleton the first stored instance
//! wins.

mod cache;
mod container;
mod error;
mod inject;
#[cfg(feature = "logging")]
pub mod logging;
mod metadata;
mod scope;

pub use container::Container;
pub use error::{DiError, Result};
pub use metadata::{
    DescriptorBuilder, DescriptorRegistry, ParamSpec, ResolvedArgs, TypeDescriptor, TypeShape,
    TypeToken,
};
pub use scope::{ScopeKey, ScopeRegistry};

// Re-export tracing macros for convenience when logging is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Container, DescriptorRegistry, DiError, Result, ScopeKey, ScopeRegistry, TypeDescriptor,
        TypeShape, TypeToken,
    };
    pub use std::sync::Arc;
}
