//! Error types for dependency resolution

use crate::metadata::{TypeShape, TypeToken};
use thiserror::Error;

/// Errors that can occur during provide/bind/resolve operations.
///
/// Every message carries the fully qualified name of the type the caller
/// asked about, so failures several recursion levels deep are still
/// diagnosable from the top-level error text.
#[derive(Error, Debug)]
pub enum DiError {
    /// The same type + qualifier was provided twice
    #[error(
        "duplicate provision for {type_name} (qualifier {qualifier:?}): \
         already holds an instance of {existing}, rejected {incoming}"
    )]
    DuplicateProvision {
        type_name: &'static str,
        qualifier: Option<String>,
        existing: &'static str,
        incoming: &'static str,
    },

    /// The same abstraction was bound twice
    #[error(
        "duplicate binding for {abstraction}: already bound to {existing}, rejected {incoming}"
    )]
    DuplicateBinding {
        abstraction: &'static str,
        existing: &'static str,
        incoming: &'static str,
    },

    /// A data, enum, or array shaped type was requested as a resolution target
    #[error("{type_name} is not a resolvable type shape ({shape})")]
    InvalidTypeShape {
        type_name: &'static str,
        shape: TypeShape,
    },

    /// The concrete type is not marked injectable
    #[error("{type_name} is not marked injectable")]
    NotInjectable { type_name: &'static str },

    /// An abstract type has neither a binding nor a default implementation
    #[error("no implementation available for abstraction {type_name}")]
    UnresolvedAbstraction { type_name: &'static str },

    /// The type declares no usable constructor
    #[error("{type_name} has no usable constructor")]
    NotConstructible { type_name: &'static str },

    /// A recursive resolution failed while constructing this type
    #[error("dependencies of {type_name} could not be fulfilled: {source}")]
    UnmetDependency {
        type_name: &'static str,
        #[source]
        source: Box<DiError>,
    },

    /// A bound implementation does not declare the requested abstraction
    #[error("{implementation} does not declare abstraction {abstraction}")]
    ImplementationMismatch {
        abstraction: &'static str,
        implementation: &'static str,
    },

    /// A type-erased value did not downcast to the requested type
    #[error("stored value for {type_name} has a different concrete type")]
    TypeMismatch { type_name: &'static str },

    /// Internal error (descriptor/constructor disagreement)
    #[error("internal resolution error: {0}")]
    Internal(String),
}

impl DiError {
    /// Create an InvalidTypeShape error
    #[inline]
    pub(crate) fn invalid_shape(token: TypeToken, shape: TypeShape) -> Self {
        Self::InvalidTypeShape {
            type_name: token.name(),
            shape,
        }
    }

    /// Create a NotInjectable error
    #[inline]
    pub(crate) fn not_injectable(token: TypeToken) -> Self {
        Self::NotInjectable {
            type_name: token.name(),
        }
    }

    /// Create an UnresolvedAbstraction error
    #[inline]
    pub(crate) fn unresolved_abstraction(token: TypeToken) -> Self {
        Self::UnresolvedAbstraction {
            type_name: token.name(),
        }
    }

    /// Create a NotConstructible error
    #[inline]
    pub(crate) fn not_constructible(token: TypeToken) -> Self {
        Self::NotConstructible {
            type_name: token.name(),
        }
    }

    /// Wrap an inner resolution failure, naming the outer type
    #[inline]
    pub(crate) fn unmet_dependency(token: TypeToken, source: DiError) -> Self {
        Self::UnmetDependency {
            type_name: token.name(),
            source: Box::new(source),
        }
    }

    /// Create a TypeMismatch error
    #[inline]
    pub(crate) fn type_mismatch(token: TypeToken) -> Self {
        Self::TypeMismatch {
            type_name: token.name(),
        }
    }
}

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, DiError>;
