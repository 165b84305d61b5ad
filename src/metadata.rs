//! Type descriptors and the descriptor registry
//!
//! The registry is the metadata collaborator of the resolver: per type it
//! answers whether the type is injectable, whether it is a singleton, what
//! its ordered constructor parameters are (each with an optional qualifier
//! name), and whether it declares a default implementation. Nothing is
//! derived from the types themselves; every participating type is declared
//! explicitly through [`TypeDescriptor`] builders at startup.

use crate::{DiError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// Copyable identity of a type: its `TypeId` plus the fully qualified name.
///
/// Equality and hashing use the `TypeId` only; the name rides along for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    /// Token for a static type.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeToken {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl std::hash::Hash for TypeToken {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for TypeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural shape of a declared type.
///
/// Only `Concrete` and `Abstract` are valid resolution targets; data, enum,
/// and array shapes are rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeShape {
    /// Plain constructible type
    #[default]
    Concrete,
    /// Trait object or other abstraction requiring an implementation
    Abstract,
    /// Value/record type
    Data,
    /// Enumeration
    Enum,
    /// Array or collection shape
    Array,
}

impl TypeShape {
    /// Whether the shape is a valid resolution target.
    #[inline]
    pub fn is_resolvable(self) -> bool {
        matches!(self, TypeShape::Concrete | TypeShape::Abstract)
    }
}

impl std::fmt::Display for TypeShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeShape::Concrete => "concrete",
            TypeShape::Abstract => "abstract",
            TypeShape::Data => "data",
            TypeShape::Enum => "enum",
            TypeShape::Array => "array",
        };
        f.write_str(s)
    }
}

/// One constructor parameter: its type plus an optional qualifier name.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub(crate) token: TypeToken,
    pub(crate) qualifier: Option<String>,
}

impl ParamSpec {
    /// The parameter's type token.
    #[inline]
    pub fn token(&self) -> TypeToken {
        self.token
    }

    /// The parameter's qualifier name, if any.
    #[inline]
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

/// Ordered, type-erased constructor arguments.
///
/// Constructor closures consume this front to back, one `take` per declared
/// parameter, in declaration order.
pub struct ResolvedArgs {
    values: std::vec::IntoIter<Arc<dyn Any + Send + Sync>>,
}

impl ResolvedArgs {
    #[inline]
    pub(crate) fn new(values: Vec<Arc<dyn Any + Send + Sync>>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Take the next argument as `Arc<P>`.
    pub fn take<P: Send + Sync + 'static>(&mut self) -> Result<Arc<P>> {
        let value = self.values.next().ok_or_else(|| {
            DiError::Internal(format!(
                "constructor consumed more arguments than declared (next wanted {})",
                type_name::<P>()
            ))
        })?;
        value
            .downcast::<P>()
            .map_err(|_| DiError::type_mismatch(TypeToken::of::<P>()))
    }

    /// Take the next argument as an owned clone.
    pub fn take_owned<P: Clone + Send + Sync + 'static>(&mut self) -> Result<P> {
        Ok(self.take::<P>()?.as_ref().clone())
    }
}

/// Type-erased constructor: resolved arguments in, erased instance out.
type ConstructFn = Arc<dyn Fn(ResolvedArgs) -> Result<Arc<dyn Any + Send + Sync>> + Send + Sync>;

/// Checked conversion from an erased concrete instance to an erased
/// abstraction representation.
type UpcastFn =
    Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Result<Arc<dyn Any + Send + Sync>> + Send + Sync>;

/// Checked field assignment for legacy field injection.
type AssignFn = Arc<dyn Fn(&mut dyn Any, Arc<dyn Any + Send + Sync>) -> Result<()> + Send + Sync>;

/// An abstraction a concrete type declares it implements, with the
/// conversion used when the type is provided or resolved through that
/// abstraction.
pub(crate) struct AbstractionLink {
    pub(crate) token: TypeToken,
    pub(crate) upcast: UpcastFn,
}

/// A field eligible for legacy injection.
pub(crate) struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) token: TypeToken,
    pub(crate) qualifier: Option<String>,
    pub(crate) assign: AssignFn,
}

/// Everything the resolver needs to know about one type.
pub struct TypeDescriptor {
    token: TypeToken,
    shape: TypeShape,
    injectable: bool,
    singleton: bool,
    params: Vec<ParamSpec>,
    construct: Option<ConstructFn>,
    default_impl: Option<TypeToken>,
    links: Vec<AbstractionLink>,
    fields: Vec<FieldSpec>,
}

impl TypeDescriptor {
    /// Start a descriptor for a plain constructible type.
    #[inline]
    pub fn concrete<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new(TypeShape::Concrete)
    }

    /// Start a descriptor for an abstraction (typically an `Arc<dyn Trait>`).
    #[inline]
    pub fn abstraction<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new(TypeShape::Abstract)
    }

    /// Start a descriptor for a value/record type.
    #[inline]
    pub fn data<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new(TypeShape::Data)
    }

    /// Start a descriptor for an enumeration.
    #[inline]
    pub fn enumeration<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new(TypeShape::Enum)
    }

    /// Start a descriptor for an array/collection shape.
    #[inline]
    pub fn array<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new(TypeShape::Array)
    }

    /// The described type.
    #[inline]
    pub fn token(&self) -> TypeToken {
        self.token
    }

    /// The declared shape.
    #[inline]
    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    /// Whether the type is marked injectable.
    #[inline]
    pub fn is_injectable(&self) -> bool {
        self.injectable
    }

    /// Whether the type is marked singleton.
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// Ordered constructor parameters.
    #[inline]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Declared default implementation, if any.
    #[inline]
    pub fn default_implementation(&self) -> Option<TypeToken> {
        self.default_impl
    }

    #[inline]
    pub(crate) fn constructor(&self) -> Option<&ConstructFn> {
        self.construct.as_ref()
    }

    #[inline]
    pub(crate) fn links(&self) -> &[AbstractionLink] {
        &self.links
    }

    #[inline]
    pub(crate) fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Convert an erased instance of this type into the representation
    /// stored for `abstraction`. Fails if the type never declared it.
    pub(crate) fn upcast_to(
        &self,
        abstraction: TypeToken,
        instance: Arc<dyn Any + Send + Sync>,
    ) -> Result<Arc<dyn Any + Send + Sync>> {
        let link = self
            .links
            .iter()
            .find(|link| link.token == abstraction)
            .ok_or(DiError::ImplementationMismatch {
                abstraction: abstraction.name(),
                implementation: self.token.name(),
            })?;
        (link.upcast)(instance)
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("token", &self.token.name())
            .field("shape", &self.shape)
            .field("injectable", &self.injectable)
            .field("singleton", &self.singleton)
            .field("params", &self.params.len())
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Fluent builder for a [`TypeDescriptor`].
///
/// The type parameter keeps the constructor, upcast, and field closures
/// honest; the finished descriptor is type-erased.
pub struct DescriptorBuilder<T> {
    inner: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    fn new(shape: TypeShape) -> Self {
        Self {
            inner: TypeDescriptor {
                token: TypeToken::of::<T>(),
                shape,
                injectable: false,
                singleton: false,
                params: Vec::new(),
                construct: None,
                default_impl: None,
                links: Vec::new(),
                fields: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Mark the type injectable.
    #[inline]
    pub fn injectable(mut self) -> Self {
        self.inner.injectable = true;
        self
    }

    /// Mark the type a singleton (one instance per scope per qualifier).
    #[inline]
    pub fn singleton(mut self) -> Self {
        self.inner.singleton = true;
        self
    }

    /// Declare an unqualified constructor parameter.
    #[inline]
    pub fn param<P: Send + Sync + 'static>(mut self) -> Self {
        self.inner.params.push(ParamSpec {
            token: TypeToken::of::<P>(),
            qualifier: None,
        });
        self
    }

    /// Declare a qualified constructor parameter.
    #[inline]
    pub fn named_param<P: Send + Sync + 'static>(mut self, qualifier: &str) -> Self {
        self.inner.params.push(ParamSpec {
            token: TypeToken::of::<P>(),
            qualifier: Some(qualifier.to_owned()),
        });
        self
    }

    /// Declare the constructor. It receives the resolved arguments in
    /// parameter declaration order.
    pub fn constructor<F>(mut self, construct: F) -> Self
    where
        F: Fn(&mut ResolvedArgs) -> Result<T> + Send + Sync + 'static,
    {
        let erased: ConstructFn = Arc::new(move |mut args: ResolvedArgs| {
            let instance = construct(&mut args)?;
            Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
        });
        self.inner.construct = Some(erased);
        self
    }

    /// Declare that this concrete type implements abstraction `A`.
    ///
    /// The conversion is applied when an instance is provided or resolved
    /// through `A`, so `A` is typically `Arc<dyn Trait>` and the closure a
    /// plain unsizing cast.
    pub fn implements<A, F>(mut self, upcast: F) -> Self
    where
        A: Send + Sync + 'static,
        F: Fn(Arc<T>) -> A + Send + Sync + 'static,
    {
        let concrete = self.inner.token;
        let erased: UpcastFn = Arc::new(move |instance: Arc<dyn Any + Send + Sync>| {
            let typed = instance
                .downcast::<T>()
                .map_err(|_| DiError::type_mismatch(concrete))?;
            Ok(Arc::new(upcast(typed)) as Arc<dyn Any + Send + Sync>)
        });
        self.inner.links.push(AbstractionLink {
            token: TypeToken::of::<A>(),
            upcast: erased,
        });
        self
    }

    /// Declare the default implementation of this abstraction, used when no
    /// explicit binding exists.
    #[inline]
    pub fn default_implementation<C: Send + Sync + 'static>(mut self) -> Self {
        self.inner.default_impl = Some(TypeToken::of::<C>());
        self
    }

    /// Declare an injectable field for the legacy field-injection wrapper.
    pub fn field<P, F>(self, name: &'static str, assign: F) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(&mut T, Arc<P>) + Send + Sync + 'static,
    {
        self.field_spec(name, None, assign)
    }

    /// Declare a qualified injectable field.
    pub fn named_field<P, F>(self, name: &'static str, qualifier: &str, assign: F) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(&mut T, Arc<P>) + Send + Sync + 'static,
    {
        self.field_spec(name, Some(qualifier.to_owned()), assign)
    }

    fn field_spec<P, F>(mut self, name: &'static str, qualifier: Option<String>, assign: F) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(&mut T, Arc<P>) + Send + Sync + 'static,
    {
        let target_token = self.inner.token;
        let field_token = TypeToken::of::<P>();
        let erased: AssignFn =
            Arc::new(move |target: &mut dyn Any, value: Arc<dyn Any + Send + Sync>| {
                let target = target
                    .downcast_mut::<T>()
                    .ok_or_else(|| DiError::type_mismatch(target_token))?;
                let value = value
                    .downcast::<P>()
                    .map_err(|_| DiError::type_mismatch(field_token))?;
                assign(target, value);
                Ok(())
            });
        self.inner.fields.push(FieldSpec {
            name,
            token: field_token,
            qualifier,
            assign: erased,
        });
        self
    }
}

impl<T> From<DescriptorBuilder<T>> for TypeDescriptor {
    #[inline]
    fn from(builder: DescriptorBuilder<T>) -> Self {
        builder.inner
    }
}

/// Registry of type descriptors, shared by every container of a scope
/// registry.
///
/// Types never declared here read as concrete, not injectable, not
/// singleton, with no constructor and no default implementation.
pub struct DescriptorRegistry {
    entries: DashMap<TypeId, Arc<TypeDescriptor>, RandomState>,
}

impl DescriptorRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
        }
    }

    /// Register a descriptor. A later registration for the same type
    /// replaces the earlier one; declaration tables are expected to be
    /// written once at startup.
    pub fn register(&self, descriptor: impl Into<TypeDescriptor>) {
        let descriptor = descriptor.into();

        #[cfg(feature = "logging")]
        debug!(
            target: "wirebox",
            declared = descriptor.token.name(),
            shape = %descriptor.shape,
            injectable = descriptor.injectable,
            singleton = descriptor.singleton,
            params = descriptor.params.len(),
            "Registering type descriptor"
        );

        self.entries
            .insert(descriptor.token.id(), Arc::new(descriptor));
    }

    /// Look up the descriptor for a type, if declared.
    #[inline]
    pub fn descriptor(&self, token: TypeToken) -> Option<Arc<TypeDescriptor>> {
        self.entries.get(&token.id()).map(|d| Arc::clone(&d))
    }

    /// The declared shape of a type (concrete when undeclared).
    #[inline]
    pub fn shape(&self, token: TypeToken) -> TypeShape {
        self.descriptor(token)
            .map(|d| d.shape())
            .unwrap_or_default()
    }

    /// Whether a type is marked injectable.
    #[inline]
    pub fn is_injectable(&self, token: TypeToken) -> bool {
        self.descriptor(token)
            .map(|d| d.is_injectable())
            .unwrap_or(false)
    }

    /// Whether a type is marked singleton.
    #[inline]
    pub fn is_singleton(&self, token: TypeToken) -> bool {
        self.descriptor(token)
            .map(|d| d.is_singleton())
            .unwrap_or(false)
    }

    /// The declared default implementation of an abstraction.
    #[inline]
    pub fn default_implementation(&self, token: TypeToken) -> Option<TypeToken> {
        self.descriptor(token)
            .and_then(|d| d.default_implementation())
    }

    /// Number of declared types.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorRegistry")
            .field("declared", &self.len())
            .finish()
    }
}
