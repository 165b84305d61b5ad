//! The dependency-resolution container
//!
//! One `Container` per scope. It owns the singleton cache and the binding
//! table and exposes `provide`, `bind`, and `resolve`; `resolve` is a
//! depth-first recursive descent over constructor parameters, consulting the
//! descriptor registry for per-type metadata.
//!
//! Resolution carries no cycle guard: an unbroken circular dependency
//! between types recurses until the stack is exhausted.

use crate::cache::{BindingTable, CacheEntry, CacheKey, SingletonCache};
use crate::metadata::{DescriptorRegistry, ResolvedArgs, TypeShape, TypeToken};
use crate::{DiError, Result};
use std::any::Any;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// A scope's dependency-resolution container.
///
/// Cheaply cloneable; clones share the same cache, bindings, and metadata.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{Container, DescriptorRegistry, TypeDescriptor};
///
/// struct Greeter {
///     message: String,
/// }
///
/// let metadata = Arc::new(DescriptorRegistry::new());
/// metadata.register(
///     TypeDescriptor::concrete::<Greeter>()
///         .injectable()
///         .named_param::<String>("greeting")
///         .constructor(|args| {
///             Ok(Greeter {
///                 message: args.take_owned()?,
///             })
///         }),
/// );
///
/// let container = Container::new(metadata);
/// container.provide_named("hello".to_string(), "greeting").unwrap();
///
/// let greeter = container.resolve::<Greeter>().unwrap();
/// assert_eq!(greeter.message, "hello");
/// ```
#[derive(Clone)]
pub struct Container {
    metadata: Arc<DescriptorRegistry>,
    singletons: Arc<SingletonCache>,
    bindings: Arc<BindingTable>,
}

impl Container {
    /// Create an empty container backed by the given descriptor registry.
    #[inline]
    pub fn new(metadata: Arc<DescriptorRegistry>) -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "wirebox", "Creating new container");

        Self {
            metadata,
            singletons: Arc::new(SingletonCache::new()),
            bindings: Arc::new(BindingTable::new()),
        }
    }

    /// The descriptor registry this container consults.
    #[inline]
    pub fn metadata(&self) -> &Arc<DescriptorRegistry> {
        &self.metadata
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a pre-built singleton with no qualifier.
    ///
    /// The instance becomes reachable under its concrete type plus every
    /// abstraction its descriptor declares via `implements`. See
    /// [`provide_named`](Container::provide_named).
    #[inline]
    pub fn provide<T: Send + Sync + 'static>(&self, instance: T) -> Result<&Self> {
        self.provide_impl(instance, None)
    }

    /// Register a pre-built singleton under a qualifier name.
    ///
    /// Fails with `DuplicateProvision` if any of the keys is already
    /// occupied. Keys inserted before the conflicting one remain in the
    /// cache; provision is not transactional.
    #[inline]
    pub fn provide_named<T: Send + Sync + 'static>(
        &self,
        instance: T,
        name: &str,
    ) -> Result<&Self> {
        self.provide_impl(instance, Some(name))
    }

    fn provide_impl<T: Send + Sync + 'static>(
        &self,
        instance: T,
        name: Option<&str>,
    ) -> Result<&Self> {
        let token = TypeToken::of::<T>();
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(instance);

        #[cfg(feature = "logging")]
        debug!(
            target: "wirebox",
            provided = token.name(),
            qualifier = name,
            "Providing pre-built singleton"
        );

        let mut targets: Vec<(TypeToken, Arc<dyn Any + Send + Sync>)> =
            vec![(token, Arc::clone(&erased))];
        if let Some(descriptor) = self.metadata.descriptor(token) {
            for link in descriptor.links() {
                targets.push((link.token, (link.upcast)(Arc::clone(&erased))?));
            }
        }

        for (target, value) in targets {
            let key = CacheKey::new(target.id(), name);
            let entry = CacheEntry {
                value,
                concrete: token.name(),
            };
            self.singletons
                .try_insert(key, entry)
                .map_err(|existing| DiError::DuplicateProvision {
                    type_name: target.name(),
                    qualifier: name.map(str::to_owned),
                    existing,
                    incoming: token.name(),
                })?;
        }

        Ok(self)
    }

    /// Bind abstraction `A` to concrete implementation `C`.
    ///
    /// `C` should declare `implements::<A>` in its descriptor; the
    /// conversion is checked when the binding is exercised, not here. A
    /// second bind of the same abstraction fails with `DuplicateBinding`
    /// and the original binding persists.
    pub fn bind<A: Send + Sync + 'static, C: Send + Sync + 'static>(&self) -> Result<&Self> {
        let abstraction = TypeToken::of::<A>();
        let implementation = TypeToken::of::<C>();

        #[cfg(feature = "logging")]
        debug!(
            target: "wirebox",
            abstraction = abstraction.name(),
            implementation = implementation.name(),
            "Binding abstraction to implementation"
        );

        self.bindings
            .try_insert(abstraction, implementation)
            .map_err(|existing| DiError::DuplicateBinding {
                abstraction: abstraction.name(),
                existing: existing.name(),
                incoming: implementation.name(),
            })?;

        Ok(self)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve an instance of `T` with no qualifier.
    #[inline]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.resolve_with::<T>(None)
    }

    /// Resolve an instance of `T` under a qualifier name.
    #[inline]
    pub fn resolve_named<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        self.resolve_with::<T>(Some(name))
    }

    fn resolve_with<T: Send + Sync + 'static>(&self, qualifier: Option<&str>) -> Result<Arc<T>> {
        let token = TypeToken::of::<T>();
        let value = self.resolve_erased(token, qualifier)?;
        value
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch(token))
    }

    /// The recursive core: turn a (type, qualifier) pair into a type-erased
    /// instance.
    pub(crate) fn resolve_erased(
        &self,
        token: TypeToken,
        qualifier: Option<&str>,
    ) -> Result<Arc<dyn Any + Send + Sync>> {
        // Fast path: provided values and previously computed singletons.
        // A hit short-circuits every validation below.
        let key = CacheKey::new(token.id(), qualifier);
        if let Some(entry) = self.singletons.get(&key) {
            #[cfg(feature = "logging")]
            trace!(
                target: "wirebox",
                requested = token.name(),
                qualifier = qualifier,
                location = "singleton_cache",
                "Resolved from singleton cache"
            );
            return Ok(entry.value);
        }

        let shape = self.metadata.shape(token);
        if !shape.is_resolvable() {
            return Err(DiError::invalid_shape(token, shape));
        }

        // Abstractions substitute a concrete implementation: an explicit
        // binding wins over the declared default implementation.
        let concrete = if shape == TypeShape::Abstract {
            let implementation = self
                .bindings
                .get(token)
                .or_else(|| self.metadata.default_implementation(token))
                .ok_or_else(|| DiError::unresolved_abstraction(token))?;

            #[cfg(feature = "logging")]
            trace!(
                target: "wirebox",
                abstraction = token.name(),
                implementation = implementation.name(),
                "Substituting concrete implementation"
            );

            implementation
        } else {
            token
        };

        let descriptor = self
            .metadata
            .descriptor(concrete)
            .ok_or_else(|| DiError::not_injectable(concrete))?;
        if !descriptor.is_injectable() {
            return Err(DiError::not_injectable(concrete));
        }

        let construct = descriptor
            .constructor()
            .ok_or_else(|| DiError::not_constructible(concrete))?;

        let mut args: Vec<Arc<dyn Any + Send + Sync>> =
            Vec::with_capacity(descriptor.params().len());
        for param in descriptor.params() {
            let value = self
                .resolve_erased(param.token(), param.qualifier())
                .map_err(|inner| DiError::unmet_dependency(token, inner))?;
            args.push(value);
        }

        let instance = construct(ResolvedArgs::new(args))?;

        // When the request came through an abstraction, the cached and
        // returned value uses the abstraction's representation.
        let value = if concrete != token {
            descriptor.upcast_to(token, instance)?
        } else {
            instance
        };

        if descriptor.is_singleton() {
            // Keyed by the originally requested type, not the substituted
            // concrete; first writer wins under concurrent resolution.
            let entry = self.singletons.insert_or_get(
                key,
                CacheEntry {
                    value,
                    concrete: concrete.name(),
                },
            );

            #[cfg(feature = "logging")]
            debug!(
                target: "wirebox",
                requested = token.name(),
                concrete = concrete.name(),
                qualifier = qualifier,
                "Cached computed singleton"
            );

            return Ok(entry.value);
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "wirebox",
            requested = token.name(),
            concrete = concrete.name(),
            "Constructed transient instance"
        );

        Ok(value)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of occupied singleton cache slots.
    #[inline]
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// Number of registered bindings.
    #[inline]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("singletons", &self.singleton_count())
            .field("bindings", &self.binding_count())
            .field("declared_types", &self.metadata.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeDescriptor;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Config {
        url: String,
    }

    #[derive(Debug)]
    struct Repository {
        config: Arc<Config>,
    }

    #[derive(Debug)]
    struct Service {
        repository: Arc<Repository>,
    }

    trait Notifier: Send + Sync + std::fmt::Debug {
        fn channel(&self) -> &'static str;
    }

    #[derive(Debug)]
    struct EmailNotifier;

    impl Notifier for EmailNotifier {
        fn channel(&self) -> &'static str {
            "email"
        }
    }

    #[derive(Debug)]
    struct SmsNotifier;

    impl Notifier for SmsNotifier {
        fn channel(&self) -> &'static str {
            "sms"
        }
    }

    fn metadata() -> Arc<DescriptorRegistry> {
        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::concrete::<Config>()
                .injectable()
                .singleton()
                .constructor(|_| {
                    Ok(Config {
                        url: "postgres://localhost".into(),
                    })
                }),
        );
        registry.register(
            TypeDescriptor::concrete::<Repository>()
                .injectable()
                .param::<Config>()
                .constructor(|args| {
                    Ok(Repository {
                        config: args.take()?,
                    })
                }),
        );
        registry.register(
            TypeDescriptor::concrete::<Service>()
                .injectable()
                .param::<Repository>()
                .constructor(|args| {
                    Ok(Service {
                        repository: args.take()?,
                    })
                }),
        );
        Arc::new(registry)
    }

    #[test]
    fn resolve_builds_dependency_chain() {
        let container = Container::new(metadata());
        let service = container.resolve::<Service>().unwrap();
        assert_eq!(service.repository.config.url, "postgres://localhost");
    }

    #[test]
    fn non_singleton_resolves_are_distinct() {
        let container = Container::new(metadata());
        let a = container.resolve::<Repository>().unwrap();
        let b = container.resolve::<Repository>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn singleton_resolves_are_identical() {
        let container = Container::new(metadata());
        let a = container.resolve::<Config>().unwrap();
        let b = container.resolve::<Config>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn singleton_shared_between_unrelated_dependents() {
        let container = Container::new(metadata());
        let first = container.resolve::<Repository>().unwrap();
        let second = container.resolve::<Repository>().unwrap();
        assert!(Arc::ptr_eq(&first.config, &second.config));
    }

    #[test]
    fn singleton_constructed_once() {
        static BUILT: AtomicU32 = AtomicU32::new(0);

        struct Counted;

        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::concrete::<Counted>()
                .injectable()
                .singleton()
                .constructor(|_| {
                    BUILT.fetch_add(1, Ordering::SeqCst);
                    Ok(Counted)
                }),
        );

        let container = Container::new(Arc::new(registry));
        let _ = container.resolve::<Counted>().unwrap();
        let _ = container.resolve::<Counted>().unwrap();
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn provided_value_overrides_construction() {
        let container = Container::new(metadata());
        container
            .provide(Config {
                url: "sqlite::memory:".into(),
            })
            .unwrap();

        let repository = container.resolve::<Repository>().unwrap();
        assert_eq!(repository.config.url, "sqlite::memory:");
    }

    #[test]
    fn qualifiers_resolve_independently() {
        let container = Container::new(metadata());
        container
            .provide_named("left".to_string(), "left")
            .unwrap()
            .provide_named("right".to_string(), "right")
            .unwrap();

        assert_eq!(*container.resolve_named::<String>("left").unwrap(), "left");
        assert_eq!(
            *container.resolve_named::<String>("right").unwrap(),
            "right"
        );
    }

    #[test]
    fn duplicate_provision_is_rejected() {
        let container = Container::new(metadata());
        container.provide_named(1u32, "n").unwrap();
        let err = container.provide_named(2u32, "n").unwrap_err();

        assert!(matches!(err, DiError::DuplicateProvision { .. }));
        assert!(err.to_string().contains("u32"));

        // The first value stays retrievable.
        assert_eq!(*container.resolve_named::<u32>("n").unwrap(), 1);
    }

    #[test]
    fn provide_is_not_transactional() {
        // EmailNotifier declares the Notifier abstraction; the concrete key
        // is inserted first, so a conflict on the abstraction key leaves the
        // concrete key populated.
        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::concrete::<EmailNotifier>()
                .injectable()
                .constructor(|_| Ok(EmailNotifier))
                .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
        );
        let container = Container::new(Arc::new(registry));

        container
            .provide(Arc::new(SmsNotifier) as Arc<dyn Notifier>)
            .unwrap();
        let err = container.provide(EmailNotifier).unwrap_err();
        assert!(matches!(err, DiError::DuplicateProvision { .. }));

        // The concrete key from the failed call survived.
        let direct = container.resolve::<EmailNotifier>().unwrap();
        assert_eq!(direct.channel(), "email");
        // The abstraction key still holds the first provision.
        let through_abstraction = container.resolve::<Arc<dyn Notifier>>().unwrap();
        assert_eq!(through_abstraction.channel(), "sms");
    }

    #[test]
    fn bind_routes_abstraction_to_implementation() {
        let registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::abstraction::<Arc<dyn Notifier>>());
        registry.register(
            TypeDescriptor::concrete::<EmailNotifier>()
                .injectable()
                .constructor(|_| Ok(EmailNotifier))
                .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
        );
        let container = Container::new(Arc::new(registry));

        container.bind::<Arc<dyn Notifier>, EmailNotifier>().unwrap();
        let notifier = container.resolve::<Arc<dyn Notifier>>().unwrap();
        assert_eq!(notifier.channel(), "email");
    }

    #[test]
    fn duplicate_binding_is_rejected_and_original_persists() {
        let registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::abstraction::<Arc<dyn Notifier>>());
        registry.register(
            TypeDescriptor::concrete::<EmailNotifier>()
                .injectable()
                .constructor(|_| Ok(EmailNotifier))
                .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
        );
        registry.register(
            TypeDescriptor::concrete::<SmsNotifier>()
                .injectable()
                .constructor(|_| Ok(SmsNotifier))
                .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
        );
        let container = Container::new(Arc::new(registry));

        container.bind::<Arc<dyn Notifier>, EmailNotifier>().unwrap();
        let err = container
            .bind::<Arc<dyn Notifier>, SmsNotifier>()
            .unwrap_err();
        assert!(matches!(err, DiError::DuplicateBinding { .. }));
        assert!(err.to_string().contains("EmailNotifier"));
        assert!(err.to_string().contains("SmsNotifier"));

        let notifier = container.resolve::<Arc<dyn Notifier>>().unwrap();
        assert_eq!(notifier.channel(), "email");
    }

    #[test]
    fn default_implementation_used_without_binding() {
        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::abstraction::<Arc<dyn Notifier>>()
                .default_implementation::<EmailNotifier>(),
        );
        registry.register(
            TypeDescriptor::concrete::<EmailNotifier>()
                .injectable()
                .constructor(|_| Ok(EmailNotifier))
                .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
        );
        let container = Container::new(Arc::new(registry));

        let notifier = container.resolve::<Arc<dyn Notifier>>().unwrap();
        assert_eq!(notifier.channel(), "email");
    }

    #[test]
    fn binding_wins_over_default_implementation() {
        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::abstraction::<Arc<dyn Notifier>>()
                .default_implementation::<EmailNotifier>(),
        );
        registry.register(
            TypeDescriptor::concrete::<EmailNotifier>()
                .injectable()
                .constructor(|_| Ok(EmailNotifier))
                .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
        );
        registry.register(
            TypeDescriptor::concrete::<SmsNotifier>()
                .injectable()
                .constructor(|_| Ok(SmsNotifier))
                .implements::<Arc<dyn Notifier>, _>(|n| n as Arc<dyn Notifier>),
        );
        let container = Container::new(Arc::new(registry));

        container.bind::<Arc<dyn Notifier>, SmsNotifier>().unwrap();
        let notifier = container.resolve::<Arc<dyn Notifier>>().unwrap();
        assert_eq!(notifier.channel(), "sms");
    }

    #[test]
    fn unresolved_abstraction_names_the_abstraction() {
        let registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::abstraction::<Arc<dyn Notifier>>());
        let container = Container::new(Arc::new(registry));

        let err = container.resolve::<Arc<dyn Notifier>>().unwrap_err();
        assert!(matches!(err, DiError::UnresolvedAbstraction { .. }));
        assert!(err.to_string().contains("Notifier"));
    }

    #[test]
    fn singleton_through_abstraction_cached_under_requested_key() {
        struct Solo;

        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::abstraction::<Arc<dyn Notifier>>().default_implementation::<Solo>(),
        );
        registry.register(
            TypeDescriptor::concrete::<Solo>()
                .injectable()
                .singleton()
                .constructor(|_| Ok(Solo))
                .implements::<Arc<dyn Notifier>, _>(|_| {
                    Arc::new(EmailNotifier) as Arc<dyn Notifier>
                }),
        );
        let container = Container::new(Arc::new(registry));

        let a = container.resolve::<Arc<dyn Notifier>>().unwrap();
        let b = container.resolve::<Arc<dyn Notifier>>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(container.singleton_count(), 1);
    }

    #[test]
    fn invalid_shapes_are_rejected_with_type_name() {
        #[derive(Clone, Debug)]
        struct Point;
        #[derive(Clone, Debug)]
        enum Mode {
            #[allow(dead_code)]
            On,
        }

        let registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::data::<Point>());
        registry.register(TypeDescriptor::enumeration::<Mode>());
        registry.register(TypeDescriptor::array::<Vec<u8>>());
        let container = Container::new(Arc::new(registry));

        let err = container.resolve::<Point>().unwrap_err();
        assert!(matches!(err, DiError::InvalidTypeShape { .. }));
        assert!(err.to_string().contains("Point"));

        let err = container.resolve::<Mode>().unwrap_err();
        assert!(err.to_string().contains("Mode"));

        let err = container.resolve::<Vec<u8>>().unwrap_err();
        assert!(err.to_string().contains("Vec<u8>"));
    }

    #[test]
    fn unregistered_type_is_not_injectable() {
        #[derive(Debug)]
        struct Unknown;

        let container = Container::new(Arc::new(DescriptorRegistry::new()));
        let err = container.resolve::<Unknown>().unwrap_err();
        assert!(matches!(err, DiError::NotInjectable { .. }));
        assert!(err.to_string().contains("Unknown"));
    }

    #[test]
    fn missing_constructor_is_not_constructible() {
        #[derive(Debug)]
        struct Headless;

        let registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::concrete::<Headless>().injectable());
        let container = Container::new(Arc::new(registry));

        let err = container.resolve::<Headless>().unwrap_err();
        assert!(matches!(err, DiError::NotConstructible { .. }));
    }

    #[test]
    fn unmet_dependency_names_the_outer_type() {
        #[derive(Debug)]
        struct Greeter {
            #[allow(dead_code)]
            message: String,
        }

        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::concrete::<Greeter>()
                .injectable()
                .named_param::<String>("missing")
                .constructor(|args| {
                    Ok(Greeter {
                        message: args.take_owned()?,
                    })
                }),
        );
        let container = Container::new(Arc::new(registry));

        let err = container.resolve::<Greeter>().unwrap_err();
        assert!(matches!(err, DiError::UnmetDependency { .. }));
        let text = err.to_string();
        assert!(text.contains("Greeter"));
        assert!(text.contains("String"));
    }

    #[test]
    fn unmet_dependency_surfaces_top_level_type_across_levels() {
        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::concrete::<Repository>()
                .injectable()
                .param::<Config>()
                .constructor(|args| {
                    Ok(Repository {
                        config: args.take()?,
                    })
                }),
        );
        registry.register(
            TypeDescriptor::concrete::<Service>()
                .injectable()
                .param::<Repository>()
                .constructor(|args| {
                    Ok(Service {
                        repository: args.take()?,
                    })
                }),
        );
        // Config is deliberately undeclared: the failure is two levels deep.
        let container = Container::new(Arc::new(registry));

        let err = container.resolve::<Service>().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Service"));
        assert!(text.contains("Config"));
        assert!(text.contains("not marked injectable"));
    }

    #[test]
    fn greeting_scenario() {
        #[derive(Debug)]
        struct Greeter {
            message: String,
        }

        let registry = DescriptorRegistry::new();
        registry.register(
            TypeDescriptor::concrete::<Greeter>()
                .injectable()
                .named_param::<String>("greeting")
                .constructor(|args| {
                    Ok(Greeter {
                        message: args.take_owned()?,
                    })
                }),
        );
        let container = Container::new(Arc::new(registry));
        container
            .provide_named("hello".to_string(), "greeting")
            .unwrap();

        let greeter = container.resolve::<Greeter>().unwrap();
        assert_eq!(greeter.message, "hello");

        // Same type, wrong qualifier on the provide side.
        let other = Container::new(container.metadata().clone());
        other
            .provide_named("hello".to_string(), "missing")
            .unwrap();
        let err = other.resolve::<Greeter>().unwrap_err();
        assert!(matches!(err, DiError::UnmetDependency { .. }));
    }

    #[test]
    fn provide_against_computed_singleton_key_is_rejected() {
        let container = Container::new(metadata());
        let _ = container.resolve::<Config>().unwrap();

        let err = container
            .provide(Config {
                url: "late".into(),
            })
            .unwrap_err();
        assert!(matches!(err, DiError::DuplicateProvision { .. }));
    }

    #[test]
    fn concurrent_resolution_yields_one_singleton() {
        let container = Container::new(metadata());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let container = container.clone();
            handles.push(std::thread::spawn(move || {
                container.resolve::<Config>().unwrap()
            }));
        }
        let instances: Vec<Arc<Config>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for instance in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], instance));
        }
    }
}
