//! # The Container — the resolution engine
//!
//! Builds fully wired object graphs from registered contract → producer
//! bindings, honoring lifetimes and specializing open generic contracts on
//! demand.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──resolve(key)──> Instance
//!   declare()                     │
//!   register()                    ├─ Registry      (find / find_open / find_all)
//!                                 ├─ TypeCatalog   (kinds, constructors)
//!                                 └─ LifetimeCache (singletons)
//! ```
//!
//! # Examples
//! ```rust
//! use wirebox_container::prelude::*;
//!
//! struct RepositoryImpl;
//! struct ServiceImpl {
//!     repository: Instance,
//! }
//!
//! let container = Container::builder()
//!     .declare(TypeInfo::contract("Repository"))
//!     .declare(
//!         TypeInfo::concrete("RepositoryImpl")
//!             .satisfies("Repository")
//!             .constructor(Constructor::new([], |_| Ok(RepositoryImpl))),
//!     )
//!     .declare(TypeInfo::contract("Service"))
//!     .declare(
//!         TypeInfo::concrete("ServiceImpl")
//!             .satisfies("Service")
//!             .constructor(Constructor::new([Param::of("Repository")], |args| {
//!                 Ok(ServiceImpl { repository: args.next()? })
//!             })),
//!     )
//!     .singleton("Repository", "RepositoryImpl")
//!     .transient("Service", "ServiceImpl")
//!     .build()
//!     .expect("Failed to build container");
//!
//! let service = container.resolve_as::<ServiceImpl>("Service").expect("Failed to resolve");
//! assert_eq!(service.repository.producer().to_string(), "RepositoryImpl");
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace};
use wirebox_support::rendering::suggest_similar;

use crate::cache::{LifetimeCache, SlotKey};
use crate::catalog::{TypeCatalog, TypeInfo};
use crate::constructor::{Constructor, select_constructor};
use crate::error::{Result, UnresolvableError, WireboxError};
use crate::instance::Instance;
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;
use crate::path::{ResolutionPath, Step};
use crate::provider::{Provider, ProviderRegistry};
use crate::registry::{Descriptor, Registry};

// ============================================================
// ContainerBuilder
// ============================================================

/// Tunables for a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Upper bound on "did you mean?" entries in unresolvable errors.
    pub max_suggestions: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self { max_suggestions: 3 }
    }
}

/// Builds a [`Container`] from type declarations and registrations.
///
/// Registration errors are deferred: the builder stays chainable and
/// [`build()`](ContainerBuilder::build) reports the first one.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .declare(TypeInfo::contract("Logger"))
///     .declare(TypeInfo::concrete("ConsoleLogger").satisfies("Logger").constructor(...))
///     .singleton("Logger", "ConsoleLogger")
///     .build()?;
/// ```
pub struct ContainerBuilder {
    catalog: TypeCatalog,
    registry: Registry,
    options: ContainerOptions,
    deferred: Option<WireboxError>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            catalog: TypeCatalog::new(),
            registry: Registry::new(),
            options: ContainerOptions::default(),
            deferred: None,
        }
    }

    /// Limit "did you mean?" suggestions in error messages (0 disables them).
    pub fn max_suggestions(mut self, max: usize) -> Self {
        self.options.max_suggestions = max;
        self
    }

    /// Declare a type: its kind, the contracts it satisfies, its constructors.
    pub fn declare(mut self, info: TypeInfo) -> Self {
        self.catalog.declare(info);
        self
    }

    /// Register `producer` as an implementation of `contract`.
    pub fn register(
        mut self,
        contract: impl Into<DependencyKey>,
        producer: impl Into<DependencyKey>,
        lifetime: Lifetime,
    ) -> Self {
        self.register_internal(contract.into(), producer.into(), lifetime);
        self
    }

    /// Register a transient binding: a new instance on every resolve.
    pub fn transient(
        self,
        contract: impl Into<DependencyKey>,
        producer: impl Into<DependencyKey>,
    ) -> Self {
        self.register(contract, producer, Lifetime::Transient)
    }

    /// Register a singleton binding: constructed once, on first resolve.
    pub fn singleton(
        self,
        contract: impl Into<DependencyKey>,
        producer: impl Into<DependencyKey>,
    ) -> Self {
        self.register(contract, producer, Lifetime::Singleton)
    }

    /// Apply a [`Provider`] module.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(&mut self);
        self
    }

    /// Build the container, validating every registration.
    pub fn build(self) -> Result<Container> {
        Container::new(Some(self))
    }

    fn register_internal(
        &mut self,
        contract: DependencyKey,
        producer: DependencyKey,
        lifetime: Lifetime,
    ) {
        if let Err(err) = self.registry.register(contract, producer, lifetime) {
            self.deferred.get_or_insert(err);
        }
    }
}

impl ProviderRegistry for ContainerBuilder {
    fn declare_type(&mut self, info: TypeInfo) {
        self.catalog.declare(info);
    }

    fn register_binding(
        &mut self,
        contract: DependencyKey,
        producer: DependencyKey,
        lifetime: Lifetime,
    ) {
        self.register_internal(contract, producer, lifetime);
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("declared", &self.catalog.len())
            .field("registered", &self.registry.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Thread-safe resolution engine.
///
/// Created by [`ContainerBuilder::build()`] or [`Container::new`].
pub struct Container {
    catalog: TypeCatalog,
    registry: RwLock<Registry>,
    singletons: LifetimeCache,
    options: ContainerOptions,
}

impl Container {
    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Create a container from a configured builder.
    ///
    /// # Errors
    /// - [`WireboxError::MissingArgument`] if `configuration` is `None`
    /// - any deferred registration error or validation error
    #[instrument(skip_all, name = "container_build")]
    pub fn new(configuration: Option<ContainerBuilder>) -> Result<Self> {
        let builder = configuration.ok_or(WireboxError::MissingArgument {
            what: "configuration",
        })?;

        info!(
            registered = builder.registry.len(),
            declared = builder.catalog.len(),
            "Building container"
        );

        if let Some(err) = builder.deferred {
            return Err(err);
        }
        builder.registry.validate(&builder.catalog)?;

        info!("Container built successfully ✓");
        Ok(Self {
            catalog: builder.catalog,
            registry: RwLock::new(builder.registry),
            singletons: LifetimeCache::new(),
            options: builder.options,
        })
    }

    /// Resolve a contract to an instance of its registered producer.
    ///
    /// `All<_>` keys resolve to a collection instance, see [`Instance::items`].
    ///
    /// ```rust,ignore
    /// let repo = container.resolve("Repository")?;
    /// ```
    pub fn resolve(&self, key: impl Into<DependencyKey>) -> Result<Instance> {
        let key = key.into();
        trace!(key = %key, "Resolving");

        let mut path = ResolutionPath::new();
        self.resolve_key(&key, &mut path)
    }

    /// Resolve a contract and downcast the instance to its concrete type.
    pub fn resolve_as<T: Any + Send + Sync>(&self, key: impl Into<DependencyKey>) -> Result<Arc<T>> {
        let key = key.into();
        let instance = self.resolve(&key)?;

        instance.downcast::<T>().ok_or_else(|| WireboxError::Downcast {
            key,
            producer: instance.producer().clone(),
            expected: type_name::<T>(),
        })
    }

    /// Resolve every producer registered for `key`, in registration order.
    ///
    /// No registrations is not an error: the result is empty.
    pub fn resolve_all(&self, key: impl Into<DependencyKey>) -> Result<Vec<Instance>> {
        let key = key.into();
        trace!(key = %key, "Resolving all");

        let mut path = ResolutionPath::new();
        self.resolve_each(&key, &mut path)
    }

    /// Snapshot of all registrations, including memoized specializations.
    pub fn descriptors(&self) -> Vec<Descriptor> {
        self.registry.read().descriptors().to_vec()
    }

    /// Number of singletons constructed so far.
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    // ── Resolution ──

    fn resolve_key(&self, key: &DependencyKey, path: &mut ResolutionPath) -> Result<Instance> {
        if let Some(inner) = key.collection_of() {
            let items = self.resolve_each(inner, path)?;
            return Ok(Instance::collection(key.clone(), items));
        }

        path.enter(key, Step::Resolve)?;
        let result = self.resolve_entered(key, path);
        path.leave();
        result
    }

    fn resolve_entered(&self, key: &DependencyKey, path: &mut ResolutionPath) -> Result<Instance> {
        let descriptor = self.lookup(key, path)?;
        self.instantiate(&descriptor, path)
    }

    fn resolve_each(&self, key: &DependencyKey, path: &mut ResolutionPath) -> Result<Vec<Instance>> {
        if key.is_open() {
            return Err(self.unresolvable(key, path.requester()));
        }

        let mut descriptors: Vec<Descriptor> =
            self.registry.read().find_all(key).into_iter().cloned().collect();
        if descriptors.is_empty() {
            descriptors.extend(self.specialize(key)?);
        }

        path.enter(key, Step::Resolve)?;
        let result = descriptors
            .iter()
            .map(|descriptor| self.instantiate(descriptor, path))
            .collect();
        path.leave();
        result
    }

    /// Exact registration, else a memoized open-generic specialization.
    fn lookup(&self, key: &DependencyKey, path: &ResolutionPath) -> Result<Descriptor> {
        // an unbound family has nothing to construct
        if key.is_open() {
            return Err(self.unresolvable(key, path.requester()));
        }

        let found = self.registry.read().find(key).cloned();
        if let Some(descriptor) = found {
            return Ok(descriptor);
        }

        match self.specialize(key)? {
            Some(descriptor) => Ok(descriptor),
            None => Err(self.unresolvable(key, path.requester())),
        }
    }

    /// Derives `Service<A> → ServiceImpl<A>` from an open `Service<_> → ServiceImpl<_>`
    /// registration and memoizes it.
    fn specialize(&self, key: &DependencyKey) -> Result<Option<Descriptor>> {
        let Some(argument) = key.type_argument() else {
            return Ok(None);
        };

        let (derived, argument_resolvable) = {
            let registry = self.registry.read();
            let Some((open, _)) = registry.find_open(key) else {
                return Ok(None);
            };
            let derived = Descriptor::new(
                key.clone(),
                open.producer.bind(argument.clone()),
                open.lifetime,
            );
            (derived, self.can_supply(&registry, argument))
        };

        if !argument_resolvable {
            return Err(self.unresolvable(argument, Some(key)));
        }

        // re-checked under the write lock
        Ok(Some(self.registry.write().memoize(derived)))
    }

    /// Whether a type argument can be satisfied: built directly, or through
    /// a registered (or derivable) producer.
    fn can_supply(&self, registry: &Registry, argument: &DependencyKey) -> bool {
        !self.catalog.requires_lookup(argument)
            || argument.collection_of().is_some()
            || registry.find(argument).is_some()
            || registry.find_open(argument).is_some()
    }

    fn instantiate(&self, descriptor: &Descriptor, path: &mut ResolutionPath) -> Result<Instance> {
        match descriptor.lifetime {
            Lifetime::Singleton => {
                let slot = SlotKey {
                    contract: descriptor.contract.clone(),
                    producer: descriptor.producer.clone(),
                };
                self.singletons
                    .get_or_create(slot, || self.construct(&descriptor.producer, path))
            }
            Lifetime::Transient => self.construct(&descriptor.producer, path),
        }
    }

    // ── Construction ──

    fn construct(&self, producer: &DependencyKey, path: &mut ResolutionPath) -> Result<Instance> {
        let Some(info) = self
            .catalog
            .get(producer)
            .filter(|info| info.kind().is_instantiable())
        else {
            return Err(self.unresolvable(producer, path.requester()));
        };
        let constructor = select_constructor(producer, info.constructors())?;

        path.enter(producer, Step::Construct)?;
        let result = self.invoke(producer, constructor, path);
        path.leave();
        result
    }

    fn invoke(
        &self,
        producer: &DependencyKey,
        constructor: &Constructor,
        path: &mut ResolutionPath,
    ) -> Result<Instance> {
        let argument = producer.type_argument();
        let mut values = Vec::with_capacity(constructor.arity());

        for param in constructor.params() {
            let Some(ty) = param.bind(argument) else {
                return Err(WireboxError::InstantiationFailed {
                    producer: producer.clone(),
                    source: "generic parameter on a producer without a type argument".into(),
                });
            };

            let value = if self.catalog.requires_lookup(&ty) {
                self.resolve_key(&ty, path)?
            } else {
                self.construct(&ty, path)?
            };
            values.push(value);
        }

        trace!(producer = %producer, args = values.len(), depth = path.depth(), "Constructing");

        match panic::catch_unwind(AssertUnwindSafe(|| constructor.invoke(producer, values))) {
            Ok(Ok(value)) => Ok(Instance::new(producer.clone(), value)),
            Ok(Err(source)) => Err(WireboxError::InstantiationFailed {
                producer: producer.clone(),
                source,
            }),
            Err(payload) => Err(WireboxError::InstantiationFailed {
                producer: producer.clone(),
                source: panic_message(payload.as_ref()).into(),
            }),
        }
    }

    fn unresolvable(
        &self,
        requested: &DependencyKey,
        required_by: Option<&DependencyKey>,
    ) -> WireboxError {
        let names: Vec<String> = self
            .registry
            .read()
            .contracts()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        WireboxError::Unresolvable(UnresolvableError {
            requested: requested.clone(),
            required_by: required_by.cloned(),
            suggestions: suggest_similar(
                &requested.to_string(),
                names.iter().map(String::as_str),
                self.options.max_suggestions,
            ),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("constructor panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("constructor panicked: {msg}")
    } else {
        "constructor panicked".to_string()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.read().len())
            .field("singletons", &self.singletons.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, ContainerOptions};
    pub use crate::catalog::{TypeInfo, TypeKind};
    pub use crate::constructor::{Arguments, Constructor, Param};
    pub use crate::error::{Result, WireboxError};
    pub use crate::instance::Instance;
    pub use crate::key::DependencyKey;
    pub use crate::lifetime::Lifetime;
    pub use crate::provider::{Provider, ProviderRegistry};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
