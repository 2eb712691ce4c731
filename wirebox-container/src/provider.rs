//! Provider trait — a module of related declarations and registrations.
//!
//! # Examples
//! ```rust,ignore
//! struct PersistenceProvider;
//!
//! impl Provider for PersistenceProvider {
//!     fn register(&self, registry: &mut dyn ProviderRegistry) {
//!         registry.declare_type(TypeInfo::contract("Repository"));
//!         registry.declare_type(
//!             TypeInfo::concrete("SqlRepository")
//!                 .satisfies("Repository")
//!                 .constructor(Constructor::new([], |_| Ok(SqlRepository))),
//!         );
//!         registry.register_binding("Repository".into(), "SqlRepository".into(), Lifetime::Singleton);
//!     }
//! }
//! ```

use crate::catalog::TypeInfo;
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;

/// A module that declares types and registers bindings into a container.
///
/// Split registrations by domain instead of one giant block:
///
/// ```rust,ignore
/// let container = Container::builder()
///     .add_provider(&PersistenceProvider)
///     .add_provider(&MailProvider)
///     .build()?;
/// ```
pub trait Provider: Send + Sync {
    /// Called once, while the container is being configured.
    fn register(&self, registry: &mut dyn ProviderRegistry);

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The part of the builder exposed to [`Provider`] implementations.
pub trait ProviderRegistry {
    /// Declare a type in the catalog.
    fn declare_type(&mut self, info: TypeInfo);

    /// Register `producer` for `contract`.
    ///
    /// Invalid arguments are reported when the container is built.
    fn register_binding(
        &mut self,
        contract: DependencyKey,
        producer: DependencyKey,
        lifetime: Lifetime,
    );
}
