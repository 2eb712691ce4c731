//! Dependency identification keys.
//!
//! [`DependencyKey`] is the stable, caller-chosen identifier for a contract
//! or a producer. Keys are opaque names, not live Rust types, so the engine
//! never needs runtime type introspection.
//!
//! A key has one of four shapes:
//! - **named** — `Repository`
//! - **open** — `Service<_>`, a generic family with an unbound slot
//! - **bound** — `Service<Repository>`, an open family specialized with one argument
//! - **all** — `All<Repository>`, a request for every registered producer

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use wirebox_support::rendering::shorten_name;

/// Uniquely identifies a contract or producer type.
///
/// Cloning is cheap: names are reference counted.
///
/// # Examples
/// ```
/// use wirebox_container::key::DependencyKey;
///
/// let repo = DependencyKey::named("Repository");
/// let service = DependencyKey::open("Service");
/// let bound = service.bind(repo.clone());
///
/// assert!(service.is_open());
/// assert!(!bound.is_open());
/// assert_eq!(bound.to_string(), "Service<Repository>");
/// assert_eq!(bound.generic_family(), Some(service));
/// assert_eq!(bound.type_argument(), Some(&repo));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DependencyKey {
    shape: Shape,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum Shape {
    Named(Arc<str>),
    Open(Arc<str>),
    Bound {
        family: Arc<str>,
        argument: Arc<DependencyKey>,
    },
    All(Arc<DependencyKey>),
}

impl DependencyKey {
    /// Creates a key for a plain (non-generic) type name.
    #[inline]
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self { shape: Shape::Named(name.into()) }
    }

    /// Creates a key whose name is the Rust type name of `T`.
    ///
    /// Handy when contract names should track real types, e.g.
    /// `DependencyKey::of::<dyn Repository>()`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(type_name::<T>())
    }

    /// Creates the key of an open generic family such as `Service<_>`.
    #[inline]
    pub fn open(family: impl Into<Arc<str>>) -> Self {
        Self { shape: Shape::Open(family.into()) }
    }

    /// Creates a request for every producer registered under `inner`.
    #[inline]
    pub fn all(inner: impl Into<DependencyKey>) -> Self {
        Self { shape: Shape::All(Arc::new(inner.into())) }
    }

    /// Specializes this open family with a type argument.
    ///
    /// Binding a key that is not open yields the key unchanged; there is no
    /// slot to fill.
    pub fn bind(&self, argument: impl Into<DependencyKey>) -> Self {
        match &self.shape {
            Shape::Open(family) => Self {
                shape: Shape::Bound {
                    family: family.clone(),
                    argument: Arc::new(argument.into()),
                },
            },
            _ => self.clone(),
        }
    }

    /// Returns `true` for an unbound generic family.
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self.shape, Shape::Open(_))
    }

    /// Returns `true` for a specialized generic family.
    #[inline]
    pub fn is_bound(&self) -> bool {
        matches!(self.shape, Shape::Bound { .. })
    }

    /// Returns the inner key if this is a resolve-all request.
    #[inline]
    pub fn collection_of(&self) -> Option<&DependencyKey> {
        match &self.shape {
            Shape::All(inner) => Some(inner),
            _ => None,
        }
    }

    /// The open family of a bound or open key.
    pub fn generic_family(&self) -> Option<DependencyKey> {
        match &self.shape {
            Shape::Open(_) => Some(self.clone()),
            Shape::Bound { family, .. } => Some(Self::open(family.clone())),
            _ => None,
        }
    }

    /// The type argument of a bound key.
    #[inline]
    pub fn type_argument(&self) -> Option<&DependencyKey> {
        match &self.shape {
            Shape::Bound { argument, .. } => Some(argument),
            _ => None,
        }
    }

    /// Returns `true` if any name making up this key is empty.
    ///
    /// Registrations with unspecified keys are rejected.
    pub fn is_unspecified(&self) -> bool {
        match &self.shape {
            Shape::Named(name) | Shape::Open(name) => name.trim().is_empty(),
            Shape::Bound { family, argument } => {
                family.trim().is_empty() || argument.is_unspecified()
            }
            Shape::All(inner) => inner.is_unspecified(),
        }
    }

    /// Human-friendly name with module paths stripped.
    pub fn short_name(&self) -> String {
        shorten_name(&self.to_string())
    }
}

impl From<&str> for DependencyKey {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for DependencyKey {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<&DependencyKey> for DependencyKey {
    fn from(key: &DependencyKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape::Named(name) => write!(f, "{name}"),
            Shape::Open(family) => write!(f, "{family}<_>"),
            Shape::Bound { family, argument } => write!(f, "{family}<{argument}>"),
            Shape::All(inner) => write!(f, "All<{inner}>"),
        }
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencyKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MyStruct;

    #[test]
    fn key_of_type() {
        let key = DependencyKey::of::<MyStruct>();
        assert!(key.to_string().contains("MyStruct"));
        assert_eq!(key.short_name(), "MyStruct");
    }

    #[test]
    fn key_equality_same_name() {
        assert_eq!(DependencyKey::named("Repository"), DependencyKey::from("Repository"));
    }

    #[test]
    fn named_and_open_differ() {
        assert_ne!(DependencyKey::named("Service"), DependencyKey::open("Service"));
    }

    #[test]
    fn bound_keys_compare_by_argument() {
        let service = DependencyKey::open("Service");
        assert_eq!(service.bind("Repository"), service.bind("Repository"));
        assert_ne!(service.bind("Repository"), service.bind("Logger"));
    }

    #[test]
    fn binding_a_closed_key_is_a_no_op() {
        let repo = DependencyKey::named("Repository");
        assert_eq!(repo.bind("Logger"), repo);
    }

    #[test]
    fn all_wrapper_exposes_inner() {
        let all = DependencyKey::all("Plugin");
        assert_eq!(all.collection_of(), Some(&DependencyKey::named("Plugin")));
        assert_eq!(all.to_string(), "All<Plugin>");
        assert!(DependencyKey::named("Plugin").collection_of().is_none());
    }

    #[test]
    fn unspecified_detection() {
        assert!(DependencyKey::named("").is_unspecified());
        assert!(DependencyKey::named("  ").is_unspecified());
        assert!(DependencyKey::open("Service").bind("").is_unspecified());
        assert!(!DependencyKey::open("Service").bind("Repository").is_unspecified());
    }

    #[test]
    fn display_shapes() {
        assert_eq!(DependencyKey::open("Service").to_string(), "Service<_>");
        assert_eq!(
            format!("{:?}", DependencyKey::named("Repository")),
            "DependencyKey(Repository)"
        );
    }

    #[test]
    fn key_in_hashmap() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(DependencyKey::named("Repository"), "repo");
        map.insert(DependencyKey::open("Service").bind("Repository"), "service");
        assert_eq!(map.get(&DependencyKey::named("Repository")), Some(&"repo"));
        assert_eq!(
            map.get(&DependencyKey::open("Service").bind("Repository")),
            Some(&"service")
        );
        assert_eq!(map.get(&DependencyKey::named("Logger")), None);
    }
}
