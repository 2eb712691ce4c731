//! Instance lifetime policies.
//!
//! A lifetime determines how often a registered producer is constructed:
//! - [`Lifetime::Singleton`] — once per container
//! - [`Lifetime::Transient`] — on every resolution
use std::fmt;

/// Defines how long a resolved instance is shared.
///
/// # Examples
/// ```
/// use wirebox_container::lifetime::Lifetime;
///
/// assert_eq!(Lifetime::default(), Lifetime::Transient);
/// assert!(Lifetime::Singleton.is_cached());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// A new instance is created on every resolve call.
    ///
    /// Never cached. The default for registrations.
    #[default]
    Transient,

    /// One instance shared by every resolution through the same container.
    ///
    /// Created on first resolve, lives until the container is dropped.
    /// Not allowed on open generic contracts: the number of
    /// specializations is unknown up front.
    Singleton,
}

impl Lifetime {
    /// Returns `true` if instances of this lifetime go through the cache.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => write!(f, "Singleton"),
            Lifetime::Transient => write!(f, "Transient"),
        }
    }
}
