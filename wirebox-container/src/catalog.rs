//! Type catalog — what the engine knows about each type.
//!
//! The catalog answers the two questions the engine would otherwise ask a
//! reflection API:
//! 1. Does producer `P` satisfy contract `C`?
//! 2. Which constructors does `P` have, and what do they take?
//!
//! Open generic types are declared once under their open key
//! (`DependencyKey::open("ServiceImpl")`); every bound specialization
//! shares that declaration.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::constructor::Constructor;
use crate::key::DependencyKey;

/// Broad classification of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// An interface-like capability. Resolved through the registry.
    Contract,
    /// A partially implemented type. Resolved through the registry, never built.
    Abstract,
    /// An instantiable type. Built directly from its constructors.
    Concrete,
}

impl TypeKind {
    /// Returns `true` if values of this kind can be constructed.
    #[inline]
    pub fn is_instantiable(&self) -> bool {
        matches!(self, TypeKind::Concrete)
    }
}

/// Declaration of one type.
///
/// # Examples
/// ```
/// use wirebox_container::catalog::{TypeInfo, TypeKind};
/// use wirebox_container::constructor::Constructor;
///
/// struct RepositoryImpl;
///
/// let info = TypeInfo::concrete("RepositoryImpl")
///     .satisfies("Repository")
///     .constructor(Constructor::new([], |_| Ok(RepositoryImpl)));
///
/// assert_eq!(info.kind(), TypeKind::Concrete);
/// assert_eq!(info.constructors().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TypeInfo {
    key: DependencyKey,
    kind: TypeKind,
    satisfies: Vec<DependencyKey>,
    constructors: Vec<Constructor>,
}

impl TypeInfo {
    fn new(key: impl Into<DependencyKey>, kind: TypeKind) -> Self {
        Self {
            key: key.into(),
            kind,
            satisfies: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Declares a contract.
    pub fn contract(key: impl Into<DependencyKey>) -> Self {
        Self::new(key, TypeKind::Contract)
    }

    /// Declares an abstract type.
    pub fn abstract_type(key: impl Into<DependencyKey>) -> Self {
        Self::new(key, TypeKind::Abstract)
    }

    /// Declares a concrete, instantiable type.
    pub fn concrete(key: impl Into<DependencyKey>) -> Self {
        Self::new(key, TypeKind::Concrete)
    }

    /// Adds a contract this type implements (or, for a contract, extends).
    pub fn satisfies(mut self, contract: impl Into<DependencyKey>) -> Self {
        self.satisfies.push(contract.into());
        self
    }

    /// Adds a constructor. Declaration order matters for tie-breaks.
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn declared_contracts(&self) -> &[DependencyKey] {
        &self.satisfies
    }
}

/// All declared types, keyed by their (open or named) key.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: HashMap<DependencyKey, TypeInfo>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration. A later declaration of the same key replaces
    /// the earlier one.
    pub fn declare(&mut self, info: TypeInfo) {
        debug!(key = %info.key, kind = ?info.kind, "Declared type");
        self.types.insert(info.key.clone(), info);
    }

    /// Looks up a type. Bound keys resolve to their open family's declaration.
    pub fn get(&self, key: &DependencyKey) -> Option<&TypeInfo> {
        if key.is_bound() {
            return key.generic_family().and_then(|family| self.types.get(&family));
        }
        self.types.get(key)
    }

    pub fn kind_of(&self, key: &DependencyKey) -> Option<TypeKind> {
        self.get(key).map(TypeInfo::kind)
    }

    /// Returns `true` if a parameter of this type must be looked up in the
    /// registry rather than constructed directly.
    ///
    /// Contracts, abstract types, undeclared types and resolve-all
    /// requests all go through the registry.
    pub fn requires_lookup(&self, key: &DependencyKey) -> bool {
        key.collection_of().is_some()
            || !self.kind_of(key).is_some_and(|kind| kind.is_instantiable())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Structural satisfaction check.
    ///
    /// `contract` is reachable from `producer` through declared contracts
    /// (transitively), or the two are equal. A bound producer also reaches
    /// whatever its open declaration reaches, and two bound keys match when
    /// their families do and their type arguments are equal.
    pub fn satisfies(&self, producer: &DependencyKey, contract: &DependencyKey) -> bool {
        if self.reaches(producer, contract) {
            return true;
        }

        let Some(family) = producer.generic_family().filter(|_| producer.is_bound()) else {
            return false;
        };
        if contract.is_bound() {
            producer.type_argument() == contract.type_argument()
                && contract
                    .generic_family()
                    .is_some_and(|target| self.reaches(&family, &target))
        } else {
            !contract.is_open() && self.reaches(&family, contract)
        }
    }

    /// Breadth-first walk over declared contracts.
    fn reaches(&self, from: &DependencyKey, target: &DependencyKey) -> bool {
        let mut queue = VecDeque::from([from]);
        let mut seen: HashSet<&DependencyKey> = HashSet::new();

        while let Some(key) = queue.pop_front() {
            if key == target {
                return true;
            }
            if !seen.insert(key) {
                continue;
            }
            if let Some(info) = self.types.get(key) {
                queue.extend(info.satisfies.iter());
            }
        }

        false
    }
}
