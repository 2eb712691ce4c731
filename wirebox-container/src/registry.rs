//! Dependency registry — the ordered list of contract → producer bindings.
//!
//! The registry is populated during the build phase, validated once when the
//! container is constructed, and afterwards only grows by memoized
//! specializations of open generic contracts.

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::catalog::{TypeCatalog, TypeKind};
use crate::error::{
    DuplicateRegistrationError, ImplementationDefect, InvalidImplementationError, Result,
    WireboxError,
};
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;

/// One registration: which producer satisfies which contract, and for how long
/// its instances live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub contract: DependencyKey,
    pub producer: DependencyKey,
    pub lifetime: Lifetime,
}

impl Descriptor {
    pub fn new(contract: DependencyKey, producer: DependencyKey, lifetime: Lifetime) -> Self {
        Self { contract, producer, lifetime }
    }

    /// Identity for duplicate detection; lifetime is not part of it.
    fn binding(&self) -> (&DependencyKey, &DependencyKey) {
        (&self.contract, &self.producer)
    }
}

/// Stores all registrations in insertion order.
#[derive(Debug, Default)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a registration.
    ///
    /// # Errors
    /// Returns [`WireboxError::MissingArgument`] if either key is unspecified.
    pub fn register(
        &mut self,
        contract: DependencyKey,
        producer: DependencyKey,
        lifetime: Lifetime,
    ) -> Result<()> {
        if contract.is_unspecified() {
            return Err(WireboxError::MissingArgument { what: "contract" });
        }
        if producer.is_unspecified() {
            return Err(WireboxError::MissingArgument { what: "producer" });
        }

        debug!(contract = %contract, producer = %producer, lifetime = %lifetime, "Registered dependency");
        self.descriptors.push(Descriptor::new(contract, producer, lifetime));
        Ok(())
    }

    /// Validates every registration against the type catalog.
    ///
    /// Per descriptor, checks run in this order: instantiable producer,
    /// matching arity, structural satisfaction, no singleton open generics.
    /// Duplicate pairs are reported once all descriptors pass.
    #[instrument(skip_all, name = "registry_validation", fields(descriptors = self.descriptors.len()))]
    pub fn validate(&self, catalog: &TypeCatalog) -> Result<()> {
        for descriptor in &self.descriptors {
            Self::validate_descriptor(descriptor, catalog)?;
        }

        let mut seen = HashSet::new();
        for descriptor in &self.descriptors {
            if !seen.insert(descriptor.binding()) {
                return Err(WireboxError::DuplicateRegistration(
                    DuplicateRegistrationError {
                        contract: descriptor.contract.clone(),
                        producer: descriptor.producer.clone(),
                    },
                ));
            }
        }

        debug!("Registry validation passed ✓");
        Ok(())
    }

    fn validate_descriptor(descriptor: &Descriptor, catalog: &TypeCatalog) -> Result<()> {
        let Descriptor { contract, producer, lifetime } = descriptor;

        let defect = match catalog.kind_of(producer) {
            None => Some(ImplementationDefect::Undeclared),
            Some(TypeKind::Abstract) => Some(ImplementationDefect::Abstract),
            Some(TypeKind::Contract) => Some(ImplementationDefect::Contract),
            Some(TypeKind::Concrete) => None,
        };
        if let Some(defect) = defect {
            return Err(WireboxError::InvalidImplementation(
                InvalidImplementationError {
                    contract: contract.clone(),
                    producer: producer.clone(),
                    defect,
                },
            ));
        }

        if contract.is_open() != producer.is_open() {
            return Err(WireboxError::ArityMismatch {
                contract: contract.clone(),
                producer: producer.clone(),
            });
        }

        if contract.collection_of().is_some() || !catalog.satisfies(producer, contract) {
            return Err(WireboxError::TypeMismatch {
                contract: contract.clone(),
                producer: producer.clone(),
            });
        }

        if contract.is_open() && lifetime.is_cached() {
            return Err(WireboxError::SingletonOpenGeneric {
                contract: contract.clone(),
            });
        }

        Ok(())
    }

    /// First registration whose contract is exactly `key`.
    pub fn find(&self, key: &DependencyKey) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| &d.contract == key)
    }

    /// For a bound key, the open registration of its family plus the bound
    /// type argument.
    pub fn find_open<'a>(
        &'a self,
        key: &'a DependencyKey,
    ) -> Option<(&'a Descriptor, &'a DependencyKey)> {
        let argument = key.type_argument()?;
        let family = key.generic_family()?;
        let descriptor = self.find(&family)?;
        trace!(requested = %key, family = %family, "Found open registration");
        Some((descriptor, argument))
    }

    /// Every registration for `key`, in registration order.
    pub fn find_all(&self, key: &DependencyKey) -> Vec<&Descriptor> {
        self.descriptors.iter().filter(|d| &d.contract == key).collect()
    }

    /// Appends a derived descriptor unless one for the same contract exists.
    ///
    /// Returns the descriptor that is in the registry afterwards.
    pub(crate) fn memoize(&mut self, derived: Descriptor) -> Descriptor {
        if let Some(existing) = self.find(&derived.contract) {
            return existing.clone();
        }
        debug!(contract = %derived.contract, producer = %derived.producer, "Memoized specialization");
        self.descriptors.push(derived.clone());
        derived
    }

    /// All registrations, in order.
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Distinct contract keys, for "did you mean?" suggestions.
    pub fn contracts(&self) -> Vec<&DependencyKey> {
        let mut seen = HashSet::new();
        self.descriptors
            .iter()
            .map(|d| &d.contract)
            .filter(|k| seen.insert(*k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeInfo;

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.declare(TypeInfo::contract("Implementation"));
        catalog.declare(TypeInfo::contract("Impl").satisfies("Implementation"));
        catalog.declare(TypeInfo::abstract_type("AbstractClass").satisfies("Impl"));
        catalog.declare(TypeInfo::concrete("DefaultConstructorClass").satisfies("Implementation"));
        catalog.declare(TypeInfo::concrete("DefaultConstructorClass1").satisfies("Implementation"));
        catalog.declare(TypeInfo::contract(DependencyKey::open("Service")));
        catalog.declare(
            TypeInfo::concrete(DependencyKey::open("ServiceImpl"))
                .satisfies(DependencyKey::open("Service")),
        );
        catalog.declare(TypeInfo::concrete("Plain"));
        catalog
    }

    fn registry(entries: &[(DependencyKey, DependencyKey, Lifetime)]) -> Registry {
        let mut reg = Registry::new();
        for (contract, producer, lifetime) in entries {
            reg.register(contract.clone(), producer.clone(), *lifetime).unwrap();
        }
        reg
    }

    fn key(name: &str) -> DependencyKey {
        DependencyKey::named(name)
    }

    #[test]
    fn register_and_find() {
        let reg = registry(&[
            (key("Implementation"), key("DefaultConstructorClass"), Lifetime::Transient),
            (key("Implementation"), key("DefaultConstructorClass1"), Lifetime::Singleton),
        ]);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.find(&key("Implementation")).unwrap().producer, key("DefaultConstructorClass"));
        assert!(reg.find(&key("Other")).is_none());

        let all: Vec<_> = reg.find_all(&key("Implementation")).iter().map(|d| d.producer.clone()).collect();
        assert_eq!(all, vec![key("DefaultConstructorClass"), key("DefaultConstructorClass1")]);
        assert!(reg.find_all(&key("Other")).is_empty());
        assert_eq!(reg.contracts(), vec![&key("Implementation")]);
    }

    #[test]
    fn unspecified_keys_rejected() {
        let mut reg = Registry::new();
        let err = reg.register(key(""), key("X"), Lifetime::Transient).unwrap_err();
        assert!(matches!(err, WireboxError::MissingArgument { what: "contract" }));
        let err = reg.register(key("X"), key(""), Lifetime::Transient).unwrap_err();
        assert!(matches!(err, WireboxError::MissingArgument { what: "producer" }));
        assert!(reg.is_empty());
    }

    #[test]
    fn valid_registry_passes() {
        let reg = registry(&[
            (key("Implementation"), key("DefaultConstructorClass"), Lifetime::Singleton),
            (DependencyKey::open("Service"), DependencyKey::open("ServiceImpl"), Lifetime::Transient),
            (key("Plain"), key("Plain"), Lifetime::Transient),
        ]);
        assert!(reg.validate(&catalog()).is_ok());
    }

    #[test]
    fn duplicate_pair_fails_regardless_of_lifetime() {
        let reg = registry(&[
            (key("Implementation"), key("DefaultConstructorClass"), Lifetime::Transient),
            (key("Implementation"), key("DefaultConstructorClass"), Lifetime::Singleton),
        ]);
        let err = reg.validate(&catalog()).unwrap_err();
        assert!(matches!(err, WireboxError::DuplicateRegistration(_)));
    }

    #[test]
    fn abstract_and_contract_producers_fail() {
        for (producer, expected) in [
            ("AbstractClass", ImplementationDefect::Abstract),
            ("Impl", ImplementationDefect::Contract),
            ("Ghost", ImplementationDefect::Undeclared),
        ] {
            for lifetime in [Lifetime::Transient, Lifetime::Singleton] {
                let reg = registry(&[(key("Implementation"), key(producer), lifetime)]);
                match reg.validate(&catalog()).unwrap_err() {
                    WireboxError::InvalidImplementation(e) => assert_eq!(e.defect, expected),
                    other => panic!("Expected InvalidImplementation, got: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn unsatisfied_contract_is_type_mismatch() {
        let reg = registry(&[(key("Impl"), key("DefaultConstructorClass"), Lifetime::Transient)]);
        assert!(matches!(
            reg.validate(&catalog()).unwrap_err(),
            WireboxError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn resolve_all_keys_cannot_be_registered() {
        let reg = registry(&[(
            DependencyKey::all("Implementation"),
            key("DefaultConstructorClass"),
            Lifetime::Transient,
        )]);
        assert!(matches!(
            reg.validate(&catalog()).unwrap_err(),
            WireboxError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn open_closed_mix_is_arity_mismatch() {
        let reg = registry(&[(
            DependencyKey::open("Service"),
            key("DefaultConstructorClass"),
            Lifetime::Transient,
        )]);
        assert!(matches!(
            reg.validate(&catalog()).unwrap_err(),
            WireboxError::ArityMismatch { .. }
        ));

        let reg = registry(&[(key("Implementation"), DependencyKey::open("ServiceImpl"), Lifetime::Transient)]);
        assert!(matches!(
            reg.validate(&catalog()).unwrap_err(),
            WireboxError::ArityMismatch { .. }
        ));
    }

    #[test]
    fn singleton_open_generic_fails() {
        let reg = registry(&[(
            DependencyKey::open("Service"),
            DependencyKey::open("ServiceImpl"),
            Lifetime::Singleton,
        )]);
        assert!(matches!(
            reg.validate(&catalog()).unwrap_err(),
            WireboxError::SingletonOpenGeneric { .. }
        ));
    }

    #[test]
    fn find_open_binds_argument() {
        let reg = registry(&[(
            DependencyKey::open("Service"),
            DependencyKey::open("ServiceImpl"),
            Lifetime::Transient,
        )]);
        let requested = DependencyKey::open("Service").bind("Repository");
        let (descriptor, argument) = reg.find_open(&requested).unwrap();
        assert_eq!(descriptor.producer, DependencyKey::open("ServiceImpl"));
        assert_eq!(argument, &key("Repository"));
        assert!(reg.find_open(&key("Repository")).is_none());
        assert!(reg.find_open(&DependencyKey::open("Other").bind("Repository")).is_none());
    }

    #[test]
    fn find_open_argument_borrows_from_key() {
        let reg = registry(&[(
            DependencyKey::open("Service"),
            DependencyKey::open("ServiceImpl"),
            Lifetime::Transient,
        )]);
        let argument = {
            let requested = DependencyKey::open("Service").bind("Repository");
            reg.find_open(&requested).map(|(_, argument)| argument.clone())
        };
        assert_eq!(argument, Some(key("Repository")));
    }

    #[test]
    fn named_producer_of_bound_contract_passes() {
        let mut catalog = catalog();
        catalog.declare(
            TypeInfo::concrete("RepoService")
                .satisfies(DependencyKey::open("Service").bind("Repository")),
        );
        let reg = registry(&[(
            DependencyKey::open("Service").bind("Repository"),
            key("RepoService"),
            Lifetime::Transient,
        )]);
        assert!(reg.validate(&catalog).is_ok());

        let wrong = registry(&[(
            DependencyKey::open("Service").bind("Logger"),
            key("RepoService"),
            Lifetime::Transient,
        )]);
        assert!(matches!(
            wrong.validate(&catalog).unwrap_err(),
            WireboxError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn bound_producer_of_named_contract_passes() {
        let mut catalog = catalog();
        catalog.declare(
            TypeInfo::concrete(DependencyKey::open("AuditLog")).satisfies("Implementation"),
        );
        let reg = registry(&[(
            key("Implementation"),
            DependencyKey::open("AuditLog").bind("Plain"),
            Lifetime::Singleton,
        )]);
        assert!(reg.validate(&catalog).is_ok());
    }

    #[test]
    fn memoize_is_insert_if_absent() {
        let mut reg = Registry::new();
        let contract = DependencyKey::open("Service").bind("Repository");
        let first = Descriptor::new(
            contract.clone(),
            DependencyKey::open("ServiceImpl").bind("Repository"),
            Lifetime::Transient,
        );
        let second = Descriptor::new(contract.clone(), key("Other"), Lifetime::Transient);

        assert_eq!(reg.memoize(first.clone()), first);
        assert_eq!(reg.memoize(second), first);
        assert_eq!(reg.len(), 1);
    }
}
