//! Error types for Wirebox container operations.
//!
//! Validation errors surface from [`ContainerBuilder::build()`](crate::container::ContainerBuilder::build);
//! resolution errors surface from the failing `resolve` call only.

use std::fmt;

use wirebox_support::rendering::render_chain;

use crate::key::DependencyKey;

/// Boxed error returned by user constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all Wirebox operations.
#[derive(Debug, thiserror::Error)]
pub enum WireboxError {
    /// A registration or container construction received an unspecified input.
    #[error("Missing argument: {what} must be specified")]
    MissingArgument { what: &'static str },

    /// The producer cannot be instantiated at all.
    #[error("{}", .0)]
    InvalidImplementation(InvalidImplementationError),

    /// The producer does not satisfy the contract it was registered for.
    #[error("Type mismatch: {producer} does not satisfy {contract}")]
    TypeMismatch {
        contract: DependencyKey,
        producer: DependencyKey,
    },

    /// Exactly one of contract and producer is an open generic.
    #[error(
        "Arity mismatch: {contract} and {producer} must both be open generics or both be closed"
    )]
    ArityMismatch {
        contract: DependencyKey,
        producer: DependencyKey,
    },

    /// An open generic contract was registered as a singleton.
    #[error(
        "Open generic contract {contract} cannot be a Singleton\n  Hint: register it as Transient; each specialization is built on demand"
    )]
    SingletonOpenGeneric { contract: DependencyKey },

    /// The same `(contract, producer)` pair was registered twice.
    #[error("{}", .0)]
    DuplicateRegistration(DuplicateRegistrationError),

    /// Nothing registered (or derivable) satisfies the requested key.
    #[error("{}", .0)]
    Unresolvable(UnresolvableError),

    /// The producer exposes no public constructor.
    #[error("No public constructor on {producer}")]
    NoPublicConstructor { producer: DependencyKey },

    /// The chosen constructor failed.
    #[error("Failed to construct {producer}: {source}")]
    InstantiationFailed {
        producer: DependencyKey,
        #[source]
        source: BoxError,
    },

    /// Resolution re-entered a key that is still being resolved.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),

    /// A typed resolve asked for the wrong concrete type.
    #[error("Resolved {key} to {producer}, which is not a {expected}")]
    Downcast {
        key: DependencyKey,
        producer: DependencyKey,
        expected: &'static str,
    },
}

impl WireboxError {
    /// Returns `true` for errors raised while validating registrations.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WireboxError::MissingArgument { .. }
                | WireboxError::InvalidImplementation(_)
                | WireboxError::TypeMismatch { .. }
                | WireboxError::ArityMismatch { .. }
                | WireboxError::SingletonOpenGeneric { .. }
                | WireboxError::DuplicateRegistration(_)
        )
    }
}

/// Why a producer can never be instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplementationDefect {
    /// Declared abstract.
    Abstract,
    /// Declared as a contract.
    Contract,
    /// Never declared in the type catalog.
    Undeclared,
}

impl fmt::Display for ImplementationDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImplementationDefect::Abstract => write!(f, "is abstract"),
            ImplementationDefect::Contract => write!(f, "is itself a contract"),
            ImplementationDefect::Undeclared => write!(f, "was never declared"),
        }
    }
}

/// Error when a registered producer is not instantiable.
#[derive(Debug)]
pub struct InvalidImplementationError {
    pub contract: DependencyKey,
    pub producer: DependencyKey,
    pub defect: ImplementationDefect,
}

impl fmt::Display for InvalidImplementationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid implementation: {} registered for {} {}",
            self.producer, self.contract, self.defect
        )?;
        match self.defect {
            ImplementationDefect::Undeclared => write!(
                f,
                "\n  Hint: Did you forget to call .declare() for {}?",
                self.producer.short_name()
            ),
            _ => write!(f, "\n  Hint: Register a concrete type as the producer"),
        }
    }
}

/// Error when a `(contract, producer)` pair is registered more than once.
#[derive(Debug)]
pub struct DuplicateRegistrationError {
    pub contract: DependencyKey,
    pub producer: DependencyKey,
}

impl fmt::Display for DuplicateRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duplicate registration: {} → {}",
            self.contract, self.producer,
        )?;
        write!(
            f,
            "\n  Hint: The same pair is rejected regardless of lifetime; remove one of them"
        )
    }
}

/// Error when a dependency cannot be resolved.
///
/// Includes helpful hints about what went wrong.
#[derive(Debug)]
pub struct UnresolvableError {
    /// The dependency that was requested
    pub requested: DependencyKey,
    /// What required this dependency (if known)
    pub required_by: Option<DependencyKey>,
    /// Similar keys that ARE registered (for "did you mean?" suggestions)
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnresolvableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unresolvable dependency: {}", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: Did you forget to register a producer for {}?",
            self.requested.short_name()
        )
    }
}

/// Error when a dependency cycle is detected.
///
/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CyclicDependencyError {
    /// The chain that forms the cycle; first and last entries are equal.
    /// Example: ["A", "AImpl", "B", "BImpl", "A"]
    pub chain: Vec<DependencyKey>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclic dependency detected:\n  ")?;

        let names: Vec<String> = self.chain.iter().map(DependencyKey::short_name).collect();
        write!(f, "{}", render_chain(&names))?;

        write!(
            f,
            "\n  Hint: Break the cycle by restructuring the constructors involved"
        )
    }
}

/// Convenient Result type for Wirebox operations.
pub type Result<T> = std::result::Result<T, WireboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolvable_error_display() {
        let err = WireboxError::Unresolvable(UnresolvableError {
            requested: DependencyKey::named("Repository"),
            required_by: Some(DependencyKey::named("ServiceImpl")),
            suggestions: vec!["RepositoryImpl".into()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Unresolvable"));
        assert!(msg.contains("Required by: ServiceImpl"));
        assert!(msg.contains("- RepositoryImpl"));
    }

    #[test]
    fn cyclic_dependency_error_display() {
        let err = WireboxError::CyclicDependency(CyclicDependencyError {
            chain: vec![
                DependencyKey::named("A"),
                DependencyKey::named("B"),
                DependencyKey::named("A"),
            ],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Cyclic"));
        assert!(msg.contains("A → B → A"));
    }

    #[test]
    fn invalid_implementation_display() {
        let err = WireboxError::InvalidImplementation(InvalidImplementationError {
            contract: DependencyKey::named("Implementation"),
            producer: DependencyKey::named("AbstractClass"),
            defect: ImplementationDefect::Abstract,
        });

        let msg = format!("{err}");
        assert!(msg.contains("AbstractClass"));
        assert!(msg.contains("is abstract"));
    }

    #[test]
    fn validation_classification() {
        let dup = WireboxError::DuplicateRegistration(DuplicateRegistrationError {
            contract: DependencyKey::named("A"),
            producer: DependencyKey::named("B"),
        });
        assert!(dup.is_validation());

        let missing = WireboxError::NoPublicConstructor {
            producer: DependencyKey::named("B"),
        };
        assert!(!missing.is_validation());
    }
}
