//! Constructors and the constructor selector.
//!
//! Rust has no runtime reflection, so every producer declares its
//! constructors explicitly: an ordered parameter list plus a closure that
//! builds the value from the resolved arguments.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, Result, WireboxError};
use crate::instance::Instance;
use crate::key::DependencyKey;

/// Type-erased constructor body.
///
/// Shared between threads (the container is `Send + Sync`), hence `Arc`.
pub type ConstructFn =
    Arc<dyn Fn(&mut Arguments) -> std::result::Result<Arc<dyn Any + Send + Sync>, BoxError> + Send + Sync>;

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// A parameter of a fixed type.
    Type(DependencyKey),
    /// The producer's generic type argument (`T` in `ServiceImpl<T>`).
    TypeArgument,
}

impl Param {
    /// A parameter of type `key`.
    pub fn of(key: impl Into<DependencyKey>) -> Self {
        Param::Type(key.into())
    }

    /// The generic slot of an open producer.
    pub fn type_argument() -> Self {
        Param::TypeArgument
    }

    /// Substitutes the producer's type argument into this parameter.
    ///
    /// Returns `None` for a generic slot on a producer that has no argument.
    pub fn bind(&self, argument: Option<&DependencyKey>) -> Option<DependencyKey> {
        match self {
            Param::Type(key) => Some(key.clone()),
            Param::TypeArgument => argument.cloned(),
        }
    }
}

/// A declared constructor of a producer type.
///
/// # Examples
/// ```
/// use wirebox_container::constructor::{Constructor, Param};
/// use wirebox_container::instance::Instance;
///
/// struct ServiceImpl {
///     repository: Instance,
/// }
///
/// let ctor = Constructor::new([Param::of("Repository")], |args| {
///     Ok(ServiceImpl { repository: args.next()? })
/// });
/// assert_eq!(ctor.arity(), 1);
/// assert!(ctor.is_public());
/// ```
#[derive(Clone)]
pub struct Constructor {
    params: Vec<Param>,
    public: bool,
    body: ConstructFn,
}

impl Constructor {
    /// Creates a public constructor from its parameters and body.
    pub fn new<T, F>(params: impl IntoIterator<Item = Param>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut Arguments) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            params: params.into_iter().collect(),
            public: true,
            body: Arc::new(move |args: &mut Arguments| {
                Ok(Arc::new(body(args)?) as Arc<dyn Any + Send + Sync>)
            }),
        }
    }

    /// Marks this constructor as not publicly invocable.
    ///
    /// Private constructors are ignored by [`select_constructor`].
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Ordered parameter list.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Runs the body over resolved arguments.
    ///
    /// Leftover arguments are a shape mismatch, same as missing ones.
    pub(crate) fn invoke(
        &self,
        producer: &DependencyKey,
        values: Vec<Instance>,
    ) -> std::result::Result<Arc<dyn Any + Send + Sync>, BoxError> {
        let mut args = Arguments::new(producer.clone(), values);
        let value = (self.body)(&mut args)?;
        if args.remaining() > 0 {
            return Err(ArgumentError::Unused {
                producer: producer.clone(),
                count: args.remaining(),
            }
            .into());
        }
        Ok(value)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .field("public", &self.public)
            .finish()
    }
}

/// Selects the constructor to call for `producer`.
///
/// Policy: among public constructors, the one with the fewest parameters;
/// ties go to the first declared.
///
/// # Errors
/// [`WireboxError::NoPublicConstructor`] if none is public.
pub fn select_constructor<'a>(
    producer: &DependencyKey,
    constructors: &'a [Constructor],
) -> Result<&'a Constructor> {
    // min_by_key keeps the first of equal minima
    constructors
        .iter()
        .filter(|c| c.is_public())
        .min_by_key(|c| c.arity())
        .ok_or_else(|| WireboxError::NoPublicConstructor {
            producer: producer.clone(),
        })
}

/// Argument shape problems raised while a constructor body runs.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("{producer} asked for more arguments than its constructor declares")]
    Exhausted { producer: DependencyKey },

    #[error("argument {index} of {producer} is {actual}, not {expected}")]
    WrongType {
        producer: DependencyKey,
        index: usize,
        actual: DependencyKey,
        expected: &'static str,
    },

    #[error("{producer} left {count} argument(s) unused")]
    Unused { producer: DependencyKey, count: usize },
}

/// Resolved arguments handed to a constructor body, in parameter order.
pub struct Arguments {
    producer: DependencyKey,
    values: std::vec::IntoIter<Instance>,
    index: usize,
}

impl Arguments {
    fn new(producer: DependencyKey, values: Vec<Instance>) -> Self {
        Self {
            producer,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// The producer being constructed.
    pub fn producer(&self) -> &DependencyKey {
        &self.producer
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Takes the next argument as a type-erased instance.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> std::result::Result<Instance, ArgumentError> {
        let value = self.values.next().ok_or_else(|| ArgumentError::Exhausted {
            producer: self.producer.clone(),
        })?;
        self.index += 1;
        Ok(value)
    }

    /// Takes the next argument and downcasts it to `T`.
    pub fn next_as<T: Any + Send + Sync>(&mut self) -> std::result::Result<Arc<T>, ArgumentError> {
        let index = self.index;
        let instance = self.next()?;
        instance
            .downcast::<T>()
            .ok_or_else(|| ArgumentError::WrongType {
                producer: self.producer.clone(),
                index,
                actual: instance.producer().clone(),
                expected: type_name::<T>(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unit;

    fn ctor(arity: usize) -> Constructor {
        Constructor::new((0..arity).map(|i| Param::of(format!("P{i}"))), |_| Ok(Unit))
    }

    #[test]
    fn fewest_parameters_wins() {
        let ctors = vec![ctor(2), ctor(0), ctor(1)];
        let chosen = select_constructor(&DependencyKey::named("X"), &ctors).unwrap();
        assert_eq!(chosen.arity(), 0);
    }

    #[test]
    fn tie_goes_to_first_declared() {
        let first = Constructor::new([Param::of("A")], |_| Ok(Unit));
        let second = Constructor::new([Param::of("B")], |_| Ok(Unit));
        let ctors = vec![ctor(3), first, second];

        let chosen = select_constructor(&DependencyKey::named("X"), &ctors).unwrap();
        assert_eq!(chosen.params(), &[Param::of("A")]);
    }

    #[test]
    fn private_constructors_are_skipped() {
        let ctors = vec![ctor(0).private(), ctor(2)];
        let chosen = select_constructor(&DependencyKey::named("X"), &ctors).unwrap();
        assert_eq!(chosen.arity(), 2);
    }

    #[test]
    fn no_public_constructor() {
        let ctors = vec![ctor(0).private()];
        let err = select_constructor(&DependencyKey::named("X"), &ctors).unwrap_err();
        assert!(matches!(err, WireboxError::NoPublicConstructor { .. }));

        assert!(select_constructor(&DependencyKey::named("X"), &[]).is_err());
    }

    #[test]
    fn type_argument_binding() {
        let arg = DependencyKey::named("Repository");
        assert_eq!(Param::type_argument().bind(Some(&arg)), Some(arg.clone()));
        assert_eq!(Param::type_argument().bind(None), None);
        assert_eq!(Param::of("Logger").bind(Some(&arg)), Some("Logger".into()));
    }

    #[test]
    fn invoke_reports_shape_mismatch() {
        let producer = DependencyKey::named("Greedy");
        let greedy = Constructor::new([], |args| {
            let _ = args.next()?;
            Ok(Unit)
        });
        assert!(greedy.invoke(&producer, vec![]).is_err());

        let lazy = Constructor::new([Param::of("A")], |_| Ok(Unit));
        let extra = Instance::new(DependencyKey::named("A"), Arc::new(Unit));
        let err = lazy.invoke(&producer, vec![extra]).unwrap_err();
        assert!(err.to_string().contains("unused"));
    }

    #[test]
    fn next_as_downcasts() {
        let producer = DependencyKey::named("Consumer");
        let ctor = Constructor::new([Param::of("Number")], |args| {
            let n = args.next_as::<u32>()?;
            Ok(*n + 1)
        });

        let value = Instance::new(DependencyKey::named("Number"), Arc::new(41u32));
        let built = ctor.invoke(&producer, vec![value]).unwrap();
        assert_eq!(built.downcast_ref::<u32>(), Some(&42));

        let wrong = Instance::new(DependencyKey::named("Text"), Arc::new("x"));
        let err = ctor.invoke(&producer, vec![wrong]).unwrap_err();
        assert!(err.to_string().contains("not u32"));
    }
}
