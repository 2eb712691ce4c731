//! Resolution path tracking.
//!
//! Each top-level `resolve` call carries its own [`ResolutionPath`]: the
//! stack of keys currently being resolved or constructed. Re-entering a key
//! that is still on the stack means the dependency graph has a cycle, which
//! would otherwise recurse until the stack overflows.
//!
//! Contract lookups and direct constructions are tracked as separate steps
//! so that a concrete type registered as its own contract is not mistaken
//! for a cycle.

use tracing::warn;

use crate::error::{CyclicDependencyError, WireboxError};
use crate::key::DependencyKey;

/// What the engine is doing with a key on the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Looking a contract up in the registry.
    Resolve,
    /// Running a producer's constructor.
    Construct,
}

/// In-progress resolution stack of a single `resolve` call.
#[derive(Debug, Default)]
pub(crate) struct ResolutionPath {
    frames: Vec<(DependencyKey, Step)>,
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `key`, failing if it is already on the path for the same step.
    pub fn enter(&mut self, key: &DependencyKey, step: Step) -> Result<(), WireboxError> {
        if let Some(start) = self
            .frames
            .iter()
            .position(|(k, s)| k == key && *s == step)
        {
            let mut chain: Vec<DependencyKey> =
                self.frames[start..].iter().map(|(k, _)| k.clone()).collect();
            chain.push(key.clone());

            warn!(cycle = ?chain, "Cyclic dependency detected!");

            return Err(WireboxError::CyclicDependency(CyclicDependencyError { chain }));
        }

        self.frames.push((key.clone(), step));
        Ok(())
    }

    /// Pops the most recent frame.
    pub fn leave(&mut self) {
        self.frames.pop();
    }

    /// The nearest producer under construction, for "required by" hints.
    pub fn requester(&self) -> Option<&DependencyKey> {
        self.frames
            .iter()
            .rev()
            .find(|(_, step)| *step == Step::Construct)
            .map(|(k, _)| k)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
