//! Core resolution engine for Wirebox.

mod cache;
pub mod catalog;
pub mod constructor;
pub mod container;
pub mod error;
pub mod instance;
pub mod key;
pub mod lifetime;
mod path;
pub mod provider;
pub mod registry;

pub use container::{Container, ContainerBuilder, prelude};
pub use error::{Result, WireboxError};
pub use instance::Instance;
pub use key::DependencyKey;
pub use lifetime::Lifetime;
