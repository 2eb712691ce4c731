//! # Wirebox — constructor-injection resolution engine
//!
//! Declare your types, bind contracts to producers, and let the container
//! build the object graph: recursively, once per singleton, and with open
//! generic contracts specialized on demand.
//!
//! ```rust
//! use wirebox::prelude::*;
//!
//! struct Clock;
//!
//! let container = Container::builder()
//!     .declare(TypeInfo::contract("TimeSource"))
//!     .declare(
//!         TypeInfo::concrete("Clock")
//!             .satisfies("TimeSource")
//!             .constructor(Constructor::new([], |_| Ok(Clock))),
//!     )
//!     .singleton("TimeSource", "Clock")
//!     .build()
//!     .expect("valid registrations");
//!
//! let a = container.resolve("TimeSource").unwrap();
//! let b = container.resolve("TimeSource").unwrap();
//! assert!(a.same_as(&b));
//! ```

pub use wirebox_container::*;
pub use wirebox_support::*;
