//! Domain layer for newscast
//!
//! Mail messages, newsletter profiles, extracted content and podcast scripts.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
