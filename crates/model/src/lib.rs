//! Shared contracts for grounded generation.
//!
//! This crate establishes the protocol between a grounded generation
//! provider, the redirect resolver that post-processes its citations,
//! and the client that glues them together.
//!
//! Types in this crate don't define any network behavior, instead they
//! are the constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod probe;
mod provider;
mod request;
mod response;

pub use error::*;
pub use probe::*;
pub use provider::*;
pub use request::*;
pub use response::*;
