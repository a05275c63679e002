//! WaveFlow Studio REST API contract types and validation
//!
//! This crate defines the wire types exchanged with the WaveFlow Studio
//! service and the local validation applied to requests before they are
//! sent. The types are shared between the REST client, the mock client and
//! anything that implements the client API trait.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
pub use validation::*;
