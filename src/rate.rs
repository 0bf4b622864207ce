//! Carrier-agnostic request and rate models.
//!
//! Everything here is independent of any carrier's wire format. [`RateRequest::validate`]
//! enforces the invariants a request must satisfy before it is allowed onto the network, and
//! [`NormalizedRate`] is what every carrier's response is reduced to.

pub mod address;
pub mod normalized;
pub mod package;
pub mod request;
pub mod service;

pub use address::*;
pub use normalized::*;
pub use package::*;
pub use request::*;
pub use service::*;
