//! Carrier descriptors and the normalizers that translate between the carrier-agnostic model
//! and each carrier's wire format.

pub mod descriptor;
pub mod normalizer;
pub mod ups;

pub use descriptor::*;
pub use normalizer::*;
pub use ups::UpsNormalizer;
