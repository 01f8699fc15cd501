// Adapters layer: concrete implementations of the domain ports.

#[cfg(feature = "aws")]
pub mod aws;
pub mod memory;
