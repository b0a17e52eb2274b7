//! Provider-facing descriptors.
//!
//! `descriptor` exposes validated endpoint metadata (`ProviderDescriptor`) for the
//! authorization, token, and AccessLink users endpoints, plus the builder used to assemble it
//! for the production Polar deployment or for a mock provider in tests.

pub mod descriptor;

pub use descriptor::*;
