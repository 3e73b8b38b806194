//! Typed host bindings over native RF data converter, SD-FEC, and clock synthesizer drivers.

/// Marshalling, property catalogs, descriptor grammars, and native call plumbing.
pub mod bind;
/// LMK04208 / LMX2594 clock synthesizer register loading.
pub mod clock;
/// RF data converter device, tile, and block hierarchy.
pub mod rfdc;
/// Soft-decision FEC core with LDPC code provisioning.
pub mod sdfec;
