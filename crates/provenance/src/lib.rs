//! Signature provenance
//!
//! Resolves the signer's public IP address once per session and stamps each
//! signature placement with it and a fresh timestamp.

pub mod lookup;
pub mod stamper;

pub use lookup::{resolve_public_ip, HttpIpLookup, IpLookup, LookupConfig, LookupError};
pub use stamper::{MetadataStamper, ProvenanceMetadata, ResolutionHandle, UNKNOWN_IP};
