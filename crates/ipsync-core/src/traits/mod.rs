//! Core traits for the ipsync system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressResolver`]: Discover the host's current public address
//! - [`ZoneClient`]: Record CRUD and zone refresh against a DNS provider

pub mod resolver;
pub mod zone_client;

pub use resolver::{AddressFamily, AddressResolver, PublicAddress};
pub use zone_client::{RecordData, RecordId, RecordType, ZoneClient};
