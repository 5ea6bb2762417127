// # ipsync-core
//
// Core library for the ipsync DNS reconciliation loop.
//
// ## Architecture Overview
//
// This library keeps a domain's A/AAAA records synchronized with the host's
// current public address:
// - **AddressResolver**: Trait for discovering the current public address
// - **ZoneClient**: Trait for record CRUD against a DNS provider API
// - **Reconciler**: Decides and performs the minimal create/update set per family
// - **Driver**: Runs one reconciliation pass per family on a fixed interval
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider/resolver
//    implementations
// 2. **Explicit State**: The known-correct record sets are owned by the driver
//    and passed by value through the reconciler, never global
// 3. **Failure Isolation**: Errors are contained to one record, one family,
//    one tick; only startup failures are fatal
// 4. **Write Avoidance**: The steady-state path performs zero provider
//    mutations

pub mod config;
pub mod driver;
pub mod error;
pub mod reconcile;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{ProviderConfig, ResolverConfig, SyncConfig};
pub use driver::Driver;
pub use error::{Error, Result};
pub use reconcile::Reconciler;
pub use state::{ManagedRecord, ReconciliationState};
pub use traits::{
    AddressFamily, AddressResolver, PublicAddress, RecordData, RecordId, RecordType, ZoneClient,
};
