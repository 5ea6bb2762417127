//! Record reconciler
//!
//! The Reconciler is responsible for one address family at a time:
//! - Discovering which provider records already hold the resolved address
//! - Deciding between the zero-write, create, and fan-out-update paths
//! - Reporting the record set now believed correct
//!
//! ## Decision flow
//!
//! ```text
//! list ids ──fetch each──▶ matching = records whose target == address
//!
//! matching non-empty ──▶ steady state: no writes, matching becomes the
//!                        new known-correct set
//!
//! matching empty,
//! previous empty     ──▶ create one apex record + refresh zone;
//!                        return empty (next pass discovers the record)
//!
//! matching empty,
//! previous non-empty ──▶ update every previous record by id (best effort),
//!                        then one refresh; return previous unchanged
//! ```
//!
//! ## Failure isolation
//!
//! Only the initial listing call aborts a pass. Per-record fetch failures,
//! create/update failures and refresh failures are logged and contained so
//! the next scheduled tick can correct whatever was missed.

use crate::error::Result;
use crate::state::ManagedRecord;
use crate::traits::resolver::{AddressFamily, PublicAddress};
use crate::traits::zone_client::{RecordData, ZoneClient};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reconciles one domain's records of one family against the resolved address
///
/// The reconciler is pure with respect to tracking state: the previously
/// known-correct records go in by value and the replacement set comes out.
/// All side effects are provider-side, through the [`ZoneClient`].
pub struct Reconciler {
    /// Zone client for record CRUD and refresh
    client: Arc<dyn ZoneClient>,

    /// The one managed domain
    domain: String,
}

impl Reconciler {
    /// Create a reconciler for one domain
    pub fn new(client: Arc<dyn ZoneClient>, domain: impl Into<String>) -> Self {
        Self {
            client,
            domain: domain.into(),
        }
    }

    /// The domain this reconciler manages
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Run one reconciliation pass for one family
    ///
    /// # Parameters
    ///
    /// - `previous`: records believed correct after the last pass
    /// - `family`: the address family being reconciled
    /// - `address`: the freshly resolved public address
    ///
    /// # Returns
    ///
    /// - `Ok(records)`: the set now believed correct, to feed into the next pass
    /// - `Err(Error)`: the pass aborted (listing or creation failed); the
    ///   caller keeps its previous state and retries on the next tick
    pub async fn reconcile(
        &self,
        previous: Vec<ManagedRecord>,
        family: AddressFamily,
        address: &PublicAddress,
    ) -> Result<Vec<ManagedRecord>> {
        let matching = self.discover_matching(family, address).await.map_err(|e| {
            error!(%family, error = %e, "failed to list {} records", family.record_type());
            e
        })?;

        if !matching.is_empty() {
            // Steady state: the address is already published, write nothing.
            info!(
                %family,
                address = %address,
                count = matching.len(),
                "public address already present in {} record(s)",
                family.record_type()
            );
            return Ok(matching);
        }

        if previous.is_empty() {
            self.create_initial_record(family, address).await?;
            // The created record is not re-fetched here; the next pass's
            // discovery picks it up by listing. Until then the known set
            // stays empty.
            return Ok(previous);
        }

        self.update_previous_records(&previous, family, address).await;
        Ok(previous)
    }

    /// Discover records of the family's type whose target equals `address`
    ///
    /// A listing failure is fatal to the pass. A single record's fetch
    /// failure is logged and skipped, so one broken record cannot stall the
    /// rest of discovery.
    async fn discover_matching(
        &self,
        family: AddressFamily,
        address: &PublicAddress,
    ) -> Result<Vec<ManagedRecord>> {
        let record_type = family.record_type();
        let ids = self.client.list_record_ids(&self.domain, record_type).await?;

        let mut matching = Vec::new();
        for id in ids {
            match self.client.fetch_record(&self.domain, id).await {
                Ok(data) => {
                    if data.target == address.as_str() {
                        debug!(
                            record_id = id,
                            record_type = %data.record_type,
                            subdomain = %data.subdomain,
                            target = %data.target,
                            "matching record found"
                        );
                        matching.push(ManagedRecord::from_parts(id, data));
                    }
                }
                Err(e) => {
                    warn!(record_id = id, error = %e, "failed to fetch record detail, skipping");
                }
            }
        }

        Ok(matching)
    }

    /// Create the first-ever record for a family and publish it
    ///
    /// One apex record with ttl 0 (provider default), followed by one zone
    /// refresh. A refresh failure is logged only; the provider's own
    /// propagation may still publish the change.
    async fn create_initial_record(
        &self,
        family: AddressFamily,
        address: &PublicAddress,
    ) -> Result<()> {
        let record = RecordData::apex(family.record_type(), address.as_str());

        if let Err(e) = self.client.create_record(&self.domain, &record).await {
            error!(
                %family,
                address = %address,
                ttl = record.ttl,
                error = %e,
                "failed to create record"
            );
            return Err(e);
        }
        info!(%family, address = %address, ttl = record.ttl, "created new apex record");

        if let Err(e) = self.client.refresh_zone(&self.domain).await {
            warn!(error = %e, "failed to refresh zone after record creation");
        }
        Ok(())
    }

    /// Point every previously-known record at the new address, best effort
    ///
    /// Updates are fanned out one by one; a failure is logged and does not
    /// abort sibling updates. One refresh follows the whole batch regardless
    /// of partial failures, since correctness is re-validated by the next
    /// pass's discovery.
    async fn update_previous_records(
        &self,
        previous: &[ManagedRecord],
        family: AddressFamily,
        address: &PublicAddress,
    ) {
        for prev in previous {
            let update = prev.retarget(address);
            match self.client.update_record(&self.domain, prev.id, &update).await {
                Ok(()) => {
                    debug!(
                        record_id = prev.id,
                        record_type = %prev.record_type,
                        subdomain = %prev.subdomain,
                        "updated record"
                    );
                }
                Err(e) => {
                    error!(
                        record_id = prev.id,
                        record_type = %prev.record_type,
                        subdomain = %prev.subdomain,
                        error = %e,
                        "failed to update record"
                    );
                }
            }
        }

        if let Err(e) = self.client.refresh_zone(&self.domain).await {
            warn!(error = %e, "failed to refresh zone after updates");
        }

        info!(
            %family,
            address = %address,
            count = previous.len(),
            "updated {} record(s) with new public address",
            family.record_type()
        );
    }
}
