//! Sync driver
//!
//! The Driver runs one reconciliation pass per tracked address family on a
//! fixed interval, forever, until told to stop.
//!
//! ## Tick flow
//!
//! ```text
//! wait interval ──▶ for each family (V4 then V6):
//!                     resolve public address ──failure──▶ log, skip family
//!                     reconcile(previous, family, address)
//!                     store returned state for the next tick
//! ```
//!
//! ## Shutdown
//!
//! Cancellation is observed while waiting for the next tick. A tick that has
//! already started runs to completion; in-flight provider calls are never
//! abandoned mid-request.
//!
//! ## Threading
//!
//! A single task drives the loop. Families are processed sequentially within
//! a tick, so no two provider mutations for the same zone ever overlap.

use crate::error::Result;
use crate::reconcile::Reconciler;
use crate::state::ReconciliationState;
use crate::traits::resolver::{AddressFamily, AddressResolver};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Fixed-interval loop that keeps every tracked family reconciled
pub struct Driver {
    /// Public-address resolver, queried once per family per tick
    resolver: Arc<dyn AddressResolver>,

    /// Reconciler for the managed domain
    reconciler: Reconciler,

    /// Families processed each tick, in order
    families: Vec<AddressFamily>,

    /// Time between ticks
    interval: Duration,

    /// Per-family known-correct record sets, owned here exclusively
    state: ReconciliationState,
}

impl Driver {
    /// Create a driver tracking the default families (V4 then V6)
    pub fn new(resolver: Arc<dyn AddressResolver>, reconciler: Reconciler, interval: Duration) -> Self {
        Self::with_families(resolver, reconciler, AddressFamily::ALL.to_vec(), interval)
    }

    /// Create a driver tracking an explicit family list
    pub fn with_families(
        resolver: Arc<dyn AddressResolver>,
        reconciler: Reconciler,
        families: Vec<AddressFamily>,
        interval: Duration,
    ) -> Self {
        Self {
            resolver,
            reconciler,
            families,
            interval,
            state: ReconciliationState::new(),
        }
    }

    /// Run the loop until SIGINT
    ///
    /// # Returns
    ///
    /// - `Ok(())`: clean shutdown
    /// - `Err(Error)`: failed to install the signal handler
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the loop until the given channel fires
    ///
    /// Used by the daemon (which owns SIGTERM/SIGINT handling) and by tests
    /// that need a deterministic stop.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> Result<()> {
        self.run_internal(Some(shutdown_rx)).await
    }

    /// Internal run implementation that accepts an optional shutdown channel
    async fn run_internal(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        info!(
            domain = %self.reconciler.domain(),
            interval_secs = self.interval.as_secs(),
            families = self.families.len(),
            "starting sync loop"
        );

        if let Some(mut rx) = shutdown_rx {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {
                        self.run_tick().await;
                    }

                    _ = &mut rx => {
                        info!("shutdown signal received, closing sync loop");
                        break;
                    }
                }
            }
        } else {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {
                        self.run_tick().await;
                    }

                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received, closing sync loop");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one tick: a full pass over every tracked family
    ///
    /// Errors are contained per family; a failed resolution or pass never
    /// affects the other family's processing within the same tick, and never
    /// terminates the loop.
    async fn run_tick(&mut self) {
        for &family in &self.families {
            let address = match self.resolver.resolve(family).await {
                Ok(addr) => addr,
                Err(e) => {
                    error!(%family, error = %e, "failed to resolve public address, skipping this tick");
                    continue;
                }
            };
            debug!(%family, address = %address, "resolved public address");

            let previous = self.state.records(family);
            match self.reconciler.reconcile(previous, family, &address).await {
                Ok(records) => {
                    self.state.replace(family, records);
                }
                Err(e) => {
                    // State stays as it was; the next tick retries.
                    error!(%family, error = %e, "reconciliation pass failed");
                }
            }
        }
    }
}
