//! Randomized mock approver for seller applications.
//!
//! Stands in for a human reviewer during demos: on every tick it approves an
//! application that is waiting for approval with a fixed probability.
//! Explicit admin approval works whether or not this runs.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{ApprovalConfig, SimulatedDelays};
use crate::services::{SellerError, SellerService};
use crate::store::{Storage, StoreError, keys};

/// Background approver configuration bound to a profile.
#[derive(Debug, Clone)]
pub struct ApprovalSimulator {
    storage: Storage,
    tick: Duration,
    probability: f64,
}

impl ApprovalSimulator {
    /// Create an approver for `storage`.
    #[must_use]
    pub fn new(storage: Storage, config: ApprovalConfig) -> Self {
        Self {
            storage,
            tick: config.tick,
            probability: config.probability.clamp(0.0, 1.0),
        }
    }

    /// Roll once for the pending application, if there is one.
    ///
    /// Returns whether an application was approved.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn tick_once<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<bool, StoreError> {
        let Some(session) = self.storage.read(keys::USER)? else {
            return Ok(false);
        };
        let waiting = session
            .seller
            .as_ref()
            .is_some_and(crate::models::SellerApplication::awaiting_approval);
        if !waiting || !rng.random_bool(self.probability) {
            return Ok(false);
        }

        match SellerService::new(&self.storage, SimulatedDelays::none()).approve(&session.email) {
            Ok(_) => {
                tracing::info!(email = %session.email, "Mock approver approved seller");
                Ok(true)
            }
            // The application changed between the read and the approval.
            Err(SellerError::NotReadyForApproval | SellerError::ApplicantNotFound(_)) => Ok(false),
            Err(SellerError::Store(e)) => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Mock approval failed");
                Ok(false)
            }
        }
    }

    /// Run the approver on a background task until shut down.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(self) -> ApprovalHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut rng = StdRng::from_os_rng();
            let mut interval = tokio::time::interval(self.tick);
            // The first tick completes immediately; consume it.
            interval.tick().await;

            tracing::info!(
                tick_ms = self.tick.as_millis(),
                probability = self.probability,
                "Mock approver started"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = self.tick_once(&mut rng) {
                            tracing::error!(error = %e, "Mock approver tick failed");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }

            tracing::info!("Mock approver stopped");
        });

        ApprovalHandle {
            shutdown_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running approver.
///
/// Call [`shutdown`](Self::shutdown) to stop it gracefully; dropping the
/// handle aborts the task.
#[derive(Debug)]
pub struct ApprovalHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ApprovalHandle {
    /// Signal the approver to stop and wait for it.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::error!(error = %e, "Mock approver task panicked");
        }
    }
}

impl Drop for ApprovalHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
