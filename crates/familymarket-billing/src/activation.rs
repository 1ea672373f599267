//! Subscription activation reconciliation.
//!
//! The webhook normally flips `suscripcion.estado` to "activa" while the
//! buyer is still on the checkout return page. Activation waits for that
//! write with a bounded fixed-interval poll; if the webhook never lands,
//! the subscription is reconciled with one direct write instead of
//! surfacing an error to the buyer.
//!
//! States: Pending → Confirmed | TimedOut → ManuallyReconciled.

use std::time::Duration;

use familymarket_core::BillingSettings;
use familymarket_store::{subscription_status, StoreBackend};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

pub const ACTIVE_STATUS: &str = "activa";

/// Lifecycle of one activation watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    Pending,
    Confirmed,
    TimedOut,
    ManuallyReconciled,
}

/// Terminal report of one activation watch.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationOutcome {
    pub id: Uuid,
    pub state: ActivationState,
    /// Store reads performed before reaching the terminal state.
    pub attempts_used: u32,
}

/// Bounded fixed-interval poller awaiting the webhook-driven activation.
#[derive(Debug, Clone, Copy)]
pub struct ActivationPoller {
    attempts: u32,
    interval: Duration,
}

impl ActivationPoller {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
        }
    }

    pub fn from_settings(settings: &BillingSettings) -> Self {
        Self::new(
            settings.poll_attempts,
            Duration::from_secs(settings.poll_interval_secs),
        )
    }

    /// Drive the state machine to a terminal state. A cancel signal
    /// (value flipped to `true`) stops the watch early, leaving the
    /// subscription Pending for a later confirmation attempt.
    pub async fn await_activation(
        &self,
        store: &StoreBackend,
        user_id: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> ActivationOutcome {
        let id = Uuid::new_v4();

        for attempt in 1..=self.attempts {
            match self.is_active(store, user_id).await {
                Some(true) => {
                    info!("Activation {id}: confirmed for {user_id} on attempt {attempt}");
                    return ActivationOutcome {
                        id,
                        state: ActivationState::Confirmed,
                        attempts_used: attempt,
                    };
                }
                Some(false) => {}
                // Read failures keep the watch alive; the webhook may
                // still land before the attempts run out.
                None => warn!("Activation {id}: user read failed on attempt {attempt}"),
            }

            if attempt < self.attempts && self.wait_or_cancel(&mut cancel).await {
                info!("Activation {id}: cancelled for {user_id}");
                return ActivationOutcome {
                    id,
                    state: ActivationState::Pending,
                    attempts_used: attempt,
                };
            }
        }

        // Attempts exhausted: reconcile directly.
        warn!(
            "Activation {id}: webhook never confirmed {user_id} after {} attempts, reconciling manually",
            self.attempts
        );
        match store.set_subscription_status(user_id, ACTIVE_STATUS).await {
            Ok(()) => ActivationOutcome {
                id,
                state: ActivationState::ManuallyReconciled,
                attempts_used: self.attempts,
            },
            Err(e) => {
                warn!("Activation {id}: manual reconciliation write failed: {e}");
                ActivationOutcome {
                    id,
                    state: ActivationState::TimedOut,
                    attempts_used: self.attempts,
                }
            }
        }
    }

    /// Wait one interval; true means the watch was cancelled. A dropped
    /// cancel sender degrades to a plain sleep.
    async fn wait_or_cancel(&self, cancel: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.interval);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = cancel.changed() => match changed {
                    Ok(()) if *cancel.borrow() => return true,
                    Ok(()) => {}
                    Err(_) => {
                        sleep.as_mut().await;
                        return false;
                    }
                },
            }
        }
    }

    async fn is_active(&self, store: &StoreBackend, user_id: &str) -> Option<bool> {
        let user = store.get_user(user_id).await.ok()?;
        Some(
            user.as_ref()
                .and_then(subscription_status)
                .map(|status| status == ACTIVE_STATUS)
                .unwrap_or(false),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use familymarket_store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn store_with_user(estado: Option<&str>) -> StoreBackend {
        let store = MemoryStore::new();
        let doc = match estado {
            Some(estado) => json!({ "suscripcion": { "estado": estado } }),
            None => json!({ "nombre": "Ana" }),
        };
        store.insert("users", "u1", doc);
        StoreBackend::Memory(store)
    }

    fn no_cancel() -> watch::Receiver<bool> {
        let (_tx, rx) = watch::channel(false);
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_already_active_user() {
        let store = store_with_user(Some("activa"));
        let poller = ActivationPoller::new(5, Duration::from_secs(3));

        let outcome = poller.await_activation(&store, "u1", no_cancel()).await;
        assert_eq!(outcome.state, ActivationState::Confirmed);
        assert_eq!(outcome.attempts_used, 1);

        if let StoreBackend::Memory(memory) = &store {
            assert_eq!(memory.write_count(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_when_webhook_lands_mid_poll() {
        let store = Arc::new(store_with_user(Some("pendiente")));
        let poller = ActivationPoller::new(10, Duration::from_secs(3));

        let writer = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            writer.set_subscription_status("u1", "activa").await.unwrap();
        });

        let outcome = poller.await_activation(&store, "u1", no_cancel()).await;
        assert_eq!(outcome.state, ActivationState::Confirmed);
        assert!(outcome.attempts_used > 1);
        assert!(outcome.attempts_used < 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconciles_manually_after_exhaustion() {
        let store = store_with_user(Some("pendiente"));
        let poller = ActivationPoller::new(3, Duration::from_secs(3));

        let outcome = poller.await_activation(&store, "u1", no_cancel()).await;
        assert_eq!(outcome.state, ActivationState::ManuallyReconciled);
        assert_eq!(outcome.attempts_used, 3);

        if let StoreBackend::Memory(memory) = &store {
            assert_eq!(memory.write_count(), 1);
            let user = memory.get_document("users", "u1").unwrap().unwrap();
            assert_eq!(user["suscripcion"]["estado"], "activa");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconciles_user_without_subscription_field() {
        let store = store_with_user(None);
        let poller = ActivationPoller::new(2, Duration::from_secs(1));

        let outcome = poller.await_activation(&store, "u1", no_cancel()).await;
        assert_eq!(outcome.state, ActivationState::ManuallyReconciled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_leaves_pending() {
        let store = store_with_user(Some("pendiente"));
        let poller = ActivationPoller::new(10, Duration::from_secs(3));
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            let _ = tx.send(true);
        });

        let outcome = poller.await_activation(&store, "u1", rx).await;
        assert_eq!(outcome.state, ActivationState::Pending);

        if let StoreBackend::Memory(memory) = &store {
            assert_eq!(memory.write_count(), 0);
        }
    }
}
