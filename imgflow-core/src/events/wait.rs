//! Correlated waits on a subscription.
//!
//! [`Subscription::take`] parks the calling task until an event satisfies a
//! selector, the optional deadline passes, or the cancel signal fires.
//! Events the selector rejects are dropped; they belong to someone else.

use std::future::pending;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

use super::bus::Subscription;
use super::types::AppEvent;

/// Why a wait ended without a matching event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("timed out waiting for a matching event")]
    TimedOut,
    #[error("wait was cancelled")]
    Cancelled,
    #[error("event bus closed")]
    Closed,
}

/// Resolves once `cancel` holds `true`.
///
/// If the sender is dropped without ever cancelling, this never resolves.
pub async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|c| *c).await.is_err() {
        pending::<()>().await;
    }
}

impl Subscription {
    /// Wait for the first event `select` maps to `Some`.
    ///
    /// `timeout` bounds the whole wait; `None` waits forever. Cancellation is
    /// checked before anything else, so an already-cancelled signal returns
    /// immediately even if a matching event is buffered.
    pub async fn take<T>(
        &mut self,
        mut select: impl FnMut(&AppEvent) -> Option<T>,
        timeout: Option<Duration>,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<T, WaitError> {
        if *cancel.borrow() {
            return Err(WaitError::Cancelled);
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        let expired = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => pending::<()>().await,
            }
        };

        let matched = async {
            loop {
                let Some(event) = self.recv().await else {
                    return Err(WaitError::Closed);
                };
                if let Some(value) = select(&event) {
                    return Ok(value);
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancelled(cancel) => Err(WaitError::Cancelled),
            _ = expired => Err(WaitError::TimedOut),
            result = matched => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    fn metadata_requested(name: &str) -> AppEvent {
        AppEvent::ImageMetadataRequested {
            image_name: name.into(),
        }
    }

    fn select_name(wanted: &'static str) -> impl FnMut(&AppEvent) -> Option<String> {
        move |event| match event {
            AppEvent::ImageMetadataRequested { image_name } if image_name == wanted => {
                Some(image_name.clone())
            }
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_take_skips_non_matching_events() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);

        bus.publish(metadata_requested("other.png"));
        bus.publish(metadata_requested("mine.png"));

        let got = sub.take(select_name("mine.png"), None, &mut cancel_rx).await;
        assert_eq!(got, Ok("mine.png".to_string()));
    }

    #[tokio::test]
    async fn test_take_sees_events_buffered_before_the_wait() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);

        // Published after subscribing but before `take` is polled.
        bus.publish(metadata_requested("mine.png"));

        let got = sub.take(select_name("mine.png"), None, &mut cancel_rx).await;
        assert!(got.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_times_out() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);

        bus.publish(metadata_requested("other.png"));

        let got = sub
            .take(
                select_name("mine.png"),
                Some(Duration::from_secs(5)),
                &mut cancel_rx,
            )
            .await;
        assert_eq!(got, Err(WaitError::TimedOut));
    }

    #[tokio::test]
    async fn test_take_cancelled_mid_wait() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let waiter = tokio::spawn(async move {
            sub.take(select_name("mine.png"), None, &mut cancel_rx).await
        });
        tokio::task::yield_now().await;
        cancel_tx.send(true).unwrap();

        assert_eq!(waiter.await.unwrap(), Err(WaitError::Cancelled));
    }

    #[tokio::test]
    async fn test_take_already_cancelled_wins_over_buffered_match() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        let (_cancel_tx, mut cancel_rx) = watch::channel(true);

        bus.publish(metadata_requested("mine.png"));

        let got = sub.take(select_name("mine.png"), None, &mut cancel_rx).await;
        assert_eq!(got, Err(WaitError::Cancelled));
    }

    #[tokio::test]
    async fn test_take_reports_closed_bus() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);
        drop(bus);

        let got = sub.take(select_name("mine.png"), None, &mut cancel_rx).await;
        assert_eq!(got, Err(WaitError::Closed));
    }

    #[tokio::test]
    async fn test_dropped_cancel_sender_does_not_end_wait() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        drop(cancel_tx);

        bus.publish(metadata_requested("mine.png"));
        let got = sub.take(select_name("mine.png"), None, &mut cancel_rx).await;
        assert!(got.is_ok());
    }
}
