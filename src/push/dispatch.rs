//! Routes incoming push messages to the open page or to the background worker

use log::debug;
use tokio::sync::{mpsc, Mutex};

use super::{PushMessage, WorkerEvent};
use crate::error::Error;

const FOREGROUND_QUEUE: usize = 32;

/// Where a message ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Foreground,
    Background,
}

/// Mirrors the provider's behaviour: a focused page gets the message on its
/// foreground channel, otherwise the background worker handles it.
pub struct PushDispatcher {
    background: mpsc::Sender<WorkerEvent>,
    foreground: Mutex<Option<mpsc::Sender<PushMessage>>>,
}

impl PushDispatcher {
    pub fn new(background: mpsc::Sender<WorkerEvent>) -> Self {
        Self {
            background,
            foreground: Mutex::new(None),
        }
    }

    /// A page gained focus. Replaces any previous foreground subscriber.
    pub async fn attach_foreground(&self) -> mpsc::Receiver<PushMessage> {
        let (tx, rx) = mpsc::channel(FOREGROUND_QUEUE);
        *self.foreground.lock().await = Some(tx);
        rx
    }

    /// The page lost focus or closed
    pub async fn detach_foreground(&self) {
        self.foreground.lock().await.take();
    }

    /// The foreground lock is only held to pick the target, never across a send.
    pub async fn deliver(&self, message: PushMessage) -> Result<Delivery, Error> {
        let foreground = self.foreground.lock().await.clone();
        if let Some(tx) = foreground {
            match tx.send(message).await {
                Ok(()) => return Ok(Delivery::Foreground),
                Err(mpsc::error::SendError(message)) => {
                    debug!("Foreground listener gone, falling back to background worker");
                    let mut current = self.foreground.lock().await;
                    if current.as_ref().map_or(false, |c| c.same_channel(&tx)) {
                        current.take();
                    }
                    drop(current);
                    return self.deliver_background(message).await;
                }
            }
        }
        self.deliver_background(message).await
    }

    async fn deliver_background(&self, message: PushMessage) -> Result<Delivery, Error> {
        self.background
            .send(WorkerEvent::Push(message))
            .await
            .map_err(|_| Error::push("background worker is not running"))?;
        Ok(Delivery::Background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn routes_by_focus() {
        let (bg_tx, mut bg_rx) = mpsc::channel(4);
        let dispatcher = PushDispatcher::new(bg_tx);

        assert_eq!(dispatcher.deliver(PushMessage::new("a", "")).await.unwrap(), Delivery::Background);
        assert!(matches!(bg_rx.recv().await, Some(WorkerEvent::Push(_))));

        let mut fg_rx = dispatcher.attach_foreground().await;
        assert_eq!(dispatcher.deliver(PushMessage::new("b", "")).await.unwrap(), Delivery::Foreground);
        assert_eq!(fg_rx.recv().await.unwrap().title(), Some("b"));

        drop(fg_rx);
        assert_eq!(dispatcher.deliver(PushMessage::new("c", "")).await.unwrap(), Delivery::Background);

        dispatcher.attach_foreground().await;
        dispatcher.detach_foreground().await;
        assert_eq!(dispatcher.deliver(PushMessage::new("d", "")).await.unwrap(), Delivery::Background);
    }

    #[tokio::test]
    async fn full_foreground_queue_does_not_block_detach() {
        let (bg_tx, mut bg_rx) = mpsc::channel(4);
        let dispatcher = std::sync::Arc::new(PushDispatcher::new(bg_tx));
        let fg_rx = dispatcher.attach_foreground().await;

        for _ in 0..FOREGROUND_QUEUE {
            dispatcher.deliver(PushMessage::new("queued", "")).await.unwrap();
        }
        let pending = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.deliver(PushMessage::new("late", "")).await })
        };
        tokio::task::yield_now().await;

        tokio::time::timeout(Duration::from_secs(1), dispatcher.detach_foreground())
            .await
            .unwrap();
        let mut next_page = tokio::time::timeout(Duration::from_secs(1), dispatcher.attach_foreground())
            .await
            .unwrap();

        // The page that stopped reading goes away, the stuck message moves to the worker
        drop(fg_rx);
        let delivery = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(delivery, Delivery::Background);
        match bg_rx.recv().await {
            Some(WorkerEvent::Push(message)) => assert_eq!(message.title(), Some("late")),
            _ => panic!("expected the late message on the background worker"),
        }

        // The newer foreground subscriber is still attached
        assert_eq!(dispatcher.deliver(PushMessage::new("x", "")).await.unwrap(), Delivery::Foreground);
        assert_eq!(next_page.recv().await.unwrap().title(), Some("x"));
    }

    #[tokio::test]
    async fn stopped_worker_is_an_error() {
        let (bg_tx, bg_rx) = mpsc::channel(1);
        drop(bg_rx);
        let dispatcher = PushDispatcher::new(bg_tx);
        assert!(matches!(dispatcher.deliver(PushMessage::default()).await, Err(Error::Push(_))));
    }
}
