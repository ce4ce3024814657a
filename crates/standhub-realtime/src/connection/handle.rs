//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::error::DeliveryError;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender for the connection's outbound queue and the release
/// signal that tells its writer to flush and close the socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// When the connection was accepted
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    release: CancellationToken,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end of its outbound queue.
    pub fn new(outbound_buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(outbound_buffer.max(1));
        let handle = Self {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            sender,
            release: CancellationToken::new(),
            alive: AtomicBool::new(true),
        };
        (handle, receiver)
    }

    /// Queue one complete frame without waiting.
    ///
    /// A full queue drops the frame; a closed queue marks the handle dead.
    pub fn send(&self, frame: String) -> Result<(), DeliveryError> {
        if !self.is_alive() {
            return Err(DeliveryError::Closed);
        }
        match self.sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(DeliveryError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Err(DeliveryError::Closed)
            }
        }
    }

    /// How long the connection has been open, in milliseconds.
    pub fn lifetime_ms(&self) -> i64 {
        (Utc::now() - self.connected_at).num_milliseconds()
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Stop accepting frames and tell the writer to flush and close.
    ///
    /// Idempotent.
    pub fn release(&self) {
        self.mark_dead();
        self.release.cancel();
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.release.is_cancelled()
    }

    /// Resolves once the connection is released.
    pub fn released(&self) -> WaitForCancellationFuture<'_> {
        self.release.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_queues_frames_in_order() {
        let (handle, mut rx) = ConnectionHandle::new(4);
        handle.send("a".to_string()).unwrap();
        handle.send("b".to_string()).unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert_eq!(rx.recv().await.as_deref(), Some("b"));
    }

    #[test]
    fn test_full_queue_drops_frame() {
        let (handle, _rx) = ConnectionHandle::new(1);
        handle.send("a".to_string()).unwrap();
        assert_eq!(handle.send("b".to_string()), Err(DeliveryError::QueueFull));
        assert!(handle.is_alive());
    }

    #[test]
    fn test_closed_queue_marks_dead() {
        let (handle, rx) = ConnectionHandle::new(1);
        drop(rx);
        assert_eq!(handle.send("a".to_string()), Err(DeliveryError::Closed));
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_lifetime_grows() {
        let (handle, _rx) = ConnectionHandle::new(1);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(handle.lifetime_ms() >= 20);
    }

    #[test]
    fn test_release_is_idempotent() {
        let (handle, _rx) = ConnectionHandle::new(1);
        handle.release();
        handle.release();
        assert!(handle.is_released());
        assert_eq!(handle.send("a".to_string()), Err(DeliveryError::Closed));
    }
}
