//! Send capability for a single connection
//!
//! The game state never touches sockets. Each connection owns a writer task
//! draining a bounded channel; the state holds a `SessionHandle` that
//! pushes pre-serialized frames into it. Tests use `SessionHandle::channel()`
//! and read frames straight off the receiver.
//!
//! Pushing never waits. A peer that stops reading fills its queue and then
//! misses frames until it catches up. Every snapshot carries the whole game,
//! so the next one that fits brings it back in sync.

use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::DeliveryError;
use crate::protocol::ServerMessage;

pub type SessionId = ulid::Ulid;

/// An encoded outbound envelope. Cloning shares the underlying buffer.
pub type Frame = Utf8Bytes;

/// Frames a session may have queued before further pushes are dropped
pub const SESSION_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    tx: mpsc::Sender<Frame>,
}

impl SessionHandle {
    pub fn new(tx: mpsc::Sender<Frame>) -> Self {
        Self {
            id: ulid::Ulid::new(),
            tx,
        }
    }

    /// Create a handle together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn send_frame(&self, frame: Frame) -> Result<(), DeliveryError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull(self.id),
            TrySendError::Closed(_) => DeliveryError::SessionClosed(self.id),
        })
    }

    pub fn send(&self, msg: &ServerMessage) -> Result<(), DeliveryError> {
        self.send_frame(msg.encode()?)
    }
}
