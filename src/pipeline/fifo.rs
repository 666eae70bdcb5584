// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Bounded stage-to-stage fifos (§4.1): each boundary carries typed
//! messages; producers block when full, consumers block when empty. EOS is
//! a message like any other so it drains in order with the pictures ahead
//! of it, then fans out to every consumer of the fifo it crosses.

use crossbeam_channel::{bounded, Receiver, RecvError, SendError, Sender};

use crate::error::PipelineError;

/// One message on a stage-to-stage fifo: either a unit of picture work
/// tagged with its task kind, or the end-of-stream marker that propagates
/// through every fifo in turn (§5 Cancellation/timeout).
#[derive(Debug, Clone)]
pub enum Message<T> {
    Item(T),
    Eos,
}

/// The producer half of a bounded fifo.
#[derive(Clone)]
pub struct FifoSender<T> {
    tx: Sender<Message<T>>,
}

/// The consumer half of a bounded fifo.
#[derive(Clone)]
pub struct FifoReceiver<T> {
    rx: Receiver<Message<T>>,
}

/// Builds one bounded fifo of the given capacity. Capacity is derived from
/// [`crate::data_model::scs::PoolCapacities`] by the orchestrator, matching
/// the pool the fifo's payload is drawn from.
pub fn bounded_fifo<T>(capacity: usize) -> (FifoSender<T>, FifoReceiver<T>) {
    let (tx, rx) = bounded(capacity.max(1));
    (FifoSender { tx }, FifoReceiver { rx })
}

impl<T> FifoSender<T> {
    /// Blocks until there is room. A disconnected peer (the one failure
    /// mode a bounded channel send can hit) is a fatal pipeline error: it
    /// means the downstream worker has already exited, normally only
    /// during teardown.
    pub fn send(&self, item: T) -> Result<(), PipelineError> {
        self.tx.send(Message::Item(item)).map_err(|_: SendError<_>| PipelineError::FifoDisconnected)
    }

    pub fn send_eos(&self) -> Result<(), PipelineError> {
        self.tx.send(Message::Eos).map_err(|_: SendError<_>| PipelineError::FifoDisconnected)
    }
}

impl<T> FifoReceiver<T> {
    /// Blocks until a message is posted. Returns `Ok(None)` once EOS has
    /// been observed and fully drained; callers use this to exit their
    /// worker loop.
    pub fn recv(&self) -> Result<Option<Message<T>>, PipelineError> {
        match self.rx.recv() {
            Ok(message) => Ok(Some(message)),
            Err(RecvError) => Err(PipelineError::FifoDisconnected),
        }
    }

    pub fn try_recv(&self) -> Option<Message<T>> {
        self.rx.try_recv().ok()
    }
}
