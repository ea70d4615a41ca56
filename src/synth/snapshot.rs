//! Lock-free hand-off of parameter snapshots from a control thread to the
//! render thread. The render side reads once per block.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::synth::modes::ResonatorParameters;

/// Control-thread end. Publishing never blocks.
#[derive(Debug, Clone)]
pub struct ParameterPublisher {
    tx: Sender<ResonatorParameters>,
    // Used only to evict the oldest entry when the queue is full.
    evict: Receiver<ResonatorParameters>,
}

/// Render-thread end.
#[derive(Debug)]
pub struct ParameterReceiver {
    rx: Receiver<ResonatorParameters>,
}

pub fn parameter_channel(capacity: usize) -> (ParameterPublisher, ParameterReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        ParameterPublisher {
            tx,
            evict: rx.clone(),
        },
        ParameterReceiver { rx },
    )
}

impl ParameterPublisher {
    /// Queue a snapshot, dropping the oldest one if the render thread is
    /// behind.
    pub fn publish(&self, params: ResonatorParameters) {
        let mut pending = params;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(p)) => {
                    let _ = self.evict.try_recv();
                    pending = p;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl ParameterReceiver {
    /// Newest queued snapshot, draining everything older.
    pub fn latest(&self) -> Option<ResonatorParameters> {
        self.rx.try_iter().last()
    }
}
