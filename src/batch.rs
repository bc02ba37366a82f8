//! Batch conversion on a background worker.
//!
//! [`spawn_conversion`] moves the items onto one worker thread and converts
//! them strictly in order. The caller reads [`BatchEvent`]s from the
//! [`BatchHandle`] channel on its own thread:
//!
//! ```text
//! Progress(1/N) → Progress(2/N) → … → Progress(N/N) → Finished(Ok(results))
//! Progress(1/N) → Progress(2/N) → Finished(Err(e))      (item 2 failed)
//! ```
//!
//! The first failing item ends the batch and discards every result gathered
//! so far. Exactly one `Finished` event is sent per batch.

use crate::error::ConversionError;
use crate::imaging::{Codec, transcode};
use crate::types::{ConversionProgress, ConversionResult, ImageFormat, ImageQuality};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use tracing::{debug, info};

/// One named input buffer.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub name: String,
    pub data: Vec<u8>,
}

impl BatchItem {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Emitted before the item at `current` is processed.
    Progress(ConversionProgress),
    Finished(Result<Vec<ConversionResult>, ConversionError>),
}

/// Shared stop flag, checked by the worker between items.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Caller side of a running batch.
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

impl BatchHandle {
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drain events on the current thread until the batch finishes.
    ///
    /// `on_progress` runs for every progress event, in order. A worker that
    /// disappears without a `Finished` event counts as `ConversionFailed`.
    pub fn wait(
        self,
        mut on_progress: impl FnMut(&ConversionProgress),
    ) -> Result<Vec<ConversionResult>, ConversionError> {
        let mut outcome = Err(ConversionError::ConversionFailed);
        for event in self.events.iter() {
            match event {
                BatchEvent::Progress(progress) => on_progress(&progress),
                BatchEvent::Finished(result) => {
                    outcome = result;
                    break;
                }
            }
        }
        if self.worker.join().is_err() {
            return Err(ConversionError::ConversionFailed);
        }
        outcome
    }
}

/// Start converting `items` into `to` at `quality` on a worker thread.
pub fn spawn_conversion<C: Codec + 'static>(
    codec: Arc<C>,
    items: Vec<BatchItem>,
    to: ImageFormat,
    quality: ImageQuality,
) -> BatchHandle {
    let (tx, rx) = mpsc::channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let worker = std::thread::spawn(move || {
        let outcome = run_conversion(codec.as_ref(), &items, to, quality, &token, &tx);
        // The receiver may already be gone; nobody is left to notify.
        let _ = tx.send(BatchEvent::Finished(outcome));
    });
    BatchHandle {
        events: rx,
        cancel,
        worker,
    }
}

fn run_conversion(
    codec: &impl Codec,
    items: &[BatchItem],
    to: ImageFormat,
    quality: ImageQuality,
    cancel: &CancellationToken,
    tx: &Sender<BatchEvent>,
) -> Result<Vec<ConversionResult>, ConversionError> {
    let total = items.len();
    info!(total, format = %to, %quality, "batch conversion started");

    let mut results = Vec::with_capacity(total);
    for (index, item) in items.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(done = index, total, "batch conversion cancelled");
            return Err(ConversionError::Cancelled);
        }
        let progress = BatchEvent::Progress(ConversionProgress {
            current: index + 1,
            total,
            current_file_name: item.name.clone(),
        });
        // A dropped handle means nobody is waiting for the rest.
        if tx.send(progress).is_err() {
            info!(done = index, total, "batch receiver dropped, stopping");
            return Err(ConversionError::Cancelled);
        }

        let converted = transcode::convert(codec, &item.data, to, quality.factor())
            .inspect_err(|e| info!(file = %item.name, error = %e, "batch conversion aborted"))?;
        debug!(file = %item.name, bytes = converted.len(), "converted");
        results.push(ConversionResult::new(
            item.name.clone(),
            item.data.len(),
            converted,
        ));
    }

    info!(total, "batch conversion finished");
    Ok(results)
}
