use crate::{
    error::ErrorClass,
    obs::{CodecEvent, CodecTraceSink},
};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// CountingSink
///
/// Lock-free sink aggregating event counts. Attributes are summed over
/// finished encodes and decodes only.
///

#[derive(Debug, Default)]
pub struct CountingSink {
    encodes: AtomicU64,
    decodes: AtomicU64,
    attributes_written: AtomicU64,
    attributes_read: AtomicU64,
    collaborator_calls: AtomicU64,
    discrimination_misses: AtomicU64,
    failures: AtomicU64,
    range_failures: AtomicU64,
}

impl CountingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> CodecMetricsSnapshot {
        CodecMetricsSnapshot {
            encodes: self.encodes.load(Ordering::Relaxed),
            decodes: self.decodes.load(Ordering::Relaxed),
            attributes_written: self.attributes_written.load(Ordering::Relaxed),
            attributes_read: self.attributes_read.load(Ordering::Relaxed),
            collaborator_calls: self.collaborator_calls.load(Ordering::Relaxed),
            discrimination_misses: self.discrimination_misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            range_failures: self.range_failures.load(Ordering::Relaxed),
        }
    }
}

fn bump(counter: &AtomicU64, by: usize) {
    counter.fetch_add(u64::try_from(by).unwrap_or(u64::MAX), Ordering::Relaxed);
}

impl CodecTraceSink for CountingSink {
    fn on_event(&self, event: CodecEvent<'_>) {
        match event {
            CodecEvent::EncodeFinish { attributes, .. } => {
                bump(&self.encodes, 1);
                bump(&self.attributes_written, attributes);
            }
            CodecEvent::DecodeFinish { attributes, .. } => {
                bump(&self.decodes, 1);
                bump(&self.attributes_read, attributes);
            }
            CodecEvent::CollaboratorCall { .. } => bump(&self.collaborator_calls, 1),
            CodecEvent::DiscriminationMiss { .. } => bump(&self.discrimination_misses, 1),
            CodecEvent::Failure { class, .. } => {
                bump(&self.failures, 1);
                if class == ErrorClass::Range {
                    bump(&self.range_failures, 1);
                }
            }
            CodecEvent::DecodeStart { .. } | CodecEvent::EncodeStart { .. } => {}
        }
    }
}

///
/// CodecMetricsSnapshot
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CodecMetricsSnapshot {
    pub encodes: u64,
    pub decodes: u64,
    pub attributes_written: u64,
    pub attributes_read: u64,
    pub collaborator_calls: u64,
    pub discrimination_misses: u64,
    pub failures: u64,
    pub range_failures: u64,
}
