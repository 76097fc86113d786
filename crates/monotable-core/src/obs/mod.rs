//! Codec trace boundary.
//!
//! Codecs never log directly; every instrumentation point emits a
//! [`CodecEvent`] into the sink configured on the codec, if any. Sinks
//! observe only and cannot change codec results.

mod counting;

pub use counting::{CodecMetricsSnapshot, CountingSink};

use crate::{collab::CollaboratorKind, error::ErrorClass};

///
/// CodecOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CodecOp {
    Decode,
    Encode,
    Reconstruct,
}

///
/// CodecEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CodecEvent<'a> {
    CollaboratorCall {
        entity: &'a str,
        property: &'a str,
        collaborator: CollaboratorKind,
        op: &'static str,
    },
    DecodeFinish {
        entity: &'a str,
        attributes: usize,
    },
    DecodeStart {
        entity: &'a str,
        attributes: usize,
    },
    DiscriminationMiss {
        entity: &'a str,
        reason: &'static str,
    },
    EncodeFinish {
        entity: &'a str,
        attributes: usize,
    },
    EncodeStart {
        entity: &'a str,
        attributes: usize,
    },
    Failure {
        entity: &'a str,
        op: CodecOp,
        class: ErrorClass,
    },
}

///
/// CodecTraceSink
///

pub trait CodecTraceSink: Send + Sync {
    fn on_event(&self, event: CodecEvent<'_>);
}
