//! A restartable, NBIO-aware TLS/DTLS handshake driver.
//!
//! This crate owns the *control plane* of a handshake: the outer
//! message-flow machine and its read/write sub-machines, the legacy-state
//! derivation, the info-callback contract, and the application-data gate.
//! It owns none of the cryptography, record framing, or transport I/O —
//! those live behind the [`RecordLayer`] trait an embedder implements, and
//! the protocol grammar itself (which messages exist, what order they
//! come in) lives behind [`HandshakeOps`], implemented once per role by
//! whichever concrete handshake (TLS 1.2, a DTLS profile, ...) is in play.
//!
//! Call [`drive`] repeatedly with the same [`HandshakeState`] and
//! connection: each call either finishes the handshake, stalls on NBIO
//! (`Err(StatemError::WouldBlock)`, safe to retry once I/O is ready), or
//! hits a fatal error and latches [`FlowState::Error`] permanently.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::pedantic, clippy::nursery)]

mod error;
mod flow;
mod handshake;
mod info;
mod policy;
mod read;
mod record;
mod state;
mod version;
mod vtable;
mod write;

pub use error::{DriveResult, StatemError};
pub use flow::drive;
pub use handshake::{HandshakeState, LegacyState};
pub use info::{InfoCallback, InfoEvent, NoopInfoCallback};
pub use policy::HandshakePolicy;
pub use record::{AlertCode, AlertLevel, ContentType, IoStatus, MessageHeader, RecordLayer};
pub use state::{FlowState, HandState, Role, SubOutcome, WorkToken};
pub use version::{
    enforce_minimum_version, validate_version_family, ProtocolVersion, DTLS_MAJOR, TLS_MAJOR,
};
pub use vtable::{HandshakeOps, ProcessOutcome, WriteTransition};
