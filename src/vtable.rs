//! The per-role vtable consumed by the read and write sub-machines.
//!
//! A concrete handshake grammar (TLS 1.0-1.2, a DTLS variant, ...)
//! implements [`HandshakeOps`] once for the client role and once for the
//! server role and hands the driver a trait object at construction time —
//! never `None`, which is what rules out ever shipping a half-populated
//! vtable with placeholder callbacks "to fill in later".

use crate::state::{HandState, WorkToken};

/// Outcome of the write sub-machine's `transition()` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTransition {
    /// Advance to `PRE_WORK`; a message is coming.
    Continue,
    /// The write phase (and the handshake) is complete.
    Finished,
}

/// Outcome of the read sub-machine's `process_message()` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The reading phase is over; the outer machine flips to writing.
    FinishedReading,
    /// Advance to `POST_PROCESS`.
    ContinueProcessing,
    /// Loop back to `HEADER` for another message.
    ContinueReading,
}

/// The five (really seven, since read/write each get their own
/// `transition`) callbacks a concrete handshake grammar must supply.
///
/// `Conn` is the embedder's connection type, which must implement
/// [`crate::RecordLayer`]; the driver calls through `HandshakeOps` and
/// `RecordLayer` but never constructs `Conn` itself.
pub trait HandshakeOps<Conn> {
    /// Read-side `transition`: `true` iff `msg_type` is one the current
    /// `hand_state` permits, in which case the callback advances
    /// `hand_state` to the tag matching the now-accepted message before
    /// returning. Rejection leaves `hand_state` untouched — the driver
    /// sends a fatal alert and never reaches `process_message`.
    fn read_transition(&self, conn: &mut Conn, hand_state: &mut HandState, msg_type: u32) -> bool;

    /// Write-side `transition`: advances `hand_state` to the next message
    /// to send and reports whether there is one. Errors are reported via
    /// `Err`, wrapped by the driver into [`crate::StatemError::Vtable`].
    fn write_transition(
        &self,
        conn: &mut Conn,
        hand_state: &mut HandState,
    ) -> Result<WriteTransition, Box<dyn std::error::Error + Send + Sync>>;

    /// Consumes the just-read message body. `change_cipher_spec` is the
    /// driver's "has this flight's CCS record arrived yet" flag (§4.1 step
    /// 13); a grammar that recognizes a `ChangeCipherSpec` record here sets
    /// it to `true`, and may consult it to reject a `Finished` that arrives
    /// before its CCS.
    fn process_message(
        &self,
        conn: &mut Conn,
        message_size: u32,
        change_cipher_spec: &mut bool,
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>>;

    /// Advances resumable post-read work. Any non-terminal token returned
    /// here is treated as an NBIO suspension by the read sub-machine.
    fn post_process_message(&self, conn: &mut Conn, work: WorkToken) -> WorkToken;

    /// The maximum size this grammar permits for the message currently
    /// being read.
    fn max_message_size(&self, conn: &Conn) -> u32;

    /// Serializes the next outbound message into the record layer's
    /// buffer. `false` is a fatal internal error.
    fn construct_message(&self, conn: &mut Conn) -> bool;

    /// Advances resumable pre-write work. A `FinishedStop` token ends the
    /// handshake outright; any non-terminal token is an NBIO suspension.
    fn pre_work(&self, conn: &mut Conn, work: WorkToken) -> WorkToken;

    /// Advances resumable post-write work, with the same terminal
    /// semantics as [`HandshakeOps::pre_work`].
    fn post_work(&self, conn: &mut Conn, work: WorkToken) -> WorkToken;
}
