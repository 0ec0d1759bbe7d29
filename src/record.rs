//! The record-layer interface boundary.
//!
//! Everything in this module is a trait the *embedder* implements; the
//! driver only ever calls through it. Record framing, the transcript
//! hash, buffer allocation, and the DTLS retransmission timer's actual
//! firing are all out of scope for this crate.

use crate::info::InfoCallback;
use crate::state::Role;
use crate::version::ProtocolVersion;

/// Outcome of a transport operation that may stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStatus<T> {
    /// The operation completed.
    Ready(T),
    /// The transport would block; retry later with identical arguments.
    WouldBlock,
}

impl<T> IoStatus<T> {
    /// Maps `Ready(t)` to `Ok(t)` and `WouldBlock` to
    /// [`crate::StatemError::WouldBlock`].
    pub fn into_drive_result(self) -> crate::error::DriveResult<T> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::WouldBlock => Err(crate::error::StatemError::WouldBlock),
        }
    }
}

/// A handshake-message header as delivered by `get_message_header`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// The peer's declared message type, interpreted by the vtable's
    /// `transition` callback.
    pub msg_type: u32,
    /// The peer's declared message length, checked against
    /// `max_message_size()`.
    pub message_size: u32,
}

/// TLS alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// Connection-terminating.
    Fatal,
}

/// The alert codes this crate can emit. Version-validation and
/// policy-minimum failures during one-time setup are reported to the
/// caller as plain errors and never reach this type — only renegotiation
/// refusal and the two message-framing checks carry a fatal alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCode {
    /// Sent when server-side renegotiation is refused for lacking secure
    /// renegotiation support.
    HandshakeFailure,
    /// Sent when `transition(msg_type)` rejects the peer's message.
    UnexpectedMessage,
    /// Sent when the peer's declared size exceeds `max_message_size()`.
    IllegalParameter,
}

/// The TLS record content type a physical write carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// A generic handshake record.
    Handshake,
    /// A `ChangeCipherSpec` record — distinct from a handshake message at
    /// the record-layer level.
    ChangeCipherSpec,
}

/// The external collaborator boundary the driver calls through for
/// everything it doesn't own: transport I/O, alerts, the transcript hash,
/// buffer allocation, renegotiation bookkeeping, and (with the `dtls`
/// feature) the retransmission timer.
pub trait RecordLayer {
    /// Reads the next message header; `WouldBlock` is the NBIO case.
    fn get_message_header(&mut self) -> IoStatus<MessageHeader>;

    /// Reads the message body once the header is in hand. DTLS delivers
    /// the body together with the header, so implementations for DTLS
    /// transports may treat this as an immediate `Ready(())` no-op.
    fn get_message_body(&mut self, message_size: u32) -> IoStatus<()>;

    /// Performs the physical write for `content_type`. `WouldBlock` is the
    /// NBIO case.
    fn write_record(&mut self, content_type: ContentType) -> IoStatus<()>;

    /// Sends a fatal alert. Never called once `FlowState::Error` has
    /// already latched.
    fn send_alert(&mut self, level: AlertLevel, code: AlertCode);

    /// Resets the scratch write-cursor to zero ahead of reading the next
    /// message header.
    fn reset_scratch_cursor(&mut self) {}

    /// Marks whether the message currently being read is the first packet
    /// seen since entering `READING`.
    fn set_first_packet(&mut self, first: bool) {
        let _ = first;
    }

    /// `true` if this DTLS connection runs over SCTP, in which case the
    /// write-buffering layer push is skipped. Not applicable (and never
    /// consulted) for non-DTLS connections.
    fn is_sctp_dtls(&self) -> bool {
        false
    }

    /// Mixes the current time into the process-wide CSPRNG. A no-op
    /// default since most embedders rely on an OS-backed CSPRNG that
    /// needs no manual stirring.
    fn stir_entropy(&mut self) {}

    /// Clears any per-thread error state left by a prior call.
    fn clear_error_state(&mut self) {}

    /// Performs a connection-level clear. Failure here indicates a prior
    /// fatal condition and is reported to the caller as an error *without*
    /// transitioning to `FlowState::Error`.
    fn connection_clear(&mut self) -> Result<(), crate::error::StatemError> {
        Ok(())
    }

    /// Cancels any pending heartbeat: stops the retransmission timer (DTLS
    /// only), clears the heartbeat-pending flag, and bumps the heartbeat
    /// sequence.
    fn cancel_pending_heartbeat(&mut self) {}

    /// Allocates the handshake scratch buffer if absent and sets up
    /// record-layer buffers.
    fn ensure_scratch_buffer(&mut self) -> Result<(), crate::error::StatemError> {
        Ok(())
    }

    /// Pushes a write-buffering transport layer. `skip` is `true`
    /// specifically for SCTP DTLS and server-side renegotiation, which the
    /// caller of this method has already decided.
    fn push_write_buffering(&mut self, skip: bool) {
        let _ = skip;
    }

    /// Initializes the handshake transcript hash.
    fn init_transcript_hash(&mut self) -> Result<(), crate::error::StatemError> {
        Ok(())
    }

    /// Bumps accept/connect statistics and, for server-side
    /// renegotiation, the renegotiate-received counter.
    fn note_handshake_start(&mut self, role: Role) {
        let _ = role;
    }

    /// Bumps the renegotiation-connect statistic for client-initiated
    /// renegotiation.
    fn note_renegotiation(&mut self, role: Role) {
        let _ = role;
    }

    /// `true` iff the peer has advertised RFC 5746 secure renegotiation
    /// (the `send_connection_binding` material).
    fn has_secure_renegotiation_support(&self) -> bool;

    /// The version negotiated for this connection.
    fn negotiated_version(&self) -> ProtocolVersion;

    /// `true` iff this connection runs over DTLS.
    fn is_dtls(&self) -> bool;

    /// Resets client-only handshake scratch state: the client random,
    /// the session-resumed flag, and any pending certificate request.
    /// Only called for [`Role::Client`].
    fn reset_client_handshake_state(&mut self) {}

    /// Starts the DTLS retransmission timer. Only called when `use_timer`
    /// is set.
    #[cfg(feature = "dtls")]
    fn start_retransmission_timer(&mut self) {}

    /// Stops the DTLS retransmission timer.
    #[cfg(feature = "dtls")]
    fn stop_retransmission_timer(&mut self) {}

    /// The info callback resolved for this connection (connection-level
    /// override of context-level) — `None` if the embedder hasn't
    /// installed one.
    fn info_callback(&mut self) -> Option<&mut dyn InfoCallback> {
        None
    }
}
