//! `HandshakeState`: the per-connection context the driver mutates.

use crate::policy::HandshakePolicy;
use crate::state::{FlowState, HandState, ReadState, Role, WorkToken, WriteState};
use crate::vtable::HandshakeOps;

/// A derivation of the legacy three-way `s->state` field (`SSL_ST_BEFORE`
/// / `SSL_ST_ACCEPT` / `SSL_ST_CONNECT` / `SSL_ST_OK` / `SSL_ST_ERR`) some
/// embedding code may still branch on.
///
/// This is a read-only view computed from [`FlowState`]; nothing ever
/// writes to it directly, which avoids keeping two redundant state fields
/// in sync by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyState {
    /// No handshake has ever started.
    Before,
    /// A server-role handshake is in progress.
    Accept,
    /// A client-role handshake is in progress.
    Connect,
    /// Quiescent between handshakes.
    Ok,
    /// Latched permanently.
    Error,
}

/// Per-connection handshake context, owned exclusively by the embedder's
/// connection object and borrowed mutably by [`crate::drive`] for the
/// duration of each call.
///
/// `Conn` is the embedder's connection type; `ops` is the fully-populated
/// role vtable for this handshake (client or server), selected once at
/// construction — never `None`.
pub struct HandshakeState<Conn> {
    pub(crate) flow_state: FlowState,
    pub(crate) read_state: ReadState,
    pub(crate) write_state: WriteState,
    pub(crate) read_work: WorkToken,
    pub(crate) write_work: WorkToken,
    pub(crate) hand_state: HandState,
    pub(crate) read_state_first_init: bool,
    #[cfg(feature = "dtls")]
    pub(crate) use_timer: bool,
    pub(crate) role: Role,
    pub(crate) in_handshake_depth: u32,
    pub(crate) change_cipher_spec: bool,
    pub(crate) renegotiating: bool,
    pub(crate) pending_message_size: u32,
    pub(crate) policy: HandshakePolicy,
    pub(crate) ops: Box<dyn HandshakeOps<Conn>>,
}

impl<Conn> HandshakeState<Conn> {
    /// Creates a fresh, `UNINITED` handshake context for `role`, with
    /// `ops` as the role's fully-populated vtable.
    #[must_use]
    pub fn new(role: Role, policy: HandshakePolicy, ops: Box<dyn HandshakeOps<Conn>>) -> Self {
        Self {
            flow_state: FlowState::Uninited,
            read_state: ReadState::Header,
            write_state: WriteState::Transition,
            read_work: WorkToken::MoreA,
            write_work: WorkToken::MoreA,
            hand_state: HandState::Before,
            read_state_first_init: false,
            #[cfg(feature = "dtls")]
            use_timer: false,
            role,
            in_handshake_depth: 0,
            change_cipher_spec: false,
            renegotiating: false,
            pending_message_size: 0,
            policy,
            ops,
        }
    }

    /// The outer machine's cursor.
    #[must_use]
    pub const fn flow_state(&self) -> FlowState {
        self.flow_state
    }

    /// The opaque protocol-level state tag.
    #[must_use]
    pub const fn hand_state(&self) -> HandState {
        self.hand_state
    }

    /// The role this context is driving.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// `true` once this flight has sent or received its `ChangeCipherSpec`
    /// record. Reset on every [`HandshakeState::new`] and at one-time setup
    /// (§4.1 step 13); set by the grammar's `process_message` on read and by
    /// the write sub-machine on send.
    #[must_use]
    pub const fn change_cipher_spec(&self) -> bool {
        self.change_cipher_spec
    }

    /// The in-handshake depth counter: incremented on `drive` entry,
    /// decremented on every exit path.
    #[must_use]
    pub const fn in_handshake_depth(&self) -> u32 {
        self.in_handshake_depth
    }

    /// `true` from [`HandshakeState::set_renegotiate`] through the entire
    /// renegotiated handshake, until it reaches `FINISHED` and [`HandshakeState::clear`]
    /// runs. A caller can use this to refuse a concurrent renegotiation
    /// request.
    #[must_use]
    pub const fn is_renegotiating(&self) -> bool {
        self.renegotiating
    }

    /// The read-only legacy state derivation.
    #[must_use]
    pub fn legacy_state(&self) -> LegacyState {
        match self.flow_state {
            FlowState::Error => LegacyState::Error,
            FlowState::Uninited if self.hand_state == HandState::Before => LegacyState::Before,
            FlowState::Uninited | FlowState::Finished => LegacyState::Ok,
            FlowState::Writing | FlowState::Reading | FlowState::Renegotiate => {
                if self.role.is_server() {
                    LegacyState::Accept
                } else {
                    LegacyState::Connect
                }
            }
        }
    }

    /// `true` exactly when `hand_state` is one of
    /// `{BEFORE, OK, CW_CLNT_HELLO}` — before any handshake has begun,
    /// between completed handshakes, or immediately after the client has
    /// queued its ClientHello but before further handshake messages are
    /// expected.
    #[must_use]
    pub fn client_app_data_allowed(&self) -> bool {
        matches!(
            self.hand_state,
            HandState::Before | HandState::Ok | HandState::CwClntHello
        )
    }

    /// Upward API: resets to `UNINITED`.
    pub fn clear(&mut self) {
        self.flow_state = FlowState::Uninited;
        self.renegotiating = false;
    }

    /// Upward API: requests a fresh handshake over an established
    /// connection.
    pub fn set_renegotiate(&mut self) {
        self.flow_state = FlowState::Renegotiate;
    }

    /// Upward API: latches the absorbing error state. Permanent: the
    /// connection must be destroyed after this.
    pub fn set_error(&mut self) {
        self.flow_state = FlowState::Error;
    }
}
