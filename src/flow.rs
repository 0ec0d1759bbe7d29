//! The outer message-flow machine: one-time setup, then the steady-state
//! alternation between the write and read sub-machines.

use crate::error::{DriveResult, StatemError};
use crate::handshake::HandshakeState;
use crate::info::InfoEvent;
use crate::record::{AlertCode, AlertLevel, RecordLayer};
use crate::state::{FlowState, HandState, ReadState, Role, SubOutcome, WriteState};
use crate::version::{enforce_minimum_version, validate_version_family};
use crate::{read, write};
use logging::Category;

/// Drives `state` forward over `conn` until the handshake finishes, stalls
/// on NBIO, or hits a fatal error.
///
/// Calling this again after it returns `Ok(())` or `Err(WouldBlock)` simply
/// resumes from wherever the cursors were left. Calling it again once
/// `flow_state` has latched to [`FlowState::Error`] is a programming error
/// from the caller's side; this function reports it rather than touching
/// the connection, so the one absorbing side effect already committed
/// (the alert, if any) is never duplicated.
pub fn drive<Conn: RecordLayer>(state: &mut HandshakeState<Conn>, conn: &mut Conn) -> DriveResult<()> {
    if state.flow_state == FlowState::Error {
        logging::emit!(Category::Handshake, 1, "drive called after latched error");
        return Err(StatemError::InternalError(
            "drive called again after the handshake latched to the error state",
        ));
    }

    state.in_handshake_depth += 1;
    let result = drive_body(state, conn);
    state.in_handshake_depth -= 1;

    let numeric = match &result {
        Ok(()) => 1,
        Err(e) if e.is_would_block() => 0,
        Err(_) => -1,
    };
    logging::emit!(Category::Handshake, 1, "drive exit: role={:?} result={numeric}", state.role);
    if let Some(cb) = conn.info_callback() {
        cb.on_event(state.role, InfoEvent::Exit(numeric));
    }

    result
}

fn drive_body<Conn: RecordLayer>(state: &mut HandshakeState<Conn>, conn: &mut Conn) -> DriveResult<()> {
    if matches!(state.flow_state, FlowState::Uninited | FlowState::Renegotiate) {
        one_time_setup(state, conn)?;
    }

    loop {
        match state.flow_state {
            FlowState::Writing => match write::run(state, conn) {
                Ok(SubOutcome::Finished) => {
                    logging::emit!(Category::Handshake, 2, "WRITING -> READING");
                    state.read_state = ReadState::Header;
                    state.read_state_first_init = true;
                    state.flow_state = FlowState::Reading;
                }
                Ok(SubOutcome::EndHandshake) => {
                    logging::emit!(Category::Handshake, 2, "WRITING -> FINISHED");
                    state.flow_state = FlowState::Finished;
                }
                Err(e) => {
                    if !e.is_would_block() {
                        state.flow_state = FlowState::Error;
                    }
                    return Err(e);
                }
            },

            FlowState::Reading => match read::run(state, conn) {
                Ok(SubOutcome::Finished) => {
                    logging::emit!(Category::Handshake, 2, "READING -> WRITING");
                    state.write_state = WriteState::Transition;
                    state.flow_state = FlowState::Writing;
                }
                Ok(SubOutcome::EndHandshake) => {
                    unreachable!("the read sub-machine never reports EndHandshake")
                }
                Err(e) => {
                    if !e.is_would_block() {
                        state.flow_state = FlowState::Error;
                    }
                    return Err(e);
                }
            },

            FlowState::Finished => {
                state.clear();
                return Ok(());
            }

            FlowState::Uninited | FlowState::Renegotiate | FlowState::Error => {
                state.flow_state = FlowState::Error;
                return Err(StatemError::InternalError(
                    "outer machine reached an unreachable flow state",
                ));
            }
        }
    }
}

/// The numbered preamble that runs once per `drive` call that starts (or
/// restarts, for renegotiation) a handshake, before the steady-state loop
/// takes over.
fn one_time_setup<Conn: RecordLayer>(state: &mut HandshakeState<Conn>, conn: &mut Conn) -> DriveResult<()> {
    logging::emit!(Category::Handshake, 1, "entering one-time setup: role={:?}", state.role);

    // 1. Mix fresh entropy into the connection's randomness pool.
    conn.stir_entropy();

    // 2. Drop any stale per-thread error state from a previous call.
    conn.clear_error_state();

    let server_side_renegotiation = state.role.is_server() && state.flow_state == FlowState::Renegotiate;

    // 3. Resolve and fire the handshake-start info event, once.
    if let Some(cb) = conn.info_callback() {
        cb.on_event(state.role, InfoEvent::HandshakeStart);
    }

    // 4. (in_handshake_depth is bumped by the caller, drive(), around the
    //    whole of drive_body — nothing further to do here.)

    // 5. A connection-level clear failure is reported to the caller as an
    //    ordinary error, without latching FlowState::Error: it signals a
    //    problem that predates this handshake attempt, not one caused by
    //    it.
    conn.connection_clear()?;

    // 6. Cancel any heartbeat left pending by a previous, now-irrelevant,
    //    round.
    conn.cancel_pending_heartbeat();
    logging::emit!(Category::Timer, 2, "cancelled pending heartbeat");

    // 7. Bump accept/connect and, for server-side renegotiation, the
    //    renegotiate-received statistics. Entering via RENEGOTIATE also
    //    marks the connection as renegotiating, regardless of role, so a
    //    concurrent caller can observe it through `is_renegotiating()`
    //    until this handshake reaches FINISHED and clears it.
    conn.note_handshake_start(state.role);
    if state.flow_state == FlowState::Renegotiate {
        state.renegotiating = true;
    }
    if !state.role.is_server() && state.flow_state == FlowState::Renegotiate {
        logging::emit!(Category::Renegotiation, 1, "client-initiated renegotiation");
        conn.note_renegotiation(state.role);
    }

    // 8. Seed the protocol state: a brand-new (non-renegotiation) handshake
    //    starts its hand_state tag over at BEFORE, since the previous
    //    handshake (if any) may have left it at OK.
    if state.flow_state == FlowState::Uninited {
        state.hand_state = HandState::Before;
    }

    let negotiated = conn.negotiated_version();
    let is_dtls = conn.is_dtls();

    // 10. The negotiated version must belong to the expected family. No
    //     alert is sent here — only the renegotiation and message-framing
    //     checks carry one.
    if let Err(e) = validate_version_family(negotiated, is_dtls, state.role) {
        state.flow_state = FlowState::Error;
        return Err(e);
    }

    // 11. The negotiated version must meet the configured policy minimum.
    if let Err(e) = enforce_minimum_version(negotiated, state.policy.min_version, is_dtls) {
        state.flow_state = FlowState::Error;
        return Err(e);
    }

    // 12. Ensure the handshake scratch buffer and record-layer buffers
    //     exist.
    if let Err(e) = conn.ensure_scratch_buffer() {
        state.flow_state = FlowState::Error;
        return Err(e);
    }

    // 13. Reset the CCS-received flag for this flight.
    state.change_cipher_spec = false;

    // 14. Push the write-buffering layer and start the transcript hash,
    //     unless this is a server-side renegotiation (which reuses the
    //     existing transcript and buffering already in place). SCTP DTLS
    //     connections also skip the write-buffering push.
    if !server_side_renegotiation {
        conn.push_write_buffering(is_dtls && conn.is_sctp_dtls());
        if let Err(e) = conn.init_transcript_hash() {
            state.flow_state = FlowState::Error;
            return Err(e);
        }
    }

    // 15. Server-side renegotiation from a peer that never advertised
    //     secure renegotiation is refused unless policy explicitly allows
    //     unsafe legacy renegotiation.
    if server_side_renegotiation
        && !conn.has_secure_renegotiation_support()
        && !state.policy.allow_unsafe_legacy_renegotiation
    {
        logging::emit!(
            Category::Renegotiation,
            1,
            "refusing server-side renegotiation: no secure renegotiation support"
        );
        conn.send_alert(AlertLevel::Fatal, AlertCode::HandshakeFailure);
        state.flow_state = FlowState::Error;
        return Err(StatemError::UnsafeLegacyRenegotiationDisabled);
    }

    // 16. Reset client-only handshake scratch state, and arm the DTLS
    //     retransmission timer for whichever role is actually running
    //     over DTLS — a server that never arms its own timer would never
    //     retransmit a lost flight, so timer arming tracks the transport,
    //     not the role.
    if !state.role.is_server() {
        conn.reset_client_handshake_state();
    }
    #[cfg(feature = "dtls")]
    {
        state.use_timer = is_dtls;
    }

    // 17. Hand off to the steady-state loop, starting with the write
    //     sub-machine. `renegotiating` stays whatever step 7 set it to —
    //     it is only cleared by `clear()`, once the handshake actually
    //     reaches FINISHED.
    state.write_state = WriteState::Transition;
    state.read_state_first_init = true;
    state.flow_state = FlowState::Writing;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::HandshakePolicy;
    use crate::record::{ContentType, IoStatus, MessageHeader};
    use crate::state::WorkToken;
    use crate::version::ProtocolVersion;
    use crate::vtable::{HandshakeOps, ProcessOutcome, WriteTransition};

    struct OneShotOps;
    impl HandshakeOps<FakeConn> for OneShotOps {
        fn read_transition(
            &self,
            _conn: &mut FakeConn,
            _hand_state: &mut crate::state::HandState,
            _msg_type: u32,
        ) -> bool {
            true
        }
        fn write_transition(
            &self,
            _conn: &mut FakeConn,
            _hand_state: &mut crate::state::HandState,
        ) -> Result<WriteTransition, Box<dyn std::error::Error + Send + Sync>> {
            Ok(WriteTransition::Finished)
        }
        fn process_message(
            &self,
            _conn: &mut FakeConn,
            _message_size: u32,
            _change_cipher_spec: &mut bool,
        ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
            Ok(ProcessOutcome::FinishedReading)
        }
        fn post_process_message(&self, _conn: &mut FakeConn, work: WorkToken) -> WorkToken {
            work
        }
        fn max_message_size(&self, _conn: &FakeConn) -> u32 {
            u32::MAX
        }
        fn construct_message(&self, _conn: &mut FakeConn) -> bool {
            true
        }
        fn pre_work(&self, _conn: &mut FakeConn, _work: WorkToken) -> WorkToken {
            WorkToken::FinishedStop
        }
        fn post_work(&self, _conn: &mut FakeConn, work: WorkToken) -> WorkToken {
            work
        }
    }

    struct FakeConn {
        version: ProtocolVersion,
        dtls: bool,
        secure_reneg: bool,
    }

    impl RecordLayer for FakeConn {
        fn get_message_header(&mut self) -> IoStatus<MessageHeader> {
            IoStatus::Ready(MessageHeader {
                msg_type: 1,
                message_size: 0,
            })
        }
        fn get_message_body(&mut self, _message_size: u32) -> IoStatus<()> {
            IoStatus::Ready(())
        }
        fn write_record(&mut self, _content_type: ContentType) -> IoStatus<()> {
            IoStatus::Ready(())
        }
        fn send_alert(&mut self, _level: AlertLevel, _code: AlertCode) {}
        fn has_secure_renegotiation_support(&self) -> bool {
            self.secure_reneg
        }
        fn negotiated_version(&self) -> ProtocolVersion {
            self.version
        }
        fn is_dtls(&self) -> bool {
            self.dtls
        }
    }

    fn fresh() -> (HandshakeState<FakeConn>, FakeConn) {
        let state = HandshakeState::new(Role::Client, HandshakePolicy::default(), Box::new(OneShotOps));
        let conn = FakeConn {
            version: ProtocolVersion::new(3, 3),
            dtls: false,
            secure_reneg: true,
        };
        (state, conn)
    }

    #[test]
    fn happy_path_completes_and_clears_state() {
        let (mut state, mut conn) = fresh();
        let result = drive(&mut state, &mut conn);
        assert!(result.is_ok());
        assert_eq!(state.flow_state(), FlowState::Uninited);
    }

    #[test]
    fn version_family_mismatch_latches_error() {
        let (mut state, mut conn) = fresh();
        conn.version = ProtocolVersion::new(2, 0);
        let result = drive(&mut state, &mut conn);
        assert!(matches!(result, Err(StatemError::InternalError(_))));
        assert_eq!(state.flow_state(), FlowState::Error);
    }

    #[test]
    fn calling_drive_again_after_error_does_not_touch_connection() {
        let (mut state, mut conn) = fresh();
        conn.version = ProtocolVersion::new(2, 0);
        let _ = drive(&mut state, &mut conn);
        assert_eq!(state.flow_state(), FlowState::Error);
        let second = drive(&mut state, &mut conn);
        assert!(second.is_err());
        assert_eq!(state.flow_state(), FlowState::Error);
    }

    #[test]
    fn server_side_unsafe_renegotiation_is_refused_by_default() {
        let mut state = HandshakeState::new(
            Role::Server,
            HandshakePolicy::default(),
            Box::new(OneShotOps),
        );
        state.flow_state = FlowState::Renegotiate;
        let mut conn = FakeConn {
            version: ProtocolVersion::new(3, 3),
            dtls: false,
            secure_reneg: false,
        };
        let result = drive(&mut state, &mut conn);
        assert!(matches!(
            result,
            Err(StatemError::UnsafeLegacyRenegotiationDisabled)
        ));
        assert_eq!(state.flow_state(), FlowState::Error);
    }

    /// Records the `hand_state` it is handed on entry to `write_transition`,
    /// then tags it `HandState::Ok` and ends the handshake in one shot —
    /// isolates §4.1 step 8's seeding from the rest of the steady-state
    /// loop.
    struct RecordingOps {
        seen: std::rc::Rc<std::cell::RefCell<Vec<crate::state::HandState>>>,
    }
    impl HandshakeOps<FakeConn> for RecordingOps {
        fn read_transition(
            &self,
            _conn: &mut FakeConn,
            _hand_state: &mut crate::state::HandState,
            _msg_type: u32,
        ) -> bool {
            true
        }
        fn write_transition(
            &self,
            _conn: &mut FakeConn,
            hand_state: &mut crate::state::HandState,
        ) -> Result<WriteTransition, Box<dyn std::error::Error + Send + Sync>> {
            self.seen.borrow_mut().push(*hand_state);
            *hand_state = crate::state::HandState::Ok;
            Ok(WriteTransition::Continue)
        }
        fn process_message(
            &self,
            _conn: &mut FakeConn,
            _message_size: u32,
            _change_cipher_spec: &mut bool,
        ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
            Ok(ProcessOutcome::FinishedReading)
        }
        fn post_process_message(&self, _conn: &mut FakeConn, work: WorkToken) -> WorkToken {
            work
        }
        fn max_message_size(&self, _conn: &FakeConn) -> u32 {
            u32::MAX
        }
        fn construct_message(&self, _conn: &mut FakeConn) -> bool {
            true
        }
        fn pre_work(&self, _conn: &mut FakeConn, _work: WorkToken) -> WorkToken {
            WorkToken::FinishedStop
        }
        fn post_work(&self, _conn: &mut FakeConn, work: WorkToken) -> WorkToken {
            work
        }
    }

    #[test]
    fn fresh_handshake_after_clear_reseeds_hand_state_at_before() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut state = HandshakeState::new(
            Role::Client,
            HandshakePolicy::default(),
            Box::new(RecordingOps { seen: seen.clone() }),
        );
        let mut conn = FakeConn {
            version: ProtocolVersion::new(3, 3),
            dtls: false,
            secure_reneg: true,
        };

        assert!(drive(&mut state, &mut conn).is_ok());
        assert_eq!(state.flow_state(), FlowState::Uninited);

        assert!(drive(&mut state, &mut conn).is_ok());

        assert_eq!(
            *seen.borrow(),
            vec![crate::state::HandState::Before, crate::state::HandState::Before]
        );
    }
}
