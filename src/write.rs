//! The write sub-machine and its physical-write content-type dispatcher.

use crate::error::{DriveResult, StatemError};
use crate::handshake::HandshakeState;
use crate::record::{ContentType, IoStatus, RecordLayer};
use crate::state::{HandState, SubOutcome, WorkToken, WriteState};
use crate::vtable::WriteTransition;
use logging::Category;

/// Drives `TRANSITION → PRE_WORK → SEND → POST_WORK → …` until the
/// outbound phase yields or the handshake completes.
pub(crate) fn run<Conn: RecordLayer>(
    state: &mut HandshakeState<Conn>,
    conn: &mut Conn,
) -> DriveResult<SubOutcome> {
    loop {
        match state.write_state {
            WriteState::Transition => {
                if let Some(cb) = conn.info_callback() {
                    cb.on_event(state.role, crate::info::InfoEvent::Loop);
                }

                match state
                    .ops
                    .write_transition(conn, &mut state.hand_state)
                    .map_err(StatemError::Vtable)?
                {
                    WriteTransition::Continue => {
                        state.write_work = WorkToken::MoreA;
                        state.write_state = WriteState::PreWork;
                    }
                    WriteTransition::Finished => return Ok(SubOutcome::Finished),
                }
            }

            WriteState::PreWork => {
                let result = state.ops.pre_work(conn, state.write_work);
                state.write_work = result;
                match result {
                    WorkToken::FinishedContinue => {
                        if !state.ops.construct_message(conn) {
                            return Err(StatemError::InternalError(
                                "construct_message reported failure",
                            ));
                        }
                        state.write_state = WriteState::Send;
                    }
                    WorkToken::FinishedStop => return Ok(SubOutcome::EndHandshake),
                    _ => return Err(StatemError::WouldBlock),
                }
            }

            WriteState::Send => {
                start_timer_if_armed(state, conn);

                let content_type = do_write_content_type(state.hand_state);
                logging::emit!(Category::Record, 2, "writing record: content_type={content_type:?}");
                match conn.write_record(content_type) {
                    IoStatus::Ready(()) => {}
                    IoStatus::WouldBlock => return Err(StatemError::WouldBlock),
                }
                if content_type == ContentType::ChangeCipherSpec {
                    state.change_cipher_spec = true;
                }

                state.write_work = WorkToken::MoreA;
                state.write_state = WriteState::PostWork;
            }

            WriteState::PostWork => {
                let result = state.ops.post_work(conn, state.write_work);
                state.write_work = result;
                match result {
                    WorkToken::FinishedContinue => {
                        state.write_state = WriteState::Transition;
                    }
                    WorkToken::FinishedStop => return Ok(SubOutcome::EndHandshake),
                    _ => return Err(StatemError::WouldBlock),
                }
            }
        }
    }
}

/// A one-line demultiplexer between the CCS record path and the generic
/// handshake-record path: CCS is a distinct TLS record type, not a
/// handshake message, so it needs its own `ContentType`.
fn do_write_content_type(hand_state: HandState) -> ContentType {
    match hand_state {
        HandState::CwChange | HandState::SwChange => ContentType::ChangeCipherSpec,
        _ => ContentType::Handshake,
    }
}

#[cfg(feature = "dtls")]
fn start_timer_if_armed<Conn: RecordLayer>(state: &HandshakeState<Conn>, conn: &mut Conn) {
    if state.use_timer {
        logging::emit!(Category::Timer, 2, "starting retransmission timer before send");
        conn.start_retransmission_timer();
    }
}

#[cfg(not(feature = "dtls"))]
fn start_timer_if_armed<Conn: RecordLayer>(_state: &HandshakeState<Conn>, _conn: &mut Conn) {}
