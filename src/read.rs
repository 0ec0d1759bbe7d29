//! The read sub-machine.

use crate::error::{DriveResult, StatemError};
use crate::handshake::HandshakeState;
use crate::record::{IoStatus, RecordLayer};
use crate::state::{ReadState, SubOutcome, WorkToken};
use crate::vtable::ProcessOutcome;
use logging::Category;

/// Drives `HEADER → BODY → [POST_PROCESS] → …` until the inbound phase
/// yields, either because the reading phase is over
/// ([`SubOutcome::Finished`]) or because of an NBIO stall or fatal error.
///
/// Never returns [`SubOutcome::EndHandshake`] — reading only ever hands
/// control back to the outer machine by finishing, not by ending the
/// handshake outright.
pub(crate) fn run<Conn: RecordLayer>(
    state: &mut HandshakeState<Conn>,
    conn: &mut Conn,
) -> DriveResult<SubOutcome> {
    if state.read_state_first_init {
        conn.set_first_packet(true);
        state.read_state_first_init = false;
    }

    loop {
        match state.read_state {
            ReadState::Header => {
                conn.reset_scratch_cursor();
                let header = conn.get_message_header().into_drive_result()?;
                logging::emit!(
                    Category::Record,
                    2,
                    "read header: msg_type={} size={}",
                    header.msg_type,
                    header.message_size
                );

                emit_loop(state, conn);

                if !state
                    .ops
                    .read_transition(conn, &mut state.hand_state, header.msg_type)
                {
                    conn.send_alert(
                        crate::record::AlertLevel::Fatal,
                        crate::record::AlertCode::UnexpectedMessage,
                    );
                    return Err(StatemError::UnexpectedMessage);
                }

                let max = state.ops.max_message_size(conn);
                if header.message_size > max {
                    conn.send_alert(
                        crate::record::AlertLevel::Fatal,
                        crate::record::AlertCode::IllegalParameter,
                    );
                    return Err(StatemError::ExcessiveMessageSize);
                }

                state.pending_message_size = header.message_size;
                state.read_state = ReadState::Body;
            }

            ReadState::Body => {
                if !conn.is_dtls() {
                    match conn.get_message_body(state.pending_message_size) {
                        IoStatus::Ready(()) => {}
                        IoStatus::WouldBlock => return Err(StatemError::WouldBlock),
                    }
                }
                conn.set_first_packet(false);

                match state
                    .ops
                    .process_message(conn, state.pending_message_size, &mut state.change_cipher_spec)
                    .map_err(StatemError::Vtable)?
                {
                    ProcessOutcome::FinishedReading => {
                        stop_timer_if_armed(state, conn);
                        return Ok(SubOutcome::Finished);
                    }
                    ProcessOutcome::ContinueProcessing => {
                        state.read_work = WorkToken::MoreA;
                        state.read_state = ReadState::PostProcess;
                    }
                    ProcessOutcome::ContinueReading => {
                        state.read_state = ReadState::Header;
                    }
                }
            }

            ReadState::PostProcess => {
                let result = state.ops.post_process_message(conn, state.read_work);
                state.read_work = result;
                match result {
                    WorkToken::FinishedContinue => {
                        state.read_state = ReadState::Header;
                    }
                    WorkToken::FinishedStop => {
                        stop_timer_if_armed(state, conn);
                        return Ok(SubOutcome::Finished);
                    }
                    _ => return Err(StatemError::WouldBlock),
                }
            }
        }
    }
}

fn emit_loop<Conn: RecordLayer>(state: &HandshakeState<Conn>, conn: &mut Conn) {
    if let Some(cb) = conn.info_callback() {
        cb.on_event(state.role, crate::info::InfoEvent::Loop);
    }
}

#[cfg(feature = "dtls")]
fn stop_timer_if_armed<Conn: RecordLayer>(state: &HandshakeState<Conn>, conn: &mut Conn) {
    if state.use_timer {
        logging::emit!(Category::Timer, 2, "stopping retransmission timer on read finish");
        conn.stop_retransmission_timer();
    }
}

#[cfg(not(feature = "dtls"))]
fn stop_timer_if_armed<Conn: RecordLayer>(_state: &HandshakeState<Conn>, _conn: &mut Conn) {}
