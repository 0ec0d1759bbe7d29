//! Shared test harness: a minimal in-memory `RecordLayer` + `HandshakeOps`
//! pair, configurable enough to drive every scenario in the handshake
//! driver's integration tests.

#![allow(dead_code)]

use statem::{
    AlertCode, AlertLevel, ContentType, HandState, HandshakeOps, HandshakePolicy, HandshakeState,
    InfoCallback, InfoEvent, IoStatus, MessageHeader, ProcessOutcome, ProtocolVersion, RecordLayer,
    Role, WorkToken, WriteTransition,
};
use std::cell::Cell;

/// Collects every [`InfoEvent`] fired during a `drive` call, so integration
/// tests can check callback symmetry (one `HandshakeStart` per one `Exit`).
#[derive(Default)]
pub struct RecordingInfoCallback {
    pub events: Vec<(Role, InfoEvent)>,
}

impl InfoCallback for RecordingInfoCallback {
    fn on_event(&mut self, role: Role, event: InfoEvent) {
        self.events.push((role, event));
    }
}

impl RecordingInfoCallback {
    pub fn handshake_start_count(&self) -> usize {
        self.events
            .iter()
            .filter(|(_, e)| matches!(e, InfoEvent::HandshakeStart))
            .count()
    }

    pub fn exit_count(&self) -> usize {
        self.events
            .iter()
            .filter(|(_, e)| matches!(e, InfoEvent::Exit(_)))
            .count()
    }
}

/// A scripted inbound message: header plus whether the body read should
/// stall once before succeeding.
#[derive(Clone, Copy)]
pub struct ScriptedMessage {
    pub msg_type: u32,
    pub message_size: u32,
}

pub struct FakeConn {
    pub version: ProtocolVersion,
    pub dtls: bool,
    pub secure_reneg: bool,
    pub inbound: Vec<ScriptedMessage>,
    pub next_inbound: usize,
    pub header_would_block_once: Cell<bool>,
    pub alerts_sent: Vec<AlertCode>,
    pub records_written: Vec<ContentType>,
    pub info: RecordingInfoCallback,
}

impl FakeConn {
    pub fn new() -> Self {
        Self {
            version: ProtocolVersion::new(3, 3),
            dtls: false,
            secure_reneg: true,
            inbound: Vec::new(),
            next_inbound: 0,
            header_would_block_once: Cell::new(false),
            alerts_sent: Vec::new(),
            records_written: Vec::new(),
            info: RecordingInfoCallback::default(),
        }
    }
}

impl RecordLayer for FakeConn {
    fn get_message_header(&mut self) -> IoStatus<MessageHeader> {
        if self.header_would_block_once.get() {
            self.header_would_block_once.set(false);
            return IoStatus::WouldBlock;
        }
        let msg = self.inbound[self.next_inbound];
        IoStatus::Ready(MessageHeader {
            msg_type: msg.msg_type,
            message_size: msg.message_size,
        })
    }

    fn get_message_body(&mut self, _message_size: u32) -> IoStatus<()> {
        self.next_inbound += 1;
        IoStatus::Ready(())
    }

    fn write_record(&mut self, content_type: ContentType) -> IoStatus<()> {
        self.records_written.push(content_type);
        IoStatus::Ready(())
    }

    fn send_alert(&mut self, _level: AlertLevel, code: AlertCode) {
        self.alerts_sent.push(code);
    }

    fn has_secure_renegotiation_support(&self) -> bool {
        self.secure_reneg
    }

    fn negotiated_version(&self) -> ProtocolVersion {
        self.version
    }

    fn is_dtls(&self) -> bool {
        self.dtls
    }

    fn info_callback(&mut self) -> Option<&mut dyn InfoCallback> {
        Some(&mut self.info)
    }
}

/// A two-flight `HandshakeOps`: sends one message, reads one scripted
/// message, sends one more, then ends — the smallest grammar that
/// exercises both sub-machines and the `EndHandshake` exit from
/// `pre_work`.
pub struct TwoFlightOps {
    phase: Cell<u32>,
}

impl TwoFlightOps {
    pub fn new() -> Self {
        Self { phase: Cell::new(0) }
    }
}

impl HandshakeOps<FakeConn> for TwoFlightOps {
    fn read_transition(
        &self,
        _conn: &mut FakeConn,
        hand_state: &mut HandState,
        msg_type: u32,
    ) -> bool {
        if msg_type != 1 {
            return false;
        }
        *hand_state = HandState::Other(1);
        true
    }

    fn write_transition(
        &self,
        _conn: &mut FakeConn,
        hand_state: &mut HandState,
    ) -> Result<WriteTransition, Box<dyn std::error::Error + Send + Sync>> {
        match self.phase.get() {
            0 => {
                self.phase.set(1);
                *hand_state = HandState::CwClntHello;
                Ok(WriteTransition::Continue)
            }
            2 => {
                self.phase.set(3);
                *hand_state = HandState::CwChange;
                Ok(WriteTransition::Continue)
            }
            _ => {
                *hand_state = HandState::Ok;
                Ok(WriteTransition::Finished)
            }
        }
    }

    fn process_message(
        &self,
        _conn: &mut FakeConn,
        _message_size: u32,
        _change_cipher_spec: &mut bool,
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
        self.phase.set(2);
        Ok(ProcessOutcome::FinishedReading)
    }

    fn post_process_message(&self, _conn: &mut FakeConn, work: WorkToken) -> WorkToken {
        work
    }

    fn max_message_size(&self, _conn: &FakeConn) -> u32 {
        1024
    }

    fn construct_message(&self, _conn: &mut FakeConn) -> bool {
        true
    }

    fn pre_work(&self, _conn: &mut FakeConn, _work: WorkToken) -> WorkToken {
        WorkToken::FinishedContinue
    }

    fn post_work(&self, _conn: &mut FakeConn, _work: WorkToken) -> WorkToken {
        if self.phase.get() == 3 {
            WorkToken::FinishedStop
        } else {
            WorkToken::FinishedContinue
        }
    }
}

pub fn fresh_client() -> (HandshakeState<FakeConn>, FakeConn) {
    let mut conn = FakeConn::new();
    conn.inbound.push(ScriptedMessage {
        msg_type: 1,
        message_size: 16,
    });
    let state = HandshakeState::new(Role::Client, HandshakePolicy::default(), Box::new(TwoFlightOps::new()));
    (state, conn)
}
