//! Cursor types for the outer and inner state machines.

/// Which side of the handshake a [`crate::HandshakeState`] is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// We sent ClientHello.
    Client,
    /// We are responding to ClientHello.
    Server,
}

impl Role {
    #[must_use]
    pub const fn is_server(self) -> bool {
        matches!(self, Self::Server)
    }
}

/// Outer message-flow machine cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// No handshake is running; quiescent.
    Uninited,
    /// The owner has requested a fresh handshake over an established
    /// connection.
    Renegotiate,
    /// The write sub-machine is driving.
    Writing,
    /// The read sub-machine is driving.
    Reading,
    /// The handshake completed successfully.
    Finished,
    /// Absorbing: latched permanently once any unrecoverable fault occurs.
    Error,
}

impl FlowState {
    /// `true` iff a handshake is in progress.
    #[must_use]
    pub const fn in_progress(self) -> bool {
        matches!(self, Self::Writing | Self::Reading)
    }
}

/// Read sub-machine cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadState {
    /// Waiting for / just received a message header.
    Header,
    /// Waiting for / just received the message body.
    Body,
    /// Running `post_process_message` to completion.
    PostProcess,
}

/// Write sub-machine cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteState {
    /// Running `transition()` to decide the next message, if any.
    Transition,
    /// Running `pre_work` ahead of constructing the message.
    PreWork,
    /// Performing the physical write.
    Send,
    /// Running `post_work` after the physical write.
    PostWork,
}

/// Resumable-work progress token threaded through `pre_work` /
/// `post_work` / `post_process_message`.
///
/// The driver never inspects the `More*` variants semantically; it only
/// asks whether a token is terminal via [`WorkToken::is_finished`]. The
/// small closed set of `More*` values is what lets a vtable's work
/// callback restart itself arbitrarily many times across NBIO stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkToken {
    /// Work is ongoing; call the same callback again next time it's due.
    MoreA,
    /// See [`WorkToken::MoreA`].
    MoreB,
    /// See [`WorkToken::MoreA`].
    MoreC,
    /// See [`WorkToken::MoreA`].
    MoreD,
    /// Work finished; the sub-machine should continue to its next state.
    FinishedContinue,
    /// Work finished and the handshake itself is over.
    FinishedStop,
}

impl WorkToken {
    /// `true` for the two `Finished*` variants.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::FinishedContinue | Self::FinishedStop)
    }

    /// `true` only for [`WorkToken::FinishedStop`].
    #[must_use]
    pub const fn stops_handshake(self) -> bool {
        matches!(self, Self::FinishedStop)
    }
}

/// The opaque protocol-level state tag a concrete handshake grammar
/// advances via its `transition` callbacks.
///
/// The driver recognizes exactly a handful of named tags — the rest of
/// the grammar's states live behind
/// [`HandState::Other`], which the vtable is free to use for every
/// protocol-specific position (awaiting ServerHello, awaiting Finished,
/// ...) the driver itself never needs to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandState {
    /// Before any handshake has started.
    Before,
    /// Client has queued ClientHello but nothing further has happened yet.
    CwClntHello,
    /// Client is about to write (or has written) its ChangeCipherSpec.
    CwChange,
    /// Server is about to write (or has written) its ChangeCipherSpec.
    SwChange,
    /// Handshake complete; steady state between handshakes.
    Ok,
    /// Any other grammar-specific state, opaque to the driver.
    Other(u32),
}

/// What a sub-machine reported when it stopped driving.
///
/// The read sub-machine never produces [`SubOutcome::EndHandshake`] — only
/// the write sub-machine's `pre_work`/`post_work` terminal-stop path does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubOutcome {
    /// The sub-machine's phase is over; the outer machine flips to the
    /// other sub-machine.
    Finished,
    /// The handshake itself is over; the outer machine moves to
    /// `FINISHED`.
    EndHandshake,
}
