//! The info-callback contract: a synchronous milestone stream an embedder
//! can observe without touching the driver's internal cursors.

use crate::state::Role;

/// A milestone the driver observes synchronously from inside `drive`.
///
/// Exactly one `HandshakeStart` event fires per handshake, paired with
/// exactly one `Exit` event per `drive` invocation — including NBIO exits,
/// which still report an `Exit` with the numeric outcome so a caller can
/// count stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoEvent {
    /// Fired once, synchronously, at the top of the one-time setup block.
    HandshakeStart,
    /// Fired at each read-header arrival and each write-transition step
    /// that moves the handshake forward — i.e. the `ACCEPT_LOOP` /
    /// `CONNECT_LOOP` events, disambiguated here by `role` rather than by
    /// separate enum variants per role.
    Loop,
    /// Fired on every exit path (success, NBIO, fatal), carrying the
    /// numeric result `drive` is about to return: `1` on success, `<= 0`
    /// otherwise. This is `ACCEPT_EXIT` / `CONNECT_EXIT` disambiguated by
    /// `role`.
    Exit(i32),
}

/// A caller-supplied observer. Implementations must not re-enter `drive`
/// for the same connection.
pub trait InfoCallback {
    /// Called synchronously at each milestone named by [`InfoEvent`].
    fn on_event(&mut self, role: Role, event: InfoEvent);
}

/// An [`InfoCallback`] that does nothing; the default when the embedder
/// hasn't installed one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInfoCallback;

impl InfoCallback for NoopInfoCallback {
    fn on_event(&mut self, _role: Role, _event: InfoEvent) {}
}

impl<F: FnMut(Role, InfoEvent)> InfoCallback for F {
    fn on_event(&mut self, role: Role, event: InfoEvent) {
        self(role, event);
    }
}
