//! Security-policy knobs threaded through the driver.

use crate::version::ProtocolVersion;

/// The security-policy minimum version and whether unsafe legacy
/// renegotiation is permitted.
///
/// Supplied once at construction, the same way a `VerbosityConfig` is
/// threaded through `logging::init` rather than read from mutable global
/// flags deep inside call stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandshakePolicy {
    /// The oldest version this endpoint will negotiate.
    pub min_version: ProtocolVersion,
    /// If `false` (the default), a server-side renegotiation from a peer
    /// that never advertised RFC 5746 secure renegotiation is refused with
    /// a fatal `HANDSHAKE_FAILURE` alert.
    pub allow_unsafe_legacy_renegotiation: bool,
}

impl Default for HandshakePolicy {
    fn default() -> Self {
        Self {
            min_version: ProtocolVersion::ANY_VERSION,
            allow_unsafe_legacy_renegotiation: false,
        }
    }
}
