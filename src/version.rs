//! Negotiated-version family and minimum-version validation.

use crate::error::StatemError;
use crate::state::Role;

/// TLS major version byte (TLS 1.0 through 1.2 all carry major byte 3).
pub const TLS_MAJOR: u8 = 3;

/// DTLS major version byte. DTLS version numbers count *down* from
/// `0xFEFF` as the protocol gets newer, the inverse of TLS's increasing
/// scheme, which is why [`ProtocolVersion::at_least`] branches on
/// `is_dtls`.
pub const DTLS_MAJOR: u8 = 0xFE;

/// A two-byte protocol version, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion {
    /// Major version byte.
    pub major: u8,
    /// Minor version byte.
    pub minor: u8,
}

impl ProtocolVersion {
    /// Sentinel meaning "no specific version constraint"; skips both the
    /// version-family check and the minimum-version policy check.
    pub const ANY_VERSION: Self = Self { major: 0, minor: 0 };

    /// Back-compat sentinel some old clients send in place of a real DTLS
    /// major byte; accepted only for the client role.
    pub const DTLS1_BAD_VER: Self = Self {
        major: 1,
        minor: 0,
    };

    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Ordinal value used for comparisons, accounting for DTLS's inverted
    /// version numbering: a newer DTLS version has a *smaller* wire value,
    /// so we negate the (major, minor) pair before comparing when
    /// `is_dtls` is set.
    const fn ordinal(self, is_dtls: bool) -> (i32, i32) {
        let major = self.major as i32;
        let minor = self.minor as i32;
        if is_dtls {
            (-major, -minor)
        } else {
            (major, minor)
        }
    }

    /// `true` iff `self` is at least as new as `min` under the version
    /// family's ordering.
    #[must_use]
    pub const fn at_least(self, min: Self, is_dtls: bool) -> bool {
        let (sa, sb) = self.ordinal(is_dtls);
        let (ma, mb) = min.ordinal(is_dtls);
        sa > ma || (sa == ma && sb >= mb)
    }
}

/// Validates that `version` belongs to the expected family for `is_dtls`,
/// with the DTLS1_BAD_VER back-compat exception on the client side.
/// Returns [`StatemError::InternalError`] on mismatch.
pub fn validate_version_family(
    version: ProtocolVersion,
    is_dtls: bool,
    role: Role,
) -> Result<(), StatemError> {
    if version == ProtocolVersion::ANY_VERSION {
        return Ok(());
    }
    if is_dtls {
        if version.major == DTLS_MAJOR {
            return Ok(());
        }
        if role == Role::Client && version == ProtocolVersion::DTLS1_BAD_VER {
            return Ok(());
        }
        return Err(StatemError::InternalError(
            "negotiated version is not a DTLS version",
        ));
    }
    if version.major == TLS_MAJOR {
        return Ok(());
    }
    Err(StatemError::InternalError(
        "negotiated version is not a TLS version",
    ))
}

/// Enforces the security-policy minimum version. `ANY_VERSION` always
/// passes.
pub fn enforce_minimum_version(
    version: ProtocolVersion,
    min_version: ProtocolVersion,
    is_dtls: bool,
) -> Result<(), StatemError> {
    if version == ProtocolVersion::ANY_VERSION {
        return Ok(());
    }
    if version.at_least(min_version, is_dtls) {
        Ok(())
    } else {
        Err(StatemError::VersionTooLow)
    }
}
