//! Diagnostic event sink and verbosity control for the handshake driver.
//!
//! This crate is deliberately separate from the info-callback contract the
//! driver exposes to embedders: the info callback is a stable, minimal,
//! externally-observable milestone stream, while this crate is an internal
//! instrumentation channel a developer enables to see what the read/write
//! sub-machines are actually doing. Four independent categories — handshake,
//! record, renegotiation, and timer — each carry their own verbosity level
//! rather than one global knob.

use std::fmt;
use std::sync::{Mutex, OnceLock};

#[cfg(feature = "tracing")]
mod tracing_bridge;

/// A diagnostic category the driver instruments independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    /// Outer message-flow transitions and one-time setup steps.
    Handshake,
    /// Read/write sub-machine record traffic.
    Record,
    /// Renegotiation bookkeeping.
    Renegotiation,
    /// DTLS retransmission timer arming/firing.
    Timer,
}

impl Category {
    const fn name(self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::Record => "record",
            Self::Renegotiation => "renegotiation",
            Self::Timer => "timer",
        }
    }

    const fn from_name(name: &str) -> Option<Self> {
        match name.as_bytes() {
            b"handshake" => Some(Self::Handshake),
            b"record" => Some(Self::Record),
            b"renegotiation" => Some(Self::Renegotiation),
            b"timer" => Some(Self::Timer),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-category verbosity levels. Higher is more verbose; `0` disables a
/// category entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Level for [`Category::Handshake`].
    pub handshake: u8,
    /// Level for [`Category::Record`].
    pub record: u8,
    /// Level for [`Category::Renegotiation`].
    pub renegotiation: u8,
    /// Level for [`Category::Timer`].
    pub timer: u8,
}

impl VerbosityConfig {
    /// Maps a single `-v` repeat count to a verbosity config, mirroring how
    /// the driver's embedder would typically expose one counted flag
    /// rather than four independent ones.
    ///
    /// Level 0 is silent. Level 1 enables handshake-level milestones.
    /// Level 2 adds record traffic. Level 3 adds renegotiation and timer
    /// detail. Levels above 3 raise every category's level in lockstep.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        if level == 0 {
            return Self::default();
        }
        Self {
            handshake: level,
            record: level.saturating_sub(1),
            renegotiation: level.saturating_sub(2),
            timer: level.saturating_sub(2),
        }
    }

    fn level_for(self, category: Category) -> u8 {
        match category {
            Category::Handshake => self.handshake,
            Category::Record => self.record,
            Category::Renegotiation => self.renegotiation,
            Category::Timer => self.timer,
        }
    }

    fn level_for_mut(&mut self, category: Category) -> &mut u8 {
        match category {
            Category::Handshake => &mut self.handshake,
            Category::Record => &mut self.record,
            Category::Renegotiation => &mut self.renegotiation,
            Category::Timer => &mut self.timer,
        }
    }
}

/// A single recorded diagnostic, as captured by [`drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticEvent {
    /// Which category emitted this event.
    pub category: Category,
    /// The level it was emitted at.
    pub level: u8,
    /// The rendered message.
    pub message: String,
}

fn config_cell() -> &'static Mutex<VerbosityConfig> {
    static CONFIG: OnceLock<Mutex<VerbosityConfig>> = OnceLock::new();
    CONFIG.get_or_init(|| Mutex::new(VerbosityConfig::default()))
}

fn events_cell() -> &'static Mutex<Vec<DiagnosticEvent>> {
    static EVENTS: OnceLock<Mutex<Vec<DiagnosticEvent>>> = OnceLock::new();
    EVENTS.get_or_init(|| Mutex::new(Vec::new()))
}

/// Installs `config` as the process-wide verbosity configuration,
/// replacing whatever was there before.
pub fn init(config: VerbosityConfig) {
    let mut guard = config_cell().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    *guard = config;
}

/// `true` iff `category` is configured at `level` or above.
#[must_use]
pub fn category_gte(category: Category, level: u8) -> bool {
    let guard = config_cell().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.level_for(category) >= level
}

/// Parses a flag of the form `"<category>"` or `"<category><level>"` (e.g.
/// `"handshake"` or `"handshake2"`) and raises that category to the parsed
/// level (default `1`) in the live configuration.
///
/// # Errors
///
/// Returns an error string if `name` doesn't start with a known category.
pub fn apply_flag(name: &str) -> Result<(), String> {
    let split_at = name
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(name.len());
    let (category_name, level_str) = name.split_at(split_at);
    let category = Category::from_name(category_name)
        .ok_or_else(|| format!("unknown diagnostic category: {category_name}"))?;
    let level: u8 = if level_str.is_empty() {
        1
    } else {
        level_str
            .parse()
            .map_err(|_| format!("invalid level in diagnostic flag: {name}"))?
    };

    let mut guard = config_cell().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    *guard.level_for_mut(category) = level;
    Ok(())
}

/// Records `event` if `category` is enabled at `level`, returning whether it
/// was recorded. Called by [`emit`] — exported so embedders bridging to a
/// different sink can reuse the same filtering decision.
#[must_use]
pub fn record(category: Category, level: u8, message: String) -> bool {
    if !category_gte(category, level) {
        return false;
    }

    #[cfg(feature = "tracing")]
    tracing_bridge::forward(category, level, &message);

    let mut guard = events_cell().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.push(DiagnosticEvent {
        category,
        level,
        message,
    });
    true
}

/// Drains and returns every event recorded since the last call.
pub fn drain_events() -> Vec<DiagnosticEvent> {
    let mut guard = events_cell().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    std::mem::take(&mut *guard)
}

/// Records a formatted diagnostic for `category` at `level`, same filtering
/// semantics as [`record`].
#[macro_export]
macro_rules! emit {
    ($category:expr, $level:expr, $($arg:tt)*) => {
        $crate::record($category, $level, ::std::format!($($arg)*))
    };
}
