//! Forwards recorded diagnostics onto `tracing`, for embedders that already
//! have a `tracing` subscriber installed and would rather not poll
//! `drain_events` themselves.

use crate::Category;

pub(crate) fn forward(category: Category, level: u8, message: &str) {
    match category {
        Category::Handshake => tracing::debug!(category = "handshake", level, "{message}"),
        Category::Record => tracing::trace!(category = "record", level, "{message}"),
        Category::Renegotiation => {
            tracing::debug!(category = "renegotiation", level, "{message}");
        }
        Category::Timer => tracing::trace!(category = "timer", level, "{message}"),
    }
}
