//! Logging setup.
//!
//! Library code only emits `tracing` events, installing a subscriber is left to the
//! binary (or to a test scoping one with `tracing::subscriber::with_default`).

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Warnings and errors only, unsupported content encodings show up at this level.
pub const DEFAULT_LEVEL: Level = Level::WARN;

pub fn subscriber(max_level: Level) -> FmtSubscriber {
    FmtSubscriber::builder().with_max_level(max_level).with_target(false).finish()
}
