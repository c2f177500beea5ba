//! Dispatcher configuration.

use serde::{Deserialize, Serialize};

/// Knobs for [`Dispatcher`](crate::Dispatcher).
///
/// Missing fields fall back to [`Default`] when deserializing, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// At most this many packet bytes are hex-dumped into the warning
    /// logged for a response that fails to decode. 0 disables the dump.
    pub hex_dump_limit: usize,

    /// Treat bytes left over after a typed payload as a decode failure.
    pub reject_trailing_bytes: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            hex_dump_limit: 256,
            reject_trailing_bytes: false,
        }
    }
}
