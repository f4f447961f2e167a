use serde::Serialize;

/// The dimension of a request being throttled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Aspect {
    /// Per-caller request rate, regardless of payload.
    Access,
    /// Rate of identical request payloads from one caller.
    Input,
    /// Rate of identical response payloads to one caller.
    Output,
}

/// Throttling parameters for one aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRule {
    /// Sliding window length, in seconds.
    pub window_secs: u64,
    /// Maximum hits allowed inside one window.
    pub limit: i64,
}

/// Counters this far above the limit are pinned permanently.
pub(crate) const BAN_MULTIPLIER: i64 = 20;

impl Aspect {
    /// Throttling rule for this aspect.
    ///
    /// Exhaustive on purpose: adding an aspect without deciding its rule
    /// must not compile.
    pub fn rule(self) -> AspectRule {
        match self {
            Aspect::Access => AspectRule {
                window_secs: 10,
                limit: 10,
            },
            Aspect::Input => AspectRule {
                window_secs: 10,
                limit: 10,
            },
            Aspect::Output => AspectRule {
                window_secs: 10,
                limit: 10,
            },
        }
    }

    /// Stable numeric tag used in counter keys. The numbering predates this
    /// service and must not change, or deployed counters would reset.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Aspect::Access => 1,
            Aspect::Input => 2,
            Aspect::Output => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Aspect::Access => "access",
            Aspect::Input => "input",
            Aspect::Output => "output",
        }
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
