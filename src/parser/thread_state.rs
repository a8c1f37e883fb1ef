//! Thread lifecycle states as printed in thread dumps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a sampled thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadState {
    New,
    Runnable,
    Blocked,
    Waiting,
    TimedWaiting,
    Terminated,
}

impl ThreadState {
    /// Every state, in the order reports list them
    pub const ALL: [ThreadState; 6] = [
        Self::New,
        Self::Runnable,
        Self::Blocked,
        Self::Waiting,
        Self::TimedWaiting,
        Self::Terminated,
    ];

    /// The token the dumper prints for this state
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Runnable => "RUNNABLE",
            Self::Blocked => "BLOCKED",
            Self::Waiting => "WAITING",
            Self::TimedWaiting => "TIMED_WAITING",
            Self::Terminated => "TERMINATED",
        }
    }

    /// Position of this state in [`ThreadState::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::str::FromStr for ThreadState {
    type Err = String;

    /// Tokens are matched exactly; `waiting` or `Runnable` are not states.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "RUNNABLE" => Ok(Self::Runnable),
            "BLOCKED" => Ok(Self::Blocked),
            "WAITING" => Ok(Self::Waiting),
            "TIMED_WAITING" => Ok(Self::TimedWaiting),
            "TERMINATED" => Ok(Self::Terminated),
            other => Err(format!("unknown thread state: {}", other)),
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_every_state() {
        for state in ThreadState::ALL {
            assert_eq!(state.as_str().parse::<ThreadState>().unwrap(), state);
        }
    }

    #[test]
    fn test_index_matches_report_order() {
        for (i, state) in ThreadState::ALL.iter().enumerate() {
            assert_eq!(state.index(), i);
        }
    }

    #[test]
    fn test_rejects_inexact_tokens() {
        assert!("runnable".parse::<ThreadState>().is_err());
        assert!("WAITING(parking)".parse::<ThreadState>().is_err());
        assert!("".parse::<ThreadState>().is_err());
    }
}
