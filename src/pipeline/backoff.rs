//! Next action after a batch fetch, by fetch status.
//!
//! | Status           | Action                                          |
//! |------------------|-------------------------------------------------|
//! | `Ok`             | sleep `refresh - elapsed`, rounded up, floor 0  |
//! | `AccessDenied`   | count down `ban_wait` minutes, one per minute   |
//! | `ConnectionFail` | sleep `connection_timeout`                      |
//! | `OtherError`     | sleep one second                                |

use std::time::Duration;

use crate::models::{FetchStatus, PollConfig};

/// Wait after an unknown error.
pub const OTHER_ERROR_WAIT: Duration = Duration::from_secs(1);

/// One countdown step while banned.
pub const BAN_STEP: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Wait until the next refresh is due.
    Refresh(Duration),
    /// Wait this many minutes, notifying once per minute.
    Banned { minutes: u64 },
    /// The feed was unreachable.
    ConnectionDown(Duration),
    /// Unclassified error.
    Retry(Duration),
}

impl Backoff {
    /// Pick the action for a batch status. `elapsed` is the processing time
    /// of the batch and only matters on success.
    pub fn for_status(status: FetchStatus, elapsed: Duration, config: &PollConfig) -> Self {
        match status {
            FetchStatus::Ok => Self::Refresh(refresh_wait(config.refresh_interval(), elapsed)),
            FetchStatus::AccessDenied => Self::Banned {
                minutes: config.ban_wait_minutes,
            },
            FetchStatus::ConnectionFail => Self::ConnectionDown(config.connection_wait()),
            FetchStatus::OtherError => Self::Retry(OTHER_ERROR_WAIT),
        }
    }

    /// Total time this action suspends the loop.
    pub fn total(&self) -> Duration {
        match *self {
            Self::Refresh(d) | Self::ConnectionDown(d) | Self::Retry(d) => d,
            Self::Banned { minutes } => BAN_STEP * minutes as u32,
        }
    }
}

/// Remaining refresh interval in whole seconds, rounded up, never negative.
pub fn refresh_wait(refresh: Duration, elapsed: Duration) -> Duration {
    let remaining = refresh.saturating_sub(elapsed);
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    Duration::from_secs(secs)
}
