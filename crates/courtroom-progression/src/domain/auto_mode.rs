//! Auto-mode countdown.

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Keep counting; `remaining` ticks are left.
    Continue {
        /// Ticks left before expiry.
        remaining: u32,
    },
    /// Auto-mode was switched off before expiry.
    Aborted,
    /// The countdown ran out; the step should advance.
    Expired,
}

/// Counts down the ticks an unattended step waits before auto-advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoModeCountdown {
    remaining: u32,
}

impl Default for AutoModeCountdown {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TICKS)
    }
}

impl AutoModeCountdown {
    /// Default countdown length.
    pub const DEFAULT_TICKS: u32 = 5;

    /// Creates a countdown of `ticks` ticks.
    #[must_use]
    pub const fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// Ticks left before expiry.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advances the countdown by one tick.
    ///
    /// `still_active` is the auto-mode flag observed at the tick; a cleared
    /// flag aborts the countdown without expiring it.
    pub fn tick(&mut self, still_active: bool) -> Tick {
        if !still_active {
            return Tick::Aborted;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Tick::Expired
        } else {
            Tick::Continue {
                remaining: self.remaining,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_expires_after_configured_ticks() {
        let mut countdown = AutoModeCountdown::new(3);

        assert_eq!(countdown.tick(true), Tick::Continue { remaining: 2 });
        assert_eq!(countdown.tick(true), Tick::Continue { remaining: 1 });
        assert_eq!(countdown.tick(true), Tick::Expired);
    }

    #[test]
    fn test_countdown_aborts_when_flag_cleared() {
        let mut countdown = AutoModeCountdown::default();
        countdown.tick(true);

        assert_eq!(countdown.tick(false), Tick::Aborted);
        assert_eq!(countdown.remaining(), 4);
    }

    #[test]
    fn test_zero_tick_countdown_expires_immediately() {
        assert_eq!(AutoModeCountdown::new(0).tick(true), Tick::Expired);
    }
}
