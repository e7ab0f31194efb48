//! Per-side countdown clock.
//!
//! The clock is driven from outside: the caller reports elapsed wall time
//! for the side to move and learns whether that side's flag fell. Nothing
//! here reads the system time, which keeps the engine synchronous.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::types::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    initial: Duration,
    remaining: [Duration; 2],
}

impl Clock {
    /// Both sides start with `initial`.
    pub fn new(initial: Duration) -> Self {
        Clock {
            initial,
            remaining: [initial; 2],
        }
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn remaining(&self, color: Color) -> Duration {
        self.remaining[slot(color)]
    }

    /// Drain `elapsed` from `color`'s time, stopping at zero. Returns `true`
    /// when that side has run out.
    pub fn tick(&mut self, color: Color, elapsed: Duration) -> bool {
        let left = &mut self.remaining[slot(color)];
        *left = left.saturating_sub(elapsed);
        left.is_zero()
    }

    pub fn is_flagged(&self, color: Color) -> bool {
        self.remaining(color).is_zero()
    }

    /// `MM:SS`, rounding partial seconds up so a running clock never shows
    /// 00:00 before it has actually expired.
    pub fn format(duration: Duration) -> String {
        let mut secs = duration.as_secs();
        if duration.subsec_nanos() > 0 {
            secs += 1;
        }
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Both clocks as `white | black`.
    pub fn display(&self) -> String {
        format!(
            "{} | {}",
            Self::format(self.remaining(Color::White)),
            Self::format(self.remaining(Color::Black))
        )
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new(Duration::from_secs(300))
    }
}

fn slot(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}
