//! Pin expiry countdown
//!
//! [`remaining`] is recomputed from the wall clock on every tick. The
//! [`Countdown`] latch makes "expired" terminal for a given expiry, so a
//! clock that steps backwards cannot revive a pin.

use std::fmt;

use chrono::{DateTime, Utc};

/// Time left before a pin expires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Left { hours: i64, minutes: u8, seconds: u8 },
    Expired,
}

impl Remaining {
    pub fn is_expired(&self) -> bool {
        matches!(self, Remaining::Expired)
    }
}

/// Break the gap between `now` and `expires_at` into h/m/s.
pub fn remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Remaining {
    let millis = (expires_at - now).num_milliseconds();
    if millis <= 0 {
        return Remaining::Expired;
    }

    let secs = millis / 1000;
    Remaining::Left {
        hours: secs / 3600,
        minutes: ((secs / 60) % 60) as u8,
        seconds: (secs % 60) as u8,
    }
}

impl fmt::Display for Remaining {
    /// `02h 05m 09s`; zero hours and minutes are dropped, seconds never are.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Remaining::Expired => write!(f, "Expired"),
            Remaining::Left {
                hours,
                minutes,
                seconds,
            } => {
                let mut parts = Vec::with_capacity(3);
                if hours > 0 {
                    parts.push(format!("{:02}h", hours));
                }
                if minutes > 0 {
                    parts.push(format!("{:02}m", minutes));
                }
                parts.push(format!("{:02}s", seconds));
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}

/// Per-pin countdown that stays expired once it has seen expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    expires_at: DateTime<Utc>,
    expired: bool,
}

impl Countdown {
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at,
            expired: false,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Re-evaluate against the current wall clock.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Remaining {
        if self.expired {
            return Remaining::Expired;
        }
        let left = remaining(self.expires_at, now);
        self.expired = left.is_expired();
        left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_past_and_present_are_expired() {
        let now = base();
        assert_eq!(remaining(now, now), Remaining::Expired);
        assert_eq!(remaining(now - Duration::seconds(1), now), Remaining::Expired);
        assert_eq!(remaining(now - Duration::days(3), now), Remaining::Expired);
    }

    #[test]
    fn test_components_stay_in_range() {
        let now = base();
        for secs in [1_i64, 59, 60, 61, 3599, 3600, 3661, 6 * 3600, 86_399, 90_061] {
            match remaining(now + Duration::seconds(secs), now) {
                Remaining::Left {
                    hours,
                    minutes,
                    seconds,
                } => {
                    assert!(minutes < 60);
                    assert!(seconds < 60);
                    assert_eq!(hours * 3600 + minutes as i64 * 60 + seconds as i64, secs);
                }
                Remaining::Expired => panic!("{secs}s ahead should not be expired"),
            }
        }
    }

    #[test]
    fn test_sub_second_remainder_is_still_running() {
        let now = base();
        let left = remaining(now + Duration::milliseconds(400), now);
        assert_eq!(
            left,
            Remaining::Left {
                hours: 0,
                minutes: 0,
                seconds: 0
            }
        );
        assert_eq!(left.to_string(), "00s");
    }

    #[test]
    fn test_display() {
        let now = base();
        assert_eq!(remaining(now + Duration::seconds(90), now).to_string(), "01m 30s");
        assert_eq!(remaining(now + Duration::seconds(5), now).to_string(), "05s");
        assert_eq!(
            remaining(now + Duration::seconds(2 * 3600 + 5 * 60 + 9), now).to_string(),
            "02h 05m 09s"
        );
        assert_eq!(remaining(now + Duration::seconds(3605), now).to_string(), "01h 05s");
        assert_eq!(Remaining::Expired.to_string(), "Expired");
    }

    #[test]
    fn test_ninety_second_pin_runs_out() {
        let start = base();
        let mut countdown = Countdown::new(start + Duration::seconds(90));

        assert_eq!(countdown.tick(start).to_string(), "01m 30s");
        assert_eq!(countdown.tick(start + Duration::seconds(30)).to_string(), "01m 00s");
        assert_eq!(countdown.tick(start + Duration::seconds(89)).to_string(), "01s");
        assert_eq!(countdown.tick(start + Duration::seconds(90)), Remaining::Expired);
    }

    #[test]
    fn test_expired_is_terminal_when_clock_goes_back() {
        let start = base();
        let mut countdown = Countdown::new(start + Duration::seconds(10));

        assert!(countdown.tick(start + Duration::seconds(11)).is_expired());
        // Clock stepped back by a minute
        assert!(countdown.tick(start - Duration::seconds(60)).is_expired());
        assert!(countdown.tick(start).is_expired());
    }

    #[test]
    fn test_backwards_clock_before_expiry_recomputes() {
        let start = base();
        let mut countdown = Countdown::new(start + Duration::seconds(100));

        assert_eq!(countdown.tick(start + Duration::seconds(50)).to_string(), "50s");
        assert_eq!(countdown.tick(start + Duration::seconds(40)).to_string(), "01m 00s");
    }
}
