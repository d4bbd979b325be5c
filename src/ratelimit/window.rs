//! Structured rate-limit windows.
//!
//! Call sites configure windows as strings (`"10 s"`, `"1 h"`, `"1 d"`).
//! Those strings are parsed exactly once, at configuration time, into a
//! [`Window`]; request-time code only ever sees the structured value. An
//! unknown unit is a configuration mistake and fails startup, never a
//! request.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Time unit for a rate-limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl WindowUnit {
    /// Seconds in one unit.
    fn secs(self) -> u64 {
        match self {
            WindowUnit::Seconds => 1,
            WindowUnit::Minutes => 60,
            WindowUnit::Hours => 3600,
            WindowUnit::Days => 86400,
        }
    }

    /// The single-letter symbol used in configuration strings.
    fn symbol(self) -> &'static str {
        match self {
            WindowUnit::Seconds => "s",
            WindowUnit::Minutes => "m",
            WindowUnit::Hours => "h",
            WindowUnit::Days => "d",
        }
    }
}

/// A rate-limit window: an amount of a time unit, e.g. `1 d` or `10 s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub amount: u32,
    pub unit: WindowUnit,
}

impl Window {
    pub const fn new(amount: u32, unit: WindowUnit) -> Self {
        Self { amount, unit }
    }

    /// Total length of the window.
    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.amount) * self.unit.secs())
    }

    /// Window length in milliseconds, as used for Redis scores.
    pub fn as_millis(self) -> i64 {
        self.duration().as_millis() as i64
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit.symbol())
    }
}

/// Error parsing a window configuration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWindowError {
    #[error("invalid window '{0}': expected '<amount> <unit>' (e.g. '10 s', '1 d')")]
    Malformed(String),

    #[error("invalid window amount '{0}': must be a positive integer")]
    InvalidAmount(String),

    #[error("invalid duration unit '{0}': use s, m, h, or d")]
    InvalidUnit(String),
}

impl FromStr for Window {
    type Err = ParseWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let (amount, unit) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(amount), Some(unit), None) => (amount, unit),
            _ => return Err(ParseWindowError::Malformed(s.to_string())),
        };

        let amount: u32 = amount
            .parse()
            .ok()
            .filter(|a| *a > 0)
            .ok_or_else(|| ParseWindowError::InvalidAmount(amount.to_string()))?;

        let unit = match unit {
            "s" => WindowUnit::Seconds,
            "m" => WindowUnit::Minutes,
            "h" => WindowUnit::Hours,
            "d" => WindowUnit::Days,
            other => return Err(ParseWindowError::InvalidUnit(other.to_string())),
        };

        Ok(Window::new(amount, unit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_units() {
        assert_eq!("10 s".parse::<Window>().unwrap(), Window::new(10, WindowUnit::Seconds));
        assert_eq!("5 m".parse::<Window>().unwrap(), Window::new(5, WindowUnit::Minutes));
        assert_eq!("1 h".parse::<Window>().unwrap(), Window::new(1, WindowUnit::Hours));
        assert_eq!("1 d".parse::<Window>().unwrap(), Window::new(1, WindowUnit::Days));
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        let err = "1 w".parse::<Window>().unwrap_err();
        assert_eq!(err, ParseWindowError::InvalidUnit("w".to_string()));
        assert!(err.to_string().contains("use s, m, h, or d"));
    }

    #[test]
    fn test_parse_rejects_malformed_strings() {
        assert!(matches!("1d".parse::<Window>(), Err(ParseWindowError::Malformed(_))));
        assert!(matches!("".parse::<Window>(), Err(ParseWindowError::Malformed(_))));
        assert!(matches!("1 d extra".parse::<Window>(), Err(ParseWindowError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_bad_amounts() {
        assert!(matches!("x s".parse::<Window>(), Err(ParseWindowError::InvalidAmount(_))));
        assert!(matches!("0 s".parse::<Window>(), Err(ParseWindowError::InvalidAmount(_))));
        assert!(matches!("-1 s".parse::<Window>(), Err(ParseWindowError::InvalidAmount(_))));
    }

    #[test]
    fn test_durations() {
        assert_eq!(Window::new(10, WindowUnit::Seconds).duration(), Duration::from_secs(10));
        assert_eq!(Window::new(2, WindowUnit::Minutes).duration(), Duration::from_secs(120));
        assert_eq!(Window::new(1, WindowUnit::Hours).duration(), Duration::from_secs(3600));
        assert_eq!(Window::new(1, WindowUnit::Days).duration(), Duration::from_secs(86400));
    }

    #[test]
    fn test_display_round_trips() {
        let window = Window::new(30, WindowUnit::Minutes);
        assert_eq!(window.to_string(), "30 m");
        assert_eq!(window.to_string().parse::<Window>().unwrap(), window);
    }
}
