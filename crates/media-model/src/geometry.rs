//! Resolutions, time windows, and scaling modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output resolution in pixels. Both dimensions are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self, ParseResolutionError> {
        if width == 0 || height == 0 {
            return Err(ParseResolutionError {
                input: format!("{width}x{height}"),
            });
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Error for malformed resolution strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid resolution '{input}': expected WIDTHxHEIGHT with positive dimensions")]
pub struct ParseResolutionError {
    pub input: String,
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseResolutionError {
            input: s.to_string(),
        };
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(err)?;
        let width: u32 = w.trim().parse().map_err(|_| err())?;
        let height: u32 = h.trim().parse().map_err(|_| err())?;
        Resolution::new(width, height).map_err(|_| err())
    }
}

/// A half-open interval [start, start + duration) in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_secs: f64,
    pub duration_secs: f64,
}

impl TimeWindow {
    pub fn new(start_secs: f64, duration_secs: f64) -> Self {
        Self {
            start_secs,
            duration_secs,
        }
    }

    /// Window starting at zero.
    pub fn from_zero(duration_secs: f64) -> Self {
        Self::new(0.0, duration_secs)
    }

    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    /// Both bounds must be non-negative and finite.
    pub fn is_valid(&self) -> bool {
        self.start_secs >= 0.0
            && self.duration_secs >= 0.0
            && self.start_secs.is_finite()
            && self.duration_secs.is_finite()
    }
}

/// How content is fitted to a target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Distort to the exact target dimensions.
    Stretch,

    /// Fit within the target preserving aspect ratio, fill the rest.
    Pad,
}

impl FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stretch" => Ok(ScaleMode::Stretch),
            "pad" => Ok(ScaleMode::Pad),
            other => Err(format!("Unknown scale mode: {other}. Use: stretch, pad")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_parses_and_displays() {
        let res: Resolution = "1080x1920".parse().unwrap();
        assert_eq!(res.width, 1080);
        assert_eq!(res.height, 1920);
        assert_eq!(res.to_string(), "1080x1920");
    }

    #[test]
    fn resolution_rejects_zero_and_garbage() {
        assert!("0x1920".parse::<Resolution>().is_err());
        assert!("1080".parse::<Resolution>().is_err());
        assert!("widexhigh".parse::<Resolution>().is_err());
        assert!(Resolution::new(1080, 0).is_err());
    }

    #[test]
    fn window_end_is_start_plus_duration() {
        let window = TimeWindow::new(10.0, 20.0);
        assert_eq!(window.end_secs(), 30.0);
        assert!(window.is_valid());
        assert!(!TimeWindow::new(-1.0, 5.0).is_valid());
        assert!(!TimeWindow::new(0.0, f64::NAN).is_valid());
    }
}
