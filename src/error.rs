// SPDX-License-Identifier: GPL-3.0-or-later
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Configuration problems that stop the process before the frame loop starts.
#[derive(Debug)]
pub(crate) enum ConfigError {
    /// A frame rate outside the set supported by the sensor.
    UnsupportedFrameRate(u8),
    /// A color range whose maximum does not exceed its minimum.
    InvalidColorRange { scale_min: f32, scale_max: f32 },
    /// The configuration file exists but could not be read.
    ReadConfig(PathBuf, io::Error),
    /// The configuration file could not be parsed.
    ParseConfig(PathBuf, toml::de::Error),
}

impl ConfigError {
    /// Startup configuration failures use a different exit code than runtime
    /// failures so a supervisor can tell the two apart.
    pub(crate) fn exit_code(&self) -> i32 {
        2
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnsupportedFrameRate(fps) => write!(
                f,
                "Unsupported frame rate: {} (supported rates are 1, 2, 4, 8, 16, 32, and 64)",
                fps
            ),
            Self::InvalidColorRange {
                scale_min,
                scale_max,
            } => write!(
                f,
                "Invalid color range: scale_max ({}) must be greater than scale_min ({})",
                scale_max, scale_min
            ),
            Self::ReadConfig(path, err) => write!(
                f,
                "Unable to read configuration file {}: {}",
                path.display(),
                err
            ),
            Self::ParseConfig(path, err) => write!(
                f,
                "Unable to parse configuration file {}: {}",
                path.display(),
                err
            ),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::ReadConfig(_, err) => Some(err),
            Self::ParseConfig(_, err) => Some(err),
            _ => None,
        }
    }
}
