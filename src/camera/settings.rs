// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::fmt;
#[cfg(feature = "mock_camera")]
use std::path::PathBuf;

use anyhow::Context as _;
use linux_embedded_hal::I2cdev;
use serde::de::{Deserialize, Deserializer, Error};

use crate::error::ConfigError;

use super::i2c::Bus;
#[cfg(feature = "mock_camera")]
use super::mock_camera::MockCamera;
use super::thermal_camera::{Mlx90640, ThermalCamera};

/// The refresh rates supported by the sensor, in frames per second.
///
/// The same value drives the sensor's refresh-rate register and the frame
/// loop's period, so the two can't drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameRate {
    One,
    Two,
    Four,
    Eight,
    Sixteen,
    ThirtyTwo,
    SixtyFour,
}

impl FrameRate {
    pub(crate) fn as_fps(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
            Self::Sixteen => 16,
            Self::ThirtyTwo => 32,
            Self::SixtyFour => 64,
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::Sixteen
    }
}

impl TryFrom<u8> for FrameRate {
    type Error = ConfigError;

    fn try_from(fps: u8) -> Result<Self, Self::Error> {
        match fps {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            32 => Ok(Self::ThirtyTwo),
            64 => Ok(Self::SixtyFour),
            unsupported => Err(ConfigError::UnsupportedFrameRate(unsupported)),
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_fps())
    }
}

impl<'de> Deserialize<'de> for FrameRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fps = u8::deserialize(deserializer)?;
        Self::try_from(fps).map_err(D::Error::custom)
    }
}

#[derive(Clone, Debug, serde::Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub(crate) enum CameraSettings {
    Mlx90640 {
        bus: Bus,
        address: u8,

        #[serde(default)]
        frame_rate: FrameRate,
    },
    #[cfg(feature = "mock_camera")]
    #[serde(rename = "mock")]
    MockCamera {
        path: PathBuf,

        #[serde(default)]
        frame_rate: FrameRate,
    },
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::Mlx90640 {
            bus: Bus::Number(1),
            address: 0x33,
            frame_rate: FrameRate::default(),
        }
    }
}

impl CameraSettings {
    pub(crate) fn frame_rate(&self) -> FrameRate {
        match self {
            Self::Mlx90640 { frame_rate, .. } => *frame_rate,
            #[cfg(feature = "mock_camera")]
            Self::MockCamera { frame_rate, .. } => *frame_rate,
        }
    }

    /// Replace the configured frame rate, e.g. with one given on the command
    /// line.
    pub(crate) fn set_frame_rate(&mut self, new_rate: FrameRate) {
        match self {
            Self::Mlx90640 { frame_rate, .. } => *frame_rate = new_rate,
            #[cfg(feature = "mock_camera")]
            Self::MockCamera { frame_rate, .. } => *frame_rate = new_rate,
        }
    }

    pub(crate) fn create_camera(&self) -> anyhow::Result<Box<dyn ThermalCamera + Send>> {
        Ok(match self {
            Self::Mlx90640 { bus, address, .. } => {
                let bus = I2cdev::try_from(bus).context("Unable to connect to I2C bus")?;
                let driver = mlx9064x::Mlx90640Driver::new(bus, *address)?;
                Box::new(Mlx90640::new(driver))
            }
            #[cfg(feature = "mock_camera")]
            Self::MockCamera { path, .. } => Box::new(MockCamera::from_dataset(path)?),
        })
    }
}
