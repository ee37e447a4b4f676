// SPDX-License-Identifier: GPL-3.0-or-later
use linux_embedded_hal::I2cdev;

use i2cdev::linux::LinuxI2CError;
use serde::Deserialize;

use std::convert::TryFrom;
use std::path::PathBuf;

/// An I2C bus, given either as a bus number or a full device path.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum Bus {
    Number(u32),
    Path(String),
}

impl From<u32> for Bus {
    fn from(bus: u32) -> Self {
        Self::Number(bus)
    }
}

impl TryFrom<&Bus> for I2cdev {
    type Error = LinuxI2CError;

    fn try_from(bus: &Bus) -> Result<Self, Self::Error> {
        let device_path = match bus {
            Bus::Number(n) => PathBuf::from(format!("/dev/i2c-{}", n)),
            Bus::Path(p) => PathBuf::from(p),
        };
        I2cdev::new(device_path)
    }
}
