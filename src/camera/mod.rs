// SPDX-License-Identifier: GPL-3.0-or-later
mod i2c;
#[cfg(feature = "mock_camera")]
mod mock_camera;
mod settings;
mod thermal_camera;

pub(crate) use settings::{CameraSettings, FrameRate};
pub(crate) use thermal_camera::ThermalCamera;
