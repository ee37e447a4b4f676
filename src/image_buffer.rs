// SPDX-License-Identifier: GPL-3.0-or-later
use image::{ImageBuffer, Luma};

/// Images where each point is a temperature in degrees Celsius.
pub(crate) type ThermalImage = ImageBuffer<Luma<f32>, Vec<f32>>;
