// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::error::Error as StdError;

use anyhow::Context as _;
use embedded_hal::blocking::i2c;
use image::flat::{FlatSamples, SampleLayout};

use crate::image_buffer::ThermalImage;

use super::settings::FrameRate;

/// The operations the frame loop needs from a thermal camera.
///
/// Production wiring uses the MLX90640 driver; tests substitute deterministic
/// implementations so the loop can run without hardware.
pub(crate) trait ThermalCamera {
    /// The size of the camera's grid as `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Produce the next calibrated temperature grid.
    ///
    /// The grid is in the sensor's native row order. This call may block for
    /// as long as the device takes; it has no timeout of its own, and the
    /// caller paces itself so a frame is normally ready when it's asked for.
    fn thermal_image(&mut self) -> anyhow::Result<ThermalImage>;

    fn set_frame_rate(&mut self, frame_rate: FrameRate) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub(crate) struct Mlx90640<I2C> {
    camera: mlx9064x::Mlx90640Driver<I2C>,
    temperature_buffer: Vec<f32>,
}

impl<I2C> Mlx90640<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: 'static + StdError + Sync + Send,
    <I2C as i2c::Write>::Error: 'static + StdError + Sync + Send,
{
    pub(crate) fn new(camera: mlx9064x::Mlx90640Driver<I2C>) -> Self {
        let num_pixels = camera.height() * camera.width();
        Self {
            camera,
            temperature_buffer: vec![0f32; num_pixels],
        }
    }
}

impl<I2C> ThermalCamera for Mlx90640<I2C>
where
    I2C: 'static + i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: 'static + StdError + Sync + Send,
    <I2C as i2c::Write>::Error: 'static + StdError + Sync + Send,
{
    fn dimensions(&self) -> (u32, u32) {
        (self.camera.width() as u32, self.camera.height() as u32)
    }

    fn thermal_image(&mut self) -> anyhow::Result<ThermalImage> {
        self.camera
            .generate_image_if_ready(&mut self.temperature_buffer)?;
        // mlx9064x fills the buffer in row-major order already.
        let layout = SampleLayout::row_major_packed(
            1,
            self.camera.width() as u32,
            self.camera.height() as u32,
        );
        let buffer_image = FlatSamples {
            samples: self.temperature_buffer.clone(),
            layout,
            color_hint: None,
        };
        buffer_image
            .try_into_buffer()
            // try_into_buffer uses a 2-tuple as the error type, with the
            // actual Error being the first item in the tuple.
            .map_err(|e| e.0)
            .context("Unable to convert MLX90640 scratch buffer into an ImageBuffer")
    }

    fn set_frame_rate(&mut self, frame_rate: FrameRate) -> anyhow::Result<()> {
        let mlx_frame_rate =
            mlx9064x::FrameRate::try_from(frame_rate.as_fps()).context("Invalid frame rate")?;
        self.camera
            .set_frame_rate(mlx_frame_rate)
            .context("Error setting camera frame rate")
    }
}
