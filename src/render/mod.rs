// SPDX-License-Identifier: GPL-3.0-or-later
mod color_map;
mod settings;

pub(crate) use color_map::ColorMap;
pub(crate) use settings::RenderSettings;

use image::Pixel;

use crate::image_buffer::ThermalImage;

/// Bytes per rendered pixel (8-bit R, G, B).
pub(crate) const PIXEL_BYTES: usize = 3;

/// One rendered frame, borrowed from the renderer's buffers.
///
/// `image` and `raw` cover the same pixels in the same order: scanline order,
/// top row first, which is the vertical flip of the sensor's row order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame<'a> {
    /// False-color RGB bytes, `width * height * 3` of them.
    pub(crate) image: &'a [u8],
    /// Native-endian `f32` temperature bytes, `width * height * 4` of them.
    pub(crate) raw: &'a [u8],
}

/// Renders temperature grids into false-color images and raw byte frames.
///
/// The output buffers are sized once at startup and reused for every frame,
/// so a [`Frame`] is only valid until the next call to
/// [`render`][Self::render].
#[derive(Clone, Debug)]
pub(crate) struct FrameRenderer {
    color_map: ColorMap,
    image: Vec<u8>,
    raw: Vec<u8>,
}

impl FrameRenderer {
    pub(crate) fn new(width: u32, height: u32, color_map: ColorMap) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            color_map,
            image: Vec::with_capacity(pixel_count * PIXEL_BYTES),
            raw: Vec::with_capacity(pixel_count * std::mem::size_of::<f32>()),
        }
    }

    /// Map a sensor-ordered temperature grid into scanline-ordered output.
    ///
    /// Output row `y` is sensor row `height - 1 - y`. The same flip is
    /// applied to the rendered image and the raw bytes, keeping the two
    /// streams spatially aligned.
    pub(crate) fn render(&mut self, grid: &ThermalImage) -> Frame<'_> {
        self.image.clear();
        self.raw.clear();
        let (width, height) = grid.dimensions();
        for y in (0..height).rev() {
            for x in 0..width {
                let temperature = grid.get_pixel(x, y).channels()[0];
                self.image
                    .extend_from_slice(&self.color_map.false_color(temperature));
                self.raw.extend_from_slice(&temperature.to_ne_bytes());
            }
        }
        Frame {
            image: &self.image,
            raw: &self.raw,
        }
    }
}
