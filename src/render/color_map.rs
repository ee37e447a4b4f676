// SPDX-License-Identifier: GPL-3.0-or-later
use super::settings::RenderSettings;

/// The stops of the false-color gradient, each channel in [0, 1].
///
/// Black through blue, green, yellow, red, and magenta to white.
pub(crate) const PALETTE: [[f32; 3]; 7] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Maps a temperature onto the gradient over a fixed range.
///
/// Values at or beyond either end of the range saturate to the first or last
/// palette stop; there is no extrapolation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ColorMap {
    scale_min: f32,
    scale_max: f32,
}

impl ColorMap {
    /// `scale_max` must be greater than `scale_min`; the settings loader
    /// rejects ranges that aren't before a `ColorMap` is ever built.
    pub(crate) fn new(scale_min: f32, scale_max: f32) -> Self {
        Self {
            scale_min,
            scale_max,
        }
    }

    pub(crate) fn false_color(&self, value: f32) -> [u8; 3] {
        let scaled = (value - self.scale_min) / (self.scale_max - self.scale_min);
        let (lower, upper, blend) = if scaled <= 0.0 {
            (0, 0, 0.0)
        } else if scaled >= 1.0 {
            (PALETTE.len() - 1, PALETTE.len() - 1, 0.0)
        } else {
            let stop = scaled * (PALETTE.len() - 1) as f32;
            let index = stop.floor() as usize;
            (index, index + 1, stop - index as f32)
        };
        let mut channels = [0u8; 3];
        for (channel, out) in channels.iter_mut().enumerate() {
            let from = PALETTE[lower][channel];
            let to = PALETTE[upper][channel];
            // Truncating cast; the blend stays within [0, 255].
            *out = (((to - from) * blend + from) * 255.0) as u8;
        }
        channels
    }
}

impl From<&RenderSettings> for ColorMap {
    fn from(settings: &RenderSettings) -> Self {
        Self::new(settings.scale_min, settings.scale_max)
    }
}
