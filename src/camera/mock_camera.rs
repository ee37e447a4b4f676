// SPDX-License-Identifier: GPL-3.0-or-later
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use tracing::{info, warn};

use crate::image_buffer::ThermalImage;

use super::settings::FrameRate;
use super::thermal_camera::ThermalCamera;

const SENSOR_WIDTH: u32 = 32;
const SENSOR_HEIGHT: u32 = 24;
const FRAME_VALUES: usize = (SENSOR_WIDTH * SENSOR_HEIGHT) as usize;
const FRAME_BYTES: usize = FRAME_VALUES * std::mem::size_of::<f32>();

/// Replays frames from a recorded raw dataset in place of real hardware.
///
/// Dataset frames are stored in scanline order, so replaying reverses the
/// rows to recover the sensor's order and the frames go through the same
/// transform as live captures. Playback loops once the end of the file is
/// reached.
pub(crate) struct MockCamera {
    frames: Vec<Vec<f32>>,
    index: usize,
}

impl MockCamera {
    pub(crate) fn from_dataset(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("Unable to read dataset {}", path.display()))?;
        let trailing = data.len() % FRAME_BYTES;
        if trailing != 0 {
            warn!(
                trailing_bytes = trailing,
                "Dataset ends with a partial frame, ignoring it"
            );
        }
        let frames: Vec<Vec<f32>> = data
            .chunks_exact(FRAME_BYTES)
            .map(|frame| {
                let values: Vec<f32> = frame
                    .chunks_exact(std::mem::size_of::<f32>())
                    .map(|bytes| f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
                    .collect();
                values
                    .chunks_exact(SENSOR_WIDTH as usize)
                    .rev()
                    .flatten()
                    .copied()
                    .collect()
            })
            .collect();
        if frames.is_empty() {
            anyhow::bail!("Dataset {} does not contain a full frame", path.display());
        }
        info!(
            frames = frames.len(),
            path = %path.display(),
            "Loaded dataset for playback"
        );
        Ok(Self { frames, index: 0 })
    }
}

impl ThermalCamera for MockCamera {
    fn dimensions(&self) -> (u32, u32) {
        (SENSOR_WIDTH, SENSOR_HEIGHT)
    }

    fn thermal_image(&mut self) -> anyhow::Result<ThermalImage> {
        let values = self.frames[self.index].clone();
        self.index = (self.index + 1) % self.frames.len();
        ThermalImage::from_vec(SENSOR_WIDTH, SENSOR_HEIGHT, values)
            .context("Dataset frame does not fill a full grid")
    }

    fn set_frame_rate(&mut self, _frame_rate: FrameRate) -> anyhow::Result<()> {
        // Playback pacing comes entirely from the frame loop.
        Ok(())
    }
}
