// SPDX-License-Identifier: GPL-3.0-or-later
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep as thread_sleep;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use tracing::{info, trace};

use crate::camera::{FrameRate, ThermalCamera};
use crate::render::{ColorMap, FrameRenderer};
use crate::settings::Settings;
use crate::sink::{DatasetSink, FrameEmitter};

/// How long past the nominal frame period the sensor tends to need before a
/// frame is actually ready.
const FRAME_READY_LAG: Duration = Duration::from_micros(850);

/// The wall-clock budget for one loop iteration at the given frame rate.
pub(crate) fn frame_period(frame_rate: FrameRate) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(frame_rate.as_fps())) + FRAME_READY_LAG
}

/// The portion of the frame budget left over after processing, if any.
fn residual_sleep(target_period: Duration, elapsed: Duration) -> Option<Duration> {
    let residual = target_period.saturating_sub(elapsed);
    if residual.is_zero() {
        None
    } else {
        Some(residual)
    }
}

/// Drives the acquire, render, emit cycle at a fixed cadence.
///
/// The loop runs on its own thread to keep the timing as close to the camera
/// frame rate as possible. It has no terminal state of its own; it runs until
/// the continuation flag is cleared or an iteration fails.
pub(crate) struct FrameLoop<P, S> {
    camera: Box<dyn ThermalCamera + Send>,
    renderer: FrameRenderer,
    emitter: FrameEmitter<P, S>,
    target_period: Duration,
    running: Arc<AtomicBool>,
}

impl FrameLoop<io::Stdout, io::Stderr> {
    pub(crate) fn new(settings: &Settings, running: Arc<AtomicBool>) -> anyhow::Result<Self> {
        let frame_rate = settings.camera.frame_rate();
        let mut camera = settings
            .camera
            .create_camera()
            .context("Error configuring camera")?;
        camera
            .set_frame_rate(frame_rate)
            .context("Error setting camera frame rate")?;
        let (width, height) = camera.dimensions();
        let renderer = FrameRenderer::new(width, height, ColorMap::from(&settings.render));
        let dataset = settings.stream.dataset_path.clone().map(DatasetSink::new);
        Ok(Self::from_parts(
            camera,
            renderer,
            FrameEmitter::stdio(dataset),
            frame_period(frame_rate),
            running,
        ))
    }
}

impl<P, S> FrameLoop<P, S>
where
    P: io::Write,
    S: io::Write,
{
    pub(crate) fn from_parts(
        camera: Box<dyn ThermalCamera + Send>,
        renderer: FrameRenderer,
        emitter: FrameEmitter<P, S>,
        target_period: Duration,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            camera,
            renderer,
            emitter,
            target_period,
            running,
        }
    }

    /// Acquire, render, and emit frames until the continuation flag clears.
    ///
    /// Each iteration measures its own processing cost and sleeps away the
    /// rest of the frame budget. An iteration that overruns its budget rolls
    /// straight into the next one.
    pub(crate) fn run(mut self) -> anyhow::Result<()> {
        let mut frame_count = 0u64;
        while self.running.load(Ordering::Relaxed) {
            let start = Instant::now();
            let grid = self
                .camera
                .thermal_image()
                .context("Error acquiring frame from camera")?;
            let frame = self.renderer.render(&grid);
            self.emitter.emit(&frame)?;
            frame_count += 1;
            let elapsed = start.elapsed();
            trace!(
                frame = frame_count,
                elapsed_us = elapsed.as_micros() as u64,
                "Emitted frame"
            );
            if let Some(residual) = residual_sleep(self.target_period, elapsed) {
                thread_sleep(residual);
            }
        }
        info!(frames = frame_count, "Frame loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use image::Luma;

    use crate::camera::{FrameRate, ThermalCamera};
    use crate::image_buffer::ThermalImage;
    use crate::render::{ColorMap, FrameRenderer};
    use crate::sink::{DatasetSink, FrameEmitter};

    use super::{frame_period, residual_sleep, FrameLoop};

    const WIDTH: u32 = 32;
    const HEIGHT: u32 = 24;
    const IMAGE_BYTES: usize = (WIDTH * HEIGHT * 3) as usize;
    const RAW_BYTES: usize = (WIDTH * HEIGHT) as usize * std::mem::size_of::<f32>();

    /// Produces constant-temperature grids, clearing the continuation flag
    /// once its last frame has been handed out.
    struct SyntheticCamera {
        value: f32,
        remaining: usize,
        running: Arc<AtomicBool>,
    }

    impl SyntheticCamera {
        fn new(value: f32, frames: usize, running: &Arc<AtomicBool>) -> Self {
            Self {
                value,
                remaining: frames,
                running: Arc::clone(running),
            }
        }
    }

    impl ThermalCamera for SyntheticCamera {
        fn dimensions(&self) -> (u32, u32) {
            (WIDTH, HEIGHT)
        }

        fn thermal_image(&mut self) -> anyhow::Result<ThermalImage> {
            anyhow::ensure!(self.remaining > 0, "Camera asked for too many frames");
            self.remaining -= 1;
            if self.remaining == 0 {
                self.running.store(false, Ordering::Relaxed);
            }
            Ok(ThermalImage::from_pixel(WIDTH, HEIGHT, Luma([self.value])))
        }

        fn set_frame_rate(&mut self, _frame_rate: FrameRate) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct FailingCamera;

    impl ThermalCamera for FailingCamera {
        fn dimensions(&self) -> (u32, u32) {
            (WIDTH, HEIGHT)
        }

        fn thermal_image(&mut self) -> anyhow::Result<ThermalImage> {
            Err(anyhow::anyhow!("no acknowledgement on the bus"))
        }

        fn set_frame_rate(&mut self, _frame_rate: FrameRate) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl io::Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_loop(value: f32, frames: usize, dataset: Option<DatasetSink>) -> (SharedSink, SharedSink) {
        let running = Arc::new(AtomicBool::new(true));
        let camera = SyntheticCamera::new(value, frames, &running);
        let renderer = FrameRenderer::new(WIDTH, HEIGHT, ColorMap::new(5.0, 50.0));
        let primary = SharedSink::default();
        let secondary = SharedSink::default();
        let emitter = FrameEmitter::new(primary.clone(), secondary.clone(), dataset);
        let frame_loop = FrameLoop::from_parts(
            Box::new(camera),
            renderer,
            emitter,
            frame_period(FrameRate::SixtyFour),
            running,
        );
        frame_loop.run().unwrap();
        (primary, secondary)
    }

    #[test]
    fn floor_of_range_renders_black() {
        let (primary, _) = run_loop(5.0, 1, None);
        let image = primary.contents();
        assert_eq!(image.len(), IMAGE_BYTES);
        assert!(image.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn ceiling_of_range_renders_white() {
        let (primary, _) = run_loop(50.0, 1, None);
        let image = primary.contents();
        assert_eq!(image.len(), IMAGE_BYTES);
        assert!(image.iter().all(|byte| *byte == 255));
    }

    /// Both streams see the same number of whole frames.
    #[test]
    fn streams_stay_frame_aligned() {
        let (primary, secondary) = run_loop(20.0, 3, None);
        assert_eq!(primary.contents().len(), 3 * IMAGE_BYTES);
        assert_eq!(secondary.contents().len(), 3 * RAW_BYTES);
    }

    #[test]
    fn dataset_grows_across_iterations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.bin");
        run_loop(20.0, 2, Some(DatasetSink::new(path.clone())));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * RAW_BYTES as u64);
    }

    #[test]
    fn camera_failure_stops_the_loop() {
        let running = Arc::new(AtomicBool::new(true));
        let renderer = FrameRenderer::new(WIDTH, HEIGHT, ColorMap::new(5.0, 50.0));
        let primary = SharedSink::default();
        let emitter = FrameEmitter::new(primary.clone(), SharedSink::default(), None);
        let frame_loop = FrameLoop::from_parts(
            Box::new(FailingCamera),
            renderer,
            emitter,
            frame_period(FrameRate::SixtyFour),
            running,
        );
        let error = frame_loop.run().unwrap_err();
        assert!(error.to_string().contains("acquiring"));
        assert!(primary.contents().is_empty());
    }

    #[test]
    fn residual_is_the_exact_remaining_budget() {
        let target = Duration::from_micros(63_350);
        let elapsed = Duration::from_micros(13_350);
        assert_eq!(
            residual_sleep(target, elapsed),
            Some(Duration::from_micros(50_000))
        );
    }

    #[test]
    fn overrunning_frames_skip_the_sleep() {
        let target = Duration::from_micros(63_350);
        assert_eq!(residual_sleep(target, target), None);
        assert_eq!(
            residual_sleep(target, target + Duration::from_micros(1)),
            None
        );
    }

    #[test]
    fn period_includes_the_readiness_lag() {
        assert_eq!(
            frame_period(FrameRate::Sixteen),
            Duration::from_micros(63_350)
        );
        assert_eq!(
            frame_period(FrameRate::One),
            Duration::from_micros(1_000_850)
        );
    }
}
