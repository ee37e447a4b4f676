// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

mod cli;

use crate::camera::{CameraSettings, FrameRate};
use crate::error::ConfigError;
use crate::render::RenderSettings;
pub(crate) use cli::Args;

/// Settings for the optional raw dataset file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct StreamSettings {
    /// Append every raw frame to this file in addition to the secondary
    /// stream.
    pub(crate) dataset_path: Option<PathBuf>,
}

/// Log output destination.
///
/// Both standard streams carry frame bytes, so diagnostics go to a file when
/// one is configured and are discarded otherwise.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct LogSettings {
    pub(crate) path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Settings {
    /// Camera-specific settings.
    pub(crate) camera: CameraSettings,

    /// Settings for mapping temperatures onto the gradient.
    pub(crate) render: RenderSettings,

    /// Output stream settings.
    pub(crate) stream: StreamSettings,

    /// Logging settings.
    pub(crate) log: LogSettings,
}

impl Settings {
    /// Load settings from the configured file and apply CLI overrides.
    ///
    /// A missing file at the default location is not an error; the built-in
    /// defaults match a camera on bus 1 at the usual address. All validation
    /// happens here, before any camera is created.
    pub(crate) fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut settings = if args.config_path.exists() {
            let raw = fs::read_to_string(&args.config_path)
                .map_err(|err| ConfigError::ReadConfig(args.config_path.clone(), err))?;
            toml::from_str(&raw)
                .map_err(|err| ConfigError::ParseConfig(args.config_path.clone(), err))?
        } else {
            Self::default()
        };
        if let Some(fps) = args.frame_rate {
            settings.camera.set_frame_rate(FrameRate::try_from(fps)?);
        }
        if settings.render.scale_max <= settings.render.scale_min {
            return Err(ConfigError::InvalidColorRange {
                scale_min: settings.render.scale_min,
                scale_max: settings.render.scale_max,
            });
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::path::PathBuf;

    use crate::camera::FrameRate;
    use crate::error::ConfigError;

    use super::{Args, Settings};

    fn args(frame_rate: Option<u8>, config_path: PathBuf) -> Args {
        Args {
            frame_rate,
            config_path,
        }
    }

    fn missing_config() -> PathBuf {
        PathBuf::from("/nonexistent/thermocast/config.toml")
    }

    #[test]
    fn defaults_without_a_config_file() {
        let settings = Settings::load(&args(None, missing_config())).unwrap();
        assert_eq!(settings.camera.frame_rate(), FrameRate::Sixteen);
        assert_eq!(settings.render.scale_min, 5.0);
        assert_eq!(settings.render.scale_max, 50.0);
        assert_eq!(settings.stream.dataset_path, None);
        assert_eq!(settings.log.path, None);
    }

    #[test]
    fn cli_overrides_the_frame_rate() {
        let settings = Settings::load(&args(Some(64), missing_config())).unwrap();
        assert_eq!(settings.camera.frame_rate(), FrameRate::SixtyFour);
    }

    #[test]
    fn unsupported_frame_rates_are_rejected() {
        for fps in &[0u8, 3, 17] {
            let parsed = Settings::load(&args(Some(*fps), missing_config()));
            match parsed {
                Err(ConfigError::UnsupportedFrameRate(reported)) => assert_eq!(reported, *fps),
                other => panic!("Accepted frame rate {}: {:?}", fps, other),
            }
        }
    }

    #[test]
    fn full_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [camera]
            kind = "mlx90640"
            bus = 1
            address = 0x33
            frame_rate = 8

            [render]
            scale_min = -15.0
            scale_max = 120.0

            [stream]
            dataset_path = "/tmp/dataset.bin"

            [log]
            path = "/var/log/thermocast.log"
            "#
        )
        .unwrap();
        file.flush().unwrap();

        let settings = Settings::load(&args(None, file.path().to_path_buf())).unwrap();
        assert_eq!(settings.camera.frame_rate(), FrameRate::Eight);
        assert_eq!(settings.render.scale_max, 120.0);
        assert_eq!(
            settings.stream.dataset_path,
            Some(PathBuf::from("/tmp/dataset.bin"))
        );
        assert_eq!(
            settings.log.path,
            Some(PathBuf::from("/var/log/thermocast.log"))
        );
    }

    #[test]
    fn malformed_config_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not toml at all [[[").unwrap();
        file.flush().unwrap();

        let parsed = Settings::load(&args(None, file.path().to_path_buf()));
        assert!(matches!(parsed, Err(ConfigError::ParseConfig(_, _))));
    }

    #[test]
    fn inverted_color_range_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [render]
            scale_min = 50.0
            scale_max = 5.0
            "#
        )
        .unwrap();
        file.flush().unwrap();

        let parsed = Settings::load(&args(None, file.path().to_path_buf()));
        assert!(matches!(parsed, Err(ConfigError::InvalidColorRange { .. })));
    }
}
