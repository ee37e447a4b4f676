// SPDX-License-Identifier: GPL-3.0-or-later
use serde::Deserialize;

fn default_scale_min() -> f32 {
    5.0
}

fn default_scale_max() -> f32 {
    50.0
}

/// Settings for mapping temperatures onto the false-color gradient.
///
/// The defaults suit general thermal viewing; a deployment watching a
/// specific target can narrow the range in the configuration file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub(crate) struct RenderSettings {
    /// Temperature mapped to the bottom of the gradient, in degrees Celsius.
    #[serde(default = "default_scale_min")]
    pub(crate) scale_min: f32,

    /// Temperature mapped to the top of the gradient, in degrees Celsius.
    #[serde(default = "default_scale_max")]
    pub(crate) scale_max: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            scale_min: default_scale_min(),
            scale_max: default_scale_max(),
        }
    }
}
