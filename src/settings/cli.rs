// SPDX-License-Identifier: GPL-3.0-or-later
use structopt::StructOpt;

use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(about = "Stream false-color thermal frames over stdout")]
pub(crate) struct Args {
    /// Frame rate in frames per second (1, 2, 4, 8, 16, 32 or 64).
    pub(crate) frame_rate: Option<u8>,

    /// Path to a configuration file.
    #[structopt(short, long, parse(from_os_str), default_value = "config.toml")]
    pub(crate) config_path: PathBuf,
}
