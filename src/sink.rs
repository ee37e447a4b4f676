// SPDX-License-Identifier: GPL-3.0-or-later
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context as _;

use crate::render::Frame;

/// Write one full frame to a sink and flush it.
///
/// Downstream consumers rely on block-size alignment, so a short write is an
/// error, never a partial frame.
fn write_frame<W: Write>(sink: &mut W, frame: &[u8]) -> io::Result<()> {
    sink.write_all(frame)?;
    sink.flush()
}

/// Appends raw frames to a dataset file.
///
/// The file is opened in append mode for each frame and closed once the bytes
/// are flushed, so a failed write can't leak the descriptor into later
/// iterations. The dataset is never truncated; it only grows.
#[derive(Clone, Debug)]
pub(crate) struct DatasetSink {
    path: PathBuf,
}

impl DatasetSink {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn append(&self, frame: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write_frame(&mut file, frame)
    }
}

/// Emits one rendered frame to both output streams as a single operation.
///
/// The false-color image goes to the primary sink and the raw temperature
/// bytes to the secondary sink, each written whole and flushed. A failure on
/// either side stops the emit, so the streams never silently fall out of
/// step.
#[derive(Debug)]
pub(crate) struct FrameEmitter<P, S> {
    primary: P,
    secondary: S,
    dataset: Option<DatasetSink>,
}

impl FrameEmitter<io::Stdout, io::Stderr> {
    pub(crate) fn stdio(dataset: Option<DatasetSink>) -> Self {
        Self::new(io::stdout(), io::stderr(), dataset)
    }
}

impl<P, S> FrameEmitter<P, S>
where
    P: Write,
    S: Write,
{
    pub(crate) fn new(primary: P, secondary: S, dataset: Option<DatasetSink>) -> Self {
        Self {
            primary,
            secondary,
            dataset,
        }
    }

    pub(crate) fn emit(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        write_frame(&mut self.primary, frame.image)
            .context("Error writing rendered frame to the primary stream")?;
        write_frame(&mut self.secondary, frame.raw)
            .context("Error writing raw frame to the secondary stream")?;
        if let Some(dataset) = &self.dataset {
            dataset
                .append(frame.raw)
                .context("Error appending raw frame to the dataset")?;
        }
        Ok(())
    }
}
