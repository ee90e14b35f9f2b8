//! In-memory sample buffer used by buffer sources and decode results.
//!
//! The simulator never reads the samples; the buffer exists so scheduling can
//! derive natural playback length and snapshots can report the buffer shape.

use serde_json::{Value, json};

use crate::contract;
use crate::error::GraphError;

/// Multi-channel `f32` sample buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    length: usize,
    data: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Creates a silent buffer.
    ///
    /// All three arguments must be non-zero.
    pub fn new(number_of_channels: usize, length: usize, sample_rate: u32) -> Result<Self, GraphError> {
        let method = "AudioBuffer#constructor";
        contract::check_positive(method, "numberOfChannels", number_of_channels)?;
        contract::check_positive(method, "length", length)?;
        contract::check_positive(method, "sampleRate", sample_rate as usize)?;
        Ok(Self {
            sample_rate,
            length,
            data: vec![vec![0.0; length]; number_of_channels],
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames per channel.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.length as f64 / f64::from(self.sample_rate)
    }

    /// Channel count.
    pub fn number_of_channels(&self) -> usize {
        self.data.len()
    }

    /// Samples of one channel.
    pub fn channel_data(&self, channel: usize) -> Result<&[f32], GraphError> {
        contract::check_index("AudioBuffer#getChannelData", "channel", channel, self.data.len())?;
        Ok(&self.data[channel])
    }

    /// Mutable samples of one channel.
    ///
    /// Nothing checks what is written here; non-finite samples snapshot
    /// as `null`.
    pub fn channel_data_mut(&mut self, channel: usize) -> Result<&mut [f32], GraphError> {
        contract::check_index("AudioBuffer#getChannelData", "channel", channel, self.data.len())?;
        Ok(&mut self.data[channel])
    }

    /// Copies samples starting at `start` of `channel` into `destination`,
    /// truncating to whichever side is shorter.
    pub fn copy_from_channel(
        &self,
        destination: &mut [f32],
        channel: usize,
        start: usize,
    ) -> Result<(), GraphError> {
        let method = "AudioBuffer#copyFromChannel";
        contract::check_index(method, "channelNumber", channel, self.data.len())?;
        contract::check_index(method, "startInChannel", start, self.length)?;
        let source = &self.data[channel][start..];
        let n = source.len().min(destination.len());
        destination[..n].copy_from_slice(&source[..n]);
        Ok(())
    }

    /// Copies `source` into `channel` starting at `start`, clipping at the
    /// end of the buffer.
    ///
    /// Every sample in `source` must be finite; nothing is written otherwise.
    pub fn copy_to_channel(&mut self, source: &[f32], channel: usize, start: usize) -> Result<(), GraphError> {
        let method = "AudioBuffer#copyToChannel";
        contract::check_index(method, "channelNumber", channel, self.data.len())?;
        contract::check_index(method, "startInChannel", start, self.length)?;
        if let Some(pos) = source.iter().position(|s| !s.is_finite()) {
            return Err(GraphError::invalid_argument(
                method,
                format!("source[{pos}] should be a finite number, got {}", source[pos]),
            ));
        }
        let n = source.len().min(self.length - start);
        self.data[channel][start..start + n].copy_from_slice(&source[..n]);
        Ok(())
    }

    /// Snapshot of the buffer shape; `verbose` adds the raw samples.
    pub fn to_json(&self, verbose: bool) -> Value {
        let mut summary = json!({
            "name": "AudioBuffer",
            "sampleRate": self.sample_rate,
            "length": self.length,
            "duration": self.duration(),
            "numberOfChannels": self.data.len(),
        });
        if verbose {
            // Value::from maps NaN and infinities to null.
            let data = self
                .data
                .iter()
                .map(|ch| ch.iter().map(|&s| Value::from(f64::from(s))).collect())
                .collect();
            summary["data"] = Value::Array(data);
        }
        summary
    }
}
