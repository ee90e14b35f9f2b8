//! Graph node types.
//!
//! Each node has a [`NodeId`] and a [`NodeKind`] that determines its type tag,
//! its parameters, and whether it carries a playback schedule. `NodeData`
//! bundles the kind with junction slots and the per-node tick stamp used to
//! deduplicate processing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::AudioBuffer;

use super::junction::JunctionId;
use super::param::ParamId;
use super::source::Schedule;

/// Unique identifier for a node in one context.
///
/// Node IDs are assigned sequentially and never reused within a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorType {
    /// Sine wave.
    #[default]
    Sine,
    /// Square wave.
    Square,
    /// Sawtooth wave.
    Sawtooth,
    /// Triangle wave.
    Triangle,
}

impl OscillatorType {
    /// Lowercase name used in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Sawtooth => "sawtooth",
            Self::Triangle => "triangle",
        }
    }
}

/// The role of a node in the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Root sink owned by the context. Exactly one per context.
    Destination,
    /// Gain stage with a `gain` parameter.
    Gain,
    /// Delay line with a `delayTime` parameter.
    Delay {
        /// Upper bound for `delayTime`, in seconds.
        max_delay_time: f64,
    },
    /// One input fanned out to N outputs.
    ChannelSplitter,
    /// N inputs merged into one output.
    ChannelMerger,
    /// Scheduled periodic source.
    Oscillator {
        /// Waveform.
        oscillator_type: OscillatorType,
    },
    /// Scheduled buffer playback source.
    BufferSource {
        /// Buffer to play; `None` until assigned.
        buffer: Option<AudioBuffer>,
        /// Whether playback loops.
        looping: bool,
        /// Loop start in seconds.
        loop_start: f64,
        /// Loop end in seconds.
        loop_end: f64,
    },
}

impl NodeKind {
    /// Type tag reported in snapshots and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Destination => "AudioDestinationNode",
            Self::Gain => "GainNode",
            Self::Delay { .. } => "DelayNode",
            Self::ChannelSplitter => "ChannelSplitterNode",
            Self::ChannelMerger => "ChannelMergerNode",
            Self::Oscillator { .. } => "OscillatorNode",
            Self::BufferSource { .. } => "AudioBufferSourceNode",
        }
    }

    /// Parameter names with their default values, in snapshot order.
    pub(crate) fn param_specs(&self) -> &'static [(&'static str, f64)] {
        match self {
            Self::Gain => &[("gain", 1.0)],
            Self::Delay { .. } => &[("delayTime", 0.0)],
            Self::Oscillator { .. } => &[("frequency", 440.0), ("detune", 0.0)],
            Self::BufferSource { .. } => &[("playbackRate", 1.0)],
            Self::Destination | Self::ChannelSplitter | Self::ChannelMerger => &[],
        }
    }

    /// Whether the node carries a start/stop schedule.
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Oscillator { .. } | Self::BufferSource { .. })
    }

    /// Seconds of playback a segment can produce before ending on its own,
    /// or `None` if the source never ends without an explicit stop.
    pub(crate) fn natural_length(&self, offset: f64) -> Option<f64> {
        match self {
            Self::BufferSource {
                buffer: Some(buffer),
                looping: false,
                ..
            } => Some((buffer.duration() - offset).max(0.0)),
            _ => None,
        }
    }
}

/// Internal bookkeeping for a node in the graph.
#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub kind: NodeKind,
    /// One junction per input slot.
    pub inputs: Vec<JunctionId>,
    /// One junction per output slot.
    pub outputs: Vec<JunctionId>,
    /// Parameters in [`NodeKind::param_specs`] order.
    pub params: Vec<ParamId>,
    /// Present only for scheduled kinds.
    pub schedule: Option<Schedule>,
    /// Tick of the last processing pass that visited this node; ticks start at 1.
    pub last_tick: u64,
}

impl NodeData {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        assert_eq!(NodeKind::Gain.name(), "GainNode");
        assert_eq!(NodeKind::Destination.name(), "AudioDestinationNode");
        assert_eq!(
            NodeKind::Oscillator {
                oscillator_type: OscillatorType::Sine
            }
            .name(),
            "OscillatorNode"
        );
    }

    #[test]
    fn scheduled_kinds() {
        assert!(!NodeKind::Gain.is_scheduled());
        assert!(
            NodeKind::BufferSource {
                buffer: None,
                looping: false,
                loop_start: 0.0,
                loop_end: 0.0
            }
            .is_scheduled()
        );
    }

    #[test]
    fn natural_length_needs_unlooped_buffer() {
        let buffer = AudioBuffer::new(1, 4410, 44100).unwrap();
        let mut kind = NodeKind::BufferSource {
            buffer: Some(buffer),
            looping: false,
            loop_start: 0.0,
            loop_end: 0.0,
        };
        let len = kind.natural_length(0.05).unwrap();
        assert!((len - 0.05).abs() < 1e-12);
        assert_eq!(kind.natural_length(1.0), Some(0.0));

        if let NodeKind::BufferSource { looping, .. } = &mut kind {
            *looping = true;
        }
        assert_eq!(kind.natural_length(0.0), None);
        assert_eq!(
            NodeKind::Oscillator {
                oscillator_type: OscillatorType::Square
            }
            .natural_length(0.0),
            None
        );
    }

    #[test]
    fn oscillator_type_serde() {
        assert_eq!(serde_json::to_string(&OscillatorType::Sawtooth).unwrap(), "\"sawtooth\"");
        let parsed: OscillatorType = serde_json::from_str("\"triangle\"").unwrap();
        assert_eq!(parsed, OscillatorType::Triangle);
    }
}
