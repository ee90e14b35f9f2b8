//! Audiomock Core - deterministic simulation of an audio-processing graph
//!
//! This crate reproduces the connection topology, lifecycle state machines,
//! and virtual-time scheduling of an audio graph API without producing any
//! sound. Client code builds nodes, wires them, advances a virtual clock, and
//! asserts on the resulting state, events, and JSON snapshots.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`AudioGraph`] - Arena of nodes, parameters and junctions
//! - [`Junction`] - One connection endpoint with mirrored edge lists
//! - [`Disconnect`] - The disconnect call forms, resolved per [`DisconnectMode`]
//!
//! ## Scheduling
//!
//! - [`AudioContext`] - Node factory, virtual clock, tick-deduplicated processing
//! - [`Schedule`] / [`PlaybackState`] - Start/stop state machine of source nodes
//! - [`TimeArg`] - Seconds or `[[HH:]MM:]SS[.fff]` timecodes
//!
//! ## Configuration and Events
//!
//! - [`FeatureRegistry`] - Per-context toggles (disconnect mode, state API)
//! - [`Dispatcher`] - Handler slot plus ordered listeners per target and type
//!
//! ## Values
//!
//! - [`AudioBuffer`] - Sample buffer used by buffer sources and decoding
//!
//! # Construction
//!
//! Identifiers ([`NodeId`], [`ParamId`], [`JunctionId`]) have crate-private
//! fields and are only minted by an [`AudioContext`], which owns its graph.
//! Nothing is shared between contexts.
//!
//! # Logging
//!
//! Enable the `tracing` feature to emit `tracing` debug events at connect,
//! disconnect, scheduling, state transitions and every advance.
//!
//! # Example
//!
//! ```rust
//! use audiomock_core::{AudioContext, Disconnect};
//! use serde_json::json;
//!
//! let mut ctx = AudioContext::new();
//! let osc = ctx.create_oscillator();
//! let gain = ctx.create_gain();
//! ctx.connect(osc, gain, 0, 0)?;
//! ctx.connect(gain, ctx.destination(), 0, 0)?;
//! ctx.advance(0.125)?;
//!
//! assert_eq!(ctx.to_json()?["inputs"][0]["name"], json!("GainNode"));
//!
//! ctx.disconnect(gain, Disconnect::All)?;
//! assert_eq!(ctx.to_json()?, json!({ "name": "AudioDestinationNode", "inputs": [] }));
//! # Ok::<(), audiomock_core::GraphError>(())
//! ```

pub mod buffer;
pub mod context;
mod contract;
pub mod error;
pub mod event;
pub mod graph;
pub mod registry;
pub mod time;

pub use buffer::AudioBuffer;
pub use context::{AudioContext, ContextState, DecodeOutcome};
pub use error::{ErrorKind, GraphError};
pub use event::{Dispatcher, Event, EventTarget, EventType, Listener, ListenerId};
pub use graph::{
    Anchor, AudioGraph, Disconnect, Junction, JunctionId, MAX_SNAPSHOT_DEPTH, NodeId, NodeKind,
    OscillatorType, ParamId, PlaybackState, ProcessPass, Schedule,
};
pub use registry::{DisconnectMode, FeatureRegistry};
pub use time::{TimeArg, parse_timecode};
