//! The audio context: node factory, virtual clock, and lifecycle.
//!
//! [`AudioContext`] owns one [`AudioGraph`] rooted at its destination node, a
//! [`FeatureRegistry`], and an event [`Dispatcher`]. Time only moves when the
//! caller advances it; each advance bumps the tick once and runs a single
//! deduplicated pull from the destination. All nodes visited in that pass see
//! the same clock value and the same tick.
//!
//! # Example
//!
//! ```rust
//! use audiomock_core::{AudioContext, PlaybackState};
//!
//! let mut ctx = AudioContext::new();
//! let osc = ctx.create_oscillator();
//! let gain = ctx.create_gain();
//! ctx.connect(osc, gain, 0, 0)?;
//! ctx.connect(gain, ctx.destination(), 0, 0)?;
//!
//! ctx.start(osc, 0.1)?;
//! ctx.stop(osc, 0.2)?;
//! ctx.advance_to("00:00.150")?;
//! assert_eq!(ctx.playback_state(osc)?, PlaybackState::Playing);
//! ctx.advance(0.1)?;
//! assert_eq!(ctx.playback_state(osc)?, PlaybackState::Finished);
//! # Ok::<(), audiomock_core::GraphError>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::buffer::AudioBuffer;
use crate::contract;
use crate::error::GraphError;
use crate::event::{Dispatcher, Event, EventTarget, EventType, Listener, ListenerId};
use crate::graph::{
    Anchor, AudioGraph, Disconnect, NodeId, NodeKind, OscillatorType, ParamId, PlaybackState,
    ProcessPass, Schedule,
};
use crate::registry::{self, FeatureRegistry};
use crate::time::TimeArg;

/// Upper bound on splitter outputs and merger inputs.
pub const MAX_CHANNELS: usize = 32;
/// Default channel count for splitters and mergers.
pub const DEFAULT_CHANNELS: usize = 6;
/// Upper bound on `DelayNode` max delay time, in seconds.
pub const MAX_DELAY_TIME: f64 = 180.0;

/// Lifecycle state of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextState {
    /// Clock frozen; can resume.
    Suspended,
    /// Clock advances.
    Running,
    /// Terminal.
    Closed,
}

impl ContextState {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Suspended => "suspended",
            Self::Running => "running",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What [`AudioContext::decode_audio_data()`] resolves with.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DecodeOutcome {
    /// A silent two-channel buffer, one second long at the context rate.
    #[default]
    Default,
    /// This buffer.
    Buffer(AudioBuffer),
    /// A decode error.
    Fail,
}

/// Simulated audio context.
pub struct AudioContext {
    graph: AudioGraph,
    destination: NodeId,
    registry: FeatureRegistry,
    dispatcher: Dispatcher,
    current_time: f64,
    tick: u64,
    frames: u64,
    state: ContextState,
    last_pass: ProcessPass,
    decode: DecodeOutcome,
}

impl fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioContext")
            .field("current_time", &self.current_time)
            .field("tick", &self.tick)
            .field("state", &self.state)
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish_non_exhaustive()
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioContext {
    /// Creates a context with a default registry.
    pub fn new() -> Self {
        Self::with_registry(FeatureRegistry::new())
    }

    /// Creates a context that reads its toggles from `registry`.
    pub fn with_registry(registry: FeatureRegistry) -> Self {
        let mut graph = AudioGraph::new();
        let destination = graph.add_node(NodeKind::Destination, 1, 0);
        Self {
            graph,
            destination,
            registry,
            dispatcher: Dispatcher::new(),
            current_time: 0.0,
            tick: 0,
            frames: 0,
            state: ContextState::Running,
            last_pass: ProcessPass::default(),
            decode: DecodeOutcome::Default,
        }
    }

    // --- Accessors ---

    /// Root node of the graph.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Virtual time in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Number of processing passes run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Frames covered by all advances so far, at the context sample rate.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.registry.sample_rate()
    }

    /// The graph, for introspection.
    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    /// Feature registry in effect.
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Updates one registry key for this context.
    pub fn set_state(&mut self, key: &str, value: &str) -> Result<(), GraphError> {
        self.registry.set_state(key, value)
    }

    /// The last processing pass.
    pub fn last_pass(&self) -> &ProcessPass {
        &self.last_pass
    }

    /// Type tag of a node.
    pub fn node_name(&self, node: NodeId) -> Result<&'static str, GraphError> {
        Ok(self.graph.kind(node)?.name())
    }

    // --- Factories ---

    /// Creates a `GainNode`.
    pub fn create_gain(&mut self) -> NodeId {
        self.graph.add_node(NodeKind::Gain, 1, 1)
    }

    /// Creates a `DelayNode` with the given maximum delay.
    pub fn create_delay(&mut self, max_delay_time: f64) -> Result<NodeId, GraphError> {
        let method = "AudioContext#createDelay";
        contract::check_finite(method, "maxDelayTime", max_delay_time)?;
        if max_delay_time <= 0.0 || max_delay_time >= MAX_DELAY_TIME {
            return Err(GraphError::invalid_argument(
                method,
                format!("maxDelayTime should be in (0, {MAX_DELAY_TIME}), got {max_delay_time}"),
            ));
        }
        Ok(self.graph.add_node(NodeKind::Delay { max_delay_time }, 1, 1))
    }

    /// Creates a `ChannelSplitterNode` with `outputs` outputs.
    pub fn create_channel_splitter(&mut self, outputs: usize) -> Result<NodeId, GraphError> {
        check_channels("AudioContext#createChannelSplitter", "numberOfOutputs", outputs)?;
        Ok(self.graph.add_node(NodeKind::ChannelSplitter, 1, outputs))
    }

    /// Creates a `ChannelMergerNode` with `inputs` inputs.
    pub fn create_channel_merger(&mut self, inputs: usize) -> Result<NodeId, GraphError> {
        check_channels("AudioContext#createChannelMerger", "numberOfInputs", inputs)?;
        Ok(self.graph.add_node(NodeKind::ChannelMerger, inputs, 1))
    }

    /// Creates a sine `OscillatorNode`.
    pub fn create_oscillator(&mut self) -> NodeId {
        self.graph.add_node(
            NodeKind::Oscillator {
                oscillator_type: OscillatorType::Sine,
            },
            0,
            1,
        )
    }

    /// Creates an `AudioBufferSourceNode` with no buffer.
    pub fn create_buffer_source(&mut self) -> NodeId {
        self.graph.add_node(
            NodeKind::BufferSource {
                buffer: None,
                looping: false,
                loop_start: 0.0,
                loop_end: 0.0,
            },
            0,
            1,
        )
    }

    /// Creates a silent buffer.
    pub fn create_buffer(
        &self,
        number_of_channels: usize,
        length: usize,
        sample_rate: u32,
    ) -> Result<AudioBuffer, GraphError> {
        AudioBuffer::new(number_of_channels, length, sample_rate)
    }

    // --- Node fields ---

    /// Looks up a parameter by name.
    pub fn param(&self, node: NodeId, name: &str) -> Result<ParamId, GraphError> {
        self.graph.find_param(node, name)
    }

    /// Current value of a parameter.
    pub fn param_value(&self, param: ParamId) -> Result<f64, GraphError> {
        Ok(self.graph.param_data(param)?.value)
    }

    /// Default value of a parameter.
    pub fn param_default(&self, param: ParamId) -> Result<f64, GraphError> {
        Ok(self.graph.param_data(param)?.default)
    }

    /// Sets a parameter's literal value.
    pub fn set_param_value(&mut self, param: ParamId, value: f64) -> Result<(), GraphError> {
        contract::check_finite("AudioParam#value", "value", value)?;
        self.graph.param_data_mut(param)?.value = value;
        Ok(())
    }

    /// Assigns the buffer of a buffer source.
    pub fn set_buffer(&mut self, node: NodeId, buffer: Option<AudioBuffer>) -> Result<(), GraphError> {
        match &mut self.graph.node_mut(node)?.kind {
            NodeKind::BufferSource { buffer: slot, .. } => {
                *slot = buffer;
                Ok(())
            }
            other => Err(not_supported("buffer", other)),
        }
    }

    /// Buffer of a buffer source.
    pub fn buffer(&self, node: NodeId) -> Result<Option<&AudioBuffer>, GraphError> {
        match self.graph.kind(node)? {
            NodeKind::BufferSource { buffer, .. } => Ok(buffer.as_ref()),
            other => Err(not_supported("buffer", other)),
        }
    }

    /// Enables or disables looping on a buffer source.
    pub fn set_loop(&mut self, node: NodeId, enabled: bool) -> Result<(), GraphError> {
        match &mut self.graph.node_mut(node)?.kind {
            NodeKind::BufferSource { looping, .. } => {
                *looping = enabled;
                Ok(())
            }
            other => Err(not_supported("loop", other)),
        }
    }

    /// Sets loop points of a buffer source, in seconds.
    pub fn set_loop_points(&mut self, node: NodeId, start: f64, end: f64) -> Result<(), GraphError> {
        let method = "AudioBufferSourceNode#loopStart";
        contract::check_finite(method, "loopStart", start)?;
        contract::check_finite(method, "loopEnd", end)?;
        match &mut self.graph.node_mut(node)?.kind {
            NodeKind::BufferSource {
                loop_start, loop_end, ..
            } => {
                *loop_start = start;
                *loop_end = end;
                Ok(())
            }
            other => Err(not_supported("loopStart", other)),
        }
    }

    /// Sets the waveform of an oscillator.
    pub fn set_oscillator_type(&mut self, node: NodeId, kind: OscillatorType) -> Result<(), GraphError> {
        match &mut self.graph.node_mut(node)?.kind {
            NodeKind::Oscillator { oscillator_type } => {
                *oscillator_type = kind;
                Ok(())
            }
            other => Err(not_supported("type", other)),
        }
    }

    // --- Topology ---

    /// Connects output `output` of `source` to input `input` of `destination`.
    pub fn connect(
        &mut self,
        source: NodeId,
        destination: NodeId,
        output: usize,
        input: usize,
    ) -> Result<(), GraphError> {
        self.graph.connect(source, destination, output, input)
    }

    /// Connects output `output` of `source` to a parameter.
    pub fn connect_param(&mut self, source: NodeId, param: ParamId, output: usize) -> Result<(), GraphError> {
        self.graph.connect_param(source, param, output)
    }

    /// Disconnects using the registry's disconnect mode. Returns edges removed.
    pub fn disconnect(&mut self, source: NodeId, target: Disconnect) -> Result<usize, GraphError> {
        let mode = self.registry.disconnect_mode();
        self.graph.disconnect(source, target, mode)
    }

    /// Whether any output of `source` feeds `destination`.
    pub fn is_connected(&self, source: NodeId, destination: impl Into<Anchor>) -> Result<bool, GraphError> {
        self.graph.is_connected(source, destination.into())
    }

    // --- Scheduling ---

    /// Schedules a source to start at `when`.
    pub fn start(&mut self, node: NodeId, when: f64) -> Result<(), GraphError> {
        let method = contract::method(self.node_name(node)?, "start");
        self.schedule_mut(node, &method)?.start(&method, when, 0.0, None)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(%node, when, "source_start");
        Ok(())
    }

    /// Schedules a buffer source to play `duration` seconds from `offset`.
    ///
    /// `None` plays to the end of the buffer.
    pub fn start_segment(
        &mut self,
        node: NodeId,
        when: f64,
        offset: f64,
        duration: Option<f64>,
    ) -> Result<(), GraphError> {
        let kind = self.graph.kind(node)?;
        if !matches!(kind, NodeKind::BufferSource { .. }) {
            return Err(not_supported("start", kind));
        }
        let method = contract::method(kind.name(), "start");
        self.schedule_mut(node, &method)?
            .start(&method, when, offset, duration)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(%node, when, offset, ?duration, "source_start");
        Ok(())
    }

    /// Records a stop time for a started source.
    pub fn stop(&mut self, node: NodeId, when: f64) -> Result<(), GraphError> {
        let method = contract::method(self.node_name(node)?, "stop");
        self.schedule_mut(node, &method)?.stop(&method, when)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(%node, when, "source_stop");
        Ok(())
    }

    /// Lifecycle state of a scheduled source.
    pub fn playback_state(&self, node: NodeId) -> Result<PlaybackState, GraphError> {
        Ok(self.schedule(node)?.state())
    }

    /// Schedule of a source node.
    pub fn schedule(&self, node: NodeId) -> Result<&Schedule, GraphError> {
        let data = self.graph.node(node)?;
        data.schedule
            .as_ref()
            .ok_or_else(|| not_supported("playbackState", &data.kind))
    }

    fn schedule_mut(&mut self, node: NodeId, method: &str) -> Result<&mut Schedule, GraphError> {
        let data = self.graph.node_mut(node)?;
        let name = data.name();
        data.schedule.as_mut().ok_or_else(|| GraphError::NotSupported {
            method: method.to_string(),
            node: name,
        })
    }

    // --- Events ---

    /// Sets the `on<type>` handler of a target; `None` clears it.
    pub fn set_handler(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        handler: Option<Listener>,
    ) -> Result<(), GraphError> {
        self.check_target(target)?;
        self.dispatcher.set_handler(target, event_type, handler);
        Ok(())
    }

    /// Registers a listener on a target.
    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        listener: Listener,
    ) -> Result<ListenerId, GraphError> {
        self.check_target(target)?;
        Ok(self.dispatcher.add_listener(target, event_type, listener))
    }

    /// Removes a listener. Returns `false` for unknown handles.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(id)
    }

    fn check_target(&self, target: EventTarget) -> Result<(), GraphError> {
        match target {
            EventTarget::Context => Ok(()),
            EventTarget::Node(id) => self.graph.node(id).map(|_| ()),
        }
    }

    fn emit(&mut self, event_type: EventType, target: EventTarget) {
        let event = Event {
            event_type,
            target,
            time: self.current_time,
        };
        self.dispatcher.dispatch(&event);
    }

    // --- Clock ---

    /// Advances virtual time by `amount` and runs one processing pass.
    ///
    /// Accepts seconds or a timecode. Negative amounts are rejected. While the
    /// context is suspended or closed the call succeeds but nothing moves.
    pub fn advance(&mut self, amount: impl Into<TimeArg>) -> Result<(), GraphError> {
        let method = "AudioContext#advance";
        let amount = amount.into().to_seconds(method)?;
        contract::check_time(method, "amount", amount)?;
        self.step(self.current_time + amount)
    }

    /// Advances to `target` if it lies ahead of the clock; otherwise no-op.
    pub fn advance_to(&mut self, target: impl Into<TimeArg>) -> Result<(), GraphError> {
        let target = target.into().to_seconds("AudioContext#advanceTo")?;
        if target > self.current_time {
            self.step(target)?;
        }
        Ok(())
    }

    fn step(&mut self, next: f64) -> Result<(), GraphError> {
        if self.state != ContextState::Running {
            return Ok(());
        }
        self.current_time = next;
        self.tick += 1;
        self.frames = (self.current_time * f64::from(self.sample_rate())).round() as u64;

        let pass = self.graph.process(self.destination, self.tick, self.current_time)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            time = self.current_time,
            tick = self.tick,
            processed = pass.order.len(),
            ended = pass.ended.len(),
            "advance"
        );
        for node in &pass.ended {
            self.emit(EventType::Ended, EventTarget::Node(*node));
        }
        self.last_pass = pass;
        Ok(())
    }

    /// Returns the clock to zero and detaches everything feeding the destination.
    ///
    /// The lifecycle returns to `running`. Node schedules and listeners are
    /// left as they are; the tick keeps counting so stale stamps never match.
    pub fn reset(&mut self) -> Result<(), GraphError> {
        self.graph.disconnect_upstream(self.destination)?;
        self.current_time = 0.0;
        self.frames = 0;
        self.state = ContextState::Running;
        self.last_pass = ProcessPass::default();
        Ok(())
    }

    // --- Lifecycle ---

    /// Lifecycle state, or `None` when the state API is disabled.
    pub fn state(&self) -> Option<ContextState> {
        self.registry.state_api_visible().then_some(self.state)
    }

    /// Suspends the clock.
    pub fn suspend(&mut self) -> Result<(), GraphError> {
        self.transition(registry::SUSPEND, "suspend", ContextState::Suspended)
    }

    /// Resumes the clock.
    pub fn resume(&mut self) -> Result<(), GraphError> {
        self.transition(registry::RESUME, "resume", ContextState::Running)
    }

    /// Closes the context permanently.
    pub fn close(&mut self) -> Result<(), GraphError> {
        self.transition(registry::CLOSE, "close", ContextState::Closed)
    }

    fn transition(&mut self, key: &str, verb: &str, next: ContextState) -> Result<(), GraphError> {
        let method = contract::method("AudioContext", verb);
        if !self.registry.is_enabled(key) {
            return Err(GraphError::NotEnabled { method });
        }
        if self.state == ContextState::Closed {
            return Err(GraphError::invalid_state(
                method,
                format!("cannot {verb} a closed context"),
            ));
        }
        if self.state == next {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(from = %self.state, to = %next, "context_state");
        self.state = next;
        self.emit(EventType::StateChange, EventTarget::Context);
        Ok(())
    }

    // --- Decoding ---

    /// Sets what the next decode calls resolve with.
    pub fn set_decode_outcome(&mut self, outcome: DecodeOutcome) {
        self.decode = outcome;
    }

    /// Simulated decode. The bytes are not inspected beyond being non-empty.
    pub fn decode_audio_data(&self, data: &[u8]) -> Result<AudioBuffer, GraphError> {
        let method = "AudioContext#decodeAudioData";
        if data.is_empty() {
            return Err(GraphError::invalid_argument(method, "audio data should not be empty"));
        }
        match &self.decode {
            DecodeOutcome::Default => {
                let rate = self.sample_rate();
                AudioBuffer::new(2, rate as usize, rate)
            }
            DecodeOutcome::Buffer(buffer) => Ok(buffer.clone()),
            DecodeOutcome::Fail => Err(GraphError::invalid_argument(
                method,
                "unable to decode audio data",
            )),
        }
    }

    // --- Snapshots ---

    /// Snapshot of everything feeding the destination.
    ///
    /// Fails when an upstream chain is deeper than
    /// [`MAX_SNAPSHOT_DEPTH`](crate::graph::MAX_SNAPSHOT_DEPTH).
    pub fn to_json(&self) -> Result<Value, GraphError> {
        self.node_to_json(self.destination)
    }

    /// Snapshot of everything feeding `node`.
    pub fn node_to_json(&self, node: NodeId) -> Result<Value, GraphError> {
        #[cfg(feature = "tracing")]
        tracing::trace!(%node, "snapshot");
        self.graph.node_to_json(node, self.registry.verbose_json())
    }
}

fn check_channels(method: &str, name: &str, count: usize) -> Result<(), GraphError> {
    if count == 0 || count > MAX_CHANNELS {
        return Err(GraphError::invalid_argument(
            method,
            format!("{name} should be in [1, {MAX_CHANNELS}], got {count}"),
        ));
    }
    Ok(())
}

fn not_supported(member: &str, kind: &NodeKind) -> GraphError {
    GraphError::NotSupported {
        method: contract::method(kind.name(), member),
        node: kind.name(),
    }
}
