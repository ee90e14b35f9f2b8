//! Integration tests for audiomock-core.
//!
//! Drives whole scenarios through the public `AudioContext` surface: the
//! disconnect matrix in both modes, scheduling against the virtual clock,
//! lifecycle events, and snapshots.

use std::cell::RefCell;
use std::rc::Rc;

use audiomock_core::registry::{CLOSE, DISCONNECT, RESUME, SUSPEND};
use audiomock_core::{
    AudioContext, ContextState, Disconnect, ErrorKind, Event, EventTarget, EventType,
    FeatureRegistry, GraphError, NodeId, PlaybackState,
};
use serde_json::json;

fn context(mode: &str) -> AudioContext {
    let registry = FeatureRegistry::new().with_state(DISCONNECT, mode).unwrap();
    AudioContext::with_registry(registry)
}

/// splitter(2): out0 -> merger.in0, out1 -> merger.in1, out0 -> gain.in0
struct Fan {
    ctx: AudioContext,
    splitter: NodeId,
    merger: NodeId,
    gain: NodeId,
}

fn fan(mode: &str) -> Fan {
    let mut ctx = context(mode);
    let splitter = ctx.create_channel_splitter(2).unwrap();
    let merger = ctx.create_channel_merger(2).unwrap();
    let gain = ctx.create_gain();
    ctx.connect(splitter, merger, 0, 0).unwrap();
    ctx.connect(splitter, merger, 1, 1).unwrap();
    ctx.connect(splitter, gain, 0, 0).unwrap();
    Fan {
        ctx,
        splitter,
        merger,
        gain,
    }
}

impl Fan {
    fn feeds(&self, node: NodeId, input: usize) -> bool {
        self.ctx.graph().upstream_of(node, input).contains(&self.splitter)
    }

    /// (merger.in0, merger.in1, gain.in0)
    fn edges(&self) -> (bool, bool, bool) {
        (
            self.feeds(self.merger, 0),
            self.feeds(self.merger, 1),
            self.feeds(self.gain, 0),
        )
    }
}

fn recorder(ctx: &mut AudioContext, target: EventTarget, ty: EventType) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    ctx.add_event_listener(target, ty, Box::new(move |e: &Event| sink.borrow_mut().push(*e)))
        .unwrap();
    log
}

// ============================================================================
// 1. Disconnect, channel mode
// ============================================================================

#[test]
fn channel_disconnect_no_args_clears_output_zero() {
    let mut f = fan("channel");
    f.ctx.disconnect(f.splitter, Disconnect::All).unwrap();
    assert_eq!(f.edges(), (false, true, false));
}

#[test]
fn channel_disconnect_output() {
    let mut f = fan("channel");
    f.ctx.disconnect(f.splitter, Disconnect::Output(1)).unwrap();
    assert_eq!(f.edges(), (true, false, true));

    let err = f.ctx.disconnect(f.splitter, Disconnect::Output(2)).unwrap_err();
    assert!(err.to_string().contains("outside the range"));
}

#[test]
fn channel_disconnect_destination_channel_ignores_input() {
    let mut f = fan("channel");
    f.ctx
        .disconnect(f.splitter, Disconnect::DestinationChannel(f.merger, 1, 0))
        .unwrap();
    assert_eq!(f.edges(), (true, false, true));
}

// ============================================================================
// 2. Disconnect, selective mode
// ============================================================================

#[test]
fn selective_disconnect_no_args_clears_everything() {
    let mut f = fan("selective");
    f.ctx.disconnect(f.splitter, Disconnect::All).unwrap();
    assert_eq!(f.edges(), (false, false, false));
}

#[test]
fn selective_disconnect_output_zero() {
    let mut f = fan("selective");
    f.ctx.disconnect(f.splitter, Disconnect::Output(0)).unwrap();
    assert_eq!(f.edges(), (false, true, false));
}

#[test]
fn selective_disconnect_destination() {
    let mut f = fan("selective");
    f.ctx
        .disconnect(f.splitter, Disconnect::Destination(f.merger.into()))
        .unwrap();
    assert_eq!(f.edges(), (false, false, true));

    let err = f
        .ctx
        .disconnect(f.splitter, Disconnect::Destination(f.merger.into()))
        .unwrap_err();
    assert!(matches!(err, GraphError::NotConnected { .. }));
    assert!(err.to_string().contains("not connected"));
}

#[test]
fn selective_disconnect_destination_output() {
    let mut f = fan("selective");
    f.ctx
        .disconnect(f.splitter, Disconnect::DestinationOutput(f.merger.into(), 1))
        .unwrap();
    assert_eq!(f.edges(), (true, false, true));

    let err = f
        .ctx
        .disconnect(f.splitter, Disconnect::DestinationOutput(f.merger.into(), 2))
        .unwrap_err();
    assert!(err.to_string().contains("outside the range"));
}

#[test]
fn selective_disconnect_destination_channel() {
    let mut f = fan("selective");
    // out1 feeds merger.in1, not in0: nothing removed, no error.
    f.ctx
        .disconnect(f.splitter, Disconnect::DestinationChannel(f.merger, 1, 0))
        .unwrap();
    assert_eq!(f.edges(), (true, true, true));

    f.ctx
        .disconnect(f.splitter, Disconnect::DestinationChannel(f.merger, 1, 1))
        .unwrap();
    assert_eq!(f.edges(), (true, false, true));

    let err = f
        .ctx
        .disconnect(f.splitter, Disconnect::DestinationChannel(f.merger, 0, 2))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
}

#[test]
fn failed_disconnect_leaves_graph_intact() {
    let mut f = fan("selective");
    let other = f.ctx.create_gain();
    assert!(f.ctx.disconnect(f.splitter, Disconnect::Destination(other.into())).is_err());
    assert_eq!(f.edges(), (true, true, true));
    assert_eq!(f.ctx.graph().edge_count(), 3);
}

// ============================================================================
// 3. Processing
// ============================================================================

#[test]
fn diamond_processes_source_once_per_advance() {
    let mut ctx = AudioContext::new();
    let src = ctx.create_oscillator();
    let x = ctx.create_gain();
    let y = ctx.create_gain();
    let dest = ctx.destination();
    ctx.connect(src, x, 0, 0).unwrap();
    ctx.connect(src, y, 0, 0).unwrap();
    ctx.connect(x, dest, 0, 0).unwrap();
    ctx.connect(y, dest, 0, 0).unwrap();

    for _ in 0..3 {
        ctx.advance(0.01).unwrap();
        let order = &ctx.last_pass().order;
        assert_eq!(order.iter().filter(|n| **n == src).count(), 1);
        assert_eq!(order.len(), 4);
        assert_eq!(order.last(), Some(&dest));
    }
}

#[test]
fn feedback_loop_through_delay_terminates() {
    let mut ctx = AudioContext::new();
    let osc = ctx.create_oscillator();
    let delay = ctx.create_delay(1.0).unwrap();
    let feedback = ctx.create_gain();
    let dest = ctx.destination();
    ctx.connect(osc, delay, 0, 0).unwrap();
    ctx.connect(delay, feedback, 0, 0).unwrap();
    ctx.connect(feedback, delay, 0, 0).unwrap();
    ctx.connect(delay, dest, 0, 0).unwrap();

    ctx.advance(0.1).unwrap();
    assert_eq!(ctx.last_pass().order, vec![osc, feedback, delay, dest]);
    assert_eq!(
        ctx.to_json().unwrap()["inputs"][0]["inputs"][1]["inputs"][0],
        json!("<circular:DelayNode>")
    );
}

#[test]
fn long_chain_advances_without_recursion() {
    const LEN: usize = 50_000;
    let mut ctx = AudioContext::new();
    let osc = ctx.create_oscillator();
    let mut prev = osc;
    for _ in 0..LEN {
        let gain = ctx.create_gain();
        ctx.connect(prev, gain, 0, 0).unwrap();
        prev = gain;
    }
    let dest = ctx.destination();
    ctx.connect(prev, dest, 0, 0).unwrap();
    ctx.start(osc, 0.0).unwrap();

    ctx.advance(0.1).unwrap();
    let order = &ctx.last_pass().order;
    assert_eq!(order.len(), LEN + 2);
    assert_eq!(order.first(), Some(&osc));
    assert_eq!(order.last(), Some(&dest));
    assert_eq!(ctx.playback_state(osc).unwrap(), PlaybackState::Playing);

    let err = ctx.to_json().unwrap_err();
    assert!(matches!(err, GraphError::SnapshotTooDeep { .. }));
    assert_eq!(err.kind(), ErrorKind::NotSupported);

    ctx.reset().unwrap();
    assert_eq!(
        ctx.to_json().unwrap(),
        json!({ "name": "AudioDestinationNode", "inputs": [] })
    );
}

#[test]
fn modulator_on_param_is_scheduled() {
    let mut ctx = AudioContext::new();
    let lfo = ctx.create_oscillator();
    let carrier = ctx.create_oscillator();
    let dest = ctx.destination();
    let freq = ctx.param(carrier, "frequency").unwrap();
    ctx.connect_param(lfo, freq, 0).unwrap();
    ctx.connect(carrier, dest, 0, 0).unwrap();

    ctx.start(lfo, 0.0).unwrap();
    ctx.advance(0.01).unwrap();
    assert_eq!(ctx.playback_state(lfo).unwrap(), PlaybackState::Playing);
}

// ============================================================================
// 4. Scheduling and ended events
// ============================================================================

#[test]
fn buffer_source_ended_event() {
    let mut ctx = AudioContext::new();
    let buf_src = ctx.create_buffer_source();
    let osc = ctx.create_oscillator();
    let gain = ctx.create_gain();
    let dest = ctx.destination();
    let buffer = ctx.create_buffer(1, 1102, 44100).unwrap();
    ctx.set_buffer(buf_src, Some(buffer)).unwrap();
    let freq = ctx.param(osc, "frequency").unwrap();
    ctx.connect_param(buf_src, freq, 0).unwrap();
    ctx.connect(osc, gain, 0, 0).unwrap();
    ctx.connect(gain, dest, 0, 0).unwrap();

    let ended = recorder(&mut ctx, EventTarget::Node(buf_src), EventType::Ended);
    ctx.start(buf_src, 0.1).unwrap();

    ctx.advance_to(0.124).unwrap();
    assert!(ended.borrow().is_empty());
    assert_eq!(ctx.playback_state(buf_src).unwrap(), PlaybackState::Playing);

    ctx.advance_to(0.125).unwrap();
    let events = ended.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Ended);
    assert_eq!(events[0].target, EventTarget::Node(buf_src));
    assert_eq!(events[0].time, 0.125);
}

#[test]
fn explicit_stop_ends_oscillator() {
    let mut ctx = AudioContext::new();
    let osc = ctx.create_oscillator();
    let dest = ctx.destination();
    ctx.connect(osc, dest, 0, 0).unwrap();
    let ended = recorder(&mut ctx, EventTarget::Node(osc), EventType::Ended);

    ctx.start(osc, 0.0).unwrap();
    ctx.stop(osc, 0.5).unwrap();
    ctx.advance(0.25).unwrap();
    assert_eq!(ctx.playback_state(osc).unwrap(), PlaybackState::Playing);
    ctx.advance(0.25).unwrap();
    assert_eq!(ctx.playback_state(osc).unwrap(), PlaybackState::Finished);
    assert_eq!(ended.borrow().len(), 1);

    let err = ctx.stop(osc, 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    let err = ctx.start(osc, 1.0).unwrap_err();
    assert!(err.to_string().contains("cannot start"));
}

#[test]
fn stop_before_start_rejected() {
    let mut ctx = AudioContext::new();
    let osc = ctx.create_oscillator();
    let err = ctx.stop(osc, 0.0).unwrap_err();
    assert!(err.to_string().starts_with("OscillatorNode#stop"));
    assert!(err.to_string().contains("cannot stop"));
}

#[test]
fn looping_source_never_ends_on_its_own() {
    let mut ctx = AudioContext::new();
    let src = ctx.create_buffer_source();
    let dest = ctx.destination();
    ctx.set_buffer(src, Some(ctx.create_buffer(1, 441, 44100).unwrap()))
        .unwrap();
    ctx.set_loop(src, true).unwrap();
    ctx.connect(src, dest, 0, 0).unwrap();
    ctx.start(src, 0.0).unwrap();
    ctx.advance(5.0).unwrap();
    assert_eq!(ctx.playback_state(src).unwrap(), PlaybackState::Playing);
}

// ============================================================================
// 5. Lifecycle
// ============================================================================

#[test]
fn state_api_respects_individual_keys() {
    let registry = FeatureRegistry::new().with_state(SUSPEND, "enabled").unwrap();
    let mut ctx = AudioContext::with_registry(registry);
    assert_eq!(ctx.state(), Some(ContextState::Running));
    ctx.suspend().unwrap();
    let err = ctx.resume().unwrap_err();
    assert!(matches!(err, GraphError::NotEnabled { .. }));

    ctx.set_state(RESUME, "enabled").unwrap();
    ctx.set_state(CLOSE, "enabled").unwrap();
    ctx.resume().unwrap();
    ctx.close().unwrap();
    assert_eq!(ctx.state(), Some(ContextState::Closed));
}

#[test]
fn suspended_clock_holds_then_resumes() {
    let mut registry = FeatureRegistry::new();
    registry.set_state_transitions(true);
    let mut ctx = AudioContext::with_registry(registry);
    let changes = recorder(&mut ctx, EventTarget::Context, EventType::StateChange);

    ctx.advance(0.25).unwrap();
    ctx.suspend().unwrap();
    ctx.advance(0.25).unwrap();
    ctx.advance_to(2.0).unwrap();
    assert_eq!(ctx.current_time(), 0.25);

    ctx.resume().unwrap();
    ctx.advance(0.25).unwrap();
    assert_eq!(ctx.current_time(), 0.5);
    assert_eq!(changes.borrow().len(), 2);
    assert!(changes.borrow().iter().all(|e| e.target == EventTarget::Context));
}

// ============================================================================
// 6. Snapshots and reset
// ============================================================================

#[test]
fn snapshot_of_chain() {
    let mut ctx = AudioContext::new();
    let osc = ctx.create_oscillator();
    let gain = ctx.create_gain();
    let dest = ctx.destination();
    ctx.connect(osc, gain, 0, 0).unwrap();
    ctx.connect(gain, dest, 0, 0).unwrap();

    let expected = json!({
        "name": "AudioDestinationNode",
        "inputs": [{
            "name": "GainNode",
            "gain": { "value": 1.0, "inputs": [] },
            "inputs": [{
                "name": "OscillatorNode",
                "type": "sine",
                "frequency": { "value": 440.0, "inputs": [] },
                "detune": { "value": 0.0, "inputs": [] },
                "inputs": []
            }]
        }]
    });
    assert_eq!(ctx.to_json().unwrap(), expected);
}

#[test]
fn snapshot_of_buffer_source() {
    let mut ctx = AudioContext::new();
    let src = ctx.create_buffer_source();
    ctx.set_buffer(src, Some(ctx.create_buffer(2, 4, 44100).unwrap()))
        .unwrap();
    let value = ctx.node_to_json(src).unwrap();
    assert_eq!(value["name"], json!("AudioBufferSourceNode"));
    assert_eq!(value["buffer"]["numberOfChannels"], json!(2));
    assert!(value["buffer"].get("data").is_none());
    assert_eq!(value["loop"], json!(false));
    assert_eq!(value["playbackRate"]["value"], json!(1.0));

    let mut registry = FeatureRegistry::new();
    registry.set_verbose_json(true);
    let mut verbose = AudioContext::with_registry(registry);
    let src = verbose.create_buffer_source();
    verbose
        .set_buffer(src, Some(verbose.create_buffer(1, 2, 44100).unwrap()))
        .unwrap();
    assert_eq!(verbose.node_to_json(src).unwrap()["buffer"]["data"], json!([[0.0, 0.0]]));
}

#[test]
fn reset_clears_time_and_topology() {
    let mut f = fan("channel");
    let dest = f.ctx.destination();
    f.ctx.connect(f.merger, dest, 0, 0).unwrap();
    f.ctx.connect(f.gain, dest, 0, 0).unwrap();
    f.ctx.advance("00:00.500").unwrap();
    let tick = f.ctx.tick();

    f.ctx.reset().unwrap();
    assert_eq!(f.ctx.current_time(), 0.0);
    assert_eq!(
        f.ctx.to_json().unwrap(),
        json!({ "name": "AudioDestinationNode", "inputs": [] })
    );
    assert_eq!(f.ctx.graph().edge_count(), 0);

    f.ctx.advance(0.1).unwrap();
    assert_eq!(f.ctx.tick(), tick + 1);
    assert_eq!(f.ctx.last_pass().order, vec![dest]);
}
