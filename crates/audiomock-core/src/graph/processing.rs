//! Audio graph: node/param arena, connect/disconnect, and the per-tick pull.
//!
//! [`AudioGraph`] owns every node, parameter and junction of one context.
//! Identifiers index into flat vectors and are never reused; the graph has
//! no remove operation because nodes simply become unreachable once
//! disconnected.
//!
//! Processing is pull-based. [`process()`](AudioGraph::process) starts at a
//! root node and walks input junctions depth-first. Each node is stamped with
//! the current tick on entry, so a node reachable through several paths (a
//! diamond) or through a cycle is processed once per tick.

use crate::contract;
use crate::error::GraphError;
use crate::registry::DisconnectMode;

use super::junction::{Anchor, Junction, JunctionId, Junctions};
use super::node::{NodeData, NodeId, NodeKind};
use super::param::{ParamData, ParamId};
use super::source::{Schedule, Transition};

/// Target of a disconnect call.
///
/// Which edges the partially-specified forms remove depends on the
/// [`DisconnectMode`] in effect:
///
/// | form | `Channel` | `Selective` |
/// |------|-----------|-------------|
/// | `All` | output 0 | every output |
/// | `Output(o)` | output `o` | output `o` |
/// | `Destination(d)` | every edge to `d` | every edge to `d` |
/// | `DestinationOutput(d, o)` | edges from `o` to `d` | edges from `o` to `d` |
/// | `DestinationChannel(d, o, i)` | edges from `o` to `d`, any input | edge from `o` to input `i` of `d` |
///
/// Destination forms fail with a not-connected error when the source does not
/// feed `d` at all (on output `o`, when given).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disconnect {
    /// No arguments.
    All,
    /// An output slot.
    Output(usize),
    /// A destination node or param, all slots.
    Destination(Anchor),
    /// A destination and an output slot.
    DestinationOutput(Anchor, usize),
    /// A destination node, an output slot, and an input slot.
    DestinationChannel(NodeId, usize, usize),
}

/// Outcome of one processing pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessPass {
    /// Nodes in the order their per-tick hooks ran (upstream first).
    pub order: Vec<NodeId>,
    /// Sources that finished on this tick, in hook order.
    pub ended: Vec<NodeId>,
}

/// Arena-backed audio graph for one context.
#[derive(Clone, Debug, Default)]
pub struct AudioGraph {
    nodes: Vec<NodeData>,
    params: Vec<ParamData>,
    junctions: Junctions,
}

impl AudioGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Construction ---

    /// Adds a node with the given slot counts and its parameters.
    pub(crate) fn add_node(&mut self, kind: NodeKind, inputs: usize, outputs: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let anchor = Anchor::Node(id);
        let inputs = (0..inputs).map(|i| self.junctions.add(anchor, i)).collect();
        let outputs = (0..outputs).map(|i| self.junctions.add(anchor, i)).collect();
        let params = kind
            .param_specs()
            .iter()
            .map(|&(name, default)| {
                let pid = ParamId(self.params.len() as u32);
                let input = self.junctions.add(Anchor::Param(pid), 0);
                self.params.push(ParamData {
                    owner: id,
                    name,
                    value: default,
                    default,
                    input,
                });
                pid
            })
            .collect();
        let schedule = kind.is_scheduled().then(Schedule::default);
        self.nodes.push(NodeData {
            kind,
            inputs,
            outputs,
            params,
            schedule,
            last_tick: 0,
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, kind = self.nodes[id.0 as usize].name(), "graph_add_node");
        id
    }

    // --- Lookup ---

    pub(crate) fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes.get(id.0 as usize).ok_or(GraphError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, GraphError> {
        self.nodes.get_mut(id.0 as usize).ok_or(GraphError::NodeNotFound(id))
    }

    pub(crate) fn param_data(&self, id: ParamId) -> Result<&ParamData, GraphError> {
        self.params.get(id.0 as usize).ok_or(GraphError::ParamNotFound(id))
    }

    pub(crate) fn param_data_mut(&mut self, id: ParamId) -> Result<&mut ParamData, GraphError> {
        self.params.get_mut(id.0 as usize).ok_or(GraphError::ParamNotFound(id))
    }

    /// Kind of a node.
    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, GraphError> {
        Ok(&self.node(id)?.kind)
    }

    /// Number of input slots.
    pub fn number_of_inputs(&self, id: NodeId) -> Result<usize, GraphError> {
        Ok(self.node(id)?.inputs.len())
    }

    /// Number of output slots.
    pub fn number_of_outputs(&self, id: NodeId) -> Result<usize, GraphError> {
        Ok(self.node(id)?.outputs.len())
    }

    /// Parameters of a node in declaration order.
    pub fn params_of(&self, id: NodeId) -> Result<&[ParamId], GraphError> {
        Ok(&self.node(id)?.params)
    }

    /// Looks up a parameter of `node` by name.
    pub fn find_param(&self, node: NodeId, name: &str) -> Result<ParamId, GraphError> {
        let data = self.node(node)?;
        data.params
            .iter()
            .copied()
            .find(|pid| self.params[pid.0 as usize].name == name)
            .ok_or_else(|| GraphError::UnknownParam {
                node: data.name(),
                name: name.to_string(),
            })
    }

    /// Name of a parameter.
    pub fn param_name(&self, id: ParamId) -> Result<&'static str, GraphError> {
        Ok(self.param_data(id)?.name)
    }

    /// Node owning a parameter.
    pub fn param_owner(&self, id: ParamId) -> Result<NodeId, GraphError> {
        Ok(self.param_data(id)?.owner)
    }

    /// Junction by id.
    pub fn junction(&self, id: JunctionId) -> Option<&Junction> {
        self.junctions.get(id)
    }

    /// Input junction `index` of `node`.
    pub fn input_junction(&self, node: NodeId, index: usize) -> Option<JunctionId> {
        self.nodes.get(node.0 as usize)?.inputs.get(index).copied()
    }

    /// Output junction `index` of `node`.
    pub fn output_junction(&self, node: NodeId, index: usize) -> Option<JunctionId> {
        self.nodes.get(node.0 as usize)?.outputs.get(index).copied()
    }

    /// Input junction of a parameter.
    pub fn param_junction(&self, param: ParamId) -> Option<JunctionId> {
        self.params.get(param.0 as usize).map(|p| p.input)
    }

    /// Number of nodes ever created, including the destination.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.outputs.iter())
            .filter_map(|j| self.junctions.get(*j))
            .map(|j| j.outputs().len())
            .sum::<usize>()
    }

    /// Whether any output of `source` feeds `destination`.
    pub fn is_connected(&self, source: NodeId, destination: Anchor) -> Result<bool, GraphError> {
        let data = self.node(source)?;
        Ok(data
            .outputs
            .iter()
            .any(|j| self.junctions.is_connected(*j, destination)))
    }

    /// Source nodes feeding input slot `index` of `node`, in connection order.
    pub fn upstream_of(&self, node: NodeId, index: usize) -> Vec<NodeId> {
        self.input_junction(node, index)
            .map(|j| self.source_nodes(j))
            .unwrap_or_default()
    }

    pub(crate) fn source_nodes(&self, junction: JunctionId) -> Vec<NodeId> {
        self.junctions
            .get(junction)
            .map(|j| {
                j.inputs()
                    .iter()
                    .filter_map(|src| match self.junctions.get(*src)?.anchor() {
                        Anchor::Node(id) => Some(id),
                        Anchor::Param(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn check_anchor(&self, anchor: Anchor) -> Result<(), GraphError> {
        match anchor {
            Anchor::Node(id) => self.node(id).map(|_| ()),
            Anchor::Param(id) => self.param_data(id).map(|_| ()),
        }
    }

    // --- Mutation ---

    /// Connects output `output` of `source` to input `input` of `destination`.
    ///
    /// Connecting an existing edge again is a no-op. Cycles are allowed.
    pub(crate) fn connect(
        &mut self,
        source: NodeId,
        destination: NodeId,
        output: usize,
        input: usize,
    ) -> Result<(), GraphError> {
        let src = self.node(source)?;
        let method = contract::method(src.name(), "connect");
        let dst = self.node(destination)?;
        contract::check_output(&method, output, src.outputs.len())?;
        contract::check_input(&method, input, dst.inputs.len())?;

        let from = src.outputs[output];
        let to = dst.inputs[input];
        self.junctions.connect(from, to);
        #[cfg(feature = "tracing")]
        tracing::debug!(%source, %destination, output, input, "graph_connect");
        Ok(())
    }

    /// Connects output `output` of `source` to a parameter.
    pub(crate) fn connect_param(
        &mut self,
        source: NodeId,
        param: ParamId,
        output: usize,
    ) -> Result<(), GraphError> {
        let src = self.node(source)?;
        let method = contract::method(src.name(), "connect");
        let to = self.param_data(param)?.input;
        contract::check_output(&method, output, src.outputs.len())?;

        let from = src.outputs[output];
        self.junctions.connect(from, to);
        #[cfg(feature = "tracing")]
        tracing::debug!(%source, %param, output, "graph_connect_param");
        Ok(())
    }

    /// Removes edges leaving `source` as selected by `target` and `mode`.
    ///
    /// Returns the number of edges removed. All checks run before any edge is
    /// touched: range checks first, then the connection check.
    pub(crate) fn disconnect(
        &mut self,
        source: NodeId,
        target: Disconnect,
        mode: DisconnectMode,
    ) -> Result<usize, GraphError> {
        let src = self.node(source)?;
        let method = contract::method(src.name(), "disconnect");
        let outputs = src.outputs.clone();
        let removed = match target {
            Disconnect::All => match mode {
                DisconnectMode::Channel => {
                    contract::check_index(&method, "output", 0, outputs.len())?;
                    self.junctions.disconnect_all(outputs[0])
                }
                DisconnectMode::Selective => outputs
                    .iter()
                    .map(|j| self.junctions.disconnect_all(*j))
                    .sum::<usize>(),
            },
            Disconnect::Output(output) => {
                contract::check_index(&method, "output", output, outputs.len())?;
                self.junctions.disconnect_all(outputs[output])
            }
            Disconnect::Destination(anchor) => {
                self.check_anchor(anchor)?;
                if !outputs.iter().any(|j| self.junctions.is_connected(*j, anchor)) {
                    return Err(GraphError::NotConnected { method });
                }
                outputs
                    .iter()
                    .map(|j| self.junctions.disconnect_node(*j, anchor))
                    .sum::<usize>()
            }
            Disconnect::DestinationOutput(anchor, output) => {
                self.check_anchor(anchor)?;
                contract::check_index(&method, "output", output, outputs.len())?;
                let from = outputs[output];
                if !self.junctions.is_connected(from, anchor) {
                    return Err(GraphError::NotConnected { method });
                }
                self.junctions.disconnect_node(from, anchor)
            }
            Disconnect::DestinationChannel(node, output, input) => {
                let inputs = self.node(node)?.inputs.len();
                contract::check_index(&method, "output", output, outputs.len())?;
                contract::check_index(&method, "input", input, inputs)?;
                let from = outputs[output];
                let anchor = Anchor::Node(node);
                if !self.junctions.is_connected(from, anchor) {
                    return Err(GraphError::NotConnected { method });
                }
                match mode {
                    DisconnectMode::Channel => self.junctions.disconnect_node(from, anchor),
                    DisconnectMode::Selective => {
                        self.junctions.disconnect_channel(from, anchor, input)
                    }
                }
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(%source, ?target, %mode, removed, "graph_disconnect");
        Ok(removed)
    }

    /// Removes every outgoing edge of every node upstream of `root`.
    ///
    /// Afterwards `root` and all nodes it could reach through inputs or
    /// parameters are isolated. Nodes elsewhere keep their edges.
    pub(crate) fn disconnect_upstream(&mut self, root: NodeId) -> Result<usize, GraphError> {
        self.node(root)?;
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        let mut reached = Vec::new();
        while let Some(id) = stack.pop() {
            let idx = id.0 as usize;
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            reached.push(id);
            stack.extend(self.pull_sources(id));
        }

        let mut removed = 0;
        for id in reached {
            for j in self.nodes[id.0 as usize].outputs.clone() {
                removed += self.junctions.disconnect_all(j);
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(%root, removed, "graph_disconnect_upstream");
        Ok(removed)
    }

    // --- Processing ---

    /// Runs one deduplicated depth-first pass from `root`.
    ///
    /// Every node visited observes the same `tick` and `now`. A node whose
    /// stamp already equals `tick` is skipped.
    pub(crate) fn process(&mut self, root: NodeId, tick: u64, now: f64) -> Result<ProcessPass, GraphError> {
        self.node(root)?;
        let mut pass = ProcessPass::default();
        self.pull(root, tick, now, &mut pass);
        Ok(pass)
    }

    /// Upstream nodes of `id`: audio inputs first, then parameter inputs.
    fn pull_sources(&self, id: NodeId) -> Vec<NodeId> {
        let data = &self.nodes[id.0 as usize];
        let params = data.params.iter().map(|p| self.params[p.0 as usize].input);
        data.inputs
            .iter()
            .copied()
            .chain(params)
            .flat_map(|j| self.source_nodes(j))
            .collect()
    }

    /// Post-order walk on an explicit stack: a node is stamped when first
    /// popped and its hook runs when popped again after its upstream.
    fn pull(&mut self, root: NodeId, tick: u64, now: f64, pass: &mut ProcessPass) {
        let mut stack = vec![(root, false)];
        while let Some((id, upstream_done)) = stack.pop() {
            let idx = id.0 as usize;
            if upstream_done {
                pass.order.push(id);
                let node = &mut self.nodes[idx];
                if let Some(schedule) = node.schedule.as_mut() {
                    let natural = node.kind.natural_length(schedule.offset());
                    match schedule.advance(now, natural) {
                        Transition::Ended => pass.ended.push(id),
                        Transition::Started | Transition::None => {}
                    }
                }
                continue;
            }
            if self.nodes[idx].last_tick == tick {
                continue;
            }
            self.nodes[idx].last_tick = tick;
            stack.push((id, true));
            // Reversed so the first source is walked first.
            stack.extend(self.pull_sources(id).into_iter().rev().map(|src| (src, false)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::graph::OscillatorType;

    fn gain(graph: &mut AudioGraph) -> NodeId {
        graph.add_node(NodeKind::Gain, 1, 1)
    }

    fn osc(graph: &mut AudioGraph) -> NodeId {
        graph.add_node(
            NodeKind::Oscillator {
                oscillator_type: OscillatorType::Sine,
            },
            0,
            1,
        )
    }

    /// splitter(2): out0 -> merger.in0, out1 -> merger.in1, out0 -> gain.in0
    fn fan(graph: &mut AudioGraph) -> (NodeId, NodeId, NodeId) {
        let splitter = graph.add_node(NodeKind::ChannelSplitter, 1, 2);
        let merger = graph.add_node(NodeKind::ChannelMerger, 2, 1);
        let g = gain(graph);
        graph.connect(splitter, merger, 0, 0).unwrap();
        graph.connect(splitter, merger, 1, 1).unwrap();
        graph.connect(splitter, g, 0, 0).unwrap();
        (splitter, merger, g)
    }

    #[test]
    fn test_add_node_creates_params() {
        let mut graph = AudioGraph::new();
        let g = gain(&mut graph);
        let pid = graph.find_param(g, "gain").unwrap();
        assert_eq!(graph.param_owner(pid).unwrap(), g);
        assert_eq!(graph.param_data(pid).unwrap().value, 1.0);
        assert!(matches!(
            graph.find_param(g, "frequency"),
            Err(GraphError::UnknownParam { .. })
        ));
    }

    #[test]
    fn test_connect_out_of_range() {
        let mut graph = AudioGraph::new();
        let a = gain(&mut graph);
        let b = gain(&mut graph);

        let err = graph.connect(a, b, 1, 0).unwrap_err();
        assert!(matches!(err, GraphError::OutputOutOfRange { .. }));
        assert!(err.to_string().starts_with("GainNode#connect"));

        let err = graph.connect(a, b, 0, 3).unwrap_err();
        assert!(matches!(err, GraphError::InputOutOfRange { .. }));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_connect_into_source_rejected() {
        let mut graph = AudioGraph::new();
        let g = gain(&mut graph);
        let o = osc(&mut graph);
        let err = graph.connect(g, o, 0, 0).unwrap_err();
        assert!(err.to_string().contains("exceeds number of inputs (0)"));
    }

    #[test]
    fn test_connect_idempotent() {
        let mut graph = AudioGraph::new();
        let a = gain(&mut graph);
        let b = gain(&mut graph);
        graph.connect(a, b, 0, 0).unwrap();
        graph.connect(a, b, 0, 0).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_unknown_node() {
        let mut graph = AudioGraph::new();
        let a = gain(&mut graph);
        let err = graph.connect(a, NodeId(99), 0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_channel_bare_disconnect_clears_output_zero() {
        let mut graph = AudioGraph::new();
        let (splitter, merger, g) = fan(&mut graph);
        let removed = graph
            .disconnect(splitter, Disconnect::All, DisconnectMode::Channel)
            .unwrap();
        assert_eq!(removed, 2);
        assert!(graph.upstream_of(merger, 0).is_empty());
        assert_eq!(graph.upstream_of(merger, 1), vec![splitter]);
        assert!(graph.upstream_of(g, 0).is_empty());
    }

    #[test]
    fn test_selective_bare_disconnect_clears_everything() {
        let mut graph = AudioGraph::new();
        let (splitter, _, _) = fan(&mut graph);
        let removed = graph
            .disconnect(splitter, Disconnect::All, DisconnectMode::Selective)
            .unwrap();
        assert_eq!(removed, 3);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_bare_disconnect_without_outputs() {
        let mut graph = AudioGraph::new();
        let dest = graph.add_node(NodeKind::Destination, 1, 0);
        let err = graph
            .disconnect(dest, Disconnect::All, DisconnectMode::Channel)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(
            graph
                .disconnect(dest, Disconnect::All, DisconnectMode::Selective)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_disconnect_destination_all_slots() {
        let mut graph = AudioGraph::new();
        let (splitter, merger, g) = fan(&mut graph);
        graph
            .disconnect(splitter, Disconnect::Destination(merger.into()), DisconnectMode::Channel)
            .unwrap();
        assert!(!graph.is_connected(splitter, merger.into()).unwrap());
        assert_eq!(graph.upstream_of(g, 0), vec![splitter]);

        let err = graph
            .disconnect(splitter, Disconnect::Destination(merger.into()), DisconnectMode::Channel)
            .unwrap_err();
        assert!(matches!(err, GraphError::NotConnected { .. }));
    }

    #[test]
    fn test_disconnect_destination_output() {
        let mut graph = AudioGraph::new();
        let (splitter, merger, g) = fan(&mut graph);
        graph
            .disconnect(
                splitter,
                Disconnect::DestinationOutput(merger.into(), 1),
                DisconnectMode::Selective,
            )
            .unwrap();
        assert_eq!(graph.upstream_of(merger, 0), vec![splitter]);
        assert!(graph.upstream_of(merger, 1).is_empty());
        assert_eq!(graph.upstream_of(g, 0), vec![splitter]);

        let err = graph
            .disconnect(
                splitter,
                Disconnect::DestinationOutput(merger.into(), 2),
                DisconnectMode::Selective,
            )
            .unwrap_err();
        assert!(err.to_string().contains("outside the range"));
    }

    #[test]
    fn test_disconnect_channel_mode_matrix() {
        // Selective: out1 feeds merger.in1, so (merger, 1, 0) removes nothing.
        let mut graph = AudioGraph::new();
        let (splitter, merger, _) = fan(&mut graph);
        let removed = graph
            .disconnect(
                splitter,
                Disconnect::DestinationChannel(merger, 1, 0),
                DisconnectMode::Selective,
            )
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(graph.upstream_of(merger, 1), vec![splitter]);

        // Channel: the input slot is ignored.
        let removed = graph
            .disconnect(
                splitter,
                Disconnect::DestinationChannel(merger, 1, 0),
                DisconnectMode::Channel,
            )
            .unwrap();
        assert_eq!(removed, 1);
        assert!(graph.upstream_of(merger, 1).is_empty());
    }

    #[test]
    fn test_disconnect_range_checked_before_connection() {
        let mut graph = AudioGraph::new();
        let a = gain(&mut graph);
        let b = gain(&mut graph);
        let err = graph
            .disconnect(a, Disconnect::DestinationChannel(b, 0, 4), DisconnectMode::Selective)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = graph
            .disconnect(a, Disconnect::DestinationChannel(b, 0, 0), DisconnectMode::Selective)
            .unwrap_err();
        assert!(matches!(err, GraphError::NotConnected { .. }));
    }

    #[test]
    fn test_connect_and_disconnect_param() {
        let mut graph = AudioGraph::new();
        let o = osc(&mut graph);
        let g = gain(&mut graph);
        let pid = graph.find_param(g, "gain").unwrap();
        assert_eq!(graph.params_of(g).unwrap(), &[pid]);
        assert_eq!(graph.param_name(pid).unwrap(), "gain");

        graph.connect_param(o, pid, 0).unwrap();
        assert!(graph.is_connected(o, pid.into()).unwrap());
        assert!(!graph.is_connected(o, g.into()).unwrap());

        let to = graph.param_junction(pid).unwrap();
        let from = graph.output_junction(o, 0).unwrap();
        assert_eq!(graph.junction(to).unwrap().inputs(), &[from]);
        assert_eq!(graph.junction(to).unwrap().anchor(), Anchor::Param(pid));

        graph
            .disconnect(o, Disconnect::Destination(pid.into()), DisconnectMode::Channel)
            .unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.junction(to).unwrap().inputs().is_empty());
    }

    #[test]
    fn test_diamond_processes_source_once() {
        let mut graph = AudioGraph::new();
        let sink = graph.add_node(NodeKind::Destination, 1, 0);
        let src = osc(&mut graph);
        let x = gain(&mut graph);
        let y = gain(&mut graph);
        graph.connect(src, x, 0, 0).unwrap();
        graph.connect(src, y, 0, 0).unwrap();
        graph.connect(x, sink, 0, 0).unwrap();
        graph.connect(y, sink, 0, 0).unwrap();

        let pass = graph.process(sink, 1, 0.0).unwrap();
        assert_eq!(pass.order, vec![src, x, y, sink]);

        let pass = graph.process(sink, 2, 0.1).unwrap();
        assert_eq!(pass.order.iter().filter(|n| **n == src).count(), 1);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = AudioGraph::new();
        let sink = graph.add_node(NodeKind::Destination, 1, 0);
        let a = gain(&mut graph);
        let b = gain(&mut graph);
        graph.connect(a, b, 0, 0).unwrap();
        graph.connect(b, a, 0, 0).unwrap();
        graph.connect(b, sink, 0, 0).unwrap();

        let pass = graph.process(sink, 1, 0.0).unwrap();
        assert_eq!(pass.order, vec![a, b, sink]);
    }

    #[test]
    fn test_param_inputs_are_pulled() {
        let mut graph = AudioGraph::new();
        let sink = graph.add_node(NodeKind::Destination, 1, 0);
        let lfo = osc(&mut graph);
        let g = gain(&mut graph);
        graph.connect(g, sink, 0, 0).unwrap();
        let pid = graph.find_param(g, "gain").unwrap();
        graph.connect_param(lfo, pid, 0).unwrap();

        let pass = graph.process(sink, 1, 0.0).unwrap();
        assert_eq!(pass.order, vec![lfo, g, sink]);
    }

    #[test]
    fn test_disconnected_nodes_not_processed() {
        let mut graph = AudioGraph::new();
        let sink = graph.add_node(NodeKind::Destination, 1, 0);
        let orphan = gain(&mut graph);
        let pass = graph.process(sink, 1, 0.0).unwrap();
        assert_eq!(pass.order, vec![sink]);
        assert_eq!(graph.node(orphan).unwrap().last_tick, 0);
    }

    #[test]
    fn test_disconnect_upstream() {
        let mut graph = AudioGraph::new();
        let sink = graph.add_node(NodeKind::Destination, 1, 0);
        let a = osc(&mut graph);
        let b = gain(&mut graph);
        let c = gain(&mut graph);
        let unrelated = gain(&mut graph);
        graph.connect(a, b, 0, 0).unwrap();
        graph.connect(b, sink, 0, 0).unwrap();
        graph.connect(a, c, 0, 0).unwrap();
        graph.connect(c, unrelated, 0, 0).unwrap();

        let removed = graph.disconnect_upstream(sink).unwrap();
        assert_eq!(removed, 3);
        assert!(graph.upstream_of(sink, 0).is_empty());
        // c is not upstream of the sink, so its edge survives.
        assert_eq!(graph.upstream_of(unrelated, 0), vec![c]);
    }
}
