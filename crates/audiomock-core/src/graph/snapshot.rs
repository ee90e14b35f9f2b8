//! Plain-data snapshots of the graph for assertions and introspection.
//!
//! A node renders as an object with its type tag under `name`, its literal
//! fields, one `{ value, inputs }` object per parameter, and `inputs` holding
//! the serialized upstream nodes. A node with exactly one input gets a flat
//! `inputs` list; any other input count gets a list per slot.
//!
//! Every path renders its own subtree, so a node reachable twice appears
//! twice. A node met again on the path currently being rendered becomes the
//! string `"<circular:TypeName>"`.
//!
//! Rendering walks an explicit stack of open nodes rather than recursing.
//! Chains deeper than [`MAX_SNAPSHOT_DEPTH`] fail with
//! [`GraphError::SnapshotTooDeep`].

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};

use crate::contract;
use crate::error::GraphError;

use super::node::{NodeId, NodeKind};
use super::processing::AudioGraph;

/// Deepest upstream chain a snapshot nests, counting the root.
pub const MAX_SNAPSHOT_DEPTH: usize = 256;

/// Visitation state threaded through one serialization.
#[derive(Debug, Default)]
pub(crate) struct Memo {
    path: HashSet<NodeId>,
    done: HashMap<NodeId, Value>,
}

/// One upstream list of a node: a parameter or an audio input slot.
#[derive(Debug)]
enum Slot {
    Param { name: &'static str, value: f64 },
    Input,
}

/// A node whose upstream lists are still being rendered.
#[derive(Debug)]
struct Frame {
    id: NodeId,
    slots: Vec<(Slot, Vec<NodeId>)>,
    rendered: Vec<Vec<Value>>,
    slot: usize,
    item: usize,
    cyclic: bool,
}

impl Frame {
    /// Next upstream node to render, moving across slots as they run out.
    fn next_source(&mut self) -> Option<NodeId> {
        while let Some((_, sources)) = self.slots.get(self.slot) {
            if let Some(id) = sources.get(self.item) {
                self.item += 1;
                return Some(*id);
            }
            self.slot += 1;
            self.item = 0;
        }
        None
    }

    /// Appends a rendered upstream node to the current slot.
    fn push(&mut self, value: Value, cyclic: bool) {
        self.cyclic |= cyclic;
        if let Some(list) = self.rendered.get_mut(self.slot) {
            list.push(value);
        }
    }
}

enum Visit {
    /// Rendered without descending: unknown, circular or cached.
    Leaf(Value, bool),
    Open(Frame),
}

fn circular(name: &str) -> Value {
    Value::String(format!("<circular:{name}>"))
}

impl AudioGraph {
    /// Serializes the subgraph feeding `id`.
    pub fn node_to_json(&self, id: NodeId, verbose: bool) -> Result<Value, GraphError> {
        self.node(id)?;
        let mut memo = Memo::default();
        Ok(self.render(id, verbose, &mut memo)?.0)
    }

    /// Returns the rendered value and whether a circular marker appeared in it.
    pub(crate) fn render(
        &self,
        root: NodeId,
        verbose: bool,
        memo: &mut Memo,
    ) -> Result<(Value, bool), GraphError> {
        let mut stack = match self.visit(root, memo) {
            Visit::Leaf(value, cyclic) => return Ok((value, cyclic)),
            Visit::Open(frame) => vec![frame],
        };
        let mut result = (Value::Null, false);

        while let Some(top) = stack.last_mut() {
            if let Some(next) = top.next_source() {
                match self.visit(next, memo) {
                    Visit::Leaf(value, cyclic) => top.push(value, cyclic),
                    Visit::Open(frame) => {
                        if stack.len() >= MAX_SNAPSHOT_DEPTH {
                            return Err(GraphError::SnapshotTooDeep {
                                method: contract::method(self.node(root)?.name(), "toJSON"),
                                limit: MAX_SNAPSHOT_DEPTH,
                            });
                        }
                        stack.push(frame);
                    }
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            memo.path.remove(&frame.id);
            let id = frame.id;
            let cyclic = frame.cyclic;
            let value = self.finish(frame, verbose);
            if !cyclic {
                memo.done.insert(id, value.clone());
            }
            match stack.last_mut() {
                Some(parent) => parent.push(value, cyclic),
                None => result = (value, cyclic),
            }
        }
        Ok(result)
    }

    fn visit(&self, id: NodeId, memo: &mut Memo) -> Visit {
        let Ok(node) = self.node(id) else {
            return Visit::Leaf(Value::Null, false);
        };
        if memo.path.contains(&id) {
            return Visit::Leaf(circular(node.name()), true);
        }
        if let Some(cached) = memo.done.get(&id) {
            return Visit::Leaf(cached.clone(), false);
        }
        memo.path.insert(id);

        let params = node
            .params
            .iter()
            .filter_map(|pid| self.param_data(*pid).ok())
            .map(|p| {
                let slot = Slot::Param {
                    name: p.name,
                    value: p.value,
                };
                (slot, self.source_nodes(p.input))
            });
        let inputs = node
            .inputs
            .iter()
            .map(|j| (Slot::Input, self.source_nodes(*j)));
        let slots: Vec<_> = params.chain(inputs).collect();
        Visit::Open(Frame {
            id,
            rendered: slots.iter().map(|_| Vec::new()).collect(),
            slots,
            slot: 0,
            item: 0,
            cyclic: false,
        })
    }

    fn finish(&self, frame: Frame, verbose: bool) -> Value {
        let mut out = Map::new();
        if let Ok(node) = self.node(frame.id) {
            out.insert("name".into(), Value::from(node.name()));
            kind_fields(&node.kind, verbose, &mut out);
        }
        let mut inputs = Vec::new();
        for ((slot, _), rendered) in frame.slots.into_iter().zip(frame.rendered) {
            match slot {
                Slot::Param { name, value } => {
                    out.insert(name.into(), json!({ "value": value, "inputs": rendered }));
                }
                Slot::Input => inputs.push(Value::Array(rendered)),
            }
        }
        let inputs = if inputs.len() == 1 {
            inputs.pop().unwrap_or_default()
        } else {
            Value::Array(inputs)
        };
        out.insert("inputs".into(), inputs);
        Value::Object(out)
    }
}

fn kind_fields(kind: &NodeKind, verbose: bool, out: &mut Map<String, Value>) {
    match kind {
        NodeKind::Oscillator { oscillator_type } => {
            out.insert("type".into(), Value::from(oscillator_type.as_str()));
        }
        NodeKind::BufferSource {
            buffer,
            looping,
            loop_start,
            loop_end,
        } => {
            let buffer = buffer
                .as_ref()
                .map_or(Value::Null, |b| b.to_json(verbose));
            out.insert("buffer".into(), buffer);
            out.insert("loop".into(), Value::from(*looping));
            out.insert("loopStart".into(), Value::from(*loop_start));
            out.insert("loopEnd".into(), Value::from(*loop_end));
        }
        NodeKind::Delay { max_delay_time } => {
            out.insert("maxDelayTime".into(), Value::from(*max_delay_time));
        }
        NodeKind::Destination
        | NodeKind::Gain
        | NodeKind::ChannelSplitter
        | NodeKind::ChannelMerger => {}
    }
}
