//! Connection endpoints and their edge bookkeeping.
//!
//! A [`Junction`] is one slot on a node (an input or an output) or the single
//! input of a parameter. Edges are not stored separately: junction A listing
//! B in `outputs` is the edge A→B, and B lists A in `inputs`. Every mutation
//! in [`Junctions`] updates both sides so the two lists always mirror each
//! other, and neither list ever holds the same junction twice.

use std::fmt;

use super::node::NodeId;
use super::param::ParamId;

/// Stable identifier of a junction within one graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JunctionId(pub(crate) u32);

impl JunctionId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for JunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JunctionId({})", self.0)
    }
}

/// Owner of a junction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Anchor {
    /// An audio node.
    Node(NodeId),
    /// A parameter; its junction is always slot 0.
    Param(ParamId),
}

impl From<NodeId> for Anchor {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<ParamId> for Anchor {
    fn from(id: ParamId) -> Self {
        Self::Param(id)
    }
}

/// One connection endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Junction {
    anchor: Anchor,
    index: usize,
    inputs: Vec<JunctionId>,
    outputs: Vec<JunctionId>,
}

impl Junction {
    /// Node or param owning this junction.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Slot index on the anchor.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Junctions that send to this one, in connection order.
    pub fn inputs(&self) -> &[JunctionId] {
        &self.inputs
    }

    /// Junctions this one sends to, in connection order.
    pub fn outputs(&self) -> &[JunctionId] {
        &self.outputs
    }
}

fn append_if_not_exists(list: &mut Vec<JunctionId>, id: JunctionId) -> bool {
    if list.contains(&id) {
        return false;
    }
    list.push(id);
    true
}

fn remove_if_exists(list: &mut Vec<JunctionId>, id: JunctionId) -> bool {
    match list.iter().position(|j| *j == id) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

/// Arena of junctions for one graph.
#[derive(Clone, Debug, Default)]
pub(crate) struct Junctions {
    slots: Vec<Junction>,
}

impl Junctions {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a junction anchored at `(anchor, index)`.
    pub fn add(&mut self, anchor: Anchor, index: usize) -> JunctionId {
        let id = JunctionId(self.slots.len() as u32);
        self.slots.push(Junction {
            anchor,
            index,
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: JunctionId) -> Option<&Junction> {
        self.slots.get(id.0 as usize)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, id: JunctionId) -> &Junction {
        &self.slots[id.0 as usize]
    }

    fn slot_mut(&mut self, id: JunctionId) -> &mut Junction {
        &mut self.slots[id.0 as usize]
    }

    /// Adds the edge `from → to`. Returns `false` if it already existed.
    pub fn connect(&mut self, from: JunctionId, to: JunctionId) -> bool {
        let added = append_if_not_exists(&mut self.slot_mut(from).outputs, to);
        append_if_not_exists(&mut self.slot_mut(to).inputs, from);
        added
    }

    /// Removes every outgoing edge of `from`. Its inputs are untouched.
    pub fn disconnect_all(&mut self, from: JunctionId) -> usize {
        self.disconnect_where(from, |_| true)
    }

    /// Removes outgoing edges of `from` whose destination is anchored at `anchor`.
    pub fn disconnect_node(&mut self, from: JunctionId, anchor: Anchor) -> usize {
        self.disconnect_where(from, |j| j.anchor == anchor)
    }

    /// Removes outgoing edges of `from` whose destination is slot `input` of `anchor`.
    pub fn disconnect_channel(&mut self, from: JunctionId, anchor: Anchor, input: usize) -> usize {
        self.disconnect_where(from, |j| j.anchor == anchor && j.index == input)
    }

    /// Whether any outgoing edge of `from` ends at `anchor`.
    pub fn is_connected(&self, from: JunctionId, anchor: Anchor) -> bool {
        self.slot(from)
            .outputs
            .iter()
            .any(|to| self.slot(*to).anchor == anchor)
    }

    fn disconnect_where(&mut self, from: JunctionId, pred: impl Fn(&Junction) -> bool) -> usize {
        let targets: Vec<JunctionId> = self
            .slot(from)
            .outputs
            .iter()
            .copied()
            .filter(|to| pred(self.slot(*to)))
            .collect();
        for to in &targets {
            remove_if_exists(&mut self.slot_mut(from).outputs, *to);
            remove_if_exists(&mut self.slot_mut(*to).inputs, from);
        }
        targets.len()
    }
}
