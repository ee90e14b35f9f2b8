//! Automatable node parameters.
//!
//! A parameter holds a literal value and owns one input junction, so node
//! outputs can be connected to it the same way they connect to node inputs.

use std::fmt;

use super::junction::JunctionId;
use super::node::NodeId;

/// Unique identifier for a parameter in one context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamId(pub(crate) u32);

impl ParamId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParamId({})", self.0)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ParamData {
    pub owner: NodeId,
    pub name: &'static str,
    pub value: f64,
    pub default: f64,
    pub input: JunctionId,
}
