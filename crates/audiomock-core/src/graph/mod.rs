//! Connection graph for the simulated audio context.
//!
//! The graph is an arena: nodes, parameters and junctions live in flat
//! vectors owned by [`AudioGraph`] and refer to each other through stable
//! identifiers ([`NodeId`], [`ParamId`], [`JunctionId`]). Edges are implicit,
//! stored as mirrored `outputs`/`inputs` lists on the two junctions they join.
//!
//! # Architecture
//!
//! - [`junction`]: endpoint bookkeeping and the connect/disconnect primitives
//!   (`disconnect_all`, `disconnect_node`, `disconnect_channel`).
//! - [`node`]: node kinds and per-node slots.
//! - [`source`]: the start/stop state machine of scheduled sources.
//! - `processing`: [`AudioGraph`], which composes the primitives into the
//!   [`Disconnect`] forms and runs the tick-deduplicated pull.
//! - `snapshot`: JSON rendering for assertions.
//!
//! The graph is not public-constructible from outside the crate in any useful
//! way; nodes are minted by [`AudioContext`](crate::AudioContext), which owns
//! exactly one graph.

pub mod junction;
pub mod node;
pub mod param;
mod processing;
mod snapshot;
pub mod source;

pub use junction::{Anchor, Junction, JunctionId};
pub use node::{NodeId, NodeKind, OscillatorType};
pub use param::ParamId;
pub use processing::{AudioGraph, Disconnect, ProcessPass};
pub use snapshot::MAX_SNAPSHOT_DEPTH;
pub use source::{PlaybackState, Schedule};
