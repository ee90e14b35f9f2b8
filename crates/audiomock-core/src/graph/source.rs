//! Playback schedule for source nodes.
//!
//! ```text
//! UNSCHEDULED --start--> SCHEDULED --now >= start--> PLAYING --now >= end--> FINISHED
//! ```
//!
//! `start` is accepted exactly once. `stop` records an end time that is
//! honored on a later tick. Transitions happen only in [`Schedule::advance()`],
//! called from the owning node's per-tick hook, and a single tick may move a
//! source from `SCHEDULED` through `PLAYING` to `FINISHED`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contract;
use crate::error::GraphError;

/// Lifecycle state of a scheduled source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    /// No start time recorded.
    #[default]
    Unscheduled,
    /// Start time recorded but not yet reached.
    Scheduled,
    /// Between start and end.
    Playing,
    /// Terminal.
    Finished,
}

impl PlaybackState {
    /// Upper-case name used in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unscheduled => "UNSCHEDULED",
            Self::Scheduled => "SCHEDULED",
            Self::Playing => "PLAYING",
            Self::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one [`Schedule::advance()`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    None,
    Started,
    /// Playback ended on this tick; the `ended` event is due.
    Ended,
}

/// Start/stop timeline of one source node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    state: PlaybackState,
    start_time: f64,
    stop_time: Option<f64>,
    offset: f64,
    duration: Option<f64>,
}

impl Schedule {
    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Recorded start time, meaningful once scheduled.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Explicit stop time, if any.
    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    /// Playback offset into the source material, in seconds.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Records a start at `when` playing from `offset` for at most `duration`.
    pub(crate) fn start(
        &mut self,
        method: &str,
        when: f64,
        offset: f64,
        duration: Option<f64>,
    ) -> Result<(), GraphError> {
        if self.state != PlaybackState::Unscheduled {
            return Err(GraphError::invalid_state(
                method,
                format!("cannot start a source in {} state", self.state),
            ));
        }
        contract::check_time(method, "when", when)?;
        contract::check_time(method, "offset", offset)?;
        if let Some(duration) = duration {
            contract::check_time(method, "duration", duration)?;
        }
        self.state = PlaybackState::Scheduled;
        self.start_time = when;
        self.offset = offset;
        self.duration = duration;
        Ok(())
    }

    /// Records a stop at `when`; a later `stop` replaces an earlier one.
    pub(crate) fn stop(&mut self, method: &str, when: f64) -> Result<(), GraphError> {
        if matches!(self.state, PlaybackState::Unscheduled | PlaybackState::Finished) {
            return Err(GraphError::invalid_state(
                method,
                format!("cannot stop a source in {} state", self.state),
            ));
        }
        contract::check_time(method, "when", when)?;
        self.stop_time = Some(when);
        Ok(())
    }

    /// Time at which playback ends, or `None` for an open-ended source.
    ///
    /// `natural_length` is the playable length derived from the node (buffer
    /// duration minus offset); the earliest of segment end, natural end and
    /// explicit stop wins.
    pub fn end_time(&self, natural_length: Option<f64>) -> Option<f64> {
        let segment = match (self.duration, natural_length) {
            (Some(d), Some(n)) => Some(d.min(n)),
            (Some(d), None) => Some(d),
            (None, n) => n,
        }
        .map(|len| self.start_time + len);
        match (segment, self.stop_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Applies the transitions due at virtual time `now`.
    pub(crate) fn advance(&mut self, now: f64, natural_length: Option<f64>) -> Transition {
        let mut transition = Transition::None;
        if self.state == PlaybackState::Scheduled && now >= self.start_time {
            self.state = PlaybackState::Playing;
            transition = Transition::Started;
        }
        if self.state == PlaybackState::Playing
            && self.end_time(natural_length).is_some_and(|end| now >= end)
        {
            self.state = PlaybackState::Finished;
            transition = Transition::Ended;
        }
        transition
    }
}
