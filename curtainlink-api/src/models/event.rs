use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{CurtainStatus, Id};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A move started and the direction changed
    StateChanged,
    /// Interpolation tick
    Progress,
    /// The move ran to its end and snapped to the target
    Completed,
    /// Stopped on request
    Stopped,
    /// Superseded by another move or torn down
    Cancelled,
    /// The direction code could not be delivered
    Failed,
    /// Position overwritten by an operator
    Synced,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StateChanged => "state_changed",
            EventKind::Progress => "progress",
            EventKind::Completed => "completed",
            EventKind::Stopped => "stopped",
            EventKind::Cancelled => "cancelled",
            EventKind::Failed => "failed",
            EventKind::Synced => "synced",
        }
    }

    /// Whether the event leaves state worth persisting
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventKind::StateChanged | EventKind::Progress)
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurtainEvent {
    /// Curtain the event belongs to
    pub curtain_id: Id,
    /// What happened
    pub kind: EventKind,
    /// Snapshot taken right after the change
    pub status: CurtainStatus,
    /// Emission time
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}
