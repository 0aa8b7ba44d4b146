use alloc::string::String;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    /// Not moving, also the terminal state of every move
    #[default]
    Idle,
    /// Moving towards a higher position
    Opening,
    /// Moving towards a lower position
    Closing,
}

impl MotionState {
    pub fn is_moving(&self) -> bool {
        !matches!(self, MotionState::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::Idle => "idle",
            MotionState::Opening => "opening",
            MotionState::Closing => "closing",
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurtainStatus {
    /// Curtain identifier
    pub id: Id,
    /// Display name
    pub name: String,
    /// Estimated position (0 = closed, 100 = open)
    pub position: u8,
    /// Target of the move in progress
    pub target_position: Option<u8>,
    /// Current motion
    pub motion_state: MotionState,
    /// Full travel duration in seconds
    pub move_time: u32,
    /// Whether the curtain is fully closed
    pub is_closed: bool,
    /// Time of the last operator position correction
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_manual_update: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPositionRequest {
    /// Target position percentage (0-100)
    pub position: i64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPositionRequest {
    /// Observed position percentage (0-100)
    pub position: i64,
    /// Observation time, defaults to now
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    Open,
    Close,
    Stop,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCodeRequest {
    /// Hexadecimal RF code to replay
    pub code: String,
    /// Which button the code was learned from
    pub code_type: CodeKind,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Operation result message
    pub message: String,
}
