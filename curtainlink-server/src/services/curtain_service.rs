use std::sync::Arc;
use std::time::Duration;

use curtainlink_api::{CurtainEvent, CurtainStatus, EventKind, Id, MotionState, POSITION_CLOSED, POSITION_OPEN};
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

use crate::configs::CurtainProfile;
use crate::errors::CurtainError;
use crate::services::{EventBus, TransmitterClient};

/// Interpolation cadence of a running move.
pub const TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurtainRuntimeState {
    /// Estimated position, 0 = closed, 100 = open
    pub position: u8,
    pub motion_state: MotionState,
    /// Present only while a move is active
    pub target_position: Option<u8>,
    pub last_manual_update: Option<OffsetDateTime>,
}

struct MoveTask {
    cancel: oneshot::Sender<()>,
    /// Resolves to `true` when the move was interrupted before reaching its target
    handle: JoinHandle<bool>,
}

impl MoveTask {
    /// Signals the task and waits until it has fully unwound.
    ///
    /// Returns whether the move was interrupted. A task that already finished,
    /// or that is busy finalizing, runs to completion and reports `false`.
    async fn cancel(self) -> bool {
        let _ = self.cancel.send(());
        matches!(self.handle.await, Ok(true))
    }
}

struct Inner {
    id: Id,
    profile: CurtainProfile,
    state: RwLock<CurtainRuntimeState>,
    /// Held by every command for its whole duration, so commands never interleave.
    move_slot: Mutex<Option<MoveTask>>,
    transmitter: Arc<TransmitterClient>,
    events: EventBus,
}

/// Open-loop position controller for one curtain.
#[derive(Clone)]
pub struct CurtainController {
    inner: Arc<Inner>,
}

impl CurtainController {
    pub fn new(
        id: Id,
        profile: CurtainProfile,
        transmitter: Arc<TransmitterClient>,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                profile,
                state: RwLock::new(CurtainRuntimeState::default()),
                move_slot: Mutex::new(None),
                transmitter,
                events,
            }),
        }
    }

    pub fn id(&self) -> Id {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.profile.name
    }

    pub fn profile(&self) -> &CurtainProfile {
        &self.inner.profile
    }

    pub async fn status(&self) -> CurtainStatus {
        let state = self.inner.state.read().await;
        self.snapshot(&state)
    }

    pub async fn runtime_state(&self) -> CurtainRuntimeState {
        self.inner.state.read().await.clone()
    }

    /// Seeds the estimate from persisted state. Emits nothing.
    pub async fn restore(&self, position: u8, last_manual_update: Option<OffsetDateTime>) {
        let mut state = self.inner.state.write().await;
        state.position = position.min(POSITION_OPEN);
        state.last_manual_update = last_manual_update;
    }

    pub async fn open(&self) -> Result<(), CurtainError> {
        self.set_position(POSITION_OPEN as i64).await
    }

    pub async fn close(&self) -> Result<(), CurtainError> {
        self.set_position(POSITION_CLOSED as i64).await
    }

    /// Starts a move towards `target` and returns once the direction code is delivered.
    ///
    /// The command runs on its own task: dropping the returned future does not
    /// abandon a transmit or leave the curtain marked as moving.
    pub async fn set_position(&self, target: i64) -> Result<(), CurtainError> {
        let target = validate_position(target)?;
        let controller = self.clone();

        run_detached(async move { controller.move_to(target).await }).await?
    }

    /// Halts any move in progress. Does nothing while idle.
    pub async fn stop(&self) {
        let controller = self.clone();

        if let Err(e) = run_detached(async move { controller.halt().await }).await {
            tracing::error!(curtain = self.name(), "stop did not finish: {}", e);
        }
    }

    /// Cancels the active move before the controller goes away.
    pub async fn shutdown(&self) {
        let controller = self.clone();

        if let Err(e) = run_detached(async move { controller.tear_down().await }).await {
            tracing::error!(curtain = self.name(), "shutdown did not finish: {}", e);
        }
    }

    async fn move_to(&self, target: u8) -> Result<(), CurtainError> {
        let mut slot = self.inner.move_slot.lock().await;

        if self.inner.state.read().await.position == target {
            tracing::debug!(curtain = self.name(), target, "already at target");
            return Ok(());
        }

        if let Some(task) = slot.take() {
            if task.cancel().await {
                let status = self.finish(EventKind::Cancelled).await;
                tracing::info!(curtain = self.name(), position = status.position, "move superseded");

                if status.position == target {
                    self.send_stop().await;
                    return Ok(());
                }
            }
        }

        let start = self.inner.state.read().await.position;
        let delta = start.abs_diff(target);
        let direction = if target > start {
            MotionState::Opening
        } else {
            MotionState::Closing
        };
        let duration = self.inner.profile.full_travel() * delta as u32 / 100;

        self.update(EventKind::StateChanged, |state| {
            state.motion_state = direction;
            state.target_position = Some(target);
        })
        .await;
        tracing::info!(
            curtain = self.name(),
            start,
            target,
            delta,
            duration = ?duration,
            "starting {} move",
            direction.as_str()
        );

        let code = match direction {
            MotionState::Opening => &self.inner.profile.open_code,
            _ => &self.inner.profile.close_code,
        };
        if let Err(e) = self.inner.transmitter.send_code(code).await {
            tracing::error!(curtain = self.name(), "failed to send {} code: {}", direction.as_str(), e);
            self.finish(EventKind::Failed).await;
            return Err(e.into());
        }

        let (cancel, cancelled) = oneshot::channel();
        let handle = tokio::spawn(self.clone().run_move(start, target, duration, cancelled));
        *slot = Some(MoveTask { cancel, handle });

        Ok(())
    }

    async fn halt(&self) {
        let mut slot = self.inner.move_slot.lock().await;

        let interrupted = match slot.take() {
            Some(task) => task.cancel().await,
            None => false,
        };
        if !interrupted {
            tracing::debug!(curtain = self.name(), "stop ignored, curtain is idle");
            return;
        }

        self.send_stop().await;
        let status = self.finish(EventKind::Stopped).await;
        tracing::info!(curtain = self.name(), position = status.position, "stopped");
    }

    /// Overwrites the estimate with an observed position.
    ///
    /// A running move is neither cancelled nor awaited, its next tick may overwrite this value.
    pub async fn apply_manual_sync(
        &self,
        position: i64,
        timestamp: OffsetDateTime,
    ) -> Result<CurtainStatus, CurtainError> {
        let position = validate_position(position)?;

        let status = self
            .update(EventKind::Synced, |state| {
                state.position = position;
                state.last_manual_update = Some(timestamp);
            })
            .await;
        tracing::info!(curtain = self.name(), position, "position synced manually");

        Ok(status)
    }

    async fn tear_down(&self) {
        let mut slot = self.inner.move_slot.lock().await;

        if let Some(task) = slot.take() {
            if task.cancel().await {
                self.send_stop().await;
                self.finish(EventKind::Cancelled).await;
                tracing::info!(curtain = self.name(), "move cancelled on shutdown");
            }
        }
    }

    async fn run_move(
        self,
        start: u8,
        target: u8,
        duration: Duration,
        mut cancelled: oneshot::Receiver<()>,
    ) -> bool {
        let started = Instant::now();
        let delta = start.abs_diff(target) as f64;

        loop {
            let elapsed = started.elapsed();
            if elapsed >= duration {
                break;
            }

            tokio::select! {
                biased;
                _ = &mut cancelled => {
                    tracing::debug!(curtain = self.name(), "move task cancelled");
                    return true;
                }
                _ = sleep((duration - elapsed).min(TICK)) => {}
            }

            let progress = (started.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0);
            let step = (delta * progress).round() as i16;
            let position = if target > start {
                start as i16 + step
            } else {
                start as i16 - step
            }
            .clamp(POSITION_CLOSED as i16, POSITION_OPEN as i16) as u8;

            self.update(EventKind::Progress, |state| state.position = position)
                .await;
            tracing::debug!(curtain = self.name(), position, progress, "tick");
        }

        self.send_stop().await;
        self.update(EventKind::Completed, |state| {
            state.position = target;
            state.motion_state = MotionState::Idle;
            state.target_position = None;
        })
        .await;
        tracing::info!(curtain = self.name(), position = target, "move completed");

        false
    }

    /// Best effort, the motor may already be stationary.
    async fn send_stop(&self) {
        if let Err(e) = self.inner.transmitter.send_code(&self.inner.profile.stop_code).await {
            tracing::warn!(curtain = self.name(), "failed to send stop code: {}", e);
        }
    }

    async fn finish(&self, kind: EventKind) -> CurtainStatus {
        self.update(kind, |state| {
            state.motion_state = MotionState::Idle;
            state.target_position = None;
        })
        .await
    }

    /// Mutates the state and publishes the result under the same lock, keeping events ordered.
    async fn update(
        &self,
        kind: EventKind,
        mutate: impl FnOnce(&mut CurtainRuntimeState),
    ) -> CurtainStatus {
        let mut state = self.inner.state.write().await;
        mutate(&mut state);

        let status = self.snapshot(&state);
        self.inner.events.publish(CurtainEvent {
            curtain_id: self.inner.id,
            kind,
            status: status.clone(),
            timestamp: OffsetDateTime::now_utc(),
        });

        status
    }

    fn snapshot(&self, state: &CurtainRuntimeState) -> CurtainStatus {
        CurtainStatus {
            id: self.inner.id,
            name: self.inner.profile.name.clone(),
            position: state.position,
            target_position: state.target_position,
            motion_state: state.motion_state,
            move_time: self.inner.profile.move_time,
            is_closed: state.position == POSITION_CLOSED,
            last_manual_update: state.last_manual_update,
        }
    }
}

/// Runs a command on its own task so it always completes once started.
async fn run_detached<T>(command: impl Future<Output = T> + Send + 'static) -> Result<T, CurtainError>
where
    T: Send + 'static,
{
    tokio::spawn(command).await.map_err(|e| {
        if e.is_panic() {
            std::panic::resume_unwind(e.into_panic());
        }
        CurtainError::Interrupted
    })
}

pub fn validate_position(position: i64) -> Result<u8, CurtainError> {
    if (POSITION_CLOSED as i64..=POSITION_OPEN as i64).contains(&position) {
        Ok(position as u8)
    } else {
        Err(CurtainError::InvalidPosition(position))
    }
}
