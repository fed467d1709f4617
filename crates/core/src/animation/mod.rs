//! The CD eject sequence.
//!
//! A single state machine walks `Ejecting -> SpinningDown -> Popping ->
//! Closing -> Idle`. Each phase advances on its own fixed period; one
//! [`Scheduler`] is restarted with the next period whenever the phase changes,
//! so only one phase is ever live.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{config::AnimationConfig, timeline::Scheduler, TransformState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationPhase {
    #[default]
    Idle,
    Ejecting,
    SpinningDown,
    Popping,
    Closing,
}

impl AnimationPhase {
    pub fn next(self) -> Self {
        match self {
            AnimationPhase::Idle => AnimationPhase::Idle,
            AnimationPhase::Ejecting => AnimationPhase::SpinningDown,
            AnimationPhase::SpinningDown => AnimationPhase::Popping,
            AnimationPhase::Popping => AnimationPhase::Closing,
            AnimationPhase::Closing => AnimationPhase::Idle,
        }
    }
}

/// What happens when the sequence is triggered while already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetriggerPolicy {
    /// Reset every progress value and eject again from the start.
    #[default]
    Restart,
    /// Leave the running sequence untouched.
    Ignore,
}

/// Progress values written by the sequencer and read by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationRuntime {
    /// How far the tray is pushed out of the drive.
    pub tray_offset: f32,
    /// How far the disk has followed the tray out. It stays out while the
    /// tray closes.
    pub disk_travel: f32,
    pub disk_lift: f32,
    /// Disk rotation in degrees per reference frame.
    pub spin_speed: f32,
}

impl AnimationRuntime {
    pub fn initial(config: &AnimationConfig) -> Self {
        Self {
            tray_offset: 0.0,
            disk_travel: 0.0,
            disk_lift: config.lift_start,
            spin_speed: config.spin_start,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationSequencer {
    config: AnimationConfig,
    phase: AnimationPhase,
    runtime: AnimationRuntime,
    scheduler: Scheduler,
}

impl AnimationSequencer {
    pub fn new(config: AnimationConfig) -> Self {
        let runtime = AnimationRuntime::initial(&config);
        Self {
            config,
            phase: AnimationPhase::Idle,
            runtime,
            scheduler: Scheduler::new(),
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn runtime(&self) -> &AnimationRuntime {
        &self.runtime
    }

    pub fn is_active(&self) -> bool {
        self.phase != AnimationPhase::Idle
    }

    /// Tick period of `phase`, or `None` for idle.
    pub fn period(&self, phase: AnimationPhase) -> Option<Duration> {
        let ms = match phase {
            AnimationPhase::Idle => return None,
            AnimationPhase::Ejecting => self.config.eject_period_ms,
            AnimationPhase::SpinningDown => self.config.spin_down_period_ms,
            AnimationPhase::Popping => self.config.pop_period_ms,
            AnimationPhase::Closing => self.config.close_period_ms,
        };
        Some(Duration::from_millis(ms))
    }

    /// Starts the eject sequence: locks the controls, moves the camera to
    /// the showcase placement and resets all progress.
    ///
    /// Returns `false` only when a sequence is in flight and the retrigger
    /// policy is [`RetriggerPolicy::Ignore`].
    pub fn start(&mut self, state: &mut TransformState, now: Duration) -> bool {
        if self.is_active() && self.config.retrigger == RetriggerPolicy::Ignore {
            tracing::debug!(phase = ?self.phase, "eject already running, trigger ignored");
            return false;
        }
        if self.is_active() {
            tracing::debug!(phase = ?self.phase, "restarting eject sequence");
        }

        let showcase = self.config.showcase;
        state.locked = true;
        state.scene_distance = showcase.scene_distance;
        state.rotation_x = showcase.rotation_x;
        state.rotation_y = showcase.rotation_y;
        state.object_x = showcase.object_x;
        state.object_z = showcase.object_z;

        self.runtime = AnimationRuntime::initial(&self.config);
        self.enter(AnimationPhase::Ejecting, state, now);
        true
    }

    /// Runs one tick of the live phase and moves on when its exit condition
    /// holds. Returns the phase that is live afterwards.
    pub fn step(&mut self, state: &mut TransformState) -> AnimationPhase {
        let c = &self.config;
        let rt = &mut self.runtime;
        let done = match self.phase {
            AnimationPhase::Idle => return AnimationPhase::Idle,
            AnimationPhase::Ejecting => {
                rt.tray_offset += c.tray_step;
                rt.disk_travel += c.tray_step;
                rt.tray_offset >= c.tray_target
            }
            AnimationPhase::SpinningDown => {
                rt.spin_speed -= c.spin_step;
                if rt.spin_speed <= 0.0 {
                    rt.spin_speed = 0.0;
                }
                rt.spin_speed == 0.0
            }
            AnimationPhase::Popping => {
                rt.disk_lift += c.lift_step;
                rt.disk_lift >= c.lift_target
            }
            AnimationPhase::Closing => {
                rt.tray_offset -= c.tray_step;
                if rt.tray_offset <= 0.0 {
                    rt.tray_offset = 0.0;
                }
                rt.tray_offset == 0.0
            }
        };

        if done {
            let next = self.phase.next();
            tracing::debug!(from = ?self.phase, to = ?next, "eject phase complete");
            self.phase = next;
            if next == AnimationPhase::Idle {
                state.locked = false;
            }
        }
        self.phase
    }

    /// Fires the live phase if its period has elapsed. At most one tick runs
    /// per call. Returns whether a tick ran.
    pub fn update(&mut self, now: Duration, state: &mut TransformState) -> bool {
        if !self.scheduler.poll(now) {
            return false;
        }
        let before = self.phase;
        let after = self.step(state);
        if after != before {
            self.enter(after, state, now);
        }
        true
    }

    fn enter(&mut self, phase: AnimationPhase, state: &mut TransformState, now: Duration) {
        self.phase = phase;
        match self.period(phase) {
            Some(period) => self.scheduler.start(period, now),
            None => {
                self.scheduler.stop();
                state.locked = false;
            }
        }
    }
}
