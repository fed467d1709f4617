//! Headless stand-in for the windowing host.
//!
//! Drives a [`Session`] from a virtual clock: every scheduler tick pumps the
//! eject timers once, every frame interval delivers the next scripted key and
//! renders into a [`CommandRecorder`].

use std::time::Duration;

use desk_scene_core::{
    AnimationPhase, CommandRecorder, FrameHandler, Key, KeyOutcome, PlaybackClock, Result,
    SceneError, Session, TransformState,
};

/// Summary of a headless run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub frames: u64,
    pub timer_ticks: u64,
    pub rejected_keys: u64,
    pub terminated: bool,
    pub elapsed: Duration,
    pub final_state: TransformState,
}

#[derive(Debug)]
pub struct HeadlessHost {
    clock: PlaybackClock,
    frame_interval: Duration,
    timer_resolution: Duration,
    max_frames: u64,
}

impl HeadlessHost {
    pub fn new(fps: u32, max_frames: u64) -> Self {
        let fps = fps.max(1);
        Self {
            clock: PlaybackClock::new(),
            frame_interval: Duration::from_secs(1) / fps,
            timer_resolution: Duration::from_millis(1),
            max_frames,
        }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Plays `keys` one per frame and keeps rendering until the script is
    /// used up and the eject sequence is idle.
    pub fn run(
        &mut self,
        session: &mut Session,
        gfx: &mut CommandRecorder,
        keys: &[Key],
    ) -> Result<RunReport> {
        let mut pending = keys.iter().copied();
        let mut script_done = keys.is_empty();
        let mut report = RunReport {
            frames: 0,
            timer_ticks: 0,
            rejected_keys: 0,
            terminated: false,
            elapsed: Duration::ZERO,
            final_state: *session.transform(),
        };
        let mut next_frame = self.clock.now();

        while report.frames < self.max_frames {
            let now = self.clock.now();
            if session.pump_timers(now) {
                report.timer_ticks += 1;
            }

            if now >= next_frame {
                if let Some(key) = pending.next() {
                    match session.on_key(key, now) {
                        KeyOutcome::Terminate => {
                            tracing::info!("terminate requested");
                            report.terminated = true;
                            break;
                        }
                        KeyOutcome::Rejected => report.rejected_keys += 1,
                        _ => {}
                    }
                } else {
                    script_done = true;
                }

                session.on_frame(gfx, now);
                if !gfx.is_balanced() {
                    return Err(SceneError::msg(format!(
                        "matrix stack unbalanced after frame {}",
                        report.frames
                    )));
                }
                gfx.take_commands();
                report.frames += 1;
                next_frame = now + self.frame_interval;

                if script_done && session.phase() == AnimationPhase::Idle {
                    break;
                }
            }

            self.clock.advance(self.timer_resolution);
        }

        if report.frames >= self.max_frames {
            tracing::warn!(frames = report.frames, "frame limit reached");
        }
        report.elapsed = self.clock.now();
        report.final_state = *session.transform();
        Ok(report)
    }
}

/// Parses a comma separated key script such as `"c,right,pageup"`.
pub fn parse_keys(script: &str) -> Result<Vec<Key>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::parse::<Key>)
        .collect()
}

/// Parses an `r,g,b` colour with components in `[0, 1]`.
pub fn parse_rgb(text: &str) -> Result<[f32; 3]> {
    let parts = text
        .split(',')
        .map(|part| {
            let value: f32 = part
                .trim()
                .parse()
                .map_err(|_| SceneError::msg(format!("invalid colour component '{part}'")))?;
            if (0.0..=1.0).contains(&value) {
                Ok(value)
            } else {
                Err(SceneError::msg(format!(
                    "colour component {value} is outside [0, 1]"
                )))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    <[f32; 3]>::try_from(parts)
        .map_err(|parts| SceneError::msg(format!("expected 3 components, got {}", parts.len())))
}
