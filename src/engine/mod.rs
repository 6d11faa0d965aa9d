use log::debug;

use crate::constants::{clamp_animation_speed_ms, ERROR_FLASH_MS, RESUME_PLAY_DELAY_MS};
use crate::types::{Coordinate, InteractionResult, PlaybackView, Step, Tactic};

mod reducer;
mod utils;

pub use self::reducer::{reduce, EngineAction, EngineState, HistoryEntry};
pub use self::utils::now_ms;

use self::utils::{merge_overrides, Deadline};

#[derive(Clone, Debug, PartialEq, Eq)]
struct AutoplayKey {
    next_step_id: String,
    speed_ms: u64,
}

/// Drives which step is shown. Time is injected as wall-clock milliseconds:
/// callers forward pointer/UI events with the current time and call
/// [`PlaybackEngine::tick`] periodically so due timers can fire.
#[derive(Clone, Debug)]
pub struct PlaybackEngine {
    tactic: Tactic,
    state: EngineState,
    animation_speed_ms: u64,

    autoplay: Deadline,
    autoplay_key: Option<AutoplayKey>,
    flash_clear: Deadline,
    resume_play: Deadline,
}

impl PlaybackEngine {
    pub fn new(tactic: Tactic, animation_speed_ms: u64, now_ms: u64) -> Self {
        let first = tactic.first_step_id().unwrap_or_default().to_string();
        let mut engine = Self {
            tactic,
            state: EngineState::new(first),
            animation_speed_ms: clamp_animation_speed_ms(animation_speed_ms),
            autoplay: Deadline::default(),
            autoplay_key: None,
            flash_clear: Deadline::default(),
            resume_play: Deadline::default(),
        };
        engine.sync_autoplay(now_ms);
        engine
    }

    pub fn tactic(&self) -> &Tactic {
        &self.tactic
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn animation_speed_ms(&self) -> u64 {
        self.animation_speed_ms
    }

    /// The current step with any interaction overrides merged in.
    pub fn current_step(&self) -> Option<Step> {
        let step = self.tactic.step(&self.state.step_id)?;
        Some(merge_overrides(step, self.state.overrides.as_ref()))
    }

    pub fn next_step(&self) -> Option<&Step> {
        self.tactic.next_step(&self.state.step_id)
    }

    pub fn init(&mut self, step_id: &str, now_ms: u64) {
        self.resume_play.cancel();
        self.dispatch(EngineAction::Init(step_id.to_string()), now_ms);
    }

    pub fn restart(&mut self, now_ms: u64) {
        let first = self.tactic.first_step_id().unwrap_or_default().to_string();
        self.init(&first, now_ms);
    }

    pub fn advance(&mut self, target_step_id: &str, now_ms: u64) -> bool {
        if self.tactic.step(target_step_id).is_none() {
            debug!("[engine] ignoring advance to unknown step {target_step_id}");
            return false;
        }
        self.dispatch(EngineAction::Next(target_step_id.to_string()), now_ms);
        true
    }

    /// Follows the default successor, if the current step has one.
    pub fn next(&mut self, now_ms: u64) -> bool {
        let Some(next_id) = self.next_step().map(|step| step.id.clone()) else {
            return false;
        };
        self.advance(&next_id, now_ms)
    }

    pub fn back(&mut self, now_ms: u64) {
        self.resume_play.cancel();
        self.dispatch(EngineAction::Prev, now_ms);
    }

    pub fn interact(&mut self, click: Coordinate, now_ms: u64) -> InteractionResult {
        let result = self.tactic.resolve_interaction(&self.state.step_id, click);
        match (&result.next_step_id, &result.overrides) {
            (Some(next_step_id), Some(overrides)) if result.is_valid => {
                self.resume_play.cancel();
                self.dispatch(
                    EngineAction::Interaction {
                        next_step_id: next_step_id.clone(),
                        overrides: overrides.clone(),
                    },
                    now_ms,
                );
            }
            _ => self.dispatch(EngineAction::Error, now_ms),
        }
        result
    }

    /// Pausing or playing. Pressing play at a dead end restarts from the
    /// first step and starts playing after a short delay.
    pub fn toggle_play(&mut self, now_ms: u64) {
        if self.resume_play.is_armed() {
            self.resume_play.cancel();
            return;
        }

        if !self.state.is_playing && self.next_step().is_none() {
            self.restart(now_ms);
            self.resume_play.arm(now_ms + RESUME_PLAY_DELAY_MS);
            return;
        }
        self.dispatch(EngineAction::TogglePlay, now_ms);
    }

    pub fn set_zones(&mut self, value: bool, now_ms: u64) {
        self.dispatch(EngineAction::SetZones(value), now_ms);
    }

    pub fn set_arrows(&mut self, value: bool, now_ms: u64) {
        self.dispatch(EngineAction::SetArrows(value), now_ms);
    }

    pub fn set_speed(&mut self, animation_speed_ms: u64, now_ms: u64) {
        self.animation_speed_ms = clamp_animation_speed_ms(animation_speed_ms);
        self.sync_autoplay(now_ms);
    }

    /// Swaps in an edited tactic, falling back to the first step when the
    /// current one no longer exists.
    pub fn replace_tactic(&mut self, tactic: Tactic, now_ms: u64) {
        self.tactic = tactic;
        if self.tactic.step(&self.state.step_id).is_none() {
            self.restart(now_ms);
        } else {
            self.sync_autoplay(now_ms);
        }
    }

    /// Fires every timer that is due. Returns true when visible state changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        if self.flash_clear.take_due(now_ms) {
            self.dispatch(EngineAction::ClearError, now_ms);
            changed = true;
        }
        if self.resume_play.take_due(now_ms) {
            self.dispatch(EngineAction::TogglePlay, now_ms);
            changed = true;
        }
        if self.autoplay.take_due(now_ms) {
            self.autoplay_key = None;
            changed |= self.next(now_ms);
            self.sync_autoplay(now_ms);
        }
        changed
    }

    /// Earliest pending timer, for callers that sleep between ticks.
    pub fn next_deadline(&self) -> Option<u64> {
        [
            self.autoplay.due_at(),
            self.flash_clear.due_at(),
            self.resume_play.due_at(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn shutdown(&mut self) {
        self.autoplay.cancel();
        self.autoplay_key = None;
        self.flash_clear.cancel();
        self.resume_play.cancel();
        self.state.is_playing = false;
    }

    pub fn view(&self) -> PlaybackView {
        let current_step = self.current_step();
        PlaybackView {
            tactic_id: self.tactic.id.clone(),
            players: self.tactic.players.clone(),
            has_zones: current_step
                .as_ref()
                .map(|step| !step.zones.is_empty())
                .unwrap_or(false),
            current_step,
            next_step: self.next_step().cloned(),
            step_index: self.tactic.step_index(&self.state.step_id),
            step_count: self.tactic.steps.len(),
            can_go_back: !self.state.history.is_empty(),
            is_playing: self.state.is_playing,
            flash_error: self.state.flash_error,
            show_zones: self.state.show_zones,
            show_arrows: self.state.show_arrows,
            animation_speed_ms: self.animation_speed_ms,
        }
    }

    fn dispatch(&mut self, action: EngineAction, now_ms: u64) {
        debug!("[engine] {action:?} at step {}", self.state.step_id);
        let was_flashing = self.state.flash_error;
        self.state = reduce(&self.state, action);

        if self.state.flash_error && !was_flashing {
            self.flash_clear.arm(now_ms + ERROR_FLASH_MS);
        } else if !self.state.flash_error {
            self.flash_clear.cancel();
        }
        self.sync_autoplay(now_ms);
    }

    /// Keeps the autoplay timer consistent with play state, successor and
    /// speed; a dead end stops playback instead of erroring.
    fn sync_autoplay(&mut self, now_ms: u64) {
        if !self.state.is_playing {
            self.autoplay.cancel();
            self.autoplay_key = None;
            return;
        }

        let Some(next_step_id) = self.next_step().map(|step| step.id.clone()) else {
            self.autoplay.cancel();
            self.autoplay_key = None;
            self.state = reduce(&self.state, EngineAction::StopPlay);
            return;
        };

        let key = AutoplayKey {
            next_step_id,
            speed_ms: self.animation_speed_ms,
        };
        if self.autoplay_key.as_ref() != Some(&key) || !self.autoplay.is_armed() {
            self.autoplay.arm(now_ms + self.animation_speed_ms);
            self.autoplay_key = Some(key);
        }
    }
}
