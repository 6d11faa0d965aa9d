use crate::types::Overrides;

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub step_id: String,
    pub overrides: Option<Overrides>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineState {
    pub step_id: String,
    pub history: Vec<HistoryEntry>,
    pub overrides: Option<Overrides>,
    pub is_playing: bool,
    pub flash_error: bool,
    pub show_zones: bool,
    pub show_arrows: bool,
}

impl EngineState {
    pub fn new(step_id: String) -> Self {
        Self {
            step_id,
            history: Vec::new(),
            overrides: None,
            is_playing: false,
            flash_error: false,
            show_zones: false,
            show_arrows: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineAction {
    Init(String),
    Next(String),
    Prev,
    Interaction {
        next_step_id: String,
        overrides: Overrides,
    },
    Error,
    ClearError,
    TogglePlay,
    StopPlay,
    SetZones(bool),
    SetArrows(bool),
}

/// Single transition function for playback; history entries are plain
/// snapshots, so `Prev` restores exactly what `Next`/`Interaction` saved.
pub fn reduce(state: &EngineState, action: EngineAction) -> EngineState {
    let mut next = state.clone();
    match action {
        EngineAction::Init(step_id) => {
            next.step_id = step_id;
            next.history.clear();
            next.overrides = None;
            next.is_playing = false;
        }
        EngineAction::Next(step_id) => {
            next.history.push(snapshot(state));
            next.step_id = step_id;
            next.overrides = None;
        }
        EngineAction::Prev => {
            let Some(previous) = next.history.pop() else {
                return next;
            };
            next.step_id = previous.step_id;
            next.overrides = previous.overrides;
            next.is_playing = false;
        }
        EngineAction::Interaction {
            next_step_id,
            overrides,
        } => {
            next.history.push(snapshot(state));
            next.step_id = next_step_id;
            next.overrides = Some(overrides);
            next.is_playing = false;
        }
        EngineAction::Error => {
            next.flash_error = true;
            next.is_playing = false;
        }
        EngineAction::ClearError => next.flash_error = false,
        EngineAction::TogglePlay => next.is_playing = !state.is_playing,
        EngineAction::StopPlay => next.is_playing = false,
        EngineAction::SetZones(value) => next.show_zones = value,
        EngineAction::SetArrows(value) => next.show_arrows = value,
    }
    next
}

fn snapshot(state: &EngineState) -> HistoryEntry {
    HistoryEntry {
        step_id: state.step_id.clone(),
        overrides: state.overrides.clone(),
    }
}
