//! Editing controller: a reducer over [`EditorState`] driven by
//! [`EditorAction`]s coming from the rendering boundary.
//!
//! Failed actions never touch the tactic. The error message becomes the
//! visible `notice` and the previous document stays in place.

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::geometry::{bounding_box, pointer_delta_percent, resize, screen_to_canvas, ResizeHandle};
use crate::library::new_blank;
use crate::normalizer::normalize;
use crate::types::{
    ContainerBounds, Coordinate, MetadataPatch, Rect, Step, StepPatch, Tactic, Team, ZonePatch,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Player,
    Zone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub kind: SelectionKind,
    pub id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Player,
    Ball,
}

/// The one pointer gesture in progress, if any.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DragGesture {
    Zone {
        zone_id: String,
        handle: ResizeHandle,
        start: (f64, f64),
        initial: Rect,
    },
    Piece {
        piece: PieceKind,
        id: String,
        last: Option<Coordinate>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub tactic: Option<Tactic>,
    pub active_step_id: Option<String>,
    pub selection: Option<Selection>,
    pub notice: Option<String>,
    pub drag: Option<DragGesture>,
}

impl EditorState {
    pub fn with_tactic(tactic: Tactic) -> Self {
        let active_step_id = tactic.first_step_id().map(str::to_string);
        Self {
            tactic: Some(tactic),
            active_step_id,
            ..Self::default()
        }
    }

    pub fn active_step(&self) -> Option<&Step> {
        let tactic = self.tactic.as_ref()?;
        tactic.step(self.active_step_id.as_deref()?)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EditorAction {
    /// Loads a raw document, or closes the editor when `document` is absent.
    Init {
        #[serde(default)]
        document: Option<Value>,
    },
    NewBlank,
    UpdateMetadata(MetadataPatch),
    SelectStep {
        step_id: String,
    },
    AddPlayer {
        id: String,
        name: String,
        team: Team,
    },
    RenamePlayer {
        old_id: String,
        new_id: String,
        name: String,
    },
    SetPlayerTeam {
        id: String,
        team: Team,
    },
    RemovePlayer {
        id: String,
    },
    AddStep,
    RemoveStep,
    UpdateStep(StepPatch),
    MovePlayer {
        player_id: String,
        position: Coordinate,
    },
    MoveBall {
        ball_id: String,
        position: Coordinate,
    },
    Select {
        #[serde(default)]
        selection: Option<Selection>,
    },
    AddZone,
    RemoveZone {
        zone_id: String,
    },
    UpdateZone {
        zone_id: String,
        patch: ZonePatch,
    },
    BeginZoneDrag {
        zone_id: String,
        handle: ResizeHandle,
        client_x: f64,
        client_y: f64,
    },
    BeginPieceDrag {
        piece: PieceKind,
        id: String,
    },
    DragMove {
        client_x: f64,
        client_y: f64,
        bounds: ContainerBounds,
    },
    DragEnd,
}

pub fn reduce(state: &EditorState, action: EditorAction) -> EditorState {
    let releases_drag = matches!(action, EditorAction::DragEnd);
    let mut next = state.clone();
    match apply(&mut next, action) {
        Ok(()) => {
            next.notice = None;
            next
        }
        Err(error) => {
            warn!("[editor] {error}");
            let mut failed = state.clone();
            failed.notice = Some(error.to_string());
            if releases_drag {
                failed.drag = None;
            }
            failed
        }
    }
}

fn apply(state: &mut EditorState, action: EditorAction) -> Result<()> {
    match action {
        EditorAction::Init { document: None } => {
            *state = EditorState::default();
            return Ok(());
        }
        EditorAction::Init {
            document: Some(document),
        } => {
            *state = EditorState::with_tactic(normalize(&document)?);
            return Ok(());
        }
        EditorAction::NewBlank => {
            *state = EditorState::with_tactic(new_blank(Utc::now().timestamp_millis()));
            return Ok(());
        }
        _ => {}
    }

    let Some(tactic) = state.tactic.clone() else {
        return Ok(());
    };
    let active = state
        .active_step_id
        .clone()
        .filter(|step_id| tactic.step(step_id).is_some())
        .or_else(|| tactic.first_step_id().map(str::to_string))
        .unwrap_or_default();
    state.active_step_id = Some(active.clone());

    match action {
        EditorAction::Init { .. } | EditorAction::NewBlank => {}
        EditorAction::UpdateMetadata(patch) => {
            state.tactic = Some(tactic.update_metadata(&patch));
        }
        EditorAction::SelectStep { step_id } => {
            if tactic.step(&step_id).is_some() && step_id != active {
                state.active_step_id = Some(step_id);
                state.selection = None;
                state.drag = None;
            }
        }
        EditorAction::AddPlayer { id, name, team } => {
            state.tactic = Some(tactic.add_player(&id, &name, team)?);
        }
        EditorAction::RenamePlayer { old_id, new_id, name } => {
            state.tactic = Some(tactic.rename_player(&old_id, &new_id, &name)?);
            clear_selection_of(state, SelectionKind::Player, &old_id);
        }
        EditorAction::SetPlayerTeam { id, team } => {
            state.tactic = Some(tactic.set_player_team(&id, team));
        }
        EditorAction::RemovePlayer { id } => {
            state.tactic = Some(tactic.remove_player(&id));
            clear_selection_of(state, SelectionKind::Player, &id);
        }
        EditorAction::AddStep => {
            let (next, new_id) = tactic.add_step(&active)?;
            state.tactic = Some(next);
            state.active_step_id = Some(new_id);
            state.selection = None;
        }
        EditorAction::RemoveStep => {
            let (next, new_active) = tactic.remove_step(&active)?;
            state.tactic = Some(next);
            state.active_step_id = Some(new_active);
            state.selection = None;
            state.drag = None;
        }
        EditorAction::UpdateStep(patch) => {
            state.tactic = Some(tactic.update_step(&active, &patch)?);
        }
        EditorAction::MovePlayer { player_id, position } => {
            state.tactic = Some(tactic.move_player(&active, &player_id, position)?);
        }
        EditorAction::MoveBall { ball_id, position } => {
            state.tactic = Some(tactic.move_ball(&active, &ball_id, position)?);
        }
        EditorAction::Select { selection } => state.selection = selection,
        EditorAction::AddZone => {
            let (next, zone_id) = tactic.add_zone(&active)?;
            state.tactic = Some(next);
            state.selection = Some(Selection {
                kind: SelectionKind::Zone,
                id: zone_id,
            });
        }
        EditorAction::RemoveZone { zone_id } => {
            state.tactic = Some(tactic.remove_zone(&active, &zone_id)?);
            clear_selection_of(state, SelectionKind::Zone, &zone_id);
        }
        EditorAction::UpdateZone { zone_id, patch } => {
            state.tactic = Some(tactic.update_zone(&active, &zone_id, &patch)?);
        }
        EditorAction::BeginZoneDrag {
            zone_id,
            handle,
            client_x,
            client_y,
        } => {
            let zone = tactic
                .step(&active)
                .and_then(|step| step.zones.iter().find(|zone| zone.id == zone_id));
            state.drag = zone.map(|zone| DragGesture::Zone {
                zone_id: zone.id.clone(),
                handle,
                start: (client_x, client_y),
                initial: bounding_box(&zone.points),
            });
            if state.drag.is_some() {
                state.selection = Some(Selection {
                    kind: SelectionKind::Zone,
                    id: zone_id,
                });
            }
        }
        EditorAction::BeginPieceDrag { piece, id } => {
            state.drag = Some(DragGesture::Piece {
                piece,
                id,
                last: None,
            });
        }
        EditorAction::DragMove {
            client_x,
            client_y,
            bounds,
        } => match state.drag.as_mut() {
            Some(DragGesture::Zone {
                zone_id,
                handle,
                start,
                initial,
            }) => {
                let (dx, dy) = pointer_delta_percent(*start, (client_x, client_y), bounds);
                let patch = ZonePatch {
                    points: Some(resize(*initial, *handle, dx, dy)),
                    ..ZonePatch::default()
                };
                state.tactic = Some(tactic.update_zone(&active, zone_id, &patch)?);
            }
            Some(DragGesture::Piece { last, .. }) => {
                *last = Some(screen_to_canvas(client_x, client_y, bounds));
            }
            None => {}
        },
        EditorAction::DragEnd => {
            if let Some(DragGesture::Piece {
                piece,
                id,
                last: Some(position),
            }) = state.drag.take()
            {
                let next = match piece {
                    PieceKind::Player => tactic.move_player(&active, &id, position)?,
                    PieceKind::Ball => tactic.move_ball(&active, &id, position)?,
                };
                state.tactic = Some(next);
            }
        }
    }
    Ok(())
}

fn clear_selection_of(state: &mut EditorState, kind: SelectionKind, id: &str) {
    if state
        .selection
        .as_ref()
        .is_some_and(|selection| selection.kind == kind && selection.id == id)
    {
        state.selection = None;
    }
}
