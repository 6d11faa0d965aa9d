use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub type PlayerPositions = BTreeMap<String, Coordinate>;

/// Percentage-of-court position: x from the left edge, y from the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Home,
    Away,
}

impl Team {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "home" => Some(Self::Home),
            "away" => Some(Self::Away),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team: Team,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: String,
    pub position: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub points: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Weak reference into the roster; a missing player means "no actor".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_player_id: Option<String>,
    /// Weak reference to another step; without it the zone never transitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_step_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub positions: PlayerPositions,
    #[serde(default)]
    pub balls: Vec<Ball>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_next_step_id: Option<String>,
}

/// The top-level document. Every editing operation in [`crate::model`]
/// borrows it immutably and hands back a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tactic {
    pub id: String,
    pub category: String,
    pub name: String,
    pub description: String,
    pub players: Vec<Player>,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    pub positions: PlayerPositions,
    pub balls: Vec<Ball>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResult {
    pub is_valid: bool,
    pub next_step_id: Option<String>,
    pub overrides: Option<Overrides>,
}

impl InteractionResult {
    pub fn invalid() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Client-pixel box of the court element on the rendering surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MetadataPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial step update. Double options separate "leave as is" (outer `None`)
/// from "clear" (`Some(None)`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub positions: Option<PlayerPositions>,
    #[serde(default)]
    pub balls: Option<Vec<Ball>>,
    #[serde(default)]
    pub zones: Option<Vec<Zone>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub default_next_step_id: Option<Option<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePatch {
    #[serde(default)]
    pub points: Option<Vec<Coordinate>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub border_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub responsible_player_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub target_step_id: Option<Option<String>>,
}

fn patch_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackView {
    pub tactic_id: String,
    pub players: Vec<Player>,
    pub current_step: Option<Step>,
    pub next_step: Option<Step>,
    pub step_index: Option<usize>,
    pub step_count: usize,
    pub can_go_back: bool,
    pub is_playing: bool,
    pub flash_error: bool,
    pub show_zones: bool,
    pub show_arrows: bool,
    pub has_zones: bool,
    pub animation_speed_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TacticCategory {
    pub name: String,
    pub tactics: Vec<Tactic>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryResponse {
    pub generated_at_iso: String,
    pub categories: Vec<TacticCategory>,
}
