//! Turns raw (possibly legacy) tactic documents into canonical [`Tactic`]s.
//!
//! Older documents listed players as bare id strings, spelled the away team
//! `opponent`, and stored the ball inside each step's position map under the
//! reserved `BALL` id. Canonical input passes through unchanged.

use std::collections::HashSet;

use log::warn;
use serde_json::{Map, Value};

use crate::constants::PRIMARY_BALL_ID;
use crate::error::{Result, TacticError};
use crate::types::{Ball, Coordinate, Player, PlayerPositions, Step, Tactic, Team, Zone};

pub fn normalize(raw: &Value) -> Result<Tactic> {
    let Some(object) = raw.as_object() else {
        return Err(TacticError::InvalidFile("document is not an object".to_string()));
    };
    let Some(raw_steps) = object.get("steps").and_then(Value::as_array) else {
        return Err(TacticError::InvalidFile("document has no step list".to_string()));
    };
    if raw_steps.is_empty() {
        return Err(TacticError::InvalidFile("document has no steps".to_string()));
    }

    let players = normalize_players(object.get("players"));

    let mut seen_steps = HashSet::new();
    let mut steps = Vec::with_capacity(raw_steps.len());
    for (index, raw_step) in raw_steps.iter().enumerate() {
        let step = normalize_step(index, raw_step)?;
        if !seen_steps.insert(step.id.clone()) {
            return Err(TacticError::InvalidFile(format!(
                "duplicate step id \"{}\"",
                step.id
            )));
        }
        steps.push(step);
    }

    Ok(Tactic {
        id: string_field(object, "id").unwrap_or_default(),
        category: string_field(object, "category").unwrap_or_default(),
        name: string_field(object, "name").unwrap_or_default(),
        description: string_field(object, "description").unwrap_or_default(),
        players,
        steps,
    })
}

fn normalize_players(raw: Option<&Value>) -> Vec<Player> {
    let Some(entries) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut players = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(player) = normalize_player(entry) else {
            continue;
        };
        if !seen.insert(player.id.clone()) {
            warn!("[normalizer] skipping duplicate player id {}", player.id);
            continue;
        }
        players.push(player);
    }
    players
}

fn normalize_player(entry: &Value) -> Option<Player> {
    if let Some(id) = entry.as_str() {
        if id == PRIMARY_BALL_ID {
            return None;
        }
        let away = id.starts_with('O');
        let name = if away && id.len() > 1 { &id[1..] } else { id };
        return Some(Player {
            id: id.to_string(),
            name: name.to_string(),
            team: if away { Team::Away } else { Team::Home },
        });
    }

    let Some(record) = entry.as_object() else {
        warn!("[normalizer] skipping player entry that is neither a string nor a record");
        return None;
    };
    let raw_team = record.get("team").and_then(Value::as_str);
    if raw_team == Some("ball") {
        return None;
    }
    let Some(id) = string_field(record, "id") else {
        warn!("[normalizer] skipping player record without an id");
        return None;
    };
    if id == PRIMARY_BALL_ID {
        return None;
    }
    let team = match raw_team {
        Some("opponent") | Some("away") => Team::Away,
        _ => Team::Home,
    };
    let name = string_field(record, "name").unwrap_or_else(|| id.clone());
    Some(Player { id, name, team })
}

fn normalize_step(index: usize, raw: &Value) -> Result<Step> {
    let Some(object) = raw.as_object() else {
        return Err(TacticError::InvalidFile(format!(
            "step #{index} is not an object"
        )));
    };
    let Some(id) = string_field(object, "id") else {
        return Err(TacticError::InvalidFile(format!("step #{index} has no id")));
    };

    let mut positions = PlayerPositions::new();
    if let Some(entries) = object.get("positions").and_then(Value::as_object) {
        for (player_id, value) in entries {
            match coordinate(value) {
                Some(position) => {
                    positions.insert(player_id.clone(), position);
                }
                None => warn!(
                    "[normalizer] step {id}: skipping unusable position for {player_id}"
                ),
            }
        }
    }

    let mut balls: Vec<Ball> = object
        .get("balls")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(ball).collect())
        .unwrap_or_default();

    if let Some(inline_ball) = positions.remove(PRIMARY_BALL_ID) {
        if !balls.iter().any(|ball| ball.id == PRIMARY_BALL_ID) {
            balls.push(Ball {
                id: PRIMARY_BALL_ID.to_string(),
                position: inline_ball,
                color: None,
            });
        }
    }

    let zones = object
        .get("zones")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(zone_index, value)| zone(index, zone_index, value))
                .collect()
        })
        .unwrap_or_default();

    Ok(Step {
        label: string_field(object, "label").unwrap_or_default(),
        description: string_field(object, "description"),
        positions,
        balls,
        zones,
        default_next_step_id: reference_field(object, "defaultNextStepId"),
        id,
    })
}

fn ball(value: &Value) -> Option<Ball> {
    let object = value.as_object()?;
    let id = string_field(object, "id")?;
    let position = coordinate(object.get("position")?)?;
    Some(Ball {
        id,
        position,
        color: string_field(object, "color"),
    })
}

fn zone(step_index: usize, zone_index: usize, value: &Value) -> Option<Zone> {
    let Some(object) = value.as_object() else {
        warn!("[normalizer] step #{step_index}: skipping zone that is not an object");
        return None;
    };
    let points = object
        .get("points")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(coordinate).collect())
        .unwrap_or_default();

    Some(Zone {
        id: string_field(object, "id")
            .unwrap_or_else(|| format!("zone-{step_index}-{zone_index}")),
        points,
        color: string_field(object, "color"),
        border_color: string_field(object, "borderColor"),
        responsible_player_id: reference_field(object, "responsiblePlayerId"),
        target_step_id: reference_field(object, "targetStepId"),
    })
}

fn coordinate(value: &Value) -> Option<Coordinate> {
    let object = value.as_object()?;
    let x = object.get("x")?.as_f64()?;
    let y = object.get("y")?.as_f64()?;
    Some(Coordinate { x, y })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn reference_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    string_field(object, key).filter(|value| !value.is_empty())
}
