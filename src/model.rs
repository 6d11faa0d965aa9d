//! Editing operations on a [`Tactic`].
//!
//! Every operation takes `&self` and returns a freshly built value, so a
//! controller can keep the previous tactic around untouched (undo, failed
//! actions) while rendering the new one.

use std::collections::{HashSet, VecDeque};

use chrono::Utc;
use serde::Serialize;

use crate::constants::{
    DEFAULT_PLACEMENT, DEFAULT_ZONE_COLOR, DEFAULT_ZONE_POINTS, NEW_STEP_LABEL, PRIMARY_BALL_ID,
};
use crate::error::{Result, TacticError};
use crate::geometry::find_hit_zone;
use crate::types::{
    Ball, Coordinate, InteractionResult, MetadataPatch, Overrides, Player, PlayerPositions, Step,
    StepPatch, Tactic, Team, Zone, ZonePatch,
};

/// An edge that names a step or player the tactic does not contain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DanglingReference {
    DefaultNext {
        step_id: String,
        target_step_id: String,
    },
    ZoneTarget {
        step_id: String,
        zone_id: String,
        target_step_id: String,
    },
    ZoneActor {
        step_id: String,
        zone_id: String,
        player_id: String,
    },
}

impl Tactic {
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    pub fn step_by_index(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn first_step_id(&self) -> Option<&str> {
        self.steps.first().map(|step| step.id.as_str())
    }

    /// The default (autoplay) successor of `step_id`, if it still exists.
    pub fn next_step(&self, step_id: &str) -> Option<&Step> {
        let next_id = self.step(step_id)?.default_next_step_id.as_deref()?;
        self.step(next_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    pub fn update_metadata(&self, patch: &MetadataPatch) -> Tactic {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        next
    }

    pub fn add_player(&self, id: &str, name: &str, team: Team) -> Result<Tactic> {
        if self.has_player(id) {
            return Err(TacticError::DuplicatePlayerId(id.to_string()));
        }

        let mut next = self.clone();
        next.players.push(Player {
            id: id.to_string(),
            name: name.to_string(),
            team,
        });
        for step in &mut next.steps {
            step.positions.insert(id.to_string(), DEFAULT_PLACEMENT);
        }
        Ok(next)
    }

    pub fn rename_player(&self, old_id: &str, new_id: &str, new_name: &str) -> Result<Tactic> {
        if new_id != old_id && self.has_player(new_id) {
            return Err(TacticError::DuplicatePlayerId(new_id.to_string()));
        }

        let mut next = self.clone();
        for player in next.players.iter_mut().filter(|player| player.id == old_id) {
            player.id = new_id.to_string();
            player.name = new_name.to_string();
        }
        for step in &mut next.steps {
            if let Some(position) = step.positions.remove(old_id) {
                step.positions.insert(new_id.to_string(), position);
            }
            for zone in &mut step.zones {
                if zone.responsible_player_id.as_deref() == Some(old_id) {
                    zone.responsible_player_id = Some(new_id.to_string());
                }
            }
        }
        Ok(next)
    }

    pub fn set_player_team(&self, id: &str, team: Team) -> Tactic {
        let mut next = self.clone();
        for player in next.players.iter_mut().filter(|player| player.id == id) {
            player.team = team;
        }
        next
    }

    /// Drops the player everywhere; zones it was responsible for lose their actor.
    pub fn remove_player(&self, id: &str) -> Tactic {
        let mut next = self.clone();
        next.players.retain(|player| player.id != id);
        for step in &mut next.steps {
            step.positions.remove(id);
            for zone in &mut step.zones {
                if zone.responsible_player_id.as_deref() == Some(id) {
                    zone.responsible_player_id = None;
                }
            }
        }
        next
    }

    /// Inserts a copy of `after_step_id` right after it and returns the new id.
    /// The copy keeps positions and balls but starts without zones.
    pub fn add_step(&self, after_step_id: &str) -> Result<(Tactic, String)> {
        let index = self
            .step_index(after_step_id)
            .ok_or_else(|| TacticError::StepNotFound(after_step_id.to_string()))?;

        let new_id = fresh_id("s", |candidate| self.step(candidate).is_some());
        let mut step = self.steps[index].clone();
        step.id = new_id.clone();
        step.label = NEW_STEP_LABEL.to_string();
        step.zones.clear();

        let mut next = self.clone();
        next.steps.insert(index + 1, step);
        Ok((next, new_id))
    }

    /// Removes a step, clears every edge that pointed at it and returns the
    /// step that should become active (the predecessor, or the first step).
    pub fn remove_step(&self, step_id: &str) -> Result<(Tactic, String)> {
        if self.steps.len() <= 1 {
            return Err(TacticError::LastStep);
        }
        let index = self
            .step_index(step_id)
            .ok_or_else(|| TacticError::StepNotFound(step_id.to_string()))?;

        let mut next = self.clone();
        next.steps.remove(index);
        for step in &mut next.steps {
            if step.default_next_step_id.as_deref() == Some(step_id) {
                step.default_next_step_id = None;
            }
            for zone in &mut step.zones {
                if zone.target_step_id.as_deref() == Some(step_id) {
                    zone.target_step_id = None;
                }
            }
        }

        let active_index = index.saturating_sub(1);
        let active_id = next.steps[active_index].id.clone();
        Ok((next, active_id))
    }

    pub fn update_step(&self, step_id: &str, patch: &StepPatch) -> Result<Tactic> {
        self.patch_step(step_id, |step| {
            if let Some(label) = &patch.label {
                step.label = label.clone();
            }
            if let Some(description) = &patch.description {
                step.description = description.clone();
            }
            if let Some(positions) = &patch.positions {
                step.positions = positions.clone();
            }
            if let Some(balls) = &patch.balls {
                step.balls = balls.clone();
            }
            if let Some(zones) = &patch.zones {
                step.zones = zones.clone();
            }
            if let Some(next_id) = &patch.default_next_step_id {
                step.default_next_step_id = non_empty(next_id);
            }
        })
    }

    pub fn move_player(&self, step_id: &str, player_id: &str, position: Coordinate) -> Result<Tactic> {
        self.patch_step(step_id, |step| {
            step.positions.insert(player_id.to_string(), position);
        })
    }

    /// Moves a ball within one step, adding it when the step has no such ball.
    pub fn move_ball(&self, step_id: &str, ball_id: &str, position: Coordinate) -> Result<Tactic> {
        self.patch_step(step_id, |step| {
            match step.balls.iter_mut().find(|ball| ball.id == ball_id) {
                Some(ball) => ball.position = position,
                None => step.balls.push(Ball {
                    id: ball_id.to_string(),
                    position,
                    color: None,
                }),
            }
        })
    }

    /// Appends the default rectangle zone and returns its id.
    pub fn add_zone(&self, step_id: &str) -> Result<(Tactic, String)> {
        let step = self
            .step(step_id)
            .ok_or_else(|| TacticError::StepNotFound(step_id.to_string()))?;
        let zone_id = fresh_id("z", |candidate| {
            step.zones.iter().any(|zone| zone.id == candidate)
        });

        let zone = Zone {
            id: zone_id.clone(),
            points: DEFAULT_ZONE_POINTS.to_vec(),
            color: Some(DEFAULT_ZONE_COLOR.to_string()),
            border_color: None,
            responsible_player_id: None,
            target_step_id: None,
        };
        let next = self.patch_step(step_id, |step| step.zones.push(zone))?;
        Ok((next, zone_id))
    }

    pub fn remove_zone(&self, step_id: &str, zone_id: &str) -> Result<Tactic> {
        self.patch_step(step_id, |step| step.zones.retain(|zone| zone.id != zone_id))
    }

    pub fn update_zone(&self, step_id: &str, zone_id: &str, patch: &ZonePatch) -> Result<Tactic> {
        self.patch_step(step_id, |step| {
            let Some(zone) = step.zones.iter_mut().find(|zone| zone.id == zone_id) else {
                return;
            };
            if let Some(points) = &patch.points {
                zone.points = points.clone();
            }
            if let Some(color) = &patch.color {
                zone.color = non_empty(color);
            }
            if let Some(border_color) = &patch.border_color {
                zone.border_color = non_empty(border_color);
            }
            if let Some(player_id) = &patch.responsible_player_id {
                zone.responsible_player_id = non_empty(player_id);
            }
            if let Some(target) = &patch.target_step_id {
                zone.target_step_id = non_empty(target);
            }
        })
    }

    /// Interprets a click on `step_id`: hitting a zone with a target moves the
    /// primary ball (and the zone's responsible player) to the click point and
    /// names the step to show next.
    pub fn resolve_interaction(&self, step_id: &str, click: Coordinate) -> InteractionResult {
        let Some(step) = self.step(step_id) else {
            return InteractionResult::invalid();
        };
        if step.zones.is_empty() {
            return InteractionResult::invalid();
        }
        let Some(zone) = find_hit_zone(click, &step.zones) else {
            return InteractionResult::invalid();
        };
        let Some(target) = zone
            .target_step_id
            .clone()
            .filter(|target| self.step(target).is_some())
        else {
            return InteractionResult::invalid();
        };

        let mut positions = PlayerPositions::new();
        if let Some(player_id) = zone.responsible_player_id.as_deref() {
            if self.has_player(player_id) {
                positions.insert(player_id.to_string(), click);
            }
        }
        let balls = vec![Ball {
            id: PRIMARY_BALL_ID.to_string(),
            position: click,
            color: None,
        }];

        InteractionResult {
            is_valid: true,
            next_step_id: Some(target),
            overrides: Some(Overrides { positions, balls }),
        }
    }

    /// Step ids reachable from the first step over default and zone edges.
    pub fn reachable_step_ids(&self) -> HashSet<String> {
        let mut reached = HashSet::new();
        let mut queue: VecDeque<&str> = self.first_step_id().into_iter().collect();
        while let Some(step_id) = queue.pop_front() {
            let Some(step) = self.step(step_id) else {
                continue;
            };
            if !reached.insert(step.id.clone()) {
                continue;
            }
            queue.extend(step.default_next_step_id.as_deref());
            queue.extend(step.zones.iter().filter_map(|zone| zone.target_step_id.as_deref()));
        }
        reached
    }

    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for step in &self.steps {
            if let Some(target) = &step.default_next_step_id {
                if self.step(target).is_none() {
                    dangling.push(DanglingReference::DefaultNext {
                        step_id: step.id.clone(),
                        target_step_id: target.clone(),
                    });
                }
            }
            for zone in &step.zones {
                if let Some(target) = &zone.target_step_id {
                    if self.step(target).is_none() {
                        dangling.push(DanglingReference::ZoneTarget {
                            step_id: step.id.clone(),
                            zone_id: zone.id.clone(),
                            target_step_id: target.clone(),
                        });
                    }
                }
                if let Some(player_id) = &zone.responsible_player_id {
                    if !self.has_player(player_id) {
                        dangling.push(DanglingReference::ZoneActor {
                            step_id: step.id.clone(),
                            zone_id: zone.id.clone(),
                            player_id: player_id.clone(),
                        });
                    }
                }
            }
        }
        dangling
    }

    fn patch_step(&self, step_id: &str, apply: impl FnOnce(&mut Step)) -> Result<Tactic> {
        let index = self
            .step_index(step_id)
            .ok_or_else(|| TacticError::StepNotFound(step_id.to_string()))?;
        let mut next = self.clone();
        apply(&mut next.steps[index]);
        Ok(next)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|value| !value.is_empty())
}

fn fresh_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = Utc::now().timestamp_millis();
    loop {
        let candidate = format!("{prefix}-{stamp}");
        if !taken(&candidate) {
            return candidate;
        }
        stamp += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn make_step(id: &str) -> Step {
        Step {
            id: id.to_string(),
            label: format!("Step {id}"),
            description: None,
            positions: PlayerPositions::new(),
            balls: Vec::new(),
            zones: Vec::new(),
            default_next_step_id: None,
        }
    }

    fn make_tactic(step_ids: &[&str]) -> Tactic {
        Tactic {
            id: "t".to_string(),
            category: "Sideouts".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            players: vec![Player {
                id: "S".to_string(),
                name: "S".to_string(),
                team: Team::Home,
            }],
            steps: step_ids.iter().map(|id| make_step(id)).collect(),
        }
    }

    fn decision_zone(target: Option<&str>, player: Option<&str>) -> Zone {
        Zone {
            id: "z1".to_string(),
            points: vec![coord(0.0, 50.0), coord(50.0, 50.0), coord(50.0, 100.0), coord(0.0, 100.0)],
            color: None,
            border_color: None,
            responsible_player_id: player.map(str::to_string),
            target_step_id: target.map(str::to_string),
        }
    }

    #[test]
    fn add_then_remove_player_restores_positions() {
        let mut tactic = make_tactic(&["1"]);
        tactic.steps[0].positions.insert("S".to_string(), coord(50.0, 50.0));

        let added = tactic.add_player("P1", "P1", Team::Home).expect("add");
        let positions = &added.steps[0].positions;
        assert_eq!(positions.len(), 2);
        assert_eq!(positions["P1"], coord(50.0, 50.0));

        let removed = added.remove_player("P1");
        assert_eq!(removed.steps[0].positions, tactic.steps[0].positions);
        assert_eq!(removed.players, tactic.players);
    }

    #[test]
    fn add_player_rejects_duplicate_and_leaves_receiver_alone() {
        let tactic = make_tactic(&["1"]);
        let result = tactic.add_player("S", "Setter", Team::Away);
        assert_eq!(result, Err(TacticError::DuplicatePlayerId("S".to_string())));
        assert_eq!(tactic.players.len(), 1);
    }

    #[test]
    fn mutations_never_alias_the_original() {
        let mut tactic = make_tactic(&["1", "2"]);
        tactic.steps[0].positions.insert("S".to_string(), coord(10.0, 10.0));
        let snapshot = tactic.clone();

        let mut moved = tactic.move_player("1", "S", coord(90.0, 90.0)).expect("move");
        moved.steps[0].label = "changed".to_string();
        moved.players.clear();

        assert_eq!(tactic, snapshot);
    }

    #[test]
    fn rename_player_rewrites_positions_and_zone_actors() {
        let mut tactic = make_tactic(&["1"]);
        tactic.steps[0].positions.insert("S".to_string(), coord(20.0, 30.0));
        tactic.steps[0].zones.push(decision_zone(Some("1"), Some("S")));

        let renamed = tactic.rename_player("S", "SET", "Setter").expect("rename");
        assert_eq!(renamed.players[0].id, "SET");
        assert_eq!(renamed.players[0].name, "Setter");
        assert!(!renamed.steps[0].positions.contains_key("S"));
        assert_eq!(renamed.steps[0].positions["SET"], coord(20.0, 30.0));
        assert_eq!(
            renamed.steps[0].zones[0].responsible_player_id.as_deref(),
            Some("SET")
        );
    }

    #[test]
    fn rename_player_to_existing_id_fails() {
        let tactic = make_tactic(&["1"]).add_player("P1", "P1", Team::Home).expect("add");
        assert_eq!(
            tactic.rename_player("P1", "S", "x"),
            Err(TacticError::DuplicatePlayerId("S".to_string()))
        );
        let same_id = tactic.rename_player("P1", "P1", "Outside").expect("rename in place");
        assert_eq!(same_id.player("P1").map(|p| p.name.as_str()), Some("Outside"));
        assert!(same_id.steps[0].positions.contains_key("P1"));
    }

    #[test]
    fn remove_player_clears_zone_actor() {
        let mut tactic = make_tactic(&["1", "2"]);
        tactic.steps[0].zones.push(decision_zone(Some("2"), Some("S")));
        let removed = tactic.remove_player("S");
        assert!(removed.players.is_empty());
        assert_eq!(removed.steps[0].zones[0].responsible_player_id, None);
        assert_eq!(removed.steps[0].zones[0].target_step_id.as_deref(), Some("2"));
    }

    #[test]
    fn set_player_team_switches_sides() {
        let tactic = make_tactic(&["1"]).set_player_team("S", Team::Away);
        assert_eq!(tactic.players[0].team, Team::Away);
    }

    #[test]
    fn add_step_clones_snapshot_without_zones() {
        let mut tactic = make_tactic(&["1", "2"]);
        tactic.steps[0].positions.insert("S".to_string(), coord(40.0, 60.0));
        tactic.steps[0].balls.push(Ball {
            id: "BALL".to_string(),
            position: coord(1.0, 2.0),
            color: None,
        });
        tactic.steps[0].zones.push(decision_zone(Some("2"), None));

        let (next, new_id) = tactic.add_step("1").expect("add step");
        assert_eq!(next.steps.len(), 3);
        let inserted = &next.steps[1];
        assert_eq!(inserted.id, new_id);
        assert_ne!(new_id, "1");
        assert_eq!(inserted.label, NEW_STEP_LABEL);
        assert_eq!(inserted.positions, tactic.steps[0].positions);
        assert_eq!(inserted.balls, tactic.steps[0].balls);
        assert!(inserted.zones.is_empty());
        assert_eq!(next.steps[2].id, "2");
    }

    #[test]
    fn add_step_after_unknown_step_fails() {
        let tactic = make_tactic(&["1"]);
        assert_eq!(
            tactic.add_step("nope"),
            Err(TacticError::StepNotFound("nope".to_string()))
        );
    }

    #[test]
    fn remove_only_step_fails_without_mutation() {
        let tactic = make_tactic(&["1"]);
        let before = tactic.clone();
        assert_eq!(tactic.remove_step("1"), Err(TacticError::LastStep));
        assert_eq!(tactic, before);
    }

    #[test]
    fn remove_step_clears_edges_and_picks_predecessor() {
        let mut tactic = make_tactic(&["1", "2", "3"]);
        tactic.steps[0].default_next_step_id = Some("2".to_string());
        tactic.steps[2].zones.push(decision_zone(Some("2"), None));

        let (next, active) = tactic.remove_step("2").expect("remove");
        assert_eq!(active, "1");
        assert_eq!(next.steps.len(), 2);
        assert_eq!(next.steps[0].default_next_step_id, None);
        assert_eq!(next.steps[1].zones[0].target_step_id, None);
        assert!(next.dangling_references().is_empty());

        let (_, active) = tactic.remove_step("1").expect("remove first");
        assert_eq!(active, "2");
    }

    #[test]
    fn move_ball_upserts_missing_ball() {
        let tactic = make_tactic(&["1"]);
        let moved = tactic.move_ball("1", "BALL2", coord(5.0, 5.0)).expect("move");
        assert_eq!(moved.steps[0].balls.len(), 1);
        let moved_again = moved.move_ball("1", "BALL2", coord(7.0, 8.0)).expect("move");
        assert_eq!(moved_again.steps[0].balls.len(), 1);
        assert_eq!(moved_again.steps[0].balls[0].position, coord(7.0, 8.0));
    }

    #[test]
    fn operations_on_missing_step_fail() {
        let tactic = make_tactic(&["1"]);
        assert!(tactic.move_player("x", "S", coord(0.0, 0.0)).is_err());
        assert!(tactic.add_zone("x").is_err());
        assert!(tactic.update_step("x", &StepPatch::default()).is_err());
    }

    #[test]
    fn zone_lifecycle_add_update_remove() {
        let tactic = make_tactic(&["1", "2"]);
        let (with_zone, zone_id) = tactic.add_zone("1").expect("add zone");
        let zone = &with_zone.steps[0].zones[0];
        assert_eq!(zone.points, DEFAULT_ZONE_POINTS.to_vec());
        assert_eq!(zone.color.as_deref(), Some(DEFAULT_ZONE_COLOR));

        let patch = ZonePatch {
            target_step_id: Some(Some("2".to_string())),
            responsible_player_id: Some(Some("S".to_string())),
            ..ZonePatch::default()
        };
        let updated = with_zone.update_zone("1", &zone_id, &patch).expect("update");
        assert_eq!(updated.steps[0].zones[0].target_step_id.as_deref(), Some("2"));

        let cleared = updated
            .update_zone(
                "1",
                &zone_id,
                &ZonePatch {
                    target_step_id: Some(Some(String::new())),
                    ..ZonePatch::default()
                },
            )
            .expect("clear");
        assert_eq!(cleared.steps[0].zones[0].target_step_id, None);
        assert_eq!(cleared.steps[0].zones[0].responsible_player_id.as_deref(), Some("S"));

        let removed = cleared.remove_zone("1", &zone_id).expect("remove");
        assert!(removed.steps[0].zones.is_empty());
    }

    #[test]
    fn update_step_patches_only_given_fields() {
        let mut tactic = make_tactic(&["1", "2"]);
        tactic.steps[0].description = Some("old".to_string());
        let patch = StepPatch {
            label: Some("Serve".to_string()),
            default_next_step_id: Some(Some("2".to_string())),
            ..StepPatch::default()
        };
        let next = tactic.update_step("1", &patch).expect("update");
        assert_eq!(next.steps[0].label, "Serve");
        assert_eq!(next.steps[0].description.as_deref(), Some("old"));
        assert_eq!(next.next_step("1").map(|s| s.id.as_str()), Some("2"));
    }

    #[test]
    fn update_metadata_keeps_unspecified_fields() {
        let tactic = make_tactic(&["1"]);
        let next = tactic.update_metadata(&MetadataPatch {
            name: Some("Renamed".to_string()),
            description: None,
        });
        assert_eq!(next.name, "Renamed");
        assert_eq!(next.category, tactic.category);
    }

    #[test]
    fn interaction_inside_target_zone_moves_ball_and_actor() {
        let mut tactic = make_tactic(&["1", "2"]);
        tactic.players.push(Player {
            id: "P1".to_string(),
            name: "P1".to_string(),
            team: Team::Home,
        });
        tactic.steps[0].zones.push(decision_zone(Some("2"), Some("P1")));

        let result = tactic.resolve_interaction("1", coord(25.0, 75.0));
        assert!(result.is_valid);
        assert_eq!(result.next_step_id.as_deref(), Some("2"));
        let overrides = result.overrides.expect("overrides");
        assert_eq!(overrides.positions.len(), 1);
        assert_eq!(overrides.positions["P1"], coord(25.0, 75.0));
        assert_eq!(
            overrides.balls,
            vec![Ball {
                id: "BALL".to_string(),
                position: coord(25.0, 75.0),
                color: None,
            }]
        );

        let miss = tactic.resolve_interaction("1", coord(90.0, 10.0));
        assert!(!miss.is_valid);
        assert!(miss.overrides.is_none());
    }

    #[test]
    fn interaction_without_target_or_zones_is_invalid() {
        let mut tactic = make_tactic(&["1", "2"]);
        assert!(!tactic.resolve_interaction("1", coord(25.0, 75.0)).is_valid);
        tactic.steps[0].zones.push(decision_zone(None, Some("S")));
        assert!(!tactic.resolve_interaction("1", coord(25.0, 75.0)).is_valid);
        assert!(!tactic.resolve_interaction("missing", coord(25.0, 75.0)).is_valid);
    }

    #[test]
    fn interaction_with_dangling_target_is_invalid() {
        let mut tactic = make_tactic(&["1"]);
        tactic.steps[0].zones.push(decision_zone(Some("ghost"), Some("S")));
        let result = tactic.resolve_interaction("1", coord(25.0, 75.0));
        assert!(!result.is_valid);
        assert_eq!(result.next_step_id, None);
        assert!(result.overrides.is_none());
    }

    #[test]
    fn interaction_ignores_actor_missing_from_roster() {
        let mut tactic = make_tactic(&["1", "2"]);
        tactic.steps[0].zones.push(decision_zone(Some("2"), Some("GONE")));
        let result = tactic.resolve_interaction("1", coord(10.0, 60.0));
        assert!(result.is_valid);
        assert!(result.overrides.expect("overrides").positions.is_empty());
    }

    #[test]
    fn reachability_follows_both_edge_kinds_through_cycles() {
        let mut tactic = make_tactic(&["1", "2", "3", "4"]);
        tactic.steps[0].default_next_step_id = Some("2".to_string());
        tactic.steps[1].default_next_step_id = Some("1".to_string());
        tactic.steps[1].zones.push(decision_zone(Some("3"), None));

        let reached = tactic.reachable_step_ids();
        assert!(reached.contains("1") && reached.contains("2") && reached.contains("3"));
        assert!(!reached.contains("4"));
    }

    #[test]
    fn dangling_references_report_missing_targets() {
        let mut tactic = make_tactic(&["1"]);
        tactic.steps[0].default_next_step_id = Some("ghost".to_string());
        tactic.steps[0].zones.push(decision_zone(Some("1"), Some("nobody")));
        let dangling = tactic.dangling_references();
        assert_eq!(dangling.len(), 2);
        assert!(matches!(dangling[0], DanglingReference::DefaultNext { .. }));
        assert!(matches!(dangling[1], DanglingReference::ZoneActor { .. }));
    }
}
