use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use log::warn;
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::constants::PRIMARY_BALL_ID;
use crate::tactic_file::{import_tactic_json, load_tactic_file};
use crate::types::{
    Ball, Coordinate, LibraryResponse, Player, PlayerPositions, Step, Tactic, TacticCategory, Team,
};

const BUILTIN_DOCUMENTS: [(&str, &str); 3] = [
    ("sideout-1.json", include_str!("../library/sideout-1.json")),
    ("sideout-2.json", include_str!("../library/sideout-2.json")),
    ("sideout-3.json", include_str!("../library/sideout-3.json")),
];

const PLACEHOLDER_ROTATIONS: [u32; 3] = [4, 5, 6];
const PLACEHOLDER_ROSTER: [&str; 6] = ["S", "P1", "P2", "MID", "DIA", "L"];

pub struct TacticLibrary {
    tactics: Vec<Tactic>,
    /// Ids loaded at startup; clients can read but not replace them.
    pinned_ids: HashSet<String>,
}

impl TacticLibrary {
    /// Built-in documents followed by the placeholder rotations.
    pub fn builtin() -> Self {
        let mut tactics: Vec<Tactic> = BUILTIN_DOCUMENTS
            .iter()
            .filter_map(|(name, text)| match import_tactic_json(text) {
                Ok(tactic) => Some(tactic),
                Err(error) => {
                    warn!("[library] skipping built-in {name}: {error}");
                    None
                }
            })
            .collect();
        tactics.extend(PLACEHOLDER_ROTATIONS.into_iter().map(placeholder));
        let pinned_ids = tactics.iter().map(|tactic| tactic.id.clone()).collect();
        Self { tactics, pinned_ids }
    }

    /// Built-ins plus every `*.json` document found in `dir`, sorted by file name.
    pub fn with_dir(dir: Option<&Path>) -> Self {
        let mut library = Self::builtin();
        if let Some(dir) = dir {
            for tactic in load_dir(dir) {
                library.pinned_ids.insert(tactic.id.clone());
                library.upsert(tactic);
            }
        }
        library
    }

    pub fn tactics(&self) -> &[Tactic] {
        &self.tactics
    }

    pub fn find(&self, tactic_id: &str) -> Option<&Tactic> {
        self.tactics.iter().find(|tactic| tactic.id == tactic_id)
    }

    /// Replaces the tactic with the same id, or appends it.
    pub fn upsert(&mut self, tactic: Tactic) {
        match self.tactics.iter_mut().find(|current| current.id == tactic.id) {
            Some(current) => *current = tactic,
            None => self.tactics.push(tactic),
        }
    }

    /// Shares an edited tactic with every client. Tactics loaded at startup
    /// are never replaced; returns false when `tactic` would shadow one.
    pub fn publish(&mut self, tactic: Tactic) -> bool {
        if self.pinned_ids.contains(&tactic.id) {
            return false;
        }
        self.upsert(tactic);
        true
    }

    /// Deep copy under a fresh id, for editing without touching the original.
    pub fn duplicate(&self, tactic_id: &str) -> Option<Tactic> {
        let source = self.find(tactic_id)?;
        let mut copy = source.clone();
        loop {
            let candidate = format!("{}-{}", source.id, make_suffix());
            if self.find(&candidate).is_none() {
                copy.id = candidate;
                break;
            }
        }
        copy.name = format!("{} (Copy)", source.name);
        Some(copy)
    }

    /// Categories in order of first appearance, tactics in library order.
    pub fn group_by_category(&self) -> Vec<TacticCategory> {
        let mut categories: Vec<TacticCategory> = Vec::new();
        for tactic in &self.tactics {
            match categories
                .iter_mut()
                .find(|category| category.name == tactic.category)
            {
                Some(category) => category.tactics.push(tactic.clone()),
                None => categories.push(TacticCategory {
                    name: tactic.category.clone(),
                    tactics: vec![tactic.clone()],
                }),
            }
        }
        categories
    }

    pub fn build_response(&self) -> LibraryResponse {
        LibraryResponse {
            generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            categories: self.group_by_category(),
        }
    }
}

/// The editor's starting template.
pub fn new_blank(now_ms: i64) -> Tactic {
    let mut positions = PlayerPositions::new();
    positions.insert("S".to_string(), Coordinate::new(50.0, 50.0));
    Tactic {
        id: format!("t-{now_ms}"),
        category: "Custom".to_string(),
        name: "New Tactic".to_string(),
        description: "Notes...".to_string(),
        players: vec![home_player("S")],
        steps: vec![Step {
            id: "step-1".to_string(),
            label: "Setup".to_string(),
            description: None,
            positions,
            balls: vec![Ball {
                id: PRIMARY_BALL_ID.to_string(),
                position: Coordinate::new(50.0, 10.0),
                color: None,
            }],
            zones: Vec::new(),
            default_next_step_id: None,
        }],
    }
}

fn placeholder(rotation: u32) -> Tactic {
    let mut positions = PlayerPositions::new();
    positions.insert("S".to_string(), Coordinate::new(50.0, 50.0));
    Tactic {
        id: format!("sideout-{rotation}"),
        category: "Sideouts".to_string(),
        name: format!("Sideout {rotation} (Rot {rotation})"),
        description: format!("Standard rotation {rotation} setup (Placeholder)."),
        players: PLACEHOLDER_ROSTER.into_iter().map(home_player).collect(),
        steps: vec![Step {
            id: "1".to_string(),
            label: "Start".to_string(),
            description: None,
            positions,
            balls: vec![Ball {
                id: PRIMARY_BALL_ID.to_string(),
                position: Coordinate::new(50.0, 5.0),
                color: None,
            }],
            zones: Vec::new(),
            default_next_step_id: None,
        }],
    }
}

fn home_player(id: &str) -> Player {
    Player {
        id: id.to_string(),
        name: id.to_string(),
        team: Team::Home,
    }
}

fn load_dir(dir: &Path) -> Vec<Tactic> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            warn!("[library] failed to read {}: {error}", dir.display());
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|path| match load_tactic_file(path) {
            Ok(tactic) => Some(tactic),
            Err(error) => {
                warn!("[library] skipping {}: {error}", path.display());
                None
            }
        })
        .collect()
}

fn make_suffix() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
