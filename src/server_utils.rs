use crate::constants::{
    clamp_animation_speed_ms, SLOWEST_ANIMATION_SPEED_MS, SPEED_MS_PER_PERCENT,
};
use crate::types::Team;

const MAX_NAME_LEN: usize = 64;

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "Untitled".to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Slider position (0 = slowest) for an animation duration.
pub fn animation_speed_to_percent(speed_ms: u64) -> u64 {
    (SLOWEST_ANIMATION_SPEED_MS - clamp_animation_speed_ms(speed_ms)) / SPEED_MS_PER_PERCENT
}

pub fn percent_to_animation_speed(percent: f64) -> u64 {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0).round() as u64
    } else {
        0
    };
    SLOWEST_ANIMATION_SPEED_MS - percent * SPEED_MS_PER_PERCENT
}

/// First number in the name ("Sideout 3" -> "3"), else its first character.
pub fn tactic_badge(name: &str) -> String {
    let digits: String = name
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if !digits.is_empty() {
        return digits;
    }
    name.chars().next().map(String::from).unwrap_or_default()
}

/// Away players carry an `O` prefix in legacy rosters; it is not shown.
pub fn player_display_id(id: &str, team: Team) -> &str {
    match (team, id.strip_prefix('O')) {
        (Team::Away, Some(rest)) if !rest.is_empty() => rest,
        _ => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_percent_conversions_follow_slider_mapping() {
        assert_eq!(animation_speed_to_percent(4_000), 0);
        assert_eq!(animation_speed_to_percent(3_000), 50);
        assert_eq!(animation_speed_to_percent(2_000), 100);
        assert_eq!(animation_speed_to_percent(500), 100);
        assert_eq!(percent_to_animation_speed(0.0), 4_000);
        assert_eq!(percent_to_animation_speed(50.0), 3_000);
        assert_eq!(percent_to_animation_speed(100.0), 2_000);
        assert_eq!(percent_to_animation_speed(150.0), 2_000);
        assert_eq!(percent_to_animation_speed(-3.0), 4_000);
        assert_eq!(percent_to_animation_speed(f64::NAN), 4_000);
    }

    #[test]
    fn tactic_badge_prefers_first_number() {
        assert_eq!(tactic_badge("Sideout 12 (Rot 1)"), "12");
        assert_eq!(tactic_badge("Defense"), "D");
        assert_eq!(tactic_badge(""), "");
    }

    #[test]
    fn player_display_id_strips_away_prefix_only() {
        assert_eq!(player_display_id("OH1", Team::Away), "H1");
        assert_eq!(player_display_id("O", Team::Away), "O");
        assert_eq!(player_display_id("OH1", Team::Home), "OH1");
        assert_eq!(player_display_id("S", Team::Away), "S");
    }

    #[test]
    fn sanitize_name_applies_trim_empty_and_max_len() {
        assert_eq!(sanitize_name(""), "Untitled");
        assert_eq!(sanitize_name("   "), "Untitled");
        assert_eq!(sanitize_name(" Sideout 1 "), "Sideout 1");
        assert_eq!(sanitize_name(&"x".repeat(100)).len(), MAX_NAME_LEN);
    }
}
