use crate::types::Coordinate;

pub const COURT_MIN: f64 = 0.0;
pub const COURT_MAX: f64 = 100.0;

pub const DEFAULT_PLACEMENT: Coordinate = Coordinate { x: 50.0, y: 50.0 };
pub const PRIMARY_BALL_ID: &str = "BALL";
pub const NEW_STEP_LABEL: &str = "New Phase";

pub const MIN_ZONE_SPAN: f64 = 2.0;
pub const DEFAULT_ZONE_COLOR: &str = "rgba(59, 130, 246, 0.2)";
pub const DEFAULT_ZONE_POINTS: [Coordinate; 4] = [
    Coordinate { x: 30.0, y: 30.0 },
    Coordinate { x: 70.0, y: 30.0 },
    Coordinate { x: 70.0, y: 40.0 },
    Coordinate { x: 30.0, y: 40.0 },
];

pub const ERROR_FLASH_MS: u64 = 300;
pub const RESUME_PLAY_DELAY_MS: u64 = 10;

pub const DEFAULT_ANIMATION_SPEED_MS: u64 = 2_000;
pub const SLOWEST_ANIMATION_SPEED_MS: u64 = 4_000;
pub const FASTEST_ANIMATION_SPEED_MS: u64 = 2_000;
pub const SPEED_MS_PER_PERCENT: u64 = 20;

pub const TICK_MS: u64 = 10;

pub fn clamp_animation_speed_ms(value: u64) -> u64 {
    value.clamp(FASTEST_ANIMATION_SPEED_MS, SLOWEST_ANIMATION_SPEED_MS)
}

pub fn clamp_court(value: f64) -> f64 {
    value.clamp(COURT_MIN, COURT_MAX)
}
