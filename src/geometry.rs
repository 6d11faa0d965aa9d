//! Court-space geometry: hit-testing zones and the rectangle math behind
//! zone resize drags. Everything here is a pure function over percentages.

use serde::{Deserialize, Serialize};

use crate::constants::{clamp_court, MIN_ZONE_SPAN};
use crate::types::{ContainerBounds, Coordinate, Rect, Zone};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Move,
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "move" => Some(Self::Move),
            "n" => Some(Self::N),
            "s" => Some(Self::S),
            "e" => Some(Self::E),
            "w" => Some(Self::W),
            "ne" => Some(Self::Ne),
            "nw" => Some(Self::Nw),
            "se" => Some(Self::Se),
            "sw" => Some(Self::Sw),
            _ => None,
        }
    }

    fn north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    fn south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    fn east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    fn west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }
}

/// Even-odd ray casting. Fewer than three vertices never contain anything.
pub fn point_in_polygon(point: Coordinate, polygon: &[Coordinate]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        let crosses = (yi > point.y) != (yj > point.y)
            && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Later zones sit on top: the last declared zone containing the point wins.
pub fn find_hit_zone(point: Coordinate, zones: &[Zone]) -> Option<&Zone> {
    zones
        .iter()
        .rev()
        .find(|zone| point_in_polygon(point, &zone.points))
}

pub fn bounding_box(polygon: &[Coordinate]) -> Rect {
    let Some(first) = polygon.first() else {
        return Rect::default();
    };

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for point in &polygon[1..] {
        min_x = min_x.min(point.x);
        max_x = max_x.max(point.x);
        min_y = min_y.min(point.y);
        max_y = max_y.max(point.y);
    }
    Rect {
        x: min_x,
        y: min_y,
        w: max_x - min_x,
        h: max_y - min_y,
    }
}

/// Applies a drag delta to `initial` and emits the result as an axis-aligned
/// rectangle in TL, TR, BR, BL order.
pub fn resize(initial: Rect, handle: ResizeHandle, dx: f64, dy: f64) -> Vec<Coordinate> {
    let mut rect = initial;

    if handle == ResizeHandle::Move {
        rect.x += dx;
        rect.y += dy;
    } else {
        if handle.west() {
            rect.x += dx;
            rect.w -= dx;
        }
        if handle.east() {
            rect.w += dx;
        }
        if handle.north() {
            rect.y += dy;
            rect.h -= dy;
        }
        if handle.south() {
            rect.h += dy;
        }
    }

    // NaN deltas must not slip past the floor.
    if !(rect.w >= MIN_ZONE_SPAN) {
        rect.w = MIN_ZONE_SPAN;
    }
    if !(rect.h >= MIN_ZONE_SPAN) {
        rect.h = MIN_ZONE_SPAN;
    }

    vec![
        Coordinate::new(rect.x, rect.y),
        Coordinate::new(rect.x + rect.w, rect.y),
        Coordinate::new(rect.x + rect.w, rect.y + rect.h),
        Coordinate::new(rect.x, rect.y + rect.h),
    ]
}

/// Maps a pointer position in client pixels to an integer court coordinate.
pub fn screen_to_canvas(client_x: f64, client_y: f64, bounds: ContainerBounds) -> Coordinate {
    Coordinate {
        x: to_court_axis(client_x - bounds.left, bounds.width),
        y: to_court_axis(client_y - bounds.top, bounds.height),
    }
}

/// Pixel delta between two pointer positions, expressed in court percent.
pub fn pointer_delta_percent(
    start: (f64, f64),
    current: (f64, f64),
    bounds: ContainerBounds,
) -> (f64, f64) {
    (
        scale_delta(current.0 - start.0, bounds.width),
        scale_delta(current.1 - start.1, bounds.height),
    )
}

fn to_court_axis(offset: f64, size: f64) -> f64 {
    if size <= 0.0 || !offset.is_finite() {
        return 0.0;
    }
    clamp_court((offset / size * 100.0).round())
}

fn scale_delta(delta: f64, size: f64) -> f64 {
    if size <= 0.0 || !delta.is_finite() {
        return 0.0;
    }
    delta / size * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Zone {
        Zone {
            id: id.to_string(),
            points: vec![
                Coordinate::new(x0, y0),
                Coordinate::new(x1, y0),
                Coordinate::new(x1, y1),
                Coordinate::new(x0, y1),
            ],
            color: None,
            border_color: None,
            responsible_player_id: None,
            target_step_id: None,
        }
    }

    #[test]
    fn point_in_polygon_handles_concave_shapes() {
        let l_shape = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(20.0, 0.0),
            Coordinate::new(20.0, 10.0),
            Coordinate::new(10.0, 10.0),
            Coordinate::new(10.0, 20.0),
            Coordinate::new(0.0, 20.0),
        ];
        assert!(point_in_polygon(Coordinate::new(5.0, 15.0), &l_shape));
        assert!(point_in_polygon(Coordinate::new(15.0, 5.0), &l_shape));
        assert!(!point_in_polygon(Coordinate::new(15.0, 15.0), &l_shape));
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        let line = vec![Coordinate::new(0.0, 0.0), Coordinate::new(100.0, 100.0)];
        assert!(!point_in_polygon(Coordinate::new(50.0, 50.0), &line));
        assert!(!point_in_polygon(Coordinate::new(50.0, 50.0), &[]));
    }

    #[test]
    fn winding_order_does_not_matter() {
        let mut zone = square("z", 10.0, 10.0, 30.0, 30.0);
        zone.points.reverse();
        assert!(point_in_polygon(Coordinate::new(20.0, 20.0), &zone.points));
    }

    #[test]
    fn find_hit_zone_returns_none_on_miss() {
        let zones = vec![square("a", 0.0, 50.0, 50.0, 100.0)];
        assert!(find_hit_zone(Coordinate::new(90.0, 10.0), &zones).is_none());
    }

    #[test]
    fn bounding_box_spans_all_points() {
        let points = vec![
            Coordinate::new(30.0, 40.0),
            Coordinate::new(70.0, 30.0),
            Coordinate::new(50.0, 90.0),
        ];
        assert_eq!(
            bounding_box(&points),
            Rect {
                x: 30.0,
                y: 30.0,
                w: 40.0,
                h: 60.0
            }
        );
        assert_eq!(bounding_box(&[]), Rect::default());
    }

    #[test]
    fn west_and_north_handles_move_origin_and_shrink_span() {
        let rect = Rect {
            x: 30.0,
            y: 30.0,
            w: 40.0,
            h: 10.0,
        };
        let points = resize(rect, ResizeHandle::Nw, 5.0, 3.0);
        assert_eq!(points[0], Coordinate::new(35.0, 33.0));
        assert_eq!(points[2], Coordinate::new(70.0, 40.0));
    }

    #[test]
    fn east_and_south_handles_only_grow_span() {
        let rect = Rect {
            x: 30.0,
            y: 30.0,
            w: 40.0,
            h: 10.0,
        };
        let points = resize(rect, ResizeHandle::Se, 5.0, -20.0);
        assert_eq!(points[0], Coordinate::new(30.0, 30.0));
        assert_eq!(points[1], Coordinate::new(75.0, 30.0));
        assert_eq!(points[3], Coordinate::new(30.0, 32.0));
    }

    #[test]
    fn move_handle_translates_without_resizing() {
        let rect = Rect {
            x: 10.0,
            y: 10.0,
            w: 20.0,
            h: 20.0,
        };
        let points = resize(rect, ResizeHandle::Move, -4.0, 6.0);
        assert_eq!(bounding_box(&points), Rect { x: 6.0, y: 16.0, w: 20.0, h: 20.0 });
    }

    #[test]
    fn resize_handle_parse_rejects_unknown_codes() {
        assert_eq!(ResizeHandle::parse("sw"), Some(ResizeHandle::Sw));
        assert_eq!(ResizeHandle::parse("move"), Some(ResizeHandle::Move));
        assert_eq!(ResizeHandle::parse("nesw"), None);
    }

    #[test]
    fn screen_to_canvas_clamps_and_rounds() {
        let bounds = ContainerBounds {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 400.0,
        };
        assert_eq!(
            screen_to_canvas(151.0, 150.0, bounds),
            Coordinate::new(26.0, 25.0)
        );
        assert_eq!(
            screen_to_canvas(0.0, 1_000.0, bounds),
            Coordinate::new(0.0, 100.0)
        );
        let empty = ContainerBounds::default();
        assert_eq!(screen_to_canvas(10.0, 10.0, empty), Coordinate::new(0.0, 0.0));
    }

    proptest! {
        #[test]
        fn resize_always_yields_a_valid_rectangle(
            x in -50.0f64..150.0,
            y in -50.0f64..150.0,
            w in 0.0f64..100.0,
            h in 0.0f64..100.0,
            dx in -200.0f64..200.0,
            dy in -200.0f64..200.0,
            handle_index in 0usize..9,
        ) {
            let handles = ["move", "n", "s", "e", "w", "ne", "nw", "se", "sw"];
            let handle = ResizeHandle::parse(handles[handle_index]).unwrap();
            let points = resize(Rect { x, y, w, h }, handle, dx, dy);
            prop_assert_eq!(points.len(), 4);
            let width = points[1].x - points[0].x;
            let height = points[3].y - points[0].y;
            prop_assert!(width >= MIN_ZONE_SPAN - 1e-9);
            prop_assert!(height >= MIN_ZONE_SPAN - 1e-9);
            prop_assert_eq!(points[0].y, points[1].y);
            prop_assert_eq!(points[1].x, points[2].x);
            prop_assert_eq!(points[2].y, points[3].y);
            prop_assert_eq!(points[3].x, points[0].x);
        }

        #[test]
        fn last_declared_overlapping_zone_wins(
            px in 20.0f64..40.0,
            py in 20.0f64..40.0,
        ) {
            let zones = vec![
                square("first", 0.0, 0.0, 50.0, 50.0),
                square("second", 10.0, 10.0, 60.0, 60.0),
            ];
            let hit = find_hit_zone(Coordinate::new(px, py), &zones);
            prop_assert_eq!(hit.map(|zone| zone.id.as_str()), Some("second"));
        }
    }
}
