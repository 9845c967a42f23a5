use bevy::math::{Rect, Vec2};

use crate::surface::CardSurface;

/// Area shared by two boxes, zero when they only touch or are apart.
pub fn overlap_area(a: Rect, b: Rect) -> f32 {
    let width = (a.max.x.min(b.max.x) - a.min.x.max(b.min.x)).max(0.0);
    let height = (a.max.y.min(b.max.y) - a.min.y.max(b.min.y)).max(0.0);
    width * height
}

pub fn area(rect: Rect) -> f32 {
    let size = rect.size();
    size.x.max(0.0) * size.y.max(0.0)
}

/// Box the dragged card would occupy with its top-left at `top_left`.
pub fn projected(top_left: Vec2, size: Vec2) -> Rect {
    Rect {
        min: top_left,
        max: top_left + size,
    }
}

/// The sibling the dragged card covers most.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapCandidate {
    pub index: usize,
    pub overlap: f32,
    pub target_area: f32,
}

impl SwapCandidate {
    /// Whether the overlap is large enough relative to the target's own area.
    pub fn covers(&self, ratio: f32) -> bool {
        self.target_area > 0.0 && self.overlap >= ratio * self.target_area
    }
}

/// Finds the card in `order` (other than `dragged_index`) with the largest
/// overlap against `dragged`. Cards the surface cannot place are skipped.
/// Ties keep the earliest card in list order.
pub fn best_candidate<Id>(
    dragged: Rect,
    dragged_index: usize,
    order: &[Id],
    surface: &impl CardSurface<Id>,
) -> Option<SwapCandidate> {
    let mut best: Option<SwapCandidate> = None;
    for (index, card) in order.iter().enumerate() {
        if index == dragged_index {
            continue;
        }
        let Some(bounds) = surface.screen_bounds(card) else {
            continue;
        };
        let overlap = overlap_area(dragged, bounds);
        if overlap <= 0.0 {
            continue;
        }
        if best.is_none_or(|current| overlap > current.overlap) {
            best = Some(SwapCandidate {
                index,
                overlap,
                target_area: area(bounds),
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_of_disjoint_and_nested_boxes() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(overlap_area(a, Rect::new(100.0, 0.0, 200.0, 100.0)), 0.0);
        assert_eq!(overlap_area(a, Rect::new(50.0, 50.0, 150.0, 150.0)), 2500.0);
        assert_eq!(overlap_area(a, Rect::new(10.0, 10.0, 20.0, 20.0)), 100.0);
    }

    #[test]
    fn coverage_threshold_is_inclusive() {
        let candidate = SwapCandidate {
            index: 1,
            overlap: 4000.0,
            target_area: 10_000.0,
        };
        assert!(candidate.covers(0.4));
        assert!(!candidate.covers(0.41));
    }
}
