use std::collections::HashMap;
use std::time::Duration;

use bevy::math::{Rect, Vec2};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use reorder_grid::order::is_permutation;
use reorder_grid::{
    CardSurface, GridConfig, GridEvent, PointerButton, ReorderController, SessionState, Transition,
};

const CELL: f32 = 80.0;
const GAP: f32 = 10.0;
const COLUMNS: usize = 3;

/// A grid host: lays cards out row by row in list order and draws offsets
/// on top. Animated offsets land instantly, which is all the controller can
/// observe anyway.
struct Host {
    order: Vec<u32>,
    offsets: HashMap<u32, Vec2>,
}

impl Host {
    fn new(count: u32) -> Self {
        Self {
            order: (0..count).collect(),
            offsets: HashMap::new(),
        }
    }

    fn center_of(&self, index: usize) -> Vec2 {
        let column = (index % COLUMNS) as f32;
        let row = (index / COLUMNS) as f32;
        Vec2::new(
            column * (CELL + GAP) + CELL / 2.0,
            row * (CELL + GAP) + CELL / 2.0,
        )
    }
}

impl CardSurface<u32> for Host {
    fn layout_bounds(&self, card: &u32) -> Option<Rect> {
        let index = self.order.iter().position(|id| id == card)?;
        Some(Rect::from_center_size(self.center_of(index), Vec2::splat(CELL)))
    }

    fn current_offset(&self, card: &u32) -> Vec2 {
        self.offsets.get(card).copied().unwrap_or(Vec2::ZERO)
    }

    fn apply_offset(&mut self, card: &u32, offset: Vec2, _transition: Transition) {
        self.offsets.insert(*card, offset);
    }
}

/// Runs one frame the way the Bevy plugin does: settle last frame's swap,
/// then feed the pointer, then lay out any new order.
struct Session {
    host: Host,
    controller: ReorderController<u32>,
    now: Duration,
    events: Vec<GridEvent<u32>>,
}

impl Session {
    fn new(count: u32) -> Self {
        Self {
            host: Host::new(count),
            controller: ReorderController::new(GridConfig::default()),
            now: Duration::ZERO,
            events: Vec::new(),
        }
    }

    fn frame(&mut self, millis: u64) {
        self.now += Duration::from_millis(millis);
        self.controller.animation_frame(&mut self.host);
        self.controller.after_layout(&mut self.host);
        if let Some(event) = self.controller.tick(self.now, &self.host.order) {
            self.record(event);
        }
    }

    fn record(&mut self, event: GridEvent<u32>) {
        if let GridEvent::Reordered(order) = &event {
            assert!(is_permutation(&self.host.order, order));
            self.host.order.clone_from(order);
        }
        self.events.push(event);
    }

    fn press(&mut self, index: usize) {
        let card = self.host.order[index];
        let point = self.host.center_of(index);
        self.controller
            .pointer_down(card, PointerButton::Primary, point, self.now, &self.host);
    }

    fn move_to(&mut self, point: Vec2) {
        let order = self.host.order.clone();
        if let Some(event) = self
            .controller
            .pointer_move(point, self.now, &order, &mut self.host)
        {
            self.record(event);
        }
    }

    fn release(&mut self) {
        if let Some(event) = self.controller.pointer_up(self.now, &mut self.host) {
            self.record(event);
        }
    }
}

#[test]
fn long_drag_across_a_row_moves_the_card_to_the_end() {
    let mut session = Session::new(3);
    session.press(0);
    session.frame(400);
    assert_eq!(session.controller.state(), SessionState::Dragging);

    let end = session.host.center_of(2);
    for step in 1..=10 {
        session.move_to(session.host.center_of(0).lerp(end, step as f32 / 10.0));
        session.frame(16);
    }
    // The sweep outran the debounce, only the first swap landed so far
    assert_eq!(session.host.order, vec![1, 0, 2]);

    session.frame(500);
    session.move_to(end);
    session.release();

    assert_eq!(session.host.order, vec![1, 2, 0]);
    assert_eq!(session.events.first(), Some(&GridEvent::DragStarted(0)));
    assert_eq!(session.events.last(), Some(&GridEvent::Dropped(0)));
}

#[test]
fn fast_sweep_commits_one_swap_per_debounce_window() {
    let mut session = Session::new(6);
    session.press(0);
    session.frame(400);

    // Straight to the last slot, then hover there
    let end = session.host.center_of(5);
    session.move_to(end);
    for _ in 0..10 {
        session.frame(100);
        session.move_to(end + Vec2::new(1.0, 0.0));
        session.frame(100);
        session.move_to(end);
    }
    session.release();

    let swaps = session
        .events
        .iter()
        .filter(|event| matches!(event, GridEvent::Reordered(_)))
        .count();
    assert_eq!(swaps, 1);
    assert_eq!(session.host.order, vec![1, 2, 3, 4, 5, 0]);
}

#[test]
fn tap_right_after_a_drop_is_swallowed() {
    let mut session = Session::new(3);
    session.press(1);
    session.frame(450);
    session.release();
    assert_eq!(session.events.last(), Some(&GridEvent::Dropped(1)));

    session.frame(100);
    session.press(2);
    session.frame(50);
    session.release();
    assert_eq!(session.events.last(), Some(&GridEvent::Dropped(1)));

    session.frame(200);
    session.press(2);
    session.frame(50);
    session.release();
    assert_eq!(session.events.last(), Some(&GridEvent::Tapped(2)));
}

#[derive(Debug, Clone)]
enum Step {
    Press(usize),
    Move(f32, f32),
    Wait(u64),
    Release,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..8usize).prop_map(Step::Press),
        (-40.0f32..300.0, -40.0f32..300.0).prop_map(|(x, y)| Step::Move(x, y)),
        (0..700u64).prop_map(Step::Wait),
        Just(Step::Release),
    ]
}

proptest! {
    #[test]
    fn any_gesture_sequence_keeps_the_same_cards(steps in prop::collection::vec(step(), 1..60)) {
        let mut session = Session::new(8);
        let original = session.host.order.clone();

        for step in steps {
            match step {
                Step::Press(index) => session.press(index),
                Step::Move(x, y) => session.move_to(Vec2::new(x, y)),
                Step::Wait(millis) => session.frame(millis),
                Step::Release => session.release(),
            }
            prop_assert!(is_permutation(&original, &session.host.order));
        }

        let started = session
            .events
            .iter()
            .filter(|event| matches!(event, GridEvent::DragStarted(_)))
            .count();
        let ended = session
            .events
            .iter()
            .filter(|event| matches!(event, GridEvent::Dropped(_) | GridEvent::Cancelled(_)))
            .count();
        let still_dragging = usize::from(session.controller.state() == SessionState::Dragging);
        prop_assert_eq!(started, ended + still_dragging);
    }
}
