use core::fmt::Debug;
use core::marker::PhantomData;
use core::time::Duration;

use bevy::prelude::*;
use dex_helpers::input::{PointerEvent, primary_pointer_event};

use crate::config::GridConfig;
use crate::controller::{GridEvent, PointerButton, ReorderController, SessionState};
use crate::surface::{CardSurface, Transition, translated};

/// Anything that can identify a card inside a Bevy grid.
pub trait CardId: Clone + Eq + Debug + Send + Sync + 'static {}

impl<T: Clone + Eq + Debug + Send + Sync + 'static> CardId for T {}

// Drawn above its siblings while dragged
const LIFTED_Z: i32 = 50;

/// Drives every [`ReorderGrid`] container whose children carry a
/// [`ReorderCard<Id>`]. Only one grid is expected to be alive at a time.
pub struct ReorderGridPlugin<Id> {
    config: GridConfig,
    _id: PhantomData<fn() -> Id>,
}

impl<Id> ReorderGridPlugin<Id> {
    pub const fn new(config: GridConfig) -> Self {
        Self {
            config,
            _id: PhantomData,
        }
    }
}

impl<Id> Default for ReorderGridPlugin<Id> {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl<Id: CardId> Plugin for ReorderGridPlugin<Id> {
    fn build(&self, app: &mut App) {
        app.insert_resource(GridController(ReorderController::<Id>::new(
            self.config.clone(),
        )))
        .init_resource::<PointerFrame>()
        .add_event::<ReorderGridEvent<Id>>()
        .add_systems(
            Update,
            (
                release_on_teardown::<Id>,
                sample_pointer,
                settle_layout::<Id>,
                track_press::<Id>.run_if(not(resource_exists::<PointerCapture>)),
                track_drag::<Id>.run_if(resource_exists::<PointerCapture>),
                apply_order::<Id>,
                animate_card_offsets,
            )
                .chain(),
        );
    }
}

/// Container whose card children can be reordered.
#[derive(Component, Debug, Default)]
pub struct ReorderGrid;

#[derive(Component, Debug, Clone)]
#[require(CardOffset, ZIndex)]
pub struct ReorderCard<Id: CardId>(pub Id);

/// Transient visual offset of a card, written into `Node::left`/`top` of a
/// relatively positioned node so it never moves its siblings.
#[derive(Component, Debug, Default)]
pub struct CardOffset {
    current: Vec2,
    /// What the last layout pass was given, and so what `GlobalTransform`
    /// currently reflects.
    shown: Vec2,
    from: Vec2,
    target: Vec2,
    timer: Option<Timer>,
    lifted: bool,
}

impl CardOffset {
    pub const fn current(&self) -> Vec2 {
        self.current
    }

    pub const fn is_lifted(&self) -> bool {
        self.lifted
    }

    fn apply(&mut self, offset: Vec2, transition: Transition) {
        match transition {
            Transition::Instant => {
                self.current = offset;
                self.timer = None;
            }
            Transition::Animated(duration) => {
                self.from = self.current;
                self.timer = Some(Timer::new(duration, TimerMode::Once));
            }
        }
        self.target = offset;
    }
}

#[derive(Resource, Deref, DerefMut)]
pub struct GridController<Id: CardId>(pub ReorderController<Id>);

/// Present while a drag owns the pointer. Drag tracking only runs while it
/// exists, and it is removed on every way a drag can end.
#[derive(Resource, Debug)]
pub struct PointerCapture {
    pub grid: Entity,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ReorderGridEvent<Id: CardId> {
    pub grid: Entity,
    pub event: GridEvent<Id>,
}

/// This frame's primary pointer event, sampled once for every grid system.
#[derive(Resource, Debug, Default)]
pub struct PointerFrame {
    pub event: Option<PointerEvent>,
    last_position: Option<Vec2>,
    deferred_release: Option<Vec2>,
}

type CardQuery<'w, 's, Id> = Query<
    'w,
    's,
    (
        Entity,
        &'static ReorderCard<Id>,
        &'static ComputedNode,
        &'static GlobalTransform,
        &'static mut CardOffset,
    ),
>;

/// [`CardSurface`] over laid out UI nodes.
struct NodeSurface<'q, 'w, 's, Id: CardId> {
    cards: &'q mut CardQuery<'w, 's, Id>,
}

impl<Id: CardId> NodeSurface<'_, '_, '_, Id> {
    fn card_at(&self, order: &[Id], point: Vec2) -> Option<Id> {
        order
            .iter()
            .find(|id| {
                self.screen_bounds(id)
                    .is_some_and(|bounds| bounds.contains(point))
            })
            .cloned()
    }

    fn set_lifted(&mut self, id: &Id, lifted: bool) {
        if let Some((.., mut offset)) = self.cards.iter_mut().find(|(_, card, ..)| card.0 == *id) {
            offset.lifted = lifted;
        }
    }
}

impl<Id: CardId> CardSurface<Id> for NodeSurface<'_, '_, '_, Id> {
    fn layout_bounds(&self, id: &Id) -> Option<Rect> {
        let (_, _, node, transform, offset) =
            self.cards.iter().find(|(_, card, ..)| card.0 == *id)?;
        let size = node.size();
        if size == Vec2::ZERO {
            // Not laid out yet
            return None;
        }
        let scale = node.inverse_scale_factor();
        let center = transform.translation().truncate() * scale;
        let screen = Rect::from_center_size(center, size * scale);
        Some(translated(screen, -offset.shown))
    }

    fn current_offset(&self, id: &Id) -> Vec2 {
        self.cards
            .iter()
            .find(|(_, card, ..)| card.0 == *id)
            .map_or(Vec2::ZERO, |(.., offset)| offset.current)
    }

    fn apply_offset(&mut self, id: &Id, offset: Vec2, transition: Transition) {
        if let Some((.., mut card_offset)) =
            self.cards.iter_mut().find(|(_, card, ..)| card.0 == *id)
        {
            card_offset.apply(offset, transition);
        }
    }
}

/// Ids of the card children of `grid`, in child order.
fn card_order<Id: CardId>(children: &Children, cards: &CardQuery<Id>) -> Vec<Id> {
    children
        .iter()
        .filter_map(|child| cards.get(*child).ok().map(|(_, card, ..)| card.0.clone()))
        .collect()
}

fn sample_pointer(
    mut frame: ResMut<PointerFrame>,
    button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
) {
    if let Some(position) = frame.deferred_release.take() {
        frame.event = Some(PointerEvent::Up(position));
        frame.last_position = None;
        return;
    }

    let event = primary_pointer_event(&button_input, &touch_input, &windows, frame.last_position);
    match event {
        Some(PointerEvent::Down(position)) => {
            // Pressed and released within one frame, report the release next
            if button_input.just_released(MouseButton::Left) || touch_input.any_just_released() {
                frame.deferred_release = Some(position);
            }
            frame.last_position = Some(position);
        }
        Some(PointerEvent::Move(position)) => frame.last_position = Some(position),
        Some(PointerEvent::Up(_) | PointerEvent::Cancel) => frame.last_position = None,
        None => {}
    }
    frame.event = event;
}

/// Finishes the slide correction for swaps committed on earlier frames.
/// Runs before any new input so the layout it reads is the settled one.
fn settle_layout<Id: CardId>(
    mut controller: ResMut<GridController<Id>>,
    mut cards: CardQuery<Id>,
) {
    let mut surface = NodeSurface { cards: &mut cards };
    controller.animation_frame(&mut surface);
    controller.after_layout(&mut surface);
}

fn track_press<Id: CardId>(
    mut commands: Commands,
    mut controller: ResMut<GridController<Id>>,
    frame: Res<PointerFrame>,
    time: Res<Time>,
    grids: Query<(Entity, &Children), With<ReorderGrid>>,
    mut cards: CardQuery<Id>,
    mut events: EventWriter<ReorderGridEvent<Id>>,
) {
    let Ok((grid, children)) = grids.get_single() else {
        return;
    };
    let now = time.elapsed();
    let order = card_order(children, &cards);
    let mut surface = NodeSurface { cards: &mut cards };

    let outcome = match frame.event {
        Some(PointerEvent::Down(point)) => {
            if let Some(card) = surface.card_at(&order, point) {
                controller.pointer_down(card, PointerButton::Primary, point, now, &surface);
            }
            None
        }
        Some(PointerEvent::Move(point)) => {
            controller.pointer_move(point, now, &order, &mut surface)
        }
        Some(PointerEvent::Up(_)) => controller.pointer_up(now, &mut surface),
        Some(PointerEvent::Cancel) => controller.cancel(&mut surface),
        None => None,
    };
    if let Some(event) = outcome {
        events.send(ReorderGridEvent { grid, event });
    }

    if let Some(event) = controller.tick(now, &order) {
        if let GridEvent::DragStarted(card) = &event {
            surface.set_lifted(card, true);
            commands.insert_resource(PointerCapture { grid });
        }
        events.send(ReorderGridEvent { grid, event });
    }
}

fn track_drag<Id: CardId>(
    mut commands: Commands,
    mut controller: ResMut<GridController<Id>>,
    frame: Res<PointerFrame>,
    time: Res<Time>,
    capture: Res<PointerCapture>,
    grids: Query<&Children, With<ReorderGrid>>,
    mut cards: CardQuery<Id>,
    mut events: EventWriter<ReorderGridEvent<Id>>,
) {
    let Ok(children) = grids.get(capture.grid) else {
        // Torn down mid drag, release_on_teardown cleans up next frame
        return;
    };
    let now = time.elapsed();
    let order = card_order(children, &cards);
    let dragged = controller.dragged().cloned();
    let mut surface = NodeSurface { cards: &mut cards };

    let outcome = match frame.event {
        Some(PointerEvent::Move(point)) => {
            controller.pointer_move(point, now, &order, &mut surface)
        }
        Some(PointerEvent::Up(_)) => controller.pointer_up(now, &mut surface),
        Some(PointerEvent::Cancel) => controller.cancel(&mut surface),
        Some(PointerEvent::Down(_)) | None => None,
    };

    if controller.state() != SessionState::Dragging {
        if let Some(card) = &dragged {
            surface.set_lifted(card, false);
        }
        commands.remove_resource::<PointerCapture>();
    }
    if let Some(event) = outcome {
        events.send(ReorderGridEvent {
            grid: capture.grid,
            event,
        });
    }
}

/// Mirrors committed reorders into the grid's child list. Children that are
/// not cards keep their slots.
fn apply_order<Id: CardId>(
    mut commands: Commands,
    mut events: EventReader<ReorderGridEvent<Id>>,
    grids: Query<&Children, With<ReorderGrid>>,
    cards: Query<&ReorderCard<Id>>,
) {
    for ReorderGridEvent { grid, event } in events.read() {
        let GridEvent::Reordered(order) = event else {
            continue;
        };
        let Ok(children) = grids.get(*grid) else {
            continue;
        };

        let mut by_id: Vec<(Id, Entity)> = children
            .iter()
            .filter_map(|child| cards.get(*child).ok().map(|card| (card.0.clone(), *child)))
            .collect();
        let mut slots = order.iter().filter_map(|id| {
            let position = by_id.iter().position(|(card, _)| card == id)?;
            Some(by_id.swap_remove(position).1)
        });

        let reordered: Vec<Entity> = children
            .iter()
            .map(|child| {
                if cards.contains(*child) {
                    slots.next().unwrap_or(*child)
                } else {
                    *child
                }
            })
            .collect();
        commands.entity(*grid).replace_children(&reordered);
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn animate_card_offsets(
    time: Res<Time>,
    mut cards: Query<(&mut CardOffset, &mut Node, &mut ZIndex)>,
) {
    let delta: Duration = time.delta();
    for (mut offset, mut node, mut z_index) in &mut cards {
        if let Some(timer) = offset.timer.as_mut() {
            timer.tick(delta);
            let eased = smoothstep(timer.fraction());
            let finished = timer.finished();
            offset.current = if finished {
                offset.target
            } else {
                offset.from.lerp(offset.target, eased)
            };
            if finished {
                offset.timer = None;
            }
        }

        let current = offset.current;
        if offset.shown != current {
            offset.shown = current;
            node.left = Val::Px(current.x);
            node.top = Val::Px(current.y);
        }

        let z = if offset.lifted { LIFTED_Z } else { 0 };
        if z_index.0 != z {
            z_index.0 = z;
        }
    }
}

fn release_on_teardown<Id: CardId>(
    mut commands: Commands,
    mut removed: RemovedComponents<ReorderGrid>,
    mut controller: ResMut<GridController<Id>>,
    mut frame: ResMut<PointerFrame>,
) {
    if removed.read().count() == 0 {
        return;
    }
    controller.reset();
    frame.last_position = None;
    frame.deferred_release = None;
    commands.remove_resource::<PointerCapture>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animated_offset_starts_from_current() {
        let mut offset = CardOffset::default();
        offset.apply(Vec2::new(40.0, 0.0), Transition::Instant);
        offset.apply(Vec2::ZERO, Transition::Animated(Duration::from_millis(200)));
        assert_eq!(offset.current, Vec2::new(40.0, 0.0));
        assert_eq!(offset.from, Vec2::new(40.0, 0.0));
        assert_eq!(offset.target, Vec2::ZERO);
        assert!(offset.timer.is_some());
    }

    #[test]
    fn smoothstep_is_clamped() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn teardown_releases_the_capture() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(bevy::input::InputPlugin)
            .add_plugins(ReorderGridPlugin::<u32>::default());

        let grid = app.world_mut().spawn(ReorderGrid).id();
        app.world_mut().insert_resource(PointerCapture { grid });
        app.update();
        assert!(app.world().contains_resource::<PointerCapture>());

        app.world_mut().entity_mut(grid).despawn();
        app.update();
        assert!(!app.world().contains_resource::<PointerCapture>());
        assert_eq!(
            app.world().resource::<GridController<u32>>().state(),
            SessionState::Idle
        );
    }
}
