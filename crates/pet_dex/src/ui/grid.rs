use core::time::Duration;

use bevy::prelude::*;
use dex_helpers::palette;
use reorder_grid::{GridEvent, ReorderCard, ReorderGrid, ReorderGridEvent};
use sprite_recolor::RecolorSprite;

use super::{AppScreen, Dex, ScreenRoot, Selected, ShowStatus, spawn_button, species_label, text};
use crate::model::{AnimalProfile, Species};
use crate::sprites::SpriteHandles;

const CARD_WIDTH: f32 = 104.0;
const CARD_HEIGHT: f32 = 118.0;

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GridMode>()
            .init_resource::<OverlayClosedAt>()
            .add_systems(OnEnter(AppScreen::Grid), spawn_grid_screen)
            .add_systems(OnExit(AppScreen::Grid), super::despawn_screen)
            .add_systems(
                Update,
                (grid_buttons, grid_events, redraw_grid)
                    .chain()
                    .run_if(in_state(AppScreen::Grid)),
            );
    }
}

/// What a tap on a card does, and which overlay is open.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub enum GridMode {
    #[default]
    Browse,
    Delete,
    PickSpecies,
    ConfirmDelete(String),
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
enum GridAction {
    OpenSpeciesPicker,
    AddAnimal(Species),
    ToggleDelete,
    ConfirmDelete,
    CloseOverlay,
}

#[derive(Component)]
struct CardList;

#[derive(Component)]
struct Overlay;

#[derive(Component)]
struct DeleteToggleLabel;

/// Card list or overlay needs to be spawned again.
#[derive(Component)]
struct Redraw;

/// When the last overlay closed. A press that lands on an overlay button
/// also lands on the card beneath it, so taps ending shortly after are not
/// meant for the grid.
#[derive(Resource, Debug, Default)]
struct OverlayClosedAt(Option<Duration>);

const TAP_GUARD: Duration = Duration::from_millis(500);

fn spawn_grid_screen(
    mut commands: Commands,
    mut mode: ResMut<GridMode>,
    dex: Res<Dex>,
    handles: Res<SpriteHandles>,
) {
    *mode = GridMode::Browse;
    commands
        .spawn((
            ScreenRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(palette::DARKEST),
        ))
        .with_children(|screen| {
            screen
                .spawn(Node {
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Center,
                    margin: UiRect::bottom(Val::Px(8.0)),
                    ..default()
                })
                .with_children(|header| {
                    header.spawn(text("PET-DEX", 20.0, palette::LIGHTEST));
                    header.spawn(Node::default()).with_children(|buttons| {
                        spawn_button(buttons, GridAction::OpenSpeciesPicker, "+ ADD");
                        buttons
                            .spawn(super::button(GridAction::ToggleDelete))
                            .with_children(|button| {
                                button.spawn((
                                    text("DEL", 12.0, palette::LIGHTEST),
                                    DeleteToggleLabel,
                                ));
                            });
                    });
                });

            screen
                .spawn((
                    ReorderGrid,
                    CardList,
                    Node {
                        flex_direction: FlexDirection::Row,
                        flex_wrap: FlexWrap::Wrap,
                        align_content: AlignContent::FlexStart,
                        column_gap: Val::Px(6.0),
                        row_gap: Val::Px(6.0),
                        ..default()
                    },
                ))
                .with_children(|cards| {
                    for animal in dex.animals.iter() {
                        spawn_card(cards, animal, &handles);
                    }
                });
        });
}

fn spawn_card(parent: &mut ChildBuilder, animal: &AnimalProfile, handles: &SpriteHandles) {
    parent
        .spawn((
            ReorderCard(animal.id.clone()),
            Node {
                width: Val::Px(CARD_WIDTH),
                height: Val::Px(CARD_HEIGHT),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(4.0)),
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor(palette::LIGHT),
            BackgroundColor(palette::DARK),
        ))
        .with_children(|card| {
            card.spawn(text(animal.dex_label(), 10.0, palette::LIGHT));
            card.spawn((
                RecolorSprite {
                    source: handles.for_species(&animal.species),
                    recipe: animal.recipe(),
                },
                Node {
                    width: Val::Px(72.0),
                    height: Val::Px(54.0),
                    margin: UiRect::vertical(Val::Px(4.0)),
                    ..default()
                },
            ));
            card.spawn(text(animal.name.clone(), 12.0, palette::LIGHTEST));
            card.spawn(text(animal.species.to_string(), 8.0, palette::LIGHT));
        });
}

fn spawn_overlay(commands: &mut Commands, mode: &GridMode, dex: &Dex) {
    let body: Vec<(GridAction, String)> = match mode {
        GridMode::PickSpecies => Species::PICKABLE
            .iter()
            .map(|species| {
                (
                    GridAction::AddAnimal(species.clone()),
                    format!("{} ({})", species, species_label(species)),
                )
            })
            .chain([(GridAction::CloseOverlay, "CANCEL".to_owned())])
            .collect(),
        GridMode::ConfirmDelete(_) => vec![
            (GridAction::CloseOverlay, "CANCEL".to_owned()),
            (GridAction::ConfirmDelete, "DELETE".to_owned()),
        ],
        GridMode::Browse | GridMode::Delete => return,
    };
    let title = match mode {
        GridMode::ConfirmDelete(id) => {
            let name = dex.get(id).map_or("?", |animal| animal.name.as_str());
            format!("== DELETE? ==\nRemove {name} from your collection?\nThis cannot be undone.")
        }
        _ => "== NEW ENTRY ==".to_owned(),
    };

    commands
        .spawn((
            ScreenRoot,
            Overlay,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::BLACK.with_alpha(0.6)),
            GlobalZIndex(60),
        ))
        .with_children(|backdrop| {
            backdrop
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(12.0)),
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BorderColor(palette::LIGHT),
                    BackgroundColor(palette::DARKEST),
                ))
                .with_children(|panel| {
                    panel.spawn(text(title, 12.0, palette::LIGHTEST));
                    for (action, label) in body {
                        spawn_button(panel, action, label);
                    }
                });
        });
}

fn grid_buttons(
    mut commands: Commands,
    mut mode: ResMut<GridMode>,
    mut dex: ResMut<Dex>,
    mut closed_at: ResMut<OverlayClosedAt>,
    mut status: EventWriter<ShowStatus>,
    time: Res<Time>,
    buttons: Query<(&Interaction, &GridAction), Changed<Interaction>>,
    lists: Query<Entity, With<CardList>>,
) {
    for (interaction, action) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        if matches!(*mode, GridMode::PickSpecies | GridMode::ConfirmDelete(_)) {
            closed_at.0 = Some(time.elapsed());
        }
        match action {
            GridAction::OpenSpeciesPicker => *mode = GridMode::PickSpecies,
            GridAction::AddAnimal(species) => {
                let today = chrono::Local::now().date_naive();
                let id = dex.add(species, today);
                if let Some(animal) = dex.get(&id) {
                    status.send(ShowStatus(format!("{} ADDED!", animal.dex_label())));
                }
                *mode = GridMode::Browse;
                for list in &lists {
                    commands.entity(list).insert(Redraw);
                }
            }
            GridAction::ToggleDelete => {
                *mode = if *mode == GridMode::Delete {
                    GridMode::Browse
                } else {
                    GridMode::Delete
                };
            }
            GridAction::ConfirmDelete => {
                if let GridMode::ConfirmDelete(id) = &*mode {
                    match dex.remove(id) {
                        Ok(animal) => status.send(ShowStatus(format!("{} RELEASED", animal.name))),
                        Err(err) => status.send(ShowStatus(err.to_string())),
                    };
                    for list in &lists {
                        commands.entity(list).insert(Redraw);
                    }
                }
                *mode = GridMode::Browse;
            }
            GridAction::CloseOverlay => *mode = GridMode::Browse,
        }
    }
}

fn grid_events(
    mut events: EventReader<ReorderGridEvent<String>>,
    mut dex: ResMut<Dex>,
    mut mode: ResMut<GridMode>,
    mut selected: ResMut<Selected>,
    mut next_screen: ResMut<NextState<AppScreen>>,
    closed_at: Res<OverlayClosedAt>,
    time: Res<Time>,
    mut cards: Query<(&ReorderCard<String>, &mut BorderColor)>,
) {
    let guarded = closed_at
        .0
        .is_some_and(|closed| time.elapsed().saturating_sub(closed) < TAP_GUARD);
    for ReorderGridEvent { event, .. } in events.read() {
        match event {
            GridEvent::Tapped(_) if guarded => {}
            GridEvent::Tapped(id) => match mode.clone() {
                GridMode::Browse => {
                    selected.0 = Some(id.clone());
                    next_screen.set(AppScreen::Detail);
                }
                GridMode::Delete => *mode = GridMode::ConfirmDelete(id.clone()),
                GridMode::PickSpecies | GridMode::ConfirmDelete(_) => {}
            },
            GridEvent::Reordered(order) => {
                if let Err(err) = dex.reorder(order) {
                    warn!("Ignoring grid order: {err}");
                }
            }
            GridEvent::DragStarted(id) | GridEvent::Dropped(id) | GridEvent::Cancelled(id) => {
                let lifted = matches!(event, GridEvent::DragStarted(_));
                for (card, mut border) in &mut cards {
                    if &card.0 == id {
                        border.0 = if lifted { palette::LIGHTEST } else { palette::LIGHT };
                    }
                }
            }
        }
    }
}

/// Respawns cards after adds and deletes, and the overlay when the mode
/// changes. Reorders never land here: the grid moves its own children.
fn redraw_grid(
    mut commands: Commands,
    mode: Res<GridMode>,
    dex: Res<Dex>,
    handles: Res<SpriteHandles>,
    lists: Query<Entity, (With<CardList>, With<Redraw>)>,
    overlays: Query<Entity, With<Overlay>>,
    mut toggle_labels: Query<&mut Text, With<DeleteToggleLabel>>,
) {
    for list in &lists {
        commands
            .entity(list)
            .remove::<Redraw>()
            .despawn_descendants()
            .with_children(|cards| {
                for animal in dex.animals.iter() {
                    spawn_card(cards, animal, &handles);
                }
            });
    }

    if !mode.is_changed() {
        return;
    }
    for overlay in &overlays {
        commands.entity(overlay).despawn_recursive();
    }
    spawn_overlay(&mut commands, &mode, &dex);
    for mut label in &mut toggle_labels {
        label.0 = if *mode == GridMode::Delete { "DONE" } else { "DEL" }.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::roster::Roster;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<AppScreen>()
            .init_resource::<GridMode>()
            .init_resource::<Selected>()
            .init_resource::<OverlayClosedAt>()
            .insert_resource(Dex(Roster::default()))
            .add_event::<ReorderGridEvent<String>>()
            .add_systems(Update, grid_events);
        app
    }

    fn send(app: &mut App, event: GridEvent<String>) {
        app.world_mut().send_event(ReorderGridEvent {
            grid: Entity::PLACEHOLDER,
            event,
        });
        app.update();
    }

    #[test]
    fn tapping_a_card_opens_it() {
        let mut app = app();
        send(&mut app, GridEvent::Tapped("1".into()));
        assert_eq!(app.world().resource::<Selected>().0.as_deref(), Some("1"));
        app.update();
        assert_eq!(*app.world().resource::<State<AppScreen>>().get(), AppScreen::Detail);
    }

    #[test]
    fn delete_mode_asks_first() {
        let mut app = app();
        *app.world_mut().resource_mut::<GridMode>() = GridMode::Delete;
        send(&mut app, GridEvent::Tapped("1".into()));
        assert_eq!(
            *app.world().resource::<GridMode>(),
            GridMode::ConfirmDelete("1".into())
        );
        assert_eq!(app.world().resource::<Selected>().0, None);
    }

    #[test]
    fn taps_right_after_an_overlay_closes_are_ignored() {
        let mut app = app();
        app.update();
        let now = app.world().resource::<Time>().elapsed();
        app.world_mut().resource_mut::<OverlayClosedAt>().0 = Some(now);
        send(&mut app, GridEvent::Tapped("1".into()));
        assert_eq!(app.world().resource::<Selected>().0, None);
    }

    #[test]
    fn reorders_reach_the_roster() {
        let mut app = app();
        let today = chrono::NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        app.world_mut().resource_mut::<Dex>().add(&Species::RhinoBeetle, today);

        send(&mut app, GridEvent::Reordered(vec!["2".into(), "1".into()]));
        assert_eq!(app.world().resource::<Dex>().ids(), ["2", "1"]);

        // Not a permutation, ignored
        send(&mut app, GridEvent::Reordered(vec!["2".into()]));
        assert_eq!(app.world().resource::<Dex>().ids(), ["2", "1"]);
    }
}
