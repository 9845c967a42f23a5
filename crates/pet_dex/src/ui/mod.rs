use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use dex_helpers::palette;

use crate::model::Species;
use crate::roster::Roster;
use crate::sprites::SpriteHandles;
use crate::store::PetStore;

mod detail;
mod grid;

pub use detail::DetailPlugin;
pub use grid::GridPlugin;

const BUTTON_NORMAL: Color = palette::DARKEST;
const BUTTON_HOVERED: Color = palette::DARK;
const BUTTON_PRESSED: Color = palette::LIGHT;

const STATUS_SECONDS: f32 = 2.0;
const MAX_DRAFT_LEN: usize = 24;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppScreen {
    #[default]
    Grid,
    Detail,
}

/// The roster being shown. Saved whenever it changes.
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct Dex(pub Roster);

#[derive(Resource)]
pub struct Store(pub Box<dyn PetStore>);

/// Animal open on the detail screen.
#[derive(Resource, Debug, Default)]
pub struct Selected(pub Option<String>);

/// Keyboard input being typed into a form field.
#[derive(Resource, Debug, Default)]
pub struct TextDraft {
    pub field: Option<DraftField>,
    pub text: String,
}

impl TextDraft {
    pub fn start(&mut self, field: DraftField, text: &str) {
        self.field = Some(field);
        self.text = text.to_owned();
    }

    pub fn clear(&mut self) {
        self.field = None;
        self.text.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Morph,
    MedName,
    MedNotes,
    CustomFeeder,
    CustomSubstrate,
}

/// A finished draft, sent on Enter.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct DraftSubmitted {
    pub field: DraftField,
    pub text: String,
}

/// Short status line shown at the bottom of the screen.
#[derive(Event, Debug, Clone)]
pub struct ShowStatus(pub String);

#[derive(Component)]
struct StatusText {
    timer: Timer,
}

/// Marks everything a screen spawned, despawned when it is left.
#[derive(Component)]
pub struct ScreenRoot;

pub struct DexUiPlugin;

impl Plugin for DexUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppScreen>()
            .init_resource::<Selected>()
            .init_resource::<TextDraft>()
            .init_resource::<SpriteHandles>()
            .add_event::<ShowStatus>()
            .add_event::<DraftSubmitted>()
            .add_plugins((GridPlugin, DetailPlugin))
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (
                    button_visuals,
                    type_into_draft,
                    show_status,
                    expire_status,
                    save_roster.run_if(resource_changed::<Dex>),
                ),
            );
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

pub fn despawn_screen(mut commands: Commands, roots: Query<Entity, With<ScreenRoot>>) {
    for root in &roots {
        commands.entity(root).despawn_recursive();
    }
}

pub fn text(label: impl Into<String>, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(label),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

/// A bordered button carrying `action`; its label is spawned as a child.
pub fn button<A: Component>(action: A) -> impl Bundle {
    (
        Button,
        Node {
            padding: UiRect::axes(Val::Px(8.0), Val::Px(5.0)),
            margin: UiRect::all(Val::Px(2.0)),
            border: UiRect::all(Val::Px(2.0)),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BorderColor(palette::LIGHT),
        BackgroundColor(BUTTON_NORMAL),
        action,
    )
}

pub fn spawn_button<A: Component>(parent: &mut ChildBuilder, action: A, label: impl Into<String>) {
    parent.spawn(button(action)).with_children(|button| {
        button.spawn(text(label, 12.0, palette::LIGHTEST));
    });
}

fn button_visuals(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, mut color) in &mut buttons {
        color.0 = match interaction {
            Interaction::Pressed => BUTTON_PRESSED,
            Interaction::Hovered => BUTTON_HOVERED,
            Interaction::None => BUTTON_NORMAL,
        };
    }
}

fn show_status(
    mut commands: Commands,
    mut events: EventReader<ShowStatus>,
    shown: Query<Entity, With<StatusText>>,
) {
    let Some(ShowStatus(message)) = events.read().last() else {
        return;
    };
    for entity in &shown {
        commands.entity(entity).despawn_recursive();
    }
    commands.spawn((
        text(message.clone(), 12.0, palette::LIGHTEST),
        BackgroundColor(palette::DARKEST),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(8.0),
            left: Val::Px(8.0),
            right: Val::Px(8.0),
            padding: UiRect::all(Val::Px(6.0)),
            ..default()
        },
        GlobalZIndex(100),
        StatusText {
            timer: Timer::from_seconds(STATUS_SECONDS, TimerMode::Once),
        },
    ));
}

fn expire_status(
    mut commands: Commands,
    time: Res<Time>,
    mut shown: Query<(Entity, &mut StatusText)>,
) {
    for (entity, mut status) in &mut shown {
        if status.timer.tick(time.delta()).finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

fn type_into_draft(
    mut keys: EventReader<KeyboardInput>,
    mut draft: ResMut<TextDraft>,
    mut submitted: EventWriter<DraftSubmitted>,
) {
    for key in keys.read() {
        if key.state != ButtonState::Pressed {
            continue;
        }
        let Some(field) = draft.field else {
            continue;
        };
        match &key.logical_key {
            Key::Character(typed) => {
                if draft.text.chars().count() < MAX_DRAFT_LEN {
                    draft.text.push_str(&typed.to_uppercase());
                }
            }
            Key::Space => {
                if draft.text.chars().count() < MAX_DRAFT_LEN {
                    draft.text.push(' ');
                }
            }
            Key::Backspace => {
                draft.text.pop();
            }
            Key::Enter => {
                submitted.send(DraftSubmitted {
                    field,
                    text: draft.text.trim().to_owned(),
                });
                draft.clear();
            }
            Key::Escape => draft.clear(),
            _ => {}
        }
    }
}

fn save_roster(dex: Res<Dex>, store: Res<Store>) {
    if let Err(err) = store.0.save(&dex) {
        error!("Failed to save roster: {err}");
    }
}

/// Icon-free species label for picker buttons.
pub fn species_label(species: &Species) -> &'static str {
    match species {
        Species::LeopardGecko => "REPTILE",
        Species::RhinoBeetle => "INSECT",
        Species::Dog => "DOG",
        Species::Other(_) => "OTHER",
    }
}

#[cfg(test)]
mod tests {
    use bevy::input::InputPlugin;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn roster_changes_are_saved() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(Dex::default())
            .insert_resource(Store(Box::new(MemoryStore::default())))
            .add_systems(Update, save_roster.run_if(resource_changed::<Dex>));
        app.update();

        app.world_mut().resource_mut::<Dex>().animals[0].name = "PEACH".into();
        app.update();

        let saved = app.world().resource::<Store>().0.load().unwrap().unwrap();
        assert_eq!(saved.animals[0].name, "PEACH");
    }

    #[test]
    fn typing_fills_the_draft_until_enter() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin))
            .init_resource::<TextDraft>()
            .add_event::<DraftSubmitted>()
            .add_systems(Update, type_into_draft);
        app.world_mut()
            .resource_mut::<TextDraft>()
            .start(DraftField::MedName, "");

        let window = Entity::PLACEHOLDER;
        for logical_key in [
            Key::Character("b".into()),
            Key::Character("x".into()),
            Key::Backspace,
            Key::Character("a".into()),
            Key::Enter,
        ] {
            app.world_mut().send_event(KeyboardInput {
                key_code: KeyCode::KeyA,
                logical_key,
                state: ButtonState::Pressed,
                repeat: false,
                window,
            });
        }
        app.update();

        let events = app.world().resource::<Events<DraftSubmitted>>();
        let submitted: Vec<_> = events.iter_current_update_events().cloned().collect();
        assert_eq!(
            submitted,
            vec![DraftSubmitted {
                field: DraftField::MedName,
                text: "BA".into(),
            }]
        );
        assert_eq!(app.world().resource::<TextDraft>().field, None);
    }

    #[test]
    fn spaces_respect_the_draft_cap() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin))
            .init_resource::<TextDraft>()
            .add_event::<DraftSubmitted>()
            .add_systems(Update, type_into_draft);
        app.world_mut()
            .resource_mut::<TextDraft>()
            .start(DraftField::MedName, "");

        for _ in 0..MAX_DRAFT_LEN + 5 {
            app.world_mut().send_event(KeyboardInput {
                key_code: KeyCode::Space,
                logical_key: Key::Space,
                state: ButtonState::Pressed,
                repeat: false,
                window: Entity::PLACEHOLDER,
            });
        }
        app.update();

        let draft = app.world().resource::<TextDraft>();
        assert_eq!(draft.text.chars().count(), MAX_DRAFT_LEN);
        assert_eq!(draft.field, Some(DraftField::MedName));
    }
}
