//! One animal: sprite, stats, paint swatches, care actions and the log.
//!
//! Button presses are turned into [`DetailAction`]s and applied by
//! [`apply_action`], which only touches the profile and the form state.
//! The body below the sprite is respawned whenever either changes.

use chrono::{DateTime, Days, Local};
use bevy::prelude::*;
use dex_helpers::palette;
use sprite_recolor::{PixelBuffer, RecolorSprite, Rgb};
use strum::IntoEnumIterator;

use super::{
    AppScreen, DraftField, DraftSubmitted, Dex, ScreenRoot, Selected, ShowStatus, TextDraft,
    spawn_button, text,
};
use crate::config::DexConfig;
use crate::dates::{days_ago, days_ago_label, format_dex_date};
use crate::error::RosterError;
use crate::logs::{
    FeedRow, Feeder, INTEGRATORS, LogRange, MAX_FEED_ROWS, SUBSTRATE_TYPES, ShedQuality,
    filtered_log, shed_bar,
};
use crate::meds::NewPrescription;
use crate::model::{
    AnimalProfile, BeetleStage, CareAction, HealthLogType, PaintTarget, SWATCHES, Sex, Species,
};
use crate::photo::{decode_data_url, downscale_to_data_url};
use crate::sprites::SpriteHandles;

const SHOWN_LOG_ENTRIES: usize = 12;
const SHED_BAR_WIDTH: usize = 18;
const STALE_LOG_DAYS: u64 = 30;

pub struct DetailPlugin;

impl Plugin for DetailPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DetailForm>()
            .add_systems(OnEnter(AppScreen::Detail), spawn_detail_screen)
            .add_systems(OnExit(AppScreen::Detail), (super::despawn_screen, leave_detail))
            .add_systems(
                Update,
                (
                    detail_buttons,
                    draft_submissions,
                    accept_dropped_photos,
                    show_sprite,
                    rebuild_body,
                )
                    .chain()
                    .run_if(in_state(AppScreen::Detail)),
            );
    }
}

/// The form panel under the action tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    None,
    Feed,
    Weight,
    Shed,
    Substrate,
    Meds,
    Paint(PaintTarget),
    DeleteLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    All,
    Today,
    /// Entries written before the last month.
    Stale,
}

/// Draft values behind the open panel.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DetailForm {
    pub panel: Panel,
    pub feed_rows: Vec<FeedRow>,
    pub integrators: Vec<bool>,
    /// Tenths of a gram.
    pub weight_tenths: i64,
    pub shed_quality: ShedQuality,
    pub substrate_index: usize,
    pub custom_substrate: String,
    pub prescription: NewPrescription,
    pub filter: Option<HealthLogType>,
    pub dirty: bool,
}

impl Default for DetailForm {
    fn default() -> Self {
        Self {
            panel: Panel::None,
            feed_rows: vec![FeedRow::default()],
            integrators: vec![false; INTEGRATORS.len()],
            weight_tenths: 0,
            shed_quality: ShedQuality::Clean,
            substrate_index: 0,
            custom_substrate: String::new(),
            prescription: NewPrescription {
                total_days: 7,
                doses_per_day: 1,
                ..NewPrescription::default()
            },
            filter: None,
            dirty: true,
        }
    }
}

impl DetailForm {
    fn for_profile(profile: &AnimalProfile) -> Self {
        let grams: f64 = profile.weight.trim().parse().unwrap_or(0.0);
        Self {
            weight_tenths: (grams * 10.0).round() as i64,
            ..Self::default()
        }
    }

    fn weight_label(&self) -> String {
        let grams = self.weight_tenths as f64 / 10.0;
        if self.weight_tenths % 10 == 0 {
            format!("{grams:.0}")
        } else {
            format!("{grams:.1}")
        }
    }

    fn substrate(&self) -> String {
        match SUBSTRATE_TYPES.get(self.substrate_index) {
            Some(&"CUSTOM") | None => self.custom_substrate.clone(),
            Some(name) => (*name).to_owned(),
        }
    }

    fn chosen_integrators(&self) -> Vec<String> {
        INTEGRATORS
            .iter()
            .zip(&self.integrators)
            .filter(|(_, on)| **on)
            .map(|(name, _)| (*name).to_owned())
            .collect()
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub enum DetailAction {
    Back,
    Open(Panel),
    ClosePanel,
    Care(CareAction),
    Edit(DraftField),
    CycleSex,
    CycleStage,
    FeedCycle(usize),
    FeedQty(usize, i16),
    FeedAddRow,
    FeedRemoveRow(usize),
    ToggleIntegrator(usize),
    FeedConfirm,
    WeightStep(i64),
    WeightConfirm,
    ShedCycle,
    ShedConfirm,
    SubstrateCycle,
    SubstrateConfirm,
    RxDays(i32),
    RxPerDay(i32),
    RxConfirm,
    RxDose(String),
    RxEnd(String),
    Swatch(PaintTarget, usize),
    Filter(Option<HealthLogType>),
    DeleteLogs(DeleteScope),
    RemovePhoto,
}

/// Applies one button press. Returns the status line to show, if any.
pub fn apply_action(
    action: &DetailAction,
    profile: &mut AnimalProfile,
    form: &mut DetailForm,
    draft: &mut TextDraft,
    now: DateTime<Local>,
) -> Result<Option<String>, RosterError> {
    form.dirty = true;
    let message = match action {
        DetailAction::Back => None,
        DetailAction::Open(panel) => {
            form.panel = if form.panel == *panel { Panel::None } else { *panel };
            draft.clear();
            None
        }
        DetailAction::ClosePanel => {
            form.panel = Panel::None;
            draft.clear();
            None
        }
        DetailAction::Care(CareAction::Water) => Some(profile.log_water_change(now)?),
        DetailAction::Care(care) => {
            let panel = match care {
                CareAction::Feed => Panel::Feed,
                CareAction::Weight => Panel::Weight,
                CareAction::Shed => Panel::Shed,
                CareAction::Substrate => Panel::Substrate,
                CareAction::Meds | CareAction::Water => Panel::Meds,
            };
            form.panel = if form.panel == panel { Panel::None } else { panel };
            None
        }
        DetailAction::Edit(field) => {
            let current = match field {
                DraftField::Name => profile.name.clone(),
                DraftField::Morph => profile.morph.clone(),
                DraftField::MedName => form.prescription.med_name.clone(),
                DraftField::MedNotes => form.prescription.notes.clone(),
                DraftField::CustomFeeder | DraftField::CustomSubstrate => String::new(),
            };
            draft.start(*field, &current);
            Some("TYPE, THEN ENTER".to_owned())
        }
        DetailAction::CycleSex => {
            let all: Vec<Sex> = Sex::iter().collect();
            let index = all.iter().position(|sex| *sex == profile.sex).unwrap_or(0);
            profile.sex = all[(index + 1) % all.len()];
            Some("SEX UPDATED!".to_owned())
        }
        DetailAction::CycleStage => {
            let all: Vec<BeetleStage> = BeetleStage::iter().collect();
            let current = profile.stage.unwrap_or_default();
            let index = all.iter().position(|stage| *stage == current).unwrap_or(0);
            profile.stage = Some(all[(index + 1) % all.len()]);
            Some("STAGE UPDATED!".to_owned())
        }
        DetailAction::FeedCycle(row) => {
            if let Some(row) = form.feed_rows.get_mut(*row) {
                row.feeder = row.feeder.next();
            }
            None
        }
        DetailAction::FeedQty(row, delta) => {
            if let Some(row) = form.feed_rows.get_mut(*row) {
                row.step_qty(*delta);
            }
            None
        }
        DetailAction::FeedAddRow => {
            if form.feed_rows.len() < MAX_FEED_ROWS {
                form.feed_rows.push(FeedRow::default());
            }
            None
        }
        DetailAction::FeedRemoveRow(row) => {
            if form.feed_rows.len() > 1 && *row < form.feed_rows.len() {
                form.feed_rows.remove(*row);
            }
            None
        }
        DetailAction::ToggleIntegrator(index) => {
            if let Some(on) = form.integrators.get_mut(*index) {
                *on = !*on;
            }
            None
        }
        DetailAction::FeedConfirm => {
            let message = profile.log_feeding(&form.feed_rows, &form.chosen_integrators(), now)?;
            form.panel = Panel::None;
            form.feed_rows = vec![FeedRow::default()];
            Some(message)
        }
        DetailAction::WeightStep(tenths) => {
            form.weight_tenths = (form.weight_tenths + tenths).max(0);
            None
        }
        DetailAction::WeightConfirm => {
            let message = profile.log_weight(&form.weight_label(), now)?;
            form.panel = Panel::None;
            Some(message)
        }
        DetailAction::ShedCycle => {
            form.shed_quality = form.shed_quality.next();
            None
        }
        DetailAction::ShedConfirm => {
            let message = profile.log_shed(form.shed_quality, now)?;
            form.panel = Panel::None;
            Some(message)
        }
        DetailAction::SubstrateCycle => {
            form.substrate_index = (form.substrate_index + 1) % SUBSTRATE_TYPES.len();
            if SUBSTRATE_TYPES[form.substrate_index] == "CUSTOM" {
                draft.start(DraftField::CustomSubstrate, &form.custom_substrate);
            } else {
                draft.clear();
            }
            None
        }
        DetailAction::SubstrateConfirm => {
            let message = profile.log_substrate(&form.substrate(), now)?;
            form.panel = Panel::None;
            Some(message)
        }
        DetailAction::RxDays(delta) => {
            let days = form.prescription.total_days.saturating_add_signed(*delta);
            form.prescription.total_days = days.max(1);
            None
        }
        DetailAction::RxPerDay(delta) => {
            form.prescription.doses_per_day =
                form.prescription.doses_per_day.saturating_add_signed(*delta).clamp(1, 12);
            None
        }
        DetailAction::RxConfirm => {
            let (_, message) = profile.add_prescription(form.prescription.clone(), now)?;
            form.prescription.med_name.clear();
            form.prescription.notes.clear();
            Some(message)
        }
        DetailAction::RxDose(id) => Some(profile.log_dose(id, now)?),
        DetailAction::RxEnd(id) => Some(profile.end_prescription(id, now)?),
        DetailAction::Swatch(target, index) => {
            let hex = SWATCHES.get(*index).copied().unwrap_or(SWATCHES[0]);
            profile.set_paint(*target, hex);
            None
        }
        DetailAction::Filter(filter) => {
            form.filter = *filter;
            None
        }
        DetailAction::DeleteLogs(scope) => {
            let today = now.date_naive();
            let range = match scope {
                DeleteScope::All => LogRange::All,
                DeleteScope::Today => LogRange::Between {
                    from: Some(today),
                    to: Some(today),
                },
                DeleteScope::Stale => LogRange::Between {
                    from: None,
                    to: today.checked_sub_days(Days::new(STALE_LOG_DAYS)),
                },
            };
            let removed = profile.delete_logs(range);
            form.panel = Panel::None;
            Some(format!("{removed} LOGS DELETED"))
        }
        DetailAction::RemovePhoto => {
            profile.custom_photo = None;
            Some("PHOTO REMOVED".to_owned())
        }
    };
    Ok(message)
}

/// Applies a finished keyboard draft.
pub fn apply_draft(
    submitted: &DraftSubmitted,
    profile: &mut AnimalProfile,
    form: &mut DetailForm,
) -> Option<String> {
    form.dirty = true;
    let text = submitted.text.trim();
    match submitted.field {
        DraftField::Name if !text.is_empty() => {
            profile.name = text.to_uppercase();
            Some("NAME UPDATED!".to_owned())
        }
        DraftField::Morph => {
            profile.morph = text.to_uppercase();
            Some("MORPH UPDATED!".to_owned())
        }
        DraftField::MedName => {
            form.prescription.med_name = text.to_owned();
            None
        }
        DraftField::MedNotes => {
            form.prescription.notes = text.to_owned();
            None
        }
        DraftField::CustomFeeder => {
            if let Some(row) = form
                .feed_rows
                .iter_mut()
                .find(|row| matches!(row.feeder, Feeder::Custom(_)))
            {
                row.feeder = Feeder::custom(text);
            }
            None
        }
        DraftField::CustomSubstrate => {
            form.custom_substrate = text.to_uppercase();
            None
        }
        DraftField::Name => None,
    }
}

#[derive(Component)]
struct SpriteSlot {
    /// Photo the slot currently shows, `None` for the drawn sprite.
    photo: Option<String>,
    species: Option<Species>,
}

#[derive(Component)]
struct DetailBody;

fn spawn_detail_screen(
    mut commands: Commands,
    mut form: ResMut<DetailForm>,
    dex: Res<Dex>,
    selected: Res<Selected>,
) {
    *form = selected
        .0
        .as_deref()
        .and_then(|id| dex.get(id))
        .map_or_else(DetailForm::default, DetailForm::for_profile);

    commands
        .spawn((
            ScreenRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(8.0)),
                overflow: Overflow::clip_y(),
                ..default()
            },
            BackgroundColor(palette::DARKEST),
        ))
        .with_children(|screen| {
            screen.spawn(Node::default()).with_children(|header| {
                spawn_button(header, DetailAction::Back, "< BACK");
            });
            screen.spawn((
                SpriteSlot {
                    photo: None,
                    species: None,
                },
                Node {
                    width: Val::Px(192.0),
                    height: Val::Px(144.0),
                    align_self: AlignSelf::Center,
                    margin: UiRect::vertical(Val::Px(4.0)),
                    ..default()
                },
            ));
            screen.spawn((
                DetailBody,
                Node {
                    flex_direction: FlexDirection::Column,
                    ..default()
                },
            ));
        });
}

fn leave_detail(mut draft: ResMut<TextDraft>, mut selected: ResMut<Selected>) {
    draft.clear();
    selected.0 = None;
}

fn detail_buttons(
    mut dex: ResMut<Dex>,
    mut form: ResMut<DetailForm>,
    mut draft: ResMut<TextDraft>,
    selected: Res<Selected>,
    mut next_screen: ResMut<NextState<AppScreen>>,
    mut status: EventWriter<ShowStatus>,
    buttons: Query<(&Interaction, &DetailAction), Changed<Interaction>>,
) {
    for (interaction, action) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        if *action == DetailAction::Back {
            next_screen.set(AppScreen::Grid);
            return;
        }
        let Some(profile) = selected.0.as_deref().and_then(|id| dex.get_mut(id)) else {
            warn!("Detail screen has no animal selected");
            next_screen.set(AppScreen::Grid);
            return;
        };
        match apply_action(action, profile, &mut form, &mut draft, Local::now()) {
            Ok(Some(message)) => {
                status.send(ShowStatus(message));
            }
            Ok(None) => {}
            Err(err) => {
                status.send(ShowStatus(err.to_string()));
            }
        }
    }
}

fn draft_submissions(
    mut events: EventReader<DraftSubmitted>,
    mut dex: ResMut<Dex>,
    mut form: ResMut<DetailForm>,
    selected: Res<Selected>,
    mut status: EventWriter<ShowStatus>,
) {
    for submitted in events.read() {
        let Some(profile) = selected.0.as_deref().and_then(|id| dex.get_mut(id)) else {
            continue;
        };
        if let Some(message) = apply_draft(submitted, profile, &mut form) {
            status.send(ShowStatus(message));
        }
    }
}

/// Files dropped on the window become the animal's photo.
fn accept_dropped_photos(
    mut drops: EventReader<FileDragAndDrop>,
    mut dex: ResMut<Dex>,
    selected: Res<Selected>,
    config: Res<DexConfig>,
    mut status: EventWriter<ShowStatus>,
) {
    for drop in drops.read() {
        let FileDragAndDrop::DroppedFile { path_buf, .. } = drop else {
            continue;
        };
        let Some(profile) = selected.0.as_deref().and_then(|id| dex.get_mut(id)) else {
            continue;
        };
        let bytes = match std::fs::read(path_buf) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!("Cannot read {}: {err}", path_buf.display());
                continue;
            }
        };
        match downscale_to_data_url(&bytes, &profile.species, &config.photo) {
            Ok(url) => {
                profile.custom_photo = Some(url);
                status.send(ShowStatus("PHOTO UPDATED!".to_owned()));
            }
            Err(err) => {
                warn!("Rejected photo {}: {err}", path_buf.display());
                status.send(ShowStatus("NOT AN IMAGE".to_owned()));
            }
        }
    }
}

/// Keeps the sprite slot in step with the animal: a photo when one is set,
/// otherwise the drawn sprite painted with the animal's colors.
fn show_sprite(
    mut commands: Commands,
    dex: Res<Dex>,
    selected: Res<Selected>,
    handles: Res<SpriteHandles>,
    mut images: ResMut<Assets<Image>>,
    mut slots: Query<(Entity, &mut SpriteSlot)>,
    mut sprites: Query<&mut RecolorSprite>,
) {
    let Some(profile) = selected.0.as_deref().and_then(|id| dex.get(id)) else {
        return;
    };
    for (slot_entity, mut slot) in &mut slots {
        let fresh =
            slot.species.as_ref() != Some(&profile.species) || slot.photo != profile.custom_photo;
        if !fresh {
            let recipe = profile.recipe();
            for mut sprite in &mut sprites {
                if sprite.recipe != recipe {
                    sprite.recipe = recipe.clone();
                }
            }
            continue;
        }

        slot.species = Some(profile.species.clone());
        slot.photo.clone_from(&profile.custom_photo);
        let mut slot_commands = commands.entity(slot_entity);
        slot_commands.despawn_descendants();

        let photo = profile.custom_photo.as_deref().map(decode_data_url);
        match photo {
            Some(Ok(photo)) => {
                let handle = images.add(PixelBuffer::from(photo).to_image());
                slot_commands.with_child((
                    ImageNode::new(handle),
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                ));
            }
            Some(Err(err)) => {
                warn!("Stored photo for {} is unreadable: {err}", profile.name);
                slot_commands.with_child(text("NO PHOTO", 12.0, palette::LIGHT));
            }
            None => {
                slot_commands.with_child((
                    RecolorSprite {
                        source: handles.for_species(&profile.species),
                        recipe: profile.recipe(),
                    },
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                ));
            }
        }
    }
}

fn stat_lines(profile: &AnimalProfile, now: DateTime<Local>) -> Vec<String> {
    let today = now.date_naive();
    let dated = |iso: &str| format!("{} ({})", format_dex_date(iso), days_ago_label(iso, today));
    let mut lines = vec![
        format!("{} {}", profile.dex_label(), profile.name),
        format!("SPECIES: {}", profile.species),
    ];
    match profile.species {
        Species::RhinoBeetle => {
            lines.push(format!("STAGE: {}", profile.stage.unwrap_or_default()));
            if let Some(subspecies) = &profile.subspecies {
                lines.push(format!("SUBSPECIES: {subspecies}"));
            }
        }
        _ => {
            lines.push(format!("MORPH: {}", profile.morph));
            lines.push(format!("SEX: {}", profile.sex));
        }
    }
    lines.push(format!("BORN: {}", profile.born));
    lines.push(format!("WEIGHT: {}g", profile.weight));
    lines.push(format!("LAST FED: {}", dated(&profile.last_feed)));
    match profile.species {
        Species::LeopardGecko => {
            let since = days_ago(&profile.last_shed, today).unwrap_or(0);
            lines.push(format!("LAST SHED: {}", dated(&profile.last_shed)));
            lines.push(format!("SHED {}", shed_bar(since, SHED_BAR_WIDTH)));
            if let Some(water) = &profile.last_water_change {
                lines.push(format!("WATER: {}", dated(water)));
            }
        }
        Species::RhinoBeetle => {
            if let Some(substrate) = &profile.substrate {
                lines.push(format!("SUBSTRATE: {substrate}"));
            }
            if let Some(changed) = &profile.last_substrate_change {
                lines.push(format!("CHANGED: {}", dated(changed)));
            }
        }
        Species::Dog | Species::Other(_) => {}
    }
    lines
}

fn row(parent: &mut ChildBuilder, build: impl FnOnce(&mut ChildBuilder)) {
    parent
        .spawn(Node {
            flex_wrap: FlexWrap::Wrap,
            align_items: AlignItems::Center,
            ..default()
        })
        .with_children(build);
}

fn spawn_panel(
    body: &mut ChildBuilder,
    profile: &AnimalProfile,
    form: &DetailForm,
    draft: &TextDraft,
) {
    let typing = |field: DraftField, fallback: &str| {
        if draft.field == Some(field) {
            format!("{}_", draft.text)
        } else {
            fallback.to_owned()
        }
    };
    let today = Local::now().date_naive();

    match form.panel {
        Panel::None => {}
        Panel::Feed => {
            for (index, feed_row) in form.feed_rows.iter().enumerate() {
                row(body, |line| {
                    spawn_button(line, DetailAction::FeedQty(index, -1), "-");
                    line.spawn(text(format!("{:>2}", feed_row.qty), 12.0, palette::LIGHTEST));
                    spawn_button(line, DetailAction::FeedQty(index, 1), "+");
                    spawn_button(line, DetailAction::FeedCycle(index), feed_row.feeder.label());
                    if matches!(feed_row.feeder, Feeder::Custom(_)) {
                        spawn_button(
                            line,
                            DetailAction::Edit(DraftField::CustomFeeder),
                            typing(DraftField::CustomFeeder, "NAME"),
                        );
                    }
                    if form.feed_rows.len() > 1 {
                        spawn_button(line, DetailAction::FeedRemoveRow(index), "X");
                    }
                });
            }
            row(body, |line| {
                if form.feed_rows.len() < MAX_FEED_ROWS {
                    spawn_button(line, DetailAction::FeedAddRow, "+ ROW");
                }
                for (index, name) in INTEGRATORS.iter().enumerate() {
                    let on = form.integrators.get(index).copied().unwrap_or(false);
                    let mark = if on { "[x]" } else { "[ ]" };
                    let label = format!("{mark} {name}");
                    spawn_button(line, DetailAction::ToggleIntegrator(index), label);
                }
            });
            row(body, |line| {
                spawn_button(line, DetailAction::FeedConfirm, "FEED!");
                spawn_button(line, DetailAction::ClosePanel, "CANCEL");
            });
        }
        Panel::Weight => row(body, |line| {
            spawn_button(line, DetailAction::WeightStep(-10), "-1");
            spawn_button(line, DetailAction::WeightStep(-1), "-.1");
            line.spawn(text(format!("{}g", form.weight_label()), 14.0, palette::LIGHTEST));
            spawn_button(line, DetailAction::WeightStep(1), "+.1");
            spawn_button(line, DetailAction::WeightStep(10), "+1");
            spawn_button(line, DetailAction::WeightConfirm, "LOG");
        }),
        Panel::Shed => row(body, |line| {
            spawn_button(line, DetailAction::ShedCycle, form.shed_quality.to_string());
            spawn_button(line, DetailAction::ShedConfirm, "LOG SHED");
        }),
        Panel::Substrate => row(body, |line| {
            let label = SUBSTRATE_TYPES.get(form.substrate_index).copied().unwrap_or("CUSTOM");
            spawn_button(line, DetailAction::SubstrateCycle, label);
            if label == "CUSTOM" {
                spawn_button(
                    line,
                    DetailAction::Edit(DraftField::CustomSubstrate),
                    typing(DraftField::CustomSubstrate, &form.custom_substrate),
                );
            }
            spawn_button(line, DetailAction::SubstrateConfirm, "CHANGE");
        }),
        Panel::Meds => {
            for rx in profile.active_prescriptions() {
                row(body, |line| {
                    let today_count = rx.doses_on(today);
                    line.spawn(text(
                        format!(
                            "{} {}x/DAY {}d: {} LEFT (TODAY {}/{})",
                            rx.med_name,
                            rx.per_day(),
                            rx.total_days,
                            rx.doses_left(),
                            today_count,
                            rx.per_day()
                        ),
                        10.0,
                        palette::LIGHTEST,
                    ));
                    if rx.accepts_dose(today) {
                        spawn_button(line, DetailAction::RxDose(rx.id.clone()), "DOSE");
                    }
                    spawn_button(line, DetailAction::RxEnd(rx.id.clone()), "END");
                });
            }
            let rx = &form.prescription;
            row(body, |line| {
                spawn_button(
                    line,
                    DetailAction::Edit(DraftField::MedName),
                    typing(
                        DraftField::MedName,
                        if rx.med_name.is_empty() {
                            "MED NAME"
                        } else {
                            rx.med_name.as_str()
                        },
                    ),
                );
                spawn_button(line, DetailAction::RxDays(-1), "-");
                line.spawn(text(format!("{}d", rx.total_days), 12.0, palette::LIGHTEST));
                spawn_button(line, DetailAction::RxDays(1), "+");
                spawn_button(line, DetailAction::RxPerDay(-1), "-");
                line.spawn(text(
                    format!("{}x/day", rx.doses_per_day.max(1)),
                    12.0,
                    palette::LIGHTEST,
                ));
                spawn_button(line, DetailAction::RxPerDay(1), "+");
            });
            row(body, |line| {
                spawn_button(
                    line,
                    DetailAction::Edit(DraftField::MedNotes),
                    typing(
                        DraftField::MedNotes,
                        if rx.notes.is_empty() {
                            "NOTES"
                        } else {
                            rx.notes.as_str()
                        },
                    ),
                );
                spawn_button(line, DetailAction::RxConfirm, "NEW RX");
            });
        }
        Panel::Paint(target) => {
            let current = profile.paint(target).unwrap_or_default();
            row(body, |line| {
                for (index, hex) in SWATCHES.iter().enumerate() {
                    let color = Rgb::parse_hex(hex).unwrap_or(Rgb::BLACK);
                    let border = if hex.eq_ignore_ascii_case(&current) {
                        palette::LIGHTEST
                    } else {
                        palette::DARKEST
                    };
                    line.spawn((
                        Button,
                        Node {
                            width: Val::Px(20.0),
                            height: Val::Px(20.0),
                            margin: UiRect::all(Val::Px(1.0)),
                            border: UiRect::all(Val::Px(2.0)),
                            ..default()
                        },
                        BorderColor(border),
                        BackgroundColor(color.into()),
                        DetailAction::Swatch(target, index),
                    ));
                }
            });
        }
        Panel::DeleteLogs => row(body, |line| {
            spawn_button(line, DetailAction::DeleteLogs(DeleteScope::Today), "TODAY");
            spawn_button(line, DetailAction::DeleteLogs(DeleteScope::Stale), "30+ DAYS OLD");
            spawn_button(line, DetailAction::DeleteLogs(DeleteScope::All), "ALL");
            spawn_button(line, DetailAction::ClosePanel, "CANCEL");
        }),
    }
}

fn rebuild_body(
    mut commands: Commands,
    mut form: ResMut<DetailForm>,
    dex: Res<Dex>,
    draft: Res<TextDraft>,
    selected: Res<Selected>,
    bodies: Query<Entity, With<DetailBody>>,
) {
    if !form.dirty && !draft.is_changed() && !dex.is_changed() {
        return;
    }
    form.dirty = false;
    let Some(profile) = selected.0.as_deref().and_then(|id| dex.get(id)) else {
        return;
    };
    let now = Local::now();

    for body_entity in &bodies {
        commands
            .entity(body_entity)
            .despawn_descendants()
            .with_children(|body| {
                for line in stat_lines(profile, now) {
                    body.spawn(text(line, 11.0, palette::LIGHTEST));
                }

                row(body, |line| {
                    spawn_button(
                        line,
                        DetailAction::Edit(DraftField::Name),
                        if draft.field == Some(DraftField::Name) {
                            format!("NAME: {}_", draft.text)
                        } else {
                            "RENAME".to_owned()
                        },
                    );
                    if profile.is_beetle() {
                        spawn_button(line, DetailAction::CycleStage, "STAGE");
                    } else {
                        spawn_button(line, DetailAction::CycleSex, "SEX");
                        spawn_button(
                            line,
                            DetailAction::Edit(DraftField::Morph),
                            if draft.field == Some(DraftField::Morph) {
                                format!("MORPH: {}_", draft.text)
                            } else {
                                "MORPH".to_owned()
                            },
                        );
                    }
                    if profile.custom_photo.is_some() {
                        spawn_button(line, DetailAction::RemovePhoto, "NO PHOTO");
                    }
                });

                if profile.custom_photo.is_none() && !profile.paint_targets().is_empty() {
                    row(body, |line| {
                        for target in profile.paint_targets() {
                            let open = DetailAction::Open(Panel::Paint(*target));
                            spawn_button(line, open, target.to_string());
                        }
                    });
                }

                row(body, |line| {
                    for care in profile.species.actions() {
                        spawn_button(line, DetailAction::Care(*care), care.to_string());
                    }
                });

                spawn_panel(body, profile, &form, &draft);

                row(body, |line| {
                    spawn_button(line, DetailAction::Filter(None), "ALL");
                    for kind in profile.species.log_filters() {
                        spawn_button(line, DetailAction::Filter(Some(*kind)), kind.to_string());
                    }
                    spawn_button(line, DetailAction::Open(Panel::DeleteLogs), "DEL LOGS");
                });
                let entries = filtered_log(profile, form.filter);
                if entries.is_empty() {
                    body.spawn(text("NO RECORDS", 10.0, palette::LIGHT));
                }
                for entry in entries.into_iter().take(SHOWN_LOG_ENTRIES) {
                    body.spawn(text(entry.text.clone(), 10.0, palette::LIGHT));
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use sprite_recolor::Recipe;

    use super::*;
    use crate::roster::Roster;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap()
    }

    fn press(
        action: DetailAction,
        profile: &mut AnimalProfile,
        form: &mut DetailForm,
    ) -> Option<String> {
        apply_action(&action, profile, form, &mut TextDraft::default(), now()).unwrap()
    }

    #[test]
    fn feed_panel_builds_the_log_line() {
        let mut profile = Roster::default().animals.remove(0);
        let mut form = DetailForm::for_profile(&profile);
        press(DetailAction::Care(CareAction::Feed), &mut profile, &mut form);
        assert_eq!(form.panel, Panel::Feed);

        press(DetailAction::FeedQty(0, 2), &mut profile, &mut form);
        press(DetailAction::FeedAddRow, &mut profile, &mut form);
        press(DetailAction::FeedCycle(1), &mut profile, &mut form);
        press(DetailAction::ToggleIntegrator(0), &mut profile, &mut form);
        let message = press(DetailAction::FeedConfirm, &mut profile, &mut form);

        assert_eq!(message.as_deref(), Some("FED 5 CRICKETS, 3 ROACHES!"));
        assert_eq!(
            profile.health_log.last().unwrap().text,
            "FEED: 15/02 - 5 CRICKETS, 3 ROACHES [Calcium]"
        );
        assert_eq!(form.panel, Panel::None);
    }

    #[test]
    fn weight_stepper_starts_from_the_profile() {
        let mut profile = Roster::default().animals.remove(0);
        let mut form = DetailForm::for_profile(&profile);
        assert_eq!(form.weight_label(), "62");
        press(DetailAction::WeightStep(5), &mut profile, &mut form);
        press(DetailAction::WeightConfirm, &mut profile, &mut form);
        assert_eq!(profile.weight, "62.5");
        assert_eq!(profile.weight_history.last().unwrap().value, 62.5);
    }

    #[test]
    fn swatches_repaint_the_sprite_recipe() {
        let mut profile = Roster::default().animals.remove(0);
        let mut form = DetailForm::default();
        assert_eq!(profile.recipe(), Recipe::Original);
        press(DetailAction::Swatch(PaintTarget::Skin, 12), &mut profile, &mut form);
        assert_eq!(profile.paint(PaintTarget::Skin).as_deref(), Some("#d44040"));
        assert!(matches!(profile.recipe(), Recipe::Regions(_)));
    }

    #[test]
    fn limit_errors_surface_as_messages() {
        let mut profile = Roster::default().animals.remove(0);
        let mut form = DetailForm::default();
        for _ in 0..crate::logs::MAX_LOGS_PER_DAY {
            press(DetailAction::Care(CareAction::Water), &mut profile, &mut form);
        }
        let err = apply_action(
            &DetailAction::Care(CareAction::Water),
            &mut profile,
            &mut form,
            &mut TextDraft::default(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "MAX 50 LOGS/DAY!");
    }

    #[test]
    fn drafts_fill_the_prescription_form() {
        let mut profile = Roster::default().animals.remove(0);
        let mut form = DetailForm::default();
        let mut draft = TextDraft::default();
        apply_action(
            &DetailAction::Edit(DraftField::MedName),
            &mut profile,
            &mut form,
            &mut draft,
            now(),
        )
        .unwrap();
        assert_eq!(draft.field, Some(DraftField::MedName));

        apply_draft(
            &DraftSubmitted {
                field: DraftField::MedName,
                text: "meloxicam".into(),
            },
            &mut profile,
            &mut form,
        );
        let message = press(DetailAction::RxConfirm, &mut profile, &mut form);
        assert_eq!(message.as_deref(), Some("RX: MELOXICAM x7d!"));
        assert_eq!(profile.active_prescriptions().count(), 1);
    }

    #[test]
    fn stale_delete_keeps_recent_entries() {
        let mut profile = Roster::default().animals.remove(0);
        let mut form = DetailForm::default();
        let old = Local.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap();
        profile.log_water_change(old).unwrap();
        profile.log_water_change(now()).unwrap();

        let message = press(DetailAction::DeleteLogs(DeleteScope::Stale), &mut profile, &mut form);
        assert_eq!(message.as_deref(), Some("1 LOGS DELETED"));
        assert_eq!(profile.health_log.len(), 7);
    }

    #[test]
    fn gecko_stats_show_the_shed_cycle() {
        let profile = Roster::default().animals.remove(0);
        let lines = stat_lines(&profile, now());
        assert!(lines.contains(&"LAST FED: 12th Feb. 2026 (3 DAYS AGO)".to_owned()));
        assert!(lines.iter().any(|line| line.starts_with("SHED [")));
    }
}
