use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::utils::HashMap;

use crate::buffer::PixelBuffer;
use crate::engine::{RecolorEngine, Recipe};
use crate::error::RecolorError;
use crate::thresholds::RecolorThresholds;

/// Repaints the image of every UI node carrying a [`RecolorSprite`].
#[derive(Default)]
pub struct RecolorPlugin {
    pub thresholds: RecolorThresholds,
}

impl Plugin for RecolorPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SpriteCache {
            thresholds: self.thresholds.clone(),
            engines: HashMap::default(),
        })
        .add_systems(Update, recolor_sprites);
    }
}

/// Source sprite plus how to paint it. The entity's [`ImageNode`] is pointed
/// at the recolored output.
#[derive(Component, Debug, Clone)]
#[require(ImageNode)]
pub struct RecolorSprite {
    pub source: Handle<Image>,
    pub recipe: Recipe,
}

/// Output image owned by a recolored entity, reused on every repaint.
#[derive(Component, Debug)]
pub struct RecoloredImage(pub Handle<Image>);

/// The source was not loaded yet; try again next frame.
#[derive(Component, Debug)]
pub struct RecolorPending;

/// One engine per source image, so each original is decoded once.
#[derive(Resource, Debug)]
pub struct SpriteCache {
    thresholds: RecolorThresholds,
    engines: HashMap<AssetId<Image>, RecolorEngine>,
}

impl SpriteCache {
    /// `Ok(None)` while the source is still loading.
    fn engine_for(
        &mut self,
        source: &Handle<Image>,
        images: &Assets<Image>,
    ) -> Result<Option<&RecolorEngine>, RecolorError> {
        let id = source.id();
        if !self.engines.contains_key(&id) {
            let Some(image) = images.get(id) else {
                return Ok(None);
            };
            let mut engine = RecolorEngine::new(self.thresholds.clone());
            engine.load(PixelBuffer::try_from(image)?);
            self.engines.insert(id, engine);
        }
        Ok(self.engines.get(&id))
    }

    pub fn forget(&mut self, source: &Handle<Image>) {
        self.engines.remove(&source.id());
    }
}

impl TryFrom<&Image> for PixelBuffer {
    type Error = RecolorError;

    fn try_from(image: &Image) -> Result<Self, Self::Error> {
        match image.texture_descriptor.format {
            TextureFormat::Rgba8UnormSrgb | TextureFormat::Rgba8Unorm => {}
            format => return Err(RecolorError::UnsupportedFormat(format)),
        }
        Self::new(image.width(), image.height(), image.data.clone())
    }
}

impl PixelBuffer {
    pub fn to_image(&self) -> Image {
        Image::new(
            Extent3d {
                width: self.width(),
                height: self.height(),
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.as_bytes().to_vec(),
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        )
    }
}

fn recolor_sprites(
    mut commands: Commands,
    mut cache: ResMut<SpriteCache>,
    mut images: ResMut<Assets<Image>>,
    mut sprites: Query<
        (Entity, &RecolorSprite, Option<&RecoloredImage>, &mut ImageNode),
        Or<(Changed<RecolorSprite>, With<RecolorPending>)>,
    >,
) {
    for (entity, sprite, output, mut node) in &mut sprites {
        let rendered = match cache.engine_for(&sprite.source, &images) {
            Ok(Some(engine)) => engine.render(&sprite.recipe),
            Ok(None) => {
                commands.entity(entity).insert(RecolorPending);
                continue;
            }
            Err(err) => {
                error!("Cannot recolor sprite: {err}");
                commands.entity(entity).remove::<RecolorPending>();
                continue;
            }
        };
        commands.entity(entity).remove::<RecolorPending>();
        let Some(buffer) = rendered else {
            continue;
        };

        let painted = buffer.to_image();
        if let Some(RecoloredImage(handle)) = output {
            if let Some(existing) = images.get_mut(handle) {
                *existing = painted;
                node.image = handle.clone();
                continue;
            }
        }
        let handle = images.add(painted);
        commands.entity(entity).insert(RecoloredImage(handle.clone()));
        node.image = handle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Image>>()
            .add_plugins(RecolorPlugin::default());
        app
    }

    /// 3x3 backdrop with one skin pixel in the middle.
    fn sprite_image() -> Image {
        let mut data = vec![15, 56, 15, 255].repeat(9);
        data[16..20].copy_from_slice(&[232, 197, 71, 255]);
        PixelBuffer::new(3, 3, data).unwrap().to_image()
    }

    #[test]
    fn repaints_into_a_separate_image() {
        let mut app = app();
        let source = app
            .world_mut()
            .resource_mut::<Assets<Image>>()
            .add(sprite_image());
        let entity = app
            .world_mut()
            .spawn(RecolorSprite {
                source: source.clone(),
                recipe: Recipe::Tint(Rgb::new(0, 0, 255)),
            })
            .id();
        app.update();

        let node_image = app.world().get::<ImageNode>(entity).unwrap().image.clone();
        assert_ne!(node_image, source);
        let images = app.world().resource::<Assets<Image>>();
        let painted = PixelBuffer::try_from(images.get(&node_image).unwrap()).unwrap();
        let original = PixelBuffer::try_from(images.get(&source).unwrap()).unwrap();
        assert_eq!(painted.pixel(0, 0), original.pixel(0, 0));
        assert_ne!(painted.pixel(1, 1), original.pixel(1, 1));
    }

    #[test]
    fn waits_for_the_source_to_load() {
        let mut app = app();
        let source: Handle<Image> = Handle::weak_from_u128(7);
        let entity = app
            .world_mut()
            .spawn(RecolorSprite {
                source: source.clone(),
                recipe: Recipe::Original,
            })
            .id();
        app.update();
        assert!(app.world().get::<RecolorPending>(entity).is_some());

        app.world_mut()
            .resource_mut::<Assets<Image>>()
            .insert(&source, sprite_image());
        app.update();
        assert!(app.world().get::<RecolorPending>(entity).is_none());
        assert!(app.world().get::<RecoloredImage>(entity).is_some());
    }

    #[test]
    fn rejects_non_rgba_sources() {
        let mut image = sprite_image();
        image.texture_descriptor.format = TextureFormat::R8Unorm;
        assert_eq!(
            PixelBuffer::try_from(&image),
            Err(RecolorError::UnsupportedFormat(TextureFormat::R8Unorm))
        );
    }
}
