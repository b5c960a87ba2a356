use std::collections::BTreeMap;

use foundation::arena::Arena;
use foundation::color::Rgba;
use foundation::handles::Handle;
use foundation::math::{GeoCoordinate, Projection};
use gpu::{Camera3D, TextureStore};
use image::{Rgba as Pixel, RgbaImage};
use scene::World;
use scene::components::{SceneGroup, Sprite};
use scene::entity::{GroupId, SpriteId, TextureId};
use scene::picking::{Billboard, PickOptions, pick_billboards};
use tracing::debug;

/// Labels float this far out so they never z-fight the globe.
pub const LABEL_RADIUS: f64 = 1.02;
pub const LABEL_RENDER_ORDER: i32 = 1000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub Handle);

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: GeoCoordinate,
    pub country_code: String,
    pub hovered: bool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelColors {
    pub text: Rgba,
    pub underline: Rgba,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelLook {
    pub font_size_px: f32,
    pub font_weight: u16,
    pub world_height: f64,
    pub padding_px: [u32; 2],
    pub underline_px: u32,
    pub normal: LabelColors,
    pub hover: LabelColors,
}

impl Default for LabelLook {
    fn default() -> Self {
        let hover = Rgba::from_rgb_u32(0xffd24d);
        Self {
            font_size_px: 16.0,
            font_weight: 200,
            world_height: 0.10,
            padding_px: [4, 3],
            underline_px: 1,
            normal: LabelColors {
                text: Rgba::new(132.0 / 255.0, 132.0 / 255.0, 132.0 / 255.0, 0.95),
                underline: Rgba::new(57.0 / 255.0, 57.0 / 255.0, 57.0 / 255.0, 0.85),
            },
            hover: LabelColors {
                text: hover,
                underline: hover,
            },
        }
    }
}

impl LabelLook {
    pub fn colors(&self, hovered: bool) -> LabelColors {
        if hovered { self.hover } else { self.normal }
    }
}

/// A rendered label. `image` is power-of-two sized; `width`/`height` give the
/// padded text box it was stretched from, which fixes the sprite aspect.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBitmap {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
}

impl LabelBitmap {
    /// Used when text cannot be rasterized.
    pub fn fallback() -> Self {
        Self {
            image: RgbaImage::new(2, 2),
            width: 2,
            height: 2,
        }
    }

    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            return 1.0;
        }
        let a = self.width as f64 / self.height as f64;
        if a.is_finite() && a > 0.0 { a } else { 1.0 }
    }
}

/// Turns label text into a bitmap.
pub trait LabelRasterizer {
    fn rasterize(&self, text: &str, colors: LabelColors, look: &LabelLook) -> LabelBitmap;
}

/// Font-free rasterizer: one solid block per visible character, plus the
/// underline. Metrics follow the usual 0.6 em advance estimate.
#[derive(Debug, Default, Copy, Clone)]
pub struct BlockGlyphRasterizer;

impl BlockGlyphRasterizer {
    pub fn measure(text: &str, look: &LabelLook) -> (u32, u32) {
        let chars = text.chars().count() as f32;
        let w = (look.font_size_px * 0.6 * chars).ceil() as u32;
        let h = (look.font_size_px * 1.25).ceil() as u32;
        (w, h)
    }
}

impl LabelRasterizer for BlockGlyphRasterizer {
    fn rasterize(&self, text: &str, colors: LabelColors, look: &LabelLook) -> LabelBitmap {
        let text = text.trim();
        if text.is_empty() {
            return LabelBitmap::fallback();
        }
        let (w, h) = Self::measure(text, look);
        let [pad_x, pad_y] = look.padding_px;
        let cw = w + pad_x * 2;
        let ch = h + pad_y * 2;
        let (pw, ph) = (cw.next_power_of_two(), ch.next_power_of_two());
        let sx = pw as f32 / cw as f32;
        let sy = ph as f32 / ch as f32;
        let mut image = RgbaImage::new(pw, ph);

        let mut fill = |x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba| {
            let px = Pixel(color.to_rgba8());
            let (ax, bx) = ((x0 * sx).floor() as u32, ((x1 * sx).ceil() as u32).min(pw));
            let (ay, by) = ((y0 * sy).floor() as u32, ((y1 * sy).ceil() as u32).min(ph));
            for y in ay..by {
                for x in ax..bx {
                    image.put_pixel(x, y, px);
                }
            }
        };

        let advance = look.font_size_px * 0.6;
        let mid_y = ch as f32 * 0.5;
        let glyph_half = look.font_size_px * 0.35;
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x0 = pad_x as f32 + i as f32 * advance + advance * 0.15;
            let x1 = pad_x as f32 + (i + 1) as f32 * advance - advance * 0.15;
            fill(x0, mid_y - glyph_half, x1, mid_y + glyph_half, colors.text);
        }

        let underline_y = (mid_y + (look.font_size_px * 0.5).floor() + 1.0).min(ch as f32 - 1.0);
        fill(
            pad_x as f32,
            underline_y,
            (pad_x + w) as f32,
            underline_y + look.underline_px as f32,
            colors.underline,
        );

        LabelBitmap {
            image,
            width: cw,
            height: ch,
        }
    }
}

struct LabelEntry {
    label: Label,
    sprite: SpriteId,
    texture: Option<TextureId>,
}

/// Billboard country labels with hover styling and ray-cast hit testing.
pub struct LabelLayer<R = BlockGlyphRasterizer> {
    group: GroupId,
    projection: Projection,
    look: LabelLook,
    rasterizer: R,
    labels: Arena<LabelEntry>,
    by_code: BTreeMap<String, LabelId>,
}

impl<R: LabelRasterizer> LabelLayer<R> {
    pub fn new(world: &mut World, projection: Projection, look: LabelLook, rasterizer: R) -> Self {
        let group =
            world.add_group(SceneGroup::new("labels").with_render_order(LABEL_RENDER_ORDER));
        Self {
            group,
            projection,
            look,
            rasterizer,
            labels: Arena::new(),
            by_code: BTreeMap::new(),
        }
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn look(&self) -> &LabelLook {
        &self.look
    }

    pub fn add_label(
        &mut self,
        world: &mut World,
        textures: &mut TextureStore,
        text: &str,
        anchor: GeoCoordinate,
        country_code: &str,
    ) -> LabelId {
        let position = self.projection.project_at(anchor, LABEL_RADIUS).position();
        let bitmap = self
            .rasterizer
            .rasterize(text, self.look.colors(false), &self.look);
        let texture = textures.upload(format!("label:{country_code}"), &bitmap.image);
        let height = self.look.world_height;
        let sprite = world.add_sprite(
            self.group,
            Sprite::new(position, height * bitmap.aspect(), height).with_texture(texture),
        );
        let id = LabelId(self.labels.alloc(LabelEntry {
            label: Label {
                text: text.to_string(),
                anchor,
                country_code: country_code.to_string(),
                hovered: false,
            },
            sprite,
            texture: Some(texture),
        }));
        self.by_code.insert(country_code.to_string(), id);
        debug!(code = country_code, text, "label added");
        id
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(id.0).map(|e| &e.label)
    }

    pub fn sprite(&self, id: LabelId) -> Option<SpriteId> {
        self.labels.get(id.0).map(|e| e.sprite)
    }

    pub fn texture(&self, id: LabelId) -> Option<TextureId> {
        self.labels.get(id.0).and_then(|e| e.texture)
    }

    pub fn find_by_code(&self, code: &str) -> Option<LabelId> {
        self.by_code.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Nearest label under the pointer, tested against labels only.
    pub fn hit_test(&self, world: &World, camera: &Camera3D, ndc: (f64, f64)) -> Option<LabelId> {
        if !world.is_group_visible(self.group) {
            return None;
        }
        let ray = camera.ray_from_ndc(ndc.0, ndc.1)?;
        let basis = camera.basis()?;
        let items = self.labels.iter().filter_map(|(h, e)| {
            let s = world.sprite(e.sprite)?;
            Some((
                LabelId(h),
                Billboard {
                    center: s.position,
                    half_width: s.width * 0.5,
                    half_height: s.height * 0.5,
                    right: basis.right,
                    up: basis.up,
                },
            ))
        });
        pick_billboards(ray, items, PickOptions::default()).map(|hit| hit.key)
    }

    /// Returns true when the label changed state.
    pub fn on_hover(
        &mut self,
        world: &mut World,
        textures: &mut TextureStore,
        id: LabelId,
    ) -> bool {
        self.set_hovered(world, textures, id, true)
    }

    pub fn on_unhover(
        &mut self,
        world: &mut World,
        textures: &mut TextureStore,
        id: LabelId,
    ) -> bool {
        self.set_hovered(world, textures, id, false)
    }

    /// Country code behind a clicked label. Independent of hover state.
    pub fn on_click(&self, id: LabelId) -> Option<&str> {
        self.label(id).map(|l| l.country_code.as_str())
    }

    // The visual is rebuilt, never edited: a fresh bitmap replaces the old
    // texture, which is released before the new one is uploaded.
    fn set_hovered(
        &mut self,
        world: &mut World,
        textures: &mut TextureStore,
        id: LabelId,
        hovered: bool,
    ) -> bool {
        let Some(entry) = self.labels.get_mut(id.0) else {
            return false;
        };
        if entry.label.hovered == hovered {
            return false;
        }
        entry.label.hovered = hovered;

        let bitmap =
            self.rasterizer
                .rasterize(&entry.label.text, self.look.colors(hovered), &self.look);
        let label = format!("label:{}", entry.label.country_code);
        let texture = textures.replace(&mut entry.texture, label, &bitmap.image);
        if let Some(sprite) = world.sprite_mut(entry.sprite) {
            sprite.texture = Some(texture);
            sprite.height = self.look.world_height;
            sprite.width = self.look.world_height * bitmap.aspect();
        }
        true
    }
}
