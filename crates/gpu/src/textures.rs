use foundation::arena::Arena;
use image::RgbaImage;
use scene::entity::TextureId;
use tracing::debug;

/// CPU-side record of an uploaded RGBA8 texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Texture {
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}

/// Owns every live texture. Textures are released explicitly; replacing a
/// slot releases the previous texture first.
#[derive(Default)]
pub struct TextureStore {
    textures: Arena<Texture>,
    uploaded: u64,
    released: u64,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&mut self, label: impl Into<String>, image: &RgbaImage) -> TextureId {
        let texture = Texture {
            label: label.into(),
            width: image.width(),
            height: image.height(),
            pixels: image.as_raw().clone(),
        };
        debug!(
            label = %texture.label,
            width = texture.width,
            height = texture.height,
            "texture upload"
        );
        self.uploaded += 1;
        TextureId(self.textures.alloc(texture))
    }

    /// Returns false for an id that was already released.
    pub fn release(&mut self, id: TextureId) -> bool {
        let released = self.textures.remove(id.0).is_some();
        if released {
            self.released += 1;
        }
        released
    }

    /// Releases whatever `slot` holds, then uploads `image` into it.
    pub fn replace(
        &mut self,
        slot: &mut Option<TextureId>,
        label: impl Into<String>,
        image: &RgbaImage,
    ) -> TextureId {
        if let Some(old) = slot.take() {
            self.release(old);
        }
        let id = self.upload(label, image);
        *slot = Some(id);
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.textures.contains(id.0)
    }

    pub fn live_count(&self) -> usize {
        self.textures.len()
    }

    pub fn uploaded_total(&self) -> u64 {
        self.uploaded
    }

    pub fn released_total(&self) -> u64 {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::TextureStore;
    use image::RgbaImage;

    #[test]
    fn replace_releases_previous() {
        let mut store = TextureStore::new();
        let mut slot = None;
        let a = store.replace(&mut slot, "label", &RgbaImage::new(4, 4));
        let b = store.replace(&mut slot, "label", &RgbaImage::new(8, 4));
        assert_eq!(slot, Some(b));
        assert!(!store.contains(a));
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.uploaded_total(), 2);
        assert_eq!(store.released_total(), 1);
        assert_eq!(store.get(b).map(|t| t.width), Some(8));
    }

    #[test]
    fn double_release_is_noop() {
        let mut store = TextureStore::new();
        let id = store.upload("x", &RgbaImage::new(2, 2));
        assert!(store.release(id));
        assert!(!store.release(id));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn pixels_are_rgba8() {
        let mut store = TextureStore::new();
        let id = store.upload("x", &RgbaImage::new(2, 2));
        let tex = store.get(id).expect("live");
        assert_eq!(tex.pixels.len(), 16);
        assert!(tex.is_power_of_two());
    }
}
