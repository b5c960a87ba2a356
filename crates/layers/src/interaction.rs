use std::collections::BTreeMap;

use gpu::{Camera3D, TextureStore};
use scene::World;
use serde::{Deserialize, Serialize};

use crate::labels::{LabelId, LabelLayer, LabelRasterizer};

/// Cursor the host should show.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
}

/// Per-country navigation destinations keyed by 3-letter code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub routes: BTreeMap<String, String>,
    pub fallback: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        let routes = [
            ("BRA", "../countries/brazil.html"),
            ("POL", "../countries/poland.html"),
            ("KOR", "../countries/south-korea.html"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            routes,
            fallback: "/".to_string(),
        }
    }
}

impl RouteTable {
    pub fn resolve(&self, code: &str) -> &str {
        self.routes
            .get(code)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HoverChange {
    /// The hovered label changed; a repaint is owed.
    pub changed: bool,
    pub cursor: CursorHint,
}

/// Pointer state over the label layer.
#[derive(Debug, Default, Clone)]
pub struct Interaction {
    hovered: Option<LabelId>,
    routes: RouteTable,
}

impl Interaction {
    pub fn new(routes: RouteTable) -> Self {
        Self {
            hovered: None,
            routes,
        }
    }

    pub fn hovered(&self) -> Option<LabelId> {
        self.hovered
    }

    pub fn cursor(&self) -> CursorHint {
        if self.hovered.is_some() {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn pointer_move<R: LabelRasterizer>(
        &mut self,
        labels: &mut LabelLayer<R>,
        world: &mut World,
        textures: &mut TextureStore,
        camera: &Camera3D,
        ndc: (f64, f64),
    ) -> HoverChange {
        let hit = labels.hit_test(world, camera, ndc);
        self.set_hovered(labels, world, textures, hit)
    }

    /// Pointer left the canvas.
    pub fn pointer_leave<R: LabelRasterizer>(
        &mut self,
        labels: &mut LabelLayer<R>,
        world: &mut World,
        textures: &mut TextureStore,
    ) -> HoverChange {
        self.set_hovered(labels, world, textures, None)
    }

    /// Destination for a click at `ndc`, hit-tested afresh.
    pub fn click<R: LabelRasterizer>(
        &self,
        labels: &LabelLayer<R>,
        world: &World,
        camera: &Camera3D,
        ndc: (f64, f64),
    ) -> Option<String> {
        let id = labels.hit_test(world, camera, ndc)?;
        let code = labels.on_click(id)?;
        Some(self.routes.resolve(code).to_string())
    }

    fn set_hovered<R: LabelRasterizer>(
        &mut self,
        labels: &mut LabelLayer<R>,
        world: &mut World,
        textures: &mut TextureStore,
        next: Option<LabelId>,
    ) -> HoverChange {
        if next == self.hovered {
            return HoverChange {
                changed: false,
                cursor: self.cursor(),
            };
        }
        if let Some(prev) = self.hovered.take() {
            labels.on_unhover(world, textures, prev);
        }
        if let Some(id) = next {
            labels.on_hover(world, textures, id);
        }
        self.hovered = next;
        HoverChange {
            changed: true,
            cursor: self.cursor(),
        }
    }
}
