use scene::World;
use scene::components::{GeoMesh, SceneGroup};
use scene::entity::{GroupId, MeshId};
use tracing::{info, warn};

/// Load state of one raster layer, shown inline next to its list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerStatus {
    Pending,
    Ready { cells: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerListEntry {
    pub key: String,
    pub name: String,
    pub active: bool,
    pub status: LayerStatus,
}

#[derive(Debug, Clone)]
struct RasterLayerEntry {
    key: String,
    name: String,
    group: GroupId,
    mesh: Option<MeshId>,
    status: LayerStatus,
}

/// Pre-created raster scene entries. Exactly one is visible at a time;
/// switching is a visibility flip, never a rebuild.
#[derive(Debug, Default)]
pub struct RasterLayerSet {
    entries: Vec<RasterLayerEntry>,
    active: Option<usize>,
}

impl RasterLayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty, hidden entry. The first entry becomes active.
    pub fn register(&mut self, world: &mut World, key: &str, name: &str) -> GroupId {
        let first = self.entries.is_empty();
        let mut group = SceneGroup::new(format!("raster:{key}"));
        if !first {
            group = group.hidden();
        }
        let group = world.add_group(group);
        self.entries.push(RasterLayerEntry {
            key: key.to_string(),
            name: name.to_string(),
            group,
            mesh: None,
            status: LayerStatus::Pending,
        });
        if first {
            self.active = Some(0);
        }
        group
    }

    /// Puts a freshly built mesh into the layer's entry, replacing any
    /// earlier one. Visibility is untouched.
    pub fn install_mesh(&mut self, world: &mut World, key: &str, mesh: GeoMesh) -> Option<MeshId> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) else {
            warn!(key, "mesh for unknown raster layer dropped");
            return None;
        };
        world.clear_group(entry.group);
        let cells = mesh.cell_count();
        let id = world.add_mesh(entry.group, mesh);
        entry.mesh = Some(id);
        entry.status = LayerStatus::Ready { cells };
        Some(id)
    }

    pub fn mark_failed(&mut self, key: &str, message: impl Into<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.status = LayerStatus::Failed {
                message: message.into(),
            };
        }
    }

    /// Makes `key` the only visible layer. Returns true when anything changed.
    pub fn select(&mut self, world: &mut World, key: &str) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.key == key) else {
            warn!(key, "unknown raster layer");
            return false;
        };
        let mut changed = false;
        for (i, entry) in self.entries.iter().enumerate() {
            changed |= world.set_group_visible(entry.group, i == index);
        }
        if self.active != Some(index) {
            info!(key, "raster layer selected");
            changed = true;
        }
        self.active = Some(index);
        changed
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.entries.get(i))
            .map(|e| e.key.as_str())
    }

    pub fn group(&self, key: &str) -> Option<GroupId> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.group)
    }

    pub fn mesh(&self, key: &str) -> Option<MeshId> {
        self.entries.iter().find(|e| e.key == key).and_then(|e| e.mesh)
    }

    pub fn status(&self, key: &str) -> Option<&LayerStatus> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.status)
    }

    /// Entries in registration order for the layer list UI.
    pub fn list(&self) -> Vec<LayerListEntry> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| LayerListEntry {
                key: e.key.clone(),
                name: e.name.clone(),
                active: self.active == Some(i),
                status: e.status.clone(),
            })
            .collect()
    }
}
