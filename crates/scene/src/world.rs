use foundation::arena::Arena;

use crate::components::{GeoMesh, Polyline, SceneGroup, Sphere, Sprite};
use crate::entity::{GroupId, LineId, MeshId, ShapeId, SpriteId};

/// An object parented to a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub group: GroupId,
    pub value: T,
}

/// Retained scene: groups plus the meshes, lines, sprites and shapes
/// parented to them.
#[derive(Default)]
pub struct World {
    groups: Arena<SceneGroup>,
    meshes: Arena<Node<GeoMesh>>,
    lines: Arena<Node<Polyline>>,
    sprites: Arena<Node<Sprite>>,
    shapes: Arena<Node<Sphere>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: SceneGroup) -> GroupId {
        GroupId(self.groups.alloc(group))
    }

    pub fn group(&self, id: GroupId) -> Option<&SceneGroup> {
        self.groups.get(id.0)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut SceneGroup> {
        self.groups.get_mut(id.0)
    }

    pub fn find_group(&self, name: &str) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, g)| g.name == name)
            .map(|(h, _)| GroupId(h))
    }

    /// Returns true when the flag actually changed.
    pub fn set_group_visible(&mut self, id: GroupId, visible: bool) -> bool {
        match self.groups.get_mut(id.0) {
            Some(g) if g.visible != visible => {
                g.visible = visible;
                true
            }
            _ => false,
        }
    }

    pub fn is_group_visible(&self, id: GroupId) -> bool {
        self.group(id).is_some_and(|g| g.visible)
    }

    /// Drops every child of `id` but keeps the group itself.
    pub fn clear_group(&mut self, id: GroupId) {
        retain_children(&mut self.meshes, id);
        retain_children(&mut self.lines, id);
        retain_children(&mut self.sprites, id);
        retain_children(&mut self.shapes, id);
    }

    pub fn add_mesh(&mut self, group: GroupId, mesh: GeoMesh) -> MeshId {
        MeshId(self.meshes.alloc(Node { group, value: mesh }))
    }

    pub fn mesh(&self, id: MeshId) -> Option<&GeoMesh> {
        self.meshes.get(id.0).map(|n| &n.value)
    }

    pub fn add_line(&mut self, group: GroupId, line: Polyline) -> LineId {
        LineId(self.lines.alloc(Node { group, value: line }))
    }

    pub fn line(&self, id: LineId) -> Option<&Polyline> {
        self.lines.get(id.0).map(|n| &n.value)
    }

    pub fn add_sprite(&mut self, group: GroupId, sprite: Sprite) -> SpriteId {
        SpriteId(self.sprites.alloc(Node {
            group,
            value: sprite,
        }))
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.0).map(|n| &n.value)
    }

    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(id.0).map(|n| &mut n.value)
    }

    pub fn add_shape(&mut self, group: GroupId, shape: Sphere) -> ShapeId {
        ShapeId(self.shapes.alloc(Node {
            group,
            value: shape,
        }))
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Sphere> {
        self.shapes.get(id.0).map(|n| &n.value)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn meshes_in(&self, group: GroupId) -> impl Iterator<Item = (MeshId, &GeoMesh)> {
        self.meshes
            .iter()
            .filter(move |(_, n)| n.group == group)
            .map(|(h, n)| (MeshId(h), &n.value))
    }

    pub fn lines_in(&self, group: GroupId) -> impl Iterator<Item = (LineId, &Polyline)> {
        self.lines
            .iter()
            .filter(move |(_, n)| n.group == group)
            .map(|(h, n)| (LineId(h), &n.value))
    }

    pub fn sprites_in(&self, group: GroupId) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.sprites
            .iter()
            .filter(move |(_, n)| n.group == group)
            .map(|(h, n)| (SpriteId(h), &n.value))
    }

    pub fn shapes_in(&self, group: GroupId) -> impl Iterator<Item = (ShapeId, &Sphere)> {
        self.shapes
            .iter()
            .filter(move |(_, n)| n.group == group)
            .map(|(h, n)| (ShapeId(h), &n.value))
    }

    /// Visible groups in draw order: ascending `render_order`, then creation
    /// slot.
    pub fn visible_groups(&self) -> Vec<(GroupId, &SceneGroup)> {
        let mut out: Vec<(GroupId, &SceneGroup)> = self
            .groups
            .iter()
            .filter(|(_, g)| g.visible)
            .map(|(h, g)| (GroupId(h), g))
            .collect();
        out.sort_by(|(a_id, a), (b_id, b)| {
            a.render_order
                .cmp(&b.render_order)
                .then_with(|| a_id.index().cmp(&b_id.index()))
        });
        out
    }
}

fn retain_children<T>(arena: &mut Arena<Node<T>>, group: GroupId) {
    let doomed: Vec<_> = arena
        .iter()
        .filter(|(_, n)| n.group == group)
        .map(|(h, _)| h)
        .collect();
    for h in doomed {
        arena.remove(h);
    }
}
