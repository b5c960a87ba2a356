use foundation::math::Vec3;
use scene::components::LineStyle;
use scene::entity::{GroupId, LineId, MeshId, ShapeId, SpriteId, TextureId};
use scene::world::World;
use tracing::warn;

use crate::camera::{Camera3D, Viewport};
use crate::textures::TextureStore;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RenderCommand {
    Sphere {
        shape: ShapeId,
        radius: f64,
        scale: f64,
    },
    Mesh {
        mesh: MeshId,
        scale: f64,
        index_count: usize,
    },
    Lines {
        line: LineId,
        scale: f64,
        style: LineStyle,
        /// Pixel widths resolve against this.
        resolution: [u32; 2],
    },
    Sprite {
        sprite: SpriteId,
        center: Vec3,
        width: f64,
        height: f64,
        texture: Option<TextureId>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawItem {
    pub group: GroupId,
    pub render_order: i32,
    pub command: RenderCommand,
}

#[derive(Debug, Default)]
pub struct RenderFrame {
    pub items: Vec<DrawItem>,
}

impl RenderFrame {
    pub fn commands(&self) -> impl Iterator<Item = &RenderCommand> {
        self.items.iter().map(|i| &i.command)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct Renderer;

impl Renderer {
    /// Flattens visible groups into draw items. Within a group, shapes draw
    /// first, then meshes, lines and sprites.
    pub fn collect(
        world: &World,
        _camera: &Camera3D,
        viewport: Viewport,
        textures: &TextureStore,
    ) -> RenderFrame {
        let mut frame = RenderFrame::default();
        for (group, g) in world.visible_groups() {
            let push = |frame: &mut RenderFrame, command: RenderCommand| {
                frame.items.push(DrawItem {
                    group,
                    render_order: g.render_order,
                    command,
                })
            };
            for (shape, s) in world.shapes_in(group) {
                push(
                    &mut frame,
                    RenderCommand::Sphere {
                        shape,
                        radius: s.radius,
                        scale: g.scale,
                    },
                );
            }
            for (mesh, m) in world.meshes_in(group) {
                if m.is_empty() {
                    continue;
                }
                push(
                    &mut frame,
                    RenderCommand::Mesh {
                        mesh,
                        scale: g.scale,
                        index_count: m.indices.len(),
                    },
                );
            }
            for (line, l) in world.lines_in(group) {
                push(
                    &mut frame,
                    RenderCommand::Lines {
                        line,
                        scale: g.scale,
                        style: l.style,
                        resolution: [viewport.width_px, viewport.height_px],
                    },
                );
            }
            for (sprite, s) in world.sprites_in(group) {
                let texture = match s.texture {
                    Some(t) if textures.contains(t) => Some(t),
                    Some(t) => {
                        warn!(texture = t.index(), "sprite references released texture");
                        None
                    }
                    None => None,
                };
                push(
                    &mut frame,
                    RenderCommand::Sprite {
                        sprite,
                        center: s.position.scale(g.scale),
                        width: s.width * g.scale,
                        height: s.height * g.scale,
                        texture,
                    },
                );
            }
        }
        frame
    }
}
