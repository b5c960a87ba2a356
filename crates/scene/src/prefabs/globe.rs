use foundation::color::Rgba;

use crate::World;
use crate::components::{Blending, SceneGroup, Side, Sphere, SurfaceMaterial};
use crate::entity::{GroupId, ShapeId};

pub const GLOBE_RADIUS: f64 = 1.0;
pub const ATMOSPHERE_RADIUS: f64 = 1.07;
pub const ATMOSPHERE_SCALE: f64 = 1.1;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeParts {
    pub group: GroupId,
    pub earth: ShapeId,
    pub atmosphere_group: GroupId,
    pub atmosphere: ShapeId,
}

/// Textured unit sphere plus an additive back-face atmosphere shell.
pub fn spawn_globe(world: &mut World, texture_url: &str) -> GlobeParts {
    let group = world.add_group(SceneGroup::new("globe"));
    let earth = world.add_shape(
        group,
        Sphere::new(
            GLOBE_RADIUS,
            SurfaceMaterial {
                texture_url: Some(texture_url.to_string()),
                ..SurfaceMaterial::default()
            },
        ),
    );

    let atmosphere_group =
        world.add_group(SceneGroup::new("atmosphere").with_scale(ATMOSPHERE_SCALE));
    let atmosphere = world.add_shape(
        atmosphere_group,
        Sphere::new(
            ATMOSPHERE_RADIUS,
            SurfaceMaterial {
                color: Rgba::new(0.55, 0.7, 1.0, 0.25),
                texture_url: None,
                blending: Blending::Additive,
                side: Side::Back,
                transparent: true,
            },
        ),
    );

    GlobeParts {
        group,
        earth,
        atmosphere_group,
        atmosphere,
    }
}
