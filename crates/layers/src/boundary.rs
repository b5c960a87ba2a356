use std::collections::BTreeMap;

use foundation::color::Rgba;
use foundation::math::{GeoCoordinate, Projection, Vec3};
use formats::BoundaryFeature;
use scene::World;
use scene::components::{Blending, LineStyle, Polyline, SceneGroup};
use scene::entity::{GroupId, LineId};
use tracing::{debug, warn};

use crate::error::GeometryError;

/// Glow group inflation, enough to clear the base outline without z-fighting.
pub const GLOW_SCALE: f64 = 1.03;
pub const GLOW_RENDER_ORDER: i32 = 999;

/// Line presets for country and context boundaries.
pub mod styles {
    use super::*;

    /// Soft outline drawn under the crisp one for selected countries.
    pub fn selected_outline() -> LineStyle {
        LineStyle {
            color: Rgba::from_rgb_u32(0xa2a6b1),
            opacity: 0.5,
            ..LineStyle::default()
        }
    }

    pub fn thin_outline() -> LineStyle {
        LineStyle {
            color: Rgba::from_rgb_u32(0x0f0f0f),
            opacity: 0.9,
            width_px: 0.6,
            ..LineStyle::default()
        }
    }

    pub fn glow() -> LineStyle {
        LineStyle {
            color: Rgba::from_rgb_u32(0xffd24d),
            opacity: 0.9,
            width_px: 2.0,
            blending: Blending::Additive,
            depth_test: false,
            depth_write: false,
        }
    }

    pub fn global_boundaries() -> LineStyle {
        LineStyle {
            color: Rgba::from_rgb_u32(0xbfc5cc),
            opacity: 0.25,
            depth_write: false,
            ..LineStyle::default()
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundaryGroups {
    pub country_outline: GroupId,
    pub country_glow: GroupId,
    pub global_boundaries: GroupId,
}

/// Reprojects boundary rings onto the sphere as polylines.
pub struct BoundaryRenderer {
    projection: Projection,
    groups: BoundaryGroups,
    lines_by_code: BTreeMap<String, Vec<LineId>>,
}

impl BoundaryRenderer {
    /// Creates the outline, glow and global-boundary groups.
    pub fn new(world: &mut World, projection: Projection) -> Self {
        let groups = BoundaryGroups {
            global_boundaries: world.add_group(SceneGroup::new("global_boundaries")),
            country_outline: world.add_group(SceneGroup::new("country_outline")),
            country_glow: world.add_group(
                SceneGroup::new("country_glow")
                    .with_scale(GLOW_SCALE)
                    .with_render_order(GLOW_RENDER_ORDER),
            ),
        };
        Self {
            projection,
            groups,
            lines_by_code: BTreeMap::new(),
        }
    }

    pub fn groups(&self) -> BoundaryGroups {
        self.groups
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Projects one ring. Open rings are closed.
    pub fn ring_points(&self, ring: &[GeoCoordinate]) -> Result<Vec<Vec3>, GeometryError> {
        let finite: Vec<GeoCoordinate> = ring.iter().copied().filter(|c| c.is_finite()).collect();
        if finite.len() < 2 {
            return Err(GeometryError::DegenerateRing {
                points: finite.len(),
            });
        }
        let mut points: Vec<Vec3> = finite
            .iter()
            .map(|c| self.projection.project(*c).position())
            .collect();
        if finite.len() > 2 && finite.first() != finite.last() {
            points.push(points[0]);
        }
        Ok(points)
    }

    /// Adds every ring of `feature` to `group` with one shared style.
    ///
    /// Degenerate rings are skipped. Fails only when nothing was drawable.
    pub fn add_outline(
        &mut self,
        world: &mut World,
        feature: &BoundaryFeature,
        group: GroupId,
        style: LineStyle,
    ) -> Result<usize, GeometryError> {
        let mut added = 0usize;
        for ring in &feature.rings {
            let points = match self.ring_points(ring) {
                Ok(p) => p,
                Err(e) => {
                    warn!(code = %feature.code, error = %e, "skipping ring");
                    continue;
                }
            };
            let id = world.add_line(group, Polyline::new(points, style));
            self.lines_by_code
                .entry(feature.code.clone())
                .or_default()
                .push(id);
            added += 1;
        }
        if added == 0 {
            return Err(GeometryError::EmptyFeature {
                code: feature.code.clone(),
            });
        }
        Ok(added)
    }

    /// Selected country: soft and crisp outlines plus the additive glow pass.
    pub fn add_selected(
        &mut self,
        world: &mut World,
        feature: &BoundaryFeature,
    ) -> Result<usize, GeometryError> {
        let outline = self.groups.country_outline;
        let glow = self.groups.country_glow;
        let mut n = self.add_outline(world, feature, outline, styles::selected_outline())?;
        n += self.add_outline(world, feature, outline, styles::thin_outline())?;
        n += self.add_outline(world, feature, glow, styles::glow())?;
        debug!(code = %feature.code, lines = n, "selected outline added");
        Ok(n)
    }

    /// Low-opacity context layer. Undrawable features are logged and skipped.
    pub fn add_global(&mut self, world: &mut World, features: &[BoundaryFeature]) -> usize {
        let group = self.groups.global_boundaries;
        let mut lines = 0usize;
        for feature in features {
            match self.add_outline(world, feature, group, styles::global_boundaries()) {
                Ok(n) => lines += n,
                Err(e) => warn!(name = %feature.name, error = %e, "global boundary skipped"),
            }
        }
        debug!(features = features.len(), lines, "global boundaries added");
        lines
    }

    pub fn lines_for(&self, code: &str) -> &[LineId] {
        self.lines_by_code.get(code).map(Vec::as_slice).unwrap_or(&[])
    }
}
