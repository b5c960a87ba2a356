use std::collections::BTreeMap;
use std::f64::consts::PI;

use formats::{BoundaryFeature, RasterGrid};
use foundation::color::Rgba;
use foundation::math::{GeoCoordinate, Projection, Vec3};
use foundation::time::Time;
use gpu::{
    Camera3D, OrbitControls, OrbitSettings, RenderFrame, Renderer, Spherical, TextureStore,
    Viewport,
};
use layers::boundary::BoundaryRenderer;
use layers::error::GeometryError;
use layers::interaction::{CursorHint, Interaction};
use layers::labels::{BlockGlyphRasterizer, LabelId, LabelLayer, LabelLook};
use layers::layer_set::{LayerListEntry, RasterLayerSet};
use layers::ramp::ColorRamp;
use layers::raster::build_mesh;
use layers::symbology::RasterSymbology;
use runtime::{Easing, Frame, RenderScheduler, RenderState, Stimulus, TweenId, TweenManager};
use scene::prefabs::{spawn_globe, GlobeParts};
use scene::World;
use tracing::{debug, error, info, warn};

use crate::config::ViewerConfig;
use crate::countries::CountryRegistry;
use crate::loader::{LoadError, LoadOutcome};

/// Receives navigation requests from label clicks.
pub trait Navigator {
    fn navigate(&mut self, destination: &str);
}

/// Keeps every destination it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, destination: &str) {
        self.visited.push(destination.to_string());
    }
}

/// A user-visible inline message about a dataset that failed to load.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub source: String,
    pub text: String,
}

/// One viewer session: scene, camera, scheduler and the loaded layers.
pub struct GlobeViewer {
    config: ViewerConfig,
    projection: Projection,
    world: World,
    textures: TextureStore,
    camera: Camera3D,
    controls: OrbitControls,
    viewport: Viewport,
    scheduler: RenderScheduler,
    tweens: TweenManager,
    focus: Option<TweenId>,
    globe: GlobeParts,
    rasters: RasterLayerSet,
    symbology: BTreeMap<String, RasterSymbology>,
    boundaries: BoundaryRenderer,
    labels: LabelLayer<BlockGlyphRasterizer>,
    interaction: Interaction,
    countries: CountryRegistry,
    messages: Vec<StatusMessage>,
    last_frame: Option<Frame>,
}

impl GlobeViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let projection = Projection::new(config.projection.offsets());
        let mut world = World::new();
        let mut textures = TextureStore::new();

        let globe = spawn_globe(&mut world, &config.globe_texture_url);
        let boundaries = BoundaryRenderer::new(&mut world, projection);

        let mut rasters = RasterLayerSet::new();
        let mut symbology = BTreeMap::new();
        let mut messages = Vec::new();
        for dataset in &config.datasets {
            rasters.register(&mut world, &dataset.key, &dataset.name);
            match ramp_from_config(&dataset.ramp) {
                Some(ramp) => {
                    symbology.insert(
                        dataset.key.clone(),
                        RasterSymbology::new(ramp).with_budget(dataset.cell_budget),
                    );
                }
                None => {
                    let text = format!("invalid color ramp {:?}", dataset.ramp);
                    warn!(key = %dataset.key, %text, "dataset disabled");
                    rasters.mark_failed(&dataset.key, text.clone());
                    messages.push(StatusMessage {
                        source: dataset.key.clone(),
                        text,
                    });
                }
            }
        }

        let mut labels = LabelLayer::new(
            &mut world,
            projection,
            LabelLook::default(),
            BlockGlyphRasterizer,
        );
        for country in &config.countries {
            labels.add_label(
                &mut world,
                &mut textures,
                &country.name,
                GeoCoordinate::new(country.label_lat, country.label_lon),
                &country.code,
            );
        }

        let cam = config.camera;
        let mut camera = Camera3D::look_at(
            Vec3::new(cam.distance, 0.0, 0.0),
            Vec3::ZERO,
            cam.fov_deg.to_radians(),
            cam.near,
            cam.far,
        );
        let viewport = Viewport::new(config.viewport[0], config.viewport[1]);
        camera.set_aspect(viewport.aspect());
        let controls = OrbitControls::new(OrbitSettings {
            min_distance: cam.min_distance,
            max_distance: cam.max_distance,
            enable_damping: cam.damping,
            ..OrbitSettings::default()
        });

        let mut scheduler = RenderScheduler::new();
        scheduler.request_render();

        info!(
            datasets = config.datasets.len(),
            countries = config.countries.len(),
            "globe viewer ready"
        );

        Self {
            interaction: Interaction::new(config.routes.clone()),
            config,
            projection,
            world,
            textures,
            camera,
            controls,
            viewport,
            scheduler,
            tweens: TweenManager::new(),
            focus: None,
            globe,
            rasters,
            symbology,
            boundaries,
            labels,
            countries: CountryRegistry::new(),
            messages,
            last_frame: None,
        }
    }

    /// Builds the dataset's mesh into its pre-created entry. Returns the
    /// number of emitted cells, or `None` for an unknown or disabled dataset.
    pub fn apply_raster(&mut self, key: &str, grid: &RasterGrid) -> Option<usize> {
        let Some(symbology) = self.symbology.get(key) else {
            warn!(key, "no symbology for raster; skipped");
            return None;
        };
        let mesh = build_mesh(
            grid,
            &symbology.ramp,
            symbology.cell_budget,
            &self.projection,
            &symbology.mesh,
        );
        let cells = mesh.cell_count();
        self.rasters.install_mesh(&mut self.world, key, mesh)?;
        info!(key, cells, "raster layer ready");
        self.scheduler.notify(Stimulus::DataLoaded);
        Some(cells)
    }

    /// Registers a selected country's features and draws its outlines.
    pub fn apply_country(
        &mut self,
        code: &str,
        features: Vec<BoundaryFeature>,
    ) -> Result<usize, GeometryError> {
        let name = self
            .config
            .countries
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| code.to_string());
        let mut lines = 0usize;
        let mut last_err = None;
        for feature in features {
            let feature = feature.with_identity(name.clone(), code);
            match self.boundaries.add_selected(&mut self.world, &feature) {
                Ok(n) => lines += n,
                Err(e) => last_err = Some(e),
            }
            self.countries.insert(feature);
        }
        self.scheduler.notify(Stimulus::DataLoaded);
        match (lines, last_err) {
            (0, Some(e)) => Err(e),
            (0, None) => Err(GeometryError::EmptyFeature {
                code: code.to_string(),
            }),
            _ => Ok(lines),
        }
    }

    pub fn apply_global_boundaries(&mut self, features: &[BoundaryFeature]) -> usize {
        let lines = self.boundaries.add_global(&mut self.world, features);
        self.scheduler.notify(Stimulus::DataLoaded);
        lines
    }

    /// Applies one finished load. Failures are logged, recorded as an inline
    /// message and leave every other layer untouched.
    pub fn apply_outcome(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Raster { key, result } => match result {
                Ok(grid) => {
                    self.apply_raster(&key, &grid);
                }
                Err(e) => {
                    self.rasters.mark_failed(&key, e.to_string());
                    self.report(&key, &e);
                }
            },
            LoadOutcome::Country { code, result } => match result {
                Ok(features) => {
                    if let Err(e) = self.apply_country(&code, features) {
                        warn!(code = %code, error = %e, "country outline not drawn");
                        self.messages.push(StatusMessage {
                            source: code,
                            text: e.to_string(),
                        });
                    }
                }
                Err(e) => self.report(&code, &e),
            },
            LoadOutcome::GlobalBoundaries { result } => match result {
                Ok(features) => {
                    self.apply_global_boundaries(&features);
                }
                Err(e) => self.report("global_boundaries", &e),
            },
        }
    }

    fn report(&mut self, source: &str, err: &LoadError) {
        error!(source, error = %err, "dataset failed to load");
        self.messages.push(StatusMessage {
            source: source.to_string(),
            text: err.to_string(),
        });
    }

    /// Shows only `key`'s raster layer.
    pub fn select_layer(&mut self, key: &str) -> bool {
        let changed = self.rasters.select(&mut self.world, key);
        if changed {
            self.scheduler.notify(Stimulus::LayerSwap);
        }
        changed
    }

    /// Pointer moved to pixel `(x, y)`; updates hover state.
    pub fn pointer_move(&mut self, x_px: f64, y_px: f64) -> CursorHint {
        let ndc = self.viewport.pixel_to_ndc(x_px, y_px);
        let change = self.interaction.pointer_move(
            &mut self.labels,
            &mut self.world,
            &mut self.textures,
            &self.camera,
            ndc,
        );
        if change.changed {
            self.scheduler.notify(Stimulus::PointerMove);
        }
        change.cursor
    }

    pub fn pointer_leave(&mut self) {
        let change =
            self.interaction
                .pointer_leave(&mut self.labels, &mut self.world, &mut self.textures);
        if change.changed {
            self.scheduler.notify(Stimulus::PointerMove);
        }
    }

    /// Click at pixel `(x, y)`. A label hit navigates to its country's
    /// destination.
    pub fn click<N: Navigator>(
        &mut self,
        x_px: f64,
        y_px: f64,
        navigator: &mut N,
    ) -> Option<String> {
        let ndc = self.viewport.pixel_to_ndc(x_px, y_px);
        let destination = self
            .interaction
            .click(&self.labels, &self.world, &self.camera, ndc)?;
        info!(%destination, "navigating");
        navigator.navigate(&destination);
        self.scheduler.notify(Stimulus::Click);
        Some(destination)
    }

    /// Orbit drag in pixels.
    pub fn drag(&mut self, dx_px: f64, dy_px: f64) {
        self.controls
            .rotate(dx_px, dy_px, self.viewport.height_px as f64);
        self.scheduler.notify(Stimulus::CameraChange);
    }

    pub fn wheel(&mut self, steps: f64) {
        self.controls.zoom(steps);
        self.scheduler.notify(Stimulus::CameraChange);
    }

    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        let viewport = Viewport::new(width_px, height_px);
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        self.scheduler.notify(Stimulus::Resize);
    }

    /// Turns the camera to face `code`'s label anchor. Returns false for an
    /// unknown code.
    pub fn focus_country(&mut self, code: &str, now: Time) -> bool {
        let Some(country) = self.config.countries.iter().find(|c| c.code == code) else {
            warn!(code, "focus on unknown country");
            return false;
        };
        let anchor = GeoCoordinate::new(country.label_lat, country.label_lon);
        let dir = self.projection.project_at(anchor, 1.0).position();
        let mut target = Spherical::from_offset(dir.scale(self.config.camera.focus_distance));
        let current = self.controls.spherical(&self.camera);
        // Take the short way round.
        while target.azimuth - current.azimuth > PI {
            target.azimuth -= 2.0 * PI;
        }
        while target.azimuth - current.azimuth < -PI {
            target.azimuth += 2.0 * PI;
        }

        if let Some(old) = self.focus.take() {
            self.tweens.remove(old);
        }
        let id = self.tweens.create(
            &[current.azimuth, current.polar, current.distance],
            &[target.azimuth, target.polar, target.distance],
            self.config.camera.focus_duration_s,
            Easing::QuadraticInOut,
            now,
        );
        self.focus = Some(id);
        self.scheduler.notify(Stimulus::AnimationTick);
        debug!(code, "focus tween started");
        true
    }

    /// Paint callback. Paints only when something requested it; returns the
    /// draw list when a paint happened.
    pub fn frame(&mut self, now: Time) -> Option<RenderFrame> {
        let frame = self.scheduler.begin_frame(now)?;

        self.controls.update(&mut self.camera);
        let tweening = self.tweens.update(now);
        if let Some(id) = self.focus {
            if let Some(&[azimuth, polar, distance]) = self.tweens.value(id) {
                self.controls.jump_to(
                    &mut self.camera,
                    Spherical {
                        azimuth,
                        polar,
                        distance,
                    },
                );
            }
            if !self.tweens.is_running(id) {
                self.tweens.remove(id);
                self.focus = None;
            }
        }
        self.tweens.drain_completed();

        let out = Renderer::collect(&self.world, &self.camera, self.viewport, &self.textures);
        self.scheduler
            .end_frame(tweening || self.controls.is_settling());
        self.last_frame = Some(frame);
        Some(out)
    }

    pub fn layer_list(&self) -> Vec<LayerListEntry> {
        self.rasters.list()
    }

    pub fn active_layer(&self) -> Option<&str> {
        self.rasters.active_key()
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn countries(&self) -> &CountryRegistry {
        &self.countries
    }

    pub fn render_state(&self) -> RenderState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn hovered_label(&self) -> Option<LabelId> {
        self.interaction.hovered()
    }

    pub fn cursor(&self) -> CursorHint {
        self.interaction.cursor()
    }

    pub fn label_for(&self, code: &str) -> Option<LabelId> {
        self.labels.find_by_code(code)
    }

    pub fn labels(&self) -> &LabelLayer<BlockGlyphRasterizer> {
        &self.labels
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn boundaries(&self) -> &BoundaryRenderer {
        &self.boundaries
    }

    pub fn rasters(&self) -> &RasterLayerSet {
        &self.rasters
    }

    pub fn globe(&self) -> GlobeParts {
        self.globe
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame
    }

    /// Pixel position of a label's anchor, if it is in front of the camera.
    pub fn label_screen_position(&self, code: &str) -> Option<(f64, f64)> {
        let id = self.labels.find_by_code(code)?;
        let sprite = self.world.sprite(self.labels.sprite(id)?)?;
        let ndc = self.camera.project_to_ndc(sprite.position)?;
        Some(self.viewport.ndc_to_pixel(ndc[0], ndc[1]))
    }
}

fn ramp_from_config(colors: &[String]) -> Option<ColorRamp> {
    let parsed: Option<Vec<Rgba>> = colors.iter().map(|c| Rgba::parse(c)).collect();
    ColorRamp::evenly_spaced(&parsed?)
}
