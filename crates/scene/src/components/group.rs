/// A named visibility group. Children inherit `visible`, `scale` and
/// `render_order`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGroup {
    pub name: String,
    pub visible: bool,
    /// Uniform scale about the globe center.
    pub scale: f64,
    /// Larger values draw later.
    pub render_order: i32,
}

impl SceneGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            scale: 1.0,
            render_order: 0,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }
}
