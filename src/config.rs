use slint::Color;

/// Tunables shared by the drag controller and the channel renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    /// Snap radius around pins and channel hubs, in screen units
    pub snap_threshold: f32,
    /// Minimum bezier control point offset
    pub bezier_offset: f32,
    /// Stroke width reported for channel paths
    pub line_width: f32,
    /// Pin color while unattached
    pub idle_color: Color,
    /// Pin color while snapped to a channel
    pub active_color: Color,
    /// Pin color after a refused connection
    pub error_color: Color,
    type_colors: Vec<(String, Color)>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 20.0,
            bezier_offset: 50.0,
            line_width: 2.0,
            idle_color: Color::from_rgb_u8(200, 200, 200),
            active_color: Color::from_rgb_u8(100, 180, 255),
            error_color: Color::from_rgb_u8(229, 115, 115),
            type_colors: Vec::new(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snap_threshold(mut self, threshold: f32) -> Self {
        self.snap_threshold = threshold;
        self
    }

    pub fn with_bezier_offset(mut self, offset: f32) -> Self {
        self.bezier_offset = offset;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Color channels carrying `data_type` with `color`.
    pub fn with_type_color(mut self, data_type: impl Into<String>, color: Color) -> Self {
        let data_type = data_type.into();
        match self.type_colors.iter_mut().find(|(t, _)| *t == data_type) {
            Some(entry) => entry.1 = color,
            None => self.type_colors.push((data_type, color)),
        }
        self
    }

    /// Color for a channel of `data_type`; unregistered types use the idle color.
    pub fn type_color(&self, data_type: &str) -> Color {
        self.type_colors
            .iter()
            .find(|(t, _)| t == data_type)
            .map(|(_, color)| *color)
            .unwrap_or(self.idle_color)
    }
}
