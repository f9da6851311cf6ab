//! Viewport transform: canvas (world) coordinates to screen coordinates.
//!
//! `screen = world * scale + pan` and `world = (screen - pan) / scale`.

/// Current zoom and pan of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    /// Scale used for division; a non-positive or non-finite scale acts as 1.
    pub fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    pub fn screen_to_world(&self, x: f32, y: f32) -> (f32, f32) {
        let z = self.effective_scale();
        ((x - self.pan_x) / z, (y - self.pan_y) / z)
    }

    pub fn world_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        let z = self.effective_scale();
        (x * z + self.pan_x, y * z + self.pan_y)
    }

    /// Convert a screen-space length (tolerance, delta) to canvas units.
    pub fn screen_len_to_world(&self, len: f32) -> f32 {
        len / self.effective_scale()
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the scale by `factor`, clamped to `[min, max]`, keeping the
    /// world point under `(cursor_x, cursor_y)` fixed on screen.
    pub fn zoom_at(&mut self, cursor_x: f32, cursor_y: f32, factor: f32, min: f32, max: f32) {
        if factor.is_nan() || factor <= 0.0 {
            return;
        }
        let (wx, wy) = self.screen_to_world(cursor_x, cursor_y);
        let scale = (self.effective_scale() * factor).clamp(min, max);
        self.scale = scale;
        self.pan_x = cursor_x - wx * scale;
        self.pan_y = cursor_y - wy * scale;
    }
}
