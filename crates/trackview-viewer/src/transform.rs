//! The map view transform: a continuous pan/zoom/drag/resize state machine.
//!
//! The transform maps the map image (and every entity's normalized
//! position) into screen space through `screen = offset + world * scale`.
//! Four stimuli drive it: wheel (anchor-preserving zoom), mouse drag,
//! and viewport resize. After every operation the offset is clamped so the
//! viewport can never end up showing empty space beyond both map edges on
//! an axis.

/// Upper scale bound.
pub const SCALE_MAX: f64 = 10.0;

/// Wheel zoom-in factor per notch.
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Wheel zoom-out factor per notch.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Errors that can occur constructing a view transform.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The map image dimensions must both be positive.
    #[error("invalid map size: {width} x {height}")]
    InvalidMapSize {
        /// Supplied map width.
        width: f64,
        /// Supplied map height.
        height: f64,
    },
}

/// Offset and cursor captured at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    start_offset_x: f64,
    start_offset_y: f64,
    start_cursor_x: f64,
    start_cursor_y: f64,
}

/// Pan/zoom/drag state producing the screen-space mapping for the map and
/// all entity markers.
///
/// [`ViewTransform::resize`] must run once (with the initial viewport)
/// before the transform produces a meaningful mapping; construction alone
/// leaves scale at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    /// Current scale, within `[scale_min, SCALE_MAX]` once initialized.
    scale: f64,
    /// Lower scale bound; recomputed on every resize so the map always
    /// covers the viewport along the constraining axis.
    scale_min: f64,
    offset_x: f64,
    offset_y: f64,
    viewport_w: f64,
    viewport_h: f64,
    /// Native (unscaled) map image size in pixels.
    map_w: f64,
    map_h: f64,
    /// Previous viewport, for proportional rescaling on resize.
    prev_viewport: Option<(f64, f64)>,
    drag: Option<DragState>,
}

impl ViewTransform {
    /// Create a transform for a map image of the given pixel size.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidMapSize`] unless both dimensions
    /// are positive and finite.
    pub const fn new(map_w: f64, map_h: f64) -> Result<Self, TransformError> {
        if !(map_w.is_finite() && map_h.is_finite()) || map_w <= 0.0 || map_h <= 0.0 {
            return Err(TransformError::InvalidMapSize {
                width: map_w,
                height: map_h,
            });
        }
        Ok(Self {
            scale: 0.0,
            scale_min: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            viewport_w: 0.0,
            viewport_h: 0.0,
            map_w,
            map_h,
            prev_viewport: None,
            drag: None,
        })
    }

    /// Current scale.
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Current lower scale bound.
    pub const fn scale_min(&self) -> f64 {
        self.scale_min
    }

    /// Current offset `(x, y)` of the map's top-left corner in screen space.
    pub const fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Current viewport size.
    pub const fn viewport(&self) -> (f64, f64) {
        (self.viewport_w, self.viewport_h)
    }

    /// Map size at the current scale.
    pub const fn map_size(&self) -> (f64, f64) {
        (self.map_w * self.scale, self.map_h * self.scale)
    }

    /// Whether a drag is in progress.
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Handle a viewport resize (including the initial one).
    ///
    /// Recomputes `scale_min` with contain behavior, then either rescales
    /// proportionally to the viewport's mean-dimension change (keeping the
    /// view anchored at the viewport center) or, on the first call,
    /// initializes the scale to twice the minimum and centers the map.
    /// Non-positive dimensions are ignored.
    pub fn resize(&mut self, viewport_w: f64, viewport_h: f64) {
        if viewport_w <= 0.0 || viewport_h <= 0.0 {
            return;
        }

        // Contain: the map must cover the viewport on the constraining axis.
        let viewport_aspect = viewport_h / viewport_w;
        let map_aspect = self.map_h / self.map_w;
        self.scale_min = if viewport_aspect > map_aspect {
            viewport_w / self.map_w
        } else {
            viewport_h / self.map_h
        };

        match self.prev_viewport {
            Some((prev_w, prev_h)) => {
                // Reposition proportionally to the viewport size delta.
                self.offset_x *= viewport_w / prev_w;
                self.offset_y *= viewport_h / prev_h;
                self.viewport_w = viewport_w;
                self.viewport_h = viewport_h;

                // Rescale with the mean-dimension ratio, anchored at the
                // viewport center; zoom() re-clamps scale and offset.
                let mean = (viewport_w + viewport_h) / 2.0;
                let prev_mean = (prev_w + prev_h) / 2.0;
                self.zoom(mean / prev_mean, viewport_w / 2.0, viewport_h / 2.0);
            }
            None => {
                self.viewport_w = viewport_w;
                self.viewport_h = viewport_h;
                self.scale = (2.0 * self.scale_min).min(SCALE_MAX);
                // Center the map, then clamp into bounds.
                let (map_w, map_h) = self.map_size();
                self.offset_x = (viewport_w - map_w) / 2.0;
                self.offset_y = (viewport_h - map_h) / 2.0;
                self.clamp_offset();
            }
        }

        self.prev_viewport = Some((viewport_w, viewport_h));
    }

    /// Anchor-preserving zoom by `factor` around the screen point
    /// `(anchor_x, anchor_y)`.
    ///
    /// The new scale is clamped into `[scale_min, SCALE_MAX]`; the offset
    /// is adjusted so the world point under the anchor stays put, then
    /// clamped.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64, anchor_y: f64) {
        let old_scale = self.scale;
        let new_scale = (old_scale * factor).max(self.scale_min).min(SCALE_MAX);

        if old_scale > 0.0 {
            let ratio = new_scale / old_scale;
            self.offset_x -= (anchor_x - self.offset_x) * (ratio - 1.0);
            self.offset_y -= (anchor_y - self.offset_y) * (ratio - 1.0);
        }

        self.scale = new_scale;
        self.clamp_offset();
    }

    /// Handle a wheel event at the given cursor position.
    ///
    /// Scroll up (negative delta) zooms in, scroll down zooms out.
    pub fn wheel(&mut self, delta_y: f64, cursor_x: f64, cursor_y: f64) {
        let factor = if delta_y < 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.zoom(factor, cursor_x, cursor_y);
    }

    /// Begin a drag, capturing the current offset and cursor position.
    pub const fn drag_start(&mut self, cursor_x: f64, cursor_y: f64) {
        self.drag = Some(DragState {
            start_offset_x: self.offset_x,
            start_offset_y: self.offset_y,
            start_cursor_x: cursor_x,
            start_cursor_y: cursor_y,
        });
    }

    /// Update a drag in progress; ignored while not dragging.
    pub fn drag_move(&mut self, cursor_x: f64, cursor_y: f64) {
        let Some(drag) = self.drag else {
            return;
        };
        self.offset_x = drag.start_offset_x + (cursor_x - drag.start_cursor_x);
        self.offset_y = drag.start_offset_y + (cursor_y - drag.start_cursor_y);
        self.clamp_offset();
    }

    /// End the drag.
    pub const fn drag_end(&mut self) {
        self.drag = None;
    }

    /// Screen position for a normalized map coordinate.
    ///
    /// Normalized Z grows northward while screen Y grows downward, hence
    /// the flip.
    pub const fn screen_position(&self, normalized_x: f64, normalized_z: f64) -> (f64, f64) {
        let (map_w, map_h) = self.map_size();
        (
            self.offset_x + normalized_x * map_w,
            self.offset_y + (1.0 - normalized_z) * map_h,
        )
    }

    /// Offset bounds on one axis for the current scale.
    const fn offset_bounds(viewport: f64, map: f64) -> (f64, f64) {
        (viewport / 2.0 - map, viewport / 2.0)
    }

    /// Clamp the offset per axis so the map never retreats past the
    /// viewport.
    fn clamp_offset(&mut self) {
        let (map_w, map_h) = self.map_size();
        let (min_x, max_x) = Self::offset_bounds(self.viewport_w, map_w);
        let (min_y, max_y) = Self::offset_bounds(self.viewport_h, map_h);
        self.offset_x = self.offset_x.max(min_x).min(max_x);
        self.offset_y = self.offset_y.max(min_y).min(max_y);
    }

    /// Whether the offset currently satisfies its bounds on both axes.
    /// Exposed for property-style tests.
    pub const fn offset_in_bounds(&self) -> bool {
        let (map_w, map_h) = self.map_size();
        let (min_x, max_x) = Self::offset_bounds(self.viewport_w, map_w);
        let (min_y, max_y) = Self::offset_bounds(self.viewport_h, map_h);
        self.offset_x >= min_x
            && self.offset_x <= max_x
            && self.offset_y >= min_y
            && self.offset_y <= max_y
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn ready_transform() -> ViewTransform {
        let mut t = ViewTransform::new(1000.0, 1000.0).unwrap();
        t.resize(800.0, 600.0);
        t
    }

    /// World coordinate currently under a screen point.
    fn world_under(t: &ViewTransform, sx: f64, sy: f64) -> (f64, f64) {
        let (ox, oy) = t.offset();
        ((sx - ox) / t.scale(), (sy - oy) / t.scale())
    }

    #[test]
    fn construction_rejects_degenerate_map_sizes() {
        assert!(ViewTransform::new(0.0, 100.0).is_err());
        assert!(ViewTransform::new(100.0, -1.0).is_err());
        assert!(ViewTransform::new(f64::NAN, 100.0).is_err());
        assert!(ViewTransform::new(1024.0, 1024.0).is_ok());
    }

    #[test]
    fn first_resize_initializes_scale_and_bounds() {
        let t = ready_transform();
        // Contain on a 800x600 viewport over a square map: height is the
        // constraining axis, so scale_min = 600 / 1000.
        assert!((t.scale_min() - 0.6).abs() < EPS);
        assert!((t.scale() - 1.2).abs() < EPS);
        assert!(t.offset_in_bounds());
    }

    #[test]
    fn scale_min_uses_the_constraining_axis() {
        let mut t = ViewTransform::new(1000.0, 500.0).unwrap();
        // Tall viewport: width constrains.
        t.resize(400.0, 800.0);
        assert!((t.scale_min() - 0.4).abs() < EPS);

        // Wide viewport over the same map: height constrains.
        let mut t = ViewTransform::new(1000.0, 500.0).unwrap();
        t.resize(1200.0, 300.0);
        assert!((t.scale_min() - 0.6).abs() < EPS);
    }

    #[test]
    fn zoom_preserves_the_world_point_under_the_anchor() {
        let mut t = ready_transform();
        // Move somewhere non-trivial first.
        t.drag_start(0.0, 0.0);
        t.drag_move(-35.0, -80.0);
        t.drag_end();

        let anchor = (250.0, 320.0);
        let before = world_under(&t, anchor.0, anchor.1);
        t.zoom(1.1, anchor.0, anchor.1);
        let after = world_under(&t, anchor.0, anchor.1);

        assert!((before.0 - after.0).abs() < 1e-6);
        assert!((before.1 - after.1).abs() < 1e-6);
    }

    #[test]
    fn zoom_clamps_scale_to_both_bounds() {
        let mut t = ready_transform();
        for _ in 0..200 {
            t.wheel(1.0, 400.0, 300.0); // zoom out
        }
        assert!((t.scale() - t.scale_min()).abs() < EPS);

        for _ in 0..200 {
            t.wheel(-1.0, 400.0, 300.0); // zoom in
        }
        assert!((t.scale() - SCALE_MAX).abs() < EPS);
    }

    #[test]
    fn drag_moves_offset_by_the_cursor_delta() {
        let mut t = ready_transform();
        // Zoom in so there is headroom to pan without hitting a clamp.
        t.zoom(3.0, 400.0, 300.0);
        let (ox, oy) = t.offset();

        t.drag_start(100.0, 100.0);
        t.drag_move(140.0, 75.0);
        let (nx, ny) = t.offset();
        assert!((nx - (ox + 40.0)).abs() < EPS);
        assert!((ny - (oy - 25.0)).abs() < EPS);

        // Moves after drag_end are ignored.
        t.drag_end();
        t.drag_move(500.0, 500.0);
        assert!((t.offset().0 - nx).abs() < EPS);
    }

    #[test]
    fn offset_stays_in_bounds_through_arbitrary_operation_sequences() {
        let mut t = ready_transform();
        let ops: [(u8, f64, f64); 12] = [
            (0, -1.0, 0.0),        // wheel in at cursor
            (1, 10_000.0, 9000.0), // hard drag far off the map
            (0, 1.0, 0.0),
            (2, 1024.0, 768.0), // resize larger
            (1, -20_000.0, -15_000.0),
            (0, -1.0, 0.0),
            (0, -1.0, 0.0),
            (2, 320.0, 240.0), // resize much smaller
            (1, 5.0, -9999.0),
            (0, 1.0, 0.0),
            (2, 800.0, 600.0),
            (1, 0.0, 0.0),
        ];

        for (kind, a, b) in ops {
            match kind {
                0 => t.wheel(a, 123.0, 45.0),
                1 => {
                    t.drag_start(0.0, 0.0);
                    t.drag_move(a, b);
                    t.drag_end();
                }
                _ => t.resize(a, b),
            }
            assert!(t.offset_in_bounds(), "offset escaped bounds after op");
            assert!(t.scale() >= t.scale_min() - EPS);
            assert!(t.scale() <= SCALE_MAX + EPS);
        }
    }

    #[test]
    fn resize_rescales_by_the_mean_dimension_ratio() {
        let mut t = ready_transform();
        let scale_before = t.scale();
        // Mean grows from (800+600)/2 = 700 to (1600+1200)/2 = 1400.
        t.resize(1600.0, 1200.0);
        assert!((t.scale() - scale_before * 2.0).abs() < EPS);
    }

    #[test]
    fn screen_position_flips_the_z_axis() {
        let t = ready_transform();
        let (map_w, map_h) = t.map_size();
        let (ox, oy) = t.offset();

        // Normalized (0, 0) is the map's south-west corner: bottom-left on
        // screen.
        let (sx, sy) = t.screen_position(0.0, 0.0);
        assert!((sx - ox).abs() < EPS);
        assert!((sy - (oy + map_h)).abs() < EPS);

        let (sx, sy) = t.screen_position(1.0, 1.0);
        assert!((sx - (ox + map_w)).abs() < EPS);
        assert!((sy - oy).abs() < EPS);
    }
}
