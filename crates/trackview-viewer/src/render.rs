//! The drawing seam and the perpetual render loop.
//!
//! Rendering backends implement [`Surface`]; [`render_frame`] projects the
//! entity table through the view transform and issues draw calls against
//! it. [`run_render_loop`] drives a surface at a fixed cadence until
//! shutdown. [`LogSurface`] is the headless backend the binary uses.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::SharedViewerState;
use crate::entity::{EntityTable, Hsl};
use crate::transform::ViewTransform;

/// Default render cadence, roughly 60 frames per second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// One vehicle marker, fully projected into screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Stable vehicle id.
    pub id: u32,
    /// Screen X of the marker center.
    pub x: f64,
    /// Screen Y of the marker center.
    pub y: f64,
    /// Heading in radians, for marker rotation.
    pub yaw: f32,
    /// Marker fill color.
    pub color: Hsl,
}

/// Drawing backend.
///
/// Implementations receive one `clear`, one `draw_map`, and zero or more
/// `draw_marker` calls per frame, in that order.
pub trait Surface {
    /// Begin a new frame.
    fn clear(&mut self);

    /// Draw the map image at the given screen offset and scaled size.
    fn draw_map(&mut self, offset: (f64, f64), size: (f64, f64));

    /// Draw one vehicle marker.
    fn draw_marker(&mut self, marker: &Marker);
}

/// Draw one complete frame.
///
/// Only entities that have been observed racing at least once are drawn.
/// Returns the number of markers issued.
pub fn render_frame<S: Surface>(
    surface: &mut S,
    entities: &EntityTable,
    transform: &ViewTransform,
) -> usize {
    surface.clear();
    surface.draw_map(transform.offset(), transform.map_size());

    let mut drawn = 0usize;
    for entity in entities.renderable() {
        let (x, y) = transform.screen_position(entity.normalized_x, entity.normalized_z);
        surface.draw_marker(&Marker {
            id: entity.id,
            x,
            y,
            yaw: entity.yaw,
            color: entity.color(),
        });
        drawn = drawn.saturating_add(1);
    }
    drawn
}

/// Drive the surface at a fixed cadence until shutdown fires.
///
/// Each tick takes one read lock over the shared state, so a frame always
/// sees a consistent table/transform pair. Missed ticks are skipped rather
/// than bursted.
pub async fn run_render_loop<S: Surface>(
    state: SharedViewerState,
    mut surface: S,
    frame_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let guard = state.read().await;
                let drawn = render_frame(&mut surface, &guard.entities, &guard.transform);
                trace!(markers = drawn, "rendered frame");
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("render loop stopping");
                    return;
                }
            }
        }
    }
}

/// Headless surface that logs draw calls instead of rasterizing.
#[derive(Debug, Default)]
pub struct LogSurface {
    frames: u64,
}

impl LogSurface {
    /// Fresh surface with no frames rendered.
    pub const fn new() -> Self {
        Self { frames: 0 }
    }

    /// Frames rendered so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl Surface for LogSurface {
    fn clear(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    fn draw_map(&mut self, offset: (f64, f64), size: (f64, f64)) {
        trace!(?offset, ?size, "map");
    }

    fn draw_marker(&mut self, marker: &Marker) {
        debug!(
            id = marker.id,
            x = marker.x,
            y = marker.y,
            yaw = marker.yaw,
            color = %marker.color,
            "marker"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::MapGeometry;
    use trackview_types::TelemetryFrame;

    /// Surface that records every call for inspection.
    #[derive(Debug, Default)]
    struct RecordingSurface {
        clears: usize,
        maps: Vec<((f64, f64), (f64, f64))>,
        markers: Vec<Marker>,
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self) {
            self.clears = self.clears.saturating_add(1);
        }

        fn draw_map(&mut self, offset: (f64, f64), size: (f64, f64)) {
            self.maps.push((offset, size));
        }

        fn draw_marker(&mut self, marker: &Marker) {
            self.markers.push(*marker);
        }
    }

    fn frame(id: u32, race_on: bool) -> TelemetryFrame {
        TelemetryFrame {
            id,
            is_race_on: race_on,
            pos_x: -120.0,
            pos_y: 0.0,
            pos_z: -1100.0,
            yaw: 0.25,
            speed: 5.0,
            hue: 200,
        }
    }

    fn ready_transform() -> ViewTransform {
        let mut t = ViewTransform::new(1000.0, 1000.0).unwrap();
        t.resize(800.0, 600.0);
        t
    }

    #[test]
    fn only_race_validated_entities_are_drawn() {
        let mut table = EntityTable::new(MapGeometry::default());
        table.upsert(&frame(1, true));
        table.upsert(&frame(2, false));
        table.upsert(&frame(3, true));

        let mut surface = RecordingSurface::default();
        let drawn = render_frame(&mut surface, &table, &ready_transform());

        assert_eq!(drawn, 2);
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.maps.len(), 1);
        let ids: Vec<u32> = surface.markers.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn markers_land_where_the_transform_projects_them() {
        let mut table = EntityTable::new(MapGeometry::default());
        table.upsert(&frame(1, true));
        let transform = ready_transform();

        let mut surface = RecordingSurface::default();
        render_frame(&mut surface, &table, &transform);

        let entity = table.get(1).unwrap();
        let (ex, ey) = transform.screen_position(entity.normalized_x, entity.normalized_z);
        let marker = surface.markers.first().unwrap();
        assert!((marker.x - ex).abs() < 1e-12);
        assert!((marker.y - ey).abs() < 1e-12);
        assert_eq!(format!("{}", marker.color), format!("{}", entity.color()));
    }

    #[test]
    fn map_is_drawn_with_the_transform_geometry() {
        let table = EntityTable::new(MapGeometry::default());
        let transform = ready_transform();

        let mut surface = RecordingSurface::default();
        render_frame(&mut surface, &table, &transform);

        let (offset, size) = *surface.maps.first().unwrap();
        assert!((offset.0 - transform.offset().0).abs() < 1e-12);
        assert!((offset.1 - transform.offset().1).abs() < 1e-12);
        assert!((size.0 - transform.map_size().0).abs() < 1e-12);
        assert!((size.1 - transform.map_size().1).abs() < 1e-12);
    }
}
