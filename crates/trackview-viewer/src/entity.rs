//! Per-vehicle entity state, keyed by the stable frame id.
//!
//! An entity is created the first time a frame references an unseen id and
//! is updated in place from then on; entities are never removed for the
//! life of the viewer session. Render eligibility is the sticky
//! `race_has_been_on` flag: until a vehicle has been observed racing at
//! least once, its position is garbage and the renderer skips it.

use std::collections::BTreeMap;

use trackview_types::TelemetryFrame;

/// Map calibration: real-world extent and the survey offsets that line the
/// telemetry origin up with the map image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapGeometry {
    /// Real-world length of the (square) map edge, in world units.
    pub map_length: f64,
    /// Eastward correction applied before normalizing X.
    pub x_offset: f64,
    /// Northward correction applied before normalizing Z.
    pub z_offset: f64,
}

impl Default for MapGeometry {
    /// Calibration for the deployed map image.
    fn default() -> Self {
        Self {
            map_length: 14_850.0,
            x_offset: 120.0,
            z_offset: 1_100.0,
        }
    }
}

impl MapGeometry {
    /// Normalize a world position into map-relative fractions.
    ///
    /// The world origin sits at the map center, so half the map length is
    /// added back before dividing. Values outside `[0, 1]` mean the
    /// vehicle is off the mapped area; they are kept as-is.
    pub const fn normalize(&self, pos_x: f64, pos_z: f64) -> (f64, f64) {
        let half = self.map_length / 2.0;
        let nx = (pos_x + half + self.x_offset) / self.map_length;
        let nz = (pos_z + half + self.z_offset) / self.map_length;
        (nx, nz)
    }
}

/// Marker color in HSL space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees, `[0, 360)`.
    pub h: f64,
    /// Saturation percentage.
    pub s: f64,
    /// Lightness percentage.
    pub l: f64,
}

impl Hsl {
    /// Full-saturation, half-lightness color from a wire hue byte.
    ///
    /// The wire hue spans 0-254 (255 values), mapped onto the full hue
    /// circle.
    pub fn from_wire_hue(hue: u8) -> Self {
        Self {
            h: f64::from(hue) / 254.0 * 360.0,
            s: 100.0,
            l: 50.0,
        }
    }
}

impl std::fmt::Display for Hsl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hsl({:.1}, {:.0}%, {:.0}%)", self.h, self.s, self.l)
    }
}

/// State for one observed vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    /// Stable vehicle id.
    pub id: u32,
    /// Whether the most recent frame had the race flag set.
    pub is_race_on: bool,
    /// Sticky validity flag: set on the first racing frame, never reset.
    pub race_has_been_on: bool,
    /// Map-relative X fraction.
    pub normalized_x: f64,
    /// Map-relative Z fraction.
    pub normalized_z: f64,
    /// Heading in radians.
    pub yaw: f32,
    /// Speed in meters per second.
    pub speed: f32,
    /// Wire hue byte, 0-254.
    pub hue: u8,
}

impl Entity {
    /// Fresh entity for a first-seen id. Position stays at the map origin
    /// until a racing frame arrives; the sticky flag keeps it unrendered
    /// until then.
    const fn new(id: u32) -> Self {
        Self {
            id,
            is_race_on: false,
            race_has_been_on: false,
            normalized_x: 0.0,
            normalized_z: 0.0,
            yaw: 0.0,
            speed: 0.0,
            hue: 0,
        }
    }

    /// Marker color derived from the wire hue.
    pub fn color(&self) -> Hsl {
        Hsl::from_wire_hue(self.hue)
    }
}

/// Keyed store of per-vehicle state, updated from decoded frames.
///
/// The table grows monotonically with distinct ids observed; entries are
/// never evicted.
#[derive(Debug, Clone)]
pub struct EntityTable {
    entities: BTreeMap<u32, Entity>,
    geometry: MapGeometry,
}

impl EntityTable {
    /// Create an empty table with the given map calibration.
    pub const fn new(geometry: MapGeometry) -> Self {
        Self {
            entities: BTreeMap::new(),
            geometry,
        }
    }

    /// Apply one decoded frame.
    ///
    /// Creates the entity on first sight. The live race flag is always
    /// updated; position, heading, speed, and color only change while the
    /// frame reports the race as on, which also latches the sticky
    /// validity flag.
    pub fn upsert(&mut self, frame: &TelemetryFrame) {
        let entity = self
            .entities
            .entry(frame.id)
            .or_insert_with(|| Entity::new(frame.id));

        entity.is_race_on = frame.is_race_on;
        if frame.is_race_on {
            entity.race_has_been_on = true;
            let (nx, nz) = self
                .geometry
                .normalize(f64::from(frame.pos_x), f64::from(frame.pos_z));
            entity.normalized_x = nx;
            entity.normalized_z = nz;
            entity.yaw = frame.yaw;
            entity.speed = frame.speed;
            entity.hue = frame.hue;
        }
    }

    /// Look up one entity by id.
    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Iterate the entities eligible for rendering, in id order.
    ///
    /// An entity is eligible if and only if it has been observed racing at
    /// least once.
    pub fn renderable(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.race_has_been_on)
    }

    /// Number of distinct ids observed.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no id has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The map calibration this table normalizes against.
    pub const fn geometry(&self) -> MapGeometry {
        self.geometry
    }
}
