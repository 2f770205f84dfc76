/// Number of sensor slots per hub. Fixed by the hardware.
pub const SENSORS_PER_HUB: usize = 3;

/// Position unit selector.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionUnit {
    #[default]
    Inch = 0,
    Foot = 1,
    Centimeter = 2,
    Meter = 3,
}

impl PositionUnit {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Inch),
            1 => Some(Self::Foot),
            2 => Some(Self::Centimeter),
            3 => Some(Self::Meter),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Orientation unit selector.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrientationUnit {
    #[default]
    EulerDegree = 0,
    EulerRadian = 1,
    Quaternion = 2,
}

impl OrientationUnit {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::EulerDegree),
            1 => Some(Self::EulerRadian),
            2 => Some(Self::Quaternion),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Position/orientation unit pair. Changes how pose fields are read, never
/// the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UnitConfig {
    pub position: PositionUnit,
    pub orientation: OrientationUnit,
}

impl UnitConfig {
    pub fn new(position: PositionUnit, orientation: OrientationUnit) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

bitflags::bitflags! {
    /// Active sensor slots of a hub, bit `n` = slot `n`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StationMap: u32 {
        const SENSOR_0 = 1 << 0;
        const SENSOR_1 = 1 << 1;
        const SENSOR_2 = 1 << 2;
    }
}

impl StationMap {
    /// Whether slot `slot` is reporting data.
    pub fn is_active(self, slot: usize) -> bool {
        slot < SENSORS_PER_HUB && self.bits() & (1 << slot) != 0
    }

    pub fn active_count(self) -> usize {
        self.bits().count_ones() as usize
    }
}

bitflags::bitflags! {
    /// Sensor selection carried in the low field of a sensor-map id.
    ///
    /// Built as `(s0 << 2) | (s1 << 1) | s2`: the first flag is the high bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SensorMap: u8 {
        const SENSOR_0 = 1 << 2;
        const SENSOR_1 = 1 << 1;
        const SENSOR_2 = 1 << 0;
    }
}

impl SensorMap {
    /// Build a map from per-slot flags in slot order.
    pub fn from_ordered(flags: [bool; SENSORS_PER_HUB]) -> Self {
        let bits = (u8::from(flags[0]) << 2) | (u8::from(flags[1]) << 1) | u8::from(flags[2]);
        Self::from_bits_truncate(bits)
    }
}

/// Orientation slots interpreted under an [`OrientationUnit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Azimuth, elevation, roll in degrees.
    EulerDegrees([f32; 3]),
    /// Azimuth, elevation, roll in radians.
    EulerRadians([f32; 3]),
    /// `[w, x, y, z]`.
    Quaternion([f32; 4]),
}

impl Orientation {
    pub fn from_slots(slots: [f32; 4], unit: OrientationUnit) -> Self {
        let euler = [slots[0], slots[1], slots[2]];
        match unit {
            OrientationUnit::EulerDegree => Self::EulerDegrees(euler),
            OrientationUnit::EulerRadian => Self::EulerRadians(euler),
            OrientationUnit::Quaternion => Self::Quaternion(slots),
        }
    }
}

/// Pose of one sensor slot in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorPose {
    /// Zero-based sensor id as reported by the driver.
    pub id: u32,
    /// `[x, y, z]` in the configured position unit.
    pub position: [f32; 3],
    /// Euler angles in the first three slots, or a full quaternion.
    pub orientation: [f32; 4],
}

impl SensorPose {
    /// Read the orientation slots under `unit`.
    pub fn orientation(&self, unit: OrientationUnit) -> Orientation {
        Orientation::from_slots(self.orientation, unit)
    }
}

/// Most recent tracker data for one hub.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameSnapshot {
    pub hub: u32,
    /// Frame sequence number.
    pub frame: u32,
    pub station_map: StationMap,
    /// Digital I/O port bits.
    pub digital_io: u8,
    pub sensors: [SensorPose; SENSORS_PER_HUB],
}

impl FrameSnapshot {
    /// Poses of the slots flagged active in the station map.
    pub fn active_sensors(&self) -> impl Iterator<Item = (usize, &SensorPose)> + '_ {
        self.sensors
            .iter()
            .enumerate()
            .filter(move |(slot, _)| self.station_map.is_active(*slot))
    }
}

/// Configuration of one field source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceConfig {
    /// Zero-based source id.
    pub id: u32,
    /// Frequency channel, 0 = A, 1 = B, ...
    pub frequency: u32,
    pub filter_flags: u32,
    pub hemisphere_flags: u32,
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

/// Which half of the pose a filter or units exchange applies to.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Position = 0,
    Orientation = 1,
}

/// Adaptive filter coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterParams {
    pub sensitivity: f32,
    pub floor: f32,
    pub ceiling: f32,
    pub max_transition: f32,
}

impl FilterParams {
    pub fn to_array(self) -> [f32; 4] {
        [self.sensitivity, self.floor, self.ceiling, self.max_transition]
    }

    pub fn from_array(values: [f32; 4]) -> Self {
        Self {
            sensitivity: values[0],
            floor: values[1],
            ceiling: values[2],
            max_transition: values[3],
        }
    }
}

/// Minimum change before a new pose is reported.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Increment {
    pub position: f32,
    pub orientation: f32,
}

/// All per-hub settings read or written in a single exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockConfig {
    pub units: UnitConfig,
    /// Firmware/driver version string.
    pub version: String,
    pub position_filter: FilterParams,
    pub orientation_filter: FilterParams,
    pub increments: [Increment; SENSORS_PER_HUB],
    pub frame_rotation: [f32; 4],
    pub frame_translation: [f32; 3],
    pub tip_offsets: [[f32; 3]; SENSORS_PER_HUB],
}

/// Hub counts packed into a frame call's return word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCounts {
    /// Hubs active in the system.
    pub active: u16,
    /// Hubs worth of data written to the buffer.
    pub returned: u16,
}

impl FrameCounts {
    /// Both counts match the number of hubs asked for.
    pub fn is_complete(self, requested: usize) -> bool {
        usize::from(self.active) == requested && usize::from(self.returned) == requested
    }
}

/// Result of one frame call.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReading {
    /// One snapshot per requested hub, in request order.
    pub snapshots: Vec<FrameSnapshot>,
    pub counts: FrameCounts,
    /// Units last applied through this session, if any.
    pub units: Option<UnitConfig>,
}
