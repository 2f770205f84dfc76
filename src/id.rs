//! Packed 32-bit unit identifiers.
//!
//! Bit layout (as seen from the unsigned word):
//! - `[24..31]`: system id (8 bits)
//! - `[8..19]`:  hub id (12 bits)
//! - `[7]`:      sensor-map flag
//! - `[0..6]`:   sensor index, or a 3-bit sensor map when bit 7 is set
//!
//! Bits `[20..23]` are always zero, so every non-wildcard id decodes back
//! to the fields it was built from.

use crate::types::SensorMap;

/// System id that addresses every system. Only valid for set/reset.
pub const WILDCARD_SYSTEM: i32 = -1;

/// Sensor field value addressing every sensor on a hub.
pub const ALL_SENSORS: u32 = 0x7F;

const SYSTEM_SHIFT: u32 = 24;
const HUB_SHIFT: u32 = 8;
const SYSTEM_MASK: u32 = 0xFF;
const HUB_MASK: u32 = 0x0FFF;
const SENSOR_MASK: u32 = 0x7F;
const SENSOR_MAP_FLAG: u32 = 0x80;

/// Identifier in the driver's packed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedId(i32);

/// Fields recovered from a [`PackedId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFields {
    pub system: u32,
    pub hub: u32,
    /// Sensor index, or the sensor map bits when `sensor_map` is true.
    pub sensor: u32,
    pub sensor_map: bool,
}

impl PackedId {
    /// The broadcast id (`-1`).
    pub const WILDCARD: PackedId = PackedId(-1);

    /// Pack a single-sensor address. A wildcard system yields `-1` regardless
    /// of hub and sensor.
    pub fn encode(system: i32, hub: u32, sensor: u32) -> Self {
        if system == WILDCARD_SYSTEM {
            return Self::WILDCARD;
        }
        Self(Self::pack(system, hub, sensor & SENSOR_MASK) as i32)
    }

    /// Pack a hub address with a sensor map instead of a single index.
    pub fn encode_sensor_map(system: i32, hub: u32, map: SensorMap) -> Self {
        if system == WILDCARD_SYSTEM {
            return Self::WILDCARD;
        }
        let low = u32::from(map.bits()) & SENSOR_MASK;
        Self((Self::pack(system, hub, low) | SENSOR_MAP_FLAG) as i32)
    }

    fn pack(system: i32, hub: u32, low: u32) -> u32 {
        ((system as u32 & SYSTEM_MASK) << SYSTEM_SHIFT) | ((hub & HUB_MASK) << HUB_SHIFT) | low
    }

    pub fn is_wildcard(self) -> bool {
        self == Self::WILDCARD
    }

    /// The value handed to the driver.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Split the id back into its fields. `None` for the wildcard.
    pub fn fields(self) -> Option<IdFields> {
        if self.is_wildcard() {
            return None;
        }
        let word = self.0 as u32;
        Some(IdFields {
            system: (word >> SYSTEM_SHIFT) & SYSTEM_MASK,
            hub: (word >> HUB_SHIFT) & HUB_MASK,
            sensor: word & SENSOR_MASK,
            sensor_map: word & SENSOR_MAP_FLAG != 0,
        })
    }
}

impl From<PackedId> for i32 {
    fn from(id: PackedId) -> i32 {
        id.0
    }
}

/// What an exchange addresses, relative to the session's system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Every system (broadcast). Set/reset only.
    All,
    /// The session's system as a whole.
    System,
    /// Every sensor on one hub.
    Hub(u32),
    Sensor { hub: u32, sensor: u32 },
    /// A subset of the sensors on one hub.
    Sensors { hub: u32, map: SensorMap },
}

impl Target {
    pub fn packed(self, system: i32) -> PackedId {
        match self {
            Target::All => PackedId::WILDCARD,
            Target::System => PackedId::encode(system, 0, 0),
            Target::Hub(hub) => PackedId::encode(system, hub, ALL_SENSORS),
            Target::Sensor { hub, sensor } => PackedId::encode(system, hub, sensor),
            Target::Sensors { hub, map } => PackedId::encode_sensor_map(system, hub, map),
        }
    }
}
