//! Fixed binary layouts shared with the driver.
//!
//! Every struct here is `#[repr(C)]` with 4-byte fields only, so the Rust
//! layout has no padding and matches the vendor header byte for byte.
//! Byte encodings use native endianness.

use crate::protocol;
use crate::types::{
    BlockConfig, FilterParams, FrameSnapshot, Increment, SensorPose, SourceConfig, StationMap,
    UnitConfig, SENSORS_PER_HUB,
};
use std::ffi::c_void;
use std::mem::size_of;

pub const SENSOR_DATA_SIZE: usize = 32;
pub const FRAME_DATA_SIZE: usize = 16 + SENSORS_PER_HUB * SENSOR_DATA_SIZE;
pub const SOURCE_CONFIG_SIZE: usize = 44;
pub const VERSION_LEN: usize = 64;
pub const BLOCK_CONFIG_SIZE: usize = 192;

/// Per-sensor record inside a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSensorData {
    pub id: u32,
    pub pos: [f32; 3],
    pub ori: [f32; 4],
}

/// Per-hub frame buffer filled by `g4_get_frame_data`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawFrameData {
    pub hub: u32,
    pub frame: u32,
    pub station_map: u32,
    pub dig_io: u32,
    pub sensors: [RawSensorData; SENSORS_PER_HUB],
}

/// One source-map entry.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSourceConfig {
    pub id: u32,
    pub freq: u32,
    pub filter_flags: u32,
    pub hemisphere_flags: u32,
    pub pos: [f32; 3],
    pub att: [f32; 4],
}

/// Block configuration buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBlockConfig {
    /// `[position unit, orientation unit]`.
    pub units: [u32; 2],
    /// NUL-terminated.
    pub version: [u8; VERSION_LEN],
    pub pos_filter: [f32; 4],
    pub ori_filter: [f32; 4],
    /// `[position, orientation]` per sensor.
    pub increment: [[f32; 2]; SENSORS_PER_HUB],
    pub for_rotate: [f32; 4],
    pub for_translate: [f32; 3],
    pub tip_offset: [[f32; 3]; SENSORS_PER_HUB],
}

impl Default for RawBlockConfig {
    fn default() -> Self {
        Self {
            units: [0; 2],
            version: [0; VERSION_LEN],
            pos_filter: [0.0; 4],
            ori_filter: [0.0; 4],
            increment: [[0.0; 2]; SENSORS_PER_HUB],
            for_rotate: [0.0; 4],
            for_translate: [0.0; 3],
            tip_offset: [[0.0; 3]; SENSORS_PER_HUB],
        }
    }
}

/// Command envelope passed to `g4_set_query`.
#[repr(C)]
#[derive(Debug)]
pub struct RawCommand {
    pub cmd: i32,
    pub id: i32,
    pub action: i32,
    pub iparam: i32,
    pub pparam: *mut c_void,
}

const _: () = assert!(size_of::<RawSensorData>() == SENSOR_DATA_SIZE);
const _: () = assert!(size_of::<RawFrameData>() == FRAME_DATA_SIZE);
const _: () = assert!(size_of::<RawSourceConfig>() == SOURCE_CONFIG_SIZE);
const _: () = assert!(size_of::<RawBlockConfig>() == BLOCK_CONFIG_SIZE);

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    fn u32(&mut self) -> u32 {
        u32::from_ne_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_ne_bytes(self.take())
    }

    fn f32s<const N: usize>(&mut self) -> [f32; N] {
        let mut out = [0.0; N];
        for v in out.iter_mut() {
            *v = self.f32();
        }
        out
    }
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_ne_bytes());
}

fn put_f32s(out: &mut Vec<u8>, vs: &[f32]) {
    for v in vs {
        out.extend_from_slice(&v.to_ne_bytes());
    }
}

impl RawSensorData {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SENSOR_DATA_SIZE);
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        put_u32(out, self.id);
        put_f32s(out, &self.pos);
        put_f32s(out, &self.ori);
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < SENSOR_DATA_SIZE {
            return None;
        }
        Some(Self::read_from(&mut Reader::new(data)))
    }

    fn read_from(r: &mut Reader<'_>) -> Self {
        Self {
            id: r.u32(),
            pos: r.f32s(),
            ori: r.f32s(),
        }
    }
}

impl RawFrameData {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_DATA_SIZE);
        put_u32(&mut out, self.hub);
        put_u32(&mut out, self.frame);
        put_u32(&mut out, self.station_map);
        put_u32(&mut out, self.dig_io);
        for sensor in &self.sensors {
            sensor.write_to(&mut out);
        }
        out
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < FRAME_DATA_SIZE {
            return None;
        }
        let mut r = Reader::new(data);
        let hub = r.u32();
        let frame = r.u32();
        let station_map = r.u32();
        let dig_io = r.u32();
        let sensors = [
            RawSensorData::read_from(&mut r),
            RawSensorData::read_from(&mut r),
            RawSensorData::read_from(&mut r),
        ];
        Some(Self {
            hub,
            frame,
            station_map,
            dig_io,
            sensors,
        })
    }
}

impl RawSourceConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SOURCE_CONFIG_SIZE);
        put_u32(&mut out, self.id);
        put_u32(&mut out, self.freq);
        put_u32(&mut out, self.filter_flags);
        put_u32(&mut out, self.hemisphere_flags);
        put_f32s(&mut out, &self.pos);
        put_f32s(&mut out, &self.att);
        out
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < SOURCE_CONFIG_SIZE {
            return None;
        }
        let mut r = Reader::new(data);
        Some(Self {
            id: r.u32(),
            freq: r.u32(),
            filter_flags: r.u32(),
            hemisphere_flags: r.u32(),
            pos: r.f32s(),
            att: r.f32s(),
        })
    }
}

impl RawBlockConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_CONFIG_SIZE);
        put_u32(&mut out, self.units[0]);
        put_u32(&mut out, self.units[1]);
        out.extend_from_slice(&self.version);
        put_f32s(&mut out, &self.pos_filter);
        put_f32s(&mut out, &self.ori_filter);
        for inc in &self.increment {
            put_f32s(&mut out, inc);
        }
        put_f32s(&mut out, &self.for_rotate);
        put_f32s(&mut out, &self.for_translate);
        for tip in &self.tip_offset {
            put_f32s(&mut out, tip);
        }
        out
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < BLOCK_CONFIG_SIZE {
            return None;
        }
        let mut r = Reader::new(data);
        Some(Self {
            units: [r.u32(), r.u32()],
            version: r.take(),
            pos_filter: r.f32s(),
            ori_filter: r.f32s(),
            increment: [r.f32s(), r.f32s(), r.f32s()],
            for_rotate: r.f32s(),
            for_translate: r.f32s(),
            tip_offset: [r.f32s(), r.f32s(), r.f32s()],
        })
    }
}

// -- Conversions between wire layouts and decoded types --

impl From<&RawSensorData> for SensorPose {
    fn from(raw: &RawSensorData) -> Self {
        SensorPose {
            id: raw.id,
            position: raw.pos,
            orientation: raw.ori,
        }
    }
}

impl From<&SensorPose> for RawSensorData {
    fn from(pose: &SensorPose) -> Self {
        RawSensorData {
            id: pose.id,
            pos: pose.position,
            ori: pose.orientation,
        }
    }
}

impl From<&RawFrameData> for FrameSnapshot {
    fn from(raw: &RawFrameData) -> Self {
        FrameSnapshot {
            hub: raw.hub,
            frame: raw.frame,
            station_map: StationMap::from_bits_truncate(raw.station_map),
            digital_io: (raw.dig_io & 0xFF) as u8,
            sensors: raw.sensors.each_ref().map(SensorPose::from),
        }
    }
}

impl From<&FrameSnapshot> for RawFrameData {
    fn from(snapshot: &FrameSnapshot) -> Self {
        RawFrameData {
            hub: snapshot.hub,
            frame: snapshot.frame,
            station_map: snapshot.station_map.bits(),
            dig_io: u32::from(snapshot.digital_io),
            sensors: snapshot.sensors.each_ref().map(RawSensorData::from),
        }
    }
}

impl From<&RawSourceConfig> for SourceConfig {
    fn from(raw: &RawSourceConfig) -> Self {
        SourceConfig {
            id: raw.id,
            frequency: raw.freq,
            filter_flags: raw.filter_flags,
            hemisphere_flags: raw.hemisphere_flags,
            position: raw.pos,
            orientation: raw.att,
        }
    }
}

impl From<&SourceConfig> for RawSourceConfig {
    fn from(config: &SourceConfig) -> Self {
        RawSourceConfig {
            id: config.id,
            freq: config.frequency,
            filter_flags: config.filter_flags,
            hemisphere_flags: config.hemisphere_flags,
            pos: config.position,
            att: config.orientation,
        }
    }
}

/// Decode a block configuration. Unit codes the driver wrote back win over
/// `requested`; unrecognised codes fall back to it.
pub fn decode_block_config(raw: &RawBlockConfig, requested: UnitConfig) -> BlockConfig {
    let tag = ((raw.units[0] & 0xFFFF) << 16 | (raw.units[1] & 0xFFFF)) as i32;
    BlockConfig {
        units: protocol::unpack_units(tag).unwrap_or(requested),
        version: version_string(&raw.version),
        position_filter: FilterParams::from_array(raw.pos_filter),
        orientation_filter: FilterParams::from_array(raw.ori_filter),
        increments: raw.increment.map(|[position, orientation]| Increment {
            position,
            orientation,
        }),
        frame_rotation: raw.for_rotate,
        frame_translation: raw.for_translate,
        tip_offsets: raw.tip_offset,
    }
}

/// Encode a block configuration. The version string is truncated to fit
/// with its terminator.
pub fn encode_block_config(config: &BlockConfig) -> RawBlockConfig {
    let mut version = [0u8; VERSION_LEN];
    let bytes = config.version.as_bytes();
    let len = bytes.len().min(VERSION_LEN - 1);
    version[..len].copy_from_slice(&bytes[..len]);

    RawBlockConfig {
        units: [
            config.units.position.code() as u32,
            config.units.orientation.code() as u32,
        ],
        version,
        pos_filter: config.position_filter.to_array(),
        ori_filter: config.orientation_filter.to_array(),
        increment: config.increments.map(|inc| [inc.position, inc.orientation]),
        for_rotate: config.frame_rotation,
        for_translate: config.frame_translation,
        tip_offset: config.tip_offsets,
    }
}

/// Extract a NUL-terminated string from a fixed buffer.
pub fn version_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrientationUnit, PositionUnit};

    fn sample_frame() -> RawFrameData {
        RawFrameData {
            hub: 4,
            frame: 1234,
            station_map: 0b001,
            dig_io: 0x5A,
            sensors: [
                RawSensorData {
                    id: 0,
                    pos: [1.5, -2.25, 10.0],
                    ori: [0.5, 0.5, 0.5, 0.5],
                },
                RawSensorData::default(),
                RawSensorData::default(),
            ],
        }
    }

    #[test]
    fn test_frame_layout_offsets() {
        let bytes = sample_frame().to_bytes();
        assert_eq!(bytes.len(), FRAME_DATA_SIZE);
        assert_eq!(&bytes[0..4], &4u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &1234u32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &1u32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &0x5Au32.to_ne_bytes());
        // first sensor: id, then pos[0]
        assert_eq!(&bytes[16..20], &0u32.to_ne_bytes());
        assert_eq!(&bytes[20..24], &1.5f32.to_ne_bytes());
    }

    #[test]
    fn test_frame_bytes_round_trip() {
        let raw = sample_frame();
        let decoded = RawFrameData::from_bytes(&raw.to_bytes()).unwrap();
        assert_eq!(decoded, raw);

        let snapshot = FrameSnapshot::from(&decoded);
        assert_eq!(snapshot.hub, 4);
        assert_eq!(snapshot.station_map.active_count(), 1);
        assert_eq!(snapshot.sensors[0].position, [1.5, -2.25, 10.0]);
        assert_eq!(RawFrameData::from(&snapshot), raw);
    }

    #[test]
    fn test_short_buffers() {
        assert!(RawFrameData::from_bytes(&[0u8; FRAME_DATA_SIZE - 1]).is_none());
        assert!(RawSensorData::from_bytes(&[0u8; 8]).is_none());
        assert!(RawSourceConfig::from_bytes(&[]).is_none());
        assert!(RawBlockConfig::from_bytes(&[0u8; 100]).is_none());
    }

    #[test]
    fn test_source_config_bytes() {
        let raw = RawSourceConfig {
            id: 1,
            freq: 2,
            filter_flags: 0x3,
            hemisphere_flags: 0x10,
            pos: [0.0, 1.0, 2.0],
            att: [90.0, 0.0, 0.0, 0.0],
        };
        let bytes = raw.to_bytes();
        assert_eq!(bytes.len(), SOURCE_CONFIG_SIZE);
        assert_eq!(RawSourceConfig::from_bytes(&bytes), Some(raw));
        assert_eq!(SourceConfig::from(&raw).frequency, 2);
    }

    #[test]
    fn test_block_config_codec() {
        let config = BlockConfig {
            units: UnitConfig::new(PositionUnit::Meter, OrientationUnit::Quaternion),
            version: "G4 1.2.3".to_string(),
            position_filter: FilterParams::from_array([0.2, 0.2, 0.8, 0.95]),
            orientation_filter: FilterParams::default(),
            increments: [
                Increment {
                    position: 0.1,
                    orientation: 0.5,
                },
                Increment::default(),
                Increment::default(),
            ],
            frame_rotation: [90.0, 180.0, 0.0, 0.0],
            frame_translation: [1.0, 2.0, 3.0],
            tip_offsets: [[0.0, 0.0, 1.0], [0.0; 3], [0.0; 3]],
        };
        let raw = encode_block_config(&config);
        assert_eq!(raw.units, [3, 2]);

        let bytes = raw.to_bytes();
        assert_eq!(bytes.len(), BLOCK_CONFIG_SIZE);
        let back = RawBlockConfig::from_bytes(&bytes).unwrap();
        assert_eq!(decode_block_config(&back, UnitConfig::default()), config);
    }

    #[test]
    fn test_block_config_unknown_units_fall_back() {
        let mut raw = RawBlockConfig::default();
        raw.units = [7, 0];
        let requested = UnitConfig::new(PositionUnit::Centimeter, OrientationUnit::EulerRadian);
        assert_eq!(decode_block_config(&raw, requested).units, requested);
    }

    #[test]
    fn test_version_truncated() {
        let config = BlockConfig {
            version: "x".repeat(100),
            ..BlockConfig::default()
        };
        let raw = encode_block_config(&config);
        assert_eq!(raw.version[VERSION_LEN - 1], 0);
        assert_eq!(version_string(&raw.version).len(), VERSION_LEN - 1);
    }
}
