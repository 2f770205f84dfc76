use crate::types::{FrameCounts, OrientationUnit, PositionUnit, UnitConfig};

// -- Command codes (set_query `cmd` field) --
pub const CMD_WHOAMI: i32 = 0;
pub const CMD_GET_MAX_SOURCES: i32 = 1;
pub const CMD_BORESIGHT: i32 = 2;
pub const CMD_FILTER: i32 = 3;
pub const CMD_INCREMENT: i32 = 4;
pub const CMD_FOR_ROTATE: i32 = 5;
pub const CMD_FOR_TRANSLATE: i32 = 6;
pub const CMD_TIP_OFFSET: i32 = 7;
pub const CMD_UNITS: i32 = 8;
pub const CMD_GET_ACTIVE_HUBS: i32 = 9;
pub const CMD_GET_STATION_MAP: i32 = 10;
pub const CMD_GET_SOURCE_MAP: i32 = 11;
pub const CMD_FRAMERATE: i32 = 12;
pub const CMD_RESTORE_DEFAULT_CONFIG: i32 = 13;
pub const CMD_BLOCK_CONFIG: i32 = 14;

/// What an exchange does with its target.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Set = 0,
    Get = 1,
    Reset = 2,
}

impl Action {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Set and reset may address every system at once.
    pub fn allows_wildcard(self) -> bool {
        !matches!(self, Action::Get)
    }
}

/// Human-readable command name for logs and errors.
pub fn command_name(cmd: i32) -> &'static str {
    match cmd {
        CMD_WHOAMI => "whoami",
        CMD_GET_MAX_SOURCES => "max sources",
        CMD_BORESIGHT => "boresight",
        CMD_FILTER => "filter",
        CMD_INCREMENT => "increment",
        CMD_FOR_ROTATE => "frame-of-reference rotation",
        CMD_FOR_TRANSLATE => "frame-of-reference translation",
        CMD_TIP_OFFSET => "tip offset",
        CMD_UNITS => "units",
        CMD_GET_ACTIVE_HUBS => "active hubs",
        CMD_GET_STATION_MAP => "station map",
        CMD_GET_SOURCE_MAP => "source map",
        CMD_FRAMERATE => "frame rate",
        CMD_RESTORE_DEFAULT_CONFIG => "restore defaults",
        CMD_BLOCK_CONFIG => "block config",
        _ => "unknown command",
    }
}

/// Pack a unit pair into one integer parameter: `position << 16 | orientation`.
pub fn pack_units(units: UnitConfig) -> i32 {
    (units.position.code() << 16) | units.orientation.code()
}

/// Inverse of [`pack_units`]. `None` if either half is not a known unit.
pub fn unpack_units(tag: i32) -> Option<UnitConfig> {
    let word = tag as u32;
    let position = PositionUnit::from_code(((word >> 16) & 0xFFFF) as i32)?;
    let orientation = OrientationUnit::from_code((word & 0xFFFF) as i32)?;
    Some(UnitConfig::new(position, orientation))
}

/// Split a frame call's return word into its two 16-bit hub counts.
///
/// Upper half: active hubs in the system. Lower half: hubs written.
pub fn split_counts(word: u32) -> FrameCounts {
    FrameCounts {
        active: ((word >> 16) & 0xFFFF) as u16,
        returned: (word & 0xFFFF) as u16,
    }
}
