//! Decoding of the driver's raw 32-bit return words.
//!
//! Every boundary call hands back a `uint32_t` even though the contract is a
//! signed status. Words at or above `0x8000_0000` are negative codes in
//! two's complement.

use std::fmt;

/// Broad class of a failure status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Connection establishment: dongle, USB, config file, system ids.
    Connection,
    /// Bad station, system id or wildcard addressing.
    Addressing,
    /// Unsupported action/type/command, no hubs, no frame data.
    Protocol,
    /// Memory allocation or timer start.
    Resource,
}

/// Decoded driver status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Success,
    NoFrameDataAvailable,
    UnsupportedAction,
    UnsupportedType,
    UnsupportedCommand,
    InvalidStation,
    NoConnection,
    NoHubs,
    FramerateSet,
    MemoryAllocation,
    InvalidSystemId,
    SourceConfigFileOpen,
    InvalidSourceConfigFile,
    UnableToStartTimer,
    HubNotActive,
    SystemResetFailed,
    DongleConnection,
    DongleUsbConfiguration,
    DongleUsbInterface0,
    DuplicateSystemIds,
    InvalidWildcardUse,
    /// Any signed value outside the catalogue, positive ones included.
    Unknown(i32),
}

/// Reinterpret a raw return word as the signed status it encodes.
///
/// Equivalent to subtracting 2^32 from words above `0x7FFF_FFFF`.
pub const fn to_signed(raw: u32) -> i32 {
    raw as i32
}

/// Decode a raw return word. Total: never fails.
pub fn decode(raw: u32) -> StatusCode {
    StatusCode::from_code(to_signed(raw))
}

impl StatusCode {
    /// Map an already-signed status to the catalogue.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            -100 => Self::NoFrameDataAvailable,
            -99 => Self::UnsupportedAction,
            -98 => Self::UnsupportedType,
            -97 => Self::UnsupportedCommand,
            -96 => Self::InvalidStation,
            -95 => Self::NoConnection,
            -94 => Self::NoHubs,
            -93 => Self::FramerateSet,
            -92 => Self::MemoryAllocation,
            -91 => Self::InvalidSystemId,
            -90 => Self::SourceConfigFileOpen,
            -89 => Self::InvalidSourceConfigFile,
            -88 => Self::UnableToStartTimer,
            -87 => Self::HubNotActive,
            -86 => Self::SystemResetFailed,
            -85 => Self::DongleConnection,
            -84 => Self::DongleUsbConfiguration,
            -83 => Self::DongleUsbInterface0,
            -82 => Self::DuplicateSystemIds,
            -81 => Self::InvalidWildcardUse,
            other => Self::Unknown(other),
        }
    }

    /// The signed code this status stands for.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NoFrameDataAvailable => -100,
            Self::UnsupportedAction => -99,
            Self::UnsupportedType => -98,
            Self::UnsupportedCommand => -97,
            Self::InvalidStation => -96,
            Self::NoConnection => -95,
            Self::NoHubs => -94,
            Self::FramerateSet => -93,
            Self::MemoryAllocation => -92,
            Self::InvalidSystemId => -91,
            Self::SourceConfigFileOpen => -90,
            Self::InvalidSourceConfigFile => -89,
            Self::UnableToStartTimer => -88,
            Self::HubNotActive => -87,
            Self::SystemResetFailed => -86,
            Self::DongleConnection => -85,
            Self::DongleUsbConfiguration => -84,
            Self::DongleUsbInterface0 => -83,
            Self::DuplicateSystemIds => -82,
            Self::InvalidWildcardUse => -81,
            Self::Unknown(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Taxonomy class of a catalogued failure. `None` for success and unknown codes.
    pub fn kind(self) -> Option<StatusKind> {
        match self {
            Self::Success | Self::Unknown(_) => None,
            Self::NoConnection
            | Self::SourceConfigFileOpen
            | Self::InvalidSourceConfigFile
            | Self::SystemResetFailed
            | Self::DongleConnection
            | Self::DongleUsbConfiguration
            | Self::DongleUsbInterface0
            | Self::DuplicateSystemIds => Some(StatusKind::Connection),
            Self::InvalidStation
            | Self::InvalidSystemId
            | Self::InvalidWildcardUse
            | Self::HubNotActive => Some(StatusKind::Addressing),
            Self::NoFrameDataAvailable
            | Self::UnsupportedAction
            | Self::UnsupportedType
            | Self::UnsupportedCommand
            | Self::NoHubs
            | Self::FramerateSet => Some(StatusKind::Protocol),
            Self::MemoryAllocation | Self::UnableToStartTimer => Some(StatusKind::Resource),
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoFrameDataAvailable => "no frame data available",
            Self::UnsupportedAction => "unsupported action",
            Self::UnsupportedType => "unsupported type",
            Self::UnsupportedCommand => "unsupported command",
            Self::InvalidStation => "invalid station",
            Self::NoConnection => "no connection",
            Self::NoHubs => "no hubs",
            Self::FramerateSet => "frame rate could not be set",
            Self::MemoryAllocation => "memory allocation failed",
            Self::InvalidSystemId => "invalid system id",
            Self::SourceConfigFileOpen => "cannot open source configuration file",
            Self::InvalidSourceConfigFile => "invalid source configuration file",
            Self::UnableToStartTimer => "unable to start timer",
            Self::HubNotActive => "hub not active",
            Self::SystemResetFailed => "system reset failed",
            Self::DongleConnection => "dongle connection failed",
            Self::DongleUsbConfiguration => "dongle USB configuration failed",
            Self::DongleUsbInterface0 => "dongle USB interface 0 failed",
            Self::DuplicateSystemIds => "duplicate system ids",
            Self::InvalidWildcardUse => "invalid wildcard use",
            Self::Unknown(_) => "unrecognized status",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

impl std::error::Error for StatusCode {}
