//! # g4track - typed access to the Polhemus G4 tracker driver
//!
//! Marshals requests to the vendor `G4Track` library and decodes what it
//! returns:
//! - Packed unit identifiers (system, hub, sensor or sensor map)
//! - Signed status decoding of the driver's raw return words
//! - Fixed-layout frame, source and block configuration structures
//! - One exchange per set/get/reset command, serialized per session
//!
//! ## Quick Start
//! ```no_run
//! # #[cfg(feature = "native")]
//! # fn main() -> g4track::Result<()> {
//! use g4track::{NativeDriver, OpenOptions, PositionUnit, OrientationUnit, Tracker, UnitConfig};
//!
//! let units = UnitConfig::new(PositionUnit::Centimeter, OrientationUnit::Quaternion);
//! let tracker = Tracker::open_with(
//!     NativeDriver::new()?,
//!     "first_calibration.g4c",
//!     &OpenOptions::new().units(units),
//! )?;
//!
//! let mut session = tracker.lock()?;
//! let hub = session.active_hubs()?[0];
//! let (frame, counts) = session.get_hub_frame(hub)?;
//! if counts.is_complete(1) {
//!     for (slot, pose) in frame.active_sensors() {
//!         println!("sensor {}: {:?}", slot, pose.position);
//!     }
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "native"))]
//! # fn main() {}
//! ```

pub mod error;
pub mod status;
pub mod id;
pub mod types;
pub mod protocol;
pub mod wire;
pub mod driver;
pub mod dispatch;
pub mod frame;
pub mod device;
#[cfg(feature = "native")]
pub mod ffi;

pub use error::G4Error;
pub use status::{StatusCode, StatusKind};
pub use id::{PackedId, Target};
pub use types::*;
pub use driver::{CommandEnvelope, Driver, Payload};
pub use dispatch::Dispatcher;
pub use device::{OpenOptions, Tracker};
#[cfg(feature = "native")]
pub use ffi::NativeDriver;

/// Result type alias for g4track operations.
pub type Result<T> = std::result::Result<T, G4Error>;
