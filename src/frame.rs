//! Frame retrieval.
//!
//! The frame call does not return a plain status: a non-negative word packs
//! two 16-bit hub counts. A negative word is a driver status.

use crate::dispatch::Dispatcher;
use crate::driver::Driver;
use crate::error::check;
use crate::protocol;
use crate::status::{self, StatusCode};
use crate::types::{FrameCounts, FrameReading, FrameSnapshot};
use crate::wire::RawFrameData;
use crate::{G4Error, Result};

/// Decode a frame call's return word into hub counts, or the failure status
/// it carries.
///
/// Any word with the sign bit set is read as a status, so an active-hub count
/// of `0x8000` or more cannot be represented.
pub fn decode_frame_word(word: u32) -> Result<FrameCounts> {
    if status::to_signed(word) < 0 {
        check("frame data", status::decode(word))?;
    }
    Ok(protocol::split_counts(word))
}

impl<'a, D: Driver> Dispatcher<'a, D> {
    /// Fetch the most recent frame of each hub in `hubs`.
    ///
    /// Snapshots come back in request order. The data is only current when
    /// [`FrameCounts::is_complete`] holds for `hubs.len()`; checking that is
    /// up to the caller.
    ///
    /// An empty hub list, or a hub id that does not fit the driver's signed id
    /// word, is rejected without calling the driver.
    pub fn get_frame(&mut self, hubs: &[u32]) -> Result<FrameReading> {
        if hubs.is_empty() {
            return Err(G4Error::NoHubsRequested);
        }
        let hub_ids = hubs
            .iter()
            .map(|&h| i32::try_from(h).map_err(|_| G4Error::InvalidHubId(h)))
            .collect::<Result<Vec<i32>>>()?;
        let mut frames = vec![RawFrameData::default(); hub_ids.len()];
        let system_id = self.system_id();

        let word = self.driver().get_frame_data(&mut frames, system_id, &hub_ids);
        log::trace!("frame word 0x{:08x} for hubs {:?}", word, hubs);
        let counts = decode_frame_word(word)?;

        Ok(FrameReading {
            snapshots: frames.iter().map(FrameSnapshot::from).collect(),
            counts,
            units: self.units_hint(),
        })
    }

    /// Fetch the most recent frame of a single hub.
    pub fn get_hub_frame(&mut self, hub: u32) -> Result<(FrameSnapshot, FrameCounts)> {
        let reading = self.get_frame(&[hub])?;
        let snapshot = reading.snapshots.first().copied().unwrap_or_default();
        Ok((snapshot, reading.counts))
    }
}

/// Whether a status from a frame call only means "nothing new yet".
pub fn is_no_data(status: StatusCode) -> bool {
    status == StatusCode::NoFrameDataAvailable
}
