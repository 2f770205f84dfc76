//! The foreign boundary.
//!
//! [`Driver`] mirrors the four entry points of the vendor library. Raw return
//! words are passed back untouched; decoding is done by the caller.

use crate::id::PackedId;
use crate::protocol::Action;
use crate::wire::{RawBlockConfig, RawFrameData, RawSourceConfig};
use std::ffi::CStr;

/// Caller-owned buffer referenced by a command envelope.
#[derive(Debug)]
pub enum Payload<'a> {
    None,
    Int(&'a mut i32),
    Ints(&'a mut [i32]),
    Floats(&'a mut [f32]),
    Sources(&'a mut [RawSourceConfig]),
    Block(&'a mut RawBlockConfig),
}

/// One set/get/reset exchange. Built fresh for every call.
#[derive(Debug)]
pub struct CommandEnvelope<'a> {
    pub command: i32,
    pub id: PackedId,
    pub action: Action,
    /// In/out integer parameter; the driver may overwrite it.
    pub param: i32,
    pub payload: Payload<'a>,
}

impl<'a> CommandEnvelope<'a> {
    pub fn new(command: i32, id: PackedId, action: Action) -> Self {
        Self {
            command,
            id,
            action,
            param: 0,
            payload: Payload::None,
        }
    }

    pub fn with_param(mut self, param: i32) -> Self {
        self.param = param;
        self
    }

    pub fn with_payload(mut self, payload: Payload<'a>) -> Self {
        self.payload = payload;
        self
    }
}

/// A loaded tracker driver.
///
/// Calls block until the driver returns. Implementations need not be
/// reentrant; [`crate::Tracker`] serializes access.
pub trait Driver {
    /// `g4_init_sys`: connect using the given calibration file.
    fn init_sys(&mut self, config_path: &CStr, system_id: &mut i32) -> u32;

    /// `g4_close_tracker`.
    fn close_tracker(&mut self);

    /// `g4_get_frame_data`: fill one buffer per requested hub. Returns the
    /// packed hub counts.
    fn get_frame_data(&mut self, frames: &mut [RawFrameData], system_id: i32, hubs: &[i32]) -> u32;

    /// `g4_set_query`.
    fn set_query(&mut self, envelope: &mut CommandEnvelope<'_>) -> u32;
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn init_sys(&mut self, config_path: &CStr, system_id: &mut i32) -> u32 {
        (**self).init_sys(config_path, system_id)
    }

    fn close_tracker(&mut self) {
        (**self).close_tracker()
    }

    fn get_frame_data(&mut self, frames: &mut [RawFrameData], system_id: i32, hubs: &[i32]) -> u32 {
        (**self).get_frame_data(frames, system_id, hubs)
    }

    fn set_query(&mut self, envelope: &mut CommandEnvelope<'_>) -> u32 {
        (**self).set_query(envelope)
    }
}
