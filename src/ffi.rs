//! Bindings to the vendor `G4Track` library.
//!
//! Only compiled with the `native` feature. Set `G4TRACK_LIB_DIR` at build
//! time if the library is not on the default linker path.

use crate::driver::{CommandEnvelope, Driver, Payload};
use crate::wire::{RawCommand, RawFrameData};
use crate::{G4Error, Result};
use std::ffi::{c_char, c_int, c_void, CStr};
use std::sync::atomic::{AtomicBool, Ordering};

#[link(name = "G4Track")]
extern "C" {
    fn g4_init_sys(dongle_id: *mut c_int, src_cfg_file: *const c_char, reserved: *mut c_void)
        -> u32;
    fn g4_close_tracker();
    fn g4_get_frame_data(
        fd_array: *mut RawFrameData,
        sys_id: c_int,
        hub_id_list: *const c_int,
        num_hubs: c_int,
    ) -> u32;
    fn g4_set_query(cmd: *mut RawCommand) -> u32;
}

/// The library keeps one connection per process.
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Handle to the linked vendor library. At most one exists at a time.
#[derive(Debug)]
pub struct NativeDriver {
    _private: (),
}

impl NativeDriver {
    /// Claim the process-wide library handle.
    pub fn new() -> Result<Self> {
        if CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(G4Error::DriverInUse);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for NativeDriver {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::Release);
    }
}

fn payload_ptr(payload: &mut Payload<'_>) -> *mut c_void {
    match payload {
        Payload::None => std::ptr::null_mut(),
        Payload::Int(v) => (&mut **v as *mut i32).cast(),
        Payload::Ints(vs) => vs.as_mut_ptr().cast(),
        Payload::Floats(vs) => vs.as_mut_ptr().cast(),
        Payload::Sources(vs) => vs.as_mut_ptr().cast(),
        Payload::Block(b) => (&mut **b as *mut crate::wire::RawBlockConfig).cast(),
    }
}

impl Driver for NativeDriver {
    fn init_sys(&mut self, config_path: &CStr, system_id: &mut i32) -> u32 {
        // SAFETY: both pointers are valid for the duration of the call and the
        // reserved argument must be null.
        unsafe { g4_init_sys(system_id, config_path.as_ptr(), std::ptr::null_mut()) }
    }

    fn close_tracker(&mut self) {
        // SAFETY: no arguments; `&mut self` rules out a concurrent exchange.
        unsafe { g4_close_tracker() }
    }

    fn get_frame_data(&mut self, frames: &mut [RawFrameData], system_id: i32, hubs: &[i32]) -> u32 {
        let count = frames.len().min(hubs.len()).min(c_int::MAX as usize);
        // SAFETY: `frames` and `hubs` each hold at least `count` elements and
        // RawFrameData matches the driver's G4_FRAMEDATA layout.
        unsafe { g4_get_frame_data(frames.as_mut_ptr(), system_id, hubs.as_ptr(), count as c_int) }
    }

    fn set_query(&mut self, envelope: &mut CommandEnvelope<'_>) -> u32 {
        let mut raw = RawCommand {
            cmd: envelope.command,
            id: envelope.id.raw(),
            action: envelope.action.code(),
            iparam: envelope.param,
            pparam: payload_ptr(&mut envelope.payload),
        };
        // SAFETY: `pparam` is null or borrows a buffer sized for the command,
        // and that borrow outlives the call.
        let status = unsafe { g4_set_query(&mut raw) };
        envelope.param = raw.iparam;
        status
    }
}
