use crate::dispatch::Dispatcher;
use crate::driver::Driver;
use crate::error::check;
use crate::status;
use crate::types::UnitConfig;
use crate::{G4Error, Result};
use std::ffi::CString;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Settings applied when a session is opened.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    units: Option<UnitConfig>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set position and orientation units right after initialization.
    pub fn units(mut self, units: UnitConfig) -> Self {
        self.units = Some(units);
        self
    }
}

/// State guarded by the session lock.
pub(crate) struct SessionState<D> {
    pub(crate) driver: D,
    /// Last unit pair applied successfully through this session.
    pub(crate) units: Option<UnitConfig>,
}

/// An initialized tracker connection.
///
/// Owns the driver for the lifetime of the connection. Exchanges go through
/// [`Tracker::lock`], which allows one exchange in flight at a time.
/// Dropping the tracker closes the connection.
pub struct Tracker<D: Driver> {
    state: Mutex<SessionState<D>>,
    system_id: i32,
    open: bool,
}

impl<D: Driver> Tracker<D> {
    /// Initialize the driver with a vendor calibration file.
    pub fn open(driver: D, config_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(driver, config_path, &OpenOptions::default())
    }

    /// Initialize the driver and apply `options`.
    ///
    /// If applying the options fails the connection is closed again.
    pub fn open_with(
        mut driver: D,
        config_path: impl AsRef<Path>,
        options: &OpenOptions,
    ) -> Result<Self> {
        let path = config_path.as_ref();
        let c_path = config_path_to_cstring(path)?;

        let mut system_id = -1;
        let raw = driver.init_sys(&c_path, &mut system_id);
        check("initialize", status::decode(raw))?;

        if system_id < 0 {
            driver.close_tracker();
            return Err(G4Error::InvalidSystemId(system_id));
        }

        log::info!(
            "Opened G4 system {} with config {}",
            system_id,
            path.display()
        );

        let tracker = Tracker {
            state: Mutex::new(SessionState {
                driver,
                units: None,
            }),
            system_id,
            open: true,
        };

        if let Some(units) = options.units {
            tracker.lock()?.set_units(units)?;
        }

        Ok(tracker)
    }

    /// Driver-assigned system id of this connection.
    pub fn system_id(&self) -> i32 {
        self.system_id
    }

    /// Acquire the session for one or more exchanges.
    pub fn lock(&self) -> Result<Dispatcher<'_, D>> {
        let state = self.state.lock().map_err(|_| G4Error::SessionPoisoned)?;
        Ok(Dispatcher::new(state, self.system_id))
    }

    /// Units last applied through this session, if any.
    pub fn units(&self) -> Result<Option<UnitConfig>> {
        let state = self.state.lock().map_err(|_| G4Error::SessionPoisoned)?;
        Ok(state.units)
    }

    /// Close the connection.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.driver.close_tracker();
        log::info!("Closed G4 system {}", self.system_id);
    }
}

impl<D: Driver> Drop for Tracker<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<D: Driver> std::fmt::Debug for Tracker<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("system_id", &self.system_id)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

/// The driver takes the path as raw bytes.
fn config_path_to_cstring(path: &Path) -> Result<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path
        .to_str()
        .ok_or_else(|| G4Error::InvalidConfigPath(path.display().to_string()))?
        .as_bytes()
        .to_vec();

    CString::new(bytes).map_err(|e| G4Error::InvalidConfigPath(e.to_string()))
}
