use crate::status::StatusCode;
use crate::types::DataKind;

/// Errors that can occur when talking to the G4 driver.
#[derive(Debug, thiserror::Error)]
pub enum G4Error {
    /// The driver returned a non-success status for an exchange.
    #[error("{operation} failed: {status}")]
    Driver {
        operation: &'static str,
        status: StatusCode,
    },

    #[error("wildcard system id is only valid for set/reset ({operation})")]
    WildcardNotAllowed { operation: &'static str },

    #[error("configuration path cannot be passed to the driver: {0}")]
    InvalidConfigPath(String),

    #[error("driver reported success with invalid system id {0}")]
    InvalidSystemId(i32),

    /// The driver reported a unit code outside the known table.
    #[error("driver reported unknown {kind:?} unit code {code}")]
    UnknownUnit { kind: DataKind, code: i32 },

    #[error("{operation} returned invalid count {count}")]
    InvalidCount { operation: &'static str, count: i32 },

    #[error("hub id {0} is out of range for the driver")]
    InvalidHubId(u32),

    #[error("frame request names no hubs")]
    NoHubsRequested,

    #[error("native driver handle already in use")]
    DriverInUse,

    #[error("session lock poisoned")]
    SessionPoisoned,
}

impl G4Error {
    /// The decoded driver status, if this error came from an exchange.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            G4Error::Driver { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Interpret a count the driver wrote back into a parameter word.
pub(crate) fn count(operation: &'static str, value: i32) -> crate::Result<usize> {
    usize::try_from(value).map_err(|_| {
        log::warn!("{} returned negative count {}", operation, value);
        G4Error::InvalidCount {
            operation,
            count: value,
        }
    })
}

/// Turn a decoded status into a result, tagging failures with the operation.
pub(crate) fn check(operation: &'static str, status: StatusCode) -> crate::Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        log::warn!("{} failed: {}", operation, status);
        Err(G4Error::Driver { operation, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        assert!(check("units", StatusCode::Success).is_ok());
        let err = check("units", StatusCode::NoConnection).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NoConnection));
        assert_eq!(err.to_string(), "units failed: no connection (-95)");
    }

    #[test]
    fn test_count() {
        assert_eq!(count("active hubs", 3).unwrap(), 3);
        let err = count("active hubs", -2).unwrap_err();
        assert!(matches!(err, G4Error::InvalidCount { count: -2, .. }));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unknown_status_is_not_success() {
        let err = check("boresight", StatusCode::Unknown(3)).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::Unknown(3)));
    }
}
