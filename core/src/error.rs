//! error.rs
//! Status codes and the single failure type raised by every entry point.
//!
//! Design notes:
//! - `StatusCode` mirrors the low-level status layer; raw values are stable.
//! - `DevcompError` owns its message and keeps the status inspectable, so
//!   callers branch on `status()` rather than parsing text.
//! - `check_status` is the bridge from a raw status into `Result`.

use std::fmt;
use num_enum::TryFromPrimitive;

/// Status codes shared with the low-level status layer.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum StatusCode {
    Success                  = 0,
    /// Bad size, null buffer, insufficient workspace/output, protocol misuse.
    InvalidValue             = 10,
    /// Element type has no type tag.
    NotSupported             = 11,
    /// Compressed metadata is missing, corrupt or unrecognized.
    CannotDecompress         = 12,
    /// Payload checksum mismatch found while decompressing.
    BadChecksum              = 13,
    /// The codec cannot satisfy the requested parameters.
    UnsupportedConfiguration = 14,
    /// Launch rejected by the stream, or device execution failed.
    DeviceError              = 1000,
    Internal                 = 10000,
}

impl StatusCode {
    /// Raw value as seen by the low-level layer.
    pub fn raw(self) -> i32 {
        self as i32
    }

    /// Map a raw code; unknown values collapse to `Internal`.
    pub fn from_raw(raw: i32) -> Self {
        StatusCode::try_from_primitive(raw).unwrap_or(StatusCode::Internal)
    }

    pub fn verify(raw: i32) -> Result<()> {
        match StatusCode::try_from_primitive(raw) {
            Ok(_) => Ok(()),
            Err(_) => Err(DevcompError::new(
                StatusCode::Internal,
                format!("unknown status code {}", raw),
            )),
        }
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.raw())
    }
}

/// The failure object. Carries the most specific status and a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} : code={}.", .status.raw())]
pub struct DevcompError {
    status: StatusCode,
    message: String,
}

impl DevcompError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidValue, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotSupported, message)
    }

    pub fn unsupported_configuration(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UnsupportedConfiguration, message)
    }

    pub fn cannot_decompress(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CannotDecompress, message)
    }

    pub fn bad_checksum(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadChecksum, message)
    }

    pub fn device(message: impl Into<String>) -> Self {
        Self::new(StatusCode::DeviceError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message without the trailing code.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Unsupported types and configurations will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self.status,
            StatusCode::NotSupported | StatusCode::UnsupportedConfiguration
        )
    }
}

pub type Result<T> = std::result::Result<T, DevcompError>;

/// Translate a raw status from the low-level layer into a `Result`.
#[inline]
pub fn check_status(raw: i32, msg: &str) -> Result<()> {
    let status = StatusCode::from_raw(raw);
    if status.is_success() {
        Ok(())
    } else {
        Err(DevcompError::new(status, msg))
    }
}

