//! Scan failure classification
//!
//! `scanimage` exits with the SANE status of the failing operation, so the
//! exit code alone identifies conditions like an empty document feeder.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// SANE status codes as reported through the scanner's exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaneStatus {
    Unsupported,
    Cancelled,
    DeviceBusy,
    Inval,
    Eof,
    Jammed,
    NoDocs,
    CoverOpen,
    IoError,
    NoMem,
    AccessDenied,
}

/// Exit code to status mapping
const EXIT_CODE_TABLE: &[(i32, SaneStatus)] = &[
    (1, SaneStatus::Unsupported),
    (2, SaneStatus::Cancelled),
    (3, SaneStatus::DeviceBusy),
    (4, SaneStatus::Inval),
    (5, SaneStatus::Eof),
    (6, SaneStatus::Jammed),
    (7, SaneStatus::NoDocs),
    (8, SaneStatus::CoverOpen),
    (9, SaneStatus::IoError),
    (10, SaneStatus::NoMem),
    (11, SaneStatus::AccessDenied),
];

impl SaneStatus {
    pub fn from_exit_code(code: i32) -> Option<Self> {
        EXIT_CODE_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, status)| *status)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsupported => "UNSUPPORTED",
            Self::Cancelled => "CANCELLED",
            Self::DeviceBusy => "DEVICE_BUSY",
            Self::Inval => "INVAL",
            Self::Eof => "EOF",
            Self::Jammed => "JAMMED",
            Self::NoDocs => "NO_DOCS",
            Self::CoverOpen => "COVER_OPEN",
            Self::IoError => "IO_ERROR",
            Self::NoMem => "NO_MEM",
            Self::AccessDenied => "ACCESS_DENIED",
        }
    }
}

impl fmt::Display for SaneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the scanner process ended when it did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Exit code with a known SANE meaning
    Sane { code: i32, status: SaneStatus },
    /// Exit code outside the table
    Code(i32),
    /// Terminated by a signal
    Signal,
}

impl ExitKind {
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(code) => SaneStatus::from_exit_code(code)
                .map_or(Self::Code(code), |status| Self::Sane { code, status }),
            None => Self::Signal,
        }
    }
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sane { code, status } => write!(f, "exit status {code} ({status})"),
            Self::Code(code) => write!(f, "exit status {code}"),
            Self::Signal => f.write_str("termination by signal"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to start scanner: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed waiting for scanner: {0}")]
    Wait(#[source] std::io::Error),

    #[error("scanner failed with {kind}")]
    Exit { kind: ExitKind, stderr: String },

    #[error("scanner did not finish within {} seconds", .0.as_secs())]
    Timeout(Duration),
}

impl ScanError {
    /// Build an exit error from a raw exit code
    pub fn exit(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Exit {
            kind: ExitKind::from_code(code),
            stderr: stderr.into(),
        }
    }

    /// True when the document feeder ran out of paper
    pub const fn is_feeder_empty(&self) -> bool {
        matches!(
            self,
            Self::Exit {
                kind: ExitKind::Sane {
                    status: SaneStatus::NoDocs,
                    ..
                },
                ..
            }
        )
    }

    /// Captured standard error, if the process got far enough to produce any
    pub fn stderr(&self) -> &str {
        match self {
            Self::Exit { stderr, .. } => stderr,
            _ => "",
        }
    }
}
