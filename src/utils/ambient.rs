//! Process-ambient state (wall clock, working directory) behind a trait so
//! manifest synthesis can be driven with fixed values.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

pub trait Ambient {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Current working directory, if it can be determined
    fn current_dir(&self) -> Option<PathBuf>;
}

/// Reads the real clock and working directory
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAmbient;

impl Ambient for SystemAmbient {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }
}

/// Returns the same time and directory on every call
#[derive(Debug, Clone)]
pub struct FixedAmbient {
    pub now: DateTime<Utc>,
    pub current_dir: Option<PathBuf>,
}

impl FixedAmbient {
    pub fn new(now: DateTime<Utc>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            now,
            current_dir: Some(current_dir.into()),
        }
    }
}

impl Ambient for FixedAmbient {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.current_dir.clone()
    }
}
