// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::autopsy::JobState;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [status]
/// dir = "/scratch/me/status"
/// lock_appends = false
///
/// [scheduler]
/// sacct = "sacct"
///
/// [autopsy]
/// rerun_states = ["CANCELLED", "NODE_FAIL", "PREEMPTED"]
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub status: StatusSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub autopsy: RawAutopsySection,
}

/// `[status]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusSection {
    /// Directory holding `job_<id>_status.tsv` files.
    #[serde(default = "default_status_dir")]
    pub dir: PathBuf,

    /// Take an exclusive `flock` around every append.
    ///
    /// Only needed on filesystems that do not honour `O_APPEND` atomically.
    #[serde(default)]
    pub lock_appends: bool,
}

fn default_status_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for StatusSection {
    fn default() -> Self {
        Self {
            dir: default_status_dir(),
            lock_appends: false,
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerSection {
    #[serde(default = "default_sacct")]
    pub sacct: String,
}

fn default_sacct() -> String {
    "sacct".to_string()
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            sacct: default_sacct(),
        }
    }
}

/// `[autopsy]` section as written; state names are checked in validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAutopsySection {
    #[serde(default)]
    pub rerun_states: Option<Vec<String>>,
}

/// Validated `[autopsy]` section.
#[derive(Debug, Clone)]
pub struct AutopsySection {
    pub rerun_states: Vec<JobState>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (or `Default`), so a
/// `ConfigFile` always names known states.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub status: StatusSection,
    pub scheduler: SchedulerSection,
    pub autopsy: AutopsySection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        status: StatusSection,
        scheduler: SchedulerSection,
        autopsy: AutopsySection,
    ) -> Self {
        Self {
            status,
            scheduler,
            autopsy,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            status: StatusSection::default(),
            scheduler: SchedulerSection::default(),
            autopsy: AutopsySection {
                rerun_states: vec![
                    JobState::Cancelled,
                    JobState::NodeFail,
                    JobState::Preempted,
                ],
            },
        }
    }
}
