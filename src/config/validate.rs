// src/config/validate.rs

use crate::autopsy::{DEFAULT_RERUN_STATES, JobState, parse_rerun_states};
use crate::config::model::{AutopsySection, ConfigFile, RawConfigFile};
use crate::errors::{DsqError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DsqError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_scheduler(&raw)?;
        let autopsy = AutopsySection {
            rerun_states: validate_rerun_states(raw.autopsy.rerun_states.as_deref())?,
        };
        Ok(ConfigFile::new_unchecked(raw.status, raw.scheduler, autopsy))
    }
}

fn validate_scheduler(cfg: &RawConfigFile) -> Result<()> {
    if cfg.scheduler.sacct.trim().is_empty() {
        return Err(DsqError::Config(
            "[scheduler].sacct must name a program (got empty string)".to_string(),
        ));
    }
    Ok(())
}

fn validate_rerun_states(states: Option<&[String]>) -> Result<Vec<JobState>> {
    match states {
        None => parse_rerun_states(DEFAULT_RERUN_STATES),
        Some([]) => Err(DsqError::Config(
            "[autopsy].rerun_states must list at least one state".to_string(),
        )),
        Some(list) => parse_rerun_states(&list.join(",")),
    }
}
