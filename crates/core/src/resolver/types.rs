//! Mode snapshot and settings payloads.

use serde::{Deserialize, Serialize};

use crate::config::{CatchupConfig, Config, ExtractConfig, IntroSkipConfig};

/// Timeout relaxations scoped to one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOverrides {
    /// Probe calls run with relaxed timeouts.
    pub relaxed_probe_timeout: bool,
    /// Capture calls run with relaxed timeouts.
    pub relaxed_capture_timeout: bool,
}

impl RunOverrides {
    pub fn is_clear(&self) -> bool {
        *self == RunOverrides::default()
    }
}

/// Immutable view of the process-wide behavior configuration.
///
/// Workers read a consistent snapshot; the resolver swaps whole values,
/// so no reader ever observes a half-applied change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSnapshot {
    pub max_concurrent: usize,
    pub enable_capture: bool,
    pub exclusive: bool,
    pub lightweight_only: bool,
    pub extract_library_scope: Vec<String>,
    pub catchup_enabled: bool,
    pub intro_skip_enabled: bool,
    pub intro_skip_library_scope: Vec<String>,
    pub intro_skip_user_scope: Vec<String>,
    pub max_intro_secs: u32,
    pub max_credits_secs: u32,
    /// Batch-scoped overrides; cleared whenever no run is active.
    pub run_overrides: RunOverrides,
}

impl ModeSnapshot {
    pub fn from_config(config: &Config) -> Self {
        Self::from_parts(&config.extract, &config.catchup, &config.intro_skip)
    }

    pub fn from_parts(
        extract: &ExtractConfig,
        catchup: &CatchupConfig,
        intro_skip: &IntroSkipConfig,
    ) -> Self {
        Self {
            max_concurrent: extract.max_concurrent,
            enable_capture: extract.enable_capture,
            exclusive: extract.exclusive,
            lightweight_only: extract.lightweight_only,
            extract_library_scope: extract.library_scope.clone(),
            catchup_enabled: catchup.enabled,
            intro_skip_enabled: intro_skip.enabled,
            intro_skip_library_scope: intro_skip.library_scope.clone(),
            intro_skip_user_scope: intro_skip.user_scope.clone(),
            max_intro_secs: intro_skip.max_intro_secs,
            max_credits_secs: intro_skip.max_credits_secs,
            run_overrides: RunOverrides::default(),
        }
    }
}

/// Settings payload accepted by the reconfiguration entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub catchup: CatchupConfig,
    #[serde(default)]
    pub intro_skip: IntroSkipConfig,
}

impl SettingsUpdate {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extract: config.extract.clone(),
            catchup: config.catchup.clone(),
            intro_skip: config.intro_skip.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_parts_carries_no_overrides() {
        let snapshot = ModeSnapshot::from_parts(
            &ExtractConfig::default(),
            &CatchupConfig::default(),
            &IntroSkipConfig::default(),
        );
        assert!(snapshot.run_overrides.is_clear());
        assert_eq!(snapshot.max_concurrent, 1);
    }

    #[test]
    fn test_settings_update_deserialize_partial() {
        let update: SettingsUpdate = serde_json::from_str(
            r#"{"extract":{"max_concurrent":3},"catchup":{"enabled":true}}"#,
        )
        .unwrap();
        assert_eq!(update.extract.max_concurrent, 3);
        assert!(update.catchup.enabled);
        assert!(!update.intro_skip.enabled);
    }
}
