//! Settings-change resolution.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::monitor::SessionMonitor;
use crate::queue::ConcurrencyGate;
use crate::triggers::CatchupTriggers;

use super::types::{ModeSnapshot, RunOverrides, SettingsUpdate};

/// Holds the current [`ModeSnapshot`] and turns settings saves into side
/// effects.
///
/// Reads are lock-for-clone of an `Arc`; writes go through the explicit
/// reconfiguration entry points only. Each side effect fires exactly once
/// per actual value change, never on a no-op save.
pub struct ModeResolver {
    snapshot: RwLock<Arc<ModeSnapshot>>,
    gate: Arc<ConcurrencyGate>,
    triggers: Arc<CatchupTriggers>,
    monitor: Arc<dyn SessionMonitor>,
}

impl ModeResolver {
    pub fn new(
        initial: ModeSnapshot,
        gate: Arc<ConcurrencyGate>,
        triggers: Arc<CatchupTriggers>,
        monitor: Arc<dyn SessionMonitor>,
    ) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(initial)),
            gate,
            triggers,
            monitor,
        }
    }

    /// The current snapshot. Non-blocking for practical purposes; safe
    /// from any thread.
    pub fn current(&self) -> Arc<ModeSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap())
    }

    /// Bring collaborators in line with the initial snapshot at startup.
    pub fn bootstrap(&self) {
        let snapshot = self.current();
        self.monitor
            .update_library_scope(snapshot.intro_skip_library_scope.clone());
        self.monitor
            .update_user_scope(snapshot.intro_skip_user_scope.clone());
        if snapshot.catchup_enabled {
            self.triggers.start();
        }
        if snapshot.intro_skip_enabled {
            self.monitor.start();
        }
    }

    /// Apply a settings save: log every value, fire side effects for the
    /// fields that actually changed, then swap the snapshot.
    pub fn apply_settings(&self, update: SettingsUpdate) {
        let prev = self.current();

        info!("LightweightOnly is set to {}", update.extract.lightweight_only);
        info!("MaxConcurrent is set to {}", update.extract.max_concurrent);
        info!("EnableCapture is set to {}", update.extract.enable_capture);
        info!("ExclusiveExtract is set to {}", update.extract.exclusive);
        info!("CatchupMode is set to {}", update.catchup.enabled);
        info!("EnableIntroSkip is set to {}", update.intro_skip.enabled);
        info!(
            "MaxIntroDurationSeconds is set to {}",
            update.intro_skip.max_intro_secs
        );
        info!(
            "MaxCreditsDurationSeconds is set to {}",
            update.intro_skip.max_credits_secs
        );
        info!(
            "Extract - LibraryScope is set to {}",
            scope_display(&update.extract.library_scope)
        );
        info!(
            "IntroSkip - LibraryScope is set to {}",
            scope_display(&update.intro_skip.library_scope)
        );
        info!(
            "IntroSkip - UserScope is set to {}",
            scope_display(&update.intro_skip.user_scope)
        );

        if update.extract.max_concurrent != prev.max_concurrent {
            self.gate.resize(update.extract.max_concurrent);
        }

        if update.catchup.enabled != prev.catchup_enabled {
            if update.catchup.enabled {
                self.triggers.start();
            } else {
                self.triggers.stop();
            }
        }

        if update.intro_skip.enabled != prev.intro_skip_enabled {
            if update.intro_skip.enabled {
                self.monitor.start();
            } else {
                self.monitor.stop();
            }
        }

        if update.intro_skip.library_scope != prev.intro_skip_library_scope {
            self.monitor
                .update_library_scope(update.intro_skip.library_scope.clone());
        }

        if update.intro_skip.user_scope != prev.intro_skip_user_scope {
            self.monitor
                .update_user_scope(update.intro_skip.user_scope.clone());
        }

        let mut next =
            ModeSnapshot::from_parts(&update.extract, &update.catchup, &update.intro_skip);
        // A save during an active batch must not drop the run-scoped
        // overrides out from under it.
        next.run_overrides = prev.run_overrides;

        *self.snapshot.write().unwrap() = Arc::new(next);
    }

    /// Install batch-scoped timeout relaxations.
    pub fn apply_run_overrides(&self, overrides: RunOverrides) {
        let mut next = (*self.current()).clone();
        next.run_overrides = overrides;
        *self.snapshot.write().unwrap() = Arc::new(next);
    }

    /// Remove batch-scoped timeout relaxations.
    pub fn clear_run_overrides(&self) {
        self.apply_run_overrides(RunOverrides::default());
    }
}

fn scope_display(scope: &[String]) -> String {
    if scope.is_empty() {
        "ALL".to_string()
    } else {
        scope.join(", ")
    }
}
