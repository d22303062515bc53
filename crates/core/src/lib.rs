pub mod config;
pub mod dispatcher;
pub mod library;
pub mod monitor;
pub mod queue;
pub mod resolver;
pub mod testing;
pub mod triggers;

pub use config::{
    load_config, load_config_from_str, validate_config, CatchupConfig, Config, ConfigError,
    ExtractConfig, IntroSkipConfig, MediaServerConfig, SanitizedConfig, ServerConfig,
};
pub use dispatcher::{BatchReport, DispatcherStatus, ExtractionDispatcher, ProgressSender};
pub use library::{
    ChapterAnalysis, ExtractFilter, ExtractOptions, HttpLibraryClient, LibraryError, MediaKind,
    MediaLibrary, WorkItem,
};
pub use monitor::{ScopedSessionMonitor, SessionMonitor};
pub use queue::{ConcurrencyGate, GateCancelled, GatePermit, WorkQueue};
pub use resolver::{ModeResolver, ModeSnapshot, RunOverrides, SettingsUpdate};
pub use triggers::{CatchupTriggers, LibraryEvent};
