//! # Lock In Core Library
//!
//! Core logic for the Lock In focus timer and the plumbing shared by the
//! social screens around it. The CLI binary is a thin host over this crate.
//!
//! ## Architecture
//!
//! - **Focus**: a pure session state machine plus an async controller that
//!   owns the 1 Hz ticker and turns host lifecycle and screen-focus
//!   changes into interrupts
//! - **Storage**: SQLite key/value session store and TOML configuration
//! - **Remote**: client for the backend's named queries and identifier
//!   normalization for the records it returns
//!
//! ## Key Components
//!
//! - [`FocusSession`]: Setup / Running / Failed / Completed state machine
//! - [`FocusController`]: ticker, signals and phase-change subscription
//! - [`SessionStore`]: logged-in user persistence
//! - [`QueryClient`]: remote query execution
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod focus;
pub mod remote;
pub mod storage;

pub use error::{ConfigError, CoreError, RemoteError, StorageError, ValidationError};
pub use events::{Event, PhaseChange, PresentationCue};
pub use focus::{
    AppLifecycle, AppState, FocusController, FocusSession, FocusSettings, FocusSnapshot,
    InterruptSource, LifecycleHub, Phase, Subscription,
};
pub use remote::{QueryClient, QueryResponse, RecordId, RecordKind};
pub use storage::{Config, SessionStore};
