#![allow(missing_docs)]

//! Language coordination: the persisted selection, the per-tab prediction map,
//! the URL prefix enforcer and cross-tab synchronisation.

pub mod clock;
pub mod enforcer;
pub mod language_store;
pub mod links;
pub mod navigation_map;
pub mod store;
pub mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use enforcer::{
    Authority, BootOutcome, Decision, EnforcerOptions, Enforcement, UrlEnforcer, UrlState,
};
pub use language_store::{LanguageRecord, LanguageStore};
pub use links::localize_href;
pub use navigation_map::{NavigationLanguageMap, NavigationMapRecorder};
pub use store::{KeyValueStore, MemoryStore, StorageError, StorageKeys};
pub use sync::LanguageSync;
