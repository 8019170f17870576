#![allow(missing_docs)]

//! Shared building blocks for the header navigation crates: the language type,
//! path prefix rules, query helpers, the history seam and the event bus.

pub mod events;
pub mod history;
pub mod lang;
pub mod prefix;
pub mod query;

pub use events::{EventBus, HeaderEvent, SubscriptionId};
pub use history::{HistoryApi, HistoryError, HistoryMethod, MemoryHistory};
pub use lang::{Lang, ParseLangError};
pub use prefix::{NON_PREFIXABLE, is_prefixable, language_of, strip_prefix, with_prefix};
