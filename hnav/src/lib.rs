#![allow(missing_docs)]

//! The header navigation widget: settings, logging and the [`HeaderApp`]
//! context that wires the language layer, the router and the buttons together.
//! Browser bindings live in [`web`] and are only built for `wasm32`.

mod app;
mod detail;
mod error;
mod logging;
mod settings;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{HeaderApp, Platform, Spawner};
pub use detail::event_detail;
pub use error::AppError;
pub use logging::init_logging;
pub use settings::HeaderSettings;

pub use hnav_components;
pub use hnav_lang;
pub use hnav_router;
pub use hnav_utils;
