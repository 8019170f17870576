#![allow(missing_docs)]

mod button_manager;

pub use button_manager::{ButtonManager, ButtonSurface, ButtonView, ClickHandler, main_button_views, sub_button_views};
