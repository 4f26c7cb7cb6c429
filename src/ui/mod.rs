//! UI-facing pieces: lane popups, the filter form and user notices.

pub mod controls;
pub mod popup;
