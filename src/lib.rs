//! Dashboard controllers for devices and silence rules: the confirmation
//! modal, the device search and actions, and the silence-rule panel, all
//! driven against an in-memory page and a `DashboardApi`.

pub mod api;
pub mod config;
pub mod csrf;
pub mod devices;
pub mod dom;
pub mod error;
pub mod layout;
pub mod modal;
pub mod panel;
pub mod rules;
pub mod terminal;
pub mod ui;

#[cfg(test)]
mod test_utils;
