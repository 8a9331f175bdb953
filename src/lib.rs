pub mod config;
pub mod constants;
pub mod debug_view;
pub mod devices;
pub mod logging;
pub mod session;
pub mod startup;
pub mod tracking;
