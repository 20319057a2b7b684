pub mod api;
pub mod core;
pub mod dataset;
pub mod logging;
