//! CityFeedback admin backend: settings, license, session and report
//! simulation behind a small local HTTP API.

pub mod api;
pub mod categories;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod latency;
pub mod license;
pub mod report;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod store;
