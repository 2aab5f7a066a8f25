#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod export;
pub mod progress_service;

pub use progress_core::{CalendarZone, Clock};

pub use app_services::AppServices;
pub use config::{
    DEFAULT_RECENT_LIMIT, PROGRESS_KEY, ProgressStoreConfig, SUBMISSION_CAP, SUBMISSIONS_KEY,
};
pub use error::{AppServicesError, ProgressStoreError};
pub use export::{ProgressExport, format_minutes};
pub use progress_service::ProgressStore;
