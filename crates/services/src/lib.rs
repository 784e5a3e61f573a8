#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod hydration;
mod persistence;
pub mod progress_store;
pub mod scroll;
pub mod unlock_timer;
pub mod view;

pub use app_services::AppServices;
pub use config::{InitialProgress, ProgressConfig};
pub use error::AppServicesError;
pub use hydration::{Hydration, HydrationGate};
pub use progress_store::ProgressStore;
pub use scroll::{SectionOffset, section_in_view};
pub use unlock_timer::{SectionUnlocker, UnlockTimer};
pub use view::{DotState, ProgressBarView, ProgressDot, SectionVisibility};
