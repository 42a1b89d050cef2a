pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::console::{ConsoleMap, ConsoleNotifier};
pub use adapters::http::HttpFacilityRepository;
pub use core::controller::{ControllerSettings, CycleOutcome, LifecycleEvent, ViewController};
pub use core::merge::merge;
pub use core::reconciler::{AnnotationReconciler, ViewportSettings};
pub use core::scheduler::{CycleTicket, PollScheduler, SchedulerState};
pub use utils::error::{ParkingError, Result};
