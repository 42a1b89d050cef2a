pub mod controller;
pub mod merge;
pub mod reconciler;
pub mod scheduler;

pub use crate::domain::model::{Facility, GeoPoint, Notice, Slot, Snapshot};
pub use crate::domain::ports::{ConfigProvider, FacilityRepository, MapSurface, Notifier};
pub use crate::utils::error::Result;
