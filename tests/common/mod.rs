#![allow(dead_code)]

use async_trait::async_trait;
use parking_sync::core::{Facility, FacilityRepository, GeoPoint, MapSurface, Notice, Notifier, Slot};
use parking_sync::domain::model::{Annotation, AnnotationId, Viewport};
use parking_sync::{ParkingError, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16),
    Malformed,
}

impl Failure {
    fn into_error(self, endpoint: &str) -> ParkingError {
        match self {
            Failure::Status(status) => ParkingError::HttpStatus {
                endpoint: endpoint.to_string(),
                status,
            },
            Failure::Malformed => ParkingError::Parse {
                endpoint: endpoint.to_string(),
                source: serde_json::from_str::<Vec<Slot>>("{").unwrap_err(),
            },
        }
    }
}

#[derive(Default)]
struct Script {
    facilities: Vec<Facility>,
    slots: Vec<Slot>,
    facilities_failure: Option<Failure>,
    slots_failure: Option<Failure>,
    slots_delay: Duration,
}

/// In-memory repository whose responses can be changed between cycles.
#[derive(Clone, Default)]
pub struct ScriptedRepository {
    script: Arc<Mutex<Script>>,
    facility_calls: Arc<AtomicUsize>,
    slot_calls: Arc<AtomicUsize>,
    slots_in_flight: Arc<AtomicUsize>,
    max_slots_in_flight: Arc<AtomicUsize>,
}

impl ScriptedRepository {
    pub fn new(facilities: Vec<Facility>, slots: Vec<Slot>) -> Self {
        let repo = Self::default();
        repo.set_data(facilities, slots);
        repo
    }

    pub fn set_data(&self, facilities: Vec<Facility>, slots: Vec<Slot>) {
        let mut script = self.script.lock().unwrap();
        script.facilities = facilities;
        script.slots = slots;
    }

    pub fn fail_facilities(&self, failure: Option<Failure>) {
        self.script.lock().unwrap().facilities_failure = failure;
    }

    pub fn fail_slots(&self, failure: Option<Failure>) {
        self.script.lock().unwrap().slots_failure = failure;
    }

    pub fn delay_slots(&self, delay: Duration) {
        self.script.lock().unwrap().slots_delay = delay;
    }

    pub fn facility_calls(&self) -> usize {
        self.facility_calls.load(Ordering::SeqCst)
    }

    pub fn slot_calls(&self) -> usize {
        self.slot_calls.load(Ordering::SeqCst)
    }

    /// Highest number of slot fetches that were running at the same time.
    pub fn max_concurrent_slot_fetches(&self) -> usize {
        self.max_slots_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FacilityRepository for ScriptedRepository {
    async fn fetch_facilities(&self) -> Result<Vec<Facility>> {
        self.facility_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();
        match script.facilities_failure {
            Some(failure) => Err(failure.into_error("lots")),
            None => Ok(script.facilities.clone()),
        }
    }

    async fn fetch_slots(&self) -> Result<Vec<Slot>> {
        self.slot_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.slots_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_slots_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        // the response is fixed when the request starts, like a real server
        let (delay, response) = {
            let script = self.script.lock().unwrap();
            let response = match script.slots_failure {
                Some(failure) => Err(failure),
                None => Ok(script.slots.clone()),
            };
            (script.slots_delay, response)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.slots_in_flight.fetch_sub(1, Ordering::SeqCst);
        response.map_err(|failure| failure.into_error("slots"))
    }
}

#[derive(Default)]
pub struct RecordingMap {
    next_id: u64,
    pub annotations: BTreeMap<AnnotationId, Annotation>,
    pub removed: Vec<AnnotationId>,
    pub detail_shown: Vec<AnnotationId>,
    pub viewports: Vec<Viewport>,
    pub repaints: usize,
}

impl RecordingMap {
    pub fn titles(&self) -> Vec<String> {
        self.annotations.values().map(|a| a.title.clone()).collect()
    }

    pub fn ids(&self) -> Vec<AnnotationId> {
        self.annotations.keys().copied().collect()
    }
}

impl MapSurface for RecordingMap {
    fn add_annotation(&mut self, annotation: &Annotation) -> AnnotationId {
        self.next_id += 1;
        let id = AnnotationId(self.next_id);
        self.annotations.insert(id, annotation.clone());
        id
    }

    fn remove_annotation(&mut self, id: AnnotationId) {
        self.annotations.remove(&id);
        self.removed.push(id);
    }

    fn show_detail(&mut self, id: AnnotationId) {
        self.detail_shown.push(id);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewports.push(viewport);
    }

    fn invalidate(&mut self) {
        self.repaints += 1;
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Notice> {
        self.notices().into_iter().filter(Notice::is_error).collect()
    }

    pub fn count(&self, predicate: impl Fn(&Notice) -> bool) -> usize {
        self.notices().iter().filter(|n| predicate(n)).count()
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn lot(id: u64, name: &str) -> Facility {
    Facility::new(id, name, GeoPoint::default())
}

pub fn lot_at(id: u64, name: &str, latitude: f64, longitude: f64) -> Facility {
    Facility::new(id, name, GeoPoint::new(latitude, longitude))
}

pub fn slot(id: u64, occupied: bool) -> Slot {
    Slot {
        id,
        slot_number: id as u32,
        occupied,
        sensor_id: None,
    }
}
