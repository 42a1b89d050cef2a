use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Placeholder used when the service does not report a facility position.
pub const DEFAULT_POSITION: GeoPoint = GeoPoint {
    latitude: 48.8566,
    longitude: 2.3522,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        DEFAULT_POSITION
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: u64,
    #[serde(default)]
    pub slot_number: u32,
    #[serde(default)]
    pub occupied: bool,
    #[serde(default)]
    pub sensor_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: u64,
    pub name: String,
    pub address: Option<String>,
    pub position: GeoPoint,
    slots: Vec<Slot>,
}

impl Facility {
    pub fn new(id: u64, name: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            address: None,
            position,
            slots: Vec::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub(crate) fn with_slots(mut self, slots: Vec<Slot>) -> Self {
        self.slots = slots;
        self
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.occupied).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.occupied).count()
    }

    pub fn total_count(&self) -> usize {
        self.slots.len()
    }
}

/// One merged, point-in-time view of every facility and its slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    facilities: Vec<Facility>,
}

impl Snapshot {
    pub(crate) fn from_facilities(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn first(&self) -> Option<&Facility> {
        self.facilities.first()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }

    pub fn slot_count(&self) -> usize {
        self.facilities.iter().map(Facility::total_count).sum()
    }
}

pub fn annotation_label(name: &str, free: usize, total: usize) -> String {
    format!("{}\n{} free / {} total", name, free, total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    Bottom,
}

/// A marker as handed to the map surface. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub facility_id: u64,
    pub position: GeoPoint,
    pub title: String,
    pub snippet: String,
    pub anchor: (Anchor, Anchor),
    pub show_detail: bool,
}

impl Annotation {
    pub fn for_facility(facility: &Facility, updated_at: DateTime<Local>) -> Self {
        Self {
            facility_id: facility.id,
            position: facility.position,
            title: annotation_label(&facility.name, facility.free_count(), facility.total_count()),
            snippet: format!("Updated: {}", updated_at.format("%H:%M:%S")),
            anchor: (Anchor::Center, Anchor::Bottom),
            show_detail: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
}

/// User-facing transient messages. `message()` gives the default English text;
/// a notifier may localize from the variant instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    LoadingStarted,
    FacilitiesUnavailable,
    SlotsUnavailable,
    NetworkError { cause: String },
    InvalidData { cause: String },
    FirstLoadSummary { facilities: usize, slots: usize },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::LoadingStarted => "Loading parking data...".to_string(),
            Notice::FacilitiesUnavailable => "Error loading lots".to_string(),
            Notice::SlotsUnavailable => "Error loading slots".to_string(),
            Notice::NetworkError { cause } => format!("Network error: {}", cause),
            Notice::InvalidData { cause } => format!("Invalid parking data: {}", cause),
            Notice::FirstLoadSummary { facilities, slots } => format!(
                "Found {} parking lot(s) with {} slots",
                facilities, slots
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::LoadingStarted | Notice::FirstLoadSummary { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(id: u64, occupied: bool) -> Slot {
        Slot {
            id,
            slot_number: id as u32,
            occupied,
            sensor_id: None,
        }
    }

    #[test]
    fn test_counts_are_derived_from_slots() {
        let facility = Facility::new(1, "Lot A", DEFAULT_POSITION)
            .with_slots(vec![slot(10, false), slot(11, true), slot(12, false)]);

        assert_eq!(facility.free_count(), 2);
        assert_eq!(facility.occupied_count(), 1);
        assert_eq!(facility.total_count(), 3);
    }

    #[test]
    fn test_annotation_label() {
        assert_eq!(annotation_label("Lot A", 1, 2), "Lot A\n1 free / 2 total");
    }

    #[test]
    fn test_annotation_for_facility() {
        let facility = Facility::new(7, "Gare", GeoPoint::new(45.0, 5.0))
            .with_slots(vec![slot(1, true)]);
        let at = Local.with_ymd_and_hms(2024, 5, 1, 14, 3, 9).unwrap();

        let annotation = Annotation::for_facility(&facility, at);

        assert_eq!(annotation.facility_id, 7);
        assert_eq!(annotation.title, "Gare\n0 free / 1 total");
        assert_eq!(annotation.snippet, "Updated: 14:03:09");
        assert!(annotation.show_detail);
    }

    #[test]
    fn test_slot_deserializes_camel_case() {
        let json = r#"{"id": 3, "slotNumber": 12, "occupied": true, "sensorId": "S-12"}"#;
        let parsed: Slot = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.slot_number, 12);
        assert_eq!(parsed.sensor_id.as_deref(), Some("S-12"));
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(DEFAULT_POSITION.is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 200.0).is_valid());
    }
}
