use crate::domain::model::{Facility, Slot, Snapshot};
use crate::utils::error::{ParkingError, Result};
use std::collections::HashSet;

/// Combine one cycle's facilities and slots into a snapshot.
///
/// Every slot is assigned to the first facility in fetched order and all other
/// facilities are left without slots. The service does not yet report which
/// facility a slot belongs to, so this is the documented behavior until it does.
pub fn merge(facilities: Vec<Facility>, slots: Vec<Slot>) -> Result<Snapshot> {
    if facilities.is_empty() {
        return Ok(Snapshot::empty());
    }

    let mut facility_ids = HashSet::with_capacity(facilities.len());
    for facility in &facilities {
        if !facility_ids.insert(facility.id) {
            return Err(ParkingError::invalid_input(format!(
                "duplicate facility id {}",
                facility.id
            )));
        }
        if !facility.position.is_valid() {
            return Err(ParkingError::invalid_input(format!(
                "facility {} has an invalid position ({}, {})",
                facility.id, facility.position.latitude, facility.position.longitude
            )));
        }
    }

    let mut slot_ids = HashSet::with_capacity(slots.len());
    for slot in &slots {
        if !slot_ids.insert(slot.id) {
            return Err(ParkingError::invalid_input(format!(
                "duplicate slot id {}",
                slot.id
            )));
        }
    }

    let mut slots = Some(slots);
    let merged = facilities
        .into_iter()
        .map(|facility| {
            let assigned = slots.take().unwrap_or_default();
            facility.with_slots(assigned)
        })
        .collect();

    Ok(Snapshot::from_facilities(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{annotation_label, GeoPoint, DEFAULT_POSITION};

    fn facility(id: u64, name: &str) -> Facility {
        Facility::new(id, name, DEFAULT_POSITION)
    }

    fn slot(id: u64, occupied: bool) -> Slot {
        Slot {
            id,
            slot_number: id as u32,
            occupied,
            sensor_id: Some(format!("sensor-{}", id)),
        }
    }

    #[test]
    fn test_single_lot_scenario() {
        let snapshot = merge(
            vec![facility(1, "Lot A")],
            vec![slot(10, false), slot(11, true)],
        )
        .unwrap();

        assert_eq!(snapshot.facility_count(), 1);
        let lot = &snapshot.facilities()[0];
        assert_eq!(lot.total_count(), 2);
        assert_eq!(lot.free_count(), 1);
        assert_eq!(
            annotation_label(&lot.name, lot.free_count(), lot.total_count()),
            "Lot A\n1 free / 2 total"
        );
    }

    #[test]
    fn test_all_slots_go_to_first_facility() {
        let snapshot = merge(
            vec![facility(3, "North"), facility(1, "South"), facility(2, "East")],
            vec![slot(1, true), slot(2, false), slot(3, false)],
        )
        .unwrap();

        let facilities = snapshot.facilities();
        assert_eq!(facilities[0].id, 3);
        assert_eq!(facilities[0].total_count(), 3);
        assert!(facilities[1].slots().is_empty());
        assert!(facilities[2].slots().is_empty());
        assert_eq!(snapshot.slot_count(), 3);
    }

    #[test]
    fn test_slots_already_attached_are_replaced() {
        let preloaded = facility(2, "Second").with_slots(vec![slot(99, true)]);
        let snapshot = merge(vec![facility(1, "First"), preloaded], vec![slot(5, false)]).unwrap();

        assert_eq!(snapshot.facilities()[0].slots()[0].id, 5);
        assert!(snapshot.facilities()[1].slots().is_empty());
    }

    #[test]
    fn test_empty_facilities_yield_empty_snapshot() {
        let snapshot = merge(vec![], vec![slot(1, false), slot(2, true)]).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.slot_count(), 0);
    }

    #[test]
    fn test_no_slots_gives_empty_collections() {
        let snapshot = merge(vec![facility(1, "A"), facility(2, "B")], vec![]).unwrap();
        for facility in snapshot.facilities() {
            assert_eq!(facility.total_count(), 0);
            assert_eq!(facility.free_count(), 0);
        }
    }

    #[test]
    fn test_free_plus_occupied_equals_total() {
        for pattern in 0u32..64 {
            let slots: Vec<Slot> = (0..6)
                .map(|bit| slot(bit as u64, pattern & (1 << bit) != 0))
                .collect();
            let snapshot = merge(vec![facility(1, "A"), facility(2, "B")], slots).unwrap();
            for facility in snapshot.facilities() {
                assert_eq!(
                    facility.free_count() + facility.occupied_count(),
                    facility.total_count()
                );
            }
        }
    }

    #[test]
    fn test_merge_is_deterministic() {
        let facilities = vec![facility(1, "A"), facility(2, "B")];
        let slots = vec![slot(1, true), slot(2, false)];
        assert_eq!(
            merge(facilities.clone(), slots.clone()).unwrap(),
            merge(facilities, slots).unwrap()
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = merge(vec![facility(1, "A"), facility(1, "B")], vec![]).unwrap_err();
        assert!(matches!(err, ParkingError::InvalidInput { .. }));

        let err = merge(vec![facility(1, "A")], vec![slot(4, true), slot(4, false)]).unwrap_err();
        assert!(err.to_string().contains("duplicate slot id 4"));
    }

    #[test]
    fn test_invalid_position_is_rejected() {
        let broken = Facility::new(1, "Nowhere", GeoPoint::new(120.0, 0.0));
        assert!(merge(vec![broken], vec![]).is_err());
    }
}
