//! Locate receivers, build a fault store, and run a few friction steps.

use rupture::mesh::deduplicate_ownership;
use rupture::prelude::*;
use rupture_test_utils::fixtures::{unit_tetrahedron, Fault, AGING_CONFIG};

#[test]
fn receivers_are_located_and_deduplicated() {
    let mesh = unit_tetrahedron();
    let points = [[0.25, 0.25, 0.25], [10.0, 10.0, 10.0]];
    let ids = find_mesh_ids(&points, &mesh);
    assert_eq!(
        ids,
        [Containment::Inside(rupture::types::ElementId(0)), Containment::Outside]
    );

    // Two ranks both hold the tetrahedron; rank 0 keeps the point.
    let claims: Vec<Vec<bool>> = (0..2)
        .map(|_| ids.iter().map(|c| c.is_inside()).collect())
        .collect();
    let ownership = deduplicate_ownership(&claims).unwrap();
    assert_eq!(ownership.owner(0), Some(0));
    assert_eq!(ownership.owner(1), None);
}

#[test]
fn rate_and_state_fault_runs_through_facade() {
    let mut fault = Fault::rate_and_state(AGING_CONFIG, 4, 45.0);
    fault.initialise();
    let mut total = StepSummary::default();
    for i in 0..3 {
        total = total.merge(fault.step(i as f64 * 0.01, 0.01));
    }
    assert_eq!(total.faces, 12);
    assert_eq!(total.ruptured, 4 * fault.points());

    let slip = fault.store.field_id("slip").unwrap();
    let exported = fault.store.export_reals(Layer::Interior, slip).unwrap();
    assert_eq!(exported.len(), 4);
    assert_eq!(exported[3].0, FaceIndex(3));
    assert!(exported
        .iter()
        .all(|(_, values)| values.len() == fault.points() && values.iter().all(|&s| s > 0.0)));
}
