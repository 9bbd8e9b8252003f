//! Point-in-element location.

use rayon::prelude::*;
use rupture_core::ElementId;

use crate::barycentric::barycentric;
use crate::mesh::TetMesh;

/// Where a query point was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// Contained in this element.
    Inside(ElementId),
    /// Contained in no element of the mesh.
    Outside,
}

impl Containment {
    /// The containing element, if any.
    pub fn element(self) -> Option<ElementId> {
        match self {
            Self::Inside(e) => Some(e),
            Self::Outside => None,
        }
    }

    /// Whether the point was found.
    pub fn is_inside(self) -> bool {
        matches!(self, Self::Inside(_))
    }
}

/// Counts of resolved and unresolved query points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocateSummary {
    /// Number of query points.
    pub total: usize,
    /// Points contained in some element.
    pub inside: usize,
    /// Points contained in no element.
    pub outside: usize,
}

impl LocateSummary {
    /// Tally a result set.
    pub fn from_results(results: &[Containment]) -> Self {
        let inside = results.iter().filter(|c| c.is_inside()).count();
        Self {
            total: results.len(),
            inside,
            outside: results.len() - inside,
        }
    }

    /// Whether every point was resolved.
    pub fn all_found(&self) -> bool {
        self.outside == 0
    }
}

/// Result of a location pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Located {
    /// One entry per query point, in input order.
    pub ids: Vec<Containment>,
    /// Tally of `ids`.
    pub summary: LocateSummary,
}

/// Barycentric point locator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Locator {
    tolerance: f64,
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}

impl Locator {
    /// Default tolerance on barycentric coordinates.
    pub const DEFAULT_TOLERANCE: f64 = 1e-8;

    /// A locator with the default tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tolerance on barycentric coordinates. Negative values are
    /// treated as zero.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// The tolerance on barycentric coordinates.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Locate a single point. The lowest-numbered containing element wins.
    pub fn locate_one(&self, point: [f64; 3], mesh: &TetMesh) -> Containment {
        let tol = self.tolerance;
        mesh.element_ids()
            .find(|&e| {
                let bbox = mesh.element_bounds(e);
                bbox.contains(point, tol * bbox.extent())
                    && barycentric(point, &mesh.corners(e)).is_some_and(|b| b.is_inside(tol))
            })
            .map_or(Containment::Outside, Containment::Inside)
    }

    /// Locate every point, in parallel across points.
    ///
    /// Misses are not errors; they are counted in the summary and logged.
    pub fn locate(&self, points: &[[f64; 3]], mesh: &TetMesh) -> Located {
        let margin = self.tolerance * mesh.bounds().extent();
        let outer = mesh.bounds();
        let ids: Vec<Containment> = points
            .par_iter()
            .map(|&p| {
                if outer.contains(p, margin) {
                    self.locate_one(p, mesh)
                } else {
                    Containment::Outside
                }
            })
            .collect();
        let summary = LocateSummary::from_results(&ids);
        if !summary.all_found() {
            tracing::warn!(
                total = summary.total,
                unresolved = summary.outside,
                "points not contained in any element"
            );
        }
        tracing::debug!(total = summary.total, inside = summary.inside, "located points");
        Located { ids, summary }
    }
}

/// Locate `points` in `mesh` with the default tolerance.
pub fn find_mesh_ids(points: &[[f64; 3]], mesh: &TetMesh) -> Vec<Containment> {
    Locator::new().locate(points, mesh).ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit() -> TetMesh {
        TetMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0, 1, 2, 3]],
        )
        .unwrap()
    }

    /// Unit cube split into six tetrahedra around the main diagonal.
    fn cube() -> TetMesh {
        let vertices = (0..8)
            .map(|i| {
                [
                    (i & 1) as f64,
                    ((i >> 1) & 1) as f64,
                    ((i >> 2) & 1) as f64,
                ]
            })
            .collect();
        let elements = vec![
            [0, 1, 3, 7],
            [0, 3, 2, 7],
            [0, 2, 6, 7],
            [0, 6, 4, 7],
            [0, 4, 5, 7],
            [0, 5, 1, 7],
        ];
        TetMesh::new(vertices, elements).unwrap()
    }

    #[test]
    fn centroid_found_far_point_missed() {
        let ids = find_mesh_ids(&[[0.25, 0.25, 0.25], [10.0, 10.0, 10.0]], &unit());
        assert_eq!(ids, [Containment::Inside(ElementId(0)), Containment::Outside]);
    }

    #[test]
    fn vertex_and_face_points_are_inside() {
        let mesh = unit();
        let located = Locator::new().locate(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.5, 0.0], [1.0 / 3.0; 3]],
            &mesh,
        );
        assert!(located.summary.all_found());
    }

    #[test]
    fn tolerance_controls_boundary() {
        let mesh = unit();
        let p = [0.2, 0.2, -1e-6];
        assert_eq!(Locator::new().locate_one(p, &mesh), Containment::Outside);
        assert_eq!(
            Locator::new().with_tolerance(1e-4).locate_one(p, &mesh),
            Containment::Inside(ElementId(0))
        );
    }

    #[test]
    fn every_cube_centroid_resolves_to_its_element() {
        let mesh = cube();
        let centroids: Vec<_> = mesh.element_ids().map(|e| mesh.centroid(e)).collect();
        let ids = find_mesh_ids(&centroids, &mesh);
        for (e, id) in mesh.element_ids().zip(ids) {
            assert_eq!(id, Containment::Inside(e));
        }
    }

    #[test]
    fn summary_counts_misses() {
        let located = Locator::new().locate(
            &[[0.1, 0.1, 0.1], [2.0, 0.0, 0.0], [0.9, 0.9, 0.9]],
            &unit(),
        );
        assert_eq!(
            located.summary,
            LocateSummary {
                total: 3,
                inside: 1,
                outside: 2
            }
        );
    }

    #[test]
    fn empty_query() {
        let located = Locator::new().locate(&[], &unit());
        assert!(located.ids.is_empty());
        assert!(located.summary.all_found());
    }

    proptest! {
        #[test]
        fn interior_cube_points_always_found(
            x in 0.0f64..=1.0, y in 0.0f64..=1.0, z in 0.0f64..=1.0,
        ) {
            let mesh = cube();
            prop_assert!(Locator::new().locate_one([x, y, z], &mesh).is_inside());
        }

        #[test]
        fn points_outside_cube_never_found(
            x in 1.01f64..5.0, y in -5.0f64..5.0, z in -5.0f64..5.0,
        ) {
            let mesh = cube();
            prop_assert_eq!(Locator::new().locate_one([x, y, z], &mesh), Containment::Outside);
        }
    }
}
