//! Read-only tetrahedral mesh view.

use rupture_core::{ElementId, VertexId};

use crate::barycentric::signed_volume6;
use crate::error::MeshError;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Lower corner.
    pub min: [f64; 3],
    /// Upper corner.
    pub max: [f64; 3],
}

impl Aabb {
    fn of(points: &[[f64; 3]]) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for p in points {
            for d in 0..3 {
                min[d] = min[d].min(p[d]);
                max[d] = max[d].max(p[d]);
            }
        }
        Self { min, max }
    }

    /// Largest edge length.
    pub fn extent(&self) -> f64 {
        (0..3)
            .map(|d| self.max[d] - self.min[d])
            .fold(0.0, f64::max)
    }

    /// Whether `p` lies in the box grown by `margin` on every side.
    pub fn contains(&self, p: [f64; 3], margin: f64) -> bool {
        (0..3).all(|d| p[d] >= self.min[d] - margin && p[d] <= self.max[d] + margin)
    }
}

/// Vertex coordinates plus element-to-vertex connectivity.
///
/// Validated on construction: every element references existing vertices
/// and has non-zero volume. Per-element bounding boxes are precomputed for
/// the locator's prefilter.
#[derive(Clone, Debug)]
pub struct TetMesh {
    vertices: Vec<[f64; 3]>,
    elements: Vec<[u32; 4]>,
    bounds: Vec<Aabb>,
    extent: Aabb,
}

impl TetMesh {
    /// Build a mesh view from vertex coordinates and element connectivity.
    pub fn new(vertices: Vec<[f64; 3]>, elements: Vec<[u32; 4]>) -> Result<Self, MeshError> {
        if elements.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        if let Some(i) = vertices
            .iter()
            .position(|v| v.iter().any(|c| !c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex {
                vertex: VertexId(i as u32),
            });
        }

        let mut bounds = Vec::with_capacity(elements.len());
        for (e, element) in elements.iter().enumerate() {
            let mut corners = [[0.0; 3]; 4];
            for (corner, &v) in corners.iter_mut().zip(element) {
                *corner = *vertices.get(v as usize).ok_or(MeshError::VertexOutOfRange {
                    element: ElementId(e as u32),
                    vertex: VertexId(v),
                    vertices: vertices.len(),
                })?;
            }
            let bbox = Aabb::of(&corners);
            let volume = signed_volume6(&corners) / 6.0;
            // Relative to the element's own scale so tiny elements are not rejected.
            if volume.abs() <= f64::EPSILON * bbox.extent().powi(3) {
                return Err(MeshError::DegenerateElement {
                    element: ElementId(e as u32),
                    volume,
                });
            }
            bounds.push(bbox);
        }

        let extent = Aabb::of(&vertices);
        Ok(Self {
            vertices,
            elements,
            bounds,
            extent,
        })
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Corner coordinates of an element.
    ///
    /// # Panics
    ///
    /// Panics if `element` is out of range.
    pub fn corners(&self, element: ElementId) -> [[f64; 3]; 4] {
        self.elements[element.0 as usize].map(|v| self.vertices[v as usize])
    }

    /// Centroid of an element.
    pub fn centroid(&self, element: ElementId) -> [f64; 3] {
        let corners = self.corners(element);
        let mut c = [0.0; 3];
        for corner in &corners {
            for d in 0..3 {
                c[d] += 0.25 * corner[d];
            }
        }
        c
    }

    /// Bounding box of one element.
    pub fn element_bounds(&self, element: ElementId) -> Aabb {
        self.bounds[element.0 as usize]
    }

    /// Bounding box of the whole mesh.
    pub fn bounds(&self) -> Aabb {
        self.extent
    }

    /// Iterate over element ids.
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> {
        (0..self.elements.len() as u32).map(ElementId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> TetMesh {
        TetMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0, 1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn unit_tet_centroid() {
        let mesh = unit();
        assert_eq!(mesh.centroid(ElementId(0)), [0.25, 0.25, 0.25]);
        assert_eq!(mesh.bounds().extent(), 1.0);
    }

    #[test]
    fn missing_vertex_rejected() {
        let err = TetMesh::new(vec![[0.0; 3]; 3], vec![[0, 1, 2, 3]]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::VertexOutOfRange {
                vertex: VertexId(3),
                ..
            }
        ));
    }

    #[test]
    fn flat_element_rejected() {
        let err = TetMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            vec![[0, 1, 2, 3]],
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::DegenerateElement { .. }));
    }

    #[test]
    fn empty_mesh_rejected() {
        assert_eq!(
            TetMesh::new(vec![], vec![]).unwrap_err(),
            MeshError::EmptyMesh
        );
    }

    #[test]
    fn nan_vertex_rejected() {
        let err = TetMesh::new(
            vec![[0.0, 0.0, 0.0], [f64::NAN, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0, 1, 2, 3]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MeshError::NonFiniteVertex {
                vertex: VertexId(1)
            }
        );
    }
}
