//! Barycentric coordinates with respect to a tetrahedron.

/// Barycentric coordinates `[λ0, λ1, λ2, λ3]`, summing to one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Barycentric(pub [f64; 4]);

impl Barycentric {
    /// Whether every coordinate lies in `[-tol, 1 + tol]`.
    pub fn is_inside(&self, tol: f64) -> bool {
        self.0.iter().all(|&l| l >= -tol && l <= 1.0 + tol)
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Six times the signed volume of the tetrahedron.
pub(crate) fn signed_volume6(v: &[[f64; 3]; 4]) -> f64 {
    let e1 = sub(v[1], v[0]);
    let e2 = sub(v[2], v[0]);
    let e3 = sub(v[3], v[0]);
    dot(e1, cross(e2, e3))
}

/// Barycentric coordinates of `p` in the tetrahedron `v`.
///
/// Returns `None` for a degenerate (zero-volume) tetrahedron.
pub fn barycentric(p: [f64; 3], v: &[[f64; 3]; 4]) -> Option<Barycentric> {
    let e1 = sub(v[1], v[0]);
    let e2 = sub(v[2], v[0]);
    let e3 = sub(v[3], v[0]);
    let det = dot(e1, cross(e2, e3));
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let r = sub(p, v[0]);
    // Cramer's rule on [e1 e2 e3] λ = r.
    let l1 = dot(r, cross(e2, e3)) / det;
    let l2 = dot(e1, cross(r, e3)) / det;
    let l3 = dot(e1, cross(e2, r)) / det;
    Some(Barycentric([1.0 - l1 - l2 - l3, l1, l2, l3]))
}
