//! Small fixed-size vector helpers
//!
//! The integration kernels work on `[f64; 3]` points; meshes store their
//! nodes in `ndarray` arrays and convert at the boundary.

use ndarray::Array2;

/// A point or vector in 3D space
pub type Vec3 = [f64; 3];

/// Componentwise `a + b`
#[inline]
pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Componentwise `a - b`
#[inline]
pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// `k a`
#[inline]
pub fn scale(a: &Vec3, k: f64) -> Vec3 {
    [a[0] * k, a[1] * k, a[2] * k]
}

/// Dot product of two 3D vectors
#[inline]
pub fn dot_product(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product of two 3D vectors
#[inline]
pub fn cross_product(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length
#[inline]
pub fn norm(a: &Vec3) -> f64 {
    dot_product(a, a).sqrt()
}

/// Distance between two points
#[inline]
pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    norm(&sub(a, b))
}

/// Normalize a 3D vector, returning the unit vector and the original length
pub fn normalize(v: &Vec3) -> (Vec3, f64) {
    let len = norm(v);
    if len > 1e-300 {
        (scale(v, 1.0 / len), len)
    } else {
        ([0.0; 3], 0.0)
    }
}

/// Row `i` of an `N × 3` node array
#[inline]
pub fn row3(nodes: &Array2<f64>, i: usize) -> Vec3 {
    [nodes[[i, 0]], nodes[[i, 1]], nodes[[i, 2]]]
}

/// The three vertices of a triangle
#[inline]
pub fn triangle_vertices(nodes: &Array2<f64>, polygon: &[usize; 3]) -> [Vec3; 3] {
    [
        row3(nodes, polygon[0]),
        row3(nodes, polygon[1]),
        row3(nodes, polygon[2]),
    ]
}

/// Map barycentric coordinates onto a triangle
#[inline]
pub fn barycentric_point(vertices: &[Vec3; 3], bary: &[f64; 3]) -> Vec3 {
    let mut out = [0.0; 3];
    for (v, &w) in vertices.iter().zip(bary.iter()) {
        for k in 0..3 {
            out[k] += w * v[k];
        }
    }
    out
}

/// Area of a triangle
#[inline]
pub fn triangle_area(vertices: &[Vec3; 3]) -> f64 {
    let e1 = sub(&vertices[1], &vertices[0]);
    let e2 = sub(&vertices[2], &vertices[0]);
    0.5 * norm(&cross_product(&e1, &e2))
}

/// Rotation matrix about a unit axis (Rodrigues' formula)
pub fn rotation_matrix(axis: &Vec3, angle_rad: f64) -> [[f64; 3]; 3] {
    let (k, _) = normalize(axis);
    let (sin, cos) = angle_rad.sin_cos();
    let one_c = 1.0 - cos;
    [
        [
            cos + k[0] * k[0] * one_c,
            k[0] * k[1] * one_c - k[2] * sin,
            k[0] * k[2] * one_c + k[1] * sin,
        ],
        [
            k[1] * k[0] * one_c + k[2] * sin,
            cos + k[1] * k[1] * one_c,
            k[1] * k[2] * one_c - k[0] * sin,
        ],
        [
            k[2] * k[0] * one_c - k[1] * sin,
            k[2] * k[1] * one_c + k[0] * sin,
            cos + k[2] * k[2] * one_c,
        ],
    ]
}

/// Matrix product `a b` of two 3×3 matrices
pub fn matmul3(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Matrix-vector product `m v`
#[inline]
pub fn matvec3(m: &[[f64; 3]; 3], v: &Vec3) -> Vec3 {
    [
        dot_product(&m[0], v),
        dot_product(&m[1], v),
        dot_product(&m[2], v),
    ]
}
