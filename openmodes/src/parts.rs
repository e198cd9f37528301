//! Parts placed in a simulation
//!
//! A part is a mesh together with a rigid transform. Several parts may
//! share one mesh, and therefore one basis and one set of cached singular
//! integrals.

use crate::basis::{basis_for, DivRwgBasis};
use crate::error::{OpenModesError, Result};
use crate::geometry::{add, matmul3, matvec3, norm, rotation_matrix, Vec3};
use crate::helpers::ObjectId;
use crate::mesh::TriangularSurfaceMesh;
use ndarray::Array2;
use std::sync::Arc;

/// Identity of a placed part
pub type PartId = ObjectId;

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// A mesh placed in space
#[derive(Debug, Clone)]
pub struct SinglePart {
    id: PartId,
    mesh: Arc<TriangularSurfaceMesh>,
    translation: Vec3,
    rotation: [[f64; 3]; 3],
}

impl SinglePart {
    /// Place a mesh at the origin
    pub fn new(mesh: Arc<TriangularSurfaceMesh>) -> Self {
        Self {
            id: ObjectId::new(),
            mesh,
            translation: [0.0; 3],
            rotation: IDENTITY,
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn mesh(&self) -> &TriangularSurfaceMesh {
        &self.mesh
    }

    /// RWG basis of the underlying mesh
    pub fn basis(&self) -> Arc<DivRwgBasis> {
        basis_for(&self.mesh)
    }

    /// Current translation
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Current rotation matrix
    pub fn rotation(&self) -> [[f64; 3]; 3] {
        self.rotation
    }

    /// Move the part by `offset`
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.translation = add(&self.translation, &offset);
        self
    }

    /// Rotate the part about an axis through the origin
    ///
    /// Any previous translation is rotated as well. The axis need not be
    /// normalised but must be finite and non-zero.
    pub fn rotate(&mut self, axis: Vec3, angle_degrees: f64) -> Result<&mut Self> {
        let len = norm(&axis);
        if !(len > 0.0 && len.is_finite()) {
            return Err(OpenModesError::InvalidParameters(
                "rotation axis must be non-zero".to_string(),
            ));
        }
        if !angle_degrees.is_finite() {
            return Err(OpenModesError::InvalidParameters(format!(
                "rotation angle must be finite, got {angle_degrees}"
            )));
        }
        let r = rotation_matrix(&axis, angle_degrees.to_radians());
        self.rotation = matmul3(&r, &self.rotation);
        self.translation = matvec3(&r, &self.translation);
        Ok(self)
    }

    /// Undo all transforms
    pub fn reset(&mut self) {
        self.translation = [0.0; 3];
        self.rotation = IDENTITY;
    }

    /// Node positions after applying the transform
    pub fn transformed_nodes(&self) -> Array2<f64> {
        let nodes = self.mesh.nodes();
        let mut out = Array2::zeros(nodes.raw_dim());
        for (i, row) in nodes.rows().into_iter().enumerate() {
            let p = matvec3(&self.rotation, &[row[0], row[1], row[2]]);
            for k in 0..3 {
                out[[i, k]] = p[k] + self.translation[k];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::rectangular_plate;
    use approx::assert_relative_eq;

    fn plate_part() -> SinglePart {
        SinglePart::new(Arc::new(rectangular_plate(2.0, 1.0, 2, 1).unwrap()))
    }

    #[test]
    fn test_translate_accumulates() {
        let mut part = plate_part();
        part.translate([1.0, 0.0, 0.0]).translate([0.0, 2.0, 0.0]);
        assert_eq!(part.translation(), [1.0, 2.0, 0.0]);

        let original = part.mesh().nodes().clone();
        let moved = part.transformed_nodes();
        for i in 0..original.nrows() {
            assert_relative_eq!(moved[[i, 0]], original[[i, 0]] + 1.0);
            assert_relative_eq!(moved[[i, 1]], original[[i, 1]] + 2.0);
        }
    }

    #[test]
    fn test_rotate_moves_translation() {
        let mut part = plate_part();
        part.translate([1.0, 0.0, 0.0]);
        part.rotate([0.0, 0.0, 1.0], 90.0).unwrap();
        let t = part.translation();
        assert_relative_eq!(t[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(t[1], 1.0, epsilon = 1e-12);

        part.reset();
        assert_eq!(part.translation(), [0.0; 3]);
        assert_eq!(&part.transformed_nodes(), part.mesh().nodes());
    }

    #[test]
    fn test_rotate_rejects_zero_axis() {
        let mut part = plate_part();
        part.translate([1.0, 2.0, 3.0]);
        assert!(matches!(
            part.rotate([0.0, 0.0, 0.0], 45.0),
            Err(OpenModesError::InvalidParameters(_))
        ));
        assert!(part.rotate([f64::NAN, 0.0, 1.0], 45.0).is_err());

        // a rejected rotation leaves the part untouched
        assert_eq!(part.rotation(), IDENTITY);
        assert_eq!(part.translation(), [1.0, 2.0, 3.0]);
        let nodes = part.transformed_nodes();
        let original = part.mesh().nodes();
        for i in 0..original.nrows() {
            assert_relative_eq!(nodes[[i, 2]], original[[i, 2]] + 3.0);
        }
    }

    #[test]
    fn test_rotate_unnormalised_axis() {
        let mut part = plate_part();
        part.translate([1.0, 0.0, 0.0]);
        part.rotate([0.0, 0.0, 5.0], 90.0).unwrap();
        let t = part.translation();
        assert_relative_eq!(t[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(t[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parts_share_basis() {
        let mesh = Arc::new(rectangular_plate(1.0, 1.0, 2, 2).unwrap());
        let a = SinglePart::new(Arc::clone(&mesh));
        let b = SinglePart::new(mesh);
        assert_ne!(a.id(), b.id());
        assert!(Arc::ptr_eq(&a.basis(), &b.basis()));
    }
}
