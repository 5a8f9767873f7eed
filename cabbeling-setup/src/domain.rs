//! Domain extents and cell-centered sampling.

use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::meter};

use crate::{
    error::{SetupError, positive},
    grid::{GridStretch, VerticalFaces},
    profile::{Point, TracerField},
};

/// Extents and resolution of a rectangular domain.
///
/// The horizontal axes are periodic and uniformly spaced on `[0, Lx)` and
/// `[0, Ly)`. The vertical axis spans `[-Lz, 0]` and may be stretched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSpec {
    pub lx: Length,
    pub ly: Length,
    pub lz: Length,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl Default for DomainSpec {
    fn default() -> Self {
        Self {
            lx: Length::new::<meter>(0.1),
            ly: Length::new::<meter>(0.1),
            lz: Length::new::<meter>(1.0),
            nx: 10,
            ny: 10,
            nz: 100,
        }
    }
}

impl DomainSpec {
    /// Validates that every extent is finite and positive and every axis has cells.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<(), SetupError> {
        positive("domain.lx", self.lx.get::<meter>())?;
        positive("domain.ly", self.ly.get::<meter>())?;
        positive("domain.lz", self.lz.get::<meter>())?;

        for (name, cells) in [("domain.nx", self.nx), ("domain.ny", self.ny), ("domain.nz", self.nz)] {
            if cells == 0 {
                return Err(SetupError::invalid(name, "at least one cell is required"));
            }
        }
        Ok(())
    }

    /// Builds the vertical face function for this domain.
    ///
    /// # Errors
    ///
    /// See [`VerticalFaces::new`].
    pub fn vertical_faces(&self, stretch: GridStretch) -> Result<VerticalFaces, SetupError> {
        VerticalFaces::new(self.lz, self.nz, stretch)
    }

    /// Returns the `nx` horizontal cell centers along x, in meters.
    #[must_use]
    pub fn x_centers(&self) -> Array1<f64> {
        centers(self.lx.get::<meter>(), self.nx)
    }

    /// Returns the `ny` horizontal cell centers along y, in meters.
    #[must_use]
    pub fn y_centers(&self) -> Array1<f64> {
        centers(self.ly.get::<meter>(), self.ny)
    }

    /// Returns the total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }
}

#[allow(clippy::cast_precision_loss)]
fn centers(length: f64, cells: usize) -> Array1<f64> {
    let spacing = length / cells as f64;
    Array1::from_shape_fn(cells, |i| (i as f64 + 0.5) * spacing)
}

/// Evaluates `field` at every cell center of the domain.
///
/// The result has shape `(nx, ny, nz)`, with `k = 0` the bottom cell.
///
/// # Errors
///
/// Returns [`SetupError::InvalidParameter`] if `faces` was built for a
/// different vertical resolution than `domain`, or any error from the field
/// itself.
pub fn sample_field<F>(
    field: &F,
    domain: &DomainSpec,
    faces: &VerticalFaces,
) -> Result<Array3<f64>, SetupError>
where
    F: TracerField + ?Sized,
{
    if faces.cells() != domain.nz {
        return Err(SetupError::invalid(
            "domain.nz",
            format!(
                "vertical grid has {} cells but the domain has {}",
                faces.cells(),
                domain.nz
            ),
        ));
    }

    let x = domain.x_centers();
    let y = domain.y_centers();
    let z = faces.centers();

    let mut values = Array3::zeros((domain.nx, domain.ny, domain.nz));
    for ((i, j, k), value) in values.indexed_iter_mut() {
        *value = field.call(&Point::new(x[i], y[j], z[k]))?;
    }

    Ok(values)
}
