//! Vertical grid generation.
//!
//! Faces run from the bottom (`z = -Lz`) to the surface (`z = 0`). With
//! stretching enabled, spacing is finest near the surface and compressed
//! toward the bottom:
//!
//! ```text
//! h(k) = (k − 1) / Nz
//! ζ₀(k) = 1 + (h(k) − 1) / refinement
//! Σ(k) = (1 − exp(−stretching·h(k))) / (1 − exp(−stretching))
//! z(k) = Lz · (ζ₀(k)·Σ(k) − 1)
//! ```

use cabbeling_core::Model;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::meter};

use crate::error::{SetupError, finite, non_zero, positive};

/// Controls how vertical faces are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridStretch {
    /// Uniform spacing when `false`.
    pub enabled: bool,
    /// Near-surface refinement; larger values give finer surface spacing.
    pub refinement: f64,
    /// Rate of bottom compression.
    pub stretching: f64,
}

impl Default for GridStretch {
    fn default() -> Self {
        Self {
            enabled: true,
            refinement: 1.2,
            stretching: 100.0,
        }
    }
}

impl GridStretch {
    /// Uniform spacing; the factors are ignored.
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Validates the stretching factors when stretching is enabled.
    ///
    /// # Errors
    ///
    /// - [`SetupError::InvalidParameter`] if `refinement` is zero or
    ///   non-finite, or `stretching` is non-finite.
    /// - [`SetupError::DegenerateStretching`] if `stretching` is within
    ///   machine epsilon of zero.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !self.enabled {
            return Ok(());
        }

        non_zero("grid.refinement", self.refinement)?;
        finite("grid.stretching", self.stretching)?;
        if self.stretching.abs() <= f64::EPSILON {
            return Err(SetupError::DegenerateStretching {
                stretching: self.stretching,
            });
        }

        Ok(())
    }
}

/// The vertical face coordinates of a domain of depth `Lz` with `Nz` cells.
///
/// Implements [`Model`] with a 1-based face index as input, matching the
/// `(k) -> z` signature simulation engines expect for grid construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalFaces {
    depth: f64,
    cells: usize,
    stretch: GridStretch,
}

impl VerticalFaces {
    /// Creates the face function for a domain `depth` deep with `cells` cells.
    ///
    /// # Errors
    ///
    /// - [`SetupError::InvalidParameter`] if `depth` is not finite and
    ///   positive or `cells` is zero.
    /// - Any error from [`GridStretch::validate`].
    /// - [`SetupError::NonMonotonicGrid`] if the stretching factors produce
    ///   faces that are not strictly increasing (for example a refinement
    ///   below one, which pushes interior faces under the bottom).
    pub fn new(depth: Length, cells: usize, stretch: GridStretch) -> Result<Self, SetupError> {
        let depth = positive("domain.lz", depth.get::<meter>())?;
        if cells == 0 {
            return Err(SetupError::invalid("domain.nz", "at least one cell is required"));
        }
        stretch.validate()?;

        let grid = Self {
            depth,
            cells,
            stretch,
        };
        let faces = grid.faces();
        if let Some(i) = faces.windows(2).position(|pair| !(pair[1] > pair[0])) {
            return Err(SetupError::NonMonotonicGrid {
                index: i + 2,
                z: faces[i + 1],
                below: faces[i],
            });
        }

        log::debug!(
            "generated {} vertical faces, finest spacing {:.3e} m at the surface",
            faces.len(),
            faces[cells] - faces[cells - 1],
        );
        Ok(grid)
    }

    #[must_use]
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Returns `z(k)` in meters for a 1-based face index, without range checks.
    #[allow(clippy::cast_precision_loss)]
    fn face_unchecked(&self, k: usize) -> f64 {
        let h = (k - 1) as f64 / self.cells as f64;

        if !self.stretch.enabled {
            return -self.depth + self.depth * h;
        }

        let GridStretch {
            refinement,
            stretching,
            ..
        } = self.stretch;

        let zeta_0 = 1.0 + (h - 1.0) / refinement;
        let sigma = (1.0 - (-stretching * h).exp()) / (1.0 - (-stretching).exp());

        self.depth * (zeta_0 * sigma - 1.0)
    }

    /// Returns all `Nz + 1` faces, bottom to surface, in meters.
    ///
    /// Strictly increasing, which [`VerticalFaces::new`] guarantees.
    #[must_use]
    pub fn faces(&self) -> Vec<f64> {
        (1..=self.cells + 1).map(|k| self.face_unchecked(k)).collect()
    }

    /// Returns the `Nz` cell centers, bottom to surface, in meters.
    #[must_use]
    pub fn centers(&self) -> Vec<f64> {
        self.faces()
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect()
    }
}

impl Model for VerticalFaces {
    type Input = usize;
    type Output = f64;
    type Error = SetupError;

    /// Returns the coordinate of face `k`, with `1 ≤ k ≤ Nz + 1`.
    fn call(&self, k: &usize) -> Result<f64, SetupError> {
        if *k == 0 || *k > self.cells + 1 {
            return Err(SetupError::invalid(
                "k",
                format!("face index must be in 1..={}, got {k}", self.cells + 1),
            ));
        }
        Ok(self.face_unchecked(*k))
    }
}

/// Generates the `nz + 1` vertical faces spanning `[-lz, 0]`, in meters.
///
/// # Errors
///
/// See [`VerticalFaces::new`].
///
/// # Example
///
/// ```
/// use cabbeling_setup::grid::{GridStretch, generate_grid};
///
/// let faces = generate_grid(1.0, 4, &GridStretch::uniform()).unwrap();
/// assert_eq!(faces, [-1.0, -0.75, -0.5, -0.25, 0.0]);
/// ```
pub fn generate_grid(lz: f64, nz: usize, stretch: &GridStretch) -> Result<Vec<f64>, SetupError> {
    Ok(VerticalFaces::new(Length::new::<meter>(lz), nz, *stretch)?.faces())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn stretched(refinement: f64, stretching: f64) -> GridStretch {
        GridStretch {
            enabled: true,
            refinement,
            stretching,
        }
    }

    fn assert_spans_domain(faces: &[f64], lz: f64, nz: usize) {
        assert_eq!(faces.len(), nz + 1);
        assert_relative_eq!(faces[0], -lz, max_relative = 1e-9);
        assert!(faces[nz].abs() <= 1e-9 * lz);
        assert!(faces.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn reference_example() -> Result<(), SetupError> {
        let faces = generate_grid(1.0, 4, &stretched(1.2, 100.0))?;

        assert_spans_domain(&faces, 1.0, 4);
        // Σ saturates to one past the first face, leaving ζ₀ − 1.
        assert_relative_eq!(faces[1], -0.625, epsilon = 1e-9);
        assert_relative_eq!(faces[2], -1.0 + (1.0 - 0.5 / 1.2), epsilon = 1e-9);
        assert_relative_eq!(faces[3], -1.0 + (1.0 - 0.25 / 1.2), epsilon = 1e-9);

        Ok(())
    }

    #[test]
    fn stretched_grids_span_the_domain() -> Result<(), SetupError> {
        for (lz, nz) in [(1.0, 1), (1.0, 100), (0.3, 17), (250.0, 64)] {
            for stretch in [stretched(1.2, 100.0), stretched(2.0, 5.0), stretched(1.0, -3.0)] {
                let faces = generate_grid(lz, nz, &stretch)?;
                assert_spans_domain(&faces, lz, nz);
            }
        }
        Ok(())
    }

    #[test]
    fn surface_is_finer_than_bottom() -> Result<(), SetupError> {
        let faces = generate_grid(1.0, 50, &GridStretch::default())?;
        let bottom = faces[1] - faces[0];
        let surface = faces[50] - faces[49];
        assert!(surface < bottom);
        Ok(())
    }

    #[test]
    fn uniform_spacing_is_constant() -> Result<(), SetupError> {
        let faces = generate_grid(2.0, 8, &GridStretch::uniform())?;
        assert_spans_domain(&faces, 2.0, 8);
        for pair in faces.windows(2) {
            assert_relative_eq!(pair[1] - pair[0], 0.25, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn uniform_ignores_degenerate_factors() {
        let stretch = GridStretch {
            enabled: false,
            refinement: 0.0,
            stretching: 0.0,
        };
        assert!(generate_grid(1.0, 4, &stretch).is_ok());
    }

    #[test]
    fn degenerate_stretching_is_rejected() {
        for stretching in [0.0, f64::EPSILON, -f64::EPSILON / 2.0] {
            assert_eq!(
                generate_grid(1.0, 4, &stretched(1.2, stretching)),
                Err(SetupError::DegenerateStretching { stretching })
            );
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            generate_grid(0.0, 4, &GridStretch::default()),
            Err(SetupError::InvalidParameter { name: "domain.lz", .. })
        ));
        assert!(matches!(
            generate_grid(f64::NAN, 4, &GridStretch::default()),
            Err(SetupError::InvalidParameter { name: "domain.lz", .. })
        ));
        assert!(matches!(
            generate_grid(1.0, 0, &GridStretch::default()),
            Err(SetupError::InvalidParameter { name: "domain.nz", .. })
        ));
        assert!(matches!(
            generate_grid(1.0, 4, &stretched(0.0, 100.0)),
            Err(SetupError::InvalidParameter {
                name: "grid.refinement",
                ..
            })
        ));
    }

    #[test]
    fn weak_refinement_is_non_monotonic() {
        // ζ₀ < 0 near the bottom pushes the second face below -Lz.
        let err = generate_grid(1.0, 10, &stretched(0.5, 100.0)).unwrap_err();
        assert!(matches!(err, SetupError::NonMonotonicGrid { index: 2, .. }));
    }

    #[test]
    fn non_monotonic_faces_are_never_constructed() {
        let err = VerticalFaces::new(Length::new::<meter>(1.0), 10, stretched(0.5, 100.0))
            .unwrap_err();
        assert!(matches!(err, SetupError::NonMonotonicGrid { index: 2, .. }));
    }

    #[test]
    fn face_function_matches_sequence() -> Result<(), SetupError> {
        let grid = VerticalFaces::new(Length::new::<meter>(1.0), 6, GridStretch::default())?;
        let faces = grid.faces();

        for (i, z) in faces.iter().enumerate() {
            assert_eq!(grid.call(&(i + 1))?, *z);
        }
        assert!(grid.call(&0).is_err());
        assert!(grid.call(&8).is_err());

        let centers = grid.centers();
        assert_eq!(centers.len(), 6);
        assert!(centers.iter().zip(faces.windows(2)).all(|(c, f)| f[0] < *c && *c < f[1]));

        Ok(())
    }
}
