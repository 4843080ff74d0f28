//! Angular resolution of the detector.
//!
//! Published angular-resolution tables give a median reconstruction error
//! per true-energy bin. This module parses such tables, interpolates the
//! median resolution in log-energy, and smears true directions with a von
//! Mises-Fisher kernel whose concentration is calibrated to the looked-up
//! resolution. A fixed-width Gaussian variant is provided for runs without
//! a table.

use std::fs;
use std::path::Path;

use rand::RngCore;
use rand_distr::{Distribution, Normal};
use skymath::{sample_vmf, Equatorial};
use thiserror::Error;
use tracing::debug;

/// Calibration constant mapping a median resolution in degrees to a vMF
/// concentration: kappa = VMF_CALIBRATION / res_deg^2.
const VMF_CALIBRATION: f64 = 7552.0;

/// Errors raised by angular-resolution construction and sampling.
#[derive(Debug, Error)]
pub enum AngularResolutionError {
    /// Bin edges must outnumber resolution values by exactly one.
    #[error("bin edge/value count mismatch: {edges} edges, {values} values")]
    EdgeValueMismatch {
        /// Number of energy bin edges supplied.
        edges: usize,
        /// Number of resolution values supplied.
        values: usize,
    },

    /// Energy bin edges must be strictly ascending.
    #[error("energy bin edges are not strictly ascending")]
    EdgesNotAscending,

    /// All median resolution values must be strictly positive.
    #[error("non-positive median resolution value: {0} deg")]
    NonPositiveResolution(f64),

    /// A resolution of zero or less cannot parameterize a dispersion kernel.
    #[error("angular resolution {0} deg cannot parameterize a dispersion kernel")]
    DegenerateResolution(f64),

    /// A table row could not be parsed.
    #[error("malformed table row {line}: {reason}")]
    MalformedRow {
        /// One-based line number in the table file.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// The table file could not be read.
    #[error("failed to read angular resolution table")]
    Io(#[from] std::io::Error),
}

/// Known on-disk layouts of published angular-resolution tables.
///
/// The format is selected explicitly by the caller; nothing is guessed from
/// the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Point-source release layout: one whitespace-separated row per energy
    /// bin with columns `E_min [GeV]`, `E_max [GeV]`, `median resolution
    /// [deg]`, and `#` starting comment lines.
    R2018,
}

/// Median angular resolution per true-energy bin.
///
/// Holds ascending bin edges in GeV and one median resolution in degrees per
/// bin. Lookups interpolate linearly in log-energy between bin centers;
/// energies outside the tabulated range take the boundary bin-center value.
#[derive(Debug, Clone)]
pub struct AngularResolutionTable {
    energy_bin_edges: Vec<f64>,
    median_resolution_deg: Vec<f64>,
    log_bin_centers: Vec<f64>,
}

impl AngularResolutionTable {
    /// Build a table from bin edges (GeV) and per-bin median resolutions
    /// (degrees).
    pub fn new(
        energy_bin_edges: Vec<f64>,
        median_resolution_deg: Vec<f64>,
    ) -> Result<Self, AngularResolutionError> {
        if median_resolution_deg.is_empty()
            || energy_bin_edges.len() != median_resolution_deg.len() + 1
        {
            return Err(AngularResolutionError::EdgeValueMismatch {
                edges: energy_bin_edges.len(),
                values: median_resolution_deg.len(),
            });
        }

        for pair in energy_bin_edges.windows(2) {
            if pair[1] <= pair[0] {
                return Err(AngularResolutionError::EdgesNotAscending);
            }
        }

        for &value in &median_resolution_deg {
            if !(value > 0.0) {
                return Err(AngularResolutionError::NonPositiveResolution(value));
            }
        }

        let log_bin_centers = energy_bin_edges
            .windows(2)
            .map(|pair| ((pair[0] + pair[1]) / 2.0).ln())
            .collect();

        Ok(Self {
            energy_bin_edges,
            median_resolution_deg,
            log_bin_centers,
        })
    }

    /// Load a table from a file in the given format.
    pub fn from_file(
        path: &Path,
        format: TableFormat,
    ) -> Result<Self, AngularResolutionError> {
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "parsing angular resolution table");

        match format {
            TableFormat::R2018 => Self::parse_r2018(&text),
        }
    }

    /// Parse the R2018 whitespace-separated layout.
    fn parse_r2018(text: &str) -> Result<Self, AngularResolutionError> {
        let mut edges: Vec<f64> = Vec::new();
        let mut values: Vec<f64> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(AngularResolutionError::MalformedRow {
                    line: line_no,
                    reason: format!("expected 3 columns, found {}", fields.len()),
                });
            }

            let parse = |s: &str| -> Result<f64, AngularResolutionError> {
                s.parse::<f64>()
                    .map_err(|_| AngularResolutionError::MalformedRow {
                        line: line_no,
                        reason: format!("not a number: {s:?}"),
                    })
            };

            let e_min = parse(fields[0])?;
            let e_max = parse(fields[1])?;
            let resolution = parse(fields[2])?;

            match edges.last() {
                None => {
                    edges.push(e_min);
                }
                Some(&last) => {
                    // Bins must tile the energy axis without gaps
                    if (e_min - last).abs() > 1e-9 * last.abs().max(1.0) {
                        return Err(AngularResolutionError::MalformedRow {
                            line: line_no,
                            reason: format!(
                                "bin [{e_min}, {e_max}] does not continue from {last}"
                            ),
                        });
                    }
                }
            }

            edges.push(e_max);
            values.push(resolution);
        }

        Self::new(edges, values)
    }

    /// Median angular resolution in degrees at the given true energy.
    pub fn resolution(&self, true_energy: f64) -> f64 {
        let n = self.median_resolution_deg.len();
        let first = self.median_resolution_deg[0];
        let last = self.median_resolution_deg[n - 1];

        // Nonpositive energies have no log; fall back to the lowest bin
        if !(true_energy > 0.0) {
            return first;
        }

        let log_e = true_energy.ln();
        if log_e <= self.log_bin_centers[0] {
            return first;
        }
        if log_e >= self.log_bin_centers[n - 1] {
            return last;
        }

        for i in 0..self.log_bin_centers.len() - 1 {
            let x0 = self.log_bin_centers[i];
            let x1 = self.log_bin_centers[i + 1];
            if log_e >= x0 && log_e <= x1 {
                let t = (log_e - x0) / (x1 - x0);
                return self.median_resolution_deg[i] * (1.0 - t)
                    + self.median_resolution_deg[i + 1] * t;
            }
        }

        // Interior energies always land in a segment above
        last
    }

    /// Bin edges in GeV.
    pub fn energy_bin_edges(&self) -> &[f64] {
        &self.energy_bin_edges
    }

    /// Per-bin median resolution values in degrees.
    pub fn values(&self) -> &[f64] {
        &self.median_resolution_deg
    }
}

/// Reconstruction smearing of a true direction.
pub trait AngularSmearing {
    /// Draw one reconstructed direction for an event with the given true
    /// energy and direction.
    fn smear(
        &self,
        true_energy: f64,
        true_dir: Equatorial,
        rng: &mut dyn RngCore,
    ) -> Result<Equatorial, AngularResolutionError>;
}

impl<T: AngularSmearing + ?Sized> AngularSmearing for Box<T> {
    fn smear(
        &self,
        true_energy: f64,
        true_dir: Equatorial,
        rng: &mut dyn RngCore,
    ) -> Result<Equatorial, AngularResolutionError> {
        (**self).smear(true_energy, true_dir, rng)
    }
}

/// Energy-dependent angular smearing backed by a resolution table.
///
/// The looked-up median resolution parameterizes a von Mises-Fisher kernel
/// centered on the true direction; one draw from that kernel is the
/// reconstructed direction.
#[derive(Debug, Clone)]
pub struct AngularResolution {
    table: AngularResolutionTable,
}

impl AngularResolution {
    pub fn new(table: AngularResolutionTable) -> Self {
        Self { table }
    }

    /// Load the backing table from a file in the given format.
    pub fn from_file(path: &Path, format: TableFormat) -> Result<Self, AngularResolutionError> {
        Ok(Self::new(AngularResolutionTable::from_file(path, format)?))
    }

    /// The backing resolution table.
    pub fn table(&self) -> &AngularResolutionTable {
        &self.table
    }
}

impl AngularSmearing for AngularResolution {
    fn smear(
        &self,
        true_energy: f64,
        true_dir: Equatorial,
        rng: &mut dyn RngCore,
    ) -> Result<Equatorial, AngularResolutionError> {
        let res_deg = self.table.resolution(true_energy);
        if !(res_deg > 0.0) {
            return Err(AngularResolutionError::DegenerateResolution(res_deg));
        }

        let kappa = VMF_CALIBRATION / (res_deg * res_deg);
        let sampled = sample_vmf(&true_dir.to_unit_vector(), kappa, rng);

        Ok(Equatorial::from_unit_vector(&sampled))
    }
}

/// Fixed-width angular smearing.
///
/// Smears right ascension and declination with independent Gaussians of the
/// given width. The kernel is not wrapped at the poles.
#[derive(Debug, Clone, Copy)]
pub struct FixedAngularResolution {
    sigma_deg: f64,
    dist: Normal<f64>,
}

impl FixedAngularResolution {
    /// Create a fixed smearing model with the given width in degrees.
    pub fn new(sigma_deg: f64) -> Result<Self, AngularResolutionError> {
        if !(sigma_deg > 0.0 && sigma_deg.is_finite()) {
            return Err(AngularResolutionError::DegenerateResolution(sigma_deg));
        }

        let dist = Normal::new(0.0, sigma_deg.to_radians())
            .map_err(|_| AngularResolutionError::DegenerateResolution(sigma_deg))?;

        Ok(Self { sigma_deg, dist })
    }

    /// Smearing width in degrees.
    pub fn sigma_deg(&self) -> f64 {
        self.sigma_deg
    }
}

impl AngularSmearing for FixedAngularResolution {
    fn smear(
        &self,
        _true_energy: f64,
        true_dir: Equatorial,
        rng: &mut dyn RngCore,
    ) -> Result<Equatorial, AngularResolutionError> {
        let reco_ra = true_dir.ra + self.dist.sample(rng);
        let reco_dec = true_dir.dec + self.dist.sample(rng);

        Ok(Equatorial::from_radians(reco_ra, reco_dec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use skymath::median;
    use std::io::Write;

    fn two_bin_table() -> AngularResolutionTable {
        AngularResolutionTable::new(vec![1e2, 1e4, 1e6], vec![2.0, 0.5]).unwrap()
    }

    #[test]
    fn test_table_validation_count_mismatch() {
        let result = AngularResolutionTable::new(vec![1.0, 2.0, 3.0], vec![0.5]);
        assert!(matches!(
            result,
            Err(AngularResolutionError::EdgeValueMismatch { edges: 3, values: 1 })
        ));
    }

    #[test]
    fn test_table_validation_non_ascending() {
        let result = AngularResolutionTable::new(vec![1.0, 3.0, 2.0], vec![0.5, 0.5]);
        assert!(matches!(
            result,
            Err(AngularResolutionError::EdgesNotAscending)
        ));
    }

    #[test]
    fn test_table_validation_non_positive_value() {
        let result = AngularResolutionTable::new(vec![1.0, 2.0, 3.0], vec![0.5, 0.0]);
        assert!(matches!(
            result,
            Err(AngularResolutionError::NonPositiveResolution(_))
        ));
    }

    #[test]
    fn test_resolution_at_bin_centers() {
        let table = two_bin_table();

        // Bin centers are the arithmetic means of the edges
        assert_relative_eq!(table.resolution((1e2 + 1e4) / 2.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(table.resolution((1e4 + 1e6) / 2.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_resolution_interpolates_in_log_energy() {
        let table = two_bin_table();

        let c0: f64 = (1e2 + 1e4) / 2.0;
        let c1: f64 = (1e4 + 1e6) / 2.0;
        let mid = (c0.ln() + c1.ln()) / 2.0;

        let expected = (2.0 + 0.5) / 2.0;
        assert_relative_eq!(table.resolution(mid.exp()), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_resolution_clamps_outside_range() {
        let table = two_bin_table();

        assert_eq!(table.resolution(1.0), 2.0);
        assert_eq!(table.resolution(1e12), 0.5);
        // Nonpositive energies fall back to the lowest bin
        assert_eq!(table.resolution(0.0), 2.0);
        assert_eq!(table.resolution(-5.0), 2.0);
    }

    #[test]
    fn test_single_bin_table() {
        let table = AngularResolutionTable::new(vec![1e2, 1e4], vec![1.3]).unwrap();
        assert_eq!(table.resolution(1.0), 1.3);
        assert_eq!(table.resolution(1e3), 1.3);
        assert_eq!(table.resolution(1e9), 1.3);
    }

    #[test]
    fn test_parse_r2018() {
        let text = "\
# E_min [GeV]  E_max [GeV]  Med. Resolution [deg]
1.0e2   1.0e3   1.8
1.0e3   1.0e4   1.1

1.0e4   1.0e5   0.6
";
        let table = AngularResolutionTable::parse_r2018(text).unwrap();
        assert_eq!(table.energy_bin_edges(), &[1e2, 1e3, 1e4, 1e5]);
        assert_eq!(table.values(), &[1.8, 1.1, 0.6]);
    }

    #[test]
    fn test_parse_r2018_rejects_short_row() {
        let text = "1.0e2 1.0e3\n";
        assert!(matches!(
            AngularResolutionTable::parse_r2018(text),
            Err(AngularResolutionError::MalformedRow { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_r2018_rejects_non_numeric() {
        let text = "1.0e2 1.0e3 abc\n";
        assert!(matches!(
            AngularResolutionTable::parse_r2018(text),
            Err(AngularResolutionError::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_parse_r2018_rejects_gap_between_bins() {
        let text = "1.0e2 1.0e3 1.8\n2.0e3 1.0e4 1.1\n";
        assert!(matches!(
            AngularResolutionTable::parse_r2018(text),
            Err(AngularResolutionError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AngRes.txt");

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# test table").unwrap();
        writeln!(file, "1.0e2 1.0e4 2.0").unwrap();
        writeln!(file, "1.0e4 1.0e6 0.5").unwrap();
        drop(file);

        let table = AngularResolutionTable::from_file(&path, TableFormat::R2018).unwrap();
        assert_eq!(table.values(), &[2.0, 0.5]);
    }

    #[test]
    fn test_from_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.txt");

        assert!(matches!(
            AngularResolutionTable::from_file(&path, TableFormat::R2018),
            Err(AngularResolutionError::Io(_))
        ));
    }

    fn smear_offsets(
        smearing: &dyn AngularSmearing,
        energy: f64,
        n: usize,
        seed: u64,
    ) -> Vec<f64> {
        let true_dir = Equatorial::from_degrees(83.6, 22.0);
        let mut rng = StdRng::seed_from_u64(seed);

        (0..n)
            .map(|_| {
                let reco = smearing.smear(energy, true_dir, &mut rng).unwrap();
                true_dir.separation(&reco).to_degrees()
            })
            .collect()
    }

    #[test]
    fn test_smear_moves_direction() {
        let smearing = AngularResolution::new(two_bin_table());
        let offsets = smear_offsets(&smearing, 1e3, 100, 41);

        for offset in offsets {
            assert!(offset > 0.0);
        }
    }

    #[test]
    fn test_smear_dispersion_tracks_table() {
        let smearing = AngularResolution::new(two_bin_table());

        // 1e2 clamps to the 2.0 deg bin center, 1e6 to the 0.5 deg one;
        // dispersion must follow
        let low = median(&smear_offsets(&smearing, 1e2, 5000, 13)).unwrap();
        let high = median(&smear_offsets(&smearing, 1e6, 5000, 13)).unwrap();

        assert!(
            high < low,
            "high-energy median {high} should be below low-energy median {low}"
        );
        assert_relative_eq!(low / high, 4.0, max_relative = 0.15);
    }

    #[test]
    fn test_fixed_resolution_validation() {
        assert!(FixedAngularResolution::new(1.0).is_ok());
        assert!(matches!(
            FixedAngularResolution::new(0.0),
            Err(AngularResolutionError::DegenerateResolution(_))
        ));
        assert!(FixedAngularResolution::new(-1.0).is_err());
    }

    #[test]
    fn test_fixed_resolution_dispersion_scales_with_sigma() {
        let narrow = FixedAngularResolution::new(0.2).unwrap();
        let wide = FixedAngularResolution::new(2.0).unwrap();

        let narrow_median = median(&smear_offsets(&narrow, 1e3, 5000, 29)).unwrap();
        let wide_median = median(&smear_offsets(&wide, 1e3, 5000, 29)).unwrap();

        assert!(narrow_median < wide_median);
    }

    #[test]
    fn test_boxed_smearing_delegates() {
        let boxed: Box<dyn AngularSmearing> =
            Box::new(AngularResolution::new(two_bin_table()));
        let mut rng = StdRng::seed_from_u64(55);

        let true_dir = Equatorial::from_degrees(10.0, -45.0);
        let reco = boxed.smear(1e3, true_dir, &mut rng).unwrap();
        assert!(true_dir.separation(&reco) > 0.0);
    }
}
