use crate::config::RatingOptions;
use crate::geometry::{ChannelGeometry, compute_geometry};
use crate::profile::CrossSectionProfile;
use serde::Serialize;

/// Fraction of total depth above the invert where the rating starts.
const RATING_START_FRACTION: f64 = 0.05;

/// One (h, Q) sample of a rating curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingPoint {
    pub water_level: f64,
    pub discharge: f64,
}

/// Manning discharge `Q = (c0/n) * A * R^(2/3) * sqrt(S)`.
///
/// Returns 0 for a dry section (area or perimeter not positive).
pub fn manning_discharge(c0: f64, n: f64, geom: &ChannelGeometry, slope: f64) -> f64 {
    if geom.area <= 0.0 || geom.wetted_perimeter <= 0.0 {
        return 0.0;
    }
    let r = geom.area / geom.wetted_perimeter;
    (c0 / n) * geom.area * r.powf(2.0 / 3.0) * slope.sqrt()
}

/// Sample the section from just above the invert up to bankfull and apply
/// Manning's equation with the bed slope as friction slope.
///
/// Empty when the profile has fewer than two points, no usable Manning n,
/// or no elevation range.
pub fn generate_rating(profile: &CrossSectionProfile, options: &RatingOptions) -> Vec<RatingPoint> {
    if profile.points.len() < 2 || options.samples == 0 {
        return Vec::new();
    }
    let Some(n) = profile.usable_manning_n() else {
        log::debug!("No usable Manning n, skipping rating curve");
        return Vec::new();
    };
    let (Some(min_z), Some(max_z)) = (profile.min_elevation(), profile.max_elevation()) else {
        return Vec::new();
    };
    if max_z <= min_z {
        return Vec::new();
    }

    let h_min = min_z + RATING_START_FRACTION * (max_z - min_z);
    let h_max = max_z;
    let denom = options.samples.saturating_sub(1).max(1) as f64;

    (0..options.samples)
        .map(|i| {
            let t = i as f64 / denom;
            let water_level = h_min + t * (h_max - h_min);
            let geom = compute_geometry(&profile.points, water_level);
            RatingPoint {
                water_level,
                discharge: manning_discharge(1.0, n, &geom, options.bed_slope),
            }
        })
        .collect()
}

/// Default design selection: the highest (bankfull) sample.
pub fn default_design_point(rating: &[RatingPoint]) -> Option<RatingPoint> {
    rating.last().copied()
}

pub fn max_discharge_point(rating: &[RatingPoint]) -> Option<RatingPoint> {
    rating
        .iter()
        .copied()
        .max_by(|a, b| a.discharge.total_cmp(&b.discharge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CrossSectionPoint;

    #[test]
    fn manning_hand_calculation() {
        // W = 5, depth 1: A = 5, P = 7
        let profile = CrossSectionProfile::rectangular(5.0, 2.0);
        let geom = compute_geometry(&profile.points, -1.0);
        assert!((geom.area - 5.0).abs() < 1e-12);
        assert!((geom.wetted_perimeter - 7.0).abs() < 1e-12);
        assert!((geom.hydraulic_radius() - 0.714).abs() < 1e-3);

        let q = manning_discharge(1.0, 0.03, &geom, 0.001);
        // (1/0.03) * 5 * 0.7143^(2/3) * sqrt(0.001) = 4.21
        assert!((q - 4.21).abs() < 0.01, "q = {q}");
    }

    #[test]
    fn rating_spans_invert_to_bankfull() {
        let profile = CrossSectionProfile::rectangular(5.0, 2.0).with_manning_n(0.03);
        let rating = generate_rating(&profile, &RatingOptions::default());

        assert_eq!(rating.len(), 15);
        assert!((rating[0].water_level - (-1.9)).abs() < 1e-12);
        assert!((rating[14].water_level - 0.0).abs() < 1e-12);
        for pair in rating.windows(2) {
            assert!(pair[1].water_level > pair[0].water_level);
            assert!(pair[1].discharge >= pair[0].discharge);
        }
        assert!(rating.iter().all(|p| p.discharge >= 0.0));
    }

    #[test]
    fn sample_count_is_respected() {
        let profile = CrossSectionProfile::trapezoidal(3.0, 1.0, 2.0, true).with_manning_n(0.035);
        for samples in [1, 2, 7, 40] {
            let options = RatingOptions::new(samples, 0.0005).unwrap();
            let rating = generate_rating(&profile, &options);
            assert_eq!(rating.len(), samples);
        }
        let single = generate_rating(&profile, &RatingOptions::new(1, 0.001).unwrap());
        assert!((single[0].water_level - (-0.95)).abs() < 1e-12);
    }

    #[test]
    fn unusable_inputs_give_empty_rating() {
        let options = RatingOptions::default();
        let no_n = CrossSectionProfile::rectangular(5.0, 2.0);
        assert!(generate_rating(&no_n, &options).is_empty());
        assert!(generate_rating(&no_n.clone().with_manning_n(-0.01), &options).is_empty());

        let flat = CrossSectionProfile::new(vec![
            CrossSectionPoint::new(0.0, 1.0),
            CrossSectionPoint::new(4.0, 1.0),
        ])
        .with_manning_n(0.03);
        assert!(generate_rating(&flat, &options).is_empty());

        let one_point =
            CrossSectionProfile::new(vec![CrossSectionPoint::new(0.0, 1.0)]).with_manning_n(0.03);
        assert!(generate_rating(&one_point, &options).is_empty());
    }

    #[test]
    fn design_point_selection() {
        let profile = CrossSectionProfile::rectangular(5.0, 2.0).with_manning_n(0.03);
        let rating = generate_rating(&profile, &RatingOptions::default());
        let last = default_design_point(&rating).unwrap();
        assert_eq!(last, rating[14]);
        assert_eq!(max_discharge_point(&rating).unwrap(), last);
        assert_eq!(default_design_point(&[]), None);
    }
}
