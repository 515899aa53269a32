use crate::profile::CrossSectionPoint;

/// Elevation spans below this are treated as flat when locating a crossing.
const CROSSING_EPSILON: f64 = 1e-9;

/// Wetted geometry of a cross-section at one water level.
///
/// All zeros means nothing is wet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelGeometry {
    pub area: f64,
    pub top_width: f64,
    pub wetted_perimeter: f64,
}

impl ChannelGeometry {
    /// Hydraulic radius A/P, or 0 when either is non-positive.
    pub fn hydraulic_radius(&self) -> f64 {
        if self.area > 0.0 && self.wetted_perimeter > 0.0 {
            self.area / self.wetted_perimeter
        } else {
            0.0
        }
    }
}

/// Compute wetted area, top width and wetted perimeter for `water_level`.
///
/// Points are sorted by width (stable) on a local copy. Fewer than two points
/// give all-zero geometry.
pub fn compute_geometry(points: &[CrossSectionPoint], water_level: f64) -> ChannelGeometry {
    if points.len() < 2 {
        return ChannelGeometry::default();
    }

    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.width.total_cmp(&b.width));

    let h = water_level;
    let mut area = 0.0;
    let mut wetted_perimeter = 0.0;
    let mut wet_min = f64::INFINITY;
    let mut wet_max = f64::NEG_INFINITY;

    for seg in pts.windows(2) {
        let (p1, p2) = (seg[0], seg[1]);
        let (x1, z1) = (p1.width, p1.elevation);
        let (x2, z2) = (p2.width, p2.elevation);

        // depth of water over each end
        let y1 = h - z1;
        let y2 = h - z2;
        let wet1 = y1 > 0.0;
        let wet2 = y2 > 0.0;

        match (wet1, wet2) {
            (false, false) => continue,
            (true, true) => {
                let dx = x2 - x1;
                area += 0.5 * (y1 + y2) * dx.abs();
                wetted_perimeter += dx.hypot(z2 - z1);
                wet_min = wet_min.min(x1.min(x2));
                wet_max = wet_max.max(x1.max(x2));
            }
            _ => {
                // Water surface crosses the segment: walk from the wet end
                // toward the dry end until elevation == h.
                let (x_low, z_low, y_low, x_high, z_high) = if wet1 {
                    (x1, z1, y1, x2, z2)
                } else {
                    (x2, z2, y2, x1, z1)
                };

                let dz = z_high - z_low;
                if dz.abs() < CROSSING_EPSILON {
                    continue;
                }
                let f = (h - z_low) / dz;
                let x_cross = x_low + f * (x_high - x_low);

                let dx_sub = x_cross - x_low;
                wetted_perimeter += dx_sub.hypot(h - z_low);
                area += 0.5 * y_low * dx_sub.abs();

                wet_min = wet_min.min(x_low.min(x_cross));
                wet_max = wet_max.max(x_low.max(x_cross));
            }
        }
    }

    let top_width = if wet_min <= wet_max {
        wet_max - wet_min
    } else {
        0.0
    };

    ChannelGeometry {
        area,
        top_width,
        wetted_perimeter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CrossSectionProfile;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rectangular_channel_matches_closed_form() {
        let profile = CrossSectionProfile::rectangular(5.0, 2.0);
        for depth in [0.25, 0.5, 1.0, 1.5, 2.0] {
            let geom = compute_geometry(&profile.points, -2.0 + depth);
            assert_close(geom.area, 5.0 * depth);
            assert_close(geom.top_width, 5.0);
            assert_close(geom.wetted_perimeter, 5.0 + 2.0 * depth);
        }
    }

    #[test]
    fn trapezoid_partial_crossing() {
        // bottom 4 m, banks 1:1, depth 2
        let profile = CrossSectionProfile::trapezoidal(4.0, 2.0, 1.0, true);
        let geom = compute_geometry(&profile.points, -1.0);
        // depth 1: A = (b + z*y) * y = 5, T = b + 2*z*y = 6
        assert_close(geom.area, 5.0);
        assert_close(geom.top_width, 6.0);
        assert_close(geom.wetted_perimeter, 4.0 + 2.0 * 2f64.sqrt());
    }

    #[test]
    fn dry_and_degenerate_profiles_are_zero() {
        let profile = CrossSectionProfile::rectangular(5.0, 2.0);
        assert_eq!(compute_geometry(&profile.points, -3.0), ChannelGeometry::default());
        // exactly at the invert nothing is submerged
        assert_eq!(compute_geometry(&profile.points, -2.0), ChannelGeometry::default());

        let single = [CrossSectionPoint::new(0.0, -1.0)];
        assert_eq!(compute_geometry(&single, 10.0), ChannelGeometry::default());
        assert_eq!(compute_geometry(&[], 10.0), ChannelGeometry::default());
    }

    #[test]
    fn points_are_sorted_before_use() {
        let sorted = CrossSectionProfile::trapezoidal(4.0, 2.0, 1.0, true);
        let mut shuffled = sorted.points.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);
        assert_eq!(
            compute_geometry(&sorted.points, -0.5),
            compute_geometry(&shuffled, -0.5)
        );
    }

    #[test]
    fn fully_submerged_profile_wets_every_segment() {
        let profile = CrossSectionProfile::rectangular(5.0, 2.0);
        let geom = compute_geometry(&profile.points, 1.0);
        // walls (2 m each) + bottom, area only accumulates over horizontal span
        assert_close(geom.wetted_perimeter, 9.0);
        assert_close(geom.area, 15.0);
        assert_close(geom.top_width, 5.0);
    }

    #[test]
    fn geometry_grows_with_level_in_v_channel() {
        let points = vec![
            CrossSectionPoint::new(0.0, 3.0),
            CrossSectionPoint::new(2.0, 1.0),
            CrossSectionPoint::new(5.0, 0.0),
            CrossSectionPoint::new(6.0, 0.5),
            CrossSectionPoint::new(9.0, 2.5),
            CrossSectionPoint::new(12.0, 3.0),
        ];
        let mut prev = ChannelGeometry::default();
        for i in 0..=60 {
            let geom = compute_geometry(&points, i as f64 * 0.05);
            assert!(geom.area >= prev.area);
            assert!(geom.top_width >= prev.top_width);
            prev = geom;
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let profile = CrossSectionProfile::trapezoidal(3.0, 1.5, 2.0, true);
        let a = compute_geometry(&profile.points, -0.37);
        let b = compute_geometry(&profile.points, -0.37);
        assert_eq!(a.area.to_bits(), b.area.to_bits());
        assert_eq!(a.top_width.to_bits(), b.top_width.to_bits());
        assert_eq!(a.wetted_perimeter.to_bits(), b.wetted_perimeter.to_bits());
    }
}
