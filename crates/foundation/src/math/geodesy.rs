/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// Mean Earth radius (meters), used by the spherical fallback.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// Great-circle distance on a sphere of radius [`MEAN_EARTH_RADIUS_M`].
///
/// Inputs are in degrees, output in meters.
pub fn haversine_distance(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (lon2_deg - lon1_deg).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Ellipsoidal distance on WGS84 (Vincenty's inverse formula).
///
/// Returns `None` when the iteration does not converge, which happens for
/// nearly antipodal points.
pub fn vincenty_distance(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> Option<f64> {
    let l = (lon2_deg - lon1_deg).to_radians();
    let u1 = ((1.0 - WGS84_F) * lat1_deg.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * lat2_deg.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos2_alpha == 0.
        let cos_2sigma_m = if cos2_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos2_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos2_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - previous).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos2_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
            let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
            return Some(WGS84_B * a * (sigma - delta_sigma));
        }
    }
    None
}

/// Distance in meters, preferring the ellipsoidal result.
pub fn geodesic_distance(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    vincenty_distance(lat1_deg, lon1_deg, lat2_deg, lon2_deg)
        .unwrap_or_else(|| haversine_distance(lat1_deg, lon1_deg, lat2_deg, lon2_deg))
}

#[cfg(test)]
mod tests {
    use super::{geodesic_distance, haversine_distance, vincenty_distance};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn one_degree_along_equator() {
        assert_close(vincenty_distance(0.0, 0.0, 0.0, 1.0).unwrap(), 111_319.49, 0.01);
        assert_close(haversine_distance(0.0, 0.0, 0.0, 1.0), 111_195.08, 0.01);
    }

    #[test]
    fn coincident_points_are_zero() {
        assert_eq!(vincenty_distance(53.5, 10.0, 53.5, 10.0), Some(0.0));
        assert_close(haversine_distance(53.5, 10.0, 53.5, 10.0), 0.0, 1e-9);
    }

    #[test]
    fn hamburg_to_berlin() {
        // Roughly 255 km between the city centres.
        let d = geodesic_distance(53.5511, 9.9937, 52.5200, 13.4050);
        assert!((250_000.0..260_000.0).contains(&d), "unexpected distance {d}");
    }

    #[test]
    fn antipodal_points_fall_back_to_sphere() {
        let d = geodesic_distance(0.0, 0.0, 0.5, 179.7);
        assert!(d.is_finite());
        assert!(d > 19_000_000.0, "unexpected distance {d}");
    }
}
