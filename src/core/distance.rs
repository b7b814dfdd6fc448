use geo::Intersects;

use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average courier speed used for every travel-time estimate
pub const AVERAGE_SPEED_KMH: f64 = 20.0;

/// Round to two decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calculate the Haversine distance between two coordinates in kilometers,
/// rounded to two decimal places
///
/// The result is symmetric in its arguments and zero for identical points.
#[inline]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Floating error can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round2(EARTH_RADIUS_KM * c)
}

/// Check whether `target` lies within `radius_km` of `center` (boundary inclusive)
#[inline]
pub fn is_within_radius(center: Coordinate, target: Coordinate, radius_km: f64) -> bool {
    haversine_distance(center, target) <= radius_km
}

/// Travel time in whole minutes at [`AVERAGE_SPEED_KMH`]
#[inline]
pub fn eta_minutes(distance_km: f64) -> u32 {
    (distance_km / AVERAGE_SPEED_KMH * 60.0).round().max(0.0) as u32
}

/// Find the item closest to `center`
///
/// Items for which `coordinate_of` returns `None` are skipped.
pub fn closest<'a, T, F>(center: Coordinate, items: &'a [T], coordinate_of: F) -> Option<(&'a T, f64)>
where
    F: Fn(&T) -> Option<Coordinate>,
{
    items
        .iter()
        .filter_map(|item| {
            coordinate_of(item).map(|coord| (item, haversine_distance(center, coord)))
        })
        .fold(None, |best: Option<(&T, f64)>, candidate| match best {
            Some(b) if b.1 <= candidate.1 => Some(b),
            _ => Some(candidate),
        })
}

/// Human-readable distance: meters below 1 km, otherwise kilometers with two decimals
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{} m", (distance_km * 1000.0).round() as i64)
    } else {
        format!("{:.2} km", distance_km)
    }
}

/// Check if a coordinate is within a bounding box (edges inclusive)
#[inline]
pub fn is_within_bounding_box(coord: Coordinate, bbox: &BoundingBox) -> bool {
    bbox.to_rect()
        .intersects(&geo::coord! { x: coord.longitude, y: coord.latitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_haversine_distance() {
        let gota = coord(23.1167, 72.5667);
        let navrangpura = coord(23.0365, 72.5611);

        assert_eq!(haversine_distance(gota, navrangpura), 8.94);
    }

    #[test]
    fn test_one_degree_at_equator() {
        let distance = haversine_distance(coord(0.0, 0.0), coord(0.0, 1.0));
        assert_eq!(distance, 111.19);
    }

    #[test]
    fn test_rounded_to_two_decimals() {
        let distance = haversine_distance(coord(23.0225, 72.5714), coord(23.0300, 72.5800));
        assert_eq!(distance, round2(distance));
    }

    #[test]
    fn test_symmetry_and_identity() {
        let gota = coord(23.1167, 72.5667);
        let satellite = coord(23.0300, 72.5170);

        assert_eq!(haversine_distance(gota, satellite), haversine_distance(satellite, gota));
        assert_eq!(haversine_distance(gota, gota), 0.0);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let distance = haversine_distance(coord(0.0, 0.0), coord(0.0, 180.0));
        assert!(distance.is_finite());
        assert!((distance - 20015.09).abs() < 0.1);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let center = coord(23.1167, 72.5667);
        let target = coord(23.1167, 72.6156);
        let exact = haversine_distance(center, target);

        assert!(is_within_radius(center, target, exact));
        assert!(!is_within_radius(center, target, exact - 0.01));
    }

    #[test]
    fn test_eta_minutes() {
        assert_eq!(eta_minutes(2.0), 6);
        assert_eq!(eta_minutes(3.0), 9);
        assert_eq!(eta_minutes(0.0), 0);
        assert_eq!(eta_minutes(1.25), 4);
    }

    #[test]
    fn test_closest_skips_missing() {
        let center = coord(23.0, 72.0);
        let items = vec![None, Some(coord(23.2, 72.0)), Some(coord(23.01, 72.0))];

        let (item, distance) = closest(center, &items, |c| *c).unwrap();
        assert_eq!(*item, Some(coord(23.01, 72.0)));
        assert!(distance < 2.0);

        let empty: Vec<Option<Coordinate>> = vec![None];
        assert!(closest(center, &empty, |c| *c).is_none());
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.85), "850 m");
        assert_eq!(format_distance(2.5), "2.50 km");
        assert_eq!(format_distance(12.126), "12.13 km");
        assert_eq!(format_distance(1.0), "1.00 km");
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = BoundingBox {
            min_lat: 19.120,
            max_lat: 19.145,
            min_lon: 72.825,
            max_lon: 72.850,
        };

        assert!(is_within_bounding_box(coord(19.13, 72.83), &bbox));
        assert!(is_within_bounding_box(coord(19.120, 72.825), &bbox));
        assert!(!is_within_bounding_box(coord(19.2, 72.83), &bbox));
    }
}
