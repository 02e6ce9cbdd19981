use crate::model::GeoPoint;

/// Rayon terrestre moyen, en milles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Distance orthodromique (haversine) en milles entre deux points.
///
/// `None` si l'une des coordonnées manque : l'absence est un résultat
/// normal, pas une erreur — le scoring distance s'abstient simplement.
pub fn distance_miles(a: Option<GeoPoint>, b: Option<GeoPoint>) -> Option<f64> {
    let (a, b) = (a?, b?);
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();
    Some(EARTH_RADIUS_MILES * c)
}
