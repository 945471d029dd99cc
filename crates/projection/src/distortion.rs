//! Local projection distortion by finite differences.
//!
//! A geographic vector `[u, v]` (east, north) becomes a screen displacement by
//! multiplying it with the Jacobian of the projection at that point. Pixel y grows
//! downward, so `dy/dφ` is negative and already flips the north component.

use crate::Projection;

/// Finite-difference step in degrees.
pub const H: f64 = 0.0000360;

/// Jacobian `[dx/dλ, dy/dλ, dx/dφ, dy/dφ]` at `(lon, lat)`, whose projected point is
/// `(x, y)`. The λ terms are divided by `cos φ` to undo meridian convergence.
///
/// Returns `None` when a perturbed point does not project.
pub fn distortion<P: Projection + ?Sized>(
    projection: &P,
    lon: f64,
    lat: f64,
    x: f64,
    y: f64,
) -> Option<[f64; 4]> {
    let h_lon = if lon < 0.0 { H } else { -H };
    let h_lat = if lat < 0.0 { H } else { -H };
    let (lx, ly) = projection.project(lon + h_lon, lat)?;
    let (px, py) = projection.project(lon, lat + h_lat)?;

    // Meridian scale factor: 1 degree of longitude shrinks with latitude.
    let k = lat.to_radians().cos();
    let lon_step = h_lon * k;

    Some([
        (lx - x) / lon_step,
        (ly - y) / lon_step,
        (px - x) / h_lat,
        (py - y) / h_lat,
    ])
}

/// Screen displacement for the vector `[u, v]` at `(lon, lat)`, scaled by `scale`.
pub fn distort<P: Projection + ?Sized>(
    projection: &P,
    lon: f64,
    lat: f64,
    x: f64,
    y: f64,
    scale: f64,
    vector: [f64; 2],
) -> Option<[f64; 2]> {
    let u = vector[0] * scale;
    let v = vector[1] * scale;
    let d = distortion(projection, lon, lat, x, y)?;
    Some([d[0] * u + d[2] * v, d[1] * u + d[3] * v])
}
