//! Flattening a 3D section into a 2D (slope distance, elevation) profile.

use trails_geom::{angle_between, Point2, Point3, Polyline2, Result, Vec2};

/// Unroll `points` into a 2D profile, walking from `origin`.
///
/// Each step from the previous point `prev` to `p` contributes its slope
/// length split into a horizontal part `length * cos(angle)` and a vertical
/// part `length * sin(angle)`, where `angle` is measured between the
/// horizontal delta and the full 3D delta. The vertical part is negative
/// when the step goes down.
///
/// One output point is produced per input point; `origin` itself is not part
/// of the output. The horizontal component is never negative, so the profile
/// always runs left to right in path order. Reversing the input therefore
/// does not mirror the profile; it replays the elevation changes backwards.
///
/// Fails with a degenerate-vector error when a point coincides with its
/// predecessor or sits directly above or below it.
pub fn convert(points: &[Point3], origin: Point3) -> Result<Polyline2> {
    let mut profile: Polyline2 = Vec::with_capacity(points.len() + 1);
    profile.push(Point2::origin());

    let mut prev = origin;
    for p in points {
        let reduced = Point3::new(p.x, p.y, prev.z);

        let vector = prev - p;
        let x_vector = prev - reduced;
        let length = vector.norm();
        let angle = angle_between(&x_vector, &vector)?;

        let dx = length * angle.cos();
        let mut dy = length * angle.sin();
        if x_vector.z < vector.z {
            dy = -dy;
        }

        let last = profile[profile.len() - 1];
        profile.push(last + Vec2::new(dx, dy));
        prev = *p;
    }

    profile.remove(0);
    Ok(profile)
}
