use glam::Vec2;

/// Rotate by -90 degrees (clockwise in a y-up frame).
#[inline]
pub fn rotate_cw(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Rotate by +90 degrees (counter-clockwise in a y-up frame).
#[inline]
pub fn rotate_ccw(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// 2D cross product (z of the 3D cross).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Where segment `p -> p_end` crosses segment `q -> q_end`, as a fraction
/// along the first segment.
///
/// Parallel segments never intersect here, collinear overlap included.
pub fn segment_intersection_fraction(p: Vec2, p_end: Vec2, q: Vec2, q_end: Vec2) -> Option<f32> {
    let r = p_end - p;
    let s = q_end - q;
    let denom = cross(r, s);
    if denom == 0.0 {
        return None;
    }

    let qp = q - p;
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Intersection point of two segments, see [`segment_intersection_fraction`].
pub fn segment_intersection_point(p: Vec2, p_end: Vec2, q: Vec2, q_end: Vec2) -> Option<Vec2> {
    segment_intersection_fraction(p, p_end, q, q_end).map(|t| p + (p_end - p) * t)
}
