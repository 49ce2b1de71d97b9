pub type P = [f64; 2];

/// Twice the signed area of abc; positive if counterclockwise.
#[inline]
pub fn orient2d(a: &P, b: &P, c: &P) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Positive if `d` is inside the circumcircle of counterclockwise abc.
#[inline]
pub fn incircle(a: &P, b: &P, c: &P, d: &P) -> f64 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);
    let a_lift = adx * adx + ady * ady;
    let b_lift = bdx * bdx + bdy * bdy;
    let c_lift = cdx * cdx + cdy * cdy;
    a_lift * (bdx * cdy - cdx * bdy) + b_lift * (cdx * ady - adx * cdy) + c_lift * (adx * bdy - bdx * ady)
}

pub fn circumcenter(a: &P, b: &P, c: &P) -> Option<P> {
    let (bx, by) = (b[0] - a[0], b[1] - a[1]);
    let (cx, cy) = (c[0] - a[0], c[1] - a[1]);
    let d = 2. * (bx * cy - by * cx);
    if d == 0. {
        return None;
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    Some([a[0] + (cy * b2 - by * c2) / d, a[1] + (bx * c2 - cx * b2) / d])
}

pub fn dist2(a: &P, b: &P) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Whether `c` lies strictly inside the circle with diameter ab.
#[inline]
pub fn encroaches(a: &P, b: &P, c: &P) -> bool {
    (a[0] - c[0]) * (b[0] - c[0]) + (a[1] - c[1]) * (b[1] - c[1]) < 0.
}
