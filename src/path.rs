// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cmp::Ordering;
use std::f64::consts::PI;

use kurbo::ParamCurveExtrema;

use crate::{Box2, Error, M2, P2, V2, Transform};

/// Geometric comparisons against zero use this epsilon.
const EPS: f64 = 1e-9;

/// Recursion limit for curve subdivision.
///
/// Keeps non-finite coordinates from subdividing forever.
const MAX_DEPTH: u8 = 26;

#[inline]
fn round_zero(v: f64) -> f64 {
    if v.abs() < EPS {
        0.0
    } else {
        v
    }
}

#[inline]
fn midpoint(a: P2, b: P2) -> P2 {
    P2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[inline]
fn kp(p: P2) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

#[inline]
fn kb(r: kurbo::Rect) -> Box2 {
    Box2::from_points(P2::new(r.x0, r.y0), P2::new(r.x1, r.y1))
}

/// A path's absolute segment.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PathSegment {
    /// Begins a new subpath at the point.
    MoveTo(P2),

    /// A straight line to the point.
    LineTo(P2),

    /// A quadratic Bézier with its control point and endpoint.
    QuadTo(P2, P2),

    /// A cubic Bézier with its two control points and endpoint.
    CubicTo(P2, P2, P2),

    /// An elliptic arc to `to`.
    ArcTo {
        /// Selects the arc spanning more than 180°.
        large: bool,
        /// Selects the clockwise arc, in a Y-up frame.
        cw: bool,
        /// The x-axis rotation of the ellipse, in radians.
        rotation: f64,
        /// The ellipse radii.
        radii: V2,
        /// The arc endpoint.
        to: P2,
    },

    /// Closes the current subpath.
    Close,
}

/// An event produced by [`Path::flatten`].
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FlatSegment {
    MoveTo(P2),
    LineTo(P2),
    Close,
}

/// An event produced by [`Path::sample`].
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SampleEvent {
    MoveTo(P2),
    Sample(P2),
    Close,
}

/// An immutable path value.
///
/// A path is an ordered sequence of subpaths made of [`PathSegment`]s.
/// Builder operations consume the path and return a new one, so paths
/// compose as values:
///
/// ```
/// use vgr::{Path, P2};
///
/// let p = Path::new()
///     .move_to(P2::new(0.0, 0.0))
///     .line_to(P2::new(1.0, 0.0))
///     .line_to(P2::new(1.0, 1.0))
///     .close();
/// assert_eq!(p.segments().len(), 4);
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The default tolerance of [`flatten`](Path::flatten) and friends.
    pub const DEFAULT_TOLERANCE: f64 = 1e-3;

    /// Creates a new empty path.
    #[inline]
    pub fn new() -> Path {
        Path::default()
    }

    /// Returns `true` if the path contains no segment.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in the path.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns a slice of the path segments.
    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the current point of the path.
    ///
    /// After a `Close` this is the start of the closed subpath.
    pub fn last_point(&self) -> Result<P2, Error> {
        match self.segments.last() {
            None => Err(Error::EmptyPath),
            Some(&PathSegment::MoveTo(p)) => Ok(p),
            Some(&PathSegment::LineTo(p)) => Ok(p),
            Some(&PathSegment::QuadTo(_, p)) => Ok(p),
            Some(&PathSegment::CubicTo(_, _, p)) => Ok(p),
            Some(&PathSegment::ArcTo { to, .. }) => Ok(to),
            Some(&PathSegment::Close) => self
                .segments
                .iter()
                .rev()
                .find_map(|s| match *s {
                    PathSegment::MoveTo(p) => Some(p),
                    _ => None,
                })
                .ok_or(Error::EmptyPath),
        }
    }

    fn current_point(&self) -> P2 {
        self.last_point().unwrap_or(P2::new(0.0, 0.0))
    }

    fn last_subpath_start(&self) -> P2 {
        self.segments
            .iter()
            .rev()
            .find_map(|s| match *s {
                PathSegment::MoveTo(p) => Some(p),
                _ => None,
            })
            .unwrap_or(P2::new(0.0, 0.0))
    }

    // A drawing op needs an open subpath. The origin of the implicit
    // subpath after a `Close` is the closed subpath's start.
    fn open_subpath(&mut self) {
        match self.segments.last() {
            None => self.segments.push(PathSegment::MoveTo(P2::new(0.0, 0.0))),
            Some(&PathSegment::Close) => {
                let p = self.last_subpath_start();
                self.segments.push(PathSegment::MoveTo(p));
            }
            _ => {}
        }
    }

    /// Begins a new subpath at `p`.
    ///
    /// A directly preceding `MoveTo` is replaced, so no empty subpath
    /// persists.
    #[must_use]
    pub fn move_to(mut self, p: P2) -> Path {
        if let Some(&PathSegment::MoveTo(_)) = self.segments.last() {
            self.segments.pop();
        }

        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    /// Begins a new subpath at the previous subpath's origin offset by `v`.
    #[must_use]
    pub fn rel_move_to(self, v: V2) -> Path {
        let p = self.last_subpath_start() + v;
        self.move_to(p)
    }

    /// Draws a straight line to `p`.
    #[must_use]
    pub fn line_to(mut self, p: P2) -> Path {
        self.open_subpath();
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    /// Draws a straight line to the current point offset by `v`.
    #[must_use]
    pub fn rel_line_to(self, v: V2) -> Path {
        let p = self.current_point() + v;
        self.line_to(p)
    }

    /// Draws a quadratic Bézier to `p` with the control point `c`.
    #[must_use]
    pub fn quad_to(mut self, c: P2, p: P2) -> Path {
        self.open_subpath();
        self.segments.push(PathSegment::QuadTo(c, p));
        self
    }

    /// Relative form of [`quad_to`](Path::quad_to); both points are offsets
    /// from the current point.
    #[must_use]
    pub fn rel_quad_to(self, c: V2, p: V2) -> Path {
        let cur = self.current_point();
        self.quad_to(cur + c, cur + p)
    }

    /// Draws a cubic Bézier to `p` with the control points `c0` and `c1`.
    #[must_use]
    pub fn cubic_to(mut self, c0: P2, c1: P2, p: P2) -> Path {
        self.open_subpath();
        self.segments.push(PathSegment::CubicTo(c0, c1, p));
        self
    }

    /// Relative form of [`cubic_to`](Path::cubic_to); all points are offsets
    /// from the current point.
    #[must_use]
    pub fn rel_cubic_to(self, c0: V2, c1: V2, p: V2) -> Path {
        let cur = self.current_point();
        self.cubic_to(cur + c0, cur + c1, cur + p)
    }

    /// Draws an elliptic arc to `p`.
    ///
    /// `large` selects the arc spanning more than 180° and `cw` the
    /// clockwise one, out of the four arcs joining the current point
    /// and `p` on an ellipse with the given `radii` rotated by
    /// `rotation` radians.
    #[must_use]
    pub fn arc_to(mut self, radii: V2, rotation: f64, large: bool, cw: bool, p: P2) -> Path {
        self.open_subpath();
        self.segments.push(PathSegment::ArcTo {
            large,
            cw,
            rotation,
            radii,
            to: p,
        });
        self
    }

    /// Relative form of [`arc_to`](Path::arc_to); the endpoint is an offset
    /// from the current point.
    #[must_use]
    pub fn rel_arc_to(self, radii: V2, rotation: f64, large: bool, cw: bool, v: V2) -> Path {
        let p = self.current_point() + v;
        self.arc_to(radii, rotation, large, cw, p)
    }

    /// Closes the current subpath.
    ///
    /// Does nothing when the current subpath has no drawing segment.
    #[must_use]
    pub fn close(mut self) -> Path {
        let closable = !matches!(
            self.segments.last(),
            None | Some(PathSegment::MoveTo(_)) | Some(PathSegment::Close)
        );
        if closable {
            self.segments.push(PathSegment::Close);
        }
        self
    }

    /// Appends an axis-aligned rectangle over `r`.
    #[must_use]
    pub fn rect(self, r: Box2) -> Path {
        if r.is_empty() {
            return self;
        }

        self.move_to(P2::new(r.x0(), r.y0()))
            .line_to(P2::new(r.x1(), r.y0()))
            .line_to(P2::new(r.x1(), r.y1()))
            .line_to(P2::new(r.x0(), r.y1()))
            .close()
    }

    /// Appends a circle with the given center and radius.
    #[must_use]
    pub fn circle(self, center: P2, r: f64) -> Path {
        self.ellipse(center, V2::new(r, r))
    }

    /// Appends an axis-aligned ellipse, built from two half arcs.
    #[must_use]
    pub fn ellipse(self, center: P2, radii: V2) -> Path {
        let rx = V2::new(radii.x, 0.0);
        self.move_to(center - rx)
            .arc_to(radii, 0.0, false, false, center + rx)
            .arc_to(radii, 0.0, false, false, center - rx)
            .close()
    }

    /// Appends a rectangle over `r` with elliptic corners of the given radii.
    #[must_use]
    pub fn rrect(self, r: Box2, radii: V2) -> Path {
        if r.is_empty() {
            return self;
        }

        let rx = radii.x.abs().min(r.width() / 2.0);
        let ry = radii.y.abs().min(r.height() / 2.0);
        if rx < EPS || ry < EPS {
            return self.rect(r);
        }

        let (x0, y0, x1, y1) = (r.x0(), r.y0(), r.x1(), r.y1());
        let rv = V2::new(rx, ry);
        self.move_to(P2::new(x0 + rx, y0))
            .line_to(P2::new(x1 - rx, y0))
            .arc_to(rv, 0.0, false, false, P2::new(x1, y0 + ry))
            .line_to(P2::new(x1, y1 - ry))
            .arc_to(rv, 0.0, false, false, P2::new(x1 - rx, y1))
            .line_to(P2::new(x0 + rx, y1))
            .arc_to(rv, 0.0, false, false, P2::new(x0, y1 - ry))
            .line_to(P2::new(x0, y0 + ry))
            .arc_to(rv, 0.0, false, false, P2::new(x0 + rx, y0))
            .close()
    }

    /// Calculates the path's tight bounding box.
    ///
    /// Curve extrema are tracked exactly; elliptic arcs contribute their
    /// endpoints and midpoint sample.
    ///
    /// Returns [`Box2::EMPTY`] for an empty path.
    pub fn bounds(&self) -> Box2 {
        let mut b = Box2::EMPTY;
        let mut prev = P2::new(0.0, 0.0);

        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => {
                    b = b.expand(p);
                    prev = p;
                }
                PathSegment::QuadTo(c, p) => {
                    let curve = kurbo::QuadBez::new(kp(prev), kp(c), kp(p));
                    b = b.expand(kb(curve.bounding_box()));
                    prev = p;
                }
                PathSegment::CubicTo(c0, c1, p) => {
                    let curve = kurbo::CubicBez::new(kp(prev), kp(c0), kp(c1), kp(p));
                    b = b.expand(kb(curve.bounding_box()));
                    prev = p;
                }
                PathSegment::ArcTo {
                    large,
                    cw,
                    rotation,
                    radii,
                    to,
                } => {
                    b = b.expand(to);
                    if let Some((c, m, t0, t1)) = earc_params(prev, radii, rotation, large, cw, to)
                    {
                        b = b.expand(earc_point(c, m, (t0 + t1) / 2.0));
                    }
                    prev = to;
                }
                PathSegment::Close => {}
            }
        }

        b
    }

    /// Calculates the bounding box of every point in the segment list.
    ///
    /// Cheaper and more conservative than [`bounds`](Path::bounds):
    /// control points are included verbatim.
    pub fn control_bounds(&self) -> Box2 {
        let mut b = Box2::EMPTY;

        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => b = b.expand(p),
                PathSegment::QuadTo(c, p) => b = b.expand(c).expand(p),
                PathSegment::CubicTo(c0, c1, p) => b = b.expand(c0).expand(c1).expand(p),
                PathSegment::ArcTo { to, .. } => b = b.expand(to),
                PathSegment::Close => {}
            }
        }

        b
    }

    /// Applies the transform to the path.
    ///
    /// Arc radii and rotation are rebuilt from the mapped ellipse axes,
    /// so arc endpoints stay exact under any affine map.
    #[must_use]
    pub fn transform(mut self, ts: &Transform) -> Path {
        if ts.is_default() {
            return self;
        }

        for seg in &mut self.segments {
            match seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => *p = ts.apply(*p),
                PathSegment::QuadTo(c, p) => {
                    *c = ts.apply(*c);
                    *p = ts.apply(*p);
                }
                PathSegment::CubicTo(c0, c1, p) => {
                    *c0 = ts.apply(*c0);
                    *c1 = ts.apply(*c1);
                    *p = ts.apply(*p);
                }
                PathSegment::ArcTo {
                    rotation,
                    radii,
                    to,
                    ..
                } => {
                    // TODO: flip `cw` when `ts` mirrors.
                    let (sina, cosa) = rotation.sin_cos();
                    let ax = ts.apply_vector(V2::new(radii.x * cosa, radii.x * sina));
                    let ay = ts.apply_vector(V2::new(-radii.y * sina, radii.y * cosa));
                    *rotation = ax.y.atan2(ax.x);
                    *radii = V2::new(ax.length(), ay.length());
                    *to = ts.apply(*to);
                }
                PathSegment::Close => {}
            }
        }

        self
    }

    /// Flattens the path into line segments.
    ///
    /// Curves are recursively bisected until they deviate from their
    /// chord by no more than `tolerance`.
    pub fn flatten<F: FnMut(FlatSegment)>(&self, tolerance: f64, mut f: F) {
        let budget = 16.0 * tolerance * tolerance;
        let tol2 = tolerance * tolerance;
        let mut prev = P2::new(0.0, 0.0);

        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) => {
                    f(FlatSegment::MoveTo(p));
                    prev = p;
                }
                PathSegment::LineTo(p) => {
                    f(FlatSegment::LineTo(p));
                    prev = p;
                }
                PathSegment::QuadTo(c, p) => {
                    flatten_quad(prev, c, p, budget, MAX_DEPTH, &mut f);
                    prev = p;
                }
                PathSegment::CubicTo(c0, c1, p) => {
                    flatten_cubic(prev, c0, c1, p, budget, MAX_DEPTH, &mut f);
                    prev = p;
                }
                PathSegment::ArcTo {
                    large,
                    cw,
                    rotation,
                    radii,
                    to,
                } => {
                    match earc_params(prev, radii, rotation, large, cw, to) {
                        Some((c, m, t0, t1)) => {
                            flatten_earc(c, m, t0, t1, tol2, MAX_DEPTH, &mut f)
                        }
                        None => f(FlatSegment::LineTo(to)),
                    }
                    prev = to;
                }
                PathSegment::Close => f(FlatSegment::Close),
            }
        }
    }

    /// Samples the path uniformly by arclength.
    ///
    /// Emits a `Sample` every `period` of distance along the flattened
    /// path, including the closing chord of closed subpaths. The
    /// residual distance carries across segments and resets on `MoveTo`.
    pub fn sample<F: FnMut(SampleEvent)>(&self, tolerance: f64, period: f64, mut f: F) {
        debug_assert!(period > 0.0);
        if !(period > 0.0) {
            return;
        }

        let mut last = P2::new(0.0, 0.0);
        let mut sub_start = P2::new(0.0, 0.0);
        let mut residual = 0.0;

        self.flatten(tolerance, |seg| match seg {
            FlatSegment::MoveTo(p) => {
                f(SampleEvent::MoveTo(p));
                last = p;
                sub_start = p;
                residual = 0.0;
            }
            FlatSegment::LineTo(p) => {
                sample_line(last, p, period, &mut residual, &mut f);
                last = p;
            }
            FlatSegment::Close => {
                sample_line(last, sub_start, period, &mut residual, &mut f);
                f(SampleEvent::Close);
                last = sub_start;
            }
        });
    }

    /// Compares two paths with a float equality predicate.
    pub fn eq_with<F: Fn(f64, f64) -> bool>(&self, other: &Path, eq: F) -> bool {
        if self.segments.len() != other.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| seg_eq(a, b, &eq))
    }

    /// Compares two paths with a float comparator.
    pub fn cmp_with<F: Fn(f64, f64) -> Ordering>(&self, other: &Path, cmp: F) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            let ord = seg_cmp(a, b, &cmp);
            if ord != Ordering::Equal {
                return ord;
            }
        }

        self.segments.len().cmp(&other.segments.len())
    }

    /// Totally orders two paths. Floats are ordered by `f64::total_cmp`.
    pub fn compare(&self, other: &Path) -> Ordering {
        self.cmp_with(other, |a, b| a.total_cmp(&b))
    }
}

impl std::fmt::Debug for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("Path").field(&self.segments).finish()
    }
}

/// Computes the center parameterization of an elliptic arc.
///
/// Given the arc endpoints, flags and radii, returns the ellipse center,
/// the 2×2 matrix mapping the unit circle onto the ellipse axes, and the
/// start/end angles on the unit circle. A point of the arc at angle `t`
/// is `center + m · (cos t, sin t)`.
///
/// Returns `None` when the radii are degenerate, the endpoints coincide
/// or they are too far apart to lie on such an ellipse.
pub fn earc_params(
    from: P2,
    radii: V2,
    rotation: f64,
    large: bool,
    cw: bool,
    to: P2,
) -> Option<(P2, M2, f64, f64)> {
    let rx = radii.x;
    let ry = radii.y;
    if rx.abs() < EPS || ry.abs() < EPS {
        return None;
    }

    let dx = from.x - to.x;
    let dy = from.y - to.y;
    if dx.abs() < EPS && dy.abs() < EPS {
        return None;
    }

    let sina = round_zero(rotation.sin());
    let cosa = round_zero(rotation.cos());

    // The chord in the frame where the ellipse is the unit circle.
    let x = (cosa * dx + sina * dy) / rx;
    let y = (-sina * dx + cosa * dy) / ry;
    let n = x * x + y * y;
    let comp = 1.0 / n - 0.25;
    if comp < 0.0 {
        return None;
    }

    let mut d = comp.sqrt();
    if large == cw {
        d = -d;
    }

    // Center relative to the chord midpoint, still in the unit frame.
    let cx = -d * y;
    let cy = d * x;

    let m = M2::new(rx * cosa, rx * sina, -ry * sina, ry * cosa);
    let mid = midpoint(from, to);
    let c = mid + m.apply(V2::new(cx, cy));

    let t0 = (y / 2.0 - cy).atan2(x / 2.0 - cx);
    let mut t1 = (-y / 2.0 - cy).atan2(-x / 2.0 - cx);

    // Wrap so the angle runs in the requested orientation.
    if cw && t1 > t0 {
        t1 -= 2.0 * PI;
    } else if !cw && t1 < t0 {
        t1 += 2.0 * PI;
    }

    Some((c, m, t0, t1))
}

/// Approximates an elliptic arc with cubic Béziers.
///
/// `f` receives each cubic as its two control points and endpoint, the
/// first one starting at `from`. The arc is subdivided until the
/// approximation error drops below `tolerance`.
///
/// Returns `false` without calling `f` when the arc is degenerate; the
/// caller should draw a straight line to `to` instead.
pub fn earc_to_cubics<F: FnMut(P2, P2, P2)>(
    from: P2,
    radii: V2,
    rotation: f64,
    large: bool,
    cw: bool,
    to: P2,
    tolerance: f64,
    mut f: F,
) -> bool {
    let (c, m, t0, t1) = match earc_params(from, radii, rotation, large, cw, to) {
        Some(v) => v,
        None => return false,
    };

    let tol = tolerance / radii.x.abs().max(radii.y.abs());
    earc_cubics(c, m, t0, t1, tol, MAX_DEPTH, &mut f);
    true
}

#[inline]
fn earc_point(c: P2, m: M2, t: f64) -> P2 {
    c + m.apply(V2::new(t.cos(), t.sin()))
}

fn flatten_quad<F: FnMut(FlatSegment)>(p0: P2, c: P2, p1: P2, budget: f64, depth: u8, f: &mut F) {
    let vx = 2.0 * c.x - p0.x - p1.x;
    let vy = 2.0 * c.y - p0.y - p1.y;

    if depth == 0 || vx * vx + vy * vy <= budget {
        f(FlatSegment::LineTo(p1));
        return;
    }

    let c0 = midpoint(p0, c);
    let c1 = midpoint(c, p1);
    let m = midpoint(c0, c1);
    flatten_quad(p0, c0, m, budget, depth - 1, f);
    flatten_quad(m, c1, p1, budget, depth - 1, f);
}

fn flatten_cubic<F: FnMut(FlatSegment)>(
    p0: P2,
    c0: P2,
    c1: P2,
    p1: P2,
    budget: f64,
    depth: u8,
    f: &mut F,
) {
    let ux = 3.0 * c0.x - 2.0 * p0.x - p1.x;
    let uy = 3.0 * c0.y - 2.0 * p0.y - p1.y;
    let vx = 3.0 * c1.x - 2.0 * p1.x - p0.x;
    let vy = 3.0 * c1.y - 2.0 * p1.y - p0.y;
    let flat = (ux * ux + uy * uy).max(vx * vx + vy * vy);

    if depth == 0 || flat <= budget {
        f(FlatSegment::LineTo(p1));
        return;
    }

    let p01 = midpoint(p0, c0);
    let p12 = midpoint(c0, c1);
    let p23 = midpoint(c1, p1);
    let p012 = midpoint(p01, p12);
    let p123 = midpoint(p12, p23);
    let m = midpoint(p012, p123);
    flatten_cubic(p0, p01, p012, m, budget, depth - 1, f);
    flatten_cubic(m, p123, p23, p1, budget, depth - 1, f);
}

fn flatten_earc<F: FnMut(FlatSegment)>(
    c: P2,
    m: M2,
    t0: f64,
    t1: f64,
    tol2: f64,
    depth: u8,
    f: &mut F,
) {
    let pa = earc_point(c, m, t0);
    let pb = earc_point(c, m, t1);
    let pm = earc_point(c, m, (t0 + t1) / 2.0);

    // Squared distance from the midpoint sample to the chord.
    let ab = pb - pa;
    let ap = pm - pa;
    let den = ab.x * ab.x + ab.y * ab.y;
    let d2 = if den < EPS {
        ap.x * ap.x + ap.y * ap.y
    } else {
        let cross = ab.x * ap.y - ab.y * ap.x;
        cross * cross / den
    };

    if depth == 0 || d2 <= tol2 {
        f(FlatSegment::LineTo(pb));
        return;
    }

    let tm = (t0 + t1) / 2.0;
    flatten_earc(c, m, t0, tm, tol2, depth - 1, f);
    flatten_earc(c, m, tm, t1, tol2, depth - 1, f);
}

fn earc_cubics<F: FnMut(P2, P2, P2)>(c: P2, m: M2, t0: f64, t1: f64, tol: f64, depth: u8, f: &mut F) {
    let dt = (t1 - t0) / 4.0;
    let err = (2.0 * dt.sin().powi(6)) / (27.0 * dt.cos().powi(2));

    if depth == 0 || err <= tol {
        let l = (4.0 / 3.0) * dt.tan();
        let p0 = earc_point(c, m, t0);
        let p1 = earc_point(c, m, t1);
        let d0 = m.apply(V2::new(-t0.sin(), t0.cos()));
        let d1 = m.apply(V2::new(-t1.sin(), t1.cos()));
        f(p0 + d0 * l, p1 - d1 * l, p1);
        return;
    }

    let tm = (t0 + t1) / 2.0;
    earc_cubics(c, m, t0, tm, tol, depth - 1, f);
    earc_cubics(c, m, tm, t1, tol, depth - 1, f);
}

fn sample_line<F: FnMut(SampleEvent)>(from: P2, to: P2, period: f64, residual: &mut f64, f: &mut F) {
    let seg = to - from;
    let len = seg.length();
    if len <= 0.0 {
        return;
    }

    let mut travel = period - *residual;
    while travel <= len {
        f(SampleEvent::Sample(from + seg * (travel / len)));
        travel += period;
    }

    *residual = len - (travel - period);
}

fn p2_eq<F: Fn(f64, f64) -> bool>(a: P2, b: P2, eq: &F) -> bool {
    eq(a.x, b.x) && eq(a.y, b.y)
}

fn seg_eq<F: Fn(f64, f64) -> bool>(a: &PathSegment, b: &PathSegment, eq: &F) -> bool {
    match (*a, *b) {
        (PathSegment::MoveTo(pa), PathSegment::MoveTo(pb)) => p2_eq(pa, pb, eq),
        (PathSegment::LineTo(pa), PathSegment::LineTo(pb)) => p2_eq(pa, pb, eq),
        (PathSegment::QuadTo(ca, pa), PathSegment::QuadTo(cb, pb)) => {
            p2_eq(ca, cb, eq) && p2_eq(pa, pb, eq)
        }
        (PathSegment::CubicTo(ca0, ca1, pa), PathSegment::CubicTo(cb0, cb1, pb)) => {
            p2_eq(ca0, cb0, eq) && p2_eq(ca1, cb1, eq) && p2_eq(pa, pb, eq)
        }
        (
            PathSegment::ArcTo {
                large: la,
                cw: wa,
                rotation: ra,
                radii: va,
                to: pa,
            },
            PathSegment::ArcTo {
                large: lb,
                cw: wb,
                rotation: rb,
                radii: vb,
                to: pb,
            },
        ) => {
            la == lb
                && wa == wb
                && eq(ra, rb)
                && eq(va.x, vb.x)
                && eq(va.y, vb.y)
                && p2_eq(pa, pb, eq)
        }
        (PathSegment::Close, PathSegment::Close) => true,
        _ => false,
    }
}

fn seg_rank(s: &PathSegment) -> u8 {
    match s {
        PathSegment::MoveTo(_) => 0,
        PathSegment::LineTo(_) => 1,
        PathSegment::QuadTo(..) => 2,
        PathSegment::CubicTo(..) => 3,
        PathSegment::ArcTo { .. } => 4,
        PathSegment::Close => 5,
    }
}

fn p2_cmp<F: Fn(f64, f64) -> Ordering>(a: P2, b: P2, cmp: &F) -> Ordering {
    cmp(a.x, b.x).then(cmp(a.y, b.y))
}

fn seg_cmp<F: Fn(f64, f64) -> Ordering>(a: &PathSegment, b: &PathSegment, cmp: &F) -> Ordering {
    let rank = seg_rank(a).cmp(&seg_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (*a, *b) {
        (PathSegment::MoveTo(pa), PathSegment::MoveTo(pb)) => p2_cmp(pa, pb, cmp),
        (PathSegment::LineTo(pa), PathSegment::LineTo(pb)) => p2_cmp(pa, pb, cmp),
        (PathSegment::QuadTo(ca, pa), PathSegment::QuadTo(cb, pb)) => {
            p2_cmp(ca, cb, cmp).then(p2_cmp(pa, pb, cmp))
        }
        (PathSegment::CubicTo(ca0, ca1, pa), PathSegment::CubicTo(cb0, cb1, pb)) => p2_cmp(ca0, cb0, cmp)
            .then(p2_cmp(ca1, cb1, cmp))
            .then(p2_cmp(pa, pb, cmp)),
        (
            PathSegment::ArcTo {
                large: la,
                cw: wa,
                rotation: ra,
                radii: va,
                to: pa,
            },
            PathSegment::ArcTo {
                large: lb,
                cw: wb,
                rotation: rb,
                radii: vb,
                to: pb,
            },
        ) => la
            .cmp(&lb)
            .then(wa.cmp(&wb))
            .then(cmp(ra, rb))
            .then(cmp(va.x, vb.x))
            .then(cmp(va.y, vb.y))
            .then(p2_cmp(pa, pb, cmp)),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FuzzyEq;

    fn pt(x: f64, y: f64) -> P2 {
        P2::new(x, y)
    }

    fn approx(a: P2, b: P2) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn unit_square_bounds_1() {
        let p = Path::new()
            .move_to(pt(0.0, 0.0))
            .line_to(pt(1.0, 0.0))
            .line_to(pt(1.0, 1.0))
            .line_to(pt(0.0, 1.0))
            .close();
        assert_eq!(p.bounds(), Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
        assert_eq!(p.control_bounds(), Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
    }

    #[test]
    fn empty_path_1() {
        assert!(Path::new().bounds().is_empty());
        assert!(matches!(Path::new().last_point(), Err(Error::EmptyPath)));
    }

    #[test]
    fn implicit_subpath_1() {
        let p = Path::new().line_to(pt(1.0, 2.0));
        assert_eq!(p.segments()[0], PathSegment::MoveTo(pt(0.0, 0.0)));

        let p = Path::new()
            .move_to(pt(1.0, 1.0))
            .line_to(pt(2.0, 1.0))
            .close()
            .line_to(pt(3.0, 3.0));
        assert_eq!(p.segments()[3], PathSegment::MoveTo(pt(1.0, 1.0)));
        assert_eq!(p.segments()[4], PathSegment::LineTo(pt(3.0, 3.0)));
    }

    #[test]
    fn empty_subpath_replaced_1() {
        let p = Path::new().move_to(pt(1.0, 1.0)).move_to(pt(2.0, 2.0));
        assert_eq!(p.len(), 1);
        assert_eq!(p.segments()[0], PathSegment::MoveTo(pt(2.0, 2.0)));
    }

    #[test]
    fn close_needs_segments_1() {
        let p = Path::new().close();
        assert!(p.is_empty());

        let p = Path::new().move_to(pt(1.0, 1.0)).close();
        assert_eq!(p.len(), 1);

        let p = Path::new().move_to(pt(1.0, 1.0)).line_to(pt(2.0, 2.0)).close().close();
        assert_eq!(p.segments().last(), Some(&PathSegment::Close));
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn rel_ops_1() {
        let p = Path::new()
            .move_to(pt(1.0, 1.0))
            .rel_line_to(V2::new(1.0, 0.0))
            .rel_line_to(V2::new(0.0, 1.0));
        assert_eq!(p.last_point().unwrap(), pt(2.0, 2.0));

        // `rel_move_to` offsets from the previous subpath origin.
        let p = p.rel_move_to(V2::new(10.0, 0.0));
        assert_eq!(p.last_point().unwrap(), pt(11.0, 1.0));
    }

    #[test]
    fn earc_params_quarter_1() {
        let (c, _, t0, t1) = earc_params(
            pt(1.0, 0.0),
            V2::new(1.0, 1.0),
            0.0,
            false,
            false,
            pt(0.0, 1.0),
        )
        .unwrap();
        assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
        assert!(t0.abs() < 1e-9);
        assert!((t1 - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn earc_params_none_1() {
        // Degenerate radii.
        assert!(earc_params(pt(0.0, 0.0), V2::new(0.0, 1.0), 0.0, false, false, pt(1.0, 0.0)).is_none());
        // Coincident endpoints.
        assert!(earc_params(pt(1.0, 1.0), V2::new(1.0, 1.0), 0.0, false, false, pt(1.0, 1.0)).is_none());
        // Endpoints too far apart.
        assert!(earc_params(pt(0.0, 0.0), V2::new(1.0, 1.0), 0.0, false, false, pt(10.0, 0.0)).is_none());
    }

    #[test]
    fn earc_params_endpoints_on_ellipse_1() {
        let p0 = pt(1.0, 0.0);
        let p1 = pt(0.0, 1.0);
        let radii = V2::new(1.0, 2.0);
        for &large in &[false, true] {
            for &cw in &[false, true] {
                let (c, m, t0, t1) = earc_params(p0, radii, 0.3, large, cw, p1).unwrap();
                assert!(approx(earc_point(c, m, t0), p0));
                assert!(approx(earc_point(c, m, t1), p1));
                if cw {
                    assert!(t1 < t0);
                } else {
                    assert!(t1 > t0);
                }
                if large {
                    assert!((t1 - t0).abs() >= PI);
                } else {
                    assert!((t1 - t0).abs() <= PI + 1e-9);
                }
            }
        }
    }

    #[test]
    fn flatten_circle_1() {
        let p = Path::new().circle(pt(0.0, 0.0), 1.0);
        let mut lines = 0;
        let mut on_circle = true;
        p.flatten(1e-3, |seg| {
            if let FlatSegment::LineTo(q) = seg {
                lines += 1;
                if ((q - pt(0.0, 0.0)).length() - 1.0).abs() > 1e-3 {
                    on_circle = false;
                }
            }
        });
        assert!(lines >= 32);
        assert!(on_circle);
    }

    #[test]
    fn flatten_lines_identity_1() {
        let p = Path::new().rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
        let mut events = Vec::new();
        p.flatten(1e-3, |seg| events.push(seg));
        assert_eq!(
            events,
            vec![
                FlatSegment::MoveTo(pt(0.0, 0.0)),
                FlatSegment::LineTo(pt(1.0, 0.0)),
                FlatSegment::LineTo(pt(1.0, 1.0)),
                FlatSegment::LineTo(pt(0.0, 1.0)),
                FlatSegment::Close,
            ]
        );
    }

    #[test]
    fn flatten_starts_with_move_1() {
        let p = Path::new().circle(pt(3.0, 2.0), 1.5).rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
        let mut events = Vec::new();
        p.flatten(1e-3, |seg| events.push(seg));
        assert!(matches!(events[0], FlatSegment::MoveTo(_)));
        let moves = events.iter().filter(|e| matches!(e, FlatSegment::MoveTo(_))).count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn quad_flatten_on_curve_1() {
        // For this quad x(t) = 2t, so y = 4·(x/2)·(1 − x/2) on the curve.
        let p = Path::new().move_to(pt(0.0, 0.0)).quad_to(pt(1.0, 2.0), pt(2.0, 0.0));
        let mut lines = 0;
        p.flatten(1e-3, |seg| {
            if let FlatSegment::LineTo(q) = seg {
                lines += 1;
                let t = q.x / 2.0;
                assert!((q.y - 4.0 * t * (1.0 - t)).abs() < 1e-9);
            }
        });
        assert!(lines >= 16);
    }

    #[test]
    fn sample_spacing_1() {
        let p = Path::new()
            .move_to(pt(0.0, 0.0))
            .line_to(pt(5.0, 0.0))
            .line_to(pt(5.0, 5.0));
        let mut samples = Vec::new();
        p.sample(1e-3, 3.0, |ev| {
            if let SampleEvent::Sample(q) = ev {
                samples.push(q);
            }
        });
        assert_eq!(samples.len(), 3);
        assert!(approx(samples[0], pt(3.0, 0.0)));
        assert!(approx(samples[1], pt(5.0, 1.0)));
        assert!(approx(samples[2], pt(5.0, 4.0)));
    }

    #[test]
    fn sample_closing_chord_1() {
        let p = Path::new().rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
        let mut samples = Vec::new();
        p.sample(1e-3, 0.9, |ev| {
            if let SampleEvent::Sample(q) = ev {
                samples.push(q);
            }
        });
        assert_eq!(samples.len(), 4);
        assert!(approx(samples[3], pt(0.0, 0.4)));
    }

    #[test]
    fn transform_translate_1() {
        let ts = Transform::new_translate(2.0, 3.0);
        let p = Path::new().rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap()).transform(&ts);
        assert_eq!(p.bounds(), Box2::new(2.0, 3.0, 1.0, 1.0).unwrap());
    }

    #[test]
    fn transform_arc_endpoints_1() {
        let mut ts = Transform::new_rotate(0.7);
        ts.append(&Transform::new_translate(3.0, -2.0));
        let p = Path::new()
            .move_to(pt(1.0, 0.0))
            .arc_to(V2::new(1.0, 2.0), 0.3, false, false, pt(0.0, 1.0));
        let expected = ts.apply(pt(0.0, 1.0));
        let tp = p.transform(&ts);
        assert!(approx(tp.last_point().unwrap(), expected));

        // A pure rotation keeps the radii.
        let rot = Transform::new_rotate(0.7);
        let p = Path::new()
            .move_to(pt(1.0, 0.0))
            .arc_to(V2::new(1.0, 2.0), 0.0, false, false, pt(0.0, 1.0));
        match p.transform(&rot).segments()[1] {
            PathSegment::ArcTo { radii, .. } => {
                assert!((radii.x - 1.0).abs() < 1e-9);
                assert!((radii.y - 2.0).abs() < 1e-9);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn transform_bounds_containment_1() {
        let p = Path::new()
            .move_to(pt(0.0, 0.0))
            .quad_to(pt(1.0, 3.0), pt(2.0, 0.0))
            .cubic_to(pt(3.0, -1.0), pt(4.0, 1.0), pt(5.0, 0.0))
            .arc_to(V2::new(2.0, 1.0), 0.2, false, false, pt(6.0, 1.0));

        // Axis-preserving transforms keep control bounds exact.
        let mut ts = Transform::new_scale(2.0, 3.0);
        ts.append(&Transform::new_translate(1.0, 1.0));
        let tb1 = p.clone().transform(&ts).control_bounds();
        let tb2 = p.control_bounds().transform(&ts);
        assert!(tb1.fuzzy_eq(&tb2));

        // Under rotation the transformed box can only grow.
        let rot = Transform::new_rotate(0.7);
        let tb1 = p.clone().transform(&rot).control_bounds();
        let tb2 = p.control_bounds().transform(&rot);
        assert!(tb1.x0() >= tb2.x0() - 1e-9);
        assert!(tb1.y0() >= tb2.y0() - 1e-9);
        assert!(tb1.x1() <= tb2.x1() + 1e-9);
        assert!(tb1.y1() <= tb2.y1() + 1e-9);
    }

    #[test]
    fn earc_to_cubics_quarter_1() {
        let mut cubics = Vec::new();
        let ok = earc_to_cubics(
            pt(1.0, 0.0),
            V2::new(1.0, 1.0),
            0.0,
            false,
            false,
            pt(0.0, 1.0),
            Path::DEFAULT_TOLERANCE,
            |c0, c1, p| cubics.push((c0, c1, p)),
        );
        assert!(ok);
        assert_eq!(cubics.len(), 1);

        let l = (4.0 / 3.0) * (PI / 8.0).tan();
        let (c0, c1, p) = cubics[0];
        assert!(approx(c0, pt(1.0, l)));
        assert!(approx(c1, pt(l, 1.0)));
        assert!(approx(p, pt(0.0, 1.0)));
    }

    #[test]
    fn earc_to_cubics_degenerate_1() {
        let mut called = false;
        let ok = earc_to_cubics(
            pt(0.0, 0.0),
            V2::new(0.0, 0.0),
            0.0,
            false,
            false,
            pt(1.0, 0.0),
            Path::DEFAULT_TOLERANCE,
            |_, _, _| called = true,
        );
        assert!(!ok);
        assert!(!called);
    }

    #[test]
    fn tolerant_equality_1() {
        let a = Path::new().move_to(pt(0.0, 0.0)).line_to(pt(1.0, 0.0));
        let b = Path::new().move_to(pt(0.0, 0.0)).line_to(pt(1.0 + 1e-7, 0.0));
        assert_ne!(a, b);
        assert!(a.eq_with(&b, |x, y| (x - y).abs() <= 1e-6));
        assert!(!a.eq_with(&b, |x, y| (x - y).abs() <= 1e-8));
        assert_eq!(a.compare(&a), Ordering::Equal);
        assert_ne!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn rrect_segments_1() {
        let p = Path::new().rrect(Box2::new(0.0, 0.0, 10.0, 6.0).unwrap(), V2::new(2.0, 1.0));
        // Move, four lines, four arcs and a close.
        assert_eq!(p.len(), 10);
        let arcs = p
            .segments()
            .iter()
            .filter(|s| matches!(s, PathSegment::ArcTo { .. }))
            .count();
        assert_eq!(arcs, 4);
        let b = p.bounds();
        assert!(b.x0() >= -1e-9 && b.y0() >= -1e-9);
        assert!(b.x1() <= 10.0 + 1e-9 && b.y1() <= 6.0 + 1e-9);
    }
}
