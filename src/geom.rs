// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use strict_num::ApproxEqUlps;

/// A trait for fuzzy/approximate equality comparisons of float numbers.
pub trait FuzzyEq<Rhs: ?Sized = Self> {
    /// Returns `true` if values are approximately equal.
    fn fuzzy_eq(&self, other: &Rhs) -> bool;

    /// Returns `true` if values are not approximately equal.
    #[inline]
    fn fuzzy_ne(&self, other: &Rhs) -> bool {
        !self.fuzzy_eq(other)
    }
}

impl<T: FuzzyEq> FuzzyEq for Vec<T> {
    fn fuzzy_eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        for (a, b) in self.iter().zip(other.iter()) {
            if a.fuzzy_ne(b) {
                return false;
            }
        }

        true
    }
}

/// A trait for fuzzy/approximate comparisons of float numbers.
pub trait FuzzyZero: FuzzyEq {
    /// Returns `true` if the number is approximately zero.
    fn is_fuzzy_zero(&self) -> bool;
}

impl FuzzyEq for f64 {
    #[inline]
    fn fuzzy_eq(&self, other: &f64) -> bool {
        self.approx_eq_ulps(other, 4)
    }
}

impl FuzzyZero for f64 {
    #[inline]
    fn is_fuzzy_zero(&self) -> bool {
        self.fuzzy_eq(&0.0)
    }
}

/// Checks that the current number is > 0.
pub trait IsValidLength {
    /// Checks that the current number is > 0.
    fn is_valid_length(&self) -> bool;
}

impl IsValidLength for f64 {
    #[inline]
    fn is_valid_length(&self) -> bool {
        *self > 0.0 && self.is_finite()
    }
}

/// A 2D point representation.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq)]
pub struct P2 {
    pub x: f64,
    pub y: f64,
}

impl P2 {
    /// Creates a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> P2 {
        P2 { x, y }
    }
}

impl std::ops::Sub for P2 {
    type Output = V2;

    #[inline]
    fn sub(self, other: P2) -> V2 {
        V2::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Add<V2> for P2 {
    type Output = P2;

    #[inline]
    fn add(self, v: V2) -> P2 {
        P2::new(self.x + v.x, self.y + v.y)
    }
}

impl std::ops::Sub<V2> for P2 {
    type Output = P2;

    #[inline]
    fn sub(self, v: V2) -> P2 {
        P2::new(self.x - v.x, self.y - v.y)
    }
}

impl FuzzyEq for P2 {
    #[inline]
    fn fuzzy_eq(&self, other: &Self) -> bool {
        self.x.fuzzy_eq(&other.x) && self.y.fuzzy_eq(&other.y)
    }
}

impl std::fmt::Debug for P2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "P2({} {})", self.x, self.y)
    }
}

impl std::fmt::Display for P2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A 2D vector representation.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq)]
pub struct V2 {
    pub x: f64,
    pub y: f64,
}

impl V2 {
    /// Creates a new vector.
    #[inline]
    pub fn new(x: f64, y: f64) -> V2 {
        V2 { x, y }
    }

    /// Calculates the vector length.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Add for V2 {
    type Output = V2;

    #[inline]
    fn add(self, other: V2) -> V2 {
        V2::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for V2 {
    type Output = V2;

    #[inline]
    fn sub(self, other: V2) -> V2 {
        V2::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Neg for V2 {
    type Output = V2;

    #[inline]
    fn neg(self) -> V2 {
        V2::new(-self.x, -self.y)
    }
}

impl std::ops::Mul<f64> for V2 {
    type Output = V2;

    #[inline]
    fn mul(self, s: f64) -> V2 {
        V2::new(self.x * s, self.y * s)
    }
}

impl FuzzyEq for V2 {
    #[inline]
    fn fuzzy_eq(&self, other: &Self) -> bool {
        self.x.fuzzy_eq(&other.x) && self.y.fuzzy_eq(&other.y)
    }
}

impl std::fmt::Debug for V2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "V2({} {})", self.x, self.y)
    }
}

impl std::fmt::Display for V2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A 2×2 matrix.
///
/// Columns are `(a, b)` and `(c, d)`, so a vector maps to
/// `(a·x + c·y, b·x + d·y)`.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct M2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl M2 {
    /// Creates a new matrix from columns `(a, b)` and `(c, d)`.
    #[inline]
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> M2 {
        M2 { a, b, c, d }
    }

    /// Applies the matrix to a vector.
    #[inline]
    pub fn apply(&self, v: V2) -> V2 {
        V2::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }
}

/// A 2D affine transform.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    /// Constructs a new transform.
    #[inline]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Transform { a, b, c, d, e, f }
    }

    /// Constructs a new translate transform.
    #[inline]
    pub fn new_translate(x: f64, y: f64) -> Self {
        Transform::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Constructs a new scale transform.
    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Transform::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Constructs a new rotate transform.
    ///
    /// `angle` is in radians.
    #[inline]
    pub fn new_rotate(angle: f64) -> Self {
        let a = angle.cos();
        let b = angle.sin();
        let c = -b;
        let d = a;
        Transform::new(a, b, c, d, 0.0, 0.0)
    }

    /// Translates the current transform.
    #[inline]
    pub fn translate(&mut self, x: f64, y: f64) {
        self.append(&Transform::new_translate(x, y));
    }

    /// Scales the current transform.
    #[inline]
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.append(&Transform::new_scale(sx, sy));
    }

    /// Rotates the current transform.
    #[inline]
    pub fn rotate(&mut self, angle: f64) {
        self.append(&Transform::new_rotate(angle));
    }

    /// Appends transform to the current transform.
    #[inline]
    pub fn append(&mut self, other: &Transform) {
        let ts = multiply(self, other);
        *self = ts;
    }

    /// Prepends transform to the current transform.
    #[inline]
    pub fn prepend(&mut self, other: &Transform) {
        let ts = multiply(other, self);
        *self = ts;
    }

    /// Returns `true` if the transform is default, aka `(1 0 0 1 0 0)`.
    pub fn is_default(&self) -> bool {
        self.a.fuzzy_eq(&1.0)
            && self.b.fuzzy_eq(&0.0)
            && self.c.fuzzy_eq(&0.0)
            && self.d.fuzzy_eq(&1.0)
            && self.e.fuzzy_eq(&0.0)
            && self.f.fuzzy_eq(&0.0)
    }

    /// Applies the transform to a point.
    #[inline]
    pub fn apply(&self, p: P2) -> P2 {
        P2::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Applies the linear part of the transform to a vector.
    #[inline]
    pub fn apply_vector(&self, v: V2) -> V2 {
        V2::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }
}

#[inline(never)]
fn multiply(ts1: &Transform, ts2: &Transform) -> Transform {
    Transform {
        a: ts1.a * ts2.a + ts1.c * ts2.b,
        b: ts1.b * ts2.a + ts1.d * ts2.b,
        c: ts1.a * ts2.c + ts1.c * ts2.d,
        d: ts1.b * ts2.c + ts1.d * ts2.d,
        e: ts1.a * ts2.e + ts1.c * ts2.f + ts1.e,
        f: ts1.b * ts2.e + ts1.d * ts2.f + ts1.f,
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl FuzzyEq for Transform {
    fn fuzzy_eq(&self, other: &Self) -> bool {
        self.a.fuzzy_eq(&other.a)
            && self.b.fuzzy_eq(&other.b)
            && self.c.fuzzy_eq(&other.c)
            && self.d.fuzzy_eq(&other.d)
            && self.e.fuzzy_eq(&other.e)
            && self.f.fuzzy_eq(&other.f)
    }
}

/// A 2D size representation.
///
/// Width and height are guarantee to be > 0.
#[derive(Clone, Copy)]
pub struct Size2 {
    width: f64,
    height: f64,
}

impl Size2 {
    /// Creates a new `Size2` from values.
    #[inline]
    pub fn new(width: f64, height: f64) -> Option<Self> {
        if width.is_valid_length() && height.is_valid_length() {
            Some(Size2 { width, height })
        } else {
            None
        }
    }

    /// Returns width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl FuzzyEq for Size2 {
    #[inline]
    fn fuzzy_eq(&self, other: &Self) -> bool {
        self.width.fuzzy_eq(&other.width) && self.height.fuzzy_eq(&other.height)
    }
}

impl std::fmt::Debug for Size2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Size2({} {})", self.width, self.height)
    }
}

impl std::fmt::Display for Size2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An axis-aligned box.
///
/// Unlike a rect, a box can be empty. The empty box is the identity
/// of [`expand`](Box2::expand) and what bounds queries return for
/// empty geometry.
#[derive(Clone, Copy, PartialEq)]
pub struct Box2 {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Box2 {
    /// The empty box.
    pub const EMPTY: Box2 = Box2 {
        x0: f64::MAX,
        y0: f64::MAX,
        x1: f64::MIN,
        y1: f64::MIN,
    };

    /// Creates a new `Box2` from an origin and a size.
    ///
    /// Returns `None` when a finite box cannot be built from the values.
    /// Unlike sizes, a box width or height is allowed to be zero.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        if width >= 0.0 && height >= 0.0 && (x + width).is_finite() && (y + height).is_finite() {
            Some(Box2 {
                x0: x,
                y0: y,
                x1: x + width,
                y1: y + height,
            })
        } else {
            None
        }
    }

    /// Creates the smallest box containing both points.
    #[inline]
    pub fn from_points(a: P2, b: P2) -> Self {
        Box2 {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    /// Checks if the box is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 < self.x0 || self.y1 < self.y0
    }

    /// Returns the minimum X coordinate.
    #[inline]
    pub fn x0(&self) -> f64 {
        self.x0
    }

    /// Returns the minimum Y coordinate.
    #[inline]
    pub fn y0(&self) -> f64 {
        self.y0
    }

    /// Returns the maximum X coordinate.
    #[inline]
    pub fn x1(&self) -> f64 {
        self.x1
    }

    /// Returns the maximum Y coordinate.
    #[inline]
    pub fn y1(&self) -> f64 {
        self.y1
    }

    /// Returns the box width. Zero for the empty box.
    #[inline]
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.x1 - self.x0
        }
    }

    /// Returns the box height. Zero for the empty box.
    #[inline]
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.y1 - self.y0
        }
    }

    /// Returns the minimum corner.
    #[inline]
    pub fn origin(&self) -> P2 {
        P2::new(self.x0, self.y0)
    }

    /// Expands the box to the provided bounds.
    #[must_use]
    pub fn expand(self, r: impl Into<Self>) -> Self {
        let r = r.into();
        Box2 {
            x0: self.x0.min(r.x0),
            y0: self.y0.min(r.y0),
            x1: self.x1.max(r.x1),
            y1: self.y1.max(r.y1),
        }
    }

    /// Transforms the box, returning the bounds of the mapped corners.
    #[must_use]
    pub fn transform(self, ts: &Transform) -> Self {
        if self.is_empty() {
            return self;
        }

        let mut b = Box2::from_points(
            ts.apply(P2::new(self.x0, self.y0)),
            ts.apply(P2::new(self.x1, self.y1)),
        );
        b = b.expand(ts.apply(P2::new(self.x1, self.y0)));
        b = b.expand(ts.apply(P2::new(self.x0, self.y1)));
        b
    }
}

impl From<P2> for Box2 {
    #[inline]
    fn from(p: P2) -> Self {
        Box2 {
            x0: p.x,
            y0: p.y,
            x1: p.x,
            y1: p.y,
        }
    }
}

impl FuzzyEq for Box2 {
    #[inline]
    fn fuzzy_eq(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.is_empty() && other.is_empty();
        }

        self.x0.fuzzy_eq(&other.x0)
            && self.y0.fuzzy_eq(&other.y0)
            && self.x1.fuzzy_eq(&other.x1)
            && self.y1.fuzzy_eq(&other.y1)
    }
}

impl std::fmt::Debug for Box2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "Box2(empty)")
        } else {
            write!(f, "Box2({} {} {} {})", self.x0, self.y0, self.x1, self.y1)
        }
    }
}

impl std::fmt::Display for Box2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_apply_1() {
        let ts = Transform::new_translate(10.0, 20.0);
        assert!(ts.apply(P2::new(1.0, 2.0)).fuzzy_eq(&P2::new(11.0, 22.0)));
    }

    #[test]
    fn transform_append_order_1() {
        // Appending a translate to a scale maps `p` through the translate first.
        let mut ts = Transform::new_scale(2.0, 2.0);
        ts.append(&Transform::new_translate(10.0, 0.0));
        assert!(ts.apply(P2::new(1.0, 1.0)).fuzzy_eq(&P2::new(22.0, 2.0)));
    }

    #[test]
    fn transform_vector_ignores_translation_1() {
        let ts = Transform::new_translate(10.0, 20.0);
        assert!(ts.apply_vector(V2::new(1.0, 2.0)).fuzzy_eq(&V2::new(1.0, 2.0)));
    }

    #[test]
    fn box2_expand_1() {
        let b = Box2::EMPTY.expand(P2::new(1.0, 2.0)).expand(P2::new(-1.0, 0.0));
        assert_eq!(b, Box2::new(-1.0, 0.0, 2.0, 2.0).unwrap());
    }

    #[test]
    fn box2_empty_identity_1() {
        let r = Box2::new(1.0, 1.0, 2.0, 2.0).unwrap();
        assert_eq!(Box2::EMPTY.expand(r), r);
        assert!(Box2::EMPTY.is_empty());
        assert!(Box2::EMPTY.transform(&Transform::new_rotate(1.0)).is_empty());
    }

    #[test]
    fn box2_transform_1() {
        let b = Box2::new(0.0, 0.0, 2.0, 1.0).unwrap();
        let ts = Transform::new_rotate(std::f64::consts::FRAC_PI_2);
        let tb = b.transform(&ts);
        assert!((tb.x0() - -1.0).abs() < 1e-9);
        assert!(tb.y0().abs() < 1e-9);
        assert!(tb.x1().abs() < 1e-9);
        assert!((tb.y1() - 2.0).abs() < 1e-9);
    }
}
