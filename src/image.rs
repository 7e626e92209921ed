// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{Box2, Color, Meta, Opacity, P2, Path, Raster, Stops, Transform, V2};

/// A line cap.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cap {
    Butt,
    Round,
    Square,
}

impl Default for Cap {
    fn default() -> Self {
        Self::Butt
    }
}

/// A line join.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Join {
    Miter,
    Round,
    Bevel,
}

impl Default for Join {
    fn default() -> Self {
        Self::Miter
    }
}

/// A dash pattern and its phase.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Debug)]
pub struct Dashes {
    pub phase: f64,
    pub pattern: Vec<f64>,
}

/// An outline (stroke) style.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Debug)]
pub struct Outline {
    pub width: f64,
    pub cap: Cap,
    pub join: Join,
    pub miter_angle: f64,
    pub dashes: Option<Dashes>,
}

impl Default for Outline {
    fn default() -> Self {
        Outline {
            width: 1.0,
            cap: Cap::default(),
            join: Join::default(),
            miter_angle: 0.0,
            dashes: None,
        }
    }
}

/// The area of a path used by [`Image::cut`].
#[derive(Clone, PartialEq, Debug)]
pub enum Area {
    /// The interior under the non-zero winding rule.
    NonZero,
    /// The interior under the even-odd rule.
    EvenOdd,
    /// The stroked outline of the path.
    Outline(Outline),
}

impl Default for Area {
    fn default() -> Self {
        Self::NonZero
    }
}

/// A blend mode.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Blender {
    Atop,
    In,
    Out,
    Over,
    Plus,
    Copy,
    Xor,
}

impl Default for Blender {
    fn default() -> Self {
        Self::Over
    }
}

/// A transform applied to an image subtree.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Tr {
    /// A translation.
    Move(V2),
    /// A rotation, in radians.
    Rot(f64),
    /// An axis-aligned scale.
    Scale(V2),
    /// A general affine transform.
    Matrix(Transform),
}

impl Tr {
    /// Converts to the equivalent affine transform.
    pub fn to_transform(&self) -> Transform {
        match *self {
            Tr::Move(v) => Transform::new_translate(v.x, v.y),
            Tr::Rot(a) => Transform::new_rotate(a),
            Tr::Scale(s) => Transform::new_scale(s.x, s.y),
            Tr::Matrix(m) => m,
        }
    }
}

/// An image primitive: the leaves of an image tree.
#[derive(Clone, PartialEq, Debug)]
pub enum Primitive {
    /// A uniform color.
    Const(Color),
    /// A linear gradient along an axis given by two points.
    Axial(Stops, P2, P2),
    /// A radial gradient with a focus, a center and a radius.
    Radial(Stops, P2, P2, f64),
    /// A raster sample buffer mapped onto a box.
    Raster(Box2, Raster),
}

/// An image tree node.
///
/// This is the raw representation backing [`Image`], exposed for
/// render targets. Use the `Image` constructors to build values.
#[derive(Clone)]
pub enum ImageNode {
    /// A primitive leaf.
    Primitive(Primitive),
    /// The image clipped to the area of a path.
    Cut(Area, Arc<Path>, Image),
    /// The first image placed over the second one.
    Blend(Blender, Option<Opacity>, Image, Image),
    /// A transformed image.
    Transform(Tr, Image),
    /// An image annotated with metadata.
    Meta(Meta, Image),
}

/// An immutable 2D image value.
///
/// Images are algebraic values: a tree whose leaves are primitives and
/// whose nodes cut, blend, transform or annotate subtrees. Subtrees are
/// shared, so cloning an image is cheap and composing images never
/// copies them.
#[derive(Clone)]
pub struct Image(Arc<ImageNode>);

static VOID: Lazy<Image> =
    Lazy::new(|| Image(Arc::new(ImageNode::Primitive(Primitive::Const(Color::transparent())))));

impl Image {
    #[inline]
    fn from_node(node: ImageNode) -> Image {
        Image(Arc::new(node))
    }

    /// Returns the image with the uniform color `c` everywhere.
    pub fn constant(c: Color) -> Image {
        Image::from_node(ImageNode::Primitive(Primitive::Const(c)))
    }

    /// Returns the invisible image.
    ///
    /// Equal to `Image::constant(Color::transparent())`.
    pub fn void() -> Image {
        VOID.clone()
    }

    /// Checks if the image is the distinguished [`void`](Image::void)
    /// instance.
    ///
    /// This is an identity check; a structurally equal image built by
    /// other means does not count.
    #[inline]
    pub fn is_void(&self) -> bool {
        Arc::ptr_eq(&self.0, &VOID.0)
    }

    /// Returns the image with a linear gradient along `p0` → `p1`.
    pub fn axial(stops: Stops, p0: P2, p1: P2) -> Image {
        Image::from_node(ImageNode::Primitive(Primitive::Axial(stops, p0, p1)))
    }

    /// Returns the image with a radial gradient in the circle of the
    /// given center and radius.
    ///
    /// `focus` defaults to the center.
    pub fn radial(stops: Stops, focus: Option<P2>, center: P2, r: f64) -> Image {
        let focus = focus.unwrap_or(center);
        Image::from_node(ImageNode::Primitive(Primitive::Radial(
            stops, focus, center, r,
        )))
    }

    /// Returns the image with `raster` mapped onto `bounds`.
    pub fn raster(bounds: Box2, raster: Raster) -> Image {
        Image::from_node(ImageNode::Primitive(Primitive::Raster(bounds, raster)))
    }

    /// Cuts the image to the given area of `path`.
    #[must_use]
    pub fn cut(self, area: Area, path: Path) -> Image {
        Image::from_node(ImageNode::Cut(area, Arc::new(path), self))
    }

    /// Cuts the image to the non-zero winding interior of `path`.
    #[must_use]
    pub fn cut_anz(self, path: Path) -> Image {
        self.cut(Area::NonZero, path)
    }

    /// Cuts the image to the even-odd interior of `path`.
    #[must_use]
    pub fn cut_aeo(self, path: Path) -> Image {
        self.cut(Area::EvenOdd, path)
    }

    /// Cuts the image to the stroked outline of `path`.
    #[must_use]
    pub fn outline(self, outline: Outline, path: Path) -> Image {
        self.cut(Area::Outline(outline), path)
    }

    /// Blends the image over `back` with an explicit blender and alpha.
    ///
    /// When `alpha` is `None` the blend uses the source image's
    /// inherent alpha only.
    #[must_use]
    pub fn blend(self, blender: Blender, alpha: Option<Opacity>, back: Image) -> Image {
        Image::from_node(ImageNode::Blend(blender, alpha, self, back))
    }

    /// Blends the image over `back`.
    #[must_use]
    pub fn over(self, back: Image) -> Image {
        self.blend(Blender::default(), None, back)
    }

    /// Translates the image.
    #[must_use]
    pub fn translate(self, v: V2) -> Image {
        Image::from_node(ImageNode::Transform(Tr::Move(v), self))
    }

    /// Rotates the image around the origin by `a` radians.
    #[must_use]
    pub fn rotate(self, a: f64) -> Image {
        Image::from_node(ImageNode::Transform(Tr::Rot(a), self))
    }

    /// Scales the image from the origin.
    #[must_use]
    pub fn scale(self, s: V2) -> Image {
        Image::from_node(ImageNode::Transform(Tr::Scale(s), self))
    }

    /// Transforms the image by an affine map.
    #[must_use]
    pub fn transform(self, m: Transform) -> Image {
        Image::from_node(ImageNode::Transform(Tr::Matrix(m), self))
    }

    /// Annotates the image with metadata.
    ///
    /// Purely informational: consumers may use it, rendering semantics
    /// do not change.
    #[must_use]
    pub fn tag(self, meta: Meta) -> Image {
        Image::from_node(ImageNode::Meta(meta, self))
    }

    /// Returns the raw tree node of the image.
    #[inline]
    pub fn node(&self) -> &ImageNode {
        &self.0
    }

    /// Compares two images with a float equality predicate.
    ///
    /// Metadata annotations always compare with their keys' comparators.
    pub fn eq_with<F: Fn(f64, f64) -> bool>(&self, other: &Image, eq: F) -> bool {
        let mut stack = vec![(self.clone(), other.clone())];

        while let Some((a, b)) = stack.pop() {
            if Arc::ptr_eq(&a.0, &b.0) {
                continue;
            }

            match (a.node(), b.node()) {
                (ImageNode::Primitive(pa), ImageNode::Primitive(pb)) => {
                    if !primitive_eq(pa, pb, &eq) {
                        return false;
                    }
                }
                (ImageNode::Cut(aa, pa, ia), ImageNode::Cut(ab, pb, ib)) => {
                    if !area_eq(aa, ab, &eq) || !pa.eq_with(pb, &eq) {
                        return false;
                    }
                    stack.push((ia.clone(), ib.clone()));
                }
                (ImageNode::Blend(ba, la, fa, ka), ImageNode::Blend(bb, lb, fb, kb)) => {
                    if ba != bb || !alpha_eq(*la, *lb, &eq) {
                        return false;
                    }
                    stack.push((fa.clone(), fb.clone()));
                    stack.push((ka.clone(), kb.clone()));
                }
                (ImageNode::Transform(ta, ia), ImageNode::Transform(tb, ib)) => {
                    if !tr_eq(ta, tb, &eq) {
                        return false;
                    }
                    stack.push((ia.clone(), ib.clone()));
                }
                (ImageNode::Meta(ma, ia), ImageNode::Meta(mb, ib)) => {
                    if ma != mb {
                        return false;
                    }
                    stack.push((ia.clone(), ib.clone()));
                }
                _ => return false,
            }
        }

        true
    }

    /// Compares two images with a float comparator.
    ///
    /// Metadata annotations always compare with their keys' comparators.
    pub fn cmp_with<F: Fn(f64, f64) -> Ordering>(&self, other: &Image, cmp: F) -> Ordering {
        let mut stack = vec![(self.clone(), other.clone())];

        while let Some((a, b)) = stack.pop() {
            if Arc::ptr_eq(&a.0, &b.0) {
                continue;
            }

            let rank = node_rank(a.node()).cmp(&node_rank(b.node()));
            if rank != Ordering::Equal {
                return rank;
            }

            let ord = match (a.node(), b.node()) {
                (ImageNode::Primitive(pa), ImageNode::Primitive(pb)) => {
                    primitive_cmp(pa, pb, &cmp)
                }
                (ImageNode::Cut(aa, pa, ia), ImageNode::Cut(ab, pb, ib)) => {
                    stack.push((ia.clone(), ib.clone()));
                    area_cmp(aa, ab, &cmp).then_with(|| pa.cmp_with(pb, &cmp))
                }
                (ImageNode::Blend(ba, la, fa, ka), ImageNode::Blend(bb, lb, fb, kb)) => {
                    stack.push((fa.clone(), fb.clone()));
                    stack.push((ka.clone(), kb.clone()));
                    blender_rank(*ba)
                        .cmp(&blender_rank(*bb))
                        .then_with(|| alpha_cmp(*la, *lb, &cmp))
                }
                (ImageNode::Transform(ta, ia), ImageNode::Transform(tb, ib)) => {
                    stack.push((ia.clone(), ib.clone()));
                    tr_cmp(ta, tb, &cmp)
                }
                (ImageNode::Meta(ma, ia), ImageNode::Meta(mb, ib)) => {
                    stack.push((ia.clone(), ib.clone()));
                    ma.compare(mb)
                }
                _ => unreachable!("node ranks were equal"),
            };

            if ord != Ordering::Equal {
                return ord;
            }
        }

        Ordering::Equal
    }

    /// Totally orders two images. Floats are ordered by `f64::total_cmp`.
    pub fn compare(&self, other: &Image) -> Ordering {
        self.cmp_with(other, |a, b| a.total_cmp(&b))
    }
}

impl PartialEq for Image {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.eq_with(other, |a, b| a == b)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_node(self.node(), f)
    }
}

impl fmt::Debug for ImageNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_node(self, f)
    }
}

// Deep trees must not recurse, neither here nor in Drop below.
fn fmt_node(node: &ImageNode, f: &mut fmt::Formatter) -> fmt::Result {
    enum Task<'a> {
        Node(&'a ImageNode),
        Text(&'static str),
    }

    let mut stack = vec![Task::Node(node)];
    while let Some(task) = stack.pop() {
        match task {
            Task::Text(s) => f.write_str(s)?,
            Task::Node(n) => match n {
                ImageNode::Primitive(p) => write!(f, "{:?}", p)?,
                ImageNode::Cut(area, path, i) => {
                    write!(f, "Cut({:?}, {:?}, ", area, path)?;
                    stack.push(Task::Text(")"));
                    stack.push(Task::Node(i.node()));
                }
                ImageNode::Blend(b, a, front, back) => {
                    write!(f, "Blend({:?}, {:?}, ", b, a)?;
                    stack.push(Task::Text(")"));
                    stack.push(Task::Node(back.node()));
                    stack.push(Task::Text(", "));
                    stack.push(Task::Node(front.node()));
                }
                ImageNode::Transform(tr, i) => {
                    write!(f, "Transform({:?}, ", tr)?;
                    stack.push(Task::Text(")"));
                    stack.push(Task::Node(i.node()));
                }
                ImageNode::Meta(m, i) => {
                    write!(f, "Meta({:?}, ", m)?;
                    stack.push(Task::Text(")"));
                    stack.push(Task::Node(i.node()));
                }
            },
        }
    }

    Ok(())
}

impl Drop for ImageNode {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        take_children(self, &mut stack);

        while let Some(img) = stack.pop() {
            if let Ok(mut node) = Arc::try_unwrap(img.0) {
                take_children(&mut node, &mut stack);
            }
        }
    }
}

fn take_children(node: &mut ImageNode, out: &mut Vec<Image>) {
    match node {
        ImageNode::Primitive(_) => {}
        ImageNode::Cut(_, _, i) | ImageNode::Transform(_, i) | ImageNode::Meta(_, i) => {
            out.push(mem::replace(i, Image::void()));
        }
        ImageNode::Blend(_, _, front, back) => {
            out.push(mem::replace(front, Image::void()));
            out.push(mem::replace(back, Image::void()));
        }
    }
}

fn node_rank(n: &ImageNode) -> u8 {
    match n {
        ImageNode::Primitive(_) => 0,
        ImageNode::Cut(..) => 1,
        ImageNode::Blend(..) => 2,
        ImageNode::Transform(..) => 3,
        ImageNode::Meta(..) => 4,
    }
}

fn primitive_rank(p: &Primitive) -> u8 {
    match p {
        Primitive::Const(_) => 0,
        Primitive::Axial(..) => 1,
        Primitive::Radial(..) => 2,
        Primitive::Raster(..) => 3,
    }
}

fn blender_rank(b: Blender) -> u8 {
    match b {
        Blender::Atop => 0,
        Blender::In => 1,
        Blender::Out => 2,
        Blender::Over => 3,
        Blender::Plus => 4,
        Blender::Copy => 5,
        Blender::Xor => 6,
    }
}

fn p2_eq<F: Fn(f64, f64) -> bool>(a: P2, b: P2, eq: &F) -> bool {
    eq(a.x, b.x) && eq(a.y, b.y)
}

fn p2_cmp<F: Fn(f64, f64) -> Ordering>(a: P2, b: P2, cmp: &F) -> Ordering {
    cmp(a.x, b.x).then(cmp(a.y, b.y))
}

fn color_eq<F: Fn(f64, f64) -> bool>(a: Color, b: Color, eq: &F) -> bool {
    eq(a.red, b.red) && eq(a.green, b.green) && eq(a.blue, b.blue) && eq(a.alpha, b.alpha)
}

fn color_cmp<F: Fn(f64, f64) -> Ordering>(a: Color, b: Color, cmp: &F) -> Ordering {
    cmp(a.red, b.red)
        .then(cmp(a.green, b.green))
        .then(cmp(a.blue, b.blue))
        .then(cmp(a.alpha, b.alpha))
}

fn stops_eq<F: Fn(f64, f64) -> bool>(a: &Stops, b: &Stops, eq: &F) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(sa, sb)| eq(sa.offset.get(), sb.offset.get()) && color_eq(sa.color, sb.color, eq))
}

fn stops_cmp<F: Fn(f64, f64) -> Ordering>(a: &Stops, b: &Stops, cmp: &F) -> Ordering {
    for (sa, sb) in a.iter().zip(b.iter()) {
        let ord = cmp(sa.offset.get(), sb.offset.get()).then(color_cmp(sa.color, sb.color, cmp));
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.len().cmp(&b.len())
}

fn box_eq<F: Fn(f64, f64) -> bool>(a: Box2, b: Box2, eq: &F) -> bool {
    if a.is_empty() || b.is_empty() {
        return a.is_empty() && b.is_empty();
    }

    eq(a.x0(), b.x0()) && eq(a.y0(), b.y0()) && eq(a.x1(), b.x1()) && eq(a.y1(), b.y1())
}

fn box_cmp<F: Fn(f64, f64) -> Ordering>(a: Box2, b: Box2, cmp: &F) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    cmp(a.x0(), b.x0())
        .then(cmp(a.y0(), b.y0()))
        .then(cmp(a.x1(), b.x1()))
        .then(cmp(a.y1(), b.y1()))
}

fn primitive_eq<F: Fn(f64, f64) -> bool>(a: &Primitive, b: &Primitive, eq: &F) -> bool {
    match (a, b) {
        (Primitive::Const(ca), Primitive::Const(cb)) => color_eq(*ca, *cb, eq),
        (Primitive::Axial(sa, a0, a1), Primitive::Axial(sb, b0, b1)) => {
            stops_eq(sa, sb, eq) && p2_eq(*a0, *b0, eq) && p2_eq(*a1, *b1, eq)
        }
        (Primitive::Radial(sa, fa, ca, ra), Primitive::Radial(sb, fb, cb, rb)) => {
            stops_eq(sa, sb, eq) && p2_eq(*fa, *fb, eq) && p2_eq(*ca, *cb, eq) && eq(*ra, *rb)
        }
        (Primitive::Raster(ba, ra), Primitive::Raster(bb, rb)) => {
            box_eq(*ba, *bb, eq) && ra == rb
        }
        _ => false,
    }
}

fn primitive_cmp<F: Fn(f64, f64) -> Ordering>(a: &Primitive, b: &Primitive, cmp: &F) -> Ordering {
    let rank = primitive_rank(a).cmp(&primitive_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Primitive::Const(ca), Primitive::Const(cb)) => color_cmp(*ca, *cb, cmp),
        (Primitive::Axial(sa, a0, a1), Primitive::Axial(sb, b0, b1)) => stops_cmp(sa, sb, cmp)
            .then_with(|| p2_cmp(*a0, *b0, cmp))
            .then_with(|| p2_cmp(*a1, *b1, cmp)),
        (Primitive::Radial(sa, fa, ca, ra), Primitive::Radial(sb, fb, cb, rb)) => {
            stops_cmp(sa, sb, cmp)
                .then_with(|| p2_cmp(*fa, *fb, cmp))
                .then_with(|| p2_cmp(*ca, *cb, cmp))
                .then_with(|| cmp(*ra, *rb))
        }
        (Primitive::Raster(ba, ra), Primitive::Raster(bb, rb)) => {
            box_cmp(*ba, *bb, cmp).then_with(|| ra.cmp(rb))
        }
        _ => unreachable!("primitive ranks were equal"),
    }
}

fn outline_eq<F: Fn(f64, f64) -> bool>(a: &Outline, b: &Outline, eq: &F) -> bool {
    let dashes_eq = match (&a.dashes, &b.dashes) {
        (None, None) => true,
        (Some(da), Some(db)) => {
            eq(da.phase, db.phase)
                && da.pattern.len() == db.pattern.len()
                && da.pattern.iter().zip(db.pattern.iter()).all(|(x, y)| eq(*x, *y))
        }
        _ => false,
    };

    eq(a.width, b.width)
        && a.cap == b.cap
        && a.join == b.join
        && eq(a.miter_angle, b.miter_angle)
        && dashes_eq
}

fn outline_cmp<F: Fn(f64, f64) -> Ordering>(a: &Outline, b: &Outline, cmp: &F) -> Ordering {
    fn cap_rank(c: Cap) -> u8 {
        match c {
            Cap::Butt => 0,
            Cap::Round => 1,
            Cap::Square => 2,
        }
    }

    fn join_rank(j: Join) -> u8 {
        match j {
            Join::Miter => 0,
            Join::Round => 1,
            Join::Bevel => 2,
        }
    }

    let ord = cmp(a.width, b.width)
        .then(cap_rank(a.cap).cmp(&cap_rank(b.cap)))
        .then(join_rank(a.join).cmp(&join_rank(b.join)))
        .then(cmp(a.miter_angle, b.miter_angle));
    if ord != Ordering::Equal {
        return ord;
    }

    match (&a.dashes, &b.dashes) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(da), Some(db)) => {
            let ord = cmp(da.phase, db.phase);
            if ord != Ordering::Equal {
                return ord;
            }

            for (x, y) in da.pattern.iter().zip(db.pattern.iter()) {
                let ord = cmp(*x, *y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }

            da.pattern.len().cmp(&db.pattern.len())
        }
    }
}

fn area_eq<F: Fn(f64, f64) -> bool>(a: &Area, b: &Area, eq: &F) -> bool {
    match (a, b) {
        (Area::NonZero, Area::NonZero) => true,
        (Area::EvenOdd, Area::EvenOdd) => true,
        (Area::Outline(oa), Area::Outline(ob)) => outline_eq(oa, ob, eq),
        _ => false,
    }
}

fn area_cmp<F: Fn(f64, f64) -> Ordering>(a: &Area, b: &Area, cmp: &F) -> Ordering {
    fn area_rank(a: &Area) -> u8 {
        match a {
            Area::NonZero => 0,
            Area::EvenOdd => 1,
            Area::Outline(_) => 2,
        }
    }

    let rank = area_rank(a).cmp(&area_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Area::Outline(oa), Area::Outline(ob)) => outline_cmp(oa, ob, cmp),
        _ => Ordering::Equal,
    }
}

fn alpha_eq<F: Fn(f64, f64) -> bool>(a: Option<Opacity>, b: Option<Opacity>, eq: &F) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => eq(x.get(), y.get()),
        _ => false,
    }
}

fn alpha_cmp<F: Fn(f64, f64) -> Ordering>(
    a: Option<Opacity>,
    b: Option<Opacity>,
    cmp: &F,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => cmp(x.get(), y.get()),
    }
}

fn tr_eq<F: Fn(f64, f64) -> bool>(a: &Tr, b: &Tr, eq: &F) -> bool {
    match (a, b) {
        (Tr::Move(va), Tr::Move(vb)) => eq(va.x, vb.x) && eq(va.y, vb.y),
        (Tr::Rot(ra), Tr::Rot(rb)) => eq(*ra, *rb),
        (Tr::Scale(sa), Tr::Scale(sb)) => eq(sa.x, sb.x) && eq(sa.y, sb.y),
        (Tr::Matrix(ma), Tr::Matrix(mb)) => {
            eq(ma.a, mb.a)
                && eq(ma.b, mb.b)
                && eq(ma.c, mb.c)
                && eq(ma.d, mb.d)
                && eq(ma.e, mb.e)
                && eq(ma.f, mb.f)
        }
        _ => false,
    }
}

fn tr_cmp<F: Fn(f64, f64) -> Ordering>(a: &Tr, b: &Tr, cmp: &F) -> Ordering {
    fn tr_rank(t: &Tr) -> u8 {
        match t {
            Tr::Move(_) => 0,
            Tr::Rot(_) => 1,
            Tr::Scale(_) => 2,
            Tr::Matrix(_) => 3,
        }
    }

    let rank = tr_rank(a).cmp(&tr_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Tr::Move(va), Tr::Move(vb)) => cmp(va.x, vb.x).then(cmp(va.y, vb.y)),
        (Tr::Rot(ra), Tr::Rot(rb)) => cmp(*ra, *rb),
        (Tr::Scale(sa), Tr::Scale(sb)) => cmp(sa.x, sb.x).then(cmp(sa.y, sb.y)),
        (Tr::Matrix(ma), Tr::Matrix(mb)) => cmp(ma.a, mb.a)
            .then(cmp(ma.b, mb.b))
            .then(cmp(ma.c, mb.c))
            .then(cmp(ma.d, mb.d))
            .then(cmp(ma.e, mb.e))
            .then(cmp(ma.f, mb.f)),
        _ => unreachable!("transform ranks were equal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stop;

    fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    #[test]
    fn void_identity_1() {
        let void = Image::void();
        assert!(void.is_void());
        assert!(void.clone().is_void());

        // Structural equality holds even without identity.
        let built = Image::constant(Color::transparent());
        assert!(!built.is_void());
        assert_eq!(built, Image::void());
    }

    #[test]
    fn structural_equality_1() {
        let path = Path::new().rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
        let a = Image::constant(red())
            .cut(Area::NonZero, path.clone())
            .rotate(0.5)
            .over(Image::void());
        let b = Image::constant(red())
            .cut_anz(path.clone())
            .rotate(0.5)
            .over(Image::void());
        assert_eq!(a, b);
        assert_eq!(a.compare(&b), Ordering::Equal);

        let c = b.translate(V2::new(1.0, 0.0));
        assert_ne!(a, c);

        // The area distinguishes otherwise identical cuts.
        let eo = Image::constant(red()).cut_aeo(path.clone());
        let stroked = Image::constant(red()).outline(Outline::default(), path.clone());
        assert_ne!(Image::constant(red()).cut_anz(path), eo);
        assert_ne!(eo, stroked);
    }

    #[test]
    fn tolerant_equality_1() {
        let a = Image::constant(red()).rotate(0.5);
        let b = Image::constant(red()).rotate(0.5 + 1e-7);
        let eps_eq = |x: f64, y: f64| (x - y).abs() <= 1e-6;

        assert_ne!(a, b);
        assert!(a.eq_with(&b, eps_eq));
        assert!(b.eq_with(&a, eps_eq));
        assert!(a.eq_with(&a, |x, y| x == y));
    }

    #[test]
    fn meta_compares_by_keys_1() {
        let title = crate::keys::title();
        let a = Image::void().tag(Meta::new().add(&title, "a".to_string()));
        let b = Image::void().tag(Meta::new().add(&title, "a".to_string()));
        let c = Image::void().tag(Meta::new().add(&title, "c".to_string()));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn gradients_compare_1() {
        let stops = vec![
            Stop::new(0.0, Color::black()).unwrap(),
            Stop::new(1.0, Color::white()).unwrap(),
        ];
        let a = Image::axial(stops.clone(), P2::new(0.0, 0.0), P2::new(1.0, 0.0));
        let b = Image::axial(stops.clone(), P2::new(0.0, 0.0), P2::new(1.0, 0.0));
        let c = Image::radial(stops, None, P2::new(0.0, 0.0), 1.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.compare(&c), Ordering::Equal);
    }

    #[test]
    fn deep_tree_1() {
        // Equality, ordering and drop must all survive a deep chain.
        let mut a = Image::constant(red());
        let mut b = Image::constant(red());
        for _ in 0..50_000 {
            a = a.translate(V2::new(1.0, 0.0));
            b = b.translate(V2::new(1.0, 0.0));
        }

        assert_eq!(a, b);
        assert_eq!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn debug_format_1() {
        let img = Image::constant(red()).cut(
            Area::NonZero,
            Path::new().rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap()),
        );
        let s = format!("{:?}", img);
        assert!(s.starts_with("Cut(NonZero, "));
        assert!(s.contains("Const(Color(1 0 0 1))"));
    }
}
