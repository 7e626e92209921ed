// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`vgr` is a declarative 2D vector graphics library.

An image is an immutable value: a tree whose leaves are color,
gradient and raster fills and whose nodes cut subtrees by paths,
blend them, transform them or annotate them with metadata. Rendering
an image means feeding it, together with a physical size and a view
rectangle, to a [`Renderer`] driving a render [`Target`].

## Features

- Immutable [`Path`] values with lines, quadratic and cubic Béziers
  and elliptic arcs, built with a fluent builder
- Path geometry: tight bounding boxes, affine transforms, adaptive
  flattening, uniform arclength sampling and arc to cubic conversion
- An immutable, structurally shared [`Image`] tree
- A typed, heterogeneous [`Meta`] map for document metadata
- An incremental, destination-agnostic render driver with in-memory,
  channel and caller-managed destinations
- No rasterization: concrete output formats are render targets built
  on top of this crate

## Example

```
use vgr::{Box2, Color, Image, Path, Area};

let square = Path::new().rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
let image = Image::constant(Color::rgb(1.0, 0.0, 0.0)).cut(Area::NonZero, square);
assert!(!image.is_void());
```

## Render targets

Targets implement the [`Target`] trait and emit their bytes through
the [`Output`] writer primitives, which behave uniformly across
destinations. Everything a target needs is public: the raw
[`PathSegment`] and [`ImageNode`] representations, the
[`earc_params`] and [`earc_to_cubics`] helpers, the renderer
metadata, limit and warning hook.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]

mod color;
mod error;
mod geom;
mod image;
mod meta;
mod path;
mod render;

pub use strict_num::{ApproxEqUlps, NormalizedF64};

pub use crate::color::*;
pub use crate::error::*;
pub use crate::geom::*;
pub use crate::image::*;
pub use crate::meta::*;
pub use crate::path::*;
pub use crate::render::*;
