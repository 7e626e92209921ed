// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use strict_num::NormalizedF64;

use crate::FuzzyEq;

/// An alias to `NormalizedF64`.
pub type Opacity = NormalizedF64;

/// An alias to `NormalizedF64`.
pub type StopOffset = NormalizedF64;

/// An RGBA color.
///
/// Channels are floats in the 0..=1 range.
#[derive(Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    /// Constructs a new `Color` from RGBA values.
    #[inline]
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Color {
        Color {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Constructs a new opaque `Color` from RGB values.
    #[inline]
    pub fn rgb(red: f64, green: f64, blue: f64) -> Color {
        Color::new(red, green, blue, 1.0)
    }

    /// Constructs a new `Color` set to black.
    #[inline]
    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    /// Constructs a new `Color` set to white.
    #[inline]
    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    /// Constructs a new fully transparent `Color`.
    #[inline]
    pub fn transparent() -> Color {
        Color::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl FuzzyEq for Color {
    #[inline]
    fn fuzzy_eq(&self, other: &Self) -> bool {
        self.red.fuzzy_eq(&other.red)
            && self.green.fuzzy_eq(&other.green)
            && self.blue.fuzzy_eq(&other.blue)
            && self.alpha.fuzzy_eq(&other.alpha)
    }
}

impl std::fmt::Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Color({} {} {} {})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A gradient stop.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Stop {
    /// Gradient stop offset.
    pub offset: StopOffset,

    /// Gradient stop color.
    pub color: Color,
}

impl Stop {
    /// Creates a new stop.
    ///
    /// Returns `None` when `offset` is not in the 0..=1 range.
    #[inline]
    pub fn new(offset: f64, color: Color) -> Option<Stop> {
        StopOffset::new(offset).map(|offset| Stop { offset, color })
    }
}

/// Gradient stops.
///
/// Offsets are expected to be non-decreasing.
pub type Stops = Vec<Stop>;

/// An opaque raster sample buffer.
///
/// The sample format is defined by whoever produced the buffer;
/// the core only moves it around and compares it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl Raster {
    /// Creates a new raster buffer.
    #[inline]
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Raster {
        Raster {
            width,
            height,
            data: Arc::new(data),
        }
    }

    /// Returns the width in samples.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in samples.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the sample bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Raster({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_offset_range_1() {
        assert!(Stop::new(0.5, Color::black()).is_some());
        assert!(Stop::new(1.5, Color::black()).is_none());
        assert!(Stop::new(-0.1, Color::black()).is_none());
    }

    #[test]
    fn raster_equality_1() {
        let a = Raster::new(2, 1, vec![1, 2, 3, 4]);
        let b = Raster::new(2, 1, vec![1, 2, 3, 4]);
        let c = Raster::new(2, 1, vec![1, 2, 3, 5]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }
}
