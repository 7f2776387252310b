//! Pixel-space geometry.
//!
//! All values are `f64` logical pixels. Sizes produced by the helpers here never go below zero.

use core::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A half-open interval `[start, start + size)` on one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: f64,
    pub size: f64,
}

impl Span {
    pub const fn new(start: f64, size: f64) -> Self {
        Self { start, size }
    }

    pub fn end(&self) -> f64 {
        self.start + self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size <= 0.0
    }

    pub fn contains(&self, at: f64) -> bool {
        at >= self.start && at < self.end()
    }

    /// Clamps `at` into `[start, end]`.
    pub fn clamp(&self, at: f64) -> f64 {
        at.max(self.start).min(self.end().max(self.start))
    }

    /// Overlap of two spans, or `None` when they share no interior point.
    pub fn intersect(&self, other: Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        (end > start).then(|| Span::new(start, end - start))
    }

    /// Grows the span by `amount` on both ends. Negative amounts shrink it, down to zero size
    /// around the midpoint.
    pub fn margin(&self, amount: f64) -> Span {
        let size = self.size + 2.0 * amount;
        if size >= 0.0 {
            Span::new(self.start - amount, size)
        } else {
            Span::new(self.start + self.size / 2.0, 0.0)
        }
    }

    /// Like [`Span::intersect`], but a disjoint span collapses to an empty span at the nearest
    /// edge of `bounds`.
    pub fn clip(&self, bounds: Span) -> Span {
        self.intersect(bounds)
            .unwrap_or_else(|| Span::new(bounds.clamp(self.start), 0.0))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_spans(horizontal: Span, vertical: Span) -> Self {
        Self::new(
            horizontal.start,
            vertical.start,
            horizontal.end(),
            vertical.end(),
        )
    }

    pub fn width(&self) -> f64 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Swaps edges so that `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    pub fn horizontal(&self) -> Span {
        Span::new(self.left, self.width())
    }

    pub fn vertical(&self) -> Span {
        Span::new(self.top, self.height())
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let horizontal = self.horizontal().intersect(other.horizontal())?;
        let vertical = self.vertical().intersect(other.vertical())?;
        Some(Rect::from_spans(horizontal, vertical))
    }

    pub fn clip(&self, bounds: &Rect) -> Rect {
        Rect::from_spans(
            self.horizontal().clip(bounds.horizontal()),
            self.vertical().clip(bounds.vertical()),
        )
    }

    pub fn margin(&self, amount: f64) -> Rect {
        Rect::from_spans(self.horizontal().margin(amount), self.vertical().margin(amount))
    }

    pub fn contains(&self, point: Point) -> bool {
        self.horizontal().contains(point.x) && self.vertical().contains(point.y)
    }

    pub fn geom(&self) -> Geom {
        Geom::new(self.left, self.top, self.width(), self.height())
    }
}

impl From<Geom> for Rect {
    fn from(g: Geom) -> Self {
        g.rect()
    }
}

/// Position plus size; the shape layout code works with most of the time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geom {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Geom {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn from_dimensions(dimensions: Dimensions) -> Self {
        Self::new(0.0, 0.0, dimensions.width, dimensions.height)
    }

    pub fn from_spans(horizontal: Span, vertical: Span) -> Self {
        Self::new(horizontal.start, vertical.start, horizontal.size, vertical.size)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn horizontal(&self) -> Span {
        Span::new(self.left, self.width)
    }

    pub fn vertical(&self) -> Span {
        Span::new(self.top, self.height)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right(), self.bottom())
    }

    pub fn contains(&self, point: Point) -> bool {
        self.horizontal().contains(point.x) && self.vertical().contains(point.y)
    }
}

impl From<Rect> for Geom {
    fn from(r: Rect) -> Self {
        r.geom()
    }
}
