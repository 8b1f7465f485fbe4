use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry;

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in image coordinates (inclusive of both edges)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box containing every point. `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

/// Closed boundary of a connected foreground region.
///
/// Points are kept exactly as traced; simplification produces a separate
/// vertex list (see [`Contour::approximate`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed polygon area (shoelace over the boundary points)
    pub fn area(&self) -> f64 {
        geometry::contour_area(&self.points)
    }

    /// Length of the closed boundary
    pub fn perimeter(&self) -> f64 {
        geometry::arc_length(&self.points, true)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.points)
    }

    /// Centroid from the raw moments; `None` when the area is zero
    pub fn center(&self) -> Option<Point> {
        geometry::contour_center(&self.points)
    }

    /// Douglas-Peucker simplification of the closed boundary
    pub fn approximate(&self, epsilon: f64) -> Vec<Point> {
        geometry::approximate_closed_polygon(&self.points, epsilon)
    }
}

/// Shapes a detection request can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    All,
    Circle,
    HalfCircle,
    Square,
    Rectangle,
    Triangle,
    Unknown,
}

impl ShapeKind {
    pub const VARIANTS: [ShapeKind; 7] = [
        ShapeKind::All,
        ShapeKind::Circle,
        ShapeKind::HalfCircle,
        ShapeKind::Square,
        ShapeKind::Rectangle,
        ShapeKind::Triangle,
        ShapeKind::Unknown,
    ];

    /// Command token for this shape
    pub fn token(self) -> &'static str {
        match self {
            ShapeKind::All => "alles",
            ShapeKind::Circle => "cirkel",
            ShapeKind::HalfCircle => "halfcirkel",
            ShapeKind::Square => "vierkant",
            ShapeKind::Rectangle => "rechthoek",
            ShapeKind::Triangle => "driehoek",
            ShapeKind::Unknown => "onbekend",
        }
    }

    /// Case-sensitive lookup; anything unrecognised is `Unknown`
    pub fn from_token(token: &str) -> Self {
        Self::VARIANTS
            .into_iter()
            .find(|kind| kind.token() == token)
            .unwrap_or(ShapeKind::Unknown)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Colors a detection request can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorKind {
    Red,
    Green,
    Blue,
    Black,
    Yellow,
    White,
    Unknown,
}

impl ColorKind {
    pub const VARIANTS: [ColorKind; 7] = [
        ColorKind::Red,
        ColorKind::Green,
        ColorKind::Blue,
        ColorKind::Black,
        ColorKind::Yellow,
        ColorKind::White,
        ColorKind::Unknown,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ColorKind::Red => "rood",
            ColorKind::Green => "groen",
            ColorKind::Blue => "blauw",
            ColorKind::Black => "zwart",
            ColorKind::Yellow => "geel",
            ColorKind::White => "wit",
            ColorKind::Unknown => "onbekend",
        }
    }

    pub fn from_token(token: &str) -> Self {
        Self::VARIANTS
            .into_iter()
            .find(|kind| kind.token() == token)
            .unwrap_or(ColorKind::Unknown)
    }
}

impl fmt::Display for ColorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One accepted contour of a classification pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub kind: ShapeKind,
    pub center: Point,
    pub area: f64,
    pub bounding_box: BoundingBox,
    /// Vertices of the approximated polygon
    pub outline: Vec<Point>,
}
