use std::collections::HashMap;

use crate::errors::GeometryError;
use crate::geometry::Point2;
use crate::shape::{Circle, Polygon, Shape, ShapeKind};

/// 默认最小尺寸，避免拖拽过短时生成退化图形。
pub const DEFAULT_MIN_SIZE: f64 = 5.0;

/// 绘图工具，决定由两个锚点构造哪种图形。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTool {
    Circle,
    Rectangle,
    Triangle,
    Line,
}

impl ShapeTool {
    pub fn kind(self) -> ShapeKind {
        match self {
            ShapeTool::Circle => ShapeKind::Circle,
            ShapeTool::Rectangle => ShapeKind::Rectangle,
            ShapeTool::Triangle => ShapeKind::Triangle,
            ShapeTool::Line => ShapeKind::Line,
        }
    }
}

/// 由两个锚点构造图形，并施加最小尺寸下限。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeFactory {
    min_size: f64,
}

impl Default for ShapeFactory {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

impl ShapeFactory {
    pub fn new(min_size: f64) -> Result<Self, GeometryError> {
        if !(min_size > 0.0) || !min_size.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "minimum shape size must be positive, got {min_size}"
            )));
        }
        Ok(Self { min_size })
    }

    #[inline]
    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn create(&self, tool: ShapeTool, p1: Point2, p2: Point2) -> Shape {
        match tool {
            ShapeTool::Circle => self.circle(p1, p2).into(),
            ShapeTool::Rectangle => self.rectangle(p1, p2).into(),
            ShapeTool::Triangle => self.triangle(p1, p2).into(),
            ShapeTool::Line => self.line(p1, p2).into(),
        }
    }

    /// 半径取 `max(min_size, |edge - center|)`。
    pub fn circle(&self, center: Point2, edge: Point2) -> Circle {
        let radius = self.min_size.max(center.distance_to(edge));
        Circle::new_unchecked(center, radius)
    }

    pub fn rectangle(&self, p1: Point2, p2: Point2) -> Polygon {
        let x2 = if (p2.x() - p1.x()).abs() < self.min_size { p1.x() + self.min_size } else { p2.x() };
        let y2 = if (p2.y() - p1.y()).abs() < self.min_size { p1.y() + self.min_size } else { p2.y() };
        Polygon::rectangle(p1, Point2::new(x2, y2))
    }

    /// 内接于包围盒的等腰三角形：顶点在上边中点，底边贴住下边。
    pub fn triangle(&self, p1: Point2, p2: Point2) -> Polygon {
        let x1 = p1.x().min(p2.x());
        let y1 = p1.y().min(p2.y());
        let mut x2 = p1.x().max(p2.x());
        let mut y2 = p1.y().max(p2.y());
        if x2 - x1 < self.min_size {
            x2 = x1 + self.min_size;
        }
        if y2 - y1 < self.min_size {
            y2 = y1 + self.min_size;
        }
        Polygon::triangle(
            Point2::new((x1 + x2) / 2.0, y1),
            Point2::new(x1, y2),
            Point2::new(x2, y2),
        )
    }

    pub fn line(&self, p1: Point2, p2: Point2) -> Polygon {
        let end = if p1.manhattan_distance_to(p2) < self.min_size {
            Point2::new(p1.x() + self.min_size, p1.y())
        } else {
            p2
        };
        Polygon::line(p1, end)
    }
}

/// 按图形种类分别计数的命名器，生成 "Circle 1"、"Rectangle 2" 这类名称。
#[derive(Debug, Default, Clone)]
pub struct ShapeNamer {
    counters: HashMap<ShapeKind, u32>,
}

impl ShapeNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self, kind: ShapeKind) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        format!("{kind} {counter}")
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeGeometry;

    #[test]
    fn degenerate_circle_gets_min_radius() {
        let factory = ShapeFactory::default();
        let circle = factory.circle(Point2::new(0.0, 0.0), Point2::new(0.0, 0.0));
        assert!(circle.radius() >= DEFAULT_MIN_SIZE);

        let big = factory.circle(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert!((big.radius() - 5.0).abs() < f64::EPSILON);
        let bigger = factory.circle(Point2::new(0.0, 0.0), Point2::new(6.0, 8.0));
        assert!((bigger.radius() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn narrow_rectangle_is_widened_from_first_anchor() {
        let factory = ShapeFactory::default();
        let rect = factory.rectangle(Point2::new(10.0, 10.0), Point2::new(12.0, 30.0));
        assert_eq!(
            rect.points(),
            &[
                Point2::new(10.0, 10.0),
                Point2::new(15.0, 10.0),
                Point2::new(15.0, 30.0),
                Point2::new(10.0, 30.0),
            ]
        );
    }

    #[test]
    fn triangle_is_inscribed_in_anchor_box() {
        let factory = ShapeFactory::default();
        let tri = factory.triangle(Point2::new(20.0, 40.0), Point2::new(0.0, 0.0));
        assert_eq!(
            tri.points(),
            &[
                Point2::new(10.0, 0.0),
                Point2::new(0.0, 40.0),
                Point2::new(20.0, 40.0),
            ]
        );

        let flat = factory.triangle(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let bounds = flat.bounds();
        assert!((bounds.width() - DEFAULT_MIN_SIZE).abs() < f64::EPSILON);
        assert!((bounds.height() - DEFAULT_MIN_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn short_line_extends_horizontally() {
        let factory = ShapeFactory::default();
        let line = factory.line(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0));
        assert_eq!(line.points(), &[Point2::new(1.0, 1.0), Point2::new(6.0, 1.0)]);

        let long = factory.line(Point2::new(0.0, 0.0), Point2::new(3.0, 3.0));
        assert_eq!(long.points()[1], Point2::new(3.0, 3.0));
    }

    #[test]
    fn custom_min_size_is_validated() {
        assert!(ShapeFactory::new(0.0).is_err());
        assert!(ShapeFactory::new(-1.0).is_err());
        assert!(ShapeFactory::new(f64::NAN).is_err());

        let factory = ShapeFactory::new(12.0).expect("positive size");
        let circle = factory.circle(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert!((circle.radius() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn create_dispatches_on_tool() {
        let factory = ShapeFactory::default();
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(20.0, 20.0);
        for tool in [ShapeTool::Circle, ShapeTool::Rectangle, ShapeTool::Triangle, ShapeTool::Line] {
            assert_eq!(factory.create(tool, a, b).kind(), tool.kind());
        }
    }

    #[test]
    fn namer_counts_per_kind_and_resets() {
        let mut namer = ShapeNamer::new();
        assert_eq!(namer.next_name(ShapeKind::Circle), "Circle 1");
        assert_eq!(namer.next_name(ShapeKind::Circle), "Circle 2");
        assert_eq!(namer.next_name(ShapeKind::Rectangle), "Rectangle 1");
        namer.reset();
        assert_eq!(namer.next_name(ShapeKind::Circle), "Circle 1");
    }
}
