use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;
use crate::geometry::{Bounds2D, Point2, Vector2};

/// 图形种类标签，字符串形式与持久化记录中的 `kind` 字段一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Line,
    Triangle,
    Rectangle,
    Polygon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Circle,
        ShapeKind::Line,
        ShapeKind::Triangle,
        ShapeKind::Rectangle,
        ShapeKind::Polygon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Circle => "Circle",
            ShapeKind::Line => "Line",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polygon => "Polygon",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 多边形族内部的细分：只由顶点数与是否闭合区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolygonKind {
    Line,
    Triangle,
    Rectangle,
    Polygon,
}

impl PolygonKind {
    /// 固定顶点数；通用多边形返回 None。
    pub fn vertex_count(self) -> Option<usize> {
        match self {
            PolygonKind::Line => Some(2),
            PolygonKind::Triangle => Some(3),
            PolygonKind::Rectangle => Some(4),
            PolygonKind::Polygon => None,
        }
    }

    /// 线段是唯一的开放路径。
    #[inline]
    pub fn is_closed(self) -> bool {
        !matches!(self, PolygonKind::Line)
    }
}

impl From<PolygonKind> for ShapeKind {
    fn from(value: PolygonKind) -> Self {
        match value {
            PolygonKind::Line => ShapeKind::Line,
            PolygonKind::Triangle => ShapeKind::Triangle,
            PolygonKind::Rectangle => ShapeKind::Rectangle,
            PolygonKind::Polygon => ShapeKind::Polygon,
        }
    }
}

/// 所有图形共享的变换与序列化操作。
pub trait ShapeGeometry {
    fn bounds(&self) -> Bounds2D;
    fn translate(&mut self, offset: Vector2);
    /// 以包围盒中心为枢轴的等比缩放；`ratio` 为 0 或非有限值时报错且不修改图形。
    fn scale(&mut self, ratio: f64) -> Result<(), GeometryError>;
    /// 绕任意枢轴旋转。撤销旋转时使用执行时记录下的枢轴。
    fn rotate_about(&mut self, pivot: Point2, angle_degrees: f64);
    fn mirror_x(&mut self);
    fn mirror_y(&mut self);
    fn path_data(&self) -> String;

    /// 包围盒中心（不是面积质心）。
    fn centroid(&self) -> Point2 {
        self.bounds().center()
    }

    /// 绕包围盒中心旋转，角度单位为度。
    fn rotate(&mut self, angle_degrees: f64) {
        let pivot = self.centroid();
        self.rotate_about(pivot, angle_degrees);
    }
}

fn validate_ratio(ratio: f64) -> Result<(), GeometryError> {
    if ratio == 0.0 {
        return Err(GeometryError::InvalidArgument(
            "scale ratio must not be zero".to_string(),
        ));
    }
    if !ratio.is_finite() {
        return Err(GeometryError::InvalidArgument(format!(
            "scale ratio must be finite, got {ratio}"
        )));
    }
    Ok(())
}

/// 两位小数、与区域设置无关的数值格式，`-0.00` 归一为 `0.00`。
fn fixed(value: f64) -> String {
    let text = format!("{value:.2}");
    if text == "-0.00" {
        "0.00".to_string()
    } else {
        text
    }
}

fn coordinate(point: Point2) -> String {
    format!("{},{}", fixed(point.x()), fixed(point.y()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    center: Point2,
    radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Result<Self, GeometryError> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        Ok(Self { center, radius })
    }

    #[inline]
    pub(crate) fn new_unchecked(center: Point2, radius: f64) -> Self {
        debug_assert!(radius > 0.0);
        Self { center, radius }
    }

    #[inline]
    pub fn center(&self) -> Point2 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl ShapeGeometry for Circle {
    fn bounds(&self) -> Bounds2D {
        let r = Vector2::new(self.radius, self.radius);
        Bounds2D::new(self.center.translate(-r), self.center.translate(r))
    }

    fn translate(&mut self, offset: Vector2) {
        self.center = self.center.translate(offset);
    }

    fn scale(&mut self, ratio: f64) -> Result<(), GeometryError> {
        validate_ratio(ratio)?;
        // 关于自身圆心的反演是恒等变换，只保留幅值。
        let radius = self.radius * ratio.abs();
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "scaling radius {} by {ratio} leaves no positive finite radius",
                self.radius
            )));
        }
        self.radius = radius;
        Ok(())
    }

    /// 只有圆心随枢轴转动；以自身圆心为枢轴时保持不变。
    fn rotate_about(&mut self, pivot: Point2, angle_degrees: f64) {
        if pivot != self.center {
            self.center = self.center.rotated_about(pivot, angle_degrees);
        }
    }

    fn mirror_x(&mut self) {}

    fn mirror_y(&mut self) {}

    fn path_data(&self) -> String {
        let r = fixed(self.radius);
        let cy = fixed(self.center.y());
        let left = fixed(self.center.x() - self.radius);
        let right = fixed(self.center.x() + self.radius);
        format!("M {left},{cy} A {r},{r},0,1,0,{right},{cy} A {r},{r},0,1,0,{left},{cy} Z")
    }
}

/// 多边形族（线段、三角形、矩形、通用多边形）。顶点数在构造后固定。
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    kind: PolygonKind,
    points: Vec<Point2>,
}

impl Polygon {
    pub fn new(kind: PolygonKind, points: Vec<Point2>) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::InvalidArgument(
                "point sequence must not be empty".to_string(),
            ));
        }
        if let Some(expected) = kind.vertex_count() {
            if points.len() != expected {
                return Err(GeometryError::VertexCount {
                    kind: kind.into(),
                    expected,
                    actual: points.len(),
                });
            }
        }
        Ok(Self { kind, points })
    }

    pub fn line(start: Point2, end: Point2) -> Self {
        Self {
            kind: PolygonKind::Line,
            points: vec![start, end],
        }
    }

    pub fn triangle(a: Point2, b: Point2, c: Point2) -> Self {
        Self {
            kind: PolygonKind::Triangle,
            points: vec![a, b, c],
        }
    }

    /// 由两个对角点构造轴对齐矩形，顶点顺序为左上、右上、右下、左下（y 轴向下）。
    pub fn rectangle(first: Point2, second: Point2) -> Self {
        let min = first.as_vec2().min(second.as_vec2());
        let max = first.as_vec2().max(second.as_vec2());
        Self::quad(
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        )
    }

    /// 任意四边形（例如旋转后的矩形），保持给定顶点顺序。
    pub fn quad(p1: Point2, p2: Point2, p3: Point2, p4: Point2) -> Self {
        Self {
            kind: PolygonKind::Rectangle,
            points: vec![p1, p2, p3, p4],
        }
    }

    #[inline]
    pub fn kind(&self) -> PolygonKind {
        self.kind
    }

    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.kind.is_closed()
    }

    fn map_points(&mut self, f: impl Fn(Point2) -> Point2) {
        for point in &mut self.points {
            *point = f(*point);
        }
    }
}

impl ShapeGeometry for Polygon {
    fn bounds(&self) -> Bounds2D {
        // 构造时保证非空。
        Bounds2D::from_points(self.points.iter().copied()).unwrap_or_else(|| {
            Bounds2D::new(Point2::new(0.0, 0.0), Point2::new(0.0, 0.0))
        })
    }

    fn translate(&mut self, offset: Vector2) {
        self.map_points(|p| p.translate(offset));
    }

    fn scale(&mut self, ratio: f64) -> Result<(), GeometryError> {
        validate_ratio(ratio)?;
        let pivot = self.centroid();
        self.map_points(|p| p.scaled_about(pivot, ratio));
        Ok(())
    }

    fn rotate_about(&mut self, pivot: Point2, angle_degrees: f64) {
        self.map_points(|p| p.rotated_about(pivot, angle_degrees));
    }

    fn mirror_x(&mut self) {
        let pivot = self.centroid();
        self.map_points(|p| p.mirrored_x_about(pivot));
    }

    fn mirror_y(&mut self) {
        let pivot = self.centroid();
        self.map_points(|p| p.mirrored_y_about(pivot));
    }

    fn path_data(&self) -> String {
        let mut segments = Vec::with_capacity(self.points.len() + 1);
        for (index, point) in self.points.iter().enumerate() {
            let command = if index == 0 { "M" } else { "L" };
            segments.push(format!("{command} {}", coordinate(*point)));
        }
        if self.is_closed() {
            segments.push("Z".to_string());
        }
        segments.join(" ")
    }
}

/// 场景中可出现的图形：圆或多边形族。
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Polygon(polygon) => polygon.kind().into(),
        }
    }

    /// 定义图形的点：圆返回圆心，多边形返回全部顶点。
    pub fn defining_points(&self) -> Vec<Point2> {
        match self {
            Shape::Circle(circle) => vec![circle.center()],
            Shape::Polygon(polygon) => polygon.points().to_vec(),
        }
    }

    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            Shape::Circle(circle) => Some(circle),
            Shape::Polygon(_) => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Shape::Circle(_) => None,
            Shape::Polygon(polygon) => Some(polygon),
        }
    }
}

impl ShapeGeometry for Shape {
    fn bounds(&self) -> Bounds2D {
        match self {
            Shape::Circle(s) => s.bounds(),
            Shape::Polygon(s) => s.bounds(),
        }
    }

    fn translate(&mut self, offset: Vector2) {
        match self {
            Shape::Circle(s) => s.translate(offset),
            Shape::Polygon(s) => s.translate(offset),
        }
    }

    fn scale(&mut self, ratio: f64) -> Result<(), GeometryError> {
        match self {
            Shape::Circle(s) => s.scale(ratio),
            Shape::Polygon(s) => s.scale(ratio),
        }
    }

    fn rotate_about(&mut self, pivot: Point2, angle_degrees: f64) {
        match self {
            Shape::Circle(s) => s.rotate_about(pivot, angle_degrees),
            Shape::Polygon(s) => s.rotate_about(pivot, angle_degrees),
        }
    }

    fn mirror_x(&mut self) {
        match self {
            Shape::Circle(s) => s.mirror_x(),
            Shape::Polygon(s) => s.mirror_x(),
        }
    }

    fn mirror_y(&mut self) {
        match self {
            Shape::Circle(s) => s.mirror_y(),
            Shape::Polygon(s) => s.mirror_y(),
        }
    }

    fn path_data(&self) -> String {
        match self {
            Shape::Circle(s) => s.path_data(),
            Shape::Polygon(s) => s.path_data(),
        }
    }
}

impl From<Circle> for Shape {
    fn from(value: Circle) -> Self {
        Shape::Circle(value)
    }
}

impl From<Polygon> for Shape {
    fn from(value: Polygon) -> Self {
        Shape::Polygon(value)
    }
}
