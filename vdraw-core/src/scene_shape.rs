use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::shape::{Shape, ShapeKind};

/// 新建图形默认所属的图层。
pub const DEFAULT_LAYER_NAME: &str = "Layer 1";

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// 场景图形的身份标识。几何完全相同的两个图形依然拥有不同的标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u64);

impl ShapeId {
    /// 分配一个进程内唯一的新标识。
    pub fn allocate() -> Self {
        Self(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 提供原始数值，便于日志输出。
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Rgba,
    pub stroke: Rgba,
    /// 不做截断，由调用方决定取值范围。
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Rgba::CORNFLOWER_BLUE,
            stroke: Rgba::BLACK,
            opacity: 1.0,
        }
    }
}

impl Style {
    #[inline]
    pub fn new(fill: Rgba, stroke: Rgba, opacity: f64) -> Self {
        Self {
            fill,
            stroke,
            opacity,
        }
    }
}

/// 放置在场景中的图形：几何、样式与图层归属（按名称弱关联）。
///
/// `Clone` 保留标识，克隆体被视为同一图形的快照。
#[derive(Debug, Clone, PartialEq)]
pub struct SceneShape {
    id: ShapeId,
    pub name: String,
    pub shape: Shape,
    pub style: Style,
    pub layer_name: String,
    pub is_visible: bool,
}

impl SceneShape {
    pub fn new(name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self {
            id: ShapeId::allocate(),
            name: name.into(),
            shape: shape.into(),
            style: Style::default(),
            layer_name: DEFAULT_LAYER_NAME.to_string(),
            is_visible: true,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn on_layer(mut self, layer_name: impl Into<String>, is_visible: bool) -> Self {
        self.layer_name = layer_name.into();
        self.is_visible = is_visible;
        self
    }

    #[inline]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;
    use crate::shape::Polygon;

    #[test]
    fn identical_geometry_yields_distinct_ids() {
        let line = Polygon::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let a = SceneShape::new("Line 1", line.clone());
        let b = SceneShape::new("Line 1", line);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn clone_keeps_identity() {
        let shape = SceneShape::new(
            "Rectangle 1",
            Polygon::rectangle(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)),
        );
        let snapshot = shape.clone();
        assert_eq!(snapshot.id(), shape.id());
        assert_eq!(snapshot, shape);
    }

    #[test]
    fn defaults_match_new_shape_conventions() {
        let shape = SceneShape::new(
            "Line 1",
            Polygon::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
        );
        assert_eq!(shape.style.fill.to_hex(), "#FF6495ED");
        assert_eq!(shape.style.stroke.to_hex(), "#FF000000");
        assert!((shape.style.opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(shape.layer_name, DEFAULT_LAYER_NAME);
        assert!(shape.is_visible);
        assert_eq!(shape.kind(), ShapeKind::Line);
    }

    #[test]
    fn builders_set_layer_and_style() {
        let style = Style::new(Rgba::WHITE, Rgba::rgb(255, 0, 0), 0.25);
        let shape = SceneShape::new(
            "Line 2",
            Polygon::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
        )
        .with_style(style)
        .on_layer("Layer 2", false);
        assert_eq!(shape.style, style);
        assert_eq!(shape.layer_name, "Layer 2");
        assert!(!shape.is_visible);
    }
}
