use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;
use vdraw_core::color::Rgba;
use vdraw_core::geometry::Point2;
use vdraw_core::scene_shape::{DEFAULT_LAYER_NAME, SceneShape, Style};
use vdraw_core::shape::{Circle, Polygon, PolygonKind, Shape, ShapeKind};

/// 圆半径非正时采用的回退值。
pub const FALLBACK_RADIUS: f64 = 10.0;

fn default_fill() -> String {
    Rgba::CORNFLOWER_BLUE.to_hex()
}

fn default_stroke() -> String {
    Rgba::BLACK.to_hex()
}

fn default_opacity() -> f64 {
    1.0
}

/// 非有限的不透明度会被 JSON 写成 `null`，读回时按缺省处理。
fn opacity_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_opacity))
}

fn default_layer() -> String {
    DEFAULT_LAYER_NAME.to_string()
}

fn default_visible() -> bool {
    true
}

/// 单个图形的扁平持久化记录。缺失字段取默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_fill")]
    pub fill_color: String,
    #[serde(default = "default_stroke")]
    pub stroke_color: String,
    #[serde(default = "default_opacity", deserialize_with = "opacity_or_default")]
    pub opacity: f64,
    #[serde(default = "default_layer")]
    pub layer_name: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    #[serde(default)]
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_x: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_y: Option<Vec<f64>>,
}

impl Default for ShapeRecord {
    fn default() -> Self {
        Self {
            kind: String::new(),
            name: String::new(),
            fill_color: default_fill(),
            stroke_color: default_stroke(),
            opacity: default_opacity(),
            layer_name: default_layer(),
            is_visible: default_visible(),
            center_x: 0.0,
            center_y: 0.0,
            radius: 0.0,
            points_x: None,
            points_y: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("unknown shape kind {0:?}")]
    UnknownKind(String),
    #[error("{kind} record is malformed: {reason}")]
    StructuralMismatch { kind: ShapeKind, reason: String },
}

/// 把场景图形展开成记录，总是成功。
pub fn to_record(shape: &SceneShape) -> ShapeRecord {
    let mut record = ShapeRecord {
        kind: shape.kind().as_str().to_string(),
        name: shape.name.clone(),
        fill_color: shape.style.fill.to_hex(),
        stroke_color: shape.style.stroke.to_hex(),
        opacity: shape.style.opacity,
        layer_name: shape.layer_name.clone(),
        is_visible: shape.is_visible,
        ..ShapeRecord::default()
    };
    match &shape.shape {
        Shape::Circle(circle) => {
            record.center_x = circle.center().x();
            record.center_y = circle.center().y();
            record.radius = circle.radius();
        }
        Shape::Polygon(polygon) => {
            record.points_x = Some(polygon.points().iter().map(|p| p.x()).collect());
            record.points_y = Some(polygon.points().iter().map(|p| p.y()).collect());
        }
    }
    record
}

/// 由记录重建场景图形，得到一个新的标识。
pub fn from_record(record: &ShapeRecord) -> Result<SceneShape, RecordError> {
    let kind = ShapeKind::from_tag(&record.kind)
        .ok_or_else(|| RecordError::UnknownKind(record.kind.clone()))?;

    let shape: Shape = match kind {
        ShapeKind::Circle => {
            let radius = if record.radius > 0.0 && record.radius.is_finite() {
                record.radius
            } else {
                FALLBACK_RADIUS
            };
            Circle::new(Point2::new(record.center_x, record.center_y), radius)
                .map_err(|err| mismatch(kind, err.to_string()))?
                .into()
        }
        ShapeKind::Rectangle => {
            let points = point_pairs(record, kind, 2)?;
            let rectangle = match points.as_slice() {
                [p1, p2, p3, p4, ..] => Polygon::quad(*p1, *p2, *p3, *p4),
                [first, _, opposite] | [first, opposite] => Polygon::rectangle(*first, *opposite),
                _ => return Err(mismatch(kind, "needs at least 2 points".to_string())),
            };
            rectangle.into()
        }
        ShapeKind::Triangle => {
            let points = point_pairs(record, kind, 3)?;
            Polygon::triangle(points[0], points[1], points[2]).into()
        }
        ShapeKind::Line => {
            let points = point_pairs(record, kind, 2)?;
            Polygon::line(points[0], points[1]).into()
        }
        ShapeKind::Polygon => {
            let points = point_pairs(record, kind, 1)?;
            Polygon::new(PolygonKind::Polygon, points)
                .map_err(|err| mismatch(kind, err.to_string()))?
                .into()
        }
    };

    let style = Style::new(
        Rgba::parse_or(&record.fill_color, Rgba::CORNFLOWER_BLUE),
        Rgba::parse_or(&record.stroke_color, Rgba::CORNFLOWER_BLUE),
        record.opacity,
    );
    Ok(SceneShape::new(record.name.clone(), shape)
        .with_style(style)
        .on_layer(record.layer_name.clone(), record.is_visible))
}

fn mismatch(kind: ShapeKind, reason: String) -> RecordError {
    RecordError::StructuralMismatch { kind, reason }
}

/// 把两组坐标数组配对，要求长度一致且不少于 `minimum`。
fn point_pairs(
    record: &ShapeRecord,
    kind: ShapeKind,
    minimum: usize,
) -> Result<Vec<Point2>, RecordError> {
    let xs = record.points_x.as_deref().unwrap_or_default();
    let ys = record.points_y.as_deref().unwrap_or_default();
    if xs.len() != ys.len() {
        return Err(mismatch(
            kind,
            format!("{} x values but {} y values", xs.len(), ys.len()),
        ));
    }
    if xs.len() < minimum {
        return Err(mismatch(
            kind,
            format!("needs at least {minimum} points, got {}", xs.len()),
        ));
    }
    Ok(xs
        .iter()
        .zip(ys)
        .map(|(x, y)| Point2::new(*x, *y))
        .collect())
}

/// 被跳过的记录及原因。
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// 批量导入的结果：成功重建的图形与被跳过的记录。
#[derive(Debug, Default)]
pub struct ImportReport {
    pub shapes: Vec<SceneShape>,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    pub(crate) fn skip(&mut self, index: usize, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(index, reason = %reason, "跳过无法导入的记录");
        self.skipped.push(SkippedRecord { index, reason });
    }

    pub(crate) fn accept(&mut self, index: usize, record: &ShapeRecord) {
        match from_record(record) {
            Ok(shape) => self.shapes.push(shape),
            Err(err) => self.skip(index, err.to_string()),
        }
    }
}

/// 逐条转换，坏记录记入 `skipped` 而不中断导入。
pub fn import_records<I>(records: I) -> ImportReport
where
    I: IntoIterator<Item = ShapeRecord>,
{
    let mut report = ImportReport::default();
    for (index, record) in records.into_iter().enumerate() {
        report.accept(index, &record);
    }
    report
}
