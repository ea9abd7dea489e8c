pub mod color;
pub mod factory;
pub mod scene_shape;
pub mod shape;

pub mod errors {
    use thiserror::Error;

    use crate::shape::ShapeKind;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum GeometryError {
        #[error("invalid argument: {0}")]
        InvalidArgument(String),
        #[error("{kind} requires {expected} vertices, got {actual}")]
        VertexCount {
            kind: ShapeKind,
            expected: usize,
            actual: usize,
        },
        #[error("invalid color literal: {0:?}")]
        ColorParse(String),
    }
}

pub mod geometry {
    use std::ops::Neg;

    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn distance_to(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        /// 曼哈顿距离，工厂用它判断线段是否过短。
        #[inline]
        pub fn manhattan_distance_to(self, other: Point2) -> f64 {
            (other.0.x - self.0.x).abs() + (other.0.y - self.0.y).abs()
        }

        /// 以 `pivot` 为中心按比例缩放，负比例即关于 `pivot` 的点反演。
        #[inline]
        pub fn scaled_about(self, pivot: Point2, ratio: f64) -> Self {
            Self(pivot.0 + (self.0 - pivot.0) * ratio)
        }

        /// 绕 `pivot` 旋转，角度单位为度，正方向为数学正方向。
        pub fn rotated_about(self, pivot: Point2, angle_degrees: f64) -> Self {
            let (sin, cos) = angle_degrees.to_radians().sin_cos();
            let dx = self.0.x - pivot.0.x;
            let dy = self.0.y - pivot.0.y;
            Self::new(
                pivot.0.x + dx * cos - dy * sin,
                pivot.0.y + dx * sin + dy * cos,
            )
        }

        /// 关于过 `pivot` 的竖直线镜像（左右翻转）。
        #[inline]
        pub fn mirrored_x_about(self, pivot: Point2) -> Self {
            Self::new(pivot.0.x - (self.0.x - pivot.0.x), self.0.y)
        }

        /// 关于过 `pivot` 的水平线镜像（上下翻转）。
        #[inline]
        pub fn mirrored_y_about(self, pivot: Point2) -> Self {
            Self::new(self.0.x, pivot.0.y - (self.0.y - pivot.0.y))
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量，用作平移量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl Neg for Vector2 {
        type Output = Vector2;

        fn neg(self) -> Self::Output {
            Vector2(-self.0)
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框。其中心点即图形变换时使用的枢轴。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        /// 由点集构造包围盒，点集为空时返回 None。
        pub fn from_points<I>(points: I) -> Option<Self>
        where
            I: IntoIterator<Item = Point2>,
        {
            let mut bounds = Self::empty();
            for point in points {
                bounds.include_point(point);
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn rotation_about_pivot_matches_quarter_turn() {
            let rotated = Point2::new(2.0, 1.0).rotated_about(Point2::new(1.0, 1.0), 90.0);
            assert!((rotated.x() - 1.0).abs() < 1e-12);
            assert!((rotated.y() - 2.0).abs() < 1e-12);
        }

        #[test]
        fn scaling_with_negative_ratio_inverts_through_pivot() {
            let pivot = Point2::new(5.0, 5.0);
            let inverted = Point2::new(7.0, 4.0).scaled_about(pivot, -1.0);
            assert_eq!(inverted, Point2::new(3.0, 6.0));
        }

        #[test]
        fn mirrors_reflect_across_pivot_lines() {
            let pivot = Point2::new(0.0, 0.0);
            let point = Point2::new(3.0, -2.0);
            assert_eq!(point.mirrored_x_about(pivot), Point2::new(-3.0, -2.0));
            assert_eq!(point.mirrored_y_about(pivot), Point2::new(3.0, 2.0));
        }

        #[test]
        fn bounds_from_points_tracks_extent() {
            let bounds = Bounds2D::from_points([
                Point2::new(1.0, 4.0),
                Point2::new(-2.0, 0.5),
                Point2::new(3.0, 2.0),
            ])
            .expect("non-empty point set");
            assert_eq!(bounds.min(), Point2::new(-2.0, 0.5));
            assert_eq!(bounds.max(), Point2::new(3.0, 4.0));
            assert!((bounds.width() - 5.0).abs() < f64::EPSILON);
            assert!((bounds.height() - 3.5).abs() < f64::EPSILON);
            assert_eq!(bounds.center(), Point2::new(0.5, 2.25));

            assert!(Bounds2D::from_points(std::iter::empty()).is_none());
        }

        #[test]
        fn manhattan_distance_sums_axis_deltas() {
            let a = Point2::new(1.0, 1.0);
            let b = Point2::new(-2.0, 3.0);
            assert!((a.manhattan_distance_to(b) - 5.0).abs() < f64::EPSILON);
            assert!((a.distance_to(Point2::new(4.0, 5.0)) - 5.0).abs() < f64::EPSILON);
        }
    }
}
