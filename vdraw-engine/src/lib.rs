pub mod collection;
pub mod command;
pub mod layers;
pub mod session;

pub mod errors {
    use thiserror::Error;
    use vdraw_core::errors::GeometryError;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("shape with id {0} not found")]
        ShapeNotFound(u64),
        #[error(transparent)]
        Geometry(#[from] GeometryError),
        #[error("index {index} out of bounds for collection of length {len}")]
        IndexOutOfBounds { index: usize, len: usize },
        #[error(transparent)]
        Layer(#[from] LayerError),
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum LayerError {
        #[error("layer {0:?} already exists")]
        DuplicateName(String),
        #[error("layer {0:?} not found")]
        LayerNotFound(String),
        #[error("cannot remove the last remaining layer")]
        LastLayer,
    }
}

pub type Result<T, E = errors::EngineError> = std::result::Result<T, E>;

pub mod scene {
    use tracing::debug;
    use vdraw_core::geometry::Vector2;
    use vdraw_core::scene_shape::{SceneShape, ShapeId, Style};

    use crate::Result;
    use crate::collection::ShapeCollection;
    use crate::command::{
        AddShapeCommand, ChangeStyleCommand, CommandContext, CommandHistory,
        DeleteShapeCommand, EditCommand, MirrorAxis, MirrorShapeCommand, MoveShapeCommand,
        RotateShapeCommand, ScaleShapeCommand,
    };
    use crate::errors::EngineError;

    /// 把编辑请求包装成命令并交给历史栈执行。图形集合由调用方持有，每次调用时传入。
    #[derive(Debug, Default)]
    pub struct SceneManager {
        history: CommandHistory,
    }

    impl SceneManager {
        pub fn new() -> Self {
            Self::default()
        }

        /// `max_depth` 为 0 表示不限撤销深度。
        pub fn with_max_depth(max_depth: usize) -> Self {
            Self {
                history: CommandHistory::with_max_depth(max_depth),
            }
        }

        #[inline]
        pub fn history(&self) -> &CommandHistory {
            &self.history
        }

        pub fn add<C: ShapeCollection>(&mut self, shapes: &mut C, shape: SceneShape) -> Result<ShapeId> {
            let id = shape.id();
            debug!(shape = id.get(), name = %shape.name, "添加图形");
            self.run(shapes, AddShapeCommand::new(shape))?;
            Ok(id)
        }

        pub fn delete<C: ShapeCollection>(&mut self, shapes: &mut C, id: ShapeId) -> Result<()> {
            self.run(shapes, DeleteShapeCommand::new(id))
        }

        pub fn move_shape<C: ShapeCollection>(
            &mut self,
            shapes: &mut C,
            id: ShapeId,
            offset: Vector2,
        ) -> Result<()> {
            self.run(shapes, MoveShapeCommand::new(id, offset))
        }

        pub fn rotate<C: ShapeCollection>(
            &mut self,
            shapes: &mut C,
            id: ShapeId,
            angle_degrees: f64,
        ) -> Result<()> {
            self.run(shapes, RotateShapeCommand::new(id, angle_degrees))
        }

        pub fn scale<C: ShapeCollection>(&mut self, shapes: &mut C, id: ShapeId, ratio: f64) -> Result<()> {
            self.run(shapes, ScaleShapeCommand::new(id, ratio))
        }

        pub fn change_style<C: ShapeCollection>(
            &mut self,
            shapes: &mut C,
            id: ShapeId,
            style: Style,
        ) -> Result<()> {
            self.run(shapes, ChangeStyleCommand::new(id, style))
        }

        /// 只修改不透明度，颜色沿用当前值。
        pub fn set_opacity<C: ShapeCollection>(
            &mut self,
            shapes: &mut C,
            id: ShapeId,
            opacity: f64,
        ) -> Result<()> {
            let current = shapes
                .find(id)
                .ok_or(EngineError::ShapeNotFound(id.get()))?
                .style;
            let style = Style { opacity, ..current };
            self.change_style(shapes, id, style)
        }

        pub fn mirror_x<C: ShapeCollection>(&mut self, shapes: &mut C, id: ShapeId) -> Result<()> {
            self.run(shapes, MirrorShapeCommand::new(id, MirrorAxis::X))
        }

        pub fn mirror_y<C: ShapeCollection>(&mut self, shapes: &mut C, id: ShapeId) -> Result<()> {
            self.run(shapes, MirrorShapeCommand::new(id, MirrorAxis::Y))
        }

        pub fn undo<C: ShapeCollection>(&mut self, shapes: &mut C) -> Result<bool> {
            let mut ctx = CommandContext::new(shapes);
            self.history.undo(&mut ctx)
        }

        pub fn redo<C: ShapeCollection>(&mut self, shapes: &mut C) -> Result<bool> {
            let mut ctx = CommandContext::new(shapes);
            self.history.redo(&mut ctx)
        }

        #[inline]
        pub fn can_undo(&self) -> bool {
            self.history.can_undo()
        }

        #[inline]
        pub fn can_redo(&self) -> bool {
            self.history.can_redo()
        }

        pub fn clear_history(&mut self) {
            self.history.clear();
        }

        fn run<C, K>(&mut self, shapes: &mut C, command: K) -> Result<()>
        where
            C: ShapeCollection,
            K: EditCommand + 'static,
        {
            let mut ctx = CommandContext::new(shapes);
            self.history.run(Box::new(command), &mut ctx)
        }
    }

    #[cfg(test)]
    mod tests {
        use vdraw_core::color::Rgba;
        use vdraw_core::geometry::Point2;
        use vdraw_core::shape::{Circle, Polygon};

        use super::*;
        use crate::collection::ShapeList;

        fn rect(name: &str) -> SceneShape {
            SceneShape::new(
                name,
                Polygon::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)),
            )
        }

        #[test]
        fn verbs_route_through_history() {
            let mut shapes = ShapeList::new();
            let mut scene = SceneManager::new();
            assert!(!scene.can_undo());

            let id = scene.add(&mut shapes, rect("A")).expect("add");
            scene
                .move_shape(&mut shapes, id, Vector2::new(5.0, 0.0))
                .expect("move");
            scene.rotate(&mut shapes, id, 90.0).expect("rotate");
            scene.scale(&mut shapes, id, 2.0).expect("scale");
            scene.mirror_y(&mut shapes, id).expect("mirror");
            assert_eq!(scene.history().undo_depth(), 5);

            while scene.undo(&mut shapes).expect("undo") {}
            assert!(shapes.is_empty());
            assert!(scene.can_redo());
            assert!(!scene.can_undo());

            while scene.redo(&mut shapes).expect("redo") {}
            assert_eq!(shapes.len(), 1);
            assert_eq!(scene.history().redo_depth(), 0);
        }

        #[test]
        fn set_opacity_keeps_colors() {
            let mut shapes = ShapeList::new();
            let mut scene = SceneManager::new();
            let shape = rect("A").with_style(Style::new(Rgba::WHITE, Rgba::BLACK, 1.0));
            let id = scene.add(&mut shapes, shape).unwrap();

            scene.set_opacity(&mut shapes, id, 0.3).unwrap();
            let style = shapes.find(id).unwrap().style;
            assert_eq!(style.fill, Rgba::WHITE);
            assert!((style.opacity - 0.3).abs() < f64::EPSILON);

            scene.undo(&mut shapes).unwrap();
            assert!((shapes.find(id).unwrap().style.opacity - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn unknown_shape_is_reported() {
            let mut shapes = ShapeList::new();
            let mut scene = SceneManager::new();
            let stray = rect("stray");
            let err = scene.delete(&mut shapes, stray.id()).unwrap_err();
            assert!(matches!(err, EngineError::ShapeNotFound(raw) if raw == stray.id().get()));
            let err = scene.set_opacity(&mut shapes, stray.id(), 0.5).unwrap_err();
            assert!(matches!(err, EngineError::ShapeNotFound(_)));
            assert!(!scene.can_undo());
        }

        #[test]
        fn scaling_circle_by_negative_ratio_is_undoable() {
            let mut shapes = ShapeList::new();
            let mut scene = SceneManager::new();
            let circle = SceneShape::new(
                "Circle 1",
                Circle::new(Point2::new(0.0, 0.0), 4.0).unwrap(),
            );
            let id = scene.add(&mut shapes, circle).unwrap();
            scene.scale(&mut shapes, id, -2.0).unwrap();
            let radius = shapes.find(id).unwrap().shape.as_circle().unwrap().radius();
            assert!((radius - 8.0).abs() < 1e-12);

            scene.undo(&mut shapes).unwrap();
            let radius = shapes.find(id).unwrap().shape.as_circle().unwrap().radius();
            assert!((radius - 4.0).abs() < 1e-12);
        }

        #[test]
        fn clear_history_drops_both_stacks() {
            let mut shapes = ShapeList::new();
            let mut scene = SceneManager::with_max_depth(10);
            scene.add(&mut shapes, rect("A")).unwrap();
            scene.add(&mut shapes, rect("B")).unwrap();
            scene.undo(&mut shapes).unwrap();
            scene.clear_history();
            assert!(!scene.can_undo());
            assert!(!scene.can_redo());
            assert_eq!(scene.history().max_depth(), 10);
            assert_eq!(shapes.len(), 1);
        }
    }
}
