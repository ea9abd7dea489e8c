use std::collections::VecDeque;
use std::fmt;

use tracing::debug;
use vdraw_core::geometry::{Point2, Vector2};
use vdraw_core::scene_shape::{SceneShape, ShapeId, Style};
use vdraw_core::shape::ShapeGeometry;

use crate::Result;
use crate::collection::ShapeCollection;
use crate::errors::EngineError;

/// 命令执行期间借用的上下文。
pub struct CommandContext<'a> {
    pub shapes: &'a mut dyn ShapeCollection,
}

impl<'a> CommandContext<'a> {
    #[inline]
    pub fn new(shapes: &'a mut dyn ShapeCollection) -> Self {
        Self { shapes }
    }

    fn shape_mut(&mut self, id: ShapeId) -> Result<&mut SceneShape> {
        self.shapes
            .find_mut(id)
            .ok_or(EngineError::ShapeNotFound(id.get()))
    }
}

/// 可撤销的编辑操作。`undo` 必须精确抵消 `execute` 的效果。
///
/// 执行失败时命令不得修改集合。
pub trait EditCommand: fmt::Debug {
    fn name(&self) -> &'static str;
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()>;
    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()>;
}

/// 把新图形追加到集合末尾。撤销后图形暂存在命令中。
#[derive(Debug)]
pub struct AddShapeCommand {
    id: ShapeId,
    detached: Option<SceneShape>,
}

impl AddShapeCommand {
    pub fn new(shape: SceneShape) -> Self {
        Self {
            id: shape.id(),
            detached: Some(shape),
        }
    }

    #[inline]
    pub fn shape_id(&self) -> ShapeId {
        self.id
    }
}

impl EditCommand for AddShapeCommand {
    fn name(&self) -> &'static str {
        "add_shape"
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let shape = self
            .detached
            .take()
            .ok_or(EngineError::ShapeNotFound(self.id.get()))?;
        ctx.shapes.push(shape);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let (_, shape) = ctx.shapes.remove(self.id)?;
        self.detached = Some(shape);
        Ok(())
    }
}

/// 删除图形，执行时记录原位置，撤销时插回同一位置。
#[derive(Debug)]
pub struct DeleteShapeCommand {
    id: ShapeId,
    removed: Option<(usize, SceneShape)>,
}

impl DeleteShapeCommand {
    pub fn new(id: ShapeId) -> Self {
        Self { id, removed: None }
    }
}

impl EditCommand for DeleteShapeCommand {
    fn name(&self) -> &'static str {
        "delete_shape"
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        self.removed = Some(ctx.shapes.remove(self.id)?);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let (index, shape) = self
            .removed
            .take()
            .ok_or(EngineError::ShapeNotFound(self.id.get()))?;
        if index > ctx.shapes.len() {
            let len = ctx.shapes.len();
            self.removed = Some((index, shape));
            return Err(EngineError::IndexOutOfBounds { index, len });
        }
        ctx.shapes.insert(index, shape)
    }
}

#[derive(Debug)]
pub struct MoveShapeCommand {
    id: ShapeId,
    offset: Vector2,
}

impl MoveShapeCommand {
    pub fn new(id: ShapeId, offset: Vector2) -> Self {
        Self { id, offset }
    }
}

impl EditCommand for MoveShapeCommand {
    fn name(&self) -> &'static str {
        "move_shape"
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.shape_mut(self.id)?.shape.translate(self.offset);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.shape_mut(self.id)?.shape.translate(-self.offset);
        Ok(())
    }
}

/// 绕包围盒中心旋转；枢轴在执行时确定，撤销时反向绕同一枢轴旋转。
#[derive(Debug)]
pub struct RotateShapeCommand {
    id: ShapeId,
    angle_degrees: f64,
    pivot: Option<Point2>,
}

impl RotateShapeCommand {
    pub fn new(id: ShapeId, angle_degrees: f64) -> Self {
        Self {
            id,
            angle_degrees,
            pivot: None,
        }
    }
}

impl EditCommand for RotateShapeCommand {
    fn name(&self) -> &'static str {
        "rotate_shape"
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let shape = &mut ctx.shape_mut(self.id)?.shape;
        let pivot = shape.centroid();
        shape.rotate_about(pivot, self.angle_degrees);
        self.pivot = Some(pivot);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let shape = &mut ctx.shape_mut(self.id)?.shape;
        let pivot = self.pivot.unwrap_or_else(|| shape.centroid());
        shape.rotate_about(pivot, -self.angle_degrees);
        Ok(())
    }
}

#[derive(Debug)]
pub struct ScaleShapeCommand {
    id: ShapeId,
    ratio: f64,
}

impl ScaleShapeCommand {
    pub fn new(id: ShapeId, ratio: f64) -> Self {
        Self { id, ratio }
    }
}

impl EditCommand for ScaleShapeCommand {
    fn name(&self) -> &'static str {
        "scale_shape"
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.shape_mut(self.id)?.shape.scale(self.ratio)?;
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.shape_mut(self.id)?.shape.scale(1.0 / self.ratio)?;
        Ok(())
    }
}

/// 样式没有逆运算，执行时保存旧值。
#[derive(Debug)]
pub struct ChangeStyleCommand {
    id: ShapeId,
    new_style: Style,
    old_style: Option<Style>,
}

impl ChangeStyleCommand {
    pub fn new(id: ShapeId, style: Style) -> Self {
        Self {
            id,
            new_style: style,
            old_style: None,
        }
    }
}

impl EditCommand for ChangeStyleCommand {
    fn name(&self) -> &'static str {
        "change_style"
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let shape = ctx.shape_mut(self.id)?;
        self.old_style = Some(shape.style);
        shape.style = self.new_style;
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let shape = ctx.shape_mut(self.id)?;
        if let Some(old) = self.old_style {
            shape.style = old;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAxis {
    /// 左右翻转。
    X,
    /// 上下翻转。
    Y,
}

/// 镜像是自逆操作，撤销即再镜像一次。
#[derive(Debug)]
pub struct MirrorShapeCommand {
    id: ShapeId,
    axis: MirrorAxis,
}

impl MirrorShapeCommand {
    pub fn new(id: ShapeId, axis: MirrorAxis) -> Self {
        Self { id, axis }
    }

    fn apply(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let shape = &mut ctx.shape_mut(self.id)?.shape;
        match self.axis {
            MirrorAxis::X => shape.mirror_x(),
            MirrorAxis::Y => shape.mirror_y(),
        }
        Ok(())
    }
}

impl EditCommand for MirrorShapeCommand {
    fn name(&self) -> &'static str {
        match self.axis {
            MirrorAxis::X => "mirror_x",
            MirrorAxis::Y => "mirror_y",
        }
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        self.apply(ctx)
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        self.apply(ctx)
    }
}

/// 撤销/重做栈。新命令执行成功后清空重做栈；`max_depth` 为 0 表示不限深度。
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: VecDeque<Box<dyn EditCommand>>,
    redo_stack: Vec<Box<dyn EditCommand>>,
    max_depth: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 执行命令并入撤销栈。失败时不记录，错误原样返回。
    pub fn run(
        &mut self,
        mut command: Box<dyn EditCommand>,
        ctx: &mut CommandContext<'_>,
    ) -> Result<()> {
        command.execute(ctx)?;
        debug!(
            command = command.name(),
            undo_depth = self.undo_stack.len() + 1,
            "已执行命令"
        );
        self.push_undo(command);
        self.redo_stack.clear();
        Ok(())
    }

    /// 撤销最近一条命令。栈为空时返回 `Ok(false)`。
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<bool> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = command.undo(ctx) {
            self.undo_stack.push_back(command);
            return Err(err);
        }
        debug!(command = command.name(), "已撤销命令");
        self.redo_stack.push(command);
        Ok(true)
    }

    /// 重做最近撤销的命令。栈为空时返回 `Ok(false)`。
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.execute(ctx) {
            self.redo_stack.push(command);
            return Err(err);
        }
        debug!(command = command.name(), "已重做命令");
        self.push_undo(command);
        Ok(true)
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[inline]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[inline]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// 下一次重做将执行的命令名。
    pub fn peek_redo(&self) -> Option<&'static str> {
        self.redo_stack.last().map(|command| command.name())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, command: Box<dyn EditCommand>) {
        self.undo_stack.push_back(command);
        if self.max_depth > 0 {
            while self.undo_stack.len() > self.max_depth {
                self.undo_stack.pop_front();
            }
        }
    }
}
