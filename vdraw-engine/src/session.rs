use tracing::{debug, info};
use vdraw_core::color::Rgba;
use vdraw_core::factory::{DEFAULT_MIN_SIZE, ShapeFactory, ShapeNamer, ShapeTool};
use vdraw_core::geometry::{Point2, Vector2};
use vdraw_core::scene_shape::{DEFAULT_LAYER_NAME, SceneShape, ShapeId, Style};

use crate::Result;
use crate::collection::{ShapeCollection, ShapeList};
use crate::errors::{EngineError, LayerError};
use crate::layers::{Layer, LayerManager};
use crate::scene::SceneManager;

/// 编辑会话的初始参数，通常由应用层配置转换而来。
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub min_shape_size: f64,
    pub default_layer_name: String,
    pub default_fill: Rgba,
    pub default_stroke: Rgba,
    /// 0 表示不限撤销深度。
    pub history_depth: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            min_shape_size: DEFAULT_MIN_SIZE,
            default_layer_name: DEFAULT_LAYER_NAME.to_string(),
            default_fill: Rgba::CORNFLOWER_BLUE,
            default_stroke: Rgba::BLACK,
            history_depth: 0,
        }
    }
}

/// 无界面的编辑会话：持有图形集合、命令历史、图层注册表、当前颜色与选中图形。
#[derive(Debug)]
pub struct EditSession {
    shapes: ShapeList,
    scene: SceneManager,
    layers: LayerManager,
    factory: ShapeFactory,
    namer: ShapeNamer,
    fill: Rgba,
    stroke: Rgba,
    selection: Option<ShapeId>,
    default_layer_name: String,
    layer_counter: u32,
}

impl EditSession {
    pub fn new(settings: SessionSettings) -> Result<Self> {
        let factory = ShapeFactory::new(settings.min_shape_size)?;
        Ok(Self {
            shapes: ShapeList::new(),
            scene: SceneManager::with_max_depth(settings.history_depth),
            layers: LayerManager::new(settings.default_layer_name.clone()),
            factory,
            namer: ShapeNamer::new(),
            fill: settings.default_fill,
            stroke: settings.default_stroke,
            selection: None,
            default_layer_name: settings.default_layer_name,
            layer_counter: 1,
        })
    }

    #[inline]
    pub fn shapes(&self) -> &ShapeList {
        &self.shapes
    }

    #[inline]
    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// 允许外部挂接观察者等操作。
    #[inline]
    pub fn layers_mut(&mut self) -> &mut LayerManager {
        &mut self.layers
    }

    #[inline]
    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    #[inline]
    pub fn active_fill(&self) -> Rgba {
        self.fill
    }

    #[inline]
    pub fn active_stroke(&self) -> Rgba {
        self.stroke
    }

    #[inline]
    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.scene.can_undo()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.scene.can_redo()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&SceneShape> {
        self.shapes.find(id)
    }

    pub fn select(&mut self, id: ShapeId) -> Result<()> {
        if self.shapes.find(id).is_none() {
            return Err(EngineError::ShapeNotFound(id.get()));
        }
        self.selection = Some(id);
        Ok(())
    }

    #[inline]
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// 用当前工具、颜色与激活图层构造新图形，但不加入场景。
    pub fn create_shape(&mut self, tool: ShapeTool, p1: Point2, p2: Point2) -> SceneShape {
        let shape = self.factory.create(tool, p1, p2);
        let name = self.namer.next_name(tool.kind());
        let active = self.layers.active();
        SceneShape::new(name, shape)
            .with_style(Style::new(self.fill, self.stroke, 1.0))
            .on_layer(active.name(), active.is_visible)
    }

    pub fn add_shape(&mut self, shape: SceneShape) -> Result<ShapeId> {
        let id = self.scene.add(&mut self.shapes, shape)?;
        self.sync_layers();
        Ok(id)
    }

    /// 构造并加入场景，返回新图形的标识。
    pub fn draw(&mut self, tool: ShapeTool, p1: Point2, p2: Point2) -> Result<ShapeId> {
        let shape = self.create_shape(tool, p1, p2);
        self.add_shape(shape)
    }

    pub fn delete_selected(&mut self) -> Result<bool> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        self.scene.delete(&mut self.shapes, id)?;
        self.selection = None;
        Ok(true)
    }

    pub fn move_shape(&mut self, id: ShapeId, offset: Vector2) -> Result<()> {
        self.scene.move_shape(&mut self.shapes, id, offset)
    }

    pub fn rotate_selected(&mut self, angle_degrees: f64) -> Result<bool> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        self.scene.rotate(&mut self.shapes, id, angle_degrees)?;
        Ok(true)
    }

    pub fn scale_selected(&mut self, ratio: f64) -> Result<bool> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        self.scene.scale(&mut self.shapes, id, ratio)?;
        Ok(true)
    }

    pub fn mirror_x_selected(&mut self) -> Result<bool> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        self.scene.mirror_x(&mut self.shapes, id)?;
        Ok(true)
    }

    pub fn mirror_y_selected(&mut self) -> Result<bool> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        self.scene.mirror_y(&mut self.shapes, id)?;
        Ok(true)
    }

    /// 更新当前填充色；有选中图形时同时修改其样式。
    pub fn apply_fill_color(&mut self, color: Rgba) -> Result<bool> {
        self.fill = color;
        self.restyle_selected(|style| Style { fill: color, ..style })
    }

    pub fn apply_stroke_color(&mut self, color: Rgba) -> Result<bool> {
        self.stroke = color;
        self.restyle_selected(|style| Style {
            stroke: color,
            ..style
        })
    }

    fn restyle_selected(&mut self, update: impl FnOnce(Style) -> Style) -> Result<bool> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        let current = self
            .shapes
            .find(id)
            .ok_or(EngineError::ShapeNotFound(id.get()))?
            .style;
        self.scene
            .change_style(&mut self.shapes, id, update(current))?;
        Ok(true)
    }

    pub fn undo(&mut self) -> Result<bool> {
        let undone = self.scene.undo(&mut self.shapes)?;
        self.after_history_step();
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let redone = self.scene.redo(&mut self.shapes)?;
        self.after_history_step();
        Ok(redone)
    }

    /// 撤销或重做会把暂存的图形放回集合，其可见性可能已与图层不一致。
    fn after_history_step(&mut self) {
        self.sync_layers();
        if let Some(id) = self.selection {
            if self.shapes.find(id).is_none() {
                self.selection = None;
            }
        }
    }

    fn sync_layers(&mut self) {
        self.layers.sync_membership(&self.shapes);
        self.layers.sync_visibility(&mut self.shapes);
    }

    /// 新建 "Layer N" 图层并激活，返回其名称。
    pub fn add_layer(&mut self) -> Result<String> {
        let name = loop {
            self.layer_counter += 1;
            let candidate = format!("Layer {}", self.layer_counter);
            if self.layers.find(&candidate).is_none() {
                break candidate;
            }
        };
        self.layers.register(Layer::new(name.clone()))?;
        self.layers.set_active(&name)?;
        debug!(layer = %name, "已新建并激活图层");
        Ok(name)
    }

    /// 删除激活图层及其全部图形。该操作不可撤销，因此会清空命令历史。
    pub fn delete_active_layer(&mut self) -> Result<usize> {
        if self.layers.len() <= 1 {
            return Err(LayerError::LastLayer.into());
        }
        let name = self.layers.active().name().to_string();
        let members = self.layers.shapes_on(&name, &self.shapes);
        for id in &members {
            self.shapes.remove(*id)?;
        }
        if self.selection.is_some_and(|id| members.contains(&id)) {
            self.selection = None;
        }
        if !self.layers.unregister(&name) {
            return Err(LayerError::LayerNotFound(name).into());
        }
        self.scene.clear_history();
        debug!(layer = %name, removed = members.len(), "已删除图层");
        Ok(members.len())
    }

    pub fn set_active_layer(&mut self, name: &str) -> Result<()> {
        self.layers.set_active(name)?;
        Ok(())
    }

    pub fn set_layer_visibility(&mut self, name: &str, visible: bool) -> Result<usize> {
        Ok(self.layers.set_visibility(name, visible, &mut self.shapes)?)
    }

    pub fn set_layer_locked(&mut self, name: &str, locked: bool) -> Result<()> {
        self.layers.set_locked(name, locked)?;
        Ok(())
    }

    pub fn move_selected_to_layer(&mut self, target: &str) -> Result<bool> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        self.layers
            .move_shape_to_layer(id, target, &mut self.shapes)?;
        Ok(true)
    }

    pub fn shapes_on_layer(&self, name: &str) -> Vec<ShapeId> {
        self.layers.shapes_on(name, &self.shapes)
    }

    /// 清空全部图形、选中状态与命令历史，图层保持不变。
    pub fn clear_all(&mut self) {
        self.shapes.clear();
        self.selection = None;
        self.scene.clear_history();
    }

    /// 用导入的图形替换整个场景：图层、命名计数、历史与选中状态全部重置。
    pub fn load_shapes(&mut self, shapes: Vec<SceneShape>) -> usize {
        self.layers.reset(self.default_layer_name.clone());
        self.layer_counter = 1;
        self.namer.reset();
        self.clear_all();

        let count = shapes.len();
        for shape in shapes {
            self.shapes.push(shape);
        }
        let created = self.layers.sync_membership(&self.shapes);
        info!(shapes = count, layers_created = created, "已载入场景");
        count
    }
}
