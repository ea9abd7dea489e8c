use std::fmt;

use tracing::{debug, warn};
use vdraw_core::scene_shape::ShapeId;

use crate::Result;
use crate::collection::ShapeCollection;
use crate::errors::{EngineError, LayerError};

/// 图层。名称与激活状态只能通过 `LayerManager` 修改，以保证名称唯一。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    name: String,
    pub is_visible: bool,
    pub is_locked: bool,
    is_active: bool,
}

impl Layer {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_visible: true,
            is_locked: false,
            is_active: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// 接收“图层已创建”通知的外部回调。
pub trait LayerObserver {
    fn layer_created(&mut self, layer: &Layer);
}

impl<F> LayerObserver for F
where
    F: FnMut(&Layer),
{
    fn layer_created(&mut self, layer: &Layer) {
        self(layer)
    }
}

/// 图层注册表：名称唯一，至少保留一个图层，且恰有一个处于激活状态。
///
/// 图形与图层之间只按名称弱关联，每次查询时重新解析。
pub struct LayerManager {
    layers: Vec<Layer>,
    active: usize,
    observer: Option<Box<dyn LayerObserver>>,
}

impl fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerManager")
            .field("layers", &self.layers)
            .field("active", &self.active)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl LayerManager {
    /// 以一个激活的默认图层初始化。
    pub fn new(default_name: impl Into<String>) -> Self {
        let mut layer = Layer::new(default_name);
        layer.is_active = true;
        Self {
            layers: vec![layer],
            active: 0,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: impl LayerObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[inline]
    pub fn active(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn find(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.name == name)
    }

    /// 注册新图层，名称重复时拒绝。新图层不会自动激活。
    pub fn register(&mut self, mut layer: Layer) -> Result<(), LayerError> {
        if self.position(&layer.name).is_some() {
            return Err(LayerError::DuplicateName(layer.name));
        }
        layer.is_active = false;
        self.layers.push(layer);
        Ok(())
    }

    /// 移除图层。只剩一个图层或名称不存在时返回 false 且不做修改。
    ///
    /// 若移除的是激活图层，最后一个图层成为新的激活图层。
    pub fn unregister(&mut self, name: &str) -> bool {
        if self.layers.len() <= 1 {
            warn!(layer = name, "拒绝移除最后一个图层");
            return false;
        }
        let Some(index) = self.position(name) else {
            return false;
        };
        let removed = self.layers.remove(index);
        if removed.is_active {
            self.active = self.layers.len() - 1;
            self.layers[self.active].is_active = true;
        } else if index < self.active {
            self.active -= 1;
        }
        debug!(layer = name, active = %self.active().name(), "已移除图层");
        true
    }

    pub fn set_active(&mut self, name: &str) -> Result<(), LayerError> {
        let index = self
            .position(name)
            .ok_or_else(|| LayerError::LayerNotFound(name.to_string()))?;
        self.layers[self.active].is_active = false;
        self.layers[index].is_active = true;
        self.active = index;
        Ok(())
    }

    /// 返回同名图层，不存在时用 `factory` 创建、登记并通知观察者。
    pub fn get_or_create<F>(&mut self, name: &str, factory: F) -> &Layer
    where
        F: FnOnce(&str) -> Layer,
    {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                let mut layer = factory(name);
                layer.name = name.to_string();
                layer.is_active = false;
                self.layers.push(layer);
                let index = self.layers.len() - 1;
                debug!(layer = name, "已创建图层");
                if let Some(observer) = self.observer.as_mut() {
                    observer.layer_created(&self.layers[index]);
                }
                index
            }
        };
        &self.layers[index]
    }

    /// 把图层的可见性同步到其全部图形，返回受影响的图形数。
    pub fn apply_visibility<C: ShapeCollection>(
        &self,
        name: &str,
        shapes: &mut C,
    ) -> Result<usize, LayerError> {
        let visible = self
            .find(name)
            .ok_or_else(|| LayerError::LayerNotFound(name.to_string()))?
            .is_visible;
        let mut touched = 0;
        for shape in shapes.iter_mut().filter(|shape| shape.layer_name == name) {
            shape.is_visible = visible;
            touched += 1;
        }
        Ok(touched)
    }

    /// 让每个图形的可见性与其所属图层一致，返回被修改的图形数。
    ///
    /// 所属图层不存在的图形保持原样。
    pub fn sync_visibility<C: ShapeCollection>(&self, shapes: &mut C) -> usize {
        let mut changed = 0;
        for shape in shapes.iter_mut() {
            let Some(layer) = self.find(&shape.layer_name) else {
                continue;
            };
            if shape.is_visible != layer.is_visible {
                shape.is_visible = layer.is_visible;
                changed += 1;
            }
        }
        changed
    }

    pub fn set_visibility<C: ShapeCollection>(
        &mut self,
        name: &str,
        visible: bool,
        shapes: &mut C,
    ) -> Result<usize, LayerError> {
        let layer = self
            .find_mut(name)
            .ok_or_else(|| LayerError::LayerNotFound(name.to_string()))?;
        layer.is_visible = visible;
        self.apply_visibility(name, shapes)
    }

    pub fn set_locked(&mut self, name: &str, locked: bool) -> Result<(), LayerError> {
        let layer = self
            .find_mut(name)
            .ok_or_else(|| LayerError::LayerNotFound(name.to_string()))?;
        layer.is_locked = locked;
        Ok(())
    }

    /// 把图形改挂到目标图层，并采用目标图层的可见性。
    pub fn move_shape_to_layer<C: ShapeCollection>(
        &self,
        id: ShapeId,
        target: &str,
        shapes: &mut C,
    ) -> Result<()> {
        let layer = self
            .find(target)
            .ok_or_else(|| LayerError::LayerNotFound(target.to_string()))?;
        let shape = shapes
            .find_mut(id)
            .ok_or(EngineError::ShapeNotFound(id.get()))?;
        shape.layer_name = layer.name.clone();
        shape.is_visible = layer.is_visible;
        Ok(())
    }

    /// 属于 `name` 图层的图形，按叠放顺序。
    pub fn shapes_on<C: ShapeCollection>(&self, name: &str, shapes: &C) -> Vec<ShapeId> {
        shapes
            .iter()
            .filter(|shape| shape.layer_name == name)
            .map(|shape| shape.id())
            .collect()
    }

    /// 为集合中引用到的每个图层名确保存在图层，返回新建数量。
    pub fn sync_membership<C: ShapeCollection>(&mut self, shapes: &C) -> usize {
        let mut missing: Vec<String> = Vec::new();
        for shape in shapes.iter() {
            if self.position(&shape.layer_name).is_none() && !missing.contains(&shape.layer_name) {
                missing.push(shape.layer_name.clone());
            }
        }
        for name in &missing {
            self.get_or_create(name, |name| Layer::new(name));
        }
        missing.len()
    }

    /// 只保留一个激活的默认图层。
    pub fn reset(&mut self, default_name: impl Into<String>) {
        let mut layer = Layer::new(default_name);
        layer.is_active = true;
        self.layers = vec![layer];
        self.active = 0;
    }
}
