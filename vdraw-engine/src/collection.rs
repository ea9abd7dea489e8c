use vdraw_core::scene_shape::{SceneShape, ShapeId};

use crate::Result;
use crate::errors::EngineError;

/// 有序图形集合，顺序即叠放顺序。集合由调用方持有，命令只在执行期间借用。
pub trait ShapeCollection {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&SceneShape>;

    fn get_mut(&mut self, index: usize) -> Option<&mut SceneShape>;

    /// 在 `index` 处插入，`index == len` 等价于追加。
    fn insert(&mut self, index: usize, shape: SceneShape) -> Result<()>;

    fn push(&mut self, shape: SceneShape);

    fn remove_at(&mut self, index: usize) -> Result<SceneShape>;

    fn clear(&mut self);

    fn iter(&self) -> Box<dyn Iterator<Item = &SceneShape> + '_>;

    fn iter_mut(&mut self) -> Box<dyn Iterator<Item = &mut SceneShape> + '_>;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.iter().position(|shape| shape.id() == id)
    }

    fn find(&self, id: ShapeId) -> Option<&SceneShape> {
        self.iter().find(|shape| shape.id() == id)
    }

    fn find_mut(&mut self, id: ShapeId) -> Option<&mut SceneShape> {
        let index = self.index_of(id)?;
        self.get_mut(index)
    }

    /// 按标识移除，返回原位置与图形。
    fn remove(&mut self, id: ShapeId) -> Result<(usize, SceneShape)> {
        let index = self
            .index_of(id)
            .ok_or(EngineError::ShapeNotFound(id.get()))?;
        let shape = self.remove_at(index)?;
        Ok((index, shape))
    }
}

/// 基于 `Vec` 的默认集合实现。
#[derive(Debug, Default, Clone)]
pub struct ShapeList {
    shapes: Vec<SceneShape>,
}

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn as_slice(&self) -> &[SceneShape] {
        &self.shapes
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(SceneShape::id).collect()
    }
}

impl From<Vec<SceneShape>> for ShapeList {
    fn from(shapes: Vec<SceneShape>) -> Self {
        Self { shapes }
    }
}

impl ShapeCollection for ShapeList {
    #[inline]
    fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&SceneShape> {
        self.shapes.get(index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut SceneShape> {
        self.shapes.get_mut(index)
    }

    fn insert(&mut self, index: usize, shape: SceneShape) -> Result<()> {
        let len = self.shapes.len();
        if index > len {
            return Err(EngineError::IndexOutOfBounds { index, len });
        }
        self.shapes.insert(index, shape);
        Ok(())
    }

    fn push(&mut self, shape: SceneShape) {
        self.shapes.push(shape);
    }

    fn remove_at(&mut self, index: usize) -> Result<SceneShape> {
        let len = self.shapes.len();
        if index >= len {
            return Err(EngineError::IndexOutOfBounds { index, len });
        }
        Ok(self.shapes.remove(index))
    }

    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &SceneShape> + '_> {
        Box::new(self.shapes.iter())
    }

    fn iter_mut(&mut self) -> Box<dyn Iterator<Item = &mut SceneShape> + '_> {
        Box::new(self.shapes.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use vdraw_core::geometry::Point2;
    use vdraw_core::shape::Polygon;

    use super::*;

    fn line(name: &str) -> SceneShape {
        SceneShape::new(name, Polygon::line(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)))
    }

    #[test]
    fn insert_and_remove_respect_bounds() {
        let mut list = ShapeList::new();
        let a = line("A");
        let b = line("B");
        let (a_id, b_id) = (a.id(), b.id());

        list.push(a);
        list.insert(0, b).expect("insert at head");
        assert_eq!(list.ids(), vec![b_id, a_id]);

        let err = list.insert(5, line("C")).unwrap_err();
        assert!(matches!(err, EngineError::IndexOutOfBounds { index: 5, len: 2 }));

        let err = list.remove_at(2).unwrap_err();
        assert!(matches!(err, EngineError::IndexOutOfBounds { index: 2, len: 2 }));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn lookup_by_identity() {
        let mut list = ShapeList::new();
        let a = line("A");
        let b = line("B");
        let b_id = b.id();
        list.push(a);
        list.push(b);

        assert_eq!(list.index_of(b_id), Some(1));
        assert_eq!(list.find(b_id).map(|s| s.name.as_str()), Some("B"));

        list.find_mut(b_id).expect("present").name = "Renamed".to_string();
        let (index, removed) = list.remove(b_id).expect("remove by id");
        assert_eq!(index, 1);
        assert_eq!(removed.name, "Renamed");

        let err = list.remove(b_id).unwrap_err();
        assert!(matches!(err, EngineError::ShapeNotFound(raw) if raw == b_id.get()));
    }
}
