use tracing::debug;
use vdraw_core::color::Rgba;
use vdraw_core::factory::ShapeTool;
use vdraw_core::geometry::{Point2, Vector2};
use vdraw_core::scene_shape::ShapeId;
use vdraw_engine::Result;
use vdraw_engine::session::EditSession;

#[derive(Debug, Clone, Copy)]
pub struct DemoShapes {
    pub frame: ShapeId,
    pub horizon: ShapeId,
    pub sun: ShapeId,
    pub roof: ShapeId,
}

/// 在会话中构建一组演示图形，并走一遍变换、撤销与重做。
pub fn populate_demo(session: &mut EditSession) -> Result<DemoShapes> {
    let frame = session.draw(
        ShapeTool::Rectangle,
        Point2::new(0.0, 0.0),
        Point2::new(120.0, 80.0),
    )?;
    let horizon = session.draw(ShapeTool::Line, Point2::new(0.0, 60.0), Point2::new(120.0, 60.0))?;

    session.add_layer()?;
    let sun = session.draw(ShapeTool::Circle, Point2::new(95.0, 20.0), Point2::new(105.0, 20.0))?;
    let roof = session.draw(
        ShapeTool::Triangle,
        Point2::new(20.0, 20.0),
        Point2::new(60.0, 45.0),
    )?;

    session.select(roof)?;
    session.rotate_selected(15.0)?;
    session.mirror_x_selected()?;
    session.scale_selected(1.5)?;
    session.undo()?;

    session.select(sun)?;
    session.apply_fill_color(Rgba::rgb(255, 200, 0))?;
    session.move_shape(sun, Vector2::new(-5.0, 5.0))?;
    session.undo()?;
    session.redo()?;
    session.clear_selection();

    let ids = DemoShapes {
        frame,
        horizon,
        sun,
        roof,
    };

    debug!(
        frame = ids.frame.get(),
        horizon = ids.horizon.get(),
        sun = ids.sun.get(),
        roof = ids.roof.get(),
        "已创建演示图形"
    );

    Ok(ids)
}
