use std::path::PathBuf;

use tracing::{info, warn};
use vdraw_config::AppConfig;
use vdraw_core::color::Rgba;
use vdraw_core::shape::ShapeGeometry;
use vdraw_engine::collection::ShapeCollection;
use vdraw_engine::session::{EditSession, SessionSettings};
use vdraw_io::{JsonSceneFacade, SceneLoader, SceneSaver};

use crate::demo::populate_demo;
use crate::errors::AppError;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub import: Option<PathBuf>,
    pub export: Option<PathBuf>,
}

/// 把配置转换为会话参数，无法解析的颜色回退到内建默认值。
pub fn session_settings(config: &AppConfig) -> SessionSettings {
    let defaults = SessionSettings::default();
    let editor = &config.editor;
    SessionSettings {
        min_shape_size: editor.min_shape_size,
        default_layer_name: editor.default_layer_name.clone(),
        default_fill: parse_color("default_fill", &editor.default_fill, defaults.default_fill),
        default_stroke: parse_color(
            "default_stroke",
            &editor.default_stroke,
            defaults.default_stroke,
        ),
        history_depth: config.history.max_depth,
    }
}

fn parse_color(field: &str, text: &str, fallback: Rgba) -> Rgba {
    Rgba::parse(text).unwrap_or_else(|err| {
        warn!(field, error = %err, "配置中的颜色无效，使用默认值");
        fallback
    })
}

/// 构建或导入场景，打印概览，并按需导出。
pub fn run(config: &AppConfig, options: &RunOptions) -> Result<(), AppError> {
    let mut session = EditSession::new(session_settings(config))?;
    let facade = JsonSceneFacade::new();

    println!("vdraw 场景演示");
    match &options.import {
        Some(path) => {
            let report = facade.load(path)?;
            for skipped in &report.skipped {
                println!("  跳过记录 #{}: {}", skipped.index, skipped.reason);
            }
            let count = session.load_shapes(report.shapes);
            println!("已从 {} 导入 {} 个图形", path.display(), count);
        }
        None => {
            let ids = populate_demo(&mut session)?;
            println!(
                "已构建内置演示场景：frame={}, horizon={}, sun={}, roof={}",
                ids.frame.get(),
                ids.horizon.get(),
                ids.sun.get(),
                ids.roof.get()
            );
        }
    }

    print_summary(&session);

    if let Some(path) = &options.export {
        facade.save(session.shapes().as_slice(), path)?;
        println!("已导出到 {}", path.display());
    }
    info!(shapes = session.shapes().len(), layers = session.layers().len(), "运行结束");
    Ok(())
}

fn print_summary(session: &EditSession) {
    println!("图层：");
    for layer in session.layers().layers() {
        println!(
            "  - {}{} (可见: {}, 锁定: {}, 图形数: {})",
            layer.name(),
            if layer.is_active() { " *" } else { "" },
            layer.is_visible,
            layer.is_locked,
            session.shapes_on_layer(layer.name()).len()
        );
    }

    println!("图形（共 {} 个）：", session.shapes().len());
    for shape in session.shapes().as_slice() {
        println!(
            "  - #{} {} [{}] Layer={} 填充={} 描边={} 不透明度={:.2}",
            shape.id().get(),
            shape.name,
            shape.kind(),
            shape.layer_name,
            shape.style.fill,
            shape.style.stroke,
            shape.style.opacity
        );
        println!("      {}", shape.shape.path_data());
    }

    println!(
        "撤销深度={}, 可撤销={}, 可重做={}",
        session.scene().history().undo_depth(),
        session.can_undo(),
        session.can_redo()
    );
}
