use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::info;
use vdraw_core::scene_shape::SceneShape;

pub mod record;

pub use record::{
    FALLBACK_RADIUS, ImportReport, RecordError, ShapeRecord, SkippedRecord, from_record,
    import_records, to_record,
};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene document: {0}")]
    InvalidDocument(String),
}

pub trait SceneLoader {
    fn load(&self, path: &Path) -> Result<ImportReport, IoError>;
}

pub trait SceneSaver {
    fn save(&self, shapes: &[SceneShape], path: &Path) -> Result<(), IoError>;
}

/// JSON 场景文件：顶层为记录数组，保存时带缩进。
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSceneFacade;

impl JsonSceneFacade {
    pub fn new() -> Self {
        Self
    }

    /// 解析 JSON 文本。数组元素逐个解码，单个元素损坏只会被跳过。
    pub fn parse(&self, text: &str) -> Result<ImportReport, IoError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| IoError::InvalidDocument(err.to_string()))?;
        let Value::Array(elements) = value else {
            return Err(IoError::InvalidDocument(
                "top-level value must be an array of shape records".to_string(),
            ));
        };

        let mut report = ImportReport::default();
        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<ShapeRecord>(element) {
                Ok(record) => report.accept(index, &record),
                Err(err) => report.skip(index, err.to_string()),
            }
        }
        Ok(report)
    }

    pub fn render(&self, shapes: &[SceneShape]) -> Result<String, IoError> {
        let records: Vec<ShapeRecord> = shapes.iter().map(to_record).collect();
        serde_json::to_string_pretty(&records).map_err(|err| IoError::InvalidDocument(err.to_string()))
    }
}

impl SceneLoader for JsonSceneFacade {
    fn load(&self, path: &Path) -> Result<ImportReport, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let report = self.parse(&data)?;
        info!(
            path = %path.display(),
            shapes = report.shapes.len(),
            skipped = report.skipped.len(),
            "已导入场景文件"
        );
        Ok(report)
    }
}

impl SceneSaver for JsonSceneFacade {
    fn save(&self, shapes: &[SceneShape], path: &Path) -> Result<(), IoError> {
        let json = self.render(shapes)?;
        fs::write(path, json).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), shapes = shapes.len(), "已导出场景文件");
        Ok(())
    }
}
