use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV_VAR: &str = "VDRAW_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `VDRAW_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        let base_dir = env::current_dir().map_err(|source| ConfigError::Context {
            message: "获取当前工作目录失败".to_string(),
            source,
        })?;
        Self::discover_in(env::var_os(CONFIG_ENV_VAR).map(PathBuf::from), &base_dir)
    }

    /// `discover` 的纯函数版本：显式给出覆盖路径与基准目录。
    pub fn discover_in(
        override_path: Option<PathBuf>,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = override_path {
            return Self::from_file(path);
        }

        let default_path = base_dir.join("config").join("default.toml");
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 编辑器默认值。颜色以文本形式保存，由应用层解析。
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_min_shape_size")]
    pub min_shape_size: f64,
    #[serde(default = "EditorConfig::default_layer_name")]
    pub default_layer_name: String,
    #[serde(default = "EditorConfig::default_fill")]
    pub default_fill: String,
    #[serde(default = "EditorConfig::default_stroke")]
    pub default_stroke: String,
}

impl EditorConfig {
    fn default_min_shape_size() -> f64 {
        5.0
    }

    fn default_layer_name() -> String {
        "Layer 1".to_string()
    }

    fn default_fill() -> String {
        "#FF6495ED".to_string()
    }

    fn default_stroke() -> String {
        "#FF000000".to_string()
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_shape_size: Self::default_min_shape_size(),
            default_layer_name: Self::default_layer_name(),
            default_fill: Self::default_fill(),
            default_stroke: Self::default_stroke(),
        }
    }
}

/// 撤销历史配置，`max_depth = 0` 表示不限深度。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub max_depth: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
