use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use vdraw_config::{AppConfig, ConfigError};

mod cli;
mod demo;
mod errors;

/// 无界面的矢量绘图场景工具：构建演示场景或导入场景文件，打印概览并可导出。
#[derive(Debug, Parser)]
#[command(name = "vdraw", version)]
struct Args {
    /// 配置文件路径，缺省时按 `VDRAW_CONFIG` 或 `./config/default.toml` 查找
    #[arg(long)]
    config: Option<PathBuf>,
    /// 要导入的 JSON 场景文件；缺省时构建内置演示场景
    #[arg(long)]
    import: Option<PathBuf>,
    /// 把最终场景导出到该 JSON 文件
    #[arg(long)]
    export: Option<PathBuf>,
    /// 覆盖配置中的日志过滤表达式
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let args = Args::parse();

    let (config, config_error) = match load_configuration(args.config.clone()) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level);
    if let Some(err) = config_error {
        report_config_error(&err);
    }
    info!("启动 vdraw");

    let options = cli::RunOptions {
        import: args.import,
        export: args.export,
    };
    if let Err(err) = cli::run(&config, &options) {
        error!(error = %err, "执行失败");
        std::process::exit(1);
    }
}

/// 日志尚未初始化，错误交给调用方在初始化后输出。
fn load_configuration(override_path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    match override_path {
        Some(path) => AppConfig::from_file(&path),
        None => AppConfig::discover(),
    }
}

fn report_config_error(err: &ConfigError) {
    match err {
        ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
            warn!(path = %path.display(), error = %err, "加载配置失败，使用内建默认值");
        }
        ConfigError::Context { .. } => {
            warn!(error = %err, "加载配置失败，使用内建默认值");
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
