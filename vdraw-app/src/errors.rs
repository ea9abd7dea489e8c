use thiserror::Error;
use vdraw_engine::errors::EngineError;
use vdraw_io::IoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Io(#[from] IoError),
}
