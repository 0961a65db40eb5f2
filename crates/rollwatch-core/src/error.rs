use rollwatch_archive::ArchiveError;
use rollwatch_render::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
}
