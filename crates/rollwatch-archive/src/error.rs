use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("zip encoding failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),
}
