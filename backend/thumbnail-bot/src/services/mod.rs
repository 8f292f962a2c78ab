pub mod batch;
pub mod local_file;
pub mod thumbnail;

pub use batch::{BatchFileProcessor, BatchReport, FileOutcome};
pub use local_file::LocalFile;
pub use thumbnail::{ThumbnailConfig, ThumbnailPreparer};
