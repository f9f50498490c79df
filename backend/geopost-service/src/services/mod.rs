/// Business logic layer
pub mod posts;
pub mod scans;

pub use posts::{PostDraft, PostService, LATEST_LIMIT};
pub use scans::ScanService;
