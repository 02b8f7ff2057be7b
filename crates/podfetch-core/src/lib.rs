pub mod config;
pub mod logging;

pub mod catalog;
pub mod episode_list;
pub mod item;
pub mod naming;
pub mod pipeline;
pub mod status_store;
pub mod transport;

pub use item::{DownloadItem, DownloadOutcome, DownloadResult};
pub use pipeline::FetchPipeline;
pub use status_store::StatusStore;
pub use transport::{CurlTransport, FetchError, Transport};
