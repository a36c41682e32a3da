// Caller side of the memo assistant: proxy client, attachment encoding,
// local memo timeline and text export.

pub mod api;
pub mod attachments;
pub mod config;
pub mod error;
pub mod export;
pub mod store;

pub use api::{MemoInput, ProxyClient};
pub use config::CliConfig;
pub use error::{ClientError, StoreError};
pub use store::{Memo, MemoStore};
