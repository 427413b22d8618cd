//! Port adapters.

mod attachment_reader;
mod reqwest_client;
mod system_clock;

pub use attachment_reader::TokioAttachmentReader;
pub use reqwest_client::ReqwestHttpClient;
pub use system_clock::SystemClock;
