//! Fundboard engine: the effectful adapters around the pure core. Scrape API
//! client, local persistence cache, force-refresh mailbox, job poller, and
//! CSV export all live here.
mod cache;
mod client;
mod export;
mod mailbox;
mod persist;
mod poller;
mod protocol;
mod remote;

pub use cache::{keys, CacheEntry, CacheStore};
pub use client::{ApiClient, RequestError};
pub use export::{write_results_csv, ExportError, ExportSummary, CSV_COLUMNS};
pub use mailbox::{RefreshMailbox, RefreshSignal};
pub use persist::{atomic_write, ensure_dir, PersistError};
pub use poller::{JobPoller, JobStatusSource, PollEvent, POLL_INTERVAL};
pub use protocol::{BatchCreated, JobErrorDto, JobStatusDto, PrepareDto, UrlTimingDto};
pub use remote::{ApiCommand, ApiEvent, ApiHandle};
