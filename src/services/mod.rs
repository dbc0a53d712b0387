//! Services Module
//!
//! Where a finished result goes next: the local store, share links and the
//! exported report.

pub mod report;
pub mod share;
pub mod storage;

pub use report::{ReportBuilder, ReportDocument, ReportError};
pub use share::{analysis_from_url, decode_fragment, encode_result, generate_shareable_url};
pub use storage::LocalStore;
