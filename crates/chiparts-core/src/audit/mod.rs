//! Order audit trail
//!
//! Every handled order lands in a plain text file, whether or not it was
//! delivered. The same file answers the order count query.

mod file;

pub use file::AuditLog;
