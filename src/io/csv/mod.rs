//! CSV format writing operations.

mod write;

pub(crate) use write::{assignments_frame, write_csv, write_csv_string};
