pub mod record;
pub mod render;
pub mod storage;

pub use record::{format_number, Cell, RowError, ScoreRecord, TIMESTAMP_FORMAT};
pub use render::{load_logo, render_report, ReportOptions};
pub use storage::{report_file_name, write_report};
