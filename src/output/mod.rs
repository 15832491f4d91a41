pub mod formatter;

pub use formatter::{
    format_age, format_conversion_table, format_history_json, format_history_table,
    format_history_tsv, format_persistence, format_result, format_score, info,
    should_use_colors, success, warning,
};
