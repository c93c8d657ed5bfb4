pub mod formatter;

pub use formatter::{
    format_audit_report, format_question_table, format_remediation_report, should_use_colors,
};
