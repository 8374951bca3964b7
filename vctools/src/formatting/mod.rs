//! Terminal output helpers.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{format_duration, print_key_value};
pub use status::{print_error, print_success, print_warning, Status};
pub use tables::{print_task_table, TaskRow};
