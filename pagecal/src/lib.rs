pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{Connection, expand_output_path, parse_page_id, parse_start_date, parse_time_of_day, resolve_depth};

// Re-export the pipeline from pagecal-core
pub use pagecal_core::fetch::{FetchOptions, execute_fetch};
pub use pagecal_core::schedule::{ScheduleOptions, batch_and_schedule};
