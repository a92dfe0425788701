pub mod csv_format;
pub mod task_store;
