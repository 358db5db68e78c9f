pub mod table_format;
pub mod delta_log;
