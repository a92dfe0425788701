pub mod dataset;
pub mod date_parser;
pub mod record;
