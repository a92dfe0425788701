pub mod add;
pub mod delete;
pub mod done;
pub mod export;
pub mod forecast;
pub mod import;
pub mod init;
pub mod insights;
pub mod list;
pub mod predict;
pub mod recommend;
pub mod stats;
