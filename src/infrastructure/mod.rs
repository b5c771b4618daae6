// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod data_files;
pub mod html_page;
pub mod http_log_source;
pub mod plotters_chart;
pub mod static_files;
