// Application layer - Page load pipeline and its seams
pub mod chart_library;
pub mod csv_parser;
pub mod log_source;
pub mod power_graph_service;
