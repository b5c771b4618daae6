// Domain layer - Power log and chart models
pub mod chart;
pub mod pipeline;
pub mod sample;
