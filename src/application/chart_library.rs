// Chart library and page traits used by the renderer
use crate::domain::chart::{ChartError, ChartOptions, ChartPackage, DataTable, RenderedChart};
use async_trait::async_trait;

/// A loaded chart library, able to draw line charts.
pub trait LineChart: Send + Sync {
    fn draw(&self, table: &DataTable, options: &ChartOptions) -> Result<RenderedChart, ChartError>;
}

#[async_trait]
pub trait ChartLibrary: Send + Sync {
    /// Load the requested packages. Resolves once drawing is possible.
    async fn load(&self, packages: &[ChartPackage]) -> Result<Box<dyn LineChart>, ChartError>;
}

/// The page regions the pipeline writes into.
pub trait PageView: Send {
    /// Text of the `elements` region.
    fn set_element_count(&mut self, count: usize);

    /// Place a drawn chart into the `chart_div` region.
    fn draw_chart(&mut self, chart: RenderedChart);

    fn hide_loading(&mut self);

    /// Replace the loading indicator with a visible error.
    fn show_error(&mut self, message: &str);
}
