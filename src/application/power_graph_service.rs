// Power graph service - fetch, parse and render the power log once per page load
use crate::application::chart_library::{ChartLibrary, LineChart, PageView};
use crate::application::csv_parser::{parse_log, MalformedPolicy};
use crate::application::log_source::LogSource;
use crate::domain::chart::{ChartError, ChartOptions, ChartPackage, DataTable, RenderedChart};
use crate::domain::pipeline::{PipelineState, Stage};
use crate::domain::sample::SampleSeries;
use std::sync::Arc;
use std::time::{Duration, Instant};

const REQUIRED_PACKAGES: [ChartPackage; 2] = [ChartPackage::Line, ChartPackage::CoreChart];

#[derive(Clone)]
pub struct PowerGraphService {
    source: Arc<dyn LogSource>,
    library: Arc<dyn ChartLibrary>,
    policy: MalformedPolicy,
    options: ChartOptions,
    load_timeout: Option<Duration>,
}

impl PowerGraphService {
    pub fn new(
        source: Arc<dyn LogSource>,
        library: Arc<dyn ChartLibrary>,
        policy: MalformedPolicy,
        options: ChartOptions,
    ) -> Self {
        Self {
            source,
            library,
            policy,
            options,
            load_timeout: None,
        }
    }

    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Run the whole page load against `page` and return the final state.
    pub async fn render_page(&self, page: &mut dyn PageView) -> PipelineState {
        let start_time = Instant::now();
        let mut state = PipelineState::Idle;

        advance(&mut state, PipelineState::Fetching);
        let text = match self.source.fetch_log().await {
            Ok(text) => text,
            Err(e) => return fail(&mut state, page, Stage::Fetching, &e),
        };

        advance(&mut state, PipelineState::Parsing);
        let (series, report) = parse_log(&text, self.policy);
        tracing::debug!(
            "Parsed {} lines: {} accepted, {} blank, {} malformed ({:?})",
            report.lines,
            report.accepted,
            report.blank,
            report.malformed,
            self.policy
        );
        page.set_element_count(series.len());

        advance(&mut state, PipelineState::LibraryLoading);
        let chart = match self.load_library().await {
            Ok(chart) => chart,
            Err(e) => return fail(&mut state, page, Stage::LibraryLoading, &e),
        };

        let rendered = match draw_series(series, chart.as_ref(), &self.options) {
            Ok(rendered) => rendered,
            Err(e) => return fail(&mut state, page, Stage::LibraryLoading, &e),
        };

        tracing::info!(
            "Rendered power chart with {} points in {} ms",
            rendered.points_drawn,
            start_time.elapsed().as_millis()
        );
        page.draw_chart(rendered);
        page.hide_loading();

        advance(&mut state, PipelineState::Rendered);
        state
    }

    async fn load_library(&self) -> Result<Box<dyn LineChart>, ChartError> {
        let load = self.library.load(&REQUIRED_PACKAGES);
        match self.load_timeout {
            Some(limit) => tokio::time::timeout(limit, load)
                .await
                .map_err(|_| ChartError::LoadTimeout(limit.as_millis() as u64))?,
            None => load.await,
        }
    }
}

/// Consumes the series: nothing reads it after drawing.
fn draw_series(
    series: SampleSeries,
    chart: &dyn LineChart,
    options: &ChartOptions,
) -> Result<RenderedChart, ChartError> {
    let table = DataTable::from_series(&series)?;
    chart.draw(&table, options)
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug_assert!(state.can_advance_to(&next), "{} -> {}", state, next);
    tracing::debug!("Power graph: {} -> {}", state, next);
    *state = next;
}

fn fail(
    state: &mut PipelineState,
    page: &mut dyn PageView,
    stage: Stage,
    error: &dyn std::error::Error,
) -> PipelineState {
    let reason = error_chain(error);
    tracing::error!("Power graph failed while {}: {}", stage, reason);
    page.show_error(&format!("Unable to show the power graph: {}", reason));

    advance(state, PipelineState::Failed { stage, reason });
    state.clone()
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::log_source::FetchError;
    use crate::domain::chart::Cell;
    use crate::infrastructure::plotters_chart::PlottersChartLibrary;
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum FakeSource {
        Body(&'static str),
        Status(u16),
    }

    #[async_trait]
    impl LogSource for FakeSource {
        async fn fetch_log(&self) -> Result<String, FetchError> {
            match self {
                FakeSource::Body(text) => Ok(text.to_string()),
                FakeSource::Status(status) => Err(FetchError::Status {
                    url: "http://device/log.csv".to_string(),
                    status: *status,
                }),
            }
        }
    }

    #[derive(Default)]
    struct FakeLibrary {
        fail: bool,
        delay: Option<Duration>,
        requested: Mutex<Vec<ChartPackage>>,
        tables: Arc<Mutex<Vec<DataTable>>>,
    }

    struct FakeChart {
        tables: Arc<Mutex<Vec<DataTable>>>,
    }

    impl LineChart for FakeChart {
        fn draw(
            &self,
            table: &DataTable,
            options: &ChartOptions,
        ) -> Result<RenderedChart, ChartError> {
            self.tables.lock().unwrap().push(table.clone());
            Ok(RenderedChart {
                svg: format!("<svg>{}</svg>", options.v_axis_title),
                points_drawn: table.row_count(),
            })
        }
    }

    #[async_trait]
    impl ChartLibrary for FakeLibrary {
        async fn load(&self, packages: &[ChartPackage]) -> Result<Box<dyn LineChart>, ChartError> {
            self.requested.lock().unwrap().extend_from_slice(packages);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(ChartError::MissingPackage(ChartPackage::Line));
            }
            Ok(Box::new(FakeChart {
                tables: self.tables.clone(),
            }))
        }
    }

    #[derive(Debug, Default)]
    struct RecordingPage {
        count: Option<usize>,
        chart: Option<RenderedChart>,
        loading_visible: bool,
        error: Option<String>,
    }

    impl PageView for RecordingPage {
        fn set_element_count(&mut self, count: usize) {
            self.count = Some(count);
        }

        fn draw_chart(&mut self, chart: RenderedChart) {
            self.chart = Some(chart);
        }

        fn hide_loading(&mut self) {
            self.loading_visible = false;
        }

        fn show_error(&mut self, message: &str) {
            self.loading_visible = false;
            self.error = Some(message.to_string());
        }
    }

    fn page() -> RecordingPage {
        RecordingPage {
            loading_visible: true,
            ..Default::default()
        }
    }

    fn service(source: FakeSource, library: Arc<FakeLibrary>) -> PowerGraphService {
        PowerGraphService::new(
            Arc::new(source),
            library,
            MalformedPolicy::Skip,
            ChartOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_renders_parsed_log() {
        let library = Arc::new(FakeLibrary::default());
        let service = service(FakeSource::Body("1000,50.5\n1001,51.0\n"), library.clone());
        let mut page = page();

        let state = service.render_page(&mut page).await;

        assert_eq!(state, PipelineState::Rendered);
        assert_eq!(page.count, Some(2));
        assert!(!page.loading_visible);
        assert!(page.error.is_none());
        assert_eq!(page.chart.unwrap().points_drawn, 2);
        assert_eq!(
            *library.requested.lock().unwrap(),
            vec![ChartPackage::Line, ChartPackage::CoreChart]
        );

        let tables = library.tables.lock().unwrap();
        let first_row = &tables[0].rows()[0];
        assert_eq!(first_row[1], Cell::Number(50.5));
        match first_row[0] {
            Cell::DateTime(Some(t)) => assert_eq!(t.timestamp_millis(), 1_000_000),
            other => panic!("unexpected cell {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_log_renders_empty_chart() {
        let library = Arc::new(FakeLibrary::default());
        let service = service(FakeSource::Body(""), library.clone());
        let mut page = page();

        let state = service.render_page(&mut page).await;

        assert_eq!(state, PipelineState::Rendered);
        assert_eq!(page.count, Some(0));
        assert!(!page.loading_visible);
        assert_eq!(page.chart.unwrap().points_drawn, 0);
        assert_eq!(library.tables.lock().unwrap()[0].row_count(), 0);
    }

    #[tokio::test]
    async fn test_far_apart_timestamps_render_with_plotters() {
        let service = PowerGraphService::new(
            Arc::new(FakeSource::Body("-8000000000000,5\n8000000000000,6\n")),
            Arc::new(PlottersChartLibrary),
            MalformedPolicy::Skip,
            ChartOptions::default(),
        );
        let mut page = page();

        let state = service.render_page(&mut page).await;

        assert_eq!(state, PipelineState::Rendered);
        assert_eq!(page.count, Some(2));
        assert_eq!(page.chart.unwrap().points_drawn, 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_page_unrendered() {
        let library = Arc::new(FakeLibrary::default());
        let service = service(FakeSource::Status(404), library.clone());
        let mut page = page();

        let state = service.render_page(&mut page).await;

        assert!(matches!(
            state,
            PipelineState::Failed {
                stage: Stage::Fetching,
                ..
            }
        ));
        assert!(page.chart.is_none());
        assert!(page.count.is_none());
        assert!(page.error.unwrap().contains("404"));
        assert!(library.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_library_failure_is_visible() {
        let library = Arc::new(FakeLibrary {
            fail: true,
            ..Default::default()
        });
        let service = service(FakeSource::Body("1000,1\n"), library);
        let mut page = page();

        let state = service.render_page(&mut page).await;

        assert!(matches!(
            state,
            PipelineState::Failed {
                stage: Stage::LibraryLoading,
                ..
            }
        ));
        assert_eq!(page.count, Some(1));
        assert!(page.chart.is_none());
        assert!(page.error.is_some());
    }

    #[tokio::test]
    async fn test_library_load_timeout() {
        let library = Arc::new(FakeLibrary {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let service = service(FakeSource::Body("1000,1\n"), library)
            .with_load_timeout(Some(Duration::from_millis(10)));
        let mut page = page();

        let state = service.render_page(&mut page).await;

        match state {
            PipelineState::Failed { stage, reason } => {
                assert_eq!(stage, Stage::LibraryLoading);
                assert!(reason.contains("10 ms"));
            }
            other => panic!("unexpected state {}", other),
        }
    }

    #[tokio::test]
    async fn test_pass_through_policy_reaches_chart() {
        let library = Arc::new(FakeLibrary::default());
        let service = PowerGraphService::new(
            Arc::new(FakeSource::Body("1000,1\nabc,xyz\n")),
            library.clone(),
            MalformedPolicy::PassThrough,
            ChartOptions::default(),
        );
        let mut page = page();

        service.render_page(&mut page).await;

        assert_eq!(page.count, Some(2));
        let tables = library.tables.lock().unwrap();
        assert_eq!(tables[0].rows()[1][0], Cell::DateTime(None));
    }
}
