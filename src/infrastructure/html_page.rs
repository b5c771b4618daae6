// HTML page holding the `elements`, `chart_div`, `loading` and `error` regions
use crate::application::chart_library::PageView;
use crate::domain::chart::RenderedChart;
use std::fmt::Write;

#[derive(Debug, Clone)]
pub struct HtmlPage {
    title: String,
    element_count: Option<usize>,
    chart: Option<RenderedChart>,
    loading_visible: bool,
    error: Option<String>,
}

impl HtmlPage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            element_count: None,
            chart: None,
            loading_visible: true,
            error: None,
        }
    }

    pub fn element_count(&self) -> Option<usize> {
        self.element_count
    }

    pub fn is_loading_visible(&self) -> bool {
        self.loading_visible
    }

    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    pub fn render(&self) -> String {
        let visibility = if self.loading_visible { "visible" } else { "hidden" };
        let count = self
            .element_count
            .map(|n| n.to_string())
            .unwrap_or_default();
        let chart = self.chart.as_ref().map(|c| c.svg.as_str()).unwrap_or_default();

        let mut html = String::with_capacity(chart.len() + 1024);
        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
<p>Records: <span id="elements">{count}</span></p>
<div id="loading" style="visibility: {visibility}">Loading...</div>
"#,
            title = escape_html(&self.title),
        );
        if let Some(error) = &self.error {
            let _ = writeln!(html, r#"<div id="error">{}</div>"#, escape_html(error));
        }
        let _ = write!(
            html,
            r#"<div id="chart_div">{chart}</div>
</body>
</html>
"#
        );
        html
    }
}

impl PageView for HtmlPage {
    fn set_element_count(&mut self, count: usize) {
        self.element_count = Some(count);
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

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
