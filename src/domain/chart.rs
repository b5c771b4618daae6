// Chart domain models - data table and drawing options
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::sample::SampleSeries;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart package {0:?} was not requested")]
    MissingPackage(ChartPackage),
    #[error("chart library did not finish loading within {0} ms")]
    LoadTimeout(u64),
    #[error("row {row} does not match the table columns")]
    ColumnMismatch { row: usize },
    #[error("a line chart needs a datetime column followed by a number column")]
    UnsupportedLayout,
    #[error("failed to draw chart: {0}")]
    Draw(String),
}

/// Capabilities requested from the chart library before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPackage {
    Line,
    CoreChart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    DateTime,
    Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub kind: ColumnType,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    DateTime(Option<DateTime<Utc>>),
    Number(f64),
}

impl Cell {
    fn kind(&self) -> ColumnType {
        match self {
            Cell::DateTime(_) => ColumnType::DateTime,
            Cell::Number(_) => ColumnType::Number,
        }
    }
}

/// Typed table handed to the chart library.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, kind: ColumnType, label: impl Into<String>) {
        self.columns.push(Column {
            kind,
            label: label.into(),
        });
    }

    /// Append rows in bulk. Nothing is inserted if any row has the wrong shape.
    pub fn add_rows<I>(&mut self, rows: I) -> Result<(), ChartError>
    where
        I: IntoIterator<Item = Vec<Cell>>,
    {
        let rows: Vec<Vec<Cell>> = rows.into_iter().collect();
        for (offset, row) in rows.iter().enumerate() {
            let matches = row.len() == self.columns.len()
                && row
                    .iter()
                    .zip(&self.columns)
                    .all(|(cell, column)| cell.kind() == column.kind);
            if !matches {
                return Err(ChartError::ColumnMismatch {
                    row: self.rows.len() + offset,
                });
            }
        }
        self.rows.extend(rows);
        Ok(())
    }

    /// The `unix` / `Watts` table drawn for a power log.
    pub fn from_series(series: &SampleSeries) -> Result<Self, ChartError> {
        let mut table = Self::new();
        table.add_column(ColumnType::DateTime, "unix");
        table.add_column(ColumnType::Number, "Watts");
        table.add_rows(
            series
                .iter()
                .map(|s| vec![Cell::DateTime(s.timestamp), Cell::Number(s.watts)]),
        )?;
        Ok(table)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// Straight segments between points.
    None,
    /// Smoothed curve through every point.
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    Bottom,
    Top,
    Right,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub curve_type: CurveType,
    pub width: u32,
    pub height: u32,
    pub legend: LegendPosition,
    pub v_axis_title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            curve_type: CurveType::Function,
            width: 900,
            height: 400,
            legend: LegendPosition::Bottom,
            v_axis_title: "Power (Watts)".to_string(),
        }
    }
}

/// A drawn chart, ready to be placed into the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub svg: String,
    pub points_drawn: usize,
}
