//! The dashboard's selection state and the transitions between selections.
//!
//! [ViewState] is rebuilt for every request, so nothing here is shared between
//! users. All functions are pure.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::{
    charts::{ChartSpec, recession_charts, yearly_charts},
    sales::{Dataset, SUPPORTED_YEARS},
};

/// Which set of statistics to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ReportType {
    /// Statistics for the selected years.
    #[default]
    #[serde(rename = "Yearly Statistics")]
    Yearly,
    /// Statistics over recession periods only.
    #[serde(rename = "Recession Period Statistics")]
    Recession,
}

impl ReportType {
    /// Every report type in the order shown in the dropdown.
    pub const ALL: [ReportType; 2] = [ReportType::Yearly, ReportType::Recession];

    /// The label shown to the user, which is also the form value.
    pub fn label(self) -> &'static str {
        match self {
            ReportType::Yearly => "Yearly Statistics",
            ReportType::Recession => "Recession Period Statistics",
        }
    }
}

/// Whether the user can change the selected years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSelector {
    /// The year selector accepts input.
    Enabled,
    /// The year selector is shown but ignored.
    Disabled,
}

impl YearSelector {
    /// The year selector state for `report_type`.
    pub fn for_report_type(report_type: ReportType) -> Self {
        match report_type {
            ReportType::Recession => YearSelector::Disabled,
            ReportType::Yearly => YearSelector::Enabled,
        }
    }
}

/// A change made by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The user picked a report type.
    ReportTypeSelected(ReportType),
    /// The user changed the selected years.
    YearsSelected(BTreeSet<u16>),
}

/// The user's current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// The report type.
    pub report_type: ReportType,
    /// The selected years, only used by the yearly report.
    pub selected_years: BTreeSet<u16>,
}

impl Default for ViewState {
    /// The yearly report with every supported year selected.
    fn default() -> Self {
        Self {
            report_type: ReportType::Yearly,
            selected_years: SUPPORTED_YEARS.collect(),
        }
    }
}

impl ViewState {
    /// Apply `event` to produce the next state.
    ///
    /// Changing the report type keeps the selected years so that switching
    /// back to the yearly report restores them.
    pub fn apply(self, event: ViewEvent) -> Self {
        match event {
            ViewEvent::ReportTypeSelected(report_type) => Self {
                report_type,
                ..self
            },
            ViewEvent::YearsSelected(selected_years) => Self {
                selected_years,
                ..self
            },
        }
    }

    /// Whether the year selector accepts input in this state.
    pub fn year_selector(&self) -> YearSelector {
        YearSelector::for_report_type(self.report_type)
    }

    /// Decide what to render for this state.
    pub fn render_plan(&self) -> RenderPlan<'_> {
        match self.report_type {
            ReportType::Recession => RenderPlan::Recession,
            ReportType::Yearly if !self.selected_years.is_empty() => {
                RenderPlan::Yearly(&self.selected_years)
            }
            ReportType::Yearly => RenderPlan::Nothing,
        }
    }

    /// Build the charts for this state, in display order.
    ///
    /// Returns an empty list for the yearly report with no years selected.
    pub fn charts(&self, dataset: &Dataset) -> Vec<ChartSpec> {
        match self.render_plan() {
            RenderPlan::Recession => recession_charts(dataset),
            RenderPlan::Yearly(years) => yearly_charts(dataset, years),
            RenderPlan::Nothing => Vec::new(),
        }
    }
}

/// What the dashboard shows for a [ViewState].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPlan<'a> {
    /// The recession charts, regardless of the selected years.
    Recession,
    /// The yearly charts filtered to the given years.
    Yearly(&'a BTreeSet<u16>),
    /// No charts.
    Nothing,
}
