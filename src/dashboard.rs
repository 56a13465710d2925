//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and updating the selection
//! - HTML view functions for the selectors and the chart grid
//! - The form type posted when a selector changes

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRequest;
use maud::{Markup, PreEscaped, html};
use serde::Deserialize;

use crate::{
    Error,
    charts::ChartSpec,
    endpoints,
    html::{ECHARTS_SCRIPT, HeadElement, base},
    sales::{Dataset, SUPPORTED_YEARS},
    view::{ReportType, ViewEvent, ViewState, YearSelector},
};

/// A dashboard chart with its HTML container ID, caption and ECharts configuration.
struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    id: &'static str,
    /// The text shown below the chart
    caption: &'static str,
    /// The ECharts configuration as a JSON string
    options: String,
}

impl From<&ChartSpec> for DashboardChart {
    fn from(spec: &ChartSpec) -> Self {
        Self {
            id: spec.id,
            caption: spec.caption,
            options: spec.to_chart().to_string(),
        }
    }
}

/// Form data posted whenever one of the selectors changes.
#[derive(Debug, Deserialize)]
pub struct DashboardForm {
    /// The selected report type.
    #[serde(default)]
    pub report_type: ReportType,
    /// The selected years. Missing when no year is selected.
    #[serde(default)]
    pub years: Vec<u16>,
}

impl DashboardForm {
    /// Fold the submitted values into a fresh [ViewState].
    ///
    /// # Errors
    /// Returns [Error::InvalidYear] if a year outside the dataset's range was submitted.
    fn into_view_state(self) -> Result<ViewState, Error> {
        if let Some(year) = self
            .years
            .iter()
            .find(|year| !SUPPORTED_YEARS.contains(*year))
        {
            return Err(Error::InvalidYear(*year));
        }

        Ok(ViewState::default()
            .apply(ViewEvent::ReportTypeSelected(self.report_type))
            .apply(ViewEvent::YearsSelected(self.years.into_iter().collect())))
    }
}

/// Display the dashboard with the default selection.
pub async fn get_dashboard_page(State(dataset): State<Dataset>) -> Response {
    dashboard_view(&ViewState::default(), &dataset).into_response()
}

/// Re-render the dashboard for the submitted selection.
///
/// htmx requests get the dashboard content only, plain form posts get the full page.
pub async fn update_dashboard(
    State(dataset): State<Dataset>,
    HxRequest(is_htmx_request): HxRequest,
    Form(form): Form<DashboardForm>,
) -> Result<Response, Error> {
    let view_state = form
        .into_view_state()
        .inspect_err(|error| tracing::warn!("rejected dashboard selection: {error}"))?;

    tracing::debug!(
        "Rendering {:?} report with {} selected years",
        view_state.report_type,
        view_state.selected_years.len()
    );

    if is_htmx_request {
        Ok(dashboard_content(&view_state, &dataset).into_response())
    } else {
        Ok(dashboard_view(&view_state, &dataset).into_response())
    }
}

/// Renders the full dashboard page.
fn dashboard_view(view_state: &ViewState, dataset: &Dataset) -> Markup {
    let content = html!(
        main class="page"
        {
            h1 class="page-title" { "Automobile Sales Statistics Dashboard" }

            div id="dashboard-content"
            {
                (dashboard_content(view_state, dataset))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT),
        HeadElement::ScriptSource(PreEscaped(CHART_LIFECYCLE_SCRIPT.to_owned())),
    ];

    base("Dashboard", &scripts, &content)
}

/// Renders the selectors and chart grid that are swapped on every update.
fn dashboard_content(view_state: &ViewState, dataset: &Dataset) -> Markup {
    let charts: Vec<DashboardChart> = view_state
        .charts(dataset)
        .iter()
        .map(DashboardChart::from)
        .collect();

    html!(
        (controls_view(view_state))
        (charts_view(&charts))
        (charts_script(&charts))
    )
}

/// Renders the report type and year selectors.
///
/// Browsers do not submit disabled fields, so while the year selector is
/// disabled the selected years are carried in hidden inputs.
fn controls_view(view_state: &ViewState) -> Markup {
    let years_disabled = view_state.year_selector() == YearSelector::Disabled;

    html!(
        form
            id="dashboard-controls"
            method="post"
            action=(endpoints::DASHBOARD_CHARTS)
            hx-post=(endpoints::DASHBOARD_CHARTS)
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-trigger="change"
            class="controls"
        {
            div class="control"
            {
                label for="dropdown-statistics" { "Select Statistics:" }

                select id="dropdown-statistics" name="report_type"
                {
                    @for report_type in ReportType::ALL {
                        option
                            value=(report_type.label())
                            selected[report_type == view_state.report_type]
                        {
                            (report_type.label())
                        }
                    }
                }
            }

            div class="control"
            {
                label for="select-year" { "Select Years:" }

                select
                    id="select-year"
                    name="years"
                    multiple
                    size="8"
                    disabled[years_disabled]
                {
                    @for year in SUPPORTED_YEARS {
                        option
                            value=(year)
                            selected[view_state.selected_years.contains(&year)]
                        {
                            (year)
                        }
                    }
                }

                @if years_disabled {
                    @for year in &view_state.selected_years {
                        input type="hidden" name="years" value=(year);
                    }
                }
            }
        }
    )
}

/// Renders the chart containers and captions as a two column grid.
fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section id="output-container" class="chart-grid"
        {
            @for chart in charts {
                div class="chart-item" style="width: 50%; display: inline-block;"
                {
                    div id=(chart.id) class="chart" {}
                    p class="chart-caption" { (chart.caption) }
                }
            }
        }
    )
}

/// Generates JavaScript that initialises the ECharts instance for each chart.
///
/// The script runs as soon as it is parsed, both on page load and after an
/// htmx swap.
fn charts_script(charts: &[DashboardChart]) -> Markup {
    if charts.is_empty() {
        return html!();
    }

    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.getInstanceByDom(chartDom) || echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option, true);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    html!( script { (PreEscaped(script_content)) } )
}

/// Resizes charts with the window and disposes them before htmx replaces them.
const CHART_LIFECYCLE_SCRIPT: &str = r#"
window.addEventListener('resize', function() {
    document.querySelectorAll('.chart').forEach(function(chartDom) {
        const chart = echarts.getInstanceByDom(chartDom);
        if (chart) { chart.resize(); }
    });
});

document.addEventListener('htmx:beforeSwap', function(event) {
    if (event.detail.target.id !== 'dashboard-content') { return; }
    event.detail.target.querySelectorAll('.chart').forEach(function(chartDom) {
        const chart = echarts.getInstanceByDom(chartDom);
        if (chart) { chart.dispose(); }
    });
});
"#;

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use axum_htmx::HxRequest;
    use scraper::{Html, Selector};

    use crate::{
        Error,
        dashboard::{DashboardForm, get_dashboard_page, update_dashboard},
        sales::{Dataset, SalesRecord},
        test_utils::{
            assert_status_ok, assert_valid_html, parse_html_document, parse_html_fragment,
            sample_record,
        },
        view::ReportType,
    };

    fn test_dataset() -> Dataset {
        Dataset::new(vec![
            SalesRecord {
                year: 2008,
                vehicle_type: "Car".to_owned(),
                automobile_sales: 100.0,
                recession: true,
                ..sample_record()
            },
            SalesRecord {
                year: 2010,
                vehicle_type: "Truck".to_owned(),
                automobile_sales: 200.0,
                recession: false,
                ..sample_record()
            },
        ])
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let response = get_dashboard_page(State(test_dataset())).await;

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_chart_exists(&html, "yearly-sales-by-year");
        assert_chart_exists(&html, "yearly-sales-by-month");
        assert_chart_exists(&html, "yearly-average-sales-by-type");
        assert_chart_exists(&html, "yearly-advertising-share");
        assert_eq!(count(&html, ".chart-item"), 4);
        assert_year_selector_enabled(&html, true);
        assert_selected_report_type(&html, ReportType::Yearly);
        assert_eq!(count(&html, "#select-year option[selected]"), 44);
    }

    #[tokio::test]
    async fn recession_selection_renders_recession_charts() {
        let form = DashboardForm {
            report_type: ReportType::Recession,
            years: vec![2008, 2009],
        };

        let response = update_dashboard(State(test_dataset()), HxRequest(true), Form(form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        assert_eq!(count(&html, ".chart-item"), 5);
        assert_chart_exists(&html, "recession-sales-by-year");
        assert_chart_exists(&html, "recession-unemployment-by-type");
        assert_year_selector_enabled(&html, false);
        assert_selected_report_type(&html, ReportType::Recession);
    }

    #[tokio::test]
    async fn disabled_year_selector_keeps_selection_in_hidden_inputs() {
        let form = DashboardForm {
            report_type: ReportType::Recession,
            years: vec![2008, 2009],
        };

        let response = update_dashboard(State(test_dataset()), HxRequest(true), Form(form))
            .await
            .unwrap();

        let html = parse_html_fragment(response).await;
        let hidden = Selector::parse("input[type='hidden'][name='years']").unwrap();
        let values: Vec<_> = html
            .select(&hidden)
            .filter_map(|input| input.value().attr("value"))
            .collect();
        assert_eq!(values, vec!["2008", "2009"]);
    }

    #[tokio::test]
    async fn yearly_selection_has_no_hidden_years() {
        let form = DashboardForm {
            report_type: ReportType::Yearly,
            years: vec![2008],
        };

        let response = update_dashboard(State(test_dataset()), HxRequest(true), Form(form))
            .await
            .unwrap();

        let html = parse_html_fragment(response).await;
        assert_eq!(count(&html, "input[type='hidden']"), 0);
        assert_eq!(count(&html, ".chart-item"), 4);
        assert_eq!(count(&html, "#select-year option[selected]"), 1);
    }

    #[tokio::test]
    async fn empty_yearly_selection_renders_no_charts() {
        let form = DashboardForm {
            report_type: ReportType::Yearly,
            years: vec![],
        };

        let response = update_dashboard(State(test_dataset()), HxRequest(true), Form(form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(count(&html, ".chart-item"), 0);
        assert_eq!(count(&html, "script"), 0);
        assert_year_selector_enabled(&html, true);
    }

    #[tokio::test]
    async fn plain_form_post_gets_full_page() {
        let form = DashboardForm {
            report_type: ReportType::Recession,
            years: vec![],
        };

        let response = update_dashboard(State(test_dataset()), HxRequest(false), Form(form))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(count(&html, "title"), 1);
        assert_eq!(count(&html, "#dashboard-content"), 1);
        assert_eq!(count(&html, ".chart-item"), 5);
    }

    #[tokio::test]
    async fn rejects_unsupported_year() {
        let form = DashboardForm {
            report_type: ReportType::Yearly,
            years: vec![2008, 1979],
        };

        let result = update_dashboard(State(test_dataset()), HxRequest(true), Form(form)).await;

        assert!(matches!(result, Err(Error::InvalidYear(1979))));
    }

    #[test]
    fn dashboard_form_handles_multiple_values() {
        let form_data = "report_type=Yearly+Statistics&years=2008&years=2009";
        let form: DashboardForm = serde_html_form::from_str(form_data).unwrap();
        assert_eq!(form.report_type, ReportType::Yearly);
        assert_eq!(form.years, vec![2008, 2009]);

        // No years are posted when nothing is selected
        let form_data = "report_type=Recession+Period+Statistics";
        let form: DashboardForm = serde_html_form::from_str(form_data).unwrap();
        assert_eq!(form.report_type, ReportType::Recession);
        assert_eq!(form.years, Vec::<u16>::new());
    }

    fn count(html: &Html, selector: &str) -> usize {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector).count()
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[track_caller]
    fn assert_year_selector_enabled(html: &Html, want_enabled: bool) {
        let selector = Selector::parse("select#select-year").unwrap();
        let year_selector = html
            .select(&selector)
            .next()
            .expect("year selector not found");
        let is_enabled = year_selector.value().attr("disabled").is_none();

        assert_eq!(
            is_enabled, want_enabled,
            "want year selector enabled = {want_enabled}, got {is_enabled}"
        );
    }

    #[track_caller]
    fn assert_selected_report_type(html: &Html, want: ReportType) {
        let selector = Selector::parse("select#dropdown-statistics option[selected]").unwrap();
        let selected: Vec<_> = html
            .select(&selector)
            .filter_map(|option| option.value().attr("value"))
            .collect();

        assert_eq!(selected, vec![want.label()]);
    }
}
