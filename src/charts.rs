//! Chart definitions for the two dashboard views.
//!
//! Each view is a fixed list of chart slots. A slot declares which aggregation
//! feeds the chart and how it is presented:
//! - **Recession view**: five charts over the rows flagged as recession periods
//! - **Yearly view**: four charts over the rows in the selected years
//!
//! A built [ChartSpec] is turned into an ECharts option document with
//! [ChartSpec::to_chart].

use std::collections::BTreeSet;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType, JsFunction, Tooltip, Trigger},
    series::{Bar, Line, Pie},
};

use crate::{
    aggregation::{AggregateResult, GroupKey, Reduction, RowFilter, ValueColumn, aggregate},
    sales::Dataset,
};

/// How a chart draws its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// A line over ordered groups.
    Line,
    /// One bar per group.
    Bar,
    /// Each group's share of the total.
    Pie,
}

/// A declarative description of one chart position in a view.
#[derive(Debug, Clone, Copy)]
struct ChartSlot {
    id: &'static str,
    kind: ChartKind,
    group_key: GroupKey,
    value_column: ValueColumn,
    reduction: Reduction,
    title: &'static str,
    x_label: &'static str,
    y_label: &'static str,
    caption: &'static str,
}

impl ChartSlot {
    fn build(&self, dataset: &Dataset, filter: RowFilter) -> ChartSpec {
        ChartSpec {
            id: self.id,
            kind: self.kind,
            x_field: self.group_key.field_name(),
            y_field: self.value_column.field_name(),
            title: self.title,
            x_label: self.x_label,
            y_label: self.y_label,
            caption: self.caption,
            data: aggregate(
                dataset,
                self.group_key,
                self.value_column,
                self.reduction,
                filter,
            ),
        }
    }
}

const RECESSION_SLOTS: [ChartSlot; 5] = [
    ChartSlot {
        id: "recession-sales-by-year",
        kind: ChartKind::Line,
        group_key: GroupKey::Year,
        value_column: ValueColumn::AutomobileSales,
        reduction: Reduction::Mean,
        title: "Automobile Sales Fluctuation Over Recession Period",
        x_label: "Year",
        y_label: "Average Sales",
        caption: "Average monthly automobile sales for each year with a recession period.",
    },
    ChartSlot {
        id: "recession-average-sales-by-type",
        kind: ChartKind::Bar,
        group_key: GroupKey::VehicleType,
        value_column: ValueColumn::AutomobileSales,
        reduction: Reduction::Mean,
        title: "Average Vehicles Sold by Type",
        x_label: "Vehicle Type",
        y_label: "Average Sales",
        caption: "Average number of vehicles sold per month during recessions, by vehicle type.",
    },
    ChartSlot {
        id: "recession-advertising-share",
        kind: ChartKind::Pie,
        group_key: GroupKey::VehicleType,
        value_column: ValueColumn::AdvertisingExpenditure,
        reduction: Reduction::Sum,
        title: "Total Advertising Expenditure Share by Vehicle Type During Recessions",
        x_label: "Vehicle Type",
        y_label: "Advertising Expenditure",
        caption: "Share of the total advertising spend during recessions, by vehicle type.",
    },
    ChartSlot {
        id: "recession-total-sales-by-type",
        kind: ChartKind::Bar,
        group_key: GroupKey::VehicleType,
        value_column: ValueColumn::AutomobileSales,
        reduction: Reduction::Sum,
        title: "Vehicle Sales by Type",
        x_label: "Vehicle Type",
        y_label: "Sales",
        caption: "Total number of vehicles sold during recessions, by vehicle type.",
    },
    ChartSlot {
        id: "recession-unemployment-by-type",
        kind: ChartKind::Bar,
        group_key: GroupKey::VehicleType,
        value_column: ValueColumn::UnemploymentRate,
        reduction: Reduction::Mean,
        title: "Unemployment Rate by Vehicle Type",
        x_label: "Vehicle Type",
        y_label: "Unemployment Rate",
        caption: "Average unemployment rate during recession months, by vehicle type sold.",
    },
];

const YEARLY_SLOTS: [ChartSlot; 4] = [
    ChartSlot {
        id: "yearly-sales-by-year",
        kind: ChartKind::Line,
        group_key: GroupKey::Year,
        value_column: ValueColumn::AutomobileSales,
        reduction: Reduction::Mean,
        title: "Yearly Automobile Sales",
        x_label: "Year",
        y_label: "Average Sales",
        caption: "Average monthly automobile sales for each selected year.",
    },
    ChartSlot {
        id: "yearly-sales-by-month",
        kind: ChartKind::Line,
        group_key: GroupKey::Month,
        value_column: ValueColumn::AutomobileSales,
        reduction: Reduction::Sum,
        title: "Total Monthly Automobile Sales",
        x_label: "Month",
        y_label: "Sales",
        caption: "Total automobile sales per calendar month across the selected years.",
    },
    ChartSlot {
        id: "yearly-average-sales-by-type",
        kind: ChartKind::Bar,
        group_key: GroupKey::VehicleType,
        value_column: ValueColumn::AutomobileSales,
        reduction: Reduction::Mean,
        title: "Average Vehicles Sold by Vehicle Type",
        x_label: "Vehicle Type",
        y_label: "Average Sales",
        caption: "Average number of vehicles sold per month in the selected years, by vehicle type.",
    },
    ChartSlot {
        id: "yearly-advertising-share",
        kind: ChartKind::Pie,
        group_key: GroupKey::VehicleType,
        value_column: ValueColumn::AdvertisingExpenditure,
        reduction: Reduction::Sum,
        title: "Total Advertising Expenditure by Vehicle Type",
        x_label: "Vehicle Type",
        y_label: "Advertising Expenditure",
        caption: "Share of the total advertising spend in the selected years, by vehicle type.",
    },
];

/// One chart ready for rendering: its presentation and its aggregated data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// The HTML element ID of the chart container (kebab-case).
    pub id: &'static str,
    /// How the data is drawn.
    pub kind: ChartKind,
    /// The CSV column the data is grouped by.
    pub x_field: &'static str,
    /// The CSV column that is reduced.
    pub y_field: &'static str,
    /// The chart title.
    pub title: &'static str,
    /// The category axis name.
    pub x_label: &'static str,
    /// The value axis and series name.
    pub y_label: &'static str,
    /// Text shown below the chart.
    pub caption: &'static str,
    /// The aggregated data.
    pub data: AggregateResult,
}

/// Build the five recession view charts over the rows flagged as recessions.
pub fn recession_charts(dataset: &Dataset) -> Vec<ChartSpec> {
    RECESSION_SLOTS
        .iter()
        .map(|slot| slot.build(dataset, RowFilter::RecessionPeriods))
        .collect()
}

/// Build the four yearly view charts over the rows in `years`.
pub fn yearly_charts(dataset: &Dataset, years: &BTreeSet<u16>) -> Vec<ChartSpec> {
    YEARLY_SLOTS
        .iter()
        .map(|slot| slot.build(dataset, RowFilter::Years(years)))
        .collect()
}

impl ChartSpec {
    /// Convert the chart into an ECharts configuration.
    pub fn to_chart(&self) -> Chart {
        let chart = Chart::new()
            .title(Title::new().text(self.title).left("center"))
            .grid(
                Grid::new()
                    .left("3%")
                    .right("4%")
                    .bottom("3%")
                    .top(60)
                    .contain_label(true),
            );

        match self.kind {
            ChartKind::Line => self
                .with_axes(chart)
                .series(Line::new().name(self.y_label).data(self.data.values())),
            ChartKind::Bar => self
                .with_axes(chart)
                .series(Bar::new().name(self.y_label).data(self.data.values())),
            ChartKind::Pie => {
                let labels = self.data.labels();
                let slices: Vec<(f64, &str)> = self
                    .data
                    .values()
                    .into_iter()
                    .zip(&labels)
                    .filter_map(|(value, label)| value.map(|value| (value, label.as_str())))
                    .collect();

                chart
                    .tooltip(
                        Tooltip::new()
                            .trigger(Trigger::Item)
                            .value_formatter(number_formatter()),
                    )
                    .legend(Legend::new().top("bottom"))
                    .series(
                        Pie::new()
                            .name(self.y_label)
                            .radius("55%")
                            .data(slices),
                    )
            }
        }
    }

    fn with_axes(&self, chart: Chart) -> Chart {
        chart
            .tooltip(
                Tooltip::new()
                    .trigger(Trigger::Axis)
                    .value_formatter(number_formatter()),
            )
            .x_axis(
                Axis::new()
                    .type_(AxisType::Category)
                    .name(self.x_label)
                    .data(self.data.labels()),
            )
            .y_axis(
                Axis::new()
                    .type_(AxisType::Value)
                    .name(self.y_label)
                    .axis_label(AxisLabel::new().formatter(number_formatter())),
            )
    }
}

#[inline]
fn number_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const numberFormatter = new Intl.NumberFormat('en-US', {
              maximumFractionDigits: 2
            });
            return (number === null || number === undefined) ? \"-\" : numberFormatter.format(number);",
    )
}
