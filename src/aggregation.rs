//! Grouped aggregations over the sales dataset.
//!
//! Rows are partitioned by a [GroupKey] and one [ValueColumn] is reduced per
//! partition with a [Reduction]. Results keep the natural order of ordinal keys
//! (years, months) and the first-seen order of categorical keys (vehicle types).

use std::{
    collections::{BTreeSet, HashMap},
    fmt::Display,
};

use time::Month;

use crate::sales::{Dataset, SalesRecord};

/// The column used to partition rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Group by calendar year.
    Year,
    /// Group by calendar month, across all selected years.
    Month,
    /// Group by vehicle type.
    VehicleType,
}

impl GroupKey {
    /// The column name as it appears in the source CSV.
    pub fn field_name(self) -> &'static str {
        match self {
            GroupKey::Year => "Year",
            GroupKey::Month => "Month",
            GroupKey::VehicleType => "Vehicle_Type",
        }
    }

    fn value_of(self, record: &SalesRecord) -> GroupValue {
        match self {
            GroupKey::Year => GroupValue::Year(record.year),
            GroupKey::Month => GroupValue::Month(record.month),
            GroupKey::VehicleType => GroupValue::VehicleType(record.vehicle_type.clone()),
        }
    }

    fn is_ordinal(self) -> bool {
        matches!(self, GroupKey::Year | GroupKey::Month)
    }
}

/// The numeric column that is reduced within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    /// Number of vehicles sold.
    AutomobileSales,
    /// Advertising spend.
    AdvertisingExpenditure,
    /// Unemployment rate as a percentage.
    UnemploymentRate,
}

impl ValueColumn {
    /// The column name as it appears in the source CSV.
    pub fn field_name(self) -> &'static str {
        match self {
            ValueColumn::AutomobileSales => "Automobile_Sales",
            ValueColumn::AdvertisingExpenditure => "Advertising_Expenditure",
            ValueColumn::UnemploymentRate => "unemployment_rate",
        }
    }

    fn value_of(self, record: &SalesRecord) -> f64 {
        match self {
            ValueColumn::AutomobileSales => record.automobile_sales,
            ValueColumn::AdvertisingExpenditure => record.advertising_expenditure,
            ValueColumn::UnemploymentRate => record.unemployment_rate,
        }
    }
}

/// How the values within a group are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// The arithmetic mean.
    Mean,
    /// The total.
    Sum,
}

/// Selects which rows take part in an aggregation.
#[derive(Debug, Clone, Copy)]
pub enum RowFilter<'a> {
    /// Every row.
    All,
    /// Only rows flagged as falling within a recession.
    RecessionPeriods,
    /// Only rows whose year is in the set.
    Years(&'a BTreeSet<u16>),
}

impl RowFilter<'_> {
    /// Whether `record` passes the filter.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::RecessionPeriods => record.recession,
            RowFilter::Years(years) => years.contains(&record.year),
        }
    }
}

/// The key of one group in an [AggregateResult].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupValue {
    /// A calendar year.
    Year(u16),
    /// A calendar month.
    Month(Month),
    /// A vehicle type.
    VehicleType(String),
}

impl GroupValue {
    fn ordinal(&self) -> u16 {
        match self {
            GroupValue::Year(year) => *year,
            GroupValue::Month(month) => u8::from(*month).into(),
            GroupValue::VehicleType(_) => 0,
        }
    }
}

impl Display for GroupValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupValue::Year(year) => write!(f, "{year}"),
            GroupValue::Month(month) => f.write_str(month_abbreviation(*month)),
            GroupValue::VehicleType(vehicle_type) => f.write_str(vehicle_type),
        }
    }
}

/// Formats a month as a three-letter abbreviation, e.g. "Jan".
pub fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// A group key and its reduced value.
///
/// `value` is `None` when the group has no data to reduce.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatePoint {
    /// The group key.
    pub key: GroupValue,
    /// The reduced value, or `None` for no data.
    pub value: Option<f64>,
}

/// An ordered sequence of groups with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    points: Vec<AggregatePoint>,
}

impl AggregateResult {
    /// The groups in display order.
    pub fn points(&self) -> &[AggregatePoint] {
        &self.points
    }

    /// Whether no rows matched the filter.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The group keys formatted for use as chart labels.
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|point| point.key.to_string()).collect()
    }

    /// The reduced values in the same order as [AggregateResult::labels].
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|point| point.value).collect()
    }

    /// The value for `key`, if the group exists and has data.
    pub fn value_for(&self, key: &GroupValue) -> Option<f64> {
        self.points
            .iter()
            .find(|point| point.key == *key)
            .and_then(|point| point.value)
    }

    /// The sum of all values that have data.
    pub fn total(&self) -> f64 {
        self.points.iter().filter_map(|point| point.value).sum()
    }
}

/// Partition the filtered rows by `group_key` and take the mean of `value_column`.
pub fn group_mean(
    dataset: &Dataset,
    group_key: GroupKey,
    value_column: ValueColumn,
    filter: RowFilter,
) -> AggregateResult {
    aggregate(dataset, group_key, value_column, Reduction::Mean, filter)
}

/// Partition the filtered rows by `group_key` and sum `value_column`.
pub fn group_sum(
    dataset: &Dataset,
    group_key: GroupKey,
    value_column: ValueColumn,
    filter: RowFilter,
) -> AggregateResult {
    aggregate(dataset, group_key, value_column, Reduction::Sum, filter)
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn reduce(self, reduction: Reduction) -> Option<f64> {
        if self.count == 0 {
            return None;
        }

        match reduction {
            Reduction::Mean => Some(self.sum / self.count as f64),
            Reduction::Sum => Some(self.sum),
        }
    }
}

/// Partition the filtered rows by `group_key` and reduce `value_column` with `reduction`.
pub fn aggregate(
    dataset: &Dataset,
    group_key: GroupKey,
    value_column: ValueColumn,
    reduction: Reduction,
    filter: RowFilter,
) -> AggregateResult {
    let mut index_by_key: HashMap<GroupValue, usize> = HashMap::new();
    let mut groups: Vec<(GroupValue, Accumulator)> = Vec::new();

    for record in dataset.records().iter().filter(|record| filter.matches(record)) {
        let key = group_key.value_of(record);
        let index = *index_by_key.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Accumulator::default()));
            groups.len() - 1
        });

        let accumulator = &mut groups[index].1;
        accumulator.sum += value_column.value_of(record);
        accumulator.count += 1;
    }

    if group_key.is_ordinal() {
        groups.sort_by_key(|(key, _)| key.ordinal());
    }

    let points = groups
        .into_iter()
        .map(|(key, accumulator)| AggregatePoint {
            key,
            value: accumulator.reduce(reduction),
        })
        .collect();

    AggregateResult { points }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use time::Month;

    use crate::{
        aggregation::{
            Accumulator, GroupKey, GroupValue, Reduction, RowFilter, ValueColumn, group_mean,
            group_sum,
        },
        sales::{Dataset, SalesRecord},
        test_utils::sample_record,
    };

    fn record(year: u16, vehicle_type: &str, sales: f64, recession: bool) -> SalesRecord {
        SalesRecord {
            year,
            vehicle_type: vehicle_type.to_owned(),
            automobile_sales: sales,
            recession,
            ..sample_record()
        }
    }

    #[test]
    fn mean_by_year_averages_each_year() {
        let dataset = Dataset::new(vec![
            record(2009, "Car", 30.0, false),
            record(2008, "Car", 100.0, false),
            record(2008, "Truck", 200.0, false),
            record(2009, "Truck", 10.0, false),
        ]);

        let result = group_mean(
            &dataset,
            GroupKey::Year,
            ValueColumn::AutomobileSales,
            RowFilter::All,
        );

        assert_eq!(result.labels(), vec!["2008", "2009"]);
        assert_eq!(result.values(), vec![Some(150.0), Some(20.0)]);
    }

    #[test]
    fn mean_by_year_only_contains_selected_years_present_in_data() {
        let dataset = Dataset::new(vec![
            record(2008, "Car", 100.0, false),
            record(2010, "Car", 300.0, false),
        ]);
        let years = BTreeSet::from([2008, 2009]);

        let result = group_mean(
            &dataset,
            GroupKey::Year,
            ValueColumn::AutomobileSales,
            RowFilter::Years(&years),
        );

        assert_eq!(result.labels(), vec!["2008"]);
        assert_eq!(result.value_for(&GroupValue::Year(2008)), Some(100.0));
    }

    #[test]
    fn recession_filter_excludes_other_rows() {
        let dataset = Dataset::new(vec![
            record(2008, "Car", 100.0, true),
            record(2008, "Car", 200.0, false),
        ]);

        let result = group_mean(
            &dataset,
            GroupKey::VehicleType,
            ValueColumn::AutomobileSales,
            RowFilter::RecessionPeriods,
        );

        assert_eq!(
            result.value_for(&GroupValue::VehicleType("Car".to_owned())),
            Some(100.0)
        );
    }

    #[test]
    fn vehicle_types_keep_first_seen_order() {
        let dataset = Dataset::new(vec![
            record(2008, "Sports", 1.0, false),
            record(2008, "Executivecar", 2.0, false),
            record(2009, "Sports", 3.0, false),
            record(2009, "Mediumfamilycar", 4.0, false),
        ]);

        let result = group_sum(
            &dataset,
            GroupKey::VehicleType,
            ValueColumn::AutomobileSales,
            RowFilter::All,
        );

        assert_eq!(
            result.labels(),
            vec!["Sports", "Executivecar", "Mediumfamilycar"]
        );
        assert_eq!(result.values(), vec![Some(4.0), Some(2.0), Some(4.0)]);
    }

    #[test]
    fn months_are_in_calendar_order() {
        let dataset = Dataset::new(vec![
            SalesRecord {
                month: Month::March,
                automobile_sales: 3.0,
                ..sample_record()
            },
            SalesRecord {
                month: Month::January,
                automobile_sales: 1.0,
                ..sample_record()
            },
            SalesRecord {
                month: Month::March,
                automobile_sales: 4.0,
                ..sample_record()
            },
        ]);

        let result = group_sum(
            &dataset,
            GroupKey::Month,
            ValueColumn::AutomobileSales,
            RowFilter::All,
        );

        assert_eq!(result.labels(), vec!["Jan", "Mar"]);
        assert_eq!(result.values(), vec![Some(1.0), Some(7.0)]);
    }

    #[test]
    fn sum_conserves_total_of_filtered_rows() {
        let dataset = Dataset::new(vec![
            SalesRecord {
                vehicle_type: "Car".to_owned(),
                advertising_expenditure: 1_250.5,
                recession: true,
                ..sample_record()
            },
            SalesRecord {
                vehicle_type: "Truck".to_owned(),
                advertising_expenditure: 3_000.0,
                recession: true,
                ..sample_record()
            },
            SalesRecord {
                vehicle_type: "Car".to_owned(),
                advertising_expenditure: 749.5,
                recession: true,
                ..sample_record()
            },
            SalesRecord {
                vehicle_type: "Car".to_owned(),
                advertising_expenditure: 10_000.0,
                recession: false,
                ..sample_record()
            },
        ]);

        let result = group_sum(
            &dataset,
            GroupKey::VehicleType,
            ValueColumn::AdvertisingExpenditure,
            RowFilter::RecessionPeriods,
        );

        assert_eq!(result.total(), 5_000.0);
    }

    #[test]
    fn no_matching_rows_gives_empty_result() {
        let dataset = Dataset::new(vec![record(2008, "Car", 100.0, false)]);

        let result = group_mean(
            &dataset,
            GroupKey::Year,
            ValueColumn::AutomobileSales,
            RowFilter::RecessionPeriods,
        );

        assert!(result.is_empty());
    }

    #[test]
    fn empty_group_reports_no_data() {
        let accumulator = Accumulator::default();

        assert_eq!(accumulator.reduce(Reduction::Mean), None);
        assert_eq!(accumulator.reduce(Reduction::Sum), None);
    }
}
