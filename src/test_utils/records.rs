use time::Month;

use crate::sales::SalesRecord;

/// A non-recession record with zeroed values, meant to be overridden with
/// struct update syntax.
pub(crate) fn sample_record() -> SalesRecord {
    SalesRecord {
        year: 2000,
        month: Month::January,
        vehicle_type: "Sports".to_owned(),
        automobile_sales: 0.0,
        advertising_expenditure: 0.0,
        unemployment_rate: 0.0,
        recession: false,
    }
}
