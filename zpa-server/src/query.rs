//! Filter/sort view over the in-memory dataset
//!
//! Queries never mutate the dataset. Each matching record is wrapped in a
//! [`RecordView`] that adds the derived `mvPerOrder` field for the response
//! only.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use zpa_common::metrics::mv_per_order;
use zpa_common::record::Weekday;
use zpa_common::Record;

/// Malformed query parameter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{param} must be a number, got {value:?}")]
    InvalidNumber { param: &'static str, value: String },

    #[error("{param} must be an integer, got {value:?}")]
    InvalidInteger { param: &'static str, value: String },

    #[error("{param} must be true or false, got {value:?}")]
    InvalidBool { param: &'static str, value: String },

    #[error("sortOrder must be asc or desc, got {0:?}")]
    InvalidSortOrder(String),

    #[error("Unknown sortBy field {0:?}")]
    UnknownSortField(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// Which half of a weekday metric pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMetricKind {
    NetMv,
    Pct,
}

/// Field a query can sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    ZipCode,
    DeliveryType,
    NetMv,
    OrderCount,
    Population,
    MarketPenetration,
    AreaName,
    MvPerOrder,
    Day(Weekday, DayMetricKind),
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "zipCode" => SortField::ZipCode,
            "deliveryType" => SortField::DeliveryType,
            "netMV" => SortField::NetMv,
            "orderCount" => SortField::OrderCount,
            "population" => SortField::Population,
            "marketPenetration" => SortField::MarketPenetration,
            "areaName" => SortField::AreaName,
            "mvPerOrder" => SortField::MvPerOrder,
            other => Weekday::ALL
                .iter()
                .find_map(|day| {
                    let metric = other.strip_prefix(day.json_prefix())?;
                    match metric {
                        "NetMV" => Some(SortField::Day(*day, DayMetricKind::NetMv)),
                        "Pct" => Some(SortField::Day(*day, DayMetricKind::Pct)),
                        _ => None,
                    }
                })
                .ok_or_else(|| QueryError::UnknownSortField(other.to_string()))?,
        };
        Ok(field)
    }
}

/// Comparable projection of one field
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Null,
    Number(f64),
    /// Lowercased
    Text(String),
}

impl SortField {
    fn value_of(&self, view: &RecordView<'_>) -> SortValue {
        let record = view.record;
        match self {
            SortField::ZipCode => SortValue::Text(record.zip_code.to_lowercase()),
            SortField::DeliveryType => SortValue::Text(record.delivery_type.to_lowercase()),
            SortField::NetMv => SortValue::Number(record.net_mv),
            SortField::OrderCount => SortValue::Number(record.order_count as f64),
            SortField::Population => record
                .population
                .map_or(SortValue::Null, |p| SortValue::Number(p as f64)),
            SortField::MarketPenetration => record
                .market_penetration
                .map_or(SortValue::Null, SortValue::Number),
            SortField::AreaName => record
                .area_name
                .as_ref()
                .map_or(SortValue::Null, |name| SortValue::Text(name.to_lowercase())),
            SortField::MvPerOrder => SortValue::Number(view.mv_per_order),
            SortField::Day(day, kind) => {
                let metric = record.weekdays.get(*day);
                SortValue::Number(match kind {
                    DayMetricKind::NetMv => metric.net_mv,
                    DayMetricKind::Pct => metric.pct,
                })
            }
        }
    }
}

/// Ascending order with nulls last
fn compare_ascending(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Null, SortValue::Null) => Ordering::Equal,
        (SortValue::Null, _) => Ordering::Greater,
        (_, SortValue::Null) => Ordering::Less,
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        // A field always projects to one kind
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
    }
}

/// Parsed `/api/data` parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuery {
    /// Substring of the ZIP code
    pub zip_code: Option<String>,
    /// Case-insensitive substring of the area name
    pub area_name: Option<String>,
    pub min_penetration: Option<f64>,
    pub max_penetration: Option<f64>,
    pub min_orders: Option<i64>,
    pub max_orders: Option<i64>,
    pub min_population: Option<i64>,
    pub max_population: Option<i64>,
    /// Exclude ZIPs with zero population
    pub hide_commercial: bool,
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
}

impl Default for DataQuery {
    fn default() -> Self {
        Self {
            zip_code: None,
            area_name: None,
            min_penetration: None,
            max_penetration: None,
            min_orders: None,
            max_orders: None,
            min_population: None,
            max_population: None,
            hide_commercial: true,
            sort_by: None,
            sort_order: SortOrder::Asc,
        }
    }
}

impl DataQuery {
    /// Parse raw query parameters; empty values count as absent
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self, QueryError> {
        let get = |name: &str| {
            params
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            zip_code: get("zipCode").map(str::to_string),
            area_name: get("areaName").map(str::to_string),
            min_penetration: parse_float("minPenetration", get("minPenetration"))?,
            max_penetration: parse_float("maxPenetration", get("maxPenetration"))?,
            min_orders: parse_int("minOrders", get("minOrders"))?,
            max_orders: parse_int("maxOrders", get("maxOrders"))?,
            min_population: parse_int("minPopulation", get("minPopulation"))?,
            max_population: parse_int("maxPopulation", get("maxPopulation"))?,
            hide_commercial: parse_bool("hideCommercial", get("hideCommercial"))?.unwrap_or(true),
            sort_by: get("sortBy").map(str::parse::<SortField>).transpose()?,
            sort_order: get("sortOrder")
                .map(str::parse::<SortOrder>)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// True when `record` passes every active filter
    pub fn matches(&self, record: &Record) -> bool {
        if self.hide_commercial && record.is_commercial() {
            return false;
        }
        if let Some(zip) = &self.zip_code {
            if !record.zip_code.contains(zip.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.area_name {
            let needle = needle.to_lowercase();
            let found = record
                .area_name
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        let penetration = record.market_penetration;
        let population = record.population.map(|p| p as i64);
        within(penetration, self.min_penetration, self.max_penetration)
            && within(Some(record.order_count), self.min_orders, self.max_orders)
            && within(population, self.min_population, self.max_population)
    }
}

/// Inclusive bounds check; a missing value fails any active bound
fn within<T: PartialOrd>(value: Option<T>, min: Option<T>, max: Option<T>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

fn parse_float(param: &'static str, raw: Option<&str>) -> Result<Option<f64>, QueryError> {
    raw.map(|value| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| QueryError::InvalidNumber {
                param,
                value: value.to_string(),
            })
    })
    .transpose()
}

fn parse_int(param: &'static str, raw: Option<&str>) -> Result<Option<i64>, QueryError> {
    raw.map(|value| {
        value.parse::<i64>().map_err(|_| QueryError::InvalidInteger {
            param,
            value: value.to_string(),
        })
    })
    .transpose()
}

fn parse_bool(param: &'static str, raw: Option<&str>) -> Result<Option<bool>, QueryError> {
    raw.map(|value| match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(QueryError::InvalidBool {
            param,
            value: value.to_string(),
        }),
    })
    .transpose()
}

/// Record plus fields derived at query time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView<'a> {
    #[serde(flatten)]
    pub record: &'a Record,
    pub mv_per_order: f64,
}

impl<'a> RecordView<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self {
            record,
            mv_per_order: mv_per_order(record.net_mv, record.order_count),
        }
    }
}

/// `/api/data` response body
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput<'a> {
    pub data: Vec<RecordView<'a>>,
    pub total: usize,
    /// Raw parameters as received
    pub filters: BTreeMap<String, String>,
}

/// Filter, derive and sort
///
/// The sort is stable: ties keep dataset order.
pub fn run_query<'a>(records: &'a [Record], query: &DataQuery) -> Vec<RecordView<'a>> {
    let views = records
        .iter()
        .filter(|record| query.matches(record))
        .map(RecordView::new);

    let Some(field) = query.sort_by else {
        return views.collect();
    };

    let mut keyed: Vec<(SortValue, RecordView<'a>)> =
        views.map(|view| (field.value_of(&view), view)).collect();
    keyed.sort_by(|(a, _), (b, _)| match query.sort_order {
        SortOrder::Asc => compare_ascending(a, b),
        SortOrder::Desc => compare_ascending(b, a),
    });
    keyed.into_iter().map(|(_, view)| view).collect()
}
