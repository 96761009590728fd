//! Enriched dataset record
//!
//! One record per ZIP code. The JSON shape (camelCase keys, `netMV`,
//! `<weekday>NetMV` / `<weekday>Pct`) is the on-disk snapshot contract shared
//! by the pipeline, the area-name passes and the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Area label used when no resolver produced a name
pub const AREA_NAME_PLACEHOLDER: &str = "Unknown Area";

/// Enriched delivery record keyed by ZIP code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub zip_code: String,
    #[serde(default)]
    pub delivery_type: String,
    #[serde(rename = "netMV", default)]
    pub net_mv: f64,
    #[serde(default)]
    pub order_count: i64,
    /// Residential population of the ZCTA; `None` when the lookup failed
    #[serde(default)]
    pub population: Option<u64>,
    /// `orderCount / population * 100`, six decimals; `None` without population
    #[serde(default)]
    pub market_penetration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    #[serde(flatten)]
    pub weekdays: WeekdayMetrics,
    /// Keys written by other tools, carried through re-saves untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Record with every metric at its default
    pub fn new(zip_code: impl Into<String>) -> Self {
        Self {
            zip_code: zip_code.into(),
            delivery_type: String::new(),
            net_mv: 0.0,
            order_count: 0,
            population: None,
            market_penetration: None,
            area_name: None,
            weekdays: WeekdayMetrics::default(),
            extra: Map::new(),
        }
    }

    /// Commercial ZIPs have no residential population
    pub fn is_commercial(&self) -> bool {
        self.population == Some(0)
    }
}

/// Day of the week carrying a value/percentage metric pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Prefix used by the input CSV columns (`TUE_NET_MV`, `TUE_MV_PCT`)
    pub fn csv_prefix(&self) -> &'static str {
        match self {
            Weekday::Monday => "MON",
            Weekday::Tuesday => "TUE",
            Weekday::Wednesday => "WED",
            Weekday::Thursday => "THU",
            Weekday::Friday => "FRI",
            Weekday::Saturday => "SAT",
            Weekday::Sunday => "SUN",
        }
    }

    /// Prefix used by the JSON keys (`tuesdayNetMV`, `tuesdayPct`)
    pub fn json_prefix(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn net_mv_column(&self) -> String {
        format!("{}_NET_MV", self.csv_prefix())
    }

    pub fn pct_column(&self) -> String {
        format!("{}_MV_PCT", self.csv_prefix())
    }
}

/// Net merchandise value and its share for one weekday
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayMetric {
    pub net_mv: f64,
    pub pct: f64,
}

/// Per-weekday raw metrics, flattened into the record's JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekdayMetrics {
    #[serde(rename = "mondayNetMV", default)]
    pub monday_net_mv: f64,
    #[serde(rename = "mondayPct", default)]
    pub monday_pct: f64,
    #[serde(rename = "tuesdayNetMV", default)]
    pub tuesday_net_mv: f64,
    #[serde(rename = "tuesdayPct", default)]
    pub tuesday_pct: f64,
    #[serde(rename = "wednesdayNetMV", default)]
    pub wednesday_net_mv: f64,
    #[serde(rename = "wednesdayPct", default)]
    pub wednesday_pct: f64,
    #[serde(rename = "thursdayNetMV", default)]
    pub thursday_net_mv: f64,
    #[serde(rename = "thursdayPct", default)]
    pub thursday_pct: f64,
    #[serde(rename = "fridayNetMV", default)]
    pub friday_net_mv: f64,
    #[serde(rename = "fridayPct", default)]
    pub friday_pct: f64,
    #[serde(rename = "saturdayNetMV", default)]
    pub saturday_net_mv: f64,
    #[serde(rename = "saturdayPct", default)]
    pub saturday_pct: f64,
    #[serde(rename = "sundayNetMV", default)]
    pub sunday_net_mv: f64,
    #[serde(rename = "sundayPct", default)]
    pub sunday_pct: f64,
}

impl WeekdayMetrics {
    pub fn get(&self, day: Weekday) -> DayMetric {
        let (net_mv, pct) = match day {
            Weekday::Monday => (self.monday_net_mv, self.monday_pct),
            Weekday::Tuesday => (self.tuesday_net_mv, self.tuesday_pct),
            Weekday::Wednesday => (self.wednesday_net_mv, self.wednesday_pct),
            Weekday::Thursday => (self.thursday_net_mv, self.thursday_pct),
            Weekday::Friday => (self.friday_net_mv, self.friday_pct),
            Weekday::Saturday => (self.saturday_net_mv, self.saturday_pct),
            Weekday::Sunday => (self.sunday_net_mv, self.sunday_pct),
        };
        DayMetric { net_mv, pct }
    }

    pub fn set(&mut self, day: Weekday, metric: DayMetric) {
        let (net_mv, pct) = match day {
            Weekday::Monday => (&mut self.monday_net_mv, &mut self.monday_pct),
            Weekday::Tuesday => (&mut self.tuesday_net_mv, &mut self.tuesday_pct),
            Weekday::Wednesday => (&mut self.wednesday_net_mv, &mut self.wednesday_pct),
            Weekday::Thursday => (&mut self.thursday_net_mv, &mut self.thursday_pct),
            Weekday::Friday => (&mut self.friday_net_mv, &mut self.friday_pct),
            Weekday::Saturday => (&mut self.saturday_net_mv, &mut self.saturday_pct),
            Weekday::Sunday => (&mut self.sunday_net_mv, &mut self.sunday_pct),
        };
        *net_mv = metric.net_mv;
        *pct = metric.pct;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_keys() {
        let mut record = Record::new("10001");
        record.net_mv = 1000.0;
        record.order_count = 50;
        record.weekdays.set(
            Weekday::Tuesday,
            DayMetric {
                net_mv: 12.5,
                pct: 0.25,
            },
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["zipCode"], "10001");
        assert_eq!(value["netMV"], 1000.0);
        assert_eq!(value["orderCount"], 50);
        assert_eq!(value["population"], Value::Null);
        assert_eq!(value["marketPenetration"], Value::Null);
        assert_eq!(value["tuesdayNetMV"], 12.5);
        assert_eq!(value["tuesdayPct"], 0.25);
        assert_eq!(value["sundayPct"], 0.0);
        assert!(value.get("areaName").is_none());
    }

    #[test]
    fn test_legacy_snapshot_without_all_weekdays() {
        // Snapshots written before Monday/Friday/Saturday columns existed
        let value = json!({
            "zipCode": "07030",
            "deliveryType": "STANDARD",
            "netMV": 250.5,
            "orderCount": 12,
            "population": 58000,
            "marketPenetration": 0.02069,
            "tuesdayNetMV": 10.0,
            "tuesdayPct": 0.04,
            "areaName": "Hoboken, Hudson County"
        });

        let record: Record = serde_json::from_value(value).unwrap();
        assert_eq!(record.population, Some(58000));
        assert_eq!(record.weekdays.get(Weekday::Tuesday).net_mv, 10.0);
        assert_eq!(record.weekdays.get(Weekday::Monday), DayMetric::default());
        assert_eq!(record.area_name.as_deref(), Some("Hoboken, Hudson County"));
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let value = json!({
            "zipCode": "10002",
            "orderCount": 3,
            "population": null,
            "marketPenetration": null,
            "reviewedBy": "ops"
        });

        let record: Record = serde_json::from_value(value).unwrap();
        assert_eq!(record.extra.get("reviewedBy"), Some(&json!("ops")));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["reviewedBy"], "ops");
    }

    #[test]
    fn test_commercial() {
        let mut record = Record::new("10155");
        assert!(!record.is_commercial());
        record.population = Some(0);
        assert!(record.is_commercial());
    }

    #[test]
    fn test_weekday_columns() {
        assert_eq!(Weekday::Thursday.net_mv_column(), "THU_NET_MV");
        assert_eq!(Weekday::Sunday.pct_column(), "SUN_MV_PCT");
    }
}
