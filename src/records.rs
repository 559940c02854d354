use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped reading from the MQ sensor array.
///
/// Field names mirror the backend's JSON casing. Every sensor channel is
/// optional; a reading where a channel was not sampled carries `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    #[serde(with = "loose_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default, rename = "LPG")]
    pub lpg: Option<f64>,
    #[serde(default, rename = "CO")]
    pub co: Option<f64>,
    #[serde(default, rename = "Smoke")]
    pub smoke: Option<f64>,
    #[serde(default, rename = "CO_MQ7")]
    pub co_mq7: Option<f64>,
    #[serde(default, rename = "CH4")]
    pub ch4: Option<f64>,
    #[serde(default, rename = "CO_MQ9")]
    pub co_mq9: Option<f64>,
    #[serde(default, rename = "CO2")]
    pub co2: Option<f64>,
    #[serde(default, rename = "NH3")]
    pub nh3: Option<f64>,
    #[serde(default, rename = "NOx")]
    pub nox: Option<f64>,
    #[serde(default, rename = "Alcohol")]
    pub alcohol: Option<f64>,
    #[serde(default, rename = "Benzene")]
    pub benzene: Option<f64>,
    #[serde(default, rename = "H2")]
    pub h2: Option<f64>,
    #[serde(default, rename = "Air")]
    pub air: Option<f64>,
}

/// Response envelope of the backend's `/api/mq-data` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqDataResponse {
    #[serde(default)]
    pub mq_data: Vec<SensorRecord>,
}

/// The sensor channels, in table/chart column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorField {
    Temperature,
    Humidity,
    Lpg,
    Co,
    Smoke,
    CoMq7,
    Ch4,
    CoMq9,
    Co2,
    Nh3,
    Nox,
    Alcohol,
    Benzene,
    H2,
    Air,
}

impl SensorField {
    pub const ALL: [SensorField; 15] = [
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::Lpg,
        SensorField::Co,
        SensorField::Smoke,
        SensorField::CoMq7,
        SensorField::Ch4,
        SensorField::CoMq9,
        SensorField::Co2,
        SensorField::Nh3,
        SensorField::Nox,
        SensorField::Alcohol,
        SensorField::Benzene,
        SensorField::H2,
        SensorField::Air,
    ];

    /// Display label, also used as the chart series label.
    pub fn label(self) -> &'static str {
        match self {
            SensorField::Temperature => "Temperature",
            SensorField::Humidity => "Humidity",
            SensorField::Lpg => "LPG",
            SensorField::Co => "CO",
            SensorField::Smoke => "Smoke",
            SensorField::CoMq7 => "CO_MQ7",
            SensorField::Ch4 => "CH4",
            SensorField::CoMq9 => "CO_MQ9",
            SensorField::Co2 => "CO2",
            SensorField::Nh3 => "NH3",
            SensorField::Nox => "NOx",
            SensorField::Alcohol => "Alcohol",
            SensorField::Benzene => "Benzene",
            SensorField::H2 => "H2",
            SensorField::Air => "Air",
        }
    }
}

impl SensorRecord {
    pub fn value(&self, field: SensorField) -> Option<f64> {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Lpg => self.lpg,
            SensorField::Co => self.co,
            SensorField::Smoke => self.smoke,
            SensorField::CoMq7 => self.co_mq7,
            SensorField::Ch4 => self.ch4,
            SensorField::CoMq9 => self.co_mq9,
            SensorField::Co2 => self.co2,
            SensorField::Nh3 => self.nh3,
            SensorField::Nox => self.nox,
            SensorField::Alcohol => self.alcohol,
            SensorField::Benzene => self.benzene,
            SensorField::H2 => self.h2,
            SensorField::Air => self.air,
        }
    }
}

/// Format a sensor value for table and detail display: three decimal
/// places, or "N/A" when the channel is absent.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "N/A".to_string(),
    }
}

/// Parse a backend timestamp. The original backend emits Python
/// `isoformat()` strings without a UTC offset, so a naive datetime is
/// treated as UTC; full RFC 3339 is accepted as well.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

mod loose_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

#[cfg(test)]
pub(crate) fn empty_record(timestamp: DateTime<Utc>) -> SensorRecord {
    SensorRecord {
        timestamp,
        temperature: None,
        humidity: None,
        lpg: None,
        co: None,
        smoke: None,
        co_mq7: None,
        ch4: None,
        co_mq9: None,
        co2: None,
        nh3: None,
        nox: None,
        alcohol: None,
        benzene: None,
        h2: None,
        air: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_backend_record_with_nulls_and_missing_fields() {
        let json = r#"{
            "timestamp": "2024-06-01T12:30:00",
            "temperature": 21.5,
            "humidity": 48.2,
            "LPG": 0.104,
            "CO": null,
            "Smoke": 0.002
        }"#;

        let record: SensorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.temperature, Some(21.5));
        assert_eq!(record.co, None);
        assert_eq!(record.ch4, None);
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn parses_rfc3339_and_naive_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T08:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T08:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T08:00:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn formats_values_to_three_decimals_or_na() {
        assert_eq!(format_value(Some(1.23456)), "1.235");
        assert_eq!(format_value(Some(0.0)), "0.000");
        assert_eq!(format_value(None), "N/A");
    }

    #[test]
    fn field_lookup_matches_struct_fields() {
        let mut record = empty_record(Utc::now());
        record.nox = Some(3.5);
        record.air = Some(9.0);
        assert_eq!(record.value(SensorField::Nox), Some(3.5));
        assert_eq!(record.value(SensorField::Air), Some(9.0));
        assert_eq!(record.value(SensorField::Co), None);
        assert_eq!(SensorField::ALL.len(), 15);
    }

    #[test]
    fn empty_envelope_deserializes() {
        let resp: MqDataResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.mq_data.is_empty());
    }
}
