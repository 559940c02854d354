use crate::records::{SensorField, SensorRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One line series of the dashboard chart. A `None` entry renders as a gap.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub label: &'static str,
    pub data: Vec<Option<f64>>,
}

/// Chart payload: shared time axis plus one series per sensor channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub labels: Vec<DateTime<Utc>>,
    pub datasets: Vec<ChartSeries>,
}

/// Build the chart payload from an already-filtered record set.
///
/// Takes the `max_points` most recent records and presents them in
/// chronological order: sort descending by timestamp, truncate, reverse.
pub fn build_chart(records: &[SensorRecord], max_points: usize) -> ChartData {
    let mut recent: Vec<&SensorRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(max_points);
    recent.reverse();

    let labels = recent.iter().map(|r| r.timestamp).collect();
    let datasets = SensorField::ALL
        .iter()
        .map(|&field| ChartSeries {
            label: field.label(),
            data: recent.iter().map(|r| r.value(field)).collect(),
        })
        .collect();

    ChartData { labels, datasets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter_records, TimeFilter};
    use crate::records::empty_record;
    use chrono::{Duration, TimeZone};

    #[test]
    fn caps_to_most_recent_points_in_ascending_order() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        // 100 records spanning two days, oldest first, ~29 min apart
        let records: Vec<_> = (0..100)
            .map(|i| empty_record(now - Duration::minutes(29 * (99 - i))))
            .collect();

        let filtered = filter_records(&records, &TimeFilter::Last24Hours, now);
        let chart = build_chart(&filtered, 5);

        assert_eq!(chart.labels.len(), 5);
        // the five most recent records, chronological
        let expected: Vec<_> = (95..100)
            .map(|i| now - Duration::minutes(29 * (99 - i)))
            .collect();
        assert_eq!(chart.labels, expected);
        assert!(chart.labels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn emits_one_series_per_field_with_gaps_for_missing_values() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let mut a = empty_record(now - Duration::minutes(2));
        a.co = Some(0.5);
        let mut b = empty_record(now - Duration::minutes(1));
        b.co = None;
        b.temperature = Some(22.0);

        let chart = build_chart(&[a, b], 50);
        assert_eq!(chart.datasets.len(), 15);

        let co = chart.datasets.iter().find(|s| s.label == "CO").unwrap();
        assert_eq!(co.data, vec![Some(0.5), None]);

        let temp = chart
            .datasets
            .iter()
            .find(|s| s.label == "Temperature")
            .unwrap();
        assert_eq!(temp.data, vec![None, Some(22.0)]);
    }

    #[test]
    fn fewer_records_than_cap_keeps_all() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let records: Vec<_> = (0..3)
            .map(|i| empty_record(now - Duration::minutes(3 - i)))
            .collect();
        let chart = build_chart(&records, 50);
        assert_eq!(chart.labels.len(), 3);
    }
}
