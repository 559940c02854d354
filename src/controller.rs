use crate::chart::{build_chart, ChartData};
use crate::filter::{filter_records, FilterCriteria};
use crate::pagination::{
    page_slice, total_pages, DropdownUpdate, PageState, PaginationControls, PAGE_SIZE,
};
use crate::records::{format_value, SensorField, SensorRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One formatted table row. `timestamp` doubles as the row's detail key.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<String>,
}

impl TableRow {
    fn from_record(record: &SensorRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            values: SensorField::ALL
                .iter()
                .map(|&field| format_value(record.value(field)))
                .collect(),
        }
    }
}

/// All fields of a single record, formatted for the detail modal.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDetail {
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<DetailField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationView {
    pub page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    /// When true the page-select options must be rebuilt; otherwise the
    /// selected value is simply reasserted.
    pub rebuild_options: bool,
}

/// Everything the dashboard page needs for one redraw.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<Utc>,
    pub criteria: FilterCriteria,
    pub total_records: usize,
    pub chart: ChartData,
    pub rows: Vec<TableRow>,
    pub pagination: PaginationView,
}

/// Owns the dashboard's UI state: the active filter criteria and the
/// current table page. The record set itself stays in the store; every
/// redraw re-derives the view from scratch.
pub struct DashboardController {
    criteria: FilterCriteria,
    page: PageState,
    controls: PaginationControls,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardController {
    pub fn new() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            page: PageState::default(),
            controls: PaginationControls::new(),
        }
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.criteria
    }

    /// Apply a new filter selection. The table returns to page 1.
    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.page = PageState::default();
    }

    /// Restore the defaults: last 24 hours, 50 chart points, page 1.
    pub fn reset(&mut self) {
        self.set_filter(FilterCriteria::default());
    }

    /// Select a table page. Out-of-range values are clamped at view time.
    pub fn select_page(&mut self, page: usize) {
        self.page = PageState { page: page.max(1) };
    }

    /// Derive the full dashboard view from the fetched record set.
    pub fn view(&mut self, records: &[SensorRecord], now: DateTime<Utc>) -> DashboardView {
        let filtered = filter_records(records, &self.criteria.filter, now);

        let pages = total_pages(filtered.len(), PAGE_SIZE);
        let page = self.page.page.min(pages.max(1));
        self.page = PageState { page };

        let chart = build_chart(&filtered, self.criteria.max_points);
        let rows = page_slice(&filtered, page, PAGE_SIZE)
            .iter()
            .map(TableRow::from_record)
            .collect();

        let rebuild = self.controls.reconcile(pages) == DropdownUpdate::Rebuild;

        DashboardView {
            generated_at: now,
            criteria: self.criteria,
            total_records: filtered.len(),
            chart,
            rows,
            pagination: PaginationView {
                page,
                total_pages: pages,
                has_prev: page > 1,
                has_next: page < pages,
                rebuild_options: rebuild,
            },
        }
    }
}

/// Detail for the record with the given timestamp, if present.
pub fn record_detail(records: &[SensorRecord], timestamp: DateTime<Utc>) -> Option<RecordDetail> {
    records
        .iter()
        .find(|r| r.timestamp == timestamp)
        .map(|record| RecordDetail {
            timestamp: record.timestamp,
            fields: SensorField::ALL
                .iter()
                .map(|&field| DetailField {
                    label: field.label(),
                    value: format_value(record.value(field)),
                })
                .collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TimeFilter;
    use crate::records::empty_record;
    use chrono::{Duration, TimeZone};

    fn recent_records(now: DateTime<Utc>, count: usize) -> Vec<SensorRecord> {
        (0..count)
            .map(|i| empty_record(now - Duration::minutes((count - i) as i64)))
            .collect()
    }

    #[test]
    fn view_paginates_filtered_records() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let records = recent_records(now, 25);
        let mut controller = DashboardController::new();

        let view = controller.view(&records, now);
        assert_eq!(view.total_records, 25);
        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.pagination.total_pages, 3);
        assert!(!view.pagination.has_prev);
        assert!(view.pagination.has_next);

        controller.select_page(3);
        let view = controller.view(&records, now);
        assert_eq!(view.rows.len(), 5);
        assert!(view.pagination.has_prev);
        assert!(!view.pagination.has_next);
    }

    #[test]
    fn changing_the_filter_resets_to_page_one() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let records = recent_records(now, 30);
        let mut controller = DashboardController::new();

        controller.select_page(3);
        assert_eq!(controller.view(&records, now).pagination.page, 3);

        controller.set_filter(FilterCriteria {
            filter: TimeFilter::LastHour,
            max_points: 50,
        });
        assert_eq!(controller.view(&records, now).pagination.page, 1);
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let records = recent_records(now, 12);
        let mut controller = DashboardController::new();

        controller.select_page(99);
        let view = controller.view(&records, now);
        assert_eq!(view.pagination.page, 2);
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn empty_filtered_set_yields_no_rows_and_no_pages() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let stale = vec![empty_record(now - Duration::days(30))];
        let mut controller = DashboardController::new();

        let view = controller.view(&stale, now);
        assert_eq!(view.total_records, 0);
        assert!(view.rows.is_empty());
        assert_eq!(view.pagination.total_pages, 0);
        assert_eq!(view.pagination.page, 1);
        assert!(!view.pagination.has_next);
    }

    #[test]
    fn dropdown_rebuild_flag_follows_page_count_changes() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let records = recent_records(now, 25);
        let mut controller = DashboardController::new();

        assert!(controller.view(&records, now).pagination.rebuild_options);
        assert!(!controller.view(&records, now).pagination.rebuild_options);

        let grown = recent_records(now, 45);
        assert!(controller.view(&grown, now).pagination.rebuild_options);
    }

    #[test]
    fn null_channel_renders_na_in_row_and_detail() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let mut record = empty_record(now - Duration::minutes(1));
        record.temperature = Some(21.0);
        record.co = None;
        let records = vec![record];

        let mut controller = DashboardController::new();
        let view = controller.view(&records, now);
        let row = &view.rows[0];
        // column order: temperature, humidity, LPG, CO, ...
        assert_eq!(row.values[0], "21.000");
        assert_eq!(row.values[3], "N/A");

        let detail = record_detail(&records, records[0].timestamp).unwrap();
        let co = detail.fields.iter().find(|f| f.label == "CO").unwrap();
        assert_eq!(co.value, "N/A");
        let temp = detail
            .fields
            .iter()
            .find(|f| f.label == "Temperature")
            .unwrap();
        assert_eq!(temp.value, "21.000");
    }

    #[test]
    fn detail_lookup_misses_unknown_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let records = recent_records(now, 3);
        assert!(record_detail(&records, now + Duration::hours(1)).is_none());
    }
}
