use crate::controller::{record_detail, DashboardController};
use crate::filter::{FilterCriteria, TimeFilter, DEFAULT_MAX_POINTS};
use crate::records::{parse_timestamp, MqDataResponse};
use crate::store::RecordStore;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub struct AppState {
    pub store: Arc<RecordStore>,
    pub controller: Mutex<DashboardController>,
}

type SharedState = Arc<AppState>;

pub async fn start_web_server(store: Arc<RecordStore>, port: u16) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(AppState {
        store,
        controller: Mutex::new(DashboardController::new()),
    });

    let app = Router::new()
        .route("/", get(dashboard_handler))
        .route("/api/mq-data", get(mq_data_handler))
        .route("/api/dashboard", get(view_handler))
        .route("/api/filter", get(apply_filter_handler))
        .route("/api/filter/reset", get(reset_filter_handler))
        .route("/api/page", get(page_handler))
        .route("/api/record", get(record_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Web server listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

#[derive(Deserialize)]
struct FilterQuery {
    filter: String,
    start: Option<String>,
    end: Option<String>,
    max_points: Option<usize>,
}

#[derive(Deserialize)]
struct PageQuery {
    page: usize,
}

#[derive(Deserialize)]
struct RecordQuery {
    timestamp: String,
}

/// Raw passthrough of the most recently fetched record set, in the
/// backend's own envelope shape.
async fn mq_data_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(MqDataResponse {
        mq_data: state.store.snapshot(),
    })
}

async fn view_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let records = state.store.snapshot();
    let view = state.controller.lock().unwrap().view(&records, Utc::now());
    Json(serde_json::json!({
        "success": true,
        "data": view
    }))
}

async fn apply_filter_handler(
    State(state): State<SharedState>,
    Query(params): Query<FilterQuery>,
) -> impl IntoResponse {
    let filter = match TimeFilter::parse(
        &params.filter,
        params.start.as_deref(),
        params.end.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "error": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let criteria = FilterCriteria {
        filter,
        max_points: params.max_points.unwrap_or(DEFAULT_MAX_POINTS),
    };

    let records = state.store.snapshot();
    let mut controller = state.controller.lock().unwrap();
    controller.set_filter(criteria);
    let view = controller.view(&records, Utc::now());
    Json(serde_json::json!({
        "success": true,
        "data": view
    }))
    .into_response()
}

async fn reset_filter_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let records = state.store.snapshot();
    let mut controller = state.controller.lock().unwrap();
    controller.reset();
    let view = controller.view(&records, Utc::now());
    Json(serde_json::json!({
        "success": true,
        "data": view
    }))
}

async fn page_handler(
    State(state): State<SharedState>,
    Query(params): Query<PageQuery>,
) -> impl IntoResponse {
    let records = state.store.snapshot();
    let mut controller = state.controller.lock().unwrap();
    controller.select_page(params.page);
    let view = controller.view(&records, Utc::now());
    Json(serde_json::json!({
        "success": true,
        "data": view
    }))
}

async fn record_handler(
    State(state): State<SharedState>,
    Query(params): Query<RecordQuery>,
) -> impl IntoResponse {
    let Some(timestamp) = parse_timestamp(&params.timestamp) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": format!("invalid timestamp: {}", params.timestamp)
            })),
        )
            .into_response();
    };

    let records = state.store.snapshot();
    match record_detail(&records, timestamp) {
        Some(detail) => Json(serde_json::json!({
            "success": true,
            "data": detail
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "error": "no record with that timestamp"
            })),
        )
            .into_response(),
    }
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>MQ Sensor Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .chart-container { position: relative; height: 420px; }
        #mq-data-table-body tr { cursor: pointer; }
    </style>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen">
    <div class="container mx-auto px-4 py-6">
        <header class="mb-8">
            <div class="flex justify-between items-start">
                <div>
                    <h1 class="text-3xl font-bold text-white mb-2">MQ Sensor Dashboard</h1>
                    <p class="text-gray-400">Gas and environmental readings, refreshed every second</p>
                </div>
                <div class="bg-gray-800 rounded-lg p-4 border border-gray-700">
                    <label class="text-gray-400 text-sm font-medium mb-2 block">Time Filter</label>
                    <select id="timeFilter" class="bg-gray-700 border border-gray-600 rounded px-4 py-2 text-sm min-w-[200px]">
                        <option value="1hour">Last hour</option>
                        <option value="24hours" selected>Last 24 hours</option>
                        <option value="7days">Last 7 days</option>
                        <option value="custom">Custom range</option>
                    </select>
                    <div id="customDateRange" class="mt-3 space-y-2 hidden">
                        <input type="datetime-local" id="startDate" class="bg-gray-700 border border-gray-600 rounded px-3 py-1 text-sm w-full">
                        <input type="datetime-local" id="endDate" class="bg-gray-700 border border-gray-600 rounded px-3 py-1 text-sm w-full">
                    </div>
                    <div class="mt-3 flex items-center gap-2">
                        <label class="text-gray-400 text-sm" for="maxDataPoints">Max points</label>
                        <input type="number" id="maxDataPoints" value="50" min="1" class="bg-gray-700 border border-gray-600 rounded px-3 py-1 text-sm w-24">
                    </div>
                    <div class="mt-3 flex gap-2">
                        <button id="applyFilter" class="bg-blue-600 hover:bg-blue-700 px-3 py-1 rounded text-sm flex-1">Apply</button>
                        <button id="resetFilter" class="bg-gray-600 hover:bg-gray-500 px-3 py-1 rounded text-sm flex-1">Reset</button>
                    </div>
                </div>
            </div>
        </header>

        <div class="bg-gray-800 rounded-lg p-4 border border-gray-700 mb-8">
            <h2 class="text-xl font-semibold mb-4">Sensor Readings Over Time</h2>
            <div class="chart-container">
                <canvas id="mqChart"></canvas>
            </div>
        </div>

        <div class="bg-gray-800 rounded-lg p-4 border border-gray-700 mb-8">
            <div class="flex justify-between items-center mb-4">
                <h2 class="text-xl font-semibold">Readings (<span id="record-count">0</span> in range)</h2>
                <div id="mq-pagination-controls" class="flex items-center gap-2">
                    <button id="mq-prev-button" class="bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600 px-3 py-1 rounded text-sm">Previous</button>
                    <select id="mq-page-select" class="bg-gray-700 border border-gray-600 rounded px-3 py-1 text-sm"></select>
                    <button id="mq-next-button" class="bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600 px-3 py-1 rounded text-sm">Next</button>
                </div>
            </div>
            <div class="overflow-x-auto">
                <table class="w-full text-sm text-left">
                    <thead class="text-gray-400 uppercase text-xs border-b border-gray-700">
                        <tr>
                            <th class="px-2 py-2">Timestamp</th>
                            <th class="px-2 py-2">Temp</th>
                            <th class="px-2 py-2">Humidity</th>
                            <th class="px-2 py-2">LPG</th>
                            <th class="px-2 py-2">CO</th>
                            <th class="px-2 py-2">Smoke</th>
                            <th class="px-2 py-2">CO (MQ7)</th>
                            <th class="px-2 py-2">CH4</th>
                            <th class="px-2 py-2">CO (MQ9)</th>
                            <th class="px-2 py-2">CO2</th>
                            <th class="px-2 py-2">NH3</th>
                            <th class="px-2 py-2">NOx</th>
                            <th class="px-2 py-2">Alcohol</th>
                            <th class="px-2 py-2">Benzene</th>
                            <th class="px-2 py-2">H2</th>
                            <th class="px-2 py-2">Air</th>
                        </tr>
                    </thead>
                    <tbody id="mq-data-table-body"></tbody>
                </table>
            </div>
        </div>

        <footer class="text-center text-gray-500 text-sm">
            <p>MQ Sensor Dashboard | Last updated: <span id="last-update">--</span></p>
        </footer>
    </div>

    <!-- Record details modal -->
    <div id="detailsModal" class="hidden fixed inset-0 bg-black bg-opacity-60 flex items-center justify-center z-50">
        <div class="bg-gray-800 rounded-lg border border-gray-700 p-6 w-full max-w-lg">
            <div class="flex justify-between items-center mb-4">
                <h3 class="text-lg font-semibold">Reading Details</h3>
                <button id="closeDetails" class="text-gray-400 hover:text-white text-xl leading-none">&times;</button>
            </div>
            <p class="text-gray-400 text-sm mb-4">Timestamp: <span id="modal-timestamp" class="text-gray-200">--</span></p>
            <div class="grid grid-cols-2 gap-x-6 gap-y-2 text-sm">
                <p><span class="text-gray-500">Temperature:</span> <span id="modal-temperature">--</span></p>
                <p><span class="text-gray-500">Humidity:</span> <span id="modal-humidity">--</span></p>
                <p><span class="text-gray-500">LPG:</span> <span id="modal-lpg">--</span></p>
                <p><span class="text-gray-500">CO:</span> <span id="modal-co">--</span></p>
                <p><span class="text-gray-500">Smoke:</span> <span id="modal-smoke">--</span></p>
                <p><span class="text-gray-500">CO (MQ7):</span> <span id="modal-co-mq7">--</span></p>
                <p><span class="text-gray-500">CH4:</span> <span id="modal-ch4">--</span></p>
                <p><span class="text-gray-500">CO (MQ9):</span> <span id="modal-co-mq9">--</span></p>
                <p><span class="text-gray-500">CO2:</span> <span id="modal-co2">--</span></p>
                <p><span class="text-gray-500">NH3:</span> <span id="modal-nh3">--</span></p>
                <p><span class="text-gray-500">NOx:</span> <span id="modal-nox">--</span></p>
                <p><span class="text-gray-500">Alcohol:</span> <span id="modal-alcohol">--</span></p>
                <p><span class="text-gray-500">Benzene:</span> <span id="modal-benzene">--</span></p>
                <p><span class="text-gray-500">H2:</span> <span id="modal-h2">--</span></p>
                <p><span class="text-gray-500">Air:</span> <span id="modal-air">--</span></p>
            </div>
        </div>
    </div>

    <script>
        // Series order and colors match the server's dataset order.
        const seriesStyles = [
            { label: 'Temperature', color: 'rgba(255, 99, 132, 1)' },
            { label: 'Humidity', color: 'rgba(54, 162, 235, 1)' },
            { label: 'LPG', color: 'rgba(75, 192, 192, 1)' },
            { label: 'CO', color: 'rgba(153, 102, 255, 1)' },
            { label: 'Smoke', color: 'rgba(255, 206, 86, 1)' },
            { label: 'CO_MQ7', color: 'rgba(75, 0, 130, 1)' },
            { label: 'CH4', color: 'rgba(255, 127, 80, 1)' },
            { label: 'CO_MQ9', color: 'rgba(34, 139, 34, 1)' },
            { label: 'CO2', color: 'rgba(128, 0, 128, 1)' },
            { label: 'NH3', color: 'rgba(255, 165, 0, 1)' },
            { label: 'NOx', color: 'rgba(0, 128, 128, 1)' },
            { label: 'Alcohol', color: 'rgba(128, 128, 0, 1)' },
            { label: 'Benzene', color: 'rgba(255, 20, 147, 1)' },
            { label: 'H2', color: 'rgba(70, 130, 180, 1)' },
            { label: 'Air', color: 'rgba(220, 20, 60, 1)' },
        ];

        const mqChart = new Chart(document.getElementById('mqChart'), {
            type: 'line',
            data: {
                labels: [],
                datasets: seriesStyles.map(s => ({
                    label: s.label,
                    data: [],
                    borderColor: s.color,
                    backgroundColor: s.color.replace(', 1)', ', 0.15)'),
                    spanGaps: false,
                    tension: 0.2,
                })),
            },
            options: {
                responsive: true,
                maintainAspectRatio: false,
                scales: {
                    x: {
                        type: 'time',
                        time: { unit: 'second' },
                        grid: { color: 'rgba(255,255,255,0.1)' },
                        ticks: { color: '#9ca3af' }
                    },
                    y: {
                        grid: { color: 'rgba(255,255,255,0.1)' },
                        ticks: { color: '#9ca3af' }
                    }
                },
                plugins: { legend: { labels: { color: '#9ca3af' } } }
            }
        });

        let currentPage = 1;

        async function refresh(url) {
            try {
                const response = await fetch(url);
                const result = await response.json();
                if (!result.success) {
                    console.error('Dashboard error:', result.error);
                    return;
                }
                applyView(result.data);
            } catch (e) {
                console.error('Failed to refresh dashboard:', e);
            }
        }

        function applyView(view) {
            mqChart.data.labels = view.chart.labels.map(t => new Date(t));
            view.chart.datasets.forEach((series, i) => {
                mqChart.data.datasets[i].data = series.data;
            });
            mqChart.update('none');

            const tbody = document.getElementById('mq-data-table-body');
            tbody.innerHTML = '';
            view.rows.forEach(row => {
                const tr = document.createElement('tr');
                tr.className = 'border-b border-gray-700 hover:bg-gray-700';
                const cells = [new Date(row.timestamp).toLocaleString(), ...row.values];
                tr.innerHTML = cells.map(c => `<td class="px-2 py-1 whitespace-nowrap">${c}</td>`).join('');
                tr.addEventListener('click', () => showDetails(row.timestamp));
                tbody.appendChild(tr);
            });

            const pagination = view.pagination;
            currentPage = pagination.page;
            const pageSelect = document.getElementById('mq-page-select');
            if (pagination.rebuild_options) {
                pageSelect.innerHTML = '';
                for (let i = 1; i <= pagination.total_pages; i++) {
                    const option = document.createElement('option');
                    option.value = i;
                    option.text = `Page ${i}`;
                    if (i === pagination.page) option.selected = true;
                    pageSelect.appendChild(option);
                }
            } else {
                pageSelect.value = pagination.page;
            }
            document.getElementById('mq-prev-button').disabled = !pagination.has_prev;
            document.getElementById('mq-next-button').disabled = !pagination.has_next;

            document.getElementById('record-count').textContent = view.total_records;
            document.getElementById('last-update').textContent = new Date(view.generated_at).toLocaleString();
        }

        async function showDetails(timestamp) {
            try {
                const response = await fetch(`/api/record?timestamp=${encodeURIComponent(timestamp)}`);
                const result = await response.json();
                if (!result.success) {
                    console.error('Detail error:', result.error);
                    return;
                }
                const detail = result.data;
                document.getElementById('modal-timestamp').textContent = new Date(detail.timestamp).toLocaleString();
                detail.fields.forEach(f => {
                    const el = document.getElementById('modal-' + f.label.toLowerCase().replace(/_/g, '-'));
                    if (el) el.textContent = f.value;
                });
                document.getElementById('detailsModal').classList.remove('hidden');
            } catch (e) {
                console.error('Failed to fetch record detail:', e);
            }
        }

        async function applyFilter() {
            const filter = document.getElementById('timeFilter').value;
            const maxPoints = parseInt(document.getElementById('maxDataPoints').value, 10) || 50;
            let params = `filter=${filter}&max_points=${maxPoints}`;
            if (filter === 'custom') {
                params += `&start=${encodeURIComponent(document.getElementById('startDate').value)}`;
                params += `&end=${encodeURIComponent(document.getElementById('endDate').value)}`;
            }
            const response = await fetch(`/api/filter?${params}`);
            const result = await response.json();
            if (!result.success) {
                alert(result.error);
                return;
            }
            applyView(result.data);
        }

        function resetFilter() {
            document.getElementById('timeFilter').value = '24hours';
            document.getElementById('customDateRange').classList.add('hidden');
            document.getElementById('startDate').value = '';
            document.getElementById('endDate').value = '';
            document.getElementById('maxDataPoints').value = 50;
            refresh('/api/filter/reset');
        }

        document.addEventListener('DOMContentLoaded', () => {
            document.getElementById('timeFilter').addEventListener('change', (event) => {
                document.getElementById('customDateRange')
                    .classList.toggle('hidden', event.target.value !== 'custom');
            });
            document.getElementById('applyFilter').addEventListener('click', applyFilter);
            document.getElementById('resetFilter').addEventListener('click', resetFilter);
            document.getElementById('mq-prev-button').addEventListener('click', () => {
                if (currentPage > 1) refresh(`/api/page?page=${currentPage - 1}`);
            });
            document.getElementById('mq-next-button').addEventListener('click', () => {
                refresh(`/api/page?page=${currentPage + 1}`);
            });
            document.getElementById('mq-page-select').addEventListener('change', (event) => {
                refresh(`/api/page?page=${parseInt(event.target.value, 10)}`);
            });
            document.getElementById('closeDetails').addEventListener('click', () => {
                document.getElementById('detailsModal').classList.add('hidden');
            });

            refresh('/api/dashboard');
            setInterval(() => refresh('/api/dashboard'), 1000);
        });
    </script>
</body>
</html>
"##;
