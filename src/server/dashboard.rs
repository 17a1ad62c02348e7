//! Server-rendered dashboard at `GET /`
//!
//! Shows the top tickers of one day with their 1-day return as a signed bar
//! and a per-ticker history table (date, close, mentions).

use crate::constants::{DASHBOARD_TOP_DEFAULT, DASHBOARD_TOP_MAX, DASHBOARD_TOP_MIN};
use crate::models::JoinedRow;
use crate::server::AppState;
use crate::services::MentionStore;
use crate::utils::parse_date_label;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::fmt::Write;
use tracing::{error, instrument};

const POSITIVE_COLOR: &str = "#16a34a";
const NEGATIVE_COLOR: &str = "#dc2626";
const FLAT_COLOR: &str = "#111827";

#[derive(Debug, Deserialize, Default)]
pub struct DashboardQuery {
    pub date: Option<String>,
    pub top: Option<usize>,
    pub ticker: Option<String>,
}

/// Everything one page render needs
#[derive(Debug, Default)]
pub struct DashboardView {
    /// Day shown; `None` when the store holds no mentions at all
    pub date: Option<String>,
    pub top: usize,
    pub rows: Vec<JoinedRow>,
    pub tickers: Vec<String>,
    pub selected: Option<String>,
    pub history: Vec<JoinedRow>,
    pub notice: Option<String>,
}

/// GET / - dashboard page
///
/// Examples:
/// - / (latest stored day, top 20)
/// - /?date=2024-05-02&top=10&ticker=GME
#[instrument(skip(state))]
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Response {
    match load_view(&state.store, params).await {
        Ok(view) => Html(render_page(&view)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load dashboard data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Dashboard unavailable</h1><p>Unable to read the mentions database.</p>"),
            )
                .into_response()
        }
    }
}

/// Clamp a requested top-N into the allowed range
pub fn clamp_top(top: Option<usize>) -> usize {
    top.unwrap_or(DASHBOARD_TOP_DEFAULT)
        .clamp(DASHBOARD_TOP_MIN, DASHBOARD_TOP_MAX)
}

async fn load_view(store: &MentionStore, params: DashboardQuery) -> Result<DashboardView, sqlx::Error> {
    let mut view = DashboardView {
        top: clamp_top(params.top),
        ..DashboardView::default()
    };

    let Some(latest) = store.latest_date().await? else {
        return Ok(view);
    };

    let requested = params.date.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let date = match requested {
        None => latest,
        Some(raw) => match parse_date_label(raw) {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => {
                view.notice = Some(format!("Invalid date '{}', showing {}", raw, latest));
                latest
            }
        },
    };

    let mut rows = store.read_join(&date).await?;
    rows.truncate(view.top);
    view.rows = rows;

    view.tickers = store.list_tickers().await?;
    view.selected = params
        .ticker
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .or_else(|| view.tickers.first().cloned());

    if let Some(ticker) = &view.selected {
        view.history = store.read_ticker_history(ticker).await?;
    }

    view.date = Some(date);
    Ok(view)
}

/// Format a return as `1.23%` / `-0.50%`, blank when absent
pub fn format_return(ret1d: Option<f64>) -> String {
    match ret1d {
        Some(r) => format!("{:.2}%", r),
        None => String::new(),
    }
}

fn return_color(ret1d: f64) -> &'static str {
    if ret1d > 0.0 {
        POSITIVE_COLOR
    } else if ret1d < 0.0 {
        NEGATIVE_COLOR
    } else {
        FLAT_COLOR
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_page(view: &DashboardView) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>WSB Mentions vs Performance</title>\
         <style>body{font-family:sans-serif;margin:2rem}table{border-collapse:collapse}\
         td,th{padding:4px 10px;border-bottom:1px solid #ddd;text-align:right}\
         td:first-child,th:first-child{text-align:left}.bar{height:12px}</style>\
         </head><body>\n<h1>WSB Mentions vs Stock Performance</h1>\n",
    );

    let Some(date) = &view.date else {
        html.push_str("<p class=\"info\">No data yet. Run <code>wsb-mentions run</code> to collect the first day.</p>\n");
        html.push_str("</body></html>\n");
        return html;
    };

    if let Some(notice) = &view.notice {
        let _ = writeln!(html, "<p class=\"notice\">{}</p>", escape_html(notice));
    }

    render_form(&mut html, view, date);

    if view.rows.is_empty() {
        let _ = writeln!(
            html,
            "<p class=\"info\">No rows for {}. Choose another date.</p>",
            escape_html(date)
        );
    } else {
        render_top_table(&mut html, view, date);
    }

    render_history(&mut html, view);

    html.push_str("</body></html>\n");
    html
}

fn render_form(html: &mut String, view: &DashboardView, date: &str) {
    let _ = write!(
        html,
        "<form method=\"get\" action=\"/\">\
         <label>Pick date (UTC window) <input type=\"date\" name=\"date\" value=\"{}\"></label> \
         <label>How many top tickers? <input type=\"number\" name=\"top\" min=\"{}\" max=\"{}\" value=\"{}\"></label> \
         <label>Ticker history <select name=\"ticker\">",
        escape_html(date),
        DASHBOARD_TOP_MIN,
        DASHBOARD_TOP_MAX,
        view.top
    );
    for ticker in &view.tickers {
        let selected = if view.selected.as_deref() == Some(ticker.as_str()) {
            " selected"
        } else {
            ""
        };
        let t = escape_html(ticker);
        let _ = write!(html, "<option value=\"{}\"{}>{}</option>", t, selected, t);
    }
    html.push_str("</select></label> <button type=\"submit\">Show</button></form>\n");
}

fn render_top_table(html: &mut String, view: &DashboardView, date: &str) {
    let max_abs = view
        .rows
        .iter()
        .filter_map(|r| r.ret1d)
        .fold(0.0_f64, |acc, r| acc.max(r.abs()));

    let _ = writeln!(
        html,
        "<h2>Top {} tickers on {}</h2>",
        view.rows.len(),
        escape_html(date)
    );
    html.push_str(
        "<table class=\"top\"><tr><th>Ticker</th><th>Company</th><th>Mentions</th>\
         <th>Close</th><th>Return (1d)</th><th></th></tr>\n",
    );

    for row in &view.rows {
        let close = row.close.map(|c| format!("{:.2}", c)).unwrap_or_default();
        let title = row.title.as_deref().map(escape_html).unwrap_or_default();

        let (ret_cell, bar) = match row.ret1d {
            Some(r) => {
                let color = return_color(r);
                let width = if max_abs > 0.0 { r.abs() / max_abs * 100.0 } else { 0.0 };
                (
                    format!("<td style=\"color:{}\">{}</td>", color, format_return(Some(r))),
                    format!(
                        "<td><div class=\"bar\" style=\"width:{:.0}px;background:{}\"></div></td>",
                        width, color
                    ),
                )
            }
            None => ("<td></td>".to_string(), "<td></td>".to_string()),
        };

        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}{}</tr>",
            escape_html(&row.ticker),
            title,
            row.mentions,
            close,
            ret_cell,
            bar
        );
    }
    html.push_str("</table>\n");
}

fn render_history(html: &mut String, view: &DashboardView) {
    let Some(ticker) = &view.selected else {
        return;
    };
    if view.history.is_empty() {
        return;
    }

    let _ = writeln!(
        html,
        "<h2>{} - Price &amp; WSB Mentions over time</h2>",
        escape_html(ticker)
    );
    html.push_str("<table class=\"history\"><tr><th>Date</th><th>Close</th><th>Mentions</th></tr>\n");
    for row in &view.history {
        let close = row.close.map(|c| format!("{:.2}", c)).unwrap_or_default();
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.date),
            close,
            row.mentions
        );
    }
    html.push_str("</table>\n");
}
