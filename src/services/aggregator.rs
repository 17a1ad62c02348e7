use crate::error::AppError;
use crate::models::{window_cutoff, DayLabelPolicy, MentionRecord, ScanConfig, TextItem, ValidTickerSet};
use crate::services::extractor::TickerExtractor;
use crate::utils::format_date;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Counts mentions over a window of forum items
pub struct MentionAggregator<'a> {
    tickers: &'a ValidTickerSet,
    extractor: TickerExtractor<'a>,
    window_hours: i64,
    count_comments: bool,
    day_label: DayLabelPolicy,
}

/// Frequency table of one run, in order of first appearance
///
/// Keys carry the item's day label under [`DayLabelPolicy::ItemTimestamp`]
/// and `None` under [`DayLabelPolicy::BatchCompletion`].
#[derive(Debug, Default)]
pub struct MentionTally {
    counts: IndexMap<(Option<String>, String), u64>,
    pub items_scanned: usize,
    pub items_skipped: usize,
    /// Source error that ended iteration early
    pub source_error: Option<String>,
}

/// Result of one aggregation run
#[derive(Debug)]
pub struct AggregationOutcome {
    pub records: Vec<MentionRecord>,
    pub items_scanned: usize,
    pub items_skipped: usize,
    /// The source failed part-way; `records` hold the counts gathered so far
    pub partial: bool,
    pub source_error: Option<String>,
}

impl MentionTally {
    fn add(&mut self, date: Option<String>, ticker: String) {
        *self.counts.entry((date, ticker)).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count for a ticker summed across day labels
    pub fn count(&self, ticker: &str) -> u64 {
        self.counts
            .iter()
            .filter(|((_, t), _)| t == ticker)
            .map(|(_, n)| n)
            .sum()
    }

    /// Emit one record per key; unlabelled keys get the day of `completed_at`
    pub fn into_records(
        self,
        tickers: &ValidTickerSet,
        completed_at: DateTime<Utc>,
    ) -> AggregationOutcome {
        let batch_label = format_date(&completed_at);

        let records = self
            .counts
            .into_iter()
            .map(|((date, ticker), mentions)| {
                let title = tickers.title_of(&ticker).map(str::to_string);
                MentionRecord::new(date.unwrap_or_else(|| batch_label.clone()), ticker, mentions)
                    .with_title(title)
            })
            .collect();

        AggregationOutcome {
            records,
            items_scanned: self.items_scanned,
            items_skipped: self.items_skipped,
            partial: self.source_error.is_some(),
            source_error: self.source_error,
        }
    }
}

impl<'a> MentionAggregator<'a> {
    pub fn new(tickers: &'a ValidTickerSet, config: &ScanConfig) -> Self {
        Self {
            tickers,
            extractor: TickerExtractor::new(tickers, config.extractor),
            window_hours: config.window_hours,
            count_comments: config.count_comments,
            day_label: config.day_label,
        }
    }

    /// Aggregate items created within the trailing window ending now.
    /// The batch day label is taken once iteration completes.
    ///
    /// A non-positive or out-of-range window is a `Config` error.
    pub fn aggregate<I>(&self, items: I) -> Result<AggregationOutcome, AppError>
    where
        I: IntoIterator<Item = Result<TextItem, AppError>>,
    {
        let cutoff = window_cutoff(self.window_hours, Utc::now())?;
        let tally = self.tally(items, cutoff);
        let outcome = tally.into_records(self.tickers, Utc::now());

        info!(
            tickers = outcome.records.len(),
            items_scanned = outcome.items_scanned,
            items_skipped = outcome.items_skipped,
            partial = outcome.partial,
            "Aggregation completed"
        );
        Ok(outcome)
    }

    /// Count mentions in every item created at or after `cutoff`.
    ///
    /// Stops at the first source error and keeps what was counted so far.
    pub fn tally<I>(&self, items: I, cutoff: DateTime<Utc>) -> MentionTally
    where
        I: IntoIterator<Item = Result<TextItem, AppError>>,
    {
        let mut tally = MentionTally::default();

        for item in items {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    warn!(
                        error = %e,
                        items_scanned = tally.items_scanned,
                        "Item source failed, keeping partial counts"
                    );
                    tally.source_error = Some(e.to_string());
                    break;
                }
            };

            if item.created_utc < cutoff {
                tally.items_skipped += 1;
                continue;
            }

            let label = match self.day_label {
                DayLabelPolicy::BatchCompletion => None,
                DayLabelPolicy::ItemTimestamp => Some(format_date(&item.created_utc)),
            };

            let mut found = self.extractor.extract(item.primary_text().as_str());
            if self.count_comments {
                for reply in &item.replies {
                    found.extend(self.extractor.extract(reply.as_deref()));
                }
            }

            debug!(id = %item.id, mentions = found.len(), "Scanned item");

            for ticker in found {
                tally.add(label.clone(), ticker);
            }
            tally.items_scanned += 1;
        }

        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn tickers() -> ValidTickerSet {
        [
            ("AAPL", "Apple Inc."),
            ("TSLA", "Tesla, Inc."),
            ("GME", "GameStop Corp."),
            ("IT", "Gartner"),
        ]
        .into_iter()
        .collect()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_counts_summed_across_items() {
        let set = tickers();
        let aggregator = MentionAggregator::new(&set, &ScanConfig::default());

        let items = vec![
            Ok(TextItem::new("a", at(10)).with_title("AAPL earnings")),
            Ok(TextItem::new("b", at(11)).with_title("AAPL vs AAPL").with_body("TSLA")),
        ];

        let outcome = aggregator.tally(items, at(0)).into_records(&set, at(23));

        assert_eq!(
            outcome.records,
            vec![
                MentionRecord::new("2024-05-02", "AAPL", 3).with_title(Some("Apple Inc.".into())),
                MentionRecord::new("2024-05-02", "TSLA", 1).with_title(Some("Tesla, Inc.".into())),
            ]
        );
        assert_eq!(outcome.items_scanned, 2);
        assert!(!outcome.partial);
    }

    #[test]
    fn test_window_boundary_inclusive() {
        let set = tickers();
        let aggregator = MentionAggregator::new(&set, &ScanConfig::default());
        let cutoff = at(12);

        let items = vec![
            Ok(TextItem::new("old", cutoff - Duration::seconds(1)).with_title("GME")),
            Ok(TextItem::new("edge", cutoff).with_title("TSLA")),
            Ok(TextItem::new("new", at(13)).with_title("AAPL")),
        ];

        let tally = aggregator.tally(items, cutoff);

        assert_eq!(tally.count("GME"), 0);
        assert_eq!(tally.count("TSLA"), 1);
        assert_eq!(tally.count("AAPL"), 1);
        assert_eq!(tally.items_skipped, 1);
        assert_eq!(tally.items_scanned, 2);
    }

    #[test]
    fn test_replies_counted_when_enabled() {
        let set = tickers();
        let item = TextItem::new("a", at(10))
            .with_title("daily thread")
            .with_reply(Some("GME GME".to_string()))
            .with_reply(None)
            .with_reply(Some("$IT".to_string()));

        let aggregator = MentionAggregator::new(&set, &ScanConfig::default());
        let tally = aggregator.tally(vec![Ok(item.clone())], at(0));
        assert_eq!(tally.count("GME"), 2);
        assert_eq!(tally.count("IT"), 1);

        let config = ScanConfig {
            count_comments: false,
            ..ScanConfig::default()
        };
        let aggregator = MentionAggregator::new(&set, &config);
        let tally = aggregator.tally(vec![Ok(item)], at(0));
        assert!(tally.is_empty());
    }

    #[test]
    fn test_source_failure_keeps_partial_counts() {
        let set = tickers();
        let aggregator = MentionAggregator::new(&set, &ScanConfig::default());

        let items = vec![
            Ok(TextItem::new("a", at(10)).with_title("GME")),
            Err(AppError::Network("connection reset".to_string())),
            Ok(TextItem::new("b", at(11)).with_title("TSLA")),
        ];

        let outcome = aggregator.tally(items, at(0)).into_records(&set, at(23));

        assert!(outcome.partial);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].ticker, "GME");
        assert!(outcome.source_error.unwrap().contains("connection reset"));
    }

    #[test]
    fn test_no_mentions_is_empty_not_error() {
        let set = tickers();
        let aggregator = MentionAggregator::new(&set, &ScanConfig::default());

        let items = vec![Ok(TextItem::new("a", at(10)).with_title("nothing to see"))];
        let outcome = aggregator.tally(items, at(0)).into_records(&set, at(23));

        assert!(outcome.records.is_empty());
        assert!(!outcome.partial);
    }

    #[test]
    fn test_batch_label_uses_completion_day() {
        let set = tickers();
        let aggregator = MentionAggregator::new(&set, &ScanConfig::default());

        let yesterday = Utc.with_ymd_and_hms(2024, 5, 1, 22, 0, 0).unwrap();
        let items = vec![
            Ok(TextItem::new("a", yesterday).with_title("GME")),
            Ok(TextItem::new("b", at(1)).with_title("GME")),
        ];

        let outcome = aggregator.tally(items, yesterday).into_records(&set, at(9));
        assert_eq!(outcome.records, vec![
            MentionRecord::new("2024-05-02", "GME", 2).with_title(Some("GameStop Corp.".into()))
        ]);
    }

    #[test]
    fn test_item_label_policy_splits_days() {
        let set = tickers();
        let config = ScanConfig {
            day_label: DayLabelPolicy::ItemTimestamp,
            ..ScanConfig::default()
        };
        let aggregator = MentionAggregator::new(&set, &config);

        let yesterday = Utc.with_ymd_and_hms(2024, 5, 1, 22, 0, 0).unwrap();
        let items = vec![
            Ok(TextItem::new("a", yesterday).with_title("GME")),
            Ok(TextItem::new("b", at(1)).with_title("GME GME")),
        ];

        let outcome = aggregator.tally(items, yesterday).into_records(&set, at(9));
        let rows: Vec<_> = outcome
            .records
            .iter()
            .map(|r| (r.date.as_str(), r.ticker.as_str(), r.mentions))
            .collect();
        assert_eq!(rows, vec![("2024-05-01", "GME", 1), ("2024-05-02", "GME", 2)]);
    }

    #[test]
    fn test_aggregate_uses_today_label() {
        let set = tickers();
        let aggregator = MentionAggregator::new(&set, &ScanConfig::default());

        let before = format_date(&Utc::now());
        let outcome = aggregator
            .aggregate(vec![Ok(TextItem::new("a", Utc::now()).with_title("TSLA"))])
            .unwrap();
        let after = format_date(&Utc::now());

        assert_eq!(outcome.records.len(), 1);
        let label = &outcome.records[0].date;
        assert!(label == &before || label == &after);
    }

    #[test]
    fn test_aggregate_rejects_out_of_range_window() {
        let set = tickers();

        for hours in [-5, 0, 10_000_000_000_000] {
            let config = ScanConfig {
                window_hours: hours,
                ..ScanConfig::default()
            };
            let aggregator = MentionAggregator::new(&set, &config);

            let result = aggregator.aggregate(vec![Ok(TextItem::new("a", Utc::now()).with_title("TSLA"))]);
            assert!(matches!(result, Err(AppError::Config(_))), "hours = {}", hours);
        }
    }
}
