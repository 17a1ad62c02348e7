//! Ticker Extractor
//!
//! Finds ticker symbols in free forum text. A token is a candidate when it is
//!
//! - an optional leading `$`,
//! - followed by a run of uppercase ASCII letters (2-5 bare, 1-5 after `$`),
//! - not preceded by an uppercase ASCII letter or digit,
//! - and followed by a word boundary.
//!
//! Candidates are kept only when they are in the [`ValidTickerSet`] and pass
//! the short-symbol rule: symbols of `short_symbol_max_len` letters or fewer
//! need the `$` marker, which drops everyday words such as "A", "IT", "ON", "GO".
//!
//! Scanning is leftmost and non-overlapping. Lowercase or mixed-case tokens
//! never match.

use crate::constants::{MAX_SYMBOL_LEN, MIN_BARE_SYMBOL_LEN, MIN_DOLLAR_SYMBOL_LEN};
use crate::models::{ExtractorPolicy, ValidTickerSet};

/// A lexical match before whitelist filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub symbol: String,
    pub has_dollar: bool,
}

#[derive(Debug, Clone)]
pub struct TickerExtractor<'a> {
    tickers: &'a ValidTickerSet,
    policy: ExtractorPolicy,
}

impl<'a> TickerExtractor<'a> {
    pub fn new(tickers: &'a ValidTickerSet, policy: ExtractorPolicy) -> Self {
        Self { tickers, policy }
    }

    /// Recognised tickers in order of appearance, duplicates preserved
    pub fn extract<'t>(&self, text: impl Into<Option<&'t str>>) -> Vec<String> {
        let text = match text.into() {
            Some(t) if !t.is_empty() => t,
            _ => return Vec::new(),
        };

        scan_candidates(text)
            .into_iter()
            .filter(|c| self.accepts(c))
            .map(|c| c.symbol)
            .collect()
    }

    fn accepts(&self, candidate: &Candidate) -> bool {
        if !self.tickers.is_valid(&candidate.symbol) {
            return false;
        }
        let is_short = candidate.symbol.len() <= self.policy.short_symbol_max_len;
        !(self.policy.require_dollar_for_short && is_short && !candidate.has_dollar)
    }
}

/// Lexical pass only: every token shaped like a ticker, valid or not
pub fn scan_candidates(text: &str) -> Vec<Candidate> {
    let chars: Vec<char> = text.chars().collect();
    let mut found = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match match_at(&chars, i) {
            Some((start, end, has_dollar)) => {
                found.push(Candidate {
                    symbol: chars[start..end].iter().collect(),
                    has_dollar,
                });
                i = end;
            }
            None => i += 1,
        }
    }

    found
}

/// Try a match starting at `pos`; returns (symbol start, symbol end, has_dollar)
fn match_at(chars: &[char], pos: usize) -> Option<(usize, usize, bool)> {
    if pos > 0 && is_blocking_prefix(chars[pos - 1]) {
        return None;
    }

    if chars[pos] == '$' {
        // A `$` followed by a bad run can't fall back to a bare match at the
        // same position, `$` is not a letter.
        return letter_run(chars, pos + 1, MIN_DOLLAR_SYMBOL_LEN).map(|end| (pos + 1, end, true));
    }

    letter_run(chars, pos, MIN_BARE_SYMBOL_LEN).map(|end| (pos, end, false))
}

/// End index of an uppercase run at `start` that fits the length bounds and
/// ends on a word boundary
fn letter_run(chars: &[char], start: usize, min_len: usize) -> Option<usize> {
    let run = chars[start.min(chars.len())..]
        .iter()
        .take_while(|c| c.is_ascii_uppercase())
        .count();

    if run < min_len || run > MAX_SYMBOL_LEN {
        return None;
    }

    let end = start + run;
    match chars.get(end) {
        Some(&next) if is_word_char(next) => None,
        _ => Some(end),
    }
}

fn is_blocking_prefix(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers() -> ValidTickerSet {
        [
            ("A", "Agilent Technologies"),
            ("IT", "Gartner"),
            ("ON", "ON Semiconductor"),
            ("GO", "Grocery Outlet"),
            ("AABBB", "Test Five"),
            ("BC", "Brunswick"),
            ("AAPL", "Apple Inc."),
            ("NVDA", "NVIDIA CORP"),
            ("NVDAX", "Test NVDAX"),
            ("TSLA", "Tesla, Inc."),
            ("GME", "GameStop Corp."),
        ]
        .into_iter()
        .collect()
    }

    fn extract(text: &str) -> Vec<String> {
        let set = tickers();
        TickerExtractor::new(&set, ExtractorPolicy::default()).extract(text)
    }

    #[test]
    fn test_empty_and_absent_text() {
        let set = tickers();
        let extractor = TickerExtractor::new(&set, ExtractorPolicy::default());
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract(None).is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        assert_eq!(extract("NVDA NVDA"), vec!["NVDA", "NVDA"]);
    }

    #[test]
    fn test_dollar_and_bare_forms() {
        assert_eq!(extract("bought $AAPL and TSLA calls"), vec!["AAPL", "TSLA"]);
    }

    #[test]
    fn test_short_symbols_need_dollar() {
        assert!(extract("A").is_empty());
        assert_eq!(extract("$A"), vec!["A"]);
        assert!(extract("IT is ON, GO").is_empty());
        assert_eq!(extract("$IT $ON"), vec!["IT", "ON"]);
    }

    #[test]
    fn test_short_symbols_without_policy() {
        let set = tickers();
        let policy = ExtractorPolicy {
            require_dollar_for_short: false,
            ..ExtractorPolicy::default()
        };
        let extractor = TickerExtractor::new(&set, policy);
        assert_eq!(extractor.extract("IT is ON"), vec!["IT", "ON"]);
        // bare single letters never match the pattern
        assert!(extractor.extract("A").is_empty());
    }

    #[test]
    fn test_short_threshold_configurable() {
        let set = tickers();
        let policy = ExtractorPolicy {
            require_dollar_for_short: true,
            short_symbol_max_len: 3,
        };
        let extractor = TickerExtractor::new(&set, policy);
        assert!(extractor.extract("GME").is_empty());
        assert_eq!(extractor.extract("$GME NVDA"), vec!["GME", "NVDA"]);
    }

    #[test]
    fn test_case_sensitive() {
        assert!(extract("aapl Aapl AAPl nvda").is_empty());
    }

    #[test]
    fn test_never_emits_unknown_symbols() {
        let set = tickers();
        let found = extract("YOLO into FOMO HODL $MOON NVDA WSB DD");
        assert_eq!(found, vec!["NVDA"]);
        assert!(found.iter().all(|t| set.is_valid(t)));
    }

    #[test]
    fn test_boundary_five_letters() {
        assert_eq!(extract("AABBB"), vec!["AABBB"]);
    }

    #[test]
    fn test_boundary_longer_run_not_truncated() {
        // NVDAX is its own symbol, never read as NVDA
        assert_eq!(extract("NVDAX"), vec!["NVDAX"]);
        // six letters: no prefix match at all
        assert!(extract("NVDAXY").is_empty());
    }

    #[test]
    fn test_boundary_digits() {
        assert!(extract("A1BC").is_empty());
        assert!(extract("1TSLA").is_empty());
        assert!(extract("TSLA1").is_empty());
        assert!(extract("TSLA_").is_empty());
    }

    #[test]
    fn test_boundary_lowercase_suffix_and_prefix() {
        assert!(extract("NVDAs").is_empty());
        // only uppercase letters and digits block the start
        assert_eq!(extract("xNVDA"), vec!["NVDA"]);
    }

    #[test]
    fn test_punctuation_boundaries() {
        assert_eq!(
            extract("(NVDA), TSLA! $AAPL? GME's run"),
            vec!["NVDA", "TSLA", "AAPL", "GME"]
        );
    }

    #[test]
    fn test_dollar_after_blocking_char_loses_marker() {
        // the `$` form is blocked by the preceding letter, the bare form at
        // the next position is not
        let candidates = scan_candidates("X$BC");
        assert_eq!(
            candidates,
            vec![Candidate { symbol: "BC".to_string(), has_dollar: false }]
        );
        assert!(extract("X$BC").is_empty());
        assert_eq!(extract("X $BC"), vec!["BC"]);
    }

    #[test]
    fn test_scan_is_non_overlapping() {
        let candidates = scan_candidates("$$AAPL WSB,GME");
        let symbols: Vec<_> = candidates.iter().map(|c| (c.symbol.as_str(), c.has_dollar)).collect();
        assert_eq!(symbols, vec![("AAPL", true), ("WSB", false), ("GME", false)]);
    }

    #[test]
    fn test_unicode_text() {
        assert_eq!(extract("🚀🚀 GME 🚀 — NVDA über alles"), vec!["GME", "NVDA"]);
        assert!(extract("NVDAé").is_empty());
    }
}
