//! Output formatting for CLI results.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use crate::search::SearchHit;
use crate::status::StatusReport;
use photogrep_core::search::SyncReport;
use serde::Serialize;

/// Maximum characters of recognized text shown per hit
const SNIPPET_MAX_LEN: usize = 120;

/// JSON envelope for search results
#[derive(Serialize)]
pub struct JsonOutput {
    pub term: String,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

/// Formats search results as JSON.
pub fn format_json(term: &str, hits: &[SearchHit]) -> String {
    let output = JsonOutput {
        term: term.to_string(),
        count: hits.len(),
        results: hits.to_vec(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats search results for human-readable terminal output.
pub fn format_human(term: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No photos found for \"{}\"", term);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Found {} photo{} for \"{}\":\n\n",
        hits.len(),
        if hits.len() == 1 { "" } else { "s" },
        term
    ));

    for (i, hit) in hits.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, hit.id));
        let snippet = truncate_text(&hit.text, SNIPPET_MAX_LEN);
        if !snippet.is_empty() {
            output.push_str(&format!("   {}\n", snippet));
        }
    }

    output.trim_end().to_string()
}

/// Formats a completed sync pass as a one-line summary.
pub fn format_sync_report(report: &SyncReport) -> String {
    format!(
        "Synced {} photos in {:.1}s: {} extracted, {} without text, {} from cache, {} failed, {} evicted",
        report.live,
        report.duration_ms as f64 / 1000.0,
        report.extracted,
        report.no_text,
        report.from_cache,
        report.failed,
        report.evicted
    )
}

/// Formats status counters for terminal output.
pub fn format_status(report: &StatusReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("Database:       {}\n", report.database_path));
    output.push_str(&format!("Cached images:  {}\n", report.cached_images));
    output.push_str(&format!("  with text:    {}\n", report.images_with_text));
    output.push_str(&format!("Indexed words:  {}", report.distinct_words));
    if let Some(avg) = report.hydration_avg_ms {
        output.push_str(&format!("\nHydration avg:  {:.1}ms", avg));
    }
    output
}

/// Formats status counters as JSON.
pub fn format_status_json(report: &StatusReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Truncates text to a maximum number of characters on a word boundary,
/// collapsing all whitespace to single spaces first.
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_len {
        return text;
    }
    let cut: String = text.chars().take(max_len).collect();
    match cut.rfind(' ') {
        Some(last_space) => format!("{}...", &cut[..last_space]),
        None => format!("{}...", cut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hit(id: &str, text: &str) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_human_empty() {
        let output = format_human("car", &[]);
        assert!(output.contains("No photos found"));
    }

    #[test]
    fn test_format_human_single() {
        let hits = vec![make_hit("/photos/receipt.jpg", "TOTAL 12.80\ncafe")];
        let output = format_human("tot", &hits);
        assert!(output.contains("1 photo"));
        assert!(output.contains("/photos/receipt.jpg"));
        assert!(output.contains("TOTAL 12.80 cafe"));
    }

    #[test]
    fn test_format_json() {
        let hits = vec![make_hit("/photos/sign.jpg", "One Way")];
        let output = format_json("one", &hits);
        assert!(output.contains("\"term\": \"one\""));
        assert!(output.contains("\"count\": 1"));
        assert!(output.contains("\"id\": \"/photos/sign.jpg\""));
        assert!(output.contains("\"text\": \"One Way\""));
    }

    #[test]
    fn test_format_sync_report() {
        let report = SyncReport {
            live: 10,
            from_cache: 5,
            extracted: 1,
            no_text: 1,
            failed: 1,
            evicted: 2,
            duration_ms: 1500,
        };
        let line = format_sync_report(&report);
        assert!(line.contains("10 photos"));
        assert!(line.contains("1.5s"));
        assert!(line.contains("2 evicted"));
    }

    #[test]
    fn test_truncate_text_char_boundaries() {
        let short = "Short text";
        assert_eq!(truncate_text(short, 50), short);

        let long = "This is a much longer text that should be truncated at a word";
        let truncated = truncate_text(long, 30);
        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().count() <= 33);

        // Multibyte text must not split inside a character.
        let cyrillic = "кафе открыто до полуночи каждый день";
        let cut = truncate_text(cyrillic, 10);
        assert!(cut.ends_with("..."));
    }
}
