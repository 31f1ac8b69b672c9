//! Text and JSON rendering of reports and code listings.

use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use scl90_core::{CodeSummary, Interpretation, RedemptionCode, ScoreReport};
use serde::Serialize;

/// Output format for reports and listings
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    report: &'a ScoreReport,
    interpretation: &'a Interpretation,
}

#[derive(Serialize)]
struct CodeListing<'a> {
    summary: CodeSummary,
    codes: &'a [RedemptionCode],
}

pub fn render_report(
    format: OutputFormat,
    report: &ScoreReport,
    interpretation: &Interpretation,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ReportDocument {
            report,
            interpretation,
        })?),
        OutputFormat::Text => Ok(report_text(report, interpretation)),
    }
}

pub fn render_codes(format: OutputFormat, codes: &[RedemptionCode]) -> Result<String> {
    let summary = CodeSummary::from_codes(codes);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&CodeListing { summary, codes })?),
        OutputFormat::Text => Ok(codes_text(summary, codes)),
    }
}

fn report_text(report: &ScoreReport, interpretation: &Interpretation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SCL-90 results");
    let _ = writeln!(out, "==============");
    let _ = writeln!(out, "Total score:     {}", report.total_sum);
    let _ = writeln!(out, "Total average:   {:.2}", report.total_average);
    let _ = writeln!(
        out,
        "Positive items:  {} (of {})",
        report.positive_item_count, report.total_answered
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall: {}", interpretation.overall.summary());

    if !interpretation.highlights.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Highest dimensions:");
        for (rank, h) in interpretation.highlights.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} {:.2} - {}",
                rank + 1,
                h.name,
                h.score,
                h.band.label()
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{:<28} {:>6}  {}", "Dimension", "Score", "Reading");
    for d in &interpretation.dimensions {
        let _ = writeln!(
            out,
            "{:<28} {:>6.2}  {}",
            d.name,
            d.score,
            d.severity.label()
        );
    }

    for d in &interpretation.dimensions {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({:.2}, {})", d.name, d.score, d.severity.label());
        if !d.description.is_empty() {
            let _ = writeln!(out, "  About:   {}", d.description);
        }
        if !d.reading.is_empty() {
            let _ = writeln!(out, "  Reading: {}", d.reading);
        }
        let _ = writeln!(out, "  Advice:  {}", d.advice);
    }
    out
}

fn codes_text(summary: CodeSummary, codes: &[RedemptionCode]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} codes ({} unused)", summary.total, summary.unused);
    for c in codes {
        let status = match c.used_at {
            Some(at) => format!("used {}", at.format("%Y-%m-%d %H:%M")),
            None if c.used => "used".to_string(),
            None => "unused".to_string(),
        };
        let _ = writeln!(
            out,
            "{}  {}  created {}",
            c.code,
            status,
            c.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scl90_core::{interpret, score, AnswerSet, Catalog, Score};

    const CATALOG_JSON: &str = r#"{
        "dimensions": [
            {
                "id": "A",
                "name": "Anxiety",
                "description": "Nervousness and tension.",
                "interpretation": {"low": "Calm.", "moderate": "Some tension.", "high": "Frequent anxiety."}
            },
            {"id": "B", "name": "Sleep"}
        ],
        "items": [
            {"id": 1, "dimensionId": "A", "text": "one"},
            {"id": 2, "dimensionId": "A", "text": "two"},
            {"id": 3, "dimensionId": "B", "text": "three"}
        ]
    }"#;

    fn sample() -> (ScoreReport, Interpretation) {
        let catalog = Catalog::from_json_str(CATALOG_JSON).unwrap();
        let answers: AnswerSet = [(1, 5), (2, 3), (3, 1)]
            .into_iter()
            .map(|(id, v)| (id, Score::new(v).unwrap()))
            .collect();
        let report = score(&answers, &catalog).unwrap();
        let interpretation = interpret(&report, &catalog);
        (report, interpretation)
    }

    #[test]
    fn text_report_has_totals_and_table() {
        let (report, interpretation) = sample();
        let text = render_report(OutputFormat::Text, &report, &interpretation).unwrap();
        assert!(text.contains("Total score:     9"));
        assert!(text.contains("Total average:   3.00"));
        assert!(text.contains("Positive items:  2 (of 3)"));
        assert!(text.contains("pronounced symptoms"));
    }

    #[test]
    fn text_report_details_each_dimension() {
        let (report, interpretation) = sample();
        let text = render_report(OutputFormat::Text, &report, &interpretation).unwrap();
        assert!(text.contains("Anxiety (4.00, pronounced symptoms)"));
        assert!(text.contains("  About:   Nervousness and tension."));
        assert!(text.contains("  Reading: Your anxiety score is markedly elevated"));
        assert!(text.contains("Frequent anxiety."));
        assert!(text.contains("Sleep (1.00, normal range)"));
        assert!(!text.contains("  About:   \n"));
    }

    #[test]
    fn json_report_wraps_both_parts() {
        let (report, interpretation) = sample();
        let json = render_report(OutputFormat::Json, &report, &interpretation).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["report"]["totalSum"], 9);
        assert_eq!(value["interpretation"]["overall"], "significant");
        assert_eq!(value["interpretation"]["highlights"][0]["id"], "A");
        let anxiety = &value["interpretation"]["dimensions"][0];
        assert_eq!(anxiety["description"], "Nervousness and tension.");
        assert_eq!(anxiety["severity"], "very_high");
        assert!(anxiety["reading"]
            .as_str()
            .unwrap()
            .contains("Frequent anxiety."));
        assert_eq!(value["interpretation"]["dimensions"][1]["reading"], "");
    }

    #[test]
    fn code_listing_header_counts_unused() {
        let mut used = RedemptionCode::new("12345678");
        let at = used.created_at;
        used.mark_used(at);
        let codes = vec![used, RedemptionCode::new("87654321")];
        let text = render_codes(OutputFormat::Text, &codes).unwrap();
        assert!(text.starts_with("2 codes (1 unused)"));
        assert!(text.contains("87654321  unused"));
    }
}
