//! Result rendering: [`DocumentData`] → rows, statistics and a text table.
//!
//! Rendering is a pure function of the document and a [`FieldCatalog`]. It
//! never touches the document itself, so the same data can be rendered,
//! copied and exported in any order.

use crate::document::{BoundingBox, DocumentData};
use crate::fields::{FieldCatalog, FieldIcon};
use serde::Serialize;
use std::fmt::Write as _;

/// Marker shown instead of an empty cell when OCR produced no text.
pub const NO_DATA: &str = "No data extracted";

/// Confidence above which a field counts as high confidence.
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Confidence above which a field counts as at least medium confidence.
pub const MEDIUM_CONFIDENCE: f64 = 0.6;

/// Badge tier for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// `> 0.8`
    High,
    /// `(0.6, 0.8]`
    Medium,
    /// `<= 0.6`
    Low,
}

impl ConfidenceTier {
    /// Classify a confidence score. Total: anything not above 0.6 (including
    /// NaN) is `Low`.
    pub fn of(confidence: f64) -> Self {
        if confidence > HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else if confidence > MEDIUM_CONFIDENCE {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

/// Percentage badge text, e.g. `0.92` → `"92.0%"`.
pub fn confidence_badge(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    pub class_id: String,
    pub label: String,
    #[serde(skip)]
    pub icon: FieldIcon,
    /// `None` when the OCR text is empty; rendered as [`NO_DATA`].
    pub text: Option<String>,
    pub confidence: f64,
    pub badge: String,
    pub tier: ConfidenceTier,
}

impl FieldRow {
    fn from_result(result: &BoundingBox, catalog: &FieldCatalog) -> Self {
        Self {
            class_id: result.class_id.clone(),
            label: catalog.label(&result.class_id).to_string(),
            icon: catalog.icon(&result.class_id),
            text: (!result.text.is_empty()).then(|| result.text.clone()),
            confidence: result.confidence,
            badge: confidence_badge(result.confidence),
            tier: ConfidenceTier::of(result.confidence),
        }
    }

    /// The value cell: the text, or the explicit no-data marker.
    pub fn value(&self) -> &str {
        self.text.as_deref().unwrap_or(NO_DATA)
    }
}

/// Aggregate statistics shown under the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtractionStats {
    /// Fields whose text is not blank.
    pub fields_detected: usize,
    /// Mean confidence over all results; `0.0` when there are none.
    pub average_confidence: f64,
    /// Fields with confidence `> 0.8`.
    pub high_confidence: usize,
}

impl ExtractionStats {
    pub fn of(doc: &DocumentData) -> Self {
        let n = doc.results.len();
        let average_confidence = if n == 0 {
            0.0
        } else {
            doc.results.iter().map(|r| r.confidence).sum::<f64>() / n as f64
        };
        Self {
            fields_detected: doc.results.iter().filter(|r| !r.is_blank()).count(),
            average_confidence,
            high_confidence: doc
                .results
                .iter()
                .filter(|r| ConfidenceTier::of(r.confidence) == ConfidenceTier::High)
                .count(),
        }
    }

    /// Average confidence as a badge, e.g. `"92.0%"`.
    pub fn average_badge(&self) -> String {
        confidence_badge(self.average_confidence)
    }
}

/// Everything the result view shows for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub rows: Vec<FieldRow>,
    pub stats: ExtractionStats,
}

impl ExtractionReport {
    pub fn new(doc: &DocumentData, catalog: &FieldCatalog) -> Self {
        Self {
            rows: doc
                .results
                .iter()
                .map(|r| FieldRow::from_result(r, catalog))
                .collect(),
            stats: ExtractionStats::of(doc),
        }
    }

    /// Plain-text table followed by the statistics block.
    pub fn render_table(&self) -> String {
        const HEADERS: [&str; 3] = ["Field", "Extracted Value", "Confidence"];

        let cells: Vec<[String; 3]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    format!("{} {}", row.icon.glyph(), row.label),
                    row.value().to_string(),
                    format!("{} ({})", row.badge, row.tier.as_str()),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, &HEADERS.map(String::from), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("──"));
        if cells.is_empty() {
            let _ = writeln!(out, "(no fields detected)");
        }
        for row in &cells {
            push_line(&mut out, row, &widths);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Fields Detected:  {}", self.stats.fields_detected);
        let _ = writeln!(out, "Avg Confidence:   {}", self.stats.average_badge());
        let _ = writeln!(out, "High Confidence:  {}", self.stats.high_confidence);
        out
    }
}

/// Model and service facts shown under the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingDetails {
    pub detection_model: &'static str,
    pub ocr_engine: &'static str,
    pub endpoint: String,
    pub status: &'static str,
}

impl ProcessingDetails {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            detection_model: "YOLOv8",
            ocr_engine: "Advanced OCR",
            endpoint: endpoint.into(),
            status: "Live Model",
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Processing Details");
        let _ = writeln!(out, "  Detection Model:  {}", self.detection_model);
        let _ = writeln!(out, "  OCR Engine:       {}", self.ocr_engine);
        let _ = writeln!(out, "  API Endpoint:     {}", self.endpoint);
        let _ = writeln!(out, "  Status:           {}", self.status);
        out
    }
}

fn push_line(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, w)| {
            let pad = w.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}
