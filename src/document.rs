//! Extraction result types returned by the inference service.
//!
//! [`DocumentData`] mirrors the wire format exactly so that exporting it as
//! JSON reproduces what the service sent (minus any records rejected during
//! validation). It is only ever produced by [`crate::pipeline::validate`]
//! and is never mutated afterwards.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};

/// One extracted field: a detected region plus its OCR text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Field identifier, e.g. `"bank"` or `"technician_name"`. Open-ended.
    pub class_id: String,
    /// `[x1, y1, x2, y2]` in source-image pixels. Ordering is not enforced.
    pub bbox: [f64; 4],
    /// Detection confidence in `[0, 1]`, as reported by the service.
    pub confidence: f64,
    /// Recognised text; may be empty when OCR found nothing.
    pub text: String,
}

impl BoundingBox {
    /// True when the OCR text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The decoded output of the inference service for one uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    pub results: Vec<BoundingBox>,
}

/// A validated response: the salvaged document plus any rejected records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub document: DocumentData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RecordError>,
}

impl Extraction {
    /// Whether validation dropped any record.
    pub fn is_partial(&self) -> bool {
        !self.rejected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentData {
        DocumentData {
            results: vec![
                BoundingBox {
                    class_id: "bank".into(),
                    bbox: [0.0, 0.0, 10.0, 10.0],
                    confidence: 0.92,
                    text: "HBL".into(),
                },
                BoundingBox {
                    class_id: "city".into(),
                    bbox: [12.5, 40.0, 80.25, 52.0],
                    confidence: 0.55,
                    text: String::new(),
                },
                BoundingBox {
                    class_id: "serial_number".into(),
                    bbox: [1.0, 2.0, 3.0, 4.0],
                    confidence: 0.7,
                    text: "SN-0042".into(),
                },
            ],
        }
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        let back: DocumentData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        let ids: Vec<&str> = back.results.iter().map(|r| r.class_id.as_str()).collect();
        assert_eq!(ids, ["bank", "city", "serial_number"]);
    }

    #[test]
    fn wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let first = &json["results"][0];
        assert_eq!(first["class_id"], "bank");
        assert_eq!(first["bbox"][2], 10.0);
        assert_eq!(first["confidence"], 0.92);
        assert_eq!(first["text"], "HBL");
    }

    #[test]
    fn blank_text_detection() {
        let doc = sample();
        assert!(!doc.results[0].is_blank());
        assert!(doc.results[1].is_blank());
        let spaces = BoundingBox {
            text: "   ".into(),
            ..doc.results[0].clone()
        };
        assert!(spaces.is_blank());
    }

    #[test]
    fn extraction_without_rejections_omits_field() {
        let ex = Extraction {
            document: sample(),
            rejected: vec![],
        };
        assert!(!ex.is_partial());
        let json = serde_json::to_value(&ex).unwrap();
        assert!(json.get("rejected").is_none());
    }
}
