//! Static product copy: hero, features, how it works, target markets and the
//! call to action. Printed by `fieldsense --about`.

use std::fmt::Write as _;

/// A titled card with a one-line description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub title: &'static str,
    pub description: &'static str,
}

/// Headline number from the features section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Benefit {
    pub metric: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// An industry the product is pitched to, with example customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Market {
    pub title: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

pub const PRODUCT_NAME: &str = "FieldSense AI";

pub const HERO_BADGE: &str = "AI-Powered Field Service Automation";
pub const HERO_TITLE: &str = "Transform Your Field Service Documentation";
pub const HERO_TAGLINE: &str = "Automate technical support logs with AI-powered document processing. \
Extract structured data from handwritten service reports in seconds, \
ensuring compliance and accuracy for high-stakes industries.";
pub const HERO_HIGHLIGHTS: [&str; 3] = [
    "OCR + YOLO Detection",
    "High-Compliance Ready",
    "Field Service Teams",
];

pub const FEATURES_TITLE: &str = "Everything You Need for Modern Field Service";
pub const FEATURES: [Card; 6] = [
    Card {
        title: "AI-Powered Processing",
        description: "YOLO object detection + advanced OCR for 95%+ accuracy",
    },
    Card {
        title: "15-Second Processing",
        description: "Transform handwritten logs to structured data in seconds",
    },
    Card {
        title: "Compliance Ready",
        description: "Built for high-stakes industries with audit trail requirements",
    },
    Card {
        title: "System Integration",
        description: "API-first design for seamless integration with existing workflows",
    },
    Card {
        title: "Field Team Friendly",
        description: "Simple mobile interface for technicians on-site",
    },
    Card {
        title: "Analytics & Insights",
        description: "Track service patterns, common issues, and team performance",
    },
];

pub const BENEFITS: [Benefit; 3] = [
    Benefit {
        metric: "90%",
        label: "Time Reduction",
        description: "In manual data entry tasks",
    },
    Benefit {
        metric: "95%+",
        label: "Accuracy Rate",
        description: "In data extraction",
    },
    Benefit {
        metric: "100%",
        label: "Compliance",
        description: "Audit trail documentation",
    },
];

pub const HOW_IT_WORKS_TITLE: &str = "From Handwritten Logs to Digital Data";
pub const HOW_IT_WORKS: [Card; 4] = [
    Card {
        title: "Upload Service Log",
        description: "Simply take a photo or upload your handwritten field service report",
    },
    Card {
        title: "YOLO Detection",
        description: "AI identifies form fields and text regions with precision boundary detection",
    },
    Card {
        title: "OCR Processing",
        description: "Advanced OCR extracts handwritten text from each detected region",
    },
    Card {
        title: "Structured Output",
        description: "Get organized data ready for your systems - JSON, CSV, or database integration",
    },
];

/// Information categories the pipeline pulls out of a service log.
pub const EXTRACTED_CATEGORIES: [&str; 6] = [
    "Branch Code & Location Details",
    "Customer Request Documentation",
    "Problem Description by Engineer",
    "Action Taken & Parts Replaced",
    "Personnel Information & Signatures",
    "Bank Details & Compliance Data",
];

pub const MARKETS_TITLE: &str = "Built for High-Compliance Industries";
pub const MARKETS: [Market; 6] = [
    Market {
        title: "Banks & Financial Institutions",
        description: "ATM networks, UPS systems, branch IT infrastructure",
        examples: &["HBL", "UBL", "MCB", "Regional Banks"],
    },
    Market {
        title: "ATM & Hardware Maintenance",
        description: "Installation, servicing, and technical support providers",
        examples: &["ATM Service Companies", "UPS Maintenance", "POS Support"],
    },
    Market {
        title: "IT Support & Infrastructure",
        description: "On-site technical support for enterprise systems",
        examples: &["Server Maintenance", "Network Support", "Security Systems"],
    },
    Market {
        title: "Industrial Equipment Services",
        description: "Manufacturing and industrial system maintenance",
        examples: &["OEM Support", "Machine Diagnostics", "Equipment Servicing"],
    },
    Market {
        title: "Medical Device Services",
        description: "Healthcare equipment maintenance and calibration",
        examples: &["Medical Equipment", "Diagnostic Tools", "Hospital Systems"],
    },
    Market {
        title: "Infrastructure & Utilities",
        description: "Power, telecom, and renewable energy systems",
        examples: &["Solar Systems", "HVAC", "Telecom Infrastructure"],
    },
];

pub const CTA_TITLE: &str = "Ready to Transform Your Field Service Documentation?";
pub const CTA_ACTIONS: [Card; 3] = [
    Card {
        title: "Try Live Demo",
        description: "Experience the AI processing pipeline with your own documents",
    },
    Card {
        title: "Schedule Consultation",
        description: "Get a personalized demo tailored to your industry needs",
    },
    Card {
        title: "Talk to Sales",
        description: "Have questions? Our team is ready to help you get started",
    },
];
pub const CONTACT_EMAIL: &str = "demo@fieldsense.ai";
pub const CONTACT_PHONE: &str = "+1-555-FIELD-AI";

/// All sections as plain text, in page order.
pub fn render_about() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{PRODUCT_NAME} · {HERO_BADGE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{HERO_TITLE}");
    let _ = writeln!(out, "{HERO_TAGLINE}");
    let _ = writeln!(out, "{}", HERO_HIGHLIGHTS.join(" · "));

    section(&mut out, FEATURES_TITLE);
    cards(&mut out, &FEATURES);
    let _ = writeln!(out);
    for b in BENEFITS {
        let _ = writeln!(out, "  {:>5}  {} ({})", b.metric, b.label, b.description);
    }

    section(&mut out, HOW_IT_WORKS_TITLE);
    for (i, step) in HOW_IT_WORKS.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {}", i + 1, step.title, step.description);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  Extracts:");
    for category in EXTRACTED_CATEGORIES {
        let _ = writeln!(out, "    - {category}");
    }

    section(&mut out, MARKETS_TITLE);
    for m in MARKETS {
        let _ = writeln!(out, "  • {}: {}", m.title, m.description);
        let _ = writeln!(out, "      e.g. {}", m.examples.join(", "));
    }

    section(&mut out, CTA_TITLE);
    cards(&mut out, &CTA_ACTIONS);
    let _ = writeln!(out);
    let _ = writeln!(out, "  {CONTACT_EMAIL} · {CONTACT_PHONE}");
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "─".repeat(title.chars().count()));
}

fn cards(out: &mut String, cards: &[Card]) {
    for c in cards {
        let _ = writeln!(out, "  • {}: {}", c.title, c.description);
    }
}
