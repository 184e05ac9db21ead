//! Display labels and icons for field identifiers.
//!
//! The inference service decides which fields exist; new identifiers can
//! appear at any time. [`FieldCatalog`] is therefore an open lookup table with
//! an explicit fallback rather than an enum: an unknown `class_id` renders with
//! its raw identifier and the generic [`FieldIcon::Target`] icon.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Icon shown next to a field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIcon {
    Monitor,
    Building,
    Landmark,
    MapPin,
    Users,
    /// Generic icon for identifiers the catalog does not know.
    Target,
}

impl FieldIcon {
    /// Single-glyph rendering for terminal output.
    pub fn glyph(self) -> &'static str {
        match self {
            FieldIcon::Monitor => "▣",
            FieldIcon::Building => "▤",
            FieldIcon::Landmark => "⌂",
            FieldIcon::MapPin => "◉",
            FieldIcon::Users => "☺",
            FieldIcon::Target => "◎",
        }
    }
}

/// Label and icon for one known field identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub label: String,
    pub icon: FieldIcon,
}

/// Lookup from field identifier to [`FieldInfo`], with a fallback branch.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    entries: HashMap<String, FieldInfo>,
}

static DEFAULT_CATALOG: Lazy<FieldCatalog> = Lazy::new(|| {
    FieldCatalog::empty()
        .with("model", "ATM Model", FieldIcon::Monitor)
        .with("branch_code", "Branch Code", FieldIcon::Building)
        .with("bank", "Bank Name", FieldIcon::Landmark)
        .with("city", "City", FieldIcon::MapPin)
        .with("address", "Address", FieldIcon::MapPin)
        .with("technician_name", "Technician Name", FieldIcon::Users)
});

impl FieldCatalog {
    /// A catalog with no entries; every identifier takes the fallback branch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The field-service log catalog (ATM model, branch code, bank, …).
    pub fn field_service() -> &'static FieldCatalog {
        &DEFAULT_CATALOG
    }

    /// Add or replace an entry.
    pub fn with(mut self, class_id: impl Into<String>, label: impl Into<String>, icon: FieldIcon) -> Self {
        self.insert(class_id, label, icon);
        self
    }

    pub fn insert(&mut self, class_id: impl Into<String>, label: impl Into<String>, icon: FieldIcon) {
        self.entries.insert(
            class_id.into(),
            FieldInfo {
                label: label.into(),
                icon,
            },
        );
    }

    /// Whether `class_id` has a dedicated entry.
    pub fn contains(&self, class_id: &str) -> bool {
        self.entries.contains_key(class_id)
    }

    /// Human label for `class_id`, falling back to the identifier itself.
    pub fn label<'a>(&'a self, class_id: &'a str) -> &'a str {
        match self.entries.get(class_id) {
            Some(info) => &info.label,
            None => class_id,
        }
    }

    /// Icon for `class_id`, falling back to [`FieldIcon::Target`].
    pub fn icon(&self, class_id: &str) -> FieldIcon {
        self.entries
            .get(class_id)
            .map(|info| info.icon)
            .unwrap_or(FieldIcon::Target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
