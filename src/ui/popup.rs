use crate::{core::geo::LatLng, data::geojson::GeoJsonFeature};

/// One labelled line of popup content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupField {
    pub label: String,
    pub value: String,
}

impl PopupField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A popup bound to a rendered feature
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: String,
    /// Anchor of the popup; the center of the feature's bounds
    pub position: LatLng,
    pub fields: Vec<PopupField>,
}

impl Popup {
    pub fn new(id: String, position: LatLng, fields: Vec<PopupField>) -> Self {
        Self {
            id,
            position,
            fields,
        }
    }

    /// The lane popup: ID, type names and semantic description
    pub fn for_lane(feature: &GeoJsonFeature) -> Self {
        let text = |key: &str| feature.property_text(key).unwrap_or_default();
        let id = feature.id_text().unwrap_or_default();
        let position = feature
            .bounds()
            .map(|b| b.center())
            .unwrap_or_default();

        Self::new(
            format!("lane-{}", id),
            position,
            vec![
                PopupField::new("ID", id),
                PopupField::new("Type Names", text("type_names")),
                PopupField::new("Semantic Description", text("semantic_description")),
            ],
        )
    }

    /// Value of the field with `label`
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    /// Plain-text content, one `Label: value` line per field
    pub fn content(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}: {}", f.label, f.value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// HTML content with bold labels; values are escaped
    pub fn html(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("<strong>{}:</strong> {}", escape_html(&f.label), escape_html(&f.value)))
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
