use serde::{Deserialize, Serialize};

/// The only lane type for which the API accepts a semantic description filter
pub const LANE_NOMINAL: &str = "Lane Nominal";

/// Query parameters for a lane request.
///
/// `type_names` is sent whenever it is non-empty. `semantic_description` is
/// sent only alongside `type_names == "Lane Nominal"`; for every other type
/// the description box is ignored even if filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_names: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_description: Option<String>,
}

impl FilterParams {
    /// Builds parameters from the raw form values
    pub fn from_inputs(type_names: &str, semantic_description: &str) -> Self {
        let type_names = (!type_names.is_empty()).then(|| type_names.to_string());
        let semantic_description = match type_names.as_deref() {
            Some(LANE_NOMINAL) if !semantic_description.is_empty() => {
                Some(semantic_description.to_string())
            }
            _ => None,
        };

        Self {
            type_names,
            semantic_description,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.type_names.is_none() && self.semantic_description.is_none()
    }

    /// Number of keys that will be sent
    pub fn len(&self) -> usize {
        self.type_names.iter().count() + self.semantic_description.iter().count()
    }

    /// Query pairs in the order they are sent
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(type_names) = &self.type_names {
            pairs.push(("type_names", type_names.as_str()));
        }
        if let Some(description) = &self.semantic_description {
            pairs.push(("semantic_description", description.as_str()));
        }
        pairs
    }
}
