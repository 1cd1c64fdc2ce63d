use serde::{Deserialize, Serialize};

const ELLIPSIS: &str = "...";

/// Label describing the most recent alignment, as shown next to the undo
/// control. Long labels are truncated and the full text moves to `tooltip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    pub label: String,
    pub tooltip: Option<String>,
}

impl AlignmentSummary {
    pub fn new(reference_name: &str, target_names: &[String], max_chars: usize) -> Self {
        let full = alignment_string(reference_name, target_names);
        if full.chars().count() <= max_chars {
            return Self {
                label: full,
                tooltip: None,
            };
        }
        let keep = max_chars.saturating_sub(ELLIPSIS.len());
        let mut label: String = full.chars().take(keep).collect();
        label.push_str(ELLIPSIS);
        Self {
            label,
            tooltip: Some(full),
        }
    }

    /// Full, untruncated text.
    pub fn full_text(&self) -> &str {
        self.tooltip.as_deref().unwrap_or(&self.label)
    }
}

pub fn alignment_string(reference_name: &str, target_names: &[String]) -> String {
    format!("Ref: {reference_name} - Aligned: {}", target_names.join(", "))
}
