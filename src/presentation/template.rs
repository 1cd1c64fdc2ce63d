use tera::{Context, Tera};

/// Message shown once an alignment has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationTemplate {
    source: String,
}

impl ConfirmationTemplate {
    pub const DEFAULT: &'static str = "Aligned {{ targets }} to {{ reference }}.";

    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Render with `reference` and the comma-joined `targets`.
    pub fn render(&self, reference: &str, targets: &[String]) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("reference", reference);
        ctx.insert("targets", &targets.join(", "));
        Tera::one_off(&self.source, &ctx, false)
    }
}

impl Default for ConfirmationTemplate {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}
