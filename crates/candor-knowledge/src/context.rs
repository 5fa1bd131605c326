use std::fmt;

/// Concatenated text of every document that loaded successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeContext {
    text: String,
    sources: Vec<String>,
}

impl KnowledgeContext {
    pub fn new(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// File names that contributed to the context, in load order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for KnowledgeContext {
    fn from(text: &str) -> Self {
        Self::new(text, Vec::new())
    }
}

impl fmt::Display for KnowledgeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
