use serde::{Deserialize, Serialize};

pub const CARD_TYPE: &str = "MessageCard";
pub const CARD_CONTEXT: &str = "http://schema.org/extensions";

/// Accent color of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeColor {
    Warning,
    Failure,
    Success,
}

impl ThemeColor {
    pub fn hex(&self) -> &'static str {
        match self {
            ThemeColor::Warning => "FFA500",
            ThemeColor::Failure => "FF0000",
            ThemeColor::Success => "00FF00",
        }
    }
}

/// Name/value pair rendered as a row inside a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub activity_title: String,
    pub activity_subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_image: Option<String>,
    pub facts: Vec<Fact>,
    pub markdown: bool,
}

impl Section {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            activity_title: title.into(),
            activity_subtitle: subtitle.into(),
            activity_image: None,
            facts: Vec::new(),
            markdown: true,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.activity_image = Some(image.into());
        self
    }

    pub fn with_fact(mut self, fact: Fact) -> Self {
        self.facts.push(fact);
        self
    }
}

/// MessageCard payload posted to the webhook.
///
/// Every document owns its sections outright, so any two documents
/// serialize independently of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDocument {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub theme_color: String,
    pub summary: String,
    pub sections: Vec<Section>,
}

impl NotificationDocument {
    pub fn new(summary: impl Into<String>, theme: ThemeColor) -> Self {
        Self {
            card_type: CARD_TYPE.to_string(),
            context: CARD_CONTEXT.to_string(),
            theme_color: theme.hex().to_string(),
            summary: summary.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// All facts across sections, in order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.sections.iter().flat_map(|s| s.facts.iter())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
