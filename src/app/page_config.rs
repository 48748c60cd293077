use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Wide,
    Centered,
}

impl Layout {
    /// Max width of the page body.
    pub fn max_width(&self) -> &'static str {
        match self {
            Layout::Wide => "100%",
            Layout::Centered => "960px",
        }
    }
}

/// Browser-facing page settings of the generated map page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub page_title: String,
    pub title: String,
    pub layout: Layout,
    pub about: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_title: "Hazards".to_string(),
            title: "Canadian Fires".to_string(),
            layout: Layout::Wide,
            about: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_page_config_keeps_defaults() {
        let config: PageConfig = toml::from_str("layout = \"centered\"").unwrap();
        assert_eq!(config.page_title, "Hazards");
        assert_eq!(config.title, "Canadian Fires");
        assert_eq!(config.layout, Layout::Centered);
        assert_eq!(config.layout.max_width(), "960px");
    }
}
