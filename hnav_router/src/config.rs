use hnav_utils::Lang;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("button configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("button configuration could not be fetched: {0}")]
    Fetch(String),
}

/// Per-language captions. A button without a caption for the active
/// language is not rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub th: Option<String>,
}

impl Labels {
    pub fn get(&self, lang: Lang) -> Option<&str> {
        let label = match lang {
            Lang::En => self.en.as_deref(),
            Lang::Th => self.th.as_deref(),
        };

        label.filter(|label| !label.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubButton {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_file: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(flatten)]
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainButton {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_file: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(flatten)]
    pub labels: Labels,
    #[serde(default)]
    pub sub_buttons: Vec<SubButton>,
}

/// The navigation tree. Loaded once and never mutated by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonConfiguration {
    #[serde(default)]
    pub main_buttons: Vec<MainButton>,
}

// `url: "news"`, `url: "/news"` and `jsonFile: "data/news.json"` all name the route `news`.
fn route_id(url: Option<&str>, json_file: Option<&str>) -> Option<String> {
    let from_url = url
        .map(|url| url.trim().trim_start_matches(['/', '?']))
        .filter(|id| !id.is_empty());

    if let Some(id) = from_url {
        return Some(id.to_owned());
    }

    let file = json_file?.rsplit('/').next()?;
    let stem = file.strip_suffix(".json").unwrap_or(file);
    (!stem.is_empty()).then(|| stem.to_owned())
}

impl SubButton {
    pub fn route_id(&self) -> Option<String> {
        route_id(self.url.as_deref(), self.json_file.as_deref())
    }

    pub fn content_resource(&self) -> Option<&str> {
        self.json_file.as_deref()
    }
}

impl MainButton {
    pub fn route_id(&self) -> Option<String> {
        route_id(self.url.as_deref(), self.json_file.as_deref())
    }

    pub fn content_resource(&self) -> Option<&str> {
        self.json_file.as_deref()
    }

    pub fn has_sub_buttons(&self) -> bool {
        !self.sub_buttons.is_empty()
    }

    pub fn sub_button(&self, id: &str) -> Option<&SubButton> {
        self.sub_buttons
            .iter()
            .find(|button| button.route_id().as_deref() == Some(id))
    }

    /// The sub-button marked default, else the first routable one.
    pub fn default_sub_button(&self) -> Option<&SubButton> {
        self.sub_buttons
            .iter()
            .filter(|button| button.route_id().is_some())
            .find(|button| button.is_default)
            .or_else(|| self.sub_buttons.iter().find(|button| button.route_id().is_some()))
    }
}

impl ButtonConfiguration {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn main_button(&self, id: &str) -> Option<&MainButton> {
        self.main_buttons
            .iter()
            .find(|button| button.route_id().as_deref() == Some(id))
    }

    /// The main button marked default, else the first routable one.
    pub fn default_main_button(&self) -> Option<&MainButton> {
        self.main_buttons
            .iter()
            .filter(|button| button.route_id().is_some())
            .find(|button| button.is_default)
            .or_else(|| self.main_buttons.iter().find(|button| button.route_id().is_some()))
    }
}
