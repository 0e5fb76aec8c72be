use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One character record as returned by the upstream catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Thumbnail,
    #[serde(default)]
    pub stories: RelatedList,
    #[serde(default)]
    pub comics: RelatedList,
    #[serde(default)]
    pub series: RelatedList,
}

impl CatalogItem {
    /// Description with the upstream's empty-string placeholder treated as absent.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}

impl Thumbnail {
    pub fn url(&self) -> Option<String> {
        if self.path.is_empty() { return None; }
        if self.extension.is_empty() { return Some(self.path.clone()); }
        Some(format!("{}.{}", self.path, self.extension))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedList {
    #[serde(default)]
    pub available: Option<u32>,
    #[serde(default)]
    pub items: Vec<RelatedItem>,
}

impl RelatedList {
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Top-level upstream response body. Only `data.results` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    pub data: DataContainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataContainer {
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
    pub results: Vec<CatalogItem>,
}

/// A page of items plus whatever continuation signal the upstream supplied.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<CatalogItem>,
    pub total: Option<u32>,
}

impl From<Envelope> for Page {
    fn from(env: Envelope) -> Self {
        Page { items: env.data.results, total: env.data.total }
    }
}

/// Query accepted by the proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
    pub search: Option<String>,
}

impl PageRequest {
    pub fn new(limit: u32, offset: u32, search: Option<&str>) -> Self {
        let search = search.filter(|s| !s.trim().is_empty()).map(str::to_string);
        Self { limit, offset, search }
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { limit: DEFAULT_PAGE_SIZE, offset: 0, search: None } }
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw { Str(String), Num(serde_json::Number) }
    Ok(match Raw::deserialize(d)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}
