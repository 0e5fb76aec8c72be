//! Presentational models for the card grid and the detail modal.
//!
//! Nothing here fetches or mutates catalog data. Every view is `Serialize`
//! for embedders and `Display` for the terminal.

use std::fmt;

use serde::Serialize;

use crate::controller::ListSnapshot;
use crate::types::{CatalogItem, RelatedList};

pub const NO_DESCRIPTION: &str = "No description available.";
pub const CARD_STORY_CAP: usize = 3;
pub const DETAIL_STORY_CAP: usize = 10;
pub const DETAIL_COMIC_CAP: usize = 5;
pub const DETAIL_SERIES_CAP: usize = 5;

/// Grid key: ids alone can repeat across pages of a transient list.
pub fn card_key(item: &CatalogItem, position: usize) -> String {
    format!("{}-{}-{}", item.id, position, item.name)
}

fn more_line(hidden: usize) -> Option<String> {
    (hidden > 0).then(|| format!("+{hidden} more"))
}

/// Image source with a placeholder to use when loading the real one fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub src: String,
    pub fallback: String,
}

impl ImageRef {
    pub fn for_item(item: &CatalogItem, placeholder: &str) -> Self {
        let src = item.thumbnail.url().unwrap_or_else(|| placeholder.to_string());
        Self { src, fallback: placeholder.to_string() }
    }

    /// The reference to display, given whether loading `src` failed.
    pub fn resolve(&self, load_failed: bool) -> &str {
        if load_failed { &self.fallback } else { &self.src }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub key: String,
    pub name: String,
    pub description: String,
    pub image: ImageRef,
    pub stories: Vec<String>,
    pub more_stories: Option<String>,
}

impl CardView {
    pub fn new(item: &CatalogItem, position: usize, placeholder: &str) -> Self {
        let stories = item.stories.items.iter().take(CARD_STORY_CAP).map(|s| s.name.clone()).collect();
        Self {
            key: card_key(item, position),
            name: item.name.clone(),
            description: item.description().unwrap_or(NO_DESCRIPTION).to_string(),
            image: ImageRef::for_item(item, placeholder),
            stories,
            more_stories: more_line(item.stories.len().saturating_sub(CARD_STORY_CAP)),
        }
    }
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  {}", self.description)?;
        if !self.stories.is_empty() {
            writeln!(f, "  Stories:")?;
            for s in &self.stories {
                writeln!(f, "    - {s}")?;
            }
            if let Some(more) = &self.more_stories {
                writeln!(f, "    {more}")?;
            }
        }
        Ok(())
    }
}

/// One-line status shown under the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GridStatus {
    Searching,
    LoadingMore,
    AllLoaded,
    NoResults,
    Idle,
}

impl GridStatus {
    pub fn from_snapshot(snap: &ListSnapshot) -> Self {
        if snap.is_searching {
            GridStatus::Searching
        } else if snap.is_loading_more {
            GridStatus::LoadingMore
        } else if snap.items.is_empty() {
            GridStatus::NoResults
        } else if !snap.has_more {
            GridStatus::AllLoaded
        } else {
            GridStatus::Idle
        }
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            GridStatus::Searching => Some("Searching..."),
            GridStatus::LoadingMore => Some("Loading more characters..."),
            GridStatus::AllLoaded => Some("All characters loaded!"),
            GridStatus::NoResults => Some("No characters found."),
            GridStatus::Idle => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardGrid {
    pub cards: Vec<CardView>,
    pub status: GridStatus,
}

impl CardGrid {
    pub fn new(snap: &ListSnapshot, placeholder: &str) -> Self {
        let cards = snap.items.iter().enumerate().map(|(i, item)| CardView::new(item, i, placeholder)).collect();
        Self { cards, status: GridStatus::from_snapshot(snap) }
    }
}

impl fmt::Display for CardGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 { writeln!(f)?; }
            write!(f, "{card}")?;
        }
        if let Some(msg) = self.status.message() {
            if !self.cards.is_empty() { writeln!(f)?; }
            writeln!(f, "{msg}")?;
        }
        Ok(())
    }
}

/// A titled, capped list of related names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSection {
    pub title: String,
    pub total: usize,
    pub entries: Vec<String>,
    pub more: Option<String>,
}

impl DetailSection {
    fn build(title: &str, list: &RelatedList, cap: usize) -> Option<Self> {
        if list.is_empty() { return None; }
        Some(Self {
            title: title.to_string(),
            total: list.len(),
            entries: list.items.iter().take(cap).map(|i| i.name.clone()).collect(),
            more: more_line(list.len().saturating_sub(cap)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub name: String,
    pub image: ImageRef,
    pub description: Option<String>,
    pub sections: Vec<DetailSection>,
}

impl DetailView {
    pub fn new(item: &CatalogItem, placeholder: &str) -> Self {
        let sections = [
            DetailSection::build("Stories", &item.stories, DETAIL_STORY_CAP),
            DetailSection::build("Comics", &item.comics, DETAIL_COMIC_CAP),
            DetailSection::build("Series", &item.series, DETAIL_SERIES_CAP),
        ]
        .into_iter()
        .flatten()
        .collect();
        Self {
            name: item.name.clone(),
            image: ImageRef::for_item(item, placeholder),
            description: item.description().map(str::to_string),
            sections,
        }
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "[{}]", self.image.src)?;
        if let Some(desc) = &self.description {
            writeln!(f, "\nDescription\n  {desc}")?;
        }
        for s in &self.sections {
            writeln!(f, "\n{} ({})", s.title, s.total)?;
            for e in &s.entries {
                writeln!(f, "  - {e}")?;
            }
            if let Some(more) = &s.more {
                writeln!(f, "  {more}")?;
            }
        }
        Ok(())
    }
}

/// Which item is selected and whether the modal shows it.
#[derive(Debug, Clone, Default)]
pub struct DetailModal {
    selected: Option<CatalogItem>,
    open: bool,
}

impl DetailModal {
    pub fn open(&mut self, item: CatalogItem) {
        self.selected = Some(item);
        self.open = true;
    }

    /// Hides the modal; the selection stays until the next `open`.
    pub fn close(&mut self) { self.open = false; }

    pub fn is_open(&self) -> bool { self.open }
    pub fn selected(&self) -> Option<&CatalogItem> { self.selected.as_ref() }

    /// The view to show, if the modal is open.
    pub fn view(&self, placeholder: &str) -> Option<DetailView> {
        if !self.open { return None; }
        self.selected.as_ref().map(|item| DetailView::new(item, placeholder))
    }
}
