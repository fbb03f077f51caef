use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::Location;

/// Fixed file name of the favorites list inside the data directory.
pub const FAVORITES_FILE: &str = "favorites.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub name: String,
    pub location: Location,
}

/// Saved locations, persisted as a JSON array.
///
/// Read once when constructed and rewritten in full after every mutation.
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    path: Option<PathBuf>,
    items: Vec<Favorite>,
}

impl Favorites {
    /// A list that is never written anywhere.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the list stored at `path`.
    ///
    /// A missing file is an empty list. An unreadable or corrupt file is logged and also
    /// treated as empty; it is overwritten on the next mutation.
    pub fn load(path: PathBuf) -> Self {
        let items = match read_items(&path) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(path = %path.display(), "Ignoring unreadable favorites: {err:#}");
                Vec::new()
            }
        };

        Self { path: Some(path), items }
    }

    pub fn items(&self) -> &[Favorite] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Favorite> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, location: Location) -> bool {
        self.items.iter().any(|f| f.location == location)
    }

    /// Add `favorite` unless its location is already saved. Returns whether it was added.
    ///
    /// The list only changes once the file has been written.
    pub fn add(&mut self, favorite: Favorite) -> Result<bool> {
        if self.contains(favorite.location) {
            return Ok(false);
        }

        let mut items = self.items.clone();
        items.push(favorite);
        self.commit(items)?;
        Ok(true)
    }

    pub fn remove(&mut self, index: usize) -> Result<Option<Favorite>> {
        if index >= self.items.len() {
            return Ok(None);
        }

        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.commit(items)?;
        Ok(Some(removed))
    }

    fn commit(&mut self, items: Vec<Favorite>) -> Result<()> {
        write_items(self.path.as_deref(), &items)?;
        self.items = items;
        Ok(())
    }
}

fn write_items(path: Option<&Path>, items: &[Favorite]) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create favorites directory: {}", parent.display())
        })?;
    }

    let json = serde_json::to_string_pretty(items).context("Failed to serialize favorites")?;

    fs::write(path, json)
        .with_context(|| format!("Failed to write favorites file: {}", path.display()))
}

fn read_items(path: &Path) -> Result<Vec<Favorite>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read favorites file: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse favorites file: {}", path.display()))
}
