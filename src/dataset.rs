//! Loading of the static per-family datasets.
//!
//! Each `*.json` file in the data directory is one profession family; the
//! file stem is the family slug. Datasets are read once at startup and never
//! mutated afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{CategoryWeights, Track, derive_stress_scores};

const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.5..=10.5;

/// Field names of the keyed chart rows; a track key must not shadow them.
const RESERVED_KEYS: [&str; 3] = ["age", "dim", "emoji"];

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset JSON in {family}: {source}")]
    Parse {
        family: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate track key `{key}` in family {family}")]
    DuplicateKey { family: String, key: String },

    #[error("track key `{key}` in family {family} collides with a chart field")]
    ReservedKey { family: String, key: String },

    #[error("family {0} has no tracks")]
    NoTracks(String),

    #[error("unknown profession family: {0}")]
    UnknownFamily(String),
}

/// One profession family. Only `tracks` (and the optional weight profiles)
/// feed computations; the rest is display metadata passed through as-is.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FamilyDataset {
    #[serde(default)]
    pub meta: serde_json::Value,
    #[serde(default)]
    pub professions: serde_json::Value,
    #[serde(default)]
    pub groups: serde_json::Value,
    #[serde(default)]
    pub careers: serde_json::Value,
    #[serde(default)]
    pub scenario_profiles: BTreeMap<String, CategoryWeights>,
    pub tracks: Vec<Track>,
}

impl FamilyDataset {
    pub fn family_name(&self) -> Option<&str> {
        self.meta.get("family_name").and_then(|v| v.as_str())
    }
}

pub fn parse_family(family: &str, json: &str) -> Result<FamilyDataset, DatasetError> {
    let mut dataset: FamilyDataset =
        serde_json::from_str(json).map_err(|source| DatasetError::Parse {
            family: family.to_string(),
            source,
        })?;
    validate(family, &dataset)?;
    fill_derived_stress(&mut dataset.tracks);
    Ok(dataset)
}

fn fill_derived_stress(tracks: &mut [Track]) {
    for track in tracks {
        if track.stress.is_some() {
            continue;
        }
        if let Some(factors) = &track.stress_factors {
            track.stress = Some(derive_stress_scores(factors, &track.profession).into());
            tracing::debug!(track = %track.key, "derived stress scores from factors");
        }
    }
}

pub fn load_family(path: &Path) -> Result<FamilyDataset, DatasetError> {
    let json = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_family(&family_slug(path), &json)
}

fn family_slug(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn validate(family: &str, dataset: &FamilyDataset) -> Result<(), DatasetError> {
    if dataset.tracks.is_empty() {
        return Err(DatasetError::NoTracks(family.to_string()));
    }

    let mut seen = HashSet::new();
    for track in &dataset.tracks {
        if !seen.insert(track.key.as_str()) {
            return Err(DatasetError::DuplicateKey {
                family: family.to_string(),
                key: track.key.clone(),
            });
        }
        if RESERVED_KEYS.contains(&track.key.as_str()) {
            return Err(DatasetError::ReservedKey {
                family: family.to_string(),
                key: track.key.clone(),
            });
        }
        let Some(scores) = &track.scores else {
            continue;
        };
        for (category, score) in scores.iter() {
            if !SCORE_RANGE.contains(&score) {
                tracing::warn!(family, track = %track.key, category, score, "category score out of range");
            }
        }
    }
    Ok(())
}

/// Every family found in a data directory, keyed by slug.
#[derive(Debug, Default)]
pub struct Catalog {
    families: BTreeMap<String, FamilyDataset>,
}

impl Catalog {
    pub fn load_dir(dir: &Path) -> Result<Self, DatasetError> {
        let io_err = |source| DatasetError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::default();
        for path in paths {
            let dataset = load_family(&path)?;
            let slug = family_slug(&path);
            tracing::info!(family = %slug, tracks = dataset.tracks.len(), "loaded family dataset");
            catalog.insert(slug, dataset);
        }
        if catalog.is_empty() {
            tracing::warn!(dir = %dir.display(), "no family datasets found");
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, slug: impl Into<String>, dataset: FamilyDataset) {
        self.families.insert(slug.into(), dataset);
    }

    pub fn get(&self, slug: &str) -> Result<&FamilyDataset, DatasetError> {
        self.families
            .get(slug)
            .ok_or_else(|| DatasetError::UnknownFamily(slug.to_string()))
    }

    pub fn families(&self) -> impl Iterator<Item = (&str, &FamilyDataset)> {
        self.families.iter().map(|(slug, d)| (slug.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
