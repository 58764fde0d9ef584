//! Reward-catalog CSV import.
//!
//! Back-office exports arrive as `Reward ID,Name,Required Points,Active`
//! sheets. This module turns them into catalog entries for seeding the
//! reward catalog at startup or from the command line.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::loyalty::claims::domain::{Reward, RewardId};

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to open catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: {detail}")]
    InvalidRecord { row: usize, detail: String },
    #[error("row {row}: duplicate reward id {id}")]
    DuplicateReward { row: usize, id: u64 },
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Reward ID")]
    reward_id: u64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Required Points")]
    required_points: String,
    #[serde(rename = "Active", default)]
    active: Option<String>,
}

/// Importer for reward-catalog CSV exports.
pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<Reward>, CatalogImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Reward>, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rewards: Vec<Reward> = Vec::new();

        for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            // Row numbers are reported as they appear in the sheet; the
            // header occupies row 1.
            let row = index + 2;
            let parsed = record?;

            let name = parsed.name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogImportError::InvalidRecord {
                    row,
                    detail: "empty reward name".to_string(),
                });
            }

            let required_points = parsed.required_points.trim().parse::<u32>().map_err(|err| {
                CatalogImportError::InvalidRecord {
                    row,
                    detail: format!(
                        "required points '{}' is not a whole number ({err})",
                        parsed.required_points
                    ),
                }
            })?;

            let is_active = match parsed.active.as_deref() {
                None => true,
                Some(raw) => parse_active_flag(raw).ok_or_else(|| {
                    CatalogImportError::InvalidRecord {
                        row,
                        detail: format!("unrecognized active flag '{raw}'"),
                    }
                })?,
            };

            if rewards.iter().any(|existing| existing.id.0 == parsed.reward_id) {
                return Err(CatalogImportError::DuplicateReward {
                    row,
                    id: parsed.reward_id,
                });
            }

            rewards.push(Reward {
                id: RewardId(parsed.reward_id),
                name,
                required_points,
                is_active,
            });
        }

        Ok(rewards)
    }
}

fn parse_active_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Some(true),
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}
