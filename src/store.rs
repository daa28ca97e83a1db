//! Persisted listing set.
//!
//! Listings live in one CSV per zip code, named `"<zip> Rental Listings.csv"`,
//! with a single `rentals.csv` accepted as a fallback. Rows are read with
//! either lower-case (`address`, `price`, `lat`) or title-case (`Address`,
//! `Rental Price`, `Latitude`) headers and are always written back in the
//! lower-case layout. Derived scores are never written.
//!
//! Saving rewrites every file that was loaded. Accepted listings go to the
//! file for their zip, rejected rows go back to the file they came from with
//! their original field values, and a loaded file left with no rows keeps
//! only its header.

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{DataError, StoreError};
use crate::types::{AmenityMetrics, Coordinate, Listing, ZipCode};

const ZIP_FILE_SUFFIX: &str = " Rental Listings.csv";
const FALLBACK_FILE: &str = "rentals.csv";

const COLUMNS: [&str; 12] = [
    "address",
    "zip",
    "price",
    "lat",
    "lng",
    "url",
    "bedrooms",
    "bathrooms",
    "sqft",
    "Transit Score",
    "Social Score",
    "Grocery Score",
];

pub trait ListingStore {
    fn load(&self) -> Result<LoadedListings, StoreError>;
    /// Persists a loaded set, including the rows it rejected.
    fn save(&self, loaded: &LoadedListings) -> Result<(), StoreError>;
}

/// A row that was skipped at load time, kept so saving can write it back.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub file: PathBuf,
    pub line: u64,
    pub error: DataError,
    pub row: ListingRow,
}

#[derive(Debug, Default)]
pub struct LoadedListings {
    pub listings: Vec<Listing>,
    pub rejected: Vec<RejectedRow>,
    /// Every file read, in load order.
    pub sources: Vec<PathBuf>,
}

/// One CSV row as text, in either header style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    #[serde(default, alias = "Address")]
    address: Option<String>,
    #[serde(default, alias = "Zip Code")]
    zip: Option<String>,
    #[serde(default, alias = "Rental Price")]
    price: Option<String>,
    #[serde(default, alias = "Latitude")]
    lat: Option<String>,
    #[serde(default, alias = "Longitude")]
    lng: Option<String>,
    #[serde(default, alias = "URL")]
    url: Option<String>,
    #[serde(default, alias = "Bedrooms")]
    bedrooms: Option<String>,
    #[serde(default, alias = "Bathrooms")]
    bathrooms: Option<String>,
    #[serde(default, alias = "Square Feet")]
    sqft: Option<String>,
    #[serde(default, rename = "Transit Score")]
    transit_score: Option<String>,
    #[serde(default, rename = "Social Score")]
    social_score: Option<String>,
    #[serde(default, rename = "Grocery Score")]
    grocery_score: Option<String>,
}

impl From<&Listing> for ListingRow {
    fn from(l: &Listing) -> Self {
        let text = |v: Option<f64>| v.map(|v| v.to_string());
        Self {
            address: Some(l.address.clone()),
            zip: Some(l.zip.as_str().to_string()),
            price: Some(l.price.to_string()),
            lat: text(l.coordinate.map(|c| c.lat)),
            lng: text(l.coordinate.map(|c| c.lng)),
            url: l.url.clone(),
            bedrooms: text(l.bedrooms),
            bathrooms: text(l.bathrooms),
            sqft: text(l.square_feet),
            transit_score: Some(l.metrics.transit_score.to_string()),
            social_score: Some(l.metrics.social_raw.to_string()),
            grocery_score: Some(l.metrics.grocery_raw.to_string()),
        }
    }
}

/// Accepts plain numbers as well as `$2,500` style prices.
fn parse_price(raw: Option<&str>) -> Result<f64, DataError> {
    let cleaned: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    match cleaned.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(DataError::InvalidPrice),
    }
}

/// Blank or non-numeric text reads as missing.
fn number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn raw_metric(raw: Option<&str>) -> u32 {
    match number(raw) {
        Some(v) if v > 0.0 => v.round().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

impl ListingRow {
    fn to_listing(&self, zip_hint: Option<&ZipCode>) -> Result<Listing, DataError> {
        let price = parse_price(self.price.as_deref())?;
        let zip = self
            .zip
            .as_deref()
            .and_then(ZipCode::parse)
            .or_else(|| zip_hint.cloned())
            .ok_or(DataError::MissingZip)?;
        let address = self.address.as_deref().unwrap_or_default().trim().to_string();

        let coordinate = match (number(self.lat.as_deref()), number(self.lng.as_deref())) {
            (Some(lat), Some(lng)) => match Coordinate::new(lat, lng) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(address = %address, error = %e, "Dropping invalid coordinate");
                    None
                }
            },
            _ => None,
        };

        Ok(Listing {
            address,
            zip,
            coordinate,
            price,
            bedrooms: number(self.bedrooms.as_deref()),
            bathrooms: number(self.bathrooms.as_deref()),
            square_feet: number(self.sqft.as_deref()),
            url: self.url.clone().filter(|u| !u.trim().is_empty()),
            metrics: AmenityMetrics {
                transit_score: raw_metric(self.transit_score.as_deref()).min(100) as u8,
                social_raw: raw_metric(self.social_score.as_deref()),
                grocery_raw: raw_metric(self.grocery_score.as_deref()),
            },
        })
    }
}

/// CSV files in a single directory, one per zip code.
pub struct CsvListingStore {
    dir: PathBuf,
}

impl CsvListingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn zip_file(&self, zip: &ZipCode) -> PathBuf {
        self.dir.join(format!("{zip}{ZIP_FILE_SUFFIX}"))
    }

    /// Per-zip files in name order, each with the zip taken from its name.
    fn zip_files(&self) -> Result<Vec<(PathBuf, Option<ZipCode>)>, StoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.display().to_string(),
                source,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(prefix) = name.strip_suffix(ZIP_FILE_SUFFIX) {
                files.push((entry.path(), ZipCode::parse(prefix)));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    fn read_file(
        &self,
        path: &Path,
        zip_hint: Option<&ZipCode>,
        loaded: &mut LoadedListings,
    ) -> Result<usize, StoreError> {
        let path_str = path.display().to_string();
        let csv_err = |source| StoreError::Csv {
            path: path_str.clone(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .trim(Trim::Headers)
            .from_path(path)
            .map_err(csv_err)?;
        let headers: StringRecord = reader.headers().map_err(csv_err)?.clone();
        loaded.sources.push(path.to_path_buf());

        let mut count = 0;
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let row: ListingRow = record.deserialize(Some(&headers)).map_err(csv_err)?;

            match row.to_listing(zip_hint) {
                Ok(listing) => {
                    loaded.listings.push(listing);
                    count += 1;
                }
                Err(error) => {
                    debug!(file = %path_str, line, error = %error, "Skipping listing row");
                    loaded.rejected.push(RejectedRow {
                        file: path.to_path_buf(),
                        line,
                        error,
                        row,
                    });
                }
            }
        }
        Ok(count)
    }

    fn write_file(&self, path: &Path, rows: &[&ListingRow]) -> Result<(), StoreError> {
        let path_str = path.display().to_string();
        let csv_err = |source| StoreError::Csv {
            path: path_str.clone(),
            source,
        };

        // The header is written by hand so a file with no rows keeps it.
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(csv_err)?;
        writer.write_record(COLUMNS).map_err(csv_err)?;
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: path_str.clone(),
            source,
        })?;
        info!(file = %path_str, count = rows.len(), "Updated rentals");
        Ok(())
    }
}

/// Rows bound for one file, in first-seen file order.
fn file_rows<'a, 'b>(
    files: &'b mut Vec<(PathBuf, Vec<&'a ListingRow>)>,
    path: PathBuf,
) -> &'b mut Vec<&'a ListingRow> {
    let index = match files.iter().position(|(p, _)| *p == path) {
        Some(index) => index,
        None => {
            files.push((path, Vec::new()));
            files.len() - 1
        }
    };
    &mut files[index].1
}

impl ListingStore for CsvListingStore {
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load(&self) -> Result<LoadedListings, StoreError> {
        let mut loaded = LoadedListings::default();

        for (path, zip) in self.zip_files()? {
            let count = self.read_file(&path, zip.as_ref(), &mut loaded)?;
            info!(file = %path.display(), count, "Loaded rentals");
        }

        if loaded.listings.is_empty() && loaded.rejected.is_empty() {
            let fallback = self.dir.join(FALLBACK_FILE);
            if !fallback.exists() {
                return Err(StoreError::Empty(self.dir.display().to_string()));
            }
            let count = self.read_file(&fallback, None, &mut loaded)?;
            info!(file = %fallback.display(), count, "Loaded rentals");
        }

        if !loaded.rejected.is_empty() {
            warn!(rejected = loaded.rejected.len(), "Some listing rows were skipped");
        }
        info!(total = loaded.listings.len(), "Total rentals loaded");
        Ok(loaded)
    }

    #[tracing::instrument(
        skip(self, loaded),
        fields(dir = %self.dir.display(), count = loaded.listings.len(), rejected = loaded.rejected.len())
    )]
    fn save(&self, loaded: &LoadedListings) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let accepted: Vec<ListingRow> = loaded.listings.iter().map(ListingRow::from).collect();

        let mut files: Vec<(PathBuf, Vec<&ListingRow>)> = loaded
            .sources
            .iter()
            .map(|path| (path.clone(), Vec::new()))
            .collect();
        for (listing, row) in loaded.listings.iter().zip(&accepted) {
            file_rows(&mut files, self.zip_file(&listing.zip)).push(row);
        }
        for rejected in &loaded.rejected {
            file_rows(&mut files, rejected.file.clone()).push(&rejected.row);
        }

        for (path, rows) in &files {
            self.write_file(path, rows)?;
        }
        Ok(())
    }
}
