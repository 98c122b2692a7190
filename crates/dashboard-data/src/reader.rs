//! Loading of per-city listing files and neighbourhood boundaries.
//!
//! A [`DataProvider`] hands back raw rows for a city; the rows are validated
//! later by [`crate::store::RecordStore`]. [`FileProvider`] reads the combined
//! CSV and GeoJSON files named by a [`CityCatalog`].

use std::fs::File;
use std::path::Path;

use dashboard_core::catalog::{CityCatalog, CityEntry, Viewport};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::RawListing;
use csv::StringRecord;
use tracing::debug;

/// Everything a provider returns for one city.
#[derive(Debug, Clone, Default)]
pub struct CitySource {
    pub rows: Vec<RawListing>,
    /// Neighbourhood boundaries, passed through untouched.
    pub geometry: Option<serde_json::Value>,
}

/// Source of raw listing rows, one city at a time.
pub trait DataProvider {
    /// Cities this provider can serve, in display order.
    fn cities(&self) -> Vec<String>;

    /// Rows and boundaries for `city`.
    fn fetch(&self, city: &str) -> Result<CitySource>;

    /// Initial map position for `city`, when the provider knows one.
    fn viewport(&self, _city: &str) -> Option<Viewport> {
        None
    }
}

// ── FileProvider ──────────────────────────────────────────────────────────────

/// Reads the files listed in a [`CityCatalog`].
#[derive(Debug, Clone)]
pub struct FileProvider {
    catalog: CityCatalog,
}

impl FileProvider {
    pub fn new(catalog: CityCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    fn entry(&self, city: &str) -> Result<&CityEntry> {
        self.catalog
            .get(city)
            .ok_or_else(|| DashboardError::Config(format!("city not in catalog: {}", city)))
    }
}

impl DataProvider for FileProvider {
    fn cities(&self) -> Vec<String> {
        self.catalog.names().into_iter().map(str::to_string).collect()
    }

    fn fetch(&self, city: &str) -> Result<CitySource> {
        let entry = self.entry(city)?;
        let rows = read_listings_csv(&entry.listings)?;
        let geometry = read_geojson(&entry.geojson)?;

        Ok(CitySource {
            rows,
            geometry: Some(geometry),
        })
    }

    fn viewport(&self, city: &str) -> Option<Viewport> {
        self.catalog.viewport(city)
    }
}

// ── File readers ──────────────────────────────────────────────────────────────

/// Read every row of a combined listings CSV.
///
/// Cells that are not valid UTF-8 are decoded lossily. Records that still
/// cannot be mapped to a row are skipped; unparsable numeric cells are read
/// as absent.
pub fn read_listings_csv(path: &Path) -> Result<Vec<RawListing>> {
    let file = File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = lossy_record(reader.byte_headers()?);

    let mut rows = Vec::new();
    let mut skipped = 0u64;
    for record in reader.byte_records() {
        let row = record
            .map_err(DashboardError::from)
            .and_then(|bytes| Ok(lossy_record(&bytes).deserialize::<RawListing>(Some(&headers))?));
        match row {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                debug!("Skipping record in {}: {}", path.display(), e);
            }
        }
    }

    debug!(
        "File {}: {} rows read, {} skipped",
        path.display(),
        rows.len(),
        skipped
    );
    Ok(rows)
}

/// Decode every field of a raw record, replacing invalid UTF-8 sequences.
fn lossy_record(record: &csv::ByteRecord) -> StringRecord {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field))
        .collect()
}

/// Read a GeoJSON document without interpreting it.
pub fn read_geojson(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str =
        "id,name,date,price,neighbourhood_cleansed,review_scores_rating,number_of_reviews,host_name,room_type,minimum_nights,conf_int_lower,conf_int_upper,best_model";

    fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn catalog_for(dir: &Path) -> CityCatalog {
        CityCatalog {
            cities: vec![CityEntry {
                name: "Lisbon, Portugal".to_string(),
                listings: dir.join("lisbon.csv"),
                geojson: dir.join("lisbon.geojson"),
                viewport: None,
            }],
        }
    }

    // ── read_listings_csv ─────────────────────────────────────────────────

    #[test]
    fn test_read_listings_csv_maps_headers() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "lisbon.csv",
            &[
                HEADER,
                "42,Tile house,2024-05-01,88.5,Alfama,4.8,12.0,Rita,Entire home/apt,2,,,",
            ],
        );

        let rows = read_listings_csv(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id.as_deref(), Some("42"));
        assert_eq!(row.neighbourhood.as_deref(), Some("Alfama"));
        assert_eq!(row.price, Some(88.5));
        assert_eq!(row.rating, Some(4.8));
        assert_eq!(row.review_count, Some(12.0));
        assert_eq!(row.minimum_nights, Some(2.0));
        assert_eq!(row.confidence_lower, None);
    }

    #[test]
    fn test_read_listings_csv_bad_numbers_become_absent() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "lisbon.csv",
            &[
                HEADER,
                "1,A,2024-05-01,n/a,Alfama,,0,,,,,,",
                "2,B,2024-05-01,70,Baixa,great,3,,,,60,80,prophet",
            ],
        );

        let rows = read_listings_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, None);
        assert_eq!(rows[1].rating, None);
        assert_eq!(rows[1].confidence_upper, Some(80.0));
        assert_eq!(rows[1].best_model.as_deref(), Some("prophet"));
    }

    #[test]
    fn test_read_listings_csv_keeps_rows_with_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lisbon.csv");
        let mut content = Vec::new();
        content.extend_from_slice(HEADER.as_bytes());
        content.extend_from_slice(b"\n1,Caf\xe9 loft,2024-05-01,80,Alfama,,,,,,,,\n");
        content.extend_from_slice(b"2,Ok,2024-05-01,90,Baixa,,,,,,,,\n");
        std::fs::write(&path, content).unwrap();

        let rows = read_listings_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("Caf\u{FFFD} loft"));
        assert_eq!(rows[0].price, Some(80.0));
        assert_eq!(rows[0].neighbourhood.as_deref(), Some("Alfama"));
        assert_eq!(rows[1].id.as_deref(), Some("2"));
    }

    #[test]
    fn test_read_listings_csv_missing_file() {
        let err = read_listings_csv(Path::new("/nonexistent/listings.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }

    // ── FileProvider ──────────────────────────────────────────────────────

    #[test]
    fn test_file_provider_fetch() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "lisbon.csv",
            &[HEADER, "1,A,2024-05-01,70,Alfama,4.5,3,,,,,,"],
        );
        write_file(
            dir.path(),
            "lisbon.geojson",
            &[r#"{"type": "FeatureCollection", "features": []}"#],
        );

        let provider = FileProvider::new(catalog_for(dir.path()));
        assert_eq!(provider.cities(), vec!["Lisbon, Portugal".to_string()]);
        assert_eq!(provider.viewport("Lisbon, Portugal"), None);

        let source = provider.fetch("Lisbon, Portugal").unwrap();
        assert_eq!(source.rows.len(), 1);
        assert_eq!(
            source.geometry.unwrap()["type"],
            serde_json::json!("FeatureCollection")
        );
    }

    #[test]
    fn test_file_provider_missing_geojson_fails_city() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "lisbon.csv",
            &[HEADER, "1,A,2024-05-01,70,Alfama,4.5,3,,,,,,"],
        );

        let provider = FileProvider::new(catalog_for(dir.path()));
        assert!(matches!(
            provider.fetch("Lisbon, Portugal"),
            Err(DashboardError::FileRead { .. })
        ));
    }

    #[test]
    fn test_file_provider_malformed_geojson_fails_city() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "lisbon.csv", &[HEADER]);
        write_file(dir.path(), "lisbon.geojson", &["{not json"]);

        let provider = FileProvider::new(catalog_for(dir.path()));
        assert!(matches!(
            provider.fetch("Lisbon, Portugal"),
            Err(DashboardError::JsonParse(_))
        ));
    }

    #[test]
    fn test_file_provider_unknown_city() {
        let dir = TempDir::new().unwrap();
        let provider = FileProvider::new(catalog_for(dir.path()));
        assert!(matches!(
            provider.fetch("Porto, Portugal"),
            Err(DashboardError::Config(_))
        ));
    }
}
