//! City catalog: where each city's files live and how its map opens.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Geographic point the map is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}

/// Initial map position for a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: MapCenter,
    pub zoom_level: f64,
}

/// One city in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    /// Display name, also the key used by every selector (e.g. `"Madrid, Spain"`).
    pub name: String,
    /// Combined listings CSV for the city.
    pub listings: PathBuf,
    /// Neighbourhood boundaries GeoJSON for the city.
    pub geojson: PathBuf,
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

/// Ordered list of the cities the dashboard knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCatalog {
    pub cities: Vec<CityEntry>,
}

/// `(name, listings file, geojson file, lat, lon, zoom)` for the bundled cities.
const DEFAULT_CITIES: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("Madrid, Spain", "Madrid_combined_data_final.csv", "neighbourhoods_madrid.geojson", 40.472775, -3.703790, 9.80),
    ("Barcelona, Spain", "Barcelona_combined_data_final.csv", "neighbourhoods_barcelona.geojson", 41.389785, 2.166775, 10.9),
    ("Mallorca, Spain", "Mallorca_combined_data_final.csv", "neighbourhoods_mallorca.geojson", 39.695262, 3.017571, 8.85),
    ("Florence, Italy", "florence_combined_data_final.csv", "neighbourhoods_florence.geojson", 43.769562, 11.255814, 11.0),
    ("Milan, Italy", "Milan_combined_data_final.csv", "neighbourhoods_milan.geojson", 45.464204, 9.189982, 10.8),
    ("Rome, Italy", "rome_combined_data_final.csv", "neighbourhoods_rome.geojson", 41.902782, 12.496366, 9.6),
    ("Lisbon, Portugal", "Lisbon_combined_data_final.csv", "neighbourhoods_lisbon.geojson", 38.936946, -9.242685, 9.0),
];

impl CityCatalog {
    /// Default data directory: `~/webapp/data`.
    pub fn default_data_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join("webapp").join("data")
    }

    /// The bundled catalog, with files under `<data_dir>/combined` and
    /// `<data_dir>/geojson`.
    pub fn bundled(data_dir: &Path) -> Self {
        let cities = DEFAULT_CITIES
            .iter()
            .map(|&(name, listings, geojson, lat, lon, zoom_level)| CityEntry {
                name: name.to_string(),
                listings: data_dir.join("combined").join(listings),
                geojson: data_dir.join("geojson").join(geojson),
                viewport: Some(Viewport {
                    center: MapCenter { lat, lon },
                    zoom_level,
                }),
            })
            .collect();
        Self { cities }
    }

    /// Load a JSON catalog from `path`. Relative file paths inside it are
    /// resolved against `data_dir`.
    pub fn load_from(path: &Path, data_dir: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DashboardError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut catalog: CityCatalog = serde_json::from_str(&content)?;
        if catalog.cities.is_empty() {
            return Err(DashboardError::Config(format!(
                "catalog {} lists no cities",
                path.display()
            )));
        }
        for city in &mut catalog.cities {
            if city.listings.is_relative() {
                city.listings = data_dir.join(&city.listings);
            }
            if city.geojson.is_relative() {
                city.geojson = data_dir.join(&city.geojson);
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&CityEntry> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// City names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.cities.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn viewport(&self, name: &str) -> Option<Viewport> {
        self.get(name).and_then(|c| c.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_catalog_layout() {
        let catalog = CityCatalog::bundled(Path::new("/srv/data"));
        assert_eq!(catalog.cities.len(), 7);
        let madrid = catalog.get("Madrid, Spain").unwrap();
        assert_eq!(
            madrid.listings,
            PathBuf::from("/srv/data/combined/Madrid_combined_data_final.csv")
        );
        assert_eq!(
            madrid.geojson,
            PathBuf::from("/srv/data/geojson/neighbourhoods_madrid.geojson")
        );
    }

    #[test]
    fn test_bundled_viewport() {
        let catalog = CityCatalog::bundled(Path::new("/srv/data"));
        let vp = catalog.viewport("Barcelona, Spain").unwrap();
        assert!((vp.zoom_level - 10.9).abs() < f64::EPSILON);
        assert!((vp.center.lat - 41.389785).abs() < 1e-9);
        assert!(catalog.viewport("Atlantis").is_none());
    }

    #[test]
    fn test_names_keep_catalog_order() {
        let catalog = CityCatalog::bundled(Path::new("."));
        assert_eq!(catalog.names()[0], "Madrid, Spain");
        assert_eq!(catalog.names()[6], "Lisbon, Portugal");
    }

    #[test]
    fn test_load_from_resolves_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"cities": [
                {"name": "Porto, Portugal", "listings": "combined/porto.csv", "geojson": "/abs/porto.geojson"}
            ]}"#,
        )
        .unwrap();

        let catalog = CityCatalog::load_from(&path, Path::new("/data")).unwrap();
        let porto = catalog.get("Porto, Portugal").unwrap();
        assert_eq!(porto.listings, PathBuf::from("/data/combined/porto.csv"));
        assert_eq!(porto.geojson, PathBuf::from("/abs/porto.geojson"));
        assert!(porto.viewport.is_none());
    }

    #[test]
    fn test_load_from_rejects_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, r#"{"cities": []}"#).unwrap();

        let err = CityCatalog::load_from(&path, Path::new("/data")).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = CityCatalog::load_from(Path::new("/tmp/no-such-catalog-xyz.json"), Path::new("."))
            .unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }
}
