//! Vendor master data and vendor name resolution.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use tracing::debug;

use crate::error::{Result, VendorDataError};

/// Longest word window compared against vendor names.
const MAX_WINDOW_WORDS: usize = 4;

/// Known vendors and the text fragments identifying them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorCatalog {
    /// Vendor name to vendor number.
    pub vendors: BTreeMap<String, String>,
    /// Lower-cased identifier fragment to vendor name.
    pub identifiers: BTreeMap<String, String>,
}

/// How a vendor name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VendorMatch {
    /// An identifier fragment occurred in the text or file name.
    Identifier,
    /// A word window was similar enough to the vendor name.
    Fuzzy { score: f64 },
}

impl VendorCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse master data JSON and validate it.
    pub fn from_json(json: &str) -> std::result::Result<Self, VendorDataError> {
        let mut catalog: VendorCatalog =
            serde_json::from_str(json).map_err(|e| VendorDataError::Parse(e.to_string()))?;
        catalog.identifiers = std::mem::take(&mut catalog.identifiers)
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load master data from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        debug!(
            "Loaded {} vendors and {} identifiers from {}",
            catalog.vendors.len(),
            catalog.identifiers.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Save master data as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Add a vendor.
    pub fn with_vendor(mut self, name: impl Into<String>, number: impl Into<String>) -> Self {
        self.vendors.insert(name.into(), number.into());
        self
    }

    /// Add an identifier fragment.
    pub fn with_identifier(mut self, fragment: &str, vendor: impl Into<String>) -> Self {
        self.identifiers.insert(fragment.to_lowercase(), vendor.into());
        self
    }

    /// Merge manually maintained identifiers; manual entries win.
    pub fn merge_identifiers(&mut self, manual: &BTreeMap<String, String>) {
        for (fragment, vendor) in manual {
            self.identifiers.insert(fragment.to_lowercase(), vendor.clone());
        }
    }

    /// Check that every identifier maps to a known vendor.
    ///
    /// Catalogs without vendors are identifier-only and always valid.
    pub fn validate(&self) -> std::result::Result<(), VendorDataError> {
        if self.vendors.is_empty() {
            return Ok(());
        }
        for (identifier, vendor) in &self.identifiers {
            if !self.vendors.contains_key(vendor) {
                return Err(VendorDataError::UnknownVendor {
                    identifier: identifier.clone(),
                    vendor: vendor.clone(),
                });
            }
        }
        Ok(())
    }

    /// Vendor number for a vendor name.
    pub fn vendor_number(&self, name: &str) -> Option<&str> {
        self.vendors.get(name).map(String::as_str)
    }

    /// Resolve the vendor for a document.
    ///
    /// Identifier fragments (catalog and `hints`) are matched against the
    /// first-page text and the file name, longest fragment first. Failing
    /// that, word windows of each line are compared to the vendor names and
    /// the best score at or above `threshold` wins.
    pub fn resolve(
        &self,
        lines: &[String],
        file_name: &str,
        hints: &[(&str, &str)],
        threshold: f64,
    ) -> Option<(String, VendorMatch)> {
        let haystack = format!("{}\n{}", lines.join("\n"), file_name).to_lowercase();

        let mut fragments: Vec<(&str, &str)> = self
            .identifiers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(hints.iter().copied())
            .filter(|(k, _)| !k.is_empty())
            .collect();
        fragments.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

        if let Some((fragment, vendor)) = fragments.iter().find(|(k, _)| haystack.contains(*k)) {
            debug!("Vendor {} identified by {:?}", vendor, fragment);
            return Some((vendor.to_string(), VendorMatch::Identifier));
        }

        self.fuzzy_match(lines, threshold)
            .map(|(vendor, score)| (vendor, VendorMatch::Fuzzy { score }))
    }

    fn fuzzy_match(&self, lines: &[String], threshold: f64) -> Option<(String, f64)> {
        let names: Vec<(&str, String)> = self
            .vendors
            .keys()
            .map(|name| (name.as_str(), simplify(name)))
            .filter(|(_, simple)| !simple.is_empty())
            .collect();
        if names.is_empty() {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for line in lines {
            let words: Vec<String> = simplify(line).split(' ').map(str::to_string).collect();
            for start in 0..words.len() {
                for len in 1..=MAX_WINDOW_WORDS.min(words.len() - start) {
                    let window = words[start..start + len].join(" ");
                    if window.is_empty() {
                        continue;
                    }
                    for (name, simple) in &names {
                        let score = jaro_winkler(&window, simple);
                        if best.is_none_or(|(_, s)| score > s) {
                            best = Some((*name, score));
                        }
                    }
                }
            }
        }

        match best {
            Some((name, score)) if score >= threshold => {
                debug!("Vendor {} matched with similarity {:.3}", name, score);
                Some((name.to_string(), score))
            }
            _ => None,
        }
    }
}

/// Lower-case alphanumerics with single spaces.
fn simplify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> VendorCatalog {
        VendorCatalog::new()
            .with_vendor("Black Diamond", "V100")
            .with_vendor("Darn Tough", "V200")
            .with_vendor("Helinox", "V300")
            .with_identifier("bdel.com", "Black Diamond")
            .with_identifier("Black Diamond Equipment", "Black Diamond")
    }

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identifier_match() {
        let found = catalog().resolve(&lines(&["Remit to: orders@bdel.com"]), "inv.pdf", &[], 0.92);
        assert_eq!(
            found,
            Some(("Black Diamond".to_string(), VendorMatch::Identifier))
        );
    }

    #[test]
    fn test_identifier_in_file_name() {
        let found = catalog().resolve(&[], "BDEL.COM_10023.pdf", &[], 0.92);
        assert_eq!(found.map(|(v, _)| v).as_deref(), Some("Black Diamond"));
    }

    #[test]
    fn test_longest_identifier_wins() {
        let catalog = VendorCatalog::new()
            .with_identifier("tough", "Other")
            .with_identifier("darn tough vermont", "Darn Tough");
        let found = catalog.resolve(&lines(&["Darn Tough Vermont LLC"]), "x.pdf", &[], 0.92);
        assert_eq!(found.map(|(v, _)| v).as_deref(), Some("Darn Tough"));
    }

    #[test]
    fn test_registry_hints() {
        let found = VendorCatalog::new().resolve(
            &lines(&["www.helinox.com"]),
            "x.pdf",
            &[("helinox.com", "Helinox")],
            0.92,
        );
        assert_eq!(found.map(|(v, _)| v).as_deref(), Some("Helinox"));
    }

    #[test]
    fn test_fuzzy_match() {
        let found = catalog().resolve(&lines(&["DARN TOUGH, INC", "Invoice"]), "x.pdf", &[], 0.92);
        assert_eq!(found.map(|(v, _)| v).as_deref(), Some("Darn Tough"));

        let found = catalog().resolve(&lines(&["Helinx USA"]), "x.pdf", &[], 0.92);
        assert_eq!(found.map(|(v, _)| v).as_deref(), Some("Helinox"));
    }

    #[test]
    fn test_no_match_below_threshold() {
        let found = catalog().resolve(&lines(&["Acme Hardware"]), "x.pdf", &[], 0.92);
        assert_eq!(found, None);
    }

    #[test]
    fn test_unknown_vendor_rejected() {
        let json = r#"{"vendors": {"Helinox": "V1"}, "identifiers": {"oboz": "Oboz"}}"#;
        assert!(matches!(
            VendorCatalog::from_json(json),
            Err(VendorDataError::UnknownVendor { .. })
        ));
    }

    #[test]
    fn test_from_json_lowercases_identifiers() {
        let json = r#"{"vendors": {"Helinox": "V1"}, "identifiers": {"HELINOX INC": "Helinox"}}"#;
        let catalog = VendorCatalog::from_json(json).expect("valid catalog");
        assert_eq!(
            catalog.identifiers.get("helinox inc").map(String::as_str),
            Some("Helinox")
        );
        assert_eq!(catalog.vendor_number("Helinox"), Some("V1"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vendors.json");
        catalog().save(&path).expect("save");
        let loaded = VendorCatalog::from_file(&path).expect("load");
        assert_eq!(loaded, catalog());
    }
}
