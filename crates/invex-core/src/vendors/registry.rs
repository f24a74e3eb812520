//! Vendor override registry.

use std::collections::HashMap;

use tracing::debug;

use crate::invoice::FieldOutcome;
use crate::layout::NormalizedToken;
use crate::models::{ExtractionConfig, Field};
use crate::rules::Validator;

use super::builtin;

/// Inputs available to a vendor's custom extraction procedure.
#[derive(Debug, Clone, Copy)]
pub struct OverrideContext<'a> {
    /// Tokens in the extraction scope (first page unless configured otherwise).
    pub tokens: &'a [NormalizedToken],
    /// Tokens from every page.
    pub all_tokens: &'a [NormalizedToken],
    /// Resolved vendor name.
    pub vendor: &'a str,
    pub config: &'a ExtractionConfig,
}

/// A vendor's full replacement for one field's generic extraction.
pub type CustomExtractor = fn(&OverrideContext<'_>) -> FieldOutcome;

/// One vendor-specific adjustment to a field's extraction.
#[derive(Debug, Clone)]
pub enum OverrideAction {
    /// Label phrases tried before the generic labels.
    ExtraLabels(Vec<String>),
    /// Label phrases used instead of the generic labels.
    ReplaceLabels(Vec<String>),
    /// Validator used instead of the generic one.
    Validator(Validator),
    /// Value reported when extraction finds nothing.
    Default(String),
    /// Procedure that runs before the generic path; a found value wins.
    Custom(CustomExtractor),
    /// Text fragments identifying the vendor (vendor name field only).
    Identifiers(Vec<String>),
}

impl OverrideAction {
    pub fn extra_labels(labels: &[&str]) -> Self {
        Self::ExtraLabels(labels.iter().map(|s| s.to_string()).collect())
    }

    pub fn replace_labels(labels: &[&str]) -> Self {
        Self::ReplaceLabels(labels.iter().map(|s| s.to_string()).collect())
    }

    pub fn default_value(value: &str) -> Self {
        Self::Default(value.to_string())
    }

    pub fn identifiers(fragments: &[&str]) -> Self {
        Self::Identifiers(fragments.iter().map(|s| s.to_lowercase()).collect())
    }
}

/// Label set a field searches with, after vendor overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPlan<'a> {
    /// Generic labels, preceded by vendor phrases when present.
    Generic { extra: Vec<&'a str> },
    /// Only the vendor's phrases.
    Replaced(Vec<&'a str>),
}

/// Vendor-keyed table of field overrides.
///
/// Lookups for vendors without rules return nothing, so the generic path
/// runs unchanged.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    rules: HashMap<String, HashMap<Field, Vec<OverrideAction>>>,
}

impl OverrideRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in vendor rules.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (vendor, field, action) in builtin::rules() {
            registry.register(vendor, field, action);
        }
        registry
    }

    /// Add an action for a vendor's field. Actions keep registration order.
    pub fn register(&mut self, vendor: impl Into<String>, field: Field, action: OverrideAction) {
        let vendor = vendor.into();
        debug!("Registering {} override for {}", field, vendor);
        self.rules
            .entry(vendor)
            .or_default()
            .entry(field)
            .or_default()
            .push(action);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_rule(mut self, vendor: impl Into<String>, field: Field, action: OverrideAction) -> Self {
        self.register(vendor, field, action);
        self
    }

    /// All actions for a vendor's field.
    pub fn actions(&self, vendor: &str, field: Field) -> &[OverrideAction] {
        self.rules
            .get(vendor)
            .and_then(|fields| fields.get(&field))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the vendor has any rule.
    pub fn has_vendor(&self, vendor: &str) -> bool {
        self.rules.contains_key(vendor)
    }

    /// Vendors with rules, sorted.
    pub fn vendors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The vendor's validator for a field, if any.
    pub fn validator(&self, vendor: &str, field: Field) -> Option<Validator> {
        self.actions(vendor, field).iter().find_map(|a| match a {
            OverrideAction::Validator(v) => Some(*v),
            _ => None,
        })
    }

    /// The vendor's custom procedures for a field, in registration order.
    pub fn custom(&self, vendor: &str, field: Field) -> Vec<CustomExtractor> {
        self.actions(vendor, field)
            .iter()
            .filter_map(|a| match a {
                OverrideAction::Custom(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    /// The vendor's default value for a field, if any.
    pub fn default_value(&self, vendor: &str, field: Field) -> Option<&str> {
        self.actions(vendor, field).iter().find_map(|a| match a {
            OverrideAction::Default(v) => Some(v.as_str()),
            _ => None,
        })
    }

    /// Labels a field should search with for this vendor.
    ///
    /// Any replacement wins over extra labels.
    pub fn label_plan(&self, vendor: &str, field: Field) -> LabelPlan<'_> {
        let mut extra = Vec::new();
        let mut replaced: Option<Vec<&str>> = None;

        for action in self.actions(vendor, field) {
            match action {
                OverrideAction::ExtraLabels(labels) => {
                    extra.extend(labels.iter().map(String::as_str));
                }
                OverrideAction::ReplaceLabels(labels) => {
                    replaced
                        .get_or_insert_with(Vec::new)
                        .extend(labels.iter().map(String::as_str));
                }
                _ => {}
            }
        }

        match replaced {
            Some(labels) => LabelPlan::Replaced(labels),
            None => LabelPlan::Generic { extra },
        }
    }

    /// Identifier fragments registered for vendor resolution, as
    /// `(fragment, vendor)` pairs.
    pub fn identifier_hints(&self) -> Vec<(&str, &str)> {
        let mut hints = Vec::new();
        for (vendor, fields) in &self.rules {
            let Some(actions) = fields.get(&Field::VendorName) else {
                continue;
            };
            for action in actions {
                if let OverrideAction::Identifiers(fragments) = action {
                    hints.extend(fragments.iter().map(|f| (f.as_str(), vendor.as_str())));
                }
            }
        }
        hints.sort_unstable();
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &str) -> bool {
        false
    }

    #[test]
    fn test_unknown_vendor_has_no_rules() {
        let registry = OverrideRegistry::builtin();
        assert!(registry.actions("Nobody Inc", Field::InvoiceNumber).is_empty());
        assert!(registry.validator("Nobody Inc", Field::InvoiceNumber).is_none());
        assert_eq!(
            registry.label_plan("Nobody Inc", Field::PoNumber),
            LabelPlan::Generic { extra: vec![] }
        );
    }

    #[test]
    fn test_builtin_vendor_rules() {
        let registry = OverrideRegistry::builtin();

        let helinox = registry
            .validator("Helinox", Field::InvoiceNumber)
            .expect("helinox validator");
        assert!(helinox("INVUS1001"));
        assert!(!helinox("A-4591"));

        assert_eq!(
            registry.label_plan("Kuhl", Field::InvoiceNumber),
            LabelPlan::Generic {
                extra: vec!["Transaction Number"]
            }
        );
        assert_eq!(
            registry.default_value("Hydro Flask", Field::DiscountTerms),
            Some("NET 30")
        );
        assert_eq!(registry.custom("Darn Tough", Field::DiscountTerms).len(), 1);
    }

    #[test]
    fn test_replace_labels_wins() {
        let registry = OverrideRegistry::new()
            .with_rule("Acme", Field::PoNumber, OverrideAction::extra_labels(&["Job"]))
            .with_rule("Acme", Field::PoNumber, OverrideAction::replace_labels(&["Ref"]));

        assert_eq!(
            registry.label_plan("Acme", Field::PoNumber),
            LabelPlan::Replaced(vec!["Ref"])
        );
    }

    #[test]
    fn test_first_validator_wins() {
        let registry = OverrideRegistry::new()
            .with_rule("Acme", Field::PoNumber, OverrideAction::Validator(never))
            .with_rule("Acme", Field::PoNumber, OverrideAction::Validator(|_| true));

        let validator = registry.validator("Acme", Field::PoNumber).expect("validator");
        assert!(!validator("123"));
        assert!(registry.has_vendor("Acme"));
        assert_eq!(registry.vendors(), vec!["Acme"]);
    }

    #[test]
    fn test_identifier_hints() {
        let registry = OverrideRegistry::new().with_rule(
            "Nemo Equipment",
            Field::VendorName,
            OverrideAction::identifiers(&["NEMOEQUIPMENT.COM"]),
        );
        assert_eq!(
            registry.identifier_hints(),
            vec![("nemoequipment.com", "Nemo Equipment")]
        );
    }
}
