//! Composite spec merging.
//!
//! Spec rows are unit-scoped: a logical spec with a processing target and a
//! storage target is stored as several rows sharing one component `ID`,
//! each with its own `Unit`/`Amount`. [`CompositeSpecMerger`] folds such a
//! group into one flat object.
//!
//! The first row is the base and contributes its descriptive fields and
//! `id`. Each later row writes `Amount` under its snake_cased `Unit`. Rows
//! with an empty unit or a zero or missing amount contribute nothing, so a
//! real zero target is lost.

use std::collections::HashMap;

use designer_types::{CompositeDatacenterSpec, RawDatacenterSpec};
use serde_json::Value;

use crate::document::to_document;
use crate::error::{CatalogError, StoreError};

/// What to do when two unit rows derive one field with different amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Last row wins; the collision is logged.
    #[default]
    Lenient,
    /// The merge fails with [`CatalogError::MergeFieldCollision`].
    Strict,
}

impl MergeMode {
    /// Strict when `strict` is set.
    pub const fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Field a unit name writes to: lower-cased, spaces to underscores.
pub fn unit_field(unit: &str) -> String {
    unit.to_lowercase().replace(' ', "_")
}

/// Canonical field a unit name must also write, whatever its spelling.
fn unit_override(unit: &str) -> Option<&'static str> {
    match unit {
        "Data storage" => Some("data_storage"),
        "Processing" => Some("processing"),
        _ => None,
    }
}

/// Folds spec rows sharing a component identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeSpecMerger {
    mode: MergeMode,
}

impl CompositeSpecMerger {
    /// Create a merger with the given collision policy.
    pub const fn new(mode: MergeMode) -> Self {
        Self { mode }
    }

    /// Collision policy in use.
    pub const fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Merge one component's rows, in order.
    pub fn merge(
        &self,
        rows: &[RawDatacenterSpec],
    ) -> Result<CompositeDatacenterSpec, CatalogError> {
        let Some((base, rest)) = rows.split_first() else {
            return Err(CatalogError::Invalid("no spec rows to merge".to_owned()));
        };

        let mut fields = to_document(base).map_err(StoreError::from)?;
        fields.insert(
            "id".to_owned(),
            base.id.clone().map_or(Value::Null, Value::String),
        );
        let mut composite = CompositeDatacenterSpec::from_fields(fields);

        // Fields written by unit rows so far, with the amount written.
        let mut written: HashMap<String, i64> = HashMap::new();
        for row in rest {
            let (Some(unit), Some(amount)) = (row.unit.as_deref(), row.amount) else {
                continue;
            };
            if unit.is_empty() || amount == 0 {
                continue;
            }

            let derived = unit_field(unit);
            let targets = std::iter::once(derived.as_str()).chain(unit_override(unit));
            for field in targets {
                match written.get(field) {
                    Some(&previous) if previous != amount => {
                        self.collide(&base.component_id, field, previous, amount)?;
                    }
                    _ => {}
                }
                written.insert(field.to_owned(), amount);
                composite.set(field.to_owned(), Value::from(amount));
            }
        }

        Ok(composite)
    }

    /// Group rows by component identifier and merge each group.
    ///
    /// Groups come out in the order their first row appears. A row without
    /// a component identifier stands alone.
    pub fn merge_all(
        &self,
        rows: Vec<RawDatacenterSpec>,
    ) -> Result<Vec<CompositeDatacenterSpec>, CatalogError> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<RawDatacenterSpec>> = HashMap::new();

        for (index, row) in rows.into_iter().enumerate() {
            let key = if row.component_id.is_empty() {
                format!("\0{}", row.id.clone().unwrap_or_else(|| index.to_string()))
            } else {
                row.component_id.clone()
            };
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(row);
        }

        order
            .iter()
            .filter_map(|key| groups.get(key))
            .map(|group| self.merge(group))
            .collect()
    }

    fn collide(
        &self,
        component: &str,
        field: &str,
        previous: i64,
        incoming: i64,
    ) -> Result<(), CatalogError> {
        match self.mode {
            MergeMode::Lenient => {
                tracing::warn!(
                    component,
                    field,
                    previous,
                    incoming,
                    "spec rows collide on one field, keeping the later amount"
                );
                Ok(())
            }
            MergeMode::Strict => Err(CatalogError::MergeFieldCollision {
                component: component.to_owned(),
                field: field.to_owned(),
                previous,
                incoming,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(component: &str, unit: Option<&str>, amount: Option<i64>) -> RawDatacenterSpec {
        RawDatacenterSpec {
            component_id: component.to_owned(),
            unit: unit.map(str::to_owned),
            amount,
            ..RawDatacenterSpec::default()
        }
    }

    fn server_square() -> Vec<RawDatacenterSpec> {
        let base = RawDatacenterSpec {
            id: Some("507f1f77bcf86cd799439011".to_owned()),
            name: Some("Server Square".to_owned()),
            below_amount: Some(1),
            ..row("server_square", None, None)
        };
        vec![
            base,
            row("server_square", Some("Data storage"), Some(1000)),
            row("server_square", Some("Processing"), Some(500)),
        ]
    }

    #[test]
    fn server_square_merges_unit_rows() {
        let merged = CompositeSpecMerger::default().merge(&server_square());
        assert!(merged.is_ok(), "merge failed: {merged:?}");
        let spec = merged.unwrap();
        assert_eq!(spec.integer("data_storage"), Some(1000));
        assert_eq!(spec.integer("processing"), Some(500));
        assert_eq!(spec.component_id(), Some("server_square"));
        assert_eq!(spec.id(), Some("507f1f77bcf86cd799439011"));
        assert_eq!(spec.get("Name"), Some(&Value::from("Server Square")));
        assert_eq!(spec.integer("Below_Amount"), Some(1));
    }

    #[test]
    fn base_row_units_are_not_folded() {
        let rows = vec![
            row("c", Some("Processing"), Some(9)),
            row("c", Some("Water Usage"), Some(3)),
        ];
        let spec = CompositeSpecMerger::default().merge(&rows).unwrap();
        assert_eq!(spec.integer("processing"), None);
        assert_eq!(spec.integer("Amount"), Some(9));
        assert_eq!(spec.integer("water_usage"), Some(3));
    }

    #[test]
    fn falsy_units_and_amounts_are_dropped() {
        let rows = vec![
            row("c", None, None),
            row("c", Some("Processing"), Some(0)),
            row("c", Some(""), Some(5)),
            row("c", Some("Price"), None),
        ];
        let spec = CompositeSpecMerger::default().merge(&rows).unwrap();
        assert_eq!(spec.get("processing"), None);
        assert_eq!(spec.get("price"), None);
    }

    #[test]
    fn lenient_mode_keeps_the_later_amount() {
        let rows = vec![
            row("c", None, None),
            row("c", Some("Processing"), Some(1)),
            row("c", Some("processing"), Some(2)),
        ];
        let spec = CompositeSpecMerger::new(MergeMode::Lenient)
            .merge(&rows)
            .unwrap();
        assert_eq!(spec.integer("processing"), Some(2));
    }

    #[test]
    fn strict_mode_reports_collisions() {
        let rows = vec![
            row("c", None, None),
            row("c", Some("Processing"), Some(1)),
            row("c", Some("processing"), Some(2)),
        ];
        let result = CompositeSpecMerger::new(MergeMode::Strict).merge(&rows);
        assert!(matches!(
            result,
            Err(CatalogError::MergeFieldCollision { ref field, previous: 1, incoming: 2, .. })
                if field == "processing"
        ));
    }

    #[test]
    fn strict_mode_allows_equal_repeats() {
        let rows = vec![
            row("c", None, None),
            row("c", Some("Processing"), Some(4)),
            row("c", Some("Processing"), Some(4)),
        ];
        assert!(CompositeSpecMerger::new(MergeMode::Strict).merge(&rows).is_ok());
    }

    #[test]
    fn merge_all_yields_one_composite_per_component() {
        let mut rows = server_square();
        rows.insert(1, row("storage_block", Some("Price"), Some(10)));
        rows.push(row("storage_block", Some("Data storage"), Some(40)));

        let merged = CompositeSpecMerger::default().merge_all(rows).unwrap();
        let ids: Vec<_> = merged.iter().filter_map(|c| c.component_id()).collect();
        assert_eq!(ids, vec!["server_square", "storage_block"]);
        assert_eq!(merged.last().and_then(|c| c.integer("data_storage")), Some(40));
        assert_eq!(merged.first().and_then(|c| c.integer("processing")), Some(500));
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(matches!(
            CompositeSpecMerger::default().merge(&[]),
            Err(CatalogError::Invalid(_))
        ));
    }
}
