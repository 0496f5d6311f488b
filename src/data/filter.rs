use std::collections::BTreeSet;

use super::model::{Record, Table};
use super::schema::Schema;

// ---------------------------------------------------------------------------
// Filterable dimensions
// ---------------------------------------------------------------------------

/// The three filterable dimensions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dimension {
    Supplier,
    Origin,
    Destination,
}

pub const DIMENSIONS: [Dimension; 3] =
    [Dimension::Supplier, Dimension::Origin, Dimension::Destination];

impl Dimension {
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Supplier => "Supplier",
            Dimension::Origin => "Origin",
            Dimension::Destination => "Destination",
        }
    }

    /// The table column backing this dimension, if the dataset has one.
    pub fn column(self, schema: &Schema) -> Option<&str> {
        match self {
            Dimension::Supplier => schema.supplier.as_deref(),
            Dimension::Origin => schema.origin.as_deref(),
            Dimension::Destination => schema.destination.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSet – per-dimension accepted values
// ---------------------------------------------------------------------------

/// Accepted values per dimension. An empty set means "no filter" for that
/// dimension (pass-through), matching a multiselect with nothing picked.
/// Dimensions compose conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub suppliers: BTreeSet<String>,
    pub origins: BTreeSet<String>,
    pub destinations: BTreeSet<String>,
}

impl FilterSet {
    pub fn values(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Supplier => &self.suppliers,
            Dimension::Origin => &self.origins,
            Dimension::Destination => &self.destinations,
        }
    }

    pub fn values_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::Supplier => &mut self.suppliers,
            Dimension::Origin => &mut self.origins,
            Dimension::Destination => &mut self.destinations,
        }
    }

    /// Whether no dimension has an active selection.
    pub fn is_empty(&self) -> bool {
        DIMENSIONS.iter().all(|d| self.values(*d).is_empty())
    }

    pub fn clear(&mut self) {
        for dim in DIMENSIONS {
            self.values_mut(dim).clear();
        }
    }

    /// Whether a record passes every active dimension filter.
    ///
    /// * Empty selection for a dimension → passes (no constraint)
    /// * Dimension column absent from the dataset → passes (degraded mode)
    /// * Record's value is in the selected set → passes
    /// * Record's value is missing or not selected → fails
    pub fn accepts(&self, schema: &Schema, record: &Record) -> bool {
        DIMENSIONS.iter().all(|&dim| {
            let selected = self.values(dim);
            if selected.is_empty() {
                return true;
            }
            let Some(column) = dim.column(schema) else {
                return true;
            };
            match record.key(column) {
                Some(value) => selected.contains(&value),
                None => false,
            }
        })
    }
}

/// Apply a [`FilterSet`] to a table, producing the filtered table.
/// Idempotent: filtering an already-filtered table with the same set is a
/// no-op.
pub fn apply(table: &Table, filters: &FilterSet) -> Table {
    let rows = table
        .rows
        .iter()
        .filter(|row| filters.accepts(&table.schema, row))
        .cloned()
        .collect();
    Table::from_rows(table.column_names.clone(), rows)
}
