//! Partitioning committed ledger rows into packages and checklist sections.

use crate::classify::{Classification, TagClassifier};
use crate::ledger::ShipmentRow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// All rows shipped in one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    pub package_id: String,
    /// Address of the first row seen for this package
    pub address: String,
    pub rows: Vec<ShipmentRow>,
}

/// All rows sharing a classification label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationGroup {
    pub label: String,
    pub rows: Vec<ShipmentRow>,
}

/// A committed row whose tags are all reserved, so no section can hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationGap {
    pub package_id: String,
    pub card_name: String,
    pub tags: Vec<String>,
}

impl From<&ShipmentRow> for ClassificationGap {
    fn from(row: &ShipmentRow) -> Self {
        Self {
            package_id: row.package_id.clone(),
            card_name: row.card_name.clone(),
            tags: row.tags.clone(),
        }
    }
}

/// A committed row together with its derived classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub row: ShipmentRow,
    pub classification: Option<Classification>,
}

/// Output of [`ShipmentGrouper::partition`].
#[derive(Debug, Clone, Default)]
pub struct Shipments {
    pub total_rows: usize,
    pub committed: Vec<ClassifiedRow>,
    pub packages: Vec<PackageGroup>,
    pub sections: Vec<ClassificationGroup>,
    pub gaps: Vec<ClassificationGap>,
}

/// Group `items` by key, keeping keys and members in encounter order.
fn group_in_encounter_order<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for item in items {
        let k = key(&item);
        match slots.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                slots.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

#[derive(Debug, Clone, Default)]
pub struct ShipmentGrouper {
    classifier: TagClassifier,
}

impl ShipmentGrouper {
    pub fn new(classifier: TagClassifier) -> Self {
        Self { classifier }
    }

    /// Rows whose state contains "Committed", in ledger order.
    pub fn committed(rows: impl IntoIterator<Item = ShipmentRow>) -> Vec<ShipmentRow> {
        rows.into_iter().filter(ShipmentRow::is_committed).collect()
    }

    pub fn classify(&self, rows: impl IntoIterator<Item = ShipmentRow>) -> Vec<ClassifiedRow> {
        rows.into_iter()
            .map(|row| {
                let classification = self.classifier.classify(&row.tags);
                ClassifiedRow {
                    row,
                    classification,
                }
            })
            .collect()
    }

    pub fn group_by_package(rows: &[ShipmentRow]) -> Vec<PackageGroup> {
        group_in_encounter_order(rows.iter().cloned(), |r| r.package_id.clone())
            .into_iter()
            .map(|(package_id, rows)| PackageGroup {
                address: rows[0].address.clone(),
                package_id,
                rows,
            })
            .collect()
    }

    /// Sections in first-seen label order; unclassifiable rows come back as gaps.
    pub fn group_by_classification(
        classified: &[ClassifiedRow],
    ) -> (Vec<ClassificationGroup>, Vec<ClassificationGap>) {
        let mut gaps = Vec::new();
        let labelled = classified.iter().filter_map(|c| match &c.classification {
            Some(class) => Some((class.label.clone(), c.row.clone())),
            None => {
                gaps.push(ClassificationGap::from(&c.row));
                None
            }
        });

        let sections = group_in_encounter_order(labelled, |(label, _)| label.clone())
            .into_iter()
            .map(|(label, members)| ClassificationGroup {
                label,
                rows: members.into_iter().map(|(_, row)| row).collect(),
            })
            .collect();

        (sections, gaps)
    }

    /// Filter, classify and group a full ledger.
    pub fn partition(&self, rows: Vec<ShipmentRow>) -> Shipments {
        let total_rows = rows.len();
        let committed = self.classify(Self::committed(rows));

        let committed_rows: Vec<ShipmentRow> = committed.iter().map(|c| c.row.clone()).collect();
        let packages = Self::group_by_package(&committed_rows);
        let (sections, gaps) = Self::group_by_classification(&committed);

        debug!(
            total_rows,
            committed = committed.len(),
            packages = packages.len(),
            sections = sections.len(),
            gaps = gaps.len(),
            "ledger partitioned"
        );

        Shipments {
            total_rows,
            committed,
            packages,
            sections,
            gaps,
        }
    }
}
