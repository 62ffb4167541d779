// src/classify/aggregate.rs

use std::collections::BTreeMap;

use ahash::AHashSet;

use super::ClassifierResultSet;
use crate::error::FilterError;
use crate::types::Classifier;

/// Intersection of all given sets. `None` if there are no sets at all.
pub fn intersect_all<'a, I>(sets: I) -> Option<AHashSet<String>>
where
    I: IntoIterator<Item = &'a AHashSet<String>>,
{
    let mut iter = sets.into_iter();
    let mut common = iter.next()?.clone();
    for other in iter {
        common.retain(|id| other.contains(id));
    }
    Some(common)
}

/// Resolved reads of every classifier that was run, at most one entry per
/// classifier.
#[derive(Debug, Default)]
pub struct TargetClassifiedReads {
    by_classifier: BTreeMap<Classifier, ClassifierResultSet>,
}

impl TargetClassifiedReads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, classifier: Classifier, result_set: ClassifierResultSet) -> Result<(), FilterError> {
        if self.by_classifier.contains_key(&classifier) {
            return Err(FilterError::DuplicateClassifier(classifier));
        }
        self.by_classifier.insert(classifier, result_set);
        Ok(())
    }

    pub fn get(&self, classifier: Classifier) -> Option<&ClassifierResultSet> {
        self.by_classifier.get(&classifier)
    }

    /// Classifiers with results, in a stable order.
    pub fn classifiers(&self) -> Vec<Classifier> {
        self.by_classifier.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_classifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_classifier.is_empty()
    }

    /// Reads left unclassified by every classifier present.
    pub fn common_unclassified(&self) -> Result<AHashSet<String>, FilterError> {
        intersect_all(self.by_classifier.values().map(|r| &r.unclassified))
            .ok_or(FilterError::NoClassifierResults)
    }

    /// Reads any classifier assigned to a target taxon.
    pub fn union_of_targets(&self) -> AHashSet<String> {
        let mut targets = AHashSet::new();
        for result_set in self.by_classifier.values() {
            targets.extend(result_set.targets.iter().cloned());
        }
        targets
    }

    /// Agreement statistics between two classifiers. `None` unless exactly
    /// two classifiers are present.
    pub fn reconciliation_report(&self) -> Option<ReconciliationReport> {
        if self.by_classifier.len() != 2 {
            return None;
        }
        let mut iter = self.by_classifier.iter();
        let (&first, a) = iter.next()?;
        let (&second, b) = iter.next()?;

        let mutual_unclassified = a.unclassified.intersection(&b.unclassified).count();
        Some(ReconciliationReport {
            total_targets: self.union_of_targets().len(),
            first: compare_one_way(first, a, b),
            second: compare_one_way(second, b, a),
            mutual_unclassified,
        })
    }

    /// Final read selection: all target reads, plus the reads every
    /// classifier left unclassified unless those are excluded. Sorted.
    pub fn select_read_ids(&self, include_unclassified: bool) -> Result<Vec<String>, FilterError> {
        let mut selected = self.union_of_targets();
        let unclassified = self.common_unclassified()?;
        log::info!(
            "Found N={} common unclassified reads by all classification methods.",
            unclassified.len()
        );
        if include_unclassified {
            selected.extend(unclassified);
        }
        let mut read_ids: Vec<String> = selected.into_iter().collect();
        // Sorted order lets extraction read the FASTQ sequentially
        read_ids.sort_unstable();
        Ok(read_ids)
    }
}

fn compare_one_way(classifier: Classifier, this: &ClassifierResultSet, other: &ClassifierResultSet) -> ClassifierComparison {
    let other_ids = other.results.read_ids();
    let other_classified = other.results.classified_read_ids();
    let only_here_unclassified = this.unclassified.difference(&other.unclassified);

    let mut unclassified_but_classified_by_other = 0;
    let mut unclassified_missing_from_other = 0;
    for id in only_here_unclassified {
        if !other_ids.contains(id.as_str()) {
            unclassified_missing_from_other += 1;
        } else if other_classified.contains(id.as_str()) {
            unclassified_but_classified_by_other += 1;
        }
    }

    ClassifierComparison {
        classifier,
        exclusive_targets: this.targets.difference(&other.targets).count(),
        unclassified_but_classified_by_other,
        unclassified_missing_from_other,
    }
}

/// One side of a [`ReconciliationReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierComparison {
    pub classifier: Classifier,
    /// Target reads found by this classifier but not the other
    pub exclusive_targets: usize,
    /// Reads only this classifier left unclassified, classified by the other
    pub unclassified_but_classified_by_other: usize,
    /// Reads only this classifier left unclassified, absent from the other's table
    pub unclassified_missing_from_other: usize,
}

/// Informational comparison of two classifiers' decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub total_targets: usize,
    pub first: ClassifierComparison,
    pub second: ClassifierComparison,
    pub mutual_unclassified: usize,
}

impl ReconciliationReport {
    pub fn log(&self) {
        log::info!("Total target reads={}", self.total_targets);
        for (this, other) in [(&self.first, &self.second), (&self.second, &self.first)] {
            log::info!(
                "{} found n={} target reads not found with {}",
                this.classifier,
                this.exclusive_targets,
                other.classifier
            );
            if this.unclassified_but_classified_by_other > 0 {
                log::info!(
                    "N={} reads unclassified by {} were classified by {}",
                    this.unclassified_but_classified_by_other,
                    this.classifier,
                    other.classifier
                );
            }
            if this.unclassified_missing_from_other > 0 {
                log::info!(
                    "N={} unclassified reads by {} not in {} results",
                    this.unclassified_missing_from_other,
                    this.classifier,
                    other.classifier
                );
            }
        }
        log::info!(
            "N={} reads unclassified by both {} and {}.",
            self.mutual_unclassified,
            self.first.classifier,
            self.second.classifier
        );
    }
}
