use std::collections::BTreeMap;

use serde::Serialize;

use super::models::{Opportunity, PipelineStage};

/// Opportunities partitioned by stage. Every stage key is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedOpportunities {
    buckets: BTreeMap<PipelineStage, Vec<Opportunity>>,
}

impl Default for GroupedOpportunities {
    fn default() -> Self {
        Self::empty()
    }
}

impl GroupedOpportunities {
    pub fn empty() -> Self {
        Self {
            buckets: PipelineStage::ALL
                .iter()
                .map(|stage| (*stage, Vec::new()))
                .collect(),
        }
    }

    /// Partition `opportunities` by their current stage, keeping input order
    /// within each bucket.
    pub fn group(opportunities: &[Opportunity]) -> Self {
        let mut grouped = Self::empty();
        for opp in opportunities {
            grouped.push(opp.clone());
        }
        grouped
    }

    pub fn bucket(&self, stage: PipelineStage) -> &[Opportunity] {
        self.buckets.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Buckets in stage display order.
    pub fn iter(&self) -> impl Iterator<Item = (PipelineStage, &[Opportunity])> {
        self.buckets.iter().map(|(stage, opps)| (*stage, opps.as_slice()))
    }

    /// Concatenate the buckets in stage order.
    pub fn flatten(&self) -> Vec<Opportunity> {
        self.buckets.values().flatten().cloned().collect()
    }

    pub fn find(&self, id: &str) -> Option<&Opportunity> {
        self.buckets.values().flatten().find(|opp| opp.id == id)
    }

    /// The bucket the opportunity is currently displayed in.
    pub fn stage_of(&self, id: &str) -> Option<PipelineStage> {
        self.buckets
            .iter()
            .find(|(_, opps)| opps.iter().any(|opp| opp.id == id))
            .map(|(stage, _)| *stage)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counts(&self) -> BTreeMap<PipelineStage, usize> {
        self.buckets
            .iter()
            .map(|(stage, opps)| (*stage, opps.len()))
            .collect()
    }

    /// Sum of `opportunity_amount` in a bucket; missing amounts count as zero.
    pub fn total_amount(&self, stage: PipelineStage) -> f64 {
        self.bucket(stage)
            .iter()
            .filter_map(|opp| opp.opportunity_amount)
            .sum()
    }

    /// Append to the bucket matching the record's stage.
    pub(crate) fn push(&mut self, opp: Opportunity) {
        self.buckets.entry(opp.pipeline_stage).or_default().push(opp);
    }

    /// Remove a record by id from whichever bucket holds it.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Opportunity> {
        for opps in self.buckets.values_mut() {
            if let Some(idx) = opps.iter().position(|opp| opp.id == id) {
                return Some(opps.remove(idx));
            }
        }
        None
    }

    /// Replace a record in place when its stage is unchanged, otherwise move
    /// it to the end of its new bucket. Unknown records are appended.
    pub(crate) fn upsert(&mut self, opp: Opportunity) {
        if let Some(slot) = self
            .buckets
            .get_mut(&opp.pipeline_stage)
            .and_then(|opps| opps.iter_mut().find(|o| o.id == opp.id))
        {
            *slot = opp;
            return;
        }
        self.remove(&opp.id);
        self.push(opp);
    }
}
