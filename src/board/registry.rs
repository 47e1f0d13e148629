//! Static stage and category metadata for the board layout.

use super::models::{PipelineCategory, PipelineStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryConfig {
    pub id: PipelineCategory,
    pub label: &'static str,
    pub stages: &'static [PipelineStage],
}

/// Categories in board order, each with its member stages in display order.
pub const CATEGORIES: [CategoryConfig; 4] = [
    CategoryConfig {
        id: PipelineCategory::Leads,
        label: "Leads",
        stages: &[PipelineStage::LeadsInterest],
    },
    CategoryConfig {
        id: PipelineCategory::Prospects,
        label: "Prospects",
        stages: &[
            PipelineStage::ProspectQuote,
            PipelineStage::ProspectAppSigned,
            PipelineStage::ProspectUnderwriting,
        ],
    },
    CategoryConfig {
        id: PipelineCategory::InForce,
        label: "In-Force",
        stages: &[PipelineStage::ClientWonInForce],
    },
    CategoryConfig {
        id: PipelineCategory::Lost,
        label: "Lost",
        stages: &[PipelineStage::LostLost],
    },
];

impl PipelineStage {
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::LeadsInterest,
        PipelineStage::ProspectQuote,
        PipelineStage::ProspectAppSigned,
        PipelineStage::ProspectUnderwriting,
        PipelineStage::ClientWonInForce,
        PipelineStage::LostLost,
    ];

    pub fn order(&self) -> usize {
        match self {
            Self::LeadsInterest => 0,
            Self::ProspectQuote => 1,
            Self::ProspectAppSigned => 2,
            Self::ProspectUnderwriting => 3,
            Self::ClientWonInForce => 4,
            Self::LostLost => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LeadsInterest => "Interest",
            Self::ProspectQuote => "Quote",
            Self::ProspectAppSigned => "App Signed",
            Self::ProspectUnderwriting => "Underwriting",
            Self::ClientWonInForce => "In Force",
            Self::LostLost => "Lost",
        }
    }

    pub fn category(&self) -> PipelineCategory {
        match self {
            Self::LeadsInterest => PipelineCategory::Leads,
            Self::ProspectQuote | Self::ProspectAppSigned | Self::ProspectUnderwriting => {
                PipelineCategory::Prospects
            }
            Self::ClientWonInForce => PipelineCategory::InForce,
            Self::LostLost => PipelineCategory::Lost,
        }
    }
}

impl PipelineCategory {
    pub fn config(&self) -> &'static CategoryConfig {
        match self {
            Self::Leads => &CATEGORIES[0],
            Self::Prospects => &CATEGORIES[1],
            Self::InForce => &CATEGORIES[2],
            Self::Lost => &CATEGORIES[3],
        }
    }

    pub fn label(&self) -> &'static str {
        self.config().label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_display_order() {
        for (i, stage) in PipelineStage::ALL.iter().enumerate() {
            assert_eq!(stage.order(), i);
        }
        let mut sorted = PipelineStage::ALL;
        sorted.sort();
        assert_eq!(sorted, PipelineStage::ALL);
    }

    #[test]
    fn test_every_stage_belongs_to_exactly_one_category() {
        for stage in PipelineStage::ALL {
            let owners: Vec<_> = CATEGORIES
                .iter()
                .filter(|c| c.stages.contains(&stage))
                .map(|c| c.id)
                .collect();
            assert_eq!(owners, vec![stage.category()], "stage {}", stage);
        }
    }

    #[test]
    fn test_categories_cover_stages_in_order() {
        let flattened: Vec<PipelineStage> = CATEGORIES
            .iter()
            .flat_map(|c| c.stages.iter().copied())
            .collect();
        assert_eq!(flattened, PipelineStage::ALL.to_vec());
    }

    #[test]
    fn test_category_config_lookup() {
        assert_eq!(PipelineCategory::InForce.label(), "In-Force");
        assert_eq!(PipelineCategory::Prospects.config().stages.len(), 3);
        assert_eq!(PipelineStage::ProspectAppSigned.label(), "App Signed");
    }
}
