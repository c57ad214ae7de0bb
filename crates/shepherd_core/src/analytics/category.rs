//! Absence-count categorization into ordered severity tiers.

use crate::model::settings::CategoryThresholds;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Severity tier, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyTier {
    Regular,
    Attention,
    Low,
    Critical,
}

impl FrequencyTier {
    /// All tiers in ascending severity.
    pub const ALL: [FrequencyTier; 4] = [
        FrequencyTier::Regular,
        FrequencyTier::Attention,
        FrequencyTier::Low,
        FrequencyTier::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Regular => "Regular attendance",
            Self::Attention => "Needs attention",
            Self::Low => "Low attendance",
            Self::Critical => "Critical attendance",
        }
    }

    /// Lowest absence count that reaches this tier.
    pub fn floor(self, thresholds: &CategoryThresholds) -> u32 {
        match self {
            Self::Regular => thresholds.regular,
            Self::Attention => thresholds.attention,
            Self::Low => thresholds.low,
            Self::Critical => thresholds.critical,
        }
    }
}

impl Display for FrequencyTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub tier: FrequencyTier,
    pub label: &'static str,
}

/// Highest tier whose floor is `<= absences`.
///
/// Total over all counts: anything below every floor is `Regular`.
pub fn categorize(absences: u32, thresholds: &CategoryThresholds) -> Category {
    let tier = FrequencyTier::ALL
        .iter()
        .rev()
        .copied()
        .find(|tier| tier.floor(thresholds) <= absences)
        .unwrap_or(FrequencyTier::Regular);
    Category {
        tier,
        label: tier.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::{categorize, FrequencyTier};
    use crate::model::settings::CategoryThresholds;

    #[test]
    fn boundaries_map_to_the_tier_whose_floor_matches() {
        let thresholds = CategoryThresholds::default();
        let expected = [
            (0, FrequencyTier::Regular),
            (1, FrequencyTier::Attention),
            (2, FrequencyTier::Attention),
            (3, FrequencyTier::Low),
            (4, FrequencyTier::Low),
            (5, FrequencyTier::Critical),
            (40, FrequencyTier::Critical),
        ];
        for (absences, tier) in expected {
            assert_eq!(categorize(absences, &thresholds).tier, tier, "absences={absences}");
        }
    }

    #[test]
    fn categorization_is_monotonic() {
        let thresholds = CategoryThresholds {
            regular: 0,
            attention: 2,
            low: 4,
            critical: 9,
        };
        let tiers = (0..30)
            .map(|absences| categorize(absences, &thresholds).tier)
            .collect::<Vec<_>>();
        assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(categorize(9, &thresholds).label, "Critical attendance");
    }
}
