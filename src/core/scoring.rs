use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::engine::round_to_decimals;
use super::types::{CategoryScores, StressScores};

/// Score assumed for a category the dataset does not rate.
pub const NEUTRAL_SCORE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u8,
    pub name: &'static str,
    pub weight_default: u32,
    pub description: &'static str,
}

pub const CATEGORIES: [Category; 14] = [
    Category {
        id: 1,
        name: "Pre-Professional Phase",
        weight_default: 7,
        description: "How hard is it to start?",
    },
    Category {
        id: 2,
        name: "Admissions Competitiveness",
        weight_default: 7,
        description: "Can you realistically get in?",
    },
    Category {
        id: 3,
        name: "Professional School",
        weight_default: 5,
        description: "What's the school experience like?",
    },
    Category {
        id: 4,
        name: "Post-Graduate Training",
        weight_default: 8,
        description: "How long/hard is the road after school?",
    },
    Category {
        id: 5,
        name: "Financial Picture",
        weight_default: 10,
        description: "Cost, debt, time to financial freedom",
    },
    Category {
        id: 6,
        name: "Scope of Practice & Autonomy",
        weight_default: 8,
        description: "What can you do independently?",
    },
    Category {
        id: 7,
        name: "Career Economics",
        weight_default: 12,
        description: "How much do you earn over a career?",
    },
    Category {
        id: 8,
        name: "Daily Life & Practice Reality",
        weight_default: 8,
        description: "What does the work feel like?",
    },
    Category {
        id: 9,
        name: "Lifestyle & Work-Life Balance",
        weight_default: 10,
        description: "Can you have a life outside work?",
    },
    Category {
        id: 10,
        name: "Job Market & Demand",
        weight_default: 5,
        description: "Will you find work?",
    },
    Category {
        id: 11,
        name: "AI Revolution Impact",
        weight_default: 7,
        description: "How future-proof is this career?",
    },
    Category {
        id: 12,
        name: "Professional Satisfaction",
        weight_default: 8,
        description: "Will you enjoy this long-term?",
    },
    Category {
        id: 13,
        name: "Demographics & Culture",
        weight_default: 3,
        description: "Culture fit?",
    },
    Category {
        id: 14,
        name: "Risk Factors & Downsides",
        weight_default: 5,
        description: "Hidden costs and dangers",
    },
];

/// Relative weight per category id. Weights need not sum to 100.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CategoryWeights(BTreeMap<u8, f64>);

impl Default for CategoryWeights {
    fn default() -> Self {
        Self(
            CATEGORIES
                .iter()
                .map(|c| (c.id, f64::from(c.weight_default)))
                .collect(),
        )
    }
}

impl CategoryWeights {
    pub fn new(weights: BTreeMap<u8, f64>) -> Self {
        Self(weights)
    }

    pub fn get(&self, category_id: u8) -> Option<f64> {
        self.0.get(&category_id).copied()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

/// Weighted mean of category scores on the 1-10 scale, two decimals.
/// Returns `None` when the weights sum to zero or less.
pub fn weighted_total(scores: &CategoryScores, weights: &CategoryWeights) -> Option<f64> {
    let weight_sum = weights.total();
    if weight_sum <= 0.0 {
        return None;
    }
    let weighted: f64 = weights
        .0
        .iter()
        .map(|(id, weight)| scores.get(*id).unwrap_or(NEUTRAL_SCORE) * weight)
        .sum();
    Some(round_to_decimals(weighted / weight_sum, 2))
}

/// Linearly rescales `value` from `[min, max]` onto 1-10, one decimal.
///
/// Used when turning raw survey figures into category scores ahead of
/// dataset generation; the series builders read the stored scores.
pub fn score_numeric(value: f64, min: f64, max: f64, higher_is_better: bool) -> f64 {
    if max == min {
        return 5.5;
    }
    let mut normalized = (value - min) / (max - min);
    if !higher_is_better {
        normalized = 1.0 - normalized;
    }
    round_to_decimals(1.0 + normalized * 9.0, 1)
}

/// Mean of data-point scores, two decimals; neutral when there are none.
/// A category score is the average of its rescaled data points.
pub fn average_score(data_points: &[f64]) -> f64 {
    if data_points.is_empty() {
        return NEUTRAL_SCORE;
    }
    round_to_decimals(data_points.iter().sum::<f64>() / data_points.len() as f64, 2)
}

/// Raw specialty fields that drive the four stress scenarios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StressFactors {
    pub automation_risk: Option<f64>,
    pub hands_on_insulation: Option<f64>,
    pub geographic_flex: Option<f64>,
    pub satisfaction: Option<f64>,
    pub admin_burden: Option<f64>,
    pub procedure_mix: Option<f64>,
    pub part_time_flex: Option<f64>,
    pub career_longevity: Option<f64>,
    pub match_comp: Option<f64>,
}

const DEFAULT_SATISFACTION: f64 = 70.0;
const DEFAULT_MATCH_RESILIENCE: f64 = 5.0;

const MATCH_RESILIENCE_BY_PROFESSION: [(&str, f64); 28] = [
    ("MD/DO", 3.0),
    ("DDS/DMD", 7.0),
    ("DPM", 9.0),
    ("OD", 8.0),
    ("JD", 4.0),
    ("JD+Patent", 6.0),
    ("Paralegal", 8.0),
    ("Judge", 2.0),
    ("BS", 7.0),
    ("MS", 6.0),
    ("PhD", 4.0),
    ("BBA", 8.0),
    ("MBA", 5.0),
    ("CPA-CFA", 7.0),
    ("Academy", 8.0),
    ("BA", 5.0),
    ("MA+", 4.0),
    ("Trade School", 8.0),
    ("Apprenticeship", 6.0),
    ("Contractor", 4.0),
    ("Teaching Cert", 8.0),
    ("M.Ed", 5.0),
    ("Research PhD", 3.0),
    ("Applied Science", 6.0),
    ("AI Engineer", 7.0),
    ("AI Scientist", 4.0),
    ("AI Creative", 5.0),
    ("AI Strategist", 6.0),
];

pub fn match_resilience(profession: &str) -> f64 {
    MATCH_RESILIENCE_BY_PROFESSION
        .iter()
        .find(|(name, _)| *name == profession)
        .map_or(DEFAULT_MATCH_RESILIENCE, |(_, base)| *base)
}

// ties go to the even integer
fn clamp_score(value: f64) -> f64 {
    value.round_ties_even().clamp(1.0, 10.0)
}

/// Derives scenario resilience scores (integers 1-10) from raw factors.
/// Dataset loading calls this for tracks that carry `stress_factors` but no
/// `stress` record.
pub fn derive_stress_scores(factors: &StressFactors, profession: &str) -> StressScores {
    let factor = |v: Option<f64>| v.unwrap_or(NEUTRAL_SCORE);

    let ai = clamp_score(
        (factor(factors.hands_on_insulation) + (11.0 - factor(factors.automation_risk))) / 2.0,
    );

    // a zero satisfaction is an unfilled survey field, scored neutral
    let satisfaction_score = match factors.satisfaction.unwrap_or(DEFAULT_SATISFACTION) {
        s if s == 0.0 => NEUTRAL_SCORE,
        s => clamp_score(1.0 + (s - 50.0) / (95.0 - 50.0) * 9.0),
    };
    let pay = clamp_score(
        factor(factors.geographic_flex) * 0.4
            + satisfaction_score * 0.3
            + (11.0 - factor(factors.admin_burden)) * 0.3,
    );

    let injury = clamp_score(
        (11.0 - factor(factors.procedure_mix)) * 0.5
            + factor(factors.part_time_flex) * 0.25
            + factor(factors.career_longevity) * 0.25,
    );

    let not_matched =
        clamp_score(match_resilience(profession) - (factor(factors.match_comp) - 5.0) * 0.3);

    StressScores {
        ai,
        pay,
        injury,
        not_matched,
    }
}
