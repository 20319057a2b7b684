use super::engine::{compute_net_worth_at_age, find_milestones, round_to_decimals, END_AGE};
use super::scoring::{weighted_total, CategoryWeights, NEUTRAL_SCORE};
use super::types::{
    Comparison, KeyedValues, MilestoneRow, MoneyRow, NetWorthPoint, RadarPoint,
    ScenarioDescriptor, StressRow, StressSeries, TimelineRow, Track, WeightedScoreRow,
};

/// Fewest selected tracks for which a comparison is worth rendering.
pub const MIN_PICKS: usize = 2;
/// Most tracks a single comparison may hold.
pub const MAX_PICKS: usize = 6;

pub const SNAPSHOT_AGES: [u32; 10] = [18, 23, 28, 33, 38, 43, 48, 53, 58, 65];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadarDimension {
    pub dim: &'static str,
    pub emoji: &'static str,
    pub categories: &'static [u8],
}

pub const RADAR_DIMENSIONS: [RadarDimension; 6] = [
    RadarDimension {
        dim: "Money",
        emoji: "💰",
        categories: &[5, 7],
    },
    RadarDimension {
        dim: "Happiness",
        emoji: "😊",
        categories: &[12],
    },
    RadarDimension {
        dim: "Free Time",
        emoji: "🏖️",
        categories: &[9],
    },
    RadarDimension {
        dim: "Hard to Get In",
        emoji: "🚪",
        categories: &[1, 2, 4],
    },
    RadarDimension {
        dim: "Robot-Proof",
        emoji: "🤖",
        categories: &[11],
    },
    RadarDimension {
        dim: "Safety Net",
        emoji: "🛡️",
        categories: &[14],
    },
];

pub const STRESS_SCENARIOS: [ScenarioDescriptor; 4] = [
    ScenarioDescriptor {
        id: "ai",
        label: "🤖 AI Takes Job",
    },
    ScenarioDescriptor {
        id: "pay",
        label: "💸 Pay Cut 20%",
    },
    ScenarioDescriptor {
        id: "injury",
        label: "🤕 Hurt Hands",
    },
    ScenarioDescriptor {
        id: "match",
        label: "❌ Not Accepted",
    },
];

// computed row fields win over passthrough fields of the same name
const RESERVED_STRESS_FIELDS: [&str; 2] = ["key", "avg"];

/// First track with `key`; unknown keys are a plain miss.
pub fn find_track<'a>(tracks: &'a [Track], key: &str) -> Option<&'a Track> {
    tracks.iter().find(|t| t.key == key)
}

fn selected<'a>(
    tracks: &'a [Track],
    selected_keys: &'a [String],
) -> impl Iterator<Item = (&'a str, &'a Track)> {
    selected_keys
        .iter()
        .filter_map(|key| find_track(tracks, key).map(|track| (key.as_str(), track)))
}

pub fn build_net_worth_series(tracks: &[Track], selected_keys: &[String]) -> Vec<NetWorthPoint> {
    SNAPSHOT_AGES
        .iter()
        .map(|&age| {
            let mut values = KeyedValues::default();
            for (key, track) in selected(tracks, selected_keys) {
                let Some(financial) = &track.financial else {
                    continue;
                };
                values.insert(key, compute_net_worth_at_age(financial, age));
            }
            NetWorthPoint { age, values }
        })
        .collect()
}

pub fn build_radar_series(tracks: &[Track], selected_keys: &[String]) -> Vec<RadarPoint> {
    RADAR_DIMENSIONS
        .iter()
        .map(|dimension| {
            let mut values = KeyedValues::default();
            for (key, track) in selected(tracks, selected_keys) {
                let Some(scores) = &track.scores else {
                    continue;
                };
                let sum: f64 = dimension
                    .categories
                    .iter()
                    .map(|id| scores.get(*id).unwrap_or(NEUTRAL_SCORE))
                    .sum();
                let mean = sum / dimension.categories.len() as f64;
                values.insert(key, round_to_decimals(mean, 1));
            }
            RadarPoint {
                dim: dimension.dim,
                emoji: dimension.emoji,
                values,
            }
        })
        .collect()
}

/// A stress record missing any scenario score is treated as absent.
pub fn build_stress_series(tracks: &[Track], selected_keys: &[String]) -> StressSeries {
    let scores = selected(tracks, selected_keys)
        .filter_map(|(key, track)| {
            let record = track.stress.as_ref()?;
            let scores = record.complete()?;
            let mean = (scores.ai + scores.pay + scores.injury + scores.not_matched) / 4.0;
            let extra = record
                .extra
                .iter()
                .filter(|(name, _)| !RESERVED_STRESS_FIELDS.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            Some(StressRow {
                key: key.to_string(),
                scores,
                extra,
                avg: round_to_decimals(mean, 1),
            })
        })
        .collect();

    StressSeries {
        scenarios: STRESS_SCENARIOS.to_vec(),
        scores,
    }
}

pub fn build_money_series(tracks: &[Track], selected_keys: &[String]) -> Vec<MoneyRow> {
    selected(tracks, selected_keys)
        .filter_map(|(key, track)| {
            let financial = track.financial.as_ref()?;
            let raw = track.raw_data.as_ref();
            Some(MoneyRow {
                key: key.to_string(),
                start: financial
                    .starting_salary
                    .or_else(|| raw.and_then(|r| r.start_salary))
                    .unwrap_or(0.0),
                peak: financial
                    .peak_salary
                    .or_else(|| raw.and_then(|r| r.peak_salary))
                    .unwrap_or(0.0),
                lifetime: compute_net_worth_at_age(financial, END_AGE),
            })
        })
        .collect()
}

pub fn build_timeline_series(tracks: &[Track], selected_keys: &[String]) -> Vec<TimelineRow> {
    selected(tracks, selected_keys)
        .filter_map(|(key, track)| {
            Some(TimelineRow {
                key: key.to_string(),
                timeline: track.timeline.clone()?,
            })
        })
        .collect()
}

pub fn build_milestone_series(tracks: &[Track], selected_keys: &[String]) -> Vec<MilestoneRow> {
    selected(tracks, selected_keys)
        .filter_map(|(key, track)| {
            let milestones = find_milestones(track.financial.as_ref()?);
            Some(MilestoneRow {
                key: key.to_string(),
                practice_start: milestones.practice_start,
                debt_free_age: milestones.debt_free_age,
                break_even_age: milestones.break_even_age,
                million_age: milestones.million_age,
            })
        })
        .collect()
}

/// Weighted 1-10 score per track; `None` weights use the category defaults.
pub fn build_weighted_scores(
    tracks: &[Track],
    selected_keys: &[String],
    weights: Option<&CategoryWeights>,
) -> Vec<WeightedScoreRow> {
    let defaults = CategoryWeights::default();
    let weights = weights.unwrap_or(&defaults);
    selected(tracks, selected_keys)
        .filter_map(|(key, track)| {
            let total = weighted_total(track.scores.as_ref()?, weights)?;
            Some(WeightedScoreRow {
                key: key.to_string(),
                total,
            })
        })
        .collect()
}

/// Every chart series for one selection, or empty series below [`MIN_PICKS`].
pub fn build_comparison(
    tracks: &[Track],
    selected_keys: &[String],
    weights: Option<&CategoryWeights>,
) -> Comparison {
    if selected_keys.len() < MIN_PICKS {
        return Comparison::default();
    }
    Comparison {
        net_worth: build_net_worth_series(tracks, selected_keys),
        radar: build_radar_series(tracks, selected_keys),
        stress: build_stress_series(tracks, selected_keys),
        money: build_money_series(tracks, selected_keys),
        timeline: build_timeline_series(tracks, selected_keys),
        milestones: build_milestone_series(tracks, selected_keys),
        weighted: build_weighted_scores(tracks, selected_keys, weights),
    }
}
