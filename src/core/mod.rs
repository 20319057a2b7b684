mod engine;
mod scoring;
mod series;
mod types;

pub use engine::{
    END_AGE, MILLION, Milestones, PhaseBoundaries, START_AGE, compute_net_worth_at_age,
    find_milestones, net_worth_trajectory, round_half_up, round_to_decimals,
    yearly_cashflow_trace,
};
pub use scoring::{
    CATEGORIES, Category, CategoryWeights, NEUTRAL_SCORE, StressFactors, average_score,
    derive_stress_scores, match_resilience, score_numeric, weighted_total,
};
pub use series::{
    MAX_PICKS, MIN_PICKS, RADAR_DIMENSIONS, RadarDimension, SNAPSHOT_AGES, STRESS_SCENARIOS,
    build_comparison, build_milestone_series, build_money_series, build_net_worth_series,
    build_radar_series, build_stress_series, build_timeline_series, build_weighted_scores,
    find_track,
};
pub use types::{
    AgeSpan, CareerPhase, CashflowYear, CategoryScores, Comparison, FinancialAssumptions,
    FinancialParams, KeyedValues, MilestoneRow, MoneyRow, NetWorthPoint, NetWorthYear, RadarPoint,
    RawData, ScenarioDescriptor, StressRecord, StressRow, StressScores, StressSeries, Timeline,
    TimelineRow, Track, WeightedScoreRow,
};
