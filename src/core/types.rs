use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::scoring::StressFactors;

/// Simulation parameters for one career as stored in the dataset.
///
/// Every field is optional. Monetary amounts are in thousands of dollars and
/// rates are percentages (`6.5` means 6.5%). Missing fields fall back to the
/// values in [`FinancialAssumptions::default`]; an explicit `0` is kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FinancialParams {
    pub undergrad_years: Option<f64>,
    pub prof_school_years: Option<f64>,
    pub residency_years: Option<f64>,
    pub fellowship_years: Option<f64>,
    pub undergrad_cost_per_yr: Option<f64>,
    pub prof_school_cost_per_yr: Option<f64>,
    pub trainee_salary: Option<f64>,
    pub starting_salary: Option<f64>,
    pub mid_salary: Option<f64>,
    pub peak_salary: Option<f64>,
    pub post_peak_growth: Option<f64>,
    pub education_debt: Option<f64>,
    pub loan_rate: Option<f64>,
    pub living_expenses: Option<f64>,
    pub living_exp_growth: Option<f64>,
    pub malpractice_per_yr: Option<f64>,
    pub overhead_per_yr: Option<f64>,
}

impl FinancialParams {
    pub fn resolve(&self) -> FinancialAssumptions {
        let d = FinancialAssumptions::default();
        FinancialAssumptions {
            undergrad_years: self.undergrad_years.unwrap_or(d.undergrad_years),
            prof_school_years: self.prof_school_years.unwrap_or(d.prof_school_years),
            residency_years: self.residency_years.unwrap_or(d.residency_years),
            fellowship_years: self.fellowship_years.unwrap_or(d.fellowship_years),
            undergrad_cost_per_yr: self.undergrad_cost_per_yr.unwrap_or(d.undergrad_cost_per_yr),
            prof_school_cost_per_yr: self
                .prof_school_cost_per_yr
                .unwrap_or(d.prof_school_cost_per_yr),
            trainee_salary: self.trainee_salary.unwrap_or(d.trainee_salary),
            starting_salary: self.starting_salary.unwrap_or(d.starting_salary),
            mid_salary: self.mid_salary.unwrap_or(d.mid_salary),
            peak_salary: self.peak_salary.unwrap_or(d.peak_salary),
            post_peak_growth: self
                .post_peak_growth
                .map_or(d.post_peak_growth, |v| v / 100.0),
            education_debt: self.education_debt.unwrap_or(d.education_debt),
            loan_rate: self.loan_rate.map_or(d.loan_rate, |v| v / 100.0),
            living_expenses: self.living_expenses.unwrap_or(d.living_expenses),
            living_exp_growth: self
                .living_exp_growth
                .map_or(d.living_exp_growth, |v| v / 100.0),
            malpractice_per_yr: self.malpractice_per_yr.unwrap_or(d.malpractice_per_yr),
            overhead_per_yr: self.overhead_per_yr.unwrap_or(d.overhead_per_yr),
        }
    }
}

/// Fully resolved simulation inputs. Rates are fractions (`0.065`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialAssumptions {
    pub undergrad_years: f64,
    pub prof_school_years: f64,
    pub residency_years: f64,
    pub fellowship_years: f64,
    pub undergrad_cost_per_yr: f64,
    pub prof_school_cost_per_yr: f64,
    pub trainee_salary: f64,
    pub starting_salary: f64,
    pub mid_salary: f64,
    pub peak_salary: f64,
    pub post_peak_growth: f64,
    pub education_debt: f64,
    pub loan_rate: f64,
    pub living_expenses: f64,
    pub living_exp_growth: f64,
    pub malpractice_per_yr: f64,
    pub overhead_per_yr: f64,
}

impl Default for FinancialAssumptions {
    fn default() -> Self {
        Self {
            undergrad_years: 4.0,
            prof_school_years: 4.0,
            residency_years: 3.0,
            fellowship_years: 0.0,
            undergrad_cost_per_yr: 35.0,
            prof_school_cost_per_yr: 60.0,
            trainee_salary: 65.0,
            starting_salary: 300.0,
            mid_salary: 400.0,
            peak_salary: 600.0,
            post_peak_growth: 0.01,
            education_debt: 350.0,
            loan_rate: 0.065,
            living_expenses: 50.0,
            living_exp_growth: 0.025,
            malpractice_per_yr: 10.0,
            overhead_per_yr: 5.0,
        }
    }
}

/// Category ratings keyed `category_1` .. `category_14`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CategoryScores(BTreeMap<String, f64>);

impl CategoryScores {
    pub fn get(&self, category_id: u8) -> Option<f64> {
        self.0.get(&format!("category_{category_id}")).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<const N: usize> From<[(u8, f64); N]> for CategoryScores {
    fn from(pairs: [(u8, f64); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(id, score)| (format!("category_{id}"), score))
                .collect(),
        )
    }
}

/// Stress record as stored; a score may be missing in hand-edited data.
/// Fields other than the four scores are carried through to the chart rows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StressRecord {
    pub ai: Option<f64>,
    pub pay: Option<f64>,
    pub injury: Option<f64>,
    #[serde(rename = "match")]
    pub not_matched: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StressRecord {
    pub fn complete(&self) -> Option<StressScores> {
        Some(StressScores {
            ai: self.ai?,
            pay: self.pay?,
            injury: self.injury?,
            not_matched: self.not_matched?,
        })
    }
}

/// Resilience (1-10, higher is better) under each of the four scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StressScores {
    pub ai: f64,
    pub pay: f64,
    pub injury: f64,
    #[serde(rename = "match")]
    pub not_matched: f64,
}

impl From<StressScores> for StressRecord {
    fn from(value: StressScores) -> Self {
        Self {
            ai: Some(value.ai),
            pay: Some(value.pay),
            injury: Some(value.injury),
            not_matched: Some(value.not_matched),
            extra: BTreeMap::new(),
        }
    }
}

pub type AgeSpan = [f64; 2];

/// Pre-computed training phases. Unrecognised fields are carried through.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub college: Option<AgeSpan>,
    pub school: Option<AgeSpan>,
    pub residency: Option<AgeSpan>,
    pub fellowship: Option<AgeSpan>,
    pub earn_age: Option<f64>,
    pub start_salary: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Flattened display fields. Only the salary figures feed computations; the
/// rest may be free text and is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawData {
    pub start_salary: Option<f64>,
    pub peak_salary: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One scored career within a profession family.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub group: String,
    pub financial: Option<FinancialParams>,
    pub scores: Option<CategoryScores>,
    pub stress: Option<StressRecord>,
    /// Raw inputs used to derive `stress` when the dataset omits it.
    pub stress_factors: Option<StressFactors>,
    pub timeline: Option<Timeline>,
    pub raw_data: Option<RawData>,
}

/// Values keyed by track key, serialized as object fields in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedValues<T>(Vec<(String, T)>);

impl<T> Default for KeyedValues<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> KeyedValues<T> {
    /// Replaces the value of an existing key in place, otherwise appends.
    pub fn insert(&mut self, key: &str, value: T) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for KeyedValues<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorthPoint {
    pub age: u32,
    #[serde(flatten)]
    pub values: KeyedValues<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub dim: &'static str,
    pub emoji: &'static str,
    #[serde(flatten)]
    pub values: KeyedValues<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioDescriptor {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressRow {
    pub key: String,
    #[serde(flatten)]
    pub scores: StressScores,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
    pub avg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StressSeries {
    pub scenarios: Vec<ScenarioDescriptor>,
    pub scores: Vec<StressRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyRow {
    pub key: String,
    pub start: f64,
    pub peak: f64,
    pub lifetime: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub key: String,
    #[serde(flatten)]
    pub timeline: Timeline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRow {
    pub key: String,
    pub practice_start: f64,
    pub debt_free_age: f64,
    pub break_even_age: Option<u32>,
    pub million_age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedScoreRow {
    pub key: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CareerPhase {
    Undergrad,
    ProfSchool,
    Training,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthYear {
    pub age: u32,
    pub net_worth: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowYear {
    pub age: u32,
    pub phase: CareerPhase,
    pub living: f64,
    pub tuition: f64,
    pub salary: f64,
    pub practice_costs: f64,
    pub debt_service: f64,
    pub net: f64,
    pub cumulative: f64,
}

/// All chart series for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub net_worth: Vec<NetWorthPoint>,
    pub radar: Vec<RadarPoint>,
    pub stress: StressSeries,
    pub money: Vec<MoneyRow>,
    pub timeline: Vec<TimelineRow>,
    pub milestones: Vec<MilestoneRow>,
    pub weighted: Vec<WeightedScoreRow>,
}
