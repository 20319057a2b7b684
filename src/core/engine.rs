use super::types::{CareerPhase, CashflowYear, FinancialAssumptions, FinancialParams, NetWorthYear};

pub const START_AGE: u32 = 18;
pub const END_AGE: u32 = 65;
const MID_CAREER_AGE: u32 = 40;
const PEAK_AGE: u32 = 48;
const DEBT_SERVICE_YEARS: f64 = 10.0;
/// $1M expressed in the thousands-of-dollars unit used throughout.
pub const MILLION: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseBoundaries {
    pub undergrad_end: f64,
    pub school_end: f64,
    pub residency_end: f64,
    pub practice_start: f64,
}

impl PhaseBoundaries {
    pub fn from_assumptions(assumptions: &FinancialAssumptions) -> Self {
        let undergrad_end = f64::from(START_AGE) + assumptions.undergrad_years;
        let school_end = undergrad_end + assumptions.prof_school_years;
        let residency_end = school_end + assumptions.residency_years;
        Self {
            undergrad_end,
            school_end,
            residency_end,
            practice_start: residency_end + assumptions.fellowship_years,
        }
    }

    pub fn from_financial(financial: &FinancialParams) -> Self {
        Self::from_assumptions(&financial.resolve())
    }

    pub fn phase_at(&self, age: u32) -> CareerPhase {
        let age = f64::from(age);
        if age < self.undergrad_end {
            CareerPhase::Undergrad
        } else if age < self.school_end {
            CareerPhase::ProfSchool
        } else if age < self.practice_start {
            CareerPhase::Training
        } else {
            CareerPhase::Practice
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct YearFlow {
    phase: CareerPhase,
    living: f64,
    tuition: f64,
    salary: f64,
    practice_costs: f64,
    debt_service: f64,
}

impl YearFlow {
    fn net(self) -> f64 {
        self.salary - (self.living + self.tuition + self.practice_costs + self.debt_service)
    }
}

/// Rounds halves toward positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    round_half_up(value * scale) / scale
}

/// Cumulative net worth (thousands of dollars) after simulating every year
/// from 18 through `age`, capped at 65. Ages below 18 yield 0.
pub fn compute_net_worth_at_age(financial: &FinancialParams, age: u32) -> i64 {
    let assumptions = financial.resolve();
    let bounds = PhaseBoundaries::from_assumptions(&assumptions);

    let mut cumulative = 0.0;
    for year in START_AGE..=age.min(END_AGE) {
        cumulative += simulate_year(&assumptions, &bounds, year).net();
    }
    round_half_up(cumulative) as i64
}

pub fn net_worth_trajectory(financial: &FinancialParams) -> Vec<NetWorthYear> {
    yearly_cashflow_trace(financial)
        .into_iter()
        .map(|year| NetWorthYear {
            age: year.age,
            net_worth: round_half_up(year.cumulative) as i64,
        })
        .collect()
}

pub fn yearly_cashflow_trace(financial: &FinancialParams) -> Vec<CashflowYear> {
    let assumptions = financial.resolve();
    let bounds = PhaseBoundaries::from_assumptions(&assumptions);

    let mut cumulative = 0.0;
    let mut years = Vec::with_capacity((END_AGE - START_AGE + 1) as usize);
    for age in START_AGE..=END_AGE {
        let flow = simulate_year(&assumptions, &bounds, age);
        let net = flow.net();
        cumulative += net;
        years.push(CashflowYear {
            age,
            phase: flow.phase,
            living: flow.living,
            tuition: flow.tuition,
            salary: flow.salary,
            practice_costs: flow.practice_costs,
            debt_service: flow.debt_service,
            net,
            cumulative,
        });
    }
    years
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milestones {
    pub practice_start: f64,
    pub debt_free_age: f64,
    pub break_even_age: Option<u32>,
    pub million_age: Option<u32>,
}

pub fn find_milestones(financial: &FinancialParams) -> Milestones {
    let bounds = PhaseBoundaries::from_financial(financial);

    let mut been_negative = false;
    let mut break_even_age = None;
    let mut million_age = None;
    for point in net_worth_trajectory(financial) {
        if point.net_worth < 0 {
            been_negative = true;
        } else if been_negative && break_even_age.is_none() {
            break_even_age = Some(point.age);
        }
        if million_age.is_none() && point.net_worth >= MILLION {
            million_age = Some(point.age);
        }
    }

    Milestones {
        practice_start: bounds.practice_start,
        debt_free_age: (bounds.practice_start + DEBT_SERVICE_YEARS).min(f64::from(END_AGE)),
        break_even_age,
        million_age,
    }
}

fn living_cost(assumptions: &FinancialAssumptions, age: u32) -> f64 {
    assumptions.living_expenses
        * (1.0 + assumptions.living_exp_growth).powf(f64::from(age - START_AGE))
}

fn simulate_year(
    assumptions: &FinancialAssumptions,
    bounds: &PhaseBoundaries,
    age: u32,
) -> YearFlow {
    let phase = bounds.phase_at(age);
    let mut flow = YearFlow {
        phase,
        living: living_cost(assumptions, age),
        tuition: 0.0,
        salary: 0.0,
        practice_costs: 0.0,
        debt_service: 0.0,
    };

    match phase {
        CareerPhase::Undergrad => flow.tuition = assumptions.undergrad_cost_per_yr,
        CareerPhase::ProfSchool => flow.tuition = assumptions.prof_school_cost_per_yr,
        CareerPhase::Training => flow.salary = assumptions.trainee_salary,
        CareerPhase::Practice => {
            let years_practicing = f64::from(age) - bounds.practice_start;
            flow.salary = practice_salary(assumptions, bounds.practice_start, age);
            flow.practice_costs = assumptions.malpractice_per_yr + assumptions.overhead_per_yr;
            if years_practicing < DEBT_SERVICE_YEARS {
                flow.debt_service = (assumptions.education_debt / DEBT_SERVICE_YEARS)
                    * (1.0 + assumptions.loan_rate);
            }
        }
    }
    flow
}

// start -> mid by 40, mid -> peak by 48, then compounding from peak
fn practice_salary(assumptions: &FinancialAssumptions, practice_start: f64, age: u32) -> f64 {
    let age_f = f64::from(age);
    if age <= MID_CAREER_AGE {
        let years_to_mid = (f64::from(MID_CAREER_AGE) - practice_start).max(1.0);
        let progress = ((age_f - practice_start) / years_to_mid).min(1.0);
        assumptions.starting_salary
            + progress * (assumptions.mid_salary - assumptions.starting_salary)
    } else if age <= PEAK_AGE {
        let progress = (age_f - f64::from(MID_CAREER_AGE)) / f64::from(PEAK_AGE - MID_CAREER_AGE);
        assumptions.mid_salary + progress * (assumptions.peak_salary - assumptions.mid_salary)
    } else {
        assumptions.peak_salary
            * (1.0 + assumptions.post_peak_growth).powf(age_f - f64::from(PEAK_AGE))
    }
}
