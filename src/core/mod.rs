mod affordability;
mod amortization;
mod engine;
mod events;
mod recommend;
mod report;
mod types;

pub use affordability::{
    AffordabilityReport, AffordabilitySettings, HouseAffordability, analyze, house_affordability,
    other_monthly_debts,
};
pub use amortization::{max_principal, monthly_payment, round2};
pub use events::{CarHolding, HouseHolding, Phase, StudentDebt};
pub use engine::{SimulationRun, SimulationState, StepOutcome, run_simulation, step};
pub use recommend::recommend;
pub use report::{Checkpoint, Checkpoints, SimulationReport, build_report, simulate};
pub use types::{
    CarParams, EducationParams, FieldRule, HouseParams, LegacyLoanParams, LifeEvent, MAX_MONTHS,
    MonthlyRecord, ParamError, ParameterSet, Recommendation, RecommendationKind,
};
