use serde::Serialize;

use super::affordability::{AffordabilityReport, AffordabilitySettings, analyze};
use super::engine::{SimulationRun, run_simulation};
use super::recommend::recommend;
use super::types::{LifeEvent, MonthlyRecord, ParameterSet, Recommendation};

/// Snapshot of one month's figures, without the narrative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub month: u32,
    pub cash: f64,
    pub portfolio: f64,
    pub debt: f64,
    pub net_worth: f64,
    pub home_equity: f64,
    pub car_value: f64,
}

impl From<&MonthlyRecord> for Checkpoint {
    fn from(record: &MonthlyRecord) -> Self {
        Self {
            month: record.month,
            cash: record.cash,
            portfolio: record.portfolio,
            debt: record.debt,
            net_worth: record.net_worth,
            home_equity: record.home_equity,
            car_value: record.car_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkpoints {
    pub mid: Option<Checkpoint>,
    #[serde(rename = "final")]
    pub last: Option<Checkpoint>,
}

/// The document returned to callers for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub inputs: ParameterSet,
    pub life_events: Vec<String>,
    pub recommendations: Vec<String>,
    pub checkpoints: Checkpoints,
    pub monthly: Vec<MonthlyRecord>,
    pub summary: String,
    pub house_affordability: AffordabilityReport,
}

/// Run the engine and the advice heuristics and package both.
pub fn simulate(params: &ParameterSet) -> SimulationReport {
    let run = run_simulation(params);
    let recommendations = recommend(params);
    build_report(params, run, &recommendations)
}

pub fn build_report(
    params: &ParameterSet,
    run: SimulationRun,
    recommendations: &[Recommendation],
) -> SimulationReport {
    let SimulationRun {
        records,
        mid,
        life_events,
    } = run;

    let last = records.last().map(Checkpoint::from);
    let summary = summarize(params, last.as_ref(), life_events.len());

    SimulationReport {
        inputs: params.clone(),
        life_events: life_events.iter().map(format_event).collect(),
        recommendations: recommendations.iter().map(format_recommendation).collect(),
        checkpoints: Checkpoints { mid, last },
        monthly: records,
        summary,
        house_affordability: analyze(params, &AffordabilitySettings::default()),
    }
}

fn format_event(event: &LifeEvent) -> String {
    format!("Month {}: {}", event.month, event.description)
}

fn format_recommendation(rec: &Recommendation) -> String {
    format!("{}: {}", rec.kind.label(), rec.text)
}

fn summarize(params: &ParameterSet, last: Option<&Checkpoint>, event_count: usize) -> String {
    let Some(last) = last else {
        return "No months were simulated.".to_string();
    };

    let mut summary = format!(
        "After {} months, net worth is ${:.2} with ${:.2} invested and ${:.2} debt remaining (${:.2}/mo at {:.2}% annual).",
        last.month, last.net_worth, last.portfolio, last.debt, params.monthly_invest, params.return_annual
    );
    match event_count {
        0 => {}
        1 => summary.push_str(" 1 life event occurred."),
        n => summary.push_str(&format!(" {n} life events occurred.")),
    }
    summary
}
