use super::types::{ParameterSet, Recommendation, RecommendationKind, TAKE_HOME_FRACTION};

const HOUSE_SALARY_MULTIPLE: f64 = 3.0;
const CAR_SALARY_MULTIPLE: f64 = 0.5;
const EDUCATION_TAKE_HOME_SHARE: f64 = 0.15;
/// Rough monthly payment as a share of principal, used only for advice.
const ROUGH_PAYMENT_SHARE: f64 = 0.01;

/// Affordability advice for the three purchases, independent of the run.
///
/// A purchase counts as planned when its trigger month is set and its amount
/// is positive; planned purchases are judged against the ceiling, unplanned
/// ones get the ceiling as guidance.
pub fn recommend(params: &ParameterSet) -> Vec<Recommendation> {
    vec![
        house_advice(params),
        car_advice(params),
        education_advice(params),
    ]
}

fn planned(trigger_month: u32, amount: f64) -> Option<f64> {
    (trigger_month > 0 && amount > 0.0).then_some(amount)
}

fn house_advice(params: &ParameterSet) -> Recommendation {
    let ceiling = params.salary_annual * HOUSE_SALARY_MULTIPLE;
    match planned(params.house.buy_month, params.house.price) {
        Some(price) if price <= ceiling => Recommendation {
            kind: RecommendationKind::Favorable,
            text: format!(
                "A ${price:.2} home is within the ${ceiling:.2} guideline (3x salary)."
            ),
        },
        Some(price) => Recommendation {
            kind: RecommendationKind::Unfavorable,
            text: format!(
                "A ${price:.2} home exceeds the ${ceiling:.2} guideline (3x salary) by ${:.2}; consider a cheaper home or a larger down payment.",
                price - ceiling
            ),
        },
        None => Recommendation {
            kind: RecommendationKind::Informational,
            text: format!("Based on your salary, aim for a home priced at or below ${ceiling:.2}."),
        },
    }
}

fn car_advice(params: &ParameterSet) -> Recommendation {
    let ceiling = params.salary_annual * CAR_SALARY_MULTIPLE;
    match planned(params.car.buy_month, params.car.price) {
        Some(price) if price <= ceiling => Recommendation {
            kind: RecommendationKind::Favorable,
            text: format!(
                "A ${price:.2} car is within the ${ceiling:.2} guideline (half of salary)."
            ),
        },
        Some(price) => Recommendation {
            kind: RecommendationKind::Unfavorable,
            text: format!(
                "A ${price:.2} car exceeds the ${ceiling:.2} guideline (half of salary) by ${:.2}.",
                price - ceiling
            ),
        },
        None => Recommendation {
            kind: RecommendationKind::Informational,
            text: format!("Based on your salary, keep a car purchase at or below ${ceiling:.2}."),
        },
    }
}

fn education_advice(params: &ParameterSet) -> Recommendation {
    let take_home = params.salary_annual * TAKE_HOME_FRACTION / 12.0;
    let ceiling = take_home * EDUCATION_TAKE_HOME_SHARE;
    match planned(params.education.start_month, params.education.principal()) {
        Some(principal) => {
            let estimate = principal * ROUGH_PAYMENT_SHARE;
            if estimate <= ceiling {
                Recommendation {
                    kind: RecommendationKind::Favorable,
                    text: format!(
                        "A ${principal:.2} student loan (about ${estimate:.2}/mo) fits within 15% of take-home pay (${ceiling:.2}/mo)."
                    ),
                }
            } else {
                Recommendation {
                    kind: RecommendationKind::Unfavorable,
                    text: format!(
                        "A ${principal:.2} student loan (about ${estimate:.2}/mo) exceeds 15% of take-home pay (${ceiling:.2}/mo)."
                    ),
                }
            }
        }
        None => Recommendation {
            kind: RecommendationKind::Informational,
            text: format!(
                "Keep student loan payments at or below ${ceiling:.2}/mo (15% of take-home pay)."
            ),
        },
    }
}
