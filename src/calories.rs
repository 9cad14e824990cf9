use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFICIT_OFFSET: f64 = 350.0;
const SURPLUS_OFFSET: f64 = 300.0;

/// Daily energy estimate derived from the Mifflin-St Jeor basal rate.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CalorieEstimate {
    /// Basal metabolic rate (TMB in the original report vocabulary).
    pub tmb: f64,
    pub maintenance: f64,
    pub deficit: f64,
    pub surplus: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalorieError {
    InvalidSex(String),
    NonFinite(&'static str),
}

impl Display for CalorieError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSex(value) => {
                write!(f, "invalid sex '{value}': expected 'M' or 'F'")
            }
            Self::NonFinite(field) => write!(f, "{field} must be a finite number"),
        }
    }
}

impl Error for CalorieError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sex {
    Male,
    Female,
}

impl Sex {
    fn parse(value: &str) -> Result<Self, CalorieError> {
        match value.trim().to_lowercase().as_str() {
            "m" => Ok(Self::Male),
            "f" => Ok(Self::Female),
            _ => Err(CalorieError::InvalidSex(value.to_string())),
        }
    }
}

/// Unknown activity strings fall back to the sedentary factor.
fn activity_factor(activity: &str) -> f64 {
    match activity.trim().to_lowercase().as_str() {
        "ligero" => 1.375,
        "moderado" => 1.55,
        "intenso" => 1.725,
        _ => 1.2,
    }
}

/// Computes maintenance calories plus deficit and surplus targets from body
/// metrics. Pure; weight in kg, height in cm (values below 3.0 are taken as
/// meters and converted), age in years.
pub fn estimate(
    weight: f64,
    height: f64,
    age: f64,
    sex: &str,
    activity: &str,
) -> Result<CalorieEstimate, CalorieError> {
    if !weight.is_finite() {
        return Err(CalorieError::NonFinite("weight"));
    }
    if !height.is_finite() {
        return Err(CalorieError::NonFinite("height"));
    }
    if !age.is_finite() {
        return Err(CalorieError::NonFinite("age"));
    }

    let height_cm = if height < 3.0 { height * 100.0 } else { height };
    let age = age.trunc();

    let tmb = match Sex::parse(sex)? {
        Sex::Male => 10.0 * weight + 6.25 * height_cm - 5.0 * age + 5.0,
        Sex::Female => 10.0 * weight + 6.25 * height_cm - 5.0 * age - 161.0,
    };

    let maintenance = tmb * activity_factor(activity);

    Ok(CalorieEstimate {
        tmb: round2(tmb),
        maintenance: round2(maintenance),
        deficit: round2(maintenance - DEFICIT_OFFSET),
        surplus: round2(maintenance + SURPLUS_OFFSET),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
