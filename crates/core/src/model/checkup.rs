use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CheckupError {
    #[error("please agree to share the information")]
    ConsentRequired,
}

/// Insulin value assumed when the user leaves the field blank.
pub const DEFAULT_INSULIN: f64 = 10.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symptom {
    HeavyBleeding,
    ExcessHairGrowth,
    Pimples,
}

impl Symptom {
    pub const ALL: [Symptom; 3] = [
        Symptom::HeavyBleeding,
        Symptom::ExcessHairGrowth,
        Symptom::Pimples,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Symptom::HeavyBleeding => "Heavy Bleeding",
            Symptom::ExcessHairGrowth => "Excess Hair Growth",
            Symptom::Pimples => "Pimples",
        }
    }
}

/// Symptom checkup form. Blank numeric inputs are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckupForm {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub age: Option<f64>,
    pub cycle_length: Option<f64>,
    pub regular_periods: bool,
    pub symptoms: BTreeSet<Symptom>,
    pub tsh: Option<f64>,
    pub fsh: Option<f64>,
    pub lh: Option<f64>,
    pub insulin: Option<f64>,
    pub consent: bool,
}

impl CheckupForm {
    /// Add the symptom if absent, remove it otherwise.
    pub fn toggle_symptom(&mut self, symptom: Symptom) {
        if !self.symptoms.remove(&symptom) {
            self.symptoms.insert(symptom);
        }
    }

    /// Body-mass index rounded to two decimals, when height and weight are positive.
    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        let height = self.height_cm.filter(|h| *h > 0.0)?;
        let weight = self.weight_kg.filter(|w| *w > 0.0)?;
        let meters = height / 100.0;
        Some(round2(weight / (meters * meters)))
    }

    /// FSH/LH ratio rounded to two decimals; zero when either is missing or LH is zero.
    #[must_use]
    pub fn fsh_lh_ratio(&self) -> f64 {
        match (self.fsh, self.lh) {
            (Some(fsh), Some(lh)) if lh != 0.0 => round2(fsh / lh),
            _ => 0.0,
        }
    }

    /// Build the model feature vector.
    ///
    /// # Errors
    ///
    /// Returns `CheckupError::ConsentRequired` if consent was not given.
    pub fn to_features(&self) -> Result<HealthFeatures, CheckupError> {
        if !self.consent {
            return Err(CheckupError::ConsentRequired);
        }

        let flag = |symptom: Symptom| u8::from(self.symptoms.contains(&symptom));

        Ok(HealthFeatures {
            age: self.age.unwrap_or(0.0),
            weight: self.weight_kg.unwrap_or(0.0),
            height_cm: self.height_cm.unwrap_or(0.0),
            bmi: self.bmi().unwrap_or(0.0),
            cycle_regular: u8::from(self.regular_periods),
            cycle_length: self.cycle_length.unwrap_or(0.0),
            fsh: self.fsh.unwrap_or(0.0),
            lh: self.lh.unwrap_or(0.0),
            fsh_lh_ratio: self.fsh_lh_ratio(),
            tsh: self.tsh.unwrap_or(0.0),
            hair_growth: flag(Symptom::ExcessHairGrowth),
            // The deployed model was trained with this column fed from the bleeding checkbox.
            skin_darkening: flag(Symptom::HeavyBleeding),
            acne: flag(Symptom::Pimples),
            insulin: self
                .insulin
                .filter(|v| *v != 0.0)
                .unwrap_or(DEFAULT_INSULIN),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Feature payload keyed by the column names the risk model expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthFeatures {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Weight")]
    pub weight: f64,
    #[serde(rename = "Height(Cm)")]
    pub height_cm: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "Cycle(I/R)")]
    pub cycle_regular: u8,
    #[serde(rename = "Cycle length")]
    pub cycle_length: f64,
    #[serde(rename = "FSH(mIU/mL)")]
    pub fsh: f64,
    #[serde(rename = "LH(mIU/mL)")]
    pub lh: f64,
    #[serde(rename = "FSH/LH ratio")]
    pub fsh_lh_ratio: f64,
    #[serde(rename = "TSH (mIU/L)")]
    pub tsh: f64,
    #[serde(rename = "Hair growth")]
    pub hair_growth: u8,
    #[serde(rename = "Skin darkening")]
    pub skin_darkening: u8,
    #[serde(rename = "Acne")]
    pub acne: u8,
    #[serde(rename = "Insulin levels (æIU/ml)")]
    pub insulin: f64,
}

/// Result returned by the risk model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub prediction: u8,
    pub message: String,
}

impl RiskAssessment {
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.prediction == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CheckupForm {
        CheckupForm {
            height_cm: Some(160.0),
            weight_kg: Some(64.0),
            age: Some(24.0),
            cycle_length: Some(35.0),
            regular_periods: false,
            fsh: Some(6.0),
            lh: Some(4.0),
            consent: true,
            ..CheckupForm::default()
        }
    }

    #[test]
    fn bmi_requires_positive_inputs() {
        assert_eq!(form().bmi(), Some(25.0));
        let mut f = form();
        f.height_cm = Some(0.0);
        assert_eq!(f.bmi(), None);
    }

    #[test]
    fn ratio_defaults_to_zero() {
        assert!((form().fsh_lh_ratio() - 1.5).abs() < f64::EPSILON);
        let mut f = form();
        f.lh = Some(0.0);
        assert!(f.fsh_lh_ratio().abs() < f64::EPSILON);
        f.lh = None;
        assert!(f.fsh_lh_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn consent_is_required() {
        let mut f = form();
        f.consent = false;
        assert_eq!(f.to_features().unwrap_err(), CheckupError::ConsentRequired);
    }

    #[test]
    fn features_use_model_column_names() {
        let mut f = form();
        f.toggle_symptom(Symptom::Pimples);
        f.toggle_symptom(Symptom::HeavyBleeding);
        f.toggle_symptom(Symptom::HeavyBleeding);
        let json = serde_json::to_value(f.to_features().unwrap()).unwrap();
        assert_eq!(json["Acne"], 1);
        assert_eq!(json["Skin darkening"], 0);
        assert_eq!(json["Cycle(I/R)"], 0);
        assert_eq!(json["Insulin levels (æIU/ml)"], DEFAULT_INSULIN);
        assert_eq!(json["BMI"], 25.0);
    }
}
