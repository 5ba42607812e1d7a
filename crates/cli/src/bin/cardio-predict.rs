//! Cardiovascular Risk Classifier - Prediction Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use cli::{init_logging, AppConfig};
use feature_engine::FeatureRow;
use inference_engine::InferenceService;
use std::path::PathBuf;
use storage::ArtifactStore;

/// Assess heart disease risk for one patient
#[derive(Debug, Parser)]
#[command(name = "cardio-predict", version, about)]
struct Args {
    /// Configuration file (defaults to ./cardio.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model artifact to load
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,

    /// Age in years
    #[arg(long)]
    age: f64,

    /// Sex (0 = female, 1 = male)
    #[arg(long)]
    sex: i64,

    /// Chest pain type (0-3)
    #[arg(long)]
    chest_pain_type: i64,

    /// Resting blood pressure (mm Hg)
    #[arg(long)]
    resting_bp: f64,

    /// Serum cholesterol (mg/dl)
    #[arg(long)]
    cholesterol: f64,

    /// Fasting blood sugar > 120 mg/dl (0 or 1)
    #[arg(long)]
    fasting_blood_sugar: i64,

    /// Resting ECG result (0-2)
    #[arg(long)]
    resting_ecg: i64,

    /// Maximum heart rate achieved
    #[arg(long)]
    max_heart_rate: f64,

    /// Exercise-induced angina (0 or 1)
    #[arg(long)]
    exercise_angina: i64,

    /// Major vessels colored by fluoroscopy (0-4)
    #[arg(long)]
    major_vessels: i64,
}

impl Args {
    fn row(&self) -> FeatureRow {
        FeatureRow {
            age: self.age,
            sex: self.sex,
            chest_pain_type: self.chest_pain_type,
            resting_bp: self.resting_bp,
            cholesterol: self.cholesterol,
            fasting_blood_sugar: self.fasting_blood_sugar,
            resting_ecg: self.resting_ecg,
            max_heart_rate: self.max_heart_rate,
            exercise_angina: self.exercise_angina,
            major_vessels: self.major_vessels,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(path) = &args.artifact {
        config.artifact_path = path.clone();
    }
    init_logging(&config.log_level, config.log_json);

    let service = InferenceService::new(ArtifactStore::new(&config.artifact_path));
    let assessment = service.assess(&args.row()).context("risk assessment failed")?;

    if args.json {
        println!("{}", serde_json::to_string(&assessment)?);
    } else {
        println!("{}", assessment.label.as_str());
        println!("{}", assessment.label.recommended_action());
        println!(
            "Probability: {:.3} (model: {})",
            assessment.probability, assessment.model
        );
    }
    Ok(())
}
