#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use lexis_algo::{Exercise, Word};
use lexis_backend::services::performance::ExerciseOutcome;

pub const USER: &str = "user-1";
pub const WORD: &str = "word-hablar";

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 18, 0, 0).unwrap()
}

pub fn outcome(translation_id: &str, case_name: &str, results: &[Option<bool>]) -> ExerciseOutcome {
    ExerciseOutcome {
        translation_id: translation_id.to_string(),
        case_name: case_name.to_string(),
        results: results.to_vec(),
    }
}

pub fn word(id: &str, targets: &[(&str, &str)]) -> Word {
    Word {
        id: id.to_string(),
        exercises: targets
            .iter()
            .map(|(translation_id, case)| Exercise::targeting(*translation_id, *case))
            .collect(),
        ..Default::default()
    }
}
