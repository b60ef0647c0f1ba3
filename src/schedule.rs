use crate::animal::{Animal, AnimalId};
use crate::error::{ErrorCode, ScheduleError};
use crate::exit_arm::{ARMS, ExitArmMap, assign_exit_arms};
use crate::rng::SeededRng;
use crate::trial_sequence::build_trial_sequence;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub animals: Vec<Animal>,
    pub learning_days: usize,
    pub reversal_days: usize,
    pub trials_per_day: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayKind {
    Learning,
    Reversal,
}

impl DayKind {
    pub fn label(&self) -> &'static str {
        match self {
            DayKind::Learning => "Learning",
            DayKind::Reversal => "Reversal",
        }
    }
}

/// One animal's row in a day table: identity fields, the exit arm, and
/// that day's start-arm sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRow {
    pub animal_id: AnimalId,
    pub tag: String,
    pub sex: String,
    pub genotype: String,
    pub cage: String,
    pub exit_arm: u8,
    pub trials: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayTable {
    pub day: usize,
    #[serde(rename = "type")]
    pub kind: DayKind,
    pub header: Vec<String>,
    pub rows: Vec<DayRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub exit_arm_map: ExitArmMap,
    pub day_tables: Vec<DayTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_operations: Vec<String>,
    pub supported_export_formats: Vec<String>,
    pub deterministic_with_seed: bool,
}

pub fn capabilities() -> Capabilities {
    Capabilities {
        protocol_version: "v1".to_string(),
        supported_operations: vec![
            "ParseRoster".to_string(),
            "Generate".to_string(),
            "GenerateText".to_string(),
            "ExportCsv".to_string(),
            "ExportCombinedCsv".to_string(),
        ],
        supported_export_formats: vec!["Csv".to_string(), "Text".to_string()],
        deterministic_with_seed: true,
    }
}

/// Generate the full schedule: one exit-arm assignment, then per-day,
/// per-animal trial sequences with each animal's last start arm carried
/// into the next day as an explicit continuity hint.
///
/// The exit arm stays fixed for the whole experiment; Reversal days only
/// change the day label and the row ordering. Any per-animal sequence
/// failure aborts the run with no partial output.
pub fn generate_schedule(request: &ScheduleRequest) -> Result<ScheduleResult, ScheduleError> {
    validate(request)?;
    let mut rng = SeededRng::from_seed(request.seed);
    let exit_arm_map = assign_exit_arms(&request.animals, &mut rng)?;

    let total_days = request.learning_days + request.reversal_days;
    let mut last_start: HashMap<AnimalId, u8> = HashMap::new();
    let mut day_tables = Vec::with_capacity(total_days);
    for day in 1..=total_days {
        let kind = if day <= request.learning_days {
            DayKind::Learning
        } else {
            DayKind::Reversal
        };
        let mut rows = Vec::with_capacity(request.animals.len());
        for animal in &request.animals {
            let exit_arm = exit_arm_map[&animal.animal_id];
            let start_arms: Vec<u8> = ARMS
                .iter()
                .copied()
                .filter(|&arm| arm != exit_arm)
                .collect();
            let hint = last_start.get(&animal.animal_id).copied();
            let trials = build_trial_sequence(&start_arms, request.trials_per_day, hint)?;
            if let Some(&last) = trials.last() {
                last_start.insert(animal.animal_id.clone(), last);
            }
            rows.push(DayRow {
                animal_id: animal.animal_id.clone(),
                tag: animal.tag.clone(),
                sex: animal.sex.clone(),
                genotype: animal.genotype.clone(),
                cage: animal.cage.clone(),
                exit_arm,
                trials,
            });
        }
        order_rows(&mut rows, kind);
        day_tables.push(DayTable {
            day,
            kind,
            header: day_header(request.trials_per_day),
            rows,
        });
    }

    Ok(ScheduleResult {
        exit_arm_map,
        day_tables,
    })
}

fn validate(request: &ScheduleRequest) -> Result<(), ScheduleError> {
    let invalid = |message: String| ScheduleError {
        code: ErrorCode::InvalidInput,
        message,
    };
    if request.animals.is_empty() {
        return Err(invalid("Roster is empty".to_string()));
    }
    if request.learning_days == 0 {
        return Err(invalid("learning_days must be at least 1".to_string()));
    }
    if request.trials_per_day == 0 {
        return Err(invalid("trials_per_day must be at least 1".to_string()));
    }
    let mut seen: HashSet<&str> = HashSet::with_capacity(request.animals.len());
    for animal in &request.animals {
        if !seen.insert(animal.animal_id.as_str()) {
            return Err(invalid(format!(
                "Duplicate AnimalID '{}'",
                animal.animal_id
            )));
        }
    }
    Ok(())
}

fn day_header(trials_per_day: usize) -> Vec<String> {
    let mut header: Vec<String> = ["AnimalID", "Tag", "Sex", "Genotype", "Cage", "ExitArm"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend((1..=trials_per_day).map(|t| format!("T{t}")));
    header
}

/// Presentation ordering only; sequences are already built when this runs.
/// Reversal days cluster rows sharing an exit arm so the operator walks
/// the table with the fewest apparatus changes.
fn order_rows(rows: &mut [DayRow], kind: DayKind) {
    match kind {
        DayKind::Learning => {
            rows.sort_by(|a, b| (&a.cage, &a.animal_id).cmp(&(&b.cage, &b.animal_id)));
        }
        DayKind::Reversal => {
            rows.sort_by(|a, b| {
                (a.exit_arm, &a.cage, &a.animal_id).cmp(&(b.exit_arm, &b.cage, &b.animal_id))
            });
        }
    }
}
