use serde::Serialize;

use crate::remote::{Exercise, ExerciseFinder, ExerciseQuery};

pub const DEFAULT_TRAINING_DAYS: i64 = 3;
pub const DEFAULT_LEVEL: &str = "beginner";

const EXERCISES_PER_DAY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DietPlan {
    pub goal: String,
    pub meals: Vec<&'static str>,
}

/// Canned menu for a goal; unknown goals get the maintenance menu.
pub fn diet_plan(goal: &str) -> DietPlan {
    let goal = goal.trim().to_lowercase();
    let meals = match goal.as_str() {
        "déficit" | "deficit" => vec![
            "Desayuno: Avena+yogur",
            "Comida: Pollo+verduras",
            "Cena: Ensalada+atún",
        ],
        "volumen" => vec![
            "Desayuno: Avena+huevos+pan",
            "Comida: Pasta+carne",
            "Cena: Arroz+pollo",
        ],
        _ => vec![
            "Desayuno: Tostadas+huevo",
            "Comida: Legumbres+arroz",
            "Cena: Pescado+verdura",
        ],
    };

    DietPlan {
        goal: if goal.is_empty() {
            "mantenimiento".to_string()
        } else {
            goal
        },
        meals,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineDay {
    pub day: u32,
    pub focus: String,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutinePlan {
    pub days: Vec<RoutineDay>,
}

/// Muscle-group cycle for a training goal; unknown goals train for endurance.
fn focus_cycle(goal: &str) -> &'static [&'static str] {
    match goal.trim().to_lowercase().as_str() {
        "fuerza" => &["chest", "back", "legs", "shoulders"],
        "hipertrofia" => &["chest", "back", "legs", "shoulders", "biceps", "triceps"],
        "perdida_peso" => &["cardio", "legs", "back"],
        _ => &["cardio", "full_body"],
    }
}

/// Builds a weekly routine: one focus per day, cycling through the goal's
/// muscle groups, with up to 3 exercises fetched per day. A failed lookup
/// leaves that day's exercise list empty instead of aborting the plan.
pub async fn routine_plan<F: ExerciseFinder>(
    finder: &F,
    goal: &str,
    level: Option<&str>,
    days_per_week: Option<i64>,
    equipment: &[String],
) -> RoutinePlan {
    let level = level
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LEVEL);
    let days = days_per_week.unwrap_or(DEFAULT_TRAINING_DAYS).clamp(1, 7) as usize;
    let cycle = focus_cycle(goal);
    let equipment = equipment.first().map(String::as_str);

    let mut plan_days = Vec::with_capacity(days);
    for day in 0..days {
        let focus = cycle[day % cycle.len()];
        let query = ExerciseQuery {
            muscle: (focus != "cardio").then(|| focus.to_string()),
            kind: Some(if focus == "cardio" { "cardio" } else { "strength" }.to_string()),
            difficulty: Some(level.to_string()),
            equipment: equipment.map(ToOwned::to_owned),
            name: None,
            limit: Some(EXERCISES_PER_DAY),
        };

        let exercises = finder.find(&query).await.unwrap_or_default();
        plan_days.push(RoutineDay {
            day: day as u32 + 1,
            focus: focus.to_string(),
            exercises,
        });
    }

    RoutinePlan { days: plan_days }
}
