use serde_json::{Map, Value, json};

use super::{
    FunctionDeclaration, calorie_error_envelope, error_envelope, ok_envelope,
    remote_error_envelope, store_error_envelope,
};
use crate::calories;
use crate::config::AppConfig;
use crate::http::HttpClient;
use crate::plans;
use crate::remote::{ExerciseLookup, ExerciseQuery, FoodLookup, TelegramNotifier};
use crate::report;
use crate::storage::{DEFAULT_RECENT_LIMIT, Profile, Storage};

/// One tool invocation as requested by the orchestrator.
#[derive(Debug, Clone)]
pub struct ToolCallSpec {
    pub name: String,
    pub args_json: Value,
}

/// Everything a tool call may touch: the storage handle, the loaded
/// configuration and a shared HTTP client for the remote lookups.
#[derive(Debug, Clone)]
pub struct ToolContext<'a> {
    pub storage: &'a Storage,
    pub config: &'a AppConfig,
    pub http: HttpClient,
}

pub fn tool_declarations() -> Vec<FunctionDeclaration> {
    let decl = |name: &str, description: &str, schema: Value| FunctionDeclaration {
        name: name.to_string(),
        description: description.to_string(),
        parameters_json_schema: schema,
    };

    vec![
        decl(
            "calculate_calories",
            "Estimate basal rate and maintenance/deficit/surplus calories from body metrics",
            json!({
                "type": "object",
                "properties": {
                    "weight": {"type": "number", "description": "Body weight in kg"},
                    "height": {"type": "number", "description": "Height in cm (or meters, auto-detected)"},
                    "age": {"type": "number"},
                    "sex": {"type": "string", "description": "M or F"},
                    "activity": {"type": "string", "description": "sedentario | ligero | moderado | intenso"}
                },
                "required": ["weight", "height", "age", "sex", "activity"]
            }),
        ),
        decl(
            "generate_diet",
            "Return a canned daily menu for a goal (déficit, volumen, mantenimiento)",
            json!({
                "type": "object",
                "properties": {
                    "goal": {"type": "string"}
                }
            }),
        ),
        decl(
            "log_weight",
            "Append a timestamped body-weight sample to the progress log",
            json!({
                "type": "object",
                "properties": {
                    "weight": {"type": "number", "description": "Body weight in kg"}
                },
                "required": ["weight"]
            }),
        ),
        decl(
            "weight_progress",
            "Return the most recent weight samples and the total count",
            json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "description": "How many samples to return (default 5)"}
                }
            }),
        ),
        decl(
            "save_profile",
            "Persist the static user profile (goal, metrics, activity), overwriting any previous one",
            json!({
                "type": "object",
                "properties": {
                    "goal": {"type": "string"},
                    "weight": {"type": "number"},
                    "height": {"type": "number"},
                    "age": {"type": "integer"},
                    "sex": {"type": "string"},
                    "activity": {"type": "string"}
                }
            }),
        ),
        decl(
            "load_profile",
            "Load the saved user profile, if any",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
        decl(
            "export_report",
            "Export the profile summary and the full weight history as a CSV report",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
        decl(
            "search_food",
            "Search the USDA food database by name (up to 3 matches)",
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"}
                },
                "required": ["name"]
            }),
        ),
        decl(
            "search_exercises",
            "Search the exercise database by muscle, type, difficulty, equipment or name",
            json!({
                "type": "object",
                "properties": {
                    "muscle": {"type": "string"},
                    "type": {"type": "string"},
                    "difficulty": {"type": "string"},
                    "equipment": {"type": "string"},
                    "name": {"type": "string"},
                    "limit": {"type": "integer"}
                }
            }),
        ),
        decl(
            "generate_routine",
            "Build a weekly routine for a goal, fetching up to 3 exercises per training day",
            json!({
                "type": "object",
                "properties": {
                    "goal": {"type": "string", "description": "fuerza | hipertrofia | resistencia | perdida_peso"},
                    "level": {"type": "string", "description": "beginner | intermediate | expert"},
                    "days_per_week": {"type": "integer"},
                    "equipment": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["goal"]
            }),
        ),
        decl(
            "send_telegram",
            "Push a free-text message to a Telegram chat",
            json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string"},
                    "chat_id": {"type": "string"}
                },
                "required": ["message"]
            }),
        ),
    ]
}

/// Runs one tool call and wraps the outcome in the `{ok, ...}` envelope. No
/// failure propagates past this boundary.
pub async fn dispatch_call(ctx: &ToolContext<'_>, call: &ToolCallSpec) -> Value {
    let args = match Args::new(&call.args_json) {
        Ok(args) => args,
        Err(envelope) => return envelope,
    };

    match call.name.as_str() {
        "calculate_calories" => calculate_calories(&args),
        "generate_diet" => generate_diet(&args),
        "log_weight" => log_weight(ctx, &args),
        "weight_progress" => weight_progress(ctx, &args),
        "save_profile" => save_profile(ctx, &args),
        "load_profile" => load_profile(ctx),
        "export_report" => export_report(ctx),
        "search_food" => search_food(ctx, &args).await,
        "search_exercises" => search_exercises(ctx, &args).await,
        "generate_routine" => generate_routine(ctx, &args).await,
        "send_telegram" => send_telegram(ctx, &args).await,
        other => error_envelope(
            "unknown_function",
            format!("unknown tool: {other}"),
            json!({}),
        ),
    }
}

fn calculate_calories(args: &Args<'_>) -> Value {
    let parsed = (|| -> Result<_, Value> {
        Ok((
            args.required_f64("weight")?,
            args.required_f64("height")?,
            args.required_f64("age")?,
            args.required_str("sex")?,
            args.required_str("activity")?,
        ))
    })();
    let (weight, height, age, sex, activity) = match parsed {
        Ok(values) => values,
        Err(envelope) => return envelope,
    };

    match calories::estimate(weight, height, age, &sex, &activity) {
        Ok(estimate) => ok_envelope(json!(estimate)),
        Err(err) => calorie_error_envelope(err),
    }
}

fn generate_diet(args: &Args<'_>) -> Value {
    let goal = args.optional_str("goal").unwrap_or_default();
    ok_envelope(json!(plans::diet_plan(&goal)))
}

fn log_weight(ctx: &ToolContext<'_>, args: &Args<'_>) -> Value {
    let weight = match args.required_f64("weight") {
        Ok(weight) => weight,
        Err(envelope) => return envelope,
    };

    match ctx.storage.weight_log().append(weight) {
        Ok(sample) => ok_envelope(json!({"recorded": sample})),
        Err(err) => store_error_envelope(err),
    }
}

fn weight_progress(ctx: &ToolContext<'_>, args: &Args<'_>) -> Value {
    let limit = match args.optional_usize("limit") {
        Ok(limit) => limit.filter(|l| *l > 0).unwrap_or(DEFAULT_RECENT_LIMIT),
        Err(envelope) => return envelope,
    };

    match ctx.storage.weight_log().recent(limit) {
        Ok(progress) => ok_envelope(json!({
            "progress": progress.samples,
            "total": progress.total
        })),
        Err(err) => store_error_envelope(err),
    }
}

fn save_profile(ctx: &ToolContext<'_>, args: &Args<'_>) -> Value {
    let profile = match build_profile(args) {
        Ok(profile) => profile,
        Err(envelope) => return envelope,
    };

    match ctx.storage.profile().save(profile) {
        Ok(saved) => ok_envelope(json!({"status": "saved", "profile": saved})),
        Err(err) => store_error_envelope(err),
    }
}

fn build_profile(args: &Args<'_>) -> Result<Profile, Value> {
    Ok(Profile {
        goal: args.optional_str("goal"),
        weight: args.optional_f64("weight")?,
        height: args.optional_f64("height")?,
        age: args
            .optional_f64("age")?
            .map(|age| age.trunc() as u32),
        sex: args.optional_str("sex"),
        activity: args.optional_str("activity"),
        updated_at: None,
    })
}

fn load_profile(ctx: &ToolContext<'_>) -> Value {
    match ctx.storage.profile().load() {
        Ok(Some(profile)) => ok_envelope(json!({"found": true, "profile": profile})),
        // A missing profile is a normal first-session state, not an error.
        Ok(None) => ok_envelope(json!({"found": false})),
        Err(err) => store_error_envelope(err),
    }
}

fn export_report(ctx: &ToolContext<'_>) -> Value {
    match report::build(ctx.storage) {
        Ok(summary) => ok_envelope(json!({
            "file": summary.path.display().to_string(),
            "rows": summary.rows
        })),
        Err(err) => store_error_envelope(err),
    }
}

async fn search_food(ctx: &ToolContext<'_>, args: &Args<'_>) -> Value {
    let name = match args.required_str("name") {
        Ok(name) => name,
        Err(envelope) => return envelope,
    };

    let lookup = match FoodLookup::new(
        ctx.http.clone(),
        ctx.config.usda_api_key.clone(),
        ctx.config.usda_base_url.clone(),
    ) {
        Ok(lookup) => lookup,
        Err(err) => return remote_error_envelope(err),
    };

    match lookup.search(&name).await {
        Ok(foods) => ok_envelope(json!({"foods": foods})),
        Err(err) => remote_error_envelope(err),
    }
}

async fn search_exercises(ctx: &ToolContext<'_>, args: &Args<'_>) -> Value {
    let query = match exercise_query_from_args(args) {
        Ok(query) => query,
        Err(envelope) => return envelope,
    };

    let lookup = match exercise_lookup(ctx) {
        Ok(lookup) => lookup,
        Err(envelope) => return envelope,
    };

    match lookup.search(&query).await {
        Ok(exercises) => ok_envelope(json!({"exercises": exercises})),
        Err(err) => remote_error_envelope(err),
    }
}

fn exercise_query_from_args(args: &Args<'_>) -> Result<ExerciseQuery, Value> {
    Ok(ExerciseQuery {
        muscle: args.optional_str("muscle"),
        kind: args.optional_str("type"),
        difficulty: args.optional_str("difficulty"),
        equipment: args.optional_str("equipment"),
        name: args.optional_str("name"),
        limit: args.optional_usize("limit")?.filter(|l| *l > 0),
    })
}

fn exercise_lookup(ctx: &ToolContext<'_>) -> Result<ExerciseLookup, Value> {
    ExerciseLookup::new(
        ctx.http.clone(),
        ctx.config.api_ninjas_key.clone(),
        ctx.config.ninjas_base_url.clone(),
    )
    .map_err(remote_error_envelope)
}

async fn generate_routine(ctx: &ToolContext<'_>, args: &Args<'_>) -> Value {
    let goal = match args.required_str("goal") {
        Ok(goal) => goal,
        Err(envelope) => return envelope,
    };
    let level = args.optional_str("level");
    let days = match args.optional_i64("days_per_week") {
        Ok(days) => days,
        Err(envelope) => return envelope,
    };
    let equipment = match args.optional_string_array("equipment") {
        Ok(equipment) => equipment,
        Err(envelope) => return envelope,
    };

    let lookup = match exercise_lookup(ctx) {
        Ok(lookup) => lookup,
        Err(envelope) => return envelope,
    };

    let plan = plans::routine_plan(&lookup, &goal, level.as_deref(), days, &equipment).await;
    ok_envelope(json!({"plan": plan.days}))
}

async fn send_telegram(ctx: &ToolContext<'_>, args: &Args<'_>) -> Value {
    let message = match args.required_str("message") {
        Ok(message) => message,
        Err(envelope) => return envelope,
    };
    let chat_id = args.optional_str("chat_id");

    let notifier = match TelegramNotifier::new(
        ctx.http.clone(),
        ctx.config.telegram_token.clone(),
        ctx.config.telegram_base_url.clone(),
        ctx.config.telegram_chat_id.clone(),
    ) {
        Ok(notifier) => notifier,
        Err(err) => return remote_error_envelope(err),
    };

    match notifier.send(&message, chat_id.as_deref()).await {
        Ok(delivery) => ok_envelope(json!(delivery)),
        Err(err) => remote_error_envelope(err),
    }
}

/// Loose argument extraction over the call's JSON object. Numbers are coerced
/// from numeric strings, since upstream models routinely quote them.
struct Args<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    fn new(args_json: &'a Value) -> Result<Self, Value> {
        match args_json {
            Value::Null => Ok(Self { map: None }),
            Value::Object(map) => Ok(Self { map: Some(map) }),
            other => Err(error_envelope(
                "invalid_input",
                "tool arguments must be a JSON object".to_string(),
                json!({"args": other}),
            )),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|map| map.get(key)).filter(|v| !v.is_null())
    }

    fn required_f64(&self, key: &str) -> Result<f64, Value> {
        self.optional_f64(key)?
            .ok_or_else(|| missing(key))
    }

    fn optional_f64(&self, key: &str) -> Result<Option<f64>, Value> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| not_a_number(key, s)),
            Some(other) => Err(not_a_number(key, other)),
        }
    }

    fn optional_i64(&self, key: &str) -> Result<Option<i64>, Value> {
        Ok(self.optional_f64(key)?.map(|value| value.trunc() as i64))
    }

    fn optional_usize(&self, key: &str) -> Result<Option<usize>, Value> {
        match self.optional_i64(key)? {
            Some(value) if value < 0 => Err(error_envelope(
                "invalid_input",
                format!("'{key}' must not be negative"),
                json!({"value": value}),
            )),
            Some(value) => Ok(Some(value as usize)),
            None => Ok(None),
        }
    }

    fn required_str(&self, key: &str) -> Result<String, Value> {
        self.optional_str(key).ok_or_else(|| missing(key))
    }

    fn optional_str(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    fn optional_string_array(&self, key: &str) -> Result<Vec<String>, Value> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(ToOwned::to_owned).ok_or_else(|| {
                        error_envelope(
                            "invalid_input",
                            format!("'{key}' must be an array of strings"),
                            json!({"value": item}),
                        )
                    })
                })
                .collect(),
            Some(other) => Err(error_envelope(
                "invalid_input",
                format!("'{key}' must be an array of strings"),
                json!({"value": other}),
            )),
        }
    }
}

fn missing(key: &str) -> Value {
    error_envelope(
        "invalid_input",
        format!("missing required argument '{key}'"),
        json!({}),
    )
}

fn not_a_number(key: &str, value: impl serde::Serialize) -> Value {
    error_envelope(
        "invalid_input",
        format!("'{key}' must be a number"),
        json!({"value": value}),
    )
}
