use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ExerciseFinder, RemoteError, RemoteResult, truncate_body};
use crate::http::HttpClient;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_EXERCISE_LIMIT: usize = 3;

/// Exercise database search against the API Ninjas exercises endpoint.
#[derive(Debug, Clone)]
pub struct ExerciseLookup {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

/// All filters are optional; the service intersects whatever is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseQuery {
    pub muscle: Option<String>,
    pub kind: Option<String>,
    pub difficulty: Option<String>,
    pub equipment: Option<String>,
    pub name: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ExerciseLookup {
    pub fn new(
        http: HttpClient,
        api_key: Option<String>,
        base_url: String,
    ) -> RemoteResult<Self> {
        let api_key = api_key
            .filter(|v| !v.trim().is_empty())
            .ok_or(RemoteError::MissingCredential("API_NINJAS_KEY"))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn search(&self, query: &ExerciseQuery) -> RemoteResult<Vec<Exercise>> {
        let url = format!("{}/v1/exercises", self.base_url);
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(muscle) = query.muscle.as_deref() {
            params.push(("muscle", muscle));
        }
        if let Some(kind) = query.kind.as_deref() {
            params.push(("type", kind));
        }
        if let Some(difficulty) = query.difficulty.as_deref() {
            params.push(("difficulty", difficulty));
        }
        if let Some(equipment) = query.equipment.as_deref() {
            params.push(("equipment", equipment));
        }
        if let Some(name) = query.name.as_deref() {
            params.push(("name", name));
        }

        let response = self
            .http
            .get(
                &url,
                &[("X-Api-Key", self.api_key.as_str())],
                &params,
                SEARCH_TIMEOUT,
            )
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        if response.status != 200 {
            return Err(RemoteError::HttpStatus {
                status: response.status,
                body: truncate_body(response.body),
            });
        }

        let exercises: Vec<Exercise> = serde_json::from_str(&response.body)
            .map_err(|err| RemoteError::Parse(err.to_string()))?;
        if exercises.is_empty() {
            return Err(RemoteError::NoResults);
        }

        let limit = query.limit.unwrap_or(DEFAULT_EXERCISE_LIMIT);
        Ok(exercises.into_iter().take(limit).collect())
    }
}

impl ExerciseFinder for ExerciseLookup {
    async fn find(&self, query: &ExerciseQuery) -> RemoteResult<Vec<Exercise>> {
        self.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::{ExerciseLookup, ExerciseQuery};
    use crate::http::{HttpClient, HttpDebugConfig};
    use crate::remote::RemoteError;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> HttpClient {
        HttpClient::new(Client::new(), HttpDebugConfig::disabled())
    }

    #[tokio::test]
    async fn search_sends_key_header_and_only_present_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/exercises"))
            .and(header("X-Api-Key", "ninja-key"))
            .and(query_param("muscle", "chest"))
            .and(query_param("difficulty", "beginner"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Push-up", "type": "strength", "muscle": "chest",
                 "equipment": "body_only", "difficulty": "beginner"},
                {"name": "Bench press", "type": "strength", "muscle": "chest"},
                {"name": "Dip", "type": "strength", "muscle": "chest"},
                {"name": "Fly", "type": "strength", "muscle": "chest"}
            ])))
            .mount(&server)
            .await;

        let lookup =
            ExerciseLookup::new(http(), Some("ninja-key".to_string()), server.uri()).expect("lookup");
        let query = ExerciseQuery {
            muscle: Some("chest".to_string()),
            difficulty: Some("beginner".to_string()),
            ..ExerciseQuery::default()
        };
        let exercises = lookup.search(&query).await.expect("search");

        assert_eq!(exercises.len(), 3, "default limit caps results at 3");
        assert_eq!(exercises[0].name, "Push-up");
        assert_eq!(exercises[0].kind.as_deref(), Some("strength"));
    }

    #[tokio::test]
    async fn search_honours_an_explicit_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "A"}, {"name": "B"}, {"name": "C"}
            ])))
            .mount(&server)
            .await;

        let lookup =
            ExerciseLookup::new(http(), Some("ninja-key".to_string()), server.uri()).expect("lookup");
        let query = ExerciseQuery {
            limit: Some(1),
            ..ExerciseQuery::default()
        };
        let exercises = lookup.search(&query).await.expect("search");
        assert_eq!(exercises.len(), 1);
    }

    #[tokio::test]
    async fn search_reports_no_results_for_empty_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let lookup =
            ExerciseLookup::new(http(), Some("ninja-key".to_string()), server.uri()).expect("lookup");
        let err = lookup
            .search(&ExerciseQuery::default())
            .await
            .expect_err("should fail");
        assert_eq!(err, RemoteError::NoResults);
    }

    #[tokio::test]
    async fn search_maps_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let lookup =
            ExerciseLookup::new(http(), Some("ninja-key".to_string()), server.uri()).expect("lookup");
        let err = lookup
            .search(&ExerciseQuery::default())
            .await
            .expect_err("should fail");
        assert!(matches!(err, RemoteError::HttpStatus { status: 500, .. }));
    }

    #[test]
    fn new_requires_api_key() {
        let err = ExerciseLookup::new(http(), Some("  ".to_string()), "https://example.com".to_string())
            .expect_err("blank key should fail");
        assert_eq!(err, RemoteError::MissingCredential("API_NINJAS_KEY"));
    }
}
