use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{RemoteError, RemoteResult, truncate_body};
use crate::http::HttpClient;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_MATCHES: usize = 3;

/// Free-text food search against the USDA FoodData Central API.
#[derive(Debug, Clone)]
pub struct FoodLookup {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fdc_id: Option<i64>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodItem>,
}

impl FoodLookup {
    pub fn new(
        http: HttpClient,
        api_key: Option<String>,
        base_url: String,
    ) -> RemoteResult<Self> {
        let api_key = api_key
            .filter(|v| !v.trim().is_empty())
            .ok_or(RemoteError::MissingCredential("USDA_API_KEY"))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Up to 3 matches for a food name.
    pub async fn search(&self, name: &str) -> RemoteResult<Vec<FoodItem>> {
        let url = format!("{}/fdc/v1/foods/search", self.base_url);
        let page_size = MAX_MATCHES.to_string();
        let response = self
            .http
            .get(
                &url,
                &[],
                &[
                    ("query", name),
                    ("api_key", self.api_key.as_str()),
                    ("pageSize", page_size.as_str()),
                ],
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

        let parsed: SearchResponse = serde_json::from_str(&response.body)
            .map_err(|err| RemoteError::Parse(err.to_string()))?;
        if parsed.foods.is_empty() {
            return Err(RemoteError::NoResults);
        }

        Ok(parsed.foods.into_iter().take(MAX_MATCHES).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::FoodLookup;
    use crate::http::{HttpClient, HttpDebugConfig};
    use crate::remote::RemoteError;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> HttpClient {
        HttpClient::new(Client::new(), HttpDebugConfig::disabled())
    }

    #[tokio::test]
    async fn search_returns_up_to_three_matches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fdc/v1/foods/search"))
            .and(query_param("query", "avena"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("pageSize", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": [
                    {"fdcId": 1, "description": "Oats, raw"},
                    {"fdcId": 2, "description": "Oatmeal, cooked", "brandOwner": "Acme",
                     "foodNutrients": [{"nutrientName": "Protein", "value": 13.0, "unitName": "G"}]},
                    {"fdcId": 3, "description": "Oat bran"},
                    {"fdcId": 4, "description": "should be dropped"}
                ]
            })))
            .mount(&server)
            .await;

        let lookup =
            FoodLookup::new(http(), Some("test-key".to_string()), server.uri()).expect("lookup");
        let foods = lookup.search("avena").await.expect("search");

        assert_eq!(foods.len(), 3);
        assert_eq!(foods[0].description, "Oats, raw");
        assert_eq!(foods[1].brand_owner.as_deref(), Some("Acme"));
        assert_eq!(
            foods[1].food_nutrients[0].nutrient_name.as_deref(),
            Some("Protein")
        );
    }

    #[tokio::test]
    async fn search_maps_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let lookup =
            FoodLookup::new(http(), Some("bad-key".to_string()), server.uri()).expect("lookup");
        let err = lookup.search("avena").await.expect_err("should fail");

        match err {
            RemoteError::HttpStatus { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("bad key"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_reports_no_results_for_empty_food_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foods": []})))
            .mount(&server)
            .await;

        let lookup =
            FoodLookup::new(http(), Some("test-key".to_string()), server.uri()).expect("lookup");
        let err = lookup.search("xkcd").await.expect_err("should fail");
        assert_eq!(err, RemoteError::NoResults);
    }

    #[test]
    fn new_requires_api_key() {
        let err = FoodLookup::new(http(), None, "https://example.com".to_string())
            .expect_err("missing key should fail");
        assert_eq!(err, RemoteError::MissingCredential("USDA_API_KEY"));
    }
}
