//! Milvus corpus index over the REST API v2.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use lexis_core::error::{LexisError, LexisResult};
use lexis_core::traits::{IndexConfig, IndexHit, VectorIndex};
use lexis_core::types::{Filter, FilterCondition, FilterOperator};

const OUTPUT_FIELDS: [&str; 4] = ["id", "content", "word", "chunk_type"];

/// Milvus corpus index using the REST API.
///
/// The collection is expected to hold a `vector` field indexed with the
/// COSINE metric, so search distances are similarities.
pub struct MilvusIndex {
    client: Client,
    base_url: String,
    collection: String,
    token: Option<String>,
}

impl MilvusIndex {
    /// Create a new Milvus index client. No request is made until the first query.
    pub fn new(config: &IndexConfig) -> LexisResult<Self> {
        let base_url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:19530".to_string());

        url::Url::parse(&base_url).map_err(|e| {
            LexisError::Configuration(format!("Invalid Milvus URL {}: {}", base_url, e))
        })?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: config.collection_name.clone(),
            token: config.token.clone(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/vectordb{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> LexisResult<Vec<Value>> {
        let mut request = self.client.post(self.api_url(path)).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LexisError::index_unavailable(format!("Milvus request failed: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(LexisError::vector_store(format!(
                "Milvus {} failed: {}",
                path, error
            )));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| LexisError::vector_store(format!("Failed to parse response: {}", e)))?;

        // The v2 API reports errors in the body with HTTP 200.
        let code = result["code"].as_i64().unwrap_or(0);
        if code != 0 {
            let message = result["message"].as_str().unwrap_or("unknown error");
            return Err(LexisError::vector_store(format!(
                "Milvus {} failed ({}): {}",
                path, code, message
            )));
        }

        Ok(result["data"].as_array().cloned().unwrap_or_default())
    }
}

#[async_trait]
impl VectorIndex for MilvusIndex {
    async fn semantic_search(&self, vector: &[f32], limit: usize) -> LexisResult<Vec<IndexHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let body = json!({
            "collectionName": self.collection,
            "data": [vector],
            "annsField": "vector",
            "limit": limit,
            "outputFields": OUTPUT_FIELDS,
        });

        let data = self.post("/entities/search", body).await?;
        let hits: Vec<IndexHit> = data.iter().filter_map(|item| parse_hit(item, None)).collect();
        debug!("Milvus search returned {} hits", hits.len());
        Ok(hits)
    }

    async fn filter_query(&self, filter: &Filter, limit: usize) -> LexisResult<Vec<IndexHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let body = json!({
            "collectionName": self.collection,
            "filter": filter_expression(filter),
            "limit": limit,
            "outputFields": OUTPUT_FIELDS,
        });

        let data = self.post("/entities/query", body).await?;
        Ok(data
            .iter()
            .filter_map(|item| parse_hit(item, Some(1.0)))
            .collect())
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }
}

/// Render a filter as a Milvus boolean expression.
pub fn filter_expression(filter: &Filter) -> String {
    match filter {
        Filter::Condition(condition) => condition_expression(condition),
        Filter::And(filters) => join_expressions(filters, " and ", "true"),
        Filter::Or(filters) => join_expressions(filters, " or ", "false"),
        Filter::Not(inner) => format!("not ({})", filter_expression(inner)),
    }
}

fn join_expressions(filters: &[Filter], separator: &str, empty: &str) -> String {
    match filters {
        [] => empty.to_string(),
        [single] => filter_expression(single),
        _ => filters
            .iter()
            .map(|f| format!("({})", filter_expression(f)))
            .collect::<Vec<_>>()
            .join(separator),
    }
}

fn condition_expression(condition: &FilterCondition) -> String {
    let field = &condition.field;
    match &condition.operator {
        FilterOperator::Eq(value) => format!("{} == {}", field, quote(value)),
        FilterOperator::Ne(value) => format!("{} != {}", field, quote(value)),
        FilterOperator::In(values) => {
            let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
            format!("{} in [{}]", field, items.join(", "))
        }
        FilterOperator::Contains(value) => {
            format!("{} like {}", field, quote(&format!("%{}%", escape_like(value))))
        }
    }
}

/// Escape `like` wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Search rows carry `distance`, query rows carry no score.
fn parse_hit(item: &Value, fixed_score: Option<f32>) -> Option<IndexHit> {
    let id = match &item["id"] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let text = |key: &str| item[key].as_str().unwrap_or_default().to_string();
    let score = fixed_score.unwrap_or_else(|| item["distance"].as_f64().unwrap_or(0.0) as f32);

    Some(IndexHit {
        id,
        content: text("content"),
        word: text("word"),
        chunk_type: text("chunk_type"),
        score,
    })
}
