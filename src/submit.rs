use serde_json::{json, Value};
use tracing::info;

use crate::errors::Result;
use crate::http::HttpClient;
use crate::types::Stats;

/// Builds the request body expected by the grading endpoint.
pub fn submission_payload(stats: &Stats) -> Value {
    json!({ "stats": stats })
}

/// Posts the statistics and returns the endpoint's JSON response.
pub fn submit(client: &HttpClient, url: &str, stats: &Stats, token: &str) -> Result<Value> {
    let payload = submission_payload(stats);
    let response = client.post_json(url, &payload, token)?;
    info!(url, "statistics submitted");
    Ok(response)
}

/// Extracts the `score` field of a submission response, if any.
pub fn score(response: &Value) -> Option<&Value> {
    response.get("score").filter(|s| !s.is_null())
}

/// Renders a score for display: strings as-is, anything else as JSON.
pub fn display_score(score: &Value) -> String {
    match score {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_stats() -> Stats {
        let mut medias = BTreeMap::new();
        medias.insert("Sudeste".to_string(), 12_325_000.0);
        Stats {
            total_municipios: 3,
            total_ok: 1,
            total_nao_encontrado: 1,
            total_erro_api: 1,
            pop_total_ok: 12_325_000,
            medias_por_regiao: medias,
        }
    }

    #[test]
    fn test_payload_wraps_stats() {
        let payload = submission_payload(&sample_stats());
        assert_eq!(payload["stats"]["total_municipios"], 3);
        assert_eq!(payload["stats"]["pop_total_ok"], 12_325_000);
        assert_eq!(payload["stats"]["medias_por_regiao"]["Sudeste"], 12_325_000.0);
    }

    #[test]
    fn test_score_extraction() {
        let response = json!({"score": 87.5, "feedback": "ok"});
        assert_eq!(score(&response), Some(&json!(87.5)));
        assert!(score(&json!({"score": null})).is_none());
        assert!(score(&json!({})).is_none());
    }

    #[test]
    fn test_display_score() {
        assert_eq!(display_score(&json!("A")), "A");
        assert_eq!(display_score(&json!(87.5)), "87.5");
        assert_eq!(display_score(&json!(10)), "10");
    }
}
