use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A canonical municipality record from the reference registry.
///
/// `key` is derived once from `display_name` at ingestion time and is not
/// unique: homonyms in different states share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: u64,
    pub display_name: String,
    /// State abbreviation (UF), e.g. `"SP"`.
    pub region_code: String,
    /// Macro-region name, e.g. `"Sudeste"`.
    pub region_name: String,
    pub key: String,
}

impl RegistryEntry {
    /// Builds an entry, computing its comparison key from `display_name`.
    pub fn new(
        id: u64,
        display_name: impl Into<String>,
        region_code: impl Into<String>,
        region_name: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        let key = crate::normalize::normalize(&display_name);
        Self {
            id,
            display_name,
            region_code: region_code.into(),
            region_name: region_name.into(),
            key,
        }
    }
}

/// One row of the input file: a free-text name plus an opaque population figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    pub name: String,
    pub population: i64,
}

/// Report status of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowStatus {
    Ok,
    Ambiguous,
    NotFound,
    ApiError,
}

#[allow(clippy::should_implement_trait)]
impl RowStatus {
    /// Returns the label written to the result file.
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Ok => "OK",
            RowStatus::Ambiguous => "AMBIGUO",
            RowStatus::NotFound => "NAO_ENCONTRADO",
            RowStatus::ApiError => "ERRO_API",
        }
    }

    /// Parses a result-file label, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<RowStatus> {
        match s {
            "OK" => Some(RowStatus::Ok),
            "AMBIGUO" => Some(RowStatus::Ambiguous),
            "NAO_ENCONTRADO" => Some(RowStatus::NotFound),
            "ERRO_API" => Some(RowStatus::ApiError),
            _ => None,
        }
    }
}

/// One row of the result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub input_name: String,
    pub input_population: i64,
    pub registry_name: String,
    pub region_code: String,
    pub region_name: String,
    /// Registry id rendered as text; empty when no entry was matched.
    pub registry_id: String,
    pub status: RowStatus,
}

/// Aggregate counters posted to the grading endpoint.
///
/// Field names are the wire format expected by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_municipios: u64,
    pub total_ok: u64,
    pub total_nao_encontrado: u64,
    pub total_erro_api: u64,
    pub pop_total_ok: i64,
    pub medias_por_regiao: BTreeMap<String, f64>,
}
