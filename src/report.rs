use std::collections::BTreeMap;

use crate::resolution::ResolutionOutcome;
use crate::types::{InputRow, RegistryEntry, ReportRow, RowStatus, Stats};

/// Maps a resolution outcome to a result row.
///
/// Ambiguous rows carry the representative entry so the reader can see which
/// homonym was considered; unresolved rows leave the registry fields empty.
pub fn report_row(input: &InputRow, outcome: &ResolutionOutcome<'_>) -> ReportRow {
    match outcome {
        ResolutionOutcome::Resolved { entry, .. } => filled_row(input, entry, RowStatus::Ok),
        ResolutionOutcome::Ambiguous { representative, .. } => {
            filled_row(input, representative, RowStatus::Ambiguous)
        }
        ResolutionOutcome::Unresolved => empty_row(input, RowStatus::NotFound),
    }
}

/// Result row for when the registry itself could not be obtained.
pub fn unavailable_row(input: &InputRow) -> ReportRow {
    empty_row(input, RowStatus::ApiError)
}

fn filled_row(input: &InputRow, entry: &RegistryEntry, status: RowStatus) -> ReportRow {
    ReportRow {
        input_name: input.name.clone(),
        input_population: input.population,
        registry_name: entry.display_name.clone(),
        region_code: entry.region_code.clone(),
        region_name: entry.region_name.clone(),
        registry_id: entry.id.to_string(),
        status,
    }
}

fn empty_row(input: &InputRow, status: RowStatus) -> ReportRow {
    ReportRow {
        input_name: input.name.clone(),
        input_population: input.population,
        registry_name: String::new(),
        region_code: String::new(),
        region_name: String::new(),
        registry_id: String::new(),
        status,
    }
}

/// Aggregates result rows into the submission statistics.
///
/// Ambiguous rows count as not found. Population totals and per-region means
/// only consider `OK` rows; rows with an empty region are left out of the
/// means. Means are rounded to two decimals. The population total saturates
/// at `i64::MAX`; per-region sums are kept in `i128` so the means stay exact.
pub fn compute_stats(rows: &[ReportRow]) -> Stats {
    let mut stats = Stats {
        total_municipios: rows.len() as u64,
        total_ok: 0,
        total_nao_encontrado: 0,
        total_erro_api: 0,
        pop_total_ok: 0,
        medias_por_regiao: BTreeMap::new(),
    };

    let mut by_region: BTreeMap<&str, (i128, u64)> = BTreeMap::new();

    for row in rows {
        match row.status {
            RowStatus::Ok => {
                stats.total_ok += 1;
                stats.pop_total_ok = stats.pop_total_ok.saturating_add(row.input_population);
                if !row.region_name.is_empty() {
                    let (sum, count) = by_region.entry(row.region_name.as_str()).or_default();
                    *sum += i128::from(row.input_population);
                    *count += 1;
                }
            }
            RowStatus::NotFound | RowStatus::Ambiguous => stats.total_nao_encontrado += 1,
            RowStatus::ApiError => stats.total_erro_api += 1,
        }
    }

    stats.medias_por_regiao = by_region
        .into_iter()
        .map(|(region, (sum, count))| (region.to_string(), round2(sum as f64 / count as f64)))
        .collect();

    stats
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
