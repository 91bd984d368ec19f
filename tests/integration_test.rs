use std::fs;
use std::path::Path;

use ibgematch::config::{save_config, AppConfig};
use ibgematch::pipeline::{Pipeline, RunOptions};
use ibgematch::registry::save_cache;
use ibgematch::resolution::{MatchMethod, ResolutionStatus};
use ibgematch::types::RowStatus;
use serde_json::{json, Value};
use tempfile::TempDir;

fn municipality(id: u64, name: &str, uf: &str, region: &str) -> Value {
    json!({
        "id": id,
        "nome": name,
        "microrregiao": {
            "mesorregiao": {
                "UF": {"sigla": uf, "regiao": {"nome": region}}
            }
        }
    })
}

fn seed_registry(root: &Path) {
    let raw = vec![
        municipality(3550308, "São Paulo", "SP", "Sudeste"),
        municipality(3509502, "Campinas", "SP", "Sudeste"),
        municipality(3304557, "Rio de Janeiro", "RJ", "Sudeste"),
        municipality(4106902, "Curitiba", "PR", "Sul"),
        municipality(4302006, "Bom Jesus", "RS", "Sul"),
        municipality(2201804, "Bom Jesus", "PI", "Nordeste"),
        municipality(5300108, "Brasília", "DF", "Centro-Oeste"),
    ];
    save_cache(&root.join("storage/cache_municipios.json"), &raw).unwrap();
}

/// A project whose registry URL is unreachable, so only the cache can serve.
fn offline_project(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.registry.url = "http://127.0.0.1:9/municipios".to_string();
    config.registry.timeout_secs = 2;
    config.registry.connect_timeout_secs = 1;
    save_config(dir.path(), &config).unwrap();
    config
}

const INPUT: &str = "municipio,populacao
Sao Paulo,12325000
campinas,1213792
Rio de Janiero,6747815
Curitba,1963726
Bom Jesus,23000
Cidade Inexistente,1000
";

#[test]
fn test_full_run_with_cached_registry() {
    let dir = TempDir::new().unwrap();
    offline_project(&dir);
    seed_registry(dir.path());
    fs::write(dir.path().join("storage/input.csv"), INPUT).unwrap();

    let pipeline = Pipeline::open(dir.path()).unwrap();
    let summary = pipeline.run(&RunOptions::default()).unwrap();

    assert!(summary.registry_available);
    assert_eq!(summary.output_path, dir.path().join("storage/resultado.csv"));

    let statuses: Vec<RowStatus> = summary.rows.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            RowStatus::Ok,
            RowStatus::Ok,
            RowStatus::Ok,
            RowStatus::Ok,
            RowStatus::Ambiguous,
            RowStatus::NotFound,
        ]
    );
    assert_eq!(summary.rows[2].registry_name, "Rio de Janeiro");
    assert_eq!(summary.rows[3].registry_id, "4106902");

    let stats = &summary.stats;
    assert_eq!(stats.total_municipios, 6);
    assert_eq!(stats.total_ok, 4);
    assert_eq!(stats.total_nao_encontrado, 2);
    assert_eq!(stats.total_erro_api, 0);
    assert_eq!(stats.pop_total_ok, 12_325_000 + 1_213_792 + 6_747_815 + 1_963_726);
    assert_eq!(stats.medias_por_regiao["Sul"], 1_963_726.0);
    assert_eq!(stats.medias_por_regiao["Sudeste"], 6_762_202.33);

    let written = fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(written.lines().count(), 7);
    assert!(written.contains("Bom Jesus,23000,Bom Jesus,RS,Sul,4302006,AMBIGUO"));
    assert!(written.contains("Cidade Inexistente,1000,,,,,NAO_ENCONTRADO"));
}

#[test]
fn test_run_without_registry_reports_api_errors() {
    let dir = TempDir::new().unwrap();
    offline_project(&dir);
    fs::create_dir_all(dir.path().join("storage")).unwrap();
    fs::write(dir.path().join("storage/input.csv"), INPUT).unwrap();

    let pipeline = Pipeline::open(dir.path()).unwrap();
    let summary = pipeline.run(&RunOptions::default()).unwrap();

    assert!(!summary.registry_available);
    assert!(summary.rows.iter().all(|r| r.status == RowStatus::ApiError));
    assert_eq!(summary.stats.total_erro_api, 6);
    assert_eq!(summary.stats.total_ok, 0);
    assert_eq!(summary.stats.pop_total_ok, 0);
}

#[test]
fn test_run_with_explicit_paths_and_policy() {
    let dir = TempDir::new().unwrap();
    let mut config = offline_project(&dir);
    config.matching.priority_region = Some("PI".to_string());
    seed_registry(dir.path());

    let input = dir.path().join("custom.csv");
    let output = dir.path().join("nested/out.csv");
    fs::write(&input, "municipio,populacao\nBom Jesus,23000\n").unwrap();

    let pipeline = Pipeline::new(dir.path(), config);
    let summary = pipeline
        .run(&RunOptions {
            input: Some(input),
            output: Some(output.clone()),
            refresh: false,
        })
        .unwrap();

    assert_eq!(summary.output_path, output);
    assert!(output.exists());
    assert_eq!(summary.rows[0].status, RowStatus::Ok);
    assert_eq!(summary.rows[0].region_code, "PI");
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    offline_project(&dir);
    let pipeline = Pipeline::open(dir.path()).unwrap();
    assert!(pipeline.run(&RunOptions::default()).is_err());
}

#[test]
fn test_resolve_names() {
    let dir = TempDir::new().unwrap();
    offline_project(&dir);
    seed_registry(dir.path());

    let pipeline = Pipeline::open(dir.path()).unwrap();
    let names = vec![
        "Brasilia".to_string(),
        "Sao Paolo".to_string(),
        "Bom Jesus".to_string(),
        "Atlantida".to_string(),
    ];
    let results = pipeline.resolve_names(&names, false).unwrap();

    assert_eq!(results[0].key, "brasilia");
    assert_eq!(results[0].method, Some(MatchMethod::Exact));
    assert_eq!(results[1].method, Some(MatchMethod::Fuzzy { distance: 1 }));
    assert_eq!(results[1].entry.as_ref().map(|e| e.id), Some(3550308));
    assert_eq!(results[2].status, ResolutionStatus::Ambiguous);
    assert_eq!(results[3].status, ResolutionStatus::Unresolved);
    assert!(results[3].entry.is_none());
}

#[test]
fn test_resolve_names_needs_registry() {
    let dir = TempDir::new().unwrap();
    offline_project(&dir);
    let pipeline = Pipeline::open(dir.path()).unwrap();
    assert!(pipeline.resolve_names(&["Campinas".to_string()], false).is_err());
    assert!(pipeline.refresh_registry().is_err());
}
