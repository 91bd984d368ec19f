use std::fs;

use ibgematch::csv_io::*;
use ibgematch::report::*;
use ibgematch::resolution::{MatchMethod, ResolutionOutcome};
use ibgematch::types::*;
use tempfile::TempDir;

fn input(name: &str, population: i64) -> InputRow {
    InputRow {
        name: name.to_string(),
        population,
    }
}

fn row(status: RowStatus, population: i64, region: &str) -> ReportRow {
    ReportRow {
        input_name: "x".to_string(),
        input_population: population,
        registry_name: String::new(),
        region_code: String::new(),
        region_name: region.to_string(),
        registry_id: String::new(),
        status,
    }
}

#[test]
fn test_row_status_labels() {
    for status in [
        RowStatus::Ok,
        RowStatus::Ambiguous,
        RowStatus::NotFound,
        RowStatus::ApiError,
    ] {
        assert_eq!(RowStatus::from_str(status.as_str()), Some(status));
    }
    assert_eq!(RowStatus::Ambiguous.as_str(), "AMBIGUO");
    assert!(RowStatus::from_str("ok").is_none());
}

#[test]
fn test_report_row_for_each_outcome() {
    let sp = RegistryEntry::new(3550308, "São Paulo", "SP", "Sudeste");
    let rs = RegistryEntry::new(4302006, "Bom Jesus", "RS", "Sul");

    let resolved = report_row(
        &input("Sao Paulo", 12_000_000),
        &ResolutionOutcome::Resolved {
            entry: &sp,
            method: MatchMethod::Exact,
        },
    );
    assert_eq!(resolved.status, RowStatus::Ok);
    assert_eq!(resolved.registry_name, "São Paulo");
    assert_eq!(resolved.registry_id, "3550308");
    assert_eq!(resolved.region_code, "SP");
    assert_eq!(resolved.input_population, 12_000_000);

    let ambiguous = report_row(
        &input("Bom Jesus", 10),
        &ResolutionOutcome::Ambiguous {
            representative: &rs,
            candidates: 2,
        },
    );
    assert_eq!(ambiguous.status, RowStatus::Ambiguous);
    assert_eq!(ambiguous.registry_id, "4302006");

    let missing = report_row(&input("Nowhere", 5), &ResolutionOutcome::Unresolved);
    assert_eq!(missing.status, RowStatus::NotFound);
    assert!(missing.registry_name.is_empty());
    assert!(missing.registry_id.is_empty());

    let unavailable = unavailable_row(&input("Campinas", 7));
    assert_eq!(unavailable.status, RowStatus::ApiError);
    assert_eq!(unavailable.input_name, "Campinas");
}

#[test]
fn test_compute_stats() {
    let rows = vec![
        row(RowStatus::Ok, 100, "Sudeste"),
        row(RowStatus::Ok, 201, "Sudeste"),
        row(RowStatus::Ok, 50, "Sul"),
        row(RowStatus::Ok, 1000, ""),
        row(RowStatus::Ambiguous, 9, "Sul"),
        row(RowStatus::NotFound, 9, ""),
        row(RowStatus::ApiError, 9, ""),
    ];

    let stats = compute_stats(&rows);
    assert_eq!(stats.total_municipios, 7);
    assert_eq!(stats.total_ok, 4);
    assert_eq!(stats.total_nao_encontrado, 2);
    assert_eq!(stats.total_erro_api, 1);
    assert_eq!(stats.pop_total_ok, 1351);
    assert_eq!(stats.medias_por_regiao.len(), 2);
    assert_eq!(stats.medias_por_regiao["Sudeste"], 150.5);
    assert_eq!(stats.medias_por_regiao["Sul"], 50.0);
}

#[test]
fn test_compute_stats_rounds_means() {
    let rows = vec![
        row(RowStatus::Ok, 1, "Norte"),
        row(RowStatus::Ok, 1, "Norte"),
        row(RowStatus::Ok, 2, "Norte"),
    ];
    let stats = compute_stats(&rows);
    assert_eq!(stats.medias_por_regiao["Norte"], 1.33);
}

#[test]
fn test_compute_stats_large_populations_do_not_overflow() {
    let rows = vec![
        row(RowStatus::Ok, i64::MAX, "Norte"),
        row(RowStatus::Ok, 1, "Norte"),
    ];
    let stats = compute_stats(&rows);
    assert_eq!(stats.total_ok, 2);
    assert_eq!(stats.pop_total_ok, i64::MAX);
    assert_eq!(stats.medias_por_regiao["Norte"], 4_611_686_018_427_387_904.0);
}

#[test]
fn test_compute_stats_empty() {
    let stats = compute_stats(&[]);
    assert_eq!(stats.total_municipios, 0);
    assert!(stats.medias_por_regiao.is_empty());

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["medias_por_regiao"], serde_json::json!({}));
}

#[test]
fn test_parse_population() {
    assert_eq!(parse_population("1234"), 1234);
    assert_eq!(parse_population(" 1234 "), 1234);
    assert_eq!(parse_population("1234.7"), 1234);
    assert_eq!(parse_population("-5"), -5);
    assert_eq!(parse_population("abc"), 0);
    assert_eq!(parse_population(""), 0);
}

#[test]
fn test_read_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(
        &path,
        "municipio,populacao\nSão Paulo,12325000\n\"Santa Bárbara d'Oeste, SP\",194390\nonly-one-column\nCampinas, 1213792 \n",
    )
    .unwrap();

    let rows = read_input(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            input("São Paulo", 12_325_000),
            input("Santa Bárbara d'Oeste, SP", 194_390),
            input("Campinas", 1_213_792),
        ]
    );
}

#[test]
fn test_read_input_latin1_is_decoded_lossily() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(
        &path,
        b"municipio,populacao\nCampinas,1213792\nS\xe3o Paulo,200\nCuritiba,10\n",
    )
    .unwrap();

    let rows = read_input(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            input("Campinas", 1_213_792),
            input("S\u{FFFD}o Paulo", 200),
            input("Curitiba", 10),
        ]
    );
}

#[test]
fn test_read_input_errors() {
    let dir = TempDir::new().unwrap();

    let missing = read_input(&dir.path().join("missing.csv")).unwrap_err();
    assert!(missing.to_string().contains("input CSV not found"));

    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "").unwrap();
    let err = read_input(&empty).unwrap_err();
    assert!(err.to_string().contains("no header"));
}

#[test]
fn test_header_only_input_has_no_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(&path, "municipio,populacao\n").unwrap();
    assert!(read_input(&path).unwrap().is_empty());
}

#[test]
fn test_write_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out/resultado.csv");
    let rows = vec![
        ReportRow {
            input_name: "Sao Paulo".to_string(),
            input_population: 12_325_000,
            registry_name: "São Paulo".to_string(),
            region_code: "SP".to_string(),
            region_name: "Sudeste".to_string(),
            registry_id: "3550308".to_string(),
            status: RowStatus::Ok,
        },
        unavailable_row(&input("Rio, RJ", 1)),
    ];

    write_output(&path, &rows).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            "municipio_input,populacao_input,municipio_ibge,uf,regiao,id_ibge,status",
            "Sao Paulo,12325000,São Paulo,SP,Sudeste,3550308,OK",
            "\"Rio, RJ\",1,,,,,ERRO_API",
        ]
    );
}
