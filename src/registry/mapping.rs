use serde_json::Value;

use crate::types::RegistryEntry;

/// Converts raw IBGE municipality objects into registry entries.
///
/// Items without an `id` or `nome` are skipped; this is the only validation
/// entries get before reaching the index. The state is read from
/// `microrregiao.mesorregiao.UF`, falling back to
/// `regiao-imediata.regiao-intermediaria.UF` for municipalities whose
/// micro-region is null. Missing state data yields empty strings.
pub fn map_municipalities(raw: &[Value]) -> Vec<RegistryEntry> {
    raw.iter().filter_map(map_municipality).collect()
}

fn map_municipality(item: &Value) -> Option<RegistryEntry> {
    let id = parse_id(item.get("id")?)?;
    let name = item.get("nome")?.as_str()?;

    let uf = state_of(item);
    let region_code = uf
        .and_then(|uf| uf.pointer("/sigla"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let region_name = uf
        .and_then(|uf| uf.pointer("/regiao/nome"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(RegistryEntry::new(id, name, region_code, region_name))
}

/// Accepts numeric ids and numeric strings.
fn parse_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn state_of(item: &Value) -> Option<&Value> {
    item.pointer("/microrregiao/mesorregiao/UF")
        .filter(|v| v.is_object())
        .or_else(|| {
            item.pointer("/regiao-imediata/regiao-intermediaria/UF")
                .filter(|v| v.is_object())
        })
}
