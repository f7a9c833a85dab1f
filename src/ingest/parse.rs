//! Spreadsheet and CSV row parsing plus the merge into the statistics
//! document.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ApiError;

use super::stats::StatsDocument;

/// One parsed spreadsheet/CSV row: column name to raw cell text.
pub type Row = BTreeMap<String, String>;

/// Logical statistics field to the column spellings that feed it.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    (
        "total_membros",
        &["total_membros", "membros_total", "total_members"],
    ),
    (
        "membros_ativos",
        &["membros_ativos", "membros_activos", "active_members"],
    ),
    (
        "receita_mensal",
        &["receita_mensal", "receita_mes", "monthly_revenue"],
    ),
    (
        "aulas_realizadas",
        &["aulas_realizadas", "aulas_mes", "classes_month"],
    ),
    (
        "instrutores_ativos",
        &["instrutores_ativos", "instrutores", "instructors"],
    ),
];

/// Upload formats accepted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Workbook,
}

impl UploadFormat {
    /// Classify by file extension, case-insensitive. Anything outside the
    /// whitelist is rejected before a single byte is parsed.
    pub fn from_filename(filename: &str) -> Result<Self, ApiError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(UploadFormat::Csv),
            "xlsx" | "xls" => Ok(UploadFormat::Workbook),
            _ => Err(ApiError::UnsupportedFormat(
                "Apenas arquivos Excel (.xlsx, .xls) e CSV (.csv) são permitidos!".into(),
            )),
        }
    }
}

/// Parse an uploaded file into rows.
pub fn parse_rows(format: UploadFormat, data: &[u8]) -> Result<Vec<Row>, ApiError> {
    match format {
        UploadFormat::Csv => parse_csv(data),
        UploadFormat::Workbook => parse_workbook(data),
    }
}

fn parse_csv(data: &[u8]) -> Result<Vec<Row>, ApiError> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader
        .headers()
        .map_err(|e| processing_error("CSV", &e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| processing_error("CSV", &e))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.trim().to_string(), cell.trim().to_string()))
            .collect();
        rows.push(row);
    }

    debug!(rows = rows.len(), "parsed CSV upload");
    Ok(rows)
}

fn parse_workbook(data: &[u8]) -> Result<Vec<Row>, ApiError> {
    let cursor = Cursor::new(data.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| processing_error("Excel", &e))?;

    // First worksheet, first row as header, like the legacy importer.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApiError::Processing("Erro ao processar arquivo Excel".into()))?
        .map_err(|e| processing_error("Excel", &e))?;

    let mut cells = range.rows();
    let Some(header_row) = cells.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let rows: Vec<Row> = cells
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.clone(), cell.to_string().trim().to_string()))
                .collect()
        })
        .collect();

    debug!(rows = rows.len(), "parsed workbook upload");
    Ok(rows)
}

fn processing_error(kind: &str, cause: &dyn std::fmt::Display) -> ApiError {
    warn!(%cause, "failed to parse {kind} upload");
    ApiError::Processing(format!("Erro ao processar arquivo {kind}"))
}

/// Merge parsed rows into the document: alias-mapped statistics fields,
/// member age-bracket tallies and per-class counters. Non-conforming cells
/// are skipped silently.
pub fn merge_rows(doc: &mut StatsDocument, rows: &[Row]) {
    for row in rows {
        for (field, aliases) in FIELD_ALIASES {
            for alias in *aliases {
                let Some(raw) = row.get(*alias).filter(|raw| !raw.is_empty()) else {
                    continue;
                };
                if let Some(value) = parse_number(raw) {
                    doc.estatisticas
                        .insert((*field).to_string(), number_value(value));
                }
            }
        }

        let kind = row
            .get("tipo")
            .or_else(|| row.get("type"))
            .map(String::as_str);

        if matches!(kind, Some("membro") | Some("member")) {
            let bracket = row
                .get("faixa_etaria")
                .or_else(|| row.get("age_range"))
                .filter(|raw| !raw.is_empty());
            if let Some(bracket) = bracket {
                *doc.membros
                    .por_faixa_etaria
                    .entry(bracket.clone())
                    .or_insert(0) += 1;
            }
        }

        if matches!(kind, Some("aula") | Some("class")) {
            let class = row
                .get("aula")
                .or_else(|| row.get("class"))
                .filter(|raw| !raw.is_empty())
                .map(String::as_str)
                .unwrap_or("musculacao");
            doc.aulas.entry(class.to_string()).or_default().total += 1;
        }
    }
}

/// Tolerant numeric parse: float first, then integer. Only finite values
/// are applied.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    trimmed.parse::<i64>().ok().map(|value| value as f64)
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn format_whitelist_rejects_before_parsing() {
        assert_eq!(
            UploadFormat::from_filename("dados.csv").unwrap(),
            UploadFormat::Csv
        );
        assert_eq!(
            UploadFormat::from_filename("Planilha.XLSX").unwrap(),
            UploadFormat::Workbook
        );
        assert_eq!(
            UploadFormat::from_filename("antigo.xls").unwrap(),
            UploadFormat::Workbook
        );
        assert!(UploadFormat::from_filename("notas.txt").is_err());
        assert!(UploadFormat::from_filename("sem_extensao").is_err());
    }

    #[test]
    fn member_row_updates_total_and_age_bracket() {
        let mut doc = StatsDocument::default();
        merge_rows(
            &mut doc,
            &[row(&[
                ("total_membros", "120"),
                ("tipo", "membro"),
                ("faixa_etaria", "26-35"),
            ])],
        );

        assert_eq!(doc.estatisticas["total_membros"], 120);
        assert_eq!(doc.membros.por_faixa_etaria["26-35"], 1);
    }

    #[test]
    fn every_alias_feeds_the_same_field() {
        for alias in ["total_membros", "membros_total", "total_members"] {
            let mut doc = StatsDocument::default();
            merge_rows(&mut doc, &[row(&[(alias, "88")])]);
            assert_eq!(doc.estatisticas["total_membros"], 88, "alias {alias}");
        }
    }

    #[test]
    fn class_rows_count_per_class_type() {
        let mut doc = StatsDocument::default();
        merge_rows(
            &mut doc,
            &[
                row(&[("tipo", "aula"), ("aula", "spinning")]),
                row(&[("tipo", "aula"), ("aula", "spinning")]),
                row(&[("type", "class")]),
            ],
        );

        assert_eq!(doc.aulas["spinning"].total, 2);
        assert_eq!(doc.aulas["musculacao"].total, 1);
    }

    #[test]
    fn non_numeric_cells_are_skipped_silently() {
        let mut doc = StatsDocument::default();
        merge_rows(
            &mut doc,
            &[row(&[
                ("total_membros", "muitos"),
                ("receita_mensal", "15750.50"),
                ("membros_ativos", ""),
            ])],
        );

        assert!(!doc.estatisticas.contains_key("total_membros"));
        assert!(!doc.estatisticas.contains_key("membros_ativos"));
        assert_eq!(doc.estatisticas["receita_mensal"], 15750.5);
    }

    #[test]
    fn tolerant_parse_accepts_floats_and_integers_only() {
        assert_eq!(parse_number("120"), Some(120.0));
        assert_eq!(parse_number(" 15750.50 "), Some(15750.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn csv_parsing_produces_header_keyed_rows() {
        let data = b"total_membros,tipo,faixa_etaria\n120,membro,26-35\n,aula,\n";
        let rows = parse_csv(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["total_membros"], "120");
        assert_eq!(rows[0]["faixa_etaria"], "26-35");
        assert_eq!(rows[1]["tipo"], "aula");
        assert_eq!(rows[1]["total_membros"], "");
    }

    #[test]
    fn csv_upload_end_to_end_merge() {
        let data = b"total_membros,tipo,faixa_etaria\n120,membro,26-35\n";
        let rows = parse_csv(data).unwrap();

        let mut doc = StatsDocument::default();
        merge_rows(&mut doc, &rows);
        assert_eq!(doc.estatisticas["total_membros"], 120);
        assert_eq!(doc.membros.por_faixa_etaria["26-35"], 1);
    }
}
