use crate::ports::{Queue, TerminalConfig};

use super::row::ArrivalsRow;
use super::splits::{ApiActualSplit, QueueCounts};

pub const BASE_HEADERS: [&str; 26] = [
    "IATA",
    "ICAO",
    "Origin",
    "Gate/Stand",
    "Status",
    "Scheduled Date",
    "Scheduled Time",
    "Est Arrival",
    "Act Arrival",
    "Est Chox",
    "Act Chox",
    "Est PCP",
    "Total Pax",
    "PCP Pax",
    "API e-Gates",
    "API EEA",
    "API Non-EEA",
    "API Fast Track",
    "Historical e-Gates",
    "Historical EEA",
    "Historical Non-EEA",
    "Historical Fast Track",
    "Terminal Average e-Gates",
    "Terminal Average EEA",
    "Terminal Average Non-EEA",
    "Terminal Average Fast Track",
];

/// Appended only for callers holding `api:view`; absent callers get a
/// narrower schema, not blanked cells.
pub const API_ACTUAL_HEADERS: [&str; 6] = [
    "API Actual - B5JSSK to Desk",
    "API Actual - B5JSSK to eGates",
    "API Actual - EEA (Machine Readable)",
    "API Actual - Non EEA (Non Visa)",
    "API Actual - Non EEA (Visa)",
    "API Actual - eGates",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write arrivals CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("arrivals CSV was not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Serializes rows to CSV text, header first, no trailing newline.
pub fn render_csv(
    rows: &[ArrivalsRow],
    terminal: &TerminalConfig,
    include_api_actual: bool,
) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    let mut header: Vec<&str> = BASE_HEADERS.to_vec();
    if include_api_actual {
        header.extend(API_ACTUAL_HEADERS);
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut fields = base_fields(row, terminal);
        if include_api_actual {
            fields.extend(api_actual_fields(row.splits.api_actual.as_ref()));
        }
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    let mut body = String::from_utf8(bytes)?;
    while body.ends_with('\n') || body.ends_with('\r') {
        body.pop();
    }
    Ok(body)
}

fn base_fields(row: &ArrivalsRow, terminal: &TerminalConfig) -> Vec<String> {
    let mut fields = vec![
        row.code_iata.clone(),
        row.code_icao.clone(),
        row.origin.clone(),
        row.gate_stand.clone(),
        row.status.clone(),
        row.scheduled_date.clone(),
        row.scheduled_time.clone(),
        row.est_arrival.clone(),
        row.act_arrival.clone(),
        row.est_chocks.clone(),
        row.act_chocks.clone(),
        row.est_pcp.clone(),
        opt_count(row.total_pax),
        opt_count(row.pcp_pax),
    ];
    fields.extend(tier_fields(row.splits.api.as_ref(), terminal));
    fields.extend(tier_fields(row.splits.historical.as_ref(), terminal));
    fields.extend(tier_fields(row.splits.terminal_average.as_ref(), terminal));
    fields
}

fn opt_count(value: Option<u32>) -> String {
    value.map(|count| count.to_string()).unwrap_or_default()
}

/// A missing tier is four empty cells; a present tier still leaves queues
/// the terminal does not operate empty.
fn tier_fields(tier: Option<&QueueCounts>, terminal: &TerminalConfig) -> Vec<String> {
    Queue::ordered()
        .into_iter()
        .map(|queue| match tier {
            Some(counts) if terminal.has_queue(queue) => counts.get(queue).to_string(),
            _ => String::new(),
        })
        .collect()
}

fn api_actual_fields(split: Option<&ApiActualSplit>) -> Vec<String> {
    match split {
        Some(split) => [
            split.b5jssk_to_desk,
            split.b5jssk_to_egates,
            split.eea_machine_readable,
            split.non_eea_non_visa,
            split.non_eea_visa,
            split.egates,
        ]
        .into_iter()
        .map(|value| format!("{value:.1}"))
        .collect(),
        None => vec![String::new(); API_ACTUAL_HEADERS.len()],
    }
}
