use crate::core::analytics::{self, HistoryRow};
use crate::core::currency::DisplayConverter;
use crate::core::history::{Period, filter_by_period};
use crate::core::ledger::{Metal, TransactionKind};
use crate::core::store::LedgerStore;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// One exported line; money columns are in the display currency.
#[derive(Serialize)]
struct ExportRow<'a> {
    date: &'a str,
    #[serde(rename = "type")]
    kind: TransactionKind,
    weight_g: String,
    price_per_gram: String,
    amount: String,
    current_value: String,
    currency: &'a str,
}

pub fn default_file_name(metal: Metal) -> PathBuf {
    PathBuf::from(format!("{metal}-transaction-history.csv"))
}

pub fn write_rows<W: io::Write>(
    writer: W,
    rows: &[HistoryRow],
    converter: &DisplayConverter,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(ExportRow {
            date: &row.date,
            kind: row.kind,
            weight_g: format!("{:.2}", row.weight),
            price_per_gram: format!("{:.2}", converter.convert(row.price_per_gram)),
            amount: format!("{:.2}", converter.convert(row.amount)),
            current_value: format!("{:.2}", converter.convert(row.current_value)),
            currency: &converter.code,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the `metal` history within `period` to `output`, or to
/// `<metal>-transaction-history.csv` in the working directory.
pub fn run(
    store: &LedgerStore,
    converter: &DisplayConverter,
    metal: Metal,
    period: Period,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let path = output.map_or_else(|| default_file_name(metal), Path::to_path_buf);
    let account = store.account(metal);
    let selected = filter_by_period(account, period, Utc::now())
        .with_context(|| format!("Failed to filter {metal} history"))?;
    let rows = analytics::history_rows(account, selected)?;

    let file = File::create(&path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_rows(file, &rows, converter)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    info!(%metal, rows = rows.len(), path = %path.display(), "Exported history");
    println!("Exported {} {metal} transaction(s) to {}", rows.len(), path.display());
    Ok(path)
}
