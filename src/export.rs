//! CSV export of bill line items and per-person shares.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::billing::bill::BillBreakdown;
use crate::billing::split::Share;

/// Header row of the bill line-item CSV.
pub const BILL_CSV_HEADER: &[&str] = &["item", "amount"];

/// Header row of the split allocation CSV.
pub const SPLIT_CSV_HEADER: &[&str] = &["participant", "amount"];

/// Writes the bill breakdown as `item,amount` rows.
pub fn write_bill_csv<W: Write>(writer: W, bill: &BillBreakdown) -> csv::Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(BILL_CSV_HEADER)?;
    let lines: [(&str, f64); 9] = [
        ("kwh", bill.kwh),
        ("energy", bill.energy),
        ("ft", bill.ft),
        ("service", bill.service),
        ("pre_vat", bill.pre_vat),
        ("vat", bill.vat),
        ("after_vat", bill.after_vat),
        ("discount", bill.discount),
        ("total", bill.total),
    ];
    for (item, amount) in lines {
        let amount = format!("{amount:.2}");
        w.write_record([item, amount.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Writes per-person shares as `participant,amount` rows.
pub fn write_split_csv<W: Write>(writer: W, shares: &[Share]) -> csv::Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(SPLIT_CSV_HEADER)?;
    for share in shares {
        let amount = format!("{:.2}", share.amount);
        w.write_record([share.name.as_str(), amount.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Writes the bill breakdown CSV to `path`.
pub fn write_bill_to_path(path: &Path, bill: &BillBreakdown) -> csv::Result<()> {
    let file = File::create(path)?;
    write_bill_csv(file, bill)
}

/// Writes the split allocation CSV to `path`.
pub fn write_split_to_path(path: &Path, shares: &[Share]) -> csv::Result<()> {
    let file = File::create(path)?;
    write_split_csv(file, shares)
}
