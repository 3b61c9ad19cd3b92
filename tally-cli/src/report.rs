use rust_decimal::Decimal;
use std::fmt::Write;
use tally_finance::Report;

/// Per-category totals with their share of deposits or debits, then warnings
pub fn render(report: &Report) -> String {
    let p = &report.portions;
    let mut out = String::new();

    for t in &p.totals {
        let pct = (p.share(t) * Decimal::ONE_HUNDRED).round_dp(2);
        let _ = writeln!(out, "{}:\n{:>10.2} -- {:.2}%", t.category, t.amount, pct);
    }
    let _ = writeln!(out, "\nDeposits: {:.2}", p.deposit_total);
    let _ = writeln!(out, "Debits:   {:.2}", p.debit_total);

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings ({}):", report.warnings.len());
        for w in &report.warnings {
            let _ = writeln!(out, "- {w}");
        }
    }
    out
}
