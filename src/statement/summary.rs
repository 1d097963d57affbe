use crate::layout::format_amount;
use crate::model::InvoiceView;

/// One invoice line of a client summary.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSummary {
    pub name: String,
    pub date: String,
    pub operations: String,
    pub receipts: String,
    pub balance: String,
}

/// Per-invoice totals plus the client's running balance.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementSummary {
    pub rows: Vec<InvoiceSummary>,
    pub balance: f64,
}

pub fn summarize(invoices: &[InvoiceView]) -> StatementSummary {
    let rows = invoices
        .iter()
        .map(|inv| InvoiceSummary {
            name: inv.name.clone(),
            date: inv.date.clone(),
            operations: format_amount(inv.s1, &inv.sym),
            receipts: format_amount(inv.s2, &inv.sym),
            balance: format_amount(inv.bal(), &inv.sym),
        })
        .collect();
    StatementSummary {
        rows,
        balance: invoices.iter().map(InvoiceView::bal).sum(),
    }
}
