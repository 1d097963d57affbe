use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::currency::currency_symbol;
use super::payload::{sum_amount, StatementPayload};

/// Client identity shown in the statement header.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientView {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub currency: String,
}

/// Stored invoice with its two statement tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvoiceRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    /// Overrides the client's currency for this invoice.
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub t1: Option<StatementPayload>,
    #[serde(default)]
    pub t2: Option<StatementPayload>,
}

impl InvoiceRecord {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

/// Contents of a statement data file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatementData {
    #[serde(default)]
    pub client: ClientView,
    #[serde(default)]
    pub invoices: Vec<InvoiceRecord>,
}

/// Renderable summary of one invoice. Totals are fixed at construction;
/// the balance is always `s1 - s2`.
#[derive(Debug, Clone)]
pub struct InvoiceView {
    pub id: String,
    pub name: String,
    pub date: String,
    pub sym: String,
    /// Operations table.
    pub t1: StatementPayload,
    /// Receipts table.
    pub t2: StatementPayload,
    pub s1: f64,
    pub s2: f64,
    bal: f64,
}

impl InvoiceView {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date: impl Into<String>,
        sym: impl Into<String>,
        t1: StatementPayload,
        t2: StatementPayload,
        s1: f64,
        s2: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date: date.into(),
            sym: sym.into(),
            t1,
            t2,
            s1,
            s2,
            bal: s1 - s2,
        }
    }

    /// Builds the view from a stored invoice, summing both tables.
    pub fn from_record(record: &InvoiceRecord, client: &ClientView) -> Self {
        let code = record
            .currency
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&client.currency);
        let s1 = sum_amount(record.t1.as_ref());
        let s2 = sum_amount(record.t2.as_ref());
        Self::new(
            record.id.clone(),
            record.name.clone(),
            record.date.clone(),
            currency_symbol(code),
            record.t1.clone().unwrap_or_default(),
            record.t2.clone().unwrap_or_default(),
            s1,
            s2,
        )
    }

    pub fn bal(&self) -> f64 {
        self.bal
    }
}
