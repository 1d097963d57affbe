mod currency;
mod payload;
mod view;

pub use currency::currency_symbol;
pub use payload::{sum_amount, Cell, StatementPayload};
pub use view::{ClientView, InvoiceRecord, InvoiceView, StatementData};
