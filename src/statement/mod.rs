mod generator;
mod summary;

pub use generator::{
    build_statement_pdf, display_client, generate_statement, invoice_views, load_statement_data,
    output_file_name, range_text, DateRange, GenerateRequest, GeneratedStatement, RenderOptions,
    RenderedStatement,
};
pub use summary::{summarize, InvoiceSummary, StatementSummary};
