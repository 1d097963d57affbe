pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod raster;
pub mod statement;

pub use config::Config;
pub use error::{Result, StatementError};
pub use layout::{render_statement, PageGeometry, StatementHeader};
pub use model::{ClientView, InvoiceView, StatementPayload};
pub use pdf::{build_pdf, PageImage, PageSize};
pub use statement::{generate_statement, GenerateRequest};
