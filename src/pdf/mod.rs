mod writer;

pub use writer::{build_pdf, PageImage, PageSize};
