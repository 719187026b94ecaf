//! Document ingestion: PDF extraction and chunking

mod chunker;
mod parser;

pub use chunker::TextChunker;
pub use parser::PdfExtractor;

#[cfg(test)]
pub(crate) use parser::tests::build_pdf as build_test_pdf;
