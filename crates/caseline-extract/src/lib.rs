#![forbid(unsafe_code)]

//! Clients for the two remote collaborators of the pipeline: the OCR service
//! that turns photographed records into text, and the LLM that turns the
//! narrative into the structured case model. Both are thin blocking HTTP
//! wrappers; accuracy is the remote services' concern.

pub mod error;
pub mod llm;
pub mod ocr;

pub use error::{Error, Result};
pub use llm::ExtractionClient;
pub use ocr::OcrClient;
