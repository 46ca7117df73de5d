pub mod assess_llm;
pub mod db;
pub mod documents;
pub mod ocr;

pub use assess_llm::OpenAiAssessAdapter;
pub use db::DbAdapter;
pub use ocr::HttpOcrAdapter;
