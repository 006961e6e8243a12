pub mod db;
pub mod identity;
pub mod image_edit;
pub mod image_gen;
pub mod media_storage;
pub mod pdf;
pub mod text_llm;

pub use db::DbAdapter;
pub use identity::HttpIdentityAdapter;
pub use image_edit::OpenAiImageEditAdapter;
pub use image_gen::OpenAiImageAdapter;
pub use media_storage::HttpMediaStorageAdapter;
pub use pdf::PdfExtractAdapter;
pub use text_llm::OpenAiTextAdapter;
