pub mod category;
pub mod document;
