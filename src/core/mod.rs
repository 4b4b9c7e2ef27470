pub mod bag;
pub mod classify;
pub mod cover;
pub mod generate;
pub mod pipeline;
pub mod postag;
pub mod template;
