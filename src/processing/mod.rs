//! Matching pipeline: keywords, embeddings, scoring, gaps and recommendations

pub mod analyzer;
pub mod embedding_manager;
pub mod embeddings;
pub mod recommendations;
pub mod similarity;
pub mod skill_gap;
pub mod text_processor;
