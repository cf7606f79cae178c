pub mod input;
pub mod openai;
pub mod provider;
