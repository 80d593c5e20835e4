pub mod assistant;
pub mod context;
pub mod errors;
pub mod models;
pub mod prompt;
pub mod prompt_template;
pub mod providers;
pub mod tools;
