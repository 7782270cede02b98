pub mod parser;
pub mod techniques;
pub mod template;

pub use techniques::{Technique, TechniqueDemo};
