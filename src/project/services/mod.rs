//! Application services for project configuration.

mod resolver;
mod validation;

pub use resolver::{ConfigResolutionError, ConfigResolver, ResolvedConfig};
pub use validation::SyntaxValidator;
