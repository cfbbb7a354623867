pub mod loader;
pub mod parser;
pub mod profile;

pub use loader::{LocaleLoader, LocaleLoaderBuilder};
pub use parser::LocaleParser;
pub use profile::{LocaleDirective, LocaleProfile, parse_directive};
