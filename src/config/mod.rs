//! Configuration module

mod site;

pub use site::GeneratorConfig;
pub use site::PublishConfig;
pub use site::PublishMode;
pub use site::SiteConfig;
