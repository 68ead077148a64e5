pub mod site;

pub use site::SiteConfig;
