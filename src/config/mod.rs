//! Configuration module

mod site;

pub use site::AuthorConfig;
pub use site::CollectionConfig;
pub use site::CollectionsConfig;
pub use site::FeedConfig;
pub use site::HighlightConfig;
pub use site::MarkdownConfig;
pub use site::SiteConfig;
pub use site::SitemapConfig;
pub use site::SocialConfig;
