//! Article integration for newscast
//!
//! Follows links found in newsletters: [`LinkSelector`] picks which URLs are
//! worth fetching and [`ArticleClient`] downloads them and reduces each page
//! to a title plus readable text.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_articles::{ArticleClient, ArticleConfig};
//!
//! let client = ArticleClient::new(ArticleConfig::default())?;
//! for url in client.candidate_links(&newsletter_html) {
//!     let article = client.fetch(&url).await?;
//!     println!("{} ({} words)", article.title, article.word_count);
//! }
//! ```

mod client;
mod config;
mod error;
mod links;
mod models;
mod readable;

pub use client::ArticleClient;
pub use config::ArticleConfig;
pub use error::ArticleError;
pub use links::{LinkSelector, extract_links};
pub use models::FetchedArticle;
pub use readable::{Readable, extract_readable};
