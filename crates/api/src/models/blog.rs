//! Blog post record.

use serde::{Deserialize, Serialize};

use zinoshop_core::UserId;

/// A blog post. The read routes only serve published posts to the public;
/// admin callers see drafts too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    /// URL slug, unique across posts.
    pub slug: String,
    pub body: String,
    pub author_id: UserId,
    pub author_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published: bool,
}
