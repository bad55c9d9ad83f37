// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory blog post store.
//!
//! Posts live in a single lock-guarded sequence held in creation order.
//! Mutations (create, update, delete) take the write guard so id
//! assignment and removal never interleave; reads (list, search) take
//! the read guard and so never observe a half-applied mutation. Sorting
//! produces a new sequence without reordering the stored one.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned identifier, unique for the process lifetime
    pub id: u64,
    /// Post title, always non-empty
    pub title: String,
    /// Post body, always non-empty
    pub content: String,
}

/// Sortable post field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Content,
}

impl FromStr for SortField {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            other => Err(ApiError::InvalidSortField(other.to_string())),
        }
    }
}

/// Sort direction. Ascending unless the caller says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ApiError::InvalidDirection(other.to_string())),
        }
    }
}

/// Store state behind the lock: the ordered post sequence plus the id
/// counter. Ids are monotonic and never reused, even after deletes.
#[derive(Debug)]
struct Inner {
    posts: Vec<Post>,
    next_id: u64,
}

/// Thread-safe in-memory post store.
pub struct PostStore {
    inner: Arc<RwLock<Inner>>,
}

impl PostStore {
    /// Create an empty store. The first post gets id 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                posts: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Create a store pre-populated with the two demo posts the
    /// service ships with, ids 1 and 2.
    pub async fn with_demo_posts() -> Result<Self> {
        let store = Self::new();
        store
            .create(Some("First post"), Some("This is the first post."))
            .await?;
        store
            .create(Some("Second post"), Some("This is the second post."))
            .await?;
        Ok(store)
    }

    /// Create a post. Both fields are required and must be non-blank.
    pub async fn create(&self, title: Option<&str>, content: Option<&str>) -> Result<Post> {
        let title = require_field("title", title)?;
        let content = require_field("content", content)?;

        let mut inner = self.inner.write().await;
        let post = Post {
            id: inner.next_id,
            title,
            content,
        };
        inner.next_id += 1;
        inner.posts.push(post.clone());

        debug!(id = post.id, title = %post.title, "Post created");
        Ok(post)
    }

    /// List all posts, optionally sorted by a field.
    ///
    /// No sort field means creation order. The sort is lexicographic and
    /// stable, so posts with equal keys keep their creation order.
    pub async fn list_all(&self, sort: Option<SortField>, direction: Direction) -> Vec<Post> {
        let inner = self.inner.read().await;
        let mut posts = inner.posts.clone();

        if let Some(field) = sort {
            posts.sort_by(|a, b| {
                let ord = match field {
                    SortField::Title => a.title.cmp(&b.title),
                    SortField::Content => a.content.cmp(&b.content),
                };
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        posts
    }

    /// Look up a single post by id.
    pub async fn get(&self, id: u64) -> Option<Post> {
        let inner = self.inner.read().await;
        inner.posts.iter().find(|p| p.id == id).cloned()
    }

    /// Update a post in place. Omitted fields are left unchanged; a
    /// supplied field must be non-blank. The id is immutable.
    pub async fn update(
        &self,
        id: u64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post> {
        let mut inner = self.inner.write().await;
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::PostNotFound(id))?;

        // An unknown id is always NotFound, whatever the fields look
        // like. Validate after the lookup but before touching the post;
        // a rejected field must not leave a half-applied update behind
        let title = title.map(|t| require_field("title", Some(t))).transpose()?;
        let content = content
            .map(|c| require_field("content", Some(c)))
            .transpose()?;

        if let Some(title) = title {
            post.title = title;
        }
        if let Some(content) = content {
            post.content = content;
        }

        debug!(id, "Post updated");
        Ok(post.clone())
    }

    /// Delete a post. Permanent and immediate; the id is never reused.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let idx = inner
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(ApiError::PostNotFound(id))?;
        inner.posts.remove(idx);

        debug!(id, "Post deleted");
        Ok(())
    }

    /// Search posts by case-insensitive substring match on title and/or
    /// content. Provided queries are ANDed; blank queries count as
    /// unset, so no query at all returns every post in creation order.
    pub async fn search(&self, title: Option<&str>, content: Option<&str>) -> Vec<Post> {
        let title = title.filter(|q| !q.trim().is_empty()).map(str::to_lowercase);
        let content = content
            .filter(|q| !q.trim().is_empty())
            .map(str::to_lowercase);

        let inner = self.inner.read().await;
        inner
            .posts
            .iter()
            .filter(|p| match &title {
                Some(q) => p.title.to_lowercase().contains(q),
                None => true,
            })
            .filter(|p| match &content {
                Some(q) => p.content.to_lowercase().contains(q),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Number of posts currently stored.
    pub async fn count(&self) -> usize {
        self.inner.read().await.posts.len()
    }
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Require a field to be present and non-blank.
fn require_field(name: &'static str, value: Option<&str>) -> Result<String> {
    match value {
        None => Err(ApiError::MissingField(name)),
        Some(v) if v.trim().is_empty() => Err(ApiError::EmptyField(name)),
        Some(v) => Ok(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_fresh_ids() {
        let store = PostStore::new();

        let first = store.create(Some("Hello"), Some("World")).await.unwrap();
        let second = store.create(Some("Foo"), Some("Bar")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let posts = store.list_all(None, Direction::Asc).await;
        assert_eq!(posts, vec![first, second]);
    }

    #[tokio::test]
    async fn test_demo_posts_visible_in_first_list() {
        let store = PostStore::with_demo_posts().await.unwrap();

        let posts = store.list_all(None, Direction::Asc).await;
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 1);
        assert_eq!(posts[0].title, "First post");
        assert_eq!(posts[1].id, 2);
        assert_eq!(posts[1].title, "Second post");
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_delete() {
        let store = PostStore::new();

        let first = store.create(Some("a"), Some("b")).await.unwrap();
        store.delete(first.id).await.unwrap();

        let next = store.create(Some("c"), Some("d")).await.unwrap();
        assert_eq!(next.id, 2, "deleted id must not be handed out again");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_and_blank_fields() {
        let store = PostStore::new();

        assert_eq!(
            store.create(None, Some("body")).await,
            Err(ApiError::MissingField("title"))
        );
        assert_eq!(
            store.create(Some("title"), Some("   ")).await,
            Err(ApiError::EmptyField("content"))
        );
        assert_eq!(store.count().await, 0, "failed create must not grow the store");
    }

    #[tokio::test]
    async fn test_sort_by_title_both_directions() {
        let store = PostStore::new();
        store.create(Some("banana"), Some("1")).await.unwrap();
        store.create(Some("apple"), Some("2")).await.unwrap();
        store.create(Some("cherry"), Some("3")).await.unwrap();

        let asc = store
            .list_all(Some(SortField::Title), Direction::Asc)
            .await;
        let titles: Vec<&str> = asc.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["apple", "banana", "cherry"]);

        let desc = store
            .list_all(Some(SortField::Title), Direction::Desc)
            .await;
        let titles: Vec<&str> = desc.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["cherry", "banana", "apple"]);

        // Stored order is untouched by sorting
        let unsorted = store.list_all(None, Direction::Asc).await;
        let titles: Vec<&str> = unsorted.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["banana", "apple", "cherry"]);
    }

    #[tokio::test]
    async fn test_sort_is_stable_for_equal_keys() {
        let store = PostStore::new();
        let a = store.create(Some("same"), Some("first")).await.unwrap();
        let b = store.create(Some("same"), Some("second")).await.unwrap();

        let sorted = store
            .list_all(Some(SortField::Title), Direction::Desc)
            .await;
        assert_eq!(sorted[0].id, a.id);
        assert_eq!(sorted[1].id, b.id);
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let store = PostStore::new();
        let post = store.create(Some("old title"), Some("old body")).await.unwrap();

        let updated = store.update(post.id, Some("new title"), None).await.unwrap();
        assert_eq!(updated.id, post.id);
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.content, "old body");
    }

    #[tokio::test]
    async fn test_update_unknown_id_creates_nothing() {
        let store = PostStore::new();

        assert_eq!(
            store.update(99, Some("t"), Some("c")).await,
            Err(ApiError::PostNotFound(99))
        );
        // NotFound wins even when a supplied field is blank
        assert_eq!(
            store.update(99, Some(""), None).await,
            Err(ApiError::PostNotFound(99))
        );
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_field_without_mutating() {
        let store = PostStore::new();
        let post = store.create(Some("title"), Some("body")).await.unwrap();

        assert_eq!(
            store.update(post.id, Some(""), Some("new body")).await,
            Err(ApiError::EmptyField("title"))
        );
        assert_eq!(store.get(post.id).await.unwrap().content, "body");
    }

    #[tokio::test]
    async fn test_delete_twice_fails() {
        let store = PostStore::new();
        let post = store.create(Some("t"), Some("c")).await.unwrap();

        store.delete(post.id).await.unwrap();
        assert!(store.list_all(None, Direction::Asc).await.is_empty());
        assert_eq!(
            store.delete(post.id).await,
            Err(ApiError::PostNotFound(post.id))
        );
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let store = PostStore::new();
        store.create(Some("My Cat"), Some("purrs")).await.unwrap();
        store.create(Some("CATALOG"), Some("of items")).await.unwrap();
        store.create(Some("Dog"), Some("barks")).await.unwrap();

        let hits = store.search(Some("cat"), None).await;
        let titles: Vec<&str> = hits.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["My Cat", "CATALOG"]);
    }

    #[tokio::test]
    async fn test_search_queries_are_anded() {
        let store = PostStore::new();
        store.create(Some("cat"), Some("sleeps")).await.unwrap();
        store.create(Some("cat"), Some("plays")).await.unwrap();

        let hits = store.search(Some("cat"), Some("play")).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "plays");
    }

    #[tokio::test]
    async fn test_search_without_queries_returns_all() {
        let store = PostStore::new();
        store.create(Some("a"), Some("b")).await.unwrap();
        store.create(Some("c"), Some("d")).await.unwrap();

        assert_eq!(store.search(None, None).await.len(), 2);
        // Blank queries behave like unset ones
        assert_eq!(store.search(Some(""), Some("  ")).await.len(), 2);
    }

    #[tokio::test]
    async fn test_spec_scenario() {
        let store = PostStore::new();
        let hello = store.create(Some("Hello"), Some("World")).await.unwrap();
        let foo = store.create(Some("Foo"), Some("Bar")).await.unwrap();
        assert_eq!(hello.id, 1);
        assert_eq!(foo.id, 2);

        let sorted = store
            .list_all(Some(SortField::Title), Direction::Desc)
            .await;
        assert_eq!(sorted[0].title, "Hello");
        assert_eq!(sorted[1].title, "Foo");

        let hits = store.search(Some("foo"), None).await;
        assert_eq!(hits, vec![foo]);
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("title".parse::<SortField>().unwrap(), SortField::Title);
        assert_eq!("content".parse::<SortField>().unwrap(), SortField::Content);
        assert!(matches!(
            "author".parse::<SortField>(),
            Err(ApiError::InvalidSortField(_))
        ));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Desc);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(ApiError::InvalidDirection(_))
        ));
    }
}
