use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::PostId;
use crate::model::tag::TagList;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("unknown category: {0}")]
    Unknown(String),
}

/// Community post categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Relationships,
    CareerAndBusiness,
    HealthAndWellness,
    Education,
    Parenting,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Relationships,
        Category::CareerAndBusiness,
        Category::HealthAndWellness,
        Category::Education,
        Category::Parenting,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Relationships => "Relationships",
            Category::CareerAndBusiness => "Career & Business",
            Category::HealthAndWellness => "Health & Wellness",
            Category::Education => "Education",
            Category::Parenting => "Parenting",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Category::Relationships => "❤️",
            Category::CareerAndBusiness => "💼",
            Category::HealthAndWellness => "🧘",
            Category::Education => "📚",
            Category::Parenting => "👶",
        }
    }

    /// # Errors
    ///
    /// Returns `CategoryError::Unknown` when the label matches no category.
    pub fn from_label(label: &str) -> Result<Self, CategoryError> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|cat| cat.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CategoryError::Unknown(trimmed.to_string()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl TryFrom<String> for Category {
    type Error = CategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

pub const TRENDING_TAGS: [&str; 5] = [
    "#WomenInTech",
    "#SelfCare",
    "#WorkLife",
    "#Wellness",
    "#Motivation",
];

/// A community post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
    pub created_at: DateTime<Utc>,
}

impl Post {
    #[must_use]
    pub fn engagement(&self) -> u32 {
        self.likes.saturating_add(self.comments)
    }
}

/// Body of the create-post request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub category: Category,
    pub content: String,
    pub tags: TagList,
    pub author_name: String,
}

/// Feed ordering tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedTab {
    #[default]
    Recent,
    Popular,
    Discussed,
}

/// Category filter; `All` disables filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    fn matches(self, post: &Post) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(cat) => post.category == cat.label(),
        }
    }
}

/// Filter by category and search tags (any tag matches), then order by tab.
#[must_use]
pub fn filter_and_sort<'a>(
    posts: &'a [Post],
    filter: CategoryFilter,
    search_tags: &TagList,
    tab: FeedTab,
) -> Vec<&'a Post> {
    let mut out: Vec<&Post> = posts
        .iter()
        .filter(|post| filter.matches(post))
        .filter(|post| {
            search_tags.is_empty()
                || search_tags
                    .iter()
                    .any(|tag| post.tags.iter().any(|t| t == tag.as_str()))
        })
        .collect();

    match tab {
        FeedTab::Recent => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        FeedTab::Popular => out.sort_by(|a, b| b.engagement().cmp(&a.engagement())),
        FeedTab::Discussed => out.sort_by(|a, b| b.comments.cmp(&a.comments)),
    }
    out
}

/// Human friendly "time ago" label for a post timestamp.
#[must_use]
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if secs < 60 {
        return "Just now".to_string();
    }
    if mins < 60 {
        return format!("{mins} minute{} ago", plural(mins));
    }
    if hours < 24 {
        return format!("{hours} hour{} ago", plural(hours));
    }
    if days == 1 {
        return "Yesterday".to_string();
    }
    at.format("%d %b %Y, %I:%M %p").to_string()
}

fn plural(n: i64) -> &'static str {
    if n > 1 { "s" } else { "" }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::time::fixed_now;

    fn post(id: &str, category: Category, tags: &[&str], likes: u32, comments: u32, age_mins: i64) -> Post {
        Post {
            id: PostId::new(id),
            category: category.label().to_string(),
            content: format!("post {id}"),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            author_name: None,
            likes,
            comments,
            created_at: fixed_now() - Duration::minutes(age_mins),
        }
    }

    #[test]
    fn category_round_trips_label() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.label()).unwrap(), cat);
        }
        assert!(Category::from_label("Gardening").is_err());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::CareerAndBusiness).unwrap();
        assert_eq!(json, "\"Career & Business\"");
    }

    #[test]
    fn filters_by_category_and_any_tag() {
        let posts = vec![
            post("1", Category::Education, &["SelfCare"], 0, 0, 5),
            post("2", Category::Parenting, &["SelfCare"], 0, 0, 4),
            post("3", Category::Education, &["Other"], 0, 0, 3),
        ];
        let mut tags = TagList::new();
        tags.add_tag("SelfCare");
        tags.add_tag("Nope");

        let out = filter_and_sort(
            &posts,
            CategoryFilter::Only(Category::Education),
            &tags,
            FeedTab::Recent,
        );
        let ids: Vec<_> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn sorts_per_tab() {
        let posts = vec![
            post("old", Category::Education, &[], 10, 1, 60),
            post("new", Category::Education, &[], 0, 5, 1),
            post("mid", Category::Education, &[], 3, 3, 30),
        ];
        let none = TagList::new();
        let ids = |tab| -> Vec<String> {
            filter_and_sort(&posts, CategoryFilter::All, &none, tab)
                .iter()
                .map(|p| p.id.to_string())
                .collect()
        };
        assert_eq!(ids(FeedTab::Recent), vec!["new", "mid", "old"]);
        assert_eq!(ids(FeedTab::Popular), vec!["old", "mid", "new"]);
        assert_eq!(ids(FeedTab::Discussed), vec!["new", "mid", "old"]);
    }

    #[test]
    fn relative_labels() {
        let now = fixed_now();
        assert_eq!(format_relative(now - Duration::seconds(10), now), "Just now");
        assert_eq!(format_relative(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_relative(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(format_relative(now - Duration::hours(30), now), "Yesterday");
        assert_eq!(
            format_relative(now - Duration::days(3), now),
            "11 Nov 2023, 10:13 PM"
        );
    }

    #[test]
    fn post_decodes_backend_shape() {
        let json = r#"{
            "_id": "p1",
            "category": "Education",
            "content": "hello",
            "tags": ["x"],
            "authorName": "Asha",
            "createdAt": "2025-05-01T10:00:00Z"
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, PostId::new("p1"));
        assert_eq!(post.likes, 0);
        assert_eq!(post.author_name.as_deref(), Some("Asha"));
    }
}
