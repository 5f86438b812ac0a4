use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "All";

pub const FEATURED_LIMIT: i64 = 3;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub tech_stack: Vec<String>,
    pub category: String,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub case_study: Option<String>,
    pub featured: bool,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProjectForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub category: String,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub case_study: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub category: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub case_study: Option<String>,
    pub featured: Option<bool>,
    pub sort_order: Option<i64>,
}

/// Listing constraints for projects. Results are always in `sort_order`.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub featured_only: bool,
    pub limit: Option<i64>,
}

impl ProjectFilter {
    /// Builds a filter from a caller-supplied category where "All" means none.
    pub fn for_category(category: Option<&str>) -> Self {
        ProjectFilter {
            category: category
                .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
                .map(|c| c.to_string()),
            ..Default::default()
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        if self.featured_only && !project.featured {
            return false;
        }
        match self.category {
            Some(ref c) => project.category == *c,
            None => true,
        }
    }
}
