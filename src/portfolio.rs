use log::error;

use crate::error::{Error, Result};
use crate::models::portfolio::{
    Project, ProjectChanges, ProjectFilter, ProjectForm, ALL_CATEGORIES, FEATURED_LIMIT,
};
use crate::store::Store;

/// Projects in display order. `None` or "All" lists every category.
pub fn list_projects(store: &dyn Store, category: Option<&str>) -> Result<Vec<Project>> {
    store
        .project_list(&ProjectFilter::for_category(category))
        .inspect_err(|e| error!("Error fetching projects: {}", e))
}

pub fn list_featured_projects(store: &dyn Store, limit: Option<i64>) -> Result<Vec<Project>> {
    let filter = ProjectFilter {
        featured_only: true,
        limit: Some(limit.unwrap_or(FEATURED_LIMIT).max(0)),
        ..Default::default()
    };
    store
        .project_list(&filter)
        .inspect_err(|e| error!("Error fetching featured projects: {}", e))
}

/// "All" followed by each category once, in project display order.
pub fn list_project_categories(store: &dyn Store) -> Result<Vec<String>> {
    let projects = list_projects(store, None)?;
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for p in projects {
        if !categories.contains(&p.category) {
            categories.push(p.category);
        }
    }
    Ok(categories)
}

pub fn create_project(store: &dyn Store, form: &ProjectForm) -> Result<i64> {
    if form.title.trim().is_empty() {
        return Err(Error::Validation("Title is required".to_string()));
    }
    if form.category.trim().is_empty() {
        return Err(Error::Validation("Category is required".to_string()));
    }
    store
        .project_create(form)
        .inspect_err(|e| error!("Error creating project: {}", e))
}

/// Returns false when the project does not exist.
pub fn update_project(store: &dyn Store, id: i64, changes: &ProjectChanges) -> Result<bool> {
    store
        .project_update(id, changes)
        .inspect_err(|e| error!("Error updating project {}: {}", id, e))
}

pub fn delete_project(store: &dyn Store, id: i64) -> Result<()> {
    store
        .project_delete(id)
        .inspect_err(|e| error!("Error deleting project {}: {}", id, e))
}
