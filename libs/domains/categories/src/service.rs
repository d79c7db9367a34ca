//! Category Service - Business logic layer

use database::slug::{candidate, slugify};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CategoryFilter, CategoryNode, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;
use crate::tree::build_tree;

/// Attempts at `slug`, `slug-2`, ... before giving up
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Parent chains longer than this are treated as corrupt
const MAX_DEPTH: usize = 32;

pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> CategoryResult<Vec<Category>> {
        self.repository
            .list(CategoryFilter {
                is_active: Some(true),
                ..Default::default()
            })
            .await
    }

    /// Admin listing, inactive categories included unless filtered
    #[instrument(skip(self))]
    pub async fn list(&self, filter: CategoryFilter) -> CategoryResult<Vec<Category>> {
        self.repository.list(filter).await
    }

    #[instrument(skip(self))]
    pub async fn tree(&self) -> CategoryResult<Vec<CategoryNode>> {
        Ok(build_tree(&self.list_active().await?))
    }

    #[instrument(skip(self))]
    pub async fn get_active(&self, id: Uuid) -> CategoryResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|c| c.is_active)
            .ok_or(CategoryError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn get_active_by_slug(&self, slug: &str) -> CategoryResult<Category> {
        self.repository
            .get_by_slug(slug)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| CategoryError::SlugNotFound(slug.to_string()))
    }

    /// Admin lookup, inactive included
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> CategoryResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    /// Active category by id or slug, with the ids of its active descendants.
    ///
    /// The category's own id comes first.
    #[instrument(skip(self))]
    pub async fn subtree_ids(&self, key: &str) -> CategoryResult<Option<Vec<Uuid>>> {
        let active = self.list_active().await?;
        let root = match Uuid::parse_str(key) {
            Ok(id) => active.iter().find(|c| c.id == id),
            Err(_) => active.iter().find(|c| c.slug == key),
        };
        let Some(root) = root else {
            return Ok(None);
        };

        let mut by_parent: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for category in &active {
            if let Some(parent) = category.parent_id {
                by_parent.entry(parent).or_default().push(category.id);
            }
        }

        let mut ids = vec![root.id];
        let mut next = 0;
        while next < ids.len() {
            if let Some(children) = by_parent.get(&ids[next]) {
                for child in children {
                    if !ids.contains(child) {
                        ids.push(*child);
                    }
                }
            }
            next += 1;
        }
        Ok(Some(ids))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateCategory) -> CategoryResult<Category> {
        if let Some(parent_id) = input.parent_id {
            self.ensure_parent_exists(parent_id).await?;
        }

        let slug = self.unique_slug(&input.name, None).await?;
        self.repository.create(Category::new(input, slug)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category> {
        let mut category = self.get(id).await?;

        if let Some(Some(parent_id)) = input.parent_id {
            self.ensure_valid_parent(id, parent_id).await?;
        }
        if input.is_active == Some(false) && category.is_active {
            self.ensure_no_active_children(id).await?;
        }

        if let Some(name) = input.name.as_deref() {
            let name = name.trim();
            if name != category.name {
                category.slug = self.unique_slug(name, Some(id)).await?;
                category.name = name.to_string();
            }
        }
        category.apply_update(input);

        self.repository.update(category).await
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> CategoryResult<Category> {
        let mut category = self.get(id).await?;
        self.ensure_no_active_children(id).await?;

        category.apply_update(UpdateCategory {
            is_active: Some(false),
            ..Default::default()
        });
        let category = self.repository.update(category).await?;
        tracing::info!(category_id = %id, "Category deactivated");
        Ok(category)
    }

    async fn ensure_parent_exists(&self, parent_id: Uuid) -> CategoryResult<Category> {
        self.repository
            .get_by_id(parent_id)
            .await?
            .ok_or(CategoryError::ParentNotFound(parent_id))
    }

    /// The new parent must exist and must not sit below `id`
    async fn ensure_valid_parent(&self, id: Uuid, parent_id: Uuid) -> CategoryResult<()> {
        if parent_id == id {
            return Err(CategoryError::CyclicParent);
        }

        let mut current = self.ensure_parent_exists(parent_id).await?;
        for _ in 0..MAX_DEPTH {
            let Some(next) = current.parent_id else {
                return Ok(());
            };
            if next == id {
                return Err(CategoryError::CyclicParent);
            }
            current = match self.repository.get_by_id(next).await? {
                Some(category) => category,
                None => return Ok(()),
            };
        }
        Err(CategoryError::CyclicParent)
    }

    async fn ensure_no_active_children(&self, id: Uuid) -> CategoryResult<()> {
        let children = self.repository.count_active_children(id).await?;
        if children > 0 {
            return Err(CategoryError::HasActiveChildren(children));
        }
        Ok(())
    }

    /// First free slug among `base`, `base-2`, ...; `own` is the category
    /// being renamed, whose current slug counts as free.
    async fn unique_slug(&self, name: &str, own: Option<Uuid>) -> CategoryResult<String> {
        let base = slugify(name);
        if base.is_empty() {
            return Err(CategoryError::Validation(
                "name must contain letters or digits".to_string(),
            ));
        }

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = candidate(&base, attempt);
            match self.repository.get_by_slug(&slug).await? {
                None => return Ok(slug),
                Some(existing) if Some(existing.id) == own => return Ok(slug),
                Some(_) => continue,
            }
        }
        Err(CategoryError::DuplicateSlug(base))
    }
}

impl<R: CategoryRepository> Clone for CategoryService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCategoryRepository;
    use chrono::Utc;
    use mockall::predicate::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::now_v7(),
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            image: None,
            parent_id,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_input(name: &str, parent_id: Option<Uuid>) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            description: None,
            image: None,
            parent_id,
            sort_order: 0,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_takes_next_free_slug() {
        let mut mock = MockCategoryRepository::new();
        let taken = category("Robes", None);
        mock.expect_get_by_slug()
            .with(eq("robes"))
            .returning(move |_| Ok(Some(taken.clone())));
        mock.expect_get_by_slug()
            .with(eq("robes-2"))
            .returning(|_| Ok(None));
        mock.expect_create().returning(Ok);

        let service = CategoryService::new(mock);
        let created = service.create(create_input("Robes", None)).await.unwrap();

        assert_eq!(created.slug, "robes-2");
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_parent() {
        let mut mock = MockCategoryRepository::new();
        mock.expect_get_by_id().returning(|_| Ok(None));

        let service = CategoryService::new(mock);
        let result = service
            .create(create_input("Robes", Some(Uuid::now_v7())))
            .await;

        assert!(matches!(result, Err(CategoryError::ParentNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unsluggable_name() {
        let service = CategoryService::new(MockCategoryRepository::new());
        let result = service.create(create_input("---", None)).await;
        assert!(matches!(result, Err(CategoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_self_parent() {
        let existing = category("Robes", None);
        let id = existing.id;
        let mut mock = MockCategoryRepository::new();
        mock.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));

        let service = CategoryService::new(mock);
        let result = service
            .update(
                id,
                UpdateCategory {
                    parent_id: Some(Some(id)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(CategoryError::CyclicParent)));
    }

    #[tokio::test]
    async fn test_update_rejects_descendant_as_parent() {
        let root = category("Women", None);
        let child = category("Tops", Some(root.id));
        let grandchild = category("Blouses", Some(child.id));
        let (root_id, grandchild_id) = (root.id, grandchild.id);
        let all = vec![root, child, grandchild];

        let mut mock = MockCategoryRepository::new();
        mock.expect_get_by_id()
            .returning(move |id| Ok(all.iter().find(|c| c.id == id).cloned()));

        let service = CategoryService::new(mock);
        let result = service
            .update(
                root_id,
                UpdateCategory {
                    parent_id: Some(Some(grandchild_id)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(CategoryError::CyclicParent)));
    }

    #[tokio::test]
    async fn test_rename_keeps_own_slug_free() {
        let existing = category("Robe", None);
        let id = existing.id;
        let same = existing.clone();

        let mut mock = MockCategoryRepository::new();
        mock.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mock.expect_get_by_slug()
            .with(eq("robe"))
            .returning(move |_| Ok(Some(same.clone())));
        mock.expect_update().returning(Ok);

        let service = CategoryService::new(mock);
        let updated = service
            .update(
                id,
                UpdateCategory {
                    name: Some("ROBE".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "ROBE");
        assert_eq!(updated.slug, "robe");
    }

    #[tokio::test]
    async fn test_delete_refused_with_active_children() {
        let existing = category("Women", None);
        let id = existing.id;

        let mut mock = MockCategoryRepository::new();
        mock.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mock.expect_count_active_children()
            .with(eq(id))
            .returning(|_| Ok(2));
        mock.expect_update().never();

        let service = CategoryService::new(mock);
        let result = service.delete(id).await;

        assert!(matches!(result, Err(CategoryError::HasActiveChildren(2))));
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let existing = category("Sandals", None);
        let id = existing.id;

        let mut mock = MockCategoryRepository::new();
        mock.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mock.expect_count_active_children().returning(|_| Ok(0));
        mock.expect_update()
            .withf(|c| !c.is_active)
            .returning(Ok);

        let service = CategoryService::new(mock);
        let deleted = service.delete(id).await.unwrap();

        assert!(!deleted.is_active);
    }

    #[tokio::test]
    async fn test_get_active_hides_inactive() {
        let mut inactive = category("Old", None);
        inactive.is_active = false;
        let id = inactive.id;

        let mut mock = MockCategoryRepository::new();
        mock.expect_get_by_id()
            .returning(move |_| Ok(Some(inactive.clone())));

        let service = CategoryService::new(mock);
        assert!(matches!(
            service.get_active(id).await,
            Err(CategoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_subtree_ids_by_slug() {
        let women = category("Women", None);
        let tops = category("Tops", Some(women.id));
        let blouses = category("Blouses", Some(tops.id));
        let men = category("Men", None);
        let expected = vec![women.id, tops.id, blouses.id];
        let all = vec![women, tops, blouses, men];

        let mut mock = MockCategoryRepository::new();
        mock.expect_list().returning(move |_| Ok(all.clone()));

        let service = CategoryService::new(mock);
        let ids = service.subtree_ids("women").await.unwrap().unwrap();
        assert_eq!(ids, expected);

        assert!(service.subtree_ids("kids").await.unwrap().is_none());
    }
}
