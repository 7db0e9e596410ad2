use std::sync::Arc;

use tracing::{info, warn};

use crate::model::{Category, CategoryDto};
use crate::policy::lfu::EntityId;
use crate::repository::CategoryRepository;
use crate::service::{ServiceError, ServiceResult, populate, read_through};
use crate::traits::ConcurrentCache;

const ENTITY: &str = "Category";

/// Category CRUD in front of the category cache.
#[derive(Debug)]
pub struct CategoryService<R, C> {
    repository: Arc<R>,
    cache: C,
}

impl<R, C> CategoryService<R, C>
where
    R: CategoryRepository,
    C: ConcurrentCache<EntityId, Category>,
{
    pub fn new(repository: Arc<R>, cache: C) -> Self {
        Self { repository, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Category>> {
        let categories = self.repository.find_all_categories()?;
        populate(&self.cache, ENTITY, "get_all", &categories, |c| c.id);
        Ok(categories)
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Category> {
        read_through(&self.cache, ENTITY, id, |id| self.repository.find_category(id))
    }

    /// Rejects a name already used by another category, ignoring case.
    pub fn create(&self, dto: &CategoryDto) -> ServiceResult<Category> {
        dto.validate()?;
        self.ensure_name_free(&dto.name, None)?;
        info!(name = %dto.name, "creating category");
        let saved = self.repository.insert_category(Category {
            id: 0,
            name: dto.name.clone(),
        })?;
        self.cache.put(saved.id, saved.clone());
        info!(id = saved.id, "category created and cached");
        Ok(saved)
    }

    pub fn update(&self, id: EntityId, dto: &CategoryDto) -> ServiceResult<Category> {
        dto.validate()?;
        let mut existing = self.get_by_id(id)?;
        self.ensure_name_free(&dto.name, Some(id))?;
        info!(id, name = %dto.name, "updating category");
        existing.name.clone_from(&dto.name);
        let updated = self.repository.update_category(existing)?;
        self.cache.put(id, updated.clone());
        info!(id, "category updated and cache refreshed");
        Ok(updated)
    }

    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        let existing = self.get_by_id(id)?;
        warn!(id, name = %existing.name, "deleting category");
        self.repository.delete_category(id)?;
        self.cache.remove(&id);
        info!(id, "category removed from cache");
        Ok(())
    }

    fn ensure_name_free(&self, name: &str, owner: Option<EntityId>) -> ServiceResult<()> {
        match self.repository.find_category_by_name(name)? {
            Some(found) if Some(found.id) != owner => Err(ServiceError::AlreadyExists(format!(
                "Category with name {name} already exists"
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::sync::SharedLfuCache;

    fn service(capacity: usize) -> CategoryService<InMemoryRepository, SharedLfuCache<EntityId, Category>> {
        CategoryService::new(Arc::new(InMemoryRepository::new()), SharedLfuCache::new(capacity))
    }

    #[test]
    fn create_writes_through() {
        let svc = service(10);
        let food = svc.create(&CategoryDto::new("Food")).unwrap();
        assert_eq!(food.id, 1);
        assert_eq!(svc.cache().get(&food.id), Some(food));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let svc = service(10);
        svc.create(&CategoryDto::new("Food")).unwrap();
        let err = svc.create(&CategoryDto::new("food")).unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[test]
    fn update_refreshes_cache() {
        let svc = service(10);
        let food = svc.create(&CategoryDto::new("Food")).unwrap();
        let meals = svc.update(food.id, &CategoryDto::new("Meals")).unwrap();
        assert_eq!(meals.name, "Meals");
        assert_eq!(svc.cache().get(&food.id).unwrap().name, "Meals");

        // renaming to its own name in another case is allowed
        assert!(svc.update(food.id, &CategoryDto::new("MEALS")).is_ok());
    }

    #[test]
    fn delete_invalidates_and_then_misses() {
        let svc = service(10);
        let food = svc.create(&CategoryDto::new("Food")).unwrap();
        svc.delete(food.id).unwrap();
        assert!(!svc.cache().contains(&food.id));
        assert!(matches!(svc.get_by_id(food.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(food.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn get_all_fills_cache_up_to_capacity() {
        let svc = service(2);
        for name in ["A", "B", "C"] {
            svc.create(&CategoryDto::new(name)).unwrap();
        }
        svc.cache().clear();
        assert_eq!(svc.get_all().unwrap().len(), 3);
        assert_eq!(svc.cache().len(), 2);
    }

    #[test]
    fn blank_name_is_invalid_input() {
        let svc = service(10);
        assert!(matches!(
            svc.create(&CategoryDto::new(" ")),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
