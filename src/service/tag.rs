use std::sync::Arc;

use tracing::{info, warn};

use crate::model::{Tag, TagDto};
use crate::policy::lfu::EntityId;
use crate::repository::TagRepository;
use crate::service::{ServiceError, ServiceResult, populate, read_through};
use crate::traits::ConcurrentCache;

const ENTITY: &str = "Tag";

/// Tag CRUD in front of the tag cache.
#[derive(Debug)]
pub struct TagService<R, C> {
    repository: Arc<R>,
    cache: C,
}

impl<R, C> TagService<R, C>
where
    R: TagRepository,
    C: ConcurrentCache<EntityId, Tag>,
{
    pub fn new(repository: Arc<R>, cache: C) -> Self {
        Self { repository, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Tag>> {
        let tags = self.repository.find_all_tags()?;
        info!(count = tags.len(), "retrieved tags from repository");
        populate(&self.cache, ENTITY, "get_all", &tags, |t| t.id);
        Ok(tags)
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Tag> {
        read_through(&self.cache, ENTITY, id, |id| self.repository.find_tag(id))
    }

    pub fn create(&self, dto: &TagDto) -> ServiceResult<Tag> {
        dto.validate()?;
        self.ensure_name_free(&dto.name, None)?;
        info!(name = %dto.name, "creating tag");
        let saved = self.repository.insert_tag(Tag {
            id: 0,
            name: dto.name.clone(),
        })?;
        self.cache.put(saved.id, saved.clone());
        info!(id = saved.id, "tag created and cached");
        Ok(saved)
    }

    pub fn update(&self, id: EntityId, dto: &TagDto) -> ServiceResult<Tag> {
        dto.validate()?;
        let mut existing = self.get_by_id(id)?;
        self.ensure_name_free(&dto.name, Some(id))?;
        info!(id, name = %dto.name, "updating tag");
        existing.name.clone_from(&dto.name);
        let updated = self.repository.update_tag(existing)?;
        self.cache.put(id, updated.clone());
        info!(id, "tag updated and cache refreshed");
        Ok(updated)
    }

    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        let existing = self.get_by_id(id)?;
        warn!(id, name = %existing.name, "deleting tag");
        self.repository.delete_tag(id)?;
        self.cache.remove(&id);
        info!(id, "tag removed from cache");
        Ok(())
    }

    /// `owner` may keep its own name.
    fn ensure_name_free(&self, name: &str, owner: Option<EntityId>) -> ServiceResult<()> {
        match self.repository.find_tag_by_name(name)? {
            Some(found) if Some(found.id) != owner => Err(ServiceError::AlreadyExists(format!(
                "Tag with name {name} already exists"
            ))),
            _ => Ok(()),
        }
    }
}
