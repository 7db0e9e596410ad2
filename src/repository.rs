//! Persistence collaborators behind the entity caches.
//!
//! The services only talk to storage through these traits. Every read is
//! the authoritative copy; the caches never call into a repository
//! themselves.
//!
//! [`InMemoryRepository`] implements all three traits over one set of
//! tables. Expenses are stored by category and tag id and joined on read,
//! so renaming a category is visible on the next repository read of its
//! expenses.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::model::{Category, Expense, Tag};
use crate::policy::lfu::EntityId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{table} row {id} does not exist")]
    Missing { table: &'static str, id: EntityId },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

pub trait CategoryRepository: Send + Sync {
    fn find_category(&self, id: EntityId) -> RepositoryResult<Option<Category>>;

    fn find_all_categories(&self) -> RepositoryResult<Vec<Category>>;

    fn find_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>>;

    /// Stores a new category under a fresh id; the given id is ignored.
    fn insert_category(&self, category: Category) -> RepositoryResult<Category>;

    fn update_category(&self, category: Category) -> RepositoryResult<Category>;

    fn delete_category(&self, id: EntityId) -> RepositoryResult<()>;
}

pub trait TagRepository: Send + Sync {
    fn find_tag(&self, id: EntityId) -> RepositoryResult<Option<Tag>>;

    fn find_all_tags(&self) -> RepositoryResult<Vec<Tag>>;

    fn find_tag_by_name(&self, name: &str) -> RepositoryResult<Option<Tag>>;

    /// Stores a new tag under a fresh id; the given id is ignored.
    fn insert_tag(&self, tag: Tag) -> RepositoryResult<Tag>;

    fn update_tag(&self, tag: Tag) -> RepositoryResult<Tag>;

    fn delete_tag(&self, id: EntityId) -> RepositoryResult<()>;
}

pub trait ExpenseRepository: Send + Sync {
    fn find_expense(&self, id: EntityId) -> RepositoryResult<Option<Expense>>;

    fn find_all_expenses(&self) -> RepositoryResult<Vec<Expense>>;

    /// Stores a new expense under a fresh id; the given id is ignored.
    fn insert_expense(&self, expense: Expense) -> RepositoryResult<Expense>;

    /// Stores several new expenses atomically: either all are inserted or none.
    fn insert_expenses(&self, expenses: Vec<Expense>) -> RepositoryResult<Vec<Expense>>;

    fn update_expense(&self, expense: Expense) -> RepositoryResult<Expense>;

    fn delete_expense(&self, id: EntityId) -> RepositoryResult<()>;

    /// Exact match on the category name.
    fn find_expenses_by_category(&self, category: &str) -> RepositoryResult<Vec<Expense>>;

    /// Exact match on a tag name.
    fn find_expenses_by_tag(&self, tag: &str) -> RepositoryResult<Vec<Expense>>;

    /// Inclusive on both ends.
    fn find_expenses_by_amount(&self, min: f64, max: f64) -> RepositoryResult<Vec<Expense>>;

    /// Case-insensitive substring match on the expense name.
    fn search_expenses_by_name(&self, part: &str) -> RepositoryResult<Vec<Expense>>;
}

#[derive(Debug, Clone)]
struct ExpenseRow {
    name: String,
    category_id: Option<EntityId>,
    amount: f64,
    currency: String,
    tag_ids: Vec<EntityId>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<EntityId, String>,
    tags: BTreeMap<EntityId, String>,
    expenses: BTreeMap<EntityId, ExpenseRow>,
    next_category: EntityId,
    next_tag: EntityId,
    next_expense: EntityId,
}

fn next_id(counter: &mut EntityId) -> EntityId {
    *counter += 1;
    *counter
}

impl Tables {
    fn category(&self, id: EntityId) -> Option<Category> {
        self.categories.get(&id).map(|name| Category {
            id,
            name: name.clone(),
        })
    }

    fn tag(&self, id: EntityId) -> Option<Tag> {
        self.tags.get(&id).map(|name| Tag {
            id,
            name: name.clone(),
        })
    }

    fn join(&self, id: EntityId, row: &ExpenseRow) -> Expense {
        Expense {
            id,
            name: row.name.clone(),
            category: row.category_id.and_then(|c| self.category(c)),
            amount: row.amount,
            currency: row.currency.clone(),
            tags: row.tag_ids.iter().filter_map(|t| self.tag(*t)).collect(),
        }
    }

    fn select(&self, filter: impl Fn(&ExpenseRow) -> bool) -> Vec<Expense> {
        self.expenses
            .iter()
            .filter(|(_, row)| filter(row))
            .map(|(id, row)| self.join(*id, row))
            .collect()
    }

    /// Checks the foreign keys of `expense` and flattens it to a row.
    fn row(&self, expense: Expense) -> RepositoryResult<ExpenseRow> {
        let category_id = expense.category.map(|c| c.id);
        if let Some(id) = category_id
            && !self.categories.contains_key(&id)
        {
            return Err(RepositoryError::Missing {
                table: "categories",
                id,
            });
        }
        let mut tag_ids = Vec::with_capacity(expense.tags.len());
        for tag in expense.tags {
            if !self.tags.contains_key(&tag.id) {
                return Err(RepositoryError::Missing {
                    table: "tags",
                    id: tag.id,
                });
            }
            if !tag_ids.contains(&tag.id) {
                tag_ids.push(tag.id);
            }
        }
        Ok(ExpenseRow {
            name: expense.name,
            category_id,
            amount: expense.amount,
            currency: expense.currency,
            tag_ids,
        })
    }
}

fn find_by_name(
    table: &BTreeMap<EntityId, String>,
    name: &str,
) -> Option<(EntityId, String)> {
    let wanted = name.to_lowercase();
    table
        .iter()
        .find(|(_, n)| n.to_lowercase() == wanted)
        .map(|(id, n)| (*id, n.clone()))
}

/// Thread-safe in-process storage implementing every repository trait.
///
/// Ids start at 1 and are never reused. Deleting a category detaches it
/// from its expenses; deleting a tag drops it from every expense.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoryRepository for InMemoryRepository {
    fn find_category(&self, id: EntityId) -> RepositoryResult<Option<Category>> {
        Ok(self.tables.read().category(id))
    }

    fn find_all_categories(&self) -> RepositoryResult<Vec<Category>> {
        let tables = self.tables.read();
        Ok(tables
            .categories
            .iter()
            .map(|(id, name)| Category {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    fn find_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>> {
        Ok(find_by_name(&self.tables.read().categories, name)
            .map(|(id, name)| Category { id, name }))
    }

    fn insert_category(&self, category: Category) -> RepositoryResult<Category> {
        let mut tables = self.tables.write();
        let id = next_id(&mut tables.next_category);
        tables.categories.insert(id, category.name.clone());
        Ok(Category { id, ..category })
    }

    fn update_category(&self, category: Category) -> RepositoryResult<Category> {
        let mut tables = self.tables.write();
        let Some(name) = tables.categories.get_mut(&category.id) else {
            return Err(RepositoryError::Missing {
                table: "categories",
                id: category.id,
            });
        };
        name.clone_from(&category.name);
        Ok(category)
    }

    fn delete_category(&self, id: EntityId) -> RepositoryResult<()> {
        let mut tables = self.tables.write();
        if tables.categories.remove(&id).is_none() {
            return Err(RepositoryError::Missing {
                table: "categories",
                id,
            });
        }
        for row in tables.expenses.values_mut() {
            if row.category_id == Some(id) {
                row.category_id = None;
            }
        }
        Ok(())
    }
}

impl TagRepository for InMemoryRepository {
    fn find_tag(&self, id: EntityId) -> RepositoryResult<Option<Tag>> {
        Ok(self.tables.read().tag(id))
    }

    fn find_all_tags(&self) -> RepositoryResult<Vec<Tag>> {
        let tables = self.tables.read();
        Ok(tables
            .tags
            .iter()
            .map(|(id, name)| Tag {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    fn find_tag_by_name(&self, name: &str) -> RepositoryResult<Option<Tag>> {
        Ok(find_by_name(&self.tables.read().tags, name).map(|(id, name)| Tag { id, name }))
    }

    fn insert_tag(&self, tag: Tag) -> RepositoryResult<Tag> {
        let mut tables = self.tables.write();
        let id = next_id(&mut tables.next_tag);
        tables.tags.insert(id, tag.name.clone());
        Ok(Tag { id, ..tag })
    }

    fn update_tag(&self, tag: Tag) -> RepositoryResult<Tag> {
        let mut tables = self.tables.write();
        let Some(name) = tables.tags.get_mut(&tag.id) else {
            return Err(RepositoryError::Missing {
                table: "tags",
                id: tag.id,
            });
        };
        name.clone_from(&tag.name);
        Ok(tag)
    }

    fn delete_tag(&self, id: EntityId) -> RepositoryResult<()> {
        let mut tables = self.tables.write();
        if tables.tags.remove(&id).is_none() {
            return Err(RepositoryError::Missing { table: "tags", id });
        }
        for row in tables.expenses.values_mut() {
            row.tag_ids.retain(|t| *t != id);
        }
        Ok(())
    }
}

impl ExpenseRepository for InMemoryRepository {
    fn find_expense(&self, id: EntityId) -> RepositoryResult<Option<Expense>> {
        let tables = self.tables.read();
        Ok(tables.expenses.get(&id).map(|row| tables.join(id, row)))
    }

    fn find_all_expenses(&self) -> RepositoryResult<Vec<Expense>> {
        Ok(self.tables.read().select(|_| true))
    }

    fn insert_expense(&self, expense: Expense) -> RepositoryResult<Expense> {
        let mut tables = self.tables.write();
        let row = tables.row(expense)?;
        let id = next_id(&mut tables.next_expense);
        let stored = tables.join(id, &row);
        tables.expenses.insert(id, row);
        Ok(stored)
    }

    fn insert_expenses(&self, expenses: Vec<Expense>) -> RepositoryResult<Vec<Expense>> {
        let mut tables = self.tables.write();
        let rows = expenses
            .into_iter()
            .map(|e| tables.row(e))
            .collect::<RepositoryResult<Vec<_>>>()?;
        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let id = next_id(&mut tables.next_expense);
            stored.push(tables.join(id, &row));
            tables.expenses.insert(id, row);
        }
        Ok(stored)
    }

    fn update_expense(&self, expense: Expense) -> RepositoryResult<Expense> {
        let mut tables = self.tables.write();
        let id = expense.id;
        if !tables.expenses.contains_key(&id) {
            return Err(RepositoryError::Missing {
                table: "expenses",
                id,
            });
        }
        let row = tables.row(expense)?;
        let stored = tables.join(id, &row);
        tables.expenses.insert(id, row);
        Ok(stored)
    }

    fn delete_expense(&self, id: EntityId) -> RepositoryResult<()> {
        match self.tables.write().expenses.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::Missing {
                table: "expenses",
                id,
            }),
        }
    }

    fn find_expenses_by_category(&self, category: &str) -> RepositoryResult<Vec<Expense>> {
        let tables = self.tables.read();
        let ids: Vec<EntityId> = tables
            .categories
            .iter()
            .filter(|(_, name)| name.as_str() == category)
            .map(|(id, _)| *id)
            .collect();
        Ok(tables.select(|row| row.category_id.is_some_and(|c| ids.contains(&c))))
    }

    fn find_expenses_by_tag(&self, tag: &str) -> RepositoryResult<Vec<Expense>> {
        let tables = self.tables.read();
        let ids: Vec<EntityId> = tables
            .tags
            .iter()
            .filter(|(_, name)| name.as_str() == tag)
            .map(|(id, _)| *id)
            .collect();
        Ok(tables.select(|row| row.tag_ids.iter().any(|t| ids.contains(t))))
    }

    fn find_expenses_by_amount(&self, min: f64, max: f64) -> RepositoryResult<Vec<Expense>> {
        Ok(self
            .tables
            .read()
            .select(|row| row.amount >= min && row.amount <= max))
    }

    fn search_expenses_by_name(&self, part: &str) -> RepositoryResult<Vec<Expense>> {
        let part = part.to_lowercase();
        Ok(self
            .tables
            .read()
            .select(|row| row.name.to_lowercase().contains(&part)))
    }
}
