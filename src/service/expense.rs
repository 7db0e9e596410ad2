use std::sync::Arc;

use tracing::{info, warn};

use crate::model::{Category, Expense, ExpenseDto, ExpenseUpdateDto, Tag, non_blank};
use crate::policy::lfu::EntityId;
use crate::repository::{CategoryRepository, ExpenseRepository, TagRepository};
use crate::service::exchange::ExchangeRateProvider;
use crate::service::{ServiceError, ServiceResult, populate, read_through};
use crate::traits::ConcurrentCache;

const ENTITY: &str = "Expense";

/// Expense CRUD and queries in front of the expense cache.
///
/// Categories are resolved by name (case-insensitive) and must exist; tags
/// are resolved by name and created on first use.
#[derive(Debug)]
pub struct ExpenseService<R, C, X> {
    repository: Arc<R>,
    cache: C,
    rates: Arc<X>,
}

impl<R, C, X> ExpenseService<R, C, X>
where
    R: ExpenseRepository + CategoryRepository + TagRepository,
    C: ConcurrentCache<EntityId, Expense>,
    X: ExchangeRateProvider,
{
    pub fn new(repository: Arc<R>, cache: C, rates: Arc<X>) -> Self {
        Self {
            repository,
            cache,
            rates,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn create(&self, dto: &ExpenseDto) -> ServiceResult<Expense> {
        let draft = self.build(dto)?;
        let saved = self.repository.insert_expense(draft)?;
        self.cache.put(saved.id, saved.clone());
        info!(id = saved.id, "expense created and cached");
        Ok(saved)
    }

    /// Validates every item and resolves every category before any tag is
    /// created; nothing is stored if any item is invalid.
    pub fn create_bulk(&self, dtos: &[ExpenseDto]) -> ServiceResult<Vec<Expense>> {
        dtos.iter().try_for_each(ExpenseDto::validate)?;
        let categories = dtos
            .iter()
            .map(|dto| self.resolve_category(&dto.category))
            .collect::<ServiceResult<Vec<_>>>()?;
        let drafts = dtos
            .iter()
            .zip(categories)
            .map(|(dto, category)| self.draft(dto, category))
            .collect::<ServiceResult<Vec<_>>>()?;
        let saved = self.repository.insert_expenses(drafts)?;
        for expense in &saved {
            self.cache.put(expense.id, expense.clone());
            info!(id = expense.id, "expense created in bulk and cached");
        }
        Ok(saved)
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Expense>> {
        let expenses = self.repository.find_all_expenses()?;
        populate(&self.cache, ENTITY, "get_all", &expenses, |e| e.id);
        Ok(expenses)
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Expense> {
        read_through(&self.cache, ENTITY, id, |id| self.repository.find_expense(id))
    }

    /// Replaces name, amount, currency and category; tags only if given.
    pub fn update(&self, id: EntityId, dto: &ExpenseDto) -> ServiceResult<Expense> {
        dto.validate()?;
        let mut expense = self.get_by_id(id)?;
        expense.name.clone_from(&dto.name);
        expense.amount = dto.amount;
        expense.currency.clone_from(&dto.currency);
        expense.category = Some(self.resolve_category(&dto.category)?);
        if let Some(tags) = &dto.tags {
            expense.tags = self.resolve_tags(tags)?;
        }
        let updated = self.repository.update_expense(expense)?;
        self.cache.put(id, updated.clone());
        info!(id, "expense updated and cache refreshed");
        Ok(updated)
    }

    /// Applies only the present, non-blank fields.
    pub fn update_partial(&self, id: EntityId, dto: &ExpenseUpdateDto) -> ServiceResult<Expense> {
        dto.validate()?;
        let mut expense = self.get_by_id(id)?;
        if let Some(name) = non_blank(&dto.name) {
            expense.name = name.to_string();
        }
        if let Some(amount) = dto.amount {
            expense.amount = amount;
        }
        if let Some(currency) = non_blank(&dto.currency) {
            expense.currency = currency.to_string();
        }
        if let Some(category) = non_blank(&dto.category) {
            expense.category = Some(self.resolve_category(category)?);
        }
        if let Some(tags) = &dto.tags {
            expense.tags = self.resolve_tags(tags)?;
        }
        let updated = self.repository.update_expense(expense)?;
        self.cache.put(id, updated.clone());
        info!(id, "expense partially updated and cache refreshed");
        Ok(updated)
    }

    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        let expense = self.get_by_id(id)?;
        warn!(id, name = %expense.name, "deleting expense");
        self.repository.delete_expense(id)?;
        self.cache.remove(&id);
        info!(id, "expense deleted and removed from cache");
        Ok(())
    }

    pub fn by_category(&self, category: &str) -> ServiceResult<Vec<Expense>> {
        let expenses = self.repository.find_expenses_by_category(category)?;
        self.cached_non_empty(expenses, "by_category", || {
            format!("No expenses found for category '{category}'")
        })
    }

    pub fn by_tag(&self, tag: &str) -> ServiceResult<Vec<Expense>> {
        let expenses = self.repository.find_expenses_by_tag(tag)?;
        self.cached_non_empty(expenses, "by_tag", || {
            format!("No expenses found for tag '{tag}'")
        })
    }

    /// Expenses with `min <= amount <= max`.
    pub fn by_amount_range(&self, min: f64, max: f64) -> ServiceResult<Vec<Expense>> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ServiceError::InvalidInput(format!(
                "invalid amount range [{min}, {max}]"
            )));
        }
        let expenses = self.repository.find_expenses_by_amount(min, max)?;
        self.cached_non_empty(expenses, "by_amount_range", || {
            format!("No expenses found in amount range [{min}, {max}]")
        })
    }

    pub fn search_by_name(&self, part: &str) -> ServiceResult<Vec<Expense>> {
        let expenses = self.repository.search_expenses_by_name(part)?;
        self.cached_non_empty(expenses, "search_by_name", || {
            format!("No expenses found matching name part '{part}'")
        })
    }

    /// The expense's amount converted into `target`.
    pub fn amount_in_currency(&self, id: EntityId, target: &str) -> ServiceResult<f64> {
        let expense = self.get_by_id(id)?;
        let rate = self.rates.rate(&expense.currency, target)?;
        info!(
            id,
            from = %expense.currency,
            to = %target,
            rate,
            "converted expense amount"
        );
        Ok(expense.amount * rate)
    }

    fn cached_non_empty(
        &self,
        expenses: Vec<Expense>,
        source: &'static str,
        not_found: impl FnOnce() -> String,
    ) -> ServiceResult<Vec<Expense>> {
        if expenses.is_empty() {
            return Err(ServiceError::NotFound(not_found()));
        }
        populate(&self.cache, ENTITY, source, &expenses, |e| e.id);
        Ok(expenses)
    }

    fn build(&self, dto: &ExpenseDto) -> ServiceResult<Expense> {
        dto.validate()?;
        let category = self.resolve_category(&dto.category)?;
        self.draft(dto, category)
    }

    /// Unsaved expense for a validated `dto`. Creates missing tags.
    fn draft(&self, dto: &ExpenseDto, category: Category) -> ServiceResult<Expense> {
        let tags = match &dto.tags {
            Some(names) => self.resolve_tags(names)?,
            None => Vec::new(),
        };
        Ok(Expense {
            id: 0,
            name: dto.name.clone(),
            category: Some(category),
            amount: dto.amount,
            currency: dto.currency.clone(),
            tags,
        })
    }

    fn resolve_category(&self, name: &str) -> ServiceResult<Category> {
        self.repository
            .find_category_by_name(name)?
            .ok_or_else(|| ServiceError::NotFound(format!("Category '{name}' not found")))
    }

    fn resolve_tags(&self, names: &[String]) -> ServiceResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = Vec::with_capacity(names.len());
        for name in names {
            let tag = match self.repository.find_tag_by_name(name)? {
                Some(tag) => tag,
                None => {
                    let tag = self.repository.insert_tag(Tag {
                        id: 0,
                        name: name.clone(),
                    })?;
                    info!(id = tag.id, name = %tag.name, "new tag created");
                    tag
                },
            };
            if !tags.iter().any(|t| t.id == tag.id) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }
}
