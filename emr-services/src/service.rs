//! Generic entity service
//!
//! One [`EntityService`] serves every entity: GetById, Get, Create, Update,
//! Patch and Delete are the same for a `Patient` as for an `Invoice`, so the
//! entity type and its store are the only parameters. All request validation
//! (paging, sorting, filters, the patch document) runs before the repository
//! is called.

use config_engine::QuerySettings;
use database_layer::{
    apply_patch, project, DynamicQuery, Entity, FilterCriterion, Paged, Patch, QueryParams,
    Repository,
};
use error_common::{log_error, EmrError, Result};
use logger_redacted::PiiRedactor;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::{debug, info};
use uuid::Uuid;

/// CRUD, projection and dynamic querying for entity `E` stored in `R`
pub struct EntityService<E, R> {
    repository: R,
    settings: QuerySettings,
    redactor: Option<PiiRedactor>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> EntityService<E, R>
where
    E: Entity,
    R: Repository<E>,
{
    pub fn new(repository: R, settings: QuerySettings) -> Self {
        Self {
            repository,
            settings,
            redactor: None,
            _entity: PhantomData,
        }
    }

    /// Mask search terms and filter values before they reach the log
    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = Some(redactor);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn settings(&self) -> QuerySettings {
        self.settings
    }

    /// Fetch one entity, projected onto `fields` when given
    ///
    /// Returns `Ok(None)` when the id does not resolve.
    pub async fn get_by_id(&self, id: Uuid, fields: Option<&str>) -> Result<Option<Value>> {
        let result: Result<Option<Value>> = async {
            let entity = self.find(id).await?;
            entity
                .map(|e| project(&e, fields))
                .transpose()
                .map_err(EmrError::from)
        }
        .await;

        self.logged("get_by_id", result)
    }

    /// Fetch one entity in its typed form
    pub async fn find(&self, id: Uuid) -> Result<Option<E>> {
        debug!(entity = E::NAME, %id, "Fetching by id");
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Filtered, searched, sorted and paged entities
    pub async fn get(&self, params: &QueryParams) -> Result<Vec<E>> {
        let result: Result<Vec<E>> = async {
            let query = self.compile(params)?;
            Ok(self.repository.find(&query).await?)
        }
        .await;

        self.logged("get", result)
    }

    /// Like [`get`](Self::get) but with the total count and page metadata;
    /// items are projected when `params.fields` is set
    pub async fn get_page(&self, params: &QueryParams) -> Result<Paged<Value>> {
        let result: Result<Paged<Value>> = async {
            let query = self.compile(params)?;
            let page = query.page.ok_or_else(EmrError::page_size_invalid)?;
            let items = self.repository.find(&query).await?;
            let total = self.repository.count(&query.without_paging()).await?;

            let projected = items
                .iter()
                .map(|e| project(e, params.fields.as_deref()))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Paged::new(projected, page, total))
        }
        .await;

        self.logged("get_page", result)
    }

    /// Number of entities matching the filters and search term
    pub async fn count(&self, filters: &[FilterCriterion], search: Option<&str>) -> Result<u64> {
        let result: Result<u64> = async {
            let query = DynamicQuery::<E>::unpaged(filters, search)?;
            Ok(self.repository.count(&query).await?)
        }
        .await;

        self.logged("count", result)
    }

    /// Persist a new entity; a nil id is assigned by the store
    pub async fn create(&self, entity: E) -> Result<Uuid> {
        let result = self.repository.insert(entity).await.map_err(EmrError::from);
        if let Ok(id) = &result {
            info!(entity = E::NAME, %id, "Created");
        }
        self.logged("create", result)
    }

    /// Replace the entity stored under `id`
    pub async fn update(&self, id: Uuid, mut entity: E) -> Result<()> {
        entity.set_id(id);
        let result = match self.repository.update(id, entity).await {
            Ok(true) => {
                info!(entity = E::NAME, %id, "Updated");
                Ok(())
            }
            Ok(false) => Err(EmrError::NotFound),
            Err(e) => Err(e.into()),
        };
        self.logged("update", result)
    }

    /// Apply a JSON Patch to the entity stored under `id`
    pub async fn patch(&self, id: Uuid, patch: Option<&Patch>) -> Result<E> {
        let result: Result<E> = async {
            let patch = patch.ok_or(EmrError::PatchMissing)?;
            let existing = self.find(id).await?.ok_or(EmrError::NotFound)?;
            let patched = apply_patch(&existing, patch)?;

            if !self.repository.update(id, patched.clone()).await? {
                return Err(EmrError::NotFound);
            }
            info!(entity = E::NAME, %id, operations = patch.0.len(), "Patched");
            Ok(patched)
        }
        .await;

        self.logged("patch", result)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = match self.repository.delete(id).await {
            Ok(true) => {
                info!(entity = E::NAME, %id, "Deleted");
                Ok(())
            }
            Ok(false) => Err(EmrError::NotFound),
            Err(e) => Err(e.into()),
        };
        self.logged("delete", result)
    }

    fn compile(&self, params: &QueryParams) -> Result<DynamicQuery<E>> {
        let query = params.compile::<E>(u64::from(self.settings.max_page_size))?;
        debug!(
            entity = E::NAME,
            page_number = params.page_number,
            page_size = params.page_size,
            sort_field = params.sort_field.as_deref().unwrap_or(""),
            sort_order = params.sort_order.as_deref().unwrap_or(""),
            search = %self.redact(params.search.as_deref().unwrap_or("")),
            filters = %self.describe_filters(&params.filters),
            "Running query"
        );
        Ok(query)
    }

    fn redact(&self, text: &str) -> String {
        match &self.redactor {
            Some(redactor) => redactor.redact(text),
            None => text.to_string(),
        }
    }

    fn describe_filters(&self, filters: &[FilterCriterion]) -> String {
        filters
            .iter()
            .map(|f| format!("{} {} {}", f.property_name, f.operator, self.redact(&f.value)))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn logged<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            log_error(&format!("{}::{}", E::NAME, operation), e);
        }
        result
    }
}
