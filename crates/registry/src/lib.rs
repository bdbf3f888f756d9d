//! # Person Registry
//!
//! The record service: every create and update first runs the name through
//! the enrichment services, then writes through the storage adapter. Reads and
//! deletes go straight to storage.

use api_client::Enricher;
use async_trait::async_trait;
use core_types::{Pagination, Person, PersonFilter, PersonPayload};
use database::PersonStore;
use std::sync::Arc;

pub mod error;

pub use error::ServiceError;

/// The operations the HTTP layer can perform on persons.
#[async_trait]
pub trait PersonService: Send + Sync {
    /// Enriches and inserts a new person.
    async fn create(&self, person: PersonPayload) -> Result<Person, ServiceError>;

    async fn get(&self, id: i64) -> Result<Person, ServiceError>;

    /// Lists live persons matching `filter`, one page at a time.
    async fn list(
        &self,
        filter: PersonFilter,
        page: Pagination,
    ) -> Result<Vec<Person>, ServiceError>;

    /// Re-enriches and overwrites an existing person.
    async fn update(&self, id: i64, person: PersonPayload) -> Result<Person, ServiceError>;

    /// Soft-deletes a person.
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
}

/// The production `PersonService`, wired to a store and an enricher.
#[derive(Clone)]
pub struct PersonRegistry {
    store: Arc<dyn PersonStore>,
    enricher: Arc<dyn Enricher>,
}

impl PersonRegistry {
    pub fn new(store: Arc<dyn PersonStore>, enricher: Arc<dyn Enricher>) -> Self {
        Self { store, enricher }
    }

    /// Validates the payload and replaces its inferred attributes.
    /// Nothing has been written when this fails.
    async fn enrich(&self, person: &mut PersonPayload) -> Result<(), ServiceError> {
        person.validate()?;
        let enrichment = self.enricher.enrich(&person.first_name).await?;
        tracing::debug!(
            first_name = %person.first_name,
            gender = ?enrichment.gender,
            age = ?enrichment.age,
            country = ?enrichment.country,
            "Person enriched."
        );
        person.apply_enrichment(enrichment);
        Ok(())
    }
}

#[async_trait]
impl PersonService for PersonRegistry {
    async fn create(&self, mut person: PersonPayload) -> Result<Person, ServiceError> {
        self.enrich(&mut person).await?;
        let created = self
            .store
            .insert_person(&person)
            .await
            .map_err(ServiceError::Storage)?;
        tracing::info!(id = created.id, "Person created.");
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Person, ServiceError> {
        self.store
            .get_person(id)
            .await
            .map_err(|e| ServiceError::from_db(id, e))
    }

    async fn list(
        &self,
        filter: PersonFilter,
        page: Pagination,
    ) -> Result<Vec<Person>, ServiceError> {
        self.store
            .list_persons(&filter, page)
            .await
            .map_err(ServiceError::Storage)
    }

    async fn update(&self, id: i64, mut person: PersonPayload) -> Result<Person, ServiceError> {
        self.enrich(&mut person).await?;
        let updated = self
            .store
            .update_person(id, &person)
            .await
            .map_err(|e| ServiceError::from_db(id, e))?;
        tracing::info!(id, "Person updated.");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.store
            .soft_delete_person(id)
            .await
            .map_err(|e| ServiceError::from_db(id, e))?;
        tracing::info!(id, "Person deleted.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::error::ApiError;
    use chrono::Utc;
    use database::DbError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Keeps every row, deleted or not, so tests can inspect soft deletes.
    #[derive(Default)]
    struct InMemoryStore {
        rows: Mutex<Vec<Person>>,
        writes: AtomicUsize,
    }

    impl InMemoryStore {
        fn raw_row(&self, id: i64) -> Option<Person> {
            self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PersonStore for InMemoryStore {
        async fn insert_person(&self, person: &PersonPayload) -> Result<Person, DbError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            let now = Utc::now();
            let row = Person {
                id: rows.len() as i64 + 1,
                created_at: now,
                updated_at: now,
                deleted_at: None,
                first_name: person.first_name.clone(),
                last_name: person.last_name.clone(),
                patronymic: person.patronymic.clone(),
                age: person.age,
                gender: person.gender.clone(),
                country: person.country.clone(),
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn get_person(&self, id: i64) -> Result<Person, DbError> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id && p.deleted_at.is_none())
                .cloned()
                .ok_or(DbError::NotFound)
        }

        async fn list_persons(
            &self,
            filter: &PersonFilter,
            page: Pagination,
        ) -> Result<Vec<Person>, DbError> {
            let name = filter.name.as_ref().map(|n| n.to_lowercase());
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.deleted_at.is_none())
                .filter(|p| {
                    name.as_ref()
                        .is_none_or(|n| p.first_name.to_lowercase().contains(n))
                })
                .filter(|p| filter.gender.as_ref().is_none_or(|g| &p.gender == g))
                .filter(|p| filter.country.as_ref().is_none_or(|c| &p.country == c))
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .cloned()
                .collect())
        }

        async fn update_person(&self, id: i64, person: &PersonPayload) -> Result<Person, DbError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|p| p.id == id && p.deleted_at.is_none())
                .ok_or(DbError::NotFound)?;
            row.first_name = person.first_name.clone();
            row.last_name = person.last_name.clone();
            row.patronymic = person.patronymic.clone();
            row.age = person.age;
            row.gender = person.gender.clone();
            row.country = person.country.clone();
            row.updated_at = Utc::now();
            Ok(row.clone())
        }

        async fn soft_delete_person(&self, id: i64) -> Result<(), DbError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|p| p.id == id && p.deleted_at.is_none()) {
                row.deleted_at = Some(Utc::now());
            }
            Ok(())
        }
    }

    /// Answers every name with the same attributes, optionally failing one call.
    struct ScriptedEnricher {
        gender: &'static str,
        age: i32,
        country: Option<&'static str>,
        fail_on: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedEnricher {
        fn new(gender: &'static str, age: i32, country: Option<&'static str>) -> Self {
            Self { gender, age, country, fail_on: None, calls: AtomicUsize::new(0) }
        }

        fn failing_on(service: &'static str) -> Self {
            Self { fail_on: Some(service), ..Self::new("male", 30, Some("RU")) }
        }

        fn check(&self, service: &'static str) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(service) {
                return Err(ApiError::Deserialization(format!("{service}: connection reset")));
            }
            Ok(())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Enricher for ScriptedEnricher {
        async fn fetch_gender(&self, _name: &str) -> Result<Option<String>, ApiError> {
            self.check("gender")?;
            Ok(Some(self.gender.to_string()))
        }

        async fn fetch_age(&self, _name: &str) -> Result<Option<i32>, ApiError> {
            self.check("age")?;
            Ok(Some(self.age))
        }

        async fn fetch_country(&self, _name: &str) -> Result<Option<String>, ApiError> {
            self.check("nationality")?;
            Ok(self.country.map(str::to_string))
        }
    }

    fn registry(
        store: &Arc<InMemoryStore>,
        enricher: &Arc<ScriptedEnricher>,
    ) -> PersonRegistry {
        PersonRegistry::new(store.clone(), enricher.clone())
    }

    fn named(first_name: &str) -> PersonPayload {
        PersonPayload { first_name: first_name.to_string(), ..Default::default() }
    }

    #[tokio::test]
    async fn create_then_get_returns_enriched_record() {
        let store = Arc::new(InMemoryStore::default());
        let enricher = Arc::new(ScriptedEnricher::new("male", 42, Some("UA")));
        let service = registry(&store, &enricher);

        let created = service
            .create(PersonPayload {
                first_name: "Dmitriy".into(),
                last_name: "Ushakov".into(),
                age: 7,
                gender: "female".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let fetched = service.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.last_name, "Ushakov");
        assert_eq!(
            (fetched.gender.as_str(), fetched.age, fetched.country.as_str()),
            ("male", 42, "UA")
        );
    }

    #[tokio::test]
    async fn create_without_first_name_touches_nothing() {
        let store = Arc::new(InMemoryStore::default());
        let enricher = Arc::new(ScriptedEnricher::new("male", 42, None));
        let service = registry(&store, &enricher);

        let result = service.create(named("")).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(enricher.calls(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn enrichment_failure_aborts_create_before_writing() {
        for service_name in ["gender", "age", "nationality"] {
            let store = Arc::new(InMemoryStore::default());
            let enricher = Arc::new(ScriptedEnricher::failing_on(service_name));
            let service = registry(&store, &enricher);

            let result = service.create(named("Ann")).await;

            assert!(matches!(result, Err(ServiceError::Enrichment(_))), "{service_name}");
            assert_eq!(store.writes(), 0, "{service_name}");
        }
    }

    #[tokio::test]
    async fn enrichment_failure_leaves_existing_row_untouched() {
        let store = Arc::new(InMemoryStore::default());
        let created = registry(&store, &Arc::new(ScriptedEnricher::new("female", 25, Some("FI"))))
            .create(named("Ann"))
            .await
            .unwrap();
        let writes_before = store.writes();

        let failing = registry(&store, &Arc::new(ScriptedEnricher::failing_on("age")));
        let result = failing.update(created.id, named("Anna")).await;

        assert!(matches!(result, Err(ServiceError::Enrichment(_))));
        assert_eq!(store.writes(), writes_before);
        assert_eq!(store.raw_row(created.id).unwrap(), created);
    }

    #[tokio::test]
    async fn update_always_overwrites_inferred_attributes() {
        let store = Arc::new(InMemoryStore::default());
        let created = registry(&store, &Arc::new(ScriptedEnricher::new("male", 42, Some("RU"))))
            .create(named("Sasha"))
            .await
            .unwrap();

        let service = registry(&store, &Arc::new(ScriptedEnricher::new("female", 31, None)));
        let updated = service
            .update(
                created.id,
                PersonPayload {
                    first_name: "Sasha".into(),
                    age: 99,
                    gender: "male".into(),
                    country: "US".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(
            (updated.gender.as_str(), updated.age, updated.country.as_str()),
            ("female", 31, "")
        );
    }

    #[tokio::test]
    async fn update_of_missing_person_is_not_found() {
        let store = Arc::new(InMemoryStore::default());
        let service = registry(&store, &Arc::new(ScriptedEnricher::new("male", 1, None)));

        let result = service.update(404, named("Ghost")).await;

        assert!(matches!(result, Err(ServiceError::NotFound(404))));
    }

    #[tokio::test]
    async fn delete_is_soft() {
        let store = Arc::new(InMemoryStore::default());
        let service = registry(&store, &Arc::new(ScriptedEnricher::new("male", 42, None)));
        let created = service.create(named("Ivan")).await.unwrap();

        service.delete(created.id).await.unwrap();

        assert!(matches!(service.get(created.id).await, Err(ServiceError::NotFound(id)) if id == created.id));
        let raw = store.raw_row(created.id).expect("row must still exist");
        assert!(raw.deleted_at.is_some());
        assert!(service.list(PersonFilter::default(), Pagination::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_name_case_insensitively() {
        let store = Arc::new(InMemoryStore::default());
        let service = registry(&store, &Arc::new(ScriptedEnricher::new("female", 30, Some("FI"))));
        for name in ["Ann", "Joanne", "ANNA", "Maria", "Hannah"] {
            service.create(named(name)).await.unwrap();
        }

        let found = service
            .list(PersonFilter::new(Some("Ann".into()), None, None), Pagination::default())
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|p| p.first_name.as_str()).collect();

        assert_eq!(names, ["Ann", "Joanne", "ANNA", "Hannah"]);
    }

    #[tokio::test]
    async fn list_second_page_holds_rows_eleven_to_twenty() {
        let store = Arc::new(InMemoryStore::default());
        let service = registry(&store, &Arc::new(ScriptedEnricher::new("male", 30, Some("RU"))));
        for i in 1..=25 {
            service.create(named(&format!("Person{i}"))).await.unwrap();
        }

        let page = service
            .list(PersonFilter::default(), Pagination::new(2, 10))
            .await
            .unwrap();
        let ids: Vec<i64> = page.iter().map(|p| p.id).collect();

        assert_eq!(ids, (11..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn list_applies_exact_gender_and_country_filters() {
        let store = Arc::new(InMemoryStore::default());
        registry(&store, &Arc::new(ScriptedEnricher::new("male", 30, Some("RU"))))
            .create(named("Ivan"))
            .await
            .unwrap();
        let service = registry(&store, &Arc::new(ScriptedEnricher::new("female", 30, Some("FI"))));
        service.create(named("Aino")).await.unwrap();

        let found = service
            .list(
                PersonFilter::new(None, Some("female".into()), Some("FI".into())),
                Pagination::default(),
            )
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Aino");
    }

    #[test]
    fn enrichment_error_message_keeps_the_cause() {
        let err = ServiceError::from(ApiError::Deserialization("age: eof".into()));
        assert_eq!(
            err.to_string(),
            "failed to enrich person: Failed to deserialize the API response: age: eof"
        );
    }
}
