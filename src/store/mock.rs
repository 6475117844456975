//! In-memory [`DocumentStore`] for tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use super::error::StoreError;
use super::matcher::MatchStrategy;
use super::{DocumentStore, EntityKind, EntityRecord, NewEntity};

#[derive(Debug, Default)]
struct State {
    extracted: HashMap<(String, u32), BTreeMap<String, String>>,
    pages: BTreeMap<String, BTreeSet<u32>>,
    entities: Vec<EntityRecord>,
    crosswalks: BTreeSet<(Uuid, Uuid)>,
    fail: bool,
}

/// Store double backed by plain maps. `set_fail(true)` makes every
/// subsequent call return a backend error.
#[derive(Debug, Default)]
pub struct MockDocumentStore {
    state: RwLock<State>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds extracted data for a page and registers the page number.
    pub fn insert_extracted(
        &self,
        filename: &str,
        page_number: u32,
        data: impl IntoIterator<Item = (String, String)>,
    ) {
        let mut state = self.state.write().expect("lock poisoned");
        state
            .pages
            .entry(filename.to_string())
            .or_default()
            .insert(page_number);
        state
            .extracted
            .entry((filename.to_string(), page_number))
            .or_default()
            .extend(data);
    }

    pub fn set_fail(&self, fail: bool) {
        self.state.write().expect("lock poisoned").fail = fail;
    }

    pub fn entity_count(&self) -> usize {
        self.state.read().expect("lock poisoned").entities.len()
    }

    pub fn entities(&self) -> Vec<EntityRecord> {
        self.state.read().expect("lock poisoned").entities.clone()
    }

    pub fn crosswalks(&self) -> Vec<(Uuid, Uuid)> {
        self.state
            .read()
            .expect("lock poisoned")
            .crosswalks
            .iter()
            .copied()
            .collect()
    }

    pub fn crosswalk_count(&self) -> usize {
        self.state.read().expect("lock poisoned").crosswalks.len()
    }

    fn check(state: &State) -> Result<(), StoreError> {
        if state.fail {
            return Err(StoreError::Backend {
                reason: "simulated storage outage".to_string(),
            });
        }
        Ok(())
    }

    fn find_locked(
        state: &State,
        kind: EntityKind,
        identifier: &str,
        strategy: &MatchStrategy,
    ) -> Option<Uuid> {
        state
            .entities
            .iter()
            .find(|record| record.kind == kind && strategy.matches(identifier, record))
            .map(|record| record.entity_id)
    }

    fn insert_locked(state: &mut State, entity: NewEntity) -> Uuid {
        let entity_id = Uuid::new_v4();
        state.entities.push(EntityRecord {
            entity_id,
            kind: entity.kind,
            entity_name: entity.entity_name,
            identifier: entity.identifier,
            additional_info: entity.additional_info,
            created_at: Utc::now(),
        });
        entity_id
    }
}

impl DocumentStore for MockDocumentStore {
    async fn fetch_extracted(
        &self,
        filename: &str,
        page_number: u32,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        let state = self.state.read().expect("lock poisoned");
        Self::check(&state)?;
        Ok(state
            .extracted
            .get(&(filename.to_string(), page_number))
            .cloned()
            .unwrap_or_default())
    }

    async fn page_numbers(&self, filename: &str) -> Result<Vec<u32>, StoreError> {
        let state = self.state.read().expect("lock poisoned");
        Self::check(&state)?;
        Ok(state
            .pages
            .get(filename)
            .map(|pages| pages.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn find_entity(
        &self,
        kind: EntityKind,
        identifier: &str,
        strategy: &MatchStrategy,
    ) -> Result<Option<Uuid>, StoreError> {
        let state = self.state.read().expect("lock poisoned");
        Self::check(&state)?;
        Ok(Self::find_locked(&state, kind, identifier, strategy))
    }

    async fn create_entity(&self, entity: NewEntity) -> Result<Uuid, StoreError> {
        let mut state = self.state.write().expect("lock poisoned");
        Self::check(&state)?;
        Ok(Self::insert_locked(&mut state, entity))
    }

    async fn match_or_create_entity(
        &self,
        entity: NewEntity,
        strategy: &MatchStrategy,
    ) -> Result<Uuid, StoreError> {
        // One write lock for the whole find-or-insert, mirroring the
        // production upsert's atomicity.
        let mut state = self.state.write().expect("lock poisoned");
        Self::check(&state)?;
        if let Some(existing) = Self::find_locked(&state, entity.kind, &entity.identifier, strategy)
        {
            return Ok(existing);
        }
        Ok(Self::insert_locked(&mut state, entity))
    }

    async fn create_crosswalk(&self, page_id: Uuid, entity_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().expect("lock poisoned");
        Self::check(&state)?;
        state.crosswalks.insert((page_id, entity_id));
        Ok(())
    }
}
