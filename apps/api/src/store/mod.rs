//! Document store and collection accessor.
//!
//! `Store` owns the in-memory working copy of the backing document. Every
//! mutation runs under the write lock, is flushed to disk before the lock is
//! released, and is rolled back in memory if the flush fails.

pub mod document;
pub mod error;
pub mod position;

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::records::Record;
use crate::store::document::{write_atomic, Document};
use crate::store::position::Addressing;

pub use crate::store::error::StoreError;

pub struct Store {
    path: PathBuf,
    document: RwLock<Document>,
}

impl Store {
    /// Loads the document at `path`. Never fails; see `Document::load`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = Document::load(&path);
        info!(
            "Loaded {}: {} experience, {} education, {} skill, {} social_media, {} personal_info",
            path.display(),
            document.experience.len(),
            document.education.len(),
            document.skill.len(),
            document.social_media.len(),
            document.personal_info.len(),
        );
        Self::with_document(path, document)
    }

    pub fn with_document(path: impl Into<PathBuf>, document: Document) -> Self {
        Self {
            path: path.into(),
            document: RwLock::new(document),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> Document {
        self.document.read().await.clone()
    }

    pub async fn list<R: Record>(&self) -> Vec<R> {
        R::collection(&*self.document.read().await).clone()
    }

    pub async fn get<R: Record>(&self, token: &str) -> Result<R, StoreError> {
        let document = self.document.read().await;
        let items = R::collection(&document);
        let slot = R::ADDRESSING.resolve(token, items.len())?;
        Ok(items[slot].clone())
    }

    /// Appends a new record built from `payload`.
    ///
    /// Returns the assigned id, or for position-addressed records the new
    /// element's position.
    pub async fn append<R: Record>(&self, payload: Map<String, Value>) -> Result<u64, StoreError> {
        let mut record: R = build_record(payload)?;

        let id = self
            .mutate::<R, _, _>(move |items| {
                if R::ID_BEARING {
                    let id = generate_id(items.as_slice())?;
                    record.set_id(id);
                    items.push(record);
                    Ok(id)
                } else {
                    items.push(record);
                    Ok((items.len() - 1) as u64)
                }
            })
            .await?;

        info!("Appended {} entry {id}", R::COLLECTION);
        Ok(id)
    }

    /// Overwrites the element at the position in `token`. The stored id is
    /// pinned to that position whatever the payload says.
    ///
    /// Replace positions are always 1-based, including for collections that
    /// are otherwise read and deleted 0-based.
    pub async fn replace<R: Record>(
        &self,
        token: &str,
        payload: Map<String, Value>,
    ) -> Result<R, StoreError> {
        let addressing = Addressing::OneBased;
        let position = addressing.parse(token)?;
        let record: R = pin_id(position, payload)?;

        let stored = self
            .mutate::<R, _, _>(move |items| {
                let slot = addressing.slot(position, items.len())?;
                items[slot] = record.clone();
                Ok(record)
            })
            .await?;

        info!("Replaced {} entry at position {position}", R::COLLECTION);
        Ok(stored)
    }

    /// Removes the element at the position in `token`, shifting later
    /// elements down by one.
    pub async fn delete<R: Record>(&self, token: &str) -> Result<R, StoreError> {
        let position = R::ADDRESSING.parse(token)?;

        let removed = self
            .mutate::<R, _, _>(move |items| {
                let slot = R::ADDRESSING.slot(position, items.len())?;
                Ok(items.remove(slot))
            })
            .await?;

        info!("Deleted {} entry at position {position}", R::COLLECTION);
        Ok(removed)
    }

    /// Applies `op` to one collection and flushes the whole document.
    /// On flush failure the collection is restored to its prior contents.
    async fn mutate<R, T, F>(&self, op: F) -> Result<T, StoreError>
    where
        R: Record,
        T: Send,
        F: FnOnce(&mut Vec<R>) -> Result<T, StoreError> + Send,
    {
        let mut document = self.document.write().await;
        let before = R::collection(&document).clone();

        let out = op(R::collection_mut(&mut document))?;

        if let Err(e) = self.flush(&document).await {
            *R::collection_mut(&mut document) = before;
            warn!("Rolled back {} mutation: {e}", R::COLLECTION);
            return Err(e);
        }
        Ok(out)
    }

    async fn flush(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = document
            .to_json()
            .map_err(|e| StoreError::Persistence(e.into()))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| StoreError::Persistence(anyhow!("Write task failed: {e}")))?
            .map_err(StoreError::Persistence)
    }
}

/// Next id for an id-bearing collection: one past the current maximum, or 1
/// when empty. Recomputed from contents, so a deleted maximum is reusable.
pub fn generate_id<R: Record>(items: &[R]) -> Result<u64, StoreError> {
    match items.iter().filter_map(|item| item.id()).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted {
            collection: R::COLLECTION,
        }),
    }
}

/// Builds a record for append, rejecting payloads that lack any of the
/// type's required fields.
pub fn build_record<R: Record>(payload: Map<String, Value>) -> Result<R, StoreError> {
    let missing: Vec<String> = R::REQUIRED_FIELDS
        .iter()
        .filter(|field| !payload.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(StoreError::MissingFields(missing));
    }
    decode_payload(payload)
}

/// Builds the replacement record for `position` with its id forced to that
/// position.
pub fn pin_id<R: Record>(position: usize, payload: Map<String, Value>) -> Result<R, StoreError> {
    let mut record: R = decode_payload(payload)?;
    record.set_id(position as u64);
    Ok(record)
}

fn decode_payload<R: Record>(payload: Map<String, Value>) -> Result<R, StoreError> {
    serde_json::from_value(Value::Object(payload)).map_err(|e| {
        StoreError::InvalidArgument(format!("Invalid {} payload: {e}", R::COLLECTION))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::{Education, Experience, PersonalInfo, Skill, SocialMedia};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn experience_payload(title: &str) -> Map<String, Value> {
        payload(json!({
            "title": title,
            "company": "B",
            "start_date": "2020",
            "end_date": "2021",
            "description": "d",
            "logo": "l"
        }))
    }

    fn skill_payload(name: &str) -> Map<String, Value> {
        payload(json!({ "name": name, "proficiency": "Expert", "logo": "logo.png" }))
    }

    fn temp_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("data.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids_from_one() {
        let (_dir, store) = temp_store();
        for expected in 1..=4 {
            let id = store
                .append::<Experience>(experience_payload("A"))
                .await
                .unwrap();
            assert_eq!(id, expected);
        }
    }

    #[tokio::test]
    async fn test_append_continues_from_existing_max() {
        let dir = TempDir::new().unwrap();
        let document = Document {
            education: vec![
                Education {
                    id: 7,
                    ..Default::default()
                },
                Education {
                    id: 3,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let store = Store::with_document(dir.path().join("data.json"), document);

        let id = store
            .append::<Education>(payload(json!({
                "course": "CS",
                "school": "Uni",
                "start_date": "2019",
                "end_date": "2022",
                "grade": "A",
                "logo": "uni.png"
            })))
            .await
            .unwrap();
        assert_eq!(id, 8);
    }

    #[tokio::test]
    async fn test_append_ignores_payload_id() {
        let (_dir, store) = temp_store();
        let mut body = experience_payload("A");
        body.insert("id".into(), json!(42));

        let id = store.append::<Experience>(body).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.list::<Experience>().await[0].id, 1);
    }

    #[tokio::test]
    async fn test_deleted_max_id_is_reused() {
        let (_dir, store) = temp_store();
        store.append::<Experience>(experience_payload("A")).await.unwrap();
        store.append::<Experience>(experience_payload("B")).await.unwrap();
        store.delete::<Experience>("2").await.unwrap();

        let id = store.append::<Experience>(experience_payload("C")).await.unwrap();
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn test_skill_append_returns_zero_based_position() {
        let (_dir, store) = temp_store();
        assert_eq!(store.append::<Skill>(skill_payload("Rust")).await.unwrap(), 0);
        assert_eq!(store.append::<Skill>(skill_payload("Go")).await.unwrap(), 1);
        assert_eq!(store.get::<Skill>("1").await.unwrap().name, "Go");
    }

    #[tokio::test]
    async fn test_append_missing_field_is_rejected() {
        let (_dir, store) = temp_store();
        for field in Experience::REQUIRED_FIELDS {
            let mut body = experience_payload("A");
            body.remove(*field);
            match store.append::<Experience>(body).await {
                Err(StoreError::MissingFields(missing)) => assert_eq!(missing, [*field]),
                other => panic!("expected MissingFields for {field}, got {other:?}"),
            }
        }
        assert!(store.list::<Experience>().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_accepts_extra_fields() {
        let (_dir, store) = temp_store();
        let body = payload(json!({
            "name": "Ada",
            "address": "London",
            "year_of_birth": "1815",
            "favourite_colour": "green"
        }));
        store.append::<PersonalInfo>(body).await.unwrap();

        let listed = store.list::<PersonalInfo>().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ada");
    }

    #[tokio::test]
    async fn test_append_wrong_type_is_invalid_argument() {
        let (_dir, store) = temp_store();
        let mut body = experience_payload("A");
        body.insert("title".into(), json!({ "text": "A" }));
        assert!(matches!(
            store.append::<Experience>(body).await,
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_get_reports_range_and_argument_errors() {
        let (_dir, store) = temp_store();
        store.append::<Experience>(experience_payload("A")).await.unwrap();
        store.append::<Experience>(experience_payload("B")).await.unwrap();

        assert_eq!(store.get::<Experience>("1").await.unwrap().title, "A");
        assert_eq!(store.get::<Experience>("2").await.unwrap().title, "B");
        for token in ["0", "3", "-1"] {
            assert!(matches!(
                store.get::<Experience>(token).await,
                Err(StoreError::OutOfRange { .. })
            ));
        }
        assert!(matches!(
            store.get::<Experience>("two").await,
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_shifts_following_elements() {
        let (_dir, store) = temp_store();
        for title in ["A", "B", "C"] {
            store.append::<Experience>(experience_payload(title)).await.unwrap();
        }

        let removed = store.delete::<Experience>("2").await.unwrap();
        assert_eq!(removed.title, "B");

        let titles: Vec<_> = store
            .list::<Experience>()
            .await
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["A", "C"]);
        assert_eq!(store.get::<Experience>("2").await.unwrap().title, "C");
    }

    #[tokio::test]
    async fn test_skill_delete_is_zero_based() {
        let (_dir, store) = temp_store();
        store.append::<Skill>(skill_payload("Rust")).await.unwrap();
        store.append::<Skill>(skill_payload("Go")).await.unwrap();

        store.delete::<Skill>("0").await.unwrap();
        let names: Vec<_> = store.list::<Skill>().await.into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Go"]);
        assert!(matches!(
            store.delete::<Skill>("1").await,
            Err(StoreError::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_replace_pins_id_to_position() {
        let (_dir, store) = temp_store();
        for name in ["a", "b", "c"] {
            store
                .append::<SocialMedia>(payload(json!({
                    "linkedin": name,
                    "github": name,
                    "twitter": name,
                    "portfolio": name,
                    "email": name,
                    "phone": name
                })))
                .await
                .unwrap();
        }

        let stored = store
            .replace::<SocialMedia>("3", payload(json!({ "github": "new", "id": 99 })))
            .await
            .unwrap();
        assert_eq!(stored.id, 3);
        assert_eq!(stored.github, "new");
        assert_eq!(stored.linkedin, "");

        let listed = store.list::<SocialMedia>().await;
        assert_eq!(listed[2], stored);
    }

    #[tokio::test]
    async fn test_replace_out_of_range_leaves_collection_alone() {
        let (_dir, store) = temp_store();
        store.append::<Experience>(experience_payload("A")).await.unwrap();

        assert!(matches!(
            store
                .replace::<Experience>("2", experience_payload("Z"))
                .await,
            Err(StoreError::OutOfRange { .. })
        ));
        assert_eq!(store.list::<Experience>().await[0].title, "A");
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let (dir, store) = temp_store();
        store.append::<Experience>(experience_payload("A")).await.unwrap();
        store.append::<Skill>(skill_payload("Rust")).await.unwrap();

        let reopened = Store::open(dir.path().join("data.json"));
        assert_eq!(reopened.snapshot().await, store.snapshot().await);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let document = Document {
            skill: vec![Skill {
                name: "Rust".into(),
                proficiency: "Expert".into(),
                logo: "rust.png".into(),
            }],
            ..Default::default()
        };
        let store = Store::with_document(blocker.join("data.json"), document.clone());

        assert!(matches!(
            store.append::<Skill>(skill_payload("Go")).await,
            Err(StoreError::Persistence(_))
        ));
        assert!(matches!(
            store.delete::<Skill>("0").await,
            Err(StoreError::Persistence(_))
        ));
        assert_eq!(store.snapshot().await, document);
    }

    #[tokio::test]
    async fn test_empty_experience_scenario() {
        let (_dir, store) = temp_store();

        let id = store.append::<Experience>(experience_payload("A")).await.unwrap();
        assert_eq!(id, 1);

        let listed = store.list::<Experience>().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(
            listed[0],
            Experience {
                title: "A".into(),
                company: "B".into(),
                start_date: "2020".into(),
                end_date: "2021".into(),
                description: "d".into(),
                logo: "l".into(),
                id: 1,
            }
        );

        store.delete::<Experience>("1").await.unwrap();
        assert!(store.list::<Experience>().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_after_largest_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let original = format!(
            r#"{{"experience": [{{"title": "x", "id": {}}}]}}"#,
            u64::MAX
        );
        fs::write(&path, &original).unwrap();
        let store = Store::open(&path);

        assert!(matches!(
            store.append::<Experience>(experience_payload("A")).await,
            Err(StoreError::IdsExhausted { collection: "experience" })
        ));
        let listed = store.list::<Experience>().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, u64::MAX);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_append_keeps_numeric_fields_in_other_collections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"personal_info": [{"name": "Ada", "address": "London", "year_of_birth": 1815, "id": 1}]}"#,
        )
        .unwrap();
        let store = Store::open(&path);
        assert_eq!(store.list::<PersonalInfo>().await[0].year_of_birth, "1815");

        store.append::<Experience>(experience_payload("A")).await.unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let people = written["personal_info"].as_array().unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0]["name"], "Ada");
        assert_eq!(people[0]["year_of_birth"], "1815");
    }

    #[tokio::test]
    async fn test_skill_replace_is_one_based() {
        let (_dir, store) = temp_store();
        store.append::<Skill>(skill_payload("Rust")).await.unwrap();
        store.append::<Skill>(skill_payload("Go")).await.unwrap();

        assert!(matches!(
            store.replace::<Skill>("0", skill_payload("Zig")).await,
            Err(StoreError::OutOfRange { .. })
        ));
        store.replace::<Skill>("1", skill_payload("Zig")).await.unwrap();

        let names: Vec<_> = store.list::<Skill>().await.into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Zig", "Go"]);
    }

    #[test]
    fn test_generate_id_on_empty_is_one() {
        assert_eq!(generate_id::<Experience>(&[]).unwrap(), 1);
    }

    #[test]
    fn test_pin_id_overrides_payload() {
        let record: PersonalInfo = pin_id(5, payload(json!({ "name": "Ada", "id": 1 }))).unwrap();
        assert_eq!(record.id, 5);
        assert_eq!(record.name, "Ada");
    }
}
