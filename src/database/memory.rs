use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use super::{Collection, DocumentStore, Sort, StoreError, UpdateOutcome, UNIQUE_INDEXES};

/// In-process document store with the same filter, sort and uniqueness
/// semantics as the MongoDB adapter. Selected with `DATABASE_URL=memory://`.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| document.get(key) == Some(value))
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::DateTime(v) => Some(v.timestamp_millis() as f64),
        _ => None,
    }
}

/// Missing fields sort lowest, like null in MongoDB.
fn compare_fields(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => match (as_number(x), as_number(y)) {
            (Some(p), Some(q)) => p.partial_cmp(&q).unwrap_or(Ordering::Equal),
            _ => match (x.as_str(), y.as_str()) {
                (Some(p), Some(q)) => p.cmp(q),
                _ => Ordering::Equal,
            },
        },
    }
}

fn unique_key(document: &Document, fields: &[&str]) -> Vec<Bson> {
    fields
        .iter()
        .map(|field| document.get(*field).cloned().unwrap_or(Bson::Null))
        .collect()
}

/// Returns the violated index fields, ignoring the document at `skip`.
fn unique_violation(
    collection: Collection,
    candidate: &Document,
    existing: &[Document],
    skip: Option<usize>,
) -> Option<String> {
    let id = candidate.get("_id");
    let id_taken = id.is_some()
        && existing
            .iter()
            .enumerate()
            .any(|(i, doc)| Some(i) != skip && doc.get("_id") == id);
    if id_taken {
        return Some("_id".to_string());
    }

    UNIQUE_INDEXES
        .iter()
        .filter(|(indexed, _)| *indexed == collection)
        .find(|(_, fields)| {
            let key = unique_key(candidate, fields);
            existing
                .iter()
                .enumerate()
                .any(|(i, doc)| Some(i) != skip && unique_key(doc, fields) == key)
        })
        .map(|(_, fields)| fields.join(", "))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Sort>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let mut found: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|doc| matches(doc, &filter)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = sort {
            found.sort_by(|a, b| {
                let ordering = compare_fields(a.get(sort.field), b.get(sort.field));
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(found)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)).cloned()))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(_) => return Err(StoreError::Backend("_id must be an ObjectId".to_string())),
            None => ObjectId::new(),
        };

        let mut stored = Document::new();
        stored.insert("_id", id);
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }

        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let docs = collections.entry(collection).or_default();
        if let Some(fields) = unique_violation(collection, &stored, docs, None) {
            return Err(StoreError::DuplicateKey(format!(
                "{} index: ({})",
                collection.name(),
                fields
            )));
        }

        docs.push(stored);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let docs = collections.entry(collection).or_default();

        let Some(position) = docs.iter().position(|doc| matches(doc, &filter)) else {
            return Ok(UpdateOutcome::default());
        };

        let mut updated = docs[position].clone();
        for (key, value) in fields {
            updated.insert(key, value);
        }

        if updated == docs[position] {
            return Ok(UpdateOutcome { matched: 1, modified: 0 });
        }

        if let Some(violated) = unique_violation(collection, &updated, docs, Some(position)) {
            return Err(StoreError::DuplicateKey(format!(
                "{} index: ({})",
                collection.name(),
                violated
            )));
        }

        docs[position] = updated;
        Ok(UpdateOutcome { matched: 1, modified: 1 })
    }

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        match docs.iter().position(|doc| matches(doc, &filter)) {
            Some(position) => {
                docs.remove(position);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.collections.read().map(|_| ()).map_err(|_| poisoned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, DateTime};

    #[tokio::test]
    async fn test_insert_assigns_id_and_find_one_by_id() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Scholarships, doc! { "title": "STEM Grant" })
            .await
            .unwrap();

        let found = store
            .find_one(Collection::Scholarships, doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.get_object_id("_id").unwrap(), id);
        assert_eq!(found.get_str("title").unwrap(), "STEM Grant");
    }

    #[tokio::test]
    async fn test_find_filters_and_sorts_descending() {
        let store = MemoryStore::new();
        for (email, millis) in [("a@b.com", 1_000), ("c@d.com", 2_000), ("a@b.com", 3_000)] {
            store
                .insert_one(
                    Collection::Payments,
                    doc! { "userEmail": email, "paidAt": DateTime::from_millis(millis) },
                )
                .await
                .unwrap();
        }

        let found = store
            .find(
                Collection::Payments,
                doc! { "userEmail": "a@b.com" },
                Some(Sort::newest_first("paidAt")),
            )
            .await
            .unwrap();

        let times: Vec<i64> = found
            .iter()
            .map(|d| d.get_datetime("paidAt").unwrap().timestamp_millis())
            .collect();
        assert_eq!(times, vec![3_000, 1_000]);
    }

    #[tokio::test]
    async fn test_missing_sort_field_goes_last_when_descending() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Applications, doc! { "userEmail": "x@y.com", "scholarshipId": "1" })
            .await
            .unwrap();
        store
            .insert_one(
                Collection::Applications,
                doc! { "userEmail": "x@y.com", "scholarshipId": "2", "createdAt": DateTime::from_millis(5) },
            )
            .await
            .unwrap();

        let found = store
            .find(Collection::Applications, doc! {}, Some(Sort::newest_first("createdAt")))
            .await
            .unwrap();

        assert_eq!(found[0].get_str("scholarshipId").unwrap(), "2");
        assert_eq!(found[1].get_str("scholarshipId").unwrap(), "1");
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Users, doc! { "email": "a@b.com" })
            .await
            .unwrap();

        let second = store
            .insert_one(Collection::Users, doc! { "email": "a@b.com" })
            .await;

        assert!(matches!(second, Err(StoreError::DuplicateKey(_))));
        assert_eq!(store.find(Collection::Users, doc! {}, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_reports_matched_and_modified() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Applications, doc! { "userEmail": "a@b.com", "scholarshipId": "s", "status": "applied" })
            .await
            .unwrap();

        let changed = store
            .update_one(Collection::Applications, doc! { "_id": id }, doc! { "status": "cancelled" })
            .await
            .unwrap();
        assert_eq!(changed, UpdateOutcome { matched: 1, modified: 1 });

        let unchanged = store
            .update_one(Collection::Applications, doc! { "_id": id }, doc! { "status": "cancelled" })
            .await
            .unwrap();
        assert_eq!(unchanged, UpdateOutcome { matched: 1, modified: 0 });

        let missing = store
            .update_one(Collection::Applications, doc! { "_id": ObjectId::new() }, doc! { "status": "x" })
            .await
            .unwrap();
        assert_eq!(missing, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn test_update_keeps_untouched_fields() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Reviews, doc! { "rating": 4, "comment": "good" })
            .await
            .unwrap();

        store
            .update_one(Collection::Reviews, doc! { "_id": id }, doc! { "comment": "great" })
            .await
            .unwrap();

        let review = store
            .find_one(Collection::Reviews, doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(review.get_i32("rating").unwrap(), 4);
        assert_eq!(review.get_str("comment").unwrap(), "great");
    }

    #[tokio::test]
    async fn test_delete_one_counts() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Scholarships, doc! { "title": "t" })
            .await
            .unwrap();

        assert_eq!(store.delete_one(Collection::Scholarships, doc! { "_id": id }).await.unwrap(), 1);
        assert_eq!(store.delete_one(Collection::Scholarships, doc! { "_id": id }).await.unwrap(), 0);
        assert_eq!(store.delete_one(Collection::Users, doc! { "_id": id }).await.unwrap(), 0);
    }
}
