use super::CommandError;
use rationdb_core::{Collection, Document, QueryParser, Value};
use serde_json::{json, Value as JsonValue};

fn to_json(docs: &[Document]) -> Vec<JsonValue> {
    docs.iter().map(JsonValue::from).collect()
}

pub fn insert_one(collection: &Collection, document: Document) -> JsonValue {
    let stored = collection.insert(document);
    json!({"ok": true, "document": JsonValue::from(&stored)})
}

pub fn insert_many(collection: &Collection, documents: Vec<Document>) -> JsonValue {
    let stored = collection.insert_many(documents);
    json!({
        "ok": true,
        "inserted_count": stored.len(),
        "documents": to_json(&stored),
    })
}

pub fn find(
    collection: &Collection,
    query: &Document,
    projection: Option<&Document>,
    sort: Option<&Value>,
    skip: usize,
    limit: Option<usize>,
) -> Result<JsonValue, CommandError> {
    // Validate the sort before running the query
    let sort = sort.map(QueryParser::parse_sort).transpose()?;

    let mut cursor = collection.find(query, projection)?;
    if let Some(sort) = &sort {
        cursor.sort_by(sort);
    }
    let docs = cursor.skip(skip).materialize(limit);

    Ok(json!({
        "ok": true,
        "count": docs.len(),
        "documents": to_json(&docs),
    }))
}

pub fn find_one(
    collection: &Collection,
    query: &Document,
    projection: Option<&Document>,
) -> Result<JsonValue, CommandError> {
    let found = collection.find_one(query, projection)?;
    Ok(json!({
        "ok": true,
        "document": found.as_ref().map(JsonValue::from),
    }))
}

pub fn update(
    collection: &Collection,
    query: &Document,
    update: &Document,
    multi: bool,
) -> Result<JsonValue, CommandError> {
    let modified = if multi {
        collection.update_many(query, update)?
    } else {
        collection.update_one(query, update)?
    };
    Ok(json!({"ok": true, "modified_count": modified}))
}

pub fn delete(
    collection: &Collection,
    query: &Document,
    multi: bool,
) -> Result<JsonValue, CommandError> {
    let deleted = if multi {
        collection.delete_many(query)?
    } else {
        collection.delete_one(query)?
    };
    Ok(json!({"ok": true, "deleted_count": deleted}))
}

pub fn count_documents(
    collection: &Collection,
    query: &Document,
) -> Result<JsonValue, CommandError> {
    let count = collection.count_documents(query)?;
    Ok(json!({"ok": true, "count": count}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rationdb_core::SlowQueryLogger;
    use std::sync::Arc;

    fn collection() -> Collection {
        let c = Collection::new("alerts", "id", Arc::new(SlowQueryLogger::default()));
        c.insert_many(vec![
            Document::new().with("severity", "high").with("score", 90),
            Document::new().with("severity", "low").with("score", 20),
            Document::new().with("severity", "high").with("score", 75),
        ]);
        c
    }

    #[test]
    fn test_find_with_sort_document() {
        let c = collection();
        let sort = Value::Object(Document::new().with("score", 1));
        let query = Document::new().with("severity", "high");
        let result = find(&c, &query, None, Some(&sort), 0, None).unwrap();

        let scores: Vec<i64> = result["documents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["score"].as_i64().unwrap())
            .collect();
        assert_eq!(scores, vec![75, 90]);
        assert_eq!(result["count"], 2);
    }

    #[test]
    fn test_invalid_sort_is_an_error() {
        let c = collection();
        let sort = Value::from("score");
        assert!(find(&c, &Document::new(), None, Some(&sort), 0, None).is_err());
    }

    #[test]
    fn test_find_one_missing_is_null() {
        let c = collection();
        let result = find_one(&c, &Document::new().with("severity", "none"), None).unwrap();
        assert_eq!(result["ok"], true);
        assert!(result["document"].is_null());
    }
}
