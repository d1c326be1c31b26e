use futures_util::StreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    Database,
};

use crate::error::ApiResult;

/// Reads a numeric field from an aggregation result.
///
/// `$sum` yields int32/int64 when every input is integral, double otherwise.
pub fn number(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => *v as f64,
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

pub fn integer(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int32(v)) => *v as i64,
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

pub async fn collect(db: &Database, collection: &str, pipeline: Vec<Document>) -> ApiResult<Vec<Document>> {
    let mut cursor = db
        .collection::<Document>(collection)
        .aggregate(pipeline, None)
        .await?;

    let mut out: Vec<Document> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res?);
    }
    Ok(out)
}

/// Sum of `field` across the whole collection, plus the number of documents.
pub async fn sum_and_count(db: &Database, collection: &str, field: &str) -> ApiResult<(f64, i64)> {
    let pipeline = vec![doc! {
        "$group": {
            "_id": Bson::Null,
            "total": { "$sum": format!("${field}") },
            "count": { "$sum": 1 },
        }
    }];

    let rows = collect(db, collection, pipeline).await?;

    Ok(rows
        .first()
        .map(|row| (number(row, "total"), integer(row, "count")))
        .unwrap_or((0.0, 0)))
}
