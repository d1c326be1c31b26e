use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use crate::models::{announcement, expense, tax, user};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: unique email
    {
        let col = db.collection::<mongodb::bson::Document>(user::COLLECTION);
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // taxes: one record per (month, year)
    {
        let col = db.collection::<mongodb::bson::Document>(tax::COLLECTION);
        let model = IndexModel::builder()
            .keys(doc! { "month": 1, "year": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // expenses: month/year search and date rollups
    {
        let col = db.collection::<mongodb::bson::Document>(expense::COLLECTION);
        let by_period = IndexModel::builder()
            .keys(doc! { "year": 1, "month": 1 })
            .build();
        let by_date = IndexModel::builder()
            .keys(doc! { "date": 1 })
            .build();

        col.create_indexes([by_period, by_date], None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // announcements: active listing
    {
        let col = db.collection::<mongodb::bson::Document>(announcement::COLLECTION);
        let model = IndexModel::builder()
            .keys(doc! { "status": 1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
