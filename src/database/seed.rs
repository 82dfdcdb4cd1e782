// Sample data for local development. Seeding goes through the Store trait so
// the same rows land in Postgres or in the memory store.

use chrono::Utc;
use serde_json::{json, Value};

use crate::database::record::Record;
use crate::database::store::{Criteria, Store, StoreError};
use crate::resource::{ResourceSpec, EVENTS, PARTNERS, USERS};

fn record(spec: &ResourceSpec, value: Value) -> Record {
    let mut record = match value {
        Value::Object(map) => Record::from_row(map),
        _ => Record::new(),
    };
    debug_assert!(record.columns().all(|c| spec.is_writable(c)));
    record.stamp_created(Utc::now());
    record
}

/// Insert sample users with partners and events. Skipped when any user
/// already exists, so running it twice is harmless. Returns rows inserted.
pub async fn seed(store: &dyn Store) -> Result<usize, StoreError> {
    if !store.select(&Criteria::all(&USERS)).await?.is_empty() {
        tracing::info!("Seed skipped: users table is not empty");
        return Ok(0);
    }

    let people = [
        ("Blaine", "Anderson", "Mordred", "Kelli", "Anderson"),
        ("Chris", "Potter", "Steel_Rabbit", "Jamie", "Potter"),
        ("Justin", "Robare", "Lionell", "Sam", "Robare"),
    ];

    let mut inserted = 0;
    for (first, last, preferred, partner_first, partner_last) in people {
        let user = store
            .insert(
                USERS.table,
                USERS.primary_key,
                record(
                    &USERS,
                    json!({ "firstName": first, "lastName": last, "preferredName": preferred, "premium": false }),
                ),
            )
            .await?;
        inserted += 1;
        let Some(user_id) = user.id(USERS.primary_key) else {
            continue;
        };

        let mut partner = record(
            &PARTNERS,
            json!({ "firstName": partner_first, "lastName": partner_last, "relationshipStatus": "dating" }),
        );
        partner.set("userId", user_id);
        let partner = store.insert(PARTNERS.table, PARTNERS.primary_key, partner).await?;
        inserted += 1;

        let mut event = record(
            &EVENTS,
            json!({ "title": "First date", "category": "milestone", "eventDate": "2019-10-09" }),
        );
        event.set("userId", user_id);
        if let Some(partner_id) = partner.id(PARTNERS.primary_key) {
            event.set("partnerId", partner_id);
        }
        store.insert(EVENTS.table, EVENTS.primary_key, event).await?;
        inserted += 1;
    }

    tracing::info!("Seeded {} rows", inserted);
    Ok(inserted)
}
