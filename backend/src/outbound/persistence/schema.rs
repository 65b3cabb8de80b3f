//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User accounts. `updated_at` is maintained by the
    /// `diesel_set_updated_at` trigger.
    users (id) {
        id -> Int8,
        name -> Text,
        surname -> Text,
        password -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
