//! Diesel row models for notebook persistence.

use super::schema::notebooks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Jsonb, Nullable, Text, Timestamptz, Uuid, Varchar};
use serde_json::Value;

/// Query result row for notebook records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = notebooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotebookRow {
    /// Notebook identifier.
    #[diesel(sql_type = Uuid)]
    pub id: uuid::Uuid,
    /// Student name.
    #[diesel(sql_type = Varchar)]
    pub student_name: String,
    /// Optional student registration number.
    #[diesel(sql_type = Nullable<Varchar>)]
    pub student_registration: Option<String>,
    /// Prison unit.
    #[diesel(sql_type = Varchar)]
    pub prison_unit: String,
    /// Subject labels as a JSON array.
    #[diesel(sql_type = Jsonb)]
    pub subjects: Value,
    /// Answers as a JSON array.
    #[diesel(sql_type = Jsonb)]
    pub answers: Value,
    /// Optional relevant-content note.
    #[diesel(sql_type = Nullable<Text>)]
    pub relevant_content: Option<String>,
    /// Reserving volunteer.
    #[diesel(sql_type = Nullable<Uuid>)]
    pub reserved_by: Option<uuid::Uuid>,
    /// Reservation timestamp.
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub reserved_at: Option<DateTime<Utc>>,
    /// Evaluation timestamp.
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub evaluated_at: Option<DateTime<Utc>>,
    /// Evaluator's conclusion.
    #[diesel(sql_type = Nullable<Text>)]
    pub conclusion: Option<String>,
    /// Content-exclusion flag.
    #[diesel(sql_type = Nullable<Bool>)]
    pub content_excluded: Option<bool>,
    /// Corrected subject labels as a JSON array.
    #[diesel(sql_type = Nullable<Jsonb>)]
    pub corrected_subjects: Option<Value>,
    /// Corrected answers as a JSON array.
    #[diesel(sql_type = Nullable<Jsonb>)]
    pub corrected_answers: Option<Value>,
    /// Import timestamp.
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
}

/// Insert model for newly imported notebooks.
///
/// Lifecycle columns are omitted so that imports always start available.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notebooks)]
pub struct NewNotebookRow {
    /// Notebook identifier.
    pub id: uuid::Uuid,
    /// Student name.
    pub student_name: String,
    /// Optional student registration number.
    pub student_registration: Option<String>,
    /// Prison unit.
    pub prison_unit: String,
    /// Subject labels as a JSON array.
    pub subjects: Value,
    /// Answers as a JSON array.
    pub answers: Value,
    /// Optional relevant-content note.
    pub relevant_content: Option<String>,
    /// Import timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row for the notebook-with-reserver join.
#[derive(Debug, Clone, QueryableByName)]
pub struct NotebookWithReserverRow {
    /// Notebook columns.
    #[diesel(embed)]
    pub notebook: NotebookRow,
    /// Reserver display name.
    #[diesel(sql_type = Nullable<Varchar>)]
    pub reserver_name: Option<String>,
    /// Reserver e-mail address.
    #[diesel(sql_type = Nullable<Varchar>)]
    pub reserver_email: Option<String>,
    /// Reserver registration timestamp.
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub reserver_created_at: Option<DateTime<Utc>>,
}
