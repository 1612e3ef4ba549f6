//! Diesel schema for notebook persistence.

diesel::table! {
    /// Notebooks awaiting or holding an evaluation.
    notebooks (id) {
        /// Notebook identifier.
        id -> Uuid,
        /// Student name.
        #[max_length = 255]
        student_name -> Varchar,
        /// Optional student registration number.
        #[max_length = 64]
        student_registration -> Nullable<Varchar>,
        /// Prison unit the notebook came from.
        #[max_length = 255]
        prison_unit -> Varchar,
        /// JSON array of subject labels.
        subjects -> Jsonb,
        /// JSON array of free-text answers.
        answers -> Jsonb,
        /// Optional relevant-content note.
        relevant_content -> Nullable<Text>,
        /// Reserving volunteer.
        reserved_by -> Nullable<Uuid>,
        /// Reservation timestamp.
        reserved_at -> Nullable<Timestamptz>,
        /// Evaluation timestamp.
        evaluated_at -> Nullable<Timestamptz>,
        /// Evaluator's conclusion.
        conclusion -> Nullable<Text>,
        /// Whether the content is excluded from publication.
        content_excluded -> Nullable<Bool>,
        /// JSON array of corrected subject labels.
        corrected_subjects -> Nullable<Jsonb>,
        /// JSON array of corrected answers.
        corrected_answers -> Nullable<Jsonb>,
        /// Import timestamp.
        created_at -> Timestamptz,
    }
}
