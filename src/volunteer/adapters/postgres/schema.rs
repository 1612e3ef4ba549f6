//! Diesel schema for volunteer persistence.

diesel::table! {
    /// Registered volunteers.
    volunteers (id) {
        /// Volunteer identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Lowercase e-mail address, unique across volunteers.
        #[max_length = 255]
        email -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}
