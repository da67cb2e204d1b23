//! Diesel schema for repository watermarks.

diesel::table! {
    /// Last ingested revision per project.
    repository_watermarks (project_id) {
        /// Project identifier.
        #[max_length = 255]
        project_id -> Varchar,
        /// Newest fully processed revision.
        #[max_length = 255]
        last_revision -> Varchar,
        /// Time of the last advance.
        updated_at -> Timestamptz,
    }
}
