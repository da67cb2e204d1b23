//! Diesel schema for version ingestion persistence.

diesel::table! {
    /// One row per ingested project revision.
    versions (id) {
        /// Deterministic version identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Owning project.
        #[max_length = 255]
        project_id -> Varchar,
        /// Source revision.
        #[max_length = 255]
        revision -> Varchar,
        /// Per-project order number.
        order_number -> Int8,
        /// Revision author name.
        author -> Text,
        /// Revision author email.
        author_email -> Text,
        /// Revision author's hosting-service identifier.
        author_external_id -> Nullable<Text>,
        /// Commit message.
        message -> Text,
        /// Tracked branch.
        #[max_length = 255]
        branch -> Varchar,
        /// Revision timestamp.
        created_at -> Timestamptz,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Serialized project configuration.
        config -> Nullable<Text>,
        /// Warning messages.
        warnings -> Jsonb,
        /// Error messages.
        errors -> Jsonb,
        /// Whether every changed file matched an ignore rule.
        ignored -> Bool,
        /// Build identifiers.
        build_ids -> Jsonb,
        /// Activation state per build variant.
        build_statuses -> Jsonb,
    }
}

diesel::table! {
    /// Per-variant builds of a version.
    builds (id) {
        /// Build identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Owning version.
        #[max_length = 255]
        version_id -> Varchar,
        /// Owning project.
        #[max_length = 255]
        project_id -> Varchar,
        /// Build variant name.
        #[max_length = 255]
        build_variant -> Varchar,
        /// Human-readable variant name.
        display_name -> Text,
        /// Source revision.
        #[max_length = 255]
        revision -> Varchar,
        /// Order number of the owning version.
        order_number -> Int8,
        /// Task identifiers in configuration order.
        task_ids -> Jsonb,
        /// Whether the build has been activated.
        activated -> Bool,
        /// Earliest activation time.
        activate_at -> Timestamptz,
        /// Actual activation time.
        activated_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Schedulable tasks of a build.
    build_tasks (id) {
        /// Task identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Owning build.
        #[max_length = 255]
        build_id -> Varchar,
        /// Owning version.
        #[max_length = 255]
        version_id -> Varchar,
        /// Owning project.
        #[max_length = 255]
        project_id -> Varchar,
        /// Build variant name.
        #[max_length = 255]
        build_variant -> Varchar,
        /// Task name.
        display_name -> Text,
        /// Source revision.
        #[max_length = 255]
        revision -> Varchar,
        /// Identifiers of prerequisite tasks.
        depends_on -> Jsonb,
        /// Whether the task has been activated.
        activated -> Bool,
        /// Position within the owning build.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Last issued order number per project.
    order_counters (project_id) {
        /// Project identifier.
        #[max_length = 255]
        project_id -> Varchar,
        /// Last issued order number.
        last_value -> Int8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(versions, builds, build_tasks);
