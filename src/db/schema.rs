use rusqlite::Connection;

/// Initialize the license store schema (licenses and activations)
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;

        -- Licenses are never deleted; deactivation is a status flip
        CREATE TABLE IF NOT EXISTS licenses (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            plan TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'deactivated')),
            max_activations INTEGER NOT NULL CHECK (max_activations >= 1),
            created_at INTEGER NOT NULL,
            deactivated_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_licenses_created ON licenses(created_at);
        CREATE INDEX IF NOT EXISTS idx_licenses_plan_status ON licenses(plan, status);

        -- Live activations only; releasing a seat deletes the row
        CREATE TABLE IF NOT EXISTS activations (
            id TEXT PRIMARY KEY,
            license_id TEXT NOT NULL REFERENCES licenses(id),
            device_id TEXT NOT NULL,
            activated_at INTEGER NOT NULL,
            ip_address TEXT,
            UNIQUE(license_id, device_id)
        );
        CREATE INDEX IF NOT EXISTS idx_activations_license ON activations(license_id);
        "#,
    )
}

/// Initialize the audit database schema (verification log)
pub fn init_audit_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;

        CREATE TABLE IF NOT EXISTS verification_log (
            id TEXT PRIMARY KEY,
            license_id TEXT NOT NULL,
            device_id TEXT NOT NULL,
            ip_address TEXT,
            timestamp INTEGER NOT NULL,
            valid INTEGER NOT NULL,
            reason TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_verification_log_timestamp ON verification_log(timestamp);
        CREATE INDEX IF NOT EXISTS idx_verification_log_license ON verification_log(license_id);
        "#,
    )
}
