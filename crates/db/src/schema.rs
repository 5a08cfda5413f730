use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create doctors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctors (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create patients table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create doctor_schedules table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctor_schedules (
            id BIGSERIAL PRIMARY KEY,
            doctor_id BIGINT NOT NULL REFERENCES doctors(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_schedule_range CHECK (end_time > start_time),
            CONSTRAINT unique_doctor_schedule UNIQUE (doctor_id, start_time, end_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id BIGSERIAL PRIMARY KEY,
            doctor_id BIGINT NOT NULL REFERENCES doctors(id),
            patient_id BIGINT NOT NULL REFERENCES patients(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            cancelled_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT cancelled_when_inactive CHECK (is_active OR cancelled_at IS NOT NULL)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    let indexes = [
        // At most one active appointment per doctor and slot
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_active_slot ON appointments(doctor_id, start_time) WHERE is_active",
        "CREATE INDEX IF NOT EXISTS idx_doctor_schedules_doctor_start ON doctor_schedules(doctor_id, start_time)",
        "CREATE INDEX IF NOT EXISTS idx_appointments_doctor_start ON appointments(doctor_id, start_time)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
