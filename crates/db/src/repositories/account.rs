use crate::models::DbAccount;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};

// Doctor Repository

pub async fn create_doctor(pool: &Pool<Postgres>, name: &str) -> Result<DbAccount> {
    tracing::debug!("Creating doctor account: name={}", name);

    let doctor = sqlx::query_as::<_, DbAccount>(
        r#"
        INSERT INTO doctors (name, created_at)
        VALUES ($1, $2)
        RETURNING id, name, created_at
        "#,
    )
    .bind(name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(doctor)
}

pub async fn get_doctor_id_by_name(pool: &Pool<Postgres>, name: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM doctors
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(id)
}

// Patient Repository

pub async fn create_patient(pool: &Pool<Postgres>, name: &str) -> Result<DbAccount> {
    tracing::debug!("Creating patient account: name={}", name);

    let patient = sqlx::query_as::<_, DbAccount>(
        r#"
        INSERT INTO patients (name, created_at)
        VALUES ($1, $2)
        RETURNING id, name, created_at
        "#,
    )
    .bind(name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(patient)
}
