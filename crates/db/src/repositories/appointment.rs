use crate::models::DbAppointment;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Executor, Postgres};

pub async fn create_appointment<'e, E>(
    executor: E,
    doctor_id: i64,
    patient_id: i64,
    start_time: DateTime<Utc>,
) -> Result<DbAppointment>
where
    E: Executor<'e, Database = Postgres>,
{
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments (doctor_id, patient_id, start_time, is_active, created_at)
        VALUES ($1, $2, $3, TRUE, $4)
        RETURNING id, doctor_id, patient_id, start_time, is_active, created_at, cancelled_at
        "#,
    )
    .bind(doctor_id)
    .bind(patient_id)
    .bind(start_time)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_by_id<'e, E>(executor: E, id: i64) -> Result<Option<DbAppointment>>
where
    E: Executor<'e, Database = Postgres>,
{
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, doctor_id, patient_id, start_time, is_active, created_at, cancelled_at
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(appointment)
}

pub async fn get_active_appointment<'e, E>(
    executor: E,
    doctor_id: i64,
    start_time: DateTime<Utc>,
) -> Result<Option<DbAppointment>>
where
    E: Executor<'e, Database = Postgres>,
{
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, doctor_id, patient_id, start_time, is_active, created_at, cancelled_at
        FROM appointments
        WHERE doctor_id = $1 AND start_time = $2 AND is_active
        "#,
    )
    .bind(doctor_id)
    .bind(start_time)
    .fetch_optional(executor)
    .await?;

    Ok(appointment)
}

pub async fn get_active_appointments_for_day<'e, E>(
    executor: E,
    doctor_id: i64,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
) -> Result<Vec<DbAppointment>>
where
    E: Executor<'e, Database = Postgres>,
{
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, doctor_id, patient_id, start_time, is_active, created_at, cancelled_at
        FROM appointments
        WHERE doctor_id = $1 AND is_active AND start_time >= $2 AND start_time < $3
        ORDER BY start_time ASC
        "#,
    )
    .bind(doctor_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_all(executor)
    .await?;

    Ok(appointments)
}

/// Returns the number of rows deactivated: 0 when the appointment was
/// already inactive or does not exist.
pub async fn cancel_appointment<'e, E>(
    executor: E,
    id: i64,
    cancelled_at: DateTime<Utc>,
) -> Result<u64>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET is_active = FALSE, cancelled_at = $2
        WHERE id = $1 AND is_active
        "#,
    )
    .bind(id)
    .bind(cancelled_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
