use crate::models::DbDoctorSchedule;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Executor, Postgres};

pub async fn create_schedule<'e, E>(
    executor: E,
    doctor_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<DbDoctorSchedule>
where
    E: Executor<'e, Database = Postgres>,
{
    let schedule = sqlx::query_as::<_, DbDoctorSchedule>(
        r#"
        INSERT INTO doctor_schedules (doctor_id, start_time, end_time, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, doctor_id, start_time, end_time, created_at
        "#,
    )
    .bind(doctor_id)
    .bind(start_time)
    .bind(end_time)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    tracing::debug!("Schedule created: id={}, doctor_id={}", schedule.id, doctor_id);
    Ok(schedule)
}

pub async fn schedule_exists<'e, E>(
    executor: E,
    doctor_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM doctor_schedules
            WHERE doctor_id = $1 AND start_time = $2 AND end_time = $3
        )
        "#,
    )
    .bind(doctor_id)
    .bind(start_time)
    .bind(end_time)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Half-open intersection against the doctor's schedules inside
/// `[day_start, day_end)`.
pub async fn schedule_overlaps<'e, E>(
    executor: E,
    doctor_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
) -> Result<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let overlaps = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM doctor_schedules
            WHERE doctor_id = $1
              AND start_time >= $4 AND end_time <= $5
              AND start_time < $3 AND $2 < end_time
        )
        "#,
    )
    .bind(doctor_id)
    .bind(start_time)
    .bind(end_time)
    .bind(day_start)
    .bind(day_end)
    .fetch_one(executor)
    .await?;

    Ok(overlaps)
}

pub async fn get_schedules_for_day<'e, E>(
    executor: E,
    doctor_id: i64,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
) -> Result<Vec<DbDoctorSchedule>>
where
    E: Executor<'e, Database = Postgres>,
{
    let schedules = sqlx::query_as::<_, DbDoctorSchedule>(
        r#"
        SELECT id, doctor_id, start_time, end_time, created_at
        FROM doctor_schedules
        WHERE doctor_id = $1 AND start_time >= $2 AND end_time <= $3
        ORDER BY start_time ASC
        "#,
    )
    .bind(doctor_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_all(executor)
    .await?;

    Ok(schedules)
}
