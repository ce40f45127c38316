use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::resident::{
    GenderCount, PurokCount, Resident, ResidentStats, VotersCount,
};
use crate::domain::repository::ResidentRepository;

const RESIDENT_COLUMNS: &str = "id, first_name, middle_name, last_name, alias, birthplace, \
    birthdate, age, civil_status, gender, purok, voters_status, identified_as, email, \
    contact_number, occupation, citizenship, household_no, address, precinct_no, \
    profile_image, created_at, updated_at";

/// ResidentPostgresRepository は PostgreSQL 実装の住民リポジトリ。
pub struct ResidentPostgresRepository {
    pool: PgPool,
}

impl ResidentPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResidentRepository for ResidentPostgresRepository {
    async fn create(&self, resident: &Resident) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO residents
                (id, first_name, middle_name, last_name, alias, birthplace, birthdate, age,
                 civil_status, gender, purok, voters_status, identified_as, email,
                 contact_number, occupation, citizenship, household_no, address, precinct_no,
                 profile_image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(resident.id)
        .bind(&resident.first_name)
        .bind(&resident.middle_name)
        .bind(&resident.last_name)
        .bind(&resident.alias)
        .bind(&resident.birthplace)
        .bind(resident.birthdate)
        .bind(resident.age)
        .bind(resident.civil_status.as_str())
        .bind(resident.gender.as_str())
        .bind(&resident.purok)
        .bind(resident.voters_status.as_str())
        .bind(&resident.identified_as)
        .bind(&resident.email)
        .bind(&resident.contact_number)
        .bind(&resident.occupation)
        .bind(&resident.citizenship)
        .bind(&resident.household_no)
        .bind(&resident.address)
        .bind(&resident.precinct_no)
        .bind(&resident.profile_image)
        .bind(resident.created_at)
        .bind(resident.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Resident>> {
        let sql = format!("SELECT {} FROM residents WHERE id = $1", RESIDENT_COLUMNS);
        let row = sqlx::query_as::<_, ResidentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Resident::try_from).transpose()
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Resident>> {
        let sql = format!(
            "SELECT {} FROM residents ORDER BY created_at DESC",
            RESIDENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ResidentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Resident::try_from).collect()
    }

    async fn update(&self, resident: &Resident) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE residents
            SET first_name = $2, middle_name = $3, last_name = $4, alias = $5, birthplace = $6,
                birthdate = $7, age = $8, civil_status = $9, gender = $10, purok = $11,
                voters_status = $12, identified_as = $13, email = $14, contact_number = $15,
                occupation = $16, citizenship = $17, household_no = $18, address = $19,
                precinct_no = $20, updated_at = $21, profile_image = $22
            WHERE id = $1
            "#,
        )
        .bind(resident.id)
        .bind(&resident.first_name)
        .bind(&resident.middle_name)
        .bind(&resident.last_name)
        .bind(&resident.alias)
        .bind(&resident.birthplace)
        .bind(resident.birthdate)
        .bind(resident.age)
        .bind(resident.civil_status.as_str())
        .bind(resident.gender.as_str())
        .bind(&resident.purok)
        .bind(resident.voters_status.as_str())
        .bind(&resident.identified_as)
        .bind(&resident.email)
        .bind(&resident.contact_number)
        .bind(&resident.occupation)
        .bind(&resident.citizenship)
        .bind(&resident.household_no)
        .bind(&resident.address)
        .bind(&resident.precinct_no)
        .bind(resident.updated_at)
        .bind(&resident.profile_image)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM residents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> anyhow::Result<ResidentStats> {
        let counts: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE gender = 'Male'),
                COUNT(*) FILTER (WHERE gender = 'Female'),
                COUNT(*) FILTER (WHERE voters_status = 'Registered'),
                COUNT(*) FILTER (WHERE voters_status = 'Not-Registered')
            FROM residents
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let purok: Vec<(String, i64)> = sqlx::query_as(
            "SELECT purok, COUNT(*) FROM residents GROUP BY purok ORDER BY purok",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ResidentStats {
            total: counts.0,
            gender: GenderCount {
                male: counts.1,
                female: counts.2,
            },
            voters: VotersCount {
                registered: counts.3,
                not_registered: counts.4,
            },
            purok: purok
                .into_iter()
                .map(|(purok, count)| PurokCount { purok, count })
                .collect(),
        })
    }
}

/// ResidentRow は DB 行からのマッピング用。
#[derive(sqlx::FromRow)]
struct ResidentRow {
    id: Uuid,
    first_name: String,
    middle_name: String,
    last_name: String,
    alias: String,
    birthplace: String,
    birthdate: Option<NaiveDate>,
    age: i32,
    civil_status: String,
    gender: String,
    purok: String,
    voters_status: String,
    identified_as: String,
    email: String,
    contact_number: String,
    occupation: String,
    citizenship: String,
    household_no: String,
    address: String,
    precinct_no: String,
    profile_image: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ResidentRow> for Resident {
    type Error = anyhow::Error;

    fn try_from(row: ResidentRow) -> anyhow::Result<Self> {
        Ok(Resident {
            id: row.id,
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            alias: row.alias,
            birthplace: row.birthplace,
            birthdate: row.birthdate,
            age: row.age,
            civil_status: row.civil_status.parse().map_err(anyhow::Error::msg)?,
            gender: row.gender.parse().map_err(anyhow::Error::msg)?,
            purok: row.purok,
            voters_status: row.voters_status.parse().map_err(anyhow::Error::msg)?,
            identified_as: row.identified_as,
            email: row.email,
            contact_number: row.contact_number,
            occupation: row.occupation,
            citizenship: row.citizenship,
            household_no: row.household_no,
            address: row.address,
            precinct_no: row.precinct_no,
            profile_image: row.profile_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
