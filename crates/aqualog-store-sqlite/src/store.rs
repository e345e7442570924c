//! [`SqliteStore`] — the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use aqualog_core::{
  ledger::{NewReading, Reading},
  profile::{NewProfile, Profile, ProfileUpdate},
  reward::{NewReward, Reward},
  store::LedgerStore,
};

use crate::{
  Error, Result,
  encode::{
    RawProfile, RawReading, RawReward, encode_dt, encode_reward_kind, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An aqualog ledger store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Whether a database error is the `UNIQUE COLLATE NOCASE` constraint on
/// `profiles.name` firing.
fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

const PROFILE_COLUMNS: &str = "profile_id, name, password_hash, address, \
   apartment_number, floor_number, meter_serial, created_at";

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    profile_id:       row.get(0)?,
    name:             row.get(1)?,
    password_hash:    row.get(2)?,
    address:          row.get(3)?,
    apartment_number: row.get(4)?,
    floor_number:     row.get(5)?,
    meter_serial:     row.get(6)?,
    created_at:       row.get(7)?,
  })
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn create_profile(&self, input: NewProfile) -> Result<Profile> {
    let profile = Profile {
      profile_id:       Uuid::new_v4(),
      name:             input.name,
      password_hash:    input.password_hash,
      address:          input.address,
      apartment_number: input.apartment_number,
      floor_number:     input.floor_number,
      meter_serial:     input.meter_serial,
      created_at:       Utc::now(),
    };

    let id_str = encode_uuid(profile.profile_id);
    let at_str = encode_dt(profile.created_at);
    let p = profile.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             profile_id, name, password_hash, address,
             apartment_number, floor_number, meter_serial, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            p.name,
            p.password_hash,
            p.address,
            p.apartment_number,
            p.floor_number,
            p.meter_serial,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(profile),
      Err(e) if is_unique_violation(&e) => Err(Error::NameTaken(profile.name)),
      Err(e) => Err(e.into()),
    }
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE profile_id = ?1"),
              rusqlite::params![id_str],
              profile_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn find_profile_by_name(&self, name: &str) -> Result<Option<Profile>> {
    let name = name.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PROFILE_COLUMNS} FROM profiles WHERE name = ?1 COLLATE NOCASE"
              ),
              rusqlite::params![name],
              profile_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Profile> {
    let existing = self.get_profile(id).await?.ok_or(Error::ProfileNotFound(id))?;

    let updated = Profile {
      profile_id:       existing.profile_id,
      name:             update.name,
      password_hash:    update.password_hash.unwrap_or(existing.password_hash),
      address:          update.address,
      apartment_number: update.apartment_number,
      floor_number:     update.floor_number,
      meter_serial:     update.meter_serial,
      created_at:       existing.created_at,
    };

    let id_str = encode_uuid(id);
    let p = updated.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE profiles SET
             name = ?2, password_hash = ?3, address = ?4,
             apartment_number = ?5, floor_number = ?6, meter_serial = ?7
           WHERE profile_id = ?1",
          rusqlite::params![
            id_str,
            p.name,
            p.password_hash,
            p.address,
            p.apartment_number,
            p.floor_number,
            p.meter_serial,
          ],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(updated),
      Err(e) if is_unique_violation(&e) => Err(Error::NameTaken(updated.name)),
      Err(e) => Err(e.into()),
    }
  }

  // ── Readings — append-only writes ─────────────────────────────────────────

  async fn append_readings(
    &self,
    profile_id: Uuid,
    batch: Vec<NewReading>,
  ) -> Result<Vec<Reading>> {
    let readings: Vec<Reading> = batch
      .into_iter()
      .map(|r| Reading {
        reading_id: Uuid::new_v4(),
        profile_id,
        consumption: r.consumption,
        recorded_at: r.recorded_at,
      })
      .collect();

    let rows: Vec<(String, String, f64, String)> = readings
      .iter()
      .map(|r| {
        (
          encode_uuid(r.reading_id),
          encode_uuid(r.profile_id),
          r.consumption,
          encode_dt(r.recorded_at),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        // One transaction per batch so a bootstrap pair lands atomically.
        let tx = conn.transaction()?;
        for (reading_id, profile_id, consumption, recorded_at) in &rows {
          tx.execute(
            "INSERT INTO readings (reading_id, profile_id, consumption, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![reading_id, profile_id, consumption, recorded_at],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(readings)
  }

  async fn list_readings(&self, profile_id: Uuid) -> Result<Vec<Reading>> {
    let id_str = encode_uuid(profile_id);

    let raws: Vec<RawReading> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT reading_id, profile_id, consumption, recorded_at
           FROM readings WHERE profile_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawReading {
              reading_id:  row.get(0)?,
              profile_id:  row.get(1)?,
              consumption: row.get(2)?,
              recorded_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReading::into_reading).collect()
  }

  // ── Rewards — append-only writes ──────────────────────────────────────────

  async fn append_reward(&self, profile_id: Uuid, input: NewReward) -> Result<Reward> {
    let reward = Reward {
      reward_id:   Uuid::new_v4(),
      profile_id,
      title:       input.title,
      description: input.description,
      kind:        input.kind,
      icon:        input.icon,
      earned_at:   input.earned_at,
    };

    let reward_id_str  = encode_uuid(reward.reward_id);
    let profile_id_str = encode_uuid(reward.profile_id);
    let kind_str       = encode_reward_kind(reward.kind).to_owned();
    let earned_at_str  = encode_dt(reward.earned_at);
    let title          = reward.title.clone();
    let description    = reward.description.clone();
    let icon           = reward.icon.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO rewards (
             reward_id, profile_id, title, description, kind, icon, earned_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            reward_id_str,
            profile_id_str,
            title,
            description,
            kind_str,
            icon,
            earned_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(reward)
  }

  async fn list_rewards(&self, profile_id: Uuid) -> Result<Vec<Reward>> {
    let id_str = encode_uuid(profile_id);

    let raws: Vec<RawReward> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT reward_id, profile_id, title, description, kind, icon, earned_at
           FROM rewards WHERE profile_id = ?1 ORDER BY rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawReward {
              reward_id:   row.get(0)?,
              profile_id:  row.get(1)?,
              title:       row.get(2)?,
              description: row.get(3)?,
              kind:        row.get(4)?,
              icon:        row.get(5)?,
              earned_at:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReward::into_reward).collect()
  }

  async fn reward_count(&self, profile_id: Uuid) -> Result<usize> {
    let id_str = encode_uuid(profile_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM rewards WHERE profile_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as usize)
  }
}
