// Appartenance aux kermesses : organisateurs, participants et stands.
// Les collections sont chargées explicitement, une requête par liste.
use sea_orm::*;
use std::collections::HashSet;

use crate::error::{AppError, AppResult};
use crate::models::dto::KermesseDetail;
use crate::models::role::Role;
use crate::models::{kermesse, kermesse_organizers, kermesse_participants, kermesse_stands, stand, users};
use crate::middleware::AuthUser;

pub struct KermesseService;

/// Type de membre ajouté par `/kermesses/{id}/add-users`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Participants,
    Organizers,
}

impl MemberKind {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "participants" => Ok(MemberKind::Participants),
            "organizers" | "organisateurs" => Ok(MemberKind::Organizers),
            other => Err(AppError::Validation(format!(
                "Invalid type '{}'. Must be one of: participants, organizers",
                other
            ))),
        }
    }
}

/// Ids à ajouter : sans doublon dans la requête ni lien déjà existant
pub fn new_ids(requested: &[i32], found: &[i32], existing: &[i32]) -> Vec<i32> {
    let found: HashSet<i32> = found.iter().copied().collect();
    let mut seen: HashSet<i32> = existing.iter().copied().collect();
    requested
        .iter()
        .copied()
        .filter(|id| found.contains(id) && seen.insert(*id))
        .collect()
}

impl KermesseService {
    pub async fn find(db: &DatabaseConnection, kermesse_id: i32) -> AppResult<kermesse::Model> {
        kermesse::Entity::find_by_id(kermesse_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Kermesse not found".into()))
    }

    pub async fn organizer_ids<C: ConnectionTrait>(conn: &C, kermesse_id: i32) -> AppResult<Vec<i32>> {
        let rows = kermesse_organizers::Entity::find()
            .filter(kermesse_organizers::Column::KermesseId.eq(kermesse_id))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }

    pub async fn participant_ids<C: ConnectionTrait>(conn: &C, kermesse_id: i32) -> AppResult<Vec<i32>> {
        let rows = kermesse_participants::Entity::find()
            .filter(kermesse_participants::Column::KermesseId.eq(kermesse_id))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }

    pub async fn stand_ids<C: ConnectionTrait>(conn: &C, kermesse_id: i32) -> AppResult<Vec<i32>> {
        let rows = kermesse_stands::Entity::find()
            .filter(kermesse_stands::Column::KermesseId.eq(kermesse_id))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.stand_id).collect())
    }

    pub async fn is_organizer(db: &DatabaseConnection, kermesse_id: i32, user_id: i32) -> AppResult<bool> {
        let row = kermesse_organizers::Entity::find_by_id((kermesse_id, user_id))
            .one(db)
            .await?;
        Ok(row.is_some())
    }

    pub async fn is_participant(db: &DatabaseConnection, kermesse_id: i32, user_id: i32) -> AppResult<bool> {
        let row = kermesse_participants::Entity::find_by_id((kermesse_id, user_id))
            .one(db)
            .await?;
        Ok(row.is_some())
    }

    /// Liste visible selon le rôle : tout pour l'admin, créées ou co-organisées
    /// pour un organisateur, celles où l'on participe pour les autres
    pub async fn list_for(db: &DatabaseConnection, user: &AuthUser) -> AppResult<Vec<kermesse::Model>> {
        match user.role {
            Role::Admin => Ok(kermesse::Entity::find()
                .order_by_asc(kermesse::Column::Id)
                .all(db)
                .await?),
            Role::Organizer => {
                let organized = kermesse_organizers::Entity::find()
                    .filter(kermesse_organizers::Column::UserId.eq(user.user_id))
                    .all(db)
                    .await?;
                let ids: Vec<i32> = organized.into_iter().map(|r| r.kermesse_id).collect();
                Ok(kermesse::Entity::find()
                    .filter(
                        Condition::any()
                            .add(kermesse::Column::UserId.eq(user.user_id))
                            .add(kermesse::Column::Id.is_in(ids)),
                    )
                    .order_by_asc(kermesse::Column::Id)
                    .all(db)
                    .await?)
            }
            _ => {
                let joined = kermesse_participants::Entity::find()
                    .filter(kermesse_participants::Column::UserId.eq(user.user_id))
                    .all(db)
                    .await?;
                let ids: Vec<i32> = joined.into_iter().map(|r| r.kermesse_id).collect();
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(kermesse::Entity::find()
                    .filter(kermesse::Column::Id.is_in(ids))
                    .order_by_asc(kermesse::Column::Id)
                    .all(db)
                    .await?)
            }
        }
    }

    pub async fn detail(db: &DatabaseConnection, kermesse: kermesse::Model) -> AppResult<KermesseDetail> {
        let organizer_ids = Self::organizer_ids(db, kermesse.id).await?;
        let participant_ids = Self::participant_ids(db, kermesse.id).await?;
        let stand_ids = Self::stand_ids(db, kermesse.id).await?;

        let organizers = users_by_ids(db, organizer_ids).await?;
        let participants = users_by_ids(db, participant_ids).await?;
        let stands = if stand_ids.is_empty() {
            Vec::new()
        } else {
            stand::Entity::find()
                .filter(stand::Column::Id.is_in(stand_ids))
                .all(db)
                .await?
        };

        Ok(KermesseDetail {
            kermesse,
            organizers,
            participants,
            stands,
        })
    }

    /// Rattache des stands existants, retourne le nombre de liens créés
    pub async fn add_stands(db: &DatabaseConnection, kermesse_id: i32, stand_ids: &[i32]) -> AppResult<usize> {
        if stand_ids.is_empty() {
            return Err(AppError::Validation("stand_ids is required".into()));
        }

        let txn = db.begin().await?;

        let found: Vec<i32> = stand::Entity::find()
            .filter(stand::Column::Id.is_in(stand_ids.to_vec()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        if found.is_empty() {
            return Err(AppError::NotFound("No stands found".into()));
        }

        let existing = Self::stand_ids(&txn, kermesse_id).await?;
        let to_add = new_ids(stand_ids, &found, &existing);

        if !to_add.is_empty() {
            let rows = to_add.iter().map(|stand_id| kermesse_stands::ActiveModel {
                kermesse_id: Set(kermesse_id),
                stand_id: Set(*stand_id),
            });
            kermesse_stands::Entity::insert_many(rows).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;
        tracing::info!(kermesse_id, added = to_add.len(), "stands attached to kermesse");
        Ok(to_add.len())
    }

    /// Ajoute des participants ou des organisateurs, retourne le nombre de liens créés
    pub async fn add_users(
        db: &DatabaseConnection,
        kermesse_id: i32,
        kind: MemberKind,
        user_ids: &[i32],
    ) -> AppResult<usize> {
        if user_ids.is_empty() {
            return Err(AppError::Validation("user_ids is required".into()));
        }

        let txn = db.begin().await?;

        let found: Vec<i32> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids.to_vec()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        if found.is_empty() {
            return Err(AppError::NotFound("No users found".into()));
        }

        let to_add = match kind {
            MemberKind::Participants => {
                let existing = Self::participant_ids(&txn, kermesse_id).await?;
                let to_add = new_ids(user_ids, &found, &existing);
                if !to_add.is_empty() {
                    let rows = to_add.iter().map(|user_id| kermesse_participants::ActiveModel {
                        kermesse_id: Set(kermesse_id),
                        user_id: Set(*user_id),
                    });
                    kermesse_participants::Entity::insert_many(rows).exec_without_returning(&txn).await?;
                }
                to_add
            }
            MemberKind::Organizers => {
                let existing = Self::organizer_ids(&txn, kermesse_id).await?;
                let to_add = new_ids(user_ids, &found, &existing);
                if !to_add.is_empty() {
                    let rows = to_add.iter().map(|user_id| kermesse_organizers::ActiveModel {
                        kermesse_id: Set(kermesse_id),
                        user_id: Set(*user_id),
                    });
                    kermesse_organizers::Entity::insert_many(rows).exec_without_returning(&txn).await?;
                }
                to_add
            }
        };

        txn.commit().await?;
        tracing::info!(kermesse_id, ?kind, added = to_add.len(), "users added to kermesse");
        Ok(to_add.len())
    }

    /// Supprime la kermesse et ses trois tables de liaison
    pub async fn delete(db: &DatabaseConnection, kermesse_id: i32) -> AppResult<()> {
        let txn = db.begin().await?;

        kermesse_organizers::Entity::delete_many()
            .filter(kermesse_organizers::Column::KermesseId.eq(kermesse_id))
            .exec(&txn)
            .await?;
        kermesse_participants::Entity::delete_many()
            .filter(kermesse_participants::Column::KermesseId.eq(kermesse_id))
            .exec(&txn)
            .await?;
        kermesse_stands::Entity::delete_many()
            .filter(kermesse_stands::Column::KermesseId.eq(kermesse_id))
            .exec(&txn)
            .await?;
        kermesse::Entity::delete_by_id(kermesse_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

pub async fn users_by_ids<C: ConnectionTrait>(conn: &C, ids: Vec<i32>) -> AppResult<Vec<users::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .order_by_asc(users::Column::Id)
        .all(conn)
        .await?)
}
