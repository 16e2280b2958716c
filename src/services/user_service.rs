// Logique des utilisateurs : création, fusion des mises à jour partielles,
// profil complet, liens parent -> enfant et suppression en cascade.
use sea_orm::*;
use std::collections::HashSet;

use crate::error::{AppError, AppResult};
use crate::models::dto::UserProfile;
use crate::models::role::Role;
use crate::models::{
    history, kermesse, kermesse_organizers, kermesse_participants, kermesse_stands, product, stand,
    transaction, user_children, users,
};
use crate::services::kermesse_service::users_by_ids;
use crate::utils::password;

pub struct UserService;

/// Champs d'une mise à jour partielle, déjà extraits de la requête
#[derive(Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
    pub role: Option<Role>,
    pub jetons: Option<i64>,
    pub pts_attribues: Option<i64>,
}

pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub picture: Option<String>,
    pub role: Role,
    pub jetons: i64,
}

/// Une chaîne vide compte comme "non soumise"
fn submitted(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn hash(password: &str) -> AppResult<String> {
    password::hash_password(password).map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

impl UserService {
    pub async fn find(db: &DatabaseConnection, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?)
    }

    pub async fn create(db: &DatabaseConnection, new_user: NewUser) -> AppResult<users::Model> {
        // 1. Email unique
        if Self::find_by_email(db, &new_user.email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".into()));
        }

        // 2. Hash du mot de passe avant stockage
        let password_hash = hash(&new_user.password)?;

        let model = users::ActiveModel {
            firstname: Set(new_user.first_name),
            lastname: Set(new_user.last_name),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            picture: Set(new_user.picture),
            role: Set(new_user.role.as_i32()),
            jetons: Set(new_user.jetons),
            pts_attribues: Set(0),
            ..Default::default()
        };

        let user = model.insert(db).await?;
        tracing::info!(user_id = user.id, role = %new_user.role, "user created");
        Ok(user)
    }

    /// Applique seulement les champs soumis et non vides sur l'utilisateur existant
    pub async fn update(
        db: &DatabaseConnection,
        user: users::Model,
        changes: UserChanges,
    ) -> AppResult<users::Model> {
        let user_id = user.id;
        let mut active: users::ActiveModel = user.into();

        if let Some(first_name) = submitted(changes.first_name) {
            active.firstname = Set(first_name);
        }
        if let Some(last_name) = submitted(changes.last_name) {
            active.lastname = Set(last_name);
        }
        if let Some(email) = submitted(changes.email) {
            if let Some(other) = Self::find_by_email(db, &email).await? {
                if other.id != user_id {
                    return Err(AppError::Conflict("Email already in use".into()));
                }
            }
            active.email = Set(email);
        }
        if let Some(new_password) = submitted(changes.password) {
            active.password_hash = Set(hash(&new_password)?);
        }
        if let Some(picture) = submitted(changes.picture) {
            active.picture = Set(Some(picture));
        }
        if let Some(role) = changes.role {
            active.role = Set(role.as_i32());
        }
        if let Some(jetons) = changes.jetons {
            active.jetons = Set(jetons);
        }
        if let Some(points) = changes.pts_attribues {
            active.pts_attribues = Set(points);
        }

        // Rien à écrire : pas de requête UPDATE vide
        if !active.is_changed() {
            return Self::find(db, user_id).await;
        }

        Ok(active.update(db).await?)
    }

    pub async fn students(db: &DatabaseConnection) -> AppResult<Vec<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Role.eq(Role::Student.as_i32()))
            .order_by_asc(users::Column::Id)
            .all(db)
            .await?)
    }

    /// Profil avec chaque collection chargée explicitement
    pub async fn profile(db: &DatabaseConnection, user: users::Model) -> AppResult<UserProfile> {
        let parent_ids: Vec<i32> = user_children::Entity::find()
            .filter(user_children::Column::ChildId.eq(user.id))
            .all(db)
            .await?
            .into_iter()
            .map(|link| link.parent_id)
            .collect();
        let child_ids: Vec<i32> = user_children::Entity::find()
            .filter(user_children::Column::ParentId.eq(user.id))
            .all(db)
            .await?
            .into_iter()
            .map(|link| link.child_id)
            .collect();

        let parents = users_by_ids(db, parent_ids).await?;
        let children = users_by_ids(db, child_ids).await?;

        let kermesses = kermesse::Entity::find()
            .filter(kermesse::Column::UserId.eq(user.id))
            .all(db)
            .await?;
        let stands = stand::Entity::find()
            .filter(stand::Column::UserId.eq(user.id))
            .all(db)
            .await?;
        let transactions = Self::transactions(db, user.id).await?;
        let history = Self::history(db, user.id).await?;

        Ok(UserProfile {
            user,
            parents,
            children,
            kermesses,
            stands,
            transactions,
            history,
        })
    }

    pub async fn transactions(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<transaction::Model>> {
        Ok(transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::Date)
            .all(db)
            .await?)
    }

    pub async fn history(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<history::Model>> {
        Ok(history::Entity::find()
            .filter(history::Column::UserId.eq(user_id))
            .order_by_desc(history::Column::Date)
            .all(db)
            .await?)
    }

    /// Lie des enfants au parent ; retourne les enfants nouvellement liés
    pub async fn link_children(
        db: &DatabaseConnection,
        parent_id: i32,
        children_ids: &[i32],
    ) -> AppResult<Vec<users::Model>> {
        if children_ids.is_empty() {
            return Err(AppError::Validation("children_ids is empty".into()));
        }
        if children_ids.contains(&parent_id) {
            return Err(AppError::Validation("A parent cannot be linked to themself".into()));
        }

        let found = users::Entity::find()
            .filter(users::Column::Id.is_in(children_ids.to_vec()))
            .all(db)
            .await?;
        if found.is_empty() {
            return Err(AppError::NotFound("No children found".into()));
        }

        let mut seen: HashSet<i32> = user_children::Entity::find()
            .filter(user_children::Column::ParentId.eq(parent_id))
            .all(db)
            .await?
            .into_iter()
            .map(|link| link.child_id)
            .collect();
        let new_children: Vec<users::Model> = found.into_iter().filter(|child| seen.insert(child.id)).collect();

        if !new_children.is_empty() {
            let rows = new_children.iter().map(|child| user_children::ActiveModel {
                parent_id: Set(parent_id),
                child_id: Set(child.id),
            });
            user_children::Entity::insert_many(rows).exec_without_returning(db).await?;
        }

        tracing::info!(parent_id, linked = new_children.len(), "children linked");
        Ok(new_children)
    }

    /// Supprime l'utilisateur et tout ce qui en dépend : liens, historique,
    /// transactions, kermesses créées et stands tenus (avec leurs produits)
    pub async fn delete(db: &DatabaseConnection, user_id: i32) -> AppResult<()> {
        let txn = db.begin().await?;

        // 1. Liens et lignes enfants
        user_children::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(user_children::Column::ParentId.eq(user_id))
                    .add(user_children::Column::ChildId.eq(user_id)),
            )
            .exec(&txn)
            .await?;
        kermesse_organizers::Entity::delete_many()
            .filter(kermesse_organizers::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        kermesse_participants::Entity::delete_many()
            .filter(kermesse_participants::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        history::Entity::delete_many()
            .filter(history::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        transaction::Entity::delete_many()
            .filter(transaction::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        // 2. Stands tenus et leurs produits
        let stand_ids: Vec<i32> = stand::Entity::find()
            .filter(stand::Column::UserId.eq(user_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        if !stand_ids.is_empty() {
            product::Entity::delete_many()
                .filter(product::Column::StandId.is_in(stand_ids.clone()))
                .exec(&txn)
                .await?;
            kermesse_stands::Entity::delete_many()
                .filter(kermesse_stands::Column::StandId.is_in(stand_ids.clone()))
                .exec(&txn)
                .await?;
            stand::Entity::delete_many()
                .filter(stand::Column::Id.is_in(stand_ids))
                .exec(&txn)
                .await?;
        }

        // 3. Kermesses créées et leurs liaisons
        let kermesse_ids: Vec<i32> = kermesse::Entity::find()
            .filter(kermesse::Column::UserId.eq(user_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|k| k.id)
            .collect();
        if !kermesse_ids.is_empty() {
            kermesse_organizers::Entity::delete_many()
                .filter(kermesse_organizers::Column::KermesseId.is_in(kermesse_ids.clone()))
                .exec(&txn)
                .await?;
            kermesse_participants::Entity::delete_many()
                .filter(kermesse_participants::Column::KermesseId.is_in(kermesse_ids.clone()))
                .exec(&txn)
                .await?;
            kermesse_stands::Entity::delete_many()
                .filter(kermesse_stands::Column::KermesseId.is_in(kermesse_ids.clone()))
                .exec(&txn)
                .await?;
            kermesse::Entity::delete_many()
                .filter(kermesse::Column::Id.is_in(kermesse_ids))
                .exec(&txn)
                .await?;
        }

        // 4. L'utilisateur
        users::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(user_id, "user deleted");
        Ok(())
    }
}
