// Opérations qui modifient un solde de jetons ou de points.
// Chaque opération tourne dans une transaction SQL : les lignes modifiées
// sont lues avec FOR UPDATE (utilisateurs par id croissant, puis stand,
// puis produit) et la ligne d'historique est insérée avant le commit.
// En cas d'erreur la transaction est abandonnée (rollback au drop).
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::*;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{history, product, stand, transaction, user_children, users};
use crate::services::payment_gateway::{PaymentGateway, PaymentIntent};

pub struct LedgerService;

#[derive(Debug, Serialize)]
pub struct InteractionOutcome {
    pub stand_conso: i64,
    pub jetons: i64,
}

#[derive(Debug, Serialize)]
pub struct PurchaseOutcome {
    pub product_id: i32,
    pub quantity: i64,
    pub total_jetons: i64,
    pub remaining_stock: i64,
    pub jetons: i64,
}

#[derive(Debug, Serialize)]
pub struct PointsOutcome {
    pub user_id: i32,
    pub points_given: i64,
    pub pts_attribues: i64,
}

#[derive(Debug, Serialize)]
pub struct TransferOutcome {
    pub parent_coins: i64,
    pub child_coins: i64,
}

#[derive(Debug, Serialize)]
pub struct PaymentOutcome {
    pub payment_intent: PaymentIntent,
    pub transaction: transaction::Model,
}

/// Paiement demandé par un utilisateur
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub user_id: i32,
    pub kind: PaymentKind,
    pub quantity: i64,
    pub price: Decimal,
    /// Clé fournie par le client, réutilisée telle quelle en cas de nouvel essai
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    Jetons,
    Tombola,
}

impl PaymentKind {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "jetons" => Ok(PaymentKind::Jetons),
            "tombola" => Ok(PaymentKind::Tombola),
            other => Err(AppError::Validation(format!(
                "Invalid payment type '{}'. Must be one of: jetons, tombola",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentKind::Jetons => "jetons",
            PaymentKind::Tombola => "tombola",
        }
    }
}

/// Règle unique pour toutes les dépenses : le solde doit être strictement
/// supérieur au coût (un solde égal au coût est refusé).
pub fn ensure_can_spend(balance: i64, cost: i64) -> AppResult<()> {
    if balance > cost {
        Ok(())
    } else {
        Err(AppError::InsufficientBalance { available: balance, required: cost })
    }
}

pub fn ensure_in_stock(stock: i64, quantity: i64) -> AppResult<()> {
    if stock >= quantity {
        Ok(())
    } else {
        Err(AppError::InsufficientStock { available: stock, requested: quantity })
    }
}

pub fn purchase_total(unit_price: i64, quantity: i64) -> AppResult<i64> {
    unit_price
        .checked_mul(quantity)
        .ok_or_else(|| AppError::Validation("Purchase total is too large".into()))
}

pub fn add_conso(conso: i64, spent: i64) -> AppResult<i64> {
    conso
        .checked_add(spent)
        .ok_or_else(|| AppError::Validation("Stand consumption overflow".into()))
}

/// Montant en centimes pour la passerelle (prix arrondi au centime)
pub fn amount_in_cents(price: Decimal) -> AppResult<i64> {
    if price <= Decimal::ZERO {
        return Err(AppError::Validation("Price must be greater than 0".into()));
    }
    (price * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| AppError::Validation("Price is too large".into()))
}

async fn lock_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<users::Model> {
    users::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn lock_stand<C: ConnectionTrait>(conn: &C, stand_id: i32) -> AppResult<stand::Model> {
    stand::Entity::find_by_id(stand_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Stand not found".into()))
}

fn child_not_found(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::NotFound("Child not found".into()),
        other => other,
    }
}

async fn record_history<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    nb_jetons: i64,
    stand_name: &str,
) -> AppResult<history::Model> {
    let entry = history::ActiveModel {
        date: Set(Utc::now()),
        nb_jetons: Set(nb_jetons),
        stand_name: Set(stand_name.to_string()),
        user_id: Set(user_id),
        ..Default::default()
    };
    Ok(entry.insert(conn).await?)
}

impl LedgerService {
    /// Interaction avec un stand : le prix fixe du stand est débité
    pub async fn interact(
        db: &DatabaseConnection,
        user_id: i32,
        stand_id: i32,
    ) -> AppResult<InteractionOutcome> {
        let txn = db.begin().await?;

        // 1. Verrouiller l'utilisateur puis le stand
        let user = lock_user(&txn, user_id).await?;
        let stand = lock_stand(&txn, stand_id).await?;

        // 2. Vérifier le solde
        let cost = stand.jetons_requis;
        ensure_can_spend(user.jetons, cost)?;

        // 3. Créditer la consommation du stand, débiter l'utilisateur
        let stand_name = stand.name.clone();
        let new_conso = add_conso(stand.conso, cost)?;
        let mut active_stand: stand::ActiveModel = stand.into();
        active_stand.conso = Set(new_conso);
        let stand = active_stand.update(&txn).await?;

        let new_balance = user.jetons - cost;
        let mut active_user: users::ActiveModel = user.into();
        active_user.jetons = Set(new_balance);
        let user = active_user.update(&txn).await?;

        // 4. Historiser puis valider
        record_history(&txn, user.id, cost, &stand_name).await?;
        txn.commit().await?;

        tracing::info!(user_id, stand_id, cost, balance = user.jetons, "stand interaction");

        Ok(InteractionOutcome {
            stand_conso: stand.conso,
            jetons: user.jetons,
        })
    }

    /// Achat de `quantity` produits sur un stand
    pub async fn purchase(
        db: &DatabaseConnection,
        user_id: i32,
        stand_id: i32,
        product_id: i32,
        quantity: i64,
    ) -> AppResult<PurchaseOutcome> {
        if quantity < 1 {
            return Err(AppError::Validation("Quantity must be at least 1".into()));
        }

        let txn = db.begin().await?;

        let user = lock_user(&txn, user_id).await?;
        let stand = lock_stand(&txn, stand_id).await?;
        let product = product::Entity::find_by_id(product_id)
            .filter(product::Column::StandId.eq(stand_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found on this stand".into()))?;

        // Stock d'abord, puis solde
        ensure_in_stock(product.stock, quantity)?;
        let total = purchase_total(product.jetons_requis, quantity)?;
        ensure_can_spend(user.jetons, total)?;
        let new_conso = add_conso(stand.conso, total)?;

        let new_stock = product.stock - quantity;
        let mut active_product: product::ActiveModel = product.into();
        active_product.stock = Set(new_stock);
        let product = active_product.update(&txn).await?;

        let stand_name = stand.name.clone();
        let mut active_stand: stand::ActiveModel = stand.into();
        active_stand.conso = Set(new_conso);
        active_stand.update(&txn).await?;

        let new_balance = user.jetons - total;
        let mut active_user: users::ActiveModel = user.into();
        active_user.jetons = Set(new_balance);
        let user = active_user.update(&txn).await?;

        record_history(&txn, user.id, total, &stand_name).await?;
        txn.commit().await?;

        tracing::info!(user_id, stand_id, product_id, quantity, total, "product purchase");

        Ok(PurchaseOutcome {
            product_id: product.id,
            quantity,
            total_jetons: total,
            remaining_stock: product.stock,
            jetons: user.jetons,
        })
    }

    /// Attribution de points par le teneur d'un stand.
    /// Le contrôle "propriétaire du stand" est fait par l'appelant via la policy.
    pub async fn give_points(
        db: &DatabaseConnection,
        stand: &stand::Model,
        target_user_id: i32,
        points: i64,
    ) -> AppResult<PointsOutcome> {
        if points < 1 {
            return Err(AppError::Validation("Points must be at least 1".into()));
        }

        let txn = db.begin().await?;

        let target = lock_user(&txn, target_user_id).await?;
        let stand = lock_stand(&txn, stand.id).await?;

        let new_points = target
            .pts_attribues
            .checked_add(points)
            .ok_or_else(|| AppError::Validation("Points overflow".into()))?;
        let mut active_target: users::ActiveModel = target.into();
        active_target.pts_attribues = Set(new_points);
        let target = active_target.update(&txn).await?;

        let new_given = stand
            .pts_donnes
            .checked_add(points)
            .ok_or_else(|| AppError::Validation("Points overflow".into()))?;
        let mut active_stand: stand::ActiveModel = stand.into();
        active_stand.pts_donnes = Set(new_given);
        active_stand.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(target_user_id, points, "points given");

        Ok(PointsOutcome {
            user_id: target.id,
            points_given: points,
            pts_attribues: target.pts_attribues,
        })
    }

    /// Transfert de jetons d'un parent vers un de ses enfants
    pub async fn transfer_to_child(
        db: &DatabaseConnection,
        parent_id: i32,
        child_id: i32,
        amount: i64,
    ) -> AppResult<TransferOutcome> {
        if amount < 1 {
            return Err(AppError::Validation("nb_jetons must be at least 1".into()));
        }
        if parent_id == child_id {
            return Err(AppError::Validation("Cannot transfer coins to yourself".into()));
        }

        let txn = db.begin().await?;

        // 1. Verrouiller les deux comptes dans l'ordre des ids
        let (parent, child) = if parent_id < child_id {
            let parent = lock_user(&txn, parent_id).await?;
            let child = lock_user(&txn, child_id)
                .await
                .map_err(child_not_found)?;
            (parent, child)
        } else {
            let child = lock_user(&txn, child_id)
                .await
                .map_err(child_not_found)?;
            let parent = lock_user(&txn, parent_id).await?;
            (parent, child)
        };

        // 2. Vérifier le lien parent -> enfant
        let link = user_children::Entity::find_by_id((parent.id, child.id))
            .one(&txn)
            .await?;
        if link.is_none() {
            return Err(AppError::Forbidden(
                "You are not authorized to give coins to this child".into(),
            ));
        }

        // 3. Vérifier le solde puis déplacer les jetons
        ensure_can_spend(parent.jetons, amount)?;

        let parent_balance = parent.jetons - amount;
        let child_balance = child
            .jetons
            .checked_add(amount)
            .ok_or_else(|| AppError::Validation("Child balance overflow".into()))?;

        let mut active_parent: users::ActiveModel = parent.into();
        active_parent.jetons = Set(parent_balance);
        let parent = active_parent.update(&txn).await?;

        let mut active_child: users::ActiveModel = child.into();
        active_child.jetons = Set(child_balance);
        let child = active_child.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(parent_id, child_id, amount, "coins transferred to child");

        Ok(TransferOutcome {
            parent_coins: parent.jetons,
            child_coins: child.jetons,
        })
    }

    /// Paiement : crée l'intention côté passerelle puis enregistre la transaction.
    /// Pour une recharge, les jetons sont crédités dès la création de
    /// l'intention, sans attendre la confirmation du paiement.
    pub async fn record_payment(
        db: &DatabaseConnection,
        gateway: &dyn PaymentGateway,
        currency: &str,
        order: PaymentOrder,
    ) -> AppResult<PaymentOutcome> {
        let PaymentOrder { user_id, kind, quantity, price, idempotency_key } = order;
        if quantity < 1 {
            return Err(AppError::Validation("Quantity must be at least 1".into()));
        }
        let amount_cents = amount_in_cents(price)?;

        // 1. Appel réseau hors transaction : aucun changement si la passerelle échoue
        let description = format!("kermesse {} x{}", kind.as_str(), quantity);
        let intent = gateway
            .create_intent(amount_cents, currency, &description, idempotency_key.as_deref())
            .await?;

        let txn = db.begin().await?;

        // 2. Recharge de jetons
        if kind == PaymentKind::Jetons {
            let user = lock_user(&txn, user_id).await?;
            let new_balance = user
                .jetons
                .checked_add(quantity)
                .ok_or_else(|| AppError::Validation("Balance overflow".into()))?;
            let mut active_user: users::ActiveModel = user.into();
            active_user.jetons = Set(new_balance);
            active_user.update(&txn).await?;

            tracing::warn!(
                user_id,
                quantity,
                payment_intent = %intent.id,
                "jetons credited before payment capture"
            );
        }

        // 3. Toujours enregistrer la transaction
        let record = transaction::ActiveModel {
            kind: Set(kind.as_str().to_string()),
            date: Set(Utc::now()),
            price: Set(price),
            quantity: Set(quantity),
            payment_intent_id: Set(intent.id.clone()),
            user_id: Set(user_id),
            ..Default::default()
        };
        let transaction = record.insert(&txn).await?;

        txn.commit().await?;

        Ok(PaymentOutcome {
            payment_intent: intent,
            transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::payment_gateway::fake::FakeGateway;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::str::FromStr;

    fn user(id: i32, role: i32, jetons: i64) -> users::Model {
        users::Model {
            id,
            firstname: format!("First{}", id),
            lastname: format!("Last{}", id),
            email: format!("user{}@ecole.fr", id),
            password_hash: "pbkdf2:sha256:1000$x$y".to_string(),
            picture: None,
            role,
            jetons,
            pts_attribues: 0,
        }
    }

    fn stand(id: i32, owner: i32, price: i64, conso: i64) -> stand::Model {
        stand::Model {
            id,
            name: "Pêche aux canards".to_string(),
            stand_type: "jeu".to_string(),
            jetons_requis: price,
            conso,
            pts_donnes: 0,
            user_id: owner,
        }
    }

    fn crepe(stock: i64, price: i64) -> product::Model {
        product::Model {
            id: 7,
            name: "Crêpe".to_string(),
            picture: None,
            product_type: "nourriture".to_string(),
            jetons_requis: price,
            stock,
            stand_id: 10,
        }
    }

    fn order(kind: PaymentKind, quantity: i64, price: i64) -> PaymentOrder {
        PaymentOrder {
            user_id: 1,
            kind,
            quantity,
            price: Decimal::from(price),
            idempotency_key: None,
        }
    }

    fn history_row(user_id: i32, nb_jetons: i64) -> history::Model {
        history::Model {
            id: 1,
            date: Utc::now(),
            nb_jetons,
            stand_name: "Pêche aux canards".to_string(),
            user_id,
        }
    }

    #[test]
    fn test_spend_boundary_rejects_equal_balance() {
        assert!(ensure_can_spend(6, 5).is_ok());
        assert!(matches!(
            ensure_can_spend(5, 5),
            Err(AppError::InsufficientBalance { available: 5, required: 5 })
        ));
        assert!(ensure_can_spend(4, 5).is_err());
        assert!(ensure_can_spend(0, 0).is_err());
    }

    #[test]
    fn test_stock_check() {
        assert!(ensure_in_stock(3, 3).is_ok());
        assert!(matches!(
            ensure_in_stock(2, 3),
            Err(AppError::InsufficientStock { available: 2, requested: 3 })
        ));
    }

    #[test]
    fn test_purchase_total_overflow() {
        assert_eq!(purchase_total(4, 3).unwrap(), 12);
        assert!(purchase_total(i64::MAX, 2).is_err());
    }

    #[test]
    fn test_amount_in_cents() {
        assert_eq!(amount_in_cents(Decimal::from_str("12.5").unwrap()).unwrap(), 1250);
        assert_eq!(amount_in_cents(Decimal::from_str("0.015").unwrap()).unwrap(), 2);
        assert!(amount_in_cents(Decimal::ZERO).is_err());
        assert!(amount_in_cents(Decimal::from_str("-3").unwrap()).is_err());
    }

    #[test]
    fn test_payment_kind_parse() {
        assert_eq!(PaymentKind::parse("jetons").unwrap(), PaymentKind::Jetons);
        assert_eq!(PaymentKind::parse("tombola").unwrap(), PaymentKind::Tombola);
        assert!(matches!(PaymentKind::parse("bitcoin"), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_interact_debits_user_and_credits_stand() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, 20)]])
            .append_query_results([vec![stand(10, 3, 5, 40)]])
            .append_query_results([vec![stand(10, 3, 5, 45)]])
            .append_query_results([vec![user(1, 5, 15)]])
            .append_query_results([vec![history_row(1, 5)]])
            .into_connection();

        let outcome = LedgerService::interact(&db, 1, 10).await.unwrap();
        assert_eq!(outcome.jetons, 15);
        assert_eq!(outcome.stand_conso, 45);

        assert!(!db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_interact_rejects_balance_equal_to_price() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, 5)]])
            .append_query_results([vec![stand(10, 3, 5, 0)]])
            .into_connection();

        let result = LedgerService::interact(&db, 1, 10).await;
        assert!(matches!(
            result,
            Err(AppError::InsufficientBalance { available: 5, required: 5 })
        ));
    }

    #[tokio::test]
    async fn test_interact_unknown_stand() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, 50)]])
            .append_query_results([Vec::<stand::Model>::new()])
            .into_connection();

        assert!(matches!(
            LedgerService::interact(&db, 1, 99).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_purchase_rejects_insufficient_stock() {
        let product = product::Model {
            id: 7,
            name: "Crêpe".to_string(),
            picture: None,
            product_type: "nourriture".to_string(),
            jetons_requis: 2,
            stock: 1,
            stand_id: 10,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, 100)]])
            .append_query_results([vec![stand(10, 3, 5, 0)]])
            .append_query_results([vec![product]])
            .into_connection();

        assert!(matches!(
            LedgerService::purchase(&db, 1, 10, 7, 2).await,
            Err(AppError::InsufficientStock { available: 1, requested: 2 })
        ));
    }

    #[tokio::test]
    async fn test_parent_gives_coins_to_linked_child() {
        // Parent A (100 jetons) -> enfant B (0 jeton), transfert de 30
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 4, 100)]])
            .append_query_results([vec![user(2, 5, 0)]])
            .append_query_results([vec![user_children::Model { parent_id: 1, child_id: 2 }]])
            .append_query_results([vec![user(1, 4, 70)]])
            .append_query_results([vec![user(2, 5, 30)]])
            .into_connection();

        let outcome = LedgerService::transfer_to_child(&db, 1, 2, 30).await.unwrap();
        assert_eq!(outcome.parent_coins, 70);
        assert_eq!(outcome.child_coins, 30);
    }

    #[tokio::test]
    async fn test_give_coins_requires_link() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 4, 100)]])
            .append_query_results([vec![user(2, 5, 0)]])
            .append_query_results([Vec::<user_children::Model>::new()])
            .into_connection();

        assert!(matches!(
            LedgerService::transfer_to_child(&db, 1, 2, 30).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_payment_gateway_failure_changes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let gateway = FakeGateway::failing();

        let result = LedgerService::record_payment(&db, &gateway, "eur", order(PaymentKind::Jetons, 10, 5)).await;

        assert!(matches!(result, Err(AppError::PaymentGateway(_))));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_tombola_payment_records_transaction_without_credit() {
        let row = transaction::Model {
            id: 1,
            kind: "tombola".to_string(),
            date: Utc::now(),
            price: Decimal::from(2),
            quantity: 1,
            payment_intent_id: "pi_test_123".to_string(),
            user_id: 1,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let gateway = FakeGateway::ok();

        let outcome = LedgerService::record_payment(&db, &gateway, "eur", order(PaymentKind::Tombola, 1, 2))
            .await
            .unwrap();

        assert_eq!(outcome.payment_intent.amount, 200);
        assert_eq!(outcome.transaction.kind, "tombola");
        assert_eq!(gateway.calls.lock().unwrap().as_slice(), &[(200, "eur".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_jetons_payment_credits_balance() {
        let row = transaction::Model {
            id: 4,
            kind: "jetons".to_string(),
            date: Utc::now(),
            price: Decimal::from(5),
            quantity: 10,
            payment_intent_id: "pi_test_123".to_string(),
            user_id: 1,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, 10)]])
            .append_query_results([vec![user(1, 5, 20)]])
            .append_query_results([vec![row]])
            .into_connection();
        let gateway = FakeGateway::ok();

        let outcome = LedgerService::record_payment(&db, &gateway, "eur", order(PaymentKind::Jetons, 10, 5))
            .await
            .unwrap();
        assert_eq!(outcome.transaction.kind, "jetons");
        assert_eq!(outcome.transaction.quantity, 10);

        // Verrou, solde 10 + 10 puis insertion liée à l'intention
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("BigInt(Some(20))"));
        assert!(log.contains("pi_test_123"));
    }

    #[tokio::test]
    async fn test_payment_forwards_idempotency_key() {
        let row = transaction::Model {
            id: 1,
            kind: "tombola".to_string(),
            date: Utc::now(),
            price: Decimal::from(2),
            quantity: 1,
            payment_intent_id: "pi_test_123".to_string(),
            user_id: 1,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let gateway = FakeGateway::ok();

        let mut request = order(PaymentKind::Tombola, 1, 2);
        request.idempotency_key = Some("1:6f1c1c0e-8a4b-4a44-9d3e-2b8f0f6c9a10".to_string());
        LedgerService::record_payment(&db, &gateway, "eur", request).await.unwrap();

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls[0].2.as_deref(), Some("1:6f1c1c0e-8a4b-4a44-9d3e-2b8f0f6c9a10"));
    }

    #[tokio::test]
    async fn test_purchase_updates_stock_balance_and_conso() {
        // 2 crêpes à 4 jetons : stock 5 -> 3, solde 20 -> 12, conso 40 -> 48
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, 20)]])
            .append_query_results([vec![stand(10, 3, 5, 40)]])
            .append_query_results([vec![crepe(5, 4)]])
            .append_query_results([vec![crepe(3, 4)]])
            .append_query_results([vec![stand(10, 3, 5, 48)]])
            .append_query_results([vec![user(1, 5, 12)]])
            .append_query_results([vec![history_row(1, 8)]])
            .into_connection();

        let outcome = LedgerService::purchase(&db, 1, 10, 7, 2).await.unwrap();
        assert_eq!(outcome.product_id, 7);
        assert_eq!(outcome.total_jetons, 8);
        assert_eq!(outcome.remaining_stock, 3);
        assert_eq!(outcome.jetons, 12);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("BigInt(Some(3))"));
        assert!(log.contains("BigInt(Some(48))"));
        assert!(log.contains("BigInt(Some(12))"));
        assert!(log.contains("history"));
    }

    #[tokio::test]
    async fn test_purchase_rejects_balance_equal_to_total() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, 8)]])
            .append_query_results([vec![stand(10, 3, 5, 0)]])
            .append_query_results([vec![crepe(5, 4)]])
            .into_connection();

        assert!(matches!(
            LedgerService::purchase(&db, 1, 10, 7, 2).await,
            Err(AppError::InsufficientBalance { available: 8, required: 8 })
        ));
    }

    #[test]
    fn test_add_conso_overflow() {
        assert_eq!(add_conso(40, 5).unwrap(), 45);
        assert!(matches!(add_conso(i64::MAX, 1), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_purchase_rejects_consumption_overflow() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, i64::MAX)]])
            .append_query_results([vec![stand(10, 3, 5, 10)]])
            .append_query_results([vec![crepe(5, i64::MAX - 1)]])
            .into_connection();

        assert!(matches!(
            LedgerService::purchase(&db, 1, 10, 7, 1).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_interact_rejects_consumption_overflow() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, 5, i64::MAX)]])
            .append_query_results([vec![stand(10, 3, 5, i64::MAX)]])
            .into_connection();

        assert!(matches!(
            LedgerService::interact(&db, 1, 10).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_give_points_updates_user_and_stand() {
        let mut rewarded = user(2, 5, 0);
        rewarded.pts_attribues = 5;
        let mut given = stand(10, 3, 5, 0);
        given.pts_donnes = 5;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(2, 5, 0)]])
            .append_query_results([vec![stand(10, 3, 5, 0)]])
            .append_query_results([vec![rewarded]])
            .append_query_results([vec![given]])
            .into_connection();

        let outcome = LedgerService::give_points(&db, &stand(10, 3, 5, 0), 2, 5).await.unwrap();
        assert_eq!(outcome.user_id, 2);
        assert_eq!(outcome.points_given, 5);
        assert_eq!(outcome.pts_attribues, 5);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("pts_attribues"));
        assert!(log.contains("pts_donnes"));
    }
}
