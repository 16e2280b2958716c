// connexion BD + création du schéma au démarrage

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::config::AppConfig;
use crate::models::{
    history, jeton, kermesse, kermesse_organizers, kermesse_participants, kermesse_stands, product, stand,
    transaction, user_children, users,
};

pub async fn establish_connection(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    Database::connect(&config.database_url).await
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Crée les tables absentes, dans l'ordre des clés étrangères
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, users::Entity).await?;
    create_table(db, &schema, user_children::Entity).await?;
    create_table(db, &schema, kermesse::Entity).await?;
    create_table(db, &schema, stand::Entity).await?;
    create_table(db, &schema, product::Entity).await?;
    create_table(db, &schema, kermesse_organizers::Entity).await?;
    create_table(db, &schema, kermesse_participants::Entity).await?;
    create_table(db, &schema, kermesse_stands::Entity).await?;
    create_table(db, &schema, history::Entity).await?;
    create_table(db, &schema, transaction::Entity).await?;
    create_table(db, &schema, jeton::Entity).await?;

    tracing::info!("database schema ready");
    Ok(())
}
