// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - role : Rôles applicatifs (Admin, Organisateur, Teneur de stand, ...)
//   - users : Utilisateurs (jetons + points attribués)
//   - user_children : Liaison parents / enfants
//   - kermesse : Kermesses (événements)
//   - kermesse_organizers / kermesse_participants / kermesse_stands : liaisons
//   - stand : Stands (prix en jetons, consommation cumulée)
//   - product : Produits vendus par un stand (stock restant)
//   - history : Historique des dépenses de jetons
//   - transaction : Paiements (recharge de jetons, tombola)
//   - jeton : Catalogue des paquets de jetons
//   - dto : Requêtes / réponses de l'API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les tables de liaison ont une clé primaire composite
//   - Le rôle est stocké en entier, le code manipule toujours `Role`
//
// ============================================================================

pub mod health;
pub mod role;
pub mod users;
pub mod user_children;
pub mod kermesse;
pub mod kermesse_organizers;
pub mod kermesse_participants;
pub mod kermesse_stands;
pub mod stand;
pub mod product;
pub mod history;
pub mod transaction;
pub mod jeton;
pub mod dto;
