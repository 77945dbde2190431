// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table créée par le crate `migration`.
//
// Liste des modules:
//   - health : Health check API
//   - users : Comptes (username unique, hash Django)
//   - departments : Catégories du catalogue
//   - movies : Films (compteur de vues, filtrage régional)
//   - movie_series : Épisodes d'un film
//   - comments : Commentaires (immuables)
//   - votes : Likes / dislikes (compte, session ou IP)
//   - saved_films : Films sauvegardés par un compte
//   - notifications : Annonces + IPs des lecteurs anonymes
//   - notification_reads : Lectures par compte
//   - password_reset_tokens : Codes à 6 chiffres (expire 5 min)
//   - dto : Formes des réponses API
//
// Points d'attention:
//   - Toutes les FK sont ON DELETE CASCADE (voir migration)
//   - Les contraintes d'unicité font le travail de déduplication
//
// ============================================================================

pub mod health;
pub mod users;
pub mod departments;
pub mod movies;
pub mod movie_series;
pub mod comments;
pub mod votes;
pub mod saved_films;
pub mod notifications;
pub mod notification_reads;
pub mod password_reset_tokens;
pub mod dto;
