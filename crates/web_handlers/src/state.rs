use auth_services::jwt::SessionTokens;
use auth_services::service::AuthService;

use crate::listing_service::CampgroundService;

/// Services shared by every handler, registered as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Registration and credential checks
    pub auth: AuthService,
    /// Campground reads and writes
    pub listings: CampgroundService,
    /// Session token issuer
    pub tokens: SessionTokens,
}
