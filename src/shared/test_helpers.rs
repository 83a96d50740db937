use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::permissions::Role;

use axum::{extract::Request, middleware::Next, Router};

pub fn test_user(roles: Vec<Role>) -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1,
        email: "duty.officer@example.org".to_string(),
        staff_name: Some("Duty Officer".to_string()),
        roles,
    }
}

/// Layer that inserts `user` into every request, standing in for the auth middleware
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
