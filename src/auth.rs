use actix_identity::IdentityExt;
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    HttpResponse,
};

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_PREFIX: &str = "/admin";
pub const DASHBOARD_PREFIX: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";

pub const STATIC_PREFIX: &str = "/static/";
pub const SEED_PATH: &str = "/seed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Admin,
    Dashboard,
    Other,
}

impl PathClass {
    pub fn of(path: &str) -> Self {
        if path.starts_with(ADMIN_PREFIX) {
            PathClass::Admin
        } else if path.starts_with(DASHBOARD_PREFIX) {
            PathClass::Dashboard
        } else {
            PathClass::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Sent to the sign-in page.
    Deny,
    RedirectToDashboard,
}

pub fn decide(authenticated: bool, is_admin: bool, class: PathClass) -> Access {
    match class {
        PathClass::Admin if authenticated && is_admin => Access::Allow,
        PathClass::Admin => Access::Deny,
        PathClass::Dashboard if authenticated => Access::Allow,
        PathClass::Dashboard => Access::Deny,
        PathClass::Other if authenticated => Access::RedirectToDashboard,
        PathClass::Other => Access::Allow,
    }
}

/// `identity` is the signed-in user's email, if any.
pub fn authorize(identity: Option<&str>, path: &str) -> Access {
    let is_admin = identity.is_some_and(|email| email == ADMIN_EMAIL);
    decide(identity.is_some(), is_admin, PathClass::of(path))
}

/// Static assets and the seed endpoint are served without consulting the policy.
pub fn is_unguarded(path: &str) -> bool {
    path == SEED_PATH || path.starts_with(STATIC_PREFIX)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location))
        .finish()
}

/// Route guard, registered inside the identity and session middleware.
pub async fn access_guard(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let path = req.path().to_owned();
    if is_unguarded(&path) {
        return Ok(next.call(req).await?.map_into_left_body::<BoxBody>());
    }

    let identity = req.get_identity().ok().and_then(|id| id.id().ok());

    match authorize(identity.as_deref(), &path) {
        Access::Allow => Ok(next.call(req).await?.map_into_left_body::<BoxBody>()),
        Access::Deny => {
            log::info!("Denied {} for {:?}, redirecting to sign-in", path, identity);
            Ok(req.into_response(see_other(LOGIN_PATH)).map_into_right_body())
        }
        Access::RedirectToDashboard => {
            Ok(req.into_response(see_other(DASHBOARD_PREFIX)).map_into_right_body())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_paths_by_prefix() {
        assert_eq!(PathClass::of("/admin"), PathClass::Admin);
        assert_eq!(PathClass::of("/admin/users"), PathClass::Admin);
        assert_eq!(PathClass::of("/dashboard"), PathClass::Dashboard);
        assert_eq!(PathClass::of("/dashboard/invoices/create"), PathClass::Dashboard);
        assert_eq!(PathClass::of("/"), PathClass::Other);
        assert_eq!(PathClass::of("/login"), PathClass::Other);
        assert_eq!(PathClass::of("/signup"), PathClass::Other);
    }

    #[test]
    fn only_assets_and_seed_skip_the_guard() {
        assert!(is_unguarded("/seed"));
        assert!(is_unguarded("/static/styles.css"));
        for path in ["/seeds", "/seedling", "/seed/extra", "/static", "/staticfoo", "/dashboard"] {
            assert!(!is_unguarded(path), "{}", path);
        }
    }

    #[test]
    fn every_combination() {
        use Access::*;
        use PathClass::*;

        let cases = [
            // authenticated, admin email, path class, outcome
            (true, true, Admin, Allow),
            (true, false, Admin, Deny),
            (false, true, Admin, Deny),
            (false, false, Admin, Deny),
            (true, true, Dashboard, Allow),
            (true, false, Dashboard, Allow),
            (false, true, Dashboard, Deny),
            (false, false, Dashboard, Deny),
            (true, true, Other, RedirectToDashboard),
            (true, false, Other, RedirectToDashboard),
            (false, true, Other, Allow),
            (false, false, Other, Allow),
        ];

        for (authenticated, is_admin, class, expected) in cases {
            assert_eq!(
                decide(authenticated, is_admin, class),
                expected,
                "authenticated={} admin={} class={:?}",
                authenticated,
                is_admin,
                class
            );
        }
    }

    #[test]
    fn authorize_uses_the_identity_email() {
        assert_eq!(authorize(Some(ADMIN_EMAIL), "/admin"), Access::Allow);
        assert_eq!(authorize(Some("user@nextmail.com"), "/admin"), Access::Deny);
        assert_eq!(authorize(None, "/admin"), Access::Deny);
        assert_eq!(authorize(Some("user@nextmail.com"), "/dashboard/customers"), Access::Allow);
        assert_eq!(authorize(None, "/dashboard"), Access::Deny);
        assert_eq!(authorize(Some("user@nextmail.com"), "/login"), Access::RedirectToDashboard);
        assert_eq!(authorize(None, "/login"), Access::Allow);
    }
}
