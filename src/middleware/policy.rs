//! Route → access requirement table consulted by [`AuthGate`](super::auth::AuthGate).
//!
//! Routes that are not listed are public.

use actix_web::dev::ResourceDef;
use actix_web::http::Method;
use lazy_static::lazy_static;

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

struct Rule {
    method: Method,
    pattern: ResourceDef,
    access: Access,
}

fn rule(method: Method, pattern: &str, access: Access) -> Rule {
    Rule {
        method,
        pattern: ResourceDef::new(pattern),
        access,
    }
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        rule(Method::GET, "/applications", Access::Authenticated),
        rule(Method::GET, "/reviews", Access::Authenticated),
        rule(Method::GET, "/payments", Access::Authenticated),
        rule(Method::GET, "/users", Access::Role(Role::Admin)),
        rule(Method::PATCH, "/users/role/{id}", Access::Role(Role::Admin)),
        rule(Method::DELETE, "/users/{id}", Access::Role(Role::Admin)),
    ];
}

pub fn required_access(method: &Method, path: &str) -> Access {
    RULES
        .iter()
        .find(|rule| rule.method == *method && rule.pattern.is_match(path))
        .map(|rule| rule.access)
        .unwrap_or(Access::Public)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_routes_are_guarded() {
        assert_eq!(required_access(&Method::GET, "/applications"), Access::Authenticated);
        assert_eq!(required_access(&Method::GET, "/reviews"), Access::Authenticated);
        assert_eq!(required_access(&Method::GET, "/payments"), Access::Authenticated);
        assert_eq!(required_access(&Method::GET, "/users"), Access::Role(Role::Admin));
        assert_eq!(
            required_access(&Method::PATCH, "/users/role/65f1c0ffee00000000000001"),
            Access::Role(Role::Admin)
        );
        assert_eq!(
            required_access(&Method::DELETE, "/users/65f1c0ffee00000000000001"),
            Access::Role(Role::Admin)
        );
    }

    #[test]
    fn test_method_and_shape_must_both_match() {
        assert_eq!(required_access(&Method::POST, "/applications"), Access::Public);
        assert_eq!(required_access(&Method::POST, "/users"), Access::Public);
        assert_eq!(required_access(&Method::GET, "/users/a@b.com/role"), Access::Public);
        assert_eq!(required_access(&Method::GET, "/reviews/65f1c0ffee00000000000001"), Access::Public);
        assert_eq!(required_access(&Method::GET, "/applications/check"), Access::Public);
        assert_eq!(required_access(&Method::GET, "/"), Access::Public);
    }
}
