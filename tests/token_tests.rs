use chrono::{Duration, Utc};
use restaurant_hunt::token::{IdentityClaims, TOKEN_TTL_DAYS, TokenError, TokenService};

const SECRET: &str = "token-test-secret-value";

#[test]
fn test_issued_token_verifies_immediately() {
    let service = TokenService::new(SECRET);

    let token = service.issue(IdentityClaims::for_email("a@b.com")).unwrap();
    let claims = service.verify(&token).unwrap();

    assert_eq!(claims.email, "a@b.com");
}

#[test]
fn test_token_valid_just_inside_five_days() {
    let service = TokenService::new(SECRET);
    let issued_at = Utc::now() - Duration::days(TOKEN_TTL_DAYS) + Duration::hours(1);

    let token = service
        .issue_at(IdentityClaims::for_email("a@b.com"), issued_at)
        .unwrap();

    assert!(service.verify(&token).is_ok());
}

#[test]
fn test_token_expires_after_five_days() {
    let service = TokenService::new(SECRET);
    let issued_at = Utc::now() - Duration::days(TOKEN_TTL_DAYS) - Duration::seconds(5);

    let token = service
        .issue_at(IdentityClaims::for_email("a@b.com"), issued_at)
        .unwrap();

    assert_eq!(service.verify(&token), Err(TokenError::Expired));
}

#[test]
fn test_token_expired_within_a_minute_of_boundary() {
    let service = TokenService::new(SECRET);
    let issued_at = Utc::now() - Duration::days(TOKEN_TTL_DAYS) - Duration::seconds(30);

    let token = service
        .issue_at(IdentityClaims::for_email("a@b.com"), issued_at)
        .unwrap();

    assert_eq!(service.verify(&token), Err(TokenError::Expired));
}

#[test]
fn test_foreign_secret_is_invalid() {
    let issuer = TokenService::new("someone-elses-secret");
    let token = issuer.issue(IdentityClaims::for_email("a@b.com")).unwrap();

    assert_eq!(
        TokenService::new(SECRET).verify(&token),
        Err(TokenError::Invalid)
    );
}

#[test]
fn test_tampered_payload_is_invalid() {
    let service = TokenService::new(SECRET);
    let token = service.issue(IdentityClaims::for_email("a@b.com")).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    parts[1] = parts[1].chars().rev().collect();
    let tampered = parts.join(".");

    assert_eq!(service.verify(&tampered), Err(TokenError::Invalid));
}

#[test]
fn test_client_supplied_expiry_is_ignored() {
    let service = TokenService::new(SECRET);
    let mut identity = IdentityClaims::for_email("a@b.com");
    identity.extra.insert("exp".to_string(), serde_json::json!(1));

    let token = service.issue(identity).unwrap();

    assert!(service.verify(&token).is_ok());
}
