//! Federated login integration tests against a mocked identity provider.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use otp_wallet_service::IdentityConfig;
use otp_wallet_store::Store;

const AUDIENCE: &str = "otp-wallet";
const KEY_ID: &str = "test-key";

/// Private half of the key published by the mocked JWKS below.
const SIGNING_KEY_PEM: &[u8] = include_bytes!("fixtures/identity_rsa.pem");

const MODULUS: &str = "u8fXsl4lLQCiZh40KyJ7w9kaFuG1ZmCkuvGbcS7Whm2wiTNSDjuJKQ_wuweFojltgRVYZPhwb2XqG4-aX9tZsruFKSFKfRrWOAlkiaHF37jVOqBgQ7ejMTUSd4IBByWE3Z7kZGJO8_d7XfuRkCxEXcrmxvgYzue0C4b-3K_d9qiO-ck898LiF9NXvvwaxeYgVGFjriFoM2ehsyuNl3mGr9bwVhauzfGNU1GiLi69vVNef35OXwCKT90DOHJBq-GRUIKLL7xW-ede4a_B-k2etBl1KQGlog34RugwMHaVeiZbxFN8Ve2lzjDb-E5BoHh7omvMM_i2Yecb2FTa-UNOTw";
const EXPONENT: &str = "AQAB";

/// Start an identity provider serving the test key set.
async fn identity_provider() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{
                "kty": "RSA",
                "kid": KEY_ID,
                "alg": "RS256",
                "use": "sig",
                "n": MODULUS,
                "e": EXPONENT
            }]
        })))
        .mount(&server)
        .await;

    server
}

fn harness_for(issuer: &str, admins: &[&str]) -> TestHarness {
    let issuer = issuer.to_string();
    let admins: Vec<String> = admins.iter().map(|a| (*a).to_string()).collect();
    TestHarness::with_config(move |config| {
        config.identity = Some(IdentityConfig {
            issuer,
            audience: AUDIENCE.into(),
        });
        config.admin_usernames.extend(admins);
    })
}

/// Sign an ID token with the test key, merging `extra` into standard claims.
fn id_token(issuer: &str, extra: Value) -> String {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "iss": issuer,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 600,
    });
    if let (Some(claims), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
        claims.extend(extra.clone());
    }

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KEY_ID.into());
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY_PEM).unwrap();
    encode(&header, &claims, &key).unwrap()
}

async fn federated_login(harness: &TestHarness, token: &str) -> axum_test::TestResponse {
    harness
        .server
        .post("/api/federated-auth")
        .json(&json!({ "id_token": token }))
        .await
}

#[tokio::test]
async fn first_login_creates_user_and_later_logins_reuse_it() {
    let idp = identity_provider().await;
    let issuer = idp.uri();
    let harness = harness_for(&issuer, &[]);

    let claims = json!({ "sub": "idp|123", "email": "asha@example.com", "name": "Asha" });

    let first = federated_login(&harness, &id_token(&issuer, claims.clone())).await;
    first.assert_status_ok();
    let first: Value = first.json();
    assert_eq!(first["user"]["username"], "asha@example.com");
    assert_eq!(first["user"]["name"], "Asha");
    assert_eq!(first["user"]["is_admin"], false);

    let second = federated_login(&harness, &id_token(&issuer, claims)).await;
    second.assert_status_ok();
    let second: Value = second.json();
    assert_eq!(second["user"]["id"], first["user"]["id"]);
    assert_ne!(second["token"], first["token"]);

    // The session works like any other
    let me = harness
        .server
        .get("/api/user")
        .add_header("authorization", common::bearer(&second))
        .await;
    me.assert_status_ok();
    let me: Value = me.json();
    assert_eq!(me["id"], first["user"]["id"]);

    // Keys were fetched once and served from cache afterwards
    let fetches = idp.received_requests().await.unwrap();
    assert_eq!(fetches.len(), 1);
}

#[tokio::test]
async fn subject_is_used_without_email() {
    let idp = identity_provider().await;
    let issuer = idp.uri();
    let harness = harness_for(&issuer, &[]);

    let response =
        federated_login(&harness, &id_token(&issuer, json!({ "sub": "idp|456" }))).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "idp|456");
    assert_eq!(body["user"]["name"], "idp|456");
    assert!(harness
        .store
        .get_user_by_username("idp|456")
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn listed_admin_is_promoted_on_federated_login() {
    let idp = identity_provider().await;
    let issuer = idp.uri();
    let harness = harness_for(&issuer, &["boss@example.com"]);

    let response = federated_login(
        &harness,
        &id_token(&issuer, json!({ "sub": "idp|1", "email": "boss@example.com" })),
    )
    .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["is_admin"], true);

    harness
        .server
        .get("/api/admin/admins")
        .add_header("authorization", common::bearer(&body))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn simultaneous_first_logins_share_one_user() {
    let idp = identity_provider().await;
    let issuer = idp.uri();
    let harness = harness_for(&issuer, &[]);

    let claims = json!({ "sub": "idp|789", "email": "ravi@example.com" });
    let token_a = id_token(&issuer, claims.clone());
    let token_b = id_token(&issuer, claims);

    let (a, b) = tokio::join!(
        federated_login(&harness, &token_a),
        federated_login(&harness, &token_b)
    );
    a.assert_status_ok();
    b.assert_status_ok();

    let a: Value = a.json();
    let b: Value = b.json();
    assert_eq!(a["user"]["id"], b["user"]["id"]);
}

#[tokio::test]
async fn issuer_with_trailing_slash_finds_keys() {
    let idp = identity_provider().await;
    let issuer = format!("{}/", idp.uri());
    let harness = harness_for(&issuer, &[]);

    let response = federated_login(
        &harness,
        &id_token(&issuer, json!({ "sub": "idp|1", "email": "asha@example.com" })),
    )
    .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn tokens_for_another_audience_or_issuer_are_rejected() {
    let idp = identity_provider().await;
    let issuer = idp.uri();
    let harness = harness_for(&issuer, &[]);

    let wrong_audience = id_token(&issuer, json!({ "sub": "idp|1", "aud": "someone-else" }));
    federated_login(&harness, &wrong_audience)
        .await
        .assert_status_unauthorized();

    let wrong_issuer = id_token("https://evil.example.com", json!({ "sub": "idp|1" }));
    federated_login(&harness, &wrong_issuer)
        .await
        .assert_status_unauthorized();

    let now = chrono::Utc::now().timestamp();
    let expired = id_token(
        &issuer,
        json!({ "sub": "idp|1", "iat": now - 7_200, "exp": now - 3_600 }),
    );
    federated_login(&harness, &expired)
        .await
        .assert_status_unauthorized();

    assert!(harness.store.get_user_by_username("idp|1").unwrap().is_none());
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let idp = identity_provider().await;
    let issuer = idp.uri();
    let harness = harness_for(&issuer, &[]);

    let genuine = id_token(&issuer, json!({ "sub": "idp|1" }));
    let forged = id_token(&issuer, json!({ "sub": "idp|admin" }));

    // Forged claims under the genuine token's signature
    let genuine: Vec<&str> = genuine.split('.').collect();
    let forged: Vec<&str> = forged.split('.').collect();
    let tampered = format!("{}.{}.{}", genuine[0], forged[1], genuine[2]);

    federated_login(&harness, &tampered)
        .await
        .assert_status_unauthorized();
    assert!(harness
        .store
        .get_user_by_username("idp|admin")
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn unreachable_key_set_is_bad_gateway() {
    let idp = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&idp)
        .await;
    let issuer = idp.uri();
    let harness = harness_for(&issuer, &[]);

    let response =
        federated_login(&harness, &id_token(&issuer, json!({ "sub": "idp|1" }))).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "external_service_error");
}
