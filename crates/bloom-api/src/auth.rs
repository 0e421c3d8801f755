use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info, warn};
use uuid::Uuid;

use bloom_db::{Database, is_constraint_violation};
use bloom_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use bloom_types::models::User;

use crate::AppState;

const TOKEN_LIFETIME_DAYS: i64 = 30;

const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=32;
const MIN_PASSWORD_CHARS: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    validate_registration(&req)?;

    // Argon2 and the store lock both block
    let db = state.db.clone();
    let (user_id, username) = off_runtime(move || create_account(&db, req)).await?;
    info!("Registered user {} ({})", username, user_id);

    let token = create_token(&state.jwt_secret, user_id, &username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let (user_id, username) = off_runtime(move || verify_login(&db, &req)).await?;

    let token = create_token(&state.jwt_secret, user_id, &username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LoginResponse {
        user_id,
        username,
        token,
    }))
}

/// The account behind the bearer token.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let user = off_runtime(move || load_user(&db, claims.sub)).await?;
    Ok(Json(user))
}

fn validate_registration(req: &RegisterRequest) -> Result<(), StatusCode> {
    if !USERNAME_CHARS.contains(&req.username.chars().count()) {
        return Err(StatusCode::BAD_REQUEST);
    }
    if !req.email.contains('@') {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

fn create_account(db: &Database, req: RegisterRequest) -> Result<(Uuid, String), StatusCode> {
    // Check if username is taken
    if db
        .get_user_by_username(&req.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        return Err(StatusCode::CONFLICT);
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    let user_id = Uuid::new_v4();
    insert_account(db, user_id, &req.username, req.email.trim(), &password_hash)?;
    Ok((user_id, req.username))
}

/// A concurrent registration can take the name after the lookup above; the
/// UNIQUE constraint settles it.
fn insert_account(
    db: &Database,
    user_id: Uuid,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<(), StatusCode> {
    db.create_user(&user_id.to_string(), username, email, password_hash, Utc::now())
        .map_err(|e| {
            if is_constraint_violation(&e) {
                warn!("Username {} taken concurrently", username);
                StatusCode::CONFLICT
            } else {
                error!("Failed to create user {}: {}", username, e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })
}

fn verify_login(db: &Database, req: &LoginRequest) -> Result<(Uuid, String), StatusCode> {
    let user = db
        .get_user_by_username(&req.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Verify password
    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id: Uuid = user.id.parse().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((user_id, user.username))
}

fn load_user(db: &Database, id: Uuid) -> Result<User, StatusCode> {
    // A valid token can outlive its account
    let row = db
        .get_user_by_id(&id.to_string())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let created_at = row.created_at.parse::<DateTime<Utc>>().map_err(|e| {
        error!("Corrupt created_at '{}' on user '{}': {}", row.created_at, row.id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(User {
        id,
        username: row.username,
        email: row.email,
        created_at,
    })
}

async fn off_runtime<F, T>(f: F) -> Result<T, StatusCode>
where
    F: FnOnce() -> Result<T, StatusCode> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::decode_token;
    use crate::testutil::{SECRET, json_body, state};

    fn register_req(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: format!("{username}@example.org"),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = state();

        let resp = register(State(state.clone()), Json(register_req("maria", "hunter2hunter2")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let registered: RegisterResponse = json_body(resp).await;

        let resp = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "maria".into(),
                password: "hunter2hunter2".into(),
            }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let logged_in: LoginResponse = json_body(resp).await;
        assert_eq!(logged_in.user_id, registered.user_id);

        let claims = decode_token(SECRET, &logged_in.token).unwrap();
        assert_eq!(claims.sub, registered.user_id);
        assert_eq!(claims.username, "maria");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = state();
        register(State(state.clone()), Json(register_req("maria", "hunter2hunter2")))
            .await
            .unwrap();

        let result = login(
            State(state),
            Json(LoginRequest {
                username: "maria".into(),
                password: "not-the-password".into(),
            }),
        )
        .await;
        assert_eq!(result.err(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let state = state();
        register(State(state.clone()), Json(register_req("maria", "hunter2hunter2")))
            .await
            .unwrap();

        let again = register(State(state), Json(register_req("maria", "another-password"))).await;
        assert_eq!(again.err(), Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn rejects_bad_registration_input() {
        let state = state();
        let short_name = register(State(state.clone()), Json(register_req("al", "hunter2hunter2"))).await;
        assert_eq!(short_name.err(), Some(StatusCode::BAD_REQUEST));

        let short_password = register(State(state.clone()), Json(register_req("maria", "short"))).await;
        assert_eq!(short_password.err(), Some(StatusCode::BAD_REQUEST));

        let mut no_at = register_req("maria", "hunter2hunter2");
        no_at.email = "maria.example.org".into();
        assert_eq!(
            register(State(state), Json(no_at)).await.err(),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[tokio::test]
    async fn username_length_counts_characters() {
        let state = state();
        let cyrillic = "д".repeat(20);
        let resp = register(State(state.clone()), Json(register_req(&cyrillic, "hunter2hunter2")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let two_chars = register(State(state), Json(register_req("éé", "hunter2hunter2"))).await;
        assert_eq!(two_chars.err(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn lost_username_race_is_a_conflict() {
        let state = state();
        insert_account(&state.db, Uuid::new_v4(), "maria", "maria@example.org", "hash").unwrap();

        let loser = insert_account(&state.db, Uuid::new_v4(), "maria", "m@example.org", "hash");
        assert_eq!(loser, Err(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn me_returns_the_token_owner() {
        let state = state();
        let resp = register(State(state.clone()), Json(register_req("maria", "hunter2hunter2")))
            .await
            .into_response();
        let registered: RegisterResponse = json_body(resp).await;
        let claims = decode_token(SECRET, &registered.token).unwrap();

        let resp = me(State(state.clone()), Extension(claims.clone())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let user: User = json_body(resp).await;
        assert_eq!(user.id, registered.user_id);
        assert_eq!(user.username, "maria");
        assert_eq!(user.email, "maria@example.org");

        assert!(state.db.delete_user(&registered.user_id.to_string()).unwrap());
        let gone = me(State(state), Extension(claims)).await;
        assert_eq!(gone.err(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = create_token("another-secret", Uuid::new_v4(), "maria").unwrap();
        assert!(decode_token(SECRET, &token).is_err());
    }
}
