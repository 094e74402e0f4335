use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use sea_orm::{DatabaseConnection, EntityTrait};

use std::sync::Arc;

use crate::{balances, expenses, groups, import, user};
use ledger::{Ledger, NotificationDispatcher};

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub db: DatabaseConnection,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
}

/// `TypedHeader` identifying the acting user.
///
/// Every request must contain an "x-user-id" entry in the header.
#[derive(Debug)]
struct UserIdHeader(i32);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = value.parse() else {
            return Err(AxumError::invalid());
        };

        Ok(UserIdHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn auth(
    TypedHeader(UserIdHeader(user_id)): TypedHeader<UserIdHeader>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user: Option<user::Model> = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = if let Some(user) = user {
        user
    } else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get_detail).delete(expenses::remove),
        )
        .route("/balances", get(balances::friends))
        .route("/balances/{friend_id}", get(balances::with_friend))
        .route(
            "/balances/{friend_id}/expenses",
            get(balances::expenses_with_friend),
        )
        .route("/groups", post(groups::create).get(groups::list))
        .route("/groups/join", post(groups::join))
        .route("/import/splitwise/balances", post(import::balances))
        .route("/import/splitwise/groups", post(import::groups))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(
    ledger: Ledger,
    db: DatabaseConnection,
    dispatcher: Arc<dyn NotificationDispatcher>,
) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, db, dispatcher, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    dispatcher: Arc<dyn NotificationDispatcher>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
        db,
        dispatcher,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    dispatcher: Arc<dyn NotificationDispatcher>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, db, dispatcher, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, Set};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        Migrator::up(&db, None).await.expect("migrations");

        for (id, name) in [(1, "Alice"), (2, "Bob")] {
            user::ActiveModel {
                id: Set(id),
                name: Set(Some(name.to_string())),
                email: Set(Some(format!("{}@example.com", name.to_lowercase()))),
            }
            .insert(&db)
            .await
            .expect("seed user");
        }

        let ledger = Ledger::builder()
            .database(db.clone())
            .build()
            .await
            .expect("ledger");
        router(ServerState {
            ledger: Arc::new(ledger),
            db,
            dispatcher: Arc::new(crate::LogDispatcher),
        })
    }

    fn request(
        method: &str,
        uri: &str,
        user_id: Option<i32>,
        body: Option<Value>,
    ) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("x-user-id", user_id.to_string());
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    async fn body_json(res: Response) -> Value {
        let bytes = res
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn missing_user_header_is_rejected() {
        let router = test_router().await;

        let res = router
            .oneshot(request("GET", "/balances", None, None))
            .await
            .expect("response");

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let router = test_router().await;

        let res = router
            .oneshot(request("GET", "/balances", Some(99), None))
            .await
            .expect("response");

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expense_shows_up_in_pair_balances() {
        let router = test_router().await;

        let res = router
            .clone()
            .oneshot(request(
                "POST",
                "/expenses",
                Some(1),
                Some(json!({
                    "name": "Dinner",
                    "currency": "USD",
                    "amount": "100.00",
                    "participants": [
                        {"user_id": 1, "amount": "-50.00"},
                        {"user_id": 2, "amount": "-50.00"}
                    ]
                })),
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = body_json(res).await;
        assert_eq!(body["created"], json!(true));

        let res = router
            .oneshot(request("GET", "/balances/2", Some(1), None))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["friend_id"], json!(2));
        assert_eq!(body["balances"][0]["currency"], json!("USD"));
        assert_eq!(body["balances"][0]["amount"], json!("50.00"));
    }

    #[tokio::test]
    async fn malformed_amount_is_unprocessable() {
        let router = test_router().await;

        let res = router
            .oneshot(request(
                "POST",
                "/expenses",
                Some(1),
                Some(json!({
                    "name": "Dinner",
                    "currency": "USD",
                    "amount": "12.345",
                    "participants": []
                })),
            ))
            .await
            .expect("response");

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let router = test_router().await;

        let res = router
            .clone()
            .oneshot(request(
                "POST",
                "/expenses",
                Some(1),
                Some(json!({
                    "name": "Taxi",
                    "currency": "EUR",
                    "amount": "9.00",
                    "participants": [
                        {"user_id": 2, "amount": "-9.00"}
                    ]
                })),
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::CREATED);
        let id = body_json(res).await["id"]
            .as_str()
            .expect("expense id")
            .to_string();

        let res = router
            .clone()
            .oneshot(request("DELETE", &format!("/expenses/{id}"), Some(1), None))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = router
            .oneshot(request("DELETE", &format!("/expenses/{id}"), Some(1), None))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
