use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, Error as AxumError, Header, authorization::Basic},
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{assets, categories, summary, telegram, transactions};
use engine::{Engine, EngineError};

static TELEGRAM_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("telegram-username");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Site account the chat bot logs in with. Only this account may act on
    /// behalf of chat users and drive the linking endpoints.
    pub telegram_account: Option<String>,
}

impl ServerState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            telegram_account: None,
        }
    }

    pub fn telegram_account(mut self, username: Option<String>) -> Self {
        self.telegram_account = username;
        self
    }
}

/// Identity resolved by [`auth`] for the rest of the request.
#[derive(Clone, Debug)]
pub struct Caller {
    /// Owner of every row the request touches.
    pub username: String,
    /// The request was authenticated with the bot's own account and no
    /// chat user was named.
    pub is_telegram_service: bool,
}

/// `TypedHeader` for the chat username the bot is acting for.
#[derive(Debug)]
struct TelegramHeader(String);

impl Header for TelegramHeader {
    fn name() -> &'static axum::http::HeaderName {
        &TELEGRAM_HEADER
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
        if value.trim().is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(TelegramHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode telegram-username header"),
        }
    }
}

/// 401 with a Basic challenge, so a browser opening the account link asks
/// for the site credentials.
fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(axum::http::header::WWW_AUTHENTICATE, "Basic realm=\"moneybook\"")],
    )
        .into_response()
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    telegram_header: Option<TypedHeader<TelegramHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(unauthorized());
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(unauthorized());
    }

    let user = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?
        .ok_or_else(unauthorized)?;

    let is_service = state.telegram_account.as_deref() == Some(user.username.as_str());

    let caller = match telegram_header {
        Some(TypedHeader(TelegramHeader(tg_username))) => {
            if !is_service {
                return Err(StatusCode::FORBIDDEN.into_response());
            }
            let username = match state.engine.telegram_user(&tg_username).await {
                Ok(Some(username)) => username,
                Ok(None) | Err(EngineError::InvalidField(_)) => {
                    return Err(StatusCode::UNAUTHORIZED.into_response());
                }
                Err(err) => {
                    tracing::error!(
                        tg_username = %tg_username,
                        "telegram user lookup failed: {err}"
                    );
                    return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
                }
            };
            Caller {
                username,
                is_telegram_service: false,
            }
        }
        None => Caller {
            username: user.username,
            is_telegram_service: is_service,
        },
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();
            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        .on_failure(());

    Router::new()
        .route("/common-info", get(summary::common_info))
        .route("/assets", get(assets::list).post(assets::create))
        .route(
            "/assets/{id}",
            get(assets::get).put(assets::update).delete(assets::delete),
        )
        .route("/assets/{id}/incoming", get(assets::incoming))
        .route("/assets/{id}/outgoing", get(assets::outgoing))
        .route("/assets/{id}/audit", get(assets::audit))
        .route("/assets/{id}/recompute", post(assets::recompute))
        .route(
            "/incomes",
            get(categories::list_incomes).post(categories::create_income),
        )
        .route(
            "/incomes/{id}",
            get(categories::get_income)
                .put(categories::update_income)
                .delete(categories::delete_income),
        )
        .route(
            "/expenses",
            get(categories::list_expenses).post(categories::create_expense),
        )
        .route(
            "/expenses/{id}",
            get(categories::get_expense)
                .put(categories::update_expense)
                .delete(categories::delete_expense),
        )
        .route("/expenses/{id}/outgoing", get(categories::expense_transactions))
        .route(
            "/income-transactions",
            get(transactions::list_incomes).post(transactions::create_income),
        )
        .route(
            "/income-transactions/{id}",
            get(transactions::get_income).delete(transactions::delete_income),
        )
        .route(
            "/expense-transactions",
            get(transactions::list_expenses).post(transactions::create_expense),
        )
        .route(
            "/expense-transactions/{id}",
            get(transactions::get_expense).delete(transactions::delete_expense),
        )
        .route("/telegram/start", post(telegram::start))
        .route("/telegram/stop", post(telegram::stop))
        .route("/telegram/unlink", post(telegram::unlink))
        .route("/telegram/link/{tg_username}/{token}", get(telegram::link))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .layer(trace_layer)
        .with_state(state)
}

pub async fn run(state: ServerState, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(state, listener).await
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
