use api_types::{
    Created,
    asset::{AssetNew, AssetView},
    expense::{ExpenseCategoryNew, ExpenseCategoryView},
    income::{IncomeSourceNew, IncomeSourceView},
    page::PageView,
    summary::CommonInfo,
    telegram::{TelegramChanged, TelegramStartResponse, TelegramUser},
    transaction::{
        ExpenseTransactionNew, ExpenseTransactionView, IncomeTransactionNew,
        IncomeTransactionView,
    },
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
}

impl ApiError {
    /// The chat account is not linked to a site user.
    pub(crate) fn is_unlinked(&self) -> bool {
        matches!(self, Self::Server { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

impl ApiClient {
    pub(crate) fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Request on behalf of `tg_username`, or as the bot itself when `None`.
    fn request(&self, method: Method, tg_username: Option<&str>, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        if let Some(tg) = tg_username {
            req = req.header("telegram-username", tg);
        }
        req
    }

    async fn send<TResp: for<'de> serde::Deserialize<'de>>(
        req: RequestBuilder,
    ) -> Result<TResp, ApiError> {
        let resp = Self::check(req.send().await?).await?;
        Ok(resp.json::<TResp>().await?)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.error,
            Err(_) => "server error".to_string(),
        };
        tracing::debug!(%status, message, "api request failed");
        Err(ApiError::Server { status, message })
    }

    async fn get<TResp: for<'de> serde::Deserialize<'de>>(
        &self,
        tg_username: &str,
        path: &str,
        page: u64,
    ) -> Result<TResp, ApiError> {
        let req = self
            .request(Method::GET, Some(tg_username), path)
            .query(&[("page", page)]);
        Self::send(req).await
    }

    async fn post<TReq: serde::Serialize + ?Sized, TResp: for<'de> serde::Deserialize<'de>>(
        &self,
        tg_username: Option<&str>,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, ApiError> {
        Self::send(self.request(Method::POST, tg_username, path).json(body)).await
    }

    async fn delete(&self, tg_username: &str, path: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, Some(tg_username), path);
        Self::check(req.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn telegram_start(
        &self,
        tg_username: &str,
    ) -> Result<TelegramStartResponse, ApiError> {
        self.post(None, "/telegram/start", &telegram_user(tg_username))
            .await
    }

    pub(crate) async fn telegram_stop(&self, tg_username: &str) -> Result<bool, ApiError> {
        let resp: TelegramChanged = self
            .post(None, "/telegram/stop", &telegram_user(tg_username))
            .await?;
        Ok(resp.changed)
    }

    pub(crate) async fn telegram_unlink(&self, tg_username: &str) -> Result<bool, ApiError> {
        let resp: TelegramChanged = self
            .post(None, "/telegram/unlink", &telegram_user(tg_username))
            .await?;
        Ok(resp.changed)
    }

    pub(crate) async fn common_info(&self, tg_username: &str) -> Result<CommonInfo, ApiError> {
        Self::send(self.request(Method::GET, Some(tg_username), "/common-info")).await
    }

    pub(crate) async fn assets(
        &self,
        tg_username: &str,
        page: u64,
    ) -> Result<PageView<AssetView>, ApiError> {
        self.get(tg_username, "/assets", page).await
    }

    pub(crate) async fn create_asset(
        &self,
        tg_username: &str,
        body: &AssetNew,
    ) -> Result<Created, ApiError> {
        self.post(Some(tg_username), "/assets", body).await
    }

    pub(crate) async fn delete_asset(&self, tg_username: &str, id: Uuid) -> Result<(), ApiError> {
        self.delete(tg_username, &format!("/assets/{id}")).await
    }

    pub(crate) async fn income_sources(
        &self,
        tg_username: &str,
        page: u64,
    ) -> Result<PageView<IncomeSourceView>, ApiError> {
        self.get(tg_username, "/incomes", page).await
    }

    pub(crate) async fn create_income_source(
        &self,
        tg_username: &str,
        body: &IncomeSourceNew,
    ) -> Result<Created, ApiError> {
        self.post(Some(tg_username), "/incomes", body).await
    }

    pub(crate) async fn delete_income_source(
        &self,
        tg_username: &str,
        id: Uuid,
    ) -> Result<(), ApiError> {
        self.delete(tg_username, &format!("/incomes/{id}")).await
    }

    pub(crate) async fn expense_categories(
        &self,
        tg_username: &str,
        page: u64,
    ) -> Result<PageView<ExpenseCategoryView>, ApiError> {
        self.get(tg_username, "/expenses", page).await
    }

    pub(crate) async fn create_expense_category(
        &self,
        tg_username: &str,
        body: &ExpenseCategoryNew,
    ) -> Result<Created, ApiError> {
        self.post(Some(tg_username), "/expenses", body).await
    }

    pub(crate) async fn delete_expense_category(
        &self,
        tg_username: &str,
        id: Uuid,
    ) -> Result<(), ApiError> {
        self.delete(tg_username, &format!("/expenses/{id}")).await
    }

    pub(crate) async fn income_transactions(
        &self,
        tg_username: &str,
        page: u64,
    ) -> Result<PageView<IncomeTransactionView>, ApiError> {
        self.get(tg_username, "/income-transactions", page).await
    }

    pub(crate) async fn create_income_transaction(
        &self,
        tg_username: &str,
        body: &IncomeTransactionNew,
    ) -> Result<Created, ApiError> {
        self.post(Some(tg_username), "/income-transactions", body)
            .await
    }

    pub(crate) async fn delete_income_transaction(
        &self,
        tg_username: &str,
        id: Uuid,
    ) -> Result<(), ApiError> {
        self.delete(tg_username, &format!("/income-transactions/{id}"))
            .await
    }

    pub(crate) async fn expense_transactions(
        &self,
        tg_username: &str,
        page: u64,
    ) -> Result<PageView<ExpenseTransactionView>, ApiError> {
        self.get(tg_username, "/expense-transactions", page).await
    }

    pub(crate) async fn create_expense_transaction(
        &self,
        tg_username: &str,
        body: &ExpenseTransactionNew,
    ) -> Result<Created, ApiError> {
        self.post(Some(tg_username), "/expense-transactions", body)
            .await
    }

    pub(crate) async fn delete_expense_transaction(
        &self,
        tg_username: &str,
        id: Uuid,
    ) -> Result<(), ApiError> {
        self.delete(tg_username, &format!("/expense-transactions/{id}"))
            .await
    }
}

fn telegram_user(tg_username: &str) -> TelegramUser {
    TelegramUser {
        tg_username: tg_username.to_string(),
    }
}
