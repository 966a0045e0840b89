//! PostgREST requests against the articles table under `/rest/v1`.

use reqwest::Method;

use super::read_json;
use crate::config::BackendSettings;
use crate::models::{Article, ArticleId, NewArticle};
use crate::store::{ListOrder, SortDirection, StoreError, StoreErrorKind, StoreResult};

const RETURN_REPRESENTATION: &str = "return=representation";

fn table_request(
    http: &reqwest::Client,
    settings: &BackendSettings,
    method: Method,
    bearer: &str,
) -> reqwest::RequestBuilder {
    http.request(method, format!("{}/rest/v1/{}", settings.url, settings.table))
        .header("apikey", &settings.anon_key)
        .bearer_auth(bearer)
}

fn order_param(order: ListOrder) -> &'static str {
    match order.created_at {
        SortDirection::Ascending => "created_at.asc",
        SortDirection::Descending => "created_at.desc",
    }
}

pub(super) async fn select_all(
    http: &reqwest::Client,
    settings: &BackendSettings,
    bearer: &str,
    order: ListOrder,
) -> StoreResult<Vec<Article>> {
    let response = table_request(http, settings, Method::GET, bearer)
        .query(&[("select", "*"), ("order", order_param(order))])
        .send()
        .await
        .map_err(|e| StoreError::network(&e))?;

    read_json(response, "listing").await
}

pub(super) async fn insert(
    http: &reqwest::Client,
    settings: &BackendSettings,
    bearer: &str,
    draft: &NewArticle,
) -> StoreResult<Article> {
    let response = table_request(http, settings, Method::POST, bearer)
        .header("Prefer", RETURN_REPRESENTATION)
        .json(&[draft])
        .send()
        .await
        .map_err(|e| StoreError::network(&e))?;

    let mut rows: Vec<Article> = read_json(response, "insert").await?;
    if rows.is_empty() {
        return Err(StoreError::parse("insert", "no row returned"));
    }
    Ok(rows.swap_remove(0))
}

/// Deletes one row. Zero affected rows (missing id, or filtered out by
/// row-level security) is reported as `NotFound`.
pub(super) async fn delete(
    http: &reqwest::Client,
    settings: &BackendSettings,
    bearer: &str,
    id: &ArticleId,
) -> StoreResult<()> {
    let response = table_request(http, settings, Method::DELETE, bearer)
        .header("Prefer", RETURN_REPRESENTATION)
        .query(&[("id", format!("eq.{id}"))])
        .send()
        .await
        .map_err(|e| StoreError::network(&e))?;

    let rows: Vec<serde_json::Value> = read_json(response, "delete").await?;
    if rows.is_empty() {
        return Err(StoreError::new(
            StoreErrorKind::NotFound,
            format!("No article {id} owned by the current user"),
        ));
    }
    Ok(())
}
