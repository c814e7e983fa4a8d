// ==========================================
// Система производственного планирования - HTTP-интерфейс
// ==========================================
// Назначение: два читающих запроса дерева спецификации и сводный
//             расчёт по этапам поверх hyper
// Маппинг ошибок: InvalidInput -> 400, NotFound -> 404,
// OutOfRange -> 422, CatalogUnavailable -> 503, прочее -> 500
// Расчёты выполняются в spawn_blocking: разрыв соединения клиентом
// бросает ответ, разделяемое состояние не затрагивается
// ==========================================

pub mod query;

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::api::specification_api::{FullQuery, TreeQuery};
use crate::app::state::AppState;

/// Привязка сервера к адресу.
///
/// Возвращает фактический адрес (важно при порте 0 в тестах)
/// и future самого сервера.
pub fn bind_server(
    state: Arc<AppState>,
    addr: SocketAddr,
) -> anyhow::Result<(SocketAddr, impl std::future::Future<Output = hyper::Result<()>>)> {
    let make_service = make_service_fn(move |_| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                handle(Arc::clone(&state), req)
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|err| anyhow::anyhow!("не удалось привязаться к адресу {addr}: {err}"))?
        .serve(make_service);
    let local_addr = server.local_addr();
    Ok((local_addr, server))
}

/// Запуск HTTP-сервера (блокируется до завершения)
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let (local_addr, server) = bind_server(state, addr)?;
    tracing::info!("HTTP-сервер запущен: http://{}", local_addr);
    server.await?;
    Ok(())
}

async fn handle(state: Arc<AppState>, req: Request<Body>) -> Result<Response<Body>, Infallible> {
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let params = query::parse_query(req.uri().query().unwrap_or(""));

    let outcome = route(state, &method, &path, &params).await;

    let response = match outcome {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(err) => {
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = path.as_str(),
                    "ошибка обработки запроса: {}",
                    err
                );
            } else {
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = path.as_str(),
                    code = err.code(),
                    "запрос отклонён: {}",
                    err
                );
            }
            let envelope = serde_json::to_value(ErrorResponse::from_error(&err))
                .unwrap_or_else(|_| serde_json::json!({"code": err.code()}));
            json_response(status, &envelope)
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = path.as_str(),
        status = response.status().as_u16(),
        "HTTP-запрос обработан"
    );
    Ok(response)
}

async fn route(
    state: Arc<AppState>,
    method: &Method,
    path: &str,
    params: &HashMap<String, String>,
) -> ApiResult<serde_json::Value> {
    match (method, path) {
        (&Method::GET, "/v1/specification/tree") => {
            let query = build_tree_query(params)?;
            let api = Arc::clone(&state.specification_api);
            let response = run_blocking(move || api.tree(&query)).await?;
            to_json(&response)
        }
        (&Method::GET, "/v1/specification/full") => {
            let query = build_full_query(params)?;
            let api = Arc::clone(&state.specification_api);
            let response = run_blocking(move || api.full(&query)).await?;
            to_json(&response)
        }
        (&Method::POST, "/v1/stages/calculate") => {
            let api = Arc::clone(&state.stages_api);
            let response = run_blocking(move || api.calculate()).await?;
            to_json(&response)
        }
        _ => Err(ApiError::NotFound(format!(
            "неизвестный маршрут: {method} {path}"
        ))),
    }
}

/// Выполнение синхронного расчёта вне воркеров рантайма
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("расчёт прерван: {e}")))?
}

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::InternalError(format!("сериализация ответа: {e}")))
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| {
            let mut fallback = Response::new(Body::from("{}"));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

// ==========================================
// Извлечение типизированных параметров
// ==========================================

fn opt_string(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn opt_i64(params: &HashMap<String, String>, key: &str) -> ApiResult<Option<i64>> {
    match opt_string(params, key) {
        Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
            ApiError::InvalidInput(format!("{key} должен быть целым числом (получено '{raw}')"))
        }),
        None => Ok(None),
    }
}

fn opt_f64(params: &HashMap<String, String>, key: &str) -> ApiResult<Option<f64>> {
    match opt_string(params, key) {
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
            ApiError::InvalidInput(format!("{key} должен быть числом (получено '{raw}')"))
        }),
        None => Ok(None),
    }
}

fn opt_bool(params: &HashMap<String, String>, key: &str) -> ApiResult<Option<bool>> {
    match opt_string(params, key) {
        Some(raw) => match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ApiError::InvalidInput(format!(
                "{key} должен быть true или false (получено '{raw}')"
            ))),
        },
        None => Ok(None),
    }
}

fn build_tree_query(params: &HashMap<String, String>) -> ApiResult<TreeQuery> {
    Ok(TreeQuery {
        item_code: opt_string(params, "item_code"),
        item_id: opt_i64(params, "item_id")?,
        item_ref1c: opt_string(params, "item_ref1c"),
        root_qty: opt_f64(params, "root_qty")?,
        parent_id: opt_string(params, "parent_id"),
        include_operations: opt_bool(params, "include_operations")?,
    })
}

fn build_full_query(params: &HashMap<String, String>) -> ApiResult<FullQuery> {
    Ok(FullQuery {
        item_code: opt_string(params, "item_code"),
        item_id: opt_i64(params, "item_id")?,
        item_ref1c: opt_string(params, "item_ref1c"),
        root_qty: opt_f64(params, "root_qty")?,
        max_depth: opt_i64(params, "max_depth")?,
    })
}

// ==========================================
// Единичные тесты
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_tree_query_full_set() {
        let q = build_tree_query(&params(&[
            ("item_code", "PRD-001"),
            ("root_qty", "2.5"),
            ("include_operations", "false"),
        ]))
        .unwrap();
        assert_eq!(q.item_code.as_deref(), Some("PRD-001"));
        assert_eq!(q.root_qty, Some(2.5));
        assert_eq!(q.include_operations, Some(false));
        assert_eq!(q.parent_id, None);
    }

    #[test]
    fn test_build_tree_query_rejects_bad_number() {
        let err = build_tree_query(&params(&[("item_id", "abc")])).unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = build_tree_query(&params(&[("root_qty", "два")])).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_build_full_query_defaults_empty() {
        let q = build_full_query(&params(&[("item_code", "PRD-001")])).unwrap();
        assert_eq!(q.max_depth, None);
        assert_eq!(q.root_qty, None);
    }

    #[test]
    fn test_opt_bool_variants() {
        assert_eq!(opt_bool(&params(&[("x", "1")]), "x").unwrap(), Some(true));
        assert_eq!(opt_bool(&params(&[("x", "no")]), "x").unwrap(), Some(false));
        assert!(opt_bool(&params(&[("x", "да")]), "x").is_err());
        assert_eq!(opt_bool(&params(&[]), "x").unwrap(), None);
    }
}
