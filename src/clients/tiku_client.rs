/// 题库 API 客户端
///
/// 封装所有与远程题库服务相关的调用逻辑
use crate::clients::QuestionCatalog;
use crate::config::Config;
use crate::error::{AppError, AppResult, CatalogError};
use crate::models::{
    NewPaper, PaperId, Question, QuestionFilter, QuestionId, SearchQuery, Tag, TagId,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 服务端统一响应结构
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    code: u64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

/// 抽样请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SampleRequest<'a> {
    #[serde(flatten)]
    filter: &'a QuestionFilter,
    count: u32,
    exclude_ids: &'a [QuestionId],
}

/// 题库 API 客户端
pub struct TikuClient {
    http: Client,
    base_url: String,
    token: String,
    max_retries: usize,
    retry_delay: Duration,
}

impl TikuClient {
    /// 创建新的题库客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::request_failed("client/build", e))?;

        Ok(Self {
            http,
            base_url: config.tiku_api_base_url.trim_end_matches('/').to_string(),
            token: config.tiku_token.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> AppResult<Option<T>> {
        debug!("POST {} Payload: {}", endpoint, serde_json::to_string(body)?);
        self.send(endpoint, || self.http.post(self.url(endpoint)).json(body))
            .await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> AppResult<Option<T>> {
        debug!("GET {}", endpoint);
        self.send(endpoint, || self.http.get(self.url(endpoint))).await
    }

    /// 发送请求（被限流时重试）
    ///
    /// # 参数
    /// - `endpoint`: 接口路径（用于日志和报错）
    /// - `build`: 每次重试重新构建请求
    ///
    /// # 返回
    /// 返回响应中的 `data` 字段
    async fn send<T, F>(&self, endpoint: &str, build: F) -> AppResult<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        for retry_count in 0..self.max_retries {
            let result: Value = build()
                .header("tikutoken", self.token.as_str())
                .header("Accept", "application/json, text/plain, */*")
                .send()
                .await
                .map_err(|e| AppError::request_failed(endpoint, e))?
                .json()
                .await
                .map_err(|e| AppError::request_failed(endpoint, e))?;

            // 检查是否被限流
            if Self::is_rate_limited(&result) {
                warn!(
                    "API 请求频繁限制 ({}，尝试 {}/{}), 等待 {:?} 后重试...",
                    endpoint,
                    retry_count + 1,
                    self.max_retries,
                    self.retry_delay
                );
                sleep(self.retry_delay).await;
                continue;
            }

            if result.is_null() {
                return Err(CatalogError::EmptyResponse {
                    endpoint: endpoint.to_string(),
                }
                .into());
            }

            let response: ApiResponse<T> = serde_json::from_value(result)?;
            if response.code != 200 {
                return Err(CatalogError::BadResponse {
                    endpoint: endpoint.to_string(),
                    code: response.code,
                    message: response.message,
                }
                .into());
            }

            return Ok(response.data);
        }

        Err(CatalogError::RateLimited {
            endpoint: endpoint.to_string(),
            attempts: self.max_retries,
        }
        .into())
    }

    fn required<T>(endpoint: &str, data: Option<T>) -> AppResult<T> {
        data.ok_or_else(|| {
            CatalogError::EmptyResponse {
                endpoint: endpoint.to_string(),
            }
            .into()
        })
    }

    /// 检查是否是频率限制错误
    pub fn is_rate_limited(result: &Value) -> bool {
        if let Some(code) = result.get("code").and_then(|v| v.as_u64()) {
            if code == 600 {
                if let Some(msg) = result.get("message").and_then(|v| v.as_str()) {
                    return msg.contains("请求过于频繁");
                }
            }
        }
        false
    }
}

impl QuestionCatalog for TikuClient {
    async fn count_questions(&self, filter: &QuestionFilter) -> AppResult<u32> {
        let endpoint = "question/count";
        Self::required(endpoint, self.post(endpoint, filter).await?)
    }

    async fn sample_questions(
        &self,
        filter: &QuestionFilter,
        n: u32,
        exclude: &[QuestionId],
    ) -> AppResult<Vec<QuestionId>> {
        let endpoint = "question/sample";
        let body = SampleRequest {
            filter,
            count: n,
            exclude_ids: exclude,
        };
        let mut ids: Vec<QuestionId> = self.post(endpoint, &body).await?.unwrap_or_default();

        // 服务端不保证去重，也不保证遵守排除列表
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| !exclude.contains(id) && seen.insert(*id));

        if (ids.len() as u32) < n {
            return Err(CatalogError::InsufficientQuestions {
                requested: n,
                available: ids.len() as u32,
            }
            .into());
        }
        ids.truncate(n as usize);
        Ok(ids)
    }

    async fn search_questions(&self, query: &SearchQuery) -> AppResult<Vec<Question>> {
        Ok(self
            .post("question/search", query)
            .await?
            .unwrap_or_default())
    }

    async fn get_question(&self, id: QuestionId) -> AppResult<Question> {
        let endpoint = format!("question/{}", id);
        self.get(&endpoint)
            .await?
            .ok_or_else(|| CatalogError::QuestionNotFound { id }.into())
    }

    async fn list_first_level_tags(&self) -> AppResult<Vec<Tag>> {
        Ok(self.get("tag/first-level").await?.unwrap_or_default())
    }

    async fn list_child_tags(&self, parent_id: TagId) -> AppResult<Vec<Tag>> {
        let endpoint = format!("tag/children/{}", parent_id);
        Ok(self.get(&endpoint).await?.unwrap_or_default())
    }

    async fn create_paper(&self, paper: &NewPaper) -> AppResult<PaperId> {
        let endpoint = "paper/create";
        Self::required(endpoint, self.post(endpoint, paper).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_rate_limit_response() {
        assert!(TikuClient::is_rate_limited(
            &json!({"code": 600, "message": "请求过于频繁，请稍后再试"})
        ));
        assert!(!TikuClient::is_rate_limited(
            &json!({"code": 600, "message": "其他错误"})
        ));
        assert!(!TikuClient::is_rate_limited(&json!({"code": 200, "data": 3})));
    }

    #[test]
    fn envelope_tolerates_missing_data() {
        let resp: ApiResponse<Vec<i64>> =
            serde_json::from_value(json!({"code": 200, "message": "ok"})).unwrap();
        assert_eq!(resp.code, 200);
        assert!(resp.data.is_none());
    }

    #[test]
    fn sample_request_flattens_filter() {
        let filter = QuestionFilter::of_type(crate::models::QuestionType::Judge);
        let body = SampleRequest {
            filter: &filter,
            count: 3,
            exclude_ids: &[7, 8],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["questionType"], "judge");
        assert_eq!(value["count"], 3);
        assert_eq!(value["excludeIds"], json!([7, 8]));
        assert_eq!(value["tags"], json!([]));
    }

    #[test]
    fn base_url_is_normalised() {
        let config = Config {
            tiku_api_base_url: "https://tiku.example.com/api/".to_string(),
            ..Config::default()
        };
        let client = TikuClient::new(&config).unwrap();
        assert_eq!(client.url("question/count"), "https://tiku.example.com/api/question/count");
    }
}
