//! [`VowRepository`] and [`SqlRpc`] over PostgREST.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use super::client::SupabaseClient;
use crate::domain::ports::{BackendError, Caller, EXEC_SQL_FUNCTION, SqlRpc, VowRepository};
use crate::domain::{NewVow, VOWS_TABLE, Vow};

const REST_PREFIX: &str = "rest/v1";

#[derive(Serialize)]
struct ExecSqlBody<'a> {
    sql_query: &'a str,
}

#[async_trait]
impl VowRepository for SupabaseClient {
    async fn select(&self, caller: &Caller, limit: usize) -> Result<Vec<Vow>, BackendError> {
        let mut url = self.endpoint(&format!("{REST_PREFIX}/{VOWS_TABLE}"))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("limit", &limit.to_string());
        self.send_json(self.request(Method::GET, url, caller)).await
    }

    async fn insert(&self, caller: &Caller, vow: &NewVow) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("{REST_PREFIX}/{VOWS_TABLE}"))?;
        let request = self
            .request(Method::POST, url, caller)
            .header("Prefer", "return=minimal")
            .json(vow);
        self.send(request).await.map(drop)
    }
}

#[async_trait]
impl SqlRpc for SupabaseClient {
    async fn exec_sql(&self, caller: &Caller, sql: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("{REST_PREFIX}/rpc/{EXEC_SQL_FUNCTION}"))?;
        let request = self
            .request(Method::POST, url, caller)
            .json(&ExecSqlBody { sql_query: sql });
        self.send(request).await.map(drop)
    }
}
