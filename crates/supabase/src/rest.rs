//! PostgREST table access.

use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;

/// A PostgREST query: table, horizontal filters, ordering and paging.
///
/// ```rust
/// use lummi_supabase::Query;
///
/// let query = Query::table("portfolio_items")
///     .select("*")
///     .eq("is_published", true)
///     .order("order_index", true);
/// assert_eq!(
///     query.query_string(),
///     "select=*&is_published=eq.true&order=order_index.asc"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    params: Vec<(String, String)>,
    range: Option<(usize, usize)>,
}

impl Query {
    #[must_use]
    pub fn table(name: &str) -> Self {
        Self {
            table: name.to_string(),
            params: Vec::new(),
            range: None,
        }
    }

    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// `column IN (values...)`.
    #[must_use]
    pub fn in_list<S: AsRef<str>>(mut self, column: &str, values: &[S]) -> Self {
        let list = values
            .iter()
            .map(|v| quote_value(v.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_string(), format!("in.({list})")));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    /// Inclusive row range, sent as a `Range` header.
    #[must_use]
    pub const fn range(mut self, from: usize, to: usize) -> Self {
        self.range = Some((from, to));
        self
    }

    /// Encoded query string, without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        // PostgREST operators read better unescaped; `*`, `(`, `)`, `,` and
        // `.` are all legal in a query component.
        serializer
            .finish()
            .replace("%28", "(")
            .replace("%29", ")")
            .replace("%2C", ",")
    }

    fn url(&self, client: &SupabaseClient) -> Result<Url, SupabaseError> {
        let mut url = client.endpoint(&format!("rest/v1/{}", self.table))?;
        let query = self.query_string();
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        Ok(url)
    }
}

/// Quote `in.()` members that contain PostgREST reserved characters.
fn quote_value(value: &str) -> String {
    if value.chars().any(|c| matches!(c, ',' | '(' | ')' | '"' | ' ')) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

impl SupabaseClient {
    /// `GET /rest/v1/<table>` with filters, ordering and optional range.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or rows do not match `T`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &Query,
        token: Option<&str>,
    ) -> Result<Vec<T>, SupabaseError> {
        let mut request = self.request(Method::GET, query.url(self)?, token);
        if let Some((from, to)) = query.range {
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{from}-{to}"));
        }
        self.send_json(request).await
    }

    /// `POST /rest/v1/<table>` without reading the created rows back.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the row.
    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let url = self.endpoint(&format!("rest/v1/{table}"))?;
        let request = self
            .request(Method::POST, url, token)
            .header("Prefer", "return=minimal")
            .json(body);
        self.send(request).await.map(drop)
    }

    /// `PATCH /rest/v1/<table>?<filters>`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the patch.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        query: &Query,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let request = self
            .request(Method::PATCH, query.url(self)?, token)
            .header("Prefer", "return=minimal")
            .json(body);
        self.send(request).await.map(drop)
    }

    /// Insert-or-update keyed by the primary key or `on_conflict` column.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the rows.
    pub async fn upsert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
        on_conflict: Option<&str>,
        token: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let mut url = self.endpoint(&format!("rest/v1/{table}"))?;
        if let Some(column) = on_conflict {
            url.query_pairs_mut().append_pair("on_conflict", column);
        }
        let request = self
            .request(Method::POST, url, token)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(body);
        self.send(request).await.map(drop)
    }

    /// `POST /rest/v1/rpc/<function>`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the procedure raises, or the result
    /// does not match `T`.
    pub async fn rpc<A: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        function: &str,
        args: &A,
        token: Option<&str>,
    ) -> Result<T, SupabaseError> {
        let url = self.endpoint(&format!("rest/v1/rpc/{function}"))?;
        let request = self.request(Method::POST, url, token).json(args);
        self.send_json(request).await
    }
}
