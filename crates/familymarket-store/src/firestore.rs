//! Firestore REST client.
//!
//! Listing reads are a recency-bounded window (`orderBy fechaCreacion
//! desc`, bounded `pageSize`), not a relevance-ranked top-K; relevance
//! is applied after materialization by the search pipeline.

use familymarket_core::{Error, FirestoreSettings, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::value::{decode_fields, document_id, encode_value};

pub struct FirestoreClient {
    http: reqwest::Client,
    settings: FirestoreSettings,
}

impl FirestoreClient {
    pub fn new(settings: FirestoreSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.settings.documents_url(), collection, id)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.settings.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    /// List up to `page_size` recent documents of a collection as
    /// `(id, plain-JSON fields)` pairs. An absent or empty collection
    /// yields an empty vec.
    pub async fn list_documents(
        &self,
        collection: &str,
        page_size: usize,
    ) -> Result<Vec<(String, Value)>> {
        let url = format!("{}/{}", self.settings.documents_url(), collection);
        debug!("Listing {} (pageSize={})", collection, page_size);

        let response = self
            .with_key(self.http.get(&url).query(&[
                ("pageSize", page_size.to_string().as_str()),
                ("orderBy", "fechaCreacion desc"),
            ]))
            .send()
            .await
            .map_err(|e| Error::Http(format!("Firestore request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("Firestore {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("Firestore response decode failed: {e}")))?;

        let documents = body
            .get("documents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(documents
            .iter()
            .filter_map(|doc| {
                let id = doc.get("name").and_then(Value::as_str).map(document_id)?;
                let fields = doc
                    .get("fields")
                    .and_then(Value::as_object)
                    .map(decode_fields)
                    .unwrap_or_else(|| serde_json::json!({}));
                Some((id.to_string(), fields))
            })
            .collect())
    }

    /// Fetch one document; `Ok(None)` on 404.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let response = self
            .with_key(self.http.get(self.document_url(collection, id)))
            .send()
            .await
            .map_err(|e| Error::Http(format!("Firestore request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("Firestore {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("Firestore response decode failed: {e}")))?;

        Ok(body
            .get("fields")
            .and_then(Value::as_object)
            .map(decode_fields))
    }

    /// Patch selected field paths of a document. `fields` is plain JSON;
    /// encoding to the wrapped representation happens here.
    pub async fn patch_fields(
        &self,
        collection: &str,
        id: &str,
        mask: &[&str],
        fields: &Value,
    ) -> Result<()> {
        let url = self.document_url(collection, id);
        let mut request = self.http.patch(&url);
        for path in mask {
            request = request.query(&[("updateMask.fieldPaths", *path)]);
        }

        let encoded = encode_value(fields);
        let body = serde_json::json!({ "fields": encoded["mapValue"]["fields"] });

        let response = self
            .with_key(request.json(&body))
            .send()
            .await
            .map_err(|e| Error::Http(format!("Firestore request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("Firestore {status}: {body}")));
        }

        debug!("Patched {}/{} ({:?})", collection, id, mask);
        Ok(())
    }
}
