//! Listing types, normalized once at the boundary where documents are read.
//!
//! Store documents are loosely typed: products and services carry their
//! title under `nombre`, job posts under `titulo`, keyword lists appear
//! both as arrays and as comma-separated strings. All of that drift is
//! resolved here so the rest of the workspace sees one shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three listing collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingKind {
    #[serde(rename = "productos")]
    Producto,
    #[serde(rename = "servicios")]
    Servicio,
    #[serde(rename = "empleos")]
    Empleo,
}

impl ListingKind {
    pub const ALL: [ListingKind; 3] =
        [ListingKind::Producto, ListingKind::Servicio, ListingKind::Empleo];

    /// Store collection holding this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            ListingKind::Producto => "productos",
            ListingKind::Servicio => "servicios",
            ListingKind::Empleo => "empleos",
        }
    }

    /// Lifecycle state that makes a listing of this kind visible in search.
    pub fn visible_status(&self) -> &'static str {
        match self {
            ListingKind::Producto | ListingKind::Servicio => "disponible",
            ListingKind::Empleo => "activo",
        }
    }

    /// Discriminator tag attached to mixed result lists.
    pub fn result_tag(&self) -> &'static str {
        match self {
            ListingKind::Producto => "producto",
            ListingKind::Servicio => "servicio",
            ListingKind::Empleo => "empleo",
        }
    }

    pub fn from_collection(name: &str) -> Option<Self> {
        match name {
            "productos" => Some(ListingKind::Producto),
            "servicios" => Some(ListingKind::Servicio),
            "empleos" => Some(ListingKind::Empleo),
            _ => None,
        }
    }
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// A normalized listing from one of the three collections.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: String,
    #[serde(skip)]
    pub kind: ListingKind,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "subcategoria")]
    pub subcategory: String,
    #[serde(rename = "palabrasClave")]
    pub keywords: Vec<String>,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "tiendaId")]
    pub store_id: String,
    #[serde(rename = "fechaCreacion", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "vistas")]
    pub views: u64,
}

impl Listing {
    /// Build a listing from a raw store document. Absent fields become
    /// empty values, never a decode error.
    pub fn from_document(kind: ListingKind, id: String, doc: &Value) -> Self {
        Self {
            id,
            kind,
            title: first_str(doc, &["nombre", "titulo"]),
            description: first_str(doc, &["descripcion"]),
            category: first_str(doc, &["categoria"]),
            subcategory: first_str(doc, &["subcategoria"]),
            keywords: keyword_list(doc.get("palabrasClave")),
            status: first_str(doc, &["estado"]),
            store_id: first_str(doc, &["tiendaId", "usuarioId"]),
            created_at: doc
                .get("fechaCreacion")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            views: doc.get("vistas").and_then(Value::as_u64).unwrap_or(0),
        }
    }

    /// Listing visible in search results.
    pub fn is_visible(&self) -> bool {
        self.status == self.kind.visible_status()
    }

    /// Lowercased concatenation of all searchable fields.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.description.len() + self.category.len() + 32,
        );
        for part in [
            self.title.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.subcategory.as_str(),
        ] {
            text.push_str(part);
            text.push(' ');
        }
        for keyword in &self.keywords {
            text.push_str(keyword);
            text.push(' ');
        }
        text.to_lowercase()
    }
}

fn first_str(doc: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| doc.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn keyword_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// A listing tagged with its source kind for mixed client rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(flatten)]
    pub listing: Listing,
}

impl SearchResult {
    pub fn new(listing: Listing) -> Self {
        Self {
            kind: listing.kind.result_tag(),
            listing,
        }
    }
}

/// Read the subscription lifecycle state off a raw user document.
pub fn subscription_status(user_doc: &Value) -> Option<&str> {
    user_doc
        .get("suscripcion")
        .and_then(|s| s.get("estado"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_drift_normalized_once() {
        let product = Listing::from_document(
            ListingKind::Producto,
            "p1".into(),
            &json!({ "nombre": "Torta de Chocolate", "estado": "disponible" }),
        );
        assert_eq!(product.title, "Torta de Chocolate");

        let job = Listing::from_document(
            ListingKind::Empleo,
            "e1".into(),
            &json!({ "titulo": "Ayudante de cocina", "estado": "activo" }),
        );
        assert_eq!(job.title, "Ayudante de cocina");
    }

    #[test]
    fn test_missing_fields_decode_empty() {
        let listing = Listing::from_document(ListingKind::Servicio, "s1".into(), &json!({}));
        assert_eq!(listing.title, "");
        assert_eq!(listing.description, "");
        assert!(listing.keywords.is_empty());
        assert_eq!(listing.views, 0);
        assert!(listing.created_at.is_none());
        // Concatenation over absent fields must not panic.
        assert!(listing.search_text().trim().is_empty());
    }

    #[test]
    fn test_keyword_list_accepts_both_shapes() {
        let from_array = Listing::from_document(
            ListingKind::Producto,
            "p1".into(),
            &json!({ "palabrasClave": ["torta", "chocolate"] }),
        );
        assert_eq!(from_array.keywords, vec!["torta", "chocolate"]);

        let from_string = Listing::from_document(
            ListingKind::Producto,
            "p2".into(),
            &json!({ "palabrasClave": "torta, chocolate , " }),
        );
        assert_eq!(from_string.keywords, vec!["torta", "chocolate"]);
    }

    #[test]
    fn test_visibility_per_kind() {
        let available = Listing::from_document(
            ListingKind::Producto,
            "p1".into(),
            &json!({ "estado": "disponible" }),
        );
        assert!(available.is_visible());

        let sold_out = Listing::from_document(
            ListingKind::Producto,
            "p2".into(),
            &json!({ "estado": "agotado" }),
        );
        assert!(!sold_out.is_visible());

        let active_job = Listing::from_document(
            ListingKind::Empleo,
            "e1".into(),
            &json!({ "estado": "activo" }),
        );
        assert!(active_job.is_visible());

        // "disponible" is not a visible state for job posts.
        let misfiled_job = Listing::from_document(
            ListingKind::Empleo,
            "e2".into(),
            &json!({ "estado": "disponible" }),
        );
        assert!(!misfiled_job.is_visible());
    }

    #[test]
    fn test_search_result_tagging() {
        let listing = Listing::from_document(
            ListingKind::Servicio,
            "s1".into(),
            &json!({ "nombre": "Plomería integral", "estado": "disponible" }),
        );
        let result = SearchResult::new(listing);
        assert_eq!(result.kind, "servicio");

        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["type"], "servicio");
        assert_eq!(serialized["titulo"], "Plomería integral");
    }

    #[test]
    fn test_subscription_status() {
        let user = json!({ "suscripcion": { "estado": "activa" } });
        assert_eq!(subscription_status(&user), Some("activa"));
        assert_eq!(subscription_status(&json!({})), None);
    }
}
