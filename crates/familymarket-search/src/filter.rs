//! Lifecycle status filter.

use familymarket_store::Listing;

/// Keep only listings in their kind's visible lifecycle state
/// ("disponible" for products and services, "activo" for job posts).
/// Pure filter; survivor order is input order.
pub fn visible_only(listings: Vec<Listing>) -> Vec<Listing> {
    listings.into_iter().filter(Listing::is_visible).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use familymarket_store::ListingKind;
    use serde_json::json;

    fn product(id: &str, estado: &str) -> Listing {
        Listing::from_document(
            ListingKind::Producto,
            id.into(),
            &json!({ "nombre": "Torta", "estado": estado }),
        )
    }

    #[test]
    fn test_keeps_available_preserving_order() {
        let listings = vec![
            product("p1", "disponible"),
            product("p2", "agotado"),
            product("p3", "disponible"),
            product("p4", "pausado"),
        ];

        let visible = visible_only(listings);
        let ids: Vec<&str> = visible.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn test_job_requires_activo() {
        let job = Listing::from_document(
            ListingKind::Empleo,
            "e1".into(),
            &json!({ "titulo": "Cocinero", "estado": "activo" }),
        );
        let closed = Listing::from_document(
            ListingKind::Empleo,
            "e2".into(),
            &json!({ "titulo": "Cocinero", "estado": "cerrado" }),
        );

        let visible = visible_only(vec![job, closed]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "e1");
    }
}
