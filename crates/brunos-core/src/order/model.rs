//! Order domain models.

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, OrderResult};

/// A persisted order, as shown on the kitchen displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub article: String,
    pub name: Option<String>,
}

/// Order request as submitted by the tablet, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub article: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl NewOrder {
    pub fn new(article: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            article: article.into(),
            name: name.map(str::to_string),
        }
    }

    /// Trim the fields and reject orders without an article.
    ///
    /// A blank name is stored as no name at all.
    pub fn normalized(self) -> OrderResult<Self> {
        let article = self.article.trim().to_string();
        if article.is_empty() {
            return Err(OrderError::validation("article is required"));
        }
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(Self { article, name })
    }

    /// Attach the id assigned by the store.
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            article: self.article,
            name: self.name,
        }
    }
}

impl Order {
    /// Whether this order was placed by `name` for `article`.
    pub fn matches(&self, name: Option<&str>, article: &str) -> bool {
        self.article == article && self.name.as_deref() == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_trims_fields() {
        let order = NewOrder::new("  Pizza ", Some(" Mario ")).normalized().unwrap();
        assert_eq!(order.article, "Pizza");
        assert_eq!(order.name.as_deref(), Some("Mario"));
    }

    #[test]
    fn test_normalized_rejects_blank_article() {
        let err = NewOrder::new("   ", Some("Mario")).normalized().unwrap_err();
        assert!(matches!(err, OrderError::ValidationError(_)));
    }

    #[test]
    fn test_blank_name_becomes_none() {
        let order = NewOrder::new("Pizza", Some("  ")).normalized().unwrap();
        assert_eq!(order.name, None);
    }

    #[test]
    fn test_order_json_shape() {
        let order = NewOrder::new("Pizza", Some("Mario")).into_order(1);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 1, "article": "Pizza", "name": "Mario" })
        );
    }
}
