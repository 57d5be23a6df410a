//! Pagination options and the links/meta blocks returned by list endpoints
use serde::{Deserialize, Serialize};
use url::Url;

/// Page selection for list operations
///
/// Zero values are left out of the query string, so the API defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl ListOptions {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Query parameters for this page selection
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.page > 0 {
            pairs.push(("page", self.page.to_string()));
        }
        if self.per_page > 0 {
            pairs.push(("per_page", self.per_page.to_string()));
        }
        pairs
    }
}

/// Navigation links attached to list responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Pages>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<LinkAction>,
}

/// URLs of the neighbouring pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Action reference embedded in a links block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkAction {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub href: String,
}

/// Result-set metadata attached to list responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub total: u64,
}

impl Links {
    /// Page number of the response these links came with
    ///
    /// Returns `None` when the links do not allow deriving it.
    pub fn current_page(&self) -> Option<u32> {
        let Some(pages) = &self.pages else {
            return Some(1);
        };
        match (&pages.prev, &pages.next) {
            (Some(prev), _) => page_for_url(prev).map(|page| page + 1),
            (None, Some(_)) => Some(1),
            (None, None) => None,
        }
    }

    /// Page number to request next, if there is a next page
    pub fn next_page(&self) -> Option<u32> {
        self.pages
            .as_ref()
            .and_then(|pages| pages.next.as_deref())
            .and_then(page_for_url)
    }

    /// Whether the response these links came with is the last page
    pub fn is_last_page(&self) -> bool {
        self.pages
            .as_ref()
            .map_or(true, |pages| pages.last.is_none())
    }
}

fn page_for_url(link: &str) -> Option<u32> {
    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(prev: Option<u32>, next: Option<u32>, last: Option<u32>) -> Links {
        let link = |page: u32| {
            format!(
                "https://api.digitalocean.com/v2/kubernetes/clusters?page={}&per_page=1",
                page
            )
        };
        Links {
            pages: Some(Pages {
                first: prev.map(|_| link(1)),
                prev: prev.map(link),
                last: last.map(link),
                next: next.map(link),
            }),
            actions: vec![],
        }
    }

    #[test]
    fn test_list_options_query_pairs() {
        assert!(ListOptions::default().query_pairs().is_empty());
        assert_eq!(
            ListOptions::new(2, 50).query_pairs(),
            vec![("page", "2".to_string()), ("per_page", "50".to_string())]
        );
        assert_eq!(
            ListOptions::new(0, 10).query_pairs(),
            vec![("per_page", "10".to_string())]
        );
    }

    #[test]
    fn test_first_page() {
        let links = pages(None, Some(2), Some(3));
        assert_eq!(links.current_page(), Some(1));
        assert_eq!(links.next_page(), Some(2));
        assert!(!links.is_last_page());
    }

    #[test]
    fn test_middle_page() {
        let links = pages(Some(1), Some(3), Some(3));
        assert_eq!(links.current_page(), Some(2));
        assert_eq!(links.next_page(), Some(3));
        assert!(!links.is_last_page());
    }

    #[test]
    fn test_last_page() {
        let links = pages(Some(2), None, None);
        assert_eq!(links.current_page(), Some(3));
        assert_eq!(links.next_page(), None);
        assert!(links.is_last_page());
    }

    #[test]
    fn test_no_pages() {
        let links = Links::default();
        assert_eq!(links.current_page(), Some(1));
        assert!(links.is_last_page());
    }

    #[test]
    fn test_links_deserialize() {
        let links: Links = serde_json::from_str(
            r#"{"pages":{"next":"https://api.digitalocean.com/v2/kubernetes/clusters?page=2","last":"https://api.digitalocean.com/v2/kubernetes/clusters?page=4"}}"#,
        )
        .unwrap();
        assert_eq!(links.next_page(), Some(2));
        assert!(links.actions.is_empty());
    }
}
