// src/models/page.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Página de resultados para as listagens da API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[schema(example = 0)]
    pub page: i64,
    #[schema(example = 20)]
    pub size: i64,
    #[schema(example = 42)]
    pub total_elements: i64,
}

impl<T> Page<T> {
    pub fn empty(page: i64, size: i64) -> Self {
        Self {
            content: Vec::new(),
            page,
            size,
            total_elements: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_keeps_requested_window() {
        let page: Page<u8> = Page::empty(3, 25);
        assert!(page.content.is_empty());
        assert_eq!(page.page, 3);
        assert_eq!(page.size, 25);
        assert_eq!(page.total_elements, 0);
    }
}
