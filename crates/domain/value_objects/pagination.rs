use serde::Serialize;

/// A 1-indexed page request whose `limit` has already been clamped by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn clamped(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit_to_server_maximum() {
        let page = PageRequest::clamped(Some(2), Some(500), 20, 100);
        assert_eq!(page, PageRequest { page: 2, limit: 100 });
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn falls_back_to_first_page_and_default_limit() {
        let page = PageRequest::clamped(None, None, 20, 100);
        assert_eq!(page, PageRequest { page: 1, limit: 20 });

        let page = PageRequest::clamped(Some(0), Some(0), 20, 100);
        assert_eq!(page, PageRequest { page: 1, limit: 1 });
        assert_eq!(page.offset(), 0);
    }
}
