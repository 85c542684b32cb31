use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    /// Best rated first (the top list)
    Desc,
    /// Worst rated first (the turkey list)
    Asc,
}

impl SortOrder {
    pub fn as_query(&self) -> &'static str {
        match self {
            SortOrder::Desc => "DESC",
            SortOrder::Asc => "ASC",
        }
    }
}

/// Parameters of `GET /toplists`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToplistQuery {
    pub sort: SortOrder,
    pub limit: u32,
    pub page: u32,
    /// Minimum number of ratings a movie needs to be listed
    pub count_limit: u32,
}

impl ToplistQuery {
    pub fn top(limit: u32) -> Self {
        Self {
            sort: SortOrder::Desc,
            limit,
            page: 1,
            count_limit: 2,
        }
    }

    pub fn worst(limit: u32) -> Self {
        Self {
            sort: SortOrder::Asc,
            ..Self::top(limit)
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_count_limit(mut self, count_limit: u32) -> Self {
        self.count_limit = count_limit;
        self
    }

    /// Rank of the first entry on this page, 1-based
    pub fn first_rank(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize + 1
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sort", self.sort.as_query().to_string()),
            ("limit", self.limit.to_string()),
            ("page", self.page.to_string()),
            ("countLimit", self.count_limit.to_string()),
        ]
    }
}

impl Default for ToplistQuery {
    fn default() -> Self {
        Self::top(11)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let query = ToplistQuery::worst(11).with_page(3);
        let pairs = query.to_query_pairs();
        assert_eq!(pairs[0], ("sort", "ASC".to_string()));
        assert_eq!(pairs[2], ("page", "3".to_string()));
        assert_eq!(pairs[3], ("countLimit", "2".to_string()));
        assert_eq!(query.first_rank(), 23);
    }

    #[test]
    fn test_page_zero_is_clamped() {
        assert_eq!(ToplistQuery::top(5).with_page(0).page, 1);
    }
}
