use serde::Deserialize;
use serde_json::Value;

/// A single page of a player's trophy gains.
///
/// Gains are kept as raw JSON so that each record can retain
/// its original payload after being decoded.
#[derive(Debug, Default, Deserialize)]
pub struct TrophyPage {
    /// Amount of gains across all pages
    pub total: usize,
    pub gains: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_page() {
        let page: TrophyPage = serde_json::from_value(json!({
            "total": 3,
            "gains": [{ "timestamp": "2023-05-01T10:00:00+00:00" }, {}],
            "extra": "ignored",
        }))
        .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.gains.len(), 2);
    }
}
