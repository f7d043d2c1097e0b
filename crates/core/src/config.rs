use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenSearchSettings {
    pub endpoint: String,
    pub index_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl Default for OpenSearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9200".to_string(),
            index_name: "photos".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentSettings {
    pub bot_id: String,
    pub bot_alias_id: String,
    pub locale_id: String,
    pub session_id: String,
}

impl Default for IntentSettings {
    fn default() -> Self {
        Self {
            bot_id: String::new(),
            bot_alias_id: String::new(),
            locale_id: "en_US".to_string(),
            session_id: "test-session".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LabelSettings {
    pub max_labels: i32,
    pub min_confidence: f32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            max_labels: 10,
            min_confidence: 75.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { max_results: 100 }
    }
}
