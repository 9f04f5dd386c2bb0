//! Default values for configuration fields, matching the environment
//! variable defaults of the original service.

pub fn default_queue_max_capacity() -> usize {
    1000
}

pub fn default_queue_dequeue_default_n() -> usize {
    10
}

pub fn default_queue_low_watermark() -> usize {
    100
}

pub fn default_min_threshold() -> usize {
    30
}

pub fn default_batch_size() -> usize {
    30
}

pub fn default_max_cap() -> usize {
    300
}

pub fn default_poll_interval_ms() -> u64 {
    1500
}

pub fn default_http_timeout_s() -> f64 {
    5.0
}

pub fn default_retry_max() -> u32 {
    3
}

pub fn default_country() -> String {
    "JP".to_string()
}

pub fn default_lang() -> String {
    "ja_jp".to_string()
}

pub fn default_strategy() -> String {
    "gemini_keyword".to_string()
}

pub fn default_itunes_terms() -> Vec<String> {
    vec![
        "さくら".to_string(),
        "YOASOBI".to_string(),
        "米津玄師".to_string(),
        "あいみょん".to_string(),
        "Official髭男dism".to_string(),
    ]
}

pub fn default_search_genres() -> Vec<String> {
    vec![
        "J-Pop".to_string(),
        "Rock".to_string(),
        "Pop".to_string(),
        "Hip-Hop/Rap".to_string(),
    ]
}

pub fn default_search_years() -> Vec<String> {
    vec![
        "2020".to_string(),
        "2021".to_string(),
        "2022".to_string(),
        "2023".to_string(),
        "2024".to_string(),
    ]
}

pub fn default_suggestions_limit() -> usize {
    10
}

pub fn default_suggestions_max_limit() -> usize {
    50
}

pub fn default_rate_limit_per_sec() -> u32 {
    20
}

pub fn default_llm_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

pub fn default_llm_temperature() -> f64 {
    0.9
}

pub fn default_llm_top_p() -> f64 {
    1.0
}

pub fn default_llm_top_k() -> u32 {
    32
}

pub fn default_llm_max_tokens() -> u32 {
    256
}

pub fn default_llm_prompt_template() -> String {
    "音楽検索のためのキーワード(アーティスト名やジャンルなど)を3〜5個提案してください。カンマ区切りで出力し、例: サカナクション,back number,ロック,夏,夢 のようにしてください。".to_string()
}

pub fn default_llm_min_interval_ms() -> u64 {
    2000
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    8000
}
