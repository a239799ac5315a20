//! Selector options handler

use axum::Json;
use domain::{SelectorOptions, selector_options};

/// List the language, topic and proficiency options in display order
pub async fn list_options() -> Json<SelectorOptions> {
    Json(selector_options())
}
