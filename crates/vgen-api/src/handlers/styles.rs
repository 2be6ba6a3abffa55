//! Style browsing handlers.

use std::collections::BTreeMap;

use axum::extract::Path;
use axum::Json;
use serde::Serialize;

use vgen_models::{AspectRatio, StylePreview, StyleTable};

#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub styles: BTreeMap<String, String>,
    pub aspect_ratios: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ExamplesResponse {
    pub examples: BTreeMap<String, Vec<String>>,
}

pub async fn list_styles() -> Json<StylesResponse> {
    Json(StylesResponse {
        styles: StyleTable::global().display_names(),
        aspect_ratios: AspectRatio::display_names(),
    })
}

pub async fn style_preview(Path(style): Path<String>) -> Json<StylePreview> {
    Json(StyleTable::global().preview(&style))
}

pub async fn style_examples() -> Json<ExamplesResponse> {
    Json(ExamplesResponse {
        examples: StyleTable::global().example_prompts(),
    })
}
