// Prints the OpenAPI document served at /swagger/v1/swagger.json
// Usage: cargo run --bin openapi_export > swagger.json

use anyhow::{Context, Result};
use dti_api::api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let json = serde_json::to_string_pretty(&ApiDoc::openapi())
        .context("Failed to serialize OpenAPI document")?;

    println!("{}", json);

    Ok(())
}
