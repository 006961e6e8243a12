//! services/api/src/bin/openapi.rs
//!
//! Prints the OpenAPI specification for the service to stdout, for use in
//! client generation and docs pipelines.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), serde_json::Error> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
