use crate::error::Failure;

pub async fn metrics_handler() -> Result<String, Failure> {
    Ok(crate::metrics::render()?)
}
