use crate::error::Failure;
use crate::models::{ContactReceipt, ContactRequest};
use crate::response::ApiResponse;
use crate::validation::Validated;

// enquiries are handed to the log pipeline; nothing is stored here
pub async fn contact_handler(
    Validated(body): Validated<ContactRequest>,
) -> Result<ApiResponse<ContactReceipt>, Failure> {
    tracing::info!(
        company = body.company.as_deref().unwrap_or("-"),
        message_len = body.message.len(),
        "contact enquiry received"
    );
    Ok(ApiResponse::success(ContactReceipt { received: true }, None))
}
