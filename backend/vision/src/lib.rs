//! Vision judgment core: prompt construction, model invocation, and response
//! normalization for the receipt and inventory tasks.
//!
//! The two public operations mirror the contract consumed by the routing
//! layer: they may fail with [`SnapjudgeError::Remote`] when an upstream call
//! fails, but never because of malformed model output — that path always
//! terminates in a well-formed fallback result.

pub mod client;
pub mod normalize;
pub mod prompt;

pub use client::ModelClient;

use snapjudge_core::{AnalysisResult, AnalysisTask, ImagePayload, SnapjudgeError};
use tracing::info;

/// Judge whether the target product appears on a photographed receipt.
pub async fn analyze_receipt(
    client: &ModelClient,
    image: &ImagePayload,
    target_product_key: impl Into<String>,
    confidence_threshold: f64,
) -> Result<AnalysisResult, SnapjudgeError> {
    let task = AnalysisTask::ReceiptCheck {
        target_product_key: target_product_key.into(),
        confidence_threshold,
    };
    run_task(client, &task, image).await
}

/// Judge whether the user's photo shows the same product as the reference
/// image at `answer_image_url`.
pub async fn compare_inventory(
    client: &ModelClient,
    image: &ImagePayload,
    answer_image_url: impl Into<String>,
    confidence_threshold: f64,
) -> Result<AnalysisResult, SnapjudgeError> {
    let task = AnalysisTask::InventoryCompare {
        answer_image_url: answer_image_url.into(),
        confidence_threshold,
    };
    run_task(client, &task, image).await
}

async fn run_task(
    client: &ModelClient,
    task: &AnalysisTask,
    image: &ImagePayload,
) -> Result<AnalysisResult, SnapjudgeError> {
    // The model call needs the encoded reference image, so the fetch must
    // complete first for the inventory task.
    let reference = match task {
        AnalysisTask::InventoryCompare {
            answer_image_url, ..
        } => Some(client.fetch_image_as_data_uri(answer_image_url).await?),
        AnalysisTask::ReceiptCheck { .. } => None,
    };

    let messages = prompt::build_messages(task, image, reference.as_deref());
    let completion = client.complete(messages).await?;
    let result = normalize::normalize_completion(&completion);
    info!(
        is_match = result.is_match,
        confidence = result.confidence,
        "judgment complete"
    );
    Ok(result)
}
