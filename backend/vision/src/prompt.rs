//! Prompt and payload construction for the two judgment tasks.
//!
//! Each task gets a fixed system instruction plus a multimodal user message
//! (text block + data-URI image blocks) in the OpenAI chat-completions shape.
//! Construction never fails; thresholds are embedded in the prompt text as
//! given, without clamping.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use snapjudge_core::{AnalysisTask, ImagePayload};

/// Instruction for the receipt task. Matching is by character-shape
/// similarity only; semantic or category-level similarity must not raise
/// confidence.
const RECEIPT_SYSTEM_PROMPT: &str = "You are a receipt image analysis assistant. \
You will be given an image of a receipt. Read the receipt directly from the image \
and determine whether the target product name appears in it. \
IMPORTANT RULES:\n\
- Read every line of the receipt image carefully.\n\
- Match by CHARACTER SHAPE SIMILARITY ONLY. Do NOT consider semantic meaning or product categories.\n\
- For example, '돌체라떼' and '돌채라떼' are similar (printing artifacts), but '바리스타' and '돌체라떼' are NOT similar even though both are coffee-related.\n\
- NEVER increase confidence based on semantic similarity (same category, related meaning, etc.).\n\
- Only match when the actual characters closely resemble the target product name.\n\
- If the image is too blurry or unreadable, set match to false and provide a helpful retryHint.\n\
Respond ONLY with a JSON object: \
{\"match\": true/false, \"confidence\": 0.0-1.0, \"retryHint\": \"string or null\", \"reason\": \"brief explanation\"}";

/// Instruction for the inventory task. Identity-level comparison: same brand,
/// name, and packaging; variants of one brand are different products; shooting
/// conditions are ignored.
const INVENTORY_SYSTEM_PROMPT: &str = "You are an inventory verification assistant. \
Compare the user's photo (first image) with the reference product image (second image) \
and determine if they show the SAME product.\n\
IMPORTANT RULES:\n\
- Judge by PRODUCT IDENTITY: same brand, same product name, same packaging design.\n\
- Different flavors, sizes, or variants of the same brand are DIFFERENT products (e.g., Coca-Cola Original vs Coca-Cola Zero are different).\n\
- IGNORE differences caused by shooting angle, lighting, background, or image quality.\n\
- If the user's photo is too blurry, too dark, or the product is not clearly visible, set match to false and provide a helpful retryHint IN KOREAN.\n\
- The retryHint must always be in Korean (e.g., '제품이 잘 보이도록 다시 촬영해주세요.').\n\
Respond ONLY with a JSON object: \
{\"match\": true/false, \"confidence\": 0.0-1.0, \"retryHint\": \"string or null\", \"reason\": \"brief explanation\"}";

/// Encode an image payload as a base64 data URI.
pub fn data_uri(image: &ImagePayload) -> String {
    format!(
        "data:{};base64,{}",
        image.content_type,
        STANDARD.encode(&image.bytes)
    )
}

/// Build the full message list for one task.
///
/// `reference_data_uri` is the already-fetched reference image for the
/// inventory task; it is ignored for the receipt task. The user's photo is
/// always the first image block.
pub fn build_messages(
    task: &AnalysisTask,
    image: &ImagePayload,
    reference_data_uri: Option<&str>,
) -> Vec<Value> {
    let (system, user_content) = match task {
        AnalysisTask::ReceiptCheck {
            target_product_key,
            confidence_threshold,
        } => (
            RECEIPT_SYSTEM_PROMPT,
            vec![
                text_block(format!(
                    "Read the receipt in this image and determine if it contains a purchase of the target product.\n\
                     Target product: {target_product_key}\n\
                     Confidence threshold: {confidence_threshold}"
                )),
                image_block(data_uri(image)),
            ],
        ),
        AnalysisTask::InventoryCompare {
            confidence_threshold,
            ..
        } => (
            INVENTORY_SYSTEM_PROMPT,
            vec![
                text_block(format!(
                    "Compare these two images. The first is the user's photo, \
                     the second is the reference product image. \
                     Confidence threshold: {confidence_threshold}\n\
                     Are they showing the same product?"
                )),
                image_block(data_uri(image)),
                image_block(reference_data_uri.unwrap_or_default().to_string()),
            ],
        ),
    };

    vec![
        json!({ "role": "system", "content": system }),
        json!({ "role": "user", "content": user_content }),
    ]
}

fn text_block(text: String) -> Value {
    json!({ "type": "text", "text": text })
}

fn image_block(url: String) -> Value {
    json!({ "type": "image_url", "image_url": { "url": url } })
}
