use reqwest::Client;
use reqwest::multipart::{Form, Part};

use crate::attendance::capture::CapturedImage;
use crate::client::verification::models::verification_models::VerificationResponse;
use crate::logger;

pub const IMAGE_FIELD: &str = "image";

/// Single multipart POST of the captured photo. Any status is returned as a
/// response; only transport failures are errors.
pub async fn post_verification(
    client: &Client,
    url: &str,
    image: &CapturedImage,
    token: &str,
) -> Result<VerificationResponse, reqwest::Error> {
    let part = match Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
    {
        Ok(part) => part,
        Err(_) => {
            logger::warn(format!("Ignoring invalid content type '{}'", image.content_type));
            Part::bytes(image.bytes.clone()).file_name(image.file_name.clone())
        }
    };
    let form = Form::new().part(IMAGE_FIELD, part);

    logger::info(format!("POST verification {} ({} bytes)", url, image.bytes.len()));

    let res = client.post(url).bearer_auth(token).multipart(form).send().await?;

    let status = res.status().as_u16();
    // The status already arrived; a body that fails to read only loses the detail
    let body = res.text().await.unwrap_or_default();

    Ok(VerificationResponse::from_body(status, &body))
}
