//! Combined listing endpoints.
//!
//! POST /combined_service/online_sale        -- analyze + content + carbon (JSON)
//! POST /combined_service/online_sale_stream -- analyze + search + carbon, then NDJSON content
//! POST /combined_service/selling_post       -- analyze + search + selling copy + carbon (JSON or NDJSON)
//! POST /combined_service/seeking_post       -- optional analyze + seeking copy (JSON)
//!
//! NDJSON protocol (one JSON object per line):
//! - `metadata` -- image analysis, search report, carbon footprint
//! - `content`  -- incremental text chunk
//! - `end`      -- stream complete
//! - `error`    -- failure; the stream stops after this frame

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{info, warn};

use reviveai_core::vision::{combine_description, combine_seeking_description};
use reviveai_types::carbon::CarbonFootprint;
use reviveai_types::listing::{
    ContentStyle, DEFAULT_CONTACT_INFO, DEFAULT_DEADLINE, DEFAULT_TRADE_METHOD,
    ListingContent, ListingStreamFrame, SeekingKind, SeekingPostParams, SellingPostParams,
    SellingStyle, SeekingStyle,
};
use reviveai_types::llm::StreamEvent;

use crate::http::error::AppError;
use crate::http::handlers::upload::ListingForm;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Content type for newline-delimited JSON streams.
const NDJSON: &str = "application/x-ndjson";

/// Carbon result as embedded in combined responses: the endpoint still
/// succeeds when only the carbon step fails, carrying the error inline.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CarbonOutcome {
    Ready(CarbonFootprint),
    Failed { error: String },
}

impl CarbonOutcome {
    fn from_result(result: Result<CarbonFootprint, impl std::fmt::Display>) -> Self {
        match result {
            Ok(footprint) => CarbonOutcome::Ready(footprint),
            Err(e) => {
                warn!(error = %e, "carbon calculation failed");
                CarbonOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OnlineSaleData {
    pub image_analysis: String,
    pub optimized_content: ListingContent,
    pub carbon_footprint: CarbonOutcome,
}

#[derive(Debug, Serialize)]
pub struct SellingPostData {
    pub image_analysis: String,
    pub selling_post: String,
    pub carbon_footprint: CarbonOutcome,
}

#[derive(Debug, Serialize)]
pub struct SeekingPostData {
    pub image_analysis: String,
    pub seeking_post: String,
}

/// POST /combined_service/online_sale -- auction listing, non-streaming.
///
/// Analyzes the image, then runs content generation and carbon calculation
/// concurrently over the combined description.
pub async fn online_sale(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<OnlineSaleData>, AppError> {
    let form = ListingForm::read(multipart).await?;
    let image = form.require_image()?;
    let description = form.text("description");
    let style = ContentStyle::from_param(&form.text_or("style", "normal"));

    info!(style = %style, "online sale request");

    let image_analysis = state.vision.analyze(&image.bytes, &image.media_type).await?;
    let combined = combine_description(&description, &image_analysis);

    let (content, carbon) = tokio::join!(
        state.content.generate(&combined, style),
        state.carbon.calculate(&combined),
    );

    Ok(ApiResponse::success(OnlineSaleData {
        image_analysis,
        optimized_content: content?,
        carbon_footprint: CarbonOutcome::from_result(carbon),
    }))
}

/// POST /combined_service/online_sale_stream -- auction listing, NDJSON.
///
/// One metadata frame (image analysis, search report, carbon footprint)
/// after the concurrent research phase, then content chunks as they
/// arrive from the model.
pub async fn online_sale_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = ListingForm::read(multipart).await?;
    form.require_image()?;
    let image = form.image.clone().expect("image presence checked above");
    let description = form.text("description");
    let style = ContentStyle::from_param(&form.text_or("style", "normal"));

    info!(style = %style, "online sale stream request");

    let stream = async_stream::stream! {
        let image_analysis = match state.vision.analyze(&image.bytes, &image.media_type).await {
            Ok(analysis) => analysis,
            Err(e) => {
                yield Ok::<_, Infallible>(
                    ListingStreamFrame::Error { error: e.to_string() }.to_ndjson_line(),
                );
                return;
            }
        };
        let combined = combine_description(&description, &image_analysis);

        // Research and carbon run concurrently; both must land before the
        // metadata frame goes out.
        let (search, carbon) = tokio::join!(
            state.search_agent.research(&combined),
            state.carbon.calculate(&combined),
        );

        let search_results = match search {
            Ok(report) => report.text,
            Err(e) => format!("搜尋過程中發生錯誤: {e}"),
        };
        let carbon_footprint = match carbon {
            Ok(footprint) => Some(footprint),
            Err(e) => {
                warn!(error = %e, "carbon calculation failed during stream");
                None
            }
        };

        yield Ok(ListingStreamFrame::Metadata {
            image_analysis,
            search_results: Some(search_results.clone()),
            carbon_footprint,
        }
        .to_ndjson_line());

        let mut content_stream = state.content.stream(&combined, &search_results, style);
        while let Some(event) = content_stream.next().await {
            match event {
                Ok(StreamEvent::TextDelta { text }) => {
                    yield Ok(ListingStreamFrame::Content { chunk: text }.to_ndjson_line());
                }
                Ok(StreamEvent::Done) => break,
                Ok(_) => {}
                Err(e) => {
                    yield Ok(ListingStreamFrame::Error { error: e.to_string() }.to_ndjson_line());
                    return;
                }
            }
        }

        yield Ok(ListingStreamFrame::End.to_ndjson_line());
    };

    Response::builder()
        .header(CONTENT_TYPE, NDJSON)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// POST /combined_service/selling_post -- social selling post.
///
/// With `stream=true` the NDJSON protocol is used (metadata frame carries
/// image analysis and carbon footprint, no search report); otherwise a
/// single JSON envelope.
pub async fn selling_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = ListingForm::read(multipart).await?;
    form.require_image()?;
    let image = form.image.clone().expect("image presence checked above");
    let description = form.text("description");
    let price = form.require_text("price")?;
    let style = SellingStyle::from_param(&form.text_or("style", "normal"));
    let stream_mode = form.flag("stream");

    let params_base = SellingPostParams {
        description: String::new(), // filled after image analysis
        price,
        contact_info: form.text_or("contact_info", DEFAULT_CONTACT_INFO),
        trade_method: form.text_or("trade_method", DEFAULT_TRADE_METHOD),
        style,
    };

    info!(style = %style, stream = stream_mode, "selling post request");

    if stream_mode {
        let stream = async_stream::stream! {
            let image_analysis = match state.vision.analyze(&image.bytes, &image.media_type).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    yield Ok::<_, Infallible>(
                        ListingStreamFrame::Error { error: e.to_string() }.to_ndjson_line(),
                    );
                    return;
                }
            };
            let combined = combine_description(&description, &image_analysis);
            let params = SellingPostParams {
                description: combined.clone(),
                ..params_base
            };

            let (search, carbon) = tokio::join!(
                state.search_agent.research(&combined),
                state.carbon.calculate(&combined),
            );
            let search_results = match search {
                Ok(report) => report.text,
                Err(e) => format!("搜尋過程中發生錯誤: {e}"),
            };
            let carbon_footprint = match carbon {
                Ok(footprint) => Some(footprint),
                Err(e) => {
                    warn!(error = %e, "carbon calculation failed during stream");
                    None
                }
            };

            yield Ok(ListingStreamFrame::Metadata {
                image_analysis,
                search_results: None,
                carbon_footprint,
            }
            .to_ndjson_line());

            let mut post_stream = state.selling.stream(&params, &search_results);
            while let Some(event) = post_stream.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        yield Ok(ListingStreamFrame::Content { chunk: text }.to_ndjson_line());
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(_) => {}
                    Err(e) => {
                        yield Ok(ListingStreamFrame::Error { error: e.to_string() }.to_ndjson_line());
                        return;
                    }
                }
            }

            yield Ok(ListingStreamFrame::End.to_ndjson_line());
        };

        return Response::builder()
            .header(CONTENT_TYPE, NDJSON)
            .body(Body::from_stream(stream))
            .map_err(|e| AppError::Internal(e.to_string()));
    }

    // Non-streaming: research feeds the copy; carbon runs alongside.
    let image_analysis = state.vision.analyze(&image.bytes, &image.media_type).await?;
    let combined = combine_description(&description, &image_analysis);
    let params = SellingPostParams {
        description: combined.clone(),
        ..params_base
    };

    let (selling_post, carbon) = tokio::join!(
        async {
            let search_results = match state.search_agent.research(&combined).await {
                Ok(report) => report.text,
                Err(e) => format!("搜尋過程中發生錯誤: {e}"),
            };
            state.selling.generate(&params, &search_results).await
        },
        state.carbon.calculate(&combined),
    );

    Ok(ApiResponse::success(SellingPostData {
        image_analysis,
        selling_post: selling_post?,
        carbon_footprint: CarbonOutcome::from_result(carbon),
    })
    .into_response())
}

/// POST /combined_service/seeking_post -- social seeking post.
///
/// The reference image is optional; when present its analysis is folded
/// into the description handed to the generator.
pub async fn seeking_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<SeekingPostData>, AppError> {
    let form = ListingForm::read(multipart).await?;
    let product_description = form.require_text("product_description")?;
    let purpose = form.require_text("purpose")?;
    let expected_price = form.require_text("expected_price")?;
    let seeking_kind = SeekingKind::from_param(&form.text_or("seeking_type", "buy"));
    let style = SeekingStyle::from_param(&form.text_or("style", "normal"));

    info!(style = %style, kind = ?seeking_kind, "seeking post request");

    let image_analysis = match form.image {
        Some(ref image) => state.vision.analyze(&image.bytes, &image.media_type).await?,
        None => String::new(),
    };
    let combined = combine_seeking_description(&product_description, &image_analysis);

    let params = SeekingPostParams {
        product_description: combined,
        purpose,
        expected_price,
        contact_info: form.text_or("contact_info", DEFAULT_CONTACT_INFO),
        trade_method: form.text_or("trade_method", DEFAULT_TRADE_METHOD),
        seeking_kind,
        deadline: form.text_or("deadline", DEFAULT_DEADLINE),
        style,
    };

    let seeking_post = state.seeking.generate(&params).await?;

    Ok(ApiResponse::success(SeekingPostData {
        image_analysis,
        seeking_post,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviveai_types::carbon::{EnvironmentalBenefits, SelectedProduct};

    fn footprint() -> CarbonFootprint {
        CarbonFootprint {
            selected_product: SelectedProduct {
                product_name: "Laptop".into(),
                company: "Acme".into(),
                carbon_footprint: 160.0,
                similarity_score: 0.2,
                details: "detail".into(),
            },
            saved_carbon: 80.0,
            environmental_benefits: EnvironmentalBenefits::from_saved_carbon(80.0),
            selection_reason: "match".into(),
        }
    }

    #[test]
    fn test_carbon_outcome_ready_serializes_flat() {
        let outcome = CarbonOutcome::from_result(Ok::<_, String>(footprint()));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["selected_product"]["product_name"], "Laptop");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_carbon_outcome_failure_carries_error() {
        let outcome =
            CarbonOutcome::from_result(Err::<CarbonFootprint, _>("catalogue is empty".to_string()));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "catalogue is empty");
    }

    #[test]
    fn test_online_sale_data_shape() {
        let data = OnlineSaleData {
            image_analysis: "分析".into(),
            optimized_content: ListingContent {
                optimized_product_title: "標題".into(),
                optimized_product_description: reviveai_types::listing::ListingDescription {
                    basic_information: "a".into(),
                    features_and_benefits: "b".into(),
                    current_status: "c".into(),
                    sustainable_value: "d".into(),
                    call_to_action: "e".into(),
                },
            },
            carbon_footprint: CarbonOutcome::from_result(Ok::<_, String>(footprint())),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["image_analysis"], "分析");
        assert_eq!(json["optimized_content"]["optimized_product_title"], "標題");
        assert_eq!(json["carbon_footprint"]["saved_carbon"], 80.0);
    }
}
