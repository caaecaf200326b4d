//! Carbon footprint calculation: embed, nearest-neighbor search, LLM
//! rerank, savings arithmetic.
//!
//! The catalogue's nearest neighbors are frequently the wrong *kind* of
//! product (a printer matching a laptop query on brand terms), so the
//! candidates are reranked by a model under a strict type-matching prompt
//! before the footprint math runs.

use serde::Serialize;
use tracing::{Instrument, info_span};

use reviveai_types::carbon::{
    CarbonFootprint, EnvironmentalBenefits, RerankSelection, ScoredProduct, SelectedProduct,
};
use reviveai_types::error::CatalogError;
use reviveai_types::llm::{CompletionRequest, Message, MessageRole, OutputSchema};

use crate::catalog::{CatalogStore, Embedder};
use crate::llm::LlmProvider;

/// Rerank system prompt. Product-type matching dominates every other
/// signal; brand, specs and footprint plausibility follow in that order.
const RERANK_SYSTEM: &str = "\
你是一個極其嚴格的產品匹配專家，你的首要任務是確保產品類別的絕對正確匹配。\
產品類型不匹配是嚴重錯誤，必須避免。例如：

- 如果查詢是筆記型電腦，你絕對不能選擇列印機、鍵盤或其他任何非筆記型電腦產品
- 如果查詢是智慧型手機，你絕對不能選擇平板、耳機或其他任何非智慧型手機產品

在選擇產品時，請首先識別查詢中的產品類型，然後確保只考慮相同類型的產品。\
只有在沒有完全相同類型的產品時，才考慮功能最相近的產品類型。\
碳足跡計算的準確性完全依賴於正確的產品類型匹配。";

/// Candidate entry serialized into the rerank prompt.
#[derive(Serialize)]
struct RerankCandidate<'a> {
    index: usize,
    product_name: &'a str,
    company: &'a str,
    carbon_footprint: f64,
    similarity_score: f32,
    details: &'a str,
}

/// Estimates the carbon saving of a second-hand purchase.
pub struct CarbonCalculator<P, E, C> {
    provider: P,
    embedder: E,
    catalog: C,
    rerank_model: String,
    saving_ratio: f64,
    candidates: usize,
}

impl<P, E, C> CarbonCalculator<P, E, C>
where
    P: LlmProvider,
    E: Embedder,
    C: CatalogStore,
{
    pub fn new(
        provider: P,
        embedder: E,
        catalog: C,
        rerank_model: impl Into<String>,
        saving_ratio: f64,
        candidates: usize,
    ) -> Self {
        Self {
            provider,
            embedder,
            catalog,
            rerank_model: rerank_model.into(),
            saving_ratio,
            candidates,
        }
    }

    /// Full pipeline: embed the description, search the catalogue, rerank,
    /// and convert the matched footprint into savings and equivalences.
    pub async fn calculate(&self, product_description: &str) -> Result<CarbonFootprint, CatalogError> {
        let embeddings = self
            .embedder
            .embed(std::slice::from_ref(&product_description.to_string()))
            .await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::Embedding("embedder returned no vector".into()))?;

        let candidates = self.catalog.search(&query_embedding, self.candidates).await?;
        if candidates.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let selection = self.rerank(product_description, &candidates).await?;
        if selection.best_match_index >= candidates.len() {
            return Err(CatalogError::RerankOutOfRange {
                index: selection.best_match_index,
                count: candidates.len(),
            });
        }

        let best = &candidates[selection.best_match_index];
        let saved_carbon = best.product.carbon_footprint * self.saving_ratio;

        Ok(CarbonFootprint {
            selected_product: SelectedProduct {
                product_name: best.product.product_name.clone(),
                company: best.product.company.clone(),
                carbon_footprint: best.product.carbon_footprint,
                similarity_score: best.distance,
                details: best.product.detail.clone(),
            },
            saved_carbon,
            environmental_benefits: EnvironmentalBenefits::from_saved_carbon(saved_carbon),
            selection_reason: selection.reason,
        })
    }

    /// Ask the rerank model to pick the best candidate, structured output.
    async fn rerank(
        &self,
        query: &str,
        candidates: &[ScoredProduct],
    ) -> Result<RerankSelection, CatalogError> {
        let entries: Vec<RerankCandidate<'_>> = candidates
            .iter()
            .enumerate()
            .map(|(index, c)| RerankCandidate {
                index,
                product_name: &c.product.product_name,
                company: &c.product.company,
                carbon_footprint: c.product.carbon_footprint,
                similarity_score: c.distance,
                details: &c.product.detail,
            })
            .collect();

        let candidates_json = serde_json::to_string_pretty(&entries)
            .map_err(|e| CatalogError::MalformedSelection(e.to_string()))?;

        let prompt = format!(
            "請根據以下查詢和候選產品列表，選擇最符合的產品：\n\
             查詢：{query}\n\
             候選產品列表：\n{candidates_json}\n\n\
             【重要】產品類型必須嚴格匹配，這是所有條件中最優先的要求。\n\
             在完成產品類型匹配後，請按以下優先順序考慮其他因素：\n\
             1. 產品品牌的匹配度（例如：查詢Apple產品時，優先選擇Apple品牌）\n\
             2. 產品規格的相似度（例如：存儲容量、處理器性能等）\n\
             3. 碳足跡數值的合理性（避免選擇碳足跡異常高或異常低的產品）\n\n\
             先從產品描述中識別出查詢的產品類型，再從候選產品中識別出每個產品的類型，\
             然後嚴格按照產品類型進行匹配。\n\
             請提供清晰的理由說明為何選擇該產品，特別是如何匹配產品類型。"
        );

        let schema = schemars::schema_for!(RerankSelection);
        let request = CompletionRequest {
            model: self.rerank_model.clone(),
            messages: vec![Message::text(MessageRole::User, prompt)],
            system: Some(RERANK_SYSTEM.to_string()),
            max_tokens: 512,
            temperature: None,
            stream: false,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: Some(OutputSchema {
                name: "product_selection".to_string(),
                schema: serde_json::to_value(&schema)
                    .map_err(|e| CatalogError::MalformedSelection(e.to_string()))?,
            }),
        };

        let span = info_span!(
            "gen_ai.rerank",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            rerank.candidates = candidates.len(),
        );

        let response = self.provider.complete(&request).instrument(span).await?;

        serde_json::from_str(&response.content)
            .map_err(|e| CatalogError::MalformedSelection(format!("rerank output: {e}")))
    }
}
