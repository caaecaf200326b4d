//! Carbon catalogue and footprint-savings types.
//!
//! The carbon catalogue is a vector-indexed lookup table of product
//! carbon-footprint disclosures (name, company, sector, weight, footprint,
//! country, year, free-text detail). A listing's estimated savings are
//! derived from the footprint of the closest catalogue product and
//! converted into consumer-friendly equivalences.

use serde::{Deserialize, Serialize};

/// Fraction of the original footprint assumed saved by buying second-hand.
pub const DEFAULT_SAVING_RATIO: f64 = 0.50;

/// CO2 absorbed by one tree in a year (kg).
pub const TREE_ABSORPTION_KG_PER_YEAR: f64 = 21.0;

/// CO2 emitted per km driven (kg).
pub const CAR_EMISSION_KG_PER_KM: f64 = 0.25;

/// CO2 emitted per hour of air conditioning (kg).
pub const AC_EMISSION_KG_PER_HOUR: f64 = 0.35;

/// CO2 emitted per full phone charge (kg).
pub const PHONE_CHARGE_EMISSION_KG: f64 = 0.012;

/// A product record in the carbon catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub product_id: String,
    pub product_name: String,
    pub company: String,
    pub sector: String,
    pub weight_kg: f64,
    /// Product carbon footprint in kg CO2e.
    pub carbon_footprint: f64,
    pub country: String,
    pub year: i32,
    pub detail: String,
}

impl CatalogProduct {
    /// Build the text that gets embedded for similarity search.
    ///
    /// `detail` goes last so a long free-text tail cannot crowd out the
    /// identifying fields under the embedder's token limit.
    pub fn embedding_document(&self) -> String {
        format!(
            "產品: {}, 公司: {}, 行業: {}, 重量: {} kg, 碳足跡: {} kg CO2e, 國家: {}, 年份: {}, 詳情: {}",
            self.product_name,
            self.company,
            self.sector,
            self.weight_kg,
            self.carbon_footprint,
            self.country,
            self.year,
            self.detail
        )
    }
}

/// A catalogue product returned from vector search with its distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product: CatalogProduct,
    /// Cosine distance from the query embedding (lower is closer).
    pub distance: f32,
}

/// The rerank model's structured selection among the candidates.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RerankSelection {
    /// 最佳匹配產品的索引（從0開始）。
    pub best_match_index: usize,
    /// 選擇該產品的原因。
    pub reason: String,
}

/// The catalogue product the rerank step settled on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedProduct {
    pub product_name: String,
    pub company: String,
    /// Original footprint in kg CO2e.
    pub carbon_footprint: f64,
    /// Cosine distance of the selected candidate.
    pub similarity_score: f32,
    pub details: String,
}

/// Consumer-friendly equivalences for a carbon saving, pre-formatted
/// for display. Tiny values render with a "少於" floor instead of "0.0".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalBenefits {
    /// Tree-years of CO2 absorption.
    pub trees: String,
    /// Kilometers of car driving avoided.
    pub car_km: String,
    /// Hours of air conditioning avoided.
    pub ac_hours: String,
    /// Full phone charges avoided.
    pub phone_charges: String,
}

impl EnvironmentalBenefits {
    /// Compute equivalences from a saved-carbon figure (kg CO2e).
    pub fn from_saved_carbon(saved_carbon: f64) -> Self {
        Self {
            trees: format_equivalent(saved_carbon / TREE_ABSORPTION_KG_PER_YEAR, 0.01),
            car_km: format_equivalent(saved_carbon / CAR_EMISSION_KG_PER_KM, 0.1),
            ac_hours: format_equivalent(saved_carbon / AC_EMISSION_KG_PER_HOUR, 0.1),
            phone_charges: format_equivalent(saved_carbon / PHONE_CHARGE_EMISSION_KG, 1.0),
        }
    }
}

/// Format an equivalence value to one decimal, with a "少於" floor.
fn format_equivalent(value: f64, floor: f64) -> String {
    if value < floor {
        format!("少於{floor}")
    } else {
        format!("{value:.1}")
    }
}

/// Complete carbon-footprint result for a product description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonFootprint {
    pub selected_product: SelectedProduct,
    /// Estimated CO2e saved by the second-hand purchase (kg).
    pub saved_carbon: f64,
    pub environmental_benefits: EnvironmentalBenefits,
    pub selection_reason: String,
}

impl CarbonFootprint {
    /// Render the result as a markdown report (CLI and UI display).
    pub fn to_markdown(&self) -> String {
        let p = &self.selected_product;
        let b = &self.environmental_benefits;
        format!(
            "## 碳足跡分析\n\n\
             **選定商品**: {}\n\
             **公司**: {}\n\
             **原始碳足跡**: {:.2} kg CO2e\n\
             **節省的碳排放**: {:.2} kg CO2e\n\n\
             ## 環境效益\n\n\
             - 相當於 {} 棵樹一年的吸碳量\n\
             - 相當於減少開車 {} 公里的碳排放\n\
             - 相當於減少吹冷氣 {} 小時的碳排放\n\
             - 相當於減少手機充電 {} 次的碳排放\n",
            p.product_name, p.company, p.carbon_footprint, self.saved_carbon,
            b.trees, b.car_km, b.ac_hours, b.phone_charges
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> CatalogProduct {
        CatalogProduct {
            product_id: "PCF-001-20".into(),
            product_name: "MacBook Air 13-inch".into(),
            company: "Apple".into(),
            sector: "Technology Hardware".into(),
            weight_kg: 1.29,
            carbon_footprint: 161.0,
            country: "United States of America".into(),
            year: 2020,
            detail: "13-inch laptop, M1 chip".into(),
        }
    }

    #[test]
    fn test_embedding_document_puts_detail_last() {
        let doc = sample_product().embedding_document();
        assert!(doc.starts_with("產品: MacBook Air 13-inch"));
        assert!(doc.ends_with("詳情: 13-inch laptop, M1 chip"));
        assert!(doc.contains("碳足跡: 161 kg CO2e"));
    }

    #[test]
    fn test_benefits_formatting() {
        // 161 kg footprint, 50% ratio -> 80.5 kg saved
        let benefits = EnvironmentalBenefits::from_saved_carbon(80.5);
        assert_eq!(benefits.trees, "3.8"); // 80.5 / 21.0
        assert_eq!(benefits.car_km, "322.0"); // 80.5 / 0.25
        assert_eq!(benefits.ac_hours, "230.0"); // 80.5 / 0.35
        assert_eq!(benefits.phone_charges, "6708.3"); // 80.5 / 0.012
    }

    #[test]
    fn test_benefits_floor_for_tiny_savings() {
        let benefits = EnvironmentalBenefits::from_saved_carbon(0.001);
        assert_eq!(benefits.trees, "少於0.01");
        assert_eq!(benefits.car_km, "少於0.1");
        assert_eq!(benefits.ac_hours, "少於0.1");
        assert_eq!(benefits.phone_charges, "少於1");
    }

    #[test]
    fn test_rerank_selection_schema_forbids_extras() {
        let schema = schemars::schema_for!(RerankSelection);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["additionalProperties"], serde_json::json!(false));
    }

    #[test]
    fn test_carbon_footprint_markdown() {
        let result = CarbonFootprint {
            selected_product: SelectedProduct {
                product_name: "MacBook Air 13-inch".into(),
                company: "Apple".into(),
                carbon_footprint: 161.0,
                similarity_score: 0.12,
                details: "13-inch laptop".into(),
            },
            saved_carbon: 80.5,
            environmental_benefits: EnvironmentalBenefits::from_saved_carbon(80.5),
            selection_reason: "同為筆記型電腦".into(),
        };
        let md = result.to_markdown();
        assert!(md.contains("**選定商品**: MacBook Air 13-inch"));
        assert!(md.contains("80.50 kg CO2e"));
        assert!(md.contains("3.8 棵樹"));
    }

    #[test]
    fn test_carbon_footprint_serde_roundtrip() {
        let result = CarbonFootprint {
            selected_product: SelectedProduct {
                product_name: "手機".into(),
                company: "Acme".into(),
                carbon_footprint: 55.0,
                similarity_score: 0.3,
                details: "detail".into(),
            },
            saved_carbon: 27.5,
            environmental_benefits: EnvironmentalBenefits::from_saved_carbon(27.5),
            selection_reason: "reason".into(),
        };
        let json = serde_json::to_string(&result).unwrap();
        let parsed: CarbonFootprint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.selected_product.company, "Acme");
        assert!((parsed.saved_carbon - 27.5).abs() < f64::EPSILON);
    }
}
